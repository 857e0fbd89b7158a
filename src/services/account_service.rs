// src/services/account_service.rs
//
// Account, subscription and watch-state write paths, plus the aggregate
// profile read-model. All operations open request-scoped connections;
// the subscribe transition is the one place that needs a transaction.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;

use crate::db::{get_connection, ConnectionPool};
use crate::domain::{Profile, SubscriptionPlan, DEFAULT_PROFILE_NAME};
use crate::error::{AppError, AppResult};
use crate::infrastructure::MediaStore;
use crate::services::OpResult;

const HISTORY_LIMIT: i64 = 15;
const MY_LIST_LIMIT: i64 = 20;

/// Fallback when a plan row carries a non-positive duration.
const FALLBACK_PLAN_DURATION_DAYS: i64 = 30;

// ----------------------------------------------------------------------
// Read-model records (presentation boundary)
// ----------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub email: String,
    pub role: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionView {
    pub plan_name: String,
    pub price_month: f64,
    pub duration_days: i64,
    pub max_quality: String,
    pub start_date: String,
    pub end_date: String,
    pub active: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileView {
    pub id: i64,
    pub name: String,
    pub avatar_url: String,
    pub is_kid: bool,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntryView {
    pub title: String,
    pub runtime_min: i64,
    pub thumbnail_url: String,
    pub video_url: String,
    pub position_sec: i64,
    pub finished: bool,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MyListEntryView {
    pub title: String,
    pub thumbnail_url: String,
    pub video_url: String,
    pub runtime_min: i64,
    pub accent_color: String,
    pub added_at: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CountsView {
    pub profiles: usize,
    pub history: usize,
    pub my_list: usize,
}

/// Aggregate read-model for one account: user, most recent subscription
/// (by creation order, regardless of active flag), all profiles, recent
/// watch history and my-list entries joined across the user's profiles.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfileView {
    pub user: UserView,
    pub subscription: Option<SubscriptionView>,
    pub profiles: Vec<ProfileView>,
    pub history: Vec<HistoryEntryView>,
    pub my_list: Vec<MyListEntryView>,
    pub counts: CountsView,
}

// ----------------------------------------------------------------------
// Service
// ----------------------------------------------------------------------

pub struct AccountService {
    pool: Arc<ConnectionPool>,
    media: MediaStore,
}

impl AccountService {
    pub fn new(pool: Arc<ConnectionPool>, media: MediaStore) -> Self {
        Self { pool, media }
    }

    /// Plans ordered by price. Seeds the reference table on first use.
    pub fn list_plans(&self) -> AppResult<Vec<SubscriptionPlan>> {
        let conn = get_connection(&self.pool)?;
        seed_default_plans(&conn)?;

        let mut stmt = conn.prepare(
            "SELECT id, name, price_month, duration_days, max_profiles, max_quality
             FROM subscription_plans
             ORDER BY price_month ASC",
        )?;

        let plans = stmt
            .query_map([], |row| {
                Ok(SubscriptionPlan {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    price_month: row.get(2)?,
                    duration_days: row.get(3)?,
                    max_profiles: row.get(4)?,
                    max_quality: row.get(5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(plans)
    }

    /// Activate a plan for a user. Deactivating the previous subscriptions
    /// and inserting the new active one is a single transaction: no
    /// observable "zero active subscriptions" state survives the call.
    pub fn subscribe_plan(&self, identifier: &str, plan_id: i64) -> OpResult {
        match self.try_subscribe(identifier, plan_id) {
            Ok(outcome) => outcome,
            Err(e) => OpResult::from_error(&e, "Failed to subscribe"),
        }
    }

    fn try_subscribe(&self, identifier: &str, plan_id: i64) -> AppResult<OpResult> {
        let email = identifier.trim();
        if email.is_empty() || plan_id <= 0 {
            return Ok(OpResult::fail("User and plan are required"));
        }

        let mut conn = get_connection(&self.pool)?;

        let Some(user_id) = find_user_id(&conn, email)? else {
            return Ok(OpResult::fail("User not found"));
        };

        let duration_days: Option<i64> = conn
            .query_row(
                "SELECT duration_days FROM subscription_plans WHERE id = ?1 LIMIT 1",
                params![plan_id],
                |row| row.get(0),
            )
            .optional()?;
        let Some(duration_days) = duration_days else {
            return Ok(OpResult::fail("Plan not found"));
        };

        let duration = if duration_days > 0 {
            duration_days
        } else {
            FALLBACK_PLAN_DURATION_DAYS
        };
        let start_date = Utc::now().date_naive();
        let end_date = start_date + Duration::days(duration);

        let tx = conn.transaction()?;
        tx.execute(
            "UPDATE user_subscriptions SET is_active = 0 WHERE user_id = ?1",
            params![user_id],
        )?;
        tx.execute(
            "INSERT INTO user_subscriptions (user_id, plan_id, start_date, end_date, is_active, created_at)
             VALUES (?1, ?2, ?3, ?4, 1, ?5)",
            params![
                user_id,
                plan_id,
                start_date.to_string(),
                end_date.to_string(),
                Utc::now().to_rfc3339()
            ],
        )?;
        tx.commit()?;

        Ok(OpResult::ok("Subscription activated"))
    }

    /// Save a title to the account's list. Adding a pair that is already
    /// present reports "Already in My List" and writes nothing.
    pub fn add_to_my_list(&self, identifier: &str, title: &str) -> OpResult {
        match self.try_add_to_my_list(identifier, title) {
            Ok(outcome) => outcome,
            Err(e) => OpResult::from_error(&e, "Failed to add to My List"),
        }
    }

    fn try_add_to_my_list(&self, identifier: &str, title: &str) -> AppResult<OpResult> {
        let email = identifier.trim();
        let title_name = title.trim();
        if email.is_empty() || title_name.is_empty() {
            return Ok(OpResult::fail("User and title are required"));
        }

        let conn = get_connection(&self.pool)?;

        let Some(user_id) = find_user_id(&conn, email)? else {
            return Ok(OpResult::fail("User not found"));
        };

        let profile = resolve_or_create_profile(&conn, user_id)?;

        let Some(title_id) = find_title_id(&conn, title_name)? else {
            return Ok(OpResult::fail("Title not found"));
        };

        let already: Option<i64> = conn
            .query_row(
                "SELECT 1 FROM my_list WHERE profile_id = ?1 AND title_id = ?2 LIMIT 1",
                params![profile.id, title_id],
                |row| row.get(0),
            )
            .optional()?;
        if already.is_some() {
            return Ok(OpResult::fail("Already in My List"));
        }

        let inserted = conn.execute(
            "INSERT INTO my_list (profile_id, title_id, added_at) VALUES (?1, ?2, ?3)",
            params![profile.id, title_id, Utc::now().to_rfc3339()],
        );
        match inserted {
            Ok(_) => Ok(OpResult::ok("Added to My List")),
            // The store-level unique pair is the backstop for concurrent
            // adds racing past the existence check.
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Ok(OpResult::fail("Already in My List"))
            }
            Err(e) => Err(AppError::Database(e)),
        }
    }

    /// Append a watch-history entry. Fire-and-forget telemetry: unknown
    /// titles and storage failures are logged and swallowed.
    pub fn log_playback(&self, identifier: &str, title: &str, position_sec: i64, finished: bool) {
        if let Err(e) = self.try_log_playback(identifier, title, position_sec, finished) {
            log::warn!("playback log dropped: {}", e);
        }
    }

    fn try_log_playback(
        &self,
        identifier: &str,
        title: &str,
        position_sec: i64,
        finished: bool,
    ) -> AppResult<()> {
        let email = identifier.trim();
        let title_name = title.trim();
        if email.is_empty() || title_name.is_empty() {
            return Ok(());
        }

        let conn = get_connection(&self.pool)?;

        let Some(user_id) = find_user_id(&conn, email)? else {
            return Ok(());
        };

        let profile = resolve_or_create_profile(&conn, user_id)?;

        let Some(title_id) = find_title_id(&conn, title_name)? else {
            return Ok(());
        };

        conn.execute(
            "INSERT INTO watch_history (profile_id, title_id, position_sec, is_finished, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                profile.id,
                title_id,
                position_sec,
                finished,
                Utc::now().to_rfc3339()
            ],
        )?;

        Ok(())
    }

    /// Aggregate account read. Fails only when the user itself cannot be
    /// resolved (or the store is unreachable); the sub-queries contribute
    /// whatever exists.
    pub fn user_profile(&self, identifier: &str) -> AppResult<UserProfileView> {
        let email = identifier.trim();
        if email.is_empty() {
            return Err(AppError::Other("Identifier is required".to_string()));
        }

        let conn = get_connection(&self.pool)?;

        let user_row: Option<(i64, String, String, String)> = conn
            .query_row(
                "SELECT id, email, created_at, role FROM users WHERE email = ?1 LIMIT 1",
                params![email],
                |row| {
                    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
                },
            )
            .optional()?;
        let Some((user_id, email, created_at, role)) = user_row else {
            return Err(AppError::NotFound);
        };

        let user = UserView {
            email,
            role,
            created_at,
        };

        let subscription = conn
            .query_row(
                "SELECT sp.name, sp.price_month, sp.duration_days, sp.max_quality,
                        us.start_date, us.end_date, us.is_active
                 FROM user_subscriptions us
                 JOIN subscription_plans sp ON sp.id = us.plan_id
                 WHERE us.user_id = ?1
                 ORDER BY us.created_at DESC, us.id DESC
                 LIMIT 1",
                params![user_id],
                |row| {
                    Ok(SubscriptionView {
                        plan_name: row.get(0)?,
                        price_month: row.get(1)?,
                        duration_days: row.get(2)?,
                        max_quality: row.get(3)?,
                        start_date: row.get(4)?,
                        end_date: row.get(5)?,
                        active: row.get(6)?,
                    })
                },
            )
            .optional()?;

        let mut profiles_stmt = conn.prepare(
            "SELECT id, name, avatar_url, is_kid, created_at
             FROM profiles
             WHERE user_id = ?1
             ORDER BY created_at DESC, id DESC",
        )?;
        let profiles = profiles_stmt
            .query_map(params![user_id], |row| {
                let avatar: String = row.get(2)?;
                Ok(ProfileView {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    avatar_url: self.media.file_url(&avatar),
                    is_kid: row.get(3)?,
                    created_at: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut history_stmt = conn.prepare(
            "SELECT t.name, t.runtime_min, IFNULL(m.thumbnail_url, ''), IFNULL(m.video_url, ''),
                    wh.position_sec, wh.is_finished, wh.updated_at
             FROM watch_history wh
             JOIN titles t ON t.id = wh.title_id
             LEFT JOIN media_files m ON m.title_id = t.id
             WHERE wh.profile_id IN (SELECT id FROM profiles WHERE user_id = ?1)
             ORDER BY wh.updated_at DESC, wh.id DESC
             LIMIT ?2",
        )?;
        let history = history_stmt
            .query_map(params![user_id, HISTORY_LIMIT], |row| {
                let thumbnail: String = row.get(2)?;
                let video: String = row.get(3)?;
                Ok(HistoryEntryView {
                    title: row.get(0)?,
                    runtime_min: row.get(1)?,
                    thumbnail_url: self.media.file_url(&thumbnail),
                    video_url: self.media.file_url(&video),
                    position_sec: row.get(4)?,
                    finished: row.get(5)?,
                    updated_at: row.get(6)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut list_stmt = conn.prepare(
            "SELECT t.name, IFNULL(m.thumbnail_url, ''), IFNULL(m.video_url, ''),
                    t.runtime_min, t.accent_color, l.added_at
             FROM my_list l
             JOIN titles t ON t.id = l.title_id
             LEFT JOIN media_files m ON m.title_id = t.id
             WHERE l.profile_id IN (SELECT id FROM profiles WHERE user_id = ?1)
             ORDER BY l.added_at DESC, l.id DESC
             LIMIT ?2",
        )?;
        let my_list = list_stmt
            .query_map(params![user_id, MY_LIST_LIMIT], |row| {
                let thumbnail: String = row.get(1)?;
                let video: String = row.get(2)?;
                Ok(MyListEntryView {
                    title: row.get(0)?,
                    thumbnail_url: self.media.file_url(&thumbnail),
                    video_url: self.media.file_url(&video),
                    runtime_min: row.get(3)?,
                    accent_color: row.get(4)?,
                    added_at: row.get(5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let counts = CountsView {
            profiles: profiles.len(),
            history: history.len(),
            my_list: my_list.len(),
        };

        Ok(UserProfileView {
            user,
            subscription,
            profiles,
            history,
            my_list,
            counts,
        })
    }
}

// ----------------------------------------------------------------------
// Shared row helpers
// ----------------------------------------------------------------------

fn find_user_id(conn: &Connection, email: &str) -> AppResult<Option<i64>> {
    let id = conn
        .query_row(
            "SELECT id FROM users WHERE email = ?1 LIMIT 1",
            params![email],
            |row| row.get(0),
        )
        .optional()?;
    Ok(id)
}

/// Case-insensitive exact name match; the most recently created title wins
/// when names collide.
fn find_title_id(conn: &Connection, name: &str) -> AppResult<Option<i64>> {
    let id = conn
        .query_row(
            "SELECT id FROM titles WHERE lower(name) = lower(?1)
             ORDER BY created_at DESC, id DESC LIMIT 1",
            params![name],
            |row| row.get(0),
        )
        .optional()?;
    Ok(id)
}

/// The user's oldest profile, or a fresh default "Profile 1" when the
/// account has none yet.
fn resolve_or_create_profile(conn: &Connection, user_id: i64) -> AppResult<Profile> {
    let existing: Option<(i64, String, String, bool, String)> = conn
        .query_row(
            "SELECT id, name, avatar_url, is_kid, created_at
             FROM profiles
             WHERE user_id = ?1
             ORDER BY created_at ASC, id ASC
             LIMIT 1",
            params![user_id],
            |row| {
                Ok((
                    row.get(0)?,
                    row.get(1)?,
                    row.get(2)?,
                    row.get(3)?,
                    row.get(4)?,
                ))
            },
        )
        .optional()?;

    if let Some((id, name, avatar_url, is_kid, created_at)) = existing {
        return Ok(Profile {
            id,
            user_id,
            name,
            avatar_url,
            is_kid,
            created_at: DateTime::parse_from_rfc3339(&created_at)?.with_timezone(&Utc),
        });
    }

    let created_at = Utc::now();
    conn.execute(
        "INSERT INTO profiles (user_id, name, avatar_url, is_kid, created_at)
         VALUES (?1, ?2, '', 0, ?3)",
        params![user_id, DEFAULT_PROFILE_NAME, created_at.to_rfc3339()],
    )?;

    Ok(Profile {
        id: conn.last_insert_rowid(),
        user_id,
        name: DEFAULT_PROFILE_NAME.to_string(),
        avatar_url: String::new(),
        is_kid: false,
        created_at,
    })
}

fn seed_default_plans(conn: &Connection) -> AppResult<()> {
    let count: i64 = conn.query_row("SELECT COUNT(1) FROM subscription_plans", [], |row| {
        row.get(0)
    })?;

    if count == 0 {
        conn.execute_batch(
            "INSERT INTO subscription_plans (name, price_month, duration_days, max_profiles, max_quality)
             VALUES
             ('Basic', 9.99, 30, 1, 'HD'),
             ('Standard', 14.99, 30, 2, 'Full HD'),
             ('Premium', 19.99, 30, 4, '4K');",
        )?;
    }

    Ok(())
}
