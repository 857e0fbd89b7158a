// src/repositories/auth_repository.rs
//
// Credential lookup/creation capability behind the auth service.
//
// NOTE: passwords are stored and compared as plain text. Hashing them is
// tracked as a known gap (see DESIGN.md) and would not change any of the
// success/failure outcomes below.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};
use serde::Serialize;

use crate::db::{get_connection, ConnectionPool};
use crate::domain::Role;
use crate::error::AppResult;

/// The `admin` identifier is reserved; self-registration under it is
/// always rejected.
pub const RESERVED_ADMIN_IDENTIFIER: &str = "admin";

const DEFAULT_ADMIN_PASSWORD: &str = "admin1234";

/// An authenticated account, as handed back to the auth service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub identifier: String,
    pub role: Role,
}

/// Account row for the admin user listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

#[cfg_attr(test, mockall::automock)]
pub trait AuthRepository: Send + Sync {
    /// Exact identifier+password match. `None` for no match, without
    /// revealing whether the identifier exists.
    fn find_user(&self, identifier: &str, password: &str) -> AppResult<Option<AuthUser>>;

    /// Create a regular account. `None` when the identifier is reserved
    /// or already taken.
    fn create_user(&self, identifier: &str, password: &str) -> AppResult<Option<AuthUser>>;

    /// All accounts, newest first.
    fn list_users(&self) -> AppResult<Vec<UserRecord>>;
}

pub struct SqliteAuthRepository {
    pool: Arc<ConnectionPool>,
}

impl SqliteAuthRepository {
    /// Opens the repository and bootstraps the reserved admin account if
    /// it is missing.
    pub fn new(pool: Arc<ConnectionPool>) -> AppResult<Self> {
        let repo = Self { pool };
        repo.ensure_admin_user(RESERVED_ADMIN_IDENTIFIER, DEFAULT_ADMIN_PASSWORD)?;
        Ok(repo)
    }

    fn ensure_admin_user(&self, identifier: &str, password: &str) -> AppResult<()> {
        let conn = get_connection(&self.pool)?;

        let existing: Option<i64> = conn
            .query_row(
                "SELECT id FROM users WHERE email = ?1 LIMIT 1",
                params![identifier],
                |row| row.get(0),
            )
            .optional()?;

        if existing.is_none() {
            conn.execute(
                "INSERT INTO users (email, password, role, created_at) VALUES (?1, ?2, 'admin', ?3)",
                params![identifier, password, Utc::now().to_rfc3339()],
            )?;
        }

        Ok(())
    }
}

impl AuthRepository for SqliteAuthRepository {
    fn find_user(&self, identifier: &str, password: &str) -> AppResult<Option<AuthUser>> {
        let conn = get_connection(&self.pool)?;

        let role: Option<String> = conn
            .query_row(
                "SELECT role FROM users WHERE email = ?1 AND password = ?2 LIMIT 1",
                params![identifier, password],
                |row| row.get(0),
            )
            .optional()?;

        Ok(role.map(|role| AuthUser {
            identifier: identifier.to_string(),
            role: Role::parse(&role),
        }))
    }

    fn create_user(&self, identifier: &str, password: &str) -> AppResult<Option<AuthUser>> {
        if identifier == RESERVED_ADMIN_IDENTIFIER {
            return Ok(None);
        }

        let conn = get_connection(&self.pool)?;

        let exists: Option<i64> = conn
            .query_row(
                "SELECT id FROM users WHERE email = ?1 LIMIT 1",
                params![identifier],
                |row| row.get(0),
            )
            .optional()?;
        if exists.is_some() {
            return Ok(None);
        }

        conn.execute(
            "INSERT INTO users (email, password, role, created_at) VALUES (?1, ?2, 'user', ?3)",
            params![identifier, password, Utc::now().to_rfc3339()],
        )?;

        Ok(Some(AuthUser {
            identifier: identifier.to_string(),
            role: Role::User,
        }))
    }

    fn list_users(&self) -> AppResult<Vec<UserRecord>> {
        let conn = get_connection(&self.pool)?;

        let mut stmt = conn.prepare(
            "SELECT email, role, created_at FROM users ORDER BY created_at DESC, id DESC",
        )?;

        let users = stmt
            .query_map([], |row| {
                let email: String = row.get(0)?;
                let role: String = row.get(1)?;
                let created_at: String = row.get(2)?;
                Ok((email, role, created_at))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        users
            .into_iter()
            .map(|(email, role, created_at)| {
                Ok(UserRecord {
                    email,
                    role: Role::parse(&role),
                    created_at: DateTime::parse_from_rfc3339(&created_at)?.with_timezone(&Utc),
                })
            })
            .collect()
    }
}
