// src/services/ingestion_service.rs
//
// Admin ingestion write paths: genres and movie titles with their media
// assets. Successful writes emit domain events; cache refresh happens
// through the event wiring, never directly from here.

use std::sync::Arc;

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use serde::Deserialize;

use crate::db::{get_connection, ConnectionPool};
use crate::domain::{
    validate_genre_name, validate_runtime_minutes, validate_title_name, Genre, TitleKind,
};
use crate::error::AppResult;
use crate::events::{EventBus, GenreAdded, TitleAdded};
use crate::infrastructure::MediaStore;
use crate::services::OpResult;

const DEFAULT_AGE_RATING: &str = "PG";
const DEFAULT_ACCENT_COLOR: &str = "#4F46E5";

/// Admin form payload for a new movie. Media sources are local paths or
/// `file://` URLs; either may be blank.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddMovieRequest {
    pub name: String,
    pub description: String,
    pub genre: String,
    pub runtime_min: i64,
    #[serde(default)]
    pub thumbnail_source: String,
    #[serde(default)]
    pub video_source: String,
}

pub struct IngestionService {
    pool: Arc<ConnectionPool>,
    media: MediaStore,
    events: EventBus,
}

impl IngestionService {
    pub fn new(pool: Arc<ConnectionPool>, media: MediaStore, events: EventBus) -> Self {
        Self {
            pool,
            media,
            events,
        }
    }

    /// Insert a genre. Duplicate names (case-insensitive) are rejected
    /// before the insert; the NOCASE unique column is the backstop.
    pub fn add_genre(&self, name: &str) -> OpResult {
        match self.try_add_genre(name) {
            Ok(outcome) => outcome,
            Err(e) => OpResult::from_error(&e, "Failed to add genre"),
        }
    }

    fn try_add_genre(&self, name: &str) -> AppResult<OpResult> {
        let trimmed = name.trim();
        if validate_genre_name(trimmed).is_err() {
            return Ok(OpResult::fail("Genre name is required"));
        }

        let conn = get_connection(&self.pool)?;

        if find_genre_id(&conn, trimmed)?.is_some() {
            return Ok(OpResult::fail("Genre already exists"));
        }

        conn.execute("INSERT INTO genres (name) VALUES (?1)", params![trimmed])?;
        let genre_id = conn.last_insert_rowid();

        self.events
            .emit(GenreAdded::new(genre_id, trimmed.to_string()));

        Ok(OpResult::ok("Genre added"))
    }

    /// Ingest a movie: title row, genre link, media copies, media row.
    /// Media copy failures degrade to empty stored paths; the title still
    /// lands in the catalog.
    pub fn add_movie(&self, request: &AddMovieRequest) -> OpResult {
        match self.try_add_movie(request) {
            Ok(outcome) => outcome,
            Err(e) => OpResult::from_error(&e, "Failed to insert title"),
        }
    }

    fn try_add_movie(&self, request: &AddMovieRequest) -> AppResult<OpResult> {
        let name = request.name.trim();
        if validate_title_name(name).is_err() {
            return Ok(OpResult::fail("Name is required"));
        }

        let genre_name = request.genre.trim();
        if validate_genre_name(genre_name).is_err() {
            return Ok(OpResult::fail("Genre is required"));
        }

        validate_runtime_minutes(request.runtime_min)?;

        // Media storage is best-effort: if the directories cannot be
        // created, the copies below degrade to empty paths and the title
        // still lands in the catalog.
        if let Err(e) = self.media.ensure_directories() {
            log::warn!("media directories unavailable: {}", e);
        }

        let conn = get_connection(&self.pool)?;

        let genre_id = match find_genre_id(&conn, genre_name)? {
            Some(id) => id,
            None => {
                conn.execute("INSERT INTO genres (name) VALUES (?1)", params![genre_name])?;
                conn.last_insert_rowid()
            }
        };

        conn.execute(
            "INSERT INTO titles (type, name, description, age_rating, runtime_min, accent_color, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                TitleKind::Movie.to_string(),
                name,
                request.description.trim(),
                DEFAULT_AGE_RATING,
                request.runtime_min,
                DEFAULT_ACCENT_COLOR,
                Utc::now().to_rfc3339()
            ],
        )?;
        let title_id = conn.last_insert_rowid();

        conn.execute(
            "INSERT INTO title_genres (title_id, genre_id) VALUES (?1, ?2)",
            params![title_id, genre_id],
        )?;

        let thumbnail = self
            .media
            .store_image(&request.thumbnail_source)
            .unwrap_or_default();
        let video = self
            .media
            .store_video(&request.video_source)
            .unwrap_or_default();

        conn.execute(
            "INSERT INTO media_files (title_id, thumbnail_url, video_url) VALUES (?1, ?2, ?3)",
            params![title_id, thumbnail, video],
        )?;

        self.events.emit(TitleAdded::new(
            title_id,
            name.to_string(),
            genre_name.to_string(),
        ));

        Ok(OpResult::ok("Movie added"))
    }

    /// Genre listing for the admin form, ordered by name.
    pub fn list_genres(&self) -> AppResult<Vec<Genre>> {
        let conn = get_connection(&self.pool)?;
        let mut stmt = conn.prepare("SELECT id, name FROM genres ORDER BY name ASC")?;

        let genres = stmt
            .query_map([], |row| {
                Ok(Genre {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(genres)
    }
}

fn find_genre_id(conn: &Connection, name: &str) -> AppResult<Option<i64>> {
    let id = conn
        .query_row(
            "SELECT id FROM genres WHERE lower(name) = lower(?1) LIMIT 1",
            params![name],
            |row| row.get(0),
        )
        .optional()?;
    Ok(id)
}
