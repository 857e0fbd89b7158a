// src/repositories/catalog_provider.rs
//
// Catalog read capability.
//
// The provider turns store rows into normalized raw records. Query
// failures (including an unreachable store) degrade to empty results:
// callers treat absence as "no data available", never as an error.

use std::sync::Arc;

use rusqlite::{params, Row};

use crate::db::{get_connection, ConnectionPool};
use crate::error::AppResult;
use crate::infrastructure::MediaStore;

/// Catalog item as read from the store, one copy per genre it is listed
/// under. Media paths are already resolved to URL form.
#[derive(Debug, Clone, PartialEq)]
pub struct RawMediaItem {
    pub kind: String,
    pub title: String,
    pub genre: String,
    pub description: String,
    pub rating: String,
    pub duration_minutes: i64,
    pub accent_color: String,
    pub thumbnail_url: String,
    pub video_url: String,
}

/// A genre with every title linked to it, newest first.
#[derive(Debug, Clone)]
pub struct RawCategory {
    pub name: String,
    pub items: Vec<RawMediaItem>,
}

#[cfg_attr(test, mockall::automock)]
pub trait CatalogProvider: Send + Sync {
    /// The most recently created title, or `None` when the catalog is
    /// empty or unreadable.
    fn fetch_featured(&self) -> Option<RawMediaItem>;

    /// Every genre (ordered by name) with its linked titles. Genres with
    /// no titles are omitted.
    fn fetch_categories(&self) -> Vec<RawCategory>;
}

pub struct SqliteCatalogProvider {
    pool: Arc<ConnectionPool>,
    media: MediaStore,
}

impl SqliteCatalogProvider {
    pub fn new(pool: Arc<ConnectionPool>, media: MediaStore) -> Self {
        Self { pool, media }
    }

    /// Map a title+asset row. `genre` is attached by the caller: the
    /// category's own name, or the precomputed primary genre for the
    /// featured query.
    fn row_to_item(&self, row: &Row, genre: &str) -> Result<RawMediaItem, rusqlite::Error> {
        let thumbnail: String = row.get("thumbnail_url")?;
        let video: String = row.get("video_url")?;

        Ok(RawMediaItem {
            kind: row.get("type")?,
            title: row.get("name")?,
            genre: genre.to_string(),
            description: row.get("description")?,
            rating: row.get("age_rating")?,
            duration_minutes: row.get("runtime_min")?,
            accent_color: row.get("accent_color")?,
            thumbnail_url: self.media.file_url(&thumbnail),
            video_url: self.media.file_url(&video),
        })
    }

    fn query_featured(&self) -> AppResult<Option<RawMediaItem>> {
        let conn = get_connection(&self.pool)?;

        // Most recent title wins; ties break on the store's insertion
        // order (id). The primary genre is the alphabetically first genre
        // linked to the title, empty when it has none.
        let mut stmt = conn.prepare(
            "SELECT t.type, t.name, t.description, t.age_rating, t.runtime_min, t.accent_color,
                    IFNULL(m.thumbnail_url, '') AS thumbnail_url,
                    IFNULL(m.video_url, '') AS video_url,
                    IFNULL((SELECT g.name FROM genres g
                            JOIN title_genres tg ON tg.genre_id = g.id
                            WHERE tg.title_id = t.id
                            ORDER BY g.name LIMIT 1), '') AS primary_genre
             FROM titles t
             LEFT JOIN media_files m ON m.title_id = t.id
             ORDER BY t.created_at DESC, t.id DESC
             LIMIT 1",
        )?;

        let item = stmt
            .query_row([], |row| {
                let primary_genre: String = row.get("primary_genre")?;
                self.row_to_item(row, &primary_genre)
            })
            .map(Some)
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                other => Err(other),
            })?;

        Ok(item)
    }

    fn query_categories(&self) -> AppResult<Vec<RawCategory>> {
        let conn = get_connection(&self.pool)?;

        let mut genres_stmt = conn.prepare("SELECT id, name FROM genres ORDER BY name")?;
        let genres: Vec<(i64, String)> = genres_stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;

        let mut items_stmt = conn.prepare(
            "SELECT t.type, t.name, t.description, t.age_rating, t.runtime_min, t.accent_color,
                    IFNULL(m.thumbnail_url, '') AS thumbnail_url,
                    IFNULL(m.video_url, '') AS video_url
             FROM titles t
             JOIN title_genres tg ON tg.title_id = t.id
             LEFT JOIN media_files m ON m.title_id = t.id
             WHERE tg.genre_id = ?1
             ORDER BY t.created_at DESC, t.id DESC",
        )?;

        let mut result = Vec::with_capacity(genres.len());
        for (genre_id, genre_name) in genres {
            let items: Vec<RawMediaItem> = items_stmt
                .query_map(params![genre_id], |row| self.row_to_item(row, &genre_name))?
                .collect::<Result<Vec<_>, _>>()?;

            if !items.is_empty() {
                result.push(RawCategory {
                    name: genre_name,
                    items,
                });
            }
        }

        Ok(result)
    }
}

impl CatalogProvider for SqliteCatalogProvider {
    fn fetch_featured(&self) -> Option<RawMediaItem> {
        match self.query_featured() {
            Ok(item) => item,
            Err(e) => {
                log::warn!("featured query degraded to empty: {}", e);
                None
            }
        }
    }

    fn fetch_categories(&self) -> Vec<RawCategory> {
        match self.query_categories() {
            Ok(categories) => categories,
            Err(e) => {
                log::warn!("category query degraded to empty: {}", e);
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connection::create_test_pool;
    use rusqlite::Connection;

    fn insert_title(conn: &Connection, name: &str, created_at: &str) -> i64 {
        conn.execute(
            "INSERT INTO titles (type, name, description, age_rating, runtime_min, accent_color, created_at)
             VALUES ('movie', ?1, 'desc', 'PG', 100, '#4F46E5', ?2)",
            params![name, created_at],
        )
        .unwrap();
        conn.last_insert_rowid()
    }

    fn insert_genre(conn: &Connection, name: &str) -> i64 {
        conn.execute("INSERT INTO genres (name) VALUES (?1)", params![name])
            .unwrap();
        conn.last_insert_rowid()
    }

    fn link(conn: &Connection, title_id: i64, genre_id: i64) {
        conn.execute(
            "INSERT INTO title_genres (title_id, genre_id) VALUES (?1, ?2)",
            params![title_id, genre_id],
        )
        .unwrap();
    }

    fn provider(pool: &ConnectionPool) -> SqliteCatalogProvider {
        SqliteCatalogProvider::new(Arc::new(pool.clone()), MediaStore::new("/media-root"))
    }

    #[test]
    fn test_empty_catalog_yields_nothing() {
        let (pool, _dir) = create_test_pool();
        let provider = provider(&pool);

        assert_eq!(provider.fetch_featured(), None);
        assert!(provider.fetch_categories().is_empty());
    }

    #[test]
    fn test_featured_is_most_recent_title() {
        let (pool, _dir) = create_test_pool();
        let conn = pool.get().unwrap();
        insert_title(&conn, "Old Film", "2026-01-01T00:00:00+00:00");
        insert_title(&conn, "New Film", "2026-02-01T00:00:00+00:00");

        let featured = provider(&pool).fetch_featured().unwrap();
        assert_eq!(featured.title, "New Film");
        // No asset row: paths degrade to empty strings.
        assert_eq!(featured.thumbnail_url, "");
        assert_eq!(featured.video_url, "");
    }

    #[test]
    fn test_featured_ties_break_on_insertion_order() {
        let (pool, _dir) = create_test_pool();
        let conn = pool.get().unwrap();
        insert_title(&conn, "First", "2026-01-01T00:00:00+00:00");
        insert_title(&conn, "Second", "2026-01-01T00:00:00+00:00");

        let featured = provider(&pool).fetch_featured().unwrap();
        assert_eq!(featured.title, "Second");
    }

    #[test]
    fn test_featured_primary_genre_is_alphabetically_first() {
        let (pool, _dir) = create_test_pool();
        let conn = pool.get().unwrap();
        let title = insert_title(&conn, "Film", "2026-01-01T00:00:00+00:00");
        let thriller = insert_genre(&conn, "Thriller");
        let drama = insert_genre(&conn, "Drama");
        link(&conn, title, thriller);
        link(&conn, title, drama);

        let featured = provider(&pool).fetch_featured().unwrap();
        assert_eq!(featured.genre, "Drama");
    }

    #[test]
    fn test_categories_carry_only_their_own_titles() {
        let (pool, _dir) = create_test_pool();
        let conn = pool.get().unwrap();
        let drama = insert_genre(&conn, "Drama");
        let comedy = insert_genre(&conn, "Comedy");
        insert_genre(&conn, "Horror"); // no titles, must be omitted

        let a = insert_title(&conn, "Film A", "2026-01-01T00:00:00+00:00");
        let b = insert_title(&conn, "Film B", "2026-02-01T00:00:00+00:00");
        link(&conn, a, drama);
        link(&conn, b, drama);
        link(&conn, b, comedy);

        let categories = provider(&pool).fetch_categories();
        // Ordered by genre name.
        assert_eq!(categories.len(), 2);
        assert_eq!(categories[0].name, "Comedy");
        assert_eq!(categories[1].name, "Drama");

        let comedy_titles: Vec<&str> = categories[0].items.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(comedy_titles, vec!["Film B"]);

        // Newest first within a category, each copy tagged with the
        // category's own name.
        let drama_titles: Vec<&str> = categories[1].items.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(drama_titles, vec!["Film B", "Film A"]);
        assert!(categories[1].items.iter().all(|i| i.genre == "Drama"));
    }

    #[test]
    fn test_media_paths_resolved_to_file_urls() {
        let (pool, _dir) = create_test_pool();
        let conn = pool.get().unwrap();
        let title = insert_title(&conn, "Film", "2026-01-01T00:00:00+00:00");
        conn.execute(
            "INSERT INTO media_files (title_id, thumbnail_url, video_url)
             VALUES (?1, 'images/a.jpg', 'videos/a.mp4')",
            params![title],
        )
        .unwrap();

        let featured = provider(&pool).fetch_featured().unwrap();
        assert_eq!(featured.thumbnail_url, "file:///media-root/images/a.jpg");
        assert_eq!(featured.video_url, "file:///media-root/videos/a.mp4");
    }
}
