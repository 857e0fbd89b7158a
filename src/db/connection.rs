// src/db/connection.rs
//
// Database connection management.
//
// Every service issues request-scoped connections from one shared pool;
// nothing holds a long-lived transaction across calls.

use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Type alias for the connection pool
pub type ConnectionPool = Pool<SqliteConnectionManager>;

/// Type alias for a pooled connection
pub type PooledConn = PooledConnection<SqliteConnectionManager>;

/// Data directory for the engine: {APP_DATA}/nebula
///
/// Created on first use. The database file and the managed media
/// directories all live under this root.
pub fn default_data_dir() -> AppResult<PathBuf> {
    let app_data_dir = dirs::data_dir()
        .ok_or_else(|| AppError::Other("Could not determine app data directory".to_string()))?;

    let nebula_dir = app_data_dir.join("nebula");
    std::fs::create_dir_all(&nebula_dir)?;

    Ok(nebula_dir)
}

/// Default database file path: {APP_DATA}/nebula/nebula.db
pub fn default_database_path() -> AppResult<PathBuf> {
    Ok(default_data_dir()?.join("nebula.db"))
}

/// Create a connection pool against the given database file.
///
/// Pool configuration:
/// - Max 15 connections
/// - WAL mode for read concurrency
/// - Foreign keys enabled (not default in SQLite)
/// - Busy timeout so writers wait instead of failing immediately
pub fn create_connection_pool(db_path: &Path) -> AppResult<ConnectionPool> {
    let manager = SqliteConnectionManager::file(db_path).with_init(|conn| {
        conn.execute_batch(
            "PRAGMA foreign_keys = ON;
             PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA busy_timeout = 5000;",
        )?;
        Ok(())
    });

    let pool = Pool::builder()
        .max_size(15)
        .build(manager)
        .map_err(|e| AppError::Pool(format!("Failed to create connection pool: {}", e)))?;

    Ok(pool)
}

/// Get a connection from the pool with a clearer error message.
pub fn get_connection(pool: &ConnectionPool) -> AppResult<PooledConn> {
    pool.get()
        .map_err(|e| AppError::Pool(format!("Failed to get database connection: {}", e)))
}

/// Pool over a fresh temp-file database with the schema applied.
///
/// File-backed rather than in-memory so that every pooled connection sees
/// the same database. The TempDir must stay alive for the test's duration.
#[cfg(test)]
pub fn create_test_pool() -> (ConnectionPool, tempfile::TempDir) {
    let dir = tempfile::tempdir().expect("temp dir");
    let pool = create_connection_pool(&dir.path().join("test.db")).expect("test pool");

    let conn = pool.get().expect("test connection");
    super::migrations::initialize_database(&conn).expect("schema init");
    drop(conn);

    (pool, dir)
}
