// src/application/state.rs

use std::sync::Arc;

use crate::db::{
    create_connection_pool, default_database_path, get_connection, initialize_database,
    ConnectionPool,
};
use crate::error::AppResult;
use crate::events::{EventBus, GenreAdded, TitleAdded};
use crate::infrastructure::MediaStore;
use crate::repositories::{AuthRepository, SqliteAuthRepository, SqliteCatalogProvider};
use crate::services::{AccountService, AuthService, CatalogService, IngestionService};

/// Fully wired application state.
/// Services are Arc-wrapped for thread-safe sharing with an embedding
/// shell; the catalog cache is subscribed to the ingestion events and
/// populated once during construction.
pub struct AppState {
    pub event_bus: EventBus,
    pub catalog_service: Arc<CatalogService>,
    pub auth_service: Arc<AuthService>,
    pub account_service: Arc<AccountService>,
    pub ingestion_service: Arc<IngestionService>,
}

impl AppState {
    /// Open (and initialize) the database at the default location and wire
    /// everything against it.
    pub fn initialize() -> AppResult<Self> {
        let database_path = default_database_path()?;
        let pool = Arc::new(create_connection_pool(&database_path)?);
        {
            let conn = get_connection(&pool)?;
            initialize_database(&conn)?;
        }

        let media = MediaStore::at_default_root()?;
        media.ensure_directories()?;

        Ok(Self::build(pool, media))
    }

    /// Wire services over an already-initialized pool and media root.
    pub fn build(pool: Arc<ConnectionPool>, media: MediaStore) -> Self {
        let event_bus = EventBus::new();

        // Auth stays up without its backend; requests then report the
        // backend as unavailable instead of panicking at startup.
        let auth_repository = match SqliteAuthRepository::new(Arc::clone(&pool)) {
            Ok(repository) => Some(Arc::new(repository) as Arc<dyn AuthRepository>),
            Err(e) => {
                log::error!("auth repository bootstrap failed: {}", e);
                None
            }
        };
        let auth_service = Arc::new(AuthService::new(auth_repository));

        let provider = Arc::new(SqliteCatalogProvider::new(Arc::clone(&pool), media.clone()));
        let catalog_service = Arc::new(CatalogService::new(provider));

        let account_service = Arc::new(AccountService::new(Arc::clone(&pool), media.clone()));
        let ingestion_service = Arc::new(IngestionService::new(
            Arc::clone(&pool),
            media,
            event_bus.clone(),
        ));

        // Catalog writes invalidate the cache through the bus.
        let catalog = Arc::clone(&catalog_service);
        event_bus.subscribe::<TitleAdded, _>(move |_| catalog.reload());
        let catalog = Arc::clone(&catalog_service);
        event_bus.subscribe::<GenreAdded, _>(move |_| catalog.reload());

        catalog_service.reload();

        Self {
            event_bus,
            catalog_service,
            auth_service,
            account_service,
            ingestion_service,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connection::create_test_pool;
    use crate::services::AddMovieRequest;

    fn state() -> (AppState, tempfile::TempDir) {
        let (pool, dir) = create_test_pool();
        let media = MediaStore::new(dir.path().join("media"));
        (AppState::build(Arc::new(pool), media), dir)
    }

    #[test]
    fn test_build_subscribes_catalog_to_ingestion_events() {
        let (state, _dir) = state();

        assert_eq!(state.event_bus.subscriber_count::<TitleAdded>(), 1);
        assert_eq!(state.event_bus.subscriber_count::<GenreAdded>(), 1);
    }

    #[test]
    fn test_ingested_movie_shows_up_without_manual_reload() {
        let (state, _dir) = state();
        assert!(state.catalog_service.categories().is_empty());

        state.ingestion_service.add_genre("Drama");
        state.ingestion_service.add_movie(&AddMovieRequest {
            name: "Test Film".to_string(),
            description: "desc".to_string(),
            genre: "Drama".to_string(),
            runtime_min: 125,
            ..Default::default()
        });

        let categories = state.catalog_service.categories();
        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].name, "Drama");
        assert_eq!(categories[0].items[0].title, "Test Film");
        assert_eq!(state.catalog_service.featured_item().title, "Test Film");
    }
}
