// src/lib.rs
// Nebula - catalog and account engine for a local streaming app
//
// Architecture:
// - Domain-centric: invariants live in domain, persistence in repositories
// - Event-driven: write paths emit events, the catalog cache reloads on them
// - Explicit: no implicit behavior, no background work
// - Local-first: one SQLite file plus a managed media directory

pub mod application;
pub mod db;
pub mod domain;
pub mod error;
pub mod events;
pub mod infrastructure;
pub mod repositories;
pub mod services;

// ============================================================================
// PUBLIC API - Domain
// ============================================================================

pub use domain::{
    validate_genre_name, validate_runtime_minutes, validate_title_name, Genre, Profile, Role,
    SubscriptionPlan, TitleKind, DEFAULT_PROFILE_NAME,
};

// ============================================================================
// PUBLIC API - Errors
// ============================================================================

pub use error::{AppError, AppResult};

// ============================================================================
// PUBLIC API - Events
// ============================================================================

pub use events::{DomainEvent, EventBus, GenreAdded, TitleAdded};

// ============================================================================
// PUBLIC API - Database
// ============================================================================

pub use db::{
    create_connection_pool, default_database_path, initialize_database, ConnectionPool,
};

// ============================================================================
// PUBLIC API - Repositories
// ============================================================================

pub use repositories::{
    AuthRepository, AuthUser, CatalogProvider, RawCategory, RawMediaItem, SqliteAuthRepository,
    SqliteCatalogProvider, UserRecord,
};

// ============================================================================
// PUBLIC API - Infrastructure
// ============================================================================

pub use infrastructure::MediaStore;

// ============================================================================
// PUBLIC API - Services
// ============================================================================

pub use services::{
    AccountService,
    AddMovieRequest,
    AuthMode,
    AuthResult,
    // Auth
    AuthService,
    // Catalog cache
    CatalogService,
    CountsView,
    HistoryEntryView,
    // Ingestion
    IngestionService,
    MediaCategory,
    MediaItem,
    MyListEntryView,
    OpResult,
    ProfileView,
    SubscriptionView,
    UserProfileView,
    // Account
    UserView,
};

// ============================================================================
// PUBLIC API - Application Layer
// ============================================================================

pub use application::AppState;
