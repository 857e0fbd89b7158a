// src/services/mod.rs

mod account_service;
mod auth_service;
mod catalog_service;
mod ingestion_service;
mod outcome;

pub use account_service::{
    AccountService, CountsView, HistoryEntryView, MyListEntryView, ProfileView, SubscriptionView,
    UserProfileView, UserView,
};
pub use auth_service::{AuthMode, AuthResult, AuthService};
pub use catalog_service::{CatalogService, MediaCategory, MediaItem};
pub use ingestion_service::{AddMovieRequest, IngestionService};
pub use outcome::OpResult;
