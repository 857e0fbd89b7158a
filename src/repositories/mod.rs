// src/repositories/mod.rs

mod auth_repository;
mod catalog_provider;

pub use auth_repository::{
    AuthRepository, AuthUser, SqliteAuthRepository, UserRecord, RESERVED_ADMIN_IDENTIFIER,
};
pub use catalog_provider::{CatalogProvider, RawCategory, RawMediaItem, SqliteCatalogProvider};

#[cfg(test)]
pub use auth_repository::MockAuthRepository;
#[cfg(test)]
pub use catalog_provider::MockCatalogProvider;
