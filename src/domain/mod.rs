// src/domain/mod.rs
//
// Domain root: entity types and the invariant checks that guard writes.
// Services import from `crate::domain::*`.

pub mod account;
pub mod catalog;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),
}

pub type DomainResult<T> = Result<T, DomainError>;

pub use account::{Profile, Role, SubscriptionPlan, DEFAULT_PROFILE_NAME};
pub use catalog::{
    validate_genre_name, validate_runtime_minutes, validate_title_name, Genre, TitleKind,
};
