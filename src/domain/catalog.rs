// src/domain/catalog.rs
//
// Catalog-side entities. Titles, genres and media assets are created by
// ingestion and never edited or deleted afterwards; the store is the owner
// of record and row identity is the store's integer key.

use serde::{Deserialize, Serialize};

use crate::domain::{DomainError, DomainResult};

/// Kind of catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TitleKind {
    Movie,
    Show,
}

impl std::fmt::Display for TitleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TitleKind::Movie => write!(f, "movie"),
            TitleKind::Show => write!(f, "show"),
        }
    }
}

/// A genre row. Name is unique case-insensitively (store-enforced).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Genre {
    pub id: i64,
    pub name: String,
}

/// Title names must carry at least one non-whitespace character.
pub fn validate_title_name(name: &str) -> DomainResult<()> {
    if name.trim().is_empty() {
        return Err(DomainError::InvariantViolation(
            "Title name cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Genre names must carry at least one non-whitespace character.
pub fn validate_genre_name(name: &str) -> DomainResult<()> {
    if name.trim().is_empty() {
        return Err(DomainError::InvariantViolation(
            "Genre name cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Runtime is stored in minutes; zero means unknown, negative is invalid.
pub fn validate_runtime_minutes(minutes: i64) -> DomainResult<()> {
    if minutes < 0 {
        return Err(DomainError::InvariantViolation(
            "Runtime cannot be negative".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_kind_display() {
        assert_eq!(TitleKind::Movie.to_string(), "movie");
        assert_eq!(TitleKind::Show.to_string(), "show");
    }

    #[test]
    fn test_blank_names_fail() {
        assert!(validate_title_name("   ").is_err());
        assert!(validate_genre_name("").is_err());
        assert!(validate_title_name("Test Film").is_ok());
        assert!(validate_genre_name("Drama").is_ok());
    }

    #[test]
    fn test_negative_runtime_fails() {
        assert!(validate_runtime_minutes(-1).is_err());
        assert!(validate_runtime_minutes(0).is_ok());
        assert!(validate_runtime_minutes(125).is_ok());
    }
}
