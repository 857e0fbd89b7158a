// src/services/outcome.rs
//
// Structured result for write operations at the presentation boundary.
// Service write paths never propagate faults; they report one of these.

use serde::Serialize;

use crate::domain::DomainError;
use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OpResult {
    pub success: bool,
    pub message: String,
}

impl OpResult {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }

    /// Failure outcome for an internal error. Store unavailability is
    /// reported uniformly, invariant violations carry their own message,
    /// everything else gets the caller's message.
    pub fn from_error(error: &AppError, fallback: impl Into<String>) -> Self {
        match error {
            e if e.is_store_unavailable() => Self::fail("Database unavailable"),
            AppError::Domain(DomainError::InvariantViolation(message)) => {
                Self::fail(message.clone())
            }
            _ => {
                log::warn!("operation failed: {}", error);
                Self::fail(fallback)
            }
        }
    }
}
