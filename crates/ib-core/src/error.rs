//! # AppError
//!
//! Centralized error taxonomy for the Ironboard ecosystem.
//! Every store and media operation reports through these four variants.

use thiserror::Error;

/// The primary error type for all ib-core operations.
#[derive(Error, Debug)]
pub enum AppError {
    /// An id did not resolve to a row (e.g., Post, Section, User).
    /// Distinct from a validation error: the request was well-formed.
    #[error("{0} not found with id {1}")]
    NotFound(String, String),

    /// Caller-supplied argument outside its contractual range
    /// (bad page, non-positive size, malformed image ref).
    /// The message names the valid bound. Never retried.
    #[error("validation error: {0}")]
    Validation(String),

    /// Storage-engine constraint violation: duplicate unique key or
    /// dangling foreign key. Surfaced, never silently ignored.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Infrastructure failure (pool exhausted, I/O error, hash failure).
    #[error("internal service error: {0}")]
    Internal(String),
}

impl AppError {
    /// Shorthand for a `NotFound` naming the entity kind and its id.
    pub fn not_found(entity: &str, id: impl ToString) -> Self {
        AppError::NotFound(entity.to_string(), id.to_string())
    }
}

/// A specialized Result type for Ironboard logic.
pub type Result<T> = std::result::Result<T, AppError>;
