// src/domain/errors.rs
use thiserror::Error;

use crate::application::dto::ApplicationError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Order error: {0}")]
    Order(#[from] OrderError),

    #[error("{0}")]
    Application(#[from] ApplicationError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Input stream closed")]
    InputClosed,
}

/// Failures reported by the catalog and the order engine.
///
/// A rejected call never leaves partial changes behind.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OrderError {
    #[error("{0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Index {index} is out of range (1 to {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Invalid state: {0}")]
    InvalidState(String),
}

// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;
pub type OrderResult<T> = Result<T, OrderError>;
