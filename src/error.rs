//! Error types for dossier.
//!
//! Defines the crate-wide error enum used by configuration and persistence.
//! Evaluator and handler errors live next to the code that raises them
//! (`commands::pipeline::EvalError`, `commands::handlers::HandlerError`).

use thiserror::Error;

/// Main error type for dossier operations.
#[derive(Error, Debug)]
pub enum DossierError {
    /// Configuration errors (invalid config file, bad modifier character, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data store errors (cannot open database, constraint violations, etc.)
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Filesystem and process errors (temp files, editor, pager).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal application errors (unexpected states, bugs, etc.)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DossierError {
    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates a persistence error with the given message.
    pub fn persistence(msg: impl Into<String>) -> Self {
        Self::Persistence(msg.into())
    }

    /// Creates an internal error with the given message.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Config(_) => "Configuration Error",
            Self::Persistence(_) => "Persistence Error",
            Self::Io(_) => "I/O Error",
            Self::Internal(_) => "Internal Error",
        }
    }
}

/// Result type alias using DossierError.
pub type Result<T> = std::result::Result<T, DossierError>;
