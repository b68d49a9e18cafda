//! Error types for the ticket form engine

use thiserror::Error;

use crate::config::ConfigError;
use crate::domain::aggregates::steps::NavigatorError;
use crate::domain::value_objects::RuleParseError;
use crate::ports::outbound::{StorageError, SubmitError};

/// Crate-level error type
#[derive(Error, Debug)]
pub enum FormError {
    /// Rule list could not be parsed
    #[error("rule error: {0}")]
    Rule(#[from] RuleParseError),

    /// Invalid or unreadable configuration
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// Draft storage failure
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Submission failed
    #[error("submit error: {0}")]
    Submit(#[from] SubmitError),

    /// Step navigator misconfigured
    #[error("navigator error: {0}")]
    Navigator(#[from] NavigatorError),

    /// No control with this name
    #[error("field not found: {0}")]
    FieldNotFound(String),
}

/// Result type for form operations
pub type Result<T> = std::result::Result<T, FormError>;
