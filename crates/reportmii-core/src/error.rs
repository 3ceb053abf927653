//! Core error types for reportmii-core.
//!
//! This module defines the error hierarchy using thiserror. Wizard errors are
//! recoverable user-facing rejections; storage, config and integration errors
//! come from collaborators and never leave a session in a corrupted state.

use std::path::PathBuf;
use thiserror::Error;

use crate::wizard::WizardStep;

/// Core error type for reportmii-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Wizard rule violations (bad answers, forbidden block edits)
    #[error("{0}")]
    Wizard(#[from] WizardError),

    /// Persistence-related errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Checkout/notification collaborator errors
    #[error("Integration error: {0}")]
    Integration(#[from] IntegrationError),
}

/// Errors raised by wizard operations on a session.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WizardError {
    /// Requested a catalog that does not exist
    #[error("Unknown catalog kind: {0}")]
    InvalidCatalogKind(String),

    /// Answer rejected by the question's validation rule
    #[error("Invalid answer for question {question} of block '{block}': {reason}")]
    InvalidAnswerValue {
        block: String,
        question: usize,
        reason: String,
    },

    /// Only custom blocks may be removed
    #[error("Block '{0}' is part of the catalog and cannot be removed")]
    CannotRemoveBuiltinBlock(String),

    #[error("Block not found: {0}")]
    UnknownBlock(String),

    #[error("Block '{block}' has no question at index {index}")]
    UnknownQuestion { block: String, index: usize },

    /// Invalid input value for a named field
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },

    /// Operation is not available at the session's current step
    #[error("Cannot {action} at step {step}")]
    WrongStep { action: String, step: WizardStep },

    /// The analysis was already submitted and is read-only
    #[error("Analysis {0} was already submitted")]
    AlreadySubmitted(String),
}

/// Persistence errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(#[from] rusqlite::Error),

    /// Stored payload could not be encoded or decoded
    #[error("Corrupt payload: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Data directory unavailable: {0}")]
    DataDir(String),

    #[error("Analysis not found: {0}")]
    NotFound(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Errors from external collaborators (checkout, notifications).
#[derive(Error, Debug)]
pub enum IntegrationError {
    /// Collaborator could not be reached or refused the request
    #[error("{service} unavailable: {message}")]
    Unavailable { service: String, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("{service} is not configured")]
    NotConfigured { service: String },
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseFailed(err.to_string())
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Storage(StorageError::QueryFailed(err))
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
