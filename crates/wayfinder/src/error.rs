//! Error types for wayfinder.
//!
//! This module defines all error types used throughout the wayfinder crate,
//! providing detailed context for debugging and user-friendly error messages.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for wayfinder operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Storage Errors ===
    /// Failed to open or create the preference database.
    #[error("failed to open preference database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// Failed to run database migrations.
    #[error("database migration failed: {message}")]
    DatabaseMigration {
        /// Description of what went wrong.
        message: String,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Engine Errors ===
    /// The positioning engine rejected the authorization token.
    #[error("engine authorization failed: {message}")]
    Authorization {
        /// Description of the rejection.
        message: String,
    },

    /// An engine command was issued before authorization completed.
    #[error("engine is not authorized")]
    NotAuthorized,

    /// The user or platform denied a required permission.
    #[error("permission denied: {permission}. {instructions}")]
    PermissionDenied {
        /// Name of the required permission.
        permission: String,
        /// Instructions for granting the permission.
        instructions: String,
    },

    /// A positioning-engine operation failed.
    #[error("engine error: {0}")]
    Engine(String),

    // === Session Errors ===
    /// The privacy policy has not been accepted yet.
    #[error("privacy policy has not been accepted")]
    PolicyNotAccepted,

    /// The requested destination does not exist in the venue.
    #[error("unknown destination '{id}'")]
    UnknownDestination {
        /// Identifier that failed to resolve.
        id: String,
    },

    // === Preference Errors ===
    /// A preference key outside the known set was supplied.
    #[error("unknown preference key '{key}'")]
    UnknownPreferenceKey {
        /// The offending key.
        key: String,
    },

    /// A preference value could not be parsed for its key.
    #[error("invalid value '{value}' for preference '{key}'")]
    InvalidPreferenceValue {
        /// The preference key.
        key: String,
        /// The rejected value.
        value: String,
    },

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Generic Errors ===
    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for wayfinder operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a new engine error.
    #[must_use]
    pub fn engine(message: impl Into<String>) -> Self {
        Self::Engine(message.into())
    }

    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Create an authorization failure.
    #[must_use]
    pub fn authorization(message: impl Into<String>) -> Self {
        Self::Authorization {
            message: message.into(),
        }
    }

    /// Create a permission denied error with instructions.
    #[must_use]
    pub fn permission_denied(
        permission: impl Into<String>,
        instructions: impl Into<String>,
    ) -> Self {
        Self::PermissionDenied {
            permission: permission.into(),
            instructions: instructions.into(),
        }
    }

    /// Create an unknown destination error.
    #[must_use]
    pub fn unknown_destination(id: impl Into<String>) -> Self {
        Self::UnknownDestination { id: id.into() }
    }

    /// Create an invalid preference value error.
    #[must_use]
    pub fn invalid_preference(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidPreferenceValue {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Check if this error means the policy gate is still closed.
    #[must_use]
    pub fn is_policy_not_accepted(&self) -> bool {
        matches!(self, Self::PolicyNotAccepted)
    }

    /// Check if this error is a permission issue.
    #[must_use]
    pub fn is_permission_error(&self) -> bool {
        matches!(self, Self::PermissionDenied { .. })
    }
}
