//! Error types and exit codes for knack-sleuth

use std::process::ExitCode;
use thiserror::Error;

use crate::impact::ImpactError;

/// Main error type for knack-sleuth operations
#[derive(Error, Debug)]
pub enum SleuthError {
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Invalid JSON in {source_name}: {message}")]
    InvalidJson {
        source_name: String,
        message: String,
    },

    #[error("Invalid metadata document: {message}")]
    InvalidMetadata { message: String },

    #[error("No application id given. Pass --app-id or set KNACK_APP_ID")]
    MissingAppId,

    #[error("Knack API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{kind} not found: {identifier}")]
    NotFound {
        kind: &'static str,
        identifier: String,
    },

    #[error(transparent)]
    Impact(#[from] ImpactError),

    /// The rendered issue list travels with the error so it is still printed
    #[error("Validation failed with {errors} error-level issue(s)")]
    ValidationFailed { errors: usize, report: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SleuthError {
    /// Convert error to appropriate exit code:
    /// - 0: Success
    /// - 1: File not found / IO error
    /// - 2: Object or field not found
    /// - 3: Invalid metadata document
    /// - 4: Network or API failure
    /// - 5: Configuration error
    /// - 6: Validation found error-level issues
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::FileNotFound { .. } => ExitCode::from(1),
            Self::Io(_) => ExitCode::from(1),
            Self::NotFound { .. } => ExitCode::from(2),
            Self::Impact(_) => ExitCode::from(2),
            Self::InvalidJson { .. } => ExitCode::from(3),
            Self::InvalidMetadata { .. } => ExitCode::from(3),
            Self::Api { .. } => ExitCode::from(4),
            Self::Http(_) => ExitCode::from(4),
            Self::MissingAppId => ExitCode::from(5),
            Self::Config { .. } => ExitCode::from(5),
            Self::ValidationFailed { .. } => ExitCode::from(6),
        }
    }

    /// Command output that should still reach stdout
    pub fn report(&self) -> Option<&str> {
        match self {
            Self::ValidationFailed { report, .. } => Some(report),
            _ => None,
        }
    }
}

/// Result type alias for knack-sleuth operations
pub type Result<T> = std::result::Result<T, SleuthError>;
