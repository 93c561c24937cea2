//! Error types for boardview
//!
//! The filter, aggregate and distinct-value passes are total and never fail.
//! These errors only arise at the boundary: loading records, parsing
//! timestamps, and validating caller-supplied filter state.

use thiserror::Error;

/// Result type alias for boardview operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for boardview
#[derive(Debug, Error)]
pub enum Error {
    // ==========================================================================
    // Validation Errors
    // ==========================================================================
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Unknown dimension '{dimension}' for {kind}")]
    UnknownDimension { kind: String, dimension: String },

    #[error("Invalid timestamp: {0}. Expected YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS")]
    InvalidTimestamp(String),

    // ==========================================================================
    // I/O Errors
    // ==========================================================================
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Returns the error type string (for JSON output)
    #[must_use]
    pub const fn error_type(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) | Self::InvalidTimestamp(_) => "INVALID_ARGUMENT",
            Self::UnknownDimension { .. } => "NOT_FOUND",
            Self::Io(_) => "OS_ERROR",
            Self::Serialization(_) => "TYPE_ERROR",
        }
    }

    /// Returns whether the caller can fix the error and retry
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::InvalidArgument(_)
                | Self::UnknownDimension { .. }
                | Self::InvalidTimestamp(_)
                | Self::Serialization(_)
        )
    }
}
