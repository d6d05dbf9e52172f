//! Error handling module for TrimX

use thiserror::Error;

/// Main error type for TrimX operations
#[derive(Error, Debug)]
pub enum TrimXError {
    /// External media tool could not be resolved
    #[error("{tool} not found (checked: {searched})")]
    ToolNotFound { tool: String, searched: String },

    /// External media tool was found but could not be started
    #[error("Failed to start {tool}: {source}")]
    ToolSpawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    /// Invalid time format
    #[error("Invalid time format: {time}. Expected HH:MM:SS.ms, MM:SS.ms, or seconds")]
    InvalidTimeFormat { time: String },

    /// Clip request rejected before any process was started
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    /// A probe run exited unsuccessfully
    #[error("Failed to probe media file: {message}")]
    ProbeError { message: String },

    /// A run was stopped through the cancellation signal
    #[error("Operation cancelled")]
    Cancelled,

    /// Configuration file or override could not be applied
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl TrimXError {
    /// Fatal errors abort the caller's job queue instead of being reported per clip
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            TrimXError::ToolNotFound { .. } | TrimXError::ToolSpawn { .. }
        )
    }

    pub(crate) fn invalid_request(message: impl Into<String>) -> Self {
        TrimXError::InvalidRequest {
            message: message.into(),
        }
    }
}

/// Result type alias for TrimX operations
pub type TrimXResult<T> = std::result::Result<T, TrimXError>;
