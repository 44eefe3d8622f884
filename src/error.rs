use thiserror::Error;
use std::io;

/// Custom result type alias for the crate
pub type Result<T> = std::result::Result<T, ScribeError>;

/// Errors that can occur while transcribing a repository
#[derive(Debug, Error)]
pub enum ScribeError {
    /// The input URL could not be resolved to an owner and repository
    #[error("Invalid repository reference: {0}")]
    InvalidReference(String),

    /// The upstream API throttled us and retries were exhausted
    #[error("GitHub API rate limit exceeded for '{path}' (status {status})")]
    RateLimited {
        /// Display path of the listing that was throttled
        path: String,
        /// HTTP status of the last response
        status: u16,
    },

    /// The upstream API refused the request for lack of credentials
    #[error("GitHub API authentication required for '{path}' (status {status})")]
    AuthRequired {
        /// Display path of the listing that was refused
        path: String,
        /// HTTP status of the response
        status: u16,
    },

    /// The directory sits below the configured recursion bound
    #[error("max recursion depth {max_depth} reached for {path}")]
    DepthExceeded {
        /// Display path of the skipped directory
        path: String,
        /// Configured depth bound
        max_depth: i32,
    },

    /// Any non-2xx response that is not a throttling or auth signal
    #[error("GitHub API error response for '{path}': {status}")]
    Upstream {
        /// Display path of the failing listing
        path: String,
        /// HTTP status of the response
        status: u16,
    },

    /// The listing payload was not a valid sequence of entries
    #[error("Failed to decode listing for '{path}': {source}")]
    Decode {
        /// Display path of the listing
        path: String,
        /// Underlying JSON error
        source: serde_json::Error,
    },

    /// Network or connection failure
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Result packaging failure
    #[error("JSON error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The traversal was cancelled by the host
    #[error("Transcription cancelled")]
    Cancelled,

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(String),

    /// I/O errors
    #[error("IO error: {0}")]
    IO(#[from] io::Error),
}

impl ScribeError {
    /// Creates an invalid-reference error with the specified message
    pub fn invalid_reference(message: impl Into<String>) -> Self {
        Self::InvalidReference(message.into())
    }

    /// Checks if this error is a throttling or credentials condition
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, Self::RateLimited { .. } | Self::AuthRequired { .. })
    }

    /// Checks if this error must abort every enclosing directory
    ///
    /// Everything else is contained at the level where it occurred.
    pub fn is_fatal(&self) -> bool {
        self.is_rate_limit() || matches!(self, Self::Cancelled)
    }
}
