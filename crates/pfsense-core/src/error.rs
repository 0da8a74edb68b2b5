//! Error types for pfSense operations.
//!
//! Every lifecycle operation returns this single error type. Nothing is retried or
//! suppressed; the declarative framework decides how to report each variant.

use thiserror::Error;

/// Main error type for pfSense operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Network, DNS or TLS failure while talking to the appliance
    #[error("Transport error: {0}")]
    Transport(String),

    /// Request exceeded the client-wide timeout
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// A read request came back with a non-success status
    #[error("Unexpected response status {status}: {body}")]
    UnexpectedStatus {
        /// HTTP status code
        status: u16,
        /// Raw response body
        body: String,
    },

    /// A write request reached the appliance but was refused
    #[error("Request rejected by appliance with status {status}: {body}")]
    RemoteRejected {
        /// HTTP status code
        status: u16,
        /// Raw response body
        body: String,
    },

    /// The addressed object does not exist (any more)
    #[error("Not found: {0}")]
    NotFound(String),

    /// An ordinal points past the end of the current list
    #[error("Index {index} out of range for list of length {len}")]
    IndexOutOfRange {
        /// Requested position
        index: usize,
        /// Length of the fetched list
        len: usize,
    },

    /// A resource identifier does not match its expected pattern
    #[error("Malformed identifier: {0}")]
    MalformedIdentifier(String),

    /// The token exchange failed or returned no token
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The object about to be created already exists
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Failed to decode an API response
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Invalid endpoint
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),
}

/// Specialized result type for pfSense operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Returns the error code for this error type.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Transport(_) => "TRANSPORT_ERROR",
            Self::Timeout(_) => "TIMEOUT",
            Self::UnexpectedStatus { .. } => "UNEXPECTED_STATUS",
            Self::RemoteRejected { .. } => "REMOTE_REJECTED",
            Self::NotFound(_) => "NOT_FOUND",
            Self::IndexOutOfRange { .. } => "INDEX_OUT_OF_RANGE",
            Self::MalformedIdentifier(_) => "MALFORMED_IDENTIFIER",
            Self::AuthenticationFailed(_) => "AUTHENTICATION_FAILED",
            Self::Conflict(_) => "CONFLICT",
            Self::ParseError(_) => "PARSE_ERROR",
            Self::ConfigError(_) => "CONFIG_ERROR",
            Self::InvalidEndpoint(_) => "INVALID_ENDPOINT",
            Self::ValidationError(_) => "VALIDATION_ERROR",
        }
    }

    /// Returns true when the caller should drop its stored identifier.
    ///
    /// A missing object means the record is gone; a malformed identifier can never
    /// address anything, so keeping it only repeats the failure on the next refresh.
    #[must_use]
    pub const fn clears_identifier(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::MalformedIdentifier(_))
    }

    /// Returns true if this error should be logged as a serious error.
    #[must_use]
    pub const fn should_log(&self) -> bool {
        matches!(
            self,
            Self::AuthenticationFailed(_)
                | Self::ConfigError(_)
                | Self::ValidationError(_)
                | Self::RemoteRejected { .. }
                | Self::ParseError(_)
        )
    }
}

// Conversions from external error types
impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_decode() {
            Self::ParseError(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::ValidationError(err.to_string())
    }
}
