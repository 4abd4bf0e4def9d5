//! Error types for the cart controller
//!
//! This module defines all error types used throughout the workspace.

use thiserror::Error;

/// Result type alias for cart operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the cart controller
///
/// Business failures (`success: false`) are NOT errors: they arrive as a
/// parsed [`MutationResponse`](crate::traits::MutationResponse). Everything
/// here is a transport, parse, or setup failure.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Request could not be sent or the connection failed mid-response
    #[error("HTTP error: {0}")]
    Http(String),

    /// Response body was not a valid cart response
    #[error("Parse error: {0}")]
    Parse(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSRF verification or authentication rejected the request
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Rate limiting errors
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Storefront answered with a 5xx and no usable body
    #[error("Server error: {0}")]
    Server(String),

    /// Full resynchronization could not be triggered
    #[error("Resynchronization failed: {0}")]
    Resync(String),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an HTTP error
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    /// Create a parse error
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Create a forbidden error
    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    /// Create a rate limit error
    pub fn rate_limited(msg: impl Into<String>) -> Self {
        Self::RateLimited(msg.into())
    }

    /// Create a server error
    pub fn server(msg: impl Into<String>) -> Self {
        Self::Server(msg.into())
    }

    /// Create a resynchronization error
    pub fn resync(msg: impl Into<String>) -> Self {
        Self::Resync(msg.into())
    }

    /// Whether the failure happened before a cart response was obtained
    pub fn is_transport(&self) -> bool {
        !matches!(self, Self::Config(_) | Self::Resync(_))
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
