//! Error types for cfddns
//!
//! This module defines the error type shared by the core and the
//! resolver/provider crates. Cycle-level failures are wrapped in
//! [`crate::controller::SyncError`].

use thiserror::Error;

/// Result type alias for cfddns operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type
#[derive(Error, Debug)]
pub enum Error {
    /// The public address could not be determined
    #[error("Address resolution failed: {0}")]
    ResolutionFailed(String),

    /// The DNS provider rejected or could not process an update
    #[error("Record update failed ({provider}): {message}")]
    UpdateFailed {
        /// Provider name
        provider: String,
        /// Error message, including the provider's error payload
        message: String,
    },

    /// State store read/write errors
    #[error("State store error: {0}")]
    StateStore(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP transport errors
    #[error("HTTP error: {0}")]
    Http(String),

    /// Authentication errors
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Rate limiting errors
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Zone or record not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Provider-specific error
    #[error("Provider error ({provider}): {message}")]
    Provider {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },
}

impl Error {
    /// Create an address resolution error
    pub fn resolution(msg: impl Into<String>) -> Self {
        Self::ResolutionFailed(msg.into())
    }

    /// Create a record update error
    pub fn update_failed(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::UpdateFailed {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create a state store error
    pub fn state_store(msg: impl Into<String>) -> Self {
        Self::StateStore(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an HTTP error
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    /// Create an authentication error
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    /// Create a rate limit error
    pub fn rate_limited(msg: impl Into<String>) -> Self {
        Self::RateLimited(msg.into())
    }

    /// Create a "not found" error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a provider-specific error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }
}
