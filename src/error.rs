//! Error types for the babel relay

use thiserror::Error;

use crate::registry::ConnectionId;

/// Result type alias for relay operations
pub type Result<T> = std::result::Result<T, Error>;

/// Failure classes for a single gateway call
///
/// One attempt per call, no retries; the caller decides how to degrade.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The network call failed outright (connect, send, or non-success status)
    #[error("transport: {0}")]
    Transport(String),

    /// The call succeeded but the expected result text was absent
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

/// Errors that can occur in the relay
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// A connection sent a second join while already registered
    #[error("connection already registered: {0}")]
    DuplicateRegistration(ConnectionId),

    /// Text translation failed
    #[error("translation error: {0}")]
    Gateway(#[from] GatewayError),

    /// Audio transcription (or the translation step of the voice chain) failed
    #[error("transcription error: {0}")]
    Transcription(#[source] GatewayError),

    /// Voice payload was not valid base64
    #[error("invalid audio payload: {0}")]
    InvalidPayload(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}
