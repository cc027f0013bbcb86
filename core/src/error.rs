//! Error types for the condense API client.
//!
//! # Design
//! Every non-2xx response lands in `Server` with the raw status and body, and
//! the message embeds the body text verbatim so callers can show it as-is.
//! Transport failures carry the underlying mechanism's message.

use thiserror::Error;

/// Errors returned by `CondenseClient` parse methods and `CondenseApi` calls.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server answered with a status outside 200..=299.
    #[error("Server error: {body}")]
    Server { status: u16, body: String },

    /// The request never produced a response (unreachable host, reset
    /// connection, invalid URL).
    #[error("transport failed: {0}")]
    Transport(String),

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl ApiError {
    /// Status code of a `Server` error, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }
}
