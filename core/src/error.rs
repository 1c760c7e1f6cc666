//! Error types for the Aventura API clients.
//!
//! # Design
//! `NotFound` gets a dedicated variant because callers distinguish "the post
//! is gone" from "the server refused." Every other non-2xx response lands in
//! `Http` with the raw status and body. `Transport` is the only variant
//! produced when no response arrived at all, so it carries no status.

use serde::Deserialize;

/// Errors returned by the build and parse methods and by transports.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// No response was received: connection refused, DNS, timeout.
    #[error("transport failed: {0}")]
    Transport(String),

    /// The server returned 404.
    #[error("resource not found")]
    NotFound,

    /// The server returned a non-2xx status other than 404.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The response body could not be decoded into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be encoded as JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The payload was rejected before any request was built.
    #[error("invalid payload: {0}")]
    InvalidPayload(String),
}

#[derive(Deserialize)]
struct MessageBody {
    message: String,
}

impl ApiError {
    /// Status code of the response behind this error, if there was one.
    pub const fn status(&self) -> Option<u16> {
        match self {
            ApiError::NotFound => Some(404),
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The `message` field of a JSON error body, as the user service sends
    /// on rejected register, login and follow calls.
    pub fn server_message(&self) -> Option<String> {
        let ApiError::Http { body, .. } = self else {
            return None;
        };
        if let Ok(parsed) = serde_json::from_str::<MessageBody>(body) {
            return Some(parsed.message);
        }
        // Plain-text bodies are the message; unrelated JSON is not.
        let text = body.trim();
        if text.is_empty() || text.starts_with('{') {
            None
        } else {
            Some(text.to_string())
        }
    }

    pub const fn is_transport(&self) -> bool {
        matches!(self, ApiError::Transport(_))
    }
}
