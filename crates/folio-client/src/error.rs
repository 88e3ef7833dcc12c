//! Centralized error types for the client.

use thiserror::Error;

/// Main error type for client-side protocol operations.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Malformed frame: {0}")]
    Malformed(#[from] folio_core::NoticeError),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("WebSocket transport error: {0}")]
    Transport(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("Handler error: {0}")]
    Handler(String),
}

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

impl ClientError {
    /// Create a handler error.
    pub fn handler(msg: impl Into<String>) -> Self {
        Self::Handler(msg.into())
    }
}
