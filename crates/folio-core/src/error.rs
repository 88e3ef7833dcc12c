//! Centralized error types for the wire model.

use thiserror::Error;

/// Errors raised while encoding or decoding notices.
#[derive(Error, Debug)]
pub enum NoticeError {
    #[error("Malformed notice frame: {0}")]
    MalformedFrame(#[from] serde_json::Error),
}

/// Result type for wire-model operations.
pub type NoticeResult<T> = Result<T, NoticeError>;
