//! Protocol error types.

use thiserror::Error;

/// Errors that can occur while decoding channel messages.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("Unknown message type: {0:?}")]
    UnknownType(String),

    #[error("Missing payload for message type: {0:?}")]
    MissingData(&'static str),

    #[error("Malformed message: {0}")]
    Malformed(#[from] serde_json::Error),
}
