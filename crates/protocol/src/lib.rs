//! Shared protocol crate for the sticker wall.
//!
//! This crate contains:
//! - Realtime channel message definitions (JSON `{type, data}` envelope)
//! - Local cache record types
//! - Admin HTTP API records and request bodies

pub mod admin;
mod cache;
mod error;
mod messages;

pub use cache::{CachedSticker, Point};
pub use error::ProtocolError;
pub use messages::{BotInfo, ClientMessage, ServerMessage, SyncSticker};

use serde::{Deserialize, Serialize};

/// Opaque sticker identity, assigned by the server.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StickerId(pub String);

impl StickerId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for StickerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StickerId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for StickerId {
    fn from(s: String) -> Self {
        Self(s)
    }
}
