//! Local cache records.
//!
//! The wall keeps a best-effort JSON mirror of its active sticker set so a
//! restarted session can repopulate itself without waiting for the server.

use crate::StickerId;
use serde::{Deserialize, Serialize};

/// Plain 2D point, the `{x, y}` shape used by the cache blob.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Serializable projection of one live sticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedSticker {
    pub id: StickerId,
    pub path: String,
    pub position: Point,
    pub angle: f32,
    pub velocity: Point,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_round_trips() {
        let record = CachedSticker {
            id: "abc".into(),
            path: "stickers/abc.webp".into(),
            position: Point::new(120.0, 64.5),
            angle: 0.25,
            velocity: Point::new(-1.5, 0.2),
        };
        let json = serde_json::to_string(&record).unwrap();
        let back: CachedSticker = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }
}
