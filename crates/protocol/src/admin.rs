//! Admin HTTP API types.
//!
//! Records returned by the moderation endpoints and the request bodies the
//! admin client sends. Authentication is a bearer token handled by the
//! client, not modeled here.

use serde::{Deserialize, Serialize};

/// One row of the admin sticker listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StickerRecord {
    pub sticker_id: String,
    pub file_path: String,
    pub enabled: bool,
    /// Submitters; a sticker can be sent by several users.
    #[serde(default)]
    pub telegram: Vec<TelegramUser>,
}

/// Submitter identity attached to a sticker record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelegramUser {
    pub user: String,
    pub id: String,
}

/// Moderation verbs accepted by the admin API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModerationAction {
    Ban,
    Unban,
    Hide,
    Show,
}

impl ModerationAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModerationAction::Ban => "ban",
            ModerationAction::Unban => "unban",
            ModerationAction::Hide => "hide",
            ModerationAction::Show => "show",
        }
    }
}

impl std::fmt::Display for ModerationAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of `POST /api/stickers/{uuid}`; the sticker is named by the route.
#[derive(Debug, Clone, Serialize)]
pub struct ModerationRequest {
    #[serde(rename = "type")]
    pub action: ModerationAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_listing_row() {
        let raw = r#"{
            "sticker_id": "abc",
            "file_path": "stickers/abc.webp",
            "enabled": true,
            "telegram": [
                {"user": "alice", "id": "42"},
                {"user": "bob", "id": "43"}
            ]
        }"#;
        let record: StickerRecord = serde_json::from_str(raw).unwrap();
        assert!(record.enabled);
        assert_eq!(record.telegram[0].user, "alice");
        assert_eq!(record.telegram[1].id, "43");
    }

    #[test]
    fn submitters_default_to_empty() {
        let raw = r#"{"sticker_id":"abc","file_path":"stickers/abc.webp","enabled":false}"#;
        let record: StickerRecord = serde_json::from_str(raw).unwrap();
        assert!(record.telegram.is_empty());
    }

    #[test]
    fn moderation_body_is_typed_and_omits_absent_reason() {
        let body = ModerationRequest {
            action: ModerationAction::Hide,
            reason: None,
        };
        let json = serde_json::to_string(&body).unwrap();
        assert_eq!(json, r#"{"type":"hide"}"#);

        let body = ModerationRequest {
            action: ModerationAction::Ban,
            reason: Some("spam".into()),
        };
        let json = serde_json::to_string(&body).unwrap();
        assert_eq!(json, r#"{"type":"ban","reason":"spam"}"#);
    }
}
