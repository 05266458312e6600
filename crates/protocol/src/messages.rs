//! Realtime wall channel messages.
//!
//! The channel speaks JSON with a `{"type": ..., "data": ...}` envelope in
//! both directions. Parsing is a closed dispatch on the type string; unknown
//! types are surfaced as errors so the caller can log and drop them without
//! tearing down the connection.

use crate::{ProtocolError, StickerId};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Bot identity reported by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotInfo {
    pub username: String,
    /// Optional on the wire; falls back to the username.
    #[serde(default)]
    pub full_name: Option<String>,
}

impl BotInfo {
    /// Display name, preferring the full name when the server sent one.
    pub fn display_name(&self) -> &str {
        self.full_name.as_deref().unwrap_or(&self.username)
    }
}

/// One sticker entry of a `wall_sync` snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncSticker {
    pub sticker_id: StickerId,
    pub path: String,
}

/// Server -> client message.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerMessage {
    /// Bot identity (`bot_info`).
    BotInfo(BotInfo),
    /// Remove every sticker (`wall_clear`).
    WallClear,
    /// Full reload marker (`wall_reload`); carried by clear + add sequences.
    WallReload,
    /// Add one sticker (`sticker_add`).
    StickerAdd { sticker_id: StickerId, path: String },
    /// Remove one sticker (`sticker_remove`).
    StickerRemove { sticker_id: StickerId },
    /// Authoritative snapshot of the server's sticker set (`wall_sync`).
    WallSync(Vec<SyncSticker>),
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    data: Option<serde_json::Value>,
}

fn payload<T: DeserializeOwned>(
    data: Option<serde_json::Value>,
    kind: &'static str,
) -> Result<T, ProtocolError> {
    let value = data.ok_or(ProtocolError::MissingData(kind))?;
    Ok(serde_json::from_value(value)?)
}

impl ServerMessage {
    /// Parse a server message from raw channel text.
    pub fn parse(raw: &str) -> Result<Self, ProtocolError> {
        let envelope: Envelope = serde_json::from_str(raw)?;

        match envelope.kind.as_str() {
            "bot_info" => Ok(ServerMessage::BotInfo(payload(envelope.data, "bot_info")?)),
            "wall_clear" => Ok(ServerMessage::WallClear),
            "wall_reload" => Ok(ServerMessage::WallReload),
            "sticker_add" => {
                #[derive(Deserialize)]
                struct Add {
                    sticker_id: StickerId,
                    path: String,
                }
                let add: Add = payload(envelope.data, "sticker_add")?;
                Ok(ServerMessage::StickerAdd {
                    sticker_id: add.sticker_id,
                    path: add.path,
                })
            }
            "sticker_remove" => {
                #[derive(Deserialize)]
                struct Remove {
                    sticker_id: StickerId,
                }
                let remove: Remove = payload(envelope.data, "sticker_remove")?;
                Ok(ServerMessage::StickerRemove {
                    sticker_id: remove.sticker_id,
                })
            }
            "wall_sync" => Ok(ServerMessage::WallSync(payload(envelope.data, "wall_sync")?)),
            _ => Err(ProtocolError::UnknownType(envelope.kind)),
        }
    }
}

/// Client -> server message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Request the bot identity; sent once per successful connect.
    GetBotInfo,
}

impl ClientMessage {
    /// Encode as channel text.
    pub fn to_json(&self) -> String {
        // Serialization of a tag-only enum cannot fail.
        serde_json::to_string(self).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bot_info() {
        let raw = r#"{"type":"bot_info","data":{"username":"wallbot","full_name":"Wall Bot"}}"#;
        match ServerMessage::parse(raw) {
            Ok(ServerMessage::BotInfo(info)) => {
                assert_eq!(info.username, "wallbot");
                assert_eq!(info.display_name(), "Wall Bot");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn bot_info_without_full_name_falls_back() {
        let raw = r#"{"type":"bot_info","data":{"username":"wallbot"}}"#;
        let msg = ServerMessage::parse(raw).unwrap();
        match msg {
            ServerMessage::BotInfo(info) => assert_eq!(info.display_name(), "wallbot"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn parses_dataless_types() {
        assert_eq!(
            ServerMessage::parse(r#"{"type":"wall_clear"}"#).unwrap(),
            ServerMessage::WallClear
        );
        assert_eq!(
            ServerMessage::parse(r#"{"type":"wall_reload"}"#).unwrap(),
            ServerMessage::WallReload
        );
    }

    #[test]
    fn parses_sticker_add_and_remove() {
        let add = ServerMessage::parse(
            r#"{"type":"sticker_add","data":{"sticker_id":"abc","path":"stickers/abc.webp"}}"#,
        )
        .unwrap();
        assert_eq!(
            add,
            ServerMessage::StickerAdd {
                sticker_id: "abc".into(),
                path: "stickers/abc.webp".into(),
            }
        );

        let remove =
            ServerMessage::parse(r#"{"type":"sticker_remove","data":{"sticker_id":"abc"}}"#)
                .unwrap();
        assert_eq!(
            remove,
            ServerMessage::StickerRemove {
                sticker_id: "abc".into(),
            }
        );
    }

    #[test]
    fn parses_wall_sync() {
        let raw = r#"{"type":"wall_sync","data":[
            {"sticker_id":"a","path":"stickers/a.webp"},
            {"sticker_id":"b","path":"stickers/b.webp"}
        ]}"#;
        match ServerMessage::parse(raw).unwrap() {
            ServerMessage::WallSync(list) => {
                assert_eq!(list.len(), 2);
                assert_eq!(list[0].sticker_id, "a".into());
                assert_eq!(list[1].path, "stickers/b.webp");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn unknown_type_is_an_error() {
        let err = ServerMessage::parse(r#"{"type":"dance_party"}"#).unwrap_err();
        assert!(matches!(err, ProtocolError::UnknownType(t) if t == "dance_party"));
    }

    #[test]
    fn missing_payload_is_an_error() {
        let err = ServerMessage::parse(r#"{"type":"sticker_add"}"#).unwrap_err();
        assert!(matches!(err, ProtocolError::MissingData("sticker_add")));
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(matches!(
            ServerMessage::parse("not json").unwrap_err(),
            ProtocolError::Malformed(_)
        ));
    }

    #[test]
    fn client_message_encoding() {
        assert_eq!(ClientMessage::GetBotInfo.to_json(), r#"{"type":"get_bot_info"}"#);
    }
}
