//! Best-effort local sticker cache.
//!
//! Mirrors the active sticker set into a single JSON file so a restarted
//! session can repopulate the wall. The live registry is authoritative; every
//! operation here is allowed to fail with a warning and nothing else.

use protocol::{CachedSticker, StickerId};
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// File-backed store of [`CachedSticker`] records.
#[derive(Debug)]
pub struct StickerStore {
    path: PathBuf,
}

impl StickerStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// All stored records. Absent or corrupt blob reads as empty.
    pub fn get_all(&self) -> Vec<CachedSticker> {
        let data = match std::fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                warn!("Failed to read sticker cache {:?}: {e}", self.path);
                return Vec::new();
            }
        };
        match serde_json::from_str(&data) {
            Ok(records) => records,
            Err(e) => {
                warn!("Corrupt sticker cache {:?}, starting empty: {e}", self.path);
                Vec::new()
            }
        }
    }

    /// Append one record.
    pub fn save(&self, record: CachedSticker) {
        let mut records = self.get_all();
        let id = record.id.clone();
        records.push(record);
        self.write(&records);
        debug!("Saved sticker to cache: {id}");
    }

    /// Drop the record with the given id, if present.
    pub fn remove(&self, id: &StickerId) {
        let mut records = self.get_all();
        records.retain(|r| r.id != *id);
        self.write(&records);
        debug!("Removed sticker from cache: {id}");
    }

    /// Drop every record.
    pub fn clear(&self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => info!("Cleared sticker cache"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to clear sticker cache {:?}: {e}", self.path),
        }
    }

    fn write(&self, records: &[CachedSticker]) {
        let json = match serde_json::to_string(records) {
            Ok(json) => json,
            Err(e) => {
                warn!("Failed to encode sticker cache: {e}");
                return;
            }
        };
        if let Err(e) = std::fs::write(&self.path, json) {
            warn!("Failed to write sticker cache {:?}: {e}", self.path);
        }
    }
}
