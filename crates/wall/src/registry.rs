//! In-memory sticker registry.
//!
//! Holds the active sticker list (insertion order, used for FIFO eviction)
//! and the set of ids whose image is still loading. Pure bookkeeping; the
//! session drives world and cache side effects around it.

use crate::physics::BodyId;
use protocol::StickerId;
use std::collections::HashMap;

/// Pixel dimensions of a loaded sticker image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageHandle {
    pub width: u32,
    pub height: u32,
}

/// One live sticker on the wall.
#[derive(Debug)]
pub struct Sticker {
    pub id: StickerId,
    pub path: String,
    pub image: ImageHandle,
    /// Paired physics body; replaced wholesale when sizes change.
    pub body: BodyId,
    pub scale: f32,
    pub alpha: f32,
}

#[derive(Debug, Default)]
pub struct StickerRegistry {
    active: Vec<Sticker>,
    pending: HashMap<StickerId, String>,
}

impl StickerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// True if the id is active or still loading.
    pub fn has(&self, id: &StickerId) -> bool {
        self.pending.contains_key(id) || self.active.iter().any(|s| s.id == *id)
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Mark an id as loading. Returns false if already known.
    pub fn begin_pending(&mut self, id: StickerId, path: String) -> bool {
        if self.has(&id) {
            return false;
        }
        self.pending.insert(id, path);
        true
    }

    /// Claim a completed load. None means the id was removed while loading.
    pub fn take_pending(&mut self, id: &StickerId) -> Option<String> {
        self.pending.remove(id)
    }

    /// Forget a pending load without materializing it.
    pub fn cancel_pending(&mut self, id: &StickerId) -> bool {
        self.pending.remove(id).is_some()
    }

    pub fn insert(&mut self, sticker: Sticker) {
        self.active.push(sticker);
    }

    /// Remove by id, returning the entry so the caller can tear down its body.
    pub fn remove(&mut self, id: &StickerId) -> Option<Sticker> {
        let index = self.active.iter().position(|s| s.id == *id)?;
        Some(self.active.remove(index))
    }

    /// Drain the whole active list.
    pub fn take_all(&mut self) -> Vec<Sticker> {
        std::mem::take(&mut self.active)
    }

    pub fn get(&self, id: &StickerId) -> Option<&Sticker> {
        self.active.iter().find(|s| s.id == *id)
    }

    pub fn get_mut(&mut self, id: &StickerId) -> Option<&mut Sticker> {
        self.active.iter_mut().find(|s| s.id == *id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sticker> {
        self.active.iter()
    }

    pub fn stickers_mut(&mut self) -> &mut [Sticker] {
        &mut self.active
    }

    pub fn ids(&self) -> Vec<StickerId> {
        self.active.iter().map(|s| s.id.clone()).collect()
    }
}
