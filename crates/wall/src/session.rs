//! The wall session.
//!
//! One `WallSession` owns everything a running wall needs: configuration,
//! the physics world, the sticker registry, the wall controller, animations
//! and the local cache. Channel events, load completions and timers all
//! funnel into methods taking an explicit `now_ms`, so a test can drive a
//! whole session from a virtual clock.
//!
//! Side-effect order for every sticker mutation is fixed: physics world
//! first, then the registry list, then the cache.

use crate::animation::AnimationManager;
use crate::cache::StickerStore;
use crate::config::Config;
use crate::loader::{ImageLoader, LoadedImage};
use crate::physics::Physics;
use crate::registry::{Sticker, StickerRegistry};
use crate::world::WallController;
use glam::Vec2;
use protocol::{BotInfo, CachedSticker, Point, ServerMessage, StickerId, SyncSticker};
use tracing::{debug, info, warn};

#[derive(Debug)]
struct PendingSync {
    apply_at_ms: u64,
    stickers: Vec<SyncSticker>,
}

pub struct WallSession {
    config: Config,
    physics: Box<dyn Physics>,
    registry: StickerRegistry,
    controller: WallController,
    animations: AnimationManager,
    store: StickerStore,
    bot: Option<BotInfo>,
    pending_sync: Option<PendingSync>,
    next_sweep_ms: u64,
}

impl WallSession {
    pub fn new(config: Config, mut physics: Box<dyn Physics>, now_ms: u64) -> Self {
        let mut controller = WallController::new(config.display.width, config.display.height);
        controller.resize(
            physics.as_mut(),
            config.display.width,
            config.display.height,
            &config.world.walls,
        );
        physics.set_gravity(Vec2::new(config.world.gravity.x, config.world.gravity.y));

        let registry = StickerRegistry::new();
        let animations = AnimationManager::new(config.animations.clone());
        let store = StickerStore::new(config.cache.path.clone());
        let next_sweep_ms = now_ms + config.animations.protection.check_interval_ms;

        Self {
            config,
            physics,
            registry,
            controller,
            animations,
            store,
            bot: None,
            pending_sync: None,
            next_sweep_ms,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn bot(&self) -> Option<&BotInfo> {
        self.bot.as_ref()
    }

    pub fn sticker_count(&self) -> usize {
        self.registry.len()
    }

    pub fn stickers(&self) -> impl Iterator<Item = &Sticker> {
        self.registry.iter()
    }

    pub fn has_sticker(&self, id: &StickerId) -> bool {
        self.registry.has(id)
    }

    pub fn physics(&self) -> &dyn Physics {
        self.physics.as_ref()
    }

    pub fn controller(&self) -> &WallController {
        &self.controller
    }

    /// Apply one channel message.
    pub fn handle_message(
        &mut self,
        message: ServerMessage,
        loader: &mut dyn ImageLoader,
        now_ms: u64,
    ) {
        match message {
            ServerMessage::BotInfo(info) => {
                info!("Bot identity: @{}", info.username);
                self.bot = Some(info);
            }
            ServerMessage::WallClear => self.remove_all(),
            ServerMessage::WallReload => {
                // Carried out by the clear + add sequence that follows.
                debug!("Wall reload announced");
            }
            ServerMessage::StickerAdd { sticker_id, path } => {
                self.add_sticker(sticker_id, &path, loader)
            }
            ServerMessage::StickerRemove { sticker_id } => self.remove_sticker(&sticker_id),
            ServerMessage::WallSync(stickers) => {
                info!(
                    "Sync requested with {} stickers, applying in {}ms",
                    stickers.len(),
                    self.config.network.sync_grace_ms
                );
                self.pending_sync = Some(PendingSync {
                    apply_at_ms: now_ms + self.config.network.sync_grace_ms,
                    stickers,
                });
            }
        }
    }

    /// Begin adding a sticker. The wall mutates only once the image load
    /// completes; duplicates are refused here.
    pub fn add_sticker(&mut self, id: StickerId, path: &str, loader: &mut dyn ImageLoader) {
        if !self.registry.begin_pending(id.clone(), path.to_string()) {
            warn!("Duplicate sticker ignored: {id}");
            return;
        }
        debug!("Adding new sticker: {path}");
        loader.request(id, path);
    }

    /// Continuation of [`add_sticker`](Self::add_sticker), called with the
    /// load result. Re-checks the id is still wanted before touching any
    /// state, so a remove that raced the load wins.
    pub fn finish_load(&mut self, loaded: LoadedImage, now_ms: u64) {
        let id = loaded.id;
        let Some(path) = self.registry.take_pending(&id) else {
            debug!("Load finished for a removed sticker, dropping: {id}");
            return;
        };
        let image = match loaded.result {
            Ok(image) => image,
            Err(e) => {
                warn!("Failed to load sticker image {id}: {e}");
                return;
            }
        };

        // Size for the grown population and resize everyone first.
        let target = self
            .controller
            .target_size(self.registry.len(), &self.config.stickers);
        self.controller.propagate_sizes(
            self.physics.as_mut(),
            self.registry.stickers_mut(),
            target,
            &self.config.stickers,
        );

        let body = self.controller.spawn_sticker_body(
            self.physics.as_mut(),
            image,
            target,
            &self.config.stickers,
        );
        let record = self.physics.body(body).map(|state| CachedSticker {
            id: id.clone(),
            path: path.clone(),
            position: Point::new(state.position.x, state.position.y),
            angle: state.angle,
            velocity: Point::new(state.velocity.x, state.velocity.y),
        });

        let mut sticker = Sticker {
            id: id.clone(),
            path,
            image,
            body,
            scale: 1.0,
            alpha: 1.0,
        };
        self.animations.start(&mut sticker, now_ms);
        self.registry.insert(sticker);
        if let Some(record) = record {
            self.store.save(record);
        }
        debug!("Created sticker {id}");

        // Over capacity: the earliest-inserted sticker makes room.
        if self.registry.len() > self.config.stickers.max_count {
            let oldest = self.registry.iter().next().map(|s| (s.id.clone(), s.body));
            if let Some((old_id, old_body)) = oldest {
                self.physics.remove_body(old_body);
                self.registry.remove(&old_id);
                self.animations.forget(&old_id);
                self.store.remove(&old_id);
                info!("Evicted oldest sticker: {old_id}");
            }
        }
    }

    /// Remove one sticker, then resize the remainder.
    pub fn remove_sticker(&mut self, id: &StickerId) {
        if self.registry.cancel_pending(id) {
            debug!("Cancelled pending sticker: {id}");
            return;
        }
        let Some(body) = self.registry.get(id).map(|s| s.body) else {
            return;
        };

        self.physics.remove_body(body);
        self.registry.remove(id);
        self.animations.forget(id);
        self.store.remove(id);

        let target = self
            .controller
            .target_size(self.registry.len(), &self.config.stickers);
        self.controller.propagate_sizes(
            self.physics.as_mut(),
            self.registry.stickers_mut(),
            target,
            &self.config.stickers,
        );
        debug!("Removed sticker: {id}");
    }

    /// Remove every sticker and clear the cache. Walls stay.
    pub fn remove_all(&mut self) {
        let bodies: Vec<_> = self.registry.iter().map(|s| s.body).collect();
        for body in bodies {
            self.physics.remove_body(body);
        }
        for sticker in self.registry.take_all() {
            self.animations.forget(&sticker.id);
        }
        self.store.clear();
        info!("Removed all stickers");
    }

    /// Replay the cache into a fresh wall.
    pub fn restore(&mut self, loader: &mut dyn ImageLoader) {
        let records = self.store.get_all();
        info!("Restoring {} stickers", records.len());
        self.remove_all();
        for record in records {
            self.add_sticker(record.id, &record.path, loader);
        }
    }

    /// Recreate walls for a new canvas size.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.config.display.width = width;
        self.config.display.height = height;
        self.controller
            .resize(self.physics.as_mut(), width, height, &self.config.world.walls);
    }

    fn apply_sync(&mut self, stickers: Vec<SyncSticker>, loader: &mut dyn ImageLoader) {
        info!("Running sync reconciliation now");
        let server_ids: std::collections::HashSet<&StickerId> =
            stickers.iter().map(|s| &s.sticker_id).collect();

        let stale: Vec<StickerId> = self
            .registry
            .ids()
            .into_iter()
            .filter(|id| !server_ids.contains(id))
            .collect();
        for id in stale {
            self.remove_sticker(&id);
        }

        for sticker in stickers {
            if !self.registry.has(&sticker.sticker_id) {
                info!("Adding new sticker from sync: {}", sticker.sticker_id);
                self.add_sticker(sticker.sticker_id, &sticker.path, loader);
            }
        }
    }

    /// Fixed-rate step: drain load completions, fire elapsed timers, advance
    /// physics and apply collision reactions.
    pub fn step(&mut self, now_ms: u64, dt_ms: u64, loader: &mut dyn ImageLoader) {
        for loaded in loader.poll() {
            self.finish_load(loaded, now_ms);
        }

        if let Some(pending) = &self.pending_sync {
            if now_ms >= pending.apply_at_ms {
                let stickers = match self.pending_sync.take() {
                    Some(pending) => pending.stickers,
                    None => Vec::new(),
                };
                self.apply_sync(stickers, loader);
            }
        }

        if now_ms >= self.next_sweep_ms {
            self.animations.sweep(self.registry.stickers_mut());
            self.next_sweep_ms = now_ms + self.config.animations.protection.check_interval_ms;
        }

        self.controller
            .tick_gravity(self.physics.as_mut(), now_ms, &self.config.world.gravity);

        let events = self.physics.step(dt_ms);
        self.controller
            .handle_collisions(self.physics.as_mut(), &events, &self.config.world.walls);
    }

    /// Advance fly-in animations; called once per rendered frame.
    pub fn advance_animations(&mut self, now_ms: u64) {
        self.animations.tick(now_ms, self.registry.stickers_mut());
    }

    /// Random gravity pulse; reverts automatically after the configured time.
    pub fn apply_random_gravity(&mut self, now_ms: u64) {
        self.controller
            .apply_random_gravity(self.physics.as_mut(), now_ms, &self.config.world.gravity);
    }

    pub fn pointer_down(&mut self, point: Vec2) -> bool {
        if !self.config.mouse.enable {
            return false;
        }
        self.controller.begin_drag(self.physics.as_ref(), point)
    }

    pub fn pointer_move(&mut self, point: Vec2) {
        self.controller
            .drag_to(self.physics.as_mut(), point, self.config.mouse.stiffness);
    }

    pub fn pointer_up(&mut self) {
        self.controller
            .end_drag(self.physics.as_mut(), self.config.mouse.throw_multiplier);
    }
}
