//! Fly-in animations with stuck-state protection.

use crate::config::AnimationsConfig;
use crate::registry::Sticker;
use protocol::StickerId;
use std::collections::HashMap;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy)]
struct AnimationState {
    start_ms: u64,
    last_update_ms: u64,
}

/// Drives scale/alpha of transitioning stickers.
///
/// Tracks at most one animation per sticker id. Two protection layers cover
/// animations that stall: a hard timeout per animation, and a periodic sweep
/// that force-completes stickers left short of their final values.
#[derive(Debug)]
pub struct AnimationManager {
    config: AnimationsConfig,
    tracked: HashMap<StickerId, AnimationState>,
}

fn lerp(start: f32, end: f32, t: f32) -> f32 {
    start * (1.0 - t) + end * t
}

fn ease_in_out_quad(t: f32) -> f32 {
    if t < 0.5 {
        2.0 * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
    }
}

impl AnimationManager {
    pub fn new(config: AnimationsConfig) -> Self {
        Self {
            config,
            tracked: HashMap::new(),
        }
    }

    /// Begin a fly-in. The sticker starts at the configured initial values.
    pub fn start(&mut self, sticker: &mut Sticker, now_ms: u64) {
        sticker.scale = self.config.fly_in.initial_scale;
        sticker.alpha = self.config.fly_in.initial_alpha;
        self.tracked.insert(
            sticker.id.clone(),
            AnimationState {
                start_ms: now_ms,
                last_update_ms: now_ms,
            },
        );
    }

    pub fn is_animating(&self, id: &StickerId) -> bool {
        self.tracked.contains_key(id)
    }

    /// Advance every tracked animation.
    pub fn tick(&mut self, now_ms: u64, stickers: &mut [Sticker]) {
        let fly_in = self.config.fly_in.clone();
        let timeout = self.config.protection.timeout_ms;
        let check_interval = self.config.protection.check_interval_ms;

        let ids: Vec<StickerId> = self.tracked.keys().cloned().collect();
        for id in ids {
            let Some(sticker) = stickers.iter_mut().find(|s| s.id == id) else {
                self.tracked.remove(&id);
                warn!("Sticker not found, dropping animation: {id}");
                continue;
            };
            let Some(state) = self.tracked.get_mut(&id) else {
                continue;
            };

            let elapsed = now_ms.saturating_sub(state.start_ms);
            let since_update = now_ms.saturating_sub(state.last_update_ms);

            if elapsed >= timeout {
                warn!("Animation timeout for sticker: {id}");
                sticker.scale = fly_in.final_scale;
                sticker.alpha = fly_in.final_alpha;
                self.tracked.remove(&id);
                continue;
            }

            if since_update > check_interval
                && (sticker.scale != fly_in.final_scale || sticker.alpha != fly_in.final_alpha)
            {
                warn!("Possible stuck animation detected for sticker: {id}");
                sticker.scale = fly_in.final_scale;
                sticker.alpha = fly_in.final_alpha;
                self.tracked.remove(&id);
                continue;
            }

            let progress = (elapsed as f32 / fly_in.duration_ms as f32).min(1.0);
            let eased = ease_in_out_quad(progress);
            let new_scale = lerp(fly_in.initial_scale, fly_in.final_scale, eased);
            let new_alpha = lerp(fly_in.initial_alpha, fly_in.final_alpha, eased);

            if sticker.scale != new_scale || sticker.alpha != new_alpha {
                sticker.scale = new_scale;
                sticker.alpha = new_alpha;
                state.last_update_ms = now_ms;
            }

            if progress >= 1.0 {
                debug!("Animation completed for sticker: {id}");
                self.tracked.remove(&id);
            }
        }
    }

    /// Periodic pass over all stickers: anything short of its final values
    /// with no tracked animation gets snapped to completion.
    pub fn sweep(&mut self, stickers: &mut [Sticker]) {
        let fly_in = &self.config.fly_in;
        for sticker in stickers {
            if self.tracked.contains_key(&sticker.id) {
                continue;
            }
            if sticker.scale != fly_in.final_scale || sticker.alpha != fly_in.final_alpha {
                warn!("Found stuck sticker: {}, forcing completion", sticker.id);
                sticker.scale = fly_in.final_scale;
                sticker.alpha = fly_in.final_alpha;
            }
        }
    }

    /// Drop tracking for a removed sticker.
    pub fn forget(&mut self, id: &StickerId) {
        self.tracked.remove(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ImageHandle;

    fn sticker(id: &str) -> Sticker {
        Sticker {
            id: id.into(),
            path: format!("stickers/{id}.webp"),
            image: ImageHandle {
                width: 512,
                height: 512,
            },
            body: 0,
            scale: 1.0,
            alpha: 1.0,
        }
    }

    fn manager() -> AnimationManager {
        AnimationManager::new(AnimationsConfig::default())
    }

    #[test]
    fn easing_endpoints() {
        assert_eq!(ease_in_out_quad(0.0), 0.0);
        assert_eq!(ease_in_out_quad(1.0), 1.0);
        assert_eq!(ease_in_out_quad(0.5), 0.5);
    }

    #[test]
    fn start_sets_initial_values() {
        let mut mgr = manager();
        let mut s = sticker("a");
        mgr.start(&mut s, 0);
        assert_eq!(s.scale, 0.1);
        assert_eq!(s.alpha, 0.01);
        assert!(mgr.is_animating(&"a".into()));
    }

    #[test]
    fn tick_reaches_final_values_and_untracks() {
        let mut mgr = manager();
        let mut stickers = vec![sticker("a")];
        mgr.start(&mut stickers[0], 0);

        mgr.tick(500, &mut stickers);
        assert!(stickers[0].scale > 0.1 && stickers[0].scale < 1.0);

        mgr.tick(1000, &mut stickers);
        assert_eq!(stickers[0].scale, 1.0);
        assert_eq!(stickers[0].alpha, 1.0);
        assert!(!mgr.is_animating(&"a".into()));
    }

    #[test]
    fn timeout_forces_completion() {
        let mut mgr = manager();
        let mut stickers = vec![sticker("a")];
        mgr.start(&mut stickers[0], 0);

        // Jump straight past the protection timeout without intermediate
        // ticks; the animation must complete instead of lingering.
        mgr.tick(5000, &mut stickers);
        assert_eq!(stickers[0].scale, 1.0);
        assert_eq!(stickers[0].alpha, 1.0);
        assert!(!mgr.is_animating(&"a".into()));
    }

    #[test]
    fn removed_sticker_drops_its_animation() {
        let mut mgr = manager();
        let mut stickers = vec![sticker("a")];
        mgr.start(&mut stickers[0], 0);

        let mut none: Vec<Sticker> = Vec::new();
        mgr.tick(100, &mut none);
        assert!(!mgr.is_animating(&"a".into()));
    }

    #[test]
    fn sweep_fixes_untracked_stragglers() {
        let mut mgr = manager();
        let mut stickers = vec![sticker("a")];
        stickers[0].scale = 0.4;
        stickers[0].alpha = 0.4;

        mgr.sweep(&mut stickers);
        assert_eq!(stickers[0].scale, 1.0);
        assert_eq!(stickers[0].alpha, 1.0);
    }

    #[test]
    fn sweep_leaves_tracked_animations_alone() {
        let mut mgr = manager();
        let mut stickers = vec![sticker("a")];
        mgr.start(&mut stickers[0], 0);
        mgr.tick(200, &mut stickers);
        let mid_scale = stickers[0].scale;

        mgr.sweep(&mut stickers);
        assert_eq!(stickers[0].scale, mid_scale);
    }
}
