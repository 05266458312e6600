//! Wall world controller.
//!
//! Owns the static wall set and all body-level policy: population-based
//! sticker sizing, size propagation, spawn placement, wall-collision
//! reactions, drag-throw and gravity pulses. Logical sticker bookkeeping
//! lives in the registry; this module only talks to the physics world.

use crate::config::{GravityConfig, StickerConfig, WallsConfig};
use crate::geom::{self, RotationBias, SpawnEdge};
use crate::physics::{BodyDef, BodyId, CollisionEvent, Physics};
use crate::registry::{ImageHandle, Sticker};
use glam::Vec2;
use rand::Rng;
use tracing::debug;

const CENTER_BLOCK_WIDTH: f32 = 290.0;
const CENTER_BLOCK_HEIGHT: f32 = 120.0;
/// How far inside the canvas new stickers appear.
const SPAWN_INSET: f32 = 100.0;

#[derive(Debug, Clone, Copy)]
struct DragState {
    body: BodyId,
}

/// Controller for the physics side of the wall.
#[derive(Debug)]
pub struct WallController {
    width: f32,
    height: f32,
    walls: Vec<BodyId>,
    rotation: RotationBias,
    drag: Option<DragState>,
    gravity_revert_at: Option<u64>,
}

impl WallController {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            walls: Vec::new(),
            rotation: RotationBias::new(),
            drag: None,
            gravity_revert_at: None,
        }
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }

    pub fn wall_ids(&self) -> &[BodyId] {
        &self.walls
    }

    /// Recreate the wall set for the given canvas size. Prior walls are
    /// removed first, so repeated calls are idempotent.
    pub fn resize(
        &mut self,
        physics: &mut dyn Physics,
        width: f32,
        height: f32,
        config: &WallsConfig,
    ) {
        self.width = width;
        self.height = height;

        for id in self.walls.drain(..) {
            physics.remove_body(id);
        }

        let t = config.thickness;
        let r = config.restitution;
        self.walls.push(physics.create_body(BodyDef::wall(
            "groundBottom",
            Vec2::new(width / 2.0, height),
            width,
            t,
            r,
        )));
        self.walls.push(physics.create_body(BodyDef::wall(
            "groundTop",
            Vec2::new(width / 2.0, 0.0),
            width,
            t,
            r,
        )));
        self.walls.push(physics.create_body(BodyDef::wall(
            "groundRight",
            Vec2::new(width, height / 2.0),
            t,
            height,
            r,
        )));
        self.walls.push(physics.create_body(BodyDef::wall(
            "groundLeft",
            Vec2::new(0.0, height / 2.0),
            t,
            height,
            r,
        )));
        if config.center_block {
            self.walls.push(physics.create_body(BodyDef::wall(
                "centerBlock",
                self.center(),
                CENTER_BLOCK_WIDTH,
                CENTER_BLOCK_HEIGHT,
                r,
            )));
        }

        debug!("Walls created for {width}x{height}");
    }

    /// Sticker size for the given population: ramps linearly from `size_max`
    /// on an empty wall down to `size_min` as the count approaches the cap.
    pub fn target_size(&self, count: usize, config: &StickerConfig) -> u32 {
        let limit = config.max_count.saturating_sub(config.max_count_offset).max(1);
        let percentage = (count as f32 / limit as f32).min(1.0);
        let size = config.size_max as f32
            - percentage * (config.size_max as f32 - config.size_min as f32);
        size.round() as u32
    }

    fn sticker_body_def(
        &self,
        position: Vec2,
        image: ImageHandle,
        target: u32,
        config: &StickerConfig,
    ) -> BodyDef {
        let (width, height) = geom::proportional_size(
            image.width,
            image.height,
            target as f32 * config.hit_box_factor,
        );
        BodyDef {
            position,
            width,
            height,
            is_static: false,
            restitution: config.physics.restitution,
            friction: config.physics.friction,
            friction_air: config.physics.friction_air,
            label: None,
        }
    }

    /// Replace every sticker body with one sized for `target`, preserving
    /// position, angle and velocity exactly.
    pub fn propagate_sizes(
        &self,
        physics: &mut dyn Physics,
        stickers: &mut [Sticker],
        target: u32,
        config: &StickerConfig,
    ) {
        for sticker in stickers {
            let Some(state) = physics.body(sticker.body) else {
                continue;
            };
            let (position, angle, velocity) = (state.position, state.angle, state.velocity);

            physics.remove_body(sticker.body);
            let def = self.sticker_body_def(position, sticker.image, target, config);
            let body = physics.create_body(def);
            physics.set_angle(body, angle);
            physics.set_velocity(body, velocity);
            sticker.body = body;
        }
    }

    /// Create a body for a freshly loaded sticker: random edge placement,
    /// velocity toward the canvas center, alternating rotation.
    pub fn spawn_sticker_body(
        &mut self,
        physics: &mut dyn Physics,
        image: ImageHandle,
        target: u32,
        config: &StickerConfig,
    ) -> BodyId {
        let position = SpawnEdge::random().spawn_point(self.width, self.height, SPAWN_INSET);
        let def = self.sticker_body_def(position, image, target, config);
        let body = physics.create_body(def);

        let velocity = geom::velocity_toward(position, self.center(), config.physics.initial_speed);
        physics.set_velocity(body, velocity);
        physics.set_angle(body, self.rotation.next_rotation());

        debug!("Spawned sticker body {body} at {position}");
        body
    }

    /// Wall-hit reaction: re-launch the moving body at a random angle with a
    /// small random integer speed.
    pub fn handle_collisions(
        &self,
        physics: &mut dyn Physics,
        events: &[CollisionEvent],
        config: &WallsConfig,
    ) {
        if !config.collision_effect {
            return;
        }

        for event in events {
            let a_static = physics.body(event.a).map(|b| b.is_static);
            let b_static = physics.body(event.b).map(|b| b.is_static);
            let (Some(a_static), Some(b_static)) = (a_static, b_static) else {
                continue;
            };
            if a_static == b_static {
                continue;
            }
            let moving = if a_static { event.b } else { event.a };

            let speed = geom::random_int(1, 2) as f32;
            let angle = geom::random_angle();
            physics.set_velocity(moving, Vec2::new(angle.cos() * speed, angle.sin() * speed));
        }
    }

    /// Apply a random gravity pulse; reverts after the configured duration.
    pub fn apply_random_gravity(
        &mut self,
        physics: &mut dyn Physics,
        now_ms: u64,
        config: &GravityConfig,
    ) {
        let g: f32 = rand::rng().random_range(-0.1..0.0);
        physics.set_gravity(Vec2::new(g, -g));
        self.gravity_revert_at = Some(now_ms + config.revert_after_ms);
        debug!("Applying random gravity {g}");
    }

    /// Revert an elapsed gravity pulse back to the configured default.
    pub fn tick_gravity(
        &mut self,
        physics: &mut dyn Physics,
        now_ms: u64,
        config: &GravityConfig,
    ) {
        if let Some(deadline) = self.gravity_revert_at {
            if now_ms >= deadline {
                physics.set_gravity(Vec2::new(config.x, config.y));
                self.gravity_revert_at = None;
                debug!("Gravity back to default");
            }
        }
    }

    /// Pick the topmost dynamic body under `point`. Returns true if a drag
    /// started.
    pub fn begin_drag(&mut self, physics: &dyn Physics, point: Vec2) -> bool {
        let hit = physics
            .body_ids()
            .into_iter()
            .rev()
            .find(|&id| {
                physics
                    .body(id)
                    .is_some_and(|b| !b.is_static && b.contains(point))
            });
        match hit {
            Some(body) => {
                self.drag = Some(DragState { body });
                true
            }
            None => false,
        }
    }

    /// Pull the dragged body toward the cursor.
    pub fn drag_to(&mut self, physics: &mut dyn Physics, point: Vec2, stiffness: f32) {
        let Some(drag) = self.drag else {
            return;
        };
        let Some(state) = physics.body(drag.body) else {
            self.drag = None;
            return;
        };
        let pull = (point - state.position) * stiffness;
        physics.set_velocity(drag.body, pull);
    }

    /// Release the drag, boosting the body's velocity for a throw.
    pub fn end_drag(&mut self, physics: &mut dyn Physics, throw_multiplier: f32) {
        let Some(drag) = self.drag.take() else {
            return;
        };
        if let Some(state) = physics.body(drag.body) {
            let velocity = state.velocity * throw_multiplier;
            physics.set_velocity(drag.body, velocity);
        }
    }

    pub fn dragging(&self) -> Option<BodyId> {
        self.drag.map(|d| d.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::physics::RigidWorld;

    fn setup() -> (RigidWorld, WallController, Config) {
        let config = Config::default();
        let mut physics = RigidWorld::new();
        let mut controller = WallController::new(1920.0, 1080.0);
        controller.resize(&mut physics, 1920.0, 1080.0, &config.world.walls);
        (physics, controller, config)
    }

    #[test]
    fn creates_five_labeled_walls() {
        let (physics, controller, _) = setup();
        assert_eq!(controller.wall_ids().len(), 5);

        let labels: Vec<String> = controller
            .wall_ids()
            .iter()
            .filter_map(|&id| physics.body(id).and_then(|b| b.label.clone()))
            .collect();
        for expected in [
            "groundBottom",
            "groundTop",
            "groundRight",
            "groundLeft",
            "centerBlock",
        ] {
            assert!(labels.iter().any(|l| l == expected), "missing {expected}");
        }
    }

    #[test]
    fn center_block_is_optional() {
        let config = Config::default();
        let mut walls = config.world.walls.clone();
        walls.center_block = false;

        let mut physics = RigidWorld::new();
        let mut controller = WallController::new(800.0, 600.0);
        controller.resize(&mut physics, 800.0, 600.0, &walls);
        assert_eq!(controller.wall_ids().len(), 4);
    }

    #[test]
    fn resize_replaces_walls_idempotently() {
        let (mut physics, mut controller, config) = setup();
        let before: Vec<BodyId> = controller.wall_ids().to_vec();

        controller.resize(&mut physics, 1280.0, 720.0, &config.world.walls);
        assert_eq!(controller.wall_ids().len(), 5);
        for id in before {
            assert!(physics.body(id).is_none(), "old wall {id} still present");
        }
        assert_eq!(physics.body_ids().len(), 5);
    }

    #[test]
    fn target_size_ramps_down_and_clamps() {
        let (_, controller, config) = setup();
        let cfg = &config.stickers;

        assert_eq!(controller.target_size(0, cfg), 180);
        assert_eq!(controller.target_size(130, cfg), 100);
        assert_eq!(controller.target_size(1000, cfg), 100);

        let mut last = u32::MAX;
        for n in 0..150 {
            let size = controller.target_size(n, cfg);
            assert!(size <= last, "size must be non-increasing");
            assert!((100..=180).contains(&size));
            last = size;
        }
    }

    #[test]
    fn propagate_preserves_motion_state() {
        let (mut physics, mut controller, config) = setup();
        let image = ImageHandle {
            width: 400,
            height: 200,
        };
        let body = controller.spawn_sticker_body(&mut physics, image, 180, &config.stickers);
        physics.set_position(body, Vec2::new(333.0, 444.0));
        physics.set_velocity(body, Vec2::new(1.5, -0.5));
        physics.set_angle(body, 0.12);

        let mut stickers = vec![Sticker {
            id: "a".into(),
            path: "stickers/a.webp".into(),
            image,
            body,
            scale: 1.0,
            alpha: 1.0,
        }];

        controller.propagate_sizes(&mut physics, &mut stickers, 100, &config.stickers);

        let new_body = stickers[0].body;
        assert_ne!(new_body, body);
        assert!(physics.body(body).is_none());

        let state = physics.body(new_body).unwrap();
        assert_eq!(state.position, Vec2::new(333.0, 444.0));
        assert_eq!(state.velocity, Vec2::new(1.5, -0.5));
        assert_eq!(state.angle, 0.12);
        // 400x200 at 100 * 0.8 hitbox -> 80x40.
        assert!((state.width - 80.0).abs() < 0.01);
        assert!((state.height - 40.0).abs() < 0.01);
    }

    #[test]
    fn spawn_aims_at_center() {
        let (mut physics, mut controller, config) = setup();
        let image = ImageHandle {
            width: 512,
            height: 512,
        };
        for _ in 0..20 {
            let body = controller.spawn_sticker_body(&mut physics, image, 180, &config.stickers);
            let state = physics.body(body).unwrap();
            let toward = controller.center() - state.position;
            // Velocity and the center direction must agree.
            assert!(state.velocity.dot(toward) > 0.0);
            assert!((state.velocity.length() - config.stickers.physics.initial_speed).abs() < 1e-4);
            physics.remove_body(body);
        }
    }

    #[test]
    fn wall_hit_relaunches_at_random_speed() {
        let (mut physics, mut controller, config) = setup();
        let image = ImageHandle {
            width: 512,
            height: 512,
        };
        let body = controller.spawn_sticker_body(&mut physics, image, 180, &config.stickers);
        let wall = controller.wall_ids()[0];

        controller.handle_collisions(
            &mut physics,
            &[CollisionEvent { a: wall, b: body }],
            &config.world.walls,
        );

        let speed = physics.body(body).unwrap().velocity.length();
        assert!(speed >= 0.99 && speed <= 2.01, "speed was {speed}");
    }

    #[test]
    fn gravity_pulse_reverts_after_deadline() {
        let (mut physics, mut controller, config) = setup();
        controller.apply_random_gravity(&mut physics, 1000, &config.world.gravity);
        assert_ne!(physics.gravity(), Vec2::ZERO);

        controller.tick_gravity(&mut physics, 5000, &config.world.gravity);
        assert_ne!(physics.gravity(), Vec2::ZERO);

        controller.tick_gravity(&mut physics, 11_000, &config.world.gravity);
        assert_eq!(physics.gravity(), Vec2::ZERO);
    }

    #[test]
    fn drag_throw_scales_velocity() {
        let (mut physics, mut controller, config) = setup();
        let image = ImageHandle {
            width: 512,
            height: 512,
        };
        let body = controller.spawn_sticker_body(&mut physics, image, 180, &config.stickers);
        physics.set_position(body, Vec2::new(500.0, 500.0));

        assert!(controller.begin_drag(&physics, Vec2::new(500.0, 500.0)));
        controller.drag_to(&mut physics, Vec2::new(600.0, 500.0), config.mouse.stiffness);
        let pulled = physics.body(body).unwrap().velocity;
        assert!(pulled.x > 0.0);

        controller.end_drag(&mut physics, config.mouse.throw_multiplier);
        let thrown = physics.body(body).unwrap().velocity;
        assert!((thrown.x - pulled.x * 1.5).abs() < 1e-4);
        assert!(controller.dragging().is_none());
    }

    #[test]
    fn drag_ignores_walls_and_empty_space() {
        let (physics, mut controller, _) = setup();
        // Canvas center sits on the static center block.
        assert!(!controller.begin_drag(&physics, Vec2::new(960.0, 540.0)));
        assert!(!controller.begin_drag(&physics, Vec2::new(400.0, 400.0)));
    }
}
