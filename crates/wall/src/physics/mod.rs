//! Physics capability.
//!
//! The wall only needs a narrow slice of a rigid-body engine: rectangle
//! bodies, static walls, velocity control and collision notifications. That
//! slice is the [`Physics`] trait; [`RigidWorld`] is the bundled
//! implementation used by the runner and the tests.

mod rigid;

pub use rigid::RigidWorld;

use glam::Vec2;

/// Handle to a body inside a physics world.
pub type BodyId = u64;

/// Parameters for creating a body.
#[derive(Debug, Clone)]
pub struct BodyDef {
    pub position: Vec2,
    pub width: f32,
    pub height: f32,
    pub is_static: bool,
    pub restitution: f32,
    pub friction: f32,
    pub friction_air: f32,
    /// Diagnostic name, set for walls.
    pub label: Option<String>,
}

impl BodyDef {
    /// Static rectangle with a label, as used for walls.
    pub fn wall(label: &str, position: Vec2, width: f32, height: f32, restitution: f32) -> Self {
        Self {
            position,
            width,
            height,
            is_static: true,
            restitution,
            friction: 0.0,
            friction_air: 0.0,
            label: Some(label.to_string()),
        }
    }
}

/// Observable state of a body.
#[derive(Debug, Clone)]
pub struct BodyState {
    pub position: Vec2,
    pub velocity: Vec2,
    pub angle: f32,
    pub width: f32,
    pub height: f32,
    pub is_static: bool,
    pub restitution: f32,
    pub friction_air: f32,
    pub label: Option<String>,
}

impl BodyState {
    /// Axis-aligned bounds, ignoring the (small) body angle.
    pub fn bounds(&self) -> (Vec2, Vec2) {
        let half = Vec2::new(self.width / 2.0, self.height / 2.0);
        (self.position - half, self.position + half)
    }

    /// True if `point` falls inside the body bounds.
    pub fn contains(&self, point: Vec2) -> bool {
        let (min, max) = self.bounds();
        point.x >= min.x && point.x <= max.x && point.y >= min.y && point.y <= max.y
    }
}

/// A contact that started during the last step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionEvent {
    pub a: BodyId,
    pub b: BodyId,
}

/// Minimal rigid-body world the wall runs on.
pub trait Physics {
    fn create_body(&mut self, def: BodyDef) -> BodyId;
    /// Returns false if the body was not present.
    fn remove_body(&mut self, id: BodyId) -> bool;

    fn set_position(&mut self, id: BodyId, position: Vec2);
    fn set_velocity(&mut self, id: BodyId, velocity: Vec2);
    fn set_angle(&mut self, id: BodyId, angle: f32);

    fn set_gravity(&mut self, gravity: Vec2);
    fn gravity(&self) -> Vec2;

    fn body(&self, id: BodyId) -> Option<&BodyState>;
    /// All body ids, in creation order.
    fn body_ids(&self) -> Vec<BodyId>;

    /// Advance the simulation, returning contacts that began this step.
    fn step(&mut self, dt_ms: u64) -> Vec<CollisionEvent>;
}
