//! Reference rigid-body implementation.
//!
//! Rectangle bodies with air friction and restitution, resolved as
//! axis-aligned overlaps. Good enough for slow-moving stickers bouncing off
//! walls; not a general-purpose engine.

use super::{BodyDef, BodyId, BodyState, CollisionEvent, Physics};
use glam::Vec2;
use std::collections::HashMap;
use tracing::debug;

/// Nominal frame length velocities are expressed in (60 fps).
const FRAME_MS: f32 = 1000.0 / 60.0;

#[derive(Debug, Default)]
pub struct RigidWorld {
    next_id: BodyId,
    bodies: HashMap<BodyId, BodyState>,
    order: Vec<BodyId>,
    gravity: Vec2,
}

impl RigidWorld {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            bodies: HashMap::new(),
            order: Vec::new(),
            gravity: Vec2::ZERO,
        }
    }

    fn integrate(&mut self, frames: f32) {
        for state in self.bodies.values_mut() {
            if state.is_static {
                continue;
            }
            state.velocity += self.gravity * frames;
            let damping = (1.0 - state.friction_air).powf(frames);
            state.velocity *= damping;
            state.position += state.velocity * frames;
        }
    }

    fn resolve_collisions(&mut self) -> Vec<CollisionEvent> {
        let mut events = Vec::new();

        for i in 0..self.order.len() {
            for j in (i + 1)..self.order.len() {
                let (id_a, id_b) = (self.order[i], self.order[j]);
                let (Some(a), Some(b)) = (self.bodies.get(&id_a), self.bodies.get(&id_b)) else {
                    continue;
                };
                if a.is_static && b.is_static {
                    continue;
                }

                let delta = b.position - a.position;
                let overlap_x = (a.width + b.width) / 2.0 - delta.x.abs();
                let overlap_y = (a.height + b.height) / 2.0 - delta.y.abs();
                if overlap_x <= 0.0 || overlap_y <= 0.0 {
                    continue;
                }

                let restitution = a.restitution.max(b.restitution);
                // Push out along the axis of least penetration.
                let (axis_x, push) = if overlap_x < overlap_y {
                    (true, Vec2::new(overlap_x * delta.x.signum(), 0.0))
                } else {
                    (false, Vec2::new(0.0, overlap_y * delta.y.signum()))
                };

                let a_static = a.is_static;
                let b_static = b.is_static;

                if a_static != b_static {
                    let (moving, sign) = if a_static { (id_b, 1.0) } else { (id_a, -1.0) };
                    if let Some(body) = self.bodies.get_mut(&moving) {
                        body.position += push * sign;
                        if axis_x {
                            body.velocity.x = -body.velocity.x * restitution;
                        } else {
                            body.velocity.y = -body.velocity.y * restitution;
                        }
                    }
                } else {
                    // Two stickers: split the pushout, exchange the normal
                    // component of velocity (equal masses).
                    let (va, vb) = (a.velocity, b.velocity);
                    if let Some(body) = self.bodies.get_mut(&id_a) {
                        body.position -= push / 2.0;
                        if axis_x {
                            body.velocity.x = vb.x * restitution.max(0.1);
                        } else {
                            body.velocity.y = vb.y * restitution.max(0.1);
                        }
                    }
                    if let Some(body) = self.bodies.get_mut(&id_b) {
                        body.position += push / 2.0;
                        if axis_x {
                            body.velocity.x = va.x * restitution.max(0.1);
                        } else {
                            body.velocity.y = va.y * restitution.max(0.1);
                        }
                    }
                }

                events.push(CollisionEvent { a: id_a, b: id_b });
            }
        }

        events
    }
}

impl Physics for RigidWorld {
    fn create_body(&mut self, def: BodyDef) -> BodyId {
        let id = self.next_id;
        self.next_id += 1;
        self.bodies.insert(
            id,
            BodyState {
                position: def.position,
                velocity: Vec2::ZERO,
                angle: 0.0,
                width: def.width,
                height: def.height,
                is_static: def.is_static,
                restitution: def.restitution,
                friction_air: def.friction_air,
                label: def.label,
            },
        );
        self.order.push(id);
        debug!("Created body {id}");
        id
    }

    fn remove_body(&mut self, id: BodyId) -> bool {
        if self.bodies.remove(&id).is_some() {
            self.order.retain(|&b| b != id);
            true
        } else {
            false
        }
    }

    fn set_position(&mut self, id: BodyId, position: Vec2) {
        if let Some(body) = self.bodies.get_mut(&id) {
            body.position = position;
        }
    }

    fn set_velocity(&mut self, id: BodyId, velocity: Vec2) {
        if let Some(body) = self.bodies.get_mut(&id) {
            body.velocity = velocity;
        }
    }

    fn set_angle(&mut self, id: BodyId, angle: f32) {
        if let Some(body) = self.bodies.get_mut(&id) {
            body.angle = angle;
        }
    }

    fn set_gravity(&mut self, gravity: Vec2) {
        self.gravity = gravity;
    }

    fn gravity(&self) -> Vec2 {
        self.gravity
    }

    fn body(&self, id: BodyId) -> Option<&BodyState> {
        self.bodies.get(&id)
    }

    fn body_ids(&self) -> Vec<BodyId> {
        self.order.clone()
    }

    fn step(&mut self, dt_ms: u64) -> Vec<CollisionEvent> {
        let frames = dt_ms as f32 / FRAME_MS;
        self.integrate(frames);
        self.resolve_collisions()
    }
}
