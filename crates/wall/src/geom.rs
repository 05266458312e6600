//! Geometry and randomness helpers.

use glam::Vec2;
use rand::Rng;

/// Scale an image to fit within `max_size` while keeping its aspect ratio.
pub fn proportional_size(width: u32, height: u32, max_size: f32) -> (f32, f32) {
    if width > height {
        (max_size, height as f32 / width as f32 * max_size)
    } else {
        (width as f32 / height as f32 * max_size, max_size)
    }
}

/// Random integer in `[min, max]`, both ends included.
pub fn random_int(min: i32, max: i32) -> i32 {
    rand::rng().random_range(min..=max)
}

/// Random unit-circle angle in `[0, 2π)`.
pub fn random_angle() -> f32 {
    rand::rng().random_range(0.0..std::f32::consts::TAU)
}

/// Alternating-sign rotation generator.
///
/// Magnitude is uniform in `[0, 0.2)`. The first value is non-negative and
/// every subsequent value flips the sign of the previous one, so stickers
/// lean left and right in turn.
#[derive(Debug, Default)]
pub struct RotationBias {
    last: Option<f32>,
}

impl RotationBias {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_rotation(&mut self) -> f32 {
        let magnitude: f32 = rand::rng().random_range(0.0..0.2);
        let value = match self.last {
            None => magnitude,
            Some(last) if last < 0.0 => magnitude,
            Some(_) => -magnitude,
        };
        self.last = Some(value);
        value
    }
}

/// Canvas edge a new sticker enters from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnEdge {
    Top,
    Right,
    Bottom,
    Left,
}

impl SpawnEdge {
    pub fn random() -> Self {
        match rand::rng().random_range(0..4) {
            0 => SpawnEdge::Top,
            1 => SpawnEdge::Right,
            2 => SpawnEdge::Bottom,
            _ => SpawnEdge::Left,
        }
    }

    /// Spawn point: `inset` units inward from the edge along the
    /// perpendicular axis, uniform along the parallel one.
    pub fn spawn_point(&self, width: f32, height: f32, inset: f32) -> Vec2 {
        let mut rng = rand::rng();
        match self {
            SpawnEdge::Top => Vec2::new(rng.random_range(0.0..width), inset),
            SpawnEdge::Right => Vec2::new(width - inset, rng.random_range(0.0..height)),
            SpawnEdge::Bottom => Vec2::new(rng.random_range(0.0..width), height - inset),
            SpawnEdge::Left => Vec2::new(inset, rng.random_range(0.0..height)),
        }
    }
}

/// Velocity of magnitude `speed` pointing from `from` toward `target`.
pub fn velocity_toward(from: Vec2, target: Vec2, speed: f32) -> Vec2 {
    let angle = (target.y - from.y).atan2(target.x - from.x);
    Vec2::new(angle.cos() * speed, angle.sin() * speed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn proportional_size_wide_image() {
        let (w, h) = proportional_size(200, 100, 180.0);
        assert_eq!(w, 180.0);
        assert_eq!(h, 90.0);
    }

    #[test]
    fn proportional_size_tall_and_square() {
        let (w, h) = proportional_size(100, 200, 180.0);
        assert_eq!(h, 180.0);
        assert_eq!(w, 90.0);

        let (w, h) = proportional_size(64, 64, 100.0);
        assert_eq!((w, h), (100.0, 100.0));
    }

    #[test]
    fn random_int_stays_inclusive() {
        for _ in 0..200 {
            let v = random_int(1, 2);
            assert!(v == 1 || v == 2);
        }
    }

    #[test]
    fn rotation_alternates_sign() {
        let mut bias = RotationBias::new();
        let first = bias.next_rotation();
        assert!(first >= 0.0);

        let mut last = first;
        for _ in 0..50 {
            let next = bias.next_rotation();
            // Sign must flip unless the previous magnitude was exactly zero.
            if last > 0.0 {
                assert!(next <= 0.0);
            } else if last < 0.0 {
                assert!(next >= 0.0);
            }
            assert!(next.abs() < 0.2);
            last = next;
        }
    }

    #[test]
    fn spawn_point_sits_inside_inset_band() {
        for _ in 0..100 {
            let edge = SpawnEdge::random();
            let p = edge.spawn_point(1920.0, 1080.0, 100.0);
            assert!(p.x >= 0.0 && p.x <= 1920.0);
            assert!(p.y >= 0.0 && p.y <= 1080.0);
            match edge {
                SpawnEdge::Top => assert_eq!(p.y, 100.0),
                SpawnEdge::Right => assert_eq!(p.x, 1820.0),
                SpawnEdge::Bottom => assert_eq!(p.y, 980.0),
                SpawnEdge::Left => assert_eq!(p.x, 100.0),
            }
        }
    }

    #[test]
    fn velocity_points_at_target() {
        let v = velocity_toward(Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0), 0.2);
        assert!((v.x - 0.2).abs() < 1e-6);
        assert!(v.y.abs() < 1e-6);

        let v = velocity_toward(Vec2::new(5.0, 5.0), Vec2::new(5.0, 0.0), 2.0);
        assert!(v.x.abs() < 1e-5);
        assert!((v.y + 2.0).abs() < 1e-5);
    }
}
