//! Kinematic bodies and collision rectangles.
//!
//! Bodies integrate gravity, clamp velocity per axis, and resolve a
//! one-way downward collision against the ground plane. There is no
//! broadphase; hit detection is on-demand AABB overlap in the combat
//! resolver.

use serde::{Deserialize, Serialize};

use crate::input::Vec2;

/// Axis-aligned bounding box for hit detection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AABB {
    /// Minimum X coordinate
    pub min_x: f32,
    /// Minimum Y coordinate
    pub min_y: f32,
    /// Maximum X coordinate
    pub max_x: f32,
    /// Maximum Y coordinate
    pub max_y: f32,
}

impl AABB {
    /// Creates a new AABB.
    #[must_use]
    pub const fn new(min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Creates an AABB from its top-left corner and extents.
    #[must_use]
    pub const fn from_rect(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            min_x: x,
            min_y: y,
            max_x: x + width,
            max_y: y + height,
        }
    }

    /// Creates an AABB from center and half-extents.
    #[must_use]
    pub fn from_center(center: Vec2, half_width: f32, half_height: f32) -> Self {
        Self {
            min_x: center.x - half_width,
            min_y: center.y - half_height,
            max_x: center.x + half_width,
            max_y: center.y + half_height,
        }
    }

    /// Returns the width of the AABB.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    /// Returns the height of the AABB.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.max_y - self.min_y
    }

    /// Checks if this AABB overlaps with another.
    ///
    /// Strict inequalities: zero-width rectangles and exactly
    /// touching edges do not count as overlap.
    #[must_use]
    pub fn overlaps(&self, other: &AABB) -> bool {
        self.min_x < other.max_x
            && self.max_x > other.min_x
            && self.min_y < other.max_y
            && self.max_y > other.min_y
    }
}

impl Default for AABB {
    fn default() -> Self {
        Self::new(0.0, 0.0, 1.0, 1.0)
    }
}

/// Position/velocity integrator with gravity and one-way ground
/// collision. Owned exclusively by its combatant; state-machine
/// handlers mutate velocity directly (jump sets vy, run sets vx).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KinematicBody {
    /// Center position
    pub pos: Vec2,
    /// Velocity in units/s
    pub vel: Vec2,
    /// Body width
    pub width: f32,
    /// Body height
    pub height: f32,
    /// Per-axis velocity clamp
    pub max_vel: Vec2,
    /// Whether gravity integrates into vy
    pub allow_gravity: bool,
    /// Set when the body rests on the ground plane
    pub on_ground: bool,
}

impl KinematicBody {
    /// Creates a body at a position with the given extents.
    #[must_use]
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            vel: Vec2::ZERO,
            width,
            height,
            max_vel: Vec2::new(800.0, 1000.0),
            allow_gravity: true,
            on_ground: false,
        }
    }

    /// Sets the per-axis velocity clamp.
    pub fn set_max_velocity(&mut self, x: f32, y: f32) {
        self.max_vel = Vec2::new(x, y);
    }

    /// Integrates one tick: gravity, clamp, advance, ground resolve.
    ///
    /// The ground collision is one-way: the body snaps up so its
    /// foot sits on `ground_y` and downward velocity is zeroed;
    /// upward movement through the plane is never blocked.
    pub fn update(&mut self, delta_ms: f32, gravity: f32, ground_y: f32) {
        let dt = delta_ms / 1000.0;

        if self.allow_gravity {
            self.vel.y += gravity * dt;
        }

        self.vel.x = self.vel.x.clamp(-self.max_vel.x, self.max_vel.x);
        self.vel.y = self.vel.y.clamp(-self.max_vel.y, self.max_vel.y);

        self.pos.x += self.vel.x * dt;
        self.pos.y += self.vel.y * dt;

        self.on_ground = false;
        let foot_y = self.pos.y + self.height / 2.0;
        if foot_y >= ground_y {
            self.pos.y = ground_y - self.height / 2.0;
            if self.vel.y > 0.0 {
                self.vel.y = 0.0;
            }
            self.on_ground = true;
        }
    }

    /// The body's collision rectangle.
    #[must_use]
    pub fn aabb(&self) -> AABB {
        AABB::from_center(self.pos, self.width / 2.0, self.height / 2.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_aabb_overlaps() {
        let a = AABB::new(0.0, 0.0, 10.0, 10.0);
        let b = AABB::new(5.0, 5.0, 15.0, 15.0);
        let c = AABB::new(20.0, 20.0, 30.0, 30.0);

        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn test_zero_area_aabb_never_overlaps() {
        let degenerate = AABB::new(5.0, 5.0, 5.0, 5.0);
        let big = AABB::new(0.0, 0.0, 10.0, 10.0);
        assert!(!degenerate.overlaps(&big));
        assert!(!big.overlaps(&degenerate));
    }

    #[test]
    fn test_touching_edges_do_not_overlap() {
        let a = AABB::new(0.0, 0.0, 10.0, 10.0);
        let b = AABB::new(10.0, 0.0, 20.0, 10.0);
        assert!(!a.overlaps(&b));
    }

    #[test]
    fn test_body_lands_on_ground() {
        let mut body = KinematicBody::new(0.0, 100.0, 20.0, 40.0);
        for _ in 0..200 {
            body.update(16.0, 1200.0, 300.0);
        }
        assert!(body.on_ground);
        assert!((body.pos.y - (300.0 - 20.0)).abs() < f32::EPSILON);
        assert_eq!(body.vel.y, 0.0);
    }

    #[test]
    fn test_gravity_disabled_body_floats() {
        let mut body = KinematicBody::new(0.0, 100.0, 20.0, 40.0);
        body.allow_gravity = false;
        body.update(16.0, 1200.0, 300.0);
        assert_eq!(body.vel.y, 0.0);
        assert!((body.pos.y - 100.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_velocity_clamped_to_maxima() {
        let mut body = KinematicBody::new(0.0, 0.0, 20.0, 40.0);
        body.set_max_velocity(100.0, 100.0);
        body.vel = Vec2::new(5000.0, -5000.0);
        body.update(16.0, 1200.0, 1000.0);
        assert!(body.vel.x <= 100.0);
        assert!(body.vel.y >= -100.0);
    }

    proptest! {
        /// For any delta at or below the clamp ceiling, the foot
        /// never ends a tick below the ground plane.
        #[test]
        fn prop_foot_never_below_ground(
            start_y in -500.0f32..500.0,
            vel_y in -1000.0f32..1000.0,
            deltas in prop::collection::vec(0.1f32..50.0, 1..120),
        ) {
            let ground_y = 300.0;
            let mut body = KinematicBody::new(0.0, start_y.min(ground_y - 20.0), 20.0, 40.0);
            body.vel.y = vel_y;
            for delta in deltas {
                body.update(delta, 1200.0, ground_y);
                let foot = body.pos.y + body.height / 2.0;
                prop_assert!(foot <= ground_y + 1e-3);
            }
        }
    }
}
