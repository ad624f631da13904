//! Rope constraint for the web-swing mechanic.
//!
//! While attached, the owning body may move freely inside the rope
//! circle; beyond it, the body is projected back onto the circle and
//! the outward radial velocity component is removed while the
//! tangential component survives. That projection, not any spring
//! force, is what produces the swing arc.

use serde::{Deserialize, Serialize};

use crate::config::SimConfig;
use crate::input::Vec2;
use crate::physics::KinematicBody;
use crate::rng::SimRng;

/// Fixed timestep the pump impulse is scaled by, matching a 60 Hz
/// reference frame regardless of the actual delta.
const PUMP_STEP: f32 = 0.016;

/// Web-swing rope constraint state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RopeConstraint {
    /// Whether a rope is currently attached
    pub active: bool,
    /// Anchor point the rope hangs from
    pub anchor: Vec2,
    /// Rope length, clamped to the configured range at attach
    pub length: f32,
    /// Re-attach cooldown, ticked even while inactive
    pub cooldown_timer: f32,
}

impl Default for RopeConstraint {
    fn default() -> Self {
        Self::new()
    }
}

impl RopeConstraint {
    /// Creates an unattached rope.
    #[must_use]
    pub fn new() -> Self {
        Self {
            active: false,
            anchor: Vec2::ZERO,
            length: 0.0,
            cooldown_timer: 0.0,
        }
    }

    /// Attempts to attach a rope ahead of the body.
    ///
    /// Returns false while the cooldown is running. The anchor is
    /// placed ahead of the current velocity direction with bounded
    /// jitter, inside the ceiling band; the rope length is the
    /// body-to-anchor distance clamped to the configured range.
    pub fn attach(
        &mut self,
        body_pos: Vec2,
        body_vel_x: f32,
        config: &SimConfig,
        rng: &mut SimRng,
    ) -> bool {
        if self.cooldown_timer > 0.0 {
            return false;
        }

        let ahead = body_vel_x.signum() * config.web.attach_ahead;
        let jitter = rng.range(-config.web.attach_jitter / 2.0, config.web.attach_jitter / 2.0);
        self.anchor = Vec2::new(
            body_pos.x + ahead + jitter,
            config.ceiling_y + rng.range(0.0, config.web.ceiling_band),
        );

        let dist = body_pos.distance(self.anchor);
        self.length = dist.clamp(config.web.min_length, config.web.max_length);
        self.active = true;
        true
    }

    /// Detaches the rope and starts the re-attach cooldown.
    pub fn release(&mut self, config: &SimConfig) {
        self.active = false;
        self.cooldown_timer = config.web.cooldown_ms;
    }

    /// The release velocity reward: current velocity scaled by the
    /// boost factor. The caller applies it to the body.
    #[must_use]
    pub fn release_velocity(&self, body: &KinematicBody, config: &SimConfig) -> Vec2 {
        body.vel.scale(config.web.release_boost)
    }

    /// Ticks the cooldown and enforces the length constraint.
    pub fn update(&mut self, delta_ms: f32, body: &mut KinematicBody) {
        if self.cooldown_timer > 0.0 {
            self.cooldown_timer -= delta_ms;
        }

        if !self.active {
            return;
        }

        let radial = body.pos - self.anchor;
        let dist = radial.length();
        if dist <= self.length || dist == 0.0 {
            return;
        }

        let n = radial.scale(1.0 / dist);

        // Snap back onto the rope circle.
        body.pos = self.anchor + n.scale(self.length);

        // Remove only the outward radial component; tangential
        // velocity carries the swing.
        let radial_speed = body.vel.dot(n);
        if radial_speed > 0.0 {
            body.vel = body.vel - n.scale(radial_speed);
        }
    }

    /// Adds a tangential impulse in the requested direction
    /// (-1 = left, 1 = right), letting input feed energy into the
    /// swing. No-op when the body sits on the anchor.
    pub fn pump(&self, direction: f32, body: &mut KinematicBody, config: &SimConfig) {
        let radial = body.pos - self.anchor;
        let dist = radial.length();
        if dist == 0.0 {
            return;
        }

        let n = radial.scale(1.0 / dist);
        // Tangent is the radial rotated 90 degrees; the sign matches
        // the constraint projection so pumping never fights it.
        let tangent = Vec2::new(-n.y * direction, n.x * direction);

        body.vel.x += tangent.x * config.web.pump_force * PUMP_STEP;
        body.vel.y += tangent.y * config.web.pump_force * PUMP_STEP;
    }
}
