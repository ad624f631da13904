//! Input snapshot types for player controls.
//!
//! The simulation never polls devices or reads process-wide key
//! state; the embedding layer builds an [`InputSnapshot`] each tick
//! (edge triggers included) and passes it in. [`ButtonTracker`]
//! converts raw held-state into edge-triggered snapshots for hosts
//! that only have level data.

use serde::{Deserialize, Serialize};

/// 2D vector for positions and directions.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    /// X component
    pub x: f32,
    /// Y component
    pub y: f32,
}

impl Vec2 {
    /// Zero vector.
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    /// Creates a new Vec2.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Returns the length (magnitude) of the vector.
    #[must_use]
    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Returns a normalized (unit length) version of the vector.
    /// Returns zero vector if the vector has zero length.
    #[must_use]
    pub fn normalized(self) -> Self {
        let len = self.length();
        if len > 0.0 {
            Self {
                x: self.x / len,
                y: self.y / len,
            }
        } else {
            Self::ZERO
        }
    }

    /// Dot product of two vectors.
    #[must_use]
    pub fn dot(self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y
    }

    /// Scale the vector by a scalar.
    #[must_use]
    pub fn scale(self, scalar: f32) -> Self {
        Self {
            x: self.x * scalar,
            y: self.y * scalar,
        }
    }

    /// Distance to another point.
    #[must_use]
    pub fn distance(self, other: Self) -> f32 {
        Self::new(other.x - self.x, other.y - self.y).length()
    }
}

impl std::ops::Add for Vec2 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::Sub for Vec2 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Raw held-button state as read from a device.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawInput {
    /// Move left held
    pub left: bool,
    /// Move right held
    pub right: bool,
    /// Jump held
    pub jump: bool,
    /// Down held
    pub down: bool,
    /// Punch held
    pub punch: bool,
    /// Kick held
    pub kick: bool,
    /// Web (swing) held
    pub web: bool,
    /// Web shoot held
    pub web_shoot: bool,
}

/// One tick's worth of player intent.
///
/// `jump`, `punch`, `kick` and `web_shoot` are edge-triggered (true
/// only on the tick the button went down); `left`, `right`, `down`
/// and `web_hold` are level-triggered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputSnapshot {
    /// Move left
    pub left: bool,
    /// Move right
    pub right: bool,
    /// Jump pressed this tick
    pub jump: bool,
    /// Down held
    pub down: bool,
    /// Punch pressed this tick
    pub punch: bool,
    /// Kick pressed this tick
    pub kick: bool,
    /// Web shoot pressed this tick
    pub web_shoot: bool,
    /// Web button went down this tick
    pub web_hold_start: bool,
    /// Web button currently held
    pub web_hold: bool,
    /// Web button went up this tick
    pub web_release: bool,
}

/// Converts raw held-state into edge-triggered snapshots.
#[derive(Debug, Clone, Default)]
pub struct ButtonTracker {
    prev: RawInput,
}

impl ButtonTracker {
    /// Creates a tracker with no buttons held.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Produces the snapshot for this tick and records the raw state
    /// for the next tick's edge detection.
    pub fn snapshot(&mut self, raw: RawInput) -> InputSnapshot {
        let snapshot = InputSnapshot {
            left: raw.left,
            right: raw.right,
            jump: raw.jump && !self.prev.jump,
            down: raw.down,
            punch: raw.punch && !self.prev.punch,
            kick: raw.kick && !self.prev.kick,
            web_shoot: raw.web_shoot && !self.prev.web_shoot,
            web_hold_start: raw.web && !self.prev.web,
            web_hold: raw.web,
            web_release: !raw.web && self.prev.web,
        };
        self.prev = raw;
        snapshot
    }
}
