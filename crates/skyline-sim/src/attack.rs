//! Attack kinds and on-demand attack descriptors.
//!
//! Descriptors are derived, never stored: each tick the state
//! machine computes one from (state, type descriptor, momentum) and
//! the combat resolver consumes it together with the matching
//! hitbox.

use serde::{Deserialize, Serialize};

/// Every attack the simulation can resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttackKind {
    /// Player jab, chains up to three stages
    Punch,
    /// Player kick
    Kick,
    /// Player airborne dive kick
    DiveKick,
    /// Shockwave when a dive kick lands; hits everything in radius
    DiveKickShock,
    /// Kick thrown mid-swing; damage scales with speed
    SwingKick,
    /// Web glob that stuns instead of damaging
    WebShot,
    /// Web line that tags an enemy for reeling in
    WebPull,
    /// Enemy basic melee swing
    Melee,
    /// Enemy shoulder charge
    Charge,
    /// Enemy thrown projectile
    Projectile,
    /// Enemy lobbed bomb
    Bomb,
    /// Boss extended-reach tendril strike
    Tendril,
    /// Boss grab, holds the victim for periodic damage
    Grab,
    /// Boss pouncing leap
    Leap,
    /// Boss tail sweep, hits both sides
    TailSweep,
    /// Flying boss dive
    Swoop,
    /// Boss ground pound shockwave
    GroundPound,
}

/// A resolved attack: damage, geometry hints and status flags.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttackDescriptor {
    /// What attack this is
    pub kind: AttackKind,
    /// Base damage before the combo multiplier
    pub damage: i32,
    /// Horizontal reach of the hitbox
    pub range: f32,
    /// Horizontal knockback speed applied on hit
    pub knockback: f32,
    /// Vertical launch velocity applied on hit (negative = up)
    pub launch: f32,
    /// Stun applied instead of / on top of damage, in milliseconds
    pub stun_ms: f32,
    /// Attaches a grab relationship instead of knocking back
    pub grab: bool,
    /// Hitbox extends on both sides of the attacker
    pub both_sides: bool,
    /// Hitbox is an area centered on the attacker
    pub area: bool,
    /// May hit every valid target once in a single activation
    pub hits_all: bool,
}

impl AttackDescriptor {
    /// Creates a plain strike with no status flags.
    #[must_use]
    pub const fn strike(kind: AttackKind, damage: i32, range: f32, knockback: f32) -> Self {
        Self {
            kind,
            damage,
            range,
            knockback,
            launch: -150.0,
            stun_ms: 0.0,
            grab: false,
            both_sides: false,
            area: false,
            hits_all: false,
        }
    }

    /// Sets the vertical launch velocity.
    #[must_use]
    pub const fn with_launch(mut self, launch: f32) -> Self {
        self.launch = launch;
        self
    }

    /// Sets the stun duration.
    #[must_use]
    pub const fn with_stun(mut self, stun_ms: f32) -> Self {
        self.stun_ms = stun_ms;
        self
    }

    /// Marks the attack as a grab.
    #[must_use]
    pub const fn as_grab(mut self) -> Self {
        self.grab = true;
        self
    }

    /// Marks the hitbox as extending on both sides.
    #[must_use]
    pub const fn on_both_sides(mut self) -> Self {
        self.both_sides = true;
        self
    }

    /// Marks the hitbox as an area around the attacker.
    #[must_use]
    pub const fn as_area(mut self) -> Self {
        self.area = true;
        self
    }

    /// Allows the attack to hit every target in range once.
    #[must_use]
    pub const fn hitting_all(mut self) -> Self {
        self.hits_all = true;
        self
    }
}

/// An active-frame window as fractions of a state's duration, so
/// rebalancing a duration never requires retuning the window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActiveWindow {
    /// Fraction of the duration at which the hitbox turns on
    pub start: f32,
    /// Fraction of the duration at which the hitbox turns off
    pub end: f32,
}

impl ActiveWindow {
    /// Creates a window from fractions of the total duration.
    #[must_use]
    pub const fn new(start: f32, end: f32) -> Self {
        Self { start, end }
    }

    /// Whether `timer` falls inside the window for a state lasting
    /// `duration_ms`.
    #[must_use]
    pub fn contains(self, timer: f32, duration_ms: f32) -> bool {
        timer >= duration_ms * self.start && timer <= duration_ms * self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_window_scales_with_duration() {
        let window = ActiveWindow::new(0.3, 0.6);
        assert!(!window.contains(50.0, 400.0));
        assert!(window.contains(120.0, 400.0));
        assert!(window.contains(240.0, 400.0));
        assert!(!window.contains(280.0, 400.0));

        // Same fractions, doubled duration.
        assert!(window.contains(480.0, 800.0));
        assert!(!window.contains(100.0, 800.0));
    }

    #[test]
    fn test_descriptor_builders() {
        let sweep = AttackDescriptor::strike(AttackKind::TailSweep, 12, 90.0, 250.0)
            .on_both_sides()
            .with_launch(-200.0);
        assert!(sweep.both_sides);
        assert!(!sweep.grab);
        assert_eq!(sweep.launch, -200.0);
    }
}
