//! Simulation tuning configuration.
//!
//! Every numeric knob the simulation consumes lives here: world
//! constants, player movement and attack tuning, web-swing physics,
//! combo scoring, hitstop tiers, and the wave director policy. The
//! simulation never reads ambient globals; it is handed a validated
//! [`SimConfig`] at construction.

use serde::{Deserialize, Serialize};
use skyline_common::SkylineError;
use thiserror::Error;

/// Errors produced by configuration validation.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// A field that must be strictly positive was not
    #[error("field must be positive: {field}")]
    NonPositive {
        /// Offending field name
        field: &'static str,
    },
    /// A pair of fields form an empty or inverted range
    #[error("invalid range: {field} (min {min} >= max {max})")]
    InvalidRange {
        /// Offending field name
        field: &'static str,
        /// Lower bound supplied
        min: f32,
        /// Upper bound supplied
        max: f32,
    },
}

/// Tuning for a single player attack.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttackTuning {
    /// Base damage before the combo multiplier
    pub damage: i32,
    /// Horizontal reach of the hitbox in world units
    pub range: f32,
    /// Total state duration in milliseconds
    pub duration_ms: f32,
    /// Horizontal knockback speed applied to the victim
    pub knockback: f32,
    /// Vertical launch velocity applied to the victim (negative = up)
    pub launch: f32,
    /// Cooldown before another attack may start
    pub cooldown_ms: f32,
}

/// Player movement and combat tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerTuning {
    /// Maximum health
    pub max_health: i32,
    /// Ground run speed
    pub speed: f32,
    /// Initial jump velocity (negative = up)
    pub jump_velocity: f32,
    /// Fraction of run speed available as in-air steering
    pub air_control: f32,
    /// Collision body width
    pub body_width: f32,
    /// Collision body height
    pub body_height: f32,
    /// Velocity clamp, horizontal
    pub max_vel_x: f32,
    /// Velocity clamp, vertical
    pub max_vel_y: f32,
    /// Invulnerability window after taking damage
    pub invuln_ms: f32,
    /// Duration of the hit-reaction state
    pub hit_recover_ms: f32,
    /// Duration of the landing state
    pub land_ms: f32,
    /// Punch attack
    pub punch: AttackTuning,
    /// Window for chaining punches into the three-stage combo
    pub punch_chain_ms: f32,
    /// Kick attack
    pub kick: AttackTuning,
    /// Dive kick travel speed
    pub dive_kick_speed: f32,
    /// Dive kick attack (duration unused; the state ends on landing)
    pub dive_kick: AttackTuning,
    /// Radius of the shockwave when a dive kick lands
    pub dive_kick_shock_radius: f32,
    /// Swing kick attack; damage scales up with current speed
    pub swing_kick: AttackTuning,
    /// Speed divisor for bonus swing-kick damage
    pub swing_kick_speed_per_damage: f32,
    /// Web shot: applies stun, never damage
    pub web_shot: AttackTuning,
    /// Stun inflicted by a connecting web shot
    pub web_shot_stun_ms: f32,
    /// Web pull reach
    pub web_pull_range: f32,
    /// Total duration of the pull state
    pub web_pull_duration_ms: f32,
    /// Stun applied to the tagged enemy on top of the pull duration
    pub web_pull_stun_ms: f32,
    /// Horizontal speed at which a tagged enemy is reeled in
    pub web_pull_speed: f32,
    /// Distance at which the reel stops and the enemy is parked
    pub web_pull_close_distance: f32,
    /// Cooldown charged when starting a web pull
    pub web_pull_cooldown_ms: f32,
}

/// Web-swing (rope constraint) tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WebTuning {
    /// Shortest rope the attach will produce
    pub min_length: f32,
    /// Longest rope the attach will produce
    pub max_length: f32,
    /// Re-attach cooldown after release
    pub cooldown_ms: f32,
    /// Tangential impulse per pump
    pub pump_force: f32,
    /// Velocity multiplier rewarded on release
    pub release_boost: f32,
    /// How far ahead of the velocity direction the anchor lands
    pub attach_ahead: f32,
    /// Horizontal jitter applied to the anchor point
    pub attach_jitter: f32,
    /// Vertical band below the ceiling in which anchors appear
    pub ceiling_band: f32,
}

/// Combo meter tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComboTuning {
    /// Time allowed between hits before the combo resets
    pub timeout_ms: f32,
    /// Damage/score bonus per combo count
    pub damage_bonus: f32,
    /// Base score granted per landed hit
    pub score_per_hit: u32,
    /// Combo count at which the milestone signal fires
    pub milestone: u32,
}

/// Hitstop freeze durations by impact weight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HitstopTuning {
    /// Light impacts (punch)
    pub light_ms: f32,
    /// Medium impacts (kick)
    pub medium_ms: f32,
    /// Heavy impacts (dive kick, swing kick)
    pub heavy_ms: f32,
}

/// Wave director tuning (infinite-scaling policy).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnTuning {
    /// World-x distance between wave triggers
    pub trigger_interval: f32,
    /// Enemies in the first wave
    pub base_count: u32,
    /// Waves per additional enemy in the batch
    pub count_growth_waves: u32,
    /// Cap on the non-boss batch size
    pub max_count: u32,
    /// Horizontal offset ahead of the trigger for the first spawn
    pub spawn_ahead: f32,
    /// Spacing between spawned enemies
    pub spawn_spacing: f32,
    /// Every Nth wave carries a boss
    pub boss_modulus: u32,
    /// Per-wave hp multiplier growth
    pub hp_growth: f32,
    /// Per-wave damage multiplier growth
    pub damage_growth: f32,
    /// Per-wave speed multiplier growth
    pub speed_growth: f32,
}

/// Complete simulation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    /// Downward acceleration in units/s^2
    pub gravity: f32,
    /// Y coordinate of the ground plane
    pub ground_y: f32,
    /// Y coordinate of the ceiling band used for web anchors
    pub ceiling_y: f32,
    /// Left world boundary the player cannot cross
    pub left_bound: f32,
    /// Ceiling on a single frame delta, in milliseconds
    pub delta_clamp_ms: f32,
    /// Seed for the injected random source
    pub rng_seed: u64,
    /// Milliseconds a dead enemy's ragdoll persists before culling
    pub ragdoll_lifetime_ms: f32,
    /// Interval between grab damage ticks
    pub grab_tick_ms: f32,
    /// Player tuning
    pub player: PlayerTuning,
    /// Web swing tuning
    pub web: WebTuning,
    /// Combo tuning
    pub combo: ComboTuning,
    /// Hitstop tuning
    pub hitstop: HitstopTuning,
    /// Wave director tuning
    pub spawn: SpawnTuning,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            gravity: 1200.0,
            ground_y: 550.0,
            ceiling_y: 60.0,
            left_bound: 20.0,
            delta_clamp_ms: 50.0,
            rng_seed: 0x5eed,
            ragdoll_lifetime_ms: 3000.0,
            grab_tick_ms: 500.0,
            player: PlayerTuning {
                max_health: 100,
                speed: 300.0,
                jump_velocity: -550.0,
                air_control: 0.6,
                body_width: 36.0,
                body_height: 56.0,
                max_vel_x: 800.0,
                max_vel_y: 1000.0,
                invuln_ms: 500.0,
                hit_recover_ms: 300.0,
                land_ms: 100.0,
                punch: AttackTuning {
                    damage: 8,
                    range: 50.0,
                    duration_ms: 250.0,
                    knockback: 200.0,
                    launch: -150.0,
                    cooldown_ms: 100.0,
                },
                punch_chain_ms: 400.0,
                kick: AttackTuning {
                    damage: 12,
                    range: 60.0,
                    duration_ms: 350.0,
                    knockback: 300.0,
                    launch: -250.0,
                    cooldown_ms: 150.0,
                },
                dive_kick_speed: 700.0,
                dive_kick: AttackTuning {
                    damage: 15,
                    range: 80.0,
                    duration_ms: 0.0,
                    knockback: 350.0,
                    launch: -300.0,
                    cooldown_ms: 200.0,
                },
                dive_kick_shock_radius: 180.0,
                swing_kick: AttackTuning {
                    damage: 10,
                    range: 90.0,
                    duration_ms: 300.0,
                    knockback: 400.0,
                    launch: -350.0,
                    cooldown_ms: 0.0,
                },
                swing_kick_speed_per_damage: 30.0,
                web_shot: AttackTuning {
                    damage: 0,
                    range: 260.0,
                    duration_ms: 200.0,
                    knockback: 0.0,
                    launch: 0.0,
                    cooldown_ms: 300.0,
                },
                web_shot_stun_ms: 1500.0,
                web_pull_range: 300.0,
                web_pull_duration_ms: 900.0,
                web_pull_stun_ms: 800.0,
                web_pull_speed: 600.0,
                web_pull_close_distance: 50.0,
                web_pull_cooldown_ms: 400.0,
            },
            web: WebTuning {
                min_length: 100.0,
                max_length: 260.0,
                cooldown_ms: 300.0,
                pump_force: 900.0,
                release_boost: 1.15,
                attach_ahead: 120.0,
                attach_jitter: 40.0,
                ceiling_band: 30.0,
            },
            combo: ComboTuning {
                timeout_ms: 2000.0,
                damage_bonus: 0.1,
                score_per_hit: 10,
                milestone: 5,
            },
            hitstop: HitstopTuning {
                light_ms: 40.0,
                medium_ms: 60.0,
                heavy_ms: 90.0,
            },
            spawn: SpawnTuning {
                trigger_interval: 700.0,
                base_count: 2,
                count_growth_waves: 2,
                max_count: 6,
                spawn_ahead: 400.0,
                spawn_spacing: 140.0,
                boss_modulus: 3,
                hp_growth: 0.15,
                damage_growth: 0.10,
                speed_growth: 0.05,
            },
        }
    }
}

impl SimConfig {
    /// Validates the configuration.
    ///
    /// Rejects non-positive world constants and inverted ranges; the
    /// simulation constructor calls this so a bad config is caught
    /// before the first tick.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.gravity <= 0.0 {
            return Err(ConfigError::NonPositive { field: "gravity" });
        }
        if self.delta_clamp_ms <= 0.0 {
            return Err(ConfigError::NonPositive {
                field: "delta_clamp_ms",
            });
        }
        if self.grab_tick_ms <= 0.0 {
            return Err(ConfigError::NonPositive {
                field: "grab_tick_ms",
            });
        }
        if self.ceiling_y >= self.ground_y {
            return Err(ConfigError::InvalidRange {
                field: "ceiling_y/ground_y",
                min: self.ceiling_y,
                max: self.ground_y,
            });
        }
        if self.web.min_length >= self.web.max_length {
            return Err(ConfigError::InvalidRange {
                field: "web.min_length/web.max_length",
                min: self.web.min_length,
                max: self.web.max_length,
            });
        }
        if self.player.max_health <= 0 {
            return Err(ConfigError::NonPositive {
                field: "player.max_health",
            });
        }
        if self.spawn.boss_modulus == 0 {
            return Err(ConfigError::NonPositive {
                field: "spawn.boss_modulus",
            });
        }
        if self.combo.damage_bonus < 0.0 {
            return Err(ConfigError::NonPositive {
                field: "combo.damage_bonus",
            });
        }
        Ok(())
    }

    /// Parses and validates a configuration from a JSON tuning file.
    pub fn from_json(json: &str) -> Result<Self, SkylineError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| SkylineError::Serialization(e.to_string()))?;
        config
            .validate()
            .map_err(|e| SkylineError::Config(e.to_string()))?;
        Ok(config)
    }

    /// Serializes the configuration as pretty JSON.
    pub fn to_json(&self) -> Result<String, SkylineError> {
        serde_json::to_string_pretty(self).map_err(|e| SkylineError::Serialization(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        assert!(SimConfig::default().validate().is_ok());
    }

    #[test]
    fn test_inverted_web_lengths_rejected() {
        let mut config = SimConfig::default();
        config.web.min_length = 300.0;
        config.web.max_length = 200.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_gravity_rejected() {
        let mut config = SimConfig::default();
        config.gravity = 0.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonPositive { field: "gravity" })
        ));
    }

    #[test]
    fn test_config_roundtrips_through_json() {
        let config = SimConfig::default();
        let json = config.to_json().expect("serialize");
        let back = SimConfig::from_json(&json).expect("deserialize");
        assert_eq!(config, back);
    }

    #[test]
    fn test_from_json_rejects_invalid_tuning() {
        let mut config = SimConfig::default();
        config.gravity = -9.8;
        let json = config.to_json().expect("serialize");
        assert!(matches!(
            SimConfig::from_json(&json),
            Err(SkylineError::Config(_))
        ));
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(matches!(
            SimConfig::from_json("not json"),
            Err(SkylineError::Serialization(_))
        ));
    }
}
