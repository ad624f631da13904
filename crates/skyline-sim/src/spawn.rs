//! Wave director: distance-triggered, infinitely scaling spawns.
//!
//! A wave triggers each time the player's world x crosses the next
//! interval boundary while no wave is active. Batches grow with the
//! wave counter up to a cap, every Nth wave swaps the batch for a
//! boss, and the same boss never headlines twice in a row.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::SimConfig;
use crate::enemy::EnemyArchetype;
use crate::rng::SimRng;

/// Per-wave stat multipliers applied to spawned enemies.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatScalers {
    /// Health multiplier
    pub hp: f32,
    /// Damage multiplier
    pub damage: f32,
    /// Speed multiplier
    pub speed: f32,
}

/// One enemy to be spawned.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnOrder {
    /// What to spawn
    pub archetype: EnemyArchetype,
    /// World x to spawn at
    pub x: f32,
    /// Stat scaling for this wave
    pub scalers: StatScalers,
}

/// Wave state and spawn policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaveDirector {
    /// Wave counter; the first spawned wave is 1
    pub wave: u32,
    /// Whether a wave's enemies are still alive
    pub wave_active: bool,
    next_trigger_x: f32,
    last_boss: Option<EnemyArchetype>,
    cleared_pending: bool,
}

impl WaveDirector {
    /// Creates a director with the first trigger one interval out.
    #[must_use]
    pub fn new(config: &SimConfig) -> Self {
        Self {
            wave: 0,
            wave_active: false,
            next_trigger_x: config.spawn.trigger_interval,
            last_boss: None,
            cleared_pending: false,
        }
    }

    /// Stat multipliers for a given wave number.
    #[must_use]
    pub fn scalers_for(wave: u32, config: &SimConfig) -> StatScalers {
        let steps = wave.saturating_sub(1) as f32;
        StatScalers {
            hp: 1.0 + config.spawn.hp_growth * steps,
            damage: 1.0 + config.spawn.damage_growth * steps,
            speed: 1.0 + config.spawn.speed_growth * steps,
        }
    }

    /// Whether the given wave number carries a boss.
    #[must_use]
    pub fn is_boss_wave(wave: u32, config: &SimConfig) -> bool {
        wave > 0 && wave % config.spawn.boss_modulus == 0
    }

    /// Advances the director.
    ///
    /// `world_x` is the player's world position and `alive_count` the
    /// number of living enemies. Returns the batch to spawn when a
    /// wave triggers, otherwise an empty vec.
    pub fn update(
        &mut self,
        world_x: f32,
        alive_count: usize,
        config: &SimConfig,
        rng: &mut SimRng,
    ) -> Vec<SpawnOrder> {
        if self.wave_active {
            if alive_count == 0 {
                self.wave_active = false;
                self.cleared_pending = true;
                debug!(wave = self.wave, "wave cleared");
            }
            return Vec::new();
        }

        if world_x < self.next_trigger_x {
            return Vec::new();
        }

        self.wave += 1;
        self.wave_active = true;
        self.next_trigger_x = world_x + config.spawn.trigger_interval;
        let scalers = Self::scalers_for(self.wave, config);

        let orders = if Self::is_boss_wave(self.wave, config) {
            let boss = self.pick_boss(rng);
            self.last_boss = Some(boss);
            vec![SpawnOrder {
                archetype: boss,
                x: world_x + config.spawn.spawn_ahead,
                scalers,
            }]
        } else {
            let count = (config.spawn.base_count + self.wave / config.spawn.count_growth_waves)
                .min(config.spawn.max_count);
            let pool = Self::pool_for(self.wave);
            (0..count)
                .map(|i| SpawnOrder {
                    archetype: *rng.choose(pool).unwrap_or(&EnemyArchetype::Thug),
                    x: world_x + config.spawn.spawn_ahead + i as f32 * config.spawn.spawn_spacing,
                    scalers,
                })
                .collect()
        };

        debug!(wave = self.wave, count = orders.len(), "wave spawned");
        orders
    }

    /// The non-boss pool widens as waves progress.
    fn pool_for(wave: u32) -> &'static [EnemyArchetype] {
        match wave {
            0..=1 => &[EnemyArchetype::Thug],
            2 => &[EnemyArchetype::Thug, EnemyArchetype::Ninja],
            3 => &[
                EnemyArchetype::Thug,
                EnemyArchetype::Ninja,
                EnemyArchetype::Brute,
            ],
            _ => &[
                EnemyArchetype::Thug,
                EnemyArchetype::Ninja,
                EnemyArchetype::Brute,
                EnemyArchetype::Bomber,
            ],
        }
    }

    /// Picks a boss, never repeating the previous one.
    fn pick_boss(&self, rng: &mut SimRng) -> EnemyArchetype {
        let candidates: Vec<EnemyArchetype> = EnemyArchetype::BOSSES
            .iter()
            .copied()
            .filter(|boss| Some(*boss) != self.last_boss)
            .collect();
        *rng.choose(&candidates).unwrap_or(&EnemyArchetype::Tyrant)
    }

    /// Takes the one-shot wave-cleared signal.
    pub fn take_wave_cleared(&mut self) -> bool {
        std::mem::take(&mut self.cleared_pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (WaveDirector, SimConfig, SimRng) {
        let config = SimConfig::default();
        let director = WaveDirector::new(&config);
        (director, config, SimRng::new(42))
    }

    /// Runs the director to the next trigger and returns the batch.
    fn trigger_next(
        director: &mut WaveDirector,
        config: &SimConfig,
        rng: &mut SimRng,
    ) -> Vec<SpawnOrder> {
        // Clear the active wave, then cross the next boundary.
        let _ = director.update(0.0, 0, config, rng);
        let far = director.next_trigger_x + 1.0;
        director.update(far, 0, config, rng)
    }

    #[test]
    fn test_first_wave_triggers_on_distance() {
        let (mut director, config, mut rng) = setup();

        assert!(director.update(100.0, 0, &config, &mut rng).is_empty());
        let orders = director
            .update(config.spawn.trigger_interval + 1.0, 0, &config, &mut rng);
        assert_eq!(director.wave, 1);
        assert_eq!(orders.len() as u32, config.spawn.base_count);
        assert!(orders.iter().all(|o| o.archetype == EnemyArchetype::Thug));
        assert!(director.wave_active);
    }

    #[test]
    fn test_no_retrigger_while_wave_active() {
        let (mut director, config, mut rng) = setup();
        let _ = director.update(config.spawn.trigger_interval + 1.0, 0, &config, &mut rng);
        assert!(director.wave_active);

        // Way past the next boundary, but three enemies still stand.
        let orders = director.update(10_000.0, 3, &config, &mut rng);
        assert!(orders.is_empty());
        assert_eq!(director.wave, 1);
    }

    #[test]
    fn test_wave_cleared_signal_is_take_once() {
        let (mut director, config, mut rng) = setup();
        let _ = director.update(config.spawn.trigger_interval + 1.0, 0, &config, &mut rng);

        let _ = director.update(10_000.0, 0, &config, &mut rng);
        assert!(director.take_wave_cleared());
        assert!(!director.take_wave_cleared());
    }

    #[test]
    fn test_every_third_wave_is_exactly_one_boss() {
        let (mut director, config, mut rng) = setup();
        assert_eq!(config.spawn.boss_modulus, 3);

        for _ in 0..2 {
            let orders = trigger_next(&mut director, &config, &mut rng);
            assert!(orders.iter().all(|o| !o.archetype.is_boss()));
        }

        let orders = trigger_next(&mut director, &config, &mut rng);
        assert_eq!(director.wave, 3);
        assert_eq!(orders.len(), 1);
        assert!(orders[0].archetype.is_boss());
    }

    #[test]
    fn test_boss_never_repeats_back_to_back() {
        let (mut director, config, mut rng) = setup();

        let mut last: Option<EnemyArchetype> = None;
        for _ in 0..30 {
            let orders = trigger_next(&mut director, &config, &mut rng);
            if WaveDirector::is_boss_wave(director.wave, &config) {
                let boss = orders[0].archetype;
                if let Some(prev) = last {
                    assert_ne!(boss, prev, "wave {}", director.wave);
                }
                last = Some(boss);
            }
        }
        assert!(last.is_some());
    }

    #[test]
    fn test_scalers_grow_per_wave() {
        let config = SimConfig::default();
        let w1 = WaveDirector::scalers_for(1, &config);
        assert!((w1.hp - 1.0).abs() < 1e-6);

        let w5 = WaveDirector::scalers_for(5, &config);
        assert!((w5.hp - 1.6).abs() < 1e-6); // 1 + 0.15 * 4
        assert!((w5.damage - 1.4).abs() < 1e-6);
        assert!((w5.speed - 1.2).abs() < 1e-6);
    }

    #[test]
    fn test_batch_grows_and_caps() {
        let (mut director, config, mut rng) = setup();

        let mut max_seen = 0;
        for _ in 0..20 {
            let orders = trigger_next(&mut director, &config, &mut rng);
            if !WaveDirector::is_boss_wave(director.wave, &config) {
                max_seen = max_seen.max(orders.len() as u32);
                assert!(orders.len() as u32 <= config.spawn.max_count);
            }
        }
        assert_eq!(max_seen, config.spawn.max_count);
    }
}
