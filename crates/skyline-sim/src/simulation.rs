//! Top-level simulation: owns every combatant and drives one frame
//! of the fixed update order.
//!
//! Per tick: player, dive-kick landing, web pull reel, enemies,
//! ordnance, player attack resolution, enemy attack resolution,
//! grabs, combo decay, wave director, ragdoll culling. Keeping the
//! order fixed is what makes a seeded run replayable.

use tracing::{debug, info};

use crate::combat;
use crate::combo::ComboMeter;
use crate::config::{ConfigError, SimConfig};
use crate::enemy::Enemy;
use crate::events::{EventBus, SimEvent};
use crate::input::{ButtonTracker, InputSnapshot, RawInput};
use crate::player::Player;
use crate::rng::SimRng;
use crate::spawn::WaveDirector;

/// The whole game simulation.
#[derive(Debug)]
pub struct Simulation {
    /// Tuning the simulation was built with
    pub config: SimConfig,
    /// The player combatant
    pub player: Player,
    /// All live enemies (including persisting ragdolls)
    pub enemies: Vec<Enemy>,
    /// Wave director
    pub director: WaveDirector,
    /// Combo meter
    pub combo: ComboMeter,
    /// Accumulated score
    pub score: u64,
    events: EventBus,
    tracker: ButtonTracker,
    rng: SimRng,
    time_scale: f32,
}

impl Simulation {
    /// Builds a simulation from a validated configuration.
    pub fn new(config: SimConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let player = Player::new(
            100.0,
            config.ground_y - config.player.body_height / 2.0,
            &config,
        );
        let director = WaveDirector::new(&config);
        let rng = SimRng::new(config.rng_seed);
        info!(seed = config.rng_seed, "simulation created");

        Ok(Self {
            player,
            enemies: Vec::new(),
            director,
            combo: ComboMeter::new(),
            score: 0,
            events: EventBus::default(),
            tracker: ButtonTracker::default(),
            rng,
            time_scale: 1.0,
            config,
        })
    }

    /// Current time scale.
    #[must_use]
    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    /// Sets the time scale (0 pauses; clamped to non-negative).
    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = scale.max(0.0);
    }

    /// Drains all events emitted since the last drain.
    pub fn drain_events(&self) -> Vec<SimEvent> {
        self.events.drain()
    }

    /// Number of living enemies.
    #[must_use]
    pub fn alive_enemies(&self) -> usize {
        self.enemies.iter().filter(|e| e.alive).count()
    }

    /// Advances the simulation by one frame from raw held-button
    /// state, edge-detecting internally.
    pub fn update(&mut self, delta_ms: f32, input: &RawInput) {
        let actions = self.tracker.snapshot(*input);
        self.update_with_snapshot(delta_ms, &actions);
    }

    /// Advances the simulation by one frame with a pre-built
    /// snapshot, for hosts that already edge-detect their input.
    ///
    /// The raw delta is clamped before the time scale applies, so a
    /// long hitch never becomes a tunnel-through-everything tick.
    pub fn update_with_snapshot(&mut self, delta_ms: f32, actions: &InputSnapshot) {
        let delta = delta_ms.min(self.config.delta_clamp_ms) * self.time_scale;
        if delta <= 0.0 {
            return;
        }

        self.player
            .update(delta, actions, &self.config, &mut self.rng, &self.events);

        if self.player.take_dive_kick_landing() {
            self.score += combat::resolve_dive_kick_shock(
                &mut self.player,
                &mut self.enemies,
                &mut self.combo,
                &self.config,
                &mut self.rng,
                &self.events,
            );
        }

        combat::resolve_web_pull(&mut self.player, &mut self.enemies, &self.config);

        let target = self.player.body.pos;
        for enemy in &mut self.enemies {
            enemy.update(delta, target, &self.config, &mut self.rng);
        }

        combat::resolve_ordnance(
            &mut self.player,
            &mut self.enemies,
            delta,
            &self.config,
            &self.events,
        );

        self.score += combat::resolve_player_attack(
            &mut self.player,
            &mut self.enemies,
            &mut self.combo,
            &self.config,
            &mut self.rng,
            &self.events,
        );

        combat::resolve_enemy_attacks(
            &mut self.player,
            &mut self.enemies,
            &self.config,
            &self.events,
        );

        combat::resolve_grabs(
            &mut self.player,
            &mut self.enemies,
            delta,
            &self.config,
            &self.events,
        );

        self.combo.update(delta);

        self.run_director();
        self.cull_ragdolls();
    }

    fn run_director(&mut self) {
        let alive = self.alive_enemies();
        let orders = self.director.update(
            self.player.body.pos.x,
            alive,
            &self.config,
            &mut self.rng,
        );

        if self.director.take_wave_cleared() {
            self.events.send(SimEvent::WaveCleared {
                wave: self.director.wave,
            });
        }

        if orders.is_empty() {
            return;
        }

        let count = orders.len() as u32;
        for order in orders {
            let ty = order
                .archetype
                .descriptor()
                .scaled(order.scalers.hp, order.scalers.damage, order.scalers.speed);
            let y = if ty.flying {
                self.config.ground_y - 250.0
            } else {
                self.config.ground_y - ty.body_height / 2.0
            };
            self.enemies
                .push(Enemy::new(order.archetype, ty, order.x, y, &mut self.rng));
        }
        debug!(wave = self.director.wave, count, "spawned wave batch");
        self.events.send(SimEvent::WaveSpawned {
            wave: self.director.wave,
            count,
        });
    }

    fn cull_ragdolls(&mut self) {
        let lifetime = self.config.ragdoll_lifetime_ms;
        self.enemies
            .retain(|e| e.alive || e.death_timer < lifetime);
    }
}
