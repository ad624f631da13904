//! Player combatant state machine.
//!
//! A single discrete state is active at a time; every transition
//! goes through [`Player::enter_state`], which zeroes the state
//! timer. The timer is the sole driver of attack windows and pose
//! interpolation and is never read across a transition.

use serde::{Deserialize, Serialize};
use skyline_common::EntityId;

use crate::attack::{ActiveWindow, AttackDescriptor, AttackKind};
use crate::config::SimConfig;
use crate::events::{EventBus, SimEvent};
use crate::input::{InputSnapshot, Vec2};
use crate::physics::{KinematicBody, AABB};
use crate::rng::SimRng;
use crate::rope::RopeConstraint;

/// Discrete player states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerState {
    /// Standing on the ground
    Idle,
    /// Running on the ground
    Run,
    /// Ascending after a jump
    Jump,
    /// Descending in the air
    Fall,
    /// Brief landing recovery
    Land,
    /// Hanging from an attached web rope
    Swing,
    /// Attacking while rope-constrained
    SwingKick,
    /// Jab attack
    Punch,
    /// Kick attack
    Kick,
    /// Downward air attack, ends on landing
    DiveKick,
    /// Stunning web projectile
    WebShot,
    /// Tagging an enemy and reeling it in
    WebPull,
    /// Hit reaction; always returns to Idle or Fall
    Hit,
}

/// Grace period before a web pull may cancel into a strike.
const PULL_CANCEL_GRACE_MS: f32 = 200.0;

/// Minimum swing time before a bare hold-release ends the swing.
const SWING_MIN_HOLD_MS: f32 = 100.0;

const PUNCH_WINDOW: ActiveWindow = ActiveWindow::new(0.25, 0.6);
const KICK_WINDOW: ActiveWindow = ActiveWindow::new(0.2, 0.6);
const SWING_KICK_WINDOW: ActiveWindow = ActiveWindow::new(0.0, 0.85);
const WEB_SHOT_WINDOW: ActiveWindow = ActiveWindow::new(0.25, 0.75);
const WEB_PULL_WINDOW: ActiveWindow = ActiveWindow::new(0.05, 0.25);

/// The player combatant.
#[derive(Debug, Clone)]
pub struct Player {
    /// Stable identity
    pub id: EntityId,
    /// Kinematic body, owned exclusively by this combatant
    pub body: KinematicBody,
    /// Web rope constraint
    pub rope: RopeConstraint,
    /// Facing direction
    pub facing_right: bool,
    /// Current health
    pub health: i32,
    /// Maximum health
    pub max_health: i32,
    /// Set once the current attack activation has connected
    pub has_hit: bool,
    /// Enemy currently tagged for the web pull, if any
    pub pull_target: Option<EntityId>,
    state: PlayerState,
    state_timer: f32,
    attack_cooldown: f32,
    punch_stage: u8,
    punch_chain_timer: f32,
    invuln_timer: f32,
    hitstop_timer: f32,
    dive_kick_active: bool,
    dive_kick_landed: bool,
    pull_timer: f32,
    was_grounded: bool,
}

impl Player {
    /// Creates a player at a position.
    #[must_use]
    pub fn new(x: f32, y: f32, config: &SimConfig) -> Self {
        let tuning = &config.player;
        let mut body = KinematicBody::new(x, y, tuning.body_width, tuning.body_height);
        body.set_max_velocity(tuning.max_vel_x, tuning.max_vel_y);

        Self {
            id: EntityId::new(),
            body,
            rope: RopeConstraint::new(),
            facing_right: true,
            health: tuning.max_health,
            max_health: tuning.max_health,
            has_hit: false,
            pull_target: None,
            state: PlayerState::Idle,
            state_timer: 0.0,
            attack_cooldown: 0.0,
            punch_stage: 0,
            punch_chain_timer: 0.0,
            invuln_timer: 0.0,
            hitstop_timer: 0.0,
            dive_kick_active: false,
            dive_kick_landed: false,
            pull_timer: 0.0,
            was_grounded: false,
        }
    }

    /// Current discrete state (pose key for rendering).
    #[must_use]
    pub fn state(&self) -> PlayerState {
        self.state
    }

    /// Milliseconds since the current state was entered.
    #[must_use]
    pub fn state_timer(&self) -> f32 {
        self.state_timer
    }

    /// Stage of the three-stage punch chain (pose hook).
    #[must_use]
    pub fn punch_stage(&self) -> u8 {
        self.punch_stage
    }

    /// Whether the damage-immunity window is running.
    #[must_use]
    pub fn is_invulnerable(&self) -> bool {
        self.invuln_timer > 0.0
    }

    /// Whether health has been exhausted.
    #[must_use]
    pub fn is_dead(&self) -> bool {
        self.health <= 0
    }

    /// Freezes this combatant's timers for the given duration.
    pub fn apply_hitstop(&mut self, ms: f32) {
        self.hitstop_timer = ms;
    }

    /// Takes and clears the dive-kick-landed flag; the caller
    /// resolves the landing shockwave on the tick this returns true.
    pub fn take_dive_kick_landing(&mut self) -> bool {
        std::mem::take(&mut self.dive_kick_landed)
    }

    /// Drops the web-pull coupling. Ending the relationship from the
    /// player side is sufficient; the enemy holds no back-pointer.
    pub fn release_pull_target(&mut self) {
        self.pull_target = None;
    }

    /// Advances one tick.
    pub fn update(
        &mut self,
        delta_ms: f32,
        actions: &InputSnapshot,
        config: &SimConfig,
        rng: &mut SimRng,
        events: &EventBus,
    ) {
        // Hitstop freezes every timer this combatant owns except the
        // hitstop countdown itself.
        if self.hitstop_timer > 0.0 {
            self.hitstop_timer -= delta_ms;
            return;
        }

        self.was_grounded = self.body.on_ground;
        self.body
            .update(delta_ms, config.gravity, config.ground_y);
        self.rope.update(delta_ms, &mut self.body);

        self.state_timer += delta_ms;

        if self.invuln_timer > 0.0 {
            self.invuln_timer -= delta_ms;
        }
        if self.attack_cooldown > 0.0 {
            self.attack_cooldown -= delta_ms;
        }
        if self.punch_chain_timer > 0.0 {
            self.punch_chain_timer -= delta_ms;
            if self.punch_chain_timer <= 0.0 {
                self.punch_stage = 0;
            }
        }

        match self.state {
            PlayerState::Idle | PlayerState::Run => {
                self.handle_ground(actions, config, rng, events);
            }
            PlayerState::Jump | PlayerState::Fall => {
                self.handle_air(delta_ms, actions, config, rng, events);
            }
            PlayerState::Swing => self.handle_swing(actions, config, events),
            PlayerState::SwingKick => self.handle_swing_kick(actions, config, events),
            PlayerState::Punch | PlayerState::Kick | PlayerState::WebShot => {
                self.handle_attack(config);
            }
            PlayerState::DiveKick => self.handle_dive_kick(events),
            PlayerState::WebPull => self.handle_web_pull(delta_ms, actions, config),
            PlayerState::Hit => self.handle_hit(config),
            PlayerState::Land => self.handle_land(config),
        }

        // Endless right scroll: only the left edge is a wall.
        if self.body.pos.x < config.left_bound {
            self.body.pos.x = config.left_bound;
        }
    }

    fn enter_state(&mut self, next: PlayerState) {
        self.state = next;
        self.state_timer = 0.0;
    }

    fn handle_ground(
        &mut self,
        actions: &InputSnapshot,
        config: &SimConfig,
        rng: &mut SimRng,
        events: &EventBus,
    ) {
        if self.body.on_ground && !self.was_grounded {
            events.send(SimEvent::PlayerLanded);
        }

        // Walked off an edge.
        if !self.body.on_ground {
            self.enter_state(PlayerState::Fall);
            return;
        }

        let tuning = &config.player;
        let moving = if actions.left {
            self.body.vel.x = -tuning.speed;
            self.facing_right = false;
            true
        } else if actions.right {
            self.body.vel.x = tuning.speed;
            self.facing_right = true;
            true
        } else {
            self.body.vel.x = 0.0;
            false
        };

        let next = if moving {
            PlayerState::Run
        } else {
            PlayerState::Idle
        };
        if next != self.state {
            self.enter_state(next);
        }

        if actions.jump {
            self.body.vel.y = tuning.jump_velocity;
            self.enter_state(PlayerState::Jump);
            events.send(SimEvent::PlayerJumped);
            return;
        }

        if actions.web_hold || actions.web_hold_start {
            self.try_start_swing(config, rng, events);
            return;
        }

        if self.try_web_attacks(actions, config) {
            return;
        }
        self.try_strikes(actions, config, false);
    }

    fn handle_air(
        &mut self,
        delta_ms: f32,
        actions: &InputSnapshot,
        config: &SimConfig,
        rng: &mut SimRng,
        events: &EventBus,
    ) {
        let tuning = &config.player;

        // Air steering is a fraction of ground acceleration.
        let steer = tuning.speed * tuning.air_control * (delta_ms / 1000.0) * 10.0;
        if actions.left {
            self.body.vel.x -= steer;
            self.facing_right = false;
        } else if actions.right {
            self.body.vel.x += steer;
            self.facing_right = true;
        }

        if self.body.vel.y > 0.0 && self.state == PlayerState::Jump {
            self.enter_state(PlayerState::Fall);
        }

        if actions.web_hold || actions.web_hold_start {
            self.try_start_swing(config, rng, events);
            return;
        }

        if self.try_web_attacks(actions, config) {
            return;
        }

        // Dive kick: down + kick while airborne.
        if actions.down && actions.kick && self.attack_cooldown <= 0.0 {
            self.enter_state(PlayerState::DiveKick);
            self.dive_kick_active = true;
            self.has_hit = false;
            self.attack_cooldown = tuning.dive_kick.cooldown_ms;
            let dir = if self.facing_right { 1.0 } else { -1.0 };
            self.body.vel = Vec2::new(dir * tuning.dive_kick_speed * 0.5, tuning.dive_kick_speed);
            return;
        }

        if self.try_strikes(actions, config, true) {
            return;
        }

        if self.body.on_ground {
            self.enter_state(PlayerState::Land);
            events.send(SimEvent::PlayerLanded);
        }
    }

    /// Web shot / web pull starters shared by ground and air.
    fn try_web_attacks(&mut self, actions: &InputSnapshot, config: &SimConfig) -> bool {
        let tuning = &config.player;
        if actions.down && actions.web_shoot && self.attack_cooldown <= 0.0 {
            self.enter_state(PlayerState::WebPull);
            self.has_hit = false;
            self.pull_target = None;
            self.pull_timer = 0.0;
            self.attack_cooldown = tuning.web_pull_cooldown_ms;
            return true;
        }
        if actions.web_shoot && self.attack_cooldown <= 0.0 {
            self.enter_state(PlayerState::WebShot);
            self.has_hit = false;
            self.attack_cooldown = tuning.web_shot.cooldown_ms;
            return true;
        }
        false
    }

    /// Punch/kick starters shared by ground and air.
    fn try_strikes(&mut self, actions: &InputSnapshot, config: &SimConfig, airborne: bool) -> bool {
        if self.attack_cooldown > 0.0 {
            return false;
        }
        let tuning = &config.player;
        if actions.punch {
            self.punch_stage = if self.punch_chain_timer > 0.0 {
                (self.punch_stage + 1) % 3
            } else {
                0
            };
            self.punch_chain_timer = tuning.punch_chain_ms;
            self.enter_state(PlayerState::Punch);
            self.has_hit = false;
            self.attack_cooldown = if airborne {
                tuning.punch.cooldown_ms * 1.5
            } else {
                tuning.punch.cooldown_ms
            };
            return true;
        }
        if actions.kick {
            self.enter_state(PlayerState::Kick);
            self.has_hit = false;
            self.attack_cooldown = if airborne {
                tuning.kick.cooldown_ms * 1.5
            } else {
                tuning.kick.cooldown_ms
            };
            return true;
        }
        false
    }

    fn try_start_swing(&mut self, config: &SimConfig, rng: &mut SimRng, events: &EventBus) {
        if self.rope.cooldown_timer > 0.0 {
            return;
        }
        if self
            .rope
            .attach(self.body.pos, self.body.vel.x, config, rng)
        {
            self.enter_state(PlayerState::Swing);
            events.send(SimEvent::WebAttached {
                anchor: self.rope.anchor,
            });
        }
    }

    fn handle_swing(&mut self, actions: &InputSnapshot, config: &SimConfig, events: &EventBus) {
        if actions.left {
            self.rope.pump(-1.0, &mut self.body, config);
            self.facing_right = false;
        } else if actions.right {
            self.rope.pump(1.0, &mut self.body, config);
            self.facing_right = true;
        }

        // Attack out of the swing.
        if actions.punch || actions.kick {
            self.enter_state(PlayerState::SwingKick);
            self.has_hit = false;
            return;
        }

        let hold_lapsed =
            !actions.web_hold && !actions.web_hold_start && self.state_timer > SWING_MIN_HOLD_MS;
        if actions.web_release || hold_lapsed {
            self.release_swing(config, events);
            let next = if self.body.vel.y < 0.0 {
                PlayerState::Jump
            } else {
                PlayerState::Fall
            };
            self.enter_state(next);
            return;
        }

        if self.body.on_ground && self.body.vel.y >= 0.0 {
            self.rope.release(config);
            self.enter_state(PlayerState::Land);
            events.send(SimEvent::PlayerLanded);
        }
    }

    fn handle_swing_kick(&mut self, actions: &InputSnapshot, config: &SimConfig, events: &EventBus) {
        if actions.left {
            self.rope.pump(-1.0, &mut self.body, config);
        } else if actions.right {
            self.rope.pump(1.0, &mut self.body, config);
        }

        if self.state_timer > config.player.swing_kick.duration_ms {
            let next = if self.rope.active {
                PlayerState::Swing
            } else {
                PlayerState::Fall
            };
            self.enter_state(next);
            return;
        }

        if actions.web_release || !actions.web_hold {
            self.release_swing(config, events);
            self.enter_state(PlayerState::Fall);
            return;
        }

        if self.body.on_ground {
            self.rope.release(config);
            self.enter_state(PlayerState::Land);
            events.send(SimEvent::PlayerLanded);
        }
    }

    /// Applies the release boost and detaches the rope.
    fn release_swing(&mut self, config: &SimConfig, events: &EventBus) {
        let boost = self.rope.release_velocity(&self.body, config);
        self.rope.release(config);
        self.body.vel = boost;
        events.send(SimEvent::WebReleased);
    }

    fn handle_attack(&mut self, config: &SimConfig) {
        let tuning = &config.player;
        let duration = match self.state {
            PlayerState::Punch => tuning.punch.duration_ms,
            PlayerState::Kick => tuning.kick.duration_ms,
            PlayerState::WebShot => tuning.web_shot.duration_ms,
            _ => 250.0,
        };

        if self.state_timer >= duration {
            let next = if self.body.on_ground {
                PlayerState::Idle
            } else {
                PlayerState::Fall
            };
            self.enter_state(next);
        }
    }

    fn handle_dive_kick(&mut self, events: &EventBus) {
        if self.body.on_ground {
            self.dive_kick_active = false;
            self.dive_kick_landed = true;
            self.enter_state(PlayerState::Land);
            events.send(SimEvent::PlayerLanded);
        }
    }

    fn handle_web_pull(&mut self, delta_ms: f32, actions: &InputSnapshot, config: &SimConfig) {
        let tuning = &config.player;
        self.pull_timer += delta_ms;

        // Cancel into a follow-up strike once the grace period is up.
        if self.pull_timer > PULL_CANCEL_GRACE_MS && self.attack_cooldown <= 0.0 {
            if actions.punch {
                self.release_pull_target();
                self.enter_state(PlayerState::Punch);
                self.has_hit = false;
                self.attack_cooldown = tuning.punch.cooldown_ms;
                return;
            }
            if actions.kick {
                self.release_pull_target();
                self.enter_state(PlayerState::Kick);
                self.has_hit = false;
                self.attack_cooldown = tuning.kick.cooldown_ms;
                return;
            }
        }

        if self.pull_timer >= tuning.web_pull_duration_ms {
            self.release_pull_target();
            let next = if self.body.on_ground {
                PlayerState::Idle
            } else {
                PlayerState::Fall
            };
            self.enter_state(next);
        }
    }

    fn handle_hit(&mut self, config: &SimConfig) {
        if self.state_timer > config.player.hit_recover_ms {
            let next = if self.body.on_ground {
                PlayerState::Idle
            } else {
                PlayerState::Fall
            };
            self.enter_state(next);
        }
    }

    fn handle_land(&mut self, config: &SimConfig) {
        if self.state_timer > config.player.land_ms {
            self.enter_state(PlayerState::Idle);
        }
    }

    /// Whether the current state can produce a hitbox.
    #[must_use]
    pub fn is_attacking(&self) -> bool {
        matches!(
            self.state,
            PlayerState::Punch
                | PlayerState::Kick
                | PlayerState::DiveKick
                | PlayerState::SwingKick
                | PlayerState::WebShot
                | PlayerState::WebPull
        )
    }

    /// Whether the state timer sits inside the attack's active
    /// window this tick.
    #[must_use]
    pub fn is_on_active_frame(&self, config: &SimConfig) -> bool {
        let tuning = &config.player;
        match self.state {
            PlayerState::Punch => PUNCH_WINDOW.contains(self.state_timer, tuning.punch.duration_ms),
            PlayerState::Kick => KICK_WINDOW.contains(self.state_timer, tuning.kick.duration_ms),
            PlayerState::DiveKick => self.dive_kick_active,
            PlayerState::SwingKick => {
                SWING_KICK_WINDOW.contains(self.state_timer, tuning.swing_kick.duration_ms)
            }
            PlayerState::WebShot => {
                WEB_SHOT_WINDOW.contains(self.state_timer, tuning.web_shot.duration_ms)
            }
            PlayerState::WebPull => {
                WEB_PULL_WINDOW.contains(self.state_timer, tuning.web_pull_duration_ms)
            }
            _ => false,
        }
    }

    /// Derives the attack descriptor for the current state.
    #[must_use]
    pub fn attack_descriptor(&self, config: &SimConfig) -> Option<AttackDescriptor> {
        let tuning = &config.player;
        match self.state {
            PlayerState::Punch => Some(
                AttackDescriptor::strike(
                    AttackKind::Punch,
                    tuning.punch.damage,
                    tuning.punch.range,
                    tuning.punch.knockback,
                )
                .with_launch(tuning.punch.launch),
            ),
            PlayerState::Kick => Some(
                AttackDescriptor::strike(
                    AttackKind::Kick,
                    tuning.kick.damage,
                    tuning.kick.range,
                    tuning.kick.knockback,
                )
                .with_launch(tuning.kick.launch),
            ),
            PlayerState::DiveKick => Some(
                AttackDescriptor::strike(
                    AttackKind::DiveKick,
                    tuning.dive_kick.damage,
                    tuning.dive_kick.range,
                    tuning.dive_kick.knockback,
                )
                .with_launch(tuning.dive_kick.launch),
            ),
            PlayerState::SwingKick => {
                // Momentum feeds the damage: faster swings hit harder.
                let speed = self.body.vel.length();
                let bonus = (speed / tuning.swing_kick_speed_per_damage).floor() as i32;
                Some(
                    AttackDescriptor::strike(
                        AttackKind::SwingKick,
                        tuning.swing_kick.damage + bonus,
                        tuning.swing_kick.range,
                        tuning.swing_kick.knockback,
                    )
                    .with_launch(tuning.swing_kick.launch),
                )
            }
            PlayerState::WebShot => Some(
                AttackDescriptor::strike(
                    AttackKind::WebShot,
                    tuning.web_shot.damage,
                    tuning.web_shot.range,
                    0.0,
                )
                .with_launch(0.0)
                .with_stun(tuning.web_shot_stun_ms),
            ),
            PlayerState::WebPull => Some(
                AttackDescriptor::strike(AttackKind::WebPull, 0, tuning.web_pull_range, 0.0)
                    .with_launch(0.0)
                    .with_stun(tuning.web_pull_stun_ms),
            ),
            _ => None,
        }
    }

    /// Hitbox for the current attack, if any.
    #[must_use]
    pub fn hitbox(&self, config: &SimConfig) -> Option<AABB> {
        let attack = self.attack_descriptor(config)?;
        let tuning = &config.player;
        let pos = self.body.pos;
        let dir_right = self.facing_right;

        let rect = match attack.kind {
            AttackKind::WebShot | AttackKind::WebPull => {
                // Long horizontal beam at chest height.
                let x = if dir_right { pos.x } else { pos.x - attack.range };
                AABB::from_rect(x, pos.y - 10.0, attack.range, 20.0)
            }
            AttackKind::DiveKick => AABB::from_rect(pos.x - 25.0, pos.y - 10.0, 50.0, 40.0),
            AttackKind::SwingKick => {
                let x = if dir_right { pos.x } else { pos.x - attack.range };
                AABB::from_rect(x, pos.y - 20.0, attack.range, 40.0)
            }
            _ => {
                let x = if dir_right {
                    pos.x + tuning.body_width / 2.0
                } else {
                    pos.x - tuning.body_width / 2.0 - attack.range
                };
                AABB::from_rect(
                    x,
                    pos.y - tuning.body_height / 2.0,
                    attack.range,
                    tuning.body_height,
                )
            }
        };
        Some(rect)
    }

    /// Hurtbox: the collision body rectangle.
    #[must_use]
    pub fn hurtbox(&self) -> AABB {
        self.body.aabb()
    }

    /// Applies incoming damage.
    ///
    /// No-op (returns false) while invulnerable or already reeling
    /// from a hit; otherwise knocks back, enters Hit, starts the
    /// invulnerability window, and drops any web or pull coupling.
    pub fn take_damage(
        &mut self,
        amount: i32,
        knockback_x: f32,
        config: &SimConfig,
        events: &EventBus,
    ) -> bool {
        if self.invuln_timer > 0.0 || self.state == PlayerState::Hit {
            return false;
        }

        self.health = (self.health - amount).max(0);
        self.body.vel = Vec2::new(knockback_x, -150.0);
        self.enter_state(PlayerState::Hit);
        self.invuln_timer = config.player.invuln_ms;

        if self.rope.active {
            self.rope.release(config);
        }
        self.release_pull_target();

        events.send(SimEvent::PlayerDamaged {
            damage: amount,
            health: self.health,
        });
        true
    }
}
