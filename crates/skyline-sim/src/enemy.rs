//! Enemy combatants: archetype stat tables, the shared state
//! machine, and the AI decision ladder.
//!
//! Archetype stats are data; behavior flags on [`EnemyType`] gate
//! which rungs of the AI ladder an enemy can take. Bosses are plain
//! enemies with more rungs, a regen trickle and a score to match.

use serde::{Deserialize, Serialize};
use skyline_common::EntityId;
use tracing::debug;

use crate::attack::{ActiveWindow, AttackDescriptor, AttackKind};
use crate::config::SimConfig;
use crate::input::Vec2;
use crate::physics::{KinematicBody, AABB};
use crate::rng::SimRng;

const HIT_RECOVER_MS: f32 = 250.0;
const FLEE_MS: f32 = 800.0;
const LEAP_MS: f32 = 600.0;
const CHARGE_MS: f32 = 900.0;
const SWOOP_MS: f32 = 700.0;
const GROUND_POUND_RISE_MS: f32 = 400.0;
const GROUND_POUND_SLAM_MS: f32 = 300.0;
const THROW_MS: f32 = 600.0;

const MELEE_WINDOW: ActiveWindow = ActiveWindow::new(0.3, 0.7);
const TENDRIL_WINDOW: ActiveWindow = ActiveWindow::new(0.35, 0.75);
const SWEEP_WINDOW: ActiveWindow = ActiveWindow::new(0.3, 0.8);

/// Chance a grab is chosen over the lower rungs when in range.
const GRAB_CHANCE: f32 = 0.3;
/// Chance a ground pound is chosen when in range.
const GROUND_POUND_CHANCE: f32 = 0.4;

/// Ranged throw ability.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThrowSpec {
    /// Maximum distance at which a throw is considered
    pub range: f32,
    /// Projectile damage
    pub damage: i32,
    /// Projectile travel speed
    pub speed: f32,
}

/// Lobbed bomb ability.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BombSpec {
    /// Maximum distance at which a lob is considered
    pub range: f32,
    /// Blast damage
    pub damage: i32,
    /// Blast radius
    pub blast_radius: f32,
    /// Fuse time after the bomb comes to rest
    pub fuse_ms: f32,
}

/// Boss extended-reach tendril strike.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TendrilSpec {
    /// Strike reach
    pub range: f32,
    /// Strike damage
    pub damage: i32,
}

/// Boss grab-and-squeeze ability.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GrabSpec {
    /// Distance at which a grab connects
    pub range: f32,
    /// Damage per squeeze tick while held
    pub damage_per_tick: i32,
    /// Maximum hold duration
    pub duration_ms: f32,
}

/// Boss pouncing leap.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LeapSpec {
    /// Distance at which a leap is considered
    pub range: f32,
    /// Contact damage during the pounce
    pub damage: i32,
}

/// Boss tail sweep, hits both sides.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TailSweepSpec {
    /// Sweep reach on each side
    pub range: f32,
    /// Sweep damage
    pub damage: i32,
    /// Sweep duration
    pub duration_ms: f32,
}

/// Flying boss dive attack.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SwoopSpec {
    /// Distance at which a swoop is considered
    pub range: f32,
    /// Contact damage during the dive
    pub damage: i32,
}

/// Shoulder charge ability.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChargeSpec {
    /// Distance at which a charge is considered
    pub range: f32,
    /// Charge run speed
    pub speed: f32,
    /// Contact damage during the charge
    pub damage: i32,
}

/// Boss ground pound shockwave.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroundPoundSpec {
    /// Shockwave radius
    pub radius: f32,
    /// Shockwave damage
    pub damage: i32,
}

/// Full stat/behavior descriptor for an enemy archetype.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyType {
    /// Maximum health
    pub max_health: i32,
    /// Walk speed
    pub speed: f32,
    /// Basic melee damage
    pub melee_damage: i32,
    /// Basic melee reach
    pub melee_range: f32,
    /// Basic melee swing duration
    pub melee_duration_ms: f32,
    /// Cooldown between attacks; randomized 0.5x..1.0x per use
    pub attack_cooldown_ms: f32,
    /// Score awarded on kill
    pub score: u32,
    /// Collision body width
    pub body_width: f32,
    /// Collision body height
    pub body_height: f32,
    /// Chance to sidestep an incoming hit entirely
    pub dodge_chance: f32,
    /// Health regained per second (bosses)
    pub regen_per_s: f32,
    /// Marks a boss
    pub boss: bool,
    /// Hovers instead of walking; ignores gravity
    pub flying: bool,
    /// Backs off below this distance before re-engaging, if set
    pub flee_below: Option<f32>,
    /// Ranged throw, if any
    pub throw: Option<ThrowSpec>,
    /// Lobbed bomb, if any
    pub bomb: Option<BombSpec>,
    /// Tendril strike, if any
    pub tendril: Option<TendrilSpec>,
    /// Grab, if any
    pub grab: Option<GrabSpec>,
    /// Pouncing leap, if any
    pub leap: Option<LeapSpec>,
    /// Tail sweep, if any
    pub tail_sweep: Option<TailSweepSpec>,
    /// Swoop dive, if any
    pub swoop: Option<SwoopSpec>,
    /// Shoulder charge, if any
    pub charge: Option<ChargeSpec>,
    /// Ground pound, if any
    pub ground_pound: Option<GroundPoundSpec>,
}

impl EnemyType {
    /// Applies per-wave stat scaling.
    #[must_use]
    pub fn scaled(mut self, hp_mult: f32, damage_mult: f32, speed_mult: f32) -> Self {
        let scale_damage = |d: i32| ((d as f32) * damage_mult).round() as i32;

        self.max_health = ((self.max_health as f32) * hp_mult).round() as i32;
        self.speed *= speed_mult;
        self.melee_damage = scale_damage(self.melee_damage);
        if let Some(spec) = &mut self.throw {
            spec.damage = scale_damage(spec.damage);
        }
        if let Some(spec) = &mut self.bomb {
            spec.damage = scale_damage(spec.damage);
        }
        if let Some(spec) = &mut self.tendril {
            spec.damage = scale_damage(spec.damage);
        }
        if let Some(spec) = &mut self.grab {
            spec.damage_per_tick = scale_damage(spec.damage_per_tick);
        }
        if let Some(spec) = &mut self.leap {
            spec.damage = scale_damage(spec.damage);
        }
        if let Some(spec) = &mut self.tail_sweep {
            spec.damage = scale_damage(spec.damage);
        }
        if let Some(spec) = &mut self.swoop {
            spec.damage = scale_damage(spec.damage);
        }
        if let Some(spec) = &mut self.charge {
            spec.damage = scale_damage(spec.damage);
            spec.speed *= speed_mult;
        }
        if let Some(spec) = &mut self.ground_pound {
            spec.damage = scale_damage(spec.damage);
        }
        self
    }
}

/// The enemy roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyArchetype {
    /// Baseline melee walker
    Thug,
    /// Fast, dodges, throws knives, keeps its distance
    Ninja,
    /// Slow, tough, shoulder charge
    Brute,
    /// Lobs bombs and backs away
    Bomber,
    /// Boss: tendril reach and a grab
    Tyrant,
    /// Boss: pouncing leaps and a tail sweep
    Basilisk,
    /// Boss: charges and ground pounds
    Behemoth,
    /// Boss: flies, swoops and drops bombs
    Harrier,
}

impl EnemyArchetype {
    /// Whether this archetype is a boss.
    #[must_use]
    pub fn is_boss(self) -> bool {
        matches!(
            self,
            Self::Tyrant | Self::Basilisk | Self::Behemoth | Self::Harrier
        )
    }

    /// The three boss-pool entries eligible for ground waves plus
    /// the flyer.
    pub const BOSSES: [Self; 4] = [Self::Tyrant, Self::Basilisk, Self::Behemoth, Self::Harrier];

    /// Base stat table for this archetype.
    #[must_use]
    pub fn descriptor(self) -> EnemyType {
        let base = EnemyType {
            max_health: 30,
            speed: 120.0,
            melee_damage: 12,
            melee_range: 50.0,
            melee_duration_ms: 400.0,
            attack_cooldown_ms: 1200.0,
            score: 100,
            body_width: 40.0,
            body_height: 60.0,
            dodge_chance: 0.0,
            regen_per_s: 0.0,
            boss: false,
            flying: false,
            flee_below: None,
            throw: None,
            bomb: None,
            tendril: None,
            grab: None,
            leap: None,
            tail_sweep: None,
            swoop: None,
            charge: None,
            ground_pound: None,
        };

        match self {
            Self::Thug => base,
            Self::Ninja => EnemyType {
                max_health: 24,
                speed: 200.0,
                melee_damage: 8,
                melee_range: 45.0,
                melee_duration_ms: 300.0,
                attack_cooldown_ms: 900.0,
                score: 150,
                dodge_chance: 0.3,
                flee_below: Some(100.0),
                throw: Some(ThrowSpec {
                    range: 350.0,
                    damage: 6,
                    speed: 400.0,
                }),
                ..base
            },
            Self::Brute => EnemyType {
                max_health: 60,
                speed: 80.0,
                melee_damage: 18,
                melee_range: 60.0,
                melee_duration_ms: 500.0,
                attack_cooldown_ms: 1600.0,
                score: 200,
                body_width: 56.0,
                body_height: 72.0,
                charge: Some(ChargeSpec {
                    range: 400.0,
                    speed: 350.0,
                    damage: 15,
                }),
                ..base
            },
            Self::Bomber => EnemyType {
                max_health: 28,
                speed: 110.0,
                melee_damage: 8,
                melee_range: 45.0,
                melee_duration_ms: 350.0,
                attack_cooldown_ms: 1400.0,
                score: 175,
                flee_below: Some(120.0),
                bomb: Some(BombSpec {
                    range: 380.0,
                    damage: 14,
                    blast_radius: 90.0,
                    fuse_ms: 1000.0,
                }),
                ..base
            },
            Self::Tyrant => EnemyType {
                max_health: 220,
                speed: 90.0,
                melee_damage: 16,
                melee_range: 65.0,
                melee_duration_ms: 500.0,
                attack_cooldown_ms: 1500.0,
                score: 1000,
                body_width: 70.0,
                body_height: 90.0,
                regen_per_s: 2.0,
                boss: true,
                tendril: Some(TendrilSpec {
                    range: 220.0,
                    damage: 12,
                }),
                grab: Some(GrabSpec {
                    range: 90.0,
                    damage_per_tick: 6,
                    duration_ms: 2000.0,
                }),
                ..base
            },
            Self::Basilisk => EnemyType {
                max_health: 200,
                speed: 130.0,
                melee_damage: 14,
                melee_range: 60.0,
                melee_duration_ms: 450.0,
                attack_cooldown_ms: 1300.0,
                score: 1000,
                body_width: 80.0,
                body_height: 70.0,
                dodge_chance: 0.15,
                regen_per_s: 2.0,
                boss: true,
                leap: Some(LeapSpec {
                    range: 420.0,
                    damage: 16,
                }),
                tail_sweep: Some(TailSweepSpec {
                    range: 110.0,
                    damage: 12,
                    duration_ms: 600.0,
                }),
                ..base
            },
            Self::Behemoth => EnemyType {
                max_health: 260,
                speed: 70.0,
                melee_damage: 20,
                melee_range: 70.0,
                melee_duration_ms: 550.0,
                attack_cooldown_ms: 1800.0,
                score: 1200,
                body_width: 80.0,
                body_height: 100.0,
                regen_per_s: 3.0,
                boss: true,
                charge: Some(ChargeSpec {
                    range: 450.0,
                    speed: 400.0,
                    damage: 18,
                }),
                ground_pound: Some(GroundPoundSpec {
                    radius: 200.0,
                    damage: 15,
                }),
                ..base
            },
            Self::Harrier => EnemyType {
                max_health: 180,
                speed: 160.0,
                melee_damage: 10,
                melee_range: 55.0,
                melee_duration_ms: 400.0,
                attack_cooldown_ms: 1400.0,
                score: 1000,
                body_width: 64.0,
                body_height: 56.0,
                regen_per_s: 2.0,
                boss: true,
                flying: true,
                swoop: Some(SwoopSpec {
                    range: 300.0,
                    damage: 14,
                }),
                bomb: Some(BombSpec {
                    range: 350.0,
                    damage: 12,
                    blast_radius: 80.0,
                    fuse_ms: 800.0,
                }),
                ..base
            },
        }
    }
}

/// Discrete enemy states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyState {
    /// Standing, cooling down or out of range
    Idle,
    /// Closing in on (or backing away from) the target
    Walk,
    /// Basic melee swing
    Attack,
    /// Shoulder charge run
    Charge,
    /// Winding up and releasing a projectile or bomb
    Throw,
    /// Backing off to preferred range
    Flee,
    /// Hit reaction
    Hit,
    /// Stunned (includes webbed)
    Stunned,
    /// Dead; ragdoll persists until culled
    Dead,
    /// Boss tendril strike
    Tendril,
    /// Boss grab hold
    Grab,
    /// Boss pouncing leap
    Leap,
    /// Boss tail sweep
    TailSweep,
    /// Flying boss dive
    Swoop,
    /// Boss ground pound (rise, then slam)
    GroundPound,
}

/// A thrown projectile in flight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    /// Current position
    pub pos: Vec2,
    /// Velocity
    pub vel: Vec2,
    /// Damage on contact
    pub damage: i32,
    /// Contact radius
    pub radius: f32,
}

impl Projectile {
    /// Advances the projectile; returns false once it leaves the
    /// playfield and should be dropped.
    pub fn update(&mut self, delta_ms: f32, ground_y: f32) -> bool {
        let dt = delta_ms / 1000.0;
        self.pos.x += self.vel.x * dt;
        self.pos.y += self.vel.y * dt;
        self.pos.y < ground_y + 10.0
    }
}

/// A lobbed bomb: ballistic flight, then a fuse, then a blast.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bomb {
    /// Current position
    pub pos: Vec2,
    /// Velocity while in flight
    pub vel: Vec2,
    /// Blast damage
    pub damage: i32,
    /// Blast radius
    pub blast_radius: f32,
    /// Fuse remaining once at rest
    pub fuse_ms: f32,
    /// Whether the bomb has landed
    pub landed: bool,
}

impl Bomb {
    /// Advances the bomb; returns true on the tick it detonates.
    pub fn update(&mut self, delta_ms: f32, gravity: f32, ground_y: f32) -> bool {
        let dt = delta_ms / 1000.0;
        if !self.landed {
            self.vel.y += gravity * dt;
            self.pos.x += self.vel.x * dt;
            self.pos.y += self.vel.y * dt;
            if self.pos.y >= ground_y {
                self.pos.y = ground_y;
                self.vel = Vec2::ZERO;
                self.landed = true;
            }
            return false;
        }
        self.fuse_ms -= delta_ms;
        self.fuse_ms <= 0.0
    }
}

/// One piece of a death ragdoll.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RagdollPart {
    /// Position
    pub pos: Vec2,
    /// Velocity
    pub vel: Vec2,
    /// Rotation angle
    pub angle: f32,
    /// Rotation speed
    pub spin: f32,
}

/// An enemy combatant.
#[derive(Debug, Clone)]
pub struct Enemy {
    /// Stable identity
    pub id: EntityId,
    /// Archetype this enemy was spawned as
    pub archetype: EnemyArchetype,
    /// Stats after wave scaling
    pub ty: EnemyType,
    /// Kinematic body
    pub body: KinematicBody,
    /// Facing direction
    pub facing_right: bool,
    /// Current health
    pub health: i32,
    /// False once dead; the ragdoll persists until culled
    pub alive: bool,
    /// Set once the current attack activation has connected
    pub has_hit: bool,
    /// Stunned by a web shot (render hook)
    pub webbed: bool,
    /// Currently being reeled in by a web pull
    pub being_pulled: bool,
    /// Live projectile, if any
    pub projectile: Option<Projectile>,
    /// Live bomb, if any
    pub bomb: Option<Bomb>,
    /// Victim held by an active grab
    pub grab_target: Option<EntityId>,
    /// Ragdoll debris after death
    pub ragdoll: Vec<RagdollPart>,
    /// Milliseconds since death
    pub death_timer: f32,
    /// Cooldown before the next attack decision
    pub attack_cooldown: f32,
    state: EnemyState,
    state_timer: f32,
    ai_timer: f32,
    stun_timer: f32,
    hitstop_timer: f32,
    grab_timer: f32,
    grab_damage_accum: f32,
    regen_accum: f32,
    flying_base_y: f32,
    ground_pound_rising: bool,
}

impl Enemy {
    /// Spawns an enemy of the given (already scaled) type.
    #[must_use]
    pub fn new(archetype: EnemyArchetype, ty: EnemyType, x: f32, y: f32, rng: &mut SimRng) -> Self {
        let mut body = KinematicBody::new(x, y, ty.body_width, ty.body_height);
        if ty.flying {
            body.allow_gravity = false;
        }

        Self {
            id: EntityId::new(),
            archetype,
            health: ty.max_health,
            body,
            facing_right: false,
            alive: true,
            has_hit: false,
            webbed: false,
            being_pulled: false,
            projectile: None,
            bomb: None,
            grab_target: None,
            ragdoll: Vec::new(),
            death_timer: 0.0,
            state: EnemyState::Idle,
            state_timer: 0.0,
            ai_timer: 0.0,
            // Stagger the first attacks so a batch does not swing in
            // lockstep.
            attack_cooldown: ty.attack_cooldown_ms * rng.range(0.5, 1.0),
            stun_timer: 0.0,
            hitstop_timer: 0.0,
            grab_timer: 0.0,
            grab_damage_accum: 0.0,
            regen_accum: 0.0,
            flying_base_y: y,
            ground_pound_rising: false,
            ty,
        }
    }

    /// Current discrete state (pose key).
    #[must_use]
    pub fn state(&self) -> EnemyState {
        self.state
    }

    /// Milliseconds since the current state was entered.
    #[must_use]
    pub fn state_timer(&self) -> f32 {
        self.state_timer
    }

    /// Whether a stun is currently running.
    #[must_use]
    pub fn is_stunned(&self) -> bool {
        self.stun_timer > 0.0
    }

    /// Freezes this combatant's timers for the given duration.
    pub fn apply_hitstop(&mut self, ms: f32) {
        self.hitstop_timer = ms;
    }

    fn enter_state(&mut self, next: EnemyState) {
        self.state = next;
        self.state_timer = 0.0;
    }

    /// Starts the post-attack cooldown with the usual jitter.
    fn rearm(&mut self, rng: &mut SimRng) {
        self.attack_cooldown = self.ty.attack_cooldown_ms * rng.range(0.5, 1.0);
    }

    /// Advances one tick. `target` is the player's position.
    pub fn update(&mut self, delta_ms: f32, target: Vec2, config: &SimConfig, rng: &mut SimRng) {
        if !self.alive {
            self.death_timer += delta_ms;
            self.update_ragdoll(delta_ms, config);
            return;
        }

        if self.hitstop_timer > 0.0 {
            self.hitstop_timer -= delta_ms;
            return;
        }

        self.body.update(delta_ms, config.gravity, config.ground_y);
        self.state_timer += delta_ms;
        self.ai_timer += delta_ms;

        if self.attack_cooldown > 0.0 {
            self.attack_cooldown -= delta_ms;
        }

        self.tick_regen(delta_ms);

        if self.stun_timer > 0.0 {
            self.stun_timer -= delta_ms;
            if self.stun_timer <= 0.0 {
                self.webbed = false;
                if self.state == EnemyState::Stunned {
                    self.enter_state(EnemyState::Idle);
                }
            }
        }

        // Being reeled in suspends all decisions; the resolver owns
        // this enemy's velocity for the duration.
        if self.being_pulled {
            return;
        }

        match self.state {
            EnemyState::Idle | EnemyState::Walk => self.decide(target, rng),
            EnemyState::Attack => {
                self.body.vel.x = 0.0;
                if self.state_timer >= self.ty.melee_duration_ms {
                    self.rearm(rng);
                    self.enter_state(EnemyState::Idle);
                }
            }
            EnemyState::Charge => {
                if self.state_timer >= CHARGE_MS {
                    self.body.vel.x = 0.0;
                    self.rearm(rng);
                    self.enter_state(EnemyState::Idle);
                }
            }
            EnemyState::Throw => self.update_throw(target, config, rng),
            EnemyState::Flee => {
                if self.state_timer >= FLEE_MS {
                    self.body.vel.x = 0.0;
                    self.enter_state(EnemyState::Idle);
                }
            }
            EnemyState::Hit => {
                if self.state_timer >= HIT_RECOVER_MS {
                    let next = if self.stun_timer > 0.0 {
                        EnemyState::Stunned
                    } else {
                        EnemyState::Idle
                    };
                    self.enter_state(next);
                }
            }
            EnemyState::Stunned => {
                self.body.vel.x = 0.0;
            }
            EnemyState::Tendril => {
                self.body.vel.x = 0.0;
                if self.state_timer >= 600.0 {
                    self.rearm(rng);
                    self.enter_state(EnemyState::Idle);
                }
            }
            EnemyState::Grab => self.update_grab(rng),
            EnemyState::Leap => {
                if self.state_timer >= LEAP_MS || (self.body.on_ground && self.state_timer > 100.0)
                {
                    self.body.vel.x = 0.0;
                    self.rearm(rng);
                    self.enter_state(EnemyState::Idle);
                }
            }
            EnemyState::TailSweep => {
                let duration = self
                    .ty
                    .tail_sweep
                    .map_or(600.0, |spec| spec.duration_ms);
                if self.state_timer >= duration {
                    self.rearm(rng);
                    self.enter_state(EnemyState::Idle);
                }
            }
            EnemyState::Swoop => {
                if self.state_timer >= SWOOP_MS {
                    self.body.vel = Vec2::ZERO;
                    self.rearm(rng);
                    self.enter_state(EnemyState::Idle);
                }
            }
            EnemyState::GroundPound => self.update_ground_pound(rng),
            EnemyState::Dead => {}
        }
    }

    fn tick_regen(&mut self, delta_ms: f32) {
        if self.ty.regen_per_s <= 0.0 || self.health >= self.ty.max_health {
            return;
        }
        self.regen_accum += self.ty.regen_per_s * delta_ms / 1000.0;
        if self.regen_accum >= 1.0 {
            let whole = self.regen_accum.floor();
            self.health = (self.health + whole as i32).min(self.ty.max_health);
            self.regen_accum -= whole;
        }
    }

    /// AI decision ladder, top rung wins. Runs only from Idle/Walk.
    fn decide(&mut self, target: Vec2, rng: &mut SimRng) {
        let dx = target.x - self.body.pos.x;
        let dist = target.distance(self.body.pos);
        self.facing_right = dx >= 0.0;
        let dir = if self.facing_right { 1.0 } else { -1.0 };

        if self.attack_cooldown <= 0.0 {
            if dist < self.ty.melee_range {
                self.has_hit = false;
                self.enter_state(EnemyState::Attack);
                return;
            }
            if let Some(flee_below) = self.ty.flee_below {
                if dist < flee_below {
                    self.body.vel.x = -dir * self.ty.speed * 1.5;
                    self.enter_state(EnemyState::Flee);
                    return;
                }
            }
            if let Some(throw) = self.ty.throw {
                if dist < throw.range {
                    self.body.vel.x = 0.0;
                    self.has_hit = false;
                    self.enter_state(EnemyState::Throw);
                    return;
                }
            }
            if self.ty.bomb.is_some() && self.bomb.is_none() {
                let range = self.ty.bomb.map_or(0.0, |spec| spec.range);
                if dist < range && dist > self.ty.melee_range * 2.0 {
                    self.body.vel.x = 0.0;
                    self.has_hit = false;
                    self.enter_state(EnemyState::Throw);
                    return;
                }
            }
            if let Some(tendril) = self.ty.tendril {
                if dist < tendril.range && dist > self.ty.melee_range {
                    self.has_hit = false;
                    self.enter_state(EnemyState::Tendril);
                    return;
                }
            }
            if let Some(grab) = self.ty.grab {
                if dist < grab.range && rng.chance(GRAB_CHANCE) {
                    self.has_hit = false;
                    self.enter_state(EnemyState::Grab);
                    return;
                }
            }
            if let Some(leap) = self.ty.leap {
                if dist < leap.range && dist > self.ty.melee_range * 2.0 && self.body.on_ground {
                    self.has_hit = false;
                    // Flat arc toward the target.
                    self.body.vel = Vec2::new(dx / (LEAP_MS / 1000.0), -350.0);
                    self.enter_state(EnemyState::Leap);
                    return;
                }
            }
            if let Some(sweep) = self.ty.tail_sweep {
                if dist < sweep.range {
                    self.has_hit = false;
                    self.enter_state(EnemyState::TailSweep);
                    return;
                }
            }
            if let Some(swoop) = self.ty.swoop {
                if dist < swoop.range {
                    self.has_hit = false;
                    let delta = target - self.body.pos;
                    let len = delta.length().max(1.0);
                    self.body.vel = delta.scale(500.0 / len);
                    self.enter_state(EnemyState::Swoop);
                    return;
                }
            }
            if let Some(charge) = self.ty.charge {
                if dist < charge.range && dist > self.ty.melee_range * 2.0 {
                    self.has_hit = false;
                    self.body.vel.x = dir * charge.speed;
                    self.enter_state(EnemyState::Charge);
                    return;
                }
            }
            if let Some(pound) = self.ty.ground_pound {
                if dist < pound.radius && rng.chance(GROUND_POUND_CHANCE) {
                    self.has_hit = false;
                    self.ground_pound_rising = true;
                    self.body.vel = Vec2::new(0.0, -400.0);
                    self.enter_state(EnemyState::GroundPound);
                    return;
                }
            }
        }

        // Movement rung.
        if self.ty.flying {
            // Hover toward the target with a sinusoidal bob.
            let target_y = self.flying_base_y + (self.ai_timer / 500.0).sin() * 20.0;
            self.body.vel.y = (target_y - self.body.pos.y) * 3.0;
            self.body.vel.x = dir * self.ty.speed;
            if self.state != EnemyState::Walk {
                self.enter_state(EnemyState::Walk);
            }
            return;
        }

        if dist > self.ty.melee_range * 0.8 {
            self.body.vel.x = dir * self.ty.speed;
            if self.state != EnemyState::Walk {
                self.enter_state(EnemyState::Walk);
            }
        } else {
            self.body.vel.x = 0.0;
            if self.state != EnemyState::Idle {
                self.enter_state(EnemyState::Idle);
            }
        }
    }

    /// Throw state covers both knife throws and bomb lobs; the
    /// payload is released once at the midpoint.
    fn update_throw(&mut self, target: Vec2, config: &SimConfig, rng: &mut SimRng) {
        if !self.has_hit && self.state_timer >= THROW_MS * 0.5 {
            self.has_hit = true;
            let origin = Vec2::new(self.body.pos.x, self.body.pos.y - self.ty.body_height * 0.3);
            if let Some(throw) = self.ty.throw {
                let delta = target - origin;
                let len = delta.length().max(1.0);
                self.projectile = Some(Projectile {
                    pos: origin,
                    vel: delta.scale(throw.speed / len),
                    damage: throw.damage,
                    radius: 12.0,
                });
                debug!(enemy = ?self.archetype, "projectile released");
            } else if let Some(bomb) = self.ty.bomb {
                let dx = target.x - origin.x;
                // Lob: fixed upward kick, horizontal speed to land near
                // the target in about a second.
                self.bomb = Some(Bomb {
                    pos: origin,
                    vel: Vec2::new(dx, -config.gravity * 0.45),
                    damage: bomb.damage,
                    blast_radius: bomb.blast_radius,
                    fuse_ms: bomb.fuse_ms,
                    landed: false,
                });
                debug!(enemy = ?self.archetype, "bomb lobbed");
            }
        }

        if self.state_timer >= THROW_MS {
            self.rearm(rng);
            self.enter_state(EnemyState::Idle);
        }
    }

    fn update_grab(&mut self, rng: &mut SimRng) {
        let duration = self.ty.grab.map_or(0.0, |spec| spec.duration_ms);
        self.body.vel.x = 0.0;
        if self.state_timer >= duration || self.grab_target.is_none() && self.state_timer > 300.0 {
            self.release_grab();
            self.rearm(rng);
            self.enter_state(EnemyState::Idle);
        }
    }

    /// Drops the grab coupling and its accumulators.
    pub fn release_grab(&mut self) {
        self.grab_target = None;
        self.grab_timer = 0.0;
        self.grab_damage_accum = 0.0;
    }

    /// Advances the grab damage accumulator; returns true each time
    /// a squeeze tick elapses.
    pub fn grab_tick(&mut self, delta_ms: f32, tick_ms: f32) -> bool {
        if self.grab_target.is_none() {
            return false;
        }
        self.grab_timer += delta_ms;
        self.grab_damage_accum += delta_ms;
        if self.grab_damage_accum >= tick_ms {
            self.grab_damage_accum -= tick_ms;
            return true;
        }
        false
    }

    fn update_ground_pound(&mut self, rng: &mut SimRng) {
        if self.ground_pound_rising {
            if self.state_timer >= GROUND_POUND_RISE_MS {
                // Slam down.
                self.ground_pound_rising = false;
                self.body.vel = Vec2::new(0.0, 900.0);
            }
        } else if self.body.on_ground && self.state_timer >= GROUND_POUND_RISE_MS {
            if self.state_timer >= GROUND_POUND_RISE_MS + GROUND_POUND_SLAM_MS {
                self.rearm(rng);
                self.enter_state(EnemyState::Idle);
            }
        }
    }

    fn update_ragdoll(&mut self, delta_ms: f32, config: &SimConfig) {
        let dt = delta_ms / 1000.0;
        for part in &mut self.ragdoll {
            part.vel.y += config.gravity * dt;
            part.pos.x += part.vel.x * dt;
            part.pos.y += part.vel.y * dt;
            part.angle += part.spin * dt;
            if part.pos.y > config.ground_y {
                part.pos.y = config.ground_y;
                part.vel.y *= -0.4;
                part.vel.x *= 0.8;
            }
        }
    }

    /// Whether the state timer sits inside the current attack's
    /// active window.
    #[must_use]
    pub fn is_on_active_frame(&self) -> bool {
        match self.state {
            EnemyState::Attack => MELEE_WINDOW.contains(self.state_timer, self.ty.melee_duration_ms),
            EnemyState::Tendril => TENDRIL_WINDOW.contains(self.state_timer, 600.0),
            EnemyState::TailSweep => {
                let duration = self.ty.tail_sweep.map_or(600.0, |spec| spec.duration_ms);
                SWEEP_WINDOW.contains(self.state_timer, duration)
            }
            // Contact attacks are live for the whole travel.
            EnemyState::Charge | EnemyState::Leap | EnemyState::Swoop => true,
            EnemyState::Grab => self.grab_target.is_none(),
            // The pound's shockwave is live only during the slam.
            EnemyState::GroundPound => !self.ground_pound_rising && self.body.on_ground,
            _ => false,
        }
    }

    /// Derives the attack descriptor for the current state.
    #[must_use]
    pub fn attack_descriptor(&self) -> Option<AttackDescriptor> {
        match self.state {
            EnemyState::Attack => Some(AttackDescriptor::strike(
                AttackKind::Melee,
                self.ty.melee_damage,
                self.ty.melee_range,
                250.0,
            )),
            EnemyState::Charge => self.ty.charge.map(|spec| {
                AttackDescriptor::strike(AttackKind::Charge, spec.damage, self.ty.body_width, 350.0)
            }),
            EnemyState::Tendril => self.ty.tendril.map(|spec| {
                AttackDescriptor::strike(AttackKind::Tendril, spec.damage, spec.range, 300.0)
            }),
            EnemyState::Grab => self.ty.grab.map(|spec| {
                AttackDescriptor::strike(AttackKind::Grab, 0, spec.range, 0.0).as_grab()
            }),
            EnemyState::Leap => self.ty.leap.map(|spec| {
                AttackDescriptor::strike(AttackKind::Leap, spec.damage, self.ty.body_width, 300.0)
            }),
            EnemyState::TailSweep => self.ty.tail_sweep.map(|spec| {
                AttackDescriptor::strike(AttackKind::TailSweep, spec.damage, spec.range, 280.0)
                    .on_both_sides()
            }),
            EnemyState::Swoop => self.ty.swoop.map(|spec| {
                AttackDescriptor::strike(AttackKind::Swoop, spec.damage, self.ty.body_width, 250.0)
            }),
            EnemyState::GroundPound => self.ty.ground_pound.map(|spec| {
                AttackDescriptor::strike(AttackKind::GroundPound, spec.damage, spec.radius, 320.0)
                    .as_area()
            }),
            _ => None,
        }
    }

    /// Hitbox for the current attack, if any.
    #[must_use]
    pub fn hitbox(&self) -> Option<AABB> {
        let attack = self.attack_descriptor()?;
        let pos = self.body.pos;

        let rect = if attack.area {
            AABB::from_center(pos, attack.range, attack.range / 2.0)
        } else if attack.both_sides {
            AABB::from_center(pos, attack.range, self.ty.body_height / 2.0)
        } else if matches!(
            attack.kind,
            AttackKind::Charge | AttackKind::Leap | AttackKind::Swoop
        ) {
            // Body-contact attacks use the body itself.
            self.body.aabb()
        } else {
            let x = if self.facing_right {
                pos.x + self.ty.body_width / 2.0
            } else {
                pos.x - self.ty.body_width / 2.0 - attack.range
            };
            AABB::from_rect(
                x,
                pos.y - self.ty.body_height / 2.0,
                attack.range,
                self.ty.body_height,
            )
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
    /// Returns true if the hit connected. A dodge-capable enemy that
    /// passes its roll sidesteps instead and takes nothing; dead
    /// enemies are ignored.
    pub fn take_damage(
        &mut self,
        amount: i32,
        knockback_x: f32,
        knockback_y: f32,
        rng: &mut SimRng,
    ) -> bool {
        if !self.alive {
            return false;
        }

        if self.ty.dodge_chance > 0.0
            && self.state != EnemyState::Hit
            && self.stun_timer <= 0.0
            && rng.chance(self.ty.dodge_chance)
        {
            // Sidestep away from the blow.
            self.body.vel.x = -knockback_x.signum() * self.ty.speed * 1.5;
            return false;
        }

        self.health -= amount;
        self.release_grab();

        if self.health <= 0 {
            self.health = 0;
            self.alive = false;
            self.spawn_ragdoll(knockback_x, knockback_y);
            self.enter_state(EnemyState::Dead);
            debug!(enemy = ?self.archetype, "killed");
            return true;
        }

        self.body.vel = Vec2::new(knockback_x, knockback_y);
        self.enter_state(EnemyState::Hit);
        true
    }

    /// Applies a stun without damage (web shot, web pull).
    pub fn stun(&mut self, duration_ms: f32) {
        if !self.alive {
            return;
        }
        self.stun_timer = self.stun_timer.max(duration_ms);
        self.release_grab();
        self.body.vel.x = 0.0;
        if self.state != EnemyState::Hit {
            self.enter_state(EnemyState::Stunned);
        }
    }

    fn spawn_ragdoll(&mut self, knockback_x: f32, knockback_y: f32) {
        let pos = self.body.pos;
        // Head, torso, two limbs.
        let offsets = [
            (0.0, -self.ty.body_height * 0.4),
            (0.0, 0.0),
            (-self.ty.body_width * 0.3, self.ty.body_height * 0.2),
            (self.ty.body_width * 0.3, self.ty.body_height * 0.2),
        ];
        self.ragdoll = offsets
            .iter()
            .enumerate()
            .map(|(i, (ox, oy))| RagdollPart {
                pos: Vec2::new(pos.x + ox, pos.y + oy),
                vel: Vec2::new(
                    knockback_x * (0.8 + 0.15 * i as f32),
                    knockback_y - 120.0 * i as f32,
                ),
                angle: 0.0,
                spin: 3.0 + i as f32,
            })
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spawn(archetype: EnemyArchetype, rng: &mut SimRng) -> Enemy {
        let ty = archetype.descriptor();
        Enemy::new(archetype, ty, 400.0, 500.0, rng)
    }

    #[test]
    fn test_scaling_rounds_stats() {
        let ty = EnemyArchetype::Thug.descriptor().scaled(1.15, 1.1, 1.05);
        assert_eq!(ty.max_health, 35); // round(30 * 1.15)
        assert_eq!(ty.melee_damage, 13); // round(12 * 1.1)
        assert!((ty.speed - 126.0).abs() < 1e-3);
    }

    #[test]
    fn test_damage_sequence_to_death() {
        let mut rng = SimRng::new(3);
        let mut enemy = spawn(EnemyArchetype::Thug, &mut rng);
        assert_eq!(enemy.ty.max_health, 30);

        assert!(enemy.take_damage(12, 100.0, -100.0, &mut rng));
        assert_eq!(enemy.health, 18);
        assert!(enemy.alive);

        assert!(enemy.take_damage(12, 100.0, -100.0, &mut rng));
        assert_eq!(enemy.health, 6);
        assert!(enemy.alive);

        assert!(enemy.take_damage(10, 100.0, -100.0, &mut rng));
        assert_eq!(enemy.health, 0);
        assert!(!enemy.alive);
        assert_eq!(enemy.state(), EnemyState::Dead);
        assert!(!enemy.ragdoll.is_empty());

        // Dead enemies ignore further damage.
        assert!(!enemy.take_damage(10, 100.0, -100.0, &mut rng));
    }

    #[test]
    fn test_dodge_rate_converges() {
        let mut rng = SimRng::new(99);
        let ty = EnemyArchetype::Ninja.descriptor();
        assert!((ty.dodge_chance - 0.3).abs() < 1e-6);

        let mut dodged = 0u32;
        let trials = 5000;
        for _ in 0..trials {
            let mut enemy = spawn(EnemyArchetype::Ninja, &mut rng);
            if !enemy.take_damage(1, 50.0, 0.0, &mut rng) {
                dodged += 1;
            }
        }
        let rate = dodged as f32 / trials as f32;
        assert!((rate - 0.3).abs() < 0.03, "dodge rate {rate}");
    }

    #[test]
    fn test_melee_when_close() {
        let config = SimConfig::default();
        let mut rng = SimRng::new(5);
        let mut enemy = spawn(EnemyArchetype::Thug, &mut rng);
        enemy.attack_cooldown = 0.0;

        let target = Vec2::new(enemy.body.pos.x + 30.0, enemy.body.pos.y);
        enemy.update(16.0, target, &config, &mut rng);
        assert_eq!(enemy.state(), EnemyState::Attack);
        assert!(!enemy.has_hit);
    }

    #[test]
    fn test_walks_toward_distant_target() {
        let config = SimConfig::default();
        let mut rng = SimRng::new(5);
        let mut enemy = spawn(EnemyArchetype::Thug, &mut rng);

        let target = Vec2::new(enemy.body.pos.x + 500.0, enemy.body.pos.y);
        enemy.update(16.0, target, &config, &mut rng);
        assert_eq!(enemy.state(), EnemyState::Walk);
        assert!(enemy.body.vel.x > 0.0);
        assert!(enemy.facing_right);
    }

    #[test]
    fn test_ninja_throws_at_range() {
        let config = SimConfig::default();
        let mut rng = SimRng::new(5);
        let mut enemy = spawn(EnemyArchetype::Ninja, &mut rng);
        enemy.attack_cooldown = 0.0;

        let target = Vec2::new(enemy.body.pos.x + 250.0, enemy.body.pos.y);
        enemy.update(16.0, target, &config, &mut rng);
        assert_eq!(enemy.state(), EnemyState::Throw);

        // Payload releases at the midpoint of the windup.
        for _ in 0..30 {
            enemy.update(16.0, target, &config, &mut rng);
            if enemy.projectile.is_some() {
                break;
            }
        }
        assert!(enemy.projectile.is_some());
    }

    #[test]
    fn test_stun_expires_back_to_idle() {
        let config = SimConfig::default();
        let mut rng = SimRng::new(5);
        let mut enemy = spawn(EnemyArchetype::Thug, &mut rng);

        enemy.webbed = true;
        enemy.stun(500.0);
        assert_eq!(enemy.state(), EnemyState::Stunned);
        assert!(enemy.is_stunned());

        let far = Vec2::new(5000.0, 500.0);
        for _ in 0..40 {
            enemy.update(16.0, far, &config, &mut rng);
        }
        assert!(!enemy.is_stunned());
        assert!(!enemy.webbed);
        assert_ne!(enemy.state(), EnemyState::Stunned);
    }

    #[test]
    fn test_boss_regen_trickles() {
        let config = SimConfig::default();
        let mut rng = SimRng::new(5);
        let mut enemy = spawn(EnemyArchetype::Tyrant, &mut rng);
        enemy.health = 100;

        let far = Vec2::new(5000.0, 500.0);
        // 2 hp/s for 3 simulated seconds.
        for _ in 0..188 {
            enemy.update(16.0, far, &config, &mut rng);
        }
        assert!(enemy.health >= 105, "health {}", enemy.health);
        assert!(enemy.health <= 107);
    }

    #[test]
    fn test_hitstop_freezes_enemy() {
        let config = SimConfig::default();
        let mut rng = SimRng::new(5);
        let mut enemy = spawn(EnemyArchetype::Thug, &mut rng);

        let target = Vec2::new(enemy.body.pos.x + 30.0, enemy.body.pos.y);
        enemy.attack_cooldown = 0.0;
        enemy.update(16.0, target, &config, &mut rng);
        assert_eq!(enemy.state(), EnemyState::Attack);
        let timer = enemy.state_timer();

        enemy.apply_hitstop(60.0);
        enemy.update(16.0, target, &config, &mut rng);
        assert!((enemy.state_timer() - timer).abs() < f32::EPSILON);
    }

    #[test]
    fn test_ragdoll_persists_and_falls() {
        let config = SimConfig::default();
        let mut rng = SimRng::new(5);
        let mut enemy = spawn(EnemyArchetype::Thug, &mut rng);
        enemy.take_damage(100, 200.0, -200.0, &mut rng);
        assert!(!enemy.alive);

        let far = Vec2::new(5000.0, 500.0);
        enemy.update(100.0, far, &config, &mut rng);
        assert!(enemy.death_timer >= 100.0);
        assert!(!enemy.ragdoll.is_empty());
    }

    #[test]
    fn test_flying_enemy_ignores_gravity() {
        let config = SimConfig::default();
        let mut rng = SimRng::new(5);
        let mut enemy = spawn(EnemyArchetype::Harrier, &mut rng);
        assert!(!enemy.body.allow_gravity);

        let start_y = enemy.body.pos.y;
        let target = Vec2::new(enemy.body.pos.x + 600.0, start_y);
        for _ in 0..60 {
            enemy.update(16.0, target, &config, &mut rng);
        }
        // Hovers near its base altitude instead of falling.
        assert!((enemy.body.pos.y - start_y).abs() < 40.0);
    }

    #[test]
    fn test_tail_sweep_hits_both_sides() {
        let mut rng = SimRng::new(5);
        let mut enemy = spawn(EnemyArchetype::Basilisk, &mut rng);
        enemy.enter_state(EnemyState::TailSweep);
        let attack = enemy.attack_descriptor().expect("sweeping");
        assert!(attack.both_sides);

        let hitbox = enemy.hitbox().expect("sweeping");
        assert!(hitbox.min_x < enemy.body.pos.x);
        assert!(hitbox.max_x > enemy.body.pos.x);
    }
}
