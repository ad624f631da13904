//! Combat resolution.
//!
//! The resolver owns every cross-combatant interaction: it reads
//! hitboxes and descriptors computed by the state machines and
//! applies damage, stun, grabs, pulls and hitstop. State machines
//! never reach into each other directly.

use tracing::trace;

use crate::attack::{AttackDescriptor, AttackKind};
use crate::combo::ComboMeter;
use crate::config::SimConfig;
use crate::enemy::Enemy;
use crate::events::{EventBus, SimEvent};
use crate::input::Vec2;
use crate::player::{Player, PlayerState};
use crate::rng::SimRng;

/// Hitstop freeze for an attack kind, by impact weight.
fn hitstop_for(kind: AttackKind, config: &SimConfig) -> f32 {
    match kind {
        AttackKind::Punch => config.hitstop.light_ms,
        AttackKind::Kick | AttackKind::Melee => config.hitstop.medium_ms,
        AttackKind::DiveKick | AttackKind::DiveKickShock | AttackKind::SwingKick => {
            config.hitstop.heavy_ms
        }
        _ => 0.0,
    }
}

/// Applies one connecting player hit to an enemy: combo-multiplied
/// damage, knockback away from the player, scoring events. Returns
/// the score gained.
fn land_player_hit(
    player: &mut Player,
    enemy: &mut Enemy,
    attack: &AttackDescriptor,
    combo: &mut ComboMeter,
    config: &SimConfig,
    rng: &mut SimRng,
    events: &EventBus,
) -> u64 {
    let multiplier = combo.damage_multiplier(&config.combo);
    let damage = ((attack.damage as f32) * multiplier).floor() as i32;

    let dir = if enemy.body.pos.x >= player.body.pos.x {
        1.0
    } else {
        -1.0
    };

    if !enemy.take_damage(damage, dir * attack.knockback, attack.launch, rng) {
        // Dodged; the activation is spent against this target anyway.
        return 0;
    }

    let hit = combo.hit(config.combo.score_per_hit, &config.combo);
    if hit.milestone {
        events.send(SimEvent::ComboMilestone { count: hit.count });
    }
    events.send(SimEvent::HitLanded {
        kind: attack.kind,
        position: enemy.body.pos,
        combo: hit.count,
    });

    let freeze = hitstop_for(attack.kind, config);
    if freeze > 0.0 {
        player.apply_hitstop(freeze);
        enemy.apply_hitstop(freeze);
    }

    let mut score = u64::from(hit.score);
    if !enemy.alive {
        score += u64::from(enemy.ty.score);
        events.send(SimEvent::EnemyKilled {
            entity_id: enemy.id,
            kind: attack.kind,
            reward: enemy.ty.score,
            position: enemy.body.pos,
        });
    }
    trace!(kind = ?attack.kind, damage, combo = hit.count, "player hit landed");
    score
}

/// Resolves the player's current attack against all enemies.
///
/// A single activation connects with at most one target unless the
/// attack hits all; either way `has_hit` latches so the same
/// activation never touches the same target twice. Returns the score
/// gained this tick.
pub fn resolve_player_attack(
    player: &mut Player,
    enemies: &mut [Enemy],
    combo: &mut ComboMeter,
    config: &SimConfig,
    rng: &mut SimRng,
    events: &EventBus,
) -> u64 {
    if player.has_hit || !player.is_on_active_frame(config) {
        return 0;
    }
    let Some(attack) = player.attack_descriptor(config) else {
        return 0;
    };
    let Some(hitbox) = player.hitbox(config) else {
        return 0;
    };

    let mut score = 0u64;
    for enemy in enemies.iter_mut().filter(|e| e.alive) {
        if !hitbox.overlaps(&enemy.hurtbox()) {
            continue;
        }

        match attack.kind {
            AttackKind::WebShot => {
                enemy.webbed = true;
                enemy.stun(attack.stun_ms);
                events.send(SimEvent::HitLanded {
                    kind: attack.kind,
                    position: enemy.body.pos,
                    combo: combo.count,
                });
                player.has_hit = true;
                return score;
            }
            AttackKind::WebPull => {
                // Phase one: tag. The reel runs in resolve_web_pull.
                player.pull_target = Some(enemy.id);
                enemy.being_pulled = true;
                enemy.webbed = true;
                enemy.stun(attack.stun_ms + config.player.web_pull_duration_ms);
                player.has_hit = true;
                return score;
            }
            _ => {
                score += land_player_hit(player, enemy, &attack, combo, config, rng, events);
                player.has_hit = true;
                if !attack.hits_all {
                    return score;
                }
            }
        }
    }
    score
}

/// Resolves the shockwave when a dive kick lands: every living enemy
/// inside the radius takes a combo-multiplied hit once.
pub fn resolve_dive_kick_shock(
    player: &mut Player,
    enemies: &mut [Enemy],
    combo: &mut ComboMeter,
    config: &SimConfig,
    rng: &mut SimRng,
    events: &EventBus,
) -> u64 {
    let tuning = &config.player;
    let attack = AttackDescriptor::strike(
        AttackKind::DiveKickShock,
        tuning.dive_kick.damage,
        tuning.dive_kick_shock_radius,
        tuning.dive_kick.knockback,
    )
    .with_launch(tuning.dive_kick.launch)
    .as_area()
    .hitting_all();

    let center = player.body.pos;
    let mut score = 0u64;
    for enemy in enemies.iter_mut().filter(|e| e.alive) {
        if enemy.body.pos.distance(center) > tuning.dive_kick_shock_radius {
            continue;
        }
        score += land_player_hit(player, enemy, &attack, combo, config, rng, events);
    }
    score
}

/// Phase two of the web pull: reels the tagged enemy toward the
/// player, parks it at close range with a residual stun, and clears
/// the coupling when either side drops it.
pub fn resolve_web_pull(player: &mut Player, enemies: &mut [Enemy], config: &SimConfig) {
    let target = if player.state() == PlayerState::WebPull {
        player.pull_target
    } else {
        // The pull state ended; the coupling must not outlive it.
        player.release_pull_target();
        None
    };

    for enemy in enemies.iter_mut() {
        if Some(enemy.id) != target {
            enemy.being_pulled = false;
            continue;
        }

        if !enemy.alive {
            player.release_pull_target();
            enemy.being_pulled = false;
            continue;
        }

        let tuning = &config.player;
        let dx = player.body.pos.x - enemy.body.pos.x;
        if dx.abs() <= tuning.web_pull_close_distance {
            enemy.body.vel = Vec2::ZERO;
            enemy.being_pulled = false;
            enemy.stun(tuning.web_pull_stun_ms);
            player.release_pull_target();
        } else {
            enemy.body.vel.x = dx.signum() * tuning.web_pull_speed;
            enemy.body.vel.y = 0.0;
        }
    }
}

/// Resolves all enemy attacks against the player.
pub fn resolve_enemy_attacks(
    player: &mut Player,
    enemies: &mut [Enemy],
    config: &SimConfig,
    events: &EventBus,
) {
    let hurtbox = player.hurtbox();

    for enemy in enemies.iter_mut().filter(|e| e.alive) {
        if enemy.has_hit || !enemy.is_on_active_frame() {
            continue;
        }
        let Some(attack) = enemy.attack_descriptor() else {
            continue;
        };
        let Some(hitbox) = enemy.hitbox() else {
            continue;
        };
        if !hitbox.overlaps(&hurtbox) {
            continue;
        }

        if attack.grab {
            enemy.grab_target = Some(player.id);
            enemy.has_hit = true;
            continue;
        }

        let dir = if player.body.pos.x >= enemy.body.pos.x {
            1.0
        } else {
            -1.0
        };
        if player.take_damage(attack.damage, dir * attack.knockback, config, events) {
            enemy.has_hit = true;
        }
    }
}

/// Advances active grabs: the victim is held at the grabber's front
/// and takes a squeeze tick on a fixed interval. The interval damage
/// bypasses the invulnerability window; escaping is the grabber's
/// timer's job.
pub fn resolve_grabs(
    player: &mut Player,
    enemies: &mut [Enemy],
    delta_ms: f32,
    config: &SimConfig,
    events: &EventBus,
) {
    for enemy in enemies.iter_mut().filter(|e| e.alive) {
        if enemy.grab_target != Some(player.id) {
            continue;
        }

        // Pin the victim at arm's length.
        let dir = if enemy.facing_right { 1.0 } else { -1.0 };
        player.body.pos.x = enemy.body.pos.x + dir * (enemy.ty.body_width / 2.0 + 20.0);
        player.body.vel = Vec2::ZERO;

        if enemy.grab_tick(delta_ms, config.grab_tick_ms) {
            let damage = enemy.ty.grab.map_or(0, |spec| spec.damage_per_tick);
            player.health = (player.health - damage).max(0);
            events.send(SimEvent::PlayerDamaged {
                damage,
                health: player.health,
            });
        }
    }
}

/// Advances every live projectile and bomb and resolves impacts
/// against the player.
pub fn resolve_ordnance(
    player: &mut Player,
    enemies: &mut [Enemy],
    delta_ms: f32,
    config: &SimConfig,
    events: &EventBus,
) {
    let hurtbox = player.hurtbox();

    for enemy in enemies.iter_mut() {
        if let Some(mut projectile) = enemy.projectile.take() {
            if projectile.update(delta_ms, config.ground_y) {
                let hit = hurtbox.min_x - projectile.radius <= projectile.pos.x
                    && projectile.pos.x <= hurtbox.max_x + projectile.radius
                    && hurtbox.min_y - projectile.radius <= projectile.pos.y
                    && projectile.pos.y <= hurtbox.max_y + projectile.radius;
                if hit {
                    let knockback = projectile.vel.x.signum() * 150.0;
                    player.take_damage(projectile.damage, knockback, config, events);
                } else {
                    enemy.projectile = Some(projectile);
                }
            }
        }

        if let Some(mut bomb) = enemy.bomb.take() {
            if bomb.update(delta_ms, config.gravity, config.ground_y) {
                // Detonation.
                if player.body.pos.distance(bomb.pos) <= bomb.blast_radius {
                    let dir = (player.body.pos.x - bomb.pos.x).signum();
                    player.take_damage(bomb.damage, dir * 250.0, config, events);
                }
            } else {
                enemy.bomb = Some(bomb);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enemy::EnemyArchetype;
    use crate::input::InputSnapshot;

    fn setup() -> (SimConfig, SimRng, EventBus) {
        (SimConfig::default(), SimRng::new(11), EventBus::default())
    }

    fn grounded_player(config: &SimConfig, rng: &mut SimRng, events: &EventBus) -> Player {
        let mut player = Player::new(200.0, config.ground_y - 40.0, config);
        for _ in 0..20 {
            player.update(16.0, &InputSnapshot::default(), config, rng, events);
        }
        player
    }

    fn adjacent_thug(player: &Player, rng: &mut SimRng) -> Enemy {
        let ty = EnemyArchetype::Thug.descriptor();
        Enemy::new(
            EnemyArchetype::Thug,
            ty,
            player.body.pos.x + 40.0,
            player.body.pos.y,
            rng,
        )
    }

    /// Drives the player into a punch and forward into its active
    /// window.
    fn start_active_punch(player: &mut Player, config: &SimConfig, rng: &mut SimRng, events: &EventBus) {
        let punch = InputSnapshot {
            punch: true,
            ..InputSnapshot::default()
        };
        player.update(16.0, &punch, config, rng, events);
        let into_window = config.player.punch.duration_ms * 0.4;
        player.update(into_window, &InputSnapshot::default(), config, rng, events);
        assert!(player.is_on_active_frame(config));
    }

    #[test]
    fn test_punch_damages_one_enemy_once() {
        let (config, mut rng, events) = setup();
        let mut player = grounded_player(&config, &mut rng, &events);
        let mut enemies = vec![adjacent_thug(&player, &mut rng)];
        let mut combo = ComboMeter::new();

        start_active_punch(&mut player, &config, &mut rng, &events);
        let score = resolve_player_attack(
            &mut player,
            &mut enemies,
            &mut combo,
            &config,
            &mut rng,
            &events,
        );
        assert_eq!(enemies[0].health, 30 - config.player.punch.damage);
        assert!(player.has_hit);
        assert_eq!(score, u64::from(config.combo.score_per_hit));
        assert_eq!(combo.count, 1);

        // Same activation cannot connect again.
        let again = resolve_player_attack(
            &mut player,
            &mut enemies,
            &mut combo,
            &config,
            &mut rng,
            &events,
        );
        assert_eq!(again, 0);
        assert_eq!(enemies[0].health, 30 - config.player.punch.damage);
    }

    #[test]
    fn test_combo_multiplier_scales_damage() {
        let (config, mut rng, events) = setup();
        let mut player = grounded_player(&config, &mut rng, &events);
        let mut enemies = vec![adjacent_thug(&player, &mut rng)];
        enemies[0].ty.max_health = 1000;
        enemies[0].health = 1000;
        let mut combo = ComboMeter::new();
        // Five prior hits: multiplier 1.5.
        for _ in 0..5 {
            combo.hit(10, &config.combo);
        }

        start_active_punch(&mut player, &config, &mut rng, &events);
        resolve_player_attack(
            &mut player,
            &mut enemies,
            &mut combo,
            &config,
            &mut rng,
            &events,
        );
        let expected = ((config.player.punch.damage as f32) * 1.5).floor() as i32;
        assert_eq!(enemies[0].health, 1000 - expected);
    }

    #[test]
    fn test_hitstop_applied_to_both_sides() {
        let (config, mut rng, events) = setup();
        let mut player = grounded_player(&config, &mut rng, &events);
        let mut enemies = vec![adjacent_thug(&player, &mut rng)];
        let mut combo = ComboMeter::new();

        start_active_punch(&mut player, &config, &mut rng, &events);
        let timer = player.state_timer();
        resolve_player_attack(
            &mut player,
            &mut enemies,
            &mut combo,
            &config,
            &mut rng,
            &events,
        );

        // Next tick both combatants are frozen.
        player.update(16.0, &InputSnapshot::default(), &config, &mut rng, &events);
        assert!((player.state_timer() - timer).abs() < f32::EPSILON);
    }

    #[test]
    fn test_web_shot_stuns_without_damage() {
        let (config, mut rng, events) = setup();
        let mut player = grounded_player(&config, &mut rng, &events);
        let mut enemies = vec![adjacent_thug(&player, &mut rng)];
        let mut combo = ComboMeter::new();

        let shoot = InputSnapshot {
            web_shoot: true,
            ..InputSnapshot::default()
        };
        player.update(16.0, &shoot, &config, &mut rng, &events);
        assert_eq!(player.state(), PlayerState::WebShot);
        player.update(
            config.player.web_shot.duration_ms * 0.5,
            &InputSnapshot::default(),
            &config,
            &mut rng,
            &events,
        );
        assert!(player.is_on_active_frame(&config));

        resolve_player_attack(
            &mut player,
            &mut enemies,
            &mut combo,
            &config,
            &mut rng,
            &events,
        );
        assert_eq!(enemies[0].health, 30, "no damage from a web shot");
        assert!(enemies[0].is_stunned());
        assert!(enemies[0].webbed);
        assert_eq!(combo.count, 0);
    }

    #[test]
    fn test_web_pull_tags_then_reels_then_parks() {
        let (config, mut rng, events) = setup();
        let mut player = grounded_player(&config, &mut rng, &events);
        let mut enemies = vec![adjacent_thug(&player, &mut rng)];
        enemies[0].body.pos.x = player.body.pos.x + 200.0;
        let mut combo = ComboMeter::new();

        let pull = InputSnapshot {
            down: true,
            web_shoot: true,
            ..InputSnapshot::default()
        };
        player.update(16.0, &pull, &config, &mut rng, &events);
        assert_eq!(player.state(), PlayerState::WebPull);
        player.update(
            config.player.web_pull_duration_ms * 0.1,
            &InputSnapshot::default(),
            &config,
            &mut rng,
            &events,
        );
        assert!(player.is_on_active_frame(&config));

        resolve_player_attack(
            &mut player,
            &mut enemies,
            &mut combo,
            &config,
            &mut rng,
            &events,
        );
        assert_eq!(player.pull_target, Some(enemies[0].id));
        assert!(enemies[0].being_pulled);

        // Reel: velocity points at the player.
        resolve_web_pull(&mut player, &mut enemies, &config);
        assert!(enemies[0].body.vel.x < 0.0);

        // Park once close.
        enemies[0].body.pos.x = player.body.pos.x + 30.0;
        resolve_web_pull(&mut player, &mut enemies, &config);
        assert!(!enemies[0].being_pulled);
        assert!(player.pull_target.is_none());
        assert!(enemies[0].is_stunned());
    }

    #[test]
    fn test_shockwave_hits_everyone_in_radius() {
        let (config, mut rng, events) = setup();
        let mut player = grounded_player(&config, &mut rng, &events);
        let radius = config.player.dive_kick_shock_radius;

        let mut enemies = vec![
            adjacent_thug(&player, &mut rng),
            adjacent_thug(&player, &mut rng),
            adjacent_thug(&player, &mut rng),
        ];
        enemies[0].body.pos.x = player.body.pos.x + 50.0;
        enemies[1].body.pos.x = player.body.pos.x - 80.0;
        enemies[2].body.pos.x = player.body.pos.x + radius + 200.0; // out of range
        let mut combo = ComboMeter::new();

        resolve_dive_kick_shock(
            &mut player,
            &mut enemies,
            &mut combo,
            &config,
            &mut rng,
            &events,
        );
        assert!(enemies[0].health < 30);
        assert!(enemies[1].health < 30);
        assert_eq!(enemies[2].health, 30);
        assert_eq!(combo.count, 2);
    }

    #[test]
    fn test_enemy_melee_damages_player() {
        let (config, mut rng, events) = setup();
        let mut player = grounded_player(&config, &mut rng, &events);
        let mut enemies = vec![adjacent_thug(&player, &mut rng)];
        enemies[0].attack_cooldown = 0.0;

        // Walk the enemy into its swing and through the windup.
        let target = player.body.pos;
        enemies[0].update(16.0, target, &config, &mut rng);
        for _ in 0..30 {
            enemies[0].update(16.0, target, &config, &mut rng);
            if enemies[0].is_on_active_frame() {
                break;
            }
        }
        assert!(enemies[0].is_on_active_frame());

        resolve_enemy_attacks(&mut player, &mut enemies, &config, &events);
        assert_eq!(
            player.health,
            player.max_health - enemies[0].ty.melee_damage
        );
        assert!(enemies[0].has_hit);
        assert_eq!(player.state(), PlayerState::Hit);
    }

    #[test]
    fn test_grab_ticks_damage_on_interval() {
        let (config, mut rng, events) = setup();
        let mut player = grounded_player(&config, &mut rng, &events);
        let ty = EnemyArchetype::Tyrant.descriptor();
        let mut enemies = vec![Enemy::new(
            EnemyArchetype::Tyrant,
            ty,
            player.body.pos.x + 50.0,
            player.body.pos.y,
            &mut rng,
        )];
        enemies[0].grab_target = Some(player.id);

        let start = player.health;
        let per_tick = enemies[0].ty.grab.map_or(0, |g| g.damage_per_tick);

        // Just shy of one interval: no tick yet.
        resolve_grabs(
            &mut player,
            &mut enemies,
            config.grab_tick_ms - 1.0,
            &config,
            &events,
        );
        assert_eq!(player.health, start);

        // Crossing the interval deals exactly one tick.
        resolve_grabs(&mut player, &mut enemies, 1.0, &config, &events);
        assert_eq!(player.health, start - per_tick);

        // Two intervals later, two more ticks.
        resolve_grabs(
            &mut player,
            &mut enemies,
            config.grab_tick_ms,
            &config,
            &events,
        );
        resolve_grabs(
            &mut player,
            &mut enemies,
            config.grab_tick_ms,
            &config,
            &events,
        );
        assert_eq!(player.health, start - 3 * per_tick);
    }

    #[test]
    fn test_bomb_detonates_on_fuse() {
        let (config, mut rng, events) = setup();
        let mut player = grounded_player(&config, &mut rng, &events);
        let ty = EnemyArchetype::Bomber.descriptor();
        let mut enemies = vec![Enemy::new(
            EnemyArchetype::Bomber,
            ty,
            player.body.pos.x + 300.0,
            player.body.pos.y,
            &mut rng,
        )];

        // Plant a live bomb at the player's feet, already landed.
        enemies[0].bomb = Some(crate::enemy::Bomb {
            pos: Vec2::new(player.body.pos.x, config.ground_y),
            vel: Vec2::ZERO,
            damage: 14,
            blast_radius: 90.0,
            fuse_ms: 100.0,
            landed: true,
        });

        resolve_ordnance(&mut player, &mut enemies, 50.0, &config, &events);
        assert_eq!(player.health, player.max_health, "fuse still burning");

        resolve_ordnance(&mut player, &mut enemies, 60.0, &config, &events);
        assert_eq!(player.health, player.max_health - 14);
        assert!(enemies[0].bomb.is_none());
    }
}
