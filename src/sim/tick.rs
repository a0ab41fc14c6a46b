//! Fixed timestep simulation tick
//!
//! Order within a tick: player movement and actions, each enemy in slot
//! order, projectiles, then door recomputation. Earlier enemies' shots exist
//! before later enemies think; nothing depends on that being otherwise.

use glam::Vec2;

use super::access::refresh_doors;
use super::ai::{AiEnv, notify_hit, update_enemy};
use super::collision::{projectile_hits_world, resolve_move};
use super::perception::can_see;
use super::pool::Handle;
use super::state::{Abilities, BehaviorKind, GameEvent, GamePhase, Identity, World};
use crate::bearing_deg;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Desired movement direction; clamped to unit length
    pub move_dir: Vec2,
    /// Restrain an adjacent enemy that can't see us
    pub takedown: bool,
    /// Steal the mask of an adjacent restrained enemy
    pub take_mask: bool,
}

/// Advance the world by one fixed timestep
pub fn tick(world: &mut World, input: &TickInput, dt: f32) {
    world.events.clear();
    if world.phase != GamePhase::Infiltrating {
        return;
    }
    world.time_ticks += 1;

    move_player(world, input.move_dir, dt);
    if input.takedown {
        try_takedown(world);
    }
    if input.take_mask {
        try_take_mask(world);
    }

    update_enemies(world, dt);
    update_projectiles(world, dt);

    refresh_doors(
        &mut world.level,
        &world.player,
        world.settings.player.door_trigger_margin,
    );

    update_phase(world);
}

fn move_player(world: &mut World, dir: Vec2, dt: f32) {
    let dir = dir.clamp_length_max(1.0);
    if dir == Vec2::ZERO {
        return;
    }
    let delta = dir * world.player.identity.speed * dt;
    let (pos, _) = resolve_move(&world.player, delta, &world.level);
    world.player.pos = pos;
    world.player.rotation = bearing_deg(Vec2::ZERO, dir);
}

/// Is a body of `radius` at `pos` within arm's reach of the player?
fn in_reach(world: &World, pos: Vec2, radius: f32) -> bool {
    let reach = world.player.radius + radius + world.settings.player.reach;
    world.player.pos.distance(pos) <= reach
}

/// Restrain the first enemy in reach that can't currently see the player
pub fn try_takedown(world: &mut World) -> Option<Handle> {
    let player = &world.player;
    if !player.active || !player.identity.abilities.contains(Abilities::TAKEDOWN) {
        return None;
    }

    let victim = world.enemies.iter().find_map(|(handle, enemy)| {
        let eligible = enemy.active
            && !enemy.restrained
            && in_reach(world, enemy.pos, enemy.radius)
            && !can_see(enemy, player.pos, &world.level);
        eligible.then_some(handle)
    })?;

    let enemy = world.enemies.get_mut(victim)?;
    enemy.restrained = true;
    log::info!("Enemy {:?} restrained", victim);
    world
        .events
        .push(GameEvent::EnemyRestrained { enemy: victim });
    Some(victim)
}

/// Take the mask of the first restrained, still-masked enemy in reach.
///
/// The player's identity is replaced wholesale; the enemy is left unmasked.
pub fn try_take_mask(world: &mut World) -> Option<Handle> {
    if !world.player.active {
        return None;
    }
    let unmasked = Identity::unmasked();
    let victim = world.enemies.iter().find_map(|(handle, enemy)| {
        let eligible = enemy.active
            && enemy.restrained
            && enemy.identity != unmasked
            && in_reach(world, enemy.pos, enemy.radius);
        eligible.then_some(handle)
    })?;

    let enemy = world.enemies.get_mut(victim)?;
    let mask = std::mem::replace(&mut enemy.identity, unmasked);
    world.player.identity = mask;
    log::info!(
        "Mask stolen from {:?}: now {} clearance",
        victim,
        mask.permission.as_str()
    );
    world.events.push(GameEvent::MaskStolen {
        enemy: victim,
        permission: mask.permission,
    });
    Some(victim)
}

fn update_enemies(world: &mut World, dt: f32) {
    let World {
        level,
        enemies,
        player,
        projectiles,
        rng,
        settings,
        events,
        ..
    } = world;

    let env = AiEnv {
        level: &*level,
        tuning: &settings.ai,
        dt,
    };
    let target = player.pos;

    for (handle, enemy) in enemies.iter_mut() {
        let was_attacking = enemy.behavior.kind() == BehaviorKind::Attack;
        let fired = update_enemy(enemy, Some(handle), target, &env, projectiles, rng);
        if !was_attacking && enemy.behavior.kind() == BehaviorKind::Attack {
            log::info!("Enemy {:?} spotted the player", handle);
            events.push(GameEvent::EnemySpotted { enemy: handle });
        }
        if fired {
            events.push(GameEvent::ShotFired { enemy: handle });
        }
    }
}

fn update_projectiles(world: &mut World, dt: f32) {
    let World {
        level,
        enemies,
        player,
        player_health,
        projectiles,
        rng,
        settings,
        events,
        ..
    } = world;

    let mut player_hits = 0u8;
    let mut enemy_hits: Vec<(Handle, Vec2)> = Vec::new();

    projectiles.retain(|_, p| {
        p.ttl -= dt;
        if p.ttl <= 0.0 {
            return false;
        }
        p.pos += p.vel * dt;

        if projectile_hits_world(p.pos, p.radius, level) {
            return false;
        }

        if player.active && p.pos.distance(player.pos) < p.radius + player.radius {
            player_hits = player_hits.saturating_add(1);
            return false;
        }

        let struck = enemies.iter().find(|(h, e)| {
            Some(*h) != p.owner && e.active && p.pos.distance(e.pos) < p.radius + e.radius
        });
        if let Some((handle, _)) = struck {
            // Alert toward the shooter if it's still around, else the bullet's path
            let source = p
                .owner
                .and_then(|h| enemies.get(h))
                .map(|e| e.pos)
                .unwrap_or(p.pos - p.vel * dt);
            enemy_hits.push((handle, source));
            return false;
        }

        true
    });

    for (handle, source) in enemy_hits {
        if let Some(enemy) = enemies.get_mut(handle) {
            if notify_hit(enemy, source, &settings.ai, rng) {
                events.push(GameEvent::EnemyAlerted { enemy: handle });
            }
        }
    }

    if player_hits > 0 {
        *player_health = player_health.saturating_sub(player_hits);
        log::info!("Player hit, health {}", player_health);
        events.push(GameEvent::PlayerHit {
            health: *player_health,
        });
    }
}

fn update_phase(world: &mut World) {
    if world.player_health == 0 {
        world.phase = GamePhase::Caught;
        world.player.active = false;
        log::info!("Caught after {} ticks", world.time_ticks);
        world.events.push(GameEvent::Caught);
        return;
    }

    let escaped = world
        .level
        .exit
        .is_some_and(|exit| exit.contains_strict(world.player.pos));
    if escaped {
        world.phase = GamePhase::Escaped;
        log::info!("Escaped after {} ticks", world.time_ticks);
        world.events.push(GameEvent::Escaped);
    }
}
