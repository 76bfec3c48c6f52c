//! Projectile flight and collision
//!
//! Projectiles are scanned in ascending id order and tested against players
//! in ascending id order. A projectile strikes at most one player, ever, and
//! is removed exactly once.

use crate::config::SimulationConfig;
use crate::game::simulation::{DamageCause, TickReport};
use crate::game::state::{PlayerId, ProjectileId, WorldState};
use crate::game::systems::lifecycle;

/// Why a projectile is leaving the world
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectileEvent {
    OutOfBounds(ProjectileId),
    Hit {
        projectile: ProjectileId,
        owner: PlayerId,
        victim: PlayerId,
        killed: bool,
    },
}

impl ProjectileEvent {
    pub fn projectile_id(&self) -> ProjectileId {
        match *self {
            ProjectileEvent::OutOfBounds(id) => id,
            ProjectileEvent::Hit { projectile, .. } => projectile,
        }
    }
}

/// Move every projectile along its direction
pub fn advance_projectiles(world: &mut WorldState, dt: f32) {
    for projectile in world.projectiles.values_mut() {
        projectile.position += projectile.direction * (projectile.speed * dt);
    }
}

/// Test every projectile for leaving the arena or striking a player.
///
/// Bounds are checked first. Damage lands immediately so later projectiles in
/// the same pass skip a player already at 0 hp; respawning waits for the
/// death-handling step. Returns one event per projectile to remove.
pub fn resolve_collisions(
    world: &mut WorldState,
    config: &SimulationConfig,
    report: &mut TickReport,
) -> Vec<ProjectileEvent> {
    let (min, max) = (config.arena_min(), config.arena_max());
    let hit_distance = config.player_radius + config.projectile_radius;
    let hit_distance_sq = hit_distance * hit_distance;

    let mut events = Vec::new();

    for projectile in world.projectiles.values() {
        if !projectile.position.within(min, max) {
            events.push(ProjectileEvent::OutOfBounds(projectile.id));
            continue;
        }

        let target = world.players.values_mut().find(|p| {
            p.id != projectile.owner_id
                && !p.is_dead()
                && p.position.distance_sq_to(projectile.position) < hit_distance_sq
        });

        if let Some(player) = target {
            let killed = player.take_damage(config.primary_damage);
            report.changed.insert(player.id);
            events.push(ProjectileEvent::Hit {
                projectile: projectile.id,
                owner: projectile.owner_id,
                victim: player.id,
                killed,
            });
        }
    }

    for event in &events {
        if let ProjectileEvent::Hit {
            projectile,
            owner,
            victim,
            killed: true,
        } = *event
        {
            lifecycle::record_kill(world, owner, victim, DamageCause::Projectile(projectile), report);
        }
    }

    events
}

/// Drop the projectiles named by `events`. Returns how many were removed.
pub fn remove_projectiles(world: &mut WorldState, events: &[ProjectileEvent]) -> usize {
    events
        .iter()
        .filter(|event| world.projectiles.remove(&event.projectile_id()).is_some())
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::vec2::Vec2;

    fn config() -> SimulationConfig {
        SimulationConfig {
            player_radius: 5.0,
            projectile_radius: 1.0,
            primary_damage: 10,
            max_hp: 100,
            ..SimulationConfig::default()
        }
    }

    #[test]
    fn test_advance_moves_along_direction() {
        let mut world = WorldState::with_seed(41);
        let id = world.spawn_projectile(1, Vec2::new(10.0, 10.0), Vec2::DOWN, 300.0);

        advance_projectiles(&mut world, 0.1);

        assert!(world.projectiles[&id]
            .position
            .approx_eq(Vec2::new(10.0, 40.0), 1e-4));
    }

    #[test]
    fn test_out_of_bounds_removed_once() {
        let cfg = config();
        let mut world = WorldState::with_seed(42);
        let id = world.spawn_projectile(1, Vec2::new(-1.0, 50.0), Vec2::LEFT, 100.0);
        let mut report = TickReport::new(1);

        let events = resolve_collisions(&mut world, &cfg, &mut report);
        assert_eq!(events, vec![ProjectileEvent::OutOfBounds(id)]);
        assert_eq!(remove_projectiles(&mut world, &events), 1);
        assert!(world.projectiles.is_empty());

        // Removing again is a no-op
        assert_eq!(remove_projectiles(&mut world, &events), 0);
    }

    #[test]
    fn test_out_of_bounds_detected_before_collision() {
        let cfg = config();
        let mut world = WorldState::with_seed(43);
        let owner = world.spawn_player_at(Vec2::new(100.0, 100.0), &cfg);
        let victim = world.spawn_player_at(Vec2::new(0.0, 50.0), &cfg);
        // Overlaps the victim but sits just outside the arena
        let id = world.spawn_projectile(owner, Vec2::new(-0.5, 50.0), Vec2::LEFT, 100.0);
        let mut report = TickReport::new(1);

        let events = resolve_collisions(&mut world, &cfg, &mut report);

        assert_eq!(events, vec![ProjectileEvent::OutOfBounds(id)]);
        assert_eq!(world.get_player(victim).unwrap().hp, 100);
    }

    #[test]
    fn test_owner_is_never_hit() {
        let cfg = config();
        let mut world = WorldState::with_seed(44);
        let owner = world.spawn_player_at(Vec2::new(100.0, 100.0), &cfg);
        world.spawn_projectile(owner, Vec2::new(100.0, 100.0), Vec2::RIGHT, 100.0);
        let mut report = TickReport::new(1);

        let events = resolve_collisions(&mut world, &cfg, &mut report);

        assert!(events.is_empty());
        assert_eq!(world.get_player(owner).unwrap().hp, 100);
    }

    #[test]
    fn test_first_player_in_id_order_takes_the_hit() {
        let cfg = config();
        let mut world = WorldState::with_seed(45);
        let owner = world.spawn_player_at(Vec2::new(300.0, 300.0), &cfg);
        let first = world.spawn_player_at(Vec2::new(100.0, 100.0), &cfg);
        let second = world.spawn_player_at(Vec2::new(102.0, 100.0), &cfg);
        let id = world.spawn_projectile(owner, Vec2::new(101.0, 100.0), Vec2::RIGHT, 100.0);
        let mut report = TickReport::new(1);

        let events = resolve_collisions(&mut world, &cfg, &mut report);

        assert_eq!(
            events,
            vec![ProjectileEvent::Hit {
                projectile: id,
                owner,
                victim: first,
                killed: false,
            }]
        );
        assert_eq!(world.get_player(first).unwrap().hp, 90);
        assert_eq!(world.get_player(second).unwrap().hp, 100);
    }

    #[test]
    fn test_orphan_projectile_still_hits() {
        let cfg = config();
        let mut world = WorldState::with_seed(46);
        let owner = world.spawn_player_at(Vec2::new(300.0, 300.0), &cfg);
        let victim = world.spawn_player_at(Vec2::new(100.0, 100.0), &cfg);
        world.spawn_projectile(owner, Vec2::new(100.0, 100.0), Vec2::RIGHT, 100.0);
        world.remove_player(owner);
        let mut report = TickReport::new(1);

        let events = resolve_collisions(&mut world, &cfg, &mut report);

        assert_eq!(events.len(), 1);
        assert_eq!(world.get_player(victim).unwrap().hp, 90);
    }

    #[test]
    fn test_dead_player_not_hit_twice() {
        let cfg = config();
        let mut world = WorldState::with_seed(47);
        let owner = world.spawn_player_at(Vec2::new(300.0, 300.0), &cfg);
        let victim = world.spawn_player_at(Vec2::new(100.0, 100.0), &cfg);
        world.get_player_mut(victim).unwrap().hp = 5;
        let a = world.spawn_projectile(owner, Vec2::new(100.0, 100.0), Vec2::RIGHT, 100.0);
        let b = world.spawn_projectile(owner, Vec2::new(100.0, 101.0), Vec2::RIGHT, 100.0);
        let mut report = TickReport::new(1);

        let events = resolve_collisions(&mut world, &cfg, &mut report);

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].projectile_id(), a);
        assert!(world.projectiles.contains_key(&b));
        assert_eq!(world.get_player(victim).unwrap().hp, 0);
        assert_eq!(world.get_player(owner).unwrap().kills, 1);
        assert_eq!(report.kills.len(), 1);
        assert_eq!(report.kills[0].cause, DamageCause::Projectile(a));
    }
}
