//! Fixed-step simulation
//!
//! [`advance`] runs one tick in a fixed order:
//!
//! 1. ability timers
//! 2. movement
//! 3. queued ability uses, in arrival order
//! 4. projectile flight
//! 5. projectile collisions, ascending projectile id
//! 6. respawn of players at 0 hp
//! 7. removal of spent projectiles
//!
//! Everything is driven by the tick `dt`; nothing reads the wall clock.

use std::collections::BTreeSet;

use crate::config::SimulationConfig;
use crate::game::state::{PlayerId, ProjectileId, WorldState};
use crate::game::systems::{combat, cooldowns, lifecycle, movement, projectile};

/// What dealt a killing blow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageCause {
    Projectile(ProjectileId),
    Melee,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KillEvent {
    pub killer: PlayerId,
    pub victim: PlayerId,
    pub cause: DamageCause,
}

/// Outcome of a single tick
#[derive(Debug, Clone, Default)]
pub struct TickReport {
    pub tick: u64,
    /// Players whose broadcast record changed
    pub changed: BTreeSet<PlayerId>,
    pub kills: Vec<KillEvent>,
    pub projectiles_spawned: usize,
    pub projectiles_removed: usize,
    pub abilities_used: usize,
    pub abilities_dropped: usize,
}

impl TickReport {
    pub fn new(tick: u64) -> Self {
        Self {
            tick,
            ..Default::default()
        }
    }
}

/// Advance the world by one tick of `dt` seconds
pub fn advance(world: &mut WorldState, config: &SimulationConfig, dt: f32) -> TickReport {
    let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };

    world.tick += 1;
    let mut report = TickReport::new(world.tick);

    // Aim changes applied by intake since the last tick
    report.changed.extend(world.take_dirty());

    cooldowns::tick_timers(world, dt, &mut report.changed);
    movement::update_movement(world, config, dt, &mut report.changed);
    combat::resolve_abilities(world, config, &mut report);
    projectile::advance_projectiles(world, dt);
    let spent = projectile::resolve_collisions(world, config, &mut report);
    lifecycle::respawn_dead(world, config, &mut report.changed);
    report.projectiles_removed = projectile::remove_projectiles(world, &spent);

    // Departed players can linger in the set via kill credit lookups
    report.changed.retain(|id| world.players.contains_key(id));

    report
}
