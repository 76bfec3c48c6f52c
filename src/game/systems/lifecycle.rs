//! Death handling
//!
//! Players are never removed by gameplay. A player brought to 0 hp is reset
//! to full health at a jittered spawn point within the same tick.

use std::collections::BTreeSet;

use smallvec::SmallVec;
use tracing::debug;

use crate::config::SimulationConfig;
use crate::game::simulation::{DamageCause, KillEvent, TickReport};
use crate::game::state::{Player, PlayerId, WorldState};

/// Credit a kill. The killer may already have left the world.
pub fn record_kill(
    world: &mut WorldState,
    killer: PlayerId,
    victim: PlayerId,
    cause: DamageCause,
    report: &mut TickReport,
) {
    if let Some(player) = world.get_player_mut(victim) {
        player.deaths += 1;
        report.changed.insert(victim);
    }
    if let Some(player) = world.get_player_mut(killer) {
        player.kills += 1;
        report.changed.insert(killer);
    }
    debug!("Player {} killed player {} ({:?})", killer, victim, cause);
    report.kills.push(KillEvent {
        killer,
        victim,
        cause,
    });
}

/// Respawn a dead player. Returns false if the player is alive or gone.
pub fn respawn(world: &mut WorldState, config: &SimulationConfig, id: PlayerId) -> bool {
    if !world.get_player(id).is_some_and(Player::is_dead) {
        return false;
    }

    let position = world.respawn_position(config);
    let Some(player) = world.get_player_mut(id) else {
        return false;
    };
    player.hp = config.max_hp;
    player.position = position;
    player.abilities.mobility.cancel();
    true
}

/// Respawn every player currently at 0 hp
pub fn respawn_dead(
    world: &mut WorldState,
    config: &SimulationConfig,
    changed: &mut BTreeSet<PlayerId>,
) {
    let dead: SmallVec<[PlayerId; 8]> = world
        .players
        .values()
        .filter(|p| p.is_dead())
        .map(|p| p.id)
        .collect();

    for id in dead {
        if respawn(world, config, id) {
            changed.insert(id);
        }
    }
}
