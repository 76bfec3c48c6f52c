//! Per-tick delta building
//!
//! Joins and leaves accumulate between broadcasts; `updated` is rebuilt from
//! the tick's changed set every time. Player records are sent whole, and the
//! projectile list is always a full snapshot.
//!
//! Rules:
//! - a player that joined and left inside one window appears in `removed` only
//! - a player in `created` is not repeated in `updated`
//! - `created` records are read from the world at build time, so a player who
//!   joined and already died and respawned shows up with its current state
//! - a delta that could not be sent is handed back with [`DeltaTracker::restore`]
//!   and its joins, leaves and updates ride along with the next build

use std::collections::{BTreeMap, BTreeSet};

use hashbrown::HashSet;

use crate::game::state::{PlayerId, WorldState};
use crate::net::protocol::{projectile_records, PlayerRecord, StateDelta};

// ============================================================================
// Delta Statistics
// ============================================================================

/// Size of a built delta, for logging and metrics
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DeltaStats {
    pub created: usize,
    pub updated: usize,
    pub removed: usize,
    pub projectiles: usize,
}

impl DeltaStats {
    pub fn of(delta: &StateDelta) -> Self {
        Self {
            created: delta.created.len(),
            updated: delta.updated.len(),
            removed: delta.removed.len(),
            projectiles: delta.projectiles.len(),
        }
    }
}

// ============================================================================
// Delta Tracker
// ============================================================================

/// Join/leave accumulators between broadcasts
#[derive(Debug, Default)]
pub struct DeltaTracker {
    joined: HashSet<PlayerId>,
    left: HashSet<PlayerId>,
    /// Updates from a delta that never went out
    carried: HashSet<PlayerId>,
}

impl DeltaTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_join(&mut self, player_id: PlayerId) {
        self.joined.insert(player_id);
    }

    /// A leave cancels an unbroadcast join
    pub fn record_leave(&mut self, player_id: PlayerId) {
        self.joined.remove(&player_id);
        self.left.insert(player_id);
    }

    /// Build the delta for this tick and reset the accumulators
    pub fn build(&mut self, world: &WorldState, changed: &BTreeSet<PlayerId>) -> StateDelta {
        let created = self
            .joined
            .drain()
            .filter_map(|id| world.get_player(id))
            .map(|p| (p.id, PlayerRecord::from_player(p)))
            .collect::<BTreeMap<_, _>>();

        let updated = changed
            .iter()
            .copied()
            .chain(self.carried.drain())
            .filter(|id| !created.contains_key(id))
            .filter_map(|id| world.get_player(id))
            .map(|p| (p.id, PlayerRecord::from_player(p)))
            .collect();

        let mut removed: Vec<PlayerId> = self.left.drain().collect();
        removed.sort_unstable();

        StateDelta {
            tick: world.tick,
            updated,
            created,
            removed,
            projectiles: projectile_records(world),
        }
    }

    /// Hand back a delta that was built but not broadcast
    pub fn restore(&mut self, delta: &StateDelta) {
        self.joined.extend(delta.created.keys().copied());
        self.left.extend(delta.removed.iter().copied());
        self.carried.extend(delta.updated.keys().copied());
    }
}
