//! Ability timer decay
//!
//! First step of every tick. Timers only ever count down here.

use std::collections::BTreeSet;

use crate::game::state::{PlayerId, WorldState};

/// Decay every ability timer by `dt`. Players whose dash window closed are
/// recorded as changed.
pub fn tick_timers(world: &mut WorldState, dt: f32, changed: &mut BTreeSet<PlayerId>) {
    for player in world.players.values_mut() {
        if player.abilities.tick(dt) {
            changed.insert(player.id);
        }
    }
}
