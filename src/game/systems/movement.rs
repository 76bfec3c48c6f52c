//! Intent-driven movement
//!
//! Each active axis moves at the full effective speed; diagonals are not
//! normalized. Positions are clamped into the arena after every step.

use std::collections::BTreeSet;

use crate::config::SimulationConfig;
use crate::game::state::{Player, PlayerId, WorldState};

/// Current speed, boosted while the dash is active
pub fn effective_speed(player: &Player, config: &SimulationConfig) -> f32 {
    if player.abilities.mobility.is_active() {
        config.player_speed * config.mobility_multiplier
    } else {
        config.player_speed
    }
}

/// Move every player with a held direction. Only players whose position
/// actually changed are recorded.
pub fn update_movement(
    world: &mut WorldState,
    config: &SimulationConfig,
    dt: f32,
    changed: &mut BTreeSet<PlayerId>,
) {
    let (min, max) = (config.arena_min(), config.arena_max());

    for player in world.players.values_mut() {
        if !player.intent.any() {
            continue;
        }

        let step = effective_speed(player, config) * dt;
        let next = (player.position + player.intent.axes() * step).clamp(min, max);

        if next != player.position {
            player.position = next;
            changed.insert(player.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::state::MoveIntent;
    use crate::util::vec2::Vec2;

    fn config() -> SimulationConfig {
        SimulationConfig {
            player_speed: 100.0,
            mobility_multiplier: 3.0,
            ..SimulationConfig::default()
        }
    }

    fn world_with_player(position: Vec2, intent: MoveIntent) -> (WorldState, PlayerId) {
        let cfg = config();
        let mut world = WorldState::with_seed(9);
        let id = world.spawn_player_at(position, &cfg);
        world.get_player_mut(id).unwrap().intent = intent;
        (world, id)
    }

    #[test]
    fn test_moves_along_active_axes() {
        let intent = MoveIntent {
            right: true,
            down: true,
            ..Default::default()
        };
        let (mut world, id) = world_with_player(Vec2::new(200.0, 200.0), intent);
        let mut changed = BTreeSet::new();

        update_movement(&mut world, &config(), 0.5, &mut changed);

        assert_eq!(world.get_player(id).unwrap().position, Vec2::new(250.0, 250.0));
        assert!(changed.contains(&id));
    }

    #[test]
    fn test_opposite_flags_cancel() {
        let intent = MoveIntent {
            left: true,
            right: true,
            ..Default::default()
        };
        let (mut world, id) = world_with_player(Vec2::new(200.0, 200.0), intent);
        let mut changed = BTreeSet::new();

        update_movement(&mut world, &config(), 0.5, &mut changed);

        assert_eq!(world.get_player(id).unwrap().position, Vec2::new(200.0, 200.0));
        assert!(changed.is_empty());
    }

    #[test]
    fn test_clamped_at_wall_is_not_a_change() {
        let intent = MoveIntent {
            up: true,
            ..Default::default()
        };
        let (mut world, id) = world_with_player(Vec2::new(200.0, 10.0), intent);
        let mut changed = BTreeSet::new();

        update_movement(&mut world, &config(), 0.5, &mut changed);
        assert_eq!(world.get_player(id).unwrap().position, Vec2::new(200.0, 0.0));
        assert!(changed.contains(&id));

        // Pinned against the wall: position no longer changes
        changed.clear();
        update_movement(&mut world, &config(), 0.5, &mut changed);
        assert_eq!(world.get_player(id).unwrap().position, Vec2::new(200.0, 0.0));
        assert!(changed.is_empty());
    }

    #[test]
    fn test_dash_boosts_speed() {
        let intent = MoveIntent {
            right: true,
            ..Default::default()
        };
        let (mut world, id) = world_with_player(Vec2::new(100.0, 100.0), intent);
        world
            .get_player_mut(id)
            .unwrap()
            .abilities
            .mobility
            .try_activate(1.0, 2.0);
        let mut changed = BTreeSet::new();

        update_movement(&mut world, &config(), 0.5, &mut changed);

        assert_eq!(world.get_player(id).unwrap().position, Vec2::new(250.0, 100.0));
    }

    #[test]
    fn test_idle_players_untouched() {
        let (mut world, id) = world_with_player(Vec2::new(100.0, 100.0), MoveIntent::default());
        let mut changed = BTreeSet::new();
        update_movement(&mut world, &config(), 0.5, &mut changed);
        assert!(changed.is_empty());
        assert_eq!(world.get_player(id).unwrap().position, Vec2::new(100.0, 100.0));
    }
}
