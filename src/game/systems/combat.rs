//! Ability resolution
//!
//! Queued ability uses resolve in arrival order. Each one checks its own
//! cooldown first; a use while cooling is dropped without side effects.

use smallvec::SmallVec;
use tracing::trace;

use crate::config::SimulationConfig;
use crate::game::simulation::{DamageCause, TickReport};
use crate::game::state::{AbilityUse, PlayerId, ProjectileId, WorldState};
use crate::game::systems::lifecycle;
use crate::util::vec2::{wrap_angle, Vec2};

/// Result of a single queued ability use
#[derive(Debug, Clone, PartialEq)]
pub enum AbilityOutcome {
    Fired(ProjectileId),
    Swung { hits: SmallVec<[PlayerId; 4]> },
    Dashed,
    /// Still cooling down
    OnCooldown,
    /// Cooldown spent but the aim had no direction
    InvalidAim,
    /// Player left before the tick
    UnknownPlayer,
}

/// Resolve every ability use queued since the last tick
pub fn resolve_abilities(world: &mut WorldState, config: &SimulationConfig, report: &mut TickReport) {
    for (player_id, ability) in world.take_pending_abilities() {
        let outcome = match ability {
            AbilityUse::Primary { origin, target } => {
                fire_primary(world, config, player_id, origin, target, report)
            }
            AbilityUse::Secondary => melee_swing(world, config, player_id, report),
            AbilityUse::Mobility => activate_mobility(world, config, player_id, report),
        };

        match outcome {
            AbilityOutcome::OnCooldown
            | AbilityOutcome::InvalidAim
            | AbilityOutcome::UnknownPlayer => {
                trace!("Dropped {:?} from player {}: {:?}", ability, player_id, outcome);
                report.abilities_dropped += 1;
            }
            _ => report.abilities_used += 1,
        }
    }
}

/// Primary attack: spend the cooldown, then spawn a projectile at the
/// shooter's position heading from `origin` towards `target`.
pub fn fire_primary(
    world: &mut WorldState,
    config: &SimulationConfig,
    shooter: PlayerId,
    origin: Vec2,
    target: Vec2,
    report: &mut TickReport,
) -> AbilityOutcome {
    let Some(player) = world.get_player_mut(shooter) else {
        return AbilityOutcome::UnknownPlayer;
    };
    if !player.abilities.primary.try_trigger(config.primary_cooldown) {
        return AbilityOutcome::OnCooldown;
    }
    let Some(direction) = (target - origin).try_normalize() else {
        return AbilityOutcome::InvalidAim;
    };

    let position = player.position;
    let id = world.spawn_projectile(shooter, position, direction, config.projectile_speed);
    report.projectiles_spawned += 1;
    AbilityOutcome::Fired(id)
}

/// Whether `target` lies inside a swing from `origin` facing `facing`.
/// The arc edge itself is a miss.
pub fn in_melee_arc(
    origin: Vec2,
    facing: f32,
    target: Vec2,
    reach: f32,
    arc: f32,
) -> bool {
    if origin.distance_sq_to(target) > reach * reach {
        return false;
    }
    let bearing = (target - origin).angle();
    wrap_angle(bearing - facing).abs() < arc * 0.5
}

/// Secondary attack: damage every other player inside the arc, ascending id
/// order. Kills respawn immediately.
pub fn melee_swing(
    world: &mut WorldState,
    config: &SimulationConfig,
    attacker: PlayerId,
    report: &mut TickReport,
) -> AbilityOutcome {
    let Some(player) = world.get_player_mut(attacker) else {
        return AbilityOutcome::UnknownPlayer;
    };
    if !player.abilities.secondary.try_trigger(config.melee_cooldown) {
        return AbilityOutcome::OnCooldown;
    }

    let origin = player.position;
    let facing = player.facing();
    let reach = config.player_radius + config.melee_range;

    let hits: SmallVec<[PlayerId; 4]> = world
        .players
        .values()
        .filter(|p| p.id != attacker && !p.is_dead())
        .filter(|p| in_melee_arc(origin, facing, p.position, reach, config.melee_arc))
        .map(|p| p.id)
        .collect();

    for &victim in &hits {
        let Some(target) = world.get_player_mut(victim) else {
            continue;
        };
        let killed = target.take_damage(config.melee_damage);
        report.changed.insert(victim);

        if killed {
            lifecycle::record_kill(world, attacker, victim, DamageCause::Melee, report);
            lifecycle::respawn(world, config, victim);
        }
    }

    AbilityOutcome::Swung { hits }
}

/// Mobility: start the dash window and its cooldown together
pub fn activate_mobility(
    world: &mut WorldState,
    config: &SimulationConfig,
    player_id: PlayerId,
    report: &mut TickReport,
) -> AbilityOutcome {
    let Some(player) = world.get_player_mut(player_id) else {
        return AbilityOutcome::UnknownPlayer;
    };
    let mobility = &mut player.abilities.mobility;
    if !mobility.try_activate(config.mobility_duration, config.mobility_cooldown) {
        return AbilityOutcome::OnCooldown;
    }
    report.changed.insert(player_id);
    AbilityOutcome::Dashed
}
