//! Action intake
//!
//! Wire messages are checked once here and turned into [`Action`]s; nothing
//! past this point sees an unvalidated float. Intent and aim are written
//! straight into the world (last write wins). Ability uses are queued and
//! resolved by the next tick.

use crate::game::state::{AbilityUse, MoveIntent, PlayerId, WorldState};
use crate::net::protocol::ClientMessage;
use crate::util::vec2::Vec2;

/// Validated client action
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    SetIntent(MoveIntent),
    /// Unit-length facing vector
    SetAim(Vec2),
    PrimaryAttack { origin: Vec2, target: Vec2 },
    SecondaryAttack,
    Mobility,
    Leave,
}

/// Reasons an inbound action is dropped
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum IntakeError {
    #[error("Non-finite value in {0}")]
    NonFinite(&'static str),
    #[error("Zero-length aim vector")]
    ZeroAim,
    #[error("Unknown player {0}")]
    UnknownPlayer(PlayerId),
    #[error("Player {0} is dead")]
    DeadPlayer(PlayerId),
}

/// What applying an action did to the world
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// Intent or aim overwritten
    Updated,
    /// Ability use queued for the next tick
    Queued,
    /// Player removed
    Left,
}

impl TryFrom<ClientMessage> for Action {
    type Error = IntakeError;

    fn try_from(message: ClientMessage) -> Result<Self, Self::Error> {
        match message {
            ClientMessage::SetIntent {
                up,
                down,
                left,
                right,
            } => Ok(Action::SetIntent(MoveIntent {
                up,
                down,
                left,
                right,
            })),
            ClientMessage::SetAim { x, y, z } => {
                let aim = Vec2::new(x, y);
                if !aim.is_finite() || !z.map_or(true, f32::is_finite) {
                    return Err(IntakeError::NonFinite("aim"));
                }
                let aim = aim.try_normalize().ok_or(IntakeError::ZeroAim)?;
                Ok(Action::SetAim(aim))
            }
            ClientMessage::PrimaryAttack {
                origin_x,
                origin_y,
                target_x,
                target_y,
            } => {
                let origin = Vec2::new(origin_x, origin_y);
                let target = Vec2::new(target_x, target_y);
                if !origin.is_finite() {
                    return Err(IntakeError::NonFinite("attack origin"));
                }
                if !target.is_finite() {
                    return Err(IntakeError::NonFinite("attack target"));
                }
                // Zero-length aim is left for resolution: the attempt still
                // spends the cooldown there.
                Ok(Action::PrimaryAttack { origin, target })
            }
            ClientMessage::SecondaryAttack => Ok(Action::SecondaryAttack),
            ClientMessage::Mobility => Ok(Action::Mobility),
            ClientMessage::Leave => Ok(Action::Leave),
        }
    }
}

/// Apply a validated action for `player_id`
pub fn apply(
    world: &mut WorldState,
    player_id: PlayerId,
    action: Action,
) -> Result<Applied, IntakeError> {
    let player = world
        .get_player_mut(player_id)
        .ok_or(IntakeError::UnknownPlayer(player_id))?;

    if player.is_dead() && action != Action::Leave {
        return Err(IntakeError::DeadPlayer(player_id));
    }

    match action {
        Action::SetIntent(intent) => {
            player.intent = intent;
            Ok(Applied::Updated)
        }
        Action::SetAim(aim) => {
            if player.aim != aim {
                player.aim = aim;
                world.mark_dirty(player_id);
            }
            Ok(Applied::Updated)
        }
        Action::PrimaryAttack { origin, target } => {
            world.queue_ability(player_id, AbilityUse::Primary { origin, target });
            Ok(Applied::Queued)
        }
        Action::SecondaryAttack => {
            world.queue_ability(player_id, AbilityUse::Secondary);
            Ok(Applied::Queued)
        }
        Action::Mobility => {
            world.queue_ability(player_id, AbilityUse::Mobility);
            Ok(Applied::Queued)
        }
        Action::Leave => {
            world.remove_player(player_id);
            Ok(Applied::Left)
        }
    }
}

/// Validate and apply a raw wire message
pub fn submit(
    world: &mut WorldState,
    player_id: PlayerId,
    message: ClientMessage,
) -> Result<Applied, IntakeError> {
    let action = Action::try_from(message)?;
    apply(world, player_id, action)
}
