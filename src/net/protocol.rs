use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::game::state::{Player, PlayerId, Projectile, ProjectileId, WorldState};
use crate::util::vec2::Vec2;

/// Messages from client to server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ClientMessage {
    /// Held movement directions (replaces the previous set)
    SetIntent {
        up: bool,
        down: bool,
        left: bool,
        right: bool,
    },
    /// Facing vector; `z` is accepted from 3D clients and ignored
    SetAim { x: f32, y: f32, z: Option<f32> },
    /// Fire a projectile from origin towards target
    PrimaryAttack {
        origin_x: f32,
        origin_y: f32,
        target_x: f32,
        target_y: f32,
    },
    /// Melee swing along the current aim
    SecondaryAttack,
    /// Dash
    Mobility,
    /// Request to leave the game
    Leave,
}

/// Messages from server to client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ServerMessage {
    /// Sent once to a joining player
    Welcome {
        player_id: PlayerId,
        snapshot: WorldSnapshot,
    },
    /// Per-tick change set
    Delta(StateDelta),
}

/// Broadcast view of a player, always sent whole
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub id: PlayerId,
    pub position: Vec2,
    pub aim: Vec2,
    pub hp: i32,
    pub color_index: u8,
    /// Dash currently active
    pub dashing: bool,
    pub kills: u32,
    pub deaths: u32,
}

impl PlayerRecord {
    pub fn from_player(player: &Player) -> Self {
        Self {
            id: player.id,
            position: player.position,
            aim: player.aim,
            hp: player.hp,
            color_index: player.color_index,
            dashing: player.abilities.mobility.is_active(),
            kills: player.kills,
            deaths: player.deaths,
        }
    }
}

/// Broadcast view of a projectile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectileRecord {
    pub id: ProjectileId,
    pub owner_id: PlayerId,
    pub position: Vec2,
    pub direction: Vec2,
    pub speed: f32,
}

impl ProjectileRecord {
    pub fn from_projectile(projectile: &Projectile) -> Self {
        Self {
            id: projectile.id,
            owner_id: projectile.owner_id,
            position: projectile.position,
            direction: projectile.direction,
            speed: projectile.speed,
        }
    }
}

/// All live projectiles keyed by id
pub fn projectile_records(world: &WorldState) -> BTreeMap<ProjectileId, ProjectileRecord> {
    world
        .projectiles
        .values()
        .map(|p| (p.id, ProjectileRecord::from_projectile(p)))
        .collect()
}

/// Minimal change set for one tick
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StateDelta {
    pub tick: u64,
    /// Players whose record changed this tick
    pub updated: BTreeMap<PlayerId, PlayerRecord>,
    /// Players that joined since the last broadcast
    pub created: BTreeMap<PlayerId, PlayerRecord>,
    /// Players that left since the last broadcast
    pub removed: Vec<PlayerId>,
    /// Every live projectile
    pub projectiles: BTreeMap<ProjectileId, ProjectileRecord>,
}

/// Full world state, sent once on join
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub tick: u64,
    pub players: BTreeMap<PlayerId, PlayerRecord>,
    pub projectiles: BTreeMap<ProjectileId, ProjectileRecord>,
}

impl WorldSnapshot {
    pub fn from_world(world: &WorldState) -> Self {
        Self {
            tick: world.tick,
            players: world
                .players
                .values()
                .map(|p| (p.id, PlayerRecord::from_player(p)))
                .collect(),
            projectiles: projectile_records(world),
        }
    }
}

/// Encode a message using bincode
/// Uses legacy config for fixed-size integers
pub fn encode<T: Serialize>(message: &T) -> Result<Vec<u8>, EncodeError> {
    bincode::serde::encode_to_vec(message, bincode::config::legacy())
        .map_err(|e| EncodeError(e.to_string()))
}

/// Decode a message using bincode
/// Uses legacy config for fixed-size integers
pub fn decode<T: for<'de> Deserialize<'de>>(data: &[u8]) -> Result<T, DecodeError> {
    bincode::serde::decode_from_slice(data, bincode::config::legacy())
        .map(|(msg, _)| msg)
        .map_err(|e| DecodeError(e.to_string()))
}

/// Encode a message as JSON for text transports and debugging
pub fn encode_json<T: Serialize>(message: &T) -> Result<String, EncodeError> {
    serde_json::to_string(message).map_err(|e| EncodeError(e.to_string()))
}

/// Decode a JSON message
pub fn decode_json<T: for<'de> Deserialize<'de>>(data: &str) -> Result<T, DecodeError> {
    serde_json::from_str(data).map_err(|e| DecodeError(e.to_string()))
}

#[derive(Debug, thiserror::Error)]
#[error("Encode error: {0}")]
pub struct EncodeError(String);

#[derive(Debug, thiserror::Error)]
#[error("Decode error: {0}")]
pub struct DecodeError(String);
