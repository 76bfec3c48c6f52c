//! World state definitions
//!
//! The canonical set of live players and projectiles, plus id allocation and
//! spawn point selection. Players and projectiles are keyed in `BTreeMap`s so
//! every scan runs in ascending id order, which is the deterministic order
//! collisions and melee swings resolve in.

use std::collections::{BTreeMap, BTreeSet};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::config::SimulationConfig;
use crate::game::abilities::AbilityTimers;
use crate::game::constants::player::PALETTE_SIZE;
use crate::util::vec2::Vec2;

/// Player identifier, allocated in join order
pub type PlayerId = u64;

/// Projectile identifier, never reused for the life of the process
pub type ProjectileId = u64;

/// Directional movement flags as last reported by the client
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveIntent {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl MoveIntent {
    pub fn any(&self) -> bool {
        self.up || self.down || self.left || self.right
    }

    /// Per-axis direction, each component in {-1, 0, 1}. Opposite flags
    /// cancel. Screen coordinates: up is -y.
    pub fn axes(&self) -> Vec2 {
        let axis = |neg: bool, pos: bool| (pos as i8 - neg as i8) as f32;
        Vec2::new(axis(self.left, self.right), axis(self.up, self.down))
    }
}

/// Player state
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub id: PlayerId,
    pub position: Vec2,
    pub intent: MoveIntent,
    /// Facing vector (always finite and non-zero)
    pub aim: Vec2,
    /// Health, kept within `0..=max_hp`
    pub hp: i32,
    /// Client palette index
    pub color_index: u8,
    pub abilities: AbilityTimers,
    pub kills: u32,
    pub deaths: u32,
}

impl Player {
    pub fn new(id: PlayerId, position: Vec2, color_index: u8, max_hp: i32) -> Self {
        Self {
            id,
            position,
            intent: MoveIntent::default(),
            aim: Vec2::RIGHT,
            hp: max_hp,
            color_index,
            abilities: AbilityTimers::default(),
            kills: 0,
            deaths: 0,
        }
    }

    #[inline]
    pub fn is_dead(&self) -> bool {
        self.hp <= 0
    }

    /// Facing angle in radians
    pub fn facing(&self) -> f32 {
        self.aim.angle()
    }

    /// Apply damage, saturating at zero. Returns true when this hit was the
    /// killing blow.
    pub fn take_damage(&mut self, amount: i32) -> bool {
        if self.is_dead() {
            return false;
        }
        self.hp = (self.hp - amount.max(0)).max(0);
        self.is_dead()
    }
}

/// Projectile
#[derive(Debug, Clone, PartialEq)]
pub struct Projectile {
    pub id: ProjectileId,
    /// Firing player; may no longer be in the world
    pub owner_id: PlayerId,
    pub position: Vec2,
    /// Unit-length travel direction
    pub direction: Vec2,
    pub speed: f32,
}

/// Ability use waiting for the next tick's resolution step
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AbilityUse {
    Primary { origin: Vec2, target: Vec2 },
    Secondary,
    Mobility,
}

/// Canonical world state
#[derive(Debug, Clone)]
pub struct WorldState {
    pub tick: u64,
    pub players: BTreeMap<PlayerId, Player>,
    pub projectiles: BTreeMap<ProjectileId, Projectile>,
    /// Ability uses in arrival order since the last tick
    pending: Vec<(PlayerId, AbilityUse)>,
    /// Players whose record changed outside the tick (e.g. aim)
    dirty: BTreeSet<PlayerId>,
    next_player_id: PlayerId,
    next_projectile_id: ProjectileId,
    rng: StdRng,
}

impl WorldState {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// World with reproducible spawn points
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            tick: 0,
            players: BTreeMap::new(),
            projectiles: BTreeMap::new(),
            pending: Vec::new(),
            dirty: BTreeSet::new(),
            next_player_id: 1,
            next_projectile_id: 1,
            rng,
        }
    }

    /// Add a player at a random spawn point with a random colour
    pub fn add_player(&mut self, config: &SimulationConfig) -> PlayerId {
        let position = self.random_spawn_position(config);
        self.spawn_player_at(position, config)
    }

    /// Add a player at a given position (clamped into the arena)
    pub fn spawn_player_at(&mut self, position: Vec2, config: &SimulationConfig) -> PlayerId {
        let id = self.next_player_id;
        self.next_player_id += 1;

        let position = position.clamp(config.arena_min(), config.arena_max());
        let color_index = self.rng.gen_range(0..PALETTE_SIZE);
        self.players
            .insert(id, Player::new(id, position, color_index, config.max_hp));
        id
    }

    /// Remove a player. Projectiles it owns stay in flight.
    pub fn remove_player(&mut self, id: PlayerId) -> Option<Player> {
        let removed = self.players.remove(&id)?;
        self.pending.retain(|(owner, _)| *owner != id);
        self.dirty.remove(&id);
        Some(removed)
    }

    #[inline]
    pub fn get_player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(&id)
    }

    #[inline]
    pub fn get_player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.get_mut(&id)
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn projectile_count(&self) -> usize {
        self.projectiles.len()
    }

    /// Spawn a projectile. `direction` must already be unit length.
    pub fn spawn_projectile(
        &mut self,
        owner_id: PlayerId,
        position: Vec2,
        direction: Vec2,
        speed: f32,
    ) -> ProjectileId {
        let id = self.next_projectile_id;
        self.next_projectile_id += 1;
        self.projectiles.insert(
            id,
            Projectile {
                id,
                owner_id,
                position,
                direction,
                speed,
            },
        );
        id
    }

    pub fn queue_ability(&mut self, player_id: PlayerId, ability: AbilityUse) {
        self.pending.push((player_id, ability));
    }

    pub fn pending_abilities(&self) -> usize {
        self.pending.len()
    }

    pub fn take_pending_abilities(&mut self) -> Vec<(PlayerId, AbilityUse)> {
        std::mem::take(&mut self.pending)
    }

    pub fn mark_dirty(&mut self, player_id: PlayerId) {
        self.dirty.insert(player_id);
    }

    pub fn take_dirty(&mut self) -> BTreeSet<PlayerId> {
        std::mem::take(&mut self.dirty)
    }

    /// Uniform point inside the arena, `spawn_margin` away from the walls
    pub fn random_spawn_position(&mut self, config: &SimulationConfig) -> Vec2 {
        let x = self.range_or_center(config.spawn_margin, config.arena_width - config.spawn_margin);
        let y = self.range_or_center(config.spawn_margin, config.arena_height - config.spawn_margin);
        Vec2::new(x, y)
    }

    /// Arena centre plus a per-axis jitter, clamped into the arena
    pub fn respawn_position(&mut self, config: &SimulationConfig) -> Vec2 {
        let center = config.arena_center();
        let jitter = config.respawn_jitter.max(0.0);
        let offset = Vec2::new(
            self.rng.gen_range(-jitter..=jitter),
            self.rng.gen_range(-jitter..=jitter),
        );
        (center + offset).clamp(config.arena_min(), config.arena_max())
    }

    fn range_or_center(&mut self, lo: f32, hi: f32) -> f32 {
        if lo < hi {
            self.rng.gen_range(lo..hi)
        } else {
            (lo + hi) * 0.5
        }
    }
}

impl Default for WorldState {
    fn default() -> Self {
        Self::new()
    }
}
