//! Gameplay tuning constants
//!
//! These are the defaults behind [`crate::config::SimulationConfig`]; the
//! simulation itself only ever reads the config.

/// Tick timing
pub mod tick {
    /// Server tick rate in Hz
    pub const TICK_RATE: u32 = 30;
    /// Delta time per tick in seconds
    pub const DT: f32 = 1.0 / TICK_RATE as f32;
    /// Ticks between periodic status log lines
    pub const STATUS_LOG_INTERVAL: u64 = TICK_RATE as u64 * 30;
}

/// Arena dimensions (world units, origin at the top-left corner)
pub mod arena {
    /// Arena width
    pub const WIDTH: f32 = 1600.0;
    /// Arena height
    pub const HEIGHT: f32 = 900.0;
    /// Margin kept from the walls when picking a join spawn point
    pub const SPAWN_MARGIN: f32 = 50.0;
    /// Max offset from the arena centre for a respawn point, per axis
    pub const RESPAWN_JITTER: f32 = 120.0;
}

/// Player body and movement
pub mod player {
    /// Collision radius
    pub const RADIUS: f32 = 20.0;
    /// Maximum (and starting) health
    pub const MAX_HP: i32 = 100;
    /// Base movement speed (units/second per active axis)
    pub const SPEED: f32 = 220.0;
    /// Number of entries in the client colour palette
    pub const PALETTE_SIZE: u8 = 12;
}

/// Primary attack (projectile)
pub mod primary {
    /// Seconds between shots
    pub const COOLDOWN: f32 = 0.35;
    /// Damage applied on hit
    pub const DAMAGE: i32 = 10;
    /// Projectile speed (units/second)
    pub const PROJECTILE_SPEED: f32 = 650.0;
    /// Projectile collision radius
    pub const PROJECTILE_RADIUS: f32 = 5.0;
}

/// Secondary attack (melee swing)
pub mod melee {
    use std::f32::consts::FRAC_PI_2;

    /// Seconds between swings
    pub const COOLDOWN: f32 = 0.8;
    /// Damage applied to every target in the arc
    pub const DAMAGE: i32 = 25;
    /// Reach beyond the attacker's own radius
    pub const RANGE: f32 = 45.0;
    /// Full width of the swing arc in radians
    pub const ARC: f32 = FRAC_PI_2;
}

/// Mobility (dash)
pub mod mobility {
    /// Seconds the speed boost stays active
    pub const ACTIVE_DURATION: f32 = 0.2;
    /// Seconds before the dash can be used again
    pub const COOLDOWN: f32 = 2.0;
    /// Speed multiplier while active
    pub const SPEED_MULTIPLIER: f32 = 3.5;
}

/// Network limits
pub mod net {
    /// Maximum inbound client message size (bytes)
    pub const MAX_MESSAGE_SIZE: usize = 65536;
    /// Default maximum outbound broadcast frame size (bytes)
    pub const MAX_BROADCAST_SIZE: usize = 4 * 1024 * 1024;
    /// Default capacity of the outbound broadcast channel (frames)
    pub const BROADCAST_CAPACITY: usize = 64;
}
