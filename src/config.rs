use std::f32::consts::TAU;
use std::net::{IpAddr, Ipv4Addr};
use std::str::FromStr;

use crate::game::constants::{arena, melee, mobility, net, player, primary, tick};
use crate::util::vec2::Vec2;

/// Configuration errors reported by [`ServerConfig::validate`]
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("tick_rate must be 1-240, got {0}")]
    TickRate(u32),
    #[error("broadcast_capacity must be at least 1")]
    BroadcastCapacity,
    #[error("max_frame_size must be at least {min} bytes, got {got}")]
    FrameSize { got: usize, min: usize },
    #[error("arena must have a positive size, got {0}x{1}")]
    ArenaSize(f32, f32),
    #[error("{0} must be positive and finite")]
    NonPositive(&'static str),
    #[error("{0} must be finite and not negative")]
    Negative(&'static str),
    #[error("melee arc must be within (0, 2*PI], got {0}")]
    MeleeArc(f32),
    #[error("mobility cooldown ({cooldown}) is shorter than its active duration ({active})")]
    MobilityWindow { active: f32, cooldown: f32 },
}

/// Gameplay tuning read by every simulation system
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    /// Arena width (world units)
    pub arena_width: f32,
    /// Arena height (world units)
    pub arena_height: f32,
    /// Margin kept from the walls for join spawn points
    pub spawn_margin: f32,
    /// Max per-axis offset from the arena centre for respawn points
    pub respawn_jitter: f32,
    /// Player collision radius
    pub player_radius: f32,
    /// Maximum health
    pub max_hp: i32,
    /// Base movement speed
    pub player_speed: f32,
    pub primary_cooldown: f32,
    pub primary_damage: i32,
    pub projectile_speed: f32,
    pub projectile_radius: f32,
    pub melee_cooldown: f32,
    pub melee_damage: i32,
    /// Reach beyond the attacker's radius
    pub melee_range: f32,
    /// Full swing arc in radians
    pub melee_arc: f32,
    pub mobility_duration: f32,
    pub mobility_cooldown: f32,
    /// Speed multiplier while mobility is active
    pub mobility_multiplier: f32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            arena_width: arena::WIDTH,
            arena_height: arena::HEIGHT,
            spawn_margin: arena::SPAWN_MARGIN,
            respawn_jitter: arena::RESPAWN_JITTER,
            player_radius: player::RADIUS,
            max_hp: player::MAX_HP,
            player_speed: player::SPEED,
            primary_cooldown: primary::COOLDOWN,
            primary_damage: primary::DAMAGE,
            projectile_speed: primary::PROJECTILE_SPEED,
            projectile_radius: primary::PROJECTILE_RADIUS,
            melee_cooldown: melee::COOLDOWN,
            melee_damage: melee::DAMAGE,
            melee_range: melee::RANGE,
            melee_arc: melee::ARC,
            mobility_duration: mobility::ACTIVE_DURATION,
            mobility_cooldown: mobility::COOLDOWN,
            mobility_multiplier: mobility::SPEED_MULTIPLIER,
        }
    }
}

impl SimulationConfig {
    /// Top-left corner of the arena
    pub fn arena_min(&self) -> Vec2 {
        Vec2::ZERO
    }

    /// Bottom-right corner of the arena
    pub fn arena_max(&self) -> Vec2 {
        Vec2::new(self.arena_width, self.arena_height)
    }

    pub fn arena_center(&self) -> Vec2 {
        Vec2::new(self.arena_width * 0.5, self.arena_height * 0.5)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let sized = |v: f32| v > 0.0 && v.is_finite();
        if !(sized(self.arena_width) && sized(self.arena_height)) {
            return Err(ConfigError::ArenaSize(self.arena_width, self.arena_height));
        }
        let positives = [
            ("player_radius", self.player_radius),
            ("player_speed", self.player_speed),
            ("projectile_speed", self.projectile_speed),
            ("projectile_radius", self.projectile_radius),
            ("melee_range", self.melee_range),
            ("mobility_duration", self.mobility_duration),
            ("mobility_multiplier", self.mobility_multiplier),
        ];
        for (name, value) in positives {
            if !sized(value) {
                return Err(ConfigError::NonPositive(name));
            }
        }
        let non_negatives = [
            ("spawn_margin", self.spawn_margin),
            ("respawn_jitter", self.respawn_jitter),
            ("primary_cooldown", self.primary_cooldown),
            ("melee_cooldown", self.melee_cooldown),
            ("mobility_cooldown", self.mobility_cooldown),
        ];
        for (name, value) in non_negatives {
            if !(value >= 0.0 && value.is_finite()) {
                return Err(ConfigError::Negative(name));
            }
        }
        if self.max_hp <= 0 {
            return Err(ConfigError::NonPositive("max_hp"));
        }
        if !(self.melee_arc > 0.0 && self.melee_arc <= TAU) {
            return Err(ConfigError::MeleeArc(self.melee_arc));
        }
        if self.mobility_cooldown < self.mobility_duration {
            return Err(ConfigError::MobilityWindow {
                active: self.mobility_duration,
                cooldown: self.mobility_cooldown,
            });
        }
        Ok(())
    }
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the metrics endpoint binds to
    pub bind_address: IpAddr,
    /// Port of the metrics endpoint
    pub metrics_port: u16,
    /// Simulation ticks per second
    pub tick_rate: u32,
    /// Frames buffered per subscriber before it starts lagging
    pub broadcast_capacity: usize,
    /// Largest outbound delta frame (bytes)
    pub max_frame_size: usize,
    /// Fixed RNG seed for reproducible spawns (random when unset)
    pub rng_seed: Option<u64>,
    pub simulation: SimulationConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)),
            metrics_port: 9090,
            tick_rate: tick::TICK_RATE,
            broadcast_capacity: net::BROADCAST_CAPACITY,
            max_frame_size: net::MAX_BROADCAST_SIZE,
            rng_seed: None,
            simulation: SimulationConfig::default(),
        }
    }
}

/// Read and parse an env var, warning and returning `None` on a bad value
fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.parse() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            tracing::warn!("Invalid {} '{}', using default", key, raw);
            None
        }
    }
}

impl ServerConfig {
    /// Load config from environment or use defaults
    pub fn load_or_default() -> Self {
        let mut config = Self::default();

        if let Some(addr) = env_parse::<IpAddr>("BIND_ADDRESS") {
            config.bind_address = addr;
        }

        if let Some(port) = env_parse::<u16>("METRICS_PORT") {
            if port > 0 {
                config.metrics_port = port;
            } else {
                tracing::warn!("METRICS_PORT must be > 0, using default");
            }
        }

        if let Some(rate) = env_parse::<u32>("TICK_RATE") {
            if (1..=240).contains(&rate) {
                config.tick_rate = rate;
            } else {
                tracing::warn!("TICK_RATE must be 1-240, using default");
            }
        }

        if let Some(capacity) = env_parse::<usize>("BROADCAST_CAPACITY") {
            if capacity > 0 {
                config.broadcast_capacity = capacity;
            } else {
                tracing::warn!("BROADCAST_CAPACITY must be > 0, using default");
            }
        }

        if let Some(size) = env_parse::<usize>("MAX_FRAME_SIZE") {
            if size >= net::MAX_MESSAGE_SIZE {
                config.max_frame_size = size;
            } else {
                tracing::warn!("MAX_FRAME_SIZE must be >= {}, using default", net::MAX_MESSAGE_SIZE);
            }
        }

        config.rng_seed = env_parse::<u64>("RNG_SEED");

        if let Some(width) = env_parse::<f32>("ARENA_WIDTH") {
            if width > 0.0 && width.is_finite() {
                config.simulation.arena_width = width;
            } else {
                tracing::warn!("ARENA_WIDTH must be finite and > 0, using default");
            }
        }

        if let Some(height) = env_parse::<f32>("ARENA_HEIGHT") {
            if height > 0.0 && height.is_finite() {
                config.simulation.arena_height = height;
            } else {
                tracing::warn!("ARENA_HEIGHT must be finite and > 0, using default");
            }
        }

        config
    }

    /// Fixed simulation step in seconds
    pub fn dt(&self) -> f32 {
        1.0 / self.tick_rate as f32
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=240).contains(&self.tick_rate) {
            return Err(ConfigError::TickRate(self.tick_rate));
        }
        if self.broadcast_capacity == 0 {
            return Err(ConfigError::BroadcastCapacity);
        }
        if self.max_frame_size < net::MAX_MESSAGE_SIZE {
            return Err(ConfigError::FrameSize {
                got: self.max_frame_size,
                min: net::MAX_MESSAGE_SIZE,
            });
        }
        self.simulation.validate()
    }
}
