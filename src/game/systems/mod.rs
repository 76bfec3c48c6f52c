pub mod combat;
pub mod cooldowns;
pub mod lifecycle;
pub mod movement;
pub mod projectile;
