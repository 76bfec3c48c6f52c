//! Arena Sync Server Library
//!
//! Authoritative simulation for a small top-down arena shooter. Clients send
//! movement intents, aim and ability requests; the server advances the world
//! on a fixed tick and broadcasts a delta of what changed.

pub mod config;
pub mod util;
pub mod game;
pub mod net;
pub mod metrics;
