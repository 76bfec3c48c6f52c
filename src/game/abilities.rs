//! Ability cooldown timers
//!
//! Every ability is either READY (timer at zero) or COOLING (timer above zero).
//! A successful use is the only way into COOLING; the fixed tick `dt` is the
//! only way back out. Mobility carries a second, shorter timer for its active
//! window that decays in parallel with its cooldown.

use serde::{Deserialize, Serialize};

/// Remaining cooldown of a single ability (seconds)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Cooldown {
    remaining: f32,
}

impl Cooldown {
    #[inline]
    pub fn is_ready(&self) -> bool {
        self.remaining <= 0.0
    }

    #[inline]
    pub fn remaining(&self) -> f32 {
        self.remaining
    }

    /// Start the cooldown if the ability is ready. Returns whether the use
    /// was accepted.
    pub fn try_trigger(&mut self, duration: f32) -> bool {
        if !self.is_ready() {
            return false;
        }
        self.remaining = duration.max(0.0);
        true
    }

    /// Decay by `dt`, clamping at zero
    pub fn tick(&mut self, dt: f32) {
        self.remaining = (self.remaining - dt.max(0.0)).max(0.0);
    }
}

/// Dash state: an active window nested inside a longer cooldown
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Mobility {
    pub active: bool,
    active_remaining: f32,
    pub cooldown: Cooldown,
}

impl Mobility {
    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    #[inline]
    pub fn active_remaining(&self) -> f32 {
        self.active_remaining
    }

    /// Activate if the cooldown has elapsed. Refused while the cooldown is
    /// still running, even after the active window has closed.
    pub fn try_activate(&mut self, active_duration: f32, cooldown: f32) -> bool {
        if !self.cooldown.try_trigger(cooldown) {
            return false;
        }
        self.active = true;
        self.active_remaining = active_duration.max(0.0);
        true
    }

    /// Decay both timers. Returns true when the active flag switched off on
    /// this call.
    pub fn tick(&mut self, dt: f32) -> bool {
        self.cooldown.tick(dt);
        self.active_remaining = (self.active_remaining - dt.max(0.0)).max(0.0);
        if self.active && self.active_remaining <= 0.0 {
            self.active = false;
            return true;
        }
        false
    }

    /// Drop the active window without touching the cooldown
    pub fn cancel(&mut self) {
        self.active = false;
        self.active_remaining = 0.0;
    }
}

/// Per-player ability timers
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AbilityTimers {
    pub primary: Cooldown,
    pub secondary: Cooldown,
    pub mobility: Mobility,
}

impl AbilityTimers {
    /// Decay every timer by `dt`. Returns true when the mobility active flag
    /// cleared, which changes the player's broadcast record.
    pub fn tick(&mut self, dt: f32) -> bool {
        self.primary.tick(dt);
        self.secondary.tick(dt);
        self.mobility.tick(dt)
    }
}
