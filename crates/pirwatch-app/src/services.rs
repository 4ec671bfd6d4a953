//! Collaborator interfaces the node core drives
//!
//! The core never touches hardware or the network directly. Each tick the
//! [`Engine`](crate::Engine) samples these traits and executes the actions
//! `update()` returns against them. Host implementations of the clocks live
//! here; the runner supplies simulated inputs, transport and indicator.

use std::time::Instant;

use chrono::NaiveDateTime;
use pirwatch_core::prelude::*;
use pirwatch_core::{Millis, SensorConfig};

/// Monotonic millisecond source
#[cfg_attr(test, mockall::automock)]
pub trait Clock {
    fn now_ms(&self) -> Millis;
}

/// Local wall-clock time, `None` until time has been synchronized
#[cfg_attr(test, mockall::automock)]
pub trait WallClock {
    fn local_time(&self) -> Option<NaiveDateTime>;
}

/// Raw digital inputs
#[cfg_attr(test, mockall::automock)]
pub trait RawInput {
    fn motion_state(&mut self) -> bool;
    fn button_pressed(&mut self) -> bool;
}

/// Outbound message delivery
///
/// Implementations apply their own bounded retry; the core calls `send` at
/// most once per qualifying event and never queues.
#[cfg_attr(test, mockall::automock)]
pub trait NotificationTransport {
    fn is_available(&self) -> bool;
    fn send(&mut self, text: &str) -> Result<()>;
}

/// Fire-and-forget visual feedback
#[cfg_attr(test, mockall::automock)]
pub trait IndicatorSink {
    fn show_pattern(&mut self, pattern: IndicatorPattern, count: u32);
}

/// External supervisory watchdog
#[cfg_attr(test, mockall::automock)]
pub trait Watchdog {
    fn feed(&mut self);
}

/// Durable storage for the sensor levels
#[cfg_attr(test, mockall::automock)]
pub trait PersistenceStore {
    /// Absent or corrupt storage loads as defaults
    fn load(&self) -> SensorConfig;
    fn save(&mut self, config: &SensorConfig) -> Result<()>;
}

/// Indicator feedback patterns
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorPattern {
    ConfigEnter,
    ConfigSensitivity,
    ConfigRange,
    ConfigTest,
    ConfigSave,
    ConfigExit,
    Motion,
    /// Blink count shows the new sensitivity level
    LevelFast,
    /// Blink count shows the new range level
    LevelSlow,
    Stabilized,
}

impl IndicatorPattern {
    /// Blink half-period in ms
    pub fn period_ms(self) -> Millis {
        match self {
            IndicatorPattern::ConfigEnter => 80,
            IndicatorPattern::ConfigSensitivity => 150,
            IndicatorPattern::ConfigRange => 300,
            IndicatorPattern::ConfigTest => 60,
            IndicatorPattern::ConfigSave => 400,
            IndicatorPattern::ConfigExit => 120,
            IndicatorPattern::Motion => 50,
            IndicatorPattern::LevelFast => 100,
            IndicatorPattern::LevelSlow => 500,
            IndicatorPattern::Stabilized => 100,
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Host implementations
// ─────────────────────────────────────────────────────────────────

/// `Clock` backed by `std::time::Instant`, zero at construction
#[derive(Debug, Clone)]
pub struct MonotonicClock {
    started: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> Millis {
        self.started.elapsed().as_millis() as Millis
    }
}

/// `WallClock` backed by the host's local time (always synchronized)
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemWallClock;

impl WallClock for SystemWallClock {
    fn local_time(&self) -> Option<NaiveDateTime> {
        Some(chrono::Local::now().naive_local())
    }
}
