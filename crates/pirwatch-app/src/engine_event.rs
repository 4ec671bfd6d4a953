//! Domain events emitted by the Engine after each processing cycle
//!
//! Derived by comparing state snapshots before and after a message, so the
//! handlers stay free of event plumbing.

use serde::Serialize;

use crate::config_mode::ConfigStep;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EngineEvent {
    /// Motion sensor warm-up finished
    Stabilized,

    /// A new motion session began
    SessionStarted { session: u64, notified: bool },

    /// The motion session ended after its cooldown
    SessionEnded { duration_ms: u64 },

    ConfigEntered,

    ConfigStepChanged { step: ConfigStep },

    ConfigExited,

    /// Live sensor levels changed
    SensorChanged { sensitivity: u8, range: u8 },

    /// The node stopped processing ticks
    Stopped,
}
