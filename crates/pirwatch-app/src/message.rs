//! Message types for the node (TEA pattern)

use chrono::NaiveDateTime;
use pirwatch_core::Millis;

/// Inputs sampled from the collaborators at the start of a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickInput {
    pub now: Millis,
    pub motion: bool,
    pub button: bool,
    pub transport_available: bool,
    /// None until wall time is synchronized
    pub wall_time: Option<NaiveDateTime>,
}

impl TickInput {
    pub fn at(now: Millis) -> Self {
        Self {
            now,
            ..Self::default()
        }
    }

    pub fn with_motion(mut self, motion: bool) -> Self {
        self.motion = motion;
        self
    }

    pub fn with_button(mut self, pressed: bool) -> Self {
        self.button = pressed;
        self
    }

    pub fn with_transport(mut self, available: bool) -> Self {
        self.transport_available = available;
        self
    }

    pub fn with_wall_time(mut self, wall_time: Option<NaiveDateTime>) -> Self {
        self.wall_time = wall_time;
        self
    }
}

/// All messages processed by `update()`
#[derive(Debug, Clone)]
pub enum Message {
    /// One cooperative scheduler step
    Tick(TickInput),

    /// Raw remote command text
    RemoteCommand(String),

    // ─────────────────────────────────────────────────────────
    // Collaborator results
    // ─────────────────────────────────────────────────────────
    /// Sensor settings could not be written
    PersistFailed { error: String },

    /// Transport rejected an outbound message
    SendFailed { error: String },

    /// Stop the node
    Quit,
}
