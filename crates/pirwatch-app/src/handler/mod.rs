//! Handler module - TEA update function and event handlers
//!
//! Organized into submodules:
//! - `update`: Main update() function and message dispatch
//! - `tick`: Per-tick sampling, stabilization, daily reset and motion sessions
//! - `config_mode`: Sensor config interaction transitions
//! - `command`: Remote command handling and replies

pub(crate) mod command;
pub(crate) mod config_mode;
pub(crate) mod tick;
pub(crate) mod update;

#[cfg(test)]
mod tests;

use pirwatch_core::SensorConfig;

use crate::message::Message;
use crate::outbound;
use crate::services::IndicatorPattern;
use crate::state::NodeState;

// Re-export main entry point
pub use update::update;

/// Side effects the engine performs after update, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateAction {
    /// Write the sensor levels to durable storage
    Persist(SensorConfig),

    /// Send a motion alert (already passed the gate)
    Notify(String),

    /// Send an informational announcement
    Announce(String),

    /// Answer a remote command
    Reply(String),

    /// Request an indicator pattern
    ShowPattern {
        pattern: IndicatorPattern,
        count: u32,
    },
}

/// Result of processing a message
#[derive(Debug, Default)]
pub struct UpdateResult {
    /// Optional follow-up message to process
    pub message: Option<Message>,
    /// Actions for the engine to perform
    pub actions: Vec<UpdateAction>,
}

impl UpdateResult {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn action(action: UpdateAction) -> Self {
        Self {
            message: None,
            actions: vec![action],
        }
    }

    pub fn push(&mut self, action: UpdateAction) {
        self.actions.push(action);
    }

    pub fn show(&mut self, pattern: IndicatorPattern, count: u32) {
        self.push(UpdateAction::ShowPattern { pattern, count });
    }

    pub fn persist_count(&self) -> usize {
        self.actions
            .iter()
            .filter(|a| matches!(a, UpdateAction::Persist(_)))
            .count()
    }
}

/// Queue a decorated announcement if the transport is up
pub(crate) fn announce(state: &NodeState, text: &str, result: &mut UpdateResult) {
    if !state.transport_available {
        tracing::debug!("Transport unavailable, skipping announcement");
        return;
    }
    let text = outbound::decorate(text, &state.settings, state.wall_time, state.now);
    result.push(UpdateAction::Announce(text));
}
