//! Main update function - handles state transitions (TEA pattern)

use crate::message::Message;
use crate::state::{NodePhase, NodeState};
use pirwatch_core::prelude::*;

use super::{command, tick, UpdateAction, UpdateResult};

/// Process a message and update state
/// Returns optional follow-up message and the actions to perform
pub fn update(state: &mut NodeState, message: Message) -> UpdateResult {
    match message {
        Message::Tick(input) => {
            if state.should_quit() {
                return UpdateResult::none();
            }
            tick::handle_tick(state, input)
        }

        Message::RemoteCommand(text) => command::handle_remote_command(state, &text),

        // ─────────────────────────────────────────────────────────
        // Collaborator results
        // ─────────────────────────────────────────────────────────
        Message::PersistFailed { error } => {
            state.stats.persistence_failures += 1;
            state.unsaved_changes = true;
            warn!(
                "Sensor settings not saved ({} failures), will retry on next exit: {}",
                state.stats.persistence_failures, error
            );
            UpdateResult::none()
        }

        Message::SendFailed { error } => {
            state.stats.send_failures += 1;
            warn!(
                "Outbound message failed ({} failures): {}",
                state.stats.send_failures, error
            );
            UpdateResult::none()
        }

        Message::Quit => {
            if state.should_quit() {
                return UpdateResult::none();
            }
            state.phase = NodePhase::Quitting;
            if state.unsaved_changes || state.config.active {
                info!("Flushing sensor settings before shutdown");
                state.config.exit();
                state.unsaved_changes = false;
                return UpdateResult::action(UpdateAction::Persist(state.sensor));
            }
            UpdateResult::none()
        }
    }
}
