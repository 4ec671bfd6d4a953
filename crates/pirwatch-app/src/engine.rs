//! Engine - drives the TEA loop against the collaborators
//!
//! The Engine owns the node state and boxed collaborators. Each tick it
//! samples the clock and inputs into a `Message::Tick`, runs `update()`,
//! executes the returned actions in order and feeds the watchdog.

use std::collections::VecDeque;

use pirwatch_core::prelude::*;
use pirwatch_core::SensorConfig;

use crate::config::Settings;
use crate::config_mode::ConfigStep;
use crate::engine_event::EngineEvent;
use crate::handler::{self, UpdateAction};
use crate::message::{Message, TickInput};
use crate::services::{
    Clock, IndicatorSink, NotificationTransport, PersistenceStore, RawInput, WallClock, Watchdog,
};
use crate::state::{NodePhase, NodeState};

/// The external collaborators the core is driven against
pub struct Collaborators {
    pub clock: Box<dyn Clock>,
    pub wall_clock: Box<dyn WallClock>,
    pub input: Box<dyn RawInput>,
    pub transport: Box<dyn NotificationTransport>,
    pub indicator: Box<dyn IndicatorSink>,
    pub watchdog: Box<dyn Watchdog>,
    pub store: Box<dyn PersistenceStore>,
}

/// Lightweight snapshot of state for change detection.
#[derive(Debug, Clone, PartialEq)]
struct StateSnapshot {
    phase: NodePhase,
    session_idle: bool,
    total_sessions: u64,
    config_active: bool,
    step: ConfigStep,
    sensor: SensorConfig,
}

impl StateSnapshot {
    fn capture(state: &NodeState) -> Self {
        Self {
            phase: state.phase,
            session_idle: state.session.is_idle(),
            total_sessions: state.stats.total_sessions,
            config_active: state.config.active,
            step: state.config.step,
            sensor: state.sensor,
        }
    }
}

/// Orchestration engine for a pirwatch node.
pub struct Engine {
    /// TEA node state (the Model)
    pub state: NodeState,
    collaborators: Collaborators,
    events: Vec<EngineEvent>,
}

impl Engine {
    /// Create an engine, loading the persisted sensor levels
    pub fn new(settings: Settings, collaborators: Collaborators) -> Self {
        let sensor = collaborators.store.load();
        info!(
            "Node starting: {} @ {} (sensitivity {}, range {})",
            settings.device.name, settings.device.location, sensor.sensitivity, sensor.range
        );
        Self {
            state: NodeState::new(settings, sensor),
            collaborators,
            events: Vec::new(),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.state.settings
    }

    pub fn should_quit(&self) -> bool {
        self.state.should_quit()
    }

    /// Run one cooperative scheduler step
    pub fn tick(&mut self) {
        let input = self.sample();
        self.process_message(Message::Tick(input));
        self.collaborators.watchdog.feed();
    }

    /// Dispatch a remote command through the same update path
    pub fn handle_command(&mut self, text: &str) {
        self.process_message(Message::RemoteCommand(text.to_string()));
    }

    /// Flush unsaved settings and stop
    pub fn shutdown(&mut self) {
        self.process_message(Message::Quit);
    }

    /// Drain the events produced since the last call
    pub fn take_events(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.events)
    }

    /// Process a single message through the TEA update cycle, including any
    /// follow-up messages produced by the update or by failed actions.
    pub fn process_message(&mut self, msg: Message) {
        let pre = StateSnapshot::capture(&self.state);

        let mut queue = VecDeque::from([msg]);
        while let Some(msg) = queue.pop_front() {
            let result = handler::update(&mut self.state, msg);
            for action in result.actions {
                if let Some(follow_up) = self.dispatch(action) {
                    queue.push_back(follow_up);
                }
            }
            if let Some(follow_up) = result.message {
                queue.push_back(follow_up);
            }
        }

        let post = StateSnapshot::capture(&self.state);
        if pre != post {
            self.emit_events(&pre, &post);
        }
    }

    fn sample(&mut self) -> TickInput {
        TickInput {
            now: self.collaborators.clock.now_ms(),
            motion: self.collaborators.input.motion_state(),
            button: self.collaborators.input.button_pressed(),
            transport_available: self.collaborators.transport.is_available(),
            wall_time: self.collaborators.wall_clock.local_time(),
        }
    }

    /// Execute one action, returning a follow-up message on failure
    fn dispatch(&mut self, action: UpdateAction) -> Option<Message> {
        match action {
            UpdateAction::Persist(config) => match self.collaborators.store.save(&config) {
                Ok(()) => None,
                Err(e) => {
                    error!("Failed to persist sensor settings: {}", e);
                    Some(Message::PersistFailed {
                        error: e.to_string(),
                    })
                }
            },
            UpdateAction::Notify(text) => self.send("motion alert", &text),
            UpdateAction::Announce(text) => self.send("announcement", &text),
            UpdateAction::Reply(text) => self.send("reply", &text),
            UpdateAction::ShowPattern { pattern, count } => {
                self.collaborators.indicator.show_pattern(pattern, count);
                None
            }
        }
    }

    fn send(&mut self, kind: &str, text: &str) -> Option<Message> {
        if !self.collaborators.transport.is_available() {
            debug!("Transport unavailable, dropping {}", kind);
            return None;
        }
        match self.collaborators.transport.send(text) {
            Ok(()) => {
                debug!("Sent {}", kind);
                None
            }
            Err(e) => Some(Message::SendFailed {
                error: format!("{}: {}", kind, e),
            }),
        }
    }

    fn emit_events(&mut self, pre: &StateSnapshot, post: &StateSnapshot) {
        if pre.phase == NodePhase::Stabilizing && post.phase != NodePhase::Stabilizing {
            if post.phase == NodePhase::Quitting {
                self.events.push(EngineEvent::Stopped);
            } else {
                self.events.push(EngineEvent::Stabilized);
            }
        } else if pre.phase != NodePhase::Quitting && post.phase == NodePhase::Quitting {
            self.events.push(EngineEvent::Stopped);
        }

        if post.total_sessions > pre.total_sessions {
            self.events.push(EngineEvent::SessionStarted {
                session: post.total_sessions,
                notified: self.state.session.notified,
            });
        } else if !pre.session_idle && post.session_idle {
            self.events.push(EngineEvent::SessionEnded {
                duration_ms: self.state.session.duration_ms(self.state.now),
            });
        }

        match (pre.config_active, post.config_active) {
            (false, true) => {
                self.events.push(EngineEvent::ConfigEntered);
                if post.step != ConfigStep::Sensitivity {
                    self.events
                        .push(EngineEvent::ConfigStepChanged { step: post.step });
                }
            }
            (true, false) => self.events.push(EngineEvent::ConfigExited),
            (true, true) if pre.step != post.step => {
                self.events
                    .push(EngineEvent::ConfigStepChanged { step: post.step })
            }
            _ => {}
        }

        if pre.sensor != post.sensor {
            self.events.push(EngineEvent::SensorChanged {
                sensitivity: post.sensor.sensitivity.level(),
                range: post.sensor.range.level(),
            });
        }
    }
}
