//! Node state (Model in TEA pattern)

use chrono::NaiveDateTime;
use pirwatch_core::{Millis, SensorConfig};
use serde::Serialize;

use crate::button::{ButtonState, ButtonTiming};
use crate::config::Settings;
use crate::config_mode::ConfigInteraction;
use crate::gate::{GatePolicy, NotificationGateState};
use crate::motion::MotionSession;
use crate::quiet_hours::QuietHours;

/// Coarse lifecycle of the node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodePhase {
    /// Motion sensor warming up
    #[default]
    Stabilizing,
    Running,
    Quitting,
}

/// Which top-level mode consumes button events this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeMode {
    Normal,
    Config,
}

/// Counters reported by the `stats` command
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NodeStats {
    pub total_sessions: u64,
    pub total_notifications: u64,
    pub send_failures: u32,
    pub persistence_failures: u32,
    pub config_sessions: u32,
}

impl NodeStats {
    /// Clear the counters that reset with the day
    pub fn reset_failures(&mut self) {
        self.send_failures = 0;
        self.persistence_failures = 0;
    }
}

/// Complete node state
#[derive(Debug, Clone)]
pub struct NodeState {
    pub phase: NodePhase,
    pub settings: Settings,

    /// Live sensor levels, authoritative over the persisted copy
    pub sensor: SensorConfig,
    pub button: ButtonState,
    pub session: MotionSession,
    pub gate: NotificationGateState,
    pub config: ConfigInteraction,
    pub stats: NodeStats,

    /// Clock reading of the latest tick
    pub now: Millis,
    pub wall_time: Option<NaiveDateTime>,
    pub transport_available: bool,

    pub startup_announced: bool,
    /// In-memory levels differ from the last successful write
    pub unsaved_changes: bool,
}

impl NodeState {
    pub fn new(settings: Settings, sensor: SensorConfig) -> Self {
        Self {
            phase: NodePhase::Stabilizing,
            settings,
            sensor,
            button: ButtonState::new(),
            session: MotionSession::new(),
            gate: NotificationGateState::new(),
            config: ConfigInteraction::new(),
            stats: NodeStats::default(),
            now: 0,
            wall_time: None,
            transport_available: false,
            startup_announced: false,
            unsaved_changes: false,
        }
    }

    pub fn mode(&self) -> NodeMode {
        if self.config.active {
            NodeMode::Config
        } else {
            NodeMode::Normal
        }
    }

    pub fn is_stabilized(&self) -> bool {
        self.phase != NodePhase::Stabilizing
    }

    pub fn should_quit(&self) -> bool {
        self.phase == NodePhase::Quitting
    }

    pub fn button_timing(&self) -> ButtonTiming {
        ButtonTiming::from_settings(&self.settings.config_mode)
    }

    pub fn gate_policy(&self) -> GatePolicy {
        GatePolicy::from_settings(&self.settings.notifications)
    }

    pub fn quiet_hours(&self) -> QuietHours {
        QuietHours::from_settings(&self.settings.quiet_hours)
    }

    pub fn is_quiet(&self) -> bool {
        self.quiet_hours().is_quiet(self.wall_time)
    }
}

impl Default for NodeState {
    fn default() -> Self {
        Self::new(Settings::default(), SensorConfig::default())
    }
}
