//! Sensor configuration interaction state
//!
//! Holds the config-mode session and the live detection trial. The
//! transitions and their side effects live in `handler::config_mode`.

use pirwatch_core::{Millis, SensorConfig};
use serde::Serialize;

/// Config-mode step, cycled Sensitivity -> Range -> Test -> Save
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigStep {
    #[default]
    Sensitivity,
    Range,
    Test,
    Save,
}

impl ConfigStep {
    pub fn next(self) -> Self {
        match self {
            ConfigStep::Sensitivity => ConfigStep::Range,
            ConfigStep::Range => ConfigStep::Test,
            ConfigStep::Test => ConfigStep::Save,
            ConfigStep::Save => ConfigStep::Sensitivity,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ConfigStep::Sensitivity => "Sensitivity",
            ConfigStep::Range => "Range",
            ConfigStep::Test => "Test",
            ConfigStep::Save => "Save",
        }
    }
}

/// Why config mode ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigExitReason {
    Saved,
    Timeout,
}

/// Bounded live-detection trial, advanced once per tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestTrial {
    pub started_at: Millis,
    pub detections: u32,
    last_detection: Option<Millis>,
    last_motion: bool,
}

impl TestTrial {
    pub fn start(now: Millis) -> Self {
        Self {
            started_at: now,
            detections: 0,
            last_detection: None,
            last_motion: false,
        }
    }

    /// Count a rising motion edge if it is at least the live debounce delay
    /// after the previous counted one
    pub fn observe(&mut self, motion: bool, now: Millis, cfg: &SensorConfig) {
        let rising = motion && !self.last_motion;
        self.last_motion = motion;
        if !rising {
            return;
        }
        let spaced = match self.last_detection {
            Some(last) => now.saturating_sub(last) >= cfg.debounce_delay_ms(),
            None => true,
        };
        if spaced {
            self.detections += 1;
            self.last_detection = Some(now);
        }
    }

    pub fn elapsed_ms(&self, now: Millis) -> Millis {
        now.saturating_sub(self.started_at)
    }

    pub fn is_complete(&self, now: Millis, duration_ms: Millis) -> bool {
        self.elapsed_ms(now) >= duration_ms
    }
}

/// The interactive config-mode session
#[derive(Debug, Clone, Default)]
pub struct ConfigInteraction {
    pub active: bool,
    pub step: ConfigStep,
    pub start_time: Millis,
    /// Refreshed by presses, remote adjustments and trial completion
    pub last_interaction: Millis,
    pub trial: Option<TestTrial>,
}

impl ConfigInteraction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enter(&mut self, now: Millis) {
        self.active = true;
        self.step = ConfigStep::Sensitivity;
        self.start_time = now;
        self.last_interaction = now;
        self.trial = None;
    }

    /// Move to the next step and return it
    pub fn advance(&mut self, now: Millis) -> ConfigStep {
        self.step = self.step.next();
        self.touch(now);
        self.step
    }

    pub fn touch(&mut self, now: Millis) {
        self.last_interaction = now;
    }

    pub fn start_trial(&mut self, now: Millis) {
        self.step = ConfigStep::Test;
        self.trial = Some(TestTrial::start(now));
        self.touch(now);
    }

    /// End the running trial, returning its detection count
    pub fn finish_trial(&mut self, now: Millis) -> Option<u32> {
        let trial = self.trial.take()?;
        self.touch(now);
        Some(trial.detections)
    }

    pub fn is_testing(&self) -> bool {
        self.trial.is_some()
    }

    /// Inactivity timeout, never while a trial runs
    pub fn timed_out(&self, now: Millis, timeout_ms: Millis) -> bool {
        self.active && !self.is_testing() && now.saturating_sub(self.last_interaction) > timeout_ms
    }

    pub fn exit(&mut self) {
        self.active = false;
        self.step = ConfigStep::Sensitivity;
        self.trial = None;
    }
}
