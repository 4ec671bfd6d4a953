//! Motion session state machine
//!
//! Groups raw motion samples into sessions. A session survives gaps in the
//! signal shorter than the range-derived cooldown, so one continuous presence
//! yields one notification opportunity.

use pirwatch_core::{Millis, SensorConfig};
use serde::Serialize;

/// Session lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    #[default]
    Idle,
    Active,
    Cooldown,
}

/// Result of one [`MotionSession::tick`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionEvent {
    #[default]
    None,
    Started,
    Continued,
    Ended,
}

/// The single motion session
#[derive(Debug, Clone, Default)]
pub struct MotionSession {
    pub phase: SessionPhase,
    pub start_time: Millis,
    pub last_motion_time: Millis,
    /// Set by the caller once a notification went out for this session
    pub notified: bool,
}

impl MotionSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_idle(&self) -> bool {
        self.phase == SessionPhase::Idle
    }

    /// Advance on one motion sample
    pub fn tick(&mut self, motion: bool, now: Millis, cfg: &SensorConfig) -> SessionEvent {
        if self.phase != SessionPhase::Idle && now < self.last_motion_time {
            tracing::debug!(
                "Clock went backward ({} < {}), ignoring motion sample",
                now,
                self.last_motion_time
            );
            return SessionEvent::None;
        }

        match self.phase {
            SessionPhase::Idle => {
                if motion {
                    self.phase = SessionPhase::Active;
                    self.start_time = now;
                    self.last_motion_time = now;
                    self.notified = false;
                    SessionEvent::Started
                } else {
                    SessionEvent::None
                }
            }
            SessionPhase::Active => {
                if motion {
                    self.last_motion_time = now;
                    SessionEvent::Continued
                } else {
                    self.phase = SessionPhase::Cooldown;
                    SessionEvent::None
                }
            }
            SessionPhase::Cooldown => {
                if motion {
                    self.phase = SessionPhase::Active;
                    self.last_motion_time = now;
                    SessionEvent::Continued
                } else if now - self.last_motion_time >= cfg.cooldown_ms() {
                    self.phase = SessionPhase::Idle;
                    SessionEvent::Ended
                } else {
                    SessionEvent::None
                }
            }
        }
    }

    /// Time since the current, or just-ended, session began
    pub fn duration_ms(&self, now: Millis) -> Millis {
        now.saturating_sub(self.start_time)
    }
}
