//! Notification rate gate
//!
//! [`evaluate`] is a pure predicate over the session, the gate bookkeeping and
//! the environment. Callers record a notification with
//! [`NotificationGateState::record`] after a positive verdict.

use chrono::NaiveDate;
use pirwatch_core::{Millis, SensorConfig};
use serde::Serialize;

use crate::config::NotificationSettings;
use crate::motion::MotionSession;

/// Configured limits of the gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GatePolicy {
    /// Configured floor between notifications
    pub min_interval_ms: Millis,
    /// 0 disables the cap
    pub daily_limit: u32,
}

impl GatePolicy {
    pub fn from_settings(settings: &NotificationSettings) -> Self {
        Self {
            min_interval_ms: settings.min_interval_ms,
            daily_limit: settings.daily_limit,
        }
    }

    /// Effective spacing: the configured floor or the sensitivity-derived delay
    pub fn required_spacing_ms(&self, cfg: &SensorConfig) -> Millis {
        self.min_interval_ms.max(cfg.debounce_delay_ms())
    }
}

impl Default for GatePolicy {
    fn default() -> Self {
        Self::from_settings(&NotificationSettings::default())
    }
}

/// Rate-limit bookkeeping
#[derive(Debug, Clone, Default)]
pub struct NotificationGateState {
    /// None means no notification yet
    pub last_notification_time: Option<Millis>,
    pub daily_count: u32,
    pub daily_reset_day: Option<NaiveDate>,
}

impl NotificationGateState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, now: Millis) {
        self.last_notification_time = Some(now);
        self.daily_count += 1;
    }

    /// Observe the current calendar day.
    ///
    /// Returns true when the day changed and the count was reset. The first
    /// observed day only seeds the tracker.
    pub fn roll_day(&mut self, day: NaiveDate) -> bool {
        match self.daily_reset_day {
            Some(current) if current == day => false,
            Some(_) => {
                self.daily_reset_day = Some(day);
                self.daily_count = 0;
                true
            }
            None => {
                self.daily_reset_day = Some(day);
                false
            }
        }
    }

    pub fn reset_daily_count(&mut self) {
        self.daily_count = 0;
    }
}

/// Outcome of the gate, naming the first failing check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GateVerdict {
    Allow,
    AlreadyNotified,
    TooSoon,
    DailyLimit,
    QuietHours,
    TransportUnavailable,
}

impl GateVerdict {
    pub fn is_allowed(self) -> bool {
        self == GateVerdict::Allow
    }
}

/// Run the ordered gate checks
pub fn evaluate(
    session: &MotionSession,
    gate: &NotificationGateState,
    cfg: &SensorConfig,
    policy: &GatePolicy,
    now: Millis,
    quiet_hours: bool,
    transport_available: bool,
) -> GateVerdict {
    if session.notified {
        return GateVerdict::AlreadyNotified;
    }
    if let Some(last) = gate.last_notification_time {
        if now.saturating_sub(last) < policy.required_spacing_ms(cfg) {
            return GateVerdict::TooSoon;
        }
    }
    if policy.daily_limit > 0 && gate.daily_count >= policy.daily_limit {
        return GateVerdict::DailyLimit;
    }
    if quiet_hours {
        return GateVerdict::QuietHours;
    }
    if !transport_available {
        return GateVerdict::TransportUnavailable;
    }
    GateVerdict::Allow
}

/// Boolean form of [`evaluate`]
pub fn should_notify(
    session: &MotionSession,
    gate: &NotificationGateState,
    cfg: &SensorConfig,
    policy: &GatePolicy,
    now: Millis,
    quiet_hours: bool,
    transport_available: bool,
) -> bool {
    evaluate(session, gate, cfg, policy, now, quiet_hours, transport_available).is_allowed()
}
