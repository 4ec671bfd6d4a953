//! Headless mode - NDJSON event output with simulated hardware
//!
//! The node runs against simulated collaborators: the motion sensor, the
//! button and the network are driven from stdin, while transport sends,
//! indicator patterns and node events are written to stdout as structured
//! JSON.
//!
//! # Event Format
//!
//! Events are output as NDJSON (newline-delimited JSON), one event per line.
//! Each event has an "event" field indicating its type, along with
//! event-specific data.
//!
//! # Example Output
//!
//! ```json
//! {"event":"node_started","device":"PIR-Motion-Node","sensitivity":2,"range":1,"timestamp":1704700001000}
//! {"event":"indicator","pattern":"motion","count":5,"period_ms":50,"timestamp":1704700031200}
//! {"event":"message_sent","text":"🕐 08:15:02\n🚨 Motion detected","timestamp":1704700031200}
//! ```

pub mod hardware;
pub mod runner;

use chrono::Utc;
use serde::Serialize;
use std::io::{self, Write};
use tracing::error;

use pirwatch_app::config_mode::ConfigStep;
use pirwatch_app::{EngineEvent, IndicatorPattern};

/// Events emitted in headless mode
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum HeadlessEvent {
    /// Node booted with the persisted sensor levels
    NodeStarted {
        device: String,
        sensitivity: u8,
        range: u8,
        timestamp: i64,
    },

    /// Text handed to the notification transport
    MessageSent { text: String, timestamp: i64 },

    /// Feedback pattern shown on the indicator
    Indicator {
        pattern: IndicatorPattern,
        count: u32,
        period_ms: u64,
        timestamp: i64,
    },

    Stabilized { timestamp: i64 },

    SessionStarted {
        session: u64,
        notified: bool,
        timestamp: i64,
    },

    SessionEnded { duration_ms: u64, timestamp: i64 },

    ConfigEntered { timestamp: i64 },

    ConfigStep { step: ConfigStep, timestamp: i64 },

    ConfigExited { timestamp: i64 },

    SensorChanged {
        sensitivity: u8,
        range: u8,
        timestamp: i64,
    },

    /// Watchdog was fed later than its timeout
    WatchdogLate { gap_ms: u64, timestamp: i64 },

    /// Error occurred
    Error {
        message: String,
        fatal: bool,
        timestamp: i64,
    },

    NodeStopped { timestamp: i64 },
}

impl HeadlessEvent {
    /// Emit this event to stdout as JSON
    pub fn emit(&self) {
        let json = match serde_json::to_string(self) {
            Ok(json) => json,
            Err(e) => {
                error!("Failed to serialize headless event: {}", e);
                return;
            }
        };

        let mut stdout = io::stdout().lock();
        if let Err(e) = writeln!(stdout, "{}", json) {
            error!("Failed to write headless event to stdout: {}", e);
            return;
        }

        // Flush so a driving script sees each event immediately
        if let Err(e) = stdout.flush() {
            error!("Failed to flush headless stdout: {}", e);
        }
    }

    /// Get current timestamp in milliseconds
    fn now() -> i64 {
        Utc::now().timestamp_millis()
    }

    // ─────────────────────────────────────────────────────────
    // Convenience constructors
    // ─────────────────────────────────────────────────────────

    pub fn node_started(device: &str, sensitivity: u8, range: u8) -> Self {
        Self::NodeStarted {
            device: device.to_string(),
            sensitivity,
            range,
            timestamp: Self::now(),
        }
    }

    pub fn message_sent(text: &str) -> Self {
        Self::MessageSent {
            text: text.to_string(),
            timestamp: Self::now(),
        }
    }

    pub fn indicator(pattern: IndicatorPattern, count: u32) -> Self {
        Self::Indicator {
            pattern,
            count,
            period_ms: pattern.period_ms(),
            timestamp: Self::now(),
        }
    }

    pub fn watchdog_late(gap_ms: u64) -> Self {
        Self::WatchdogLate {
            gap_ms,
            timestamp: Self::now(),
        }
    }

    pub fn error(message: impl Into<String>, fatal: bool) -> Self {
        Self::Error {
            message: message.into(),
            fatal,
            timestamp: Self::now(),
        }
    }

    /// Map a domain event from the engine onto the output stream
    pub fn from_engine(event: EngineEvent) -> Self {
        let timestamp = Self::now();
        match event {
            EngineEvent::Stabilized => Self::Stabilized { timestamp },
            EngineEvent::SessionStarted { session, notified } => Self::SessionStarted {
                session,
                notified,
                timestamp,
            },
            EngineEvent::SessionEnded { duration_ms } => Self::SessionEnded {
                duration_ms,
                timestamp,
            },
            EngineEvent::ConfigEntered => Self::ConfigEntered { timestamp },
            EngineEvent::ConfigStepChanged { step } => Self::ConfigStep { step, timestamp },
            EngineEvent::ConfigExited => Self::ConfigExited { timestamp },
            EngineEvent::SensorChanged { sensitivity, range } => Self::SensorChanged {
                sensitivity,
                range,
                timestamp,
            },
            EngineEvent::Stopped => Self::NodeStopped { timestamp },
        }
    }
}
