//! Configuration types for the pirwatch node
//!
//! Defines `Settings` (the node's runtime configuration, `config.toml`) and
//! its sections. Every field has a documented default so an empty or missing
//! file yields a working node.

use pirwatch_core::prelude::*;
use pirwatch_core::Millis;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Node settings (config.toml)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub device: DeviceSettings,

    #[serde(default)]
    pub motion: MotionSettings,

    #[serde(default)]
    pub notifications: NotificationSettings,

    #[serde(default)]
    pub quiet_hours: QuietHoursSettings,

    #[serde(default)]
    pub config_mode: ConfigModeSettings,

    #[serde(default)]
    pub messages: MessageSettings,

    #[serde(default)]
    pub runtime: RuntimeSettings,

    #[serde(default)]
    pub storage: StorageSettings,
}

impl Settings {
    /// Validate cross-field constraints once at startup
    pub fn validate(&self) -> Result<()> {
        if self.notifications.min_interval_ms < MIN_NOTIFICATION_INTERVAL_MS {
            return Err(Error::config_invalid(format!(
                "notifications.min_interval_ms must be at least {}ms (got {})",
                MIN_NOTIFICATION_INTERVAL_MS, self.notifications.min_interval_ms
            )));
        }

        if self.quiet_hours.start_hour > 23 || self.quiet_hours.end_hour > 23 {
            return Err(Error::config_invalid(
                "quiet_hours.start_hour and end_hour must be between 0 and 23",
            ));
        }

        let cm = &self.config_mode;
        if cm.hold_ms == 0 {
            return Err(Error::config_invalid("config_mode.hold_ms must be positive"));
        }
        if cm.press_spacing_ms >= cm.hold_ms {
            return Err(Error::config_invalid(format!(
                "config_mode.press_spacing_ms ({}) must be shorter than hold_ms ({})",
                cm.press_spacing_ms, cm.hold_ms
            )));
        }
        if cm.test_duration_ms == 0 {
            return Err(Error::config_invalid(
                "config_mode.test_duration_ms must be positive",
            ));
        }
        if cm.timeout_ms <= cm.test_duration_ms {
            warn!(
                "config_mode.timeout_ms ({}) is not longer than a test trial ({})",
                cm.timeout_ms, cm.test_duration_ms
            );
        }

        let rt = &self.runtime;
        if rt.loop_delay_ms == 0 {
            return Err(Error::config_invalid("runtime.loop_delay_ms must be positive"));
        }
        if rt.loop_delay_ms >= rt.watchdog_timeout_ms {
            return Err(Error::config_invalid(format!(
                "runtime.loop_delay_ms ({}) must be shorter than watchdog_timeout_ms ({})",
                rt.loop_delay_ms, rt.watchdog_timeout_ms
            )));
        }

        Ok(())
    }
}

/// Lowest accepted notification floor
pub const MIN_NOTIFICATION_INTERVAL_MS: Millis = 1000;

/// Device identity used in announcements
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeviceSettings {
    #[serde(default = "default_device_name")]
    pub name: String,

    #[serde(default = "default_location")]
    pub location: String,
}

impl Default for DeviceSettings {
    fn default() -> Self {
        Self {
            name: default_device_name(),
            location: default_location(),
        }
    }
}

fn default_device_name() -> String {
    "PIR-Motion-Node".to_string()
}

fn default_location() -> String {
    "Home".to_string()
}

/// Motion sampling settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MotionSettings {
    /// PIR warm-up window after boot during which samples are ignored
    #[serde(default = "default_stabilization_ms")]
    pub stabilization_ms: Millis,
}

impl Default for MotionSettings {
    fn default() -> Self {
        Self {
            stabilization_ms: default_stabilization_ms(),
        }
    }
}

fn default_stabilization_ms() -> Millis {
    30_000
}

/// Notification rate limiting
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NotificationSettings {
    /// Minimum spacing between motion notifications
    #[serde(default = "default_min_interval_ms")]
    pub min_interval_ms: Millis,

    /// Maximum notifications per calendar day (0 = unlimited)
    #[serde(default = "default_daily_limit")]
    pub daily_limit: u32,

    /// Text of the motion alert
    #[serde(default = "default_motion_alert")]
    pub motion_alert: String,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            min_interval_ms: default_min_interval_ms(),
            daily_limit: default_daily_limit(),
            motion_alert: default_motion_alert(),
        }
    }
}

fn default_min_interval_ms() -> Millis {
    10_000
}

fn default_daily_limit() -> u32 {
    60
}

fn default_motion_alert() -> String {
    "🚨 Motion detected".to_string()
}

/// Time-of-day window with notifications suppressed
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QuietHoursSettings {
    #[serde(default)]
    pub enabled: bool,

    /// First quiet hour (inclusive, 24h)
    #[serde(default = "default_quiet_start")]
    pub start_hour: u32,

    /// First hour after the window (exclusive, 24h)
    #[serde(default = "default_quiet_end")]
    pub end_hour: u32,
}

impl Default for QuietHoursSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            start_hour: default_quiet_start(),
            end_hour: default_quiet_end(),
        }
    }
}

fn default_quiet_start() -> u32 {
    22
}

fn default_quiet_end() -> u32 {
    6
}

/// Button-driven config mode timings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConfigModeSettings {
    /// Continuous press needed for a long press
    #[serde(default = "default_hold_ms")]
    pub hold_ms: Millis,

    /// Minimum spacing between accepted short presses
    #[serde(default = "default_press_spacing_ms")]
    pub press_spacing_ms: Millis,

    /// Inactivity timeout that forces save-and-exit
    #[serde(default = "default_config_timeout_ms")]
    pub timeout_ms: Millis,

    /// Length of the live detection trial
    #[serde(default = "default_test_duration_ms")]
    pub test_duration_ms: Millis,
}

impl Default for ConfigModeSettings {
    fn default() -> Self {
        Self {
            hold_ms: default_hold_ms(),
            press_spacing_ms: default_press_spacing_ms(),
            timeout_ms: default_config_timeout_ms(),
            test_duration_ms: default_test_duration_ms(),
        }
    }
}

fn default_hold_ms() -> Millis {
    3000
}

fn default_press_spacing_ms() -> Millis {
    500
}

fn default_config_timeout_ms() -> Millis {
    60_000
}

fn default_test_duration_ms() -> Millis {
    10_000
}

/// Outbound message toggles
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MessageSettings {
    /// Announce when the node comes online
    #[serde(default = "default_true")]
    pub startup: bool,

    /// Announce the midnight counter reset
    #[serde(default = "default_true")]
    pub daily_reset: bool,

    /// Prefix announcements with the time
    #[serde(default = "default_true")]
    pub timestamps: bool,

    /// Suffix announcements with the device name
    #[serde(default = "default_true")]
    pub device_info: bool,
}

impl Default for MessageSettings {
    fn default() -> Self {
        Self {
            startup: true,
            daily_reset: true,
            timestamps: true,
            device_info: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Scheduler settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RuntimeSettings {
    /// Tick period of the cooperative loop
    #[serde(default = "default_loop_delay_ms")]
    pub loop_delay_ms: Millis,

    /// Supervisory watchdog timeout; fed once per tick
    #[serde(default = "default_watchdog_timeout_ms")]
    pub watchdog_timeout_ms: Millis,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            loop_delay_ms: default_loop_delay_ms(),
            watchdog_timeout_ms: default_watchdog_timeout_ms(),
        }
    }
}

fn default_loop_delay_ms() -> Millis {
    100
}

fn default_watchdog_timeout_ms() -> Millis {
    15_000
}

/// Sensor settings persistence
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageSettings {
    /// Sensor settings file (None = platform data dir)
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Write accepted remote sensitivity/range commands immediately instead
    /// of waiting for the next config-mode exit
    #[serde(default = "default_true")]
    pub persist_remote_commands: bool,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            path: None,
            persist_remote_commands: true,
        }
    }
}
