//! Outbound message texts and decoration
//!
//! Announcements and motion alerts are decorated with a time prefix and a
//! device suffix according to `[messages]`. Command replies are sent as-is.

use chrono::NaiveDateTime;
use pirwatch_core::{Millis, SensorConfig};

use crate::config::Settings;

/// Wrap an announcement with the configured prefix and suffix
pub fn decorate(
    text: &str,
    settings: &Settings,
    wall_time: Option<NaiveDateTime>,
    uptime_ms: Millis,
) -> String {
    let mut out = String::new();
    if settings.messages.timestamps {
        match wall_time {
            Some(time) => out.push_str(&format!("🕐 {}\n", time.format("%H:%M:%S"))),
            None => out.push_str(&format!("⏱️ {}s | ", uptime_ms / 1000)),
        }
    }
    out.push_str(text);
    if settings.messages.device_info {
        out.push_str(&format!("\n📱 {}", settings.device.name));
    }
    out
}

/// Human-readable uptime such as `1d 2h 3m 4s`
pub fn format_uptime(uptime_ms: Millis) -> String {
    let secs = uptime_ms / 1000;
    let (days, hours, minutes, seconds) = (
        secs / 86_400,
        secs / 3600 % 24,
        secs / 60 % 60,
        secs % 60,
    );
    if days > 0 {
        format!("{}d {}h {}m {}s", days, hours, minutes, seconds)
    } else if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}

pub fn startup_text(settings: &Settings) -> String {
    format!(
        "🚀 {} Online\n📍 {}\n⚡ Firmware: v{}",
        settings.device.name,
        settings.device.location,
        env!("CARGO_PKG_VERSION")
    )
}

pub fn config_enter_text() -> String {
    "🔧 Sensor Config Mode\nPress button to cycle through settings.\nHold button to adjust the current step."
        .to_string()
}

pub fn config_saved_text(sensor: &SensorConfig) -> String {
    format!(
        "✅ Config Saved\nSensitivity: {}/4\nRange: {}/2",
        sensor.sensitivity.level(),
        sensor.range.level()
    )
}

pub fn test_results_text(sensor: &SensorConfig, detections: u32, duration_ms: Millis) -> String {
    format!(
        "🧪 Sensor Test Results\nSensitivity: {}/4\nRange: {}/2\nDetections in {}s: {}",
        sensor.sensitivity.level(),
        sensor.range.level(),
        duration_ms / 1000,
        detections
    )
}

pub fn daily_reset_text() -> String {
    "📅 Daily statistics reset - New day started!".to_string()
}
