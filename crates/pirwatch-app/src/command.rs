//! Remote command parsing
//!
//! Commands arrive as chat text: an optional leading `/`, the command name,
//! an optional `@botname` suffix and at most one argument.

use std::sync::LazyLock;

use pirwatch_core::prelude::*;
use pirwatch_core::Millis;
use regex::Regex;

/// `/name@bot arg`
static COMMAND_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^/?([A-Za-z_]+)(?:@\S+)?(?:\s+(\S+))?\s*$")
        .expect("Command regex pattern is valid")
});

/// A parsed remote command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteCommand {
    Status,
    Help,
    Stats,
    Reset,
    /// Send a test message
    Test,
    /// Enter config mode
    SensorConfig,
    /// Report (None) or set the sensitivity level
    Sensitivity(Option<i64>),
    /// Report (None) or set the range level
    Range(Option<i64>),
    /// Start a live detection trial
    TestSensor,
    ShowSettings,
}

impl RemoteCommand {
    /// Parse command text
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.trim();
        let caps = COMMAND_PATTERN
            .captures(text)
            .ok_or_else(|| Error::command_parse(format!("{:?}", text)))?;

        let name = caps
            .get(1)
            .map(|m| m.as_str().to_ascii_lowercase())
            .unwrap_or_default();
        let arg = caps.get(2).map(|m| m.as_str());

        let command = match name.as_str() {
            "start" | "help" => RemoteCommand::Help,
            "status" => RemoteCommand::Status,
            "stats" => RemoteCommand::Stats,
            "reset" => RemoteCommand::Reset,
            "test" => RemoteCommand::Test,
            "sensor_config" => RemoteCommand::SensorConfig,
            "sensitivity" => RemoteCommand::Sensitivity(parse_level("sensitivity", arg, "0-4")?),
            "range" => RemoteCommand::Range(parse_level("range", arg, "0-2")?),
            "test_sensor" => RemoteCommand::TestSensor,
            "show_settings" => RemoteCommand::ShowSettings,
            _ => return Err(Error::unknown_command(name)),
        };
        Ok(command)
    }

    pub fn name(self) -> &'static str {
        match self {
            RemoteCommand::Status => "status",
            RemoteCommand::Help => "help",
            RemoteCommand::Stats => "stats",
            RemoteCommand::Reset => "reset",
            RemoteCommand::Test => "test",
            RemoteCommand::SensorConfig => "sensor_config",
            RemoteCommand::Sensitivity(_) => "sensitivity",
            RemoteCommand::Range(_) => "range",
            RemoteCommand::TestSensor => "test_sensor",
            RemoteCommand::ShowSettings => "show_settings",
        }
    }
}

fn parse_level(
    field: &'static str,
    arg: Option<&str>,
    allowed: &'static str,
) -> Result<Option<i64>> {
    match arg {
        None => Ok(None),
        Some(raw) => raw
            .parse::<i64>()
            .map(Some)
            .map_err(|_| Error::invalid_setting(field, raw, allowed)),
    }
}

/// Help text listing every command
pub fn help_text(test_duration_ms: Millis) -> String {
    let test_sensor = format!(
        "/test_sensor - Run a {}s detection test",
        test_duration_ms / 1000
    );
    [
        "🤖 Available commands:",
        "/status - Node status",
        "/stats - Detection statistics",
        "/reset - Reset daily statistics",
        "/test - Send a test message",
        "/sensor_config - Enter sensor config mode",
        "/sensitivity [0-4] - Show or set sensitivity",
        "/range [0-2] - Show or set range",
        &test_sensor,
        "/show_settings - Show sensor settings",
        "/help - This message",
    ]
    .join("\n")
}
