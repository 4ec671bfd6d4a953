//! Remote command handlers
//!
//! Commands drive the same state transitions as the physical path. Level
//! changes on this path are validated and rejected rather than wrapped.

use pirwatch_core::prelude::*;

use crate::command::{help_text, RemoteCommand};
use crate::outbound;
use crate::services::IndicatorPattern;
use crate::state::{NodeMode, NodeState};

use super::{config_mode, UpdateAction, UpdateResult};

pub(crate) fn handle_remote_command(state: &mut NodeState, text: &str) -> UpdateResult {
    let mut result = UpdateResult::none();

    match RemoteCommand::parse(text) {
        Ok(command) => {
            info!("Remote command: /{}", command.name());
            execute(state, command, &mut result);
        }
        Err(e) => {
            warn!("Rejected remote command {:?}: {}", text, e);
            reply(&mut result, error_reply(&e));
        }
    }

    result
}

fn execute(state: &mut NodeState, command: RemoteCommand, result: &mut UpdateResult) {
    match command {
        RemoteCommand::Status => reply(result, status_text(state)),
        RemoteCommand::Help => reply(
            result,
            help_text(state.settings.config_mode.test_duration_ms),
        ),
        RemoteCommand::Stats => reply(result, stats_text(state)),

        RemoteCommand::Reset => {
            state.gate.reset_daily_count();
            state.stats.reset_failures();
            info!("Counters reset by remote command");
            reply(
                result,
                "🔄 Counters Reset\nDaily statistics have been reset.".to_string(),
            );
        }

        RemoteCommand::Test => {
            let time = match state.wall_time {
                Some(time) => time.format("%Y-%m-%d %H:%M:%S").to_string(),
                None => format!("{} since boot", outbound::format_uptime(state.now)),
            };
            reply(
                result,
                format!(
                    "🧪 Test Message\nDevice: {}\nLocation: {}\nTime: {}",
                    state.settings.device.name, state.settings.device.location, time
                ),
            );
        }

        RemoteCommand::SensorConfig => {
            if state.config.active {
                reply(result, "🔧 Config mode is already active".to_string());
                return;
            }
            config_mode::enter_config(state, result);
            reply(
                result,
                "🔧 Sensor Config Mode Activated\nUse the physical button or /sensitivity and /range to adjust settings.".to_string(),
            );
        }

        RemoteCommand::Sensitivity(None) => {
            reply(
                result,
                format!(
                    "🎚️ Current sensitivity: {}\nUse /sensitivity [0-4] to change",
                    state.sensor.sensitivity
                ),
            );
        }
        RemoteCommand::Sensitivity(Some(level)) => {
            match state.sensor.set_sensitivity_level(level) {
                Ok(()) => {
                    let sensitivity = state.sensor.sensitivity;
                    info!("Sensitivity set remotely to {}", sensitivity);
                    result.show(
                        IndicatorPattern::LevelFast,
                        u32::from(sensitivity.level()) + 1,
                    );
                    apply_remote_change(state, result);
                    reply(
                        result,
                        format!(
                            "✅ Sensitivity set to {}\nDebounce: {}ms",
                            sensitivity,
                            sensitivity.debounce_delay_ms()
                        ),
                    );
                }
                Err(e) => {
                    warn!("Rejected sensitivity change: {}", e);
                    reply(result, error_reply(&e));
                }
            }
        }

        RemoteCommand::Range(None) => {
            reply(
                result,
                format!(
                    "📏 Current range: {}\nUse /range [0-2] to change",
                    state.sensor.range
                ),
            );
        }
        RemoteCommand::Range(Some(level)) => match state.sensor.set_range_level(level) {
            Ok(()) => {
                let range = state.sensor.range;
                info!("Range set remotely to {}", range);
                result.show(IndicatorPattern::LevelSlow, u32::from(range.level()) + 1);
                apply_remote_change(state, result);
                reply(
                    result,
                    format!(
                        "✅ Range set to {}\nCooldown: {}ms",
                        range,
                        range.cooldown_ms()
                    ),
                );
            }
            Err(e) => {
                warn!("Rejected range change: {}", e);
                reply(result, error_reply(&e));
            }
        },

        RemoteCommand::TestSensor => {
            if !state.config.active {
                config_mode::enter_config(state, result);
            }
            config_mode::finish_trial(state, result);
            config_mode::start_trial(state, result);
            reply(
                result,
                format!(
                    "🧪 Sensor test started\nMove in front of the sensor for {}s",
                    state.settings.config_mode.test_duration_ms / 1000
                ),
            );
        }

        RemoteCommand::ShowSettings => reply(result, settings_text(state)),
    }
}

/// Persist now or leave it for the next config-mode exit
fn apply_remote_change(state: &mut NodeState, result: &mut UpdateResult) {
    if state.config.active {
        state.config.touch(state.now);
    }
    if state.settings.storage.persist_remote_commands {
        state.unsaved_changes = false;
        result.push(UpdateAction::Persist(state.sensor));
    } else {
        state.unsaved_changes = true;
    }
}

fn reply(result: &mut UpdateResult, text: String) {
    result.push(UpdateAction::Reply(text));
}

fn error_reply(error: &Error) -> String {
    match error {
        Error::UnknownCommand { command } => {
            format!("❓ Unknown command: /{}\nSend /help for the command list", command)
        }
        other => format!("❌ {}", other),
    }
}

fn status_text(state: &NodeState) -> String {
    let mode = if !state.is_stabilized() {
        "Stabilizing".to_string()
    } else {
        match state.mode() {
            NodeMode::Normal => "Normal".to_string(),
            NodeMode::Config => format!("Config ({})", state.config.step.label()),
        }
    };
    let limit = match state.settings.notifications.daily_limit {
        0 => "∞".to_string(),
        n => n.to_string(),
    };
    let quiet = if !state.settings.quiet_hours.enabled {
        "disabled"
    } else if state.is_quiet() {
        "active"
    } else {
        "inactive"
    };

    format!(
        "📊 System Status\n📍 {}\n🔋 Uptime: {}\n⚙️ Mode: {}\n🚶 Session: {:?}\n🔢 Motion Events: {}\n📊 Daily Notifications: {}/{}\n🌙 Quiet Hours: {}",
        state.settings.device.location,
        outbound::format_uptime(state.now),
        mode,
        state.session.phase,
        state.stats.total_sessions,
        state.gate.daily_count,
        limit,
        quiet
    )
}

fn stats_text(state: &NodeState) -> String {
    format!(
        "📈 System Statistics\nTotal Motion Events: {}\nTotal Notifications: {}\nDaily Notifications: {}\nSend Failures: {}\nStorage Failures: {}\nConfig Sessions: {}\nUptime: {}",
        state.stats.total_sessions,
        state.stats.total_notifications,
        state.gate.daily_count,
        state.stats.send_failures,
        state.stats.persistence_failures,
        state.stats.config_sessions,
        outbound::format_uptime(state.now)
    )
}

fn settings_text(state: &NodeState) -> String {
    let mut text = format!(
        "⚙️ Sensor Settings\n🎚️ Sensitivity: {}\n📏 Range: {}\n⏱️ Debounce: {}ms\n🕐 Cooldown: {}ms",
        state.sensor.sensitivity,
        state.sensor.range,
        state.sensor.debounce_delay_ms(),
        state.sensor.cooldown_ms()
    );
    if state.config.active {
        text.push_str("\n\n🔧 Config mode is currently active");
    }
    if state.unsaved_changes {
        text.push_str("\n💾 Unsaved changes");
    }
    text
}
