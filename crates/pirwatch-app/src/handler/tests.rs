//! Tests for handler module

use super::*;
use crate::config_mode::ConfigStep;
use crate::message::{Message, TickInput};
use crate::motion::SessionPhase;
use crate::state::{NodeMode, NodePhase};
use chrono::{NaiveDate, NaiveDateTime};
use pirwatch_core::{Millis, Range, Sensitivity};

/// State past the stabilization window
fn running_state() -> NodeState {
    let mut state = NodeState::default();
    state.settings.motion.stabilization_ms = 0;
    state
}

fn online(now: Millis) -> TickInput {
    TickInput::at(now).with_transport(true)
}

fn tick(state: &mut NodeState, input: TickInput) -> UpdateResult {
    update(state, Message::Tick(input))
}

fn command(state: &mut NodeState, text: &str) -> UpdateResult {
    update(state, Message::RemoteCommand(text.to_string()))
}

fn notifies(result: &UpdateResult) -> usize {
    result
        .actions
        .iter()
        .filter(|a| matches!(a, UpdateAction::Notify(_)))
        .count()
}

fn announcements(result: &UpdateResult) -> Vec<String> {
    result
        .actions
        .iter()
        .filter_map(|a| match a {
            UpdateAction::Announce(text) => Some(text.clone()),
            _ => None,
        })
        .collect()
}

fn replies(result: &UpdateResult) -> Vec<String> {
    result
        .actions
        .iter()
        .filter_map(|a| match a {
            UpdateAction::Reply(text) => Some(text.clone()),
            _ => None,
        })
        .collect()
}

fn shows(result: &UpdateResult, pattern: IndicatorPattern) -> bool {
    result
        .actions
        .iter()
        .any(|a| matches!(a, UpdateAction::ShowPattern { pattern: p, .. } if *p == pattern))
}

/// Drive ticks every 100ms over `[from, to)` with a fixed button and motion
/// level, collecting every action
fn run(
    state: &mut NodeState,
    from: Millis,
    to: Millis,
    button: bool,
    motion: bool,
) -> Vec<UpdateAction> {
    let mut actions = Vec::new();
    let mut now = from;
    while now < to {
        let input = online(now).with_button(button).with_motion(motion);
        actions.extend(tick(state, input).actions);
        now += 100;
    }
    actions
}

/// Hold the button from `start` until the long press fires, then release
fn long_press(state: &mut NodeState, start: Millis) -> Vec<UpdateAction> {
    let hold = state.settings.config_mode.hold_ms;
    let mut actions = run(state, start, start + hold + 100, true, false);
    actions.extend(tick(state, online(start + hold + 100)).actions);
    actions
}

fn short_press(state: &mut NodeState, at: Millis) -> Vec<UpdateAction> {
    let mut actions = tick(state, online(at).with_button(true)).actions;
    actions.extend(tick(state, online(at + 100)).actions);
    actions
}

fn persist_count(actions: &[UpdateAction]) -> usize {
    actions
        .iter()
        .filter(|a| matches!(a, UpdateAction::Persist(_)))
        .count()
}

fn wall(day: u32, hour: u32) -> Option<NaiveDateTime> {
    NaiveDate::from_ymd_opt(2024, 3, day)
        .unwrap()
        .and_hms_opt(hour, 0, 0)
}

// ─────────────────────────────────────────────────────────
// Lifecycle
// ─────────────────────────────────────────────────────────

#[test]
fn test_quit_sets_quitting_phase() {
    let mut state = running_state();
    let result = update(&mut state, Message::Quit);

    assert_eq!(state.phase, NodePhase::Quitting);
    assert!(state.should_quit());
    assert_eq!(result.persist_count(), 0);
}

#[test]
fn test_ticks_ignored_after_quit() {
    let mut state = running_state();
    update(&mut state, Message::Quit);

    let result = tick(&mut state, online(0).with_motion(true));
    assert!(result.actions.is_empty());
    assert!(state.session.is_idle());
}

#[test]
fn test_startup_announced_once_when_transport_up() {
    let mut state = running_state();

    let offline = tick(&mut state, TickInput::at(0));
    assert!(announcements(&offline).is_empty());

    let first = tick(&mut state, online(100));
    let texts = announcements(&first);
    assert_eq!(texts.len(), 1);
    assert!(texts[0].contains("PIR-Motion-Node Online"));

    assert!(announcements(&tick(&mut state, online(200))).is_empty());
}

#[test]
fn test_startup_message_can_be_disabled() {
    let mut state = running_state();
    state.settings.messages.startup = false;
    assert!(announcements(&tick(&mut state, online(0))).is_empty());
    assert!(state.startup_announced);
}

#[test]
fn test_motion_ignored_until_stabilized() {
    let mut state = NodeState::default();

    let actions = run(&mut state, 0, 30_000, false, true);
    assert!(state.session.is_idle());
    assert!(!actions.iter().any(|a| matches!(a, UpdateAction::Notify(_))));

    let result = tick(&mut state, online(30_000).with_motion(true));
    assert_eq!(state.phase, NodePhase::Running);
    assert!(shows(&result, IndicatorPattern::Stabilized));
    assert_eq!(state.session.phase, SessionPhase::Active);
    assert_eq!(notifies(&result), 1);
}

// ─────────────────────────────────────────────────────────
// Motion sessions and the gate
// ─────────────────────────────────────────────────────────

#[test]
fn test_first_motion_notifies() {
    let mut state = running_state();

    let result = tick(&mut state, online(0).with_motion(true));

    assert_eq!(state.session.phase, SessionPhase::Active);
    assert!(state.session.notified);
    assert_eq!(state.gate.last_notification_time, Some(0));
    assert_eq!(state.gate.daily_count, 1);
    assert_eq!(state.stats.total_sessions, 1);
    assert_eq!(notifies(&result), 1);
    assert!(shows(&result, IndicatorPattern::Motion));
}

#[test]
fn test_session_scenario_cooldown_boundary() {
    let mut state = running_state();
    state.sensor = SensorConfig::new(Sensitivity::Medium, Range::Medium);

    run(&mut state, 0, 5001, false, true);
    assert_eq!(state.session.last_motion_time, 5000);

    run(&mut state, 5100, 5000 + 9999, false, false);
    tick(&mut state, online(5000 + 9999));
    assert_eq!(state.session.phase, SessionPhase::Cooldown);

    tick(&mut state, online(5000 + 10_000));
    assert!(state.session.is_idle());
    assert_eq!(state.stats.total_sessions, 1);
}

#[test]
fn test_one_notification_per_session_with_gaps() {
    let mut state = running_state();
    let mut total = 0;
    for i in 0..600u64 {
        // 300ms dropouts every second
        let motion = i % 10 < 7;
        total += notifies(&tick(&mut state, online(i * 100).with_motion(motion)));
    }
    assert_eq!(state.stats.total_sessions, 1);
    assert_eq!(total, 1);
}

#[test]
fn test_second_session_inside_interval_not_notified() {
    let mut state = running_state();
    state.sensor.range = Range::Short;
    state.settings.notifications.min_interval_ms = 60_000;

    tick(&mut state, online(0).with_motion(true));
    run(&mut state, 100, 5200, false, false);
    assert!(state.session.is_idle());

    let result = tick(&mut state, online(6000).with_motion(true));
    assert_eq!(state.stats.total_sessions, 2);
    assert_eq!(notifies(&result), 0);
    assert!(!state.session.notified);
}

#[test]
fn test_quiet_hours_suppress_notification() {
    let mut state = running_state();
    state.settings.quiet_hours.enabled = true;

    let result = tick(
        &mut state,
        online(0).with_motion(true).with_wall_time(wall(1, 23)),
    );
    assert_eq!(state.stats.total_sessions, 1);
    assert_eq!(notifies(&result), 0);
}

#[test]
fn test_quiet_hours_ignored_without_wall_time() {
    let mut state = running_state();
    state.settings.quiet_hours.enabled = true;
    state.settings.quiet_hours.start_hour = 0;
    state.settings.quiet_hours.end_hour = 23;

    let result = tick(&mut state, online(0).with_motion(true));
    assert_eq!(notifies(&result), 1);
}

#[test]
fn test_transport_down_drops_notification() {
    let mut state = running_state();
    let result = tick(&mut state, TickInput::at(0).with_motion(true));
    assert_eq!(notifies(&result), 0);
    assert!(!state.session.notified);
    assert_eq!(state.gate.daily_count, 0);
}

#[test]
fn test_motion_alert_is_decorated() {
    let mut state = running_state();
    let result = tick(
        &mut state,
        online(0).with_motion(true).with_wall_time(wall(1, 14)),
    );
    let alert = result
        .actions
        .iter()
        .find_map(|a| match a {
            UpdateAction::Notify(text) => Some(text.clone()),
            _ => None,
        })
        .unwrap();
    assert_eq!(alert, "🕐 14:00:00\n🚨 Motion detected\n📱 PIR-Motion-Node");
}

// ─────────────────────────────────────────────────────────
// Daily reset
// ─────────────────────────────────────────────────────────

#[test]
fn test_daily_reset_on_day_change_only() {
    let mut state = running_state();
    tick(&mut state, online(0).with_wall_time(wall(1, 23)));
    state.gate.daily_count = 12;
    state.stats.send_failures = 3;

    let same_day = tick(&mut state, online(100).with_wall_time(wall(1, 23)));
    assert!(announcements(&same_day).is_empty());
    assert_eq!(state.gate.daily_count, 12);

    let next_day = tick(&mut state, online(200).with_wall_time(wall(2, 0)));
    assert_eq!(state.gate.daily_count, 0);
    assert_eq!(state.stats.send_failures, 0);
    let texts = announcements(&next_day);
    assert_eq!(texts.len(), 1);
    assert!(texts[0].contains("Daily statistics reset"));
}

#[test]
fn test_no_daily_reset_without_wall_time() {
    let mut state = running_state();
    state.gate.daily_count = 7;
    run(&mut state, 0, 1000, false, false);
    assert_eq!(state.gate.daily_count, 7);
    assert!(state.gate.daily_reset_day.is_none());
}

// ─────────────────────────────────────────────────────────
// Config mode
// ─────────────────────────────────────────────────────────

#[test]
fn test_long_press_enters_config_mode() {
    let mut state = running_state();
    let actions = long_press(&mut state, 0);

    assert!(state.config.active);
    assert_eq!(state.config.step, ConfigStep::Sensitivity);
    assert_eq!(state.config.start_time, 3000);
    assert_eq!(state.mode(), NodeMode::Config);
    assert!(actions.iter().any(|a| matches!(
        a,
        UpdateAction::ShowPattern {
            pattern: IndicatorPattern::ConfigEnter,
            ..
        }
    )));
    assert!(actions.iter().any(
        |a| matches!(a, UpdateAction::Announce(text) if text.contains("Sensor Config Mode"))
    ));
    assert_eq!(persist_count(&actions), 0);
}

#[test]
fn test_short_press_outside_config_mode_does_nothing() {
    let mut state = running_state();
    let actions = short_press(&mut state, 0);
    assert!(!state.config.active);
    assert_eq!(persist_count(&actions), 0);
}

#[test]
fn test_three_short_presses_save_once() {
    let mut state = running_state();
    let mut actions = long_press(&mut state, 0);

    actions.extend(short_press(&mut state, 4000));
    assert_eq!(state.config.step, ConfigStep::Range);
    assert_eq!(state.sensor.range, Range::Long);

    actions.extend(short_press(&mut state, 5000));
    assert_eq!(state.config.step, ConfigStep::Test);
    assert!(state.config.is_testing());

    actions.extend(short_press(&mut state, 6000));
    assert!(!state.config.active);
    assert!(!state.config.is_testing());

    assert_eq!(persist_count(&actions), 1);
    assert!(actions.contains(&UpdateAction::Persist(SensorConfig::new(
        Sensitivity::Medium,
        Range::Long
    ))));
    assert!(actions.iter().any(|a| matches!(
        a,
        UpdateAction::ShowPattern {
            pattern: IndicatorPattern::ConfigSave,
            ..
        }
    )));
    // Test step was cut short by the press, results still reported
    assert!(actions.iter().any(
        |a| matches!(a, UpdateAction::Announce(text) if text.contains("Detections in 10s: 0"))
    ));
}

#[test]
fn test_bouncy_presses_are_suppressed() {
    let mut state = running_state();
    long_press(&mut state, 0);

    short_press(&mut state, 4000);
    // Released 200ms after the accepted press
    short_press(&mut state, 4200);
    assert_eq!(state.config.step, ConfigStep::Range);
}

#[test]
fn test_inactivity_timeout_saves_once() {
    let mut state = running_state();
    let mut actions = long_press(&mut state, 0);
    actions.extend(short_press(&mut state, 4000));

    // Last interaction at 4100
    actions.extend(run(&mut state, 4200, 4100 + 60_000, false, false));
    assert!(state.config.active);

    actions.extend(run(&mut state, 4100 + 60_000, 4100 + 61_000, false, false));
    assert!(!state.config.active);
    assert_eq!(persist_count(&actions), 1);
    assert!(actions.iter().any(|a| matches!(
        a,
        UpdateAction::ShowPattern {
            pattern: IndicatorPattern::ConfigExit,
            ..
        }
    )));
}

#[test]
fn test_config_mode_suspends_sessions() {
    let mut state = running_state();
    long_press(&mut state, 0);

    let actions = run(&mut state, 3200, 10_000, false, true);
    assert!(state.session.is_idle());
    assert_eq!(state.stats.total_sessions, 0);
    assert!(!actions.iter().any(|a| matches!(a, UpdateAction::Notify(_))));
}

#[test]
fn test_hold_in_config_mode_cycles_sensitivity() {
    let mut state = running_state();
    long_press(&mut state, 0);

    let levels: Vec<u8> = (0..4)
        .map(|i| {
            long_press(&mut state, 4000 + i * 4000);
            state.sensor.sensitivity.level()
        })
        .collect();

    assert_eq!(levels, vec![3, 4, 0, 1]);
    assert!(state.config.active);
    assert!(state.unsaved_changes);
}

#[test]
fn test_detection_trial_counts_and_reports() {
    let mut state = running_state();
    long_press(&mut state, 0);
    short_press(&mut state, 4000);
    short_press(&mut state, 5000);
    let started = state.config.trial.as_ref().map(|t| t.started_at).unwrap();
    assert_eq!(started, 5100);

    let mut actions = Vec::new();
    // Two pulses far apart, one too close to count
    for (from, to) in [(6000, 6300), (6500, 6600), (9000, 9200)] {
        actions.extend(run(&mut state, from, to, false, true));
        actions.extend(tick(&mut state, online(to)).actions);
    }
    actions.extend(run(&mut state, 9300, 15_200, false, false));

    assert!(!state.config.is_testing());
    assert!(state.config.active);
    assert!(actions.iter().any(
        |a| matches!(a, UpdateAction::Announce(text) if text.contains("Detections in 10s: 2"))
    ));
    assert_eq!(persist_count(&actions), 0);
}

/// Enter config, walk to Test and count two pulses in the running trial
fn trial_with_two_detections(state: &mut NodeState) {
    long_press(state, 0);
    short_press(state, 4000);
    short_press(state, 5000);
    for (from, to) in [(6000, 6300), (9000, 9200)] {
        run(state, from, to, false, true);
        tick(state, online(to));
    }
    assert_eq!(state.config.trial.as_ref().map(|t| t.detections), Some(2));
}

fn reports(actions: &[UpdateAction]) -> Vec<&String> {
    actions
        .iter()
        .filter_map(|a| match a {
            UpdateAction::Announce(text) if text.contains("Detections in") => Some(text),
            _ => None,
        })
        .collect()
}

#[test]
fn test_long_press_ends_running_trial_with_report() {
    let mut state = running_state();
    trial_with_two_detections(&mut state);

    let actions = long_press(&mut state, 10_000);

    assert!(!state.config.is_testing());
    assert!(state.config.active);
    assert_eq!(state.config.step, ConfigStep::Test);
    let reports = reports(&actions);
    assert_eq!(reports.len(), 1);
    assert!(reports[0].contains("Detections in 10s: 2"));

    // The next long press on Test starts a fresh trial
    long_press(&mut state, 14_000);
    assert!(state.config.is_testing());
    assert_eq!(state.config.trial.as_ref().map(|t| t.detections), Some(0));
}

#[test]
fn test_remote_test_sensor_reports_running_trial_before_restart() {
    let mut state = running_state();
    trial_with_two_detections(&mut state);

    let result = command(&mut state, "/test_sensor");

    let reports = reports(&result.actions);
    assert_eq!(reports.len(), 1);
    assert!(reports[0].contains("Detections in 10s: 2"));
    assert!(state.config.is_testing());
    assert_eq!(state.config.trial.as_ref().map(|t| t.detections), Some(0));
}

#[test]
fn test_no_timeout_while_trial_runs() {
    let mut state = running_state();
    state.settings.config_mode.timeout_ms = 2000;
    state.settings.config_mode.test_duration_ms = 8000;
    long_press(&mut state, 0);
    short_press(&mut state, 4000);
    short_press(&mut state, 5000);

    run(&mut state, 5200, 13_200, false, false);
    assert!(state.config.active);
    assert!(!state.config.is_testing());

    run(&mut state, 13_200, 16_000, false, false);
    assert!(!state.config.active);
}

#[test]
fn test_quit_in_config_mode_persists() {
    let mut state = running_state();
    long_press(&mut state, 0);
    long_press(&mut state, 4000);

    let result = update(&mut state, Message::Quit);
    assert_eq!(result.persist_count(), 1);
    assert!(!state.config.active);
}

#[test]
fn test_persist_failure_counts_and_marks_unsaved() {
    let mut state = running_state();
    update(
        &mut state,
        Message::PersistFailed {
            error: "disk full".to_string(),
        },
    );
    assert_eq!(state.stats.persistence_failures, 1);
    assert!(state.unsaved_changes);

    update(
        &mut state,
        Message::SendFailed {
            error: "timeout".to_string(),
        },
    );
    assert_eq!(state.stats.send_failures, 1);
}

// ─────────────────────────────────────────────────────────
// Remote commands
// ─────────────────────────────────────────────────────────

#[test]
fn test_remote_sensitivity_sets_and_persists() {
    let mut state = running_state();
    let result = command(&mut state, "/sensitivity 4");

    assert_eq!(state.sensor.sensitivity, Sensitivity::VeryHigh);
    assert_eq!(result.persist_count(), 1);
    assert!(!state.unsaved_changes);
    assert_eq!(
        replies(&result),
        vec!["✅ Sensitivity set to 4/4 (Very High)\nDebounce: 200ms".to_string()]
    );
}

#[test]
fn test_remote_out_of_domain_rejected() {
    let mut state = running_state();

    for text in ["/sensitivity 5", "/sensitivity -1", "/range 3", "/range abc"] {
        let result = command(&mut state, text);
        assert_eq!(result.persist_count(), 0);
        let texts = replies(&result);
        assert_eq!(texts.len(), 1);
        assert!(texts[0].starts_with("❌ Invalid"), "{}", texts[0]);
    }
    assert_eq!(state.sensor, SensorConfig::default());
}

#[test]
fn test_remote_change_deferred_when_configured() {
    let mut state = running_state();
    state.settings.storage.persist_remote_commands = false;

    let result = command(&mut state, "/range 0");
    assert_eq!(state.sensor.range, Range::Short);
    assert_eq!(result.persist_count(), 0);
    assert!(state.unsaved_changes);

    let quit = update(&mut state, Message::Quit);
    assert_eq!(quit.persist_count(), 1);
}

#[test]
fn test_remote_query_reports_current_level() {
    let mut state = running_state();
    let result = command(&mut state, "/range");
    assert_eq!(
        replies(&result),
        vec!["📏 Current range: 1/2 (Medium)\nUse /range [0-2] to change".to_string()]
    );
}

#[test]
fn test_remote_sensor_config_matches_physical_entry() {
    let mut state = running_state();
    tick(&mut state, online(1000));
    let result = command(&mut state, "/sensor_config");

    assert!(state.config.active);
    assert_eq!(state.config.step, ConfigStep::Sensitivity);
    assert_eq!(state.config.start_time, 1000);
    assert!(shows(&result, IndicatorPattern::ConfigEnter));
    assert_eq!(replies(&result).len(), 1);

    let again = command(&mut state, "/sensor_config");
    assert_eq!(
        replies(&again),
        vec!["🔧 Config mode is already active".to_string()]
    );
}

#[test]
fn test_remote_test_sensor_runs_trial() {
    let mut state = running_state();
    tick(&mut state, online(0));
    command(&mut state, "/test_sensor");

    assert!(state.config.active);
    assert_eq!(state.config.step, ConfigStep::Test);
    assert!(state.config.is_testing());

    let actions = run(&mut state, 100, 10_100, false, false);
    assert!(!state.config.is_testing());
    assert!(actions.iter().any(
        |a| matches!(a, UpdateAction::Announce(text) if text.contains("Detections in 10s: 0"))
    ));
}

#[test]
fn test_remote_reset_clears_daily_counters() {
    let mut state = running_state();
    state.gate.daily_count = 9;
    state.stats.persistence_failures = 2;
    state.stats.total_sessions = 9;

    command(&mut state, "/reset");
    assert_eq!(state.gate.daily_count, 0);
    assert_eq!(state.stats.persistence_failures, 0);
    assert_eq!(state.stats.total_sessions, 9);
}

#[test]
fn test_unknown_command_reply() {
    let mut state = running_state();
    let result = command(&mut state, "/reboot@pir_bot");
    assert_eq!(
        replies(&result),
        vec!["❓ Unknown command: /reboot\nSend /help for the command list".to_string()]
    );
}

#[test]
fn test_show_settings_reply() {
    let mut state = running_state();
    let result = command(&mut state, "/show_settings");
    insta::assert_snapshot!(replies(&result).join("\n"), @r"
    ⚙️ Sensor Settings
    🎚️ Sensitivity: 2/4 (Medium)
    📏 Range: 1/2 (Medium)
    ⏱️ Debounce: 1000ms
    🕐 Cooldown: 10000ms
    ");
}

#[test]
fn test_stats_reply() {
    let mut state = running_state();
    tick(&mut state, online(65_000).with_motion(true));
    let result = command(&mut state, "stats");
    insta::assert_snapshot!(replies(&result).join("\n"), @r"
    📈 System Statistics
    Total Motion Events: 1
    Total Notifications: 1
    Daily Notifications: 1
    Send Failures: 0
    Storage Failures: 0
    Config Sessions: 0
    Uptime: 1m 5s
    ");
}

#[test]
fn test_replies_are_not_decorated() {
    let mut state = running_state();
    let result = command(&mut state, "/help");
    let texts = replies(&result);
    assert!(texts[0].starts_with("🤖 Available commands:"));
    assert!(!texts[0].contains("📱"));
}
