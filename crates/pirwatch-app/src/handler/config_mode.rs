//! Sensor config interaction handlers
//!
//! A short press advances the step and runs the action of the step it lands
//! on. A long press while active re-runs the current step's adjustment, or
//! ends a running detection test. Every exit path persists the live levels
//! once, and an interrupted test always reports its count.

use pirwatch_core::prelude::*;

use crate::button::ButtonEvent;
use crate::config_mode::{ConfigExitReason, ConfigStep};
use crate::outbound;
use crate::services::IndicatorPattern;
use crate::state::NodeState;

use super::{announce, UpdateAction, UpdateResult};

pub(crate) fn enter_config(state: &mut NodeState, result: &mut UpdateResult) {
    state.config.enter(state.now);
    state.button.reset();
    state.stats.config_sessions += 1;
    info!(
        "Entered sensor config mode (sensitivity {}, range {})",
        state.sensor.sensitivity, state.sensor.range
    );
    result.show(IndicatorPattern::ConfigEnter, 5);
    announce(state, &outbound::config_enter_text(), result);
}

pub(crate) fn handle_config_tick(
    state: &mut NodeState,
    event: ButtonEvent,
    motion: bool,
    result: &mut UpdateResult,
) {
    match event {
        ButtonEvent::ShortPress => advance_step(state, result),
        ButtonEvent::LongPress => adjust_step(state, result),
        ButtonEvent::None => {}
    }

    if !state.config.active {
        return;
    }

    // Adjustments above are already applied, so the trial sees live levels
    let now = state.now;
    let duration_ms = state.settings.config_mode.test_duration_ms;
    let sensor = state.sensor;
    let trial_complete = match state.config.trial.as_mut() {
        Some(trial) => {
            trial.observe(motion, now, &sensor);
            trial.is_complete(now, duration_ms)
        }
        None => false,
    };

    if trial_complete {
        finish_trial(state, result);
    } else if state
        .config
        .timed_out(now, state.settings.config_mode.timeout_ms)
    {
        info!(
            "Config mode timed out on step {}",
            state.config.step.label()
        );
        exit_config(state, ConfigExitReason::Timeout, result);
    }
}

fn advance_step(state: &mut NodeState, result: &mut UpdateResult) {
    if state.config.is_testing() {
        finish_trial(state, result);
    }

    let step = state.config.advance(state.now);
    info!("Config step: {}", step.label());
    match step {
        ConfigStep::Sensitivity => step_sensitivity(state, result),
        ConfigStep::Range => step_range(state, result),
        ConfigStep::Test => start_trial(state, result),
        ConfigStep::Save => exit_config(state, ConfigExitReason::Saved, result),
    }
}

fn adjust_step(state: &mut NodeState, result: &mut UpdateResult) {
    state.config.touch(state.now);
    match state.config.step {
        ConfigStep::Sensitivity => step_sensitivity(state, result),
        ConfigStep::Range => step_range(state, result),
        ConfigStep::Test => {
            if state.config.is_testing() {
                debug!("Detection test ended by long press");
                finish_trial(state, result);
            } else {
                start_trial(state, result);
            }
        }
        ConfigStep::Save => {}
    }
}

fn step_sensitivity(state: &mut NodeState, result: &mut UpdateResult) {
    let level = state.sensor.step_sensitivity(1);
    state.unsaved_changes = true;
    info!(
        "Sensitivity: {} (debounce {}ms)",
        level,
        level.debounce_delay_ms()
    );
    result.show(IndicatorPattern::ConfigSensitivity, 1);
    result.show(IndicatorPattern::LevelFast, u32::from(level.level()) + 1);
}

fn step_range(state: &mut NodeState, result: &mut UpdateResult) {
    let range = state.sensor.step_range(1);
    state.unsaved_changes = true;
    info!("Range: {} (cooldown {}ms)", range, range.cooldown_ms());
    result.show(IndicatorPattern::ConfigRange, 1);
    result.show(IndicatorPattern::LevelSlow, u32::from(range.level()) + 1);
}

pub(crate) fn start_trial(state: &mut NodeState, result: &mut UpdateResult) {
    state.config.start_trial(state.now);
    info!(
        "Detection test started for {}ms",
        state.settings.config_mode.test_duration_ms
    );
    result.show(IndicatorPattern::ConfigTest, 3);
}

/// Report and clear a running trial; no-op when none runs
pub(crate) fn finish_trial(state: &mut NodeState, result: &mut UpdateResult) {
    let Some(detections) = state.config.finish_trial(state.now) else {
        return;
    };
    info!("Detection test completed: {} detections", detections);
    let text = outbound::test_results_text(
        &state.sensor,
        detections,
        state.settings.config_mode.test_duration_ms,
    );
    announce(state, &text, result);
}

pub(crate) fn exit_config(
    state: &mut NodeState,
    reason: ConfigExitReason,
    result: &mut UpdateResult,
) {
    state.config.exit();
    state.button.reset();
    state.unsaved_changes = false;
    info!(
        "Config mode exited ({:?}): sensitivity {}, range {}",
        reason, state.sensor.sensitivity, state.sensor.range
    );

    result.push(UpdateAction::Persist(state.sensor));
    let pattern = match reason {
        ConfigExitReason::Saved => IndicatorPattern::ConfigSave,
        ConfigExitReason::Timeout => IndicatorPattern::ConfigExit,
    };
    result.show(pattern, 3);
    announce(state, &outbound::config_saved_text(&state.sensor), result);
}
