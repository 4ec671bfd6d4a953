//! Per-tick handling
//!
//! One tick advances the button detector, then exactly one of the motion
//! session or the config interaction depending on mode.

use pirwatch_core::prelude::*;

use crate::button::ButtonEvent;
use crate::gate;
use crate::message::TickInput;
use crate::motion::SessionEvent;
use crate::outbound;
use crate::services::IndicatorPattern;
use crate::state::{NodePhase, NodeState};

use super::{announce, config_mode, UpdateAction, UpdateResult};

/// Blinks shown when a session starts
const MOTION_BLINKS: u32 = 5;

pub(crate) fn handle_tick(state: &mut NodeState, input: TickInput) -> UpdateResult {
    let mut result = UpdateResult::none();

    if input.now < state.now {
        debug!("Clock went backward: {} -> {}", state.now, input.now);
    }
    state.now = input.now;
    state.wall_time = input.wall_time;
    state.transport_available = input.transport_available;

    roll_day(state, &mut result);
    announce_startup(state, &mut result);
    check_stabilization(state, &mut result);

    let timing = state.button_timing();
    let event = state
        .button
        .observe(input.button, input.now, state.config.active, &timing);

    if state.config.active {
        config_mode::handle_config_tick(state, event, input.motion, &mut result);
    } else if event == ButtonEvent::LongPress {
        config_mode::enter_config(state, &mut result);
    } else if state.is_stabilized() {
        handle_motion(state, input.motion, &mut result);
    }

    result
}

fn roll_day(state: &mut NodeState, result: &mut UpdateResult) {
    let Some(wall_time) = state.wall_time else {
        return;
    };
    if !state.gate.roll_day(wall_time.date()) {
        return;
    }
    state.stats.reset_failures();
    info!("Daily counters reset for {}", wall_time.date());
    if state.settings.messages.daily_reset {
        announce(state, &outbound::daily_reset_text(), result);
    }
}

fn announce_startup(state: &mut NodeState, result: &mut UpdateResult) {
    if state.startup_announced || !state.transport_available {
        return;
    }
    state.startup_announced = true;
    if state.settings.messages.startup {
        announce(state, &outbound::startup_text(&state.settings), result);
    }
}

fn check_stabilization(state: &mut NodeState, result: &mut UpdateResult) {
    if state.phase != NodePhase::Stabilizing {
        return;
    }
    if state.now >= state.settings.motion.stabilization_ms {
        state.phase = NodePhase::Running;
        info!("Motion sensor stabilization completed");
        result.show(IndicatorPattern::Stabilized, 3);
    }
}

fn handle_motion(state: &mut NodeState, motion: bool, result: &mut UpdateResult) {
    let now = state.now;
    match state.session.tick(motion, now, &state.sensor) {
        SessionEvent::Started => {
            state.stats.total_sessions += 1;
            info!("Motion session started (#{})", state.stats.total_sessions);
            result.show(IndicatorPattern::Motion, MOTION_BLINKS);
            notify_if_allowed(state, result);
        }
        SessionEvent::Continued => {
            trace!("Motion continues in session");
        }
        SessionEvent::Ended => {
            info!(
                "Motion session ended (duration {}s)",
                state.session.duration_ms(now) / 1000
            );
        }
        SessionEvent::None => {}
    }
}

fn notify_if_allowed(state: &mut NodeState, result: &mut UpdateResult) {
    let now = state.now;
    let verdict = gate::evaluate(
        &state.session,
        &state.gate,
        &state.sensor,
        &state.gate_policy(),
        now,
        state.is_quiet(),
        state.transport_available,
    );

    if !verdict.is_allowed() {
        debug!("Motion notification suppressed: {:?}", verdict);
        return;
    }

    state.session.notified = true;
    state.gate.record(now);
    state.stats.total_notifications += 1;
    info!(
        "Motion notification queued (daily: {})",
        state.gate.daily_count
    );

    let text = outbound::decorate(
        &state.settings.notifications.motion_alert,
        &state.settings,
        state.wall_time,
        now,
    );
    result.push(UpdateAction::Notify(text));
}
