//! Headless mode runner - cooperative tick loop against simulated hardware
//!
//! The engine ticks on a `loop_delay_ms` interval. Simulator lines arrive from
//! a blocking stdin reader bridged through an mpsc channel.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

use pirwatch_app::{
    Collaborators, Engine, MonotonicClock, Settings, SystemWallClock, TomlSensorStore,
};
use pirwatch_core::prelude::*;

use super::hardware::{
    ConsoleIndicator, ConsoleTransport, SimLine, SimulatedHardware, SimulatedInput, SoftWatchdog,
};
use super::HeadlessEvent;

/// What the runner needs beyond the node settings
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub settings: Settings,
    pub store_path: PathBuf,
    /// Stop after this many ticks
    pub max_ticks: Option<u64>,
}

/// Run the node headless - NDJSON events on stdout, simulator lines on stdin
pub async fn run_headless(options: RunOptions) -> Result<()> {
    info!("═══════════════════════════════════════════════════════");
    info!("pirwatch node starting in HEADLESS mode");
    info!("Device: {}", options.settings.device.name);
    info!("Sensor store: {}", options.store_path.display());
    info!("═══════════════════════════════════════════════════════");

    let hardware = SimulatedHardware::new();
    let mut engine = build_engine(options.settings, options.store_path, &hardware);

    HeadlessEvent::node_started(
        &engine.settings().device.name,
        engine.state.sensor.sensitivity.level(),
        engine.state.sensor.range.level(),
    )
    .emit();

    let (line_tx, line_rx) = mpsc::channel::<SimLine>(64);
    std::thread::spawn(move || {
        spawn_stdin_reader_blocking(line_tx);
    });

    let result = headless_event_loop(&mut engine, &hardware, line_rx, options.max_ticks).await;

    engine.shutdown();
    emit_engine_events(&mut engine);

    info!("pirwatch headless mode exiting");
    result
}

fn build_engine(
    settings: Settings,
    store_path: PathBuf,
    hardware: &Arc<SimulatedHardware>,
) -> Engine {
    let watchdog_timeout = settings.runtime.watchdog_timeout_ms;
    let collaborators = Collaborators {
        clock: Box::new(MonotonicClock::new()),
        wall_clock: Box::new(SystemWallClock),
        input: Box::new(SimulatedInput::new(hardware.clone())),
        transport: Box::new(ConsoleTransport::new(hardware.clone())),
        indicator: Box::new(ConsoleIndicator),
        watchdog: Box::new(SoftWatchdog::new(watchdog_timeout)),
        store: Box::new(TomlSensorStore::new(store_path)),
    };
    Engine::new(settings, collaborators)
}

/// Main headless event loop
async fn headless_event_loop(
    engine: &mut Engine,
    hardware: &SimulatedHardware,
    mut line_rx: mpsc::Receiver<SimLine>,
    max_ticks: Option<u64>,
) -> Result<()> {
    let mut interval = tokio::time::interval(Duration::from_millis(
        engine.settings().runtime.loop_delay_ms,
    ));
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut ticks: u64 = 0;
    let mut stdin_open = true;

    loop {
        if engine.should_quit() {
            info!("Quit requested");
            break;
        }

        tokio::select! {
            _ = interval.tick() => {
                engine.tick();
                ticks += 1;
                emit_engine_events(engine);

                if max_ticks.is_some_and(|max| ticks >= max) {
                    info!("Tick limit reached after {} ticks", ticks);
                    break;
                }
            }
            line = line_rx.recv(), if stdin_open => match line {
                Some(SimLine::Quit) => {
                    info!("Stdin: quit requested");
                    break;
                }
                Some(SimLine::Command(text)) => {
                    engine.handle_command(&text);
                    emit_engine_events(engine);
                }
                Some(line) => {
                    hardware.apply(&line);
                }
                None => {
                    // The node keeps running on its own once stdin is gone
                    info!("Stdin closed");
                    stdin_open = false;
                }
            }
        }
    }

    Ok(())
}

fn emit_engine_events(engine: &mut Engine) {
    for event in engine.take_events() {
        HeadlessEvent::from_engine(event).emit();
    }
}

/// Read simulator lines from stdin and forward them to the event loop (blocking version)
fn spawn_stdin_reader_blocking(line_tx: mpsc::Sender<SimLine>) {
    use std::io::BufRead;

    let stdin = std::io::stdin();
    let reader = stdin.lock();

    for line in reader.lines() {
        match line {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                let Some(parsed) = SimLine::parse(&line) else {
                    warn!("Unknown stdin line: {}", line.trim());
                    HeadlessEvent::error(format!("unknown input: {}", line.trim()), false).emit();
                    continue;
                };
                let quit = parsed == SimLine::Quit;
                if let Err(e) = forward_line(&line_tx, parsed) {
                    debug!("Stdin reader stopping: {}", e);
                    break;
                }
                if quit {
                    break;
                }
            }
            Err(e) => {
                error!("Failed to read stdin: {}", e);
                break;
            }
        }
    }

    info!("Stdin reader exiting");
}

fn forward_line(line_tx: &mpsc::Sender<SimLine>, line: SimLine) -> Result<()> {
    line_tx
        .blocking_send(line)
        .map_err(|_| Error::ChannelClosed)
}
