//! Simulated hardware for headless mode
//!
//! Inputs are shared atomics flipped by the stdin reader; outputs are written
//! to stdout as [`HeadlessEvent`]s.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use pirwatch_app::{IndicatorPattern, IndicatorSink, NotificationTransport, RawInput, Watchdog};
use pirwatch_core::prelude::*;
use pirwatch_core::Millis;

use super::HeadlessEvent;

/// Input lines accepted on stdin
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimLine {
    Motion(bool),
    Button(bool),
    Network(bool),
    Command(String),
    Quit,
}

impl SimLine {
    /// Parse one stdin line; `None` for blank or unrecognised input
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if let Some(text) = line.strip_prefix("cmd ") {
            let text = text.trim();
            return (!text.is_empty()).then(|| Self::Command(text.to_string()));
        }

        let mut words = line.split_whitespace();
        let line = match (words.next()?, words.next(), words.next()) {
            ("motion", Some("on"), None) => Self::Motion(true),
            ("motion", Some("off"), None) => Self::Motion(false),
            ("button", Some("down"), None) => Self::Button(true),
            ("button", Some("up"), None) => Self::Button(false),
            ("net", Some("up"), None) => Self::Network(true),
            ("net", Some("down"), None) => Self::Network(false),
            ("q" | "quit", None, None) => Self::Quit,
            _ => return None,
        };
        Some(line)
    }
}

/// Pin and link levels shared between the stdin reader and the engine
#[derive(Debug)]
pub struct SimulatedHardware {
    motion: AtomicBool,
    button: AtomicBool,
    network: AtomicBool,
}

impl SimulatedHardware {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            motion: AtomicBool::new(false),
            button: AtomicBool::new(false),
            network: AtomicBool::new(true),
        })
    }

    /// Apply an input line; returns false for lines the hardware does not own
    pub fn apply(&self, line: &SimLine) -> bool {
        let (pin, level, name) = match line {
            SimLine::Motion(on) => (&self.motion, *on, "motion"),
            SimLine::Button(down) => (&self.button, *down, "button"),
            SimLine::Network(up) => (&self.network, *up, "network"),
            SimLine::Command(_) | SimLine::Quit => return false,
        };
        pin.store(level, Ordering::SeqCst);
        debug!("Simulated {} -> {}", name, level);
        true
    }

    pub fn network_up(&self) -> bool {
        self.network.load(Ordering::SeqCst)
    }
}

/// Motion sensor and button pins
pub struct SimulatedInput {
    hardware: Arc<SimulatedHardware>,
}

impl SimulatedInput {
    pub fn new(hardware: Arc<SimulatedHardware>) -> Self {
        Self { hardware }
    }
}

impl RawInput for SimulatedInput {
    fn motion_state(&mut self) -> bool {
        self.hardware.motion.load(Ordering::SeqCst)
    }

    fn button_pressed(&mut self) -> bool {
        self.hardware.button.load(Ordering::SeqCst)
    }
}

/// Transport that prints every send as a `message_sent` event
pub struct ConsoleTransport {
    hardware: Arc<SimulatedHardware>,
}

impl ConsoleTransport {
    pub fn new(hardware: Arc<SimulatedHardware>) -> Self {
        Self { hardware }
    }
}

impl NotificationTransport for ConsoleTransport {
    fn is_available(&self) -> bool {
        self.hardware.network_up()
    }

    fn send(&mut self, text: &str) -> Result<()> {
        if !self.hardware.network_up() {
            return Err(Error::transport("network is down"));
        }
        HeadlessEvent::message_sent(text).emit();
        Ok(())
    }
}

/// Indicator LED rendered as `indicator` events
#[derive(Debug, Default)]
pub struct ConsoleIndicator;

impl IndicatorSink for ConsoleIndicator {
    fn show_pattern(&mut self, pattern: IndicatorPattern, count: u32) {
        HeadlessEvent::indicator(pattern, count).emit();
    }
}

/// Software watchdog that reports feeds arriving after the timeout
#[derive(Debug)]
pub struct SoftWatchdog {
    timeout: Duration,
    last_feed: Option<Instant>,
}

impl SoftWatchdog {
    pub fn new(timeout_ms: Millis) -> Self {
        Self {
            timeout: Duration::from_millis(timeout_ms),
            last_feed: None,
        }
    }

    /// Gap since the previous feed when it exceeded the timeout
    fn late_by(&self, now: Instant) -> Option<Duration> {
        let gap = now.duration_since(self.last_feed?);
        (gap > self.timeout).then_some(gap)
    }
}

impl Watchdog for SoftWatchdog {
    fn feed(&mut self) {
        let now = Instant::now();
        if let Some(gap) = self.late_by(now) {
            let gap_ms = u64::try_from(gap.as_millis()).unwrap_or(u64::MAX);
            warn!("Watchdog fed {}ms after the previous feed", gap_ms);
            HeadlessEvent::watchdog_late(gap_ms).emit();
        }
        self.last_feed = Some(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pin_lines() {
        assert_eq!(SimLine::parse("motion on"), Some(SimLine::Motion(true)));
        assert_eq!(SimLine::parse("  motion off "), Some(SimLine::Motion(false)));
        assert_eq!(SimLine::parse("button down"), Some(SimLine::Button(true)));
        assert_eq!(SimLine::parse("button up"), Some(SimLine::Button(false)));
        assert_eq!(SimLine::parse("net down"), Some(SimLine::Network(false)));
        assert_eq!(SimLine::parse("quit"), Some(SimLine::Quit));
    }

    #[test]
    fn test_parse_command_keeps_text() {
        assert_eq!(
            SimLine::parse("cmd /sensitivity 3"),
            Some(SimLine::Command("/sensitivity 3".to_string()))
        );
        assert_eq!(SimLine::parse("cmd   "), None);
    }

    #[test]
    fn test_parse_rejects_unknown_lines() {
        assert_eq!(SimLine::parse(""), None);
        assert_eq!(SimLine::parse("motion"), None);
        assert_eq!(SimLine::parse("motion sideways"), None);
        assert_eq!(SimLine::parse("quit now"), None);
    }

    #[test]
    fn test_hardware_applies_pin_lines() {
        let hardware = SimulatedHardware::new();
        let mut input = SimulatedInput::new(hardware.clone());
        assert!(!input.motion_state());

        assert!(hardware.apply(&SimLine::Motion(true)));
        assert!(hardware.apply(&SimLine::Button(true)));
        assert!(input.motion_state());
        assert!(input.button_pressed());

        assert!(!hardware.apply(&SimLine::Command("/status".to_string())));
    }

    #[test]
    fn test_transport_follows_network() {
        let hardware = SimulatedHardware::new();
        let mut transport = ConsoleTransport::new(hardware.clone());
        assert!(transport.is_available());

        hardware.apply(&SimLine::Network(false));
        assert!(!transport.is_available());
        let err = transport.send("hello").unwrap_err();
        assert!(matches!(err, Error::Transport { .. }));
    }

    #[test]
    fn test_watchdog_late_only_after_timeout() {
        let mut watchdog = SoftWatchdog::new(1_000);
        let start = Instant::now();
        assert_eq!(watchdog.late_by(start), None);

        watchdog.last_feed = Some(start);
        assert_eq!(watchdog.late_by(start + Duration::from_millis(900)), None);
        assert_eq!(
            watchdog.late_by(start + Duration::from_millis(1_500)),
            Some(Duration::from_millis(1_500))
        );
    }
}
