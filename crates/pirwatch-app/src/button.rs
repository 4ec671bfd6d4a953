//! Button debounce and hold detection
//!
//! Classifies the raw button level, sampled once per tick, into edge events.
//! A long press fires once when the hold threshold is crossed; a short press
//! fires on release, only while step-advance semantics apply (config mode).

use pirwatch_core::Millis;

use crate::config::ConfigModeSettings;

/// Edge event produced by [`ButtonState::observe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ButtonEvent {
    #[default]
    None,
    ShortPress,
    LongPress,
}

/// Hold threshold and short-press spacing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonTiming {
    pub hold_ms: Millis,
    pub press_spacing_ms: Millis,
}

impl ButtonTiming {
    pub fn from_settings(settings: &ConfigModeSettings) -> Self {
        Self {
            hold_ms: settings.hold_ms,
            press_spacing_ms: settings.press_spacing_ms,
        }
    }
}

impl Default for ButtonTiming {
    fn default() -> Self {
        Self::from_settings(&ConfigModeSettings::default())
    }
}

/// Transient button tracking state
#[derive(Debug, Clone, Default)]
pub struct ButtonState {
    /// When the current press began (None while released)
    press_start: Option<Millis>,
    /// Current press already produced a LongPress or was consumed by a mode change
    held: bool,
    last_accepted_press: Option<Millis>,
}

impl ButtonState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_pressed(&self) -> bool {
        self.press_start.is_some()
    }

    /// Feed one raw sample
    pub fn observe(
        &mut self,
        pressed: bool,
        now: Millis,
        step_mode: bool,
        timing: &ButtonTiming,
    ) -> ButtonEvent {
        match (pressed, self.press_start) {
            (true, None) => {
                self.press_start = Some(now);
                self.held = false;
                ButtonEvent::None
            }
            (true, Some(start)) => {
                if !self.held && now.saturating_sub(start) >= timing.hold_ms {
                    self.held = true;
                    ButtonEvent::LongPress
                } else {
                    ButtonEvent::None
                }
            }
            (false, Some(_)) => {
                self.press_start = None;
                let consumed = std::mem::take(&mut self.held);
                if consumed || !step_mode {
                    return ButtonEvent::None;
                }
                match self.last_accepted_press {
                    Some(last) if now.saturating_sub(last) < timing.press_spacing_ms => {
                        tracing::trace!("Short press suppressed as bounce");
                        ButtonEvent::None
                    }
                    _ => {
                        self.last_accepted_press = Some(now);
                        ButtonEvent::ShortPress
                    }
                }
            }
            (false, None) => ButtonEvent::None,
        }
    }

    /// Forget press history on a mode transition.
    ///
    /// A press still in progress is marked consumed so its release cannot
    /// produce a short press in the new mode.
    pub fn reset(&mut self) {
        self.last_accepted_press = None;
        if self.press_start.is_some() {
            self.held = true;
        }
    }
}
