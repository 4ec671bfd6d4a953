//! Sensor domain types
//!
//! `SensorConfig` holds the two user-tunable levels. Every timing constant the
//! state machines use is derived from them on read and never stored.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Monotonic milliseconds since boot
pub type Millis = u64;

// ─────────────────────────────────────────────────────────────────
// Sensitivity
// ─────────────────────────────────────────────────────────────────

/// Motion sensitivity level (0..=4)
///
/// Higher sensitivity means a shorter debounce delay, so sessions start and
/// notifications become eligible more eagerly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Sensitivity {
    VeryLow,
    Low,
    #[default]
    Medium,
    High,
    VeryHigh,
}

impl Sensitivity {
    pub const ALL: [Sensitivity; 5] = [
        Sensitivity::VeryLow,
        Sensitivity::Low,
        Sensitivity::Medium,
        Sensitivity::High,
        Sensitivity::VeryHigh,
    ];

    /// Highest accepted level
    pub const MAX_LEVEL: u8 = 4;

    pub fn level(self) -> u8 {
        self as u8
    }

    pub fn from_level(level: u8) -> Option<Self> {
        Self::ALL.get(level as usize).copied()
    }

    /// Minimum spacing derived from sensitivity, in ms
    pub fn debounce_delay_ms(self) -> Millis {
        match self {
            Sensitivity::VeryLow => 3000,
            Sensitivity::Low => 2000,
            Sensitivity::Medium => 1000,
            Sensitivity::High => 500,
            Sensitivity::VeryHigh => 200,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Sensitivity::VeryLow => "Very Low",
            Sensitivity::Low => "Low",
            Sensitivity::Medium => "Medium",
            Sensitivity::High => "High",
            Sensitivity::VeryHigh => "Very High",
        }
    }

    /// Step by `direction` levels, wrapping around both ends
    pub fn stepped(self, direction: i8) -> Self {
        let len = Self::ALL.len() as i32;
        let idx = (self.level() as i32 + direction as i32).rem_euclid(len);
        Self::ALL[idx as usize]
    }
}

impl TryFrom<u8> for Sensitivity {
    type Error = Error;

    fn try_from(level: u8) -> Result<Self> {
        Self::from_level(level).ok_or_else(|| Error::invalid_setting("sensitivity", level, "0-4"))
    }
}

impl From<Sensitivity> for u8 {
    fn from(value: Sensitivity) -> Self {
        value.level()
    }
}

impl std::fmt::Display for Sensitivity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{} ({})", self.level(), Self::MAX_LEVEL, self.label())
    }
}

// ─────────────────────────────────────────────────────────────────
// Range
// ─────────────────────────────────────────────────────────────────

/// Detection range setting (0..=2)
///
/// Longer range means a longer cooldown before a session is declared over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Range {
    Short,
    #[default]
    Medium,
    Long,
}

impl Range {
    pub const ALL: [Range; 3] = [Range::Short, Range::Medium, Range::Long];

    /// Highest accepted level
    pub const MAX_LEVEL: u8 = 2;

    pub fn level(self) -> u8 {
        self as u8
    }

    pub fn from_level(level: u8) -> Option<Self> {
        Self::ALL.get(level as usize).copied()
    }

    /// Grace window after the last motion before a session ends, in ms
    pub fn cooldown_ms(self) -> Millis {
        match self {
            Range::Short => 5_000,
            Range::Medium => 10_000,
            Range::Long => 20_000,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Range::Short => "Short",
            Range::Medium => "Medium",
            Range::Long => "Long",
        }
    }

    /// Step by `direction` levels, wrapping around both ends
    pub fn stepped(self, direction: i8) -> Self {
        let len = Self::ALL.len() as i32;
        let idx = (self.level() as i32 + direction as i32).rem_euclid(len);
        Self::ALL[idx as usize]
    }
}

impl TryFrom<u8> for Range {
    type Error = Error;

    fn try_from(level: u8) -> Result<Self> {
        Self::from_level(level).ok_or_else(|| Error::invalid_setting("range", level, "0-2"))
    }
}

impl From<Range> for u8 {
    fn from(value: Range) -> Self {
        value.level()
    }
}

impl std::fmt::Display for Range {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{} ({})", self.level(), Self::MAX_LEVEL, self.label())
    }
}

// ─────────────────────────────────────────────────────────────────
// SensorConfig
// ─────────────────────────────────────────────────────────────────

/// Current sensitivity and range of the motion sensor
///
/// Both fields are always inside their domains: the enums cannot hold
/// anything else, and the level setters reject before mutating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SensorConfig {
    #[serde(default)]
    pub sensitivity: Sensitivity,
    #[serde(default)]
    pub range: Range,
}

impl SensorConfig {
    pub fn new(sensitivity: Sensitivity, range: Range) -> Self {
        Self { sensitivity, range }
    }

    pub fn debounce_delay_ms(&self) -> Millis {
        self.sensitivity.debounce_delay_ms()
    }

    pub fn cooldown_ms(&self) -> Millis {
        self.range.cooldown_ms()
    }

    /// Set sensitivity from an untrusted level; out-of-domain values are
    /// rejected and leave the config untouched.
    pub fn set_sensitivity_level(&mut self, level: i64) -> Result<()> {
        let parsed = u8::try_from(level)
            .ok()
            .and_then(Sensitivity::from_level)
            .ok_or_else(|| Error::invalid_setting("sensitivity", level, "0-4"))?;
        self.sensitivity = parsed;
        Ok(())
    }

    /// Set range from an untrusted level; out-of-domain values are rejected
    /// and leave the config untouched.
    pub fn set_range_level(&mut self, level: i64) -> Result<()> {
        let parsed = u8::try_from(level)
            .ok()
            .and_then(Range::from_level)
            .ok_or_else(|| Error::invalid_setting("range", level, "0-2"))?;
        self.range = parsed;
        Ok(())
    }

    /// Physical-path adjustment: wraps instead of rejecting
    pub fn step_sensitivity(&mut self, direction: i8) -> Sensitivity {
        self.sensitivity = self.sensitivity.stepped(direction);
        self.sensitivity
    }

    /// Physical-path adjustment: wraps instead of rejecting
    pub fn step_range(&mut self, direction: i8) -> Range {
        self.range = self.range.stepped(direction);
        self.range
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_medium_medium() {
        let cfg = SensorConfig::default();
        assert_eq!(cfg.sensitivity, Sensitivity::Medium);
        assert_eq!(cfg.range, Range::Medium);
        assert_eq!(cfg.debounce_delay_ms(), 1000);
        assert_eq!(cfg.cooldown_ms(), 10_000);
    }

    #[test]
    fn test_derived_tables() {
        let delays: Vec<Millis> = Sensitivity::ALL
            .iter()
            .map(|s| s.debounce_delay_ms())
            .collect();
        assert_eq!(delays, vec![3000, 2000, 1000, 500, 200]);

        let cooldowns: Vec<Millis> = Range::ALL.iter().map(|r| r.cooldown_ms()).collect();
        assert_eq!(cooldowns, vec![5000, 10_000, 20_000]);
    }

    #[test]
    fn test_derived_values_follow_mutation() {
        let mut cfg = SensorConfig::default();
        cfg.set_sensitivity_level(4).unwrap();
        cfg.set_range_level(2).unwrap();
        assert_eq!(cfg.debounce_delay_ms(), 200);
        assert_eq!(cfg.cooldown_ms(), 20_000);
    }

    #[test]
    fn test_sensitivity_wraps_upward() {
        let mut cfg = SensorConfig::new(Sensitivity::VeryLow, Range::Medium);
        let seen: Vec<u8> = (0..6).map(|_| cfg.step_sensitivity(1).level()).collect();
        assert_eq!(seen, vec![1, 2, 3, 4, 0, 1]);
    }

    #[test]
    fn test_sensitivity_wraps_downward() {
        let mut cfg = SensorConfig::new(Sensitivity::VeryLow, Range::Medium);
        let seen: Vec<u8> = (0..3).map(|_| cfg.step_sensitivity(-1).level()).collect();
        assert_eq!(seen, vec![4, 3, 2]);
    }

    #[test]
    fn test_range_wraps_both_ways() {
        let mut cfg = SensorConfig::new(Sensitivity::Medium, Range::Long);
        assert_eq!(cfg.step_range(1), Range::Short);
        assert_eq!(cfg.step_range(-1), Range::Long);
    }

    #[test]
    fn test_out_of_domain_levels_rejected_without_mutation() {
        let mut cfg = SensorConfig::default();

        let err = cfg.set_sensitivity_level(5).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidSetting {
                field: "sensitivity",
                ..
            }
        ));
        assert!(cfg.set_sensitivity_level(-1).is_err());
        assert!(cfg.set_range_level(3).is_err());
        assert!(cfg.set_range_level(i64::MAX).is_err());

        assert_eq!(cfg, SensorConfig::default());
    }

    #[test]
    fn test_serde_round_trip_uses_integer_levels() {
        let cfg = SensorConfig::new(Sensitivity::High, Range::Short);
        let text = toml::to_string(&cfg).unwrap();
        assert!(text.contains("sensitivity = 3"));
        assert!(text.contains("range = 0"));
        let back: SensorConfig = toml::from_str(&text).unwrap();
        assert_eq!(back, cfg);
    }

    #[test]
    fn test_deserialize_rejects_out_of_domain_levels() {
        assert!(toml::from_str::<SensorConfig>("sensitivity = 9\nrange = 1").is_err());
        assert!(toml::from_str::<SensorConfig>("sensitivity = 1\nrange = 5").is_err());
    }

    #[test]
    fn test_display_shows_level_and_label() {
        assert_eq!(Sensitivity::VeryHigh.to_string(), "4/4 (Very High)");
        assert_eq!(Range::Short.to_string(), "0/2 (Short)");
    }
}
