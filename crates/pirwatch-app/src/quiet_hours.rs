//! Quiet-hours window
//!
//! The window is `[start_hour, end_hour)` and wraps midnight when
//! `start_hour > end_hour`. Unknown wall time is never quiet.

use chrono::{NaiveDateTime, Timelike};

use crate::config::QuietHoursSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuietHours {
    pub enabled: bool,
    pub start_hour: u32,
    pub end_hour: u32,
}

impl QuietHours {
    pub fn from_settings(settings: &QuietHoursSettings) -> Self {
        Self {
            enabled: settings.enabled,
            start_hour: settings.start_hour,
            end_hour: settings.end_hour,
        }
    }

    pub fn is_quiet(&self, wall_time: Option<NaiveDateTime>) -> bool {
        let Some(time) = wall_time else {
            return false;
        };
        self.enabled && self.contains_hour(time.hour())
    }

    fn contains_hour(&self, hour: u32) -> bool {
        if self.start_hour <= self.end_hour {
            hour >= self.start_hour && hour < self.end_hour
        } else {
            hour >= self.start_hour || hour < self.end_hour
        }
    }
}

impl Default for QuietHours {
    fn default() -> Self {
        Self::from_settings(&QuietHoursSettings::default())
    }
}
