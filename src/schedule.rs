//! Time-of-day windows.
//!
//! The controller distinguishes nighttime (bedtime) from daytime once per
//! cycle and threads the flag through every decision.  The window is
//! expressed in whole hours and usually wraps midnight (22:00 → 08:00).
//!
//! Both boundary instants belong to the day: with the default window,
//! 22:00:00 and 08:00:00 exactly are daytime, 22:00:01 is night.

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Nighttime restriction window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NightWindow {
    /// Hour (0-23) at which night starts.  E.g. 22 = 10 PM.
    pub start_hour: u8,
    /// Hour (0-23) at which night ends.  E.g. 8 = 8 AM.
    pub end_hour: u8,
}

impl Default for NightWindow {
    fn default() -> Self {
        Self {
            start_hour: 22,
            end_hour: 8,
        }
    }
}

impl NightWindow {
    /// Check whether `t` falls inside the night window.
    pub fn is_night(&self, t: NaiveTime) -> bool {
        let secs = t.num_seconds_from_midnight();
        let start = u32::from(self.start_hour) * 3600;
        let end = u32::from(self.end_hour) * 3600;
        if self.start_hour >= self.end_hour {
            // e.g., 22..8 (overnight, wraps around midnight)
            secs > start || secs < end
        } else {
            // e.g., 1..5 (entirely after midnight)
            secs > start && secs < end
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.start_hour > 23 || self.end_hour > 23 {
            return Err(ConfigError::ValidationFailed(
                "nighttime start_hour/end_hour must be 0-23",
            ));
        }
        Ok(())
    }
}
