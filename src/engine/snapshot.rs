//! Per-cycle inputs to the decision engine.
//!
//! [`EnvironmentSnapshot`] is the read-only bundle of sensor and device
//! state for one zone; [`CycleContext`] carries what every zone shares
//! during one cycle (clock, nighttime flag, household occupancy).  Both
//! are plain data: acquiring them is the job of
//! [`crate::app::acquire`], never of the engine.

use chrono::NaiveDateTime;

use crate::config::{GlobalConfig, ZoneConfig};

/// Sentinel used for any temperature or humidity that could not be read.
pub const UNKNOWN_READING: f64 = -1.0;

// ---------------------------------------------------------------------------
// Environment snapshot
// ---------------------------------------------------------------------------

/// A point-in-time snapshot of everything the engine knows about a zone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvironmentSnapshot {
    /// Externally maintained ideal temperature for the zone.
    pub ideal_temperature: f64,
    /// Current room temperature.
    pub room_temperature: f64,
    /// Outdoor perceived temperature.
    pub outside_feelslike: f64,
    /// Room humidity (%).
    pub humidity: f64,
    /// Raw presence reading (motion / occupancy sensor).
    pub presence: bool,
    /// Thermostat reports heating or cooling in progress.
    pub hvac_running: bool,
    /// Heat setpoint; 0 means the thermostat is not heating.
    pub heat_setpoint: f64,
    /// Cool setpoint; 0 means the thermostat is not cooling.
    pub cool_setpoint: f64,
    /// Speed the fan currently reports (0 when off).
    pub current_speed: u8,
    /// `false` when `current_speed` is the read-failure sentinel.
    pub speed_reported: bool,
    /// Assist mode (e.g. whoosh) currently engaged on the fan.
    pub assist_mode_active: bool,
}

impl Default for EnvironmentSnapshot {
    /// Every field at its read-failure sentinel.
    fn default() -> Self {
        Self {
            ideal_temperature: UNKNOWN_READING,
            room_temperature: UNKNOWN_READING,
            outside_feelslike: UNKNOWN_READING,
            humidity: UNKNOWN_READING,
            presence: false,
            hvac_running: false,
            heat_setpoint: 0.0,
            cool_setpoint: 0.0,
            current_speed: 0,
            speed_reported: false,
            assist_mode_active: false,
        }
    }
}

impl EnvironmentSnapshot {
    /// Room temperature minus ideal temperature.  Positive = too warm.
    pub fn temperature_delta(&self) -> f64 {
        self.room_temperature - self.ideal_temperature
    }

    pub fn ideal_cooler_than_outside(&self) -> bool {
        self.ideal_temperature < self.outside_feelslike
    }
}

// ---------------------------------------------------------------------------
// Cycle context
// ---------------------------------------------------------------------------

/// Values computed once per cycle and shared, read-only, by every zone.
#[derive(Debug, Clone, Copy)]
pub struct CycleContext<'a> {
    pub global: &'a GlobalConfig,
    pub now: NaiveDateTime,
    pub nighttime: bool,
    pub someone_home: bool,
    pub debug: bool,
}

impl<'a> CycleContext<'a> {
    /// Build the context, evaluating the nighttime window at `now`.
    pub fn new(
        global: &'a GlobalConfig,
        now: NaiveDateTime,
        someone_home: bool,
        debug: bool,
    ) -> Self {
        Self {
            global,
            now,
            nighttime: global.nighttime.is_night(now.time()),
            someone_home,
            debug,
        }
    }

    /// At bedtime a zone with `summer_assist_at_bedtime` is assumed occupied.
    pub fn bedtime_assist(&self, zone: &ZoneConfig) -> bool {
        self.nighttime && zone.summer_assist_at_bedtime
    }

    /// Presence as every policy rule sees it: the raw reading, or the
    /// bedtime substitute.
    pub fn effective_presence(&self, zone: &ZoneConfig, snap: &EnvironmentSnapshot) -> bool {
        self.bedtime_assist(zone) || snap.presence
    }
}
