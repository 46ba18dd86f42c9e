//! Outbound application events.
//!
//! The [`ZoneController`](super::service::ZoneController) emits these
//! through the [`EventSink`](super::ports::EventSink) port.  Adapters on
//! the other side decide what to do with them; the default
//! [`LogEventSink`](crate::adapters::log_sink::LogEventSink) renders each
//! one as a log line.

use chrono::NaiveDateTime;

use crate::engine::Mode;
use crate::error::{ConfigError, ReadError, WriteError};

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// A cycle began.  `zones` counts zones that passed validation.
    CycleStarted {
        zones: usize,
        nighttime: bool,
        someone_home: bool,
        debug: bool,
    },

    /// The fan accepted a new speed.
    SpeedChanged {
        zone: String,
        from: u8,
        to: u8,
        trigger: String,
        reasons: Vec<String>,
        assist_mode: bool,
    },

    /// The fan speed differs from what this controller last set.
    ManualOverrideDetected {
        zone: String,
        previous_target: u8,
        current_speed: u8,
        locked_until: NaiveDateTime,
    },

    /// Debug only: the zone is locked and was skipped.
    ZoneLocked {
        zone: String,
        until: NaiveDateTime,
        current_speed: u8,
    },

    /// Debug only: the decision matched the current speed.
    NoChange { zone: String, current_speed: u8 },

    /// Debug only: full inputs and outputs of one decision.
    DecisionTrace(Box<DecisionTrace>),

    /// No mode rule matched; no mode-specific limits were applied.
    UnclassifiedMode { zone: String, rationale: &'static str },

    /// A read fell back to its sentinel.
    ReadFailure {
        zone: String,
        what: &'static str,
        error: ReadError,
    },

    /// A speed command or variable write did not take effect.
    WriteFailure {
        zone: String,
        what: &'static str,
        error: WriteError,
    },

    /// A zone failed validation and is skipped for the controller's lifetime.
    ZoneRejected { zone: String, error: ConfigError },
}

/// Everything the engine saw and decided for one zone.
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionTrace {
    pub zone: String,
    pub current_speed: u8,
    pub target_speed: u8,
    pub raw_target: i32,
    pub min_target: u8,
    pub max_target: u8,
    pub mode: Option<Mode>,
    pub matched_step: Option<usize>,

    pub room_temperature: f64,
    pub outside_feelslike: f64,
    pub ideal_temperature: f64,
    pub humidity: f64,
    pub heat_setpoint: f64,
    pub cool_setpoint: f64,
    pub temperature_delta: f64,
    pub ideal_cooler_than_outside: bool,

    pub presence: bool,
    pub nighttime: bool,
    pub hvac_running: bool,
    pub assist_mode_active: bool,

    pub reasons: Vec<String>,
}
