//! System configuration parameters
//!
//! [`SystemConfig`] bundles the process-wide [`GlobalConfig`] with one
//! [`ZoneConfig`] per fan.  It is deserialized once at startup (see
//! [`crate::adapters::config_file`]); zones are validated individually so
//! one broken zone never takes the others down.

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::schedule::NightWindow;

/// Highest speed a fan accepts.
pub const MAX_SPEED: u8 = 7;

/// Maximum number of entries in one temperature step table.
pub const MAX_TEMP_STEPS: usize = 16;

pub type TempSteps = heapless::Vec<TempStep, MAX_TEMP_STEPS>;

/// Complete configuration: global settings plus every zone.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SystemConfig {
    #[serde(default)]
    pub global: GlobalConfig,
    #[serde(default)]
    pub zones: Vec<ZoneConfig>,
    /// Zones whose entries could not be deserialized, by name.
    #[serde(skip)]
    pub rejected_zones: Vec<(String, ConfigError)>,
}

// ---------------------------------------------------------------------------
// Global settings
// ---------------------------------------------------------------------------

/// Process-wide settings shared by all zones.
///
/// `someone_home` and `debug` are refreshed from the house each cycle;
/// the values stored here are the fallbacks used when that read fails.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalConfig {
    pub someone_home: bool,
    pub debug: bool,

    // --- Bedtime ---
    pub nighttime: NightWindow,
    /// Humidity (%) above which the bedtime bonus applies.
    pub bedtime_high_humidity: f64,
    /// Outside feels-like temperature above which the bedtime bonus applies.
    pub bedtime_high_feelslike: f64,

    // --- Hysteresis ---
    /// Quiet period (minutes) imposed after every automated change.
    pub minimum_change_frequency_mins: u32,

    // --- Comfort floor (someone home, hot outside) ---
    pub night_comfort_floor_temp: f64,
    pub day_comfort_floor_temp: f64,
    pub comfort_floor_speed: u8,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            someone_home: true,
            debug: false,

            nighttime: NightWindow::default(),
            bedtime_high_humidity: 80.0,
            bedtime_high_feelslike: 70.0,

            minimum_change_frequency_mins: 2,

            night_comfort_floor_temp: 69.0,
            day_comfort_floor_temp: 80.0,
            comfort_floor_speed: 3,
        }
    }
}

impl GlobalConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.nighttime.validate()?;
        if self.comfort_floor_speed > MAX_SPEED {
            return Err(ConfigError::ValidationFailed(
                "comfort_floor_speed must be 0-7",
            ));
        }
        if self.minimum_change_frequency_mins > 24 * 60 {
            return Err(ConfigError::ValidationFailed(
                "minimum_change_frequency_mins must be at most one day",
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Temperature steps
// ---------------------------------------------------------------------------

/// One row of a zone's temperature step table.
///
/// An absent bound is open (−∞ / +∞).  Matching semantics live in
/// [`crate::engine::steps`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TempStep {
    #[serde(default)]
    pub min_temp: Option<f64>,
    #[serde(default)]
    pub max_temp: Option<f64>,
    /// Added to the running target speed when matched.
    #[serde(default)]
    pub impact: Option<i8>,
    /// Overrides the zone minimum for this cycle when matched.
    #[serde(default)]
    pub min_target: Option<u8>,
    /// Overrides the zone maximum for this cycle when matched.
    #[serde(default)]
    pub max_target: Option<u8>,
}

impl TempStep {
    pub const fn new(
        min_temp: Option<f64>,
        max_temp: Option<f64>,
        impact: Option<i8>,
        min_target: Option<u8>,
        max_target: Option<u8>,
    ) -> Self {
        Self {
            min_temp,
            max_temp,
            impact,
            min_target,
            max_target,
        }
    }
}

// ---------------------------------------------------------------------------
// Zones
// ---------------------------------------------------------------------------

/// Where a zone's live inputs come from.  Interpretation of the strings
/// is up to the adapter (device names, ids, topic paths ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorRefs {
    pub temperature: String,
    pub presence: String,
    pub weather: String,
    pub ideal_temperature: String,
    #[serde(default)]
    pub humidity: Option<String>,
    /// Variable describing what triggered the current cycle.
    #[serde(default)]
    pub trigger: Option<String>,
}

/// Keys of the variables this controller persists for a zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableRefs {
    pub target_speed: String,
    pub locked_until: String,
    pub last_changed: String,
}

/// Static per-zone configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneConfig {
    pub name: String,
    /// Actuator id of the fan.
    pub fan_id: String,
    /// Thermostat name, resolved case-insensitively each time the cache misses.
    pub thermostat: String,
    pub sensors: SensorRefs,
    pub variables: VariableRefs,

    #[serde(default)]
    pub min_target: u8,
    #[serde(default = "default_max_target")]
    pub max_target: u8,

    /// Outside feels-like temperature above which the fan never drops below 1.
    #[serde(default = "default_always_on_temp")]
    pub always_on_outside_temp: f64,
    /// Room temperature above which the fan never drops below 1.
    #[serde(default = "default_always_on_temp")]
    pub always_on_inside_temp: f64,

    /// Static maximum speed at bedtime.  `None` falls back to `max_target`.
    #[serde(default)]
    pub bedtime_max_speed: Option<u8>,

    /// How long a detected manual change suspends automation.
    #[serde(default = "default_lock_minutes")]
    pub lock_minutes: u32,
    #[serde(default)]
    pub reset_lock_when_no_presence: bool,
    #[serde(default)]
    pub enable_assist_mode_when_present: bool,
    /// Treat the room as occupied at night and apply the bedtime bonus.
    #[serde(default)]
    pub summer_assist_at_bedtime: bool,

    #[serde(default)]
    pub temp_steps: TempSteps,
    /// Replaces `temp_steps` during nighttime when present.
    #[serde(default)]
    pub night_temp_steps: Option<TempSteps>,
}

fn default_max_target() -> u8 {
    MAX_SPEED
}

fn default_always_on_temp() -> f64 {
    88.0
}

fn default_lock_minutes() -> u32 {
    60
}

impl ZoneConfig {
    /// A zone with default policy and references derived from its name
    /// (`"<name>.temperature"`, `"<name>.target_speed"`, ...).
    pub fn new(name: &str, fan_id: &str, thermostat: &str) -> Self {
        let key = |suffix: &str| format!("{name}.{suffix}");
        Self {
            name: name.to_owned(),
            fan_id: fan_id.to_owned(),
            thermostat: thermostat.to_owned(),
            sensors: SensorRefs {
                temperature: key("temperature"),
                presence: key("presence"),
                weather: "weather".to_owned(),
                ideal_temperature: key("ideal_temperature"),
                humidity: Some(key("humidity")),
                trigger: Some(key("trigger")),
            },
            variables: VariableRefs {
                target_speed: key("target_speed"),
                locked_until: key("locked_until"),
                last_changed: key("last_changed"),
            },
            min_target: 0,
            max_target: default_max_target(),
            always_on_outside_temp: default_always_on_temp(),
            always_on_inside_temp: default_always_on_temp(),
            bedtime_max_speed: None,
            lock_minutes: default_lock_minutes(),
            reset_lock_when_no_presence: false,
            enable_assist_mode_when_present: false,
            summer_assist_at_bedtime: false,
            temp_steps: TempSteps::new(),
            night_temp_steps: None,
        }
    }

    /// The step table in force for this cycle.
    pub fn steps_for(&self, nighttime: bool) -> &[TempStep] {
        match (&self.night_temp_steps, nighttime) {
            (Some(night), true) => night,
            _ => &self.temp_steps,
        }
    }
}

/// Structural validation for one zone.  Called at load time.
pub fn validate_zone(zone: &ZoneConfig) -> Result<(), ConfigError> {
    if zone.name.trim().is_empty() {
        return Err(ConfigError::ValidationFailed("zone name must not be empty"));
    }
    if zone.fan_id.trim().is_empty() {
        return Err(ConfigError::ValidationFailed("fan_id must not be empty"));
    }
    if zone.thermostat.trim().is_empty() {
        return Err(ConfigError::ValidationFailed(
            "thermostat name must not be empty",
        ));
    }
    let vars = &zone.variables;
    if [&vars.target_speed, &vars.locked_until, &vars.last_changed]
        .iter()
        .any(|k| k.trim().is_empty())
    {
        return Err(ConfigError::ValidationFailed(
            "persisted variable keys must not be empty",
        ));
    }
    if zone.max_target > MAX_SPEED || zone.min_target > MAX_SPEED {
        return Err(ConfigError::ValidationFailed(
            "min_target/max_target must be 0-7",
        ));
    }
    if zone.min_target > zone.max_target {
        return Err(ConfigError::ValidationFailed(
            "min_target must not exceed max_target",
        ));
    }
    if zone.bedtime_max_speed.is_some_and(|s| s > MAX_SPEED) {
        return Err(ConfigError::ValidationFailed(
            "bedtime_max_speed must be 0-7",
        ));
    }
    validate_steps(&zone.temp_steps)?;
    if let Some(night) = &zone.night_temp_steps {
        validate_steps(night)?;
    }
    warn_on_step_gaps(&zone.name, &zone.temp_steps);
    if let Some(night) = &zone.night_temp_steps {
        warn_on_step_gaps(&zone.name, night);
    }
    Ok(())
}

fn validate_steps(steps: &[TempStep]) -> Result<(), ConfigError> {
    for step in steps {
        match (step.min_temp, step.max_temp) {
            (None, None) => {
                return Err(ConfigError::ValidationFailed(
                    "temp step must bound at least one side",
                ));
            }
            (Some(lo), Some(hi)) if !(lo < hi) => {
                return Err(ConfigError::ValidationFailed(
                    "temp step min_temp must be below max_temp",
                ));
            }
            (lo, hi) if lo.is_some_and(f64::is_nan) || hi.is_some_and(f64::is_nan) => {
                return Err(ConfigError::ValidationFailed("temp step bound is NaN"));
            }
            _ => {}
        }
        if step.min_target.is_some_and(|s| s > MAX_SPEED)
            || step.max_target.is_some_and(|s| s > MAX_SPEED)
        {
            return Err(ConfigError::ValidationFailed(
                "temp step min_target/max_target must be 0-7",
            ));
        }
        if step.impact.is_some_and(|i| i.unsigned_abs() > MAX_SPEED) {
            return Err(ConfigError::ValidationFailed(
                "temp step impact must be within -7..=7",
            ));
        }
    }
    Ok(())
}

/// Adjacent steps are expected to share a boundary.  Table order is
/// authoritative either way, so mismatches only warn.
fn warn_on_step_gaps(zone: &str, steps: &[TempStep]) {
    for pair in steps.windows(2) {
        let (prev, next) = (&pair[0], &pair[1]);
        if prev.max_temp != next.min_temp {
            warn!(
                "{}: temp steps not contiguous ({:?} then {:?})",
                zone, prev.max_temp, next.min_temp
            );
        }
    }
}
