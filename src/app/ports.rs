//! Port traits: the hexagonal boundary between policy and the house.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ ZoneController (domain)
//! ```
//!
//! Driven adapters (sensors, thermostats, fans, variable storage, event
//! sinks) implement these traits.  The
//! [`ZoneController`](super::service::ZoneController) consumes them via
//! generics, so the engine never performs a read itself.
//!
//! Every read returns a typed [`ReadError`] on failure.  The controller
//! recovers each one locally with a sentinel; adapters never need to
//! invent defaults of their own.

use crate::config::{SystemConfig, ZoneConfig};
use crate::error::{ConfigError, ReadError, WriteError};

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: house → domain)
// ───────────────────────────────────────────────────────────────

/// Per-zone environmental reads.  References to concrete devices come
/// from [`ZoneConfig::sensors`].
pub trait SensorPort {
    fn read_temperature(&mut self, zone: &ZoneConfig) -> Result<f64, ReadError>;

    /// Only called for zones that configure a humidity sensor.
    fn read_humidity(&mut self, zone: &ZoneConfig) -> Result<f64, ReadError>;

    fn read_presence(&mut self, zone: &ZoneConfig) -> Result<bool, ReadError>;

    /// Outdoor perceived temperature from the zone's weather source.
    fn read_outside_feelslike(&mut self, zone: &ZoneConfig) -> Result<f64, ReadError>;

    /// Externally maintained ideal temperature for the zone.
    fn read_ideal_temperature(&mut self, zone: &ZoneConfig) -> Result<f64, ReadError>;

    /// What caused this cycle.  Used for logging only.
    fn read_trigger_description(&mut self, zone: &ZoneConfig) -> Result<String, ReadError>;
}

// ───────────────────────────────────────────────────────────────
// Thermostat port
// ───────────────────────────────────────────────────────────────

/// Live handle for a thermostat, as returned by [`ThermostatPort::find_thermostat`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ThermostatId(pub u64);

pub trait ThermostatPort {
    /// Resolve a configured thermostat name (case-insensitive) to a handle.
    /// No match is [`ReadError::LookupMiss`].
    fn find_thermostat(&mut self, name: &str) -> Result<ThermostatId, ReadError>;

    /// Heat setpoint; 0 when the thermostat is not heating.
    fn read_heat_setpoint(&mut self, id: ThermostatId) -> Result<f64, ReadError>;

    /// Cool setpoint; 0 when the thermostat is not cooling.
    fn read_cool_setpoint(&mut self, id: ThermostatId) -> Result<f64, ReadError>;

    fn read_hvac_running(&mut self, id: ThermostatId) -> Result<bool, ReadError>;
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → fan)
// ───────────────────────────────────────────────────────────────

/// The fan itself: its reported state and the commands it accepts.
pub trait ActuatorPort {
    /// Current speed, 0 when the fan reports off.
    fn read_current_speed(&mut self, zone: &ZoneConfig) -> Result<u8, ReadError>;

    fn read_assist_mode_active(&mut self, zone: &ZoneConfig) -> Result<bool, ReadError>;

    /// Command a speed in `0..=7`.
    fn set_fan_speed(&mut self, zone: &ZoneConfig, speed: u8) -> Result<(), WriteError>;

    fn set_assist_mode(&mut self, zone: &ZoneConfig, on: bool) -> Result<(), WriteError>;
}

// ───────────────────────────────────────────────────────────────
// Storage port (domain ↔ persisted variables)
// ───────────────────────────────────────────────────────────────

/// String-valued persisted variables (target speed, lock expiry,
/// last-changed timestamp).  Keys come from [`ZoneConfig::variables`].
pub trait StoragePort {
    /// Unset keys are [`ReadError::Missing`].
    fn read(&self, key: &str) -> Result<String, ReadError>;

    fn write(&mut self, key: &str, value: &str) -> Result<(), WriteError>;
}

// ───────────────────────────────────────────────────────────────
// House port (household-wide switches)
// ───────────────────────────────────────────────────────────────

/// Household-wide values refreshed once per cycle.  On failure the
/// controller falls back to [`crate::config::GlobalConfig`].
pub trait HousePort {
    fn someone_home(&mut self) -> Result<bool, ReadError>;

    fn debug_enabled(&mut self) -> Result<bool, ReadError>;
}

/// Everything a cycle needs from the house, in one bound.
pub trait HomePort: SensorPort + ThermostatPort + ActuatorPort + StoragePort + HousePort {}

impl<T> HomePort for T where
    T: SensorPort + ThermostatPort + ActuatorPort + StoragePort + HousePort
{
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port
// ───────────────────────────────────────────────────────────────

/// Loads static configuration.  Per-zone validation is left to the
/// controller so one broken zone does not reject the whole file.
pub trait ConfigPort {
    fn load(&self) -> Result<SystemConfig, ConfigError>;
}
