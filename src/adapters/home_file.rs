//! JSON home-state document adapter.
//!
//! [`HomeState`] implements every inbound and outbound port against a
//! single serde document: sensor readings, weather, thermostats, fans
//! and persisted variables.  The CLI loads one from disk, runs a cycle
//! and writes it back; tests and simulations build one in memory.
//!
//! ```json
//! {
//!   "someone_home": true,
//!   "sensors":  { "Sunroom.temperature": 76.5, "Sunroom.presence": true },
//!   "weather":  { "weather": { "feelslike": 91.0 } },
//!   "thermostats": [
//!     { "name": "Downstairs", "heat_setpoint": 0, "cool_setpoint": 74, "hvac_running": true }
//!   ],
//!   "fans":     { "fan-1": { "status": "on", "speed": 2 } },
//!   "variables": { "Sunroom.target_speed": "2" }
//! }
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::app::ports::{
    ActuatorPort, HousePort, SensorPort, StoragePort, ThermostatId, ThermostatPort,
};
use crate::config::{MAX_SPEED, ZoneConfig};
use crate::error::{ReadError, WriteError};

use super::memory::MemoryStore;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub feelslike: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThermostatState {
    pub name: String,
    #[serde(default)]
    pub heat_setpoint: f64,
    #[serde(default)]
    pub cool_setpoint: f64,
    #[serde(default)]
    pub hvac_running: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FanState {
    /// `"on"` or `"off"`; anything containing "off" reads as speed 0.
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default)]
    pub speed: u8,
    #[serde(default)]
    pub assist_mode: bool,
}

fn default_status() -> String {
    "on".to_owned()
}

impl FanState {
    pub fn effective_speed(&self) -> u8 {
        if self.status.to_lowercase().contains("off") {
            0
        } else {
            self.speed
        }
    }
}

/// The whole house as one document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HomeState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub someone_home: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug: Option<bool>,
    /// Readings keyed by sensor reference: numbers, booleans or strings.
    #[serde(default)]
    pub sensors: HashMap<String, Value>,
    #[serde(default)]
    pub weather: HashMap<String, WeatherReport>,
    #[serde(default)]
    pub thermostats: Vec<ThermostatState>,
    #[serde(default)]
    pub fans: HashMap<String, FanState>,
    #[serde(default)]
    pub variables: MemoryStore,
}

impl HomeState {
    fn sensor(&self, key: &str) -> Result<&Value, ReadError> {
        self.sensors.get(key).ok_or(ReadError::Missing("sensor"))
    }

    fn number(&self, key: &str, what: &'static str) -> Result<f64, ReadError> {
        match self.sensor(key)? {
            Value::Number(n) => n.as_f64().ok_or(ReadError::Malformed(what)),
            Value::String(s) => s.trim().parse().map_err(|_| ReadError::Malformed(what)),
            _ => Err(ReadError::Malformed(what)),
        }
    }

    fn fan(&self, zone: &ZoneConfig) -> Result<&FanState, ReadError> {
        self.fans.get(&zone.fan_id).ok_or(ReadError::Missing("fan"))
    }

    fn fan_mut(&mut self, zone: &ZoneConfig) -> Result<&mut FanState, WriteError> {
        self.fans
            .get_mut(&zone.fan_id)
            .ok_or(WriteError::Rejected("unknown fan"))
    }

    fn thermostat(&self, id: ThermostatId) -> Result<&ThermostatState, ReadError> {
        usize::try_from(id.0)
            .ok()
            .and_then(|i| self.thermostats.get(i))
            .ok_or(ReadError::Missing("thermostat"))
    }
}

impl SensorPort for HomeState {
    fn read_temperature(&mut self, zone: &ZoneConfig) -> Result<f64, ReadError> {
        self.number(&zone.sensors.temperature, "temperature")
    }

    fn read_humidity(&mut self, zone: &ZoneConfig) -> Result<f64, ReadError> {
        let key = zone
            .sensors
            .humidity
            .as_deref()
            .ok_or(ReadError::Missing("humidity sensor"))?;
        self.number(key, "humidity")
    }

    fn read_presence(&mut self, zone: &ZoneConfig) -> Result<bool, ReadError> {
        match self.sensor(&zone.sensors.presence)? {
            Value::Bool(b) => Ok(*b),
            Value::Number(n) => Ok(n.as_f64().is_some_and(|v| v != 0.0)),
            Value::String(s) => match s.trim().to_lowercase().as_str() {
                "on" | "true" | "detected" | "occupied" => Ok(true),
                "off" | "false" | "clear" | "unoccupied" => Ok(false),
                _ => Err(ReadError::Malformed("presence")),
            },
            _ => Err(ReadError::Malformed("presence")),
        }
    }

    fn read_outside_feelslike(&mut self, zone: &ZoneConfig) -> Result<f64, ReadError> {
        self.weather
            .get(&zone.sensors.weather)
            .map(|w| w.feelslike)
            .ok_or(ReadError::Missing("weather"))
    }

    fn read_ideal_temperature(&mut self, zone: &ZoneConfig) -> Result<f64, ReadError> {
        self.number(&zone.sensors.ideal_temperature, "ideal temperature")
    }

    fn read_trigger_description(&mut self, zone: &ZoneConfig) -> Result<String, ReadError> {
        let key = zone
            .sensors
            .trigger
            .as_deref()
            .ok_or(ReadError::Missing("trigger"))?;
        match self.sensor(key)? {
            Value::String(s) => Ok(s.clone()),
            other => Ok(other.to_string()),
        }
    }
}

impl ThermostatPort for HomeState {
    fn find_thermostat(&mut self, name: &str) -> Result<ThermostatId, ReadError> {
        self.thermostats
            .iter()
            .position(|t| t.name.eq_ignore_ascii_case(name))
            .map(|i| ThermostatId(i as u64))
            .ok_or(ReadError::LookupMiss)
    }

    fn read_heat_setpoint(&mut self, id: ThermostatId) -> Result<f64, ReadError> {
        Ok(self.thermostat(id)?.heat_setpoint)
    }

    fn read_cool_setpoint(&mut self, id: ThermostatId) -> Result<f64, ReadError> {
        Ok(self.thermostat(id)?.cool_setpoint)
    }

    fn read_hvac_running(&mut self, id: ThermostatId) -> Result<bool, ReadError> {
        Ok(self.thermostat(id)?.hvac_running)
    }
}

impl ActuatorPort for HomeState {
    fn read_current_speed(&mut self, zone: &ZoneConfig) -> Result<u8, ReadError> {
        Ok(self.fan(zone)?.effective_speed())
    }

    fn read_assist_mode_active(&mut self, zone: &ZoneConfig) -> Result<bool, ReadError> {
        Ok(self.fan(zone)?.assist_mode)
    }

    fn set_fan_speed(&mut self, zone: &ZoneConfig, speed: u8) -> Result<(), WriteError> {
        if speed > MAX_SPEED {
            return Err(WriteError::Rejected("fan speed"));
        }
        let fan = self.fan_mut(zone)?;
        fan.speed = speed;
        fan.status = if speed == 0 { "off" } else { "on" }.to_owned();
        debug!("{}: fan {} set to {}", zone.name, zone.fan_id, speed);
        Ok(())
    }

    fn set_assist_mode(&mut self, zone: &ZoneConfig, on: bool) -> Result<(), WriteError> {
        self.fan_mut(zone)?.assist_mode = on;
        Ok(())
    }
}

impl StoragePort for HomeState {
    fn read(&self, key: &str) -> Result<String, ReadError> {
        self.variables.read(key)
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), WriteError> {
        self.variables.write(key, value)
    }
}

impl HousePort for HomeState {
    fn someone_home(&mut self) -> Result<bool, ReadError> {
        self.someone_home.ok_or(ReadError::Missing("someone_home"))
    }

    fn debug_enabled(&mut self) -> Result<bool, ReadError> {
        self.debug.ok_or(ReadError::Missing("debug"))
    }
}

// ───────────────────────────────────────────────────────────────
// File round trip
// ───────────────────────────────────────────────────────────────

/// A [`HomeState`] bound to the file it came from.
pub struct HomeFile {
    path: PathBuf,
    pub state: HomeState,
}

impl HomeFile {
    pub fn load(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let path = path.into();
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("reading home state {}", path.display()))?;
        let state = serde_json::from_str(&raw)
            .with_context(|| format!("parsing home state {}", path.display()))?;
        Ok(Self { path, state })
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let raw = serde_json::to_string_pretty(&self.state).context("serializing home state")?;
        fs::write(&self.path, raw)
            .with_context(|| format!("writing home state {}", self.path.display()))?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
