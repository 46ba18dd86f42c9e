//! Per-zone input acquisition.
//!
//! Builds the [`EnvironmentSnapshot`] and [`LockState`] the engine needs
//! from the collaborator ports.  Every failed read is replaced by its
//! sentinel and reported as [`AppEvent::ReadFailure`]:
//!
//! | Input                         | Sentinel          |
//! |-------------------------------|-------------------|
//! | temperatures, humidity        | `-1.0`            |
//! | presence, HVAC, assist mode   | `false`           |
//! | heat / cool setpoints         | `0.0`             |
//! | current speed                 | `0`               |
//! | trigger description           | `"unknown event"` |
//! | lock / last-changed / target  | absent            |
//!
//! A lock variable that was never written is not a failure and is not
//! reported.
//!
//! A zone with no humidity or trigger reference configured gets the
//! sentinel silently.

use log::debug;

use crate::config::ZoneConfig;
use crate::engine::snapshot::UNKNOWN_READING;
use crate::engine::{EnvironmentSnapshot, LockState};
use crate::error::ReadError;
use crate::timestamp;

use super::events::AppEvent;
use super::ports::{ActuatorPort, EventSink, SensorPort, StoragePort, ThermostatPort};
use super::thermostat::CachedThermostats;

pub const UNKNOWN_TRIGGER: &str = "unknown event";

/// Unwrap a read, falling back to `sentinel` and reporting the failure.
fn or_sentinel<T>(
    result: Result<T, ReadError>,
    sentinel: T,
    zone: &ZoneConfig,
    what: &'static str,
    sink: &mut impl EventSink,
) -> T {
    match result {
        Ok(v) => v,
        Err(error) => {
            sink.emit(&AppEvent::ReadFailure {
                zone: zone.name.clone(),
                what,
                error,
            });
            sentinel
        }
    }
}

/// Read every sensor and device value for `zone`.
pub fn read_snapshot<H>(
    home: &mut H,
    thermostats: &mut CachedThermostats,
    zone: &ZoneConfig,
    sink: &mut impl EventSink,
) -> EnvironmentSnapshot
where
    H: SensorPort + ThermostatPort + ActuatorPort,
{
    let current_speed = home.read_current_speed(zone);
    let mut snap = EnvironmentSnapshot {
        ideal_temperature: or_sentinel(
            home.read_ideal_temperature(zone),
            UNKNOWN_READING,
            zone,
            "ideal temperature",
            sink,
        ),
        room_temperature: or_sentinel(
            home.read_temperature(zone),
            UNKNOWN_READING,
            zone,
            "temperature",
            sink,
        ),
        outside_feelslike: or_sentinel(
            home.read_outside_feelslike(zone),
            UNKNOWN_READING,
            zone,
            "outside feels-like",
            sink,
        ),
        presence: or_sentinel(home.read_presence(zone), false, zone, "presence", sink),
        speed_reported: current_speed.is_ok(),
        current_speed: or_sentinel(current_speed, 0, zone, "current speed", sink),
        assist_mode_active: or_sentinel(
            home.read_assist_mode_active(zone),
            false,
            zone,
            "assist mode",
            sink,
        ),
        ..EnvironmentSnapshot::default()
    };

    if zone.sensors.humidity.is_some() {
        snap.humidity =
            or_sentinel(home.read_humidity(zone), UNKNOWN_READING, zone, "humidity", sink);
    }

    match thermostats.resolve(home, &zone.thermostat) {
        Ok(id) => {
            let heat = home.read_heat_setpoint(id);
            let cool = home.read_cool_setpoint(id);
            let running = home.read_hvac_running(id);
            // A vanished device invalidates the cached handle.
            if [heat.as_ref().err(), cool.as_ref().err(), running.as_ref().err()]
                .iter()
                .flatten()
                .any(|e| matches!(e, ReadError::Missing(_)))
            {
                thermostats.forget(&zone.thermostat);
            }
            snap.heat_setpoint = or_sentinel(heat, 0.0, zone, "heat setpoint", sink);
            snap.cool_setpoint = or_sentinel(cool, 0.0, zone, "cool setpoint", sink);
            snap.hvac_running = or_sentinel(running, false, zone, "hvac running", sink);
        }
        Err(error) => {
            sink.emit(&AppEvent::ReadFailure {
                zone: zone.name.clone(),
                what: "thermostat",
                error,
            });
        }
    }

    snap
}

/// What caused this cycle, for narration only.
pub fn read_trigger(
    home: &mut impl SensorPort,
    zone: &ZoneConfig,
    sink: &mut impl EventSink,
) -> String {
    if zone.sensors.trigger.is_none() {
        return UNKNOWN_TRIGGER.to_owned();
    }
    let trigger = or_sentinel(
        home.read_trigger_description(zone),
        String::new(),
        zone,
        "trigger",
        sink,
    );
    if trigger.trim().is_empty() {
        UNKNOWN_TRIGGER.to_owned()
    } else {
        trigger
    }
}

/// Read the persisted lock bookkeeping.  An absent variable is the
/// normal "never locked, never changed" state and is only logged at
/// debug level; a malformed one is reported.  Either way the field reads
/// as absent, which the tracker treats as unlocked.
pub fn read_lock_state(
    store: &impl StoragePort,
    zone: &ZoneConfig,
    sink: &mut impl EventSink,
) -> LockState {
    let vars = &zone.variables;

    let locked_until = store
        .read(&vars.locked_until)
        .and_then(|s| timestamp::parse(&s));
    let last_changed = store
        .read(&vars.last_changed)
        .and_then(|s| timestamp::parse(&s));
    let previous = store.read(&vars.target_speed).and_then(|s| parse_speed(&s));

    LockState {
        locked_until: lock_var(locked_until, zone, "locked until", sink),
        last_changed: lock_var(last_changed, zone, "last changed", sink),
        previous_target_speed: lock_var(previous, zone, "target speed", sink),
    }
}

fn lock_var<T>(
    result: Result<T, ReadError>,
    zone: &ZoneConfig,
    what: &'static str,
    sink: &mut impl EventSink,
) -> Option<T> {
    match result {
        Ok(v) => Some(v),
        Err(ReadError::Missing(_)) => {
            debug!("{}: no {} persisted yet", zone.name, what);
            None
        }
        Err(error) => {
            sink.emit(&AppEvent::ReadFailure {
                zone: zone.name.clone(),
                what,
                error,
            });
            None
        }
    }
}

/// Persisted speeds are small integers; accept `"3"` and `"3.0"`.
pub fn parse_speed(s: &str) -> Result<u8, ReadError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(ReadError::Missing("target speed"));
    }
    let speed = match s.parse::<u8>() {
        Ok(v) => v,
        Err(_) => {
            let f: f64 = s.parse().map_err(|_| ReadError::Malformed("target speed"))?;
            if f.fract() != 0.0 || !(0.0..=255.0).contains(&f) {
                return Err(ReadError::Malformed("target speed"));
            }
            f as u8
        }
    };
    if speed > crate::config::MAX_SPEED {
        return Err(ReadError::Malformed("target speed"));
    }
    Ok(speed)
}
