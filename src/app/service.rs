//! Zone controller: the hexagonal core.
//!
//! [`ZoneController`] owns the validated zone list, the decision engine
//! and the thermostat cache.  All I/O flows through port traits passed in
//! at call sites, so a full cycle can be driven by mock adapters.
//!
//! ```text
//!   SensorPort ─┐
//! ThermostatPort ┼─▶ ┌────────────────────────┐ ──▶ EventSink
//!    HousePort ─┘    │     ZoneController      │
//!  StoragePort ◀───▶ │  lock gate · decision   │
//! ActuatorPort ◀──── └────────────────────────┘
//! ```
//!
//! Zones are processed strictly in order.  A failure in one zone is
//! reported and the cycle moves on to the next.

use chrono::NaiveDateTime;
use log::{debug, info, warn};

use crate::config::{GlobalConfig, SystemConfig, ZoneConfig, validate_zone};
use crate::engine::{
    CycleContext, Decision, DecisionEngine, EnvironmentSnapshot, LockObservation, LockState,
    LockVerdict, OverrideLockTracker,
};
use crate::error::{self, ConfigError, ReadError};
use crate::timestamp;

use super::acquire::{read_lock_state, read_snapshot, read_trigger};
use super::events::{AppEvent, DecisionTrace};
use super::ports::{ConfigPort, EventSink, HomePort, StoragePort};
use super::thermostat::CachedThermostats;

/// Pseudo-zone name used for household-wide read failures.
const HOUSEHOLD: &str = "household";

/// What happened to one zone during a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneOutcome {
    /// Skipped: manual override lock or post-change quiet period.
    Locked { until: NaiveDateTime },
    /// The decision matched the current speed.
    Unchanged { speed: u8 },
    /// The fan accepted a new speed.
    Changed { from: u8, to: u8, assist_mode: bool },
    /// The fan refused the new speed; nothing was persisted.
    CommandFailed { target: u8 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneReport {
    pub zone: String,
    pub outcome: ZoneOutcome,
}

// ───────────────────────────────────────────────────────────────
// ZoneController
// ───────────────────────────────────────────────────────────────

pub struct ZoneController {
    global: GlobalConfig,
    zones: Vec<ZoneConfig>,
    rejected: Vec<(String, ConfigError)>,
    engine: DecisionEngine,
    thermostats: CachedThermostats,
    cycle_count: u64,
}

impl ZoneController {
    /// Validate the configuration.  An invalid global section is fatal;
    /// an invalid zone is set aside and reported by [`start`](Self::start).
    pub fn new(config: SystemConfig) -> Result<Self, ConfigError> {
        config.global.validate()?;

        let mut zones = Vec::with_capacity(config.zones.len());
        let mut rejected = config.rejected_zones;
        for zone in config.zones {
            match validate_zone(&zone) {
                Ok(()) => zones.push(zone),
                Err(e) => rejected.push((zone.name, e)),
            }
        }

        Ok(Self {
            global: config.global,
            zones,
            rejected,
            engine: DecisionEngine::new(),
            thermostats: CachedThermostats::new(),
            cycle_count: 0,
        })
    }

    /// Load the configuration from `source` and validate it.
    pub fn load(source: &impl ConfigPort) -> error::Result<Self> {
        Ok(Self::new(source.load()?)?)
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Report rejected zones.  Call once before the first cycle.
    pub fn start(&mut self, sink: &mut impl EventSink) {
        for (zone, error) in &self.rejected {
            sink.emit(&AppEvent::ZoneRejected {
                zone: zone.clone(),
                error: *error,
            });
        }
        info!(
            "ZoneController started: {} zone(s), {} rejected",
            self.zones.len(),
            self.rejected.len()
        );
    }

    // ── Per-cycle orchestration ───────────────────────────────

    /// Run one full cycle over every valid zone.
    ///
    /// `home` satisfies every inbound and outbound port at once, which
    /// keeps the borrow simple while the port boundary stays explicit.
    pub fn run_cycle(
        &mut self,
        home: &mut impl HomePort,
        sink: &mut impl EventSink,
        now: NaiveDateTime,
    ) -> Vec<ZoneReport> {
        self.cycle_count += 1;

        let someone_home =
            read_household(home.someone_home(), self.global.someone_home, "someone home", sink);
        let debug = read_household(home.debug_enabled(), self.global.debug, "debug", sink);
        let cycle = CycleContext::new(&self.global, now, someone_home, debug);

        sink.emit(&AppEvent::CycleStarted {
            zones: self.zones.len(),
            nighttime: cycle.nighttime,
            someone_home,
            debug,
        });

        let mut reports = Vec::with_capacity(self.zones.len());
        for zone in &self.zones {
            let outcome = run_zone(&self.engine, &mut self.thermostats, zone, &cycle, home, sink);
            reports.push(ZoneReport {
                zone: zone.name.clone(),
                outcome,
            });
        }
        reports
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn zones(&self) -> &[ZoneConfig] {
        &self.zones
    }

    pub fn rejected(&self) -> &[(String, ConfigError)] {
        &self.rejected
    }

    pub fn global(&self) -> &GlobalConfig {
        &self.global
    }

    pub fn cycle_count(&self) -> u64 {
        self.cycle_count
    }
}

// ───────────────────────────────────────────────────────────────
// Per-zone pipeline
// ───────────────────────────────────────────────────────────────

fn read_household(
    result: Result<bool, ReadError>,
    fallback: bool,
    what: &'static str,
    sink: &mut impl EventSink,
) -> bool {
    result.unwrap_or_else(|error| {
        sink.emit(&AppEvent::ReadFailure {
            zone: HOUSEHOLD.to_owned(),
            what,
            error,
        });
        fallback
    })
}

fn run_zone(
    engine: &DecisionEngine,
    thermostats: &mut CachedThermostats,
    zone: &ZoneConfig,
    cycle: &CycleContext<'_>,
    home: &mut impl HomePort,
    sink: &mut impl EventSink,
) -> ZoneOutcome {
    let snap = read_snapshot(home, thermostats, zone, sink);

    // 1. Manual override detection and lock gate.
    let before = read_lock_state(&*home, zone, sink);
    let mut state = before;
    let tracker = OverrideLockTracker::new(cycle.global, zone);
    let verdict = tracker.evaluate(
        &mut state,
        &LockObservation {
            now: cycle.now,
            current_speed: snap.current_speed,
            speed_reported: snap.speed_reported,
            presence: cycle.effective_presence(zone, &snap),
            assist_mode_active: snap.assist_mode_active,
        },
    );
    persist_lock_changes(home, zone, &before, &state, sink);

    if let Some(m) = verdict.manual_override() {
        sink.emit(&AppEvent::ManualOverrideDetected {
            zone: zone.name.clone(),
            previous_target: m.previous_target,
            current_speed: m.current_speed,
            locked_until: m.locked_until,
        });
    }

    if let LockVerdict::Locked { until, .. } = verdict {
        if cycle.debug {
            sink.emit(&AppEvent::ZoneLocked {
                zone: zone.name.clone(),
                until,
                current_speed: snap.current_speed,
            });
        }
        return ZoneOutcome::Locked { until };
    }

    // 2. Decide.
    let decision = engine.decide(zone, &snap, cycle);
    if decision.mode.is_none() {
        sink.emit(&AppEvent::UnclassifiedMode {
            zone: zone.name.clone(),
            rationale: decision.mode_rationale,
        });
    }

    // 3. Apply.
    let outcome = if decision.target_speed == snap.current_speed {
        if cycle.debug {
            sink.emit(&AppEvent::NoChange {
                zone: zone.name.clone(),
                current_speed: snap.current_speed,
            });
        }
        ZoneOutcome::Unchanged {
            speed: snap.current_speed,
        }
    } else {
        apply_change(home, zone, cycle, &snap, &decision, sink)
    };

    if cycle.debug {
        sink.emit(&AppEvent::DecisionTrace(Box::new(trace(zone, cycle, &snap, &decision))));
    }
    outcome
}

/// Command the new speed, then persist it.  Nothing is persisted when
/// the fan refuses the command.
fn apply_change(
    home: &mut impl HomePort,
    zone: &ZoneConfig,
    cycle: &CycleContext<'_>,
    snap: &EnvironmentSnapshot,
    decision: &Decision,
    sink: &mut impl EventSink,
) -> ZoneOutcome {
    let target = decision.target_speed;
    let trigger = read_trigger(home, zone, sink);

    if let Err(error) = home.set_fan_speed(zone, target) {
        sink.emit(&AppEvent::WriteFailure {
            zone: zone.name.clone(),
            what: "fan speed",
            error,
        });
        return ZoneOutcome::CommandFailed { target };
    }

    write_var(home, zone, &zone.variables.target_speed, &target.to_string(), "target speed", sink);
    write_var(
        home,
        zone,
        &zone.variables.last_changed,
        &timestamp::format(cycle.now),
        "last changed",
        sink,
    );

    let mut assist_mode = false;
    if decision.assist_mode_requested {
        match home.set_assist_mode(zone, true) {
            Ok(()) => assist_mode = true,
            Err(error) => sink.emit(&AppEvent::WriteFailure {
                zone: zone.name.clone(),
                what: "assist mode",
                error,
            }),
        }
    }

    sink.emit(&AppEvent::SpeedChanged {
        zone: zone.name.clone(),
        from: snap.current_speed,
        to: target,
        trigger,
        reasons: decision.reasons.clone(),
        assist_mode,
    });

    ZoneOutcome::Changed {
        from: snap.current_speed,
        to: target,
        assist_mode,
    }
}

fn persist_lock_changes(
    store: &mut impl StoragePort,
    zone: &ZoneConfig,
    before: &LockState,
    after: &LockState,
    sink: &mut impl EventSink,
) {
    if after.locked_until != before.locked_until {
        if let Some(until) = after.locked_until {
            let raw = timestamp::format(until);
            write_var(store, zone, &zone.variables.locked_until, &raw, "locked until", sink);
        }
    }
    if after.previous_target_speed != before.previous_target_speed {
        if let Some(speed) = after.previous_target_speed {
            let raw = speed.to_string();
            write_var(store, zone, &zone.variables.target_speed, &raw, "target speed", sink);
        }
    }
}

fn write_var(
    store: &mut impl StoragePort,
    zone: &ZoneConfig,
    key: &str,
    value: &str,
    what: &'static str,
    sink: &mut impl EventSink,
) {
    match store.write(key, value) {
        Ok(()) => debug!("{}: {} = {}", zone.name, key, value),
        Err(error) => {
            warn!("{}: could not persist {}", zone.name, key);
            sink.emit(&AppEvent::WriteFailure {
                zone: zone.name.clone(),
                what,
                error,
            });
        }
    }
}

fn trace(
    zone: &ZoneConfig,
    cycle: &CycleContext<'_>,
    snap: &EnvironmentSnapshot,
    decision: &Decision,
) -> DecisionTrace {
    DecisionTrace {
        zone: zone.name.clone(),
        current_speed: snap.current_speed,
        target_speed: decision.target_speed,
        raw_target: decision.raw_target,
        min_target: decision.min_target,
        max_target: decision.max_target,
        mode: decision.mode,
        matched_step: decision.matched_step,
        room_temperature: snap.room_temperature,
        outside_feelslike: snap.outside_feelslike,
        ideal_temperature: snap.ideal_temperature,
        humidity: snap.humidity,
        heat_setpoint: snap.heat_setpoint,
        cool_setpoint: snap.cool_setpoint,
        temperature_delta: snap.temperature_delta(),
        ideal_cooler_than_outside: snap.ideal_cooler_than_outside(),
        presence: cycle.effective_presence(zone, snap),
        nighttime: cycle.nighttime,
        hvac_running: snap.hvac_running,
        assist_mode_active: snap.assist_mode_active,
        reasons: decision.reasons.clone(),
    }
}
