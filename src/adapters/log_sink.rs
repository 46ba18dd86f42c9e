//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the `log` facade.  The binary routes that to stderr through
//! `tracing-subscriber`; a library user can install any logger.

use log::{debug, error, info, warn};

use crate::app::events::{AppEvent, DecisionTrace};
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`].
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::CycleStarted {
                zones,
                nighttime,
                someone_home,
                debug,
            } => {
                debug!(
                    "CYCLE | zones={} | night={} | someone_home={} | debug={}",
                    zones, nighttime, someone_home, debug
                );
            }
            AppEvent::SpeedChanged {
                zone,
                from,
                to,
                trigger,
                reasons,
                assist_mode,
            } => {
                let direction = if to > from { "increasing" } else { "decreasing" };
                info!(
                    "{}: {} from {} to {} (trigger: {}){}",
                    zone,
                    direction,
                    from,
                    to,
                    trigger,
                    if *assist_mode { " [assist mode on]" } else { "" }
                );
                for reason in reasons {
                    info!("{}:   {}", zone, reason);
                }
            }
            AppEvent::ManualOverrideDetected {
                zone,
                previous_target,
                current_speed,
                locked_until,
            } => {
                info!(
                    "{}: manual change detected ({} -> {}), locked until {}",
                    zone, previous_target, current_speed, locked_until
                );
            }
            AppEvent::ZoneLocked {
                zone,
                until,
                current_speed,
            } => {
                info!("{}: locked until {} (current speed: {})", zone, until, current_speed);
            }
            AppEvent::NoChange { zone, current_speed } => {
                info!("{}: no change (current speed: {})", zone, current_speed);
            }
            AppEvent::DecisionTrace(t) => log_trace(t),
            AppEvent::UnclassifiedMode { zone, rationale } => {
                warn!("{}: mode unclassified ({}), no mode limits applied", zone, rationale);
            }
            AppEvent::ReadFailure { zone, what, error } => {
                warn!("{}: could not read {}: {}", zone, what, error);
            }
            AppEvent::WriteFailure { zone, what, error } => {
                warn!("{}: could not write {}: {}", zone, what, error);
            }
            AppEvent::ZoneRejected { zone, error } => {
                error!("{}: zone disabled: {}", zone, error);
            }
        }
    }
}

fn log_trace(t: &DecisionTrace) {
    let mode = t.mode.map_or_else(|| "unclassified".to_owned(), |m| m.to_string());
    info!(
        "{}: speed {} -> {} (raw {}, min {}, max {}) | mode={} step={:?}",
        t.zone,
        t.current_speed,
        t.target_speed,
        t.raw_target,
        t.min_target,
        t.max_target,
        mode,
        t.matched_step
    );
    info!(
        "{}: room={:.1} outside={:.1} ideal={:.1} delta={:.1} humidity={:.0} | \
         heat={:.0} cool={:.0} | ideal_cooler={} presence={} night={} hvac={} assist={}",
        t.zone,
        t.room_temperature,
        t.outside_feelslike,
        t.ideal_temperature,
        t.temperature_delta,
        t.humidity,
        t.heat_setpoint,
        t.cool_setpoint,
        t.ideal_cooler_than_outside,
        t.presence,
        t.nighttime,
        t.hvac_running,
        t.assist_mode_active,
    );
    for reason in &t.reasons {
        info!("{}:   {}", t.zone, reason);
    }
}
