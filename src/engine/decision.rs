//! Per-zone speed decision.
//!
//! [`DecisionEngine::decide`] is a pure function of the zone's static
//! configuration, its [`EnvironmentSnapshot`] and the shared
//! [`CycleContext`].  The lock gate runs before it (see
//! [`crate::engine::lock`]); a locked zone never reaches this module.
//!
//! Pipeline, in order:
//!
//! ```text
//!  working min/max ← zone defaults
//!  target ← 0 (+1 if HVAC running)
//!  mode adjustments (presence, bedtime bonus, temp step | caps)
//!  occupancy cap (nobody home → max 1)
//!  min raises (always-on, comfort floor)
//!  max resolution (bedtime speed | max ≥ min)
//!  clamp, assist request
//! ```

use std::fmt::Write as _;

use crate::config::ZoneConfig;

use super::mode::{Mode, ModeInputs, classify};
use super::snapshot::{CycleContext, EnvironmentSnapshot};
use super::steps::{TempStepTable, describe_range};

/// Outcome of one zone's decision.
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    /// Final speed, within `min_target..=max_target`.
    pub target_speed: u8,
    /// Ordered, human-readable rule annotations.
    pub reasons: Vec<String>,
    pub assist_mode_requested: bool,

    // Trace data; only surfaced in debug mode.
    pub mode: Option<Mode>,
    pub mode_rationale: &'static str,
    pub matched_step: Option<usize>,
    pub raw_target: i32,
    pub min_target: u8,
    pub max_target: u8,
}

impl Decision {
    /// Reasons joined for a single log line.
    pub fn reason_summary(&self) -> String {
        self.reasons.join("; ")
    }
}

/// Working min/max for one cycle.  Always starts from the zone defaults,
/// so a matched step can never leak into the next cycle.
#[derive(Debug, Clone, Copy)]
struct Targets {
    min: u8,
    max: u8,
}

impl Targets {
    fn from_zone(zone: &ZoneConfig) -> Self {
        Self {
            min: zone.min_target,
            max: zone.max_target,
        }
    }

    /// Cap the maximum at 1, pulling the minimum down with it.
    fn cap_at_one(&mut self) {
        self.max = 1;
        if self.min > 1 {
            self.min = 1;
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct DecisionEngine;

impl DecisionEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn decide(
        &self,
        zone: &ZoneConfig,
        snap: &EnvironmentSnapshot,
        cycle: &CycleContext<'_>,
    ) -> Decision {
        let global = cycle.global;
        let presence = cycle.effective_presence(zone, snap);
        let delta = snap.temperature_delta();

        let mut reasons = Vec::new();
        let mut targets = Targets::from_zone(zone);
        let mut target: i32 = 0;
        let mut matched_step = None;

        // HVAC bonus.
        if snap.hvac_running {
            target += 1;
            reasons.push("HVAC is running [Impact: +1]".to_owned());
        } else {
            reasons.push("HVAC is not running [Impact: +0]".to_owned());
        }

        let classification = classify(&ModeInputs::from_snapshot(
            snap,
            cycle.nighttime,
            zone.summer_assist_at_bedtime,
        ));

        match classification.mode {
            Some(Mode::SummerWarm) => {
                reasons.push(format!("mode: {} ({})", Mode::SummerWarm, classification.rationale));

                if presence {
                    target += 1;
                    if snap.presence {
                        reasons.push("presence is detected [Impact: +1]".to_owned());
                    } else {
                        reasons.push("presence is assumed at bedtime [Impact: +1]".to_owned());
                    }
                }

                if cycle.bedtime_assist(zone)
                    && (snap.humidity > global.bedtime_high_humidity
                        || snap.outside_feelslike > global.bedtime_high_feelslike)
                {
                    target += 1;
                    reasons.push(format!(
                        "bedtime with humidity {:.0}% or feels-like {:.1} above threshold \
                         [Impact: +1]",
                        snap.humidity, snap.outside_feelslike
                    ));
                }

                let table = TempStepTable::new(zone.steps_for(cycle.nighttime));
                match table.evaluate(delta) {
                    Some(m) => {
                        matched_step = Some(m.index);
                        let mut reason = format!(
                            "temperature delta {delta:.1} is in {}",
                            describe_range(m.step)
                        );
                        if let Some(impact) = m.step.impact {
                            target += i32::from(impact);
                            let _ = write!(reason, " [Impact: {impact:+}]");
                        }
                        if let Some(min) = m.step.min_target {
                            targets.min = min;
                            let _ = write!(reason, " [min_target: {min}]");
                        }
                        if let Some(max) = m.step.max_target {
                            targets.max = max;
                            let _ = write!(reason, " [max_target: {max}]");
                        }
                        reasons.push(reason);
                    }
                    None => reasons.push(format!("temperature delta {delta:.1} matched no step")),
                }
            }
            Some(Mode::SummerCool) => {
                targets.cap_at_one();
                reasons.push(format!(
                    "mode: {} ({}) [max_target: 1]",
                    Mode::SummerCool,
                    classification.rationale
                ));
            }
            Some(Mode::Transitional) => {
                // The minimum stays; by day the maximum is raised back to it.
                targets.max = 1;
                reasons.push(format!(
                    "mode: {} ({}) [max_target: 1]",
                    Mode::Transitional,
                    classification.rationale
                ));
            }
            None => {
                reasons.push(format!("mode: unclassified ({})", classification.rationale));
            }
        }

        // Occupancy wins over anything the mode decided.
        if !cycle.someone_home {
            targets.cap_at_one();
            reasons.push("no one is home [max_target: 1]".to_owned());
        }

        // Minimum raises.
        let always_on = snap.room_temperature > zone.always_on_inside_temp
            || snap.outside_feelslike > zone.always_on_outside_temp;
        if always_on && targets.min < 1 {
            targets.min = 1;
            reasons.push("always-on temperature exceeded [min_target: 1]".to_owned());
        }
        let floor_temp = if cycle.nighttime {
            global.night_comfort_floor_temp
        } else {
            global.day_comfort_floor_temp
        };
        if cycle.someone_home
            && snap.outside_feelslike > floor_temp
            && targets.min < global.comfort_floor_speed
        {
            targets.min = global.comfort_floor_speed;
            reasons.push(format!(
                "someone is home and feels-like {:.1} is above {floor_temp:.0} [min_target: {}]",
                snap.outside_feelslike, targets.min
            ));
        }

        // Maximum resolution.
        if cycle.nighttime {
            if let Some(bedtime) = zone.bedtime_max_speed {
                targets.max = bedtime;
                reasons.push(format!("bedtime maximum speed [max_target: {bedtime}]"));
                if !cycle.someone_home {
                    targets.cap_at_one();
                    reasons.push("no one is home [max_target: 1]".to_owned());
                }
            }
            if targets.min > targets.max {
                targets.min = targets.max;
                reasons.push(format!(
                    "minimum lowered to bedtime maximum [min_target: {}]",
                    targets.min
                ));
            }
        } else if targets.max < targets.min {
            targets.max = targets.min;
            reasons.push(format!("maximum raised to minimum [max_target: {}]", targets.max));
        }

        let raw_target = target;
        let clamped = target.clamp(i32::from(targets.min), i32::from(targets.max));
        if clamped > raw_target {
            reasons.push(format!(
                "target speed adjusted for the fan minimum speed [Minimum: {}]",
                targets.min
            ));
        } else if clamped < raw_target {
            reasons.push(format!(
                "target speed adjusted for the fan maximum speed [Maximum: {}]",
                targets.max
            ));
        }
        // Bounded by min/max, both within 0..=7.
        let target_speed = u8::try_from(clamped).unwrap_or(targets.min);

        let assist_mode_requested = target_speed >= 2
            && zone.enable_assist_mode_when_present
            && presence
            && !snap.assist_mode_active;

        Decision {
            target_speed,
            reasons,
            assist_mode_requested,
            mode: classification.mode,
            mode_rationale: classification.rationale,
            matched_step,
            raw_target,
            min_target: targets.min,
            max_target: targets.max,
        }
    }
}
