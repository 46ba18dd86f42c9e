//! Seasonal / HVAC mode classification.
//!
//! Rules are evaluated in order, first match wins:
//!
//! | # | Mode           | Condition                                                        |
//! |---|----------------|------------------------------------------------------------------|
//! | 1 | `SummerWarm`   | cool > 0 and (ideal cooler than outside or room above ideal)     |
//! |   |                | or: cool > 0, heat == 0, bedtime assist enabled, nighttime       |
//! | 2 | `SummerCool`   | cool > 0, heat == 0, ideal not cooler than outside               |
//! | 3 | `Transitional` | heat > 0 (winter, fall and spring share one policy)              |
//!
//! Anything else is unclassified and the caller applies no mode limits.

use core::fmt;

use super::snapshot::EnvironmentSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Warm day with the house cooling itself: presence and temp steps apply.
    SummerWarm,
    /// Cooling setpoint active but it is cool outside: speed capped at 1.
    SummerCool,
    /// Winter, fall or spring: speed capped at 1.
    Transitional,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SummerWarm => write!(f, "summer warm day"),
            Self::SummerCool => write!(f, "summer cool day"),
            Self::Transitional => write!(f, "fall, spring and winter"),
        }
    }
}

/// Everything the classifier looks at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModeInputs {
    pub heat_setpoint: f64,
    pub cool_setpoint: f64,
    pub ideal_cooler_than_outside: bool,
    pub temperature_delta: f64,
    pub nighttime: bool,
    pub summer_assist_at_bedtime: bool,
}

impl ModeInputs {
    pub fn from_snapshot(
        snap: &EnvironmentSnapshot,
        nighttime: bool,
        summer_assist_at_bedtime: bool,
    ) -> Self {
        Self {
            heat_setpoint: snap.heat_setpoint,
            cool_setpoint: snap.cool_setpoint,
            ideal_cooler_than_outside: snap.ideal_cooler_than_outside(),
            temperature_delta: snap.temperature_delta(),
            nighttime,
            summer_assist_at_bedtime,
        }
    }
}

/// Classifier output: the mode (if any) and why.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub mode: Option<Mode>,
    pub rationale: &'static str,
}

pub fn classify(i: &ModeInputs) -> Classification {
    let cooling = i.cool_setpoint > 0.0;
    let heating = i.heat_setpoint > 0.0;
    let cooling_only = cooling && i.heat_setpoint == 0.0;

    if cooling && i.ideal_cooler_than_outside {
        return Classification {
            mode: Some(Mode::SummerWarm),
            rationale: "cooling and ideal temperature is cooler than outside",
        };
    }
    if cooling && i.temperature_delta > 0.0 {
        return Classification {
            mode: Some(Mode::SummerWarm),
            rationale: "cooling and room is warmer than ideal",
        };
    }
    if cooling_only && i.summer_assist_at_bedtime && i.nighttime {
        return Classification {
            mode: Some(Mode::SummerWarm),
            rationale: "cooling only and bedtime assist at night",
        };
    }
    if cooling_only && !i.ideal_cooler_than_outside {
        return Classification {
            mode: Some(Mode::SummerCool),
            rationale: "cooling only and ideal temperature is warmer than outside",
        };
    }
    if heating {
        return Classification {
            mode: Some(Mode::Transitional),
            rationale: "heat setpoint active",
        };
    }
    Classification {
        mode: None,
        rationale: "no setpoint combination matched",
    }
}
