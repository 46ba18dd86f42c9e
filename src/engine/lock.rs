//! Manual-override lock and change-frequency hysteresis.
//!
//! The tracker runs **every cycle before the decision engine**.  It keeps
//! the controller from fighting a person who changed the fan by hand:
//!
//! 1. If the zone is unlocked and the fan reports a speed different from
//!    the last target this controller persisted, someone else changed it.
//!    The zone is locked for `lock_minutes` and the new speed is adopted
//!    as the persisted target.  Detection is suppressed while assist mode
//!    is engaged, since assist mode moves the speed on its own, and on
//!    cycles where the fan's speed could not be read.
//! 2. While locked, the persisted target follows the observed speed every
//!    cycle so nothing looks new once the lock expires, and the zone is
//!    skipped.
//!
//! The lock expires at `max(locked_until, last_changed + minimum change
//! frequency)`, so every automated change also imposes a short quiet
//! period.  Losing presence clears the lock early when the zone opts in.

use chrono::{Duration, NaiveDateTime};

use crate::config::{GlobalConfig, ZoneConfig};

/// Persisted per-zone lock bookkeeping.  Absent fields read as
/// "never locked", "never changed" and "no previous target".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LockState {
    pub locked_until: Option<NaiveDateTime>,
    pub last_changed: Option<NaiveDateTime>,
    pub previous_target_speed: Option<u8>,
}

/// What the tracker observed this cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockObservation {
    pub now: NaiveDateTime,
    pub current_speed: u8,
    /// `false` when the speed read failed and `current_speed` is a sentinel.
    /// Nothing is detected, seeded or tracked from an unreported speed.
    pub speed_reported: bool,
    /// Effective presence (bedtime substitution already applied).
    pub presence: bool,
    pub assist_mode_active: bool,
}

/// A detected change made outside this controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManualOverride {
    pub previous_target: u8,
    pub current_speed: u8,
    pub locked_until: NaiveDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockVerdict {
    /// Automation may proceed for this zone.
    Unlocked { manual_override: Option<ManualOverride> },
    /// The zone must be skipped until `until`.
    Locked {
        until: NaiveDateTime,
        manual_override: Option<ManualOverride>,
    },
}

impl LockVerdict {
    pub fn is_locked(&self) -> bool {
        matches!(self, Self::Locked { .. })
    }

    pub fn manual_override(&self) -> Option<ManualOverride> {
        match self {
            Self::Unlocked { manual_override } | Self::Locked { manual_override, .. } => {
                *manual_override
            }
        }
    }
}

/// Lock policy for one zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverrideLockTracker {
    lock_duration: Duration,
    min_change_frequency: Duration,
    reset_when_no_presence: bool,
}

impl OverrideLockTracker {
    pub fn new(global: &GlobalConfig, zone: &ZoneConfig) -> Self {
        Self {
            lock_duration: Duration::minutes(i64::from(zone.lock_minutes)),
            min_change_frequency: Duration::minutes(i64::from(
                global.minimum_change_frequency_mins,
            )),
            reset_when_no_presence: zone.reset_lock_when_no_presence,
        }
    }

    /// Later of the explicit lock and the post-change quiet period.
    pub fn effective_expiry(&self, state: &LockState) -> Option<NaiveDateTime> {
        let quiet_until = state.last_changed.map(|t| t + self.min_change_frequency);
        match (state.locked_until, quiet_until) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        }
    }

    pub fn is_locked(&self, state: &LockState, now: NaiveDateTime, presence: bool) -> bool {
        if self.reset_when_no_presence && !presence {
            return false;
        }
        self.effective_expiry(state).is_some_and(|expiry| now < expiry)
    }

    /// Run manual-change detection and the lock gate, updating `state`
    /// in place.  The caller persists whatever changed.
    pub fn evaluate(&self, state: &mut LockState, obs: &LockObservation) -> LockVerdict {
        let mut manual_override = None;

        if obs.speed_reported && !self.is_locked(state, obs.now, obs.presence) {
            match state.previous_target_speed {
                Some(previous) if previous != obs.current_speed && !obs.assist_mode_active => {
                    let locked_until = obs.now + self.lock_duration;
                    state.locked_until = Some(locked_until);
                    state.previous_target_speed = Some(obs.current_speed);
                    manual_override = Some(ManualOverride {
                        previous_target: previous,
                        current_speed: obs.current_speed,
                        locked_until,
                    });
                }
                // Nothing persisted yet: adopt the observed speed as the baseline.
                None => state.previous_target_speed = Some(obs.current_speed),
                _ => {}
            }
        }

        if self.is_locked(state, obs.now, obs.presence) {
            if obs.speed_reported {
                state.previous_target_speed = Some(obs.current_speed);
            }
            let until = self.effective_expiry(state).unwrap_or(obs.now);
            return LockVerdict::Locked { until, manual_override };
        }

        LockVerdict::Unlocked { manual_override }
    }
}
