//! Wall-clock adapter.
//!
//! Lock windows and the nighttime check work on local wall-clock time,
//! the same zone the persisted timestamps are written in.

use chrono::{Local, NaiveDateTime};

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl SystemClock {
    pub fn new() -> Self {
        Self
    }

    /// Current local time, without zone information.
    pub fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A clock frozen at a given instant, for replays and tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl FixedClock {
    pub fn now(&self) -> NaiveDateTime {
        self.0
    }
}
