//! Temperature step table.
//!
//! A zone's steps map the temperature delta (room − ideal) to a speed
//! impact and optional min/max overrides.  Ranges are lower-exclusive,
//! upper-inclusive, so adjacent steps `(a, b]` and `(b, c]` never both
//! match `b`.  An open lower bound includes its upper bound; an open
//! upper bound includes its lower bound.  The first matching row wins.

use crate::config::TempStep;

impl TempStep {
    /// Whether `delta` falls in this step's range.
    pub fn matches(&self, delta: f64) -> bool {
        match (self.min_temp, self.max_temp) {
            (None, Some(hi)) => delta <= hi,
            (Some(lo), None) => delta >= lo,
            (Some(lo), Some(hi)) => delta > lo && delta <= hi,
            // Rejected at load; never matches.
            (None, None) => false,
        }
    }
}

/// A matched row and its position in the table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepMatch<'a> {
    pub index: usize,
    pub step: &'a TempStep,
}

/// Ordered view over a zone's steps.
#[derive(Debug, Clone, Copy)]
pub struct TempStepTable<'a> {
    steps: &'a [TempStep],
}

impl<'a> TempStepTable<'a> {
    pub fn new(steps: &'a [TempStep]) -> Self {
        Self { steps }
    }

    /// First step matching `delta`, if any.
    pub fn evaluate(&self, delta: f64) -> Option<StepMatch<'a>> {
        self.steps
            .iter()
            .enumerate()
            .find(|(_, s)| s.matches(delta))
            .map(|(index, step)| StepMatch { index, step })
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Render a step's range, e.g. `(3.5, 4.5]` or `(-inf, -0.5]`.
pub fn describe_range(step: &TempStep) -> String {
    match (step.min_temp, step.max_temp) {
        (None, Some(hi)) => format!("(-inf, {hi}]"),
        (Some(lo), None) => format!("[{lo}, +inf)"),
        (Some(lo), Some(hi)) => format!("({lo}, {hi}]"),
        (None, None) => "(-inf, +inf)".to_owned(),
    }
}
