//! Pure speed policy.
//!
//! Nothing in this module performs I/O.  The application layer acquires
//! an [`snapshot::EnvironmentSnapshot`] and a [`lock::LockState`] per
//! zone, runs the [`lock::OverrideLockTracker`] gate, and only then asks
//! the [`decision::DecisionEngine`] for a speed.

pub mod decision;
pub mod lock;
pub mod mode;
pub mod snapshot;
pub mod steps;

pub use decision::{Decision, DecisionEngine};
pub use lock::{LockObservation, LockState, LockVerdict, ManualOverride, OverrideLockTracker};
pub use mode::{Classification, Mode};
pub use snapshot::{CycleContext, EnvironmentSnapshot};
pub use steps::TempStepTable;
