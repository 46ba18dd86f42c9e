//! Application core: orchestration over port traits.
//!
//! This module wires the pure policy in [`crate::engine`] to the house.
//! All interaction with sensors, thermostats, fans and persisted
//! variables happens through the **port traits** defined in [`ports`],
//! keeping this layer fully testable without a real home.

pub mod acquire;
pub mod events;
pub mod ports;
pub mod service;
pub mod thermostat;
