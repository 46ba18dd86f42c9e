//! Ceiling fan speed controller library.
//!
//! Decides a target speed for each configured zone from ambient and
//! occupancy signals and applies it only when it differs from what the
//! fan reports, backing off whenever someone changed the fan by hand.
//!
//! Layering follows ports and adapters:
//!
//! - [`engine`]: pure policy (mode, temperature steps, lock, decision)
//! - [`app`]: port traits and the [`app::service::ZoneController`]
//! - [`adapters`]: JSON files, in-memory storage, `log` output, clock

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod engine;
pub mod error;
pub mod schedule;
pub mod timestamp;
