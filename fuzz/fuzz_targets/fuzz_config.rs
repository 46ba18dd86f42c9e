//! Fuzz target: configuration documents
//!
//! Feeds arbitrary bytes through the JSON config parser and, for anything
//! that deserializes, through validation and one decision per zone that
//! passes.  Verifies:
//! - No panics while parsing or validating
//! - Validated zones always produce a speed within their resolved bounds
//!
//! cargo fuzz run fuzz_config

#![no_main]

use autofan::adapters::config_file;
use autofan::config::{MAX_SPEED, validate_zone};
use autofan::engine::{CycleContext, DecisionEngine, EnvironmentSnapshot};
use chrono::NaiveDate;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(raw) = core::str::from_utf8(data) else {
        return;
    };
    let Ok(config) = config_file::parse(raw) else {
        return;
    };
    if config.global.validate().is_err() {
        return;
    }

    let Some(now) = NaiveDate::from_ymd_opt(2024, 7, 1).and_then(|d| d.and_hms_opt(23, 0, 0)) else {
        return;
    };
    let cycle = CycleContext::new(&config.global, now, true, true);
    let snap = EnvironmentSnapshot {
        ideal_temperature: 72.0,
        room_temperature: 77.5,
        outside_feelslike: 85.0,
        humidity: 90.0,
        presence: true,
        hvac_running: true,
        heat_setpoint: 0.0,
        cool_setpoint: 74.0,
        current_speed: 0,
        speed_reported: true,
        assist_mode_active: false,
    };
    let engine = DecisionEngine::new();

    for zone in config.zones.iter().filter(|z| validate_zone(z).is_ok()) {
        let d = engine.decide(zone, &snap, &cycle);
        assert!(d.min_target <= d.max_target && d.max_target <= MAX_SPEED);
        assert!((d.min_target..=d.max_target).contains(&d.target_speed));
    }
});
