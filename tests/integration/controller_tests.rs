//! Full cycles through the ZoneController against the mock house.

use autofan::adapters::config_file;
use autofan::app::events::AppEvent;
use autofan::app::service::{ZoneController, ZoneOutcome, ZoneReport};
use autofan::config::{GlobalConfig, SystemConfig, ZoneConfig};
use autofan::error::{ConfigError, ReadError, WriteError};
use chrono::NaiveDateTime;

use crate::mock_home::{HomeCall, MockHome, MockZone, RecordingSink};
use crate::{at, sunroom, zone};

fn controller(zones: Vec<ZoneConfig>) -> ZoneController {
    controller_with(GlobalConfig::default(), zones)
}

fn controller_with(global: GlobalConfig, zones: Vec<ZoneConfig>) -> ZoneController {
    ZoneController::new(SystemConfig {
        global,
        zones,
        ..SystemConfig::default()
    })
    .unwrap()
}

/// Room four degrees above ideal: HVAC + presence + step (3.5, 4.5] = 4.
fn warm_room() -> MockZone {
    MockZone {
        temperature: Some(76.0),
        ..MockZone::default()
    }
}

fn run(
    ctl: &mut ZoneController,
    home: &mut MockHome,
    sink: &mut RecordingSink,
    now: NaiveDateTime,
) -> Vec<ZoneOutcome> {
    ctl.run_cycle(home, sink, now)
        .into_iter()
        .map(|ZoneReport { outcome, .. }| outcome)
        .collect()
}

// ── Changes and persistence ──────────────────────────────────

#[test]
fn warm_summer_room_speeds_up_and_persists() {
    let z = sunroom();
    let mut ctl = controller(vec![z.clone()]);
    let mut home = MockHome::summer().with_zone(&z, warm_room());
    let mut sink = RecordingSink::new();

    let outcomes = run(&mut ctl, &mut home, &mut sink, at(14, 0));

    assert_eq!(
        outcomes,
        vec![ZoneOutcome::Changed {
            from: 0,
            to: 4,
            assist_mode: false
        }]
    );
    assert_eq!(home.speed_commands(), vec![("fan-1".to_owned(), 4)]);
    assert_eq!(home.var("Sunroom.target_speed"), Some("4"));
    assert_eq!(home.var("Sunroom.last_changed"), Some("2024-07-01 14:00:00"));
    assert_eq!(home.var("Sunroom.locked_until"), None);

    let changed = sink
        .events
        .iter()
        .find_map(|e| match e {
            AppEvent::SpeedChanged {
                trigger, reasons, ..
            } => Some((trigger.clone(), reasons.clone())),
            _ => None,
        })
        .expect("a SpeedChanged event");
    assert_eq!(changed.0, "motion detected");
    assert!(changed.1.iter().any(|r| r.contains("HVAC is running")));
    assert!(changed.1.iter().any(|r| r.contains("presence is detected")));
}

#[test]
fn fresh_zone_reports_no_read_failures() {
    let z = sunroom();
    let mut ctl = controller(vec![z.clone()]);
    let mut home = MockHome::summer().with_zone(&z, warm_room());
    let mut sink = RecordingSink::new();

    run(&mut ctl, &mut home, &mut sink, at(14, 0));
    run(&mut ctl, &mut home, &mut sink, at(14, 5));
    assert_eq!(sink.read_failures(), vec![]);
}

#[test]
fn repeated_cycles_issue_one_command() {
    let z = sunroom();
    let mut ctl = controller(vec![z.clone()]);
    let mut home = MockHome::summer().with_zone(&z, warm_room());
    let mut sink = RecordingSink::new();

    run(&mut ctl, &mut home, &mut sink, at(14, 0));
    // Inside the post-change quiet period.
    assert_eq!(
        run(&mut ctl, &mut home, &mut sink, at(14, 1)),
        vec![ZoneOutcome::Locked { until: at(14, 2) }]
    );
    // Past it, nothing changed.
    assert_eq!(
        run(&mut ctl, &mut home, &mut sink, at(14, 5)),
        vec![ZoneOutcome::Unchanged { speed: 4 }]
    );
    assert_eq!(
        run(&mut ctl, &mut home, &mut sink, at(14, 10)),
        vec![ZoneOutcome::Unchanged { speed: 4 }]
    );

    assert_eq!(home.speed_commands().len(), 1);
    assert_eq!(sink.count(|e| matches!(e, AppEvent::ManualOverrideDetected { .. })), 0);
    assert_eq!(ctl.cycle_count(), 4);
}

#[test]
fn nobody_home_caps_speed_at_one() {
    let z = sunroom();
    let mut ctl = controller(vec![z.clone()]);
    let mut home = MockHome::summer().with_zone(
        &z,
        MockZone {
            temperature: Some(77.0),
            ..MockZone::default()
        },
    );
    home.someone_home = Some(false);
    let mut sink = RecordingSink::new();

    let outcomes = run(&mut ctl, &mut home, &mut sink, at(14, 0));
    assert_eq!(
        outcomes,
        vec![ZoneOutcome::Changed {
            from: 0,
            to: 1,
            assist_mode: false
        }]
    );
}

#[test]
fn household_read_failure_uses_configured_occupancy() {
    let z = sunroom();
    let global = GlobalConfig {
        someone_home: false,
        ..GlobalConfig::default()
    };
    let mut ctl = controller_with(global, vec![z.clone()]);
    let mut home = MockHome::summer().with_zone(&z, warm_room());
    home.someone_home = None;
    let mut sink = RecordingSink::new();

    run(&mut ctl, &mut home, &mut sink, at(14, 0));
    assert_eq!(home.speed_commands(), vec![("fan-1".to_owned(), 1)]);
    assert!(
        sink.read_failures()
            .contains(&("household".to_owned(), "someone home", ReadError::Unavailable))
    );
}

#[test]
fn summer_cool_day_holds_at_one() {
    let z = sunroom();
    let mut ctl = controller(vec![z.clone()]);
    let mut home = MockHome::summer().with_zone(
        &z,
        MockZone {
            temperature: Some(71.0),
            current_speed: Some(3),
            ..MockZone::default()
        },
    );
    // Cooling setpoint only, cooler outside than ideal, room below ideal.
    home.outside_feelslike = Some(65.0);
    home.seed("Sunroom.target_speed", "3");
    let mut sink = RecordingSink::new();

    let outcomes = run(&mut ctl, &mut home, &mut sink, at(14, 0));
    assert_eq!(
        outcomes,
        vec![ZoneOutcome::Changed {
            from: 3,
            to: 1,
            assist_mode: false
        }]
    );
}

#[test]
fn bedtime_humidity_bonus_applies_without_presence() {
    let mut z = sunroom();
    z.summer_assist_at_bedtime = true;
    let mut ctl = controller(vec![z.clone()]);
    let mut home = MockHome::summer().with_zone(
        &z,
        MockZone {
            humidity: Some(85.0),
            presence: Some(false),
            ..MockZone::default()
        },
    );
    home.outside_feelslike = Some(65.0);
    home.thermostat_mut().hvac_running = false;
    let mut sink = RecordingSink::new();

    // Assumed presence + bedtime bonus + step (-0.5, 1].
    run(&mut ctl, &mut home, &mut sink, at(23, 0));
    assert_eq!(home.speed_commands(), vec![("fan-1".to_owned(), 3)]);
}

// ── Assist mode ───────────────────────────────────────────────

#[test]
fn assist_mode_follows_the_speed_command() {
    let mut z = sunroom();
    z.enable_assist_mode_when_present = true;
    let mut ctl = controller(vec![z.clone()]);
    let mut home = MockHome::summer().with_zone(&z, warm_room());
    let mut sink = RecordingSink::new();

    let outcomes = run(&mut ctl, &mut home, &mut sink, at(14, 0));
    assert_eq!(
        outcomes,
        vec![ZoneOutcome::Changed {
            from: 0,
            to: 4,
            assist_mode: true
        }]
    );
    let fan_calls: Vec<_> = home
        .calls
        .iter()
        .filter(|c| !matches!(c, HomeCall::Write { .. }))
        .cloned()
        .collect();
    assert_eq!(
        fan_calls,
        vec![
            HomeCall::SetSpeed {
                fan: "fan-1".into(),
                speed: 4
            },
            HomeCall::SetAssist {
                fan: "fan-1".into(),
                on: true
            },
        ]
    );
}

#[test]
fn active_assist_mode_is_not_a_manual_override() {
    let z = sunroom();
    let mut ctl = controller(vec![z.clone()]);
    let mut home = MockHome::summer().with_zone(
        &z,
        MockZone {
            current_speed: Some(6),
            assist_mode: Some(true),
            ..warm_room()
        },
    );
    home.seed("Sunroom.target_speed", "4");
    let mut sink = RecordingSink::new();

    let outcomes = run(&mut ctl, &mut home, &mut sink, at(14, 0));
    assert!(!matches!(outcomes[0], ZoneOutcome::Locked { .. }));
    assert_eq!(sink.count(|e| matches!(e, AppEvent::ManualOverrideDetected { .. })), 0);
    assert_eq!(home.var("Sunroom.locked_until"), None);
}

// ── Failures ──────────────────────────────────────────────────

#[test]
fn refused_command_persists_nothing() {
    let z = sunroom();
    let mut ctl = controller(vec![z.clone()]);
    let mut home = MockHome::summer().with_zone(&z, warm_room());
    home.seed("Sunroom.target_speed", "0");
    home.reject_speed_commands = true;
    let mut sink = RecordingSink::new();

    let outcomes = run(&mut ctl, &mut home, &mut sink, at(14, 0));
    assert_eq!(outcomes, vec![ZoneOutcome::CommandFailed { target: 4 }]);
    assert!(home.writes_to("Sunroom.target_speed").is_empty());
    assert!(home.writes_to("Sunroom.last_changed").is_empty());
    assert_eq!(
        sink.count(|e| matches!(
            e,
            AppEvent::WriteFailure {
                what: "fan speed",
                error: WriteError::Unavailable,
                ..
            }
        )),
        1
    );

    // The next trigger retries naturally.
    home.reject_speed_commands = false;
    run(&mut ctl, &mut home, &mut sink, at(14, 1));
    assert_eq!(home.speed_commands(), vec![("fan-1".to_owned(), 4)]);
}

#[test]
fn one_zone_read_failure_does_not_stop_the_next() {
    let broken = zone("Porch", "fan-7");
    let good = sunroom();
    let mut ctl = controller(vec![broken.clone(), good.clone()]);
    let mut home = MockHome::summer()
        .with_zone(
            &broken,
            MockZone {
                temperature: None,
                presence: None,
                ..MockZone::default()
            },
        )
        .with_zone(&good, warm_room());
    let mut sink = RecordingSink::new();

    let reports = ctl.run_cycle(&mut home, &mut sink, at(14, 0));
    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0].zone, "Porch");
    assert_eq!(
        reports[1].outcome,
        ZoneOutcome::Changed {
            from: 0,
            to: 4,
            assist_mode: false
        }
    );

    let failures = sink.read_failures();
    assert!(failures.contains(&("Porch".to_owned(), "temperature", ReadError::Unavailable)));
    assert!(failures.contains(&("Porch".to_owned(), "presence", ReadError::Unavailable)));
    assert!(!failures.iter().any(|(z, what, _)| z == "Sunroom" && *what == "temperature"));
}

#[test]
fn unknown_thermostat_is_retried_and_leaves_mode_unclassified() {
    let mut z = sunroom();
    z.thermostat = "Attic".to_owned();
    let mut ctl = controller(vec![z.clone()]);
    let mut home = MockHome::summer().with_zone(&z, warm_room());
    let mut sink = RecordingSink::new();

    let outcomes = run(&mut ctl, &mut home, &mut sink, at(14, 0));
    assert_eq!(outcomes, vec![ZoneOutcome::Unchanged { speed: 0 }]);
    assert!(
        sink.read_failures()
            .contains(&("Sunroom".to_owned(), "thermostat", ReadError::LookupMiss))
    );
    assert_eq!(sink.count(|e| matches!(e, AppEvent::UnclassifiedMode { .. })), 1);

    run(&mut ctl, &mut home, &mut sink, at(14, 5));
    assert_eq!(home.thermostat_lookups, 2);
}

#[test]
fn thermostat_handle_is_cached() {
    let z = sunroom();
    let mut ctl = controller(vec![z.clone()]);
    let mut home = MockHome::summer().with_zone(&z, warm_room());
    let mut sink = RecordingSink::new();

    run(&mut ctl, &mut home, &mut sink, at(14, 0));
    run(&mut ctl, &mut home, &mut sink, at(14, 5));
    run(&mut ctl, &mut home, &mut sink, at(14, 10));
    assert_eq!(home.thermostat_lookups, 1);
}

#[test]
fn invalid_zone_is_reported_and_skipped() {
    let mut bad = zone("Attic", "fan-9");
    bad.min_target = 5;
    bad.max_target = 2;
    let good = sunroom();
    let mut ctl = controller(vec![bad, good.clone()]);
    let mut home = MockHome::summer().with_zone(&good, warm_room());
    let mut sink = RecordingSink::new();

    ctl.start(&mut sink);
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::ZoneRejected { zone, .. } if zone == "Attic")),
        1
    );

    let reports = ctl.run_cycle(&mut home, &mut sink, at(14, 0));
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].zone, "Sunroom");
}

#[test]
fn undeserializable_zone_is_reported_and_skipped() {
    let good = sunroom();
    let json = serde_json::to_string(&good).unwrap();
    let doc = format!(r#"{{ "zones": [{{ "name": "MBR", "fan_id": "fan-2" }}, {json}] }}"#);
    let mut ctl = ZoneController::new(config_file::parse(&doc).unwrap()).unwrap();
    let mut home = MockHome::summer().with_zone(&good, warm_room());
    let mut sink = RecordingSink::new();

    ctl.start(&mut sink);
    assert_eq!(
        sink.count(|e| matches!(
            e,
            AppEvent::ZoneRejected { zone, error: ConfigError::Corrupted } if zone == "MBR"
        )),
        1
    );

    let reports = ctl.run_cycle(&mut home, &mut sink, at(14, 0));
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].zone, "Sunroom");
}

// ── Debug narration ───────────────────────────────────────────

#[test]
fn debug_traces_every_zone_even_without_change() {
    let z = sunroom();
    let mut ctl = controller(vec![z.clone()]);
    let mut home = MockHome::summer().with_zone(
        &z,
        MockZone {
            current_speed: Some(4),
            ..warm_room()
        },
    );
    home.seed("Sunroom.target_speed", "4");
    let mut sink = RecordingSink::new();

    run(&mut ctl, &mut home, &mut sink, at(14, 0));
    assert_eq!(sink.count(|e| matches!(e, AppEvent::NoChange { .. })), 0);
    assert_eq!(sink.count(|e| matches!(e, AppEvent::DecisionTrace(_))), 0);

    home.debug = Some(true);
    sink.clear();
    run(&mut ctl, &mut home, &mut sink, at(14, 5));
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::NoChange { current_speed: 4, .. })),
        1
    );
    let trace = sink
        .events
        .iter()
        .find_map(|e| match e {
            AppEvent::DecisionTrace(t) => Some(t.clone()),
            _ => None,
        })
        .expect("a DecisionTrace event");
    assert_eq!(trace.target_speed, 4);
    assert_eq!(trace.matched_step, Some(4));
    assert!((trace.temperature_delta - 4.0).abs() < 1e-9);
}
