//! Manual override lock behaviour through full controller cycles.

use autofan::app::events::AppEvent;
use autofan::app::service::{ZoneController, ZoneOutcome};
use autofan::config::{GlobalConfig, SystemConfig, ZoneConfig};
use autofan::error::ReadError;

use crate::mock_home::{MockHome, MockZone, RecordingSink};
use crate::{at, sunroom};

fn controller(zone: &ZoneConfig) -> ZoneController {
    ZoneController::new(SystemConfig {
        global: GlobalConfig::default(),
        zones: vec![zone.clone()],
        ..SystemConfig::default()
    })
    .unwrap()
}

/// Someone turned the fan to 5; the controller last set 2.
fn overridden(zone: &ZoneConfig) -> MockHome {
    let mut home = MockHome::summer().with_zone(
        zone,
        MockZone {
            temperature: Some(76.0),
            current_speed: Some(5),
            ..MockZone::default()
        },
    );
    home.seed("Sunroom.target_speed", "2");
    home
}

#[test]
fn manual_change_locks_the_zone() {
    let z = sunroom();
    let mut ctl = controller(&z);
    let mut home = overridden(&z);
    let mut sink = RecordingSink::new();

    let reports = ctl.run_cycle(&mut home, &mut sink, at(14, 0));
    assert_eq!(reports[0].outcome, ZoneOutcome::Locked { until: at(15, 0) });

    assert_eq!(
        sink.count(|e| matches!(
            e,
            AppEvent::ManualOverrideDetected {
                previous_target: 2,
                current_speed: 5,
                ..
            }
        )),
        1
    );
    assert_eq!(home.var("Sunroom.locked_until"), Some("2024-07-01 15:00:00"));
    assert_eq!(home.var("Sunroom.target_speed"), Some("5"));
    assert!(home.speed_commands().is_empty());
}

#[test]
fn locked_zone_tracks_current_speed_and_skips_decision() {
    let z = sunroom();
    let mut ctl = controller(&z);
    let mut home = overridden(&z);
    home.seed("Sunroom.locked_until", "2024-07-01 15:00:00");
    home.debug = Some(true);
    let mut sink = RecordingSink::new();

    let reports = ctl.run_cycle(&mut home, &mut sink, at(14, 30));
    assert_eq!(reports[0].outcome, ZoneOutcome::Locked { until: at(15, 0) });
    assert_eq!(home.var("Sunroom.target_speed"), Some("5"));
    assert!(home.speed_commands().is_empty());

    assert_eq!(sink.count(|e| matches!(e, AppEvent::ManualOverrideDetected { .. })), 0);
    assert_eq!(sink.count(|e| matches!(e, AppEvent::ZoneLocked { .. })), 1);
    assert_eq!(sink.count(|e| matches!(e, AppEvent::DecisionTrace(_))), 0);
    assert_eq!(sink.count(|e| matches!(e, AppEvent::UnclassifiedMode { .. })), 0);
}

#[test]
fn lock_holds_for_lock_minutes_then_releases() {
    let z = sunroom();
    let mut ctl = controller(&z);
    let mut home = overridden(&z);
    let mut sink = RecordingSink::new();

    ctl.run_cycle(&mut home, &mut sink, at(14, 0));

    // Another hand adjustment a minute before expiry.
    home.zone_mut(&z).current_speed = Some(3);
    let reports = ctl.run_cycle(&mut home, &mut sink, at(14, 59));
    assert_eq!(reports[0].outcome, ZoneOutcome::Locked { until: at(15, 0) });
    assert_eq!(home.var("Sunroom.locked_until"), Some("2024-07-01 15:00:00"));
    assert_eq!(home.var("Sunroom.target_speed"), Some("3"));

    let reports = ctl.run_cycle(&mut home, &mut sink, at(15, 1));
    assert_eq!(
        reports[0].outcome,
        ZoneOutcome::Changed {
            from: 3,
            to: 4,
            assist_mode: false
        }
    );
    assert_eq!(sink.count(|e| matches!(e, AppEvent::ManualOverrideDetected { .. })), 1);
}

#[test]
fn presence_loss_clears_lock_when_configured() {
    let mut z = sunroom();
    z.reset_lock_when_no_presence = true;
    let mut ctl = controller(&z);
    let mut home = overridden(&z);
    let mut sink = RecordingSink::new();

    ctl.run_cycle(&mut home, &mut sink, at(14, 0));

    home.zone_mut(&z).presence = Some(false);
    let reports = ctl.run_cycle(&mut home, &mut sink, at(14, 30));
    // HVAC + step (3.5, 4.5]; no presence bonus.
    assert_eq!(
        reports[0].outcome,
        ZoneOutcome::Changed {
            from: 5,
            to: 3,
            assist_mode: false
        }
    );
}

#[test]
fn bedtime_assumed_presence_keeps_lock() {
    let mut z = sunroom();
    z.reset_lock_when_no_presence = true;
    z.summer_assist_at_bedtime = true;
    let mut ctl = controller(&z);
    let mut home = overridden(&z);
    home.zone_mut(&z).presence = Some(false);
    let mut sink = RecordingSink::new();

    let reports = ctl.run_cycle(&mut home, &mut sink, at(23, 0));
    assert_eq!(
        reports[0].outcome,
        ZoneOutcome::Locked {
            until: at(23, 0) + chrono::Duration::minutes(60)
        }
    );
}

#[test]
fn corrupt_lock_variables_mean_unlocked() {
    let z = sunroom();
    let mut ctl = controller(&z);
    let mut home = MockHome::summer().with_zone(
        &z,
        MockZone {
            temperature: Some(76.0),
            ..MockZone::default()
        },
    );
    home.seed("Sunroom.locked_until", "next tuesday");
    home.seed("Sunroom.last_changed", "2024-07-01T13:59:00");
    home.seed("Sunroom.target_speed", "fast");
    let mut sink = RecordingSink::new();

    let reports = ctl.run_cycle(&mut home, &mut sink, at(14, 0));
    assert_eq!(
        reports[0].outcome,
        ZoneOutcome::Changed {
            from: 0,
            to: 4,
            assist_mode: false
        }
    );

    let failures = sink.read_failures();
    let malformed = |what, kind| ("Sunroom".to_owned(), what, ReadError::Malformed(kind));
    assert!(failures.contains(&malformed("locked until", "timestamp")));
    assert!(failures.contains(&malformed("last changed", "timestamp")));
    assert!(failures.contains(&malformed("target speed", "target speed")));
    assert_eq!(home.var("Sunroom.target_speed"), Some("4"));
}

#[test]
fn unreadable_fan_speed_does_not_lock() {
    let z = sunroom();
    let mut ctl = controller(&z);
    let mut home = MockHome::summer().with_zone(
        &z,
        MockZone {
            temperature: Some(76.0),
            current_speed: None,
            ..MockZone::default()
        },
    );
    home.seed("Sunroom.target_speed", "3");
    let mut sink = RecordingSink::new();

    let reports = ctl.run_cycle(&mut home, &mut sink, at(14, 0));
    assert_eq!(sink.count(|e| matches!(e, AppEvent::ManualOverrideDetected { .. })), 0);
    assert_eq!(home.var("Sunroom.locked_until"), None);
    assert!(home.writes_to("Sunroom.target_speed").iter().all(|v| v != "0"));
    assert!(!matches!(reports[0].outcome, ZoneOutcome::Locked { .. }));
    assert!(
        sink.read_failures()
            .contains(&("Sunroom".to_owned(), "current speed", ReadError::Unavailable))
    );
}
