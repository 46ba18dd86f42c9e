//! Fan controller: one full cycle per invocation.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                  Adapters (outer ring)                  │
//! │                                                         │
//! │  JsonConfigFile   HomeFile (all house ports)            │
//! │  (ConfigPort)     LogEventSink (EventSink)  SystemClock │
//! │                                                         │
//! │  ─────────────── Port Trait Boundary ───────────────    │
//! │                                                         │
//! │  ┌───────────────────────────────────────────────────┐  │
//! │  │          ZoneController (pure logic)              │  │
//! │  │  lock gate · mode · temp steps · clamp            │  │
//! │  └───────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! The external trigger (home automation rule, cron, file watcher) is
//! expected to debounce and invoke this once per relevant change.
#![deny(unused_must_use)]

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use tracing_subscriber::filter::LevelFilter;

use autofan::adapters::config_file::JsonConfigFile;
use autofan::adapters::home_file::HomeFile;
use autofan::adapters::log_sink::LogEventSink;
use autofan::adapters::time::{FixedClock, SystemClock};
use autofan::app::service::{ZoneController, ZoneOutcome};
use autofan::timestamp;

#[derive(Debug, Parser)]
#[command(name = "autofan", version, about = "Per-zone ceiling fan speed controller")]
struct Args {
    /// Zone and global configuration (JSON).
    #[arg(long, value_name = "PATH")]
    config: PathBuf,

    /// Home-state document to read from and write back to (JSON).
    #[arg(long, value_name = "PATH")]
    home: PathBuf,

    /// Force debug tracing for every zone, regardless of the house switch.
    #[arg(long, action = clap::ArgAction::SetTrue)]
    debug: bool,

    /// Run the cycle as if the local time were this ("YYYY-MM-DD HH:MM:SS").
    #[arg(long, value_name = "TIME")]
    at: Option<String>,

    /// Log at debug level.
    #[arg(short, long, action = clap::ArgAction::SetTrue)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose { LevelFilter::DEBUG } else { LevelFilter::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let source = JsonConfigFile::new(&args.config);
    let mut controller = ZoneController::load(&source)
        .with_context(|| format!("loading config {}", source.path().display()))?;

    let mut home = HomeFile::load(&args.home)?;
    let house_debug = home.state.debug;
    if args.debug {
        home.state.debug = Some(true);
    }

    let mut sink = LogEventSink::new();
    controller.start(&mut sink);

    let now = match args.at.as_deref() {
        Some(raw) => FixedClock(timestamp::parse(raw).context("parsing --at")?).now(),
        None => SystemClock::new().now(),
    };
    let reports = controller.run_cycle(&mut home.state, &mut sink, now);

    let changed = reports
        .iter()
        .filter(|r| matches!(r.outcome, ZoneOutcome::Changed { .. }))
        .count();
    info!("cycle complete: {} zone(s), {} changed", reports.len(), changed);

    home.state.debug = house_debug;
    home.save()
}
