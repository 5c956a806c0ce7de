//! dalictl: Main Entry Point
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HidBridge        JsonStateStore   SystemClock   LogEventSink  │
//! │  (LampTransport)  (StatePort)      (Clock)       (EventSink)   │
//! │  RulesPlanner     SerialSensorReader → OccupancyMonitor        │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │   SharedLamp<LampService>      OccupancyAutomation     │    │
//! │  │   redundancy · rate gate       Present/Vacant/Off FSM  │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Threads: the main thread reads commands from stdin, the automation
//! thread ticks at a fixed period, the sensor thread blocks on serial.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};

use dalictl::Error;
use dalictl::adapters::hardware::{HidBridge, open_bridge};
use dalictl::adapters::log_sink::LogEventSink;
use dalictl::adapters::planner::{RulesPlanner, is_sensor_query};
use dalictl::adapters::state_file::JsonStateStore;
use dalictl::adapters::time::SystemClock;
use dalictl::app::automation::OccupancyAutomation;
use dalictl::app::commands::{ActionRequest, parse_records, requests_from_records};
use dalictl::app::ports::ActionPlanner;
use dalictl::app::service::{LampService, Outcome};
use dalictl::app::shared::SharedLamp;
use dalictl::config::SystemConfig;
use dalictl::sensors::OccupancyMonitor;
use dalictl::sensors::serial::SerialSensorReader;

type Lamp = SharedLamp<HidBridge, JsonStateStore, SystemClock>;

/// Controller for a tunable-white DALI lamp behind a USB HID bridge.
#[derive(Parser, Debug)]
#[command(name = "dalictl")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON config file; missing keys take their defaults.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log frames instead of writing them to the bridge.
    #[arg(long)]
    dry_run: bool,

    /// Open this hidraw node instead of searching by vendor/product id.
    #[arg(long)]
    hidraw: Option<PathBuf>,

    /// Serial port of the occupancy sensor (enables automation).
    #[arg(long)]
    sensor_port: Option<String>,

    /// Sensor baud rate.
    #[arg(long)]
    sensor_baud: Option<u32>,

    /// Where the lamp state snapshot is kept.
    #[arg(long)]
    state_path: Option<PathBuf>,

    /// Ceiling of executed actions per sliding second (1-16).
    #[arg(long)]
    max_actions_per_sec: Option<usize>,

    /// Delay after each bus frame, in milliseconds.
    #[arg(long)]
    pacing_ms: Option<u64>,
}

impl Args {
    /// Layer command-line flags over the file/default config.
    fn apply(&self, config: &mut SystemConfig) {
        if self.dry_run {
            config.dry_run = true;
        }
        if let Some(path) = &self.hidraw {
            config.device.hidraw_path = Some(path.clone());
        }
        if let Some(port) = &self.sensor_port {
            config.sensor.port = Some(port.clone());
        }
        if let Some(baud) = self.sensor_baud {
            config.sensor.baud = baud;
        }
        if let Some(path) = &self.state_path {
            config.state_path = path.clone();
        }
        if let Some(max) = self.max_actions_per_sec {
            config.max_actions_per_sec = max;
        }
        if let Some(ms) = self.pacing_ms {
            config.device.pacing_ms = ms;
        }
    }
}

fn load_config(args: &Args) -> Result<SystemConfig> {
    let mut config = match &args.config {
        Some(path) => SystemConfig::from_file(path)
            .map_err(Error::from)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => SystemConfig::default(),
    };
    args.apply(&mut config);
    config
        .validate()
        .map_err(Error::from)
        .context("invalid configuration")?;
    Ok(config)
}

fn init_logging() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("dalictl=info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging();
    let config = load_config(&args)?;

    info!("dalictl v{} starting", env!("CARGO_PKG_VERSION"));

    let bridge = open_bridge(&config)
        .map_err(Error::from)
        .context("opening the DALI bridge")?;
    let store = JsonStateStore::new(&config.state_path);
    info!("Lamp state file: {}", store.path().display());
    let lamp: Lamp = SharedLamp::new(LampService::new(
        bridge,
        store,
        SystemClock,
        config.max_actions_per_sec,
    ));

    let monitor = OccupancyMonitor::new();
    let stop = Arc::new(AtomicBool::new(false));

    let (reader, automation) = match config.sensor.port.clone() {
        Some(port) => {
            let reader = SerialSensorReader::spawn(port, &config.sensor, monitor.clone())
                .context("starting the sensor reader")?;
            let automation = spawn_automation(&config, lamp.clone(), monitor.clone(), &stop)
                .context("starting the automation loop")?;
            (Some(reader), Some(automation))
        }
        None => {
            info!("No sensor port configured; occupancy automation disabled");
            (None, None)
        }
    };

    run_interactive(&lamp, &monitor, reader.is_some());

    stop.store(true, Ordering::Release);
    if let Some(handle) = automation {
        if handle.join().is_err() {
            warn!("Automation thread panicked");
        }
    }
    if let Some(reader) = reader {
        reader.stop();
    }
    info!("Exiting");
    Ok(())
}

// ── Automation thread ─────────────────────────────────────────

fn spawn_automation(
    config: &SystemConfig,
    lamp: Lamp,
    monitor: OccupancyMonitor,
    stop: &Arc<AtomicBool>,
) -> Result<JoinHandle<()>> {
    let initial = lamp.snapshot()?;
    let mut automation =
        OccupancyAutomation::new(config.automation.clone(), &initial, Instant::now());
    let tick = Duration::from_millis(config.automation.tick_interval_ms);
    let stale = Duration::from_secs(config.sensor.stale_secs);
    let stop = Arc::clone(stop);

    let handle = thread::Builder::new()
        .name("automation".into())
        .spawn(move || {
            let mut sink = LogEventSink::new();
            automation.start(&mut sink);
            while !stop.load(Ordering::Acquire) {
                let now = Instant::now();
                let reading = monitor.reading(now, stale);
                automation.drive(reading, now, &lamp, &mut sink);
                thread::sleep(tick);
            }
        })?;
    Ok(handle)
}

// ── Interactive loop ──────────────────────────────────────────

fn run_interactive(lamp: &Lamp, monitor: &OccupancyMonitor, sensor_enabled: bool) {
    let mut planner = RulesPlanner::new();
    let stdin = io::stdin();
    info!("Ready. Type commands (Ctrl-D to exit).");

    loop {
        print!("you> ");
        let _ = io::stdout().flush();

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                warn!("stdin: {e}");
                break;
            }
        }
        let text = line.trim();
        if text.is_empty() {
            continue;
        }
        if matches!(text, "quit" | "exit") {
            break;
        }

        if text.starts_with('[') || text.starts_with('{') {
            match parse_records(text) {
                Ok(records) => apply(lamp, &requests_from_records(&records)),
                Err(e) => warn!("Ignoring malformed action JSON: {e}"),
            }
            continue;
        }

        if is_sensor_query(text) {
            let status = monitor.snapshot();
            if sensor_enabled && status.updated_at.is_some() {
                println!("sensor> {status}");
            } else {
                println!("sensor> (no sensor status available)");
            }
            continue;
        }

        apply(lamp, &planner.plan(text));
    }
}

fn apply(lamp: &Lamp, reqs: &[ActionRequest]) {
    if reqs.is_empty() {
        println!("lamp> nothing to do");
        return;
    }
    for (req, result) in reqs.iter().zip(lamp.apply_all(reqs)) {
        match result {
            Ok(Outcome::Executed { .. }) => {}
            Ok(Outcome::Redundant) => println!("lamp> {req}: already so"),
            Err(e) => println!("lamp> {req} failed: {e}"),
        }
    }
    if let Ok(state) = lamp.snapshot() {
        println!(
            "lamp> level={} temp=({:#04x},{:#04x}) off={}",
            state.last_level,
            state.last_temp.dtr(),
            state.last_temp.dtr1(),
            state.is_off
        );
    }
}
