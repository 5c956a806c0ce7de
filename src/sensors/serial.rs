//! Serial reader thread for the occupancy sensor.
//!
//! Opens the port, reads newline-delimited lines and publishes every
//! recognised one into the [`OccupancyMonitor`]. When the link drops or
//! cannot be opened it waits a fixed backoff and tries again, forever,
//! until stopped. It never touches the lamp executor.

use std::io::{self, BufRead, BufReader, Read};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::{debug, info, warn};

use crate::config::SensorConfig;
use crate::error::SensorError;

use super::OccupancyMonitor;

/// Serial read timeout; bounds how long `stop` takes to be noticed.
const READ_TIMEOUT: Duration = Duration::from_secs(1);

/// Handle to the running reader thread.
pub struct SerialSensorReader {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl SerialSensorReader {
    /// Spawn the reader for `port`.
    pub fn spawn(
        port: String,
        config: &SensorConfig,
        monitor: OccupancyMonitor,
    ) -> io::Result<Self> {
        let stop = Arc::new(AtomicBool::new(false));
        let link = Link {
            port,
            baud: config.baud,
            backoff: Duration::from_millis(config.reconnect_backoff_ms),
        };
        let flag = Arc::clone(&stop);
        let handle = thread::Builder::new()
            .name("sensor-reader".into())
            .spawn(move || link.run(&monitor, &flag))?;

        Ok(Self {
            stop,
            handle: Some(handle),
        })
    }

    /// Ask the thread to exit and wait for it.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.stop.store(true, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("Sensor reader thread panicked");
            }
        }
    }
}

impl Drop for SerialSensorReader {
    fn drop(&mut self) {
        self.shutdown();
    }
}

struct Link {
    port: String,
    baud: u32,
    backoff: Duration,
}

impl Link {
    fn run(&self, monitor: &OccupancyMonitor, stop: &AtomicBool) {
        while !stop.load(Ordering::Acquire) {
            info!("Opening sensor port {} @ {} baud", self.port, self.baud);
            match self.open() {
                Ok(port) => {
                    info!("Sensor reader running");
                    if let Err(e) = read_lines(port, monitor, stop) {
                        warn!(
                            "Sensor link lost ({e}), reconnecting in {} ms",
                            self.backoff.as_millis()
                        );
                    }
                }
                Err(e) => warn!(
                    "Sensor port unavailable ({e}), retrying in {} ms",
                    self.backoff.as_millis()
                ),
            }
            sleep_unless_stopped(self.backoff, stop);
        }
        info!("Sensor reader stopped");
    }

    fn open(&self) -> Result<Box<dyn serialport::SerialPort>, SensorError> {
        serialport::new(&self.port, self.baud)
            .timeout(READ_TIMEOUT)
            .open()
            .map_err(|e| match e.kind() {
                serialport::ErrorKind::Io(io::ErrorKind::PermissionDenied) => {
                    SensorError::AccessDenied
                }
                serialport::ErrorKind::Io(kind) => SensorError::OpenFailed(kind),
                serialport::ErrorKind::NoDevice => SensorError::OpenFailed(io::ErrorKind::NotFound),
                _ => SensorError::OpenFailed(io::ErrorKind::Other),
            })
    }
}

/// Read lines from `source` into `monitor` until `stop` is set or the
/// source fails. Read timeouts are not failures; end of stream is. On
/// failure the monitor's occupancy goes back to unknown.
pub fn read_lines<R: Read>(
    source: R,
    monitor: &OccupancyMonitor,
    stop: &AtomicBool,
) -> Result<(), SensorError> {
    let result = pump_lines(source, monitor, stop);
    if result.is_err() {
        monitor.disconnected();
    }
    result
}

fn pump_lines<R: Read>(
    source: R,
    monitor: &OccupancyMonitor,
    stop: &AtomicBool,
) -> Result<(), SensorError> {
    let mut reader = BufReader::new(source);
    let mut buf = Vec::with_capacity(128);

    while !stop.load(Ordering::Acquire) {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => return Err(SensorError::Disconnected(io::ErrorKind::UnexpectedEof)),
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf);
                if !monitor.ingest(&line, Instant::now()) {
                    debug!("Ignoring sensor line: {}", line.trim_end());
                }
            }
            Err(e) if matches!(e.kind(), io::ErrorKind::TimedOut | io::ErrorKind::Interrupted) => {}
            Err(e) => return Err(SensorError::Disconnected(e.kind())),
        }
    }
    Ok(())
}

fn sleep_unless_stopped(total: Duration, stop: &AtomicBool) {
    let step = Duration::from_millis(100);
    let deadline = Instant::now() + total;
    while !stop.load(Ordering::Acquire) {
        let now = Instant::now();
        if now >= deadline {
            break;
        }
        thread::sleep(step.min(deadline - now));
    }
}
