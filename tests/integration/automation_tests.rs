//! Occupancy automation driving the executor end to end.

use std::thread::{self, JoinHandle};
use std::time::Duration;

use dalictl::app::automation::OccupancyAutomation;
use dalictl::app::commands::ActionRequest;
use dalictl::app::events::AppEvent;
use dalictl::app::ports::EventSink;
use dalictl::app::shared::SharedLamp;
use dalictl::config::AutomationConfig;
use dalictl::fsm::StateId;
use dalictl::protocol::ColourTemp;
use dalictl::sensors::OccupancyMonitor;
use dalictl::state::LampState;

use crate::mock_hw::{Bridge, FakeClock, MemStore, RecordingSink, Rig};

type Lamp = SharedLamp<Bridge, MemStore, FakeClock>;

const OFF_FRAME: (u8, u8) = (0xFF, 0x00);
const DIM_FRAME: (u8, u8) = (0xFE, 25); // 10 % of 254
const OCCUPIED_FRAME: (u8, u8) = (0xFE, 152); // 60 % of 254

fn secs(s: u64) -> Duration {
    Duration::from_secs(s)
}

fn apply(lamp: &Lamp, acts: &[ActionRequest]) {
    for result in lamp.apply_all(acts) {
        result.unwrap();
    }
}

fn count(frames: &[(u8, u8)], frame: (u8, u8)) -> usize {
    frames.iter().filter(|f| **f == frame).count()
}

#[test]
fn vacancy_dims_then_turns_off_exactly_once() {
    let rig = Rig::new();
    let lamp = rig.shared(4);
    let t0 = rig.clock.start();
    let d = AutomationConfig::default().dim_delay_secs;
    let mut sink = RecordingSink::default();
    let mut auto =
        OccupancyAutomation::new(AutomationConfig::default(), &lamp.snapshot().unwrap(), t0);
    auto.start(&mut sink);

    let acts = auto.on_presence(true, t0, &lamp.snapshot().unwrap(), &mut sink);
    assert!(acts.is_empty(), "already present, nothing to do");

    let acts = auto.on_presence(false, t0 + secs(1), &lamp.snapshot().unwrap(), &mut sink);
    assert_eq!(acts.as_slice(), &[ActionRequest::SetBrightnessPct(10.0)]);
    apply(&lamp, &acts);

    let acts = auto.on_tick(t0 + secs(1 + d - 1), &lamp.snapshot().unwrap(), &mut sink);
    assert!(acts.is_empty());
    assert_eq!(auto.state(), StateId::VacantDimmed);
    assert_eq!(count(&rig.wire.frames(), OFF_FRAME), 0, "dimmed, not off");

    let acts = auto.on_tick(t0 + secs(1 + d + 1), &lamp.snapshot().unwrap(), &mut sink);
    apply(&lamp, &acts);
    let acts = auto.on_tick(t0 + secs(1 + d + 5), &lamp.snapshot().unwrap(), &mut sink);
    apply(&lamp, &acts);

    assert_eq!(auto.state(), StateId::Off);
    let frames = rig.wire.frames();
    assert_eq!(count(&frames, DIM_FRAME), 1);
    assert_eq!(count(&frames, OFF_FRAME), 1, "off exactly once");
    assert!(lamp.snapshot().unwrap().is_off);
    assert!(sink.events.contains(&AppEvent::StateChanged {
        from: StateId::VacantDimmed,
        to: StateId::Off
    }));
}

#[test]
fn presence_after_off_restores_then_sets_occupied_level() {
    let rig = Rig::with_state(LampState {
        last_level: 40,
        last_temp: ColourTemp::WARM,
        is_off: true,
    });
    let lamp = rig.shared(16);
    let t0 = rig.clock.start();
    let mut sink = RecordingSink::default();
    let mut auto =
        OccupancyAutomation::new(AutomationConfig::default(), &lamp.snapshot().unwrap(), t0);
    auto.start(&mut sink);
    assert_eq!(auto.state(), StateId::Off);
    assert!(rig.wire.frames().is_empty(), "start emits nothing");

    auto.drive(Some(true), t0, &lamp, &mut sink);

    let frames = rig.wire.frames();
    assert_eq!(frames.len(), 8);
    assert_eq!(frames[0], (0xA3, 0x10), "warm restored first");
    assert_eq!(frames[6], (0xFE, 40), "then the recorded level");
    assert_eq!(frames[7], OCCUPIED_FRAME);
    assert_eq!(auto.state(), StateId::Present);
    assert!(!lamp.snapshot().unwrap().is_off);
}

#[test]
fn presence_while_dimmed_brightens_without_restore() {
    let rig = Rig::new();
    let lamp = rig.shared(16);
    let t0 = rig.clock.start();
    let mut sink = RecordingSink::default();
    let mut auto =
        OccupancyAutomation::new(AutomationConfig::default(), &lamp.snapshot().unwrap(), t0);

    auto.drive(Some(false), t0, &lamp, &mut sink);
    auto.drive(Some(true), t0 + secs(5), &lamp, &mut sink);

    assert_eq!(rig.wire.frames(), vec![DIM_FRAME, OCCUPIED_FRAME]);
    assert_eq!(auto.state(), StateId::Present);
}

#[test]
fn edge_only_sensor_turns_the_lamp_off_after_the_dim_delay() {
    let rig = Rig::new();
    let lamp = rig.shared(4);
    let t0 = rig.clock.start();
    let d = AutomationConfig::default().dim_delay_secs;
    let stale = secs(10);
    let monitor = OccupancyMonitor::new();
    let mut sink = RecordingSink::default();
    let mut auto =
        OccupancyAutomation::new(AutomationConfig::default(), &lamp.snapshot().unwrap(), t0);
    auto.start(&mut sink);

    // The sensor reports on change only: one PRESENT, one CLEAR, then silence.
    monitor.ingest("raw=PRESENT", t0);
    monitor.ingest("raw=CLEAR", t0 + secs(1));

    let tick = Duration::from_millis(200);
    let mut now = t0 + secs(1);
    while now <= t0 + secs(1 + d + 1) {
        auto.drive(monitor.reading(now, stale), now, &lamp, &mut sink);
        now += tick;
    }

    let frames = rig.wire.frames();
    assert_eq!(count(&frames, DIM_FRAME), 1);
    assert_eq!(count(&frames, OFF_FRAME), 1, "off exactly once");
    assert_eq!(auto.state(), StateId::Off);
    assert!(lamp.snapshot().unwrap().is_off);
}

#[test]
fn lost_sensor_link_stalls_the_automation() {
    let rig = Rig::new();
    let lamp = rig.shared(16);
    let t0 = rig.clock.start();
    let stale = secs(10);
    let monitor = OccupancyMonitor::new();
    let mut sink = RecordingSink::default();
    let mut auto =
        OccupancyAutomation::new(AutomationConfig::default(), &lamp.snapshot().unwrap(), t0);

    monitor.ingest("raw=CLEAR", t0);
    auto.drive(monitor.reading(t0, stale), t0, &lamp, &mut sink);
    assert_eq!(auto.state(), StateId::VacantDimmed);

    // The link drops and stays down long past the dim delay: no off.
    monitor.disconnected();
    let later = t0 + secs(60);
    auto.drive(monitor.reading(later, stale), later, &lamp, &mut sink);
    assert_eq!(auto.state(), StateId::VacantDimmed);
    assert_eq!(auto.reading(), None);
    assert_eq!(rig.wire.frames(), vec![DIM_FRAME]);
    assert!(sink.events.contains(&AppEvent::OccupancyChanged {
        from: Some(false),
        to: None
    }));
}

#[test]
fn stale_json_status_stalls_the_automation() {
    let rig = Rig::new();
    let lamp = rig.shared(16);
    let t0 = rig.clock.start();
    let stale = secs(10);
    let monitor = OccupancyMonitor::new();
    let mut sink = RecordingSink::default();
    let mut auto =
        OccupancyAutomation::new(AutomationConfig::default(), &lamp.snapshot().unwrap(), t0);

    monitor.ingest(r#"{"occupied": false}"#, t0);
    auto.drive(monitor.reading(t0, stale), t0, &lamp, &mut sink);
    let later = t0 + secs(60);
    auto.drive(monitor.reading(later, stale), later, &lamp, &mut sink);

    assert_eq!(auto.state(), StateId::VacantDimmed);
    assert_eq!(rig.wire.frames(), vec![DIM_FRAME]);
}

#[test]
fn garbage_sensor_lines_change_nothing() {
    let rig = Rig::new();
    let lamp = rig.shared(16);
    let t0 = rig.clock.start();
    let monitor = OccupancyMonitor::new();
    let mut sink = RecordingSink::default();
    let mut auto =
        OccupancyAutomation::new(AutomationConfig::default(), &lamp.snapshot().unwrap(), t0);

    for line in ["rst:0x1 (POWERON_RESET)", "{not json", "raw=MAYBE", ""] {
        assert!(!monitor.ingest(line, t0));
    }
    auto.drive(monitor.reading(t0, secs(10)), t0, &lamp, &mut sink);

    assert_eq!(monitor.snapshot().updated_at, None);
    assert!(rig.wire.frames().is_empty());
    assert_eq!(auto.state(), StateId::Present);
    assert!(sink.events.is_empty());
}

#[test]
fn json_status_lines_drive_the_automation() {
    let rig = Rig::new();
    let lamp = rig.shared(16);
    let t0 = rig.clock.start();
    let monitor = OccupancyMonitor::new();
    let mut sink = RecordingSink::default();
    let mut auto =
        OccupancyAutomation::new(AutomationConfig::default(), &lamp.snapshot().unwrap(), t0);

    monitor.ingest(r#"{"raw": true, "occupied": false, "mov": 0}"#, t0);
    auto.drive(monitor.reading(t0, secs(10)), t0, &lamp, &mut sink);
    assert_eq!(auto.state(), StateId::VacantDimmed, "filtered bit wins");
}

#[test]
fn manual_off_while_vacant_is_not_repeated() {
    let rig = Rig::new();
    let lamp = rig.shared(16);
    let t0 = rig.clock.start();
    let mut sink = RecordingSink::default();
    let mut auto =
        OccupancyAutomation::new(AutomationConfig::default(), &lamp.snapshot().unwrap(), t0);

    auto.drive(Some(false), t0, &lamp, &mut sink);
    lamp.execute(ActionRequest::Off).unwrap();
    auto.drive(Some(false), t0 + secs(25), &lamp, &mut sink);

    assert_eq!(auto.state(), StateId::Off);
    assert_eq!(count(&rig.wire.frames(), OFF_FRAME), 1, "redundant off skipped");
}

/// Sink that, on the first occupancy change, starts another caller which
/// switches the lamp off while the automation is mid-decision.
struct Interloper {
    lamp: Lamp,
    handles: Vec<JoinHandle<()>>,
}

impl EventSink for Interloper {
    fn emit(&mut self, event: &AppEvent) {
        if matches!(event, AppEvent::OccupancyChanged { .. }) && self.handles.is_empty() {
            let lamp = self.lamp.clone();
            self.handles.push(thread::spawn(move || {
                lamp.execute(ActionRequest::Off).unwrap();
            }));
        }
    }
}

#[test]
fn drive_decides_and_acts_under_one_lock() {
    let rig = Rig::new();
    let lamp = rig.shared(16);
    let t0 = rig.clock.start();
    let mut auto =
        OccupancyAutomation::new(AutomationConfig::default(), &lamp.snapshot().unwrap(), t0);
    let mut quiet = RecordingSink::default();
    auto.drive(Some(false), t0, &lamp, &mut quiet);
    rig.wire.clear();

    let mut sink = Interloper {
        lamp: lamp.clone(),
        handles: Vec::new(),
    };
    auto.drive(Some(true), t0 + secs(2), &lamp, &mut sink);
    for h in sink.handles.drain(..) {
        h.join().unwrap();
    }

    // The other caller waits for the whole step, so the brightness the
    // automation chose for a lit lamp lands before the off, never after.
    assert_eq!(rig.wire.frames(), vec![OCCUPIED_FRAME, OFF_FRAME]);
    assert!(lamp.snapshot().unwrap().is_off);
}

#[test]
fn presence_after_manual_off_replays_the_last_settings() {
    let rig = Rig::with_state(LampState {
        last_level: 90,
        last_temp: ColourTemp::WARM,
        is_off: false,
    });
    let lamp = rig.shared(16);
    let t0 = rig.clock.start();
    let mut sink = RecordingSink::default();
    let mut auto =
        OccupancyAutomation::new(AutomationConfig::default(), &lamp.snapshot().unwrap(), t0);

    auto.drive(Some(false), t0, &lamp, &mut sink);
    lamp.execute(ActionRequest::Off).unwrap();
    rig.wire.clear();
    auto.drive(Some(true), t0 + secs(3), &lamp, &mut sink);

    let frames = rig.wire.frames();
    assert_eq!(frames.len(), 8);
    assert_eq!(frames[0], (0xA3, 0x10), "warm restored first");
    assert_eq!(frames[7], OCCUPIED_FRAME);
}
