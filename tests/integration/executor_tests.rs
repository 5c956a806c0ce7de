//! Action executor against the real bridge over a recording device.

use std::time::Duration;

use dalictl::app::commands::ActionRequest;
use dalictl::app::service::Outcome;
use dalictl::error::{Error, TransportError};
use dalictl::protocol::ColourTemp;
use dalictl::state::LampState;

use crate::mock_hw::{MemStore, PACING, Rig};

const COOL_FRAMES: [(u8, u8); 6] = [
    (0xA3, 0x32),
    (0xC3, 0x00),
    (0xC1, 0x08),
    (0xFF, 0xE7),
    (0xC1, 0x08),
    (0xFF, 0xE2),
];

fn lamp(level: u8, temp: ColourTemp, is_off: bool) -> LampState {
    LampState {
        last_level: level,
        last_temp: temp,
        is_off,
    }
}

#[test]
fn brightness_off_and_restore_scenario() {
    let rig = Rig::new();
    let mut svc = rig.service(4);
    assert_eq!(svc.state(), lamp(254, ColourTemp::COOL, false));

    assert_eq!(
        svc.execute(ActionRequest::SetBrightnessPct(50.0)).unwrap(),
        Outcome::Executed { frames: 1 }
    );
    assert_eq!(rig.wire.frames(), vec![(0xFE, 127)]);
    assert_eq!(svc.state().last_level, 127);

    rig.wire.clear();
    svc.execute(ActionRequest::Off).unwrap();
    assert_eq!(rig.wire.frames(), vec![(0xFF, 0x00)]);
    assert!(svc.state().is_off);
    assert_eq!(svc.state().last_level, 127, "off keeps the level");

    rig.wire.clear();
    assert_eq!(
        svc.execute(ActionRequest::OnLast).unwrap(),
        Outcome::Executed { frames: 7 }
    );
    let mut expected = COOL_FRAMES.to_vec();
    expected.push((0xFE, 127));
    assert_eq!(rig.wire.frames(), expected);
    assert_eq!(svc.state(), lamp(127, ColourTemp::COOL, false));
}

#[test]
fn repeated_preset_writes_once() {
    let rig = Rig::with_state(lamp(200, ColourTemp::WARM, false));
    let mut svc = rig.service(4);

    assert_eq!(
        svc.execute(ActionRequest::SetWhite).unwrap(),
        Outcome::Executed { frames: 6 }
    );
    assert_eq!(svc.execute(ActionRequest::SetWhite).unwrap(), Outcome::Redundant);
    assert_eq!(rig.wire.frames(), COOL_FRAMES.to_vec());
    assert_eq!(rig.store.saves(), 1, "redundant request must not persist");
}

#[test]
fn off_then_on_last_restores_warm_level() {
    let rig = Rig::with_state(lamp(88, ColourTemp::WARM, false));
    let mut svc = rig.service(4);

    svc.execute(ActionRequest::Off).unwrap();
    svc.execute(ActionRequest::OnLast).unwrap();
    assert_eq!(svc.state(), lamp(88, ColourTemp::WARM, false));

    let frames = rig.wire.frames();
    assert_eq!(frames[1], (0xA3, 0x10));
    assert_eq!(frames[2], (0xC3, 0x27));
    assert_eq!(*frames.last().unwrap(), (0xFE, 88));
}

#[test]
fn on_last_from_level_zero_reilluminates_at_half() {
    let rig = Rig::with_state(lamp(0, ColourTemp::COOL, true));
    let mut svc = rig.service(4);

    svc.execute(ActionRequest::OnLast).unwrap();
    assert_eq!(*rig.wire.frames().last().unwrap(), (0xFE, 127));
    assert_eq!(svc.state(), lamp(127, ColourTemp::COOL, false));
}

#[test]
fn on_last_rewrites_even_when_already_on() {
    let rig = Rig::new();
    let mut svc = rig.service(4);
    assert_eq!(
        svc.execute(ActionRequest::OnLast).unwrap(),
        Outcome::Executed { frames: 7 }
    );
}

#[test]
fn fifth_action_waits_for_the_window() {
    let rig = Rig::with_state(lamp(254, ColourTemp::COOL, false));
    let mut svc = rig.service(4);

    for level in [10, 20, 30, 40, 50] {
        svc.execute(ActionRequest::SetBrightnessLevel(level)).unwrap();
    }

    let writes = rig.wire.writes();
    assert_eq!(writes.len(), 5, "nothing is dropped");
    assert!(writes[3].at - writes[0].at < Duration::from_millis(200));
    assert!(
        writes[4].at - writes[0].at >= Duration::from_secs(1),
        "5th write at {:?}, 1st at {:?}",
        writes[4].at,
        writes[0].at
    );
    assert_eq!(svc.state().last_level, 50);
}

#[test]
fn rate_window_counts_from_when_an_action_completes() {
    let rig = Rig::with_state(lamp(254, ColourTemp::WARM, false));
    let mut svc = rig.service(1);

    svc.execute(ActionRequest::SetWhite).unwrap();
    svc.execute(ActionRequest::SetYellow).unwrap();

    let writes = rig.wire.writes();
    assert_eq!(writes.len(), 12);
    let first_done = writes[5].at + PACING;
    assert!(
        writes[6].at - first_done >= Duration::from_secs(1),
        "second action started {:?} after the first finished",
        writes[6].at - first_done
    );
}

#[test]
fn redundant_requests_do_not_consume_the_rate_budget() {
    let rig = Rig::new();
    let mut svc = rig.service(1);

    svc.execute(ActionRequest::SetBrightnessLevel(10)).unwrap();
    for _ in 0..5 {
        assert_eq!(
            svc.execute(ActionRequest::SetBrightnessLevel(10)).unwrap(),
            Outcome::Redundant
        );
    }
    assert_eq!(rig.clock.elapsed(), PACING, "only the pacing delay elapsed");
}

#[test]
fn frame_counter_starts_at_two_and_increments() {
    let rig = Rig::with_state(lamp(254, ColourTemp::WARM, false));
    let mut svc = rig.service(4);
    svc.execute(ActionRequest::SetWhite).unwrap();

    let counters: Vec<u8> = rig.wire.writes().iter().map(|w| w.counter).collect();
    assert_eq!(counters, vec![2, 3, 4, 5, 6, 7]);
}

#[test]
fn frames_are_paced() {
    let rig = Rig::with_state(lamp(254, ColourTemp::WARM, false));
    let mut svc = rig.service(4);
    svc.execute(ActionRequest::SetWhite).unwrap();

    let writes = rig.wire.writes();
    for pair in writes.windows(2) {
        assert_eq!(pair[1].at - pair[0].at, PACING);
    }
}

#[test]
fn transport_failure_is_reported_and_not_recorded() {
    let rig = Rig::new();
    let mut svc = rig.service(4);
    rig.wire.set_failing(true);

    let err = svc.execute(ActionRequest::Off).unwrap_err();
    assert_eq!(
        err,
        Error::Transport(TransportError::Io(std::io::ErrorKind::BrokenPipe))
    );
    assert!(!svc.state().is_off);
    assert_eq!(rig.store.saves(), 0);

    rig.wire.set_failing(false);
    svc.execute(ActionRequest::Off).unwrap();
    assert!(svc.state().is_off);
}

#[test]
fn state_survives_a_restart() {
    let rig = Rig::new();
    {
        let mut svc = rig.service(4);
        svc.execute(ActionRequest::SetYellow).unwrap();
        svc.execute(ActionRequest::SetBrightnessPct(20.0)).unwrap();
        svc.execute(ActionRequest::Off).unwrap();
    }
    let restarted = rig.service(4);
    assert_eq!(restarted.state(), lamp(51, ColourTemp::WARM, true));
    assert_eq!(rig.store.saved(), Some(restarted.state()));
}

#[test]
fn corrupted_snapshot_falls_back_to_defaults() {
    let rig = Rig::with_store(MemStore::corrupted());
    let svc = rig.service(4);
    assert_eq!(svc.state(), LampState::default());
}

#[test]
fn apply_all_runs_each_request_in_order() {
    let rig = Rig::new();
    let mut svc = rig.service(16);
    let results = svc.apply_all(&[
        ActionRequest::SetYellow,
        ActionRequest::SetBrightnessPct(50.0),
        ActionRequest::SetBrightnessPct(50.0),
        ActionRequest::RecallMax,
    ]);
    assert_eq!(
        results,
        vec![
            Ok(Outcome::Executed { frames: 6 }),
            Ok(Outcome::Executed { frames: 1 }),
            Ok(Outcome::Redundant),
            Ok(Outcome::Executed { frames: 1 }),
        ]
    );
    assert_eq!(*rig.wire.frames().last().unwrap(), (0xFF, 0x05));
    assert_eq!(svc.state().last_level, 254);
}
