//! Integration tests: the resync watchdog and sync teardown.

use crate::mock_stack::{Harness, RadioCall, SLOT, SYNC, report, report_on};

use embassy_time::Duration;
use pawrtag::app::events::AppEvent;
use pawrtag::error::{Error, StackError, StackOp};
use pawrtag::events::TagEvent;
use pawrtag::fsm::{Machine, TagState};

#[test]
fn full_session_recovers_from_sync_loss() {
    let mut h = Harness::synced();
    assert_eq!(h.tag.watchdog_window(), Some(Duration::from_millis(2500)));
    assert_eq!(h.timer.remaining(), Some(Duration::from_millis(2500)));

    // A ping response 2 s in rearms the full window.
    assert!(!h.advance(2000).unwrap());
    h.send(report(20, 0, &[2, SLOT, 255, 0])).unwrap();
    assert_eq!(h.radio.responses()[0].1, vec![SLOT, 0]);
    assert_eq!(h.timer.remaining(), Some(Duration::from_millis(2500)));

    // Then silence.
    assert!(h.advance(2500).unwrap());
    assert_eq!(h.tag.sync_state(), TagState::CloseSync);
    assert_eq!(h.tag.app_state(), TagState::CloseSync);
    assert_eq!(h.tag.stats().sync_losses, 1);

    h.process().unwrap();
    assert_eq!(h.radio.calls.last(), Some(&RadioCall::CloseSync(SYNC)));
    assert_eq!(h.tag.app_state(), TagState::Idle);

    let adverts = h.radio.advertising_starts();
    h.send(TagEvent::SyncClosed {
        sync: SYNC,
        reason: 0,
    })
    .unwrap();
    assert_eq!(h.tag.sync_state(), TagState::Unsynced);
    assert_eq!(h.tag.sync_handle(), None);
    assert_eq!(h.radio.advertising_starts(), adverts + 1);
    assert_eq!(h.tag.app_state(), TagState::Advertising);
}

#[test]
fn watchdog_transition_is_reported() {
    let mut h = Harness::synced();
    h.advance(2500).unwrap();
    assert!(h.sink.events.contains(&AppEvent::StateChanged {
        machine: Machine::Sync,
        from: TagState::Synced,
        to: TagState::CloseSync,
    }));
    assert!(h.sink.events.contains(&AppEvent::SyncLost { sync: Some(SYNC) }));
}

#[test]
fn steady_reports_keep_sync_alive() {
    let mut h = Harness::synced();
    for counter in 0..50 {
        assert!(!h.advance(100).unwrap());
        h.send(report(counter, 0, &[1, 3, 0])).unwrap();
    }
    assert_eq!(h.tag.sync_state(), TagState::Synced);
    assert_eq!(h.tag.stats().subevent_reports, 50);
}

#[test]
fn sync_closed_cancels_watchdog() {
    let mut h = Harness::synced();
    h.send(TagEvent::SyncClosed {
        sync: SYNC,
        reason: 0x0208,
    })
    .unwrap();
    assert!(!h.timer.is_armed());
    assert_eq!(h.timer.cancel_count(), 1);
    assert!(!h.advance(10_000).unwrap());
    assert_eq!(h.tag.sync_state(), TagState::Unsynced);
}

#[test]
fn stale_expiry_is_ignored() {
    let mut h = Harness::synced();
    h.send(TagEvent::SyncClosed { sync: SYNC, reason: 0 }).unwrap();
    let app = h.tag.app_state();

    h.send(TagEvent::WatchdogExpired).unwrap();
    assert_eq!(h.tag.sync_state(), TagState::Unsynced);
    assert_eq!(h.tag.app_state(), app);
    assert_eq!(h.tag.stats().sync_losses, 0);
}

#[test]
fn expiry_before_any_sync_is_ignored() {
    let mut h = Harness::new();
    h.send(TagEvent::Boot).unwrap();
    h.send(TagEvent::WatchdogExpired).unwrap();
    assert_eq!(h.tag.sync_state(), TagState::Unsynced);
    assert_eq!(h.tag.app_state(), TagState::Advertising);
}

#[test]
fn window_scales_with_interval() {
    let mut h = Harness::new();
    h.send(TagEvent::SyncTransferReceived {
        sync: 1,
        adv_interval: 400,
        connection: 0,
    })
    .unwrap();
    assert_eq!(h.tag.watchdog_window(), Some(Duration::from_millis(10_000)));
}

#[test]
fn second_transfer_replaces_handle() {
    let mut h = Harness::synced();
    h.send(TagEvent::SyncTransferReceived {
        sync: 0x0099,
        adv_interval: 200,
        connection: 2,
    })
    .unwrap();
    assert_eq!(h.tag.sync_handle(), Some(0x0099));
    assert_eq!(h.tag.previous_sync_state(), TagState::Synced);
    assert_eq!(h.timer.remaining(), Some(Duration::from_millis(5000)));
    assert!(h.radio.calls.contains(&RadioCall::CloseSync(SYNC)));
}

#[test]
fn late_close_of_replaced_sync_keeps_live_sync() {
    const LIVE: u16 = 0x0099;
    let mut h = Harness::synced();
    h.send(TagEvent::SyncTransferReceived {
        sync: LIVE,
        adv_interval: 100,
        connection: 2,
    })
    .unwrap();
    let adverts = h.radio.advertising_starts();

    h.send(TagEvent::SyncClosed {
        sync: SYNC,
        reason: 0x003E,
    })
    .unwrap();
    assert_eq!(h.tag.sync_state(), TagState::Synced);
    assert_eq!(h.tag.sync_handle(), Some(LIVE));
    assert!(h.timer.is_armed());
    assert_eq!(h.timer.cancel_count(), 0);
    assert_eq!(h.radio.advertising_starts(), adverts);

    // Reports on the live sync still answer and still rearm.
    assert!(!h.advance(2000).unwrap());
    h.send(report_on(LIVE, 5, 0, &[1, SLOT, 0])).unwrap();
    assert_eq!(h.radio.responses().len(), 1);
    assert_eq!(h.timer.remaining(), Some(Duration::from_millis(2500)));

    // The live sync's own close still tears down.
    h.send(TagEvent::SyncClosed { sync: LIVE, reason: 0 }).unwrap();
    assert_eq!(h.tag.sync_state(), TagState::Unsynced);
    assert!(!h.timer.is_armed());
}

#[test]
fn repeated_transfer_of_same_sync_is_not_closed() {
    let mut h = Harness::synced();
    h.send(TagEvent::SyncTransferReceived {
        sync: SYNC,
        adv_interval: 100,
        connection: 2,
    })
    .unwrap();
    assert!(!h.radio.calls.contains(&RadioCall::CloseSync(SYNC)));
    assert_eq!(h.tag.sync_handle(), Some(SYNC));
}

#[test]
fn close_sync_failure_is_fatal() {
    let mut h = Harness::synced();
    h.advance(2500).unwrap();
    h.radio.fail = Some(StackOp::CloseSync);
    assert_eq!(
        h.process(),
        Err(Error::Stack(StackError::new(StackOp::CloseSync, 0x0181)))
    );
    assert_eq!(h.tag.app_state(), TagState::CloseSync);
}

#[test]
fn process_action_runs_once() {
    let mut h = Harness::synced();
    h.advance(2500).unwrap();
    h.process().unwrap();
    h.process().unwrap();
    let closes = h
        .radio
        .calls
        .iter()
        .filter(|c| matches!(c, RadioCall::CloseSync(_)))
        .count();
    assert_eq!(closes, 1);
}
