//! Integration tests: boot, connection handling, and subevent responses.

use crate::mock_stack::{CONNECTION, Harness, RadioCall, SLOT, SYNC, report, slot_write};

use pawrtag::app::events::AppEvent;
use pawrtag::app::ports::SyncReceiveParams;
use pawrtag::error::{Error, SensorError, StackError, StackOp};
use pawrtag::events::{AttributeValue, TagEvent};
use pawrtag::fsm::TagState;
use pawrtag::pawr::codec::decode_sensor_response;

#[test]
fn boot_configures_sync_receive_then_advertises() {
    let mut h = Harness::new();
    h.send(TagEvent::Boot).unwrap();

    assert_eq!(
        h.radio.calls,
        vec![
            RadioCall::SetSyncReceive(SyncReceiveParams {
                skip: 0,
                timeout: 0x4000,
                report_all: true,
            }),
            RadioCall::StartAdvertising { interval_units: 800 },
        ]
    );
    assert_eq!(h.tag.app_state(), TagState::Advertising);
    assert_eq!(h.tag.sync_state(), TagState::Unsynced);
    assert!(h.sink.events.contains(&AppEvent::Started));
}

#[test]
fn connection_stops_advertising() {
    let mut h = Harness::new();
    h.send(TagEvent::Boot).unwrap();
    h.send(TagEvent::ConnectionOpened { connection: CONNECTION }).unwrap();

    assert_eq!(h.radio.calls.last(), Some(&RadioCall::StopAdvertising(0)));
    assert_eq!(h.tag.connection(), Some(CONNECTION));
    assert_eq!(h.tag.advertising_set(), None);
    assert_eq!(h.tag.app_state(), TagState::Idle);
}

#[test]
fn slot_write_assigns_slot() {
    let mut h = Harness::new();
    h.send(slot_write(12)).unwrap();
    assert_eq!(h.tag.response_slot(), Some(12));
    assert_eq!(h.sink.events, vec![AppEvent::SlotAssigned(12)]);

    h.send(slot_write(3)).unwrap();
    assert_eq!(h.tag.response_slot(), Some(3));
}

#[test]
fn empty_slot_write_is_ignored() {
    let mut h = Harness::new();
    h.send(slot_write(SLOT)).unwrap();
    h.send(TagEvent::AttributeValue {
        attribute: h.tag.config().response_slot_attribute,
        value: AttributeValue::new(),
    })
    .unwrap();
    assert_eq!(h.tag.response_slot(), Some(SLOT));
}

#[test]
fn sync_transfer_closes_connection() {
    let h = Harness::synced();
    assert!(h.radio.calls.contains(&RadioCall::CloseConnection(CONNECTION)));
    assert_eq!(h.tag.sync_state(), TagState::Synced);
    assert_eq!(h.tag.sync_handle(), Some(SYNC));
    assert!(h.sink.events.contains(&AppEvent::SyncEstablished {
        sync: SYNC,
        window_ms: 2500,
    }));
}

#[test]
fn connection_close_while_synced_does_not_advertise() {
    let mut h = Harness::synced();
    let before = h.radio.advertising_starts();
    h.send(TagEvent::ConnectionClosed {
        connection: CONNECTION,
        reason: 0x0216,
    })
    .unwrap();
    assert_eq!(h.radio.advertising_starts(), before);
    assert_eq!(h.tag.connection(), None);
}

#[test]
fn connection_close_without_sync_readvertises() {
    let mut h = Harness::new();
    h.send(TagEvent::Boot).unwrap();
    h.send(TagEvent::ConnectionOpened { connection: CONNECTION }).unwrap();
    h.send(TagEvent::ConnectionClosed {
        connection: CONNECTION,
        reason: 0x0208,
    })
    .unwrap();

    assert_eq!(h.radio.advertising_starts(), 2);
    assert_eq!(h.tag.app_state(), TagState::Advertising);
    assert_eq!(h.tag.advertising_set(), Some(1));
}

#[test]
fn ping_is_answered_in_same_subevent() {
    let mut h = Harness::synced();
    h.send(report(40, 2, &[2, SLOT, 9, 0])).unwrap();

    let responses = h.radio.responses();
    assert_eq!(responses.len(), 1);
    let (target, data) = &responses[0];
    assert_eq!(target.sync, SYNC);
    assert_eq!(target.event_counter, 40);
    assert_eq!(target.subevent, 2);
    assert_eq!(target.response_slot, SLOT);
    assert_eq!(data, &vec![SLOT, 0]);
    assert_eq!(h.sensors.reads, 0);
}

#[test]
fn sensor_request_is_answered_with_fresh_values() {
    let mut h = Harness::synced();
    h.send(report(41, 0, &[1, SLOT, 1])).unwrap();

    let responses = h.radio.responses();
    let (_, data) = &responses[0];
    assert_eq!(data.len(), 19);
    assert_eq!(&data[..2], &[SLOT, 1]);

    let reading = decode_sensor_response(&data[2..]).unwrap();
    assert_eq!(reading.temperature_centi_c, 2134);
    assert_eq!(reading.humidity_centi_pct, 4567);
    assert_eq!(reading.battery_level, 77);
    assert_eq!(h.sensors.reads, 1);
    assert_eq!(h.tag.stats().responses_published, 1);
}

#[test]
fn broadcast_request_is_answered() {
    let mut h = Harness::synced();
    h.send(report(1, 0, &[1, 255, 0])).unwrap();
    assert_eq!(h.radio.responses()[0].1, vec![SLOT, 0]);
}

#[test]
fn other_slots_get_no_response() {
    let mut h = Harness::synced();
    h.send(report(1, 0, &[2, 1, 2, 0])).unwrap();
    assert!(h.radio.responses().is_empty());
    assert_eq!(h.tag.stats().unmatched_reports, 1);
}

#[test]
fn empty_report_is_skipped_but_counted() {
    let mut h = Harness::synced();
    h.send(report(1, 0, &[])).unwrap();
    assert!(h.radio.responses().is_empty());
    assert_eq!(h.tag.stats().subevent_reports, 1);
    assert_eq!(h.tag.stats().unmatched_reports, 0);
}

#[test]
fn unknown_opcode_gets_no_response_but_rearms() {
    let mut h = Harness::synced();
    let arms = h.timer.arm_count();
    h.send(report(1, 0, &[1, SLOT, 0x7F])).unwrap();

    assert!(h.radio.responses().is_empty());
    assert_eq!(h.timer.arm_count(), arms + 1);
    assert_eq!(h.tag.stats().unknown_opcodes, 1);
}

#[test]
fn broadcast_before_slot_assignment_is_not_answered() {
    let mut h = Harness::new();
    h.send(TagEvent::Boot).unwrap();
    h.send(TagEvent::ConnectionOpened { connection: CONNECTION }).unwrap();
    h.send(TagEvent::SyncTransferReceived {
        sync: SYNC,
        adv_interval: 100,
        connection: CONNECTION,
    })
    .unwrap();
    h.send(report(1, 0, &[1, 255, 0])).unwrap();
    assert!(h.radio.responses().is_empty());
}

#[test]
fn sensor_failure_is_fatal() {
    let mut h = Harness::synced();
    h.sensors.climate = Err(SensorError::ChecksumMismatch);
    let err = h.send(report(1, 0, &[1, SLOT, 1])).unwrap_err();
    assert_eq!(err, Error::Sensor(SensorError::ChecksumMismatch));
    assert!(h.radio.responses().is_empty());
}

#[test]
fn response_data_failure_is_fatal() {
    let mut h = Harness::synced();
    h.radio.fail = Some(StackOp::SetResponseData);
    let err = h.send(report(1, 0, &[1, SLOT, 0])).unwrap_err();
    assert_eq!(err, Error::Stack(StackError::new(StackOp::SetResponseData, 0x0181)));
}

#[test]
fn published_responses_are_reported() {
    let mut h = Harness::synced();
    h.send(report(1, 0, &[1, SLOT, 0])).unwrap();
    assert!(matches!(
        h.sink.events.last(),
        Some(AppEvent::ResponsePublished { len: 2, .. })
    ));
}
