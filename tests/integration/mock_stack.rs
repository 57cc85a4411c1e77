//! Mock radio, sensors, and event sink for integration tests.
//!
//! Records every outbound radio call so tests can assert on the full
//! command history the service produced.

use pawrtag::app::events::AppEvent;
use pawrtag::app::ports::{
    AdvertisingParams, BatteryPort, ClimateSensorPort, EventSink, RadioPort, ResponseTarget,
    SyncReceiveParams,
};
use pawrtag::app::service::TagService;
use pawrtag::config::TagConfig;
use pawrtag::drivers::oneshot::SimOneshotTimer;
use pawrtag::error::{Result, SensorError, StackError, StackOp};
use pawrtag::events::{AttributeValue, SubeventReport, TagEvent};
use pawrtag::pawr::SubeventData;
use pawrtag::sensors::ClimateReading;

// ── Radio call record ─────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum RadioCall {
    SetSyncReceive(SyncReceiveParams),
    StartAdvertising { interval_units: u32 },
    StopAdvertising(u8),
    CloseConnection(u8),
    CloseSync(u16),
    Response { target: ResponseTarget, data: Vec<u8> },
}

// ── MockRadio ─────────────────────────────────────────────────

#[derive(Default)]
pub struct MockRadio {
    pub calls: Vec<RadioCall>,
    next_set: u8,
    /// Fail the next call of this kind with status 0x0181.
    pub fail: Option<StackOp>,
}

#[allow(dead_code)]
impl MockRadio {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn responses(&self) -> Vec<(ResponseTarget, Vec<u8>)> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                RadioCall::Response { target, data } => Some((*target, data.clone())),
                _ => None,
            })
            .collect()
    }

    pub fn advertising_starts(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, RadioCall::StartAdvertising { .. }))
            .count()
    }

    fn check(&mut self, op: StackOp) -> core::result::Result<(), StackError> {
        if self.fail == Some(op) {
            self.fail = None;
            return Err(StackError::new(op, 0x0181));
        }
        Ok(())
    }
}

impl RadioPort for MockRadio {
    fn set_default_sync_receive_parameters(
        &mut self,
        params: &SyncReceiveParams,
    ) -> core::result::Result<(), StackError> {
        self.check(StackOp::SetSyncReceiveParameters)?;
        self.calls.push(RadioCall::SetSyncReceive(*params));
        Ok(())
    }

    fn start_advertising(
        &mut self,
        params: &AdvertisingParams,
    ) -> core::result::Result<u8, StackError> {
        self.check(StackOp::StartAdvertising)?;
        self.calls.push(RadioCall::StartAdvertising {
            interval_units: params.interval_units,
        });
        let set = self.next_set;
        self.next_set += 1;
        Ok(set)
    }

    fn stop_advertising(&mut self, handle: u8) -> core::result::Result<(), StackError> {
        self.check(StackOp::StopAdvertising)?;
        self.calls.push(RadioCall::StopAdvertising(handle));
        Ok(())
    }

    fn close_connection(&mut self, connection: u8) -> core::result::Result<(), StackError> {
        self.check(StackOp::CloseConnection)?;
        self.calls.push(RadioCall::CloseConnection(connection));
        Ok(())
    }

    fn close_sync(&mut self, sync: u16) -> core::result::Result<(), StackError> {
        self.check(StackOp::CloseSync)?;
        self.calls.push(RadioCall::CloseSync(sync));
        Ok(())
    }

    fn set_response_data(
        &mut self,
        target: &ResponseTarget,
        data: &[u8],
    ) -> core::result::Result<(), StackError> {
        self.check(StackOp::SetResponseData)?;
        self.calls.push(RadioCall::Response {
            target: *target,
            data: data.to_vec(),
        });
        Ok(())
    }
}

// ── MockSensors ───────────────────────────────────────────────

pub struct MockSensors {
    pub climate: core::result::Result<ClimateReading, SensorError>,
    pub battery: core::result::Result<u8, SensorError>,
    pub reads: usize,
}

impl MockSensors {
    pub fn new() -> Self {
        Self {
            climate: Ok(ClimateReading {
                temperature_milli_c: 21_340,
                humidity_milli_pct: 45_670,
            }),
            battery: Ok(77),
            reads: 0,
        }
    }
}

impl ClimateSensorPort for MockSensors {
    fn read_climate(&mut self) -> core::result::Result<ClimateReading, SensorError> {
        self.reads += 1;
        self.climate
    }
}

impl BatteryPort for MockSensors {
    fn read_battery_level(&mut self) -> core::result::Result<u8, SensorError> {
        self.battery
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── Harness ───────────────────────────────────────────────────

pub const CONNECTION: u8 = 1;
pub const SYNC: u16 = 0x0042;
pub const SLOT: u8 = 7;

/// Service plus every port it talks to.
pub struct Harness {
    pub tag: TagService,
    pub radio: MockRadio,
    pub sensors: MockSensors,
    pub timer: SimOneshotTimer,
    pub sink: RecordingSink,
}

#[allow(dead_code)]
impl Harness {
    pub fn new() -> Self {
        Self {
            tag: TagService::new(TagConfig::default()),
            radio: MockRadio::new(),
            sensors: MockSensors::new(),
            timer: SimOneshotTimer::new(),
            sink: RecordingSink::default(),
        }
    }

    pub fn send(&mut self, event: TagEvent) -> Result<()> {
        self.tag.handle_event(
            event,
            &mut self.radio,
            &mut self.sensors,
            &mut self.timer,
            &mut self.sink,
        )
    }

    pub fn process(&mut self) -> Result<()> {
        self.tag.process_action(&mut self.radio, &mut self.sink)
    }

    /// Advance the sim clock and deliver an expiry if the timer fires.
    pub fn advance(&mut self, ms: u64) -> Result<bool> {
        let fired = self.timer.advance(ms);
        if fired {
            self.send(TagEvent::WatchdogExpired)?;
        }
        Ok(fired)
    }

    /// Boot → connect → slot write → sync transfer (100 ms interval).
    pub fn synced() -> Self {
        let mut h = Self::new();
        h.send(TagEvent::Boot).unwrap();
        h.send(TagEvent::ConnectionOpened { connection: CONNECTION }).unwrap();
        h.send(slot_write(SLOT)).unwrap();
        h.send(TagEvent::SyncTransferReceived {
            sync: SYNC,
            adv_interval: 100,
            connection: CONNECTION,
        })
        .unwrap();
        h
    }
}

pub fn slot_write(slot: u8) -> TagEvent {
    TagEvent::AttributeValue {
        attribute: TagConfig::default().response_slot_attribute,
        value: AttributeValue::from_slice(&[slot]).unwrap(),
    }
}

pub fn report(event_counter: u16, subevent: u8, data: &[u8]) -> TagEvent {
    report_on(SYNC, event_counter, subevent, data)
}

pub fn report_on(sync: u16, event_counter: u16, subevent: u8, data: &[u8]) -> TagEvent {
    TagEvent::SubeventReport(SubeventReport {
        sync,
        event_counter,
        subevent,
        data: SubeventData::from_slice(data).unwrap(),
    })
}
