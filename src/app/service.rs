//! Tag service, the hexagonal core.
//!
//! [`TagService`] owns both state machines, the handles the radio hands
//! out, and the response slot.  Every inbound [`TagEvent`] goes through
//! [`TagService::handle_event`]; the only other entry point is
//! [`TagService::process_action`], the deferred step the main loop runs
//! after each drained batch.
//!
//! ```text
//!  TagEvent ──▶ ┌─────────────────────────────┐ ──▶ RadioPort
//!               │         TagService           │ ──▶ TimerPort
//!  Sensors ◀────│  app FSM · sync FSM · slot   │ ──▶ EventSink
//!               └─────────────────────────────┘
//! ```

use log::{debug, info, warn};

use crate::config::TagConfig;
use crate::diagnostics::TagStats;
use crate::error::Result;
use crate::events::{SubeventReport, TagEvent};
use crate::fsm::sync::SyncMachine;
use crate::fsm::{Machine, StateMachine, TagState};
use crate::pawr::codec::find_address;
use crate::pawr::dispatch::ResponseDispatcher;
use crate::pawr::{Opcode, UNASSIGNED_SLOT};

use super::events::AppEvent;
use super::ports::{
    AdvertisingParams, BatteryPort, ClimateSensorPort, EventSink, RadioPort, ResponseTarget,
    SyncReceiveParams, TimerPort,
};

// ───────────────────────────────────────────────────────────────
// TagService
// ───────────────────────────────────────────────────────────────

pub struct TagService {
    config: TagConfig,
    app: StateMachine,
    sync: SyncMachine,
    response_slot: Option<u8>,
    connection: Option<u8>,
    advertising_set: Option<u8>,
    dispatcher: ResponseDispatcher,
    stats: TagStats,
}

impl TagService {
    /// Build the service.  Nothing touches the radio until
    /// [`TagEvent::Boot`] arrives.
    pub fn new(config: TagConfig) -> Self {
        let sync = SyncMachine::new(config.missed_subevent_limit, config.window_guard_percent);
        let dispatcher = ResponseDispatcher::new(config.response_budget_ms);
        Self {
            config,
            app: StateMachine::new(Machine::Application, TagState::Idle),
            sync,
            response_slot: None,
            connection: None,
            advertising_set: None,
            dispatcher,
            stats: TagStats::new(),
        }
    }

    // ── Event handling ────────────────────────────────────────

    /// Apply one inbound event.
    ///
    /// The `hw` parameter satisfies **both** sensor ports so the read path
    /// borrows one adapter.  Any `Err` is a failed stack call or sensor
    /// read and is fatal to the caller.
    pub fn handle_event(
        &mut self,
        event: TagEvent,
        radio: &mut impl RadioPort,
        hw: &mut (impl ClimateSensorPort + BatteryPort),
        timer: &mut impl TimerPort,
        sink: &mut impl EventSink,
    ) -> Result<()> {
        debug!("event: {}", event.name());
        match event {
            TagEvent::Boot => self.on_boot(radio, sink),
            TagEvent::ConnectionOpened { connection } => {
                self.on_connection_opened(connection, radio, sink)
            }
            TagEvent::ConnectionClosed { connection, reason } => {
                self.on_connection_closed(connection, reason, radio, sink)
            }
            TagEvent::AttributeValue { attribute, value } => {
                self.on_attribute_value(attribute, &value, sink);
                Ok(())
            }
            TagEvent::SyncTransferReceived {
                sync,
                adv_interval,
                connection,
            } => self.on_sync_transfer(sync, adv_interval, connection, radio, timer, sink),
            TagEvent::SubeventReport(report) => {
                self.on_subevent_report(&report, radio, hw, timer, sink)
            }
            TagEvent::SyncClosed { sync, reason } => {
                self.on_sync_closed(sync, reason, radio, timer, sink)
            }
            TagEvent::WatchdogExpired => {
                self.on_watchdog_expired(sink);
                Ok(())
            }
        }
    }

    /// Deferred work: close a sync the watchdog gave up on.
    ///
    /// Runs outside `handle_event` so the close request never races the
    /// report that is still being handled.
    pub fn process_action(
        &mut self,
        radio: &mut impl RadioPort,
        sink: &mut impl EventSink,
    ) -> Result<()> {
        if self.app.current() != TagState::CloseSync {
            return Ok(());
        }
        match self.sync.sync_handle() {
            Some(handle) => {
                info!("closing sync {:#06x}", handle);
                radio.close_sync(handle)?;
            }
            None => warn!("CloseSync without a sync handle"),
        }
        self.set_app_state(TagState::Idle, sink);
        Ok(())
    }

    /// Move the application machine and report the change.
    pub fn set_app_state(&mut self, next: TagState, sink: &mut impl EventSink) {
        let from = self.app.current();
        self.app.set_new_state(next);
        if from != next {
            sink.emit(&AppEvent::StateChanged {
                machine: Machine::Application,
                from,
                to: next,
            });
        }
    }

    // ── Per-event handlers ────────────────────────────────────

    fn on_boot(&mut self, radio: &mut impl RadioPort, sink: &mut impl EventSink) -> Result<()> {
        let params = SyncReceiveParams {
            skip: self.config.sync_skip,
            timeout: self.config.sync_timeout,
            report_all: self.config.report_all,
        };
        radio.set_default_sync_receive_parameters(&params)?;
        self.start_advertising(radio, sink)?;
        info!("tag up, waiting for the access point");
        sink.emit(&AppEvent::Started);
        Ok(())
    }

    fn on_connection_opened(
        &mut self,
        connection: u8,
        radio: &mut impl RadioPort,
        sink: &mut impl EventSink,
    ) -> Result<()> {
        info!("connection {} opened", connection);
        self.connection = Some(connection);
        if let Some(set) = self.advertising_set.take() {
            radio.stop_advertising(set)?;
        }
        self.set_app_state(TagState::Idle, sink);
        Ok(())
    }

    fn on_connection_closed(
        &mut self,
        connection: u8,
        reason: u16,
        radio: &mut impl RadioPort,
        sink: &mut impl EventSink,
    ) -> Result<()> {
        info!("connection {} closed (reason {:#06x})", connection, reason);
        if self.connection == Some(connection) {
            self.connection = None;
        }
        if self.sync.is_synced() {
            debug!("synced, staying quiet");
            return Ok(());
        }
        self.start_advertising(radio, sink)
    }

    fn on_attribute_value(&mut self, attribute: u16, value: &[u8], sink: &mut impl EventSink) {
        if attribute != self.config.response_slot_attribute {
            debug!("write to attribute {:#06x} ignored", attribute);
            return;
        }
        let Some(&slot) = value.first() else {
            debug!("empty response-slot write ignored");
            return;
        };
        info!("response slot {:?} -> {}", self.response_slot, slot);
        self.response_slot = Some(slot);
        sink.emit(&AppEvent::SlotAssigned(slot));
    }

    fn on_sync_transfer(
        &mut self,
        sync: u16,
        adv_interval: u16,
        connection: u8,
        radio: &mut impl RadioPort,
        timer: &mut impl TimerPort,
        sink: &mut impl EventSink,
    ) -> Result<()> {
        radio.close_connection(connection)?;

        let from = self.sync.state();
        let window = self
            .sync
            .on_transfer_received(sync, adv_interval, radio, timer)?;
        self.emit_sync_change(from, sink);

        self.stats.sync_establishments += 1;
        sink.emit(&AppEvent::SyncEstablished {
            sync,
            window_ms: window.as_millis(),
        });
        Ok(())
    }

    fn on_subevent_report(
        &mut self,
        report: &SubeventReport,
        radio: &mut impl RadioPort,
        hw: &mut (impl ClimateSensorPort + BatteryPort),
        timer: &mut impl TimerPort,
        sink: &mut impl EventSink,
    ) -> Result<()> {
        self.sync.on_subevent_observed(timer)?;
        self.stats.subevent_reports += 1;

        if report.data.is_empty() {
            return Ok(());
        }

        let my_slot = self.response_slot.unwrap_or(UNASSIGNED_SLOT);
        let Some(opcode) = find_address(&report.data, my_slot) else {
            self.stats.unmatched_reports += 1;
            return Ok(());
        };
        let Some(slot) = self.response_slot else {
            warn!("addressed by broadcast before a response slot was assigned");
            return Ok(());
        };

        let Some(response) = self.dispatcher.handle_opcode(opcode, slot, hw)? else {
            self.stats.unknown_opcodes += 1;
            return Ok(());
        };

        let target = ResponseTarget {
            sync: report.sync,
            event_counter: report.event_counter,
            subevent: report.subevent,
            response_slot: slot,
        };
        radio.set_response_data(&target, response.as_bytes())?;
        self.stats.responses_published += 1;

        if let Some(op) = Opcode::from_u8(opcode) {
            sink.emit(&AppEvent::ResponsePublished {
                opcode: op,
                len: response.as_bytes().len(),
            });
        }
        Ok(())
    }

    fn on_sync_closed(
        &mut self,
        sync: u16,
        reason: u16,
        radio: &mut impl RadioPort,
        timer: &mut impl TimerPort,
        sink: &mut impl EventSink,
    ) -> Result<()> {
        info!("sync {:#06x} closed (reason {:#06x})", sync, reason);
        let from = self.sync.state();
        if !self.sync.on_sync_closed(sync, timer)? {
            return Ok(());
        }
        self.emit_sync_change(from, sink);
        self.start_advertising(radio, sink)
    }

    fn on_watchdog_expired(&mut self, sink: &mut impl EventSink) {
        let from = self.sync.state();
        if !self.sync.on_watchdog_expired() {
            return;
        }
        self.emit_sync_change(from, sink);
        self.set_app_state(TagState::CloseSync, sink);

        self.stats.sync_losses += 1;
        info!("session: {}", self.stats);
        sink.emit(&AppEvent::SyncLost {
            sync: self.sync.sync_handle(),
        });
    }

    // ── Internal ──────────────────────────────────────────────

    fn start_advertising(
        &mut self,
        radio: &mut impl RadioPort,
        sink: &mut impl EventSink,
    ) -> Result<()> {
        if let Some(set) = self.advertising_set {
            debug!("already advertising on set {}", set);
            return Ok(());
        }
        let params = AdvertisingParams {
            interval_units: self.config.advertising_interval_units(),
        };
        let set = radio.start_advertising(&params)?;
        self.advertising_set = Some(set);
        self.set_app_state(TagState::Advertising, sink);
        Ok(())
    }

    fn emit_sync_change(&self, from: TagState, sink: &mut impl EventSink) {
        let to = self.sync.state();
        if from != to {
            sink.emit(&AppEvent::StateChanged {
                machine: Machine::Sync,
                from,
                to,
            });
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn app_state(&self) -> TagState {
        self.app.current()
    }

    pub fn previous_app_state(&self) -> TagState {
        self.app.previous()
    }

    pub fn sync_state(&self) -> TagState {
        self.sync.state()
    }

    pub fn previous_sync_state(&self) -> TagState {
        self.sync.previous_state()
    }

    pub fn sync_handle(&self) -> Option<u16> {
        self.sync.sync_handle()
    }

    pub fn watchdog_window(&self) -> Option<embassy_time::Duration> {
        self.sync.watchdog_window()
    }

    pub fn response_slot(&self) -> Option<u8> {
        self.response_slot
    }

    pub fn connection(&self) -> Option<u8> {
        self.connection
    }

    pub fn advertising_set(&self) -> Option<u8> {
        self.advertising_set
    }

    pub fn stats(&self) -> &TagStats {
        &self.stats
    }

    pub fn config(&self) -> &TagConfig {
        &self.config
    }
}
