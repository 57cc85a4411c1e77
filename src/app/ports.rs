//! Port traits: the hexagonal boundary between the tag protocol and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ TagService (domain)
//! ```
//!
//! The radio stack, the sensors, and the one-shot timer are all driven
//! adapters.  [`TagService`](super::service::TagService) consumes them via
//! generics, so the protocol core never touches a controller or a bus
//! directly and every path can be exercised with recording mocks.
//!
//! Every stack call reports a status.  A failure comes back as
//! [`StackError`] and is fatal to the operation in progress; nothing here
//! retries.

use embassy_time::Duration;

use crate::error::{SensorError, StackError};
use crate::sensors::ClimateReading;

// ───────────────────────────────────────────────────────────────
// Radio port (domain → controller)
// ───────────────────────────────────────────────────────────────

/// Default parameters for periodic-sync transfers received over a connection.
///
/// The controller always synchronizes to a transferred train.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncReceiveParams {
    /// Periodic advertising events the controller may skip.
    pub skip: u16,
    /// Supervision timeout in 10 ms units.
    pub timeout: u16,
    /// Report every subevent rather than only changed data.
    pub report_all: bool,
}

/// Connectable advertising parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdvertisingParams {
    /// Interval in controller units of 0.625 ms (min == max).
    pub interval_units: u32,
}

/// Addressing for one subevent response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseTarget {
    pub sync: u16,
    pub event_counter: u16,
    pub subevent: u8,
    pub response_slot: u8,
}

/// Outward calls into the radio stack.
pub trait RadioPort {
    /// Configure how sync transfers received over connections are handled.
    fn set_default_sync_receive_parameters(
        &mut self,
        params: &SyncReceiveParams,
    ) -> Result<(), StackError>;

    /// Create an advertising set and start connectable advertising.
    /// Returns the advertising set handle.
    fn start_advertising(&mut self, params: &AdvertisingParams) -> Result<u8, StackError>;

    /// Stop advertising and delete the set.
    fn stop_advertising(&mut self, handle: u8) -> Result<(), StackError>;

    fn close_connection(&mut self, connection: u8) -> Result<(), StackError>;

    fn close_sync(&mut self, sync: u16) -> Result<(), StackError>;

    /// Queue `data` into the given subevent response slot.
    fn set_response_data(&mut self, target: &ResponseTarget, data: &[u8])
    -> Result<(), StackError>;
}

// ───────────────────────────────────────────────────────────────
// Sensor ports (hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Synchronous temperature + humidity measurement.
pub trait ClimateSensorPort {
    fn read_climate(&mut self) -> Result<ClimateReading, SensorError>;
}

/// Synchronous battery level measurement (0–100).
pub trait BatteryPort {
    fn read_battery_level(&mut self) -> Result<u8, SensorError>;
}

// ───────────────────────────────────────────────────────────────
// Timer port (domain → one-shot timer service)
// ───────────────────────────────────────────────────────────────

/// The single resync watchdog timer.
///
/// Expiry is reported asynchronously as
/// [`TagEvent::WatchdogExpired`](crate::events::TagEvent::WatchdogExpired)
/// through the event queue, never by calling back into the domain.
pub trait TimerPort {
    /// Start the one-shot, or restart it if already running.  Arming a
    /// running timer with the same duration is equivalent to a fresh arm.
    fn arm(&mut self, window: Duration) -> Result<(), StackError>;

    /// Stop the timer.  Cancelling an idle timer is not an error.
    fn cancel(&mut self) -> Result<(), StackError>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
