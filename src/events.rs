//! Inbound event queue.
//!
//! Events are produced by:
//! - the radio stack's event callback (boot, connections, GATT writes,
//!   sync transfers, subevent reports, sync loss)
//! - the resync watchdog's one-shot timer callback
//!
//! Events are consumed by the main loop, which feeds them one at a time
//! into [`TagService::handle_event`](crate::app::service::TagService::handle_event).
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌──────────────┐
//! │ Radio stack │────▶│  Event Queue │────▶│  Main Loop   │
//! │ Timer task  │────▶│  (bounded)   │     │  (consumer)  │
//! └─────────────┘     └──────────────┘     └──────────────┘
//! ```
//!
//! Producers never touch tag state; they only enqueue.

use core::sync::atomic::{AtomicBool, Ordering};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;

use crate::pawr::SubeventData;

/// Maximum number of pending events.
const EVENT_QUEUE_CAP: usize = 16;

/// Largest GATT attribute write the tag keeps.
pub const MAX_ATTRIBUTE_VALUE: usize = 32;

pub type AttributeValue = heapless::Vec<u8, MAX_ATTRIBUTE_VALUE>;

/// One periodic-advertising subevent as delivered by the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubeventReport {
    pub sync: u16,
    pub event_counter: u16,
    pub subevent: u8,
    pub data: SubeventData,
}

/// Everything that can wake the tag's state machines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagEvent {
    /// The radio stack finished initialising.
    Boot,
    /// A central connected.
    ConnectionOpened { connection: u8 },
    /// A connection ended; `reason` is the stack's disconnect status.
    ConnectionClosed { connection: u8, reason: u16 },
    /// A central wrote a local GATT attribute.
    AttributeValue {
        attribute: u16,
        value: AttributeValue,
    },
    /// Periodic sync handed over from the connected central.
    SyncTransferReceived {
        sync: u16,
        /// Periodic advertising interval, in milliseconds.
        adv_interval: u16,
        connection: u8,
    },
    SubeventReport(SubeventReport),
    /// The controller dropped or closed the sync.
    SyncClosed { sync: u16, reason: u16 },
    /// The resync watchdog ran out.
    WatchdogExpired,
}

impl TagEvent {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Boot => "boot",
            Self::ConnectionOpened { .. } => "connection-opened",
            Self::ConnectionClosed { .. } => "connection-closed",
            Self::AttributeValue { .. } => "attribute-value",
            Self::SyncTransferReceived { .. } => "sync-transfer-received",
            Self::SubeventReport(_) => "subevent-report",
            Self::SyncClosed { .. } => "sync-closed",
            Self::WatchdogExpired => "watchdog-expired",
        }
    }
}

static EVENT_QUEUE: Channel<CriticalSectionRawMutex, TagEvent, EVENT_QUEUE_CAP> = Channel::new();

/// Push an event into the queue.
/// Safe to call from the radio and timer task contexts.
/// Returns `false` if the queue is full (event dropped).
pub fn push_event(event: TagEvent) -> bool {
    match EVENT_QUEUE.try_send(event) {
        Ok(()) => true,
        Err(_) => {
            log::warn!("event queue full, event dropped");
            false
        }
    }
}

/// Set when a watchdog expiry found the queue full.
static WATCHDOG_LATCH: AtomicBool = AtomicBool::new(false);

/// Report a watchdog expiry from the timer task.
///
/// The one-shot does not fire again on its own, so an expiry that cannot
/// be queued is latched until [`requeue_latched_watchdog`] gets it in.
pub fn signal_watchdog_expired() {
    if !push_event(TagEvent::WatchdogExpired) {
        log::error!("watchdog expiry latched, queue full");
        WATCHDOG_LATCH.store(true, Ordering::Release);
    }
}

/// Queue a latched watchdog expiry.  The main loop calls this before each
/// drain.  Returns `true` if an expiry was queued.
pub fn requeue_latched_watchdog() -> bool {
    if !WATCHDOG_LATCH.swap(false, Ordering::AcqRel) {
        return false;
    }
    if push_event(TagEvent::WatchdogExpired) {
        return true;
    }
    WATCHDOG_LATCH.store(true, Ordering::Release);
    false
}

/// Pop the next event from the queue.
/// Returns `None` if the queue is empty.
pub fn pop_event() -> Option<TagEvent> {
    EVENT_QUEUE.try_receive().ok()
}

/// Drain all pending events, calling `handler` for each one.
/// Returns the number of events processed.
///
/// Stops at the first handler error and returns it; events queued behind
/// it stay in the queue.
pub fn drain_events<E>(
    mut handler: impl FnMut(TagEvent) -> Result<(), E>,
) -> Result<usize, E> {
    let mut count = 0;
    while let Some(event) = pop_event() {
        handler(event)?;
        count += 1;
    }
    Ok(count)
}

/// Number of pending events.
pub fn queue_len() -> usize {
    EVENT_QUEUE.len()
}

pub fn queue_is_empty() -> bool {
    EVENT_QUEUE.is_empty()
}
