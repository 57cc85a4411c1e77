//! Outbound application events.
//!
//! The [`TagService`](super::service::TagService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them (serial log, a GATT notify, a test
//! recorder).

use crate::fsm::{Machine, TagState};
use crate::pawr::Opcode;

/// Structured events emitted by the tag core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// Boot handling finished and the tag is advertising.
    Started,

    /// One of the two state machines moved.
    StateChanged {
        machine: Machine,
        from: TagState,
        to: TagState,
    },

    /// The central assigned (or reassigned) the response slot.
    SlotAssigned(u8),

    /// Periodic sync established; the watchdog is armed with `window_ms`.
    SyncEstablished { sync: u16, window_ms: u64 },

    /// A response was queued for the current subevent.
    ResponsePublished { opcode: Opcode, len: usize },

    /// The watchdog fired and the sync is being torn down.
    SyncLost { sync: Option<u16> },
}
