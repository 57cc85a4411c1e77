//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured tag events to the
//! ESP-IDF logger (UART / USB-CDC in production, stderr on host).

use log::info;

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started => info!("START | advertising"),
            AppEvent::StateChanged { machine, from, to } => {
                info!("STATE | {} {} -> {}", machine.name(), from.name(), to.name());
            }
            AppEvent::SlotAssigned(slot) => info!("SLOT  | {}", slot),
            AppEvent::SyncEstablished { sync, window_ms } => {
                info!("SYNC  | handle={:#06x} watchdog={}ms", sync, window_ms);
            }
            AppEvent::ResponsePublished { opcode, len } => {
                log::debug!("RESP  | {} {}B", opcode, len);
            }
            AppEvent::SyncLost { sync } => match sync {
                Some(handle) => info!("LOST  | handle={:#06x}", handle),
                None => info!("LOST  | no handle"),
            },
        }
    }
}
