//! Runtime counters and the panic hook.
//!
//! [`TagStats`] is owned by the service and bumped from inside
//! `handle_event`, so no atomics are needed.  A snapshot is logged every
//! time the sync is lost, which is usually the moment someone wants to
//! know how the last session went.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Per-boot protocol counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagStats {
    /// Every subevent report delivered, empty ones included.
    pub subevent_reports: u32,
    /// Responses handed to the radio.
    pub responses_published: u32,
    /// Reports whose header named neither our slot nor broadcast.
    pub unmatched_reports: u32,
    pub unknown_opcodes: u32,
    pub sync_establishments: u32,
    /// Watchdog expiries that tore down a sync.
    pub sync_losses: u32,
}

impl TagStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fraction of reports that produced a response, in percent.
    pub fn response_rate_percent(&self) -> u32 {
        if self.subevent_reports == 0 {
            return 0;
        }
        (u64::from(self.responses_published) * 100 / u64::from(self.subevent_reports)) as u32
    }
}

impl fmt::Display for TagStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "reports={} responses={} ({}%) unmatched={} unknown_op={} syncs={} lost={}",
            self.subevent_reports,
            self.responses_published,
            self.response_rate_percent(),
            self.unmatched_reports,
            self.unknown_opcodes,
            self.sync_establishments,
            self.sync_losses,
        )
    }
}

// ───────────────────────────────────────────────────────────────
// Panic hook
// ───────────────────────────────────────────────────────────────

/// Install a panic hook that logs the reason (and uptime on device)
/// before the default handler aborts and the chip resets.
pub fn install_panic_handler() {
    std::panic::set_hook(Box::new(|info| {
        let reason = if let Some(msg) = info.payload().downcast_ref::<&str>() {
            *msg
        } else if let Some(msg) = info.payload().downcast_ref::<String>() {
            msg.as_str()
        } else {
            "unknown panic"
        };

        #[cfg(target_os = "espidf")]
        {
            // SAFETY: esp_timer_get_time is a plain counter read, usable
            // from panic context.
            let uptime_ms = (unsafe { esp_idf_svc::sys::esp_timer_get_time() }) / 1_000;
            log::error!("PANIC after {} ms: {}", uptime_ms, reason);
        }

        #[cfg(not(target_os = "espidf"))]
        log::error!("PANIC: {}", reason);
    }));
}
