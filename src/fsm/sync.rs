//! Periodic-sync lifecycle and the out-of-sync watchdog.
//!
//! The tag has no other way of noticing that it drifted off the broadcast
//! train: the controller keeps the sync "open" long after subevents stop
//! arriving.  Every subevent report therefore rearms a one-shot timer sized
//! to `missed_subevent_limit` periodic intervals plus a guard; if it ever
//! fires, the sync is torn down and the tag goes back to advertising.

use embassy_time::Duration;
use log::{debug, info, warn};

use super::{Machine, StateMachine, TagState};
use crate::app::ports::{RadioPort, TimerPort};
use crate::error::Result;

/// Resync watchdog window in milliseconds.
///
/// `limit × adv_interval × guard_percent / 100`, computed in integers
/// (`20 × 100 × 125 / 100 = 2500`).
pub fn resync_window(
    missed_subevent_limit: u16,
    adv_interval: u16,
    guard_percent: u16,
) -> Duration {
    let ms =
        u64::from(missed_subevent_limit) * u64::from(adv_interval) * u64::from(guard_percent) / 100;
    Duration::from_millis(ms)
}

/// Owner of the sync state, the sync handle, and the watchdog window.
pub struct SyncMachine {
    fsm: StateMachine,
    sync_handle: Option<u16>,
    window: Option<Duration>,
    missed_subevent_limit: u16,
    guard_percent: u16,
}

impl SyncMachine {
    pub fn new(missed_subevent_limit: u16, guard_percent: u16) -> Self {
        Self {
            fsm: StateMachine::new(Machine::Sync, TagState::Unsynced),
            sync_handle: None,
            window: None,
            missed_subevent_limit,
            guard_percent,
        }
    }

    /// Current sync state; the application machine reads this, never writes it.
    pub fn state(&self) -> TagState {
        self.fsm.current()
    }

    pub fn previous_state(&self) -> TagState {
        self.fsm.previous()
    }

    pub fn sync_handle(&self) -> Option<u16> {
        self.sync_handle
    }

    /// Window the watchdog is currently armed with, if synced.
    pub fn watchdog_window(&self) -> Option<Duration> {
        self.window
    }

    pub fn is_synced(&self) -> bool {
        self.fsm.current() == TagState::Synced
    }

    /// A sync transfer landed: capture the handle and arm the watchdog.
    ///
    /// A second transfer replaces the handle and rearms with the new
    /// window.  The replaced sync is closed on the controller first.
    pub fn on_transfer_received(
        &mut self,
        sync: u16,
        adv_interval: u16,
        radio: &mut impl RadioPort,
        timer: &mut impl TimerPort,
    ) -> Result<Duration> {
        if let Some(old) = self.sync_handle.filter(|&h| h != sync) {
            info!("sync {:#06x} replaced by {:#06x}, closing it", old, sync);
            radio.close_sync(old)?;
        }
        self.fsm.set_new_state(TagState::Synced);
        self.sync_handle = Some(sync);

        let window = resync_window(self.missed_subevent_limit, adv_interval, self.guard_percent);
        self.window = Some(window);
        timer.arm(window)?;

        info!(
            "sync {:#06x} established, interval {} → watchdog {} ms",
            sync,
            adv_interval,
            window.as_millis()
        );
        Ok(window)
    }

    /// Any subevent report, matched or not, proves the tag is still in range.
    pub fn on_subevent_observed(&mut self, timer: &mut impl TimerPort) -> Result<()> {
        match self.window {
            Some(window) if self.is_synced() => {
                timer.arm(window)?;
                debug!("watchdog rearmed for {} ms", window.as_millis());
            }
            _ => debug!("subevent report while {}, watchdog untouched", self.state().name()),
        }
        Ok(())
    }

    /// The watchdog fired.  Returns `true` if this moved the sync to
    /// `CloseSync`; an expiry that raced a sync close is dropped.
    pub fn on_watchdog_expired(&mut self) -> bool {
        if !self.is_synced() {
            debug!("stale watchdog expiry in {}, ignored", self.state().name());
            return false;
        }
        warn!(
            "no subevent within {} ms, sync {:?} lost",
            self.window.map_or(0, |w| w.as_millis()),
            self.sync_handle
        );
        self.fsm.set_new_state(TagState::CloseSync);
        true
    }

    /// The controller confirmed the sync is gone (explicit close or
    /// supervision timeout).  Cancels the watchdog so a late expiry cannot
    /// re-trigger `CloseSync`.
    ///
    /// Returns `false` and changes nothing when `sync` is not the tracked
    /// handle, as happens when a replaced sync finally goes away.
    pub fn on_sync_closed(&mut self, sync: u16, timer: &mut impl TimerPort) -> Result<bool> {
        if self.sync_handle.is_some_and(|h| h != sync) {
            debug!(
                "sync-closed for {:#06x} while tracking {:?}, ignored",
                sync, self.sync_handle
            );
            return Ok(false);
        }
        timer.cancel()?;
        self.sync_handle = None;
        self.window = None;
        self.fsm.set_new_state(TagState::Unsynced);
        Ok(true)
    }
}
