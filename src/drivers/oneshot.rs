//! Resync watchdog timer.
//!
//! On ESP-IDF the watchdog is a single `esp_timer` one-shot.  Its callback
//! runs in the esp_timer task and only signals
//! [`TagEvent::WatchdogExpired`](crate::events::TagEvent::WatchdogExpired)
//! through the event queue.
//!
//! On host, [`SimOneshotTimer`] keeps a manual clock that tests and the
//! simulation loop advance explicitly.

use embassy_time::Duration;
use log::debug;

use crate::app::ports::TimerPort;
use crate::error::StackError;
#[cfg(target_os = "espidf")]
use crate::error::StackOp;
#[cfg(target_os = "espidf")]
use crate::events::signal_watchdog_expired;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
unsafe extern "C" fn watchdog_expired_cb(_arg: *mut core::ffi::c_void) {
    signal_watchdog_expired();
}

/// `esp_timer`-backed one-shot.
#[cfg(target_os = "espidf")]
pub struct EspOneshotTimer {
    handle: esp_timer_handle_t,
}

#[cfg(target_os = "espidf")]
impl EspOneshotTimer {
    pub fn new() -> Result<Self, StackError> {
        let args = esp_timer_create_args_t {
            callback: Some(watchdog_expired_cb),
            arg: core::ptr::null_mut(),
            dispatch_method: esp_timer_dispatch_t_ESP_TIMER_TASK,
            name: b"resync\0".as_ptr() as *const _,
            skip_unhandled_events: true,
        };
        let mut handle: esp_timer_handle_t = core::ptr::null_mut();
        // SAFETY: args outlives the call; handle is written on success.
        let ret = unsafe { esp_timer_create(&args, &mut handle) };
        if ret != ESP_OK as i32 {
            return Err(StackError::new(StackOp::ArmTimer, ret as u16));
        }
        Ok(Self { handle })
    }

    /// Stop the timer; stopping an idle timer reports INVALID_STATE, which
    /// is not an error here.
    fn stop(&mut self, op: StackOp) -> Result<(), StackError> {
        // SAFETY: handle came from esp_timer_create and is never deleted
        // while self is alive.
        let ret = unsafe { esp_timer_stop(self.handle) };
        if ret != ESP_OK as i32 && ret != ESP_ERR_INVALID_STATE as i32 {
            return Err(StackError::new(op, ret as u16));
        }
        Ok(())
    }
}

#[cfg(target_os = "espidf")]
impl TimerPort for EspOneshotTimer {
    fn arm(&mut self, window: Duration) -> Result<(), StackError> {
        self.stop(StackOp::ArmTimer)?;
        // SAFETY: see `stop`.
        let ret = unsafe { esp_timer_start_once(self.handle, window.as_micros()) };
        if ret != ESP_OK as i32 {
            return Err(StackError::new(StackOp::ArmTimer, ret as u16));
        }
        debug!("resync timer armed for {} ms", window.as_millis());
        Ok(())
    }

    fn cancel(&mut self) -> Result<(), StackError> {
        self.stop(StackOp::CancelTimer)
    }
}

#[cfg(target_os = "espidf")]
impl Drop for EspOneshotTimer {
    fn drop(&mut self) {
        // SAFETY: see `stop`; the handle is not used after this.
        unsafe {
            esp_timer_stop(self.handle);
            esp_timer_delete(self.handle);
        }
    }
}

// ── Host simulation ───────────────────────────────────────────

/// Manual-clock one-shot for host runs.
#[derive(Debug, Default)]
pub struct SimOneshotTimer {
    now_ms: u64,
    deadline_ms: Option<u64>,
    arms: u32,
    cancels: u32,
}

impl SimOneshotTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the clock forward.  Returns `true` if the timer expired during
    /// the step; an expired timer is disarmed like the real one.
    pub fn advance(&mut self, ms: u64) -> bool {
        self.now_ms += ms;
        match self.deadline_ms {
            Some(deadline) if deadline <= self.now_ms => {
                self.deadline_ms = None;
                debug!("sim timer expired at {} ms", self.now_ms);
                true
            }
            _ => false,
        }
    }

    pub fn is_armed(&self) -> bool {
        self.deadline_ms.is_some()
    }

    /// Time left before expiry, if armed.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline_ms
            .map(|d| Duration::from_millis(d.saturating_sub(self.now_ms)))
    }

    pub fn arm_count(&self) -> u32 {
        self.arms
    }

    pub fn cancel_count(&self) -> u32 {
        self.cancels
    }
}

impl TimerPort for SimOneshotTimer {
    fn arm(&mut self, window: Duration) -> Result<(), StackError> {
        self.deadline_ms = Some(self.now_ms + window.as_millis());
        self.arms += 1;
        Ok(())
    }

    fn cancel(&mut self) -> Result<(), StackError> {
        self.deadline_ms = None;
        self.cancels += 1;
        Ok(())
    }
}
