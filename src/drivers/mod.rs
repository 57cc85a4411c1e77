//! Timers, watchdogs, and peripheral helpers.

pub mod oneshot;
#[cfg(target_os = "espidf")]
pub mod supply_adc;
pub mod watchdog;
