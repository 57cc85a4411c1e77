//! Tag configuration parameters
//!
//! All tunable parameters for the sensor tag.  Defaults match the values the
//! access point expects; `validate()` rejects combinations that would make
//! the resync watchdog or battery scaling meaningless.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Core tag configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagConfig {
    // --- Periodic sync ---
    /// Number of subevents that may be missed before the tag re-advertises
    pub missed_subevent_limit: u16,
    /// Guard applied to the resync window, in percent (125 = ×1.25)
    pub window_guard_percent: u16,
    /// Periodic advertising events the controller may skip
    pub sync_skip: u16,
    /// Controller-side sync supervision timeout (10 ms units)
    pub sync_timeout: u16,
    /// Deliver every subevent report, not only changed data
    pub report_all: bool,

    // --- Advertising ---
    /// Connectable advertising interval while waiting for the access point (ms)
    pub advertising_interval_ms: u16,

    // --- GATT ---
    /// Attribute handle of the response-slot characteristic
    pub response_slot_attribute: u16,

    // --- Response timing ---
    /// Time budget for building a sensor response (ms); overruns are logged
    pub response_budget_ms: u32,

    // --- Battery ---
    /// Supply voltage reported as 100 % (mV)
    pub battery_full_mv: u16,
    /// Supply voltage reported as 0 % (mV)
    pub battery_empty_mv: u16,
    /// ADC reference voltage (mV)
    pub adc_reference_mv: u16,
    /// ADC full-scale count
    pub adc_resolution: u16,
    /// Supply divider ratio in front of the ADC input
    pub adc_supply_divider: u16,

    // --- Housekeeping ---
    /// Task watchdog timeout for the main loop (ms)
    pub task_watchdog_timeout_ms: u32,
}

impl Default for TagConfig {
    fn default() -> Self {
        Self {
            // Periodic sync
            missed_subevent_limit: 20,
            window_guard_percent: 125,
            sync_skip: 0,
            sync_timeout: 0x4000,
            report_all: true,

            // Advertising
            advertising_interval_ms: 500,

            // GATT
            response_slot_attribute: 0x0017,

            // Response timing: the first response slot opens 42.5 ms after the subevent
            response_budget_ms: 40,

            // Battery: CR2032 window, internal 1.21 V bandgap, 12-bit, supply/4
            battery_full_mv: 3000,
            battery_empty_mv: 2000,
            adc_reference_mv: 1210,
            adc_resolution: 4096,
            adc_supply_divider: 4,

            // Housekeeping
            task_watchdog_timeout_ms: 10_000,
        }
    }
}

impl TagConfig {
    /// Check ranges that the state machines rely on.
    pub fn validate(&self) -> Result<()> {
        if self.missed_subevent_limit == 0 {
            return Err(Error::Config("missed_subevent_limit must be non-zero"));
        }
        if self.window_guard_percent < 100 {
            return Err(Error::Config("window_guard_percent must be at least 100"));
        }
        if self.advertising_interval_ms < 20 {
            return Err(Error::Config("advertising_interval_ms below the 20 ms minimum"));
        }
        if self.battery_full_mv <= self.battery_empty_mv {
            return Err(Error::Config("battery_full_mv must exceed battery_empty_mv"));
        }
        if self.adc_resolution == 0 || self.adc_supply_divider == 0 {
            return Err(Error::Config("ADC resolution and divider must be non-zero"));
        }
        Ok(())
    }

    /// Advertising interval in controller units of 0.625 ms.
    pub fn advertising_interval_units(&self) -> u32 {
        u32::from(self.advertising_interval_ms) * 8 / 5
    }

    /// Parse and validate a JSON configuration blob.
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        let config: Self =
            serde_json::from_slice(bytes).map_err(|_| Error::Config("malformed JSON"))?;
        config.validate()?;
        Ok(config)
    }
}
