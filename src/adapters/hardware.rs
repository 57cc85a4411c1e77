//! Hardware adapter: bridges the sensor drivers to the domain port traits.
//!
//! Owns the Si7021 and the battery monitor, exposing them through
//! [`ClimateSensorPort`] and [`BatteryPort`] as one value, so the service
//! can borrow both through a single `hw` parameter.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use crate::app::ports::{BatteryPort, ClimateSensorPort};
use crate::error::SensorError;
use crate::sensors::ClimateReading;
use crate::sensors::battery::{BatteryMonitor, SupplySampler};
use crate::sensors::rht::Si7021;

/// Concrete adapter that combines all sensors behind port traits.
pub struct HardwareAdapter<I2C, D, S> {
    rht: Si7021<I2C, D>,
    battery: BatteryMonitor<S>,
}

impl<I2C, D, S> HardwareAdapter<I2C, D, S>
where
    I2C: I2c,
    D: DelayNs,
    S: SupplySampler,
{
    pub fn new(rht: Si7021<I2C, D>, battery: BatteryMonitor<S>) -> Self {
        Self { rht, battery }
    }
}

// ── ClimateSensorPort implementation ──────────────────────────

impl<I2C: I2c, D: DelayNs, S> ClimateSensorPort for HardwareAdapter<I2C, D, S> {
    fn read_climate(&mut self) -> Result<ClimateReading, SensorError> {
        self.rht.measure()
    }
}

// ── BatteryPort implementation ────────────────────────────────

impl<I2C, D, S: SupplySampler> BatteryPort for HardwareAdapter<I2C, D, S> {
    fn read_battery_level(&mut self) -> Result<u8, SensorError> {
        self.battery.read_level()
    }
}
