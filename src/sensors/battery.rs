//! Coin-cell battery level from a supply-voltage ADC sample.
//!
//! The supply rail is divided down in front of the ADC, sampled once per
//! request against the internal bandgap, and mapped linearly onto 0–100 %
//! between the empty and full voltages.  Readings outside that window
//! saturate instead of wrapping.
//!
//! On ESP-IDF the samples come from `drivers::supply_adc::EspSupplySampler`.

use log::debug;

use crate::app::ports::BatteryPort;
use crate::config::TagConfig;
use crate::error::SensorError;

/// Source of raw supply-voltage samples.
pub trait SupplySampler {
    fn sample(&mut self) -> Result<u16, SensorError>;
}

/// ADC scaling and battery window, taken from [`TagConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatteryScale {
    pub reference_mv: u32,
    pub resolution: u32,
    pub supply_divider: u32,
    pub empty_mv: u32,
    pub full_mv: u32,
}

impl From<&TagConfig> for BatteryScale {
    fn from(config: &TagConfig) -> Self {
        Self {
            reference_mv: u32::from(config.adc_reference_mv),
            resolution: u32::from(config.adc_resolution),
            supply_divider: u32::from(config.adc_supply_divider),
            empty_mv: u32::from(config.battery_empty_mv),
            full_mv: u32::from(config.battery_full_mv),
        }
    }
}

impl BatteryScale {
    /// Raw sample → supply millivolts, capped at the full voltage.
    pub fn sample_to_millivolts(&self, sample: u16) -> u32 {
        let mv = u32::from(sample) * self.reference_mv * self.supply_divider / self.resolution;
        mv.min(self.full_mv)
    }

    /// Supply millivolts → 0–100 %.
    pub fn level_from_millivolts(&self, mv: u32) -> u8 {
        let span = self.full_mv.saturating_sub(self.empty_mv).max(1);
        let above_empty = mv.clamp(self.empty_mv, self.full_mv) - self.empty_mv;
        (above_empty * 100 / span) as u8
    }
}

pub struct BatteryMonitor<S> {
    sampler: S,
    scale: BatteryScale,
}

impl<S: SupplySampler> BatteryMonitor<S> {
    pub fn new(sampler: S, scale: BatteryScale) -> Self {
        Self { sampler, scale }
    }

    /// Blocking: one ADC conversion.
    pub fn read_level(&mut self) -> Result<u8, SensorError> {
        let sample = self.sampler.sample()?;
        let mv = self.scale.sample_to_millivolts(sample);
        let level = self.scale.level_from_millivolts(mv);
        debug!("battery: sample={} → {} mV → {}%", sample, mv, level);
        Ok(level)
    }
}

impl<S: SupplySampler> BatteryPort for BatteryMonitor<S> {
    fn read_battery_level(&mut self) -> Result<u8, SensorError> {
        self.read_level()
    }
}
