//! Sensor subsystem: humidity/temperature driver and battery monitor.
//!
//! Both are synchronous and blocking.  A sensor read happens inside the
//! handling of one subevent report, so the whole read path has to fit in
//! the gap between the subevent and the tag's response slot.

pub mod battery;
pub mod rht;

/// One temperature + humidity measurement, in the sensor driver's scale.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClimateReading {
    /// Temperature in milli-degrees Celsius.
    pub temperature_milli_c: i32,
    /// Relative humidity in milli-percent.
    pub humidity_milli_pct: u32,
}

/// Everything a sensor response carries.  Built fresh for every request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SensorSample {
    pub temperature_milli_c: i32,
    pub humidity_milli_pct: u32,
    /// Battery level, 0–100 %.
    pub battery_level: u8,
}

impl SensorSample {
    pub fn new(climate: ClimateReading, battery_level: u8) -> Self {
        Self {
            temperature_milli_c: climate.temperature_milli_c,
            humidity_milli_pct: climate.humidity_milli_pct,
            battery_level,
        }
    }
}
