//! GPIO / peripheral assignments for the sensor tag board (ESP32-C6).
//!
//! Single source of truth: the device binary references this module rather
//! than hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Si7021 humidity / temperature sensor (I2C0)
// ---------------------------------------------------------------------------

pub const RHT_SDA_GPIO: i32 = 6;
pub const RHT_SCL_GPIO: i32 = 7;
/// Standard-mode I2C; the Si7021 tops out at 400 kHz.
pub const RHT_I2C_HZ: u32 = 100_000;

// ---------------------------------------------------------------------------
// Battery supply sense (ADC1)
// ---------------------------------------------------------------------------

/// ADC1 channel wired to the supply divider (GPIO0 on the C6).
pub const SUPPLY_ADC_CHANNEL: u32 = 0;
