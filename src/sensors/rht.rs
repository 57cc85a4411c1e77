//! Si7021 relative humidity and temperature sensor.
//!
//! One relative-humidity conversion also produces a temperature sample,
//! which is fetched afterwards with the "read temperature from previous RH
//! measurement" command, so a full reading costs one conversion.
//!
//! ## Conversion (datasheet §5.1.1 / §5.1.2, integer form)
//!
//! ```text
//! RH  [m%]  = (15625 · code >> 13) − 6000     (= 125000·code/65536 − 6000)
//! T   [m°C] = (21965 · code >> 13) − 46850    (= 175720·code/65536 − 46850)
//! ```
//!
//! Generic over `embedded-hal` 1.0 `I2c` and `DelayNs`, so the same driver
//! runs against the ESP-IDF I2C master on device and a scripted bus in tests.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use log::debug;

use super::ClimateReading;
use crate::app::ports::ClimateSensorPort;
use crate::error::SensorError;

/// Fixed 7-bit bus address.
pub const SI7021_ADDRESS: u8 = 0x40;

const CMD_MEASURE_RH_NO_HOLD: u8 = 0xF5;
const CMD_READ_TEMP_FROM_RH: u8 = 0xE0;

/// 12-bit RH conversion plus the 14-bit temperature conversion it triggers.
const RH_CONVERSION_MS: u32 = 23;

/// CRC-8, polynomial x^8 + x^5 + x^4 + 1, initial value 0.
fn crc8(data: &[u8]) -> u8 {
    let mut crc: u8 = 0;
    for &byte in data {
        crc ^= byte;
        for _ in 0..8 {
            crc = if crc & 0x80 != 0 {
                (crc << 1) ^ 0x31
            } else {
                crc << 1
            };
        }
    }
    crc
}

/// Humidity code → milli-percent.  Codes below the 0 % point clamp to 0.
pub fn humidity_from_code(code: u16) -> u32 {
    let scaled = ((15_625 * i64::from(code)) >> 13) - 6_000;
    scaled.max(0) as u32
}

/// Temperature code → milli-degrees Celsius.
pub fn temperature_from_code(code: u16) -> i32 {
    (((21_965 * i64::from(code)) >> 13) - 46_850) as i32
}

pub struct Si7021<I2C, D> {
    i2c: I2C,
    delay: D,
}

impl<I2C: I2c, D: DelayNs> Si7021<I2C, D> {
    pub fn new(i2c: I2C, delay: D) -> Self {
        Self { i2c, delay }
    }

    /// Run one RH conversion and read back both values.
    pub fn measure(&mut self) -> Result<ClimateReading, SensorError> {
        self.i2c
            .write(SI7021_ADDRESS, &[CMD_MEASURE_RH_NO_HOLD])
            .map_err(|_| SensorError::I2cFailed)?;
        self.delay.delay_ms(RH_CONVERSION_MS);

        let mut rh = [0u8; 3];
        self.i2c
            .read(SI7021_ADDRESS, &mut rh)
            .map_err(|_| SensorError::I2cFailed)?;
        if crc8(&rh[..2]) != rh[2] {
            return Err(SensorError::ChecksumMismatch);
        }

        let mut temp = [0u8; 2];
        self.i2c
            .write_read(SI7021_ADDRESS, &[CMD_READ_TEMP_FROM_RH], &mut temp)
            .map_err(|_| SensorError::I2cFailed)?;

        let rh_code = u16::from_be_bytes([rh[0], rh[1]]);
        let temp_code = u16::from_be_bytes(temp);
        let reading = ClimateReading {
            temperature_milli_c: temperature_from_code(temp_code),
            humidity_milli_pct: humidity_from_code(rh_code),
        };
        debug!(
            "Si7021: rh_code={:#06x} temp_code={:#06x} → {} m°C, {} m%",
            rh_code, temp_code, reading.temperature_milli_c, reading.humidity_milli_pct
        );
        Ok(reading)
    }

    /// Give the bus back (e.g. to share it with another driver).
    pub fn release(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }
}

impl<I2C: I2c, D: DelayNs> ClimateSensorPort for Si7021<I2C, D> {
    fn read_climate(&mut self) -> Result<ClimateReading, SensorError> {
        self.measure()
    }
}
