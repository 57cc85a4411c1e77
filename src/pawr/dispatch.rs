//! Opcode → response handlers.
//!
//! Runs inside the handling of a single subevent report, so everything here
//! is synchronous.  The sensor read is the only slow step; its latency is
//! measured against the configured response budget so a slow bus shows up
//! in the log instead of as silently missed slots.

use std::time::Instant;

use log::{debug, warn};

use super::Opcode;
use super::codec::{SENSOR_RESPONSE_LEN, encode_sensor_response};
use crate::app::ports::{BatteryPort, ClimateSensorPort};
use crate::error::Result;
use crate::sensors::SensorSample;

/// `[slot][opcode]` plus the largest payload.
pub const MAX_RESPONSE_LEN: usize = 2 + SENSOR_RESPONSE_LEN;

/// A framed response, ready for `set_response_data`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Response {
    buf: [u8; MAX_RESPONSE_LEN],
    len: usize,
}

impl Response {
    /// `[slot, 0]`
    pub fn ping(slot: u8) -> Self {
        let mut buf = [0; MAX_RESPONSE_LEN];
        buf[0] = slot;
        buf[1] = Opcode::Ping as u8;
        Self { buf, len: 2 }
    }

    /// `[slot, 1, payload…]`
    pub fn sensor_values(slot: u8, payload: &[u8; SENSOR_RESPONSE_LEN]) -> Self {
        let mut buf = [0; MAX_RESPONSE_LEN];
        buf[0] = slot;
        buf[1] = Opcode::ReadSensorValues as u8;
        buf[2..].copy_from_slice(payload);
        Self {
            buf,
            len: MAX_RESPONSE_LEN,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    pub fn slot(&self) -> u8 {
        self.buf[0]
    }

    pub fn opcode(&self) -> u8 {
        self.buf[1]
    }

    /// Bytes after the `[slot][opcode]` header.
    pub fn payload(&self) -> &[u8] {
        &self.buf[2..self.len]
    }
}

pub struct ResponseDispatcher {
    budget_ms: u64,
}

impl ResponseDispatcher {
    pub fn new(budget_ms: u32) -> Self {
        Self {
            budget_ms: u64::from(budget_ms),
        }
    }

    /// Produce the response for `opcode`, or `Ok(None)` if the opcode is
    /// not one the tag understands.  Sensor failures are returned as-is.
    pub fn handle_opcode(
        &self,
        opcode: u8,
        slot: u8,
        hw: &mut (impl ClimateSensorPort + BatteryPort),
    ) -> Result<Option<Response>> {
        let Some(op) = Opcode::from_u8(opcode) else {
            debug!("unknown opcode {:#04x}, no response", opcode);
            return Ok(None);
        };

        let response = match op {
            Opcode::Ping => Response::ping(slot),
            Opcode::ReadSensorValues => {
                let started = Instant::now();
                let climate = hw.read_climate()?;
                let battery = hw.read_battery_level()?;
                let sample = SensorSample::new(climate, battery);
                self.check_budget(started);

                let payload = encode_sensor_response(
                    sample.temperature_milli_c,
                    sample.humidity_milli_pct,
                    sample.battery_level,
                );
                Response::sensor_values(slot, &payload)
            }
        };
        debug!("{} → {} byte response in slot {}", op, response.as_bytes().len(), slot);
        Ok(Some(response))
    }

    fn check_budget(&self, started: Instant) {
        let elapsed_ms = started.elapsed().as_millis() as u64;
        if elapsed_ms > self.budget_ms {
            warn!(
                "sensor read took {} ms, over the {} ms response budget",
                elapsed_ms, self.budget_ms
            );
        } else {
            debug!("sensor read took {} ms", elapsed_ms);
        }
    }
}
