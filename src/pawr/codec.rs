//! Subevent payload codec.
//!
//! Sensor response payload (17 bytes), three service-data AD records:
//! ```text
//! ┌────┬────┬──────┬─────────┐┌────┬────┬──────┬─────────┐┌────┬────┬──────┬──────┐
//! │ 05 │ 16 │ 6E2A │ temp LE ││ 05 │ 16 │ 6F2A │ hum LE  ││ 04 │ 16 │ 192A │ batt │
//! └────┴────┴──────┴─────────┘└────┴────┴──────┴─────────┘└────┴────┴──────┴──────┘
//!   0    1    2..4    4..6      6    7    8..10  10..12     12   13   14..16   16
//! ```
//!
//! Temperature and humidity travel in hundredths (0.01 °C, 0.01 %RH), which
//! is what the access point divides by 100 on its side.
//!
//! Request payload: `[h][addr × h][opcode]`.

use log::trace;

use super::{BROADCAST_ADDRESS, SubeventData};

/// Length of an encoded sensor response payload.
pub const SENSOR_RESPONSE_LEN: usize = 17;

/// AD type: service data, 16-bit UUID.
pub const AD_TYPE_SERVICE_DATA: u8 = 0x16;

pub const UUID_TEMPERATURE: u16 = 0x2A6E;
pub const UUID_HUMIDITY: u16 = 0x2A6F;
pub const UUID_BATTERY_LEVEL: u16 = 0x2A19;

/// Humidity ceiling in hundredths of a percent.
const HUMIDITY_MAX: u32 = 10_000;

/// Encode one sensor sample.
///
/// `temperature_milli_c` is truncated to hundredths and then to `i16`;
/// `humidity_milli_pct` is reduced to hundredths and clamped to 100.00 %.
pub fn encode_sensor_response(
    temperature_milli_c: i32,
    humidity_milli_pct: u32,
    battery_level: u8,
) -> [u8; SENSOR_RESPONSE_LEN] {
    let temp = ((temperature_milli_c / 10) as i16).to_le_bytes();
    let hum = ((humidity_milli_pct / 10).min(HUMIDITY_MAX) as u16).to_le_bytes();
    let [t_uuid_lo, t_uuid_hi] = UUID_TEMPERATURE.to_le_bytes();
    let [h_uuid_lo, h_uuid_hi] = UUID_HUMIDITY.to_le_bytes();
    let [b_uuid_lo, b_uuid_hi] = UUID_BATTERY_LEVEL.to_le_bytes();

    [
        0x05, AD_TYPE_SERVICE_DATA, t_uuid_lo, t_uuid_hi, temp[0], temp[1],
        0x05, AD_TYPE_SERVICE_DATA, h_uuid_lo, h_uuid_hi, hum[0], hum[1],
        0x04, AD_TYPE_SERVICE_DATA, b_uuid_lo, b_uuid_hi, battery_level,
    ]
}

/// Scan an addressed request for `my_slot` or the broadcast address.
///
/// Returns the opcode byte that follows the address header on the first
/// match.  An empty payload, a header that runs past the end, or a missing
/// opcode byte never match.
pub fn find_address(payload: &[u8], my_slot: u8) -> Option<u8> {
    let (&count, rest) = payload.split_first()?;
    let count = usize::from(count);
    if rest.len() <= count {
        trace!("request header of {} addresses truncated ({} bytes)", count, payload.len());
        return None;
    }
    let (addresses, tail) = rest.split_at(count);
    addresses
        .iter()
        .any(|&a| a == my_slot || a == BROADCAST_ADDRESS)
        .then_some(tail[0])
}

/// Build an addressed request.  `None` if it does not fit in one subevent.
pub fn encode_request(addresses: &[u8], opcode: u8) -> Option<SubeventData> {
    let count = u8::try_from(addresses.len()).ok()?;
    let mut out = SubeventData::new();
    out.push(count).ok()?;
    out.extend_from_slice(addresses).ok()?;
    out.push(opcode).ok()?;
    Some(out)
}

// ── Access-point side ─────────────────────────────────────────

/// A decoded sensor response, in wire units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorReading {
    /// 0.01 °C.
    pub temperature_centi_c: i16,
    /// 0.01 %RH.
    pub humidity_centi_pct: u16,
    pub battery_level: u8,
}

impl SensorReading {
    pub fn temperature_celsius(&self) -> f32 {
        f32::from(self.temperature_centi_c) / 100.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// An AD record's length runs past the payload.
    Truncated,
    /// A known UUID carried the wrong number of value bytes.
    BadLength { uuid: u16, len: usize },
    /// The payload ended without a record for this UUID.
    MissingField(u16),
}

impl core::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Truncated => write!(f, "AD record truncated"),
            Self::BadLength { uuid, len } => {
                write!(f, "UUID {:#06x} carries {} value bytes", uuid, len)
            }
            Self::MissingField(uuid) => write!(f, "no record for UUID {:#06x}", uuid),
        }
    }
}

/// Walk the service-data records of a sensor response payload.
///
/// Records of other AD types or unknown UUIDs are skipped, so the layout
/// can grow without breaking older readers.
pub fn decode_sensor_response(bytes: &[u8]) -> Result<SensorReading, DecodeError> {
    let mut temperature = None;
    let mut humidity = None;
    let mut battery = None;

    let mut rest = bytes;
    while let Some((&len, tail)) = rest.split_first() {
        let len = usize::from(len);
        if len == 0 {
            break;
        }
        if tail.len() < len {
            return Err(DecodeError::Truncated);
        }
        let (record, next) = tail.split_at(len);
        rest = next;

        if record[0] != AD_TYPE_SERVICE_DATA || record.len() < 3 {
            continue;
        }
        let uuid = u16::from_le_bytes([record[1], record[2]]);
        let value = &record[3..];
        match uuid {
            UUID_TEMPERATURE => {
                let raw: [u8; 2] = value
                    .try_into()
                    .map_err(|_| DecodeError::BadLength { uuid, len: value.len() })?;
                temperature = Some(i16::from_le_bytes(raw));
            }
            UUID_HUMIDITY => {
                let raw: [u8; 2] = value
                    .try_into()
                    .map_err(|_| DecodeError::BadLength { uuid, len: value.len() })?;
                humidity = Some(u16::from_le_bytes(raw));
            }
            UUID_BATTERY_LEVEL => match value {
                [level] => battery = Some(*level),
                _ => return Err(DecodeError::BadLength { uuid, len: value.len() }),
            },
            _ => {}
        }
    }

    Ok(SensorReading {
        temperature_centi_c: temperature.ok_or(DecodeError::MissingField(UUID_TEMPERATURE))?,
        humidity_centi_pct: humidity.ok_or(DecodeError::MissingField(UUID_HUMIDITY))?,
        battery_level: battery.ok_or(DecodeError::MissingField(UUID_BATTERY_LEVEL))?,
    })
}
