//! PAwR subevent protocol: addressed requests in, framed responses out.
//!
//! An access point broadcasts one request per subevent:
//!
//! ```text
//!  [h][addr₀ … addr_{h-1}][opcode]
//! ```
//!
//! Every tag whose response slot (or the broadcast address) appears in the
//! header answers in its own slot with `[slot][opcode][payload…]`.

pub mod codec;
pub mod dispatch;

use core::fmt;

/// Header address that selects every tag.
pub const BROADCAST_ADDRESS: u8 = 255;

/// Wire value of a response slot that was never assigned.
pub const UNASSIGNED_SLOT: u8 = 0xFF;

/// Largest subevent payload the controller delivers or accepts.
pub const MAX_SUBEVENT_DATA: usize = 251;

/// One subevent's worth of payload bytes.
pub type SubeventData = heapless::Vec<u8, MAX_SUBEVENT_DATA>;

/// Request opcodes understood by the tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Opcode {
    /// Liveness check, answered with the bare `[slot, 0]` header.
    Ping = 0,
    /// Measure and report temperature, humidity, and battery level.
    ReadSensorValues = 1,
}

impl Opcode {
    pub const fn from_u8(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(Self::Ping),
            1 => Some(Self::ReadSensorValues),
            _ => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Ping => "ping",
            Self::ReadSensorValues => "read-sensor-values",
        }
    }
}

impl TryFrom<u8> for Opcode {
    type Error = u8;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        Self::from_u8(raw).ok_or(raw)
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
