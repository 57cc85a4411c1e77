//! Unified error types for the sensor tag firmware.
//!
//! A single `Error` enum that every subsystem converts into, so the event
//! loop has one place to decide what is fatal.  All variants are `Copy` so
//! they travel through the state machines without allocation.
//!
//! Tolerated conditions (empty subevent data, unmatched address, unknown
//! opcode) are *not* errors; they surface as `Ok(None)` or a silent no-op.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A radio stack or timer call returned a non-OK status.
    Stack(StackError),
    /// The humidity sensor or battery ADC could not be read.
    Sensor(SensorError),
    /// Configuration is invalid.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stack(e) => write!(f, "stack: {e}"),
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Stack errors
// ---------------------------------------------------------------------------

/// The outward call that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackOp {
    SetSyncReceiveParameters,
    StartAdvertising,
    StopAdvertising,
    CloseConnection,
    CloseSync,
    SetResponseData,
    ArmTimer,
    CancelTimer,
}

impl fmt::Display for StackOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::SetSyncReceiveParameters => "set sync receive parameters",
            Self::StartAdvertising => "start advertising",
            Self::StopAdvertising => "stop advertising",
            Self::CloseConnection => "close connection",
            Self::CloseSync => "close sync",
            Self::SetResponseData => "set response data",
            Self::ArmTimer => "arm timer",
            Self::CancelTimer => "cancel timer",
        };
        f.write_str(name)
    }
}

/// A non-OK status from the radio stack or the timer service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StackError {
    pub op: StackOp,
    /// Raw status code reported by the stack.
    pub status: u16,
}

impl StackError {
    pub const fn new(op: StackOp, status: u16) -> Self {
        Self { op, status }
    }
}

impl fmt::Display for StackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failed (status {:#06x})", self.op, self.status)
    }
}

impl From<StackError> for Error {
    fn from(e: StackError) -> Self {
        Self::Stack(e)
    }
}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// I2C transfer to the humidity sensor failed.
    I2cFailed,
    /// Measurement checksum did not match.
    ChecksumMismatch,
    /// ADC read returned an error.
    AdcReadFailed,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::I2cFailed => write!(f, "I2C transfer failed"),
            Self::ChecksumMismatch => write!(f, "measurement checksum mismatch"),
            Self::AdcReadFailed => write!(f, "ADC read failed"),
        }
    }
}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
