//! Application core: tag protocol logic with no direct I/O.
//!
//! The radio, sensors, and watchdog timer are reached only through the
//! **port traits** in [`ports`], so the whole protocol runs against
//! recording mocks on the host.

pub mod events;
pub mod ports;
pub mod service;
