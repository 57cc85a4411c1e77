//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements          | Connects to               |
//! |------------|---------------------|---------------------------|
//! | `hardware` | ClimateSensorPort   | Si7021 over I2C           |
//! |            | BatteryPort         | Supply ADC                |
//! | `log_sink` | EventSink           | Serial log output         |
//! | `radio`    | RadioPort           | Log only (no controller)  |
//!
//! The resync timer adapter lives in [`drivers::oneshot`](crate::drivers::oneshot).

pub mod hardware;
pub mod log_sink;
pub mod radio;
