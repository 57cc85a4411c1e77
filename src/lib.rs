//! PAwR sensor tag firmware library.
//!
//! Exposes the protocol core and drivers for integration testing and the
//! device binary. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod events;
pub mod fsm;
pub mod pawr;

pub mod adapters;
pub mod drivers;
pub mod sensors;
