//! PAwR Sensor Tag Firmware: Main Entry Point
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter      LogEventSink   LoggingRadio              │
//! │  (Climate+Battery)    (EventSink)    (RadioPort)               │
//! │  EspOneshotTimer (TimerPort)                                   │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              TagService (pure logic)                   │    │
//! │  │  app FSM · sync FSM · codec · dispatcher               │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

mod pins;

use anyhow::Result;
use esp_idf_hal::delay::{Delay, FreeRtos};
use esp_idf_hal::gpio::AnyIOPin;
use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::units::Hertz;
use log::{error, info};

use pawrtag::adapters::hardware::HardwareAdapter;
use pawrtag::adapters::log_sink::LogEventSink;
use pawrtag::adapters::radio::LoggingRadio;
use pawrtag::app::service::TagService;
use pawrtag::config::TagConfig;
use pawrtag::diagnostics;
use pawrtag::drivers::oneshot::EspOneshotTimer;
use pawrtag::drivers::supply_adc::EspSupplySampler;
use pawrtag::drivers::watchdog::TaskWatchdog;
use pawrtag::error::Error;
use pawrtag::events::{self, TagEvent, push_event};
use pawrtag::sensors::battery::{BatteryMonitor, BatteryScale};
use pawrtag::sensors::rht::Si7021;

/// Idle time between queue drains.
const LOOP_PERIOD_MS: u32 = 5;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  PAwR sensor tag v{}                 ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    diagnostics::install_panic_handler();

    // ── 2. Configuration ──────────────────────────────────────
    let config = TagConfig::default();
    config.validate()?;
    let watchdog = TaskWatchdog::new(config.task_watchdog_timeout_ms);

    // ── 3. Sensors ────────────────────────────────────────────
    let peripherals = Peripherals::take()?;
    // SAFETY: the pin numbers come from the board map and are not claimed
    // through `peripherals.pins` anywhere else.
    let (sda, scl) = unsafe {
        (
            AnyIOPin::new(pins::RHT_SDA_GPIO),
            AnyIOPin::new(pins::RHT_SCL_GPIO),
        )
    };
    let i2c = I2cDriver::new(
        peripherals.i2c0,
        sda,
        scl,
        &I2cConfig::new().baudrate(Hertz(pins::RHT_I2C_HZ)),
    )?;
    let rht = Si7021::new(i2c, Delay::new_default());
    let sampler = EspSupplySampler::new(pins::SUPPLY_ADC_CHANNEL).map_err(Error::from)?;
    let battery = BatteryMonitor::new(sampler, BatteryScale::from(&config));
    let mut hw = HardwareAdapter::new(rht, battery);

    // ── 4. Radio, timer, service ──────────────────────────────
    let mut timer = EspOneshotTimer::new().map_err(Error::from)?;
    // TODO: replace with a NimBLE adapter once esp-idf-sys exposes the
    // periodic-sync-transfer and subevent response-data calls.
    let mut radio = LoggingRadio::new();
    let mut sink = LogEventSink::new();
    let mut tag = TagService::new(config);

    push_event(TagEvent::Boot);
    info!("System ready. Entering event loop.");

    // ── 5. Event loop ─────────────────────────────────────────
    loop {
        events::requeue_latched_watchdog();
        let step = events::drain_events(|event| {
            tag.handle_event(event, &mut radio, &mut hw, &mut timer, &mut sink)
        })
        .and_then(|_| tag.process_action(&mut radio, &mut sink));

        if let Err(e) = step {
            error!("fatal: {}; halting until the task watchdog resets", e);
            halt();
        }

        watchdog.feed();
        FreeRtos::delay_ms(LOOP_PERIOD_MS);
    }
}

/// Park the main task without feeding the TWDT.
fn halt() -> ! {
    loop {
        FreeRtos::delay_ms(1_000);
    }
}
