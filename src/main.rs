//! eArm Firmware: Main Entry Point
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  WifiAdapter (soft-AP)   LogEventSink (EventSink)              │
//! │  CommandServer (TCP :80) Buzzer (IndicatorPort)                │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │  ArmService · CommandState · JointRunner ×4            │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  Supervisor (lifecycle) · LEDC servo outputs ×4                │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::hal::peripherals::Peripherals;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::wifi::{BlockingWifi, EspWifi};
use log::{info, warn};

use earm::adapters::log_sink::LogEventSink;
use earm::adapters::wifi::WifiAdapter;
use earm::app::supervisor::Supervisor;
use earm::config::ArmConfig;
use earm::drivers::hw_init;

/// Build-time override: `EARM_CONFIG_JSON='{...}' cargo build`.
fn load_config() -> ArmConfig {
    match option_env!("EARM_CONFIG_JSON") {
        Some(json) => match ArmConfig::from_json(json) {
            Ok(cfg) => {
                info!("Config: using embedded override");
                cfg
            }
            Err(e) => {
                warn!("Config: embedded override rejected ({}), using defaults", e);
                ArmConfig::default()
            }
        },
        None => ArmConfig::default(),
    }
}

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  eArm v{}                          ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Config ─────────────────────────────────────────────
    let config = load_config();
    config.validate()?;

    // ── 3. Soft access point ──────────────────────────────────
    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take().ok();
    let driver = BlockingWifi::wrap(EspWifi::new(peripherals.modem, sysloop.clone(), nvs)?, sysloop)?;
    let mut wifi = WifiAdapter::new(config.access_point.clone()).with_driver(driver);
    wifi.start()?;

    // ── 4. PWM outputs ────────────────────────────────────────
    let outputs = hw_init::init_outputs(peripherals.ledc, &config)?;

    // ── 5. Runners + command server ───────────────────────────
    let supervisor = Supervisor::start(&config, outputs, LogEventSink::new())?;
    info!("System ready.");

    // Nothing on the device raises the stop signal: the arm runs until
    // power-off or reset, and the access point stays up with it.
    supervisor.run_until_stopped();
    Ok(())
}
