//! WiFi soft access point adapter.
//!
//! The arm raises an open access point so a phone can join it and open the
//! command page at the AP address (`192.168.4.1` by default).
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: real ESP-IDF WiFi driver calls via `esp_idf_svc::wifi`.
//! - **all other targets**: simulation stubs for host-side tests.

use core::fmt;
use log::{error, info};

use crate::config::AccessPointConfig;

// ───────────────────────────────────────────────────────────────
// Errors
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessPointError {
    InvalidSsid,
    /// No WiFi driver was attached before `start`.
    NoDriver,
    /// The driver refused the configuration or failed to start.
    StartFailed(i32),
}

impl fmt::Display for AccessPointError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSsid => write!(f, "SSID invalid (must be 1-32 printable ASCII bytes)"),
            Self::NoDriver => write!(f, "no WiFi driver attached"),
            Self::StartFailed(rc) => write!(f, "access point start failed (rc={})", rc),
        }
    }
}

impl core::error::Error for AccessPointError {}

// ───────────────────────────────────────────────────────────────
// Validation
// ───────────────────────────────────────────────────────────────

fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

fn validate_ssid(ssid: &str) -> Result<(), AccessPointError> {
    if ssid.is_empty() || ssid.len() > 32 || !is_printable_ascii(ssid) {
        return Err(AccessPointError::InvalidSsid);
    }
    Ok(())
}

// ───────────────────────────────────────────────────────────────
// Access point adapter
// ───────────────────────────────────────────────────────────────

pub struct WifiAdapter {
    config: AccessPointConfig,
    up: bool,
    #[cfg(target_os = "espidf")]
    driver: Option<esp_idf_svc::wifi::BlockingWifi<esp_idf_svc::wifi::EspWifi<'static>>>,
}

impl WifiAdapter {
    pub fn new(config: AccessPointConfig) -> Self {
        Self {
            config,
            up: false,
            #[cfg(target_os = "espidf")]
            driver: None,
        }
    }

    /// Attach the ESP-IDF driver built from the modem peripheral.
    #[cfg(target_os = "espidf")]
    pub fn with_driver(
        mut self,
        driver: esp_idf_svc::wifi::BlockingWifi<esp_idf_svc::wifi::EspWifi<'static>>,
    ) -> Self {
        self.driver = Some(driver);
        self
    }

    /// Bring the access point up.  Calling it again while up is a no-op.
    pub fn start(&mut self) -> Result<(), AccessPointError> {
        if self.up {
            return Ok(());
        }
        validate_ssid(&self.config.ssid)?;

        match self.platform_start() {
            Ok(()) => {
                self.up = true;
                let [a, b, c, d] = self.config.ip;
                info!(
                    "WiFi: access point '{}' up, command page at http://{}.{}.{}.{}/",
                    self.config.ssid, a, b, c, d
                );
                Ok(())
            }
            Err(e) => {
                error!("WiFi: access point failed: {}", e);
                Err(e)
            }
        }
    }

    pub fn stop(&mut self) {
        if self.up {
            self.platform_stop();
            self.up = false;
            info!("WiFi: access point down");
        }
    }

    pub fn is_up(&self) -> bool {
        self.up
    }

    pub fn ssid(&self) -> &str {
        &self.config.ssid
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_start(&mut self) -> Result<(), AccessPointError> {
        use esp_idf_svc::wifi::{AccessPointConfiguration, AuthMethod, Configuration};

        let wifi = self.driver.as_mut().ok_or(AccessPointError::NoDriver)?;
        let ssid = self
            .config
            .ssid
            .as_str()
            .try_into()
            .map_err(|_| AccessPointError::InvalidSsid)?;

        let conf = Configuration::AccessPoint(AccessPointConfiguration {
            ssid,
            auth_method: AuthMethod::None,
            channel: 1,
            ..Default::default()
        });

        let rc = |e: esp_idf_svc::sys::EspError| AccessPointError::StartFailed(e.code());
        wifi.set_configuration(&conf).map_err(rc)?;
        wifi.start().map_err(rc)?;
        wifi.wait_netif_up().map_err(rc)?;

        if let Ok(ip_info) = wifi.wifi().ap_netif().get_ip_info() {
            if ip_info.ip.octets() != self.config.ip {
                log::warn!(
                    "WiFi: AP netif is {}, configured {:?}; serving on the netif address",
                    ip_info.ip,
                    self.config.ip
                );
            }
        }
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_start(&mut self) -> Result<(), AccessPointError> {
        info!("WiFi(sim): access point '{}' simulated", self.config.ssid);
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn platform_stop(&mut self) {
        if let Some(wifi) = self.driver.as_mut() {
            if let Err(e) = wifi.stop() {
                log::warn!("WiFi: stop failed: {}", e);
            }
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_stop(&mut self) {
        info!("WiFi(sim): access point stopped");
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
