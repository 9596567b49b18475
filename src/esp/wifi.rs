use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::hal::modem::Modem;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::wifi::{AuthMethod, ClientConfiguration, Configuration, EspWifi};
use log::{info, warn};

use crate::config::Credentials;
use crate::connectivity::{Link, LinkStatus};
use crate::error::{Error, Result};

fn link_error(context: &str, e: impl std::fmt::Display) -> Error {
    Error::Link(format!("{}: {}", context, e))
}

/// Station-mode WiFi on the ESP32 radio.
///
/// `begin` only kicks off the association; progress is observed through
/// `status` so the caller can poll with its own interval and timeout.
pub struct EspLink<'a> {
    wifi: Box<EspWifi<'a>>,
}

impl EspLink<'static> {
    pub fn new(
        modem: Modem,
        sys_loop: EspSystemEventLoop,
        nvs: Option<EspDefaultNvsPartition>,
    ) -> Result<Self> {
        let wifi = EspWifi::new(modem, sys_loop, nvs)
            .map_err(|e| link_error("WiFi driver init failed", e))?;
        Ok(Self {
            wifi: Box::new(wifi),
        })
    }
}

impl Link for EspLink<'_> {
    fn begin(&mut self, credentials: &Credentials) -> Result<()> {
        let auth_method = if credentials.password.is_empty() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        };

        let wifi_config = Configuration::Client(ClientConfiguration {
            ssid: credentials
                .ssid
                .try_into()
                .map_err(|_| Error::Link(format!("SSID too long: {}", credentials.ssid)))?,
            password: credentials
                .password
                .try_into()
                .map_err(|_| Error::Link("Password too long".to_string()))?,
            auth_method,
            ..Default::default()
        });

        self.wifi
            .set_configuration(&wifi_config)
            .map_err(|e| link_error("Setting station config failed", e))?;
        self.wifi
            .start()
            .map_err(|e| link_error("Starting WiFi failed", e))?;
        self.wifi
            .connect()
            .map_err(|e| link_error("Starting association failed", e))?;

        info!("Association with {} started", credentials.ssid);
        Ok(())
    }

    fn status(&self) -> LinkStatus {
        let connected = self.wifi.is_connected().unwrap_or(false);
        let up = self.wifi.is_up().unwrap_or(false);
        LinkStatus {
            associated: connected && up,
            radio_on: self.wifi.is_started().unwrap_or(false),
        }
    }

    fn shutdown(&mut self) -> Result<()> {
        if self.wifi.is_connected().unwrap_or(false) {
            if let Err(e) = self.wifi.disconnect() {
                warn!("WiFi disconnect failed, stopping anyway: {}", e);
            }
        }
        self.wifi
            .stop()
            .map_err(|e| link_error("Stopping WiFi failed", e))
    }

    fn address(&self) -> Option<String> {
        self.wifi
            .sta_netif()
            .get_ip_info()
            .ok()
            .map(|ip_info| ip_info.ip.to_string())
    }
}
