//! Station-mode WiFi over esp-radio and embassy-net

use embassy_net::{Runner, Stack};
use esp_radio::wifi::{ClientConfig, ModeConfig, WifiController, WifiDevice, WifiError};
use log::{debug, info};
use stratus_core::network::Network;

/// The radio controller together with the IP stack it feeds.
///
/// The link only counts as connected once the station is associated and
/// DHCP has handed out an address.
pub struct StationLink {
    controller: WifiController<'static>,
    stack: Stack<'static>,
}

impl StationLink {
    pub const fn new(controller: WifiController<'static>, stack: Stack<'static>) -> Self {
        Self { controller, stack }
    }
}

impl Network for StationLink {
    type Error = WifiError;

    async fn is_connected(&mut self) -> Result<bool, WifiError> {
        let associated = self.controller.is_connected()?;
        let configured = self.stack.is_config_up();
        debug!("WiFi associated={} ip={}", associated, configured);
        Ok(associated && configured)
    }

    async fn connect(&mut self, ssid: &str, password: &str) -> Result<(), WifiError> {
        let client = ClientConfig::default()
            .with_ssid(ssid.into())
            .with_password(password.into());
        self.controller.set_config(&ModeConfig::Client(client))?;

        if !matches!(self.controller.is_started(), Ok(true)) {
            self.controller.start()?;
            info!("WiFi started in STA mode");
        }
        self.controller.connect()
    }
}

/// Drives the embassy-net stack for the lifetime of the wake.
#[embassy_executor::task]
pub async fn net_task(mut runner: Runner<'static, WifiDevice<'static>>) {
    runner.run().await
}
