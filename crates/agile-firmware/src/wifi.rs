//! WiFi station link and the embassy-net stack runner

use alloc::string::String;

use embassy_net::{Runner, Stack};
use embassy_time::{Duration, Timer, with_timeout};
use esp_radio::wifi::{
    ClientConfig, ModeConfig, WifiController, WifiDevice, WifiEvent, WifiStaState,
};
use log::{info, warn};

use crate::app_state::{AppError, error_message};

/// Pause between reconnect attempts
const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Keep the station associated, reconnecting whenever the AP drops us.
#[embassy_executor::task]
pub async fn connection_task(
    mut controller: WifiController<'static>,
    ssid: &'static str,
    password: &'static str,
) {
    info!("WiFi connection task started");
    loop {
        if esp_radio::wifi::sta_state() == WifiStaState::Connected {
            controller.wait_for_event(WifiEvent::StaDisconnected).await;
            warn!("WiFi disconnected");
            Timer::after(RECONNECT_DELAY).await;
        }

        if !matches!(controller.is_started(), Ok(true)) {
            let config = ModeConfig::Client(
                ClientConfig::default()
                    .with_ssid(String::from(ssid))
                    .with_password(String::from(password)),
            );
            if let Err(e) = controller.set_config(&config) {
                warn!("WiFi config rejected: {:?}", e);
                Timer::after(RECONNECT_DELAY).await;
                continue;
            }
            info!("Starting WiFi");
            if let Err(e) = controller.start_async().await {
                warn!("WiFi start failed: {:?}", e);
                Timer::after(RECONNECT_DELAY).await;
                continue;
            }
        }

        info!("Connecting to {}", ssid);
        match controller.connect_async().await {
            Ok(()) => info!("WiFi connected"),
            Err(e) => {
                warn!("WiFi connect failed: {:?}", e);
                Timer::after(RECONNECT_DELAY).await;
            }
        }
    }
}

#[embassy_executor::task]
pub async fn net_task(mut runner: Runner<'static, WifiDevice<'static>>) {
    runner.run().await
}

/// Wait until DHCP has given the stack an address.
pub async fn wait_for_network(stack: Stack<'static>, timeout: Duration) -> Result<(), AppError> {
    with_timeout(timeout, async {
        stack.wait_link_up().await;
        stack.wait_config_up().await;
    })
    .await
    .map_err(|e| AppError::Wifi(error_message(&e)))?;

    if let Some(config) = stack.config_v4() {
        info!("Got IP: {}", config.address);
    }
    Ok(())
}
