//! WiFi association with a bounded wait
//!
//! The association wait is the only end-to-end timeout of a wake cycle.
//! There is no retry: a timeout sends the node back to sleep.

use core::fmt::Debug;

use embedded_hal_async::delay::DelayNs;
use log::{debug, error, info, warn};
use thiserror_no_std::Error;

use crate::config::InternetConfig;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkError {
    #[error("no association within {waited_ms} ms")]
    Timeout { waited_ms: u32 },
    #[error("WiFi driver refused to {operation}")]
    Driver { operation: &'static str },
}

/// Station-mode network interface
pub trait Network {
    type Error: Debug;

    fn is_connected(&mut self) -> impl Future<Output = Result<bool, Self::Error>>;

    fn connect(
        &mut self,
        ssid: &str,
        password: &str,
    ) -> impl Future<Output = Result<(), Self::Error>>;
}

/// Associate with the configured network and poll until the link is up or
/// `connect_timeout_ms` has elapsed.
pub async fn join<N, D>(
    network: &mut N,
    delay: &mut D,
    config: &InternetConfig<'_>,
) -> Result<(), NetworkError>
where
    N: Network,
    D: DelayNs,
{
    if poll_connected(network).await {
        info!("WiFi already connected");
        return Ok(());
    }

    network.connect(config.ssid, config.password).await.map_err(|e| {
        error!("WiFi connect to {:?} failed: {:?}", config.ssid, e);
        NetworkError::Driver { operation: "connect" }
    })?;

    let poll_interval = config.poll_interval_ms.max(1);
    let mut waited_ms: u32 = 0;

    while !poll_connected(network).await {
        if waited_ms >= config.connect_timeout_ms {
            warn!("WiFi timeout after {} ms", waited_ms);
            return Err(NetworkError::Timeout { waited_ms });
        }
        delay.delay_ms(poll_interval).await;
        waited_ms = waited_ms.saturating_add(poll_interval);
    }

    info!("WiFi connected to {:?} after {} ms", config.ssid, waited_ms);
    Ok(())
}

async fn poll_connected<N: Network>(network: &mut N) -> bool {
    match network.is_connected().await {
        Ok(connected) => connected,
        Err(e) => {
            debug!("WiFi status query failed: {:?}", e);
            false
        }
    }
}
