use core::fmt::Write;

use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::i2c::I2c;
use heapless::String;
use log::{debug, error, info, warn};

use super::{CycleError, CycleOutcome, CycleState, Degraded};
use crate::bus::{self, BusAddress};
use crate::config::NodeConfig;
use crate::display::{DisplayConnector, MSG_STARTING, MSG_UPLOAD_ERROR, Presenter};
use crate::network::{self, Network};
use crate::power::DeepSleep;
use crate::sampling;
use crate::sensors::{CanonicalReading, DriverRegistry, SensorDriver};
use crate::telemetry::{self, CONTENT_TYPE_JSON, Clock, MAX_PAYLOAD_LEN, UploadError, Uploader};

/// Hardware handles a wake cycle needs.
pub struct Peripherals<B, L, R, N, U, C, D> {
    /// Raw bus handle used for the address scan
    pub bus: B,
    pub displays: L,
    pub drivers: R,
    pub network: N,
    pub uploader: U,
    pub clock: C,
    pub delay: D,
}

/// Handles acquired during a cycle, dropped when it ends.
struct CycleContext<P, S> {
    presenter: Presenter<P>,
    sensor: Option<S>,
}

/// Drives one wake cycle from bus scan to upload.
///
/// The controller never sleeps itself; [`wake`] wraps it and owns the single
/// call into [`DeepSleep`].
pub struct CycleController<'c, B, L, R, N, U, C, D> {
    config: &'c NodeConfig<'c>,
    parts: Peripherals<B, L, R, N, U, C, D>,
    state: CycleState,
}

impl<'c, B, L, R, N, U, C, D> CycleController<'c, B, L, R, N, U, C, D>
where
    B: I2c,
    L: DisplayConnector,
    R: DriverRegistry,
    N: Network,
    U: Uploader,
    C: Clock,
    D: DelayNs,
{
    pub const fn new(config: &'c NodeConfig<'c>, parts: Peripherals<B, L, R, N, U, C, D>) -> Self {
        Self {
            config,
            parts,
            state: CycleState::Init,
        }
    }

    pub const fn state(&self) -> CycleState {
        self.state
    }

    /// Give back the hardware handles.
    pub fn into_parts(self) -> Peripherals<B, L, R, N, U, C, D> {
        self.parts
    }

    /// Run the cycle to completion. Always ends in [`CycleState::SleepRetreat`].
    pub async fn run(&mut self) -> CycleOutcome {
        let display = &self.config.display;
        let mut ctx = CycleContext {
            presenter: Presenter::headless(display.cols, display.rows),
            sensor: None,
        };

        let outcome = match self.acquire_and_report(&mut ctx).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("Cycle aborted: {}", e);
                self.advance(e.failure_state());

                if let Some(message) = e.status_message() {
                    ctx.presenter.message(message).await;
                }
                if let CycleError::Network(_) = e {
                    self.parts.delay.delay_ms(self.config.internet.timeout_pause_ms).await;
                }
                CycleOutcome::from(e)
            }
        };

        self.advance(CycleState::SleepRetreat);
        outcome
    }

    async fn acquire_and_report(
        &mut self,
        ctx: &mut CycleContext<L::Display, SensorDriver<R::Text, R::Float>>,
    ) -> Result<CycleOutcome, CycleError> {
        let found = bus::scan(&mut self.parts.bus).await;
        let plan = bus::resolve(&found, self.config.display.address_override())
            .ok_or(CycleError::BusFault)?;
        self.advance(CycleState::BusScanned);

        if let Some(address) = plan.display {
            self.attach_display(ctx, address).await;
        } else {
            info!("No display candidate, running headless");
            self.advance(CycleState::NoDisplay);
        }

        let kind = self.parts.drivers.available().ok_or(CycleError::DriverMissing)?;
        self.advance(CycleState::DriverLoaded);

        let address = plan.sensor.ok_or(CycleError::SensorNotFound)?;
        let driver = self.parts.drivers.bind(kind, address).await.map_err(|e| {
            error!("Sensor at {} did not bind: {}", address, e);
            CycleError::SensorNotFound
        })?;
        info!("Sensor {:?} driver bound at {}", kind, address);
        self.advance(CycleState::SensorResolved);

        let sensor = ctx.sensor.insert(driver);
        let reading = sampling::sample(sensor, &mut self.parts.delay, &self.config.sampling)
            .await
            .map_err(CycleError::Read)?;
        self.advance(CycleState::Sampled);

        ctx.presenter.reading(&reading).await;
        self.advance(CycleState::DisplayedReading);

        network::join(&mut self.parts.network, &mut self.parts.delay, &self.config.internet)
            .await
            .map_err(CycleError::Network)?;
        self.advance(CycleState::WifiConnected);

        let outcome = match self.upload(&reading).await {
            Ok(status) => {
                self.advance(CycleState::Uploaded);
                let mut notice: String<20> = String::new();
                let _ = write!(notice, "Upload OK ({status})");
                ctx.presenter.upload_status(&notice).await;
                self.parts.delay.delay_ms(self.config.display.hold_ms).await;
                ctx.presenter.reading(&reading).await;
                CycleOutcome::Success(reading)
            }
            Err(e) => {
                error!("{}", Degraded::Upload(e));
                self.advance(CycleState::UploadFailed);
                ctx.presenter.upload_status(MSG_UPLOAD_ERROR).await;
                CycleOutcome::UploadFailed
            }
        };

        // Leave the last screen readable before the display loses power.
        self.parts.delay.delay_ms(self.config.display.hold_ms).await;
        Ok(outcome)
    }

    async fn attach_display(
        &mut self,
        ctx: &mut CycleContext<L::Display, SensorDriver<R::Text, R::Float>>,
        address: BusAddress,
    ) {
        let config = self.config;
        let display = &config.display;
        match self.parts.displays.attach(address, display.rows, display.cols).await {
            Ok(lcd) => {
                ctx.presenter = Presenter::attached(lcd, display.cols, display.rows);
                ctx.presenter.message(MSG_STARTING).await;
                self.advance(CycleState::DisplayReady);
            }
            Err(e) => {
                warn!("{}", Degraded::Display(e));
                self.advance(CycleState::NoDisplay);
            }
        }
    }

    /// Encode and POST the reading once. Returns the accepted status code.
    async fn upload(&mut self, reading: &CanonicalReading) -> Result<u16, UploadError> {
        let ids = &self.config.telemetry;
        let timestamp = if ids.add_created_at {
            let now = self.parts.clock.now();
            if now.is_none() {
                warn!("No wall-clock time, uploading without createdAt");
            }
            now.map(|t| t.to_iso8601())
        } else {
            None
        };

        let measurements = telemetry::measurements(reading, ids, timestamp.as_deref());
        let mut body = [0u8; MAX_PAYLOAD_LEN];
        let len = telemetry::encode_payload(&measurements, &mut body)?;
        let url = telemetry::endpoint_url(ids.host, ids.box_id)?;

        debug!(
            "POST {} {}",
            url,
            core::str::from_utf8(&body[..len]).unwrap_or("<invalid utf-8>")
        );

        let status = self
            .parts
            .uploader
            .post(&url, CONTENT_TYPE_JSON, &body[..len])
            .await
            .map_err(|e| {
                error!("POST to {} failed: {:?}", url, e);
                UploadError::Transport {
                    details: "request failed",
                }
            })?;

        info!("Collector answered HTTP {}", status);
        if telemetry::is_success(status) {
            Ok(status)
        } else {
            Err(UploadError::Status(status))
        }
    }

    fn advance(&mut self, next: CycleState) {
        debug!("Cycle: {:?} -> {:?}", self.state, next);
        self.state = next;
    }
}

/// Run one wake cycle and retreat into deep sleep.
///
/// This is the only place deep sleep is requested; it happens exactly once,
/// whatever the cycle's outcome.
pub async fn wake<B, L, R, N, U, C, D, S>(
    config: &NodeConfig<'_>,
    parts: Peripherals<B, L, R, N, U, C, D>,
    sleeper: &mut S,
) -> CycleOutcome
where
    B: I2c,
    L: DisplayConnector,
    R: DriverRegistry,
    N: Network,
    U: Uploader,
    C: Clock,
    D: DelayNs,
    S: DeepSleep,
{
    let outcome = {
        let mut controller = CycleController::new(config, parts);
        controller.run().await
    };

    info!("Cycle finished with {:?}, sleeping {} ms", outcome, config.sleep_ms);
    sleeper.sleep(config.sleep_ms);
    outcome
}
