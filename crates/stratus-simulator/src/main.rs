//! Desktop simulator for the stratus telemetry node.
//!
//! Runs a number of complete wake cycles against simulated hardware: an I2C
//! bus with a character LCD and a BME280, a WiFi access point and the
//! openSenseMap collector. The LCD is rendered into the log and every deep
//! sleep is only logged, so one run shows the whole cycle end to end.
//!
//! # Usage
//!
//! ```text
//! RUST_LOG=info stratus-simulator [scenario] [cycles]
//! ```
//!
//! | Scenario         | What happens                                  |
//! |------------------|-----------------------------------------------|
//! | `nominal`        | LCD + float BME280, upload accepted (default) |
//! | `text-driver`    | Only the string-reporting driver is built in  |
//! | `secondary`      | Devices at the alternate addresses 0x3F/0x77  |
//! | `headless`       | No LCD on the bus                             |
//! | `broken-display` | LCD present but never initializes             |
//! | `no-sensor`      | Only the LCD answers                          |
//! | `no-driver`      | No compatible driver in the build             |
//! | `empty-bus`      | Nothing answers the scan                      |
//! | `offline`        | The access point never associates             |
//! | `rejected`       | The collector answers HTTP 401                |

mod host;
mod sim_bus;
mod synthetic;
mod terminal_lcd;

use std::str::FromStr;

use embassy_futures::block_on;
use log::{error, info};
use stratus_core::config::{InternetConfig, TelemetryConfig};
use stratus_core::sensors::DriverKind;
use stratus_core::{CycleOutcome, NodeConfig, Peripherals, wake};

use host::{HostClock, HostDelay, LoggedSleeper, LoggingUploader, SimNetwork, TIME_SCALE};
use sim_bus::SimBus;
use synthetic::SimDrivers;
use terminal_lcd::TerminalLcdConnector;

const DEFAULT_CYCLES: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scenario {
    Nominal,
    TextDriver,
    Secondary,
    Headless,
    BrokenDisplay,
    NoSensor,
    NoDriver,
    EmptyBus,
    Offline,
    Rejected,
}

impl FromStr for Scenario {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "nominal" => Self::Nominal,
            "text-driver" => Self::TextDriver,
            "secondary" => Self::Secondary,
            "headless" => Self::Headless,
            "broken-display" => Self::BrokenDisplay,
            "no-sensor" => Self::NoSensor,
            "no-driver" => Self::NoDriver,
            "empty-bus" => Self::EmptyBus,
            "offline" => Self::Offline,
            "rejected" => Self::Rejected,
            other => return Err(format!("unknown scenario {other:?}")),
        })
    }
}

impl Scenario {
    fn devices(self) -> &'static [u8] {
        match self {
            Self::Secondary => &[0x3F, 0x77],
            Self::Headless => &[0x76],
            Self::NoSensor => &[0x27],
            Self::EmptyBus => &[],
            _ => &[0x27, 0x76],
        }
    }

    fn driver(self) -> Option<DriverKind> {
        match self {
            Self::TextDriver => Some(DriverKind::Text),
            Self::NoDriver => None,
            _ => Some(DriverKind::Float),
        }
    }

    fn peripherals(
        self,
        cycle: u32,
    ) -> Peripherals<
        SimBus,
        TerminalLcdConnector,
        SimDrivers,
        SimNetwork,
        LoggingUploader,
        HostClock,
        HostDelay,
    > {
        Peripherals {
            bus: SimBus::new(self.devices()),
            displays: TerminalLcdConnector::new(self == Self::BrokenDisplay),
            drivers: SimDrivers::new(self.driver(), cycle),
            network: SimNetwork::new((self != Self::Offline).then_some(3)),
            uploader: LoggingUploader::new(if self == Self::Rejected { 401 } else { 201 }),
            clock: HostClock,
            delay: HostDelay,
        }
    }
}

fn node_config() -> NodeConfig<'static> {
    NodeConfig {
        internet: InternetConfig {
            ssid: "stratus-sim",
            password: "simulated",
            ..InternetConfig::default()
        },
        telemetry: TelemetryConfig {
            box_id: "5f0c0ffee0ddba11c0ffee00",
            temperature_sensor: "5f0c0ffee0ddba11c0ffee01",
            pressure_sensor: "5f0c0ffee0ddba11c0ffee02",
            humidity_sensor: "5f0c0ffee0ddba11c0ffee03",
            add_created_at: true,
            ..TelemetryConfig::default()
        },
        ..NodeConfig::default()
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let scenario = match args.next().as_deref().map(Scenario::from_str).transpose() {
        Ok(scenario) => scenario.unwrap_or(Scenario::Nominal),
        Err(e) => {
            error!("{}", e);
            std::process::exit(2);
        }
    };
    let cycles = args.next().and_then(|n| n.parse().ok()).unwrap_or(DEFAULT_CYCLES);

    info!(
        "Starting stratus simulator: {:?}, {} cycles, time x{}",
        scenario, cycles, TIME_SCALE
    );

    let config = node_config();
    for cycle in 0..cycles {
        info!("--- wake {} ---", cycle + 1);
        let mut sleeper = LoggedSleeper::default();
        let outcome = block_on(wake(&config, scenario.peripherals(cycle), &mut sleeper));

        match outcome {
            CycleOutcome::Success(reading) => info!(
                "Uploaded {:.2} C {:.1} % {:.1} hPa",
                reading.temperature, reading.humidity, reading.pressure
            ),
            other => info!("Cycle ended with {:?}", other),
        }
        if sleeper.requests() != 1 {
            error!("Expected one deep sleep, saw {}", sleeper.requests());
        }
    }

    info!("Simulator exiting");
}
