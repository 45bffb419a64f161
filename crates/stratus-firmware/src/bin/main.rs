#![no_std]
#![no_main]
#![deny(
    clippy::mem_forget,
    reason = "mem::forget is generally not safe to do with esp_hal types, especially those \
    holding buffers for the duration of a data transfer."
)]
#![deny(clippy::large_stack_frames)]

use embassy_executor::Spawner;
use embassy_net::StackResources;
use embassy_time::Delay;
use esp_hal::clock::CpuClock;
use esp_hal::rng::Rng;
use esp_hal::timer::timg::TimerGroup;
use log::{LevelFilter, info};
use static_cell::StaticCell;
use stratus_core::display::Lcd1602Connector;
use stratus_core::telemetry::NoClock;
use stratus_core::{Peripherals, wake};
use stratus_firmware::drivers::BoardDrivers;
use stratus_firmware::hardware::{create_i2c_bus, share_bus};
use stratus_firmware::http::HttpsUploader;
use stratus_firmware::sleep::RtcSleeper;
use stratus_firmware::wifi::{StationLink, net_task};
use stratus_firmware::wifi_secrets;

#[panic_handler]
fn panic(info: &core::panic::PanicInfo) -> ! {
    rtt_target::rprintln!("PANIC: {}", info);
    loop {}
}

extern crate alloc;

// This creates a default app-descriptor required by the esp-idf bootloader.
// For more information see: <https://docs.espressif.com/projects/esp-idf/en/stable/esp32/api-reference/system/app_image_format.html#application-description>
esp_bootloader_esp_idf::esp_app_desc!();

#[allow(
    clippy::large_stack_frames,
    reason = "it's not unusual to allocate larger buffers etc. in main"
)]
#[esp_rtos::main]
async fn main(spawner: Spawner) -> ! {
    rtt_target::rtt_init_log!(LevelFilter::Info);

    let hal_config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(hal_config);

    esp_alloc::heap_allocator!(#[esp_hal::ram(reclaimed)] size: 73744);

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    let config = wifi_secrets::node_config();
    info!("stratus wake, box {}", config.telemetry.box_id);

    let i2c = create_i2c_bus(
        peripherals.I2C0,
        peripherals.I2C1,
        // BOARD_SDA / BOARD_SCL
        peripherals.GPIO21,
        peripherals.GPIO22,
        &config.bus,
    )
    .expect("Failed to configure either I2C controller");
    let bus = share_bus(i2c);

    static RADIO: StaticCell<esp_radio::Controller<'static>> = StaticCell::new();
    let radio = RADIO.init(esp_radio::init().expect("Failed to initialize Wi-Fi/BLE controller"));
    let (wifi_controller, interfaces) =
        esp_radio::wifi::new(radio, peripherals.WIFI, Default::default())
            .expect("Failed to initialize Wi-Fi controller");

    let mut rng = Rng::new();
    let net_seed = (u64::from(rng.random()) << 32) | u64::from(rng.random());

    static NET_RESOURCES: StaticCell<StackResources<4>> = StaticCell::new();
    let (stack, runner) = embassy_net::new(
        interfaces.sta,
        embassy_net::Config::dhcpv4(Default::default()),
        NET_RESOURCES.init(StackResources::new()),
        net_seed,
    );
    spawner
        .spawn(net_task(runner))
        .expect("Failed to spawn network task");

    let parts = Peripherals {
        bus: bus.clone(),
        displays: Lcd1602Connector::new(bus.clone(), Delay),
        drivers: BoardDrivers::new(bus),
        network: StationLink::new(wifi_controller, stack),
        uploader: HttpsUploader::new(stack, rng),
        clock: NoClock,
        delay: Delay,
    };

    let mut sleeper = RtcSleeper::new(peripherals.LPWR);
    let outcome = wake(&config, parts, &mut sleeper).await;

    // Deep sleep resets the chip; reaching this line means it was refused.
    panic!("deep sleep returned after {:?}", outcome)
}
