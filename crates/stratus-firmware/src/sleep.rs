use core::time::Duration;

use esp_hal::peripherals::LPWR;
use esp_hal::rtc_cntl::Rtc;
use esp_hal::rtc_cntl::sleep::TimerWakeupSource;
use log::info;
use stratus_core::power::DeepSleep;

/// RTC timer deep sleep; the chip restarts from reset on wake-up.
pub struct RtcSleeper {
    rtc: Rtc<'static>,
}

impl RtcSleeper {
    pub fn new(lpwr: LPWR<'static>) -> Self {
        Self { rtc: Rtc::new(lpwr) }
    }
}

impl DeepSleep for RtcSleeper {
    fn sleep(&mut self, duration_ms: u32) {
        let timer = TimerWakeupSource::new(Duration::from_millis(u64::from(duration_ms)));
        info!("Entering deep sleep for {} ms", duration_ms);
        self.rtc.sleep_deep(&[&timer]);
    }
}
