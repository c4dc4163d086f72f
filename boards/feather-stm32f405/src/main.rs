#![deny(unsafe_code)]
#![deny(warnings)]
#![no_main]
#![no_std]

use defmt_rtt as _; // global logger
use panic_probe as _;
use rtic::app;
use rtic_monotonics::stm32::prelude::*;
use softrtc_core::SharedClock;

mod config;
mod tick_source;

stm32_tim2_monotonic!(Mono, 1_000_000);

/// Calendar shared between the SysTick handler and the report task
static CLOCK: SharedClock = SharedClock::new();

#[app(device = embassy_stm32, peripherals = true, dispatchers = [USART1])]
mod app {
    use super::*;
    use defmt::{info, warn};
    use embassy_stm32::rcc::{Hse, HseMode};
    use embassy_stm32::time::Hertz;
    use softrtc_core::{SoftRtc, Weekday};

    use config::ClockConfig;
    use tick_source::SysTickSource;

    #[shared]
    struct Shared {}

    #[local]
    struct Local {
        rtc: SoftRtc<'static, SysTickSource>,
        report_interval_secs: u64,
    }

    #[init]
    fn init(cx: init::Context) -> (Shared, Local) {
        info!("Software RTC starting...");

        // Adafruit Feather STM32F405: 12 MHz HSE
        let mut config = embassy_stm32::Config::default();
        config.rcc.hse = Some(Hse {
            freq: Hertz(12_000_000),
            mode: HseMode::Oscillator,
        });

        // HSE (12 MHz) / PREDIV(6) = 2 MHz (PLL input)
        // 2 MHz * MUL(168) = 336 MHz (VCO)
        // VCO / DIVP(4) = 84 MHz (SYSCLK, SysTick source)
        // VCO / DIVQ(7) = 48 MHz (USB/RNG clock)
        config.rcc.pll_src = embassy_stm32::rcc::PllSource::HSE;
        config.rcc.pll = Some(embassy_stm32::rcc::Pll {
            prediv: embassy_stm32::rcc::PllPreDiv::DIV6,
            mul: embassy_stm32::rcc::PllMul::MUL168,
            divp: Some(embassy_stm32::rcc::PllPDiv::DIV4),
            divq: Some(embassy_stm32::rcc::PllQDiv::DIV7),
            divr: None,
        });
        config.rcc.sys = embassy_stm32::rcc::Sysclk::PLL1_P;
        config.rcc.ahb_pre = embassy_stm32::rcc::AHBPrescaler::DIV1; // 84 MHz
        config.rcc.apb1_pre = embassy_stm32::rcc::APBPrescaler::DIV2; // 42 MHz
        config.rcc.apb2_pre = embassy_stm32::rcc::APBPrescaler::DIV1; // 84 MHz

        let _p = embassy_stm32::init(config);
        info!("System initialized with HSE (12MHz), SYSCLK=84MHz");

        // TIM2 on APB1: timer clock = 2*APB1 when prescaler != 1
        let timer_clock_hz = 84_000_000;
        Mono::start(timer_clock_hz);
        info!("TIM2 monotonic timer initialized at 1 MHz");

        let clock_config = ClockConfig::default();
        let source = SysTickSource::new(cx.core.SYST, clock_config.core_clock_hz);
        let mut rtc = SoftRtc::new(&CLOCK, source);

        let initial = clock_config.initial;
        if let Err(e) = rtc.set_date(initial.day, initial.month, initial.year) {
            warn!("Initial date rejected: {}", e);
        }
        if let Err(e) = rtc.set_time(initial.hour, initial.minute, initial.second) {
            warn!("Initial time rejected: {}", e);
        }
        if let Err(e) = rtc.set_delta_t(clock_config.delta_t_tenths) {
            warn!("Drift correction rejected: {}", e);
        }

        match rtc.start() {
            Ok(()) => info!(
                "Software RTC running from {} (drift {} tenths/day)",
                rtc.now().to_iso8601().as_str(),
                rtc.get_delta_t()
            ),
            Err(e) => warn!("Software RTC not running: {}", e),
        }

        report::spawn().ok();

        (
            Shared {},
            Local {
                rtc,
                report_interval_secs: clock_config.report_interval_secs,
            },
        )
    }

    /// 1 kHz tick from SysTick, drives the calendar
    #[task(binds = SysTick, priority = 3)]
    fn systick(_cx: systick::Context) {
        CLOCK.on_tick();
    }

    /// Periodic time report
    #[task(priority = 1, local = [rtc, report_interval_secs])]
    async fn report(cx: report::Context) {
        let rtc = cx.local.rtc;
        let interval = *cx.local.report_interval_secs;
        info!("Report task started ({} s interval)", interval);
        loop {
            Mono::delay(interval.secs()).await;

            let now = rtc.now();
            let weekday = rtc.get_week_day();
            match Weekday::from_index(weekday) {
                Some(day) => info!(
                    "{} {} (unix {})",
                    now.to_iso8601().as_str(),
                    day,
                    rtc.get_timestamp(None)
                ),
                None => warn!("Weekday index {} out of range", weekday),
            }
        }
    }

    /// RTIC idle task - WFI sleep mode when no tasks active
    #[idle]
    fn idle(_cx: idle::Context) -> ! {
        info!("Idle task started - entering WFI loop");
        loop {
            cortex_m::asm::wfi();
        }
    }
}
