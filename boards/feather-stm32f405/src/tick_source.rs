#![deny(unsafe_code)]
#![deny(warnings)]
//! SysTick-based 1 kHz tick source
//!
//! SysTick is free on this board: the RTIC monotonic runs on TIM2. The
//! interrupt itself is bound to an RTIC hardware task in `main.rs`, which
//! forwards each exception to the shared clock.

use cortex_m::peripheral::syst::SystClkSource;
use cortex_m::peripheral::SYST;
use defmt::{error, info};
use softrtc_hal::{counts_per_tick, TickError, TickSource};

/// SysTick reload register is 24 bits wide
const SYST_RELOAD_MAX: u32 = 0x00FF_FFFF;

pub struct SysTickSource {
    syst: SYST,
    core_clock_hz: u32,
}

impl SysTickSource {
    pub fn new(syst: SYST, core_clock_hz: u32) -> Self {
        Self {
            syst,
            core_clock_hz,
        }
    }

    fn reload(&self) -> Result<u32, TickError> {
        let reload = counts_per_tick(self.core_clock_hz)? - 1;
        if reload > SYST_RELOAD_MAX {
            return Err(TickError::RateUnreachable {
                timer_clock_hz: self.core_clock_hz,
            });
        }
        Ok(reload)
    }
}

impl TickSource for SysTickSource {
    fn start(&mut self) -> Result<(), TickError> {
        let reload = self.reload().inspect_err(|e| {
            error!("SysTick not armed: {}", e);
        })?;

        self.syst.set_clock_source(SystClkSource::Core);
        self.syst.set_reload(reload);
        self.syst.clear_current();
        self.syst.enable_interrupt();
        self.syst.enable_counter();
        info!("SysTick armed: reload {} at {} Hz", reload, self.core_clock_hz);
        Ok(())
    }

    fn stop(&mut self) {
        self.syst.disable_interrupt();
        self.syst.disable_counter();
    }
}
