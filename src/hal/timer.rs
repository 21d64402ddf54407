use avr_device::atmega128a::TC0;
use core::marker::PhantomData;
use embedded_hal::blocking::delay::DelayUs;

use crate::config::CPU_FREQ_HZ;

const PRESCALER_MASK: u8 = 0x07;

/// CS0[2:0] for clk/8
const CLOCK_DIV8: u8 = 0x02;

/// Timer0 ticks per microsecond at clk/8
const TICKS_PER_US: u32 = CPU_FREQ_HZ / 8 / 1_000_000;

/// Longest stretch counted in one pass, kept clear of the 8-bit wrap
const CHUNK_TICKS: u8 = 200;

/// Busy-wait delay driven by Timer0
pub struct Delay {
    _timer: PhantomData<TC0>,
}

impl Delay {
    pub fn new() -> Self {
        unsafe {
            // Normal mode, stopped
            let p = TC0::ptr();
            (*p).tccr0.write(|w| w.bits(0));
            (*p).tcnt0.write(|w| w.bits(0));
        }
        Self { _timer: PhantomData }
    }

    fn start(&mut self) {
        unsafe {
            let p = TC0::ptr();
            (*p).tccr0.modify(|r, w| w.bits((r.bits() & !PRESCALER_MASK) | CLOCK_DIV8));
        }
    }

    fn stop(&mut self) {
        unsafe {
            let p = TC0::ptr();
            (*p).tccr0.modify(|r, w| w.bits(r.bits() & !PRESCALER_MASK));
        }
    }

    fn set_counter(&mut self, value: u8) {
        unsafe {
            (*TC0::ptr()).tcnt0.write(|w| w.bits(value));
        }
    }

    fn counter(&self) -> u8 {
        unsafe { (*TC0::ptr()).tcnt0.read().bits() }
    }

    fn wait_ticks(&mut self, mut ticks: u32) {
        self.set_counter(0);
        self.start();
        while ticks > 0 {
            let chunk = ticks.min(u32::from(CHUNK_TICKS)) as u8;
            self.set_counter(0);
            while self.counter() < chunk {}
            ticks -= u32::from(chunk);
        }
        self.stop();
    }
}

impl Default for Delay {
    fn default() -> Self {
        Self::new()
    }
}

impl DelayUs<u32> for Delay {
    fn delay_us(&mut self, us: u32) {
        self.wait_ticks(us.saturating_mul(TICKS_PER_US));
    }
}
