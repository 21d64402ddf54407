use avr_device::atmega128a::USART0;
use core::convert::Infallible;
use core::marker::PhantomData;
use ufmt::uWrite;

use crate::config::{CPU_FREQ_HZ, UART_BAUD};

const UBRR: u16 = (CPU_FREQ_HZ / (16 * UART_BAUD) - 1) as u16;

const UCSRA_UDRE: u8 = 0x20;
const UCSRB_TXEN: u8 = 0x08;
const UCSRC_8N1: u8 = 0x06;

/// Polled, transmit-only USART0
///
/// Nothing here is interrupt driven; a write returns once the last byte has
/// been handed to the data register.
pub struct Uart {
    _usart: PhantomData<USART0>,
}

impl Uart {
    pub fn new() -> Self {
        unsafe {
            let p = USART0::ptr();
            (*p).ubrr0h.write(|w| w.bits((UBRR >> 8) as u8));
            (*p).ubrr0l.write(|w| w.bits(UBRR as u8));
            (*p).ucsr0c.write(|w| w.bits(UCSRC_8N1));
            (*p).ucsr0b.write(|w| w.bits(UCSRB_TXEN));
        }

        Self { _usart: PhantomData }
    }

    pub fn write_byte(&mut self, byte: u8) {
        unsafe {
            let p = USART0::ptr();
            while (*p).ucsr0a.read().bits() & UCSRA_UDRE == 0 {}
            (*p).udr0.write(|w| w.bits(byte));
        }
    }
}

impl Default for Uart {
    fn default() -> Self {
        Self::new()
    }
}

impl uWrite for Uart {
    type Error = Infallible;

    fn write_str(&mut self, s: &str) -> Result<(), Infallible> {
        for byte in s.bytes() {
            self.write_byte(byte);
        }
        Ok(())
    }
}
