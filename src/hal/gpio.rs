use avr_device::atmega128a::{PORTB, PORTC};
use core::convert::Infallible;
use core::marker::PhantomData;
use embedded_hal::digital::v2::OutputPin;

pub trait PinMode {}
pub struct Input;
pub struct Output;
impl PinMode for Input {}
impl PinMode for Output {}

#[derive(Debug)]
pub struct Pin<PORT, const PIN: u8, MODE> {
    _port: PhantomData<PORT>,
    _mode: PhantomData<MODE>,
}

impl<PORT, const P: u8> Pin<PORT, P, Input> {
    /// Claim a pin in its reset state (input, no pull-up).
    ///
    /// # Safety
    /// Each pin may only be claimed once.
    pub unsafe fn steal() -> Self {
        Pin {
            _port: PhantomData,
            _mode: PhantomData,
        }
    }
}

macro_rules! impl_port {
    ($PORT:ident, $ddr:ident, $port:ident) => {
        impl<const P: u8, MODE: PinMode> Pin<$PORT, P, MODE> {
            /// Push-pull output, driven low until told otherwise
            pub fn into_output(self) -> Pin<$PORT, P, Output> {
                unsafe {
                    // Clear PORTx first so enabling the driver never glitches high
                    (*$PORT::ptr()).$port.modify(|r, w| w.bits(r.bits() & !(1 << P)));
                    (*$PORT::ptr()).$ddr.modify(|r, w| w.bits(r.bits() | (1 << P)));
                }
                Pin {
                    _port: PhantomData,
                    _mode: PhantomData,
                }
            }

            /// Push-pull output that starts out driven high
            pub fn into_output_high(self) -> Pin<$PORT, P, Output> {
                unsafe {
                    (*$PORT::ptr()).$port.modify(|r, w| w.bits(r.bits() | (1 << P)));
                    (*$PORT::ptr()).$ddr.modify(|r, w| w.bits(r.bits() | (1 << P)));
                }
                Pin {
                    _port: PhantomData,
                    _mode: PhantomData,
                }
            }
        }

        impl<const P: u8> OutputPin for Pin<$PORT, P, Output> {
            type Error = Infallible;

            #[inline]
            fn set_high(&mut self) -> Result<(), Infallible> {
                unsafe {
                    (*$PORT::ptr()).$port.modify(|r, w| w.bits(r.bits() | (1 << P)));
                }
                Ok(())
            }

            #[inline]
            fn set_low(&mut self) -> Result<(), Infallible> {
                unsafe {
                    (*$PORT::ptr()).$port.modify(|r, w| w.bits(r.bits() & !(1 << P)));
                }
                Ok(())
            }
        }
    };
}

impl_port!(PORTB, ddrb, portb);
impl_port!(PORTC, ddrc, portc);

// W5500 module wiring
pub mod board {
    use super::*;

    /// RSTn, active low
    pub type W5500Reset = Pin<PORTC, 3, Output>;
    /// SCSn, active low
    pub type W5500Cs = Pin<PORTC, 0, Output>;

    // Hardware SPI lines (PORTB). SS must be an output for the SPI block to
    // stay in master mode.
    pub type SpiSs = Pin<PORTB, 0, Output>;
    pub type SpiSck = Pin<PORTB, 1, Output>;
    pub type SpiMosi = Pin<PORTB, 2, Output>;

    /// Configure the W5500 control lines, both released (high)
    pub fn w5500_pins() -> (W5500Reset, W5500Cs) {
        unsafe {
            (
                Pin::<PORTC, 3, Input>::steal().into_output_high(),
                Pin::<PORTC, 0, Input>::steal().into_output_high(),
            )
        }
    }

    /// Configure SS, SCK and MOSI as outputs; MISO stays an input
    pub fn spi_pins() -> (SpiSs, SpiSck, SpiMosi) {
        unsafe {
            (
                Pin::<PORTB, 0, Input>::steal().into_output_high(),
                Pin::<PORTB, 1, Input>::steal().into_output(),
                Pin::<PORTB, 2, Input>::steal().into_output(),
            )
        }
    }
}
