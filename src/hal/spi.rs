//! SPI (Serial Peripheral Interface) master

use embedded_hal::spi::{Mode, Phase, Polarity};

#[cfg(target_arch = "avr")]
pub use self::master::Spi;

const SPCR_SPE: u8 = 0x40;
const SPCR_DORD: u8 = 0x20;
const SPCR_MSTR: u8 = 0x10;
const SPCR_CPOL: u8 = 0x08;
const SPCR_CPHA: u8 = 0x04;

/// SPI clock prescaler options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SpiPrescaler {
    Div4 = 0,
    Div16 = 1,
    Div64 = 2,
    Div128 = 3,
}

/// SPI data order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataOrder {
    MsbFirst,
    LsbFirst,
}

/// SPCR value for an enabled master with the given framing
pub fn control_bits(mode: Mode, order: DataOrder, prescaler: SpiPrescaler) -> u8 {
    let mut bits = SPCR_SPE | SPCR_MSTR | prescaler as u8;
    if let Polarity::IdleHigh = mode.polarity {
        bits |= SPCR_CPOL;
    }
    if let Phase::CaptureOnSecondTransition = mode.phase {
        bits |= SPCR_CPHA;
    }
    if let DataOrder::LsbFirst = order {
        bits |= SPCR_DORD;
    }
    bits
}

#[cfg(target_arch = "avr")]
mod master {
    use avr_device::atmega128a::SPI;
    use core::convert::Infallible;
    use core::marker::PhantomData;
    use embedded_hal::spi::{FullDuplex, Mode};

    use super::{control_bits, DataOrder, SpiPrescaler};
    use crate::hal::gpio::board::{SpiMosi, SpiSck, SpiSs};

    const SPSR_SPIF: u8 = 0x80;
    const SPSR_SPI2X: u8 = 0x01;

    /// SPI master driver
    ///
    /// The ATmega128 has a single data register and one completion flag, so a
    /// new byte is only accepted once the previous one has been read back.
    pub struct Spi {
        _spi: PhantomData<SPI>,
        _pins: (SpiSs, SpiSck, SpiMosi),
        in_flight: bool,
    }

    impl Spi {
        /// Enable the SPI block as master with `mode` and `order` framing and a
        /// `prescaler` clock, optionally doubled.
        pub fn new(
            pins: (SpiSs, SpiSck, SpiMosi),
            mode: Mode,
            order: DataOrder,
            prescaler: SpiPrescaler,
            double_speed: bool,
        ) -> Self {
            unsafe {
                let p = SPI::ptr();
                (*p).spcr.write(|w| w.bits(control_bits(mode, order, prescaler)));
                (*p).spsr.modify(|r, w| {
                    if double_speed {
                        w.bits(r.bits() | SPSR_SPI2X)
                    } else {
                        w.bits(r.bits() & !SPSR_SPI2X)
                    }
                });
            }

            Self {
                _spi: PhantomData,
                _pins: pins,
                in_flight: false,
            }
        }

        fn transfer_complete(&self) -> bool {
            unsafe { (*SPI::ptr()).spsr.read().bits() & SPSR_SPIF != 0 }
        }
    }

    impl FullDuplex<u8> for Spi {
        type Error = Infallible;

        fn read(&mut self) -> nb::Result<u8, Infallible> {
            if !self.transfer_complete() {
                return Err(nb::Error::WouldBlock);
            }
            self.in_flight = false;
            // SPSR was read above with SPIF set; reading SPDR clears the flag
            Ok(unsafe { (*SPI::ptr()).spdr.read().bits() })
        }

        fn send(&mut self, byte: u8) -> nb::Result<(), Infallible> {
            if self.in_flight {
                return Err(nb::Error::WouldBlock);
            }
            unsafe {
                (*SPI::ptr()).spdr.write(|w| w.bits(byte));
            }
            self.in_flight = true;
            Ok(())
        }
    }
}
