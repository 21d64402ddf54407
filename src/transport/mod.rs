//! Chip-select framed SPI transport for the W5500
//!
//! Two layers live here. [`ByteEngine`] exchanges one byte full-duplex with
//! the SPI peripheral. [`Transport`] adds the chip-select line and exposes the
//! [`ChipBus`] operations a chip driver is written against.

mod engine;
mod framed;

pub use engine::{ByteEngine, TransferError};
pub use framed::Transport;

/// How many times a status flag is polled before giving up.
///
/// Real hardware runs [`PollLimit::Unbounded`]: a peripheral that never becomes
/// ready hangs the caller. Bounded limits exist for simulated buses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollLimit {
    Unbounded,
    Bounded(u32),
}

impl Default for PollLimit {
    fn default() -> Self {
        PollLimit::Unbounded
    }
}

/// Transport failure, either from the SPI peripheral or the chip-select pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error<SpiE, PinE> {
    Spi(SpiE),
    Pin(PinE),
    Timeout,
}

impl<SpiE, PinE> From<TransferError<SpiE>> for Error<SpiE, PinE> {
    fn from(err: TransferError<SpiE>) -> Self {
        match err {
            TransferError::Spi(e) => Error::Spi(e),
            TransferError::Timeout => Error::Timeout,
        }
    }
}

/// Byte-level access to a chip behind a chip-select line.
///
/// This is the whole surface a network chip driver needs: the chip-select
/// pair, the single byte pair and the burst pair. Bursts are plain sequences
/// of single byte transfers and never touch chip select themselves.
pub trait ChipBus {
    type Error;

    /// Drive chip select active (low)
    fn select(&mut self) -> Result<(), Self::Error>;

    /// Drive chip select idle (high)
    fn deselect(&mut self) -> Result<(), Self::Error>;

    /// Clock in one byte by sending a dummy 0x00
    fn read_byte(&mut self) -> Result<u8, Self::Error>;

    /// Clock out one byte, discarding whatever comes back
    fn write_byte(&mut self, byte: u8) -> Result<(), Self::Error>;

    fn read_burst(&mut self, buf: &mut [u8]) -> Result<(), Self::Error> {
        for byte in buf.iter_mut() {
            *byte = self.read_byte()?;
        }
        Ok(())
    }

    fn write_burst(&mut self, buf: &[u8]) -> Result<(), Self::Error> {
        for &byte in buf {
            self.write_byte(byte)?;
        }
        Ok(())
    }

    /// Run `f` inside one select/deselect window.
    ///
    /// Chip select is released whether `f` succeeds or not; an error from `f`
    /// wins over an error from the release.
    fn transaction<T, F>(&mut self, f: F) -> Result<T, Self::Error>
    where
        Self: Sized,
        F: FnOnce(&mut Self) -> Result<T, Self::Error>,
    {
        self.select()?;
        let result = f(self);
        let released = self.deselect();
        let value = result?;
        released?;
        Ok(value)
    }
}
