//! Chip-select framing on top of the byte engine

use embedded_hal::digital::v2::OutputPin;
use embedded_hal::spi::FullDuplex;

use super::{ByteEngine, ChipBus, Error, PollLimit};

/// Dummy byte clocked out when only the response matters
const DUMMY: u8 = 0x00;

/// SPI link to one chip: the byte engine plus the chip's select line
pub struct Transport<SPI, CS> {
    engine: ByteEngine<SPI>,
    cs: CS,
}

impl<SPI, CS> Transport<SPI, CS>
where
    SPI: FullDuplex<u8>,
    CS: OutputPin,
{
    /// Wrap an engine and a select pin. The pin is left untouched; callers
    /// drive it idle before the first transaction.
    pub fn new(engine: ByteEngine<SPI>, cs: CS) -> Self {
        Self { engine, cs }
    }

    pub fn with_poll_limit(spi: SPI, cs: CS, poll_limit: PollLimit) -> Self {
        Self::new(ByteEngine::with_poll_limit(spi, poll_limit), cs)
    }

    pub fn release(self) -> (SPI, CS) {
        (self.engine.free(), self.cs)
    }
}

impl<SPI, CS> ChipBus for Transport<SPI, CS>
where
    SPI: FullDuplex<u8>,
    CS: OutputPin,
{
    type Error = Error<SPI::Error, CS::Error>;

    fn select(&mut self) -> Result<(), Self::Error> {
        self.cs.set_low().map_err(Error::Pin)
    }

    fn deselect(&mut self) -> Result<(), Self::Error> {
        self.cs.set_high().map_err(Error::Pin)
    }

    fn read_byte(&mut self) -> Result<u8, Self::Error> {
        Ok(self.engine.transfer(DUMMY)?)
    }

    fn write_byte(&mut self, byte: u8) -> Result<(), Self::Error> {
        self.engine.transfer(byte)?;
        Ok(())
    }
}
