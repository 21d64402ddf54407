//! Single byte full-duplex exchange

use embedded_hal::spi::FullDuplex;

use super::PollLimit;

/// Failure of a single byte exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferError<E> {
    Spi(E),
    Timeout,
}

/// Owns the SPI peripheral and moves one byte each way per call
pub struct ByteEngine<SPI> {
    spi: SPI,
    poll_limit: PollLimit,
}

impl<SPI> ByteEngine<SPI>
where
    SPI: FullDuplex<u8>,
{
    pub fn new(spi: SPI) -> Self {
        Self::with_poll_limit(spi, PollLimit::Unbounded)
    }

    pub fn with_poll_limit(spi: SPI, poll_limit: PollLimit) -> Self {
        Self { spi, poll_limit }
    }

    /// Transfer a single byte
    ///
    /// Waits for the transmit side to accept `out`, then waits for the byte
    /// shifted in during the same clock period and returns it.
    pub fn transfer(&mut self, out: u8) -> Result<u8, TransferError<SPI::Error>> {
        let limit = self.poll_limit;
        let spi = &mut self.spi;

        poll(limit, || spi.send(out))?;
        poll(limit, || spi.read())
    }

    /// Give the peripheral back
    pub fn free(self) -> SPI {
        self.spi
    }
}

fn poll<T, E>(
    limit: PollLimit,
    mut op: impl FnMut() -> nb::Result<T, E>,
) -> Result<T, TransferError<E>> {
    let mut retries: u32 = 0;
    loop {
        match op() {
            Ok(value) => return Ok(value),
            Err(nb::Error::Other(e)) => return Err(TransferError::Spi(e)),
            Err(nb::Error::WouldBlock) => {
                if let PollLimit::Bounded(max) = limit {
                    if retries >= max {
                        return Err(TransferError::Timeout);
                    }
                    retries += 1;
                }
            }
        }
    }
}
