//! Chip bring-up: reset pulse, driver registration and chip initialization

use embedded_hal::blocking::delay::DelayUs;
use embedded_hal::digital::v2::OutputPin;
use embedded_hal::spi::FullDuplex;
use ufmt::uWrite;

use crate::config::{BringUpConfig, MemoryPartitionTable};
use crate::transport::{ByteEngine, ChipBus, Transport};

pub const SUCCESS_LINE: &str = "WIZCHIP Initialization Successful. \r\n";
pub const FAILURE_LINE: &str = "WIZCHIP Initialization Failed. \r\n";

/// The network-stack side of the link.
///
/// A driver never sees SPI or pins, only the [`ChipBus`] it was registered
/// with. Bring-up always calls `register` before `init_chip`.
pub trait ChipDriver<B: ChipBus> {
    type Error;

    /// Hand the driver the bus it will be driven through. No traffic yet.
    fn register(&mut self, bus: &mut B);

    /// Bring the chip into a usable state with the given buffer partition
    fn init_chip(&mut self, bus: &mut B, memory: &MemoryPartitionTable) -> Result<(), Self::Error>;
}

/// Terminal state for a failed bring-up
pub trait Halt {
    fn halt(&mut self) -> !;
}

/// Parks the CPU forever
pub struct SpinHalt;

impl Halt for SpinHalt {
    fn halt(&mut self) -> ! {
        #[allow(clippy::empty_loop)]
        loop {
            core::hint::spin_loop();
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BringUpError<PinE, DrvE> {
    Pin(PinE),
    Chip(DrvE),
}

/// A driver bound to the bus it talks through, plus the reset line it owns
pub struct Wizchip<B, D, RST> {
    bus: B,
    driver: D,
    reset: RST,
}

impl<B: ChipBus, D: ChipDriver<B>, RST> Wizchip<B, D, RST> {
    fn bind(bus: B, driver: D, reset: RST) -> Self {
        Self { bus, driver, reset }
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Borrow both halves at once, for driver calls that take the bus
    pub fn parts(&mut self) -> (&mut D, &mut B) {
        (&mut self.driver, &mut self.bus)
    }

    pub fn into_parts(self) -> (D, B, RST) {
        (self.driver, self.bus, self.reset)
    }
}

/// What a successful bring-up hands back
pub type Ready<SPI, CS, RST, D> = Wizchip<Transport<SPI, CS>, D, RST>;

/// One-shot bring-up sequence over a chip-select and a reset line
pub struct BringUp<SPI, CS, RST> {
    engine: ByteEngine<SPI>,
    cs: CS,
    reset: RST,
    config: BringUpConfig,
}

impl<SPI, CS, RST> BringUp<SPI, CS, RST>
where
    SPI: FullDuplex<u8>,
    CS: OutputPin,
    RST: OutputPin<Error = CS::Error>,
{
    /// Both pins must already be configured as push-pull outputs
    pub fn new(spi: SPI, cs: CS, reset: RST, config: BringUpConfig) -> Self {
        Self {
            engine: ByteEngine::with_poll_limit(spi, config.poll_limit),
            cs,
            reset,
            config,
        }
    }

    /// Run the sequence and print the outcome on `console`.
    ///
    /// Chip select is idle when this returns, whichever way it returns.
    pub fn run<DL, D, W>(
        self,
        delay: &mut DL,
        driver: D,
        console: &mut W,
    ) -> Result<Ready<SPI, CS, RST, D>, BringUpError<CS::Error, D::Error>>
    where
        DL: DelayUs<u32>,
        D: ChipDriver<Transport<SPI, CS>>,
        W: uWrite,
    {
        let result = self.sequence(delay, driver);
        let line = if result.is_ok() { SUCCESS_LINE } else { FAILURE_LINE };
        console.write_str(line).ok();
        result
    }

    /// Like [`BringUp::run`], but a failure parks the system through `halt`
    pub fn run_or_halt<DL, D, W, H>(
        self,
        delay: &mut DL,
        driver: D,
        console: &mut W,
        halt: &mut H,
    ) -> Ready<SPI, CS, RST, D>
    where
        DL: DelayUs<u32>,
        D: ChipDriver<Transport<SPI, CS>>,
        W: uWrite,
        H: Halt,
    {
        match self.run(delay, driver, console) {
            Ok(ready) => ready,
            Err(_) => halt.halt(),
        }
    }

    fn sequence<DL, D>(
        self,
        delay: &mut DL,
        mut driver: D,
    ) -> Result<Ready<SPI, CS, RST, D>, BringUpError<CS::Error, D::Error>>
    where
        DL: DelayUs<u32>,
        D: ChipDriver<Transport<SPI, CS>>,
    {
        let Self {
            engine,
            mut cs,
            mut reset,
            config,
        } = self;

        cs.set_high().map_err(BringUpError::Pin)?;

        reset.set_low().map_err(BringUpError::Pin)?;
        delay.delay_us(config.reset_pulse_us);
        reset.set_high().map_err(BringUpError::Pin)?;
        delay.delay_us(config.reset_settle_us);

        let mut bus = Transport::new(engine, cs);
        driver.register(&mut bus);
        if let Err(err) = driver.init_chip(&mut bus, &config.memory) {
            // Init may have bailed mid-frame; leave the line idle
            bus.deselect().ok();
            return Err(BringUpError::Chip(err));
        }

        Ok(Wizchip::bind(bus, driver, reset))
    }
}
