#![cfg_attr(target_arch = "avr", no_std)]
#![cfg_attr(target_arch = "avr", no_main)]

#[cfg(target_arch = "avr")]
mod firmware {
    use panic_halt as _;

    use atmega128_w5500::drivers::{SerialConsole, W5500};
    use atmega128_w5500::hal::{board, DataOrder, Delay, Spi, SpiPrescaler};
    use embedded_hal::spi::MODE_0;
    use atmega128_w5500::{BringUp, BringUpConfig, SpinHalt};
    #[cfg(feature = "selftest")]
    use atmega128_w5500::testing::{BufferSizeTest, RegisterEchoTest, TestRunner, VersionTest};

    #[avr_device::entry]
    fn main() -> ! {
        let mut console = SerialConsole::new();
        console.write_line("ATmega128 W5500 Firmware v0.1.0");

        let (reset, cs) = board::w5500_pins();
        // fosc/4 doubled: 8MHz SCK, well inside the W5500's limit
        let spi = Spi::new(
            board::spi_pins(),
            MODE_0,
            DataOrder::MsbFirst,
            SpiPrescaler::Div4,
            true,
        );
        let mut delay = Delay::new();

        let config = BringUpConfig::default();
        #[allow(unused_mut, unused_variables)]
        let mut chip = BringUp::new(spi, cs, reset, config).run_or_halt(
            &mut delay,
            W5500::new(),
            &mut console,
            &mut SpinHalt,
        );

        #[cfg(feature = "selftest")]
        {
            let (driver, bus) = chip.parts();
            let mut runner = TestRunner::new(&mut console);
            let buffers = BufferSizeTest(config.memory);
            runner.run_suite(
                "W5500 Link",
                &[&VersionTest, &RegisterEchoTest, &buffers],
                driver,
                bus,
            );
        }

        #[cfg(feature = "debug")]
        {
            let (driver, bus) = chip.parts();
            if let Ok(version) = driver.version(bus) {
                console.debug("VERSIONR", version);
            }
        }

        loop {
            avr_device::asm::sleep();
        }
    }
}

#[cfg(not(target_arch = "avr"))]
fn main() {}
