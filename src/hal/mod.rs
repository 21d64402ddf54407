#[cfg(target_arch = "avr")]
pub mod gpio;
pub mod spi;
#[cfg(target_arch = "avr")]
pub mod timer;
#[cfg(target_arch = "avr")]
pub mod uart;

// Re-export commonly used types
#[cfg(target_arch = "avr")]
pub use gpio::board;
#[cfg(target_arch = "avr")]
pub use gpio::{Input, Output, Pin};
#[cfg(target_arch = "avr")]
pub use spi::Spi;
pub use spi::{DataOrder, SpiPrescaler};
#[cfg(target_arch = "avr")]
pub use timer::Delay;
#[cfg(target_arch = "avr")]
pub use uart::Uart;
