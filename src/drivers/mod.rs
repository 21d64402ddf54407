pub mod console;
#[cfg(target_arch = "avr")]
pub mod serial_console;
pub mod w5500;

pub use console::{debug_line, Hex};
#[cfg(target_arch = "avr")]
pub use serial_console::SerialConsole;
pub use w5500::{ChipInitError, W5500};
