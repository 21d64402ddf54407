use crate::hal::Uart;
use core::convert::Infallible;
use ufmt::uWrite;

use super::console::debug_line;

/// Line-oriented console on USART0
pub struct SerialConsole {
    uart: Uart,
}

impl SerialConsole {
    pub fn new() -> Self {
        Self { uart: Uart::new() }
    }

    pub fn write_line(&mut self, s: &str) {
        self.uart.write_str(s).ok();
        self.uart.write_str("\r\n").ok();
    }

    pub fn debug(&mut self, label: &str, value: u8) {
        debug_line(&mut self.uart, label, value).ok();
    }
}

impl Default for SerialConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl uWrite for SerialConsole {
    type Error = Infallible;

    fn write_str(&mut self, s: &str) -> Result<(), Infallible> {
        self.uart.write_str(s)
    }
}
