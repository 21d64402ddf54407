//! Console formatting shared by every `uWrite` sink

use ufmt::{uDisplay, uWrite, uwrite, Formatter};

const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

/// A byte printed as two upper-case hex digits
#[derive(Debug, Clone, Copy)]
pub struct Hex(pub u8);

impl uDisplay for Hex {
    fn fmt<W: uWrite + ?Sized>(&self, f: &mut Formatter<'_, W>) -> Result<(), W::Error> {
        let digits = [
            HEX_DIGITS[usize::from(self.0 >> 4)],
            HEX_DIGITS[usize::from(self.0 & 0x0F)],
        ];
        // Both bytes come from HEX_DIGITS
        match core::str::from_utf8(&digits) {
            Ok(s) => f.write_str(s),
            Err(_) => Ok(()),
        }
    }
}

/// `[DBG] <label>: 0x<value>` on its own line
pub fn debug_line<W: uWrite>(console: &mut W, label: &str, value: u8) -> Result<(), W::Error> {
    uwrite!(console, "[DBG] {}: 0x{}\r\n", label, Hex(value))
}
