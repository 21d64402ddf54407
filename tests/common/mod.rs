//! Simulated W5500 wired to a simulated SPI peripheral, chip-select and reset
//! line, all sharing one event log.
#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::convert::Infallible;
use std::rc::Rc;

use embedded_hal::blocking::delay::DelayUs;
use embedded_hal::digital::v2::OutputPin;
use embedded_hal::spi::FullDuplex;
use ufmt::uWrite;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Cs(bool),
    Reset(bool),
    DelayUs(u32),
    Byte { out: u8, back: u8 },
    /// A driver was handed the bus
    Registered,
    /// A driver's init entry point was called
    InitStarted,
}

#[derive(Default)]
pub struct ChipState {
    /// (block select bits, offset) -> value
    pub regs: HashMap<(u8, u16), u8>,
    pub events: Vec<Event>,
    pub cs_low: bool,
    pub in_reset: bool,
    /// MISO floats high and nothing is decoded
    pub unresponsive: bool,
    /// MR.RST never self-clears
    pub stuck_in_reset: bool,
    /// What VERSIONR reads after any reset
    pub version: u8,
    header: Vec<u8>,
    offset: u16,
    pending: Option<u8>,
}

impl ChipState {
    fn power_on_defaults(&mut self) {
        self.regs.clear();
        self.regs.insert((0x00, 0x0039), self.version);
        for socket in 0..8u8 {
            let bsb = (socket << 2) | 0x01;
            self.regs.insert((bsb, 0x001E), 2);
            self.regs.insert((bsb, 0x001F), 2);
        }
    }

    fn exchange(&mut self, out: u8) -> u8 {
        if self.unresponsive || !self.cs_low || self.in_reset {
            return 0xFF;
        }
        if self.header.len() < 3 {
            self.header.push(out);
            return 0x00;
        }

        let base = u16::from_be_bytes([self.header[0], self.header[1]]);
        let control = self.header[2];
        let bsb = control >> 3;
        let write = control & 0x04 != 0;
        let addr = base.wrapping_add(self.offset);
        self.offset += 1;

        if write {
            if bsb == 0 && addr == 0x0000 && out & 0x80 != 0 {
                // Software reset: everything back to defaults, network
                // settings included
                self.power_on_defaults();
                if self.stuck_in_reset {
                    self.regs.insert((0, 0), 0x80);
                }
            } else {
                self.regs.insert((bsb, addr), out);
            }
            0x00
        } else {
            self.regs.get(&(bsb, addr)).copied().unwrap_or(0)
        }
    }

    /// Register value as the chip holds it
    pub fn reg(&self, bsb: u8, addr: u16) -> u8 {
        self.regs.get(&(bsb, addr)).copied().unwrap_or(0)
    }

    pub fn transfers(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, Event::Byte { .. }))
            .count()
    }
}

pub type Shared = Rc<RefCell<ChipState>>;

pub fn chip() -> Shared {
    let mut state = ChipState {
        version: 0x04,
        ..ChipState::default()
    };
    state.power_on_defaults();
    Rc::new(RefCell::new(state))
}

pub struct SimSpi(pub Shared);

impl FullDuplex<u8> for SimSpi {
    type Error = Infallible;

    fn read(&mut self) -> nb::Result<u8, Infallible> {
        self.0.borrow_mut().pending.take().ok_or(nb::Error::WouldBlock)
    }

    fn send(&mut self, out: u8) -> nb::Result<(), Infallible> {
        let mut state = self.0.borrow_mut();
        if state.pending.is_some() {
            return Err(nb::Error::WouldBlock);
        }
        let back = state.exchange(out);
        state.events.push(Event::Byte { out, back });
        state.pending = Some(back);
        Ok(())
    }
}

pub struct SimCs(pub Shared);

impl OutputPin for SimCs {
    type Error = Infallible;

    fn set_low(&mut self) -> Result<(), Infallible> {
        let mut state = self.0.borrow_mut();
        state.cs_low = true;
        state.header.clear();
        state.offset = 0;
        state.events.push(Event::Cs(false));
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        let mut state = self.0.borrow_mut();
        state.cs_low = false;
        state.events.push(Event::Cs(true));
        Ok(())
    }
}

pub struct SimReset(pub Shared);

impl OutputPin for SimReset {
    type Error = Infallible;

    fn set_low(&mut self) -> Result<(), Infallible> {
        let mut state = self.0.borrow_mut();
        state.in_reset = true;
        state.events.push(Event::Reset(false));
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        let mut state = self.0.borrow_mut();
        if state.in_reset {
            state.power_on_defaults();
        }
        state.in_reset = false;
        state.events.push(Event::Reset(true));
        Ok(())
    }
}

pub struct SimDelay(pub Shared);

impl DelayUs<u32> for SimDelay {
    fn delay_us(&mut self, us: u32) {
        self.0.borrow_mut().events.push(Event::DelayUs(us));
    }
}

/// Slave that shifts back whatever it received in the previous byte period
#[derive(Default)]
pub struct EchoSpi {
    last: u8,
    pending: Option<u8>,
    pub sent: Vec<u8>,
}

impl FullDuplex<u8> for EchoSpi {
    type Error = Infallible;

    fn read(&mut self) -> nb::Result<u8, Infallible> {
        self.pending.take().ok_or(nb::Error::WouldBlock)
    }

    fn send(&mut self, word: u8) -> nb::Result<(), Infallible> {
        if self.pending.is_some() {
            return Err(nb::Error::WouldBlock);
        }
        self.pending = Some(self.last);
        self.last = word;
        self.sent.push(word);
        Ok(())
    }
}

/// Answers each dummy read with the next byte of a script
pub struct ScriptedSpi {
    script: Vec<u8>,
    next: usize,
    pending: Option<u8>,
    pub sent: Vec<u8>,
}

impl ScriptedSpi {
    pub fn new(script: &[u8]) -> Self {
        Self {
            script: script.to_vec(),
            next: 0,
            pending: None,
            sent: Vec::new(),
        }
    }
}

impl FullDuplex<u8> for ScriptedSpi {
    type Error = Infallible;

    fn read(&mut self) -> nb::Result<u8, Infallible> {
        self.pending.take().ok_or(nb::Error::WouldBlock)
    }

    fn send(&mut self, word: u8) -> nb::Result<(), Infallible> {
        self.sent.push(word);
        let back = self.script.get(self.next).copied().unwrap_or(0xEE);
        self.next += 1;
        self.pending = Some(back);
        Ok(())
    }
}

/// Transmit register that never empties
pub struct StuckSpi;

impl FullDuplex<u8> for StuckSpi {
    type Error = Infallible;

    fn read(&mut self) -> nb::Result<u8, Infallible> {
        Err(nb::Error::WouldBlock)
    }

    fn send(&mut self, _: u8) -> nb::Result<(), Infallible> {
        Err(nb::Error::WouldBlock)
    }
}

/// Chip-select pin that only remembers its level
#[derive(Default)]
pub struct LevelPin {
    pub high: Option<bool>,
    pub toggles: usize,
}

impl OutputPin for LevelPin {
    type Error = Infallible;

    fn set_low(&mut self) -> Result<(), Infallible> {
        self.high = Some(false);
        self.toggles += 1;
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.high = Some(true);
        self.toggles += 1;
        Ok(())
    }
}

#[derive(Default)]
pub struct Console(pub String);

impl uWrite for Console {
    type Error = Infallible;

    fn write_str(&mut self, s: &str) -> Result<(), Infallible> {
        self.0.push_str(s);
        Ok(())
    }
}
