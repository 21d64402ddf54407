//! SPI transport and bring-up for a WIZnet W5500 hanging off an ATmega128
//!
//! The chip driver only ever talks to a [`transport::ChipBus`]. Everything
//! below it (the byte engine, chip-select framing, reset pulse) is here, and
//! so is the ATmega128 hardware layer when building for AVR.
#![cfg_attr(not(test), no_std)]

pub mod bringup;
pub mod config;
pub mod drivers;
pub mod hal;
pub mod testing;
pub mod transport;

pub use bringup::{BringUp, BringUpError, ChipDriver, Halt, SpinHalt, Wizchip};
pub use config::{BringUpConfig, MemoryPartitionTable};
pub use transport::{ByteEngine, ChipBus, PollLimit, Transport};
