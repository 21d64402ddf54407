//! On-target checks run against a live W5500 after bring-up

use ufmt::{uWrite, uwrite};

use crate::config::{Direction, MemoryPartitionTable, Socket};
use crate::drivers::w5500::{Block, CHIP_VERSION, SN_RXBUF_SIZE, SN_TXBUF_SIZE};
use crate::drivers::W5500;
use crate::transport::ChipBus;

/// Socket 7 source port, free to scribble on before any socket is opened
const SCRATCH_REG: u16 = 0x0004;

pub struct TestRunner<'a, W> {
    console: &'a mut W,
    total_tests: u32,
    passed_tests: u32,
    current_suite: &'static str,
}

pub trait TestCase<B: ChipBus> {
    fn run(&self, chip: &W5500, bus: &mut B) -> TestResult;
    fn name(&self) -> &'static str;
}

#[derive(Debug, PartialEq)]
pub enum TestResult {
    Pass,
    Fail(TestError),
}

#[derive(Debug, PartialEq)]
pub enum TestError {
    AssertionFailed(&'static str),
    BusFault,
}

impl TestError {
    fn describe(&self) -> &'static str {
        match self {
            TestError::AssertionFailed(what) => *what,
            TestError::BusFault => "bus fault",
        }
    }
}

macro_rules! check {
    ($cond:expr) => {
        if !$cond {
            return TestResult::Fail(TestError::AssertionFailed(stringify!($cond)));
        }
    };
}

macro_rules! on_bus {
    ($op:expr) => {
        match $op {
            Ok(value) => value,
            Err(_) => return TestResult::Fail(TestError::BusFault),
        }
    };
}

impl<'a, W: uWrite> TestRunner<'a, W> {
    pub fn new(console: &'a mut W) -> Self {
        Self {
            console,
            total_tests: 0,
            passed_tests: 0,
            current_suite: "",
        }
    }

    pub fn run_suite<B: ChipBus>(
        &mut self,
        name: &'static str,
        tests: &[&dyn TestCase<B>],
        chip: &W5500,
        bus: &mut B,
    ) {
        self.current_suite = name;
        uwrite!(self.console, "\r\n=== Test Suite: {} ===\r\n", name).ok();

        for test in tests {
            self.total_tests += 1;
            uwrite!(self.console, "Running {}: ", test.name()).ok();

            match test.run(chip, bus) {
                TestResult::Pass => {
                    self.passed_tests += 1;
                    self.console.write_str("PASS\r\n").ok();
                }
                TestResult::Fail(err) => {
                    uwrite!(self.console, "FAIL - {}\r\n", err.describe()).ok();
                }
            }
        }

        self.print_summary();
    }

    pub fn passed(&self) -> u32 {
        self.passed_tests
    }

    pub fn total(&self) -> u32 {
        self.total_tests
    }

    fn print_summary(&mut self) {
        let percent = if self.total_tests == 0 {
            0
        } else {
            (self.passed_tests * 100) / self.total_tests
        };
        uwrite!(
            self.console,
            "\r\nTest Summary for {}:\r\nPassed: {}/{} ({}%)\r\n",
            self.current_suite,
            self.passed_tests,
            self.total_tests,
            percent
        )
        .ok();
    }
}

/// VERSIONR reads back the W5500 signature
pub struct VersionTest;

impl<B: ChipBus> TestCase<B> for VersionTest {
    fn name(&self) -> &'static str {
        "Chip Version"
    }

    fn run(&self, chip: &W5500, bus: &mut B) -> TestResult {
        let version = on_bus!(chip.version(bus));
        check!(version == CHIP_VERSION);
        TestResult::Pass
    }
}

/// Burst write, burst read back, then restore
pub struct RegisterEchoTest;

impl<B: ChipBus> TestCase<B> for RegisterEchoTest {
    fn name(&self) -> &'static str {
        "Register Echo"
    }

    fn run(&self, chip: &W5500, bus: &mut B) -> TestResult {
        let block = Block::Socket(Socket::LAST);
        let mut saved = [0u8; 2];
        on_bus!(chip.read_buf(bus, block, SCRATCH_REG, &mut saved));

        for pattern in [[0x55, 0xAA], [0xA5, 0x5A]] {
            let mut readback = [0u8; 2];
            on_bus!(chip.write_buf(bus, block, SCRATCH_REG, &pattern));
            on_bus!(chip.read_buf(bus, block, SCRATCH_REG, &mut readback));
            check!(readback == pattern);
        }

        on_bus!(chip.write_buf(bus, block, SCRATCH_REG, &saved));
        TestResult::Pass
    }
}

/// Every socket got the buffer sizes from the partition table
pub struct BufferSizeTest(pub MemoryPartitionTable);

impl<B: ChipBus> TestCase<B> for BufferSizeTest {
    fn name(&self) -> &'static str {
        "Socket Buffer Sizes"
    }

    fn run(&self, chip: &W5500, bus: &mut B) -> TestResult {
        for socket in Socket::all() {
            let block = Block::Socket(socket);
            let tx = on_bus!(chip.read_reg(bus, block, SN_TXBUF_SIZE));
            let rx = on_bus!(chip.read_reg(bus, block, SN_RXBUF_SIZE));
            check!(tx == self.0.size(Direction::Tx, socket));
            check!(rx == self.0.size(Direction::Rx, socket));
        }
        TestResult::Pass
    }
}
