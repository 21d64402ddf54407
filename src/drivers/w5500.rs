//! WIZnet W5500 register access and chip initialization
//!
//! Every access is one SPI frame: a 16-bit offset, a control byte selecting the
//! register block and direction, then the data phase. Frames are sent in
//! variable length data mode, so chip select alone delimits them.

use crate::bringup::ChipDriver;
use crate::config::{Direction, MemoryPartitionTable, MEMORY_PER_DIRECTION_KB};
pub use crate::config::Socket;
use crate::transport::ChipBus;

// Common register block
pub const MR: u16 = 0x0000;
pub const GAR: u16 = 0x0001;
pub const SUBR: u16 = 0x0005;
pub const SHAR: u16 = 0x0009;
pub const SIPR: u16 = 0x000F;
pub const VERSIONR: u16 = 0x0039;

// Socket register block
pub const SN_RXBUF_SIZE: u16 = 0x001E;
pub const SN_TXBUF_SIZE: u16 = 0x001F;

const MR_RST: u8 = 0x80;
const RWB_WRITE: u8 = 0x04;
const OM_VDM: u8 = 0x00;

/// Value VERSIONR always reads on a W5500
pub const CHIP_VERSION: u8 = 0x04;

/// How many times MR is read back before a software reset counts as stuck
const RESET_POLL_ATTEMPTS: u32 = 100;

/// Register block addressed by the control byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Block {
    Common,
    Socket(Socket),
    SocketTx(Socket),
    SocketRx(Socket),
}

impl Block {
    /// Block select bits (BSB[4:0])
    pub fn bsb(self) -> u8 {
        match self {
            Block::Common => 0x00,
            Block::Socket(n) => (n.index() << 2) | 0x01,
            Block::SocketTx(n) => (n.index() << 2) | 0x02,
            Block::SocketRx(n) => (n.index() << 2) | 0x03,
        }
    }
}

/// Address and control phase of a frame
pub fn frame_header(addr: u16, block: Block, write: bool) -> [u8; 3] {
    let rwb = if write { RWB_WRITE } else { 0 };
    let [hi, lo] = addr.to_be_bytes();
    [hi, lo, (block.bsb() << 3) | rwb | OM_VDM]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChipInitError<E> {
    Transport(E),
    /// A socket buffer size that is not 0, 1, 2, 4, 8 or 16 KiB
    InvalidBufferSize {
        direction: Direction,
        socket: usize,
        size: u8,
    },
    /// One direction asks for more than the chip's 16 KiB
    MemoryOverflow { direction: Direction, total_kb: u16 },
    /// `init_chip` ran before the driver was registered with a bus
    NotRegistered,
    ResetTimeout,
    UnexpectedVersion(u8),
}

/// Network settings that survive a software reset
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NetInfo {
    pub mac: [u8; 6],
    pub gateway: [u8; 4],
    pub subnet: [u8; 4],
    pub ip: [u8; 4],
}

/// Check a partition table against what the chip can hold
pub fn validate_partition<E>(table: &MemoryPartitionTable) -> Result<(), ChipInitError<E>> {
    for direction in [Direction::Tx, Direction::Rx] {
        for (socket, &size) in table.row(direction).iter().enumerate() {
            if !matches!(size, 0 | 1 | 2 | 4 | 8 | 16) {
                return Err(ChipInitError::InvalidBufferSize {
                    direction,
                    socket,
                    size,
                });
            }
        }
        let total_kb = table.total_kb(direction);
        if total_kb > MEMORY_PER_DIRECTION_KB {
            return Err(ChipInitError::MemoryOverflow { direction, total_kb });
        }
    }
    Ok(())
}

/// Driver for the W5500 common and socket registers
#[derive(Debug, Default)]
pub struct W5500 {
    registered: bool,
    initialized: bool,
}

impl W5500 {
    pub const fn new() -> Self {
        Self {
            registered: false,
            initialized: false,
        }
    }

    pub fn is_registered(&self) -> bool {
        self.registered
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn read_reg<B: ChipBus>(&self, bus: &mut B, block: Block, addr: u16) -> Result<u8, B::Error> {
        let header = frame_header(addr, block, false);
        bus.transaction(|bus| {
            bus.write_burst(&header)?;
            bus.read_byte()
        })
    }

    pub fn write_reg<B: ChipBus>(
        &self,
        bus: &mut B,
        block: Block,
        addr: u16,
        value: u8,
    ) -> Result<(), B::Error> {
        let header = frame_header(addr, block, true);
        bus.transaction(|bus| {
            bus.write_burst(&header)?;
            bus.write_byte(value)
        })
    }

    pub fn read_buf<B: ChipBus>(
        &self,
        bus: &mut B,
        block: Block,
        addr: u16,
        buf: &mut [u8],
    ) -> Result<(), B::Error> {
        let header = frame_header(addr, block, false);
        bus.transaction(|bus| {
            bus.write_burst(&header)?;
            bus.read_burst(buf)
        })
    }

    pub fn write_buf<B: ChipBus>(
        &self,
        bus: &mut B,
        block: Block,
        addr: u16,
        data: &[u8],
    ) -> Result<(), B::Error> {
        let header = frame_header(addr, block, true);
        bus.transaction(|bus| {
            bus.write_burst(&header)?;
            bus.write_burst(data)
        })
    }

    pub fn version<B: ChipBus>(&self, bus: &mut B) -> Result<u8, B::Error> {
        self.read_reg(bus, Block::Common, VERSIONR)
    }

    pub fn net_info<B: ChipBus>(&self, bus: &mut B) -> Result<NetInfo, B::Error> {
        let mut info = NetInfo::default();
        self.read_buf(bus, Block::Common, SHAR, &mut info.mac)?;
        self.read_buf(bus, Block::Common, GAR, &mut info.gateway)?;
        self.read_buf(bus, Block::Common, SUBR, &mut info.subnet)?;
        self.read_buf(bus, Block::Common, SIPR, &mut info.ip)?;
        Ok(info)
    }

    pub fn set_net_info<B: ChipBus>(&self, bus: &mut B, info: &NetInfo) -> Result<(), B::Error> {
        self.write_buf(bus, Block::Common, SHAR, &info.mac)?;
        self.write_buf(bus, Block::Common, GAR, &info.gateway)?;
        self.write_buf(bus, Block::Common, SUBR, &info.subnet)?;
        self.write_buf(bus, Block::Common, SIPR, &info.ip)
    }

    /// Software reset through MR.RST, keeping the network settings
    pub fn soft_reset<B: ChipBus>(&self, bus: &mut B) -> Result<(), ChipInitError<B::Error>> {
        let saved = self.net_info(bus).map_err(ChipInitError::Transport)?;

        self.write_reg(bus, Block::Common, MR, MR_RST)
            .map_err(ChipInitError::Transport)?;
        let mut cleared = false;
        for _ in 0..RESET_POLL_ATTEMPTS {
            let mode = self
                .read_reg(bus, Block::Common, MR)
                .map_err(ChipInitError::Transport)?;
            if mode & MR_RST == 0 {
                cleared = true;
                break;
            }
        }
        if !cleared {
            return Err(ChipInitError::ResetTimeout);
        }

        self.set_net_info(bus, &saved).map_err(ChipInitError::Transport)
    }

    pub fn set_buffer_sizes<B: ChipBus>(
        &self,
        bus: &mut B,
        table: &MemoryPartitionTable,
    ) -> Result<(), B::Error> {
        for socket in Socket::all() {
            let block = Block::Socket(socket);
            self.write_reg(bus, block, SN_TXBUF_SIZE, table.size(Direction::Tx, socket))?;
            self.write_reg(bus, block, SN_RXBUF_SIZE, table.size(Direction::Rx, socket))?;
        }
        Ok(())
    }
}

impl<B: ChipBus> ChipDriver<B> for W5500 {
    type Error = ChipInitError<B::Error>;

    fn register(&mut self, _bus: &mut B) {
        self.registered = true;
    }

    fn init_chip(&mut self, bus: &mut B, memory: &MemoryPartitionTable) -> Result<(), Self::Error> {
        self.initialized = false;
        if !self.registered {
            return Err(ChipInitError::NotRegistered);
        }
        validate_partition(memory)?;

        self.soft_reset(bus)?;

        let version = self.version(bus).map_err(ChipInitError::Transport)?;
        if version != CHIP_VERSION {
            return Err(ChipInitError::UnexpectedVersion(version));
        }

        self.set_buffer_sizes(bus, memory)
            .map_err(ChipInitError::Transport)?;
        self.initialized = true;
        Ok(())
    }
}
