//! Configuration constants for the ATmega128 / W5500 firmware

use crate::transport::PollLimit;

/// CPU frequency in Hz
pub const CPU_FREQ_HZ: u32 = 16_000_000;

/// Console UART baud rate
pub const UART_BAUD: u32 = 9600;

/// How long RSTn is held low. The W5500 datasheet asks for at least 500us.
pub const RESET_PULSE_US: u32 = 500;

/// Wait after releasing RSTn before the first SPI access (PLL lock).
pub const RESET_SETTLE_US: u32 = 1_000;

/// Buffer size in KiB given to every socket in both directions by default
pub const DEFAULT_SOCKET_BUFFER_KB: u8 = 2;

/// Number of hardware sockets on the W5500
pub const SOCKET_COUNT: usize = 8;

/// Total buffer memory per direction, in KiB
pub const MEMORY_PER_DIRECTION_KB: u16 = 16;

/// Index of one of the W5500's hardware sockets, always below [`SOCKET_COUNT`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Socket(u8);

impl Socket {
    pub const FIRST: Socket = Socket(0);
    pub const LAST: Socket = Socket(SOCKET_COUNT as u8 - 1);

    /// `None` when `n` names a socket the chip does not have
    pub const fn new(n: u8) -> Option<Self> {
        if (n as usize) < SOCKET_COUNT {
            Some(Socket(n))
        } else {
            None
        }
    }

    pub const fn index(self) -> u8 {
        self.0
    }

    /// Sockets 0 through 7 in order
    pub fn all() -> impl Iterator<Item = Socket> {
        (0..SOCKET_COUNT as u8).map(Socket)
    }
}

/// Per-socket TX/RX buffer sizes handed to the chip at initialization.
///
/// Row 0 is transmit, row 1 is receive, one column per socket, values in KiB.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryPartitionTable {
    sizes: [[u8; SOCKET_COUNT]; 2],
}

/// Direction a row of the partition table applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Tx = 0,
    Rx = 1,
}

impl MemoryPartitionTable {
    pub const fn new(sizes: [[u8; SOCKET_COUNT]; 2]) -> Self {
        Self { sizes }
    }

    /// Every socket gets `kb` KiB in both directions
    pub const fn uniform(kb: u8) -> Self {
        Self::new([[kb; SOCKET_COUNT]; 2])
    }

    pub fn size(&self, direction: Direction, socket: Socket) -> u8 {
        self.sizes[direction as usize][usize::from(socket.index())]
    }

    pub fn row(&self, direction: Direction) -> &[u8; SOCKET_COUNT] {
        &self.sizes[direction as usize]
    }

    pub fn total_kb(&self, direction: Direction) -> u16 {
        self.row(direction).iter().map(|&kb| u16::from(kb)).sum()
    }

    pub fn as_rows(&self) -> &[[u8; SOCKET_COUNT]; 2] {
        &self.sizes
    }
}

impl Default for MemoryPartitionTable {
    fn default() -> Self {
        Self::uniform(DEFAULT_SOCKET_BUFFER_KB)
    }
}

/// Everything the bring-up sequence needs besides the hardware itself
#[derive(Debug, Clone, Copy)]
pub struct BringUpConfig {
    pub reset_pulse_us: u32,
    pub reset_settle_us: u32,
    pub poll_limit: PollLimit,
    pub memory: MemoryPartitionTable,
}

impl Default for BringUpConfig {
    fn default() -> Self {
        Self {
            reset_pulse_us: RESET_PULSE_US,
            reset_settle_us: RESET_SETTLE_US,
            poll_limit: PollLimit::Unbounded,
            memory: MemoryPartitionTable::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_is_all_two_kib() {
        let table = MemoryPartitionTable::default();
        assert_eq!(table.as_rows(), &[[2; 8]; 2]);
        assert_eq!(table.total_kb(Direction::Tx), 16);
        assert_eq!(table.total_kb(Direction::Rx), 16);
    }

    #[test]
    fn rows_are_independent() {
        let table = MemoryPartitionTable::new([[16, 0, 0, 0, 0, 0, 0, 0], [1; 8]]);
        assert_eq!(table.size(Direction::Tx, Socket::FIRST), 16);
        assert_eq!(table.size(Direction::Rx, Socket::FIRST), 1);
        assert_eq!(table.size(Direction::Tx, Socket::LAST), 0);
        assert_eq!(table.total_kb(Direction::Rx), 8);
    }

    #[test]
    fn socket_index_stops_at_the_last_hardware_socket() {
        assert_eq!(Socket::new(7), Some(Socket::LAST));
        assert_eq!(Socket::new(8), None);
        assert_eq!(Socket::new(u8::MAX), None);
        let indices: Vec<u8> = Socket::all().map(Socket::index).collect();
        assert_eq!(indices, [0, 1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn default_bring_up_never_times_out() {
        let config = BringUpConfig::default();
        assert_eq!(config.poll_limit, PollLimit::Unbounded);
        assert_eq!(config.reset_pulse_us, RESET_PULSE_US);
    }
}
