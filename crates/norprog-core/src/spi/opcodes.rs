//! Standard JEDEC 25-series opcodes
//!
//! Chip records carry their own opcodes; these are used when probing a chip
//! that is not known yet and by the emulator's default profile.

// ============================================================================
// Write control
// ============================================================================

/// Write Enable - required before any write/erase operation
pub const WREN: u8 = 0x06;
/// Write Disable - clears WEL bit in status register
pub const WRDI: u8 = 0x04;

/// Value in a configuration blob meaning "no write enable opcode"
pub const NO_WREN: u8 = 0xFF;

// ============================================================================
// Status register
// ============================================================================

/// Read Status Register 1
pub const RDSR: u8 = 0x05;

/// Status Register 1: Write In Progress (busy)
pub const SR1_WIP: u8 = 1 << 0;
/// Status Register 1: Write Enable Latch
pub const SR1_WEL: u8 = 1 << 1;

// ============================================================================
// Identification
// ============================================================================

/// Read JEDEC ID (manufacturer + device ID)
pub const RDID: u8 = 0x9F;

// ============================================================================
// Read, program, erase - 3-byte address
// ============================================================================

/// Read Data (up to ~33 MHz)
pub const READ: u8 = 0x03;
/// Fast Read (with dummy byte, up to max frequency)
pub const FAST_READ: u8 = 0x0B;
/// Page Program
pub const PP: u8 = 0x02;
/// Sector Erase 4KB
pub const SE_20: u8 = 0x20;
/// Block Erase 32KB
pub const BE_52: u8 = 0x52;
/// Block Erase 64KB
pub const BE_D8: u8 = 0xD8;
