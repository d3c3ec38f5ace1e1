//! SPI NOR protocol constants

pub mod opcodes;

/// Width of the address phase in bytes
pub const ADDRESS_BYTES: usize = 3;

/// Highest byte address reachable with a 3-byte address phase
pub const MAX_ADDRESS: u32 = 0x00FF_FFFF;

/// Byte clocked out after the address of a read command
pub const READ_DUMMY_BYTE: u8 = 0xA5;

/// Encode a 24-bit address, most significant byte first
pub fn address_bytes(addr: u32) -> [u8; ADDRESS_BYTES] {
    [(addr >> 16) as u8, (addr >> 8) as u8, addr as u8]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_bytes() {
        assert_eq!(address_bytes(0x123456), [0x12, 0x34, 0x56]);
        assert_eq!(address_bytes(MAX_ADDRESS), [0xFF, 0xFF, 0xFF]);
    }
}
