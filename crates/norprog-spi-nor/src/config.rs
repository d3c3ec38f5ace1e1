//! SPI NOR link configuration
//!
//! [`SpiNorConfig`] is the typed form of the opcode and geometry parameters of
//! a chip record. Programmer firmware receives the same information as a
//! packed 13-byte blob:
//!
//! | Offset | Field |
//! |---|---|
//! | 0 | page_offset |
//! | 1 | read_cmd |
//! | 2 | read_id_cmd |
//! | 3 | write_cmd |
//! | 4 | write_en_cmd (`0xFF` = none) |
//! | 5 | erase_cmd |
//! | 6 | status_cmd |
//! | 7 | busy_bit |
//! | 8 | busy_state |
//! | 9..13 | freq in kHz, little endian (`0` = no hint) |

use norprog_core::chip::{ParamSet, SpiNorChip, SpiNorParam};
use norprog_core::spi::{opcodes, MAX_ADDRESS};
use thiserror::Error;

/// Size of the packed configuration blob
pub const CONFIG_BLOB_LEN: usize = 13;

/// Largest page offset whose page 1 still fits the address phase
const MAX_PAGE_OFFSET: u8 = 23;

/// Errors building a configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A required chip parameter is not defined
    #[error("chip parameter {0} is not defined")]
    Missing(SpiNorParam),

    /// A chip parameter does not fit its field
    #[error("chip parameter {param} = {value:#x} is out of range")]
    OutOfRange {
        /// The offending parameter
        param: SpiNorParam,
        /// Its value
        value: u64,
    },

    /// The configuration blob is truncated
    #[error("configuration blob is {len} bytes, need {}", CONFIG_BLOB_LEN)]
    BlobTooShort {
        /// Length of the blob received
        len: usize,
    },
}

impl ConfigError {
    /// Column name of the parameter at fault, if any
    pub fn param_name(&self) -> &'static str {
        match self {
            Self::Missing(p) | Self::OutOfRange { param: p, .. } => p.name(),
            Self::BlobTooShort { .. } => "blob",
        }
    }
}

/// Level of the busy bit while an operation is running
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BusyPolarity {
    /// Busy while the bit reads 0
    ActiveLow,
    /// Busy while the bit reads 1 (the usual WIP flag)
    #[default]
    ActiveHigh,
}

impl BusyPolarity {
    /// Decode the `busy_state` record value
    pub fn from_raw(value: u64) -> Option<Self> {
        match value {
            0 => Some(Self::ActiveLow),
            1 => Some(Self::ActiveHigh),
            _ => None,
        }
    }

    /// The `busy_state` record value
    pub fn to_raw(self) -> u8 {
        match self {
            Self::ActiveLow => 0,
            Self::ActiveHigh => 1,
        }
    }

    /// Whether `status` says busy, given the busy flag's bit index
    ///
    /// A bit index past the register reads as clear.
    pub fn is_busy(self, status: u8, bit: u8) -> bool {
        let set = status
            .checked_shr(u32::from(bit))
            .is_some_and(|s| s & 1 != 0);
        match self {
            Self::ActiveHigh => set,
            Self::ActiveLow => !set,
        }
    }
}

/// Opcodes and geometry the driver needs to talk to one chip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpiNorConfig {
    /// Bits to shift a page index by to get its byte address
    pub page_offset: u8,
    /// Read data opcode
    pub read_cmd: u8,
    /// Read identification opcode
    pub read_id_cmd: u8,
    /// Page program opcode
    pub write_cmd: u8,
    /// Write enable opcode; `None` sends nothing before erase and program
    pub write_enable_cmd: Option<u8>,
    /// Block erase opcode
    pub erase_cmd: u8,
    /// Read status register opcode
    pub status_cmd: u8,
    /// Bit index of the busy flag
    pub busy_bit: u8,
    /// Level of the busy flag while busy
    pub busy_polarity: BusyPolarity,
    /// Bus clock hint in kHz
    pub freq_khz: Option<u32>,
}

impl SpiNorConfig {
    /// Configuration for reading the ID of a chip that is not known yet
    ///
    /// Everything except the ID opcode uses the common JEDEC defaults and a
    /// 256-byte page.
    pub fn identify_only(read_id_cmd: u8) -> Self {
        Self {
            page_offset: 8,
            read_cmd: opcodes::FAST_READ,
            read_id_cmd,
            write_cmd: opcodes::PP,
            write_enable_cmd: Some(opcodes::WREN),
            erase_cmd: opcodes::BE_D8,
            status_cmd: opcodes::RDSR,
            busy_bit: 0,
            busy_polarity: BusyPolarity::ActiveHigh,
            freq_khz: None,
        }
    }

    /// Build the configuration from a chip record
    ///
    /// Every opcode except write enable is required, as are the page offset
    /// and the busy flag description. A write enable opcode of `0xFF` means
    /// the chip has none.
    pub fn from_chip(chip: &SpiNorChip) -> Result<Self, ConfigError> {
        let write_enable_cmd = match chip.param(SpiNorParam::WriteEnableCmd) {
            Some(v) => {
                Some(fit_u8(SpiNorParam::WriteEnableCmd, v)?).filter(|op| *op != opcodes::NO_WREN)
            }
            None => None,
        };

        let busy_state = required(chip, SpiNorParam::BusyState)?;
        let busy_polarity = BusyPolarity::from_raw(busy_state).ok_or(ConfigError::OutOfRange {
            param: SpiNorParam::BusyState,
            value: busy_state,
        })?;

        let freq_khz = match chip.param(SpiNorParam::Frequency) {
            Some(v) => Some(u32::try_from(v).map_err(|_| ConfigError::OutOfRange {
                param: SpiNorParam::Frequency,
                value: v,
            })?),
            None => None,
        };

        let config = Self {
            page_offset: required_u8(chip, SpiNorParam::PageOffset)?,
            read_cmd: required_u8(chip, SpiNorParam::ReadCmd)?,
            read_id_cmd: required_u8(chip, SpiNorParam::ReadIdCmd)?,
            write_cmd: required_u8(chip, SpiNorParam::WriteCmd)?,
            write_enable_cmd,
            erase_cmd: required_u8(chip, SpiNorParam::EraseCmd)?,
            status_cmd: required_u8(chip, SpiNorParam::StatusCmd)?,
            busy_bit: required_u8(chip, SpiNorParam::BusyBit)?,
            busy_polarity,
            freq_khz,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check the fields that a `u8` does not already bound
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_offset > MAX_PAGE_OFFSET {
            return Err(ConfigError::OutOfRange {
                param: SpiNorParam::PageOffset,
                value: self.page_offset.into(),
            });
        }
        if self.write_enable_cmd == Some(opcodes::NO_WREN) {
            return Err(ConfigError::OutOfRange {
                param: SpiNorParam::WriteEnableCmd,
                value: opcodes::NO_WREN.into(),
            });
        }
        if self.busy_bit > 7 {
            return Err(ConfigError::OutOfRange {
                param: SpiNorParam::BusyBit,
                value: self.busy_bit.into(),
            });
        }
        Ok(())
    }

    /// Page size in bytes implied by the page offset
    pub fn page_size(&self) -> u32 {
        1 << self.page_offset
    }

    /// Number of pages reachable through the address phase
    pub fn addressable_pages(&self) -> u32 {
        (MAX_ADDRESS >> self.page_offset) + 1
    }

    /// Pack into the firmware configuration blob
    pub fn to_bytes(&self) -> [u8; CONFIG_BLOB_LEN] {
        let freq = self.freq_khz.unwrap_or(0).to_le_bytes();
        [
            self.page_offset,
            self.read_cmd,
            self.read_id_cmd,
            self.write_cmd,
            self.write_enable_cmd.unwrap_or(opcodes::NO_WREN),
            self.erase_cmd,
            self.status_cmd,
            self.busy_bit,
            self.busy_polarity.to_raw(),
            freq[0],
            freq[1],
            freq[2],
            freq[3],
        ]
    }

    /// Unpack a firmware configuration blob
    ///
    /// Extra trailing bytes are ignored.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ConfigError> {
        if bytes.len() < CONFIG_BLOB_LEN {
            return Err(ConfigError::BlobTooShort { len: bytes.len() });
        }

        let busy_polarity =
            BusyPolarity::from_raw(bytes[8].into()).ok_or(ConfigError::OutOfRange {
                param: SpiNorParam::BusyState,
                value: bytes[8].into(),
            })?;
        let freq = u32::from_le_bytes([bytes[9], bytes[10], bytes[11], bytes[12]]);

        let config = Self {
            page_offset: bytes[0],
            read_cmd: bytes[1],
            read_id_cmd: bytes[2],
            write_cmd: bytes[3],
            write_enable_cmd: Some(bytes[4]).filter(|op| *op != opcodes::NO_WREN),
            erase_cmd: bytes[5],
            status_cmd: bytes[6],
            busy_bit: bytes[7],
            busy_polarity,
            freq_khz: Some(freq).filter(|f| *f != 0),
        };
        config.validate()?;
        Ok(config)
    }
}

fn required(chip: &SpiNorChip, param: SpiNorParam) -> Result<u64, ConfigError> {
    chip.param(param).ok_or(ConfigError::Missing(param))
}

fn required_u8(chip: &SpiNorChip, param: SpiNorParam) -> Result<u8, ConfigError> {
    fit_u8(param, required(chip, param)?)
}

fn fit_u8(param: SpiNorParam, value: u64) -> Result<u8, ConfigError> {
    u8::try_from(value).map_err(|_| ConfigError::OutOfRange { param, value })
}
