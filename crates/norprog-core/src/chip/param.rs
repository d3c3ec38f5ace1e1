//! Parameter roles of a chip family
//!
//! Each chip family declares the optional parameters its descriptors carry as
//! an enum implementing [`ParamSet`]. The enum fixes both the column order of
//! the text records and which roles hold identification bytes.

use core::fmt;

/// The set of optional parameter roles of one chip family
pub trait ParamSet: Copy + Eq + fmt::Debug + 'static {
    /// Human readable family name
    const FAMILY: &'static str;

    /// Every role, in record column order
    const ALL: &'static [Self];

    /// Roles holding identification bytes, in comparison order
    ///
    /// The first [`MANDATORY_IDS`](Self::MANDATORY_IDS) entries must always
    /// match; the rest are compared only while defined.
    const ID_SLOTS: &'static [Self];

    /// Number of leading identification bytes that must be defined and equal
    const MANDATORY_IDS: usize = 2;

    /// Column index of this role among the optional parameters
    fn index(self) -> usize;

    /// Column name used in record headers and diagnostics
    fn name(self) -> &'static str;

    /// Role stored at the given column index
    fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Look up a role by its column name
    fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|p| p.name() == name)
    }

    /// Number of optional parameters
    fn count() -> usize {
        Self::ALL.len()
    }
}

/// Optional parameters of an SPI NOR flash chip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpiNorParam {
    /// Identification byte 1 (manufacturer)
    Id1,
    /// Identification byte 2
    Id2,
    /// Identification byte 3
    Id3,
    /// Identification byte 4
    Id4,
    /// Identification byte 5
    Id5,
    /// Identification byte 6
    Id6,
    /// Bits to shift a page index by to get its byte address
    PageOffset,
    /// Read data opcode
    ReadCmd,
    /// Read identification opcode
    ReadIdCmd,
    /// Page program opcode
    WriteCmd,
    /// Write enable opcode
    WriteEnableCmd,
    /// Block erase opcode
    EraseCmd,
    /// Read status register opcode
    StatusCmd,
    /// Bit index of the busy flag in the status register
    BusyBit,
    /// Value of the busy flag while the chip is busy (0 or 1)
    BusyState,
    /// SPI clock frequency hint in kHz
    Frequency,
}

impl ParamSet for SpiNorParam {
    const FAMILY: &'static str = "SPI NOR";

    const ALL: &'static [Self] = &[
        Self::Id1,
        Self::Id2,
        Self::Id3,
        Self::Id4,
        Self::Id5,
        Self::Id6,
        Self::PageOffset,
        Self::ReadCmd,
        Self::ReadIdCmd,
        Self::WriteCmd,
        Self::WriteEnableCmd,
        Self::EraseCmd,
        Self::StatusCmd,
        Self::BusyBit,
        Self::BusyState,
        Self::Frequency,
    ];

    const ID_SLOTS: &'static [Self] = &[
        Self::Id1,
        Self::Id2,
        Self::Id3,
        Self::Id4,
        Self::Id5,
        Self::Id6,
    ];

    fn index(self) -> usize {
        self as usize
    }

    fn name(self) -> &'static str {
        match self {
            Self::Id1 => "id1",
            Self::Id2 => "id2",
            Self::Id3 => "id3",
            Self::Id4 => "id4",
            Self::Id5 => "id5",
            Self::Id6 => "id6",
            Self::PageOffset => "page_offset",
            Self::ReadCmd => "read_cmd",
            Self::ReadIdCmd => "read_id_cmd",
            Self::WriteCmd => "write_cmd",
            Self::WriteEnableCmd => "write_en_cmd",
            Self::EraseCmd => "erase_cmd",
            Self::StatusCmd => "status_cmd",
            Self::BusyBit => "busy_bit",
            Self::BusyState => "busy_state",
            Self::Frequency => "freq",
        }
    }
}

impl fmt::Display for SpiNorParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_matches_column_order() {
        for (i, p) in SpiNorParam::ALL.iter().enumerate() {
            assert_eq!(p.index(), i);
            assert_eq!(SpiNorParam::from_index(i), Some(*p));
            assert_eq!(SpiNorParam::from_name(p.name()), Some(*p));
        }
        assert_eq!(SpiNorParam::count(), 16);
        assert_eq!(SpiNorParam::from_index(16), None);
        assert_eq!(SpiNorParam::from_name("opcode"), None);
    }

    #[test]
    fn test_id_slots_lead() {
        assert_eq!(SpiNorParam::ID_SLOTS.len(), 6);
        assert_eq!(SpiNorParam::ID_SLOTS[0], SpiNorParam::Id1);
        assert_eq!(SpiNorParam::ID_SLOTS[5], SpiNorParam::Id6);
    }
}
