//! Chip descriptors and the chip database
//!
//! A chip family is a [`ParamSet`]: the list of optional parameters its
//! descriptors carry. Descriptors ([`ChipInfo`]) and databases ([`ChipDb`])
//! are generic over the family, so SPI NOR and other families share the text
//! format, the loader and the identification matcher.

pub mod codec;
mod database;
pub mod matcher;
mod param;
mod types;

pub use database::{ChipDb, DbLoad, INDEX_ID_LEN, NAME_ID_LEN};
pub use param::{ParamSet, SpiNorParam};
pub use types::{ChipInfo, FIELD_SEPARATOR, MANDATORY_FIELDS};

/// Descriptor of an SPI NOR chip
pub type SpiNorChip = ChipInfo<SpiNorParam>;

/// Database of SPI NOR chips
pub type SpiNorDb = ChipDb<SpiNorParam>;
