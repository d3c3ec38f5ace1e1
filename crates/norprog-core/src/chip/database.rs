//! Chip database
//!
//! An ordered list of chip descriptors of one family. Order matters: lookups
//! by identification bytes return the first match, so more specific records
//! must come before the family-wide ones they overlap with.

use alloc::string::String;
use alloc::vec::Vec;

use super::matcher;
use super::param::ParamSet;
use super::types::ChipInfo;
use crate::error::{LoadError, RecordError};
use crate::hal::ChipId;

/// Number of ID bytes the index lookup compares
pub const INDEX_ID_LEN: usize = 5;

/// Number of ID bytes the name lookup compares
pub const NAME_ID_LEN: usize = 6;

/// Ordered collection of chip descriptors
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChipDb<P: ParamSet> {
    chips: Vec<ChipInfo<P>>,
}

/// Result of loading a database from text
///
/// Malformed records are skipped; each one leaves a [`LoadError`] behind.
#[derive(Debug, Clone)]
pub struct DbLoad<P: ParamSet> {
    /// The records that loaded
    pub db: ChipDb<P>,
    /// The records that were skipped, in line order
    pub errors: Vec<LoadError>,
}

impl<P: ParamSet> DbLoad<P> {
    /// Whether every record loaded
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    /// Fail on the first skipped record
    pub fn into_strict(self) -> Result<ChipDb<P>, LoadError> {
        match self.errors.into_iter().next() {
            Some(e) => Err(e),
            None => Ok(self.db),
        }
    }
}

impl<P: ParamSet> Default for ChipDb<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: ParamSet> ChipDb<P> {
    /// Create an empty database
    pub fn new() -> Self {
        Self { chips: Vec::new() }
    }

    /// Load a database from record lines
    ///
    /// Blank lines and lines starting with `#` are ignored. Every other line
    /// must be a complete record; the ones that are not are skipped and
    /// reported with their 1-based line number.
    pub fn load(text: &str) -> DbLoad<P> {
        let mut db = Self::new();
        let mut errors = Vec::new();

        for (i, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let result = ChipInfo::from_line(line).and_then(|chip| db.push(chip).map(|_| ()));
            if let Err(error) = result {
                log::warn!("Skipping {} record on line {}: {}", P::FAMILY, i + 1, error);
                errors.push(LoadError { line: i + 1, error });
            }
        }

        log::debug!(
            "Loaded {} {} chips ({} skipped)",
            db.len(),
            P::FAMILY,
            errors.len()
        );
        DbLoad { db, errors }
    }

    /// Render the database as record lines, preceded by a column header
    pub fn to_text(&self) -> String {
        let mut text = ChipInfo::<P>::header();
        text.push('\n');
        for chip in &self.chips {
            text.push_str(&chip.to_line());
            text.push('\n');
        }
        text
    }

    /// Append a descriptor, returning its index
    pub fn push(&mut self, chip: ChipInfo<P>) -> Result<usize, RecordError> {
        if self.position_by_name(chip.name()).is_some() {
            return Err(RecordError::DuplicateName(chip.name().into()));
        }
        self.chips.push(chip);
        Ok(self.chips.len() - 1)
    }

    /// Remove and return the descriptor at `index`
    pub fn remove(&mut self, index: usize) -> Option<ChipInfo<P>> {
        if index < self.chips.len() {
            Some(self.chips.remove(index))
        } else {
            None
        }
    }

    /// Descriptor at `index`
    pub fn get(&self, index: usize) -> Option<&ChipInfo<P>> {
        self.chips.get(index)
    }

    /// Mutable descriptor at `index`
    pub fn get_mut(&mut self, index: usize) -> Option<&mut ChipInfo<P>> {
        self.chips.get_mut(index)
    }

    /// Optional parameter of the descriptor at `index`
    ///
    /// `None` if there is no such descriptor; `Some(None)` if the parameter is
    /// not defined.
    pub fn param(&self, index: usize, role: P) -> Option<Option<u64>> {
        self.get(index).map(|c| c.param(role))
    }

    /// Set an optional parameter of the descriptor at `index`
    ///
    /// Returns `false` if there is no such descriptor.
    pub fn set_param(&mut self, index: usize, role: P, value: Option<u64>) -> bool {
        match self.get_mut(index) {
            Some(chip) => {
                chip.set_param(role, value);
                true
            }
            None => false,
        }
    }

    /// Number of descriptors
    pub fn len(&self) -> usize {
        self.chips.len()
    }

    /// Whether the database has no descriptors
    pub fn is_empty(&self) -> bool {
        self.chips.is_empty()
    }

    /// Iterate over descriptors in database order
    pub fn iter(&self) -> core::slice::Iter<'_, ChipInfo<P>> {
        self.chips.iter()
    }

    /// Find a descriptor by exact name
    pub fn find_by_name(&self, name: &str) -> Option<&ChipInfo<P>> {
        self.chips.iter().find(|c| c.name() == name)
    }

    /// Index of the descriptor with this exact name
    pub fn position_by_name(&self, name: &str) -> Option<usize> {
        self.chips.iter().position(|c| c.name() == name)
    }

    /// Index of the first descriptor matching the leading bytes of `probe`
    pub fn find_index_by_prefix(&self, probe: &[u8]) -> Option<usize> {
        self.chips.iter().position(|c| matcher::matches(c, probe))
    }

    /// Index of the first descriptor matching ID bytes 1 to 5
    pub fn find_index_by_id(&self, id: &ChipId) -> Option<usize> {
        self.find_index_by_prefix(&id.as_bytes()[..INDEX_ID_LEN])
    }

    /// Name of the first descriptor matching ID bytes 1 to 6
    pub fn find_name_by_id(&self, id: &ChipId) -> Option<&str> {
        self.find_by_id(id).map(|(_, c)| c.name())
    }

    /// First descriptor matching ID bytes 1 to 6, with its index
    pub fn find_by_id(&self, id: &ChipId) -> Option<(usize, &ChipInfo<P>)> {
        let probe = &id.as_bytes()[..NAME_ID_LEN];
        self.chips
            .iter()
            .enumerate()
            .find(|(_, c)| matcher::matches(*c, probe))
    }
}

impl<'a, P: ParamSet> IntoIterator for &'a ChipDb<P> {
    type Item = &'a ChipInfo<P>;
    type IntoIter = core::slice::Iter<'a, ChipInfo<P>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
