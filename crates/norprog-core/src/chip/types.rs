//! Chip descriptor type

use alloc::string::{String, ToString};
use alloc::vec;
use alloc::vec::Vec;
use core::marker::PhantomData;

use super::codec;
use super::param::ParamSet;
use crate::error::{RecordError, SlotOutOfRange};

/// Separator between record fields
pub const FIELD_SEPARATOR: char = ',';

/// Column names of the mandatory fields, in record order
pub const MANDATORY_FIELDS: [&str; 4] = ["name", "page_size", "block_size", "total_size"];

/// Description of one flash chip: geometry plus the family's optional parameters
///
/// Geometry is always present. Each optional parameter is either defined or
/// not defined (`None`); the family `P` decides which parameters exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChipInfo<P: ParamSet> {
    name: String,
    page_size: u64,
    block_size: u64,
    total_size: u64,
    params: Vec<Option<u64>>,
    family: PhantomData<P>,
}

impl<P: ParamSet> ChipInfo<P> {
    /// Create a descriptor with every optional parameter undefined
    pub fn new(
        name: &str,
        page_size: u64,
        block_size: u64,
        total_size: u64,
    ) -> Result<Self, RecordError> {
        Ok(Self {
            name: check_name(name)?,
            page_size,
            block_size,
            total_size,
            params: vec![None; P::count()],
            family: PhantomData,
        })
    }

    /// Number of fields in a record of this family
    pub fn field_count() -> usize {
        MANDATORY_FIELDS.len() + P::count()
    }

    /// Build a descriptor from the fields of one record
    ///
    /// The field count is checked first. Fields are then decoded in record
    /// order and the first failure is returned.
    pub fn from_record(fields: &[&str]) -> Result<Self, RecordError> {
        let expected = Self::field_count();
        if fields.len() != expected {
            return Err(RecordError::FieldCountMismatch {
                expected,
                found: fields.len(),
            });
        }

        let name = check_name(fields[0])?;
        let page_size = decode_field(MANDATORY_FIELDS[1], fields[1])?;
        let block_size = decode_field(MANDATORY_FIELDS[2], fields[2])?;
        let total_size = decode_field(MANDATORY_FIELDS[3], fields[3])?;

        let mut params = Vec::with_capacity(P::count());
        for (role, text) in P::ALL.iter().zip(&fields[MANDATORY_FIELDS.len()..]) {
            let value =
                codec::decode_optional(text).map_err(|reason| RecordError::MalformedParameter {
                    field: role.name(),
                    text: text.to_string(),
                    reason,
                })?;
            params.push(value);
        }

        Ok(Self {
            name,
            page_size,
            block_size,
            total_size,
            params,
            family: PhantomData,
        })
    }

    /// Build a descriptor from a comma-separated record line
    pub fn from_line(line: &str) -> Result<Self, RecordError> {
        let fields: Vec<&str> = line.split(FIELD_SEPARATOR).collect();
        Self::from_record(&fields)
    }

    /// Encode this descriptor as record fields, in the order `from_record` expects
    pub fn to_record(&self) -> Vec<String> {
        let mut fields = Vec::with_capacity(Self::field_count());
        fields.push(self.name.clone());
        fields.push(codec::encode(self.page_size));
        fields.push(codec::encode(self.block_size));
        fields.push(codec::encode(self.total_size));
        fields.extend(self.params.iter().map(|v| codec::encode_optional(*v)));
        fields
    }

    /// Encode this descriptor as a record line
    pub fn to_line(&self) -> String {
        self.to_record().join(", ")
    }

    /// Comment line naming the record columns
    pub fn header() -> String {
        let mut columns: Vec<&str> = MANDATORY_FIELDS.to_vec();
        columns.extend(P::ALL.iter().map(|p| p.name()));
        let mut header = String::from("# ");
        header.push_str(&columns.join(", "));
        header
    }

    /// Chip name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Page (program unit) size in bytes
    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    /// Block (erase unit) size in bytes
    pub fn block_size(&self) -> u64 {
        self.block_size
    }

    /// Total size in bytes
    pub fn total_size(&self) -> u64 {
        self.total_size
    }

    /// Rename the chip
    pub fn set_name(&mut self, name: &str) -> Result<(), RecordError> {
        self.name = check_name(name)?;
        Ok(())
    }

    /// Set the page size in bytes
    pub fn set_page_size(&mut self, size: u64) {
        self.page_size = size;
    }

    /// Set the block size in bytes
    pub fn set_block_size(&mut self, size: u64) {
        self.block_size = size;
    }

    /// Set the total size in bytes
    pub fn set_total_size(&mut self, size: u64) {
        self.total_size = size;
    }

    /// Number of pages on the chip, if the page size is non-zero
    pub fn page_count(&self) -> Option<u64> {
        self.total_size.checked_div(self.page_size)
    }

    /// Number of pages in one block, if the page size is non-zero
    pub fn pages_per_block(&self) -> Option<u64> {
        self.block_size.checked_div(self.page_size)
    }

    /// Value of an optional parameter
    pub fn param(&self, role: P) -> Option<u64> {
        self.params[role.index()]
    }

    /// Define or clear an optional parameter
    pub fn set_param(&mut self, role: P, value: Option<u64>) {
        self.params[role.index()] = value;
    }

    /// Value of the optional parameter at a column index
    pub fn param_at(&self, slot: usize) -> Result<Option<u64>, SlotOutOfRange> {
        self.params.get(slot).copied().ok_or(SlotOutOfRange {
            slot,
            count: P::count(),
        })
    }

    /// Define or clear the optional parameter at a column index
    pub fn set_param_at(&mut self, slot: usize, value: Option<u64>) -> Result<(), SlotOutOfRange> {
        let count = P::count();
        let entry = self
            .params
            .get_mut(slot)
            .ok_or(SlotOutOfRange { slot, count })?;
        *entry = value;
        Ok(())
    }

    /// Iterate over all optional parameters in column order
    pub fn params(&self) -> impl Iterator<Item = (P, Option<u64>)> + '_ {
        P::ALL.iter().map(move |p| (*p, self.param(*p)))
    }
}

fn check_name(name: &str) -> Result<String, RecordError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(RecordError::EmptyName);
    }
    // Must survive a trip through one text line that is not a comment
    if name.starts_with('#')
        || name.contains(FIELD_SEPARATOR)
        || name.contains(char::is_control)
    {
        return Err(RecordError::InvalidName(name.to_string()));
    }
    Ok(name.to_string())
}

fn decode_field(field: &'static str, text: &str) -> Result<u64, RecordError> {
    codec::decode(text).map_err(|reason| RecordError::MalformedParameter {
        field,
        text: text.to_string(),
        reason,
    })
}
