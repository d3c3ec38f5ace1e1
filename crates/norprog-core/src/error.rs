//! Error types for norprog-core
//!
//! The error types are `no_std` compatible. With the `std` feature they also
//! implement `std::error::Error` so callers can box them.

use alloc::string::String;
use core::fmt;

/// A parameter field could not be decoded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamError {
    /// The field is empty (or only whitespace)
    Empty,
    /// The field is not a number in a supported base
    Invalid,
    /// The number does not fit in 64 bits
    Overflow,
    /// The number is the reserved "not defined" value
    Reserved,
}

/// A database record could not be turned into a chip descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    /// The record does not have the number of fields the schema requires
    FieldCountMismatch {
        /// Number of fields the schema requires
        expected: usize,
        /// Number of fields found in the record
        found: usize,
    },
    /// A field could not be decoded as a number
    MalformedParameter {
        /// Column name of the field
        field: &'static str,
        /// The offending text, untrimmed
        text: String,
        /// Why decoding failed
        reason: ParamError,
    },
    /// The name field is empty
    EmptyName,
    /// The name would not survive as one record line: a leading `#`, the
    /// field separator, or a control character
    InvalidName(String),
    /// A chip with the same name is already in the database
    DuplicateName(String),
}

/// A record that was skipped while loading a database
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadError {
    /// 1-based line number in the source text
    pub line: usize,
    /// What was wrong with the record
    pub error: RecordError,
}

/// An optional parameter slot index beyond the family's parameter count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotOutOfRange {
    /// The requested slot
    pub slot: usize,
    /// Number of slots the family defines
    pub count: usize,
}

/// Error returned by flash operations
///
/// `E` is the error type of the underlying bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HalError<E> {
    /// The bus transfer failed
    Bus(E),
    /// The chip stayed busy for the whole polling budget
    Timeout,
    /// The operation is not implemented by this chip family
    Unsupported,
    /// The driver has no configuration; call `init` first
    NotInitialized,
    /// The configuration was rejected by the driver
    InvalidConfig(&'static str),
    /// The caller's buffer is shorter than the requested transfer
    BufferTooSmall {
        /// Bytes required
        needed: usize,
        /// Bytes available
        len: usize,
    },
    /// The page/offset pair does not fit the address phase
    AddressOutOfRange {
        /// Requested page
        page: u32,
        /// Requested offset within the page
        offset: u32,
    },
}

impl<E> From<E> for HalError<E> {
    fn from(e: E) -> Self {
        HalError::Bus(e)
    }
}

impl fmt::Display for ParamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty value"),
            Self::Invalid => write!(f, "not a number"),
            Self::Overflow => write!(f, "value does not fit in 64 bits"),
            Self::Reserved => write!(f, "value is reserved for \"not defined\""),
        }
    }
}

impl fmt::Display for RecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FieldCountMismatch { expected, found } => {
                write!(f, "expected {} fields, found {}", expected, found)
            }
            Self::MalformedParameter {
                field,
                text,
                reason,
            } => {
                write!(f, "cannot parse {} from \"{}\": {}", field, text, reason)
            }
            Self::EmptyName => write!(f, "chip name is empty"),
            Self::InvalidName(name) => write!(
                f,
                "chip name {:?} starts with '#' or contains ',' or a control character",
                name
            ),
            Self::DuplicateName(name) => write!(f, "duplicate chip name \"{}\"", name),
        }
    }
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.error)
    }
}

impl fmt::Display for SlotOutOfRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "parameter slot {} out of range (family has {})",
            self.slot, self.count
        )
    }
}

impl<E: fmt::Debug> fmt::Display for HalError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bus(e) => write!(f, "bus error: {:?}", e),
            Self::Timeout => write!(f, "chip stayed busy, operation timed out"),
            Self::Unsupported => write!(f, "operation not supported by this chip family"),
            Self::NotInitialized => write!(f, "driver not initialized"),
            Self::InvalidConfig(reason) => write!(f, "invalid configuration: {}", reason),
            Self::BufferTooSmall { needed, len } => {
                write!(f, "buffer too small: need {} bytes, have {}", needed, len)
            }
            Self::AddressOutOfRange { page, offset } => {
                write!(
                    f,
                    "page {} offset {} is beyond the addressable range",
                    page, offset
                )
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ParamError {}

#[cfg(feature = "std")]
impl std::error::Error for RecordError {}

#[cfg(feature = "std")]
impl std::error::Error for LoadError {}

#[cfg(feature = "std")]
impl std::error::Error for SlotOutOfRange {}

#[cfg(feature = "std")]
impl<E: fmt::Debug> std::error::Error for HalError<E> {}
