//! norprog-core - Core library for flash chip identification and programming
//!
//! This crate holds the device-agnostic part of the programmer: the chip
//! database (descriptors parsed from text records), identification of an
//! unknown chip from its ID bytes, and the operation contract a bus driver
//! implements to erase, program, read and poll a chip. It is `no_std`
//! compatible but needs an allocator.
//!
//! # Features
//!
//! - `std` - Implement `std::error::Error` for the error types
//!
//! # Example
//!
//! ```ignore
//! use norprog_core::chip::SpiNorDb;
//! use norprog_core::identify;
//!
//! let db = SpiNorDb::load(&text).into_strict()?;
//! let found = identify::identify(&mut hal, &db)?;
//! match found.chip {
//!     Some((index, chip)) => println!("#{}: {}", index, chip.name()),
//!     None => println!("Unknown chip {}", found.id),
//! }
//! ```

#![no_std]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod chip;
pub mod error;
pub mod hal;
pub mod identify;
pub mod spi;

pub use error::{HalError, LoadError, ParamError, RecordError};
