//! norprog-spi-nor - SPI NOR flash driver
//!
//! Drives 25-series SPI NOR chips over any [`SpiLink`](norprog_core::hal::SpiLink).
//! The opcodes, busy flag and page geometry come from the chip database
//! through [`SpiNorConfig`], so one driver covers every chip the database
//! describes.
//!
//! ```ignore
//! let chip = db.find_by_name("W25Q64").unwrap();
//! let mut hal = SpiNorHal::new(link, delay);
//! hal.init(&SpiNorConfig::from_chip(chip)?)?;
//! hal.erase_block(0)?;
//! ```

#![no_std]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

#[cfg(feature = "std")]
extern crate std;

mod config;
mod driver;

pub use config::{BusyPolarity, ConfigError, SpiNorConfig, CONFIG_BLOB_LEN};
pub use driver::SpiNorHal;
