//! CLI command implementations
//!
//! ## Database commands
//!
//! `db` and `list` work on the chip database file only.
//!
//! ## Device commands
//!
//! `probe`, `read` and `erase` open a programmer link, identify or select
//! the chip, and drive it through the SPI NOR driver.

mod db;
mod erase;
mod list;
mod probe;
mod read;

pub use db::{check_db, match_id, normalize_db, set_param};
pub use erase::run_erase_block;
pub use list::{list_chips, list_programmers, show_chip};
pub use probe::{run_probe, run_status};
pub use read::run_read;

use crate::cli::DeviceArgs;
use crate::programmers::{open_link, HostDelay, ProgrammerLink};
use norprog_core::chip::{SpiNorChip, SpiNorDb};
use norprog_core::hal::poll::PollLimit;
use norprog_core::hal::FlashHal;
use norprog_core::identify::identify;
use norprog_spi_nor::{SpiNorConfig, SpiNorHal};

/// Driver type used by the device commands
pub type Hal = SpiNorHal<ProgrammerLink, HostDelay>;

/// An initialized driver and the chip it talks to
pub struct Session<'a> {
    pub hal: Hal,
    pub chip: &'a SpiNorChip,
}

/// Open the programmer and configure the driver for the selected chip
///
/// With `--chip` the record is taken by name; otherwise the chip is
/// identified by its ID bytes first.
pub fn open_chip<'a>(
    args: &DeviceArgs,
    programmer: &str,
    db: &'a SpiNorDb,
    poll: PollLimit,
) -> Result<Session<'a>, Box<dyn std::error::Error>> {
    let link = open_link(programmer, db)?;
    let mut hal = SpiNorHal::new(link, HostDelay).with_poll_limit(poll);

    let chip = match &args.chip {
        Some(name) => db
            .find_by_name(name)
            .ok_or_else(|| format!("Chip '{}' is not in the database", name))?,
        None => {
            hal.init(&SpiNorConfig::identify_only(args.id_cmd))?;
            let found = identify(&mut hal, db)?;
            match found.chip {
                Some((_, chip)) => chip,
                None => return Err(format!("Unknown chip, ID {}", found.id).into()),
            }
        }
    };

    let config = SpiNorConfig::from_chip(chip)
        .map_err(|e| format!("Chip '{}' cannot be driven: {}", chip.name(), e))?;
    hal.init(&config)?;
    log::debug!("Using {}", chip.name());

    Ok(Session { hal, chip })
}

/// Format a byte count with a binary unit
pub fn format_size(bytes: u64) -> String {
    if bytes >= 1024 * 1024 && bytes % (1024 * 1024) == 0 {
        format!("{} MiB", bytes / (1024 * 1024))
    } else if bytes >= 1024 && bytes % 1024 == 0 {
        format!("{} KiB", bytes / 1024)
    } else {
        format!("{} B", bytes)
    }
}
