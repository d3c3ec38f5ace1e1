//! Probe and status commands

use super::{format_size, open_chip};
use crate::cli::DeviceArgs;
use crate::programmers::{open_link, HostDelay};
use norprog_core::chip::SpiNorDb;
use norprog_core::hal::poll::PollLimit;
use norprog_core::hal::{FlashHal, FlashStatus};
use norprog_core::identify::identify;
use norprog_spi_nor::{SpiNorConfig, SpiNorHal};

/// Read the ID bytes and look them up
pub fn run_probe(
    args: &DeviceArgs,
    programmer: &str,
    db: &SpiNorDb,
    poll: PollLimit,
) -> Result<(), Box<dyn std::error::Error>> {
    let link = open_link(programmer, db)?;
    let mut hal = SpiNorHal::new(link, HostDelay).with_poll_limit(poll);
    hal.init(&SpiNorConfig::identify_only(args.id_cmd))?;

    let found = identify(&mut hal, db)?;
    println!("ID bytes:  {}", found.id);

    match found.chip {
        Some((index, chip)) => {
            println!("Found flash chip:");
            println!("  Name:   {} (#{})", chip.name(), index);
            println!(
                "  Size:   {} bytes ({})",
                chip.total_size(),
                format_size(chip.total_size())
            );
            println!("  Page:   {} bytes", chip.page_size());
            println!("  Block:  {}", format_size(chip.block_size()));

            if let Some(expected) = &args.chip {
                if expected != chip.name() {
                    log::warn!("Expected {}, but the ID matches {}", expected, chip.name());
                }
            }
            Ok(())
        }
        None if found.id.is_blank() => {
            Err("No response from chip (check wiring and the ID opcode)".into())
        }
        None => Err(format!("No chip in the database matches ID {}", found.id).into()),
    }
}

/// Read the status register once
pub fn run_status(
    args: &DeviceArgs,
    programmer: &str,
    db: &SpiNorDb,
    poll: PollLimit,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = open_chip(args, programmer, db, poll)?;
    let status = session.hal.read_status()?;
    println!(
        "{}: {}",
        session.chip.name(),
        match status {
            FlashStatus::Ready => "ready",
            FlashStatus::Busy => "busy",
        }
    );
    Ok(())
}
