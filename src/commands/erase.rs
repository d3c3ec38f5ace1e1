//! Erase command implementation

use indicatif::{ProgressBar, ProgressStyle};
use norprog_core::chip::SpiNorDb;
use norprog_core::hal::poll::PollLimit;
use norprog_core::hal::FlashHal;
use std::time::Duration;

use super::open_chip;
use crate::cli::DeviceArgs;

/// Erase one block, addressed by block index
pub fn run_erase_block(
    args: &DeviceArgs,
    programmer: &str,
    db: &SpiNorDb,
    poll: PollLimit,
    block: u32,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = open_chip(args, programmer, db, poll)?;
    let chip = session.chip;

    let pages_per_block = chip
        .pages_per_block()
        .filter(|n| *n > 0)
        .ok_or_else(|| format!("{}: block smaller than a page", chip.name()))?;
    let blocks = chip.total_size() / chip.block_size().max(1);
    if u64::from(block) >= blocks {
        return Err(format!("Block {} is beyond the chip ({} blocks)", block, blocks).into());
    }
    let page = u32::try_from(u64::from(block) * pages_per_block)?;

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.set_message(format!(
        "Erasing block {} (page {}) of {}...",
        block,
        page,
        chip.name()
    ));
    pb.enable_steady_tick(Duration::from_millis(100));

    let result = session.hal.erase_block(page);
    pb.finish_and_clear();
    result?;

    println!(
        "Erased block {} at 0x{:06X}",
        block,
        u64::from(block) * chip.block_size()
    );
    Ok(())
}
