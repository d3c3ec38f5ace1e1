//! Read command implementation

use indicatif::{ProgressBar, ProgressStyle};
use norprog_core::chip::SpiNorDb;
use norprog_core::hal::poll::PollLimit;
use norprog_core::hal::FlashHal;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use super::{open_chip, Hal};
use crate::cli::DeviceArgs;

/// Run the read command
pub fn run_read(
    args: &DeviceArgs,
    programmer: &str,
    db: &SpiNorDb,
    poll: PollLimit,
    output: &Path,
    start_page: u32,
    pages: Option<u32>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = open_chip(args, programmer, db, poll)?;
    let chip = session.chip;

    let page_size = u32::try_from(chip.page_size())
        .ok()
        .filter(|s| *s > 0)
        .ok_or_else(|| format!("{}: unusable page size {}", chip.name(), chip.page_size()))?;
    let page_count = u32::try_from(chip.total_size() / u64::from(page_size))?;

    if start_page >= page_count {
        return Err(format!(
            "Start page {} is beyond the chip ({} pages)",
            start_page, page_count
        )
        .into());
    }
    let pages = pages.unwrap_or(page_count - start_page);
    if u64::from(start_page) + u64::from(pages) > u64::from(page_count) {
        return Err(format!(
            "Pages {}..{} are beyond the chip ({} pages)",
            start_page,
            u64::from(start_page) + u64::from(pages),
            page_count
        )
        .into());
    }

    println!(
        "Reading {} pages of {} bytes from {}",
        pages,
        page_size,
        chip.name()
    );
    let data = read_pages_with_progress(&mut session.hal, start_page, pages, page_size)?;

    let mut file = File::create(output)?;
    file.write_all(&data)?;

    println!("Wrote {} bytes to {:?}", data.len(), output);
    Ok(())
}

/// Read consecutive pages with a progress bar
fn read_pages_with_progress(
    hal: &mut Hal,
    start_page: u32,
    pages: u32,
    page_size: u32,
) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    let page_len = page_size as usize;
    let mut data = vec![0u8; pages as usize * page_len];

    let pb = ProgressBar::new(data.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})")?
            .progress_chars("#>-"),
    );

    for (i, chunk) in data.chunks_mut(page_len).enumerate() {
        hal.read_page(chunk, start_page + i as u32, page_size)?;
        pb.inc(page_len as u64);
    }

    pb.finish_with_message("Read complete");
    Ok(data)
}
