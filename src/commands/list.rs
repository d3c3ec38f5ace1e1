//! List commands implementation

use super::format_size;
use crate::programmers;
use norprog_core::chip::{codec, ParamSet, SpiNorChip, SpiNorDb, SpiNorParam};

/// List all supported programmers
pub fn list_programmers() {
    println!("Supported programmers:");
    println!();
    for p in programmers::available_programmers() {
        print!("  {:10} - {}", p.name, p.description);
        if !p.aliases.is_empty() {
            print!(" (aliases: {})", p.aliases.join(", "));
        }
        println!();
    }
}

/// Defined ID bytes of a chip, as hex
fn id_string(chip: &SpiNorChip) -> String {
    SpiNorParam::ID_SLOTS
        .iter()
        .map_while(|slot| chip.param(*slot))
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

/// List the chips in the database
pub fn list_chips(db: &SpiNorDb, filter: Option<&str>) {
    println!(
        "{:<4} {:<20} {:>10} {:>8} {:>8}  ID",
        "#", "Name", "Size", "Page", "Block"
    );
    println!("{}", "-".repeat(66));

    let filter = filter.map(str::to_lowercase);
    let mut shown = 0;
    for (i, chip) in db.iter().enumerate() {
        if let Some(f) = &filter {
            if !chip.name().to_lowercase().contains(f) {
                continue;
            }
        }
        println!(
            "{:<4} {:<20} {:>10} {:>8} {:>8}  {}",
            i,
            chip.name(),
            format_size(chip.total_size()),
            chip.page_size(),
            format_size(chip.block_size()),
            id_string(chip)
        );
        shown += 1;
    }

    println!();
    println!("{} of {} chips", shown, db.len());
}

/// Show every field of one chip
pub fn show_chip(db: &SpiNorDb, name: &str) -> Result<(), Box<dyn std::error::Error>> {
    let chip = db
        .find_by_name(name)
        .ok_or_else(|| format!("Chip '{}' is not in the database", name))?;

    println!("Name:            {}", chip.name());
    println!(
        "Size:            {} bytes ({})",
        chip.total_size(),
        format_size(chip.total_size())
    );
    println!("Page size:       {} bytes", chip.page_size());
    println!(
        "Block size:      {} bytes ({})",
        chip.block_size(),
        format_size(chip.block_size())
    );
    println!();
    for (param, value) in chip.params() {
        println!("{:<16} {}", format!("{}:", param.name()), codec::encode_optional(value));
    }
    println!();
    println!("{}", chip.to_line());
    Ok(())
}
