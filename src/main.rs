//! norprog - SPI NOR flash programmer
//!
//! Chips are described by one text record each in a chip database file.
//! A record carries the geometry, the identification bytes and the opcodes
//! the driver needs, so supporting a new part means adding a line to the
//! database rather than changing code.

mod cli;
mod commands;
mod config;
mod programmers;

use clap::Parser;
use cli::{Cli, Commands};
use config::FileConfig;
use norprog_core::chip::{DbLoad, SpiNorDb, SpiNorParam};
use std::fs;
use std::path::Path;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logger; -v/-vv override RUST_LOG
    let mut logger =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if let Some(level) = cli.log_level() {
        logger.filter_level(level);
    }
    logger.init();

    let config = FileConfig::discover(cli.config.as_deref())?;

    // Needs neither the database nor a device
    if let Commands::ListProgrammers = cli.command {
        commands::list_programmers();
        return Ok(());
    }

    let db_path = config.chip_db(cli.chip_db.as_deref());
    let load = match load_chip_database(&db_path) {
        Ok(load) => load,
        Err(e) => {
            eprintln!("Failed to load chip database: {}", e);
            std::process::exit(1);
        }
    };

    log::info!(
        "Loaded {} chip definitions from {}",
        load.db.len(),
        db_path.display()
    );

    let poll = config.poll_limit();

    let result = match cli.command {
        Commands::ListProgrammers => Ok(()),
        Commands::ListChips { filter } => {
            commands::list_chips(&load.db, filter.as_deref());
            Ok(())
        }
        Commands::ShowChip { name } => commands::show_chip(&load.db, &name),
        Commands::CheckDb { strict } => commands::check_db(&db_path, &load, strict),
        Commands::NormalizeDb { output } => commands::normalize_db(&load, output.as_deref()),
        Commands::SetParam {
            chip,
            param,
            value,
            output,
        } => commands::set_param(&db_path, load, &chip, &param, &value, output.as_deref()),
        Commands::Match { id } => commands::match_id(&load.db, &id.0),
        Commands::Probe { device } => {
            let programmer = config.programmer(device.programmer.as_deref());
            commands::run_probe(&device, &programmer, &load.db, poll)
        }
        Commands::Read {
            device,
            output,
            start_page,
            pages,
        } => {
            let programmer = config.programmer(device.programmer.as_deref());
            commands::run_read(
                &device,
                &programmer,
                &load.db,
                poll,
                &output,
                start_page,
                pages,
            )
        }
        Commands::EraseBlock { device, block } => {
            let programmer = config.programmer(device.programmer.as_deref());
            commands::run_erase_block(&device, &programmer, &load.db, poll, block)
        }
        Commands::Status { device } => {
            let programmer = config.programmer(device.programmer.as_deref());
            commands::run_status(&device, &programmer, &load.db, poll)
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Read the chip database, keeping every record that parses
fn load_chip_database(path: &Path) -> Result<DbLoad<SpiNorParam>, Box<dyn std::error::Error>> {
    if !path.is_file() {
        return Err(format!("Chip database not found: {}", path.display()).into());
    }
    let text = fs::read_to_string(path)
        .map_err(|e| format!("Cannot read {}: {}", path.display(), e))?;
    let load = SpiNorDb::load(&text);
    if !load.is_clean() {
        log::warn!(
            "{}: skipped {} malformed records (run check-db for details)",
            path.display(),
            load.errors.len()
        );
    }
    Ok(load)
}
