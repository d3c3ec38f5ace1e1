//! CLI argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Parse a string as a hex (0x...) or decimal u32
fn parse_hex_u32(s: &str) -> Result<u32, String> {
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16).map_err(|e| format!("Invalid hex value: {}", e))
    } else {
        s.parse::<u32>().map_err(|e| format!("Invalid number: {}", e))
    }
}

/// Parse an opcode: hex (with or without 0x) up to 0xFF
fn parse_opcode(s: &str) -> Result<u8, String> {
    let hex = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    u8::from_str_radix(hex, 16).map_err(|e| format!("Invalid opcode '{}': {}", s, e))
}

/// Parse identification bytes
///
/// Accepts bytes separated by spaces, commas or colons (`EF 40 17`,
/// `0xEF,0x40`, `ef:40:17`) or one run of hex digits (`EF4017`).
pub fn parse_id_bytes(s: &str) -> Result<Vec<u8>, String> {
    let tokens: Vec<&str> = s
        .split(|c: char| c.is_whitespace() || c == ',' || c == ':')
        .filter(|t| !t.is_empty())
        .collect();

    let digits: Vec<String> = match tokens.as_slice() {
        [] => return Err("No ID bytes given".to_string()),
        [one] => {
            let run = one
                .strip_prefix("0x")
                .or_else(|| one.strip_prefix("0X"))
                .unwrap_or(one);
            if run.len() > 2 {
                if run.len() % 2 != 0 {
                    return Err(format!("Odd number of hex digits in '{}'", one));
                }
                run.as_bytes()
                    .chunks(2)
                    .map(|pair| String::from_utf8_lossy(pair).into_owned())
                    .collect()
            } else {
                vec![run.to_string()]
            }
        }
        many => many
            .iter()
            .map(|t| {
                t.strip_prefix("0x")
                    .or_else(|| t.strip_prefix("0X"))
                    .unwrap_or(t)
                    .to_string()
            })
            .collect(),
    };

    if digits.len() > 6 {
        return Err(format!("At most 6 ID bytes, got {}", digits.len()));
    }

    digits
        .iter()
        .map(|d| u8::from_str_radix(d, 16).map_err(|_| format!("Invalid ID byte '{}'", d)))
        .collect()
}

/// ID bytes given on the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdBytes(pub Vec<u8>);

fn parse_id_arg(s: &str) -> Result<IdBytes, String> {
    parse_id_bytes(s).map(IdBytes)
}

const PROGRAMMER_HELP: &str =
    "Programmer to use, e.g. dummy, dummy:chip=W25Q32,busy=4 or linux_spi:dev=/dev/spidev0.0,spispeed=2000 [default: from config file, else dummy]";

#[derive(Parser)]
#[command(name = "norprog")]
#[command(author, version, about = "SPI NOR flash programmer with a text chip database", long_about = None)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Chip database file (one comma-separated record per line)
    /// Defaults to the config file's chip_db, then ./chips/spi_nor.csv
    #[arg(long, global = true)]
    pub chip_db: Option<PathBuf>,

    /// Configuration file (TOML)
    /// Defaults to ./norprog.toml if it exists
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by the commands that talk to a chip
#[derive(clap::Args, Debug, Clone)]
pub struct DeviceArgs {
    #[arg(short, long, help = PROGRAMMER_HELP)]
    pub programmer: Option<String>,

    /// Chip name (optional, identified by its ID bytes if not specified)
    #[arg(short, long)]
    pub chip: Option<String>,

    /// Opcode used to read the ID bytes when identifying (hex)
    #[arg(long, value_parser = parse_opcode, default_value = "9F")]
    pub id_cmd: u8,
}

impl Cli {
    /// Log level requested with `-v`, if any
    pub fn log_level(&self) -> Option<log::LevelFilter> {
        match self.verbose {
            0 => None,
            1 => Some(log::LevelFilter::Debug),
            _ => Some(log::LevelFilter::Trace),
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// List chips in the database
    ListChips {
        /// Only show chips whose name contains this text
        #[arg(long)]
        filter: Option<String>,
    },

    /// Show every parameter of one chip
    ShowChip {
        /// Chip name
        name: String,
    },

    /// Check the database and report malformed records
    CheckDb {
        /// Fail if any record is malformed
        #[arg(long)]
        strict: bool,
    },

    /// Rewrite the database in canonical form
    NormalizeDb {
        /// Output file (prints to stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Set or clear one parameter of a chip and save the database
    SetParam {
        /// Chip name
        chip: String,

        /// Parameter name (e.g. read_cmd, busy_bit, page_size)
        param: String,

        /// New value (decimal, 0x hex, 0 octal, or - to clear)
        value: String,

        /// Output file (rewrites the database file if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Find the chip matching the given ID bytes
    Match {
        /// ID bytes, e.g. "EF 40 17" or EF4017
        #[arg(value_parser = parse_id_arg)]
        id: IdBytes,
    },

    /// List supported programmers
    ListProgrammers,

    /// Read the ID bytes and identify the chip
    Probe {
        #[command(flatten)]
        device: DeviceArgs,
    },

    /// Read flash contents to file
    Read {
        #[command(flatten)]
        device: DeviceArgs,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// First page to read
        #[arg(long, value_parser = parse_hex_u32, default_value = "0")]
        start_page: u32,

        /// Number of pages to read (defaults to the rest of the chip)
        #[arg(long, value_parser = parse_hex_u32)]
        pages: Option<u32>,
    },

    /// Erase one block
    EraseBlock {
        #[command(flatten)]
        device: DeviceArgs,

        /// Block index (hex or decimal)
        #[arg(long, value_parser = parse_hex_u32)]
        block: u32,
    },

    /// Read the status register once
    Status {
        #[command(flatten)]
        device: DeviceArgs,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verbosity_sets_log_level() {
        let level = |args: &[&str]| Cli::parse_from(args).log_level();
        assert_eq!(level(&["norprog", "list-programmers"]), None);
        assert_eq!(
            level(&["norprog", "-v", "list-programmers"]),
            Some(log::LevelFilter::Debug)
        );
        assert_eq!(
            level(&["norprog", "list-programmers", "-vvv"]),
            Some(log::LevelFilter::Trace)
        );

        // The level reaches the logger itself, not only the global maximum
        let logger =
            env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
                .filter_level(log::LevelFilter::Debug)
                .build();
        assert_eq!(logger.filter(), log::LevelFilter::Debug);
    }

    #[test]
    fn test_parse_id_bytes() {
        assert_eq!(parse_id_bytes("EF 40 17"), Ok(vec![0xEF, 0x40, 0x17]));
        assert_eq!(parse_id_bytes("0xEF,0x40"), Ok(vec![0xEF, 0x40]));
        assert_eq!(parse_id_bytes("ef:40:17"), Ok(vec![0xEF, 0x40, 0x17]));
        assert_eq!(parse_id_bytes("EF4017"), Ok(vec![0xEF, 0x40, 0x17]));
        assert_eq!(parse_id_bytes("0xC22014"), Ok(vec![0xC2, 0x20, 0x14]));
        assert_eq!(parse_id_bytes("ef"), Ok(vec![0xEF]));
        assert!(parse_id_bytes("").is_err());
        assert!(parse_id_bytes("EF4").is_err());
        assert!(parse_id_bytes("EF GG").is_err());
        assert!(parse_id_bytes("01 02 03 04 05 06 07").is_err());
    }

    #[test]
    fn test_parse_opcode() {
        assert_eq!(parse_opcode("9F"), Ok(0x9F));
        assert_eq!(parse_opcode("0x90"), Ok(0x90));
        assert!(parse_opcode("100").is_err());
    }

    #[test]
    fn test_parse_args() {
        let cli = Cli::parse_from([
            "norprog",
            "-vv",
            "read",
            "-p",
            "dummy",
            "-o",
            "out.bin",
            "--start-page",
            "0x10",
        ]);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Read {
                device,
                start_page,
                pages,
                ..
            } => {
                assert_eq!(device.programmer.as_deref(), Some("dummy"));
                assert_eq!(device.id_cmd, 0x9F);
                assert_eq!(start_page, 0x10);
                assert_eq!(pages, None);
            }
            _ => panic!("expected read"),
        }

        let cli = Cli::parse_from(["norprog", "match", "EF 40 17"]);
        match cli.command {
            Commands::Match { id } => assert_eq!(id, IdBytes(vec![0xEF, 0x40, 0x17])),
            _ => panic!("expected match"),
        }
    }
}
