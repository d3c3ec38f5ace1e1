//! Configuration file
//!
//! An optional TOML file supplies defaults for the command line:
//!
//! ```toml
//! chip_db = "chips/spi_nor.csv"
//! programmer = "linux_spi:dev=/dev/spidev0.0,spispeed=8000"
//!
//! [poll]
//! max_polls = 0x100000
//! interval_us = 10
//! ```
//!
//! Command line flags win over the file, and the file wins over the
//! built-in defaults.

use norprog_core::hal::poll::PollLimit;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the configuration file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "norprog.toml";

/// Programmer used when neither the command line nor the file names one
pub const DEFAULT_PROGRAMMER: &str = "dummy";

/// Chip database locations tried when none is configured
const DEFAULT_CHIP_DBS: &[&str] = &[
    "chips/spi_nor.csv",
    "/usr/share/norprog/spi_nor.csv",
    "/usr/local/share/norprog/spi_nor.csv",
];

/// Errors loading the configuration file
#[derive(Debug, Error)]
pub enum ConfigFileError {
    /// The file could not be read
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML or has unknown keys
    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// Contents of `norprog.toml`
#[derive(Debug, Default, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    /// Chip database file
    pub chip_db: Option<PathBuf>,
    /// Programmer string
    pub programmer: Option<String>,
    /// Status polling budget
    #[serde(default)]
    pub poll: PollSection,
}

/// `[poll]` table
#[derive(Debug, Default, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PollSection {
    /// Maximum status reads per wait
    pub max_polls: Option<u32>,
    /// Delay between status reads in microseconds
    pub interval_us: Option<u32>,
}

impl FileConfig {
    /// Parse TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load a configuration file
    pub fn from_file(path: &Path) -> Result<Self, ConfigFileError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigFileError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content).map_err(|source| ConfigFileError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Load the given file, or `norprog.toml` if it exists, or nothing
    pub fn discover(explicit: Option<&Path>) -> Result<Self, ConfigFileError> {
        if let Some(path) = explicit {
            let config = Self::from_file(path)?;
            log::debug!("Loaded configuration from {}", path.display());
            return Ok(config);
        }

        let default = Path::new(DEFAULT_CONFIG_FILE);
        if default.is_file() {
            let config = Self::from_file(default)?;
            log::debug!("Loaded configuration from {}", default.display());
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Polling budget with unset fields taken from the default
    pub fn poll_limit(&self) -> PollLimit {
        let default = PollLimit::default();
        PollLimit {
            max_polls: self.poll.max_polls.unwrap_or(default.max_polls),
            interval_us: self.poll.interval_us.unwrap_or(default.interval_us),
        }
    }

    /// Chip database path: flag, then file, then the first default that exists
    pub fn chip_db(&self, flag: Option<&Path>) -> PathBuf {
        if let Some(path) = flag {
            return path.to_path_buf();
        }
        if let Some(path) = &self.chip_db {
            return path.clone();
        }
        DEFAULT_CHIP_DBS
            .iter()
            .map(PathBuf::from)
            .find(|p| p.is_file())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CHIP_DBS[0]))
    }

    /// Programmer string: flag, then file, then the built-in default
    pub fn programmer(&self, flag: Option<&str>) -> String {
        flag.map(str::to_string)
            .or_else(|| self.programmer.clone())
            .unwrap_or_else(|| DEFAULT_PROGRAMMER.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full() {
        let config = FileConfig::from_toml_str(
            r#"
            chip_db = "my.csv"
            programmer = "linux_spi:dev=/dev/spidev1.0"

            [poll]
            max_polls = 0x1000
            interval_us = 25
            "#,
        )
        .unwrap();
        assert_eq!(config.chip_db, Some(PathBuf::from("my.csv")));
        assert_eq!(
            config.poll_limit(),
            PollLimit {
                max_polls: 0x1000,
                interval_us: 25
            }
        );
    }

    #[test]
    fn test_empty_uses_defaults() {
        let config = FileConfig::from_toml_str("").unwrap();
        assert_eq!(config.poll_limit(), PollLimit::default());
        assert_eq!(config.programmer(None), "dummy");
    }

    #[test]
    fn test_partial_poll_section() {
        let config = FileConfig::from_toml_str("[poll]\ninterval_us = 5\n").unwrap();
        assert_eq!(config.poll_limit().max_polls, PollLimit::default().max_polls);
        assert_eq!(config.poll_limit().interval_us, 5);
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(FileConfig::from_toml_str("chipdb = \"x.csv\"").is_err());
        assert!(FileConfig::from_toml_str("[poll]\ntimeout = 5").is_err());
    }

    #[test]
    fn test_precedence() {
        let config = FileConfig::from_toml_str("chip_db = \"file.csv\"\nprogrammer = \"dummy:busy=2\"")
            .unwrap();
        assert_eq!(config.programmer(Some("linux_spi")), "linux_spi");
        assert_eq!(config.programmer(None), "dummy:busy=2");
        assert_eq!(
            config.chip_db(Some(Path::new("flag.csv"))),
            PathBuf::from("flag.csv")
        );
        assert_eq!(config.chip_db(None), PathBuf::from("file.csv"));
    }
}
