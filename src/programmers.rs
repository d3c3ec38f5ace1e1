//! Programmer registration and dispatch
//!
//! A programmer string names a link and its options, flashprog style:
//! `name` or `name:key=value,key=value`. Every link is wrapped in
//! [`ProgrammerLink`] so the SPI NOR driver sees one concrete type.

use std::collections::HashMap;
use std::time::Duration;

use embedded_hal::delay::DelayNs;
use embedded_hal::spi::{ErrorKind, ErrorType, Operation, SpiDevice};
use norprog_core::chip::SpiNorDb;
use norprog_core::hal::SpiLink;
use norprog_dummy::{DummyConfig, DummyNor};
use thiserror::Error;

/// Information about a programmer
pub struct ProgrammerInfo {
    /// Primary name (used for matching)
    pub name: &'static str,
    /// Alternative names/aliases
    pub aliases: &'static [&'static str],
    /// Short description
    pub description: &'static str,
}

/// Get information about all available programmers (enabled at compile time)
#[allow(unused_mut, clippy::vec_init_then_push)]
pub fn available_programmers() -> Vec<ProgrammerInfo> {
    let mut programmers = Vec::new();

    programmers.push(ProgrammerInfo {
        name: "dummy",
        aliases: &[],
        description: "In-memory SPI NOR emulator (chip=<name>,busy=<status reads>)",
    });

    #[cfg(all(feature = "linux-spi", target_os = "linux"))]
    programmers.push(ProgrammerInfo {
        name: "linux_spi",
        aliases: &["linux-spi", "spidev"],
        description: "Linux spidev interface (dev=/dev/spidevX.Y,spispeed=<kHz>)",
    });

    programmers
}

/// Errors opening a programmer
#[derive(Debug, Error)]
pub enum ProgrammerError {
    /// Malformed `key=value` option
    #[error("Invalid parameter format: '{0}' (expected key=value)")]
    InvalidParameter(String),

    /// Option value could not be parsed
    #[error("Invalid value for {key}: '{value}'")]
    InvalidValue { key: &'static str, value: String },

    /// No programmer with this name is compiled in
    #[error("Unknown programmer '{0}'. Use list-programmers to see the available ones")]
    Unknown(String),

    /// A required option is missing
    #[error("Missing parameter {0}")]
    MissingParameter(&'static str),

    /// The dummy programmer was asked to emulate a chip it cannot
    #[error("Cannot emulate chip '{0}'")]
    CannotEmulate(String),

    /// The device could not be opened
    #[error("Failed to open {path}: {message}")]
    OpenFailed { path: String, message: String },
}

/// Parsed programmer string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgrammerParams {
    /// Programmer name
    pub name: String,
    /// Options
    pub params: HashMap<String, String>,
}

impl ProgrammerParams {
    fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    fn get_u32(&self, key: &'static str) -> Result<Option<u32>, ProgrammerError> {
        match self.get(key) {
            None => Ok(None),
            Some(v) => v
                .parse()
                .map(Some)
                .map_err(|_| ProgrammerError::InvalidValue {
                    key,
                    value: v.to_string(),
                }),
        }
    }
}

/// Split a programmer string into name and options
pub fn parse_programmer_params(s: &str) -> Result<ProgrammerParams, ProgrammerError> {
    let (name, opts_str) = s.split_once(':').unwrap_or((s, ""));

    let mut params = HashMap::new();
    if !opts_str.is_empty() {
        for opt in opts_str.split(',') {
            if let Some((key, value)) = opt.split_once('=') {
                params.insert(key.to_string(), value.to_string());
            } else {
                return Err(ProgrammerError::InvalidParameter(opt.to_string()));
            }
        }
    }

    Ok(ProgrammerParams {
        name: name.to_string(),
        params,
    })
}

/// Error of a programmer link
#[derive(Debug, Error)]
pub enum LinkError {
    /// spidev transfer failed
    #[cfg(all(feature = "linux-spi", target_os = "linux"))]
    #[error("SPI transfer failed: {0}")]
    Spidev(linux_embedded_hal::SPIError),

    /// spidev rejected the clock setting
    #[cfg(all(feature = "linux-spi", target_os = "linux"))]
    #[error("Failed to set clock speed to {khz} kHz: {source}")]
    SetSpeedFailed {
        khz: u32,
        #[source]
        source: std::io::Error,
    },
}

impl embedded_hal::spi::Error for LinkError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

/// Any supported SPI link
pub enum ProgrammerLink {
    /// In-memory emulator
    Dummy(DummyNor),
    /// Linux spidev device
    #[cfg(all(feature = "linux-spi", target_os = "linux"))]
    LinuxSpi(linux_embedded_hal::SpidevDevice),
}

impl ErrorType for ProgrammerLink {
    type Error = LinkError;
}

impl SpiDevice<u8> for ProgrammerLink {
    fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), LinkError> {
        match self {
            Self::Dummy(flash) => flash.transaction(operations).map_err(|e| match e {}),
            #[cfg(all(feature = "linux-spi", target_os = "linux"))]
            Self::LinuxSpi(dev) => dev.transaction(operations).map_err(LinkError::Spidev),
        }
    }
}

impl SpiLink for ProgrammerLink {
    fn set_frequency_khz(&mut self, khz: u32) -> Result<(), LinkError> {
        match self {
            Self::Dummy(flash) => flash.set_frequency_khz(khz).map_err(|e| match e {}),
            #[cfg(all(feature = "linux-spi", target_os = "linux"))]
            Self::LinuxSpi(dev) => {
                use linux_embedded_hal::spidev::SpidevOptions;
                let options = SpidevOptions::new().max_speed_hz(khz.saturating_mul(1000)).build();
                dev.0
                    .configure(&options)
                    .map_err(|source| LinkError::SetSpeedFailed { khz, source })
            }
        }
    }
}

/// Time source for status polling on the host
pub struct HostDelay;

impl DelayNs for HostDelay {
    fn delay_ns(&mut self, ns: u32) {
        std::thread::sleep(Duration::from_nanos(u64::from(ns)));
    }
}

/// Open the link named by a programmer string
///
/// `db` is used by the dummy programmer to emulate a named chip.
pub fn open_link(programmer: &str, db: &SpiNorDb) -> Result<ProgrammerLink, ProgrammerError> {
    let params = parse_programmer_params(programmer)?;
    log::debug!("Opening programmer {} with {:?}", params.name, params.params);

    match params.name.as_str() {
        "dummy" => open_dummy(&params, db),
        #[cfg(all(feature = "linux-spi", target_os = "linux"))]
        "linux_spi" | "linux-spi" | "spidev" => open_linux_spi(&params),
        other => Err(ProgrammerError::Unknown(other.to_string())),
    }
}

fn open_dummy(params: &ProgrammerParams, db: &SpiNorDb) -> Result<ProgrammerLink, ProgrammerError> {
    let mut config = match params.get("chip") {
        Some(name) => {
            let chip = db
                .find_by_name(name)
                .ok_or_else(|| ProgrammerError::CannotEmulate(name.to_string()))?;
            DummyConfig::from_chip(chip)
                .ok_or_else(|| ProgrammerError::CannotEmulate(name.to_string()))?
        }
        None => DummyConfig::default(),
    };
    if let Some(busy) = params.get_u32("busy")? {
        config.busy_polls = busy;
    }

    log::info!(
        "Dummy programmer: {} bytes, ID {:02X?}",
        config.size,
        config.id
    );
    Ok(ProgrammerLink::Dummy(DummyNor::new(config)))
}

#[cfg(all(feature = "linux-spi", target_os = "linux"))]
fn open_linux_spi(params: &ProgrammerParams) -> Result<ProgrammerLink, ProgrammerError> {
    use linux_embedded_hal::spidev::{SpiModeFlags, SpidevOptions};
    use linux_embedded_hal::SpidevDevice;

    /// Default SPI clock in kHz
    const DEFAULT_SPEED_KHZ: u32 = 2000;

    let path = params
        .get("dev")
        .ok_or(ProgrammerError::MissingParameter("dev=/dev/spidevX.Y"))?;
    let speed_khz = params.get_u32("spispeed")?.unwrap_or(DEFAULT_SPEED_KHZ);

    let open_failed = |message: String| ProgrammerError::OpenFailed {
        path: path.to_string(),
        message,
    };

    let mut dev = SpidevDevice::open(path).map_err(|e| open_failed(format!("{:?}", e)))?;
    let options = SpidevOptions::new()
        .bits_per_word(8)
        .max_speed_hz(speed_khz.saturating_mul(1000))
        .mode(SpiModeFlags::SPI_MODE_0)
        .build();
    dev.0
        .configure(&options)
        .map_err(|e| open_failed(e.to_string()))?;

    log::info!("Opened {} at {} kHz", path, speed_khz);
    Ok(ProgrammerLink::LinuxSpi(dev))
}
