//! SPI NOR driver
//!
//! Every command is one `SpiDevice::transaction`, so chip select frames
//! exactly one command and is released on every exit path, errors included.

use embedded_hal::delay::DelayNs;
use embedded_hal::spi::Operation;
use log::{debug, trace};
use norprog_core::error::HalError;
use norprog_core::hal::poll::PollLimit;
use norprog_core::hal::{ChipId, FlashHal, FlashStatus, HalFeatures, SpiLink, CHIP_ID_LEN};
use norprog_core::spi::{address_bytes, ADDRESS_BYTES, MAX_ADDRESS, READ_DUMMY_BYTE};

use crate::config::SpiNorConfig;

/// SPI NOR flash driver over an [`SpiLink`]
///
/// `D` is the time source used between status polls.
pub struct SpiNorHal<SPI, D> {
    spi: SPI,
    delay: D,
    config: Option<SpiNorConfig>,
    poll: PollLimit,
}

impl<SPI: SpiLink, D: DelayNs> SpiNorHal<SPI, D> {
    /// Create an uninitialized driver with the default polling budget
    pub fn new(spi: SPI, delay: D) -> Self {
        Self {
            spi,
            delay,
            config: None,
            poll: PollLimit::default(),
        }
    }

    /// Replace the polling budget
    pub fn with_poll_limit(mut self, limit: PollLimit) -> Self {
        self.poll = limit;
        self
    }

    /// Replace the polling budget
    pub fn set_poll_limit(&mut self, limit: PollLimit) {
        self.poll = limit;
    }

    /// Active configuration, if initialized
    pub fn config(&self) -> Option<&SpiNorConfig> {
        self.config.as_ref()
    }

    /// The underlying link
    pub fn link(&self) -> &SPI {
        &self.spi
    }

    /// The underlying link, mutably
    pub fn link_mut(&mut self) -> &mut SPI {
        &mut self.spi
    }

    /// Give back the link and the time source
    pub fn release(self) -> (SPI, D) {
        (self.spi, self.delay)
    }

    fn active(&self) -> Result<SpiNorConfig, HalError<SPI::Error>> {
        self.config.ok_or(HalError::NotInitialized)
    }

    /// Command header: opcode followed by the 24-bit address of `page` + `offset`
    fn header(
        cfg: &SpiNorConfig,
        cmd: u8,
        page: u32,
        offset: u32,
    ) -> Result<[u8; 1 + ADDRESS_BYTES], HalError<SPI::Error>> {
        let addr = (u64::from(page) << cfg.page_offset) + u64::from(offset);
        if addr > u64::from(MAX_ADDRESS) {
            return Err(HalError::AddressOutOfRange { page, offset });
        }
        let [a2, a1, a0] = address_bytes(addr as u32);
        Ok([cmd, a2, a1, a0])
    }

    fn write_enable(&mut self, cfg: &SpiNorConfig) -> Result<(), HalError<SPI::Error>> {
        if let Some(wren) = cfg.write_enable_cmd {
            trace!("WREN {:#04x}", wren);
            self.spi.write(&[wren])?;
        }
        Ok(())
    }
}

impl<SPI: SpiLink, D: DelayNs> FlashHal for SpiNorHal<SPI, D> {
    type Config = SpiNorConfig;
    type Error = SPI::Error;

    fn features(&self) -> HalFeatures {
        HalFeatures::empty()
    }

    fn init(&mut self, config: &SpiNorConfig) -> Result<(), HalError<SPI::Error>> {
        self.config = None;
        config.validate().map_err(|e| {
            log::error!("Rejecting SPI NOR configuration: {}", e);
            HalError::InvalidConfig(e.param_name())
        })?;
        if let Some(khz) = config.freq_khz {
            self.spi.set_frequency_khz(khz)?;
        }
        debug!(
            "SPI NOR init: page_offset={} read={:#04x} id={:#04x} write={:#04x} erase={:#04x} status={:#04x}",
            config.page_offset,
            config.read_cmd,
            config.read_id_cmd,
            config.write_cmd,
            config.erase_cmd,
            config.status_cmd
        );
        self.config = Some(*config);
        Ok(())
    }

    fn uninit(&mut self) {
        self.config = None;
    }

    /// Send the ID opcode and read six bytes right after it
    ///
    /// No spacer byte is clocked between opcode and data; JEDEC `0x9F`
    /// answers with the manufacturer byte immediately.
    fn read_id(&mut self) -> Result<ChipId, HalError<SPI::Error>> {
        let cfg = self.active()?;
        let mut id = [0u8; CHIP_ID_LEN];
        self.spi
            .transaction(&mut [Operation::Write(&[cfg.read_id_cmd]), Operation::Read(&mut id)])?;
        let id = ChipId::new(id);
        debug!("Read ID ({:#04x}): {}", cfg.read_id_cmd, id);
        Ok(id)
    }

    fn erase_block(&mut self, page: u32) -> Result<(), HalError<SPI::Error>> {
        let cfg = self.active()?;
        let header = Self::header(&cfg, cfg.erase_cmd, page, 0)?;
        debug!("Erase block at page {}", page);
        self.write_enable(&cfg)?;
        self.spi.write(&header)?;
        self.wait_ready()
    }

    fn read_data(
        &mut self,
        buf: &mut [u8],
        page: u32,
        offset: u32,
        size: u32,
    ) -> Result<(), HalError<SPI::Error>> {
        let cfg = self.active()?;
        let size = size as usize;
        if buf.len() < size {
            return Err(HalError::BufferTooSmall {
                needed: size,
                len: buf.len(),
            });
        }
        let [cmd, a2, a1, a0] = Self::header(&cfg, cfg.read_cmd, page, offset)?;
        trace!("Read {} bytes at page {} offset {}", size, page, offset);
        self.spi.transaction(&mut [
            Operation::Write(&[cmd, a2, a1, a0, READ_DUMMY_BYTE]),
            Operation::Read(&mut buf[..size]),
        ])?;
        Ok(())
    }

    fn write_page_async(
        &mut self,
        buf: &[u8],
        page: u32,
        page_size: u32,
    ) -> Result<(), HalError<SPI::Error>> {
        let cfg = self.active()?;
        let size = page_size as usize;
        if buf.len() < size {
            return Err(HalError::BufferTooSmall {
                needed: size,
                len: buf.len(),
            });
        }
        let header = Self::header(&cfg, cfg.write_cmd, page, 0)?;
        trace!("Program {} bytes at page {}", size, page);
        self.write_enable(&cfg)?;
        self.spi
            .transaction(&mut [Operation::Write(&header), Operation::Write(&buf[..size])])?;
        Ok(())
    }

    fn read_status(&mut self) -> Result<FlashStatus, HalError<SPI::Error>> {
        let cfg = self.active()?;
        let mut sr = [0u8; 1];
        self.spi
            .transaction(&mut [Operation::Write(&[cfg.status_cmd]), Operation::Read(&mut sr)])?;
        if cfg.busy_polarity.is_busy(sr[0], cfg.busy_bit) {
            Ok(FlashStatus::Busy)
        } else {
            Ok(FlashStatus::Ready)
        }
    }

    fn poll_limit(&self) -> PollLimit {
        self.poll
    }

    fn delay_us(&mut self, us: u32) {
        self.delay.delay_us(us);
    }
}
