//! Device operation interface
//!
//! [`FlashHal`] is the contract between the programmer logic and a bus
//! driver for one chip family. A driver is created around a link, configured
//! with [`FlashHal::init`] and then driven page by page.

pub mod poll;

use bitflags::bitflags;
use core::fmt;

use crate::error::HalError;
use poll::{BusyPoll, PollLimit, PollState};

bitflags! {
    /// Static capabilities of a chip family driver
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct HalFeatures: u32 {
        /// The driver tracks factory-marked bad blocks
        const BAD_BLOCK_AWARE = 1 << 0;
        /// Pages carry a spare (out-of-band) area
        const SPARE_AREA      = 1 << 1;
    }
}

impl Default for HalFeatures {
    fn default() -> Self {
        HalFeatures::empty()
    }
}

/// Result of a single status read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashStatus {
    /// The chip accepts a new command
    Ready,
    /// An erase or program is still running
    Busy,
}

/// Number of identification bytes read from a chip
pub const CHIP_ID_LEN: usize = 6;

/// Raw identification bytes as read from a chip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ChipId([u8; CHIP_ID_LEN]);

impl ChipId {
    /// Wrap six identification bytes
    pub const fn new(bytes: [u8; CHIP_ID_LEN]) -> Self {
        Self(bytes)
    }

    /// Build from a shorter or longer slice; missing bytes are zero
    pub fn from_slice(bytes: &[u8]) -> Self {
        let mut id = [0u8; CHIP_ID_LEN];
        let n = bytes.len().min(CHIP_ID_LEN);
        id[..n].copy_from_slice(&bytes[..n]);
        Self(id)
    }

    /// The identification bytes
    pub fn as_bytes(&self) -> &[u8; CHIP_ID_LEN] {
        &self.0
    }

    /// Manufacturer byte
    pub fn manufacturer(&self) -> u8 {
        self.0[0]
    }

    /// Whether the bus returned no data at all (all 0x00 or all 0xFF)
    pub fn is_blank(&self) -> bool {
        self.0.iter().all(|b| *b == 0x00) || self.0.iter().all(|b| *b == 0xFF)
    }
}

impl From<[u8; CHIP_ID_LEN]> for ChipId {
    fn from(bytes: [u8; CHIP_ID_LEN]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for ChipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, b) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{:02X}", b)?;
        }
        Ok(())
    }
}

/// SPI link usable by a flash driver
///
/// An [`embedded_hal::spi::SpiDevice`] owns chip select, so each
/// `transaction` is one framed command. The extra hook lets `init` apply a
/// chip's clock hint.
pub trait SpiLink: embedded_hal::spi::SpiDevice<u8> {
    /// Request a bus clock in kHz
    ///
    /// Links that cannot change their clock may ignore the request.
    fn set_frequency_khz(&mut self, khz: u32) -> Result<(), Self::Error>;
}

/// Operations a chip family driver provides
///
/// `page` arguments are page indices; the driver turns them into bus
/// addresses using the configured page geometry.
pub trait FlashHal {
    /// Family-specific link configuration
    type Config;
    /// Error type of the underlying bus
    type Error: fmt::Debug;

    /// Static capabilities of this driver
    fn features(&self) -> HalFeatures;

    /// Validate and apply a configuration
    ///
    /// May be called again to reconfigure. On failure the driver is left
    /// uninitialized.
    fn init(&mut self, config: &Self::Config) -> Result<(), HalError<Self::Error>>;

    /// Drop the configuration; later operations fail until the next `init`
    fn uninit(&mut self);

    /// Read the identification bytes
    fn read_id(&mut self) -> Result<ChipId, HalError<Self::Error>>;

    /// Erase the block starting at `page` and wait for completion
    fn erase_block(&mut self, page: u32) -> Result<(), HalError<Self::Error>>;

    /// Read `size` bytes starting `offset` bytes into `page`
    fn read_data(
        &mut self,
        buf: &mut [u8],
        page: u32,
        offset: u32,
        size: u32,
    ) -> Result<(), HalError<Self::Error>>;

    /// Start programming one page; does not wait for completion
    fn write_page_async(
        &mut self,
        buf: &[u8],
        page: u32,
        page_size: u32,
    ) -> Result<(), HalError<Self::Error>>;

    /// Read the status register once
    fn read_status(&mut self) -> Result<FlashStatus, HalError<Self::Error>>;

    /// Budget for [`wait_ready`](Self::wait_ready)
    fn poll_limit(&self) -> PollLimit;

    /// Block for `us` microseconds
    fn delay_us(&mut self, us: u32);

    /// Read a whole page
    fn read_page(
        &mut self,
        buf: &mut [u8],
        page: u32,
        page_size: u32,
    ) -> Result<(), HalError<Self::Error>> {
        self.read_data(buf, page, 0, page_size)
    }

    /// Read from the spare area of a page
    fn read_spare_data(
        &mut self,
        _buf: &mut [u8],
        _page: u32,
        _offset: u32,
        _size: u32,
    ) -> Result<(), HalError<Self::Error>> {
        Err(HalError::Unsupported)
    }

    /// Poll the status register until the chip is ready
    ///
    /// Returns [`HalError::Timeout`] if the chip is still busy after
    /// [`poll_limit`](Self::poll_limit) reads.
    fn wait_ready(&mut self) -> Result<(), HalError<Self::Error>> {
        let limit = self.poll_limit();
        let mut poll = BusyPoll::new(limit);
        loop {
            let status = self.read_status()?;
            match poll.observe(status) {
                PollState::Ready => return Ok(()),
                PollState::TimedOut => {
                    log::warn!("Chip still busy after {} status reads", limit.max_polls.max(1));
                    return Err(HalError::Timeout);
                }
                PollState::Polling { .. } => {
                    if limit.interval_us > 0 {
                        self.delay_us(limit.interval_us);
                    }
                }
            }
        }
    }

    /// Whether the driver tracks bad blocks
    fn is_bad_block_aware(&self) -> bool {
        self.features().contains(HalFeatures::BAD_BLOCK_AWARE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::format;

    /// Reports busy a fixed number of times, then ready
    struct Scripted {
        busy_reads: u32,
        reads: u32,
        delays: u32,
        limit: PollLimit,
    }

    impl Scripted {
        fn new(busy_reads: u32, max_polls: u32, interval_us: u32) -> Self {
            Self {
                busy_reads,
                reads: 0,
                delays: 0,
                limit: PollLimit {
                    max_polls,
                    interval_us,
                },
            }
        }
    }

    impl FlashHal for Scripted {
        type Config = ();
        type Error = ();

        fn features(&self) -> HalFeatures {
            HalFeatures::empty()
        }

        fn init(&mut self, _config: &()) -> Result<(), HalError<()>> {
            Ok(())
        }

        fn uninit(&mut self) {}

        fn read_id(&mut self) -> Result<ChipId, HalError<()>> {
            Ok(ChipId::default())
        }

        fn erase_block(&mut self, _page: u32) -> Result<(), HalError<()>> {
            self.wait_ready()
        }

        fn read_data(
            &mut self,
            _buf: &mut [u8],
            _page: u32,
            _offset: u32,
            _size: u32,
        ) -> Result<(), HalError<()>> {
            Ok(())
        }

        fn write_page_async(
            &mut self,
            _buf: &[u8],
            _page: u32,
            _page_size: u32,
        ) -> Result<(), HalError<()>> {
            Ok(())
        }

        fn read_status(&mut self) -> Result<FlashStatus, HalError<()>> {
            self.reads += 1;
            if self.reads > self.busy_reads {
                Ok(FlashStatus::Ready)
            } else {
                Ok(FlashStatus::Busy)
            }
        }

        fn poll_limit(&self) -> PollLimit {
            self.limit
        }

        fn delay_us(&mut self, _us: u32) {
            self.delays += 1;
        }
    }

    #[test]
    fn test_wait_ready_counts_reads() {
        let mut hal = Scripted::new(3, 10, 0);
        assert_eq!(hal.wait_ready(), Ok(()));
        assert_eq!(hal.reads, 4);
        assert_eq!(hal.delays, 0);
    }

    #[test]
    fn test_wait_ready_delays_between_reads() {
        let mut hal = Scripted::new(2, 10, 50);
        assert_eq!(hal.wait_ready(), Ok(()));
        assert_eq!(hal.reads, 3);
        assert_eq!(hal.delays, 2);
    }

    #[test]
    fn test_wait_ready_times_out() {
        let mut hal = Scripted::new(u32::MAX, 5, 0);
        assert_eq!(hal.wait_ready(), Err(HalError::Timeout));
        assert_eq!(hal.reads, 5);
    }

    #[test]
    fn test_ready_on_last_permitted_read() {
        let mut hal = Scripted::new(4, 5, 0);
        assert_eq!(hal.wait_ready(), Ok(()));
        assert_eq!(hal.reads, 5);
    }

    #[test]
    fn test_spare_unsupported() {
        let mut hal = Scripted::new(0, 1, 0);
        let mut buf = [0u8; 16];
        assert_eq!(
            hal.read_spare_data(&mut buf, 0, 0, 16),
            Err(HalError::Unsupported)
        );
        assert!(!hal.is_bad_block_aware());
    }

    #[test]
    fn test_chip_id() {
        let id = ChipId::new([0xEF, 0x40, 0x17, 0x00, 0x00, 0x00]);
        assert_eq!(format!("{}", id), "EF 40 17 00 00 00");
        assert_eq!(id.manufacturer(), 0xEF);
        assert!(!id.is_blank());
        assert!(ChipId::new([0xFF; 6]).is_blank());
        assert_eq!(ChipId::from_slice(&[0xC2, 0x20]).as_bytes(), &[0xC2, 0x20, 0, 0, 0, 0]);
    }
}
