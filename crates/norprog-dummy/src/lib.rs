//! norprog-dummy - In-memory SPI NOR emulator for testing
//!
//! [`DummyNor`] answers the 25-series command set on the byte level through
//! [`embedded_hal::spi::SpiDevice`], so real drivers can be exercised
//! without hardware. Each `transaction` is one chip select frame; commands
//! take effect when the frame ends, as on a real chip.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

use alloc::vec;
use alloc::vec::Vec;
use core::convert::Infallible;

use embedded_hal::spi::{ErrorType, Operation, SpiDevice};
use norprog_core::chip::{SpiNorChip, SpiNorParam};
use norprog_core::hal::{SpiLink, CHIP_ID_LEN};
use norprog_core::spi::{opcodes, ADDRESS_BYTES};

/// Configuration for the emulated chip
#[derive(Debug, Clone)]
pub struct DummyConfig {
    /// Identification bytes returned by the read ID command
    pub id: [u8; CHIP_ID_LEN],
    /// Flash size in bytes
    pub size: usize,
    /// Page size for programming
    pub page_size: usize,
    /// Erase block size
    pub block_size: usize,
    /// Read data opcode (followed by address and one dummy byte)
    pub read_cmd: u8,
    /// Read identification opcode
    pub read_id_cmd: u8,
    /// Page program opcode
    pub write_cmd: u8,
    /// Write enable opcode; `None` means program and erase need no latch
    pub write_enable_cmd: Option<u8>,
    /// Block erase opcode
    pub erase_cmd: u8,
    /// Read status opcode
    pub status_cmd: u8,
    /// Bit index of the busy flag
    pub busy_bit: u8,
    /// Whether the busy flag reads 1 while busy
    pub busy_active_high: bool,
    /// Status reads that report busy after each erase or program
    pub busy_polls: u32,
}

impl Default for DummyConfig {
    fn default() -> Self {
        Self {
            id: [0xEF, 0x40, 0x17, 0x00, 0x00, 0x00], // W25Q64
            size: 8 * 1024 * 1024,
            page_size: 256,
            block_size: 64 * 1024,
            read_cmd: opcodes::FAST_READ,
            read_id_cmd: opcodes::RDID,
            write_cmd: opcodes::PP,
            write_enable_cmd: Some(opcodes::WREN),
            erase_cmd: opcodes::BE_D8,
            status_cmd: opcodes::RDSR,
            busy_bit: 0,
            busy_active_high: true,
            busy_polls: 0,
        }
    }
}

impl DummyConfig {
    /// Emulate a chip described by a database record
    ///
    /// Undefined ID bytes read as zero. Returns `None` if the record lacks an
    /// opcode, the busy description, or has a geometry the emulator cannot
    /// hold (zero or non power of two sizes).
    pub fn from_chip(chip: &SpiNorChip) -> Option<Self> {
        let byte = |p: SpiNorParam| chip.param(p).and_then(|v| u8::try_from(v).ok());

        let mut id = [0u8; CHIP_ID_LEN];
        for (slot, param) in id.iter_mut().zip([
            SpiNorParam::Id1,
            SpiNorParam::Id2,
            SpiNorParam::Id3,
            SpiNorParam::Id4,
            SpiNorParam::Id5,
            SpiNorParam::Id6,
        ]) {
            *slot = byte(param).unwrap_or(0);
        }

        let page_size = usize::try_from(chip.page_size()).ok()?;
        let block_size = usize::try_from(chip.block_size()).ok()?;
        let size = usize::try_from(chip.total_size()).ok()?;
        if !page_size.is_power_of_two() || !block_size.is_power_of_two() || size == 0 {
            return None;
        }

        let busy_bit = byte(SpiNorParam::BusyBit).filter(|b| *b < 8)?;

        Some(Self {
            id,
            size,
            page_size,
            block_size,
            read_cmd: byte(SpiNorParam::ReadCmd)?,
            read_id_cmd: byte(SpiNorParam::ReadIdCmd)?,
            write_cmd: byte(SpiNorParam::WriteCmd)?,
            write_enable_cmd: byte(SpiNorParam::WriteEnableCmd)
                .filter(|op| *op != opcodes::NO_WREN),
            erase_cmd: byte(SpiNorParam::EraseCmd)?,
            status_cmd: byte(SpiNorParam::StatusCmd)?,
            busy_bit,
            busy_active_high: chip.param(SpiNorParam::BusyState)? != 0,
            busy_polls: 0,
        })
    }
}

/// Emulated SPI NOR chip
pub struct DummyNor {
    config: DummyConfig,
    data: Vec<u8>,
    write_enabled: bool,
    busy_remaining: u32,
    stuck_busy: bool,
    frequency_khz: Option<u32>,
    status_reads: u32,
    /// Bytes the host sent in the current frame
    mosi: Vec<u8>,
    /// Bytes clocked in the current frame, sent or received
    clocked: usize,
    log: Vec<Vec<u8>>,
}

impl DummyNor {
    /// Create an erased chip with the given configuration
    ///
    /// Page and block sizes of zero are treated as one byte. A chip of size
    /// zero answers ID and status but ignores data commands.
    pub fn new(mut config: DummyConfig) -> Self {
        config.page_size = config.page_size.max(1);
        config.block_size = config.block_size.max(1);
        let data = vec![0xFF; config.size];
        Self {
            config,
            data,
            write_enabled: false,
            busy_remaining: 0,
            stuck_busy: false,
            frequency_khz: None,
            status_reads: 0,
            mosi: Vec::new(),
            clocked: 0,
            log: Vec::new(),
        }
    }

    /// Create an erased W25Q64
    pub fn new_default() -> Self {
        Self::new(DummyConfig::default())
    }

    /// Create a chip with pre-filled data
    pub fn with_data(config: DummyConfig, initial_data: &[u8]) -> Self {
        let mut flash = Self::new(config);
        let len = core::cmp::min(initial_data.len(), flash.data.len());
        flash.data[..len].copy_from_slice(&initial_data[..len]);
        flash
    }

    /// Get the configuration
    pub fn config(&self) -> &DummyConfig {
        &self.config
    }

    /// Flash contents
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Flash contents, mutably
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Whether the write enable latch is set
    pub fn write_enabled(&self) -> bool {
        self.write_enabled
    }

    /// Keep the chip busy forever (or release it)
    pub fn set_stuck_busy(&mut self, stuck: bool) {
        self.stuck_busy = stuck;
    }

    /// Last clock hint received
    pub fn frequency_khz(&self) -> Option<u32> {
        self.frequency_khz
    }

    /// Number of status register reads so far
    pub fn status_reads(&self) -> u32 {
        self.status_reads
    }

    /// Bytes sent by the host, one entry per chip select frame
    pub fn transactions(&self) -> &[Vec<u8>] {
        &self.log
    }

    /// Forget recorded transactions and status reads
    pub fn clear_log(&mut self) {
        self.log.clear();
        self.status_reads = 0;
    }

    fn is_busy(&self) -> bool {
        self.stuck_busy || self.busy_remaining > 0
    }

    fn status_byte(&self) -> u8 {
        let flag = 1u8.checked_shl(u32::from(self.config.busy_bit)).unwrap_or(0);
        let mut sr = if self.is_busy() == self.config.busy_active_high {
            flag
        } else {
            0
        };
        if self.write_enabled && self.config.busy_bit != 1 {
            sr |= opcodes::SR1_WEL;
        }
        sr
    }

    /// Byte the chip drives on MISO at the current frame position
    fn miso(&self) -> u8 {
        let Some(&cmd) = self.mosi.first() else {
            return 0xFF;
        };
        let pos = self.clocked;
        if pos == 0 {
            return 0xFF;
        }

        if cmd == self.config.read_id_cmd {
            return self.config.id.get(pos - 1).copied().unwrap_or(0x00);
        }
        if cmd == self.config.status_cmd {
            return self.status_byte();
        }
        if cmd == self.config.read_cmd {
            // Opcode, address and the dummy byte come first
            let data_start = 1 + ADDRESS_BYTES + 1;
            if pos >= data_start {
                if let Some(addr) = self.frame_address(&self.mosi) {
                    return self.data[(addr + pos - data_start) % self.data.len()];
                }
            }
        }
        0xFF
    }

    /// Clock one byte; `sent` is `None` for a read-only phase
    fn clock(&mut self, sent: Option<u8>) -> u8 {
        if let Some(byte) = sent {
            self.mosi.push(byte);
        }
        let out = self.miso();
        self.clocked += 1;
        out
    }

    /// Chip select released: act on the frame
    fn end_frame(&mut self) {
        let frame = core::mem::take(&mut self.mosi);
        self.clocked = 0;
        log::debug!("dummy: {:02X?}", frame);

        if let Some(&cmd) = frame.first() {
            self.execute(cmd, &frame);
        }
        self.log.push(frame);
    }

    fn execute(&mut self, cmd: u8, frame: &[u8]) {
        if cmd == self.config.status_cmd {
            self.status_reads += 1;
            self.busy_remaining = self.busy_remaining.saturating_sub(1);
            return;
        }
        if self.is_busy() {
            log::trace!("dummy: ignoring {:#04x} while busy", cmd);
            return;
        }

        if Some(cmd) == self.config.write_enable_cmd && frame.len() == 1 {
            self.write_enabled = true;
        } else if cmd == opcodes::WRDI && frame.len() == 1 {
            self.write_enabled = false;
        } else if cmd == self.config.erase_cmd && frame.len() >= 1 + ADDRESS_BYTES {
            self.erase(frame);
        } else if cmd == self.config.write_cmd && frame.len() >= 1 + ADDRESS_BYTES {
            self.program(frame);
        }
    }

    fn latch_ok(&mut self) -> bool {
        if self.config.write_enable_cmd.is_none() {
            return true;
        }
        let ok = self.write_enabled;
        self.write_enabled = false;
        if !ok {
            log::warn!("dummy: write enable latch not set, command ignored");
        }
        ok
    }

    fn erase(&mut self, frame: &[u8]) {
        if !self.latch_ok() {
            return;
        }
        let Some(addr) = self.frame_address(frame) else {
            return;
        };
        let start = addr - addr % self.config.block_size;
        let end = core::cmp::min(start + self.config.block_size, self.data.len());
        self.data[start..end].fill(0xFF);
        self.busy_remaining = self.config.busy_polls;
    }

    fn program(&mut self, frame: &[u8]) {
        if !self.latch_ok() {
            return;
        }
        let Some(addr) = self.frame_address(frame) else {
            return;
        };
        let page = self.config.page_size;
        let base = addr - addr % page;
        let start = addr - base;

        // Programming only clears bits and wraps within the page
        for (i, byte) in frame[1 + ADDRESS_BYTES..].iter().enumerate() {
            let at = base + (start + i) % page;
            if let Some(cell) = self.data.get_mut(at) {
                *cell &= byte;
            }
        }
        self.busy_remaining = self.config.busy_polls;
    }

    fn frame_address(&self, frame: &[u8]) -> Option<usize> {
        let a = frame.get(1..1 + ADDRESS_BYTES)?;
        let addr = (usize::from(a[0]) << 16) | (usize::from(a[1]) << 8) | usize::from(a[2]);
        addr.checked_rem(self.data.len())
    }
}

impl ErrorType for DummyNor {
    type Error = Infallible;
}

impl SpiDevice<u8> for DummyNor {
    fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), Infallible> {
        for op in operations.iter_mut() {
            match op {
                Operation::Write(bytes) => {
                    for b in bytes.iter() {
                        self.clock(Some(*b));
                    }
                }
                Operation::Read(buf) => {
                    for b in buf.iter_mut() {
                        *b = self.clock(None);
                    }
                }
                Operation::Transfer(read, write) => {
                    let n = core::cmp::max(read.len(), write.len());
                    for i in 0..n {
                        let out = self.clock(write.get(i).copied());
                        if let Some(r) = read.get_mut(i) {
                            *r = out;
                        }
                    }
                }
                Operation::TransferInPlace(buf) => {
                    for b in buf.iter_mut() {
                        *b = self.clock(Some(*b));
                    }
                }
                Operation::DelayNs(_) => {}
            }
        }
        self.end_frame();
        Ok(())
    }
}

impl SpiLink for DummyNor {
    fn set_frequency_khz(&mut self, khz: u32) -> Result<(), Infallible> {
        log::debug!("dummy: clock {} kHz", khz);
        self.frequency_khz = Some(khz);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::delay::DelayNs;
    use norprog_core::chip::SpiNorDb;
    use norprog_core::hal::poll::PollLimit;
    use norprog_core::hal::{ChipId, FlashHal, FlashStatus};
    use norprog_core::identify::identify;
    use norprog_core::HalError;
    use norprog_spi_nor::{BusyPolarity, SpiNorConfig, SpiNorHal};

    const W25Q64: &str = "W25Q64, 256, 65536, 8388608, 0xEF, 0x40, 0x17, -, -, -, \
                          0x08, 0x0B, 0x9F, 0x02, 0x06, 0xD8, 0x05, 0x00, 0x01, 0x4E20";

    /// Time source that only counts
    #[derive(Default)]
    struct CountingDelay {
        calls: u32,
        total_us: u64,
    }

    impl DelayNs for CountingDelay {
        fn delay_ns(&mut self, ns: u32) {
            self.calls += 1;
            self.total_us += u64::from(ns / 1000);
        }

        fn delay_us(&mut self, us: u32) {
            self.calls += 1;
            self.total_us += u64::from(us);
        }
    }

    fn config() -> SpiNorConfig {
        SpiNorConfig::from_chip(&SpiNorChip::from_line(W25Q64).unwrap()).unwrap()
    }

    fn hal(flash: DummyNor) -> SpiNorHal<DummyNor, CountingDelay> {
        let mut hal = SpiNorHal::new(flash, CountingDelay::default());
        hal.init(&config()).unwrap();
        hal.link_mut().clear_log();
        hal
    }

    #[test]
    fn test_identify() {
        let db = SpiNorDb::load(W25Q64).into_strict().unwrap();
        let mut hal = hal(DummyNor::new_default());
        let found = identify(&mut hal, &db).unwrap();
        assert_eq!(found.id, ChipId::new([0xEF, 0x40, 0x17, 0, 0, 0]));
        assert_eq!(found.name(), Some("W25Q64"));
        assert_eq!(found.chip.map(|(i, _)| i), Some(0));
        assert_eq!(hal.link().transactions(), &[vec![0x9F]]);
    }

    #[test]
    fn test_identify_unknown() {
        let db = SpiNorDb::load(W25Q64).into_strict().unwrap();
        let flash = DummyNor::new(DummyConfig {
            id: [0xC2, 0x20, 0x17, 0, 0, 0],
            ..DummyConfig::default()
        });
        let mut hal = hal(flash);
        let found = identify(&mut hal, &db).unwrap();
        assert!(found.chip.is_none());
        assert_eq!(found.id.manufacturer(), 0xC2);
    }

    #[test]
    fn test_not_initialized() {
        let mut hal = SpiNorHal::new(DummyNor::new_default(), CountingDelay::default());
        let mut buf = [0u8; 4];
        assert_eq!(hal.read_id(), Err(HalError::NotInitialized));
        assert_eq!(hal.erase_block(0), Err(HalError::NotInitialized));
        assert_eq!(hal.read_data(&mut buf, 0, 0, 4), Err(HalError::NotInitialized));
        assert_eq!(hal.read_status(), Err(HalError::NotInitialized));
        assert!(hal.link().transactions().is_empty());

        hal.init(&config()).unwrap();
        assert!(hal.read_id().is_ok());
        hal.uninit();
        assert_eq!(hal.read_id(), Err(HalError::NotInitialized));
    }

    #[test]
    fn test_init_applies_frequency() {
        let hal = hal(DummyNor::new_default());
        assert_eq!(hal.link().frequency_khz(), Some(20000));
    }

    #[test]
    fn test_failed_init_stays_uninitialized() {
        let mut hal = hal(DummyNor::new_default());
        let mut bad = config();
        bad.busy_bit = 9;
        assert_eq!(hal.init(&bad), Err(HalError::InvalidConfig("busy_bit")));
        assert!(hal.config().is_none());
        assert_eq!(hal.read_status(), Err(HalError::NotInitialized));

        // 0xFF is the blob's "no write enable" marker, never an opcode
        let mut bad = config();
        bad.write_enable_cmd = Some(0xFF);
        assert_eq!(hal.init(&bad), Err(HalError::InvalidConfig("write_en_cmd")));
        assert!(hal.link().transactions().is_empty());
    }

    #[test]
    fn test_degenerate_geometry() {
        let mut flash = DummyNor::new(DummyConfig {
            size: 0,
            page_size: 0,
            block_size: 0,
            ..DummyConfig::default()
        });
        assert_eq!(flash.config().page_size, 1);

        let mut id = [0u8; 6];
        flash
            .transaction(&mut [Operation::Write(&[0x9F]), Operation::Read(&mut id)])
            .unwrap();
        assert_eq!(id[..3], [0xEF, 0x40, 0x17]);

        let mut buf = [0u8; 4];
        flash.write(&[0x06]).unwrap();
        flash.write(&[0x02, 0x00, 0x00, 0x00, 0x00]).unwrap();
        flash.write(&[0xD8, 0x00, 0x00, 0x00]).unwrap();
        flash
            .transaction(&mut [
                Operation::Write(&[0x0B, 0x00, 0x00, 0x00, 0xA5]),
                Operation::Read(&mut buf),
            ])
            .unwrap();
        assert_eq!(buf, [0xFF; 4]);
        assert!(flash.data().is_empty());

        let mut sr = [0u8; 1];
        let mut wide = DummyNor::new(DummyConfig {
            busy_bit: 12,
            ..DummyConfig::default()
        });
        wide.transaction(&mut [Operation::Write(&[0x05]), Operation::Read(&mut sr)])
            .unwrap();
        assert_eq!(sr[0], 0);
    }

    #[test]
    fn test_erase_wire_sequence() {
        let mut flash = DummyNor::new_default();
        flash.data_mut()[0x10000..0x10010].fill(0x00);
        let mut hal = hal(flash);

        // Block 1 starts at page 256
        hal.erase_block(256).unwrap();
        let (flash, _) = hal.release();
        assert_eq!(
            flash.transactions(),
            &[vec![0x06], vec![0xD8, 0x01, 0x00, 0x00], vec![0x05]]
        );
        assert!(flash.data()[0x10000..0x20000].iter().all(|&b| b == 0xFF));
        assert!(!flash.write_enabled());
    }

    #[test]
    fn test_program_and_read_back() {
        let mut hal = hal(DummyNor::new_default());
        let page: Vec<u8> = (0..=255u8).collect();
        hal.write_page_async(&page, 3, 256).unwrap();
        hal.wait_ready().unwrap();

        let mut buf = [0u8; 256];
        hal.read_page(&mut buf, 3, 256).unwrap();
        assert_eq!(&buf[..], &page[..]);

        let mut part = [0u8; 4];
        hal.read_data(&mut part, 3, 0x10, 4).unwrap();
        assert_eq!(part, [0x10, 0x11, 0x12, 0x13]);

        let log = hal.link().transactions();
        assert_eq!(log[0], vec![0x06]);
        assert_eq!(&log[1][..4], &[0x02, 0x00, 0x03, 0x00]);
        assert_eq!(log[1].len(), 4 + 256);
        // Read: opcode, address, dummy byte; nothing else is sent
        assert_eq!(log.last().unwrap(), &vec![0x0B, 0x00, 0x03, 0x10, 0xA5]);
    }

    #[test]
    fn test_program_only_clears_bits() {
        let mut flash = DummyNor::new_default();
        flash.data_mut()[0] = 0xF0;
        let mut hal = hal(flash);
        let mut page = [0xFFu8; 256];
        page[0] = 0x3C;
        hal.write_page_async(&page, 0, 256).unwrap();
        let (flash, _) = hal.release();
        assert_eq!(flash.data()[0], 0x30);
    }

    #[test]
    fn test_program_wraps_within_page() {
        let mut flash = DummyNor::new_default();
        flash.write_enabled = true;
        flash
            .transaction(&mut [Operation::Write(&[0x02, 0x00, 0x01, 0xFE, 0x11, 0x22, 0x33])])
            .unwrap();
        assert_eq!(&flash.data()[0x1FE..0x200], &[0x11, 0x22]);
        assert_eq!(flash.data()[0x100], 0x33);
        assert_eq!(flash.data()[0x200], 0xFF);
    }

    #[test]
    fn test_program_needs_write_enable() {
        let mut flash = DummyNor::new_default();
        flash
            .transaction(&mut [Operation::Write(&[0x02, 0x00, 0x00, 0x00, 0x00])])
            .unwrap();
        assert_eq!(flash.data()[0], 0xFF);
    }

    #[test]
    fn test_busy_polling() {
        let flash = DummyNor::new(DummyConfig {
            busy_polls: 3,
            ..DummyConfig::default()
        });
        let mut hal = hal(flash);
        hal.erase_block(0).unwrap();
        // Three busy reads, then ready
        assert_eq!(hal.link().status_reads(), 4);
        assert_eq!(hal.read_status(), Ok(FlashStatus::Ready));
    }

    #[test]
    fn test_poll_interval_uses_delay() {
        let flash = DummyNor::new(DummyConfig {
            busy_polls: 2,
            ..DummyConfig::default()
        });
        let mut hal = hal(flash).with_poll_limit(PollLimit {
            max_polls: 10,
            interval_us: 100,
        });
        hal.erase_block(0).unwrap();
        let (_, delay) = hal.release();
        assert_eq!(delay.calls, 2);
        assert_eq!(delay.total_us, 200);
    }

    #[test]
    fn test_stuck_busy_times_out() {
        let mut flash = DummyNor::new_default();
        flash.set_stuck_busy(true);
        let mut hal = hal(flash).with_poll_limit(PollLimit {
            max_polls: 50,
            interval_us: 0,
        });
        assert_eq!(hal.wait_ready(), Err(HalError::Timeout));
        assert_eq!(hal.link().status_reads(), 50);
        assert_eq!(hal.read_status(), Ok(FlashStatus::Busy));
    }

    #[test]
    fn test_no_write_enable_opcode() {
        let flash = DummyNor::new(DummyConfig {
            write_enable_cmd: None,
            ..DummyConfig::default()
        });
        let mut hal = SpiNorHal::new(flash, CountingDelay::default());
        let mut cfg = config();
        cfg.write_enable_cmd = None;
        hal.init(&cfg).unwrap();
        hal.link_mut().clear_log();

        hal.write_page_async(&[0x00; 256], 0, 256).unwrap();
        let (flash, _) = hal.release();
        assert_eq!(flash.transactions().len(), 1);
        assert_eq!(flash.transactions()[0][0], 0x02);
        assert!(flash.data()[..256].iter().all(|&b| b == 0x00));
    }

    #[test]
    fn test_active_low_busy() {
        let flash = DummyNor::new(DummyConfig {
            busy_bit: 7,
            busy_active_high: false,
            busy_polls: 1,
            ..DummyConfig::default()
        });
        let mut hal = SpiNorHal::new(flash, CountingDelay::default());
        let mut cfg = config();
        cfg.busy_bit = 7;
        cfg.busy_polarity = BusyPolarity::ActiveLow;
        hal.init(&cfg).unwrap();

        assert_eq!(hal.read_status(), Ok(FlashStatus::Ready));
        hal.write_page_async(&[0xAA; 256], 0, 256).unwrap();
        assert_eq!(hal.read_status(), Ok(FlashStatus::Busy));
        assert_eq!(hal.read_status(), Ok(FlashStatus::Ready));
    }

    #[test]
    fn test_argument_checks() {
        let mut hal = hal(DummyNor::new_default());
        let mut small = [0u8; 8];
        assert_eq!(
            hal.read_data(&mut small, 0, 0, 16),
            Err(HalError::BufferTooSmall { needed: 16, len: 8 })
        );
        assert_eq!(
            hal.write_page_async(&small, 0, 256),
            Err(HalError::BufferTooSmall {
                needed: 256,
                len: 8
            })
        );
        assert_eq!(
            hal.erase_block(0x10000),
            Err(HalError::AddressOutOfRange {
                page: 0x10000,
                offset: 0
            })
        );
        assert!(hal.read_data(&mut small, 0xFFFF, 0xF8, 8).is_ok());
        assert_eq!(hal.link().transactions().len(), 1);
        assert_eq!(
            hal.read_spare_data(&mut small, 0, 0, 8),
            Err(HalError::Unsupported)
        );
        assert!(!hal.is_bad_block_aware());
    }

    #[test]
    fn test_config_from_chip_record() {
        let chip = SpiNorChip::from_line(
            "MX25L8005, 256, 65536, 1048576, 0xC2, 0x20, 0x14, -, -, -, \
             0x08, 0x03, 0x9F, 0x02, 0xFF, 0x20, 0x05, 0x00, 0x01, -",
        )
        .unwrap();
        let config = DummyConfig::from_chip(&chip).unwrap();
        assert_eq!(config.id, [0xC2, 0x20, 0x14, 0, 0, 0]);
        assert_eq!(config.size, 1 << 20);
        assert_eq!(config.read_cmd, 0x03);
        assert_eq!(config.write_enable_cmd, None);
        assert!(config.busy_active_high);

        let mut broken = chip.clone();
        broken.set_param(SpiNorParam::StatusCmd, None);
        assert!(DummyConfig::from_chip(&broken).is_none());
    }
}
