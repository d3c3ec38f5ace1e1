//! Chip identification
//!
//! Reads the identification bytes through a driver and looks them up in a
//! chip database.

use crate::chip::{ChipDb, ChipInfo, ParamSet};
use crate::error::HalError;
use crate::hal::{ChipId, FlashHal};

/// Outcome of [`identify`]
#[derive(Debug, Clone, Copy)]
pub struct Identification<'a, P: ParamSet> {
    /// Bytes read from the chip
    pub id: ChipId,
    /// Matching database entry and its index, if any
    pub chip: Option<(usize, &'a ChipInfo<P>)>,
}

impl<P: ParamSet> Identification<'_, P> {
    /// Name of the matched chip
    pub fn name(&self) -> Option<&str> {
        self.chip.map(|(_, c)| c.name())
    }
}

/// Read the chip's ID bytes and find the first matching database entry
///
/// The driver must already be initialized. An unknown chip is not an error;
/// `chip` is `None` in that case.
pub fn identify<'a, H, P>(
    hal: &mut H,
    db: &'a ChipDb<P>,
) -> Result<Identification<'a, P>, HalError<H::Error>>
where
    H: FlashHal + ?Sized,
    P: ParamSet,
{
    let id = hal.read_id()?;
    let chip = db.find_by_id(&id);

    match chip {
        Some((index, c)) => log::info!("Found {} {} (#{}), ID {}", P::FAMILY, c.name(), index, id),
        None if id.is_blank() => log::warn!("No chip response, ID {}", id),
        None => log::info!("Unknown {} chip, ID {}", P::FAMILY, id),
    }

    Ok(Identification { id, chip })
}
