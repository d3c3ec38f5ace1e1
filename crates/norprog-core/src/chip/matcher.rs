//! Identification byte matching
//!
//! A probe is compared against a descriptor's ID slots in order. The leading
//! mandatory slots must be defined and equal. After that, the first slot the
//! descriptor leaves undefined ends the comparison with a match, so a record
//! can describe a whole family by leaving its trailing ID bytes out.

use super::param::ParamSet;
use super::types::ChipInfo;

/// Compare `probe` against the ID slots of `chip`
///
/// Only the first `min(probe.len(), ID_SLOTS.len())` slots take part. Fewer
/// than the family's mandatory slots never match.
pub fn matches<P: ParamSet>(chip: &ChipInfo<P>, probe: &[u8]) -> bool {
    let n = probe.len().min(P::ID_SLOTS.len());
    if n < P::MANDATORY_IDS {
        return false;
    }

    for (i, (slot, byte)) in P::ID_SLOTS.iter().zip(probe).take(n).enumerate() {
        match chip.param(*slot) {
            Some(value) if value == u64::from(*byte) => {}
            Some(_) => return false,
            None if i < P::MANDATORY_IDS => return false,
            None => return true,
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chip::SpiNorParam;

    fn chip(ids: &[Option<u64>]) -> ChipInfo<SpiNorParam> {
        let mut chip = ChipInfo::new("T", 256, 4096, 65536).unwrap();
        for (slot, id) in SpiNorParam::ID_SLOTS.iter().zip(ids) {
            chip.set_param(*slot, *id);
        }
        chip
    }

    #[test]
    fn test_exact_match() {
        let c = chip(&[Some(0xEF), Some(0x40), Some(0x17)]);
        assert!(matches(&c, &[0xEF, 0x40, 0x17]));
        assert!(matches(&c, &[0xEF, 0x40, 0x17, 0x00, 0x00]));
        assert!(!matches(&c, &[0xEF, 0x40, 0x18]));
        assert!(!matches(&c, &[0xC2, 0x40, 0x17]));
    }

    #[test]
    fn test_undefined_slot_ends_comparison() {
        let c = chip(&[Some(0xEF), Some(0x40)]);
        assert!(matches(&c, &[0xEF, 0x40, 0x17, 0xAA, 0xBB]));
        assert!(matches(&c, &[0xEF, 0x40, 0x99]));

        // Slots after a hole are never looked at
        let c = chip(&[Some(0xEF), Some(0x40), None, Some(0x55)]);
        assert!(matches(&c, &[0xEF, 0x40, 0x17, 0x00]));
    }

    #[test]
    fn test_mandatory_slots_must_be_defined() {
        let c = chip(&[Some(0xEF)]);
        assert!(!matches(&c, &[0xEF, 0x40, 0x17]));
        let c = chip(&[None, Some(0x40)]);
        assert!(!matches(&c, &[0xEF, 0x40]));
    }

    #[test]
    fn test_short_probe() {
        let c = chip(&[Some(0xEF), Some(0x40), Some(0x17)]);
        assert!(!matches(&c, &[]));
        assert!(!matches(&c, &[0xEF]));
        // Only the probed prefix is compared
        assert!(matches(&c, &[0xEF, 0x40]));
    }

    #[test]
    fn test_full_length_match() {
        let c = chip(&[
            Some(1),
            Some(2),
            Some(3),
            Some(4),
            Some(5),
            Some(6),
        ]);
        assert!(matches(&c, &[1, 2, 3, 4, 5, 6]));
        assert!(matches(&c, &[1, 2, 3, 4, 5]));
        assert!(!matches(&c, &[1, 2, 3, 4, 5, 7]));
    }

    #[test]
    fn test_defined_value_wider_than_byte() {
        let c = chip(&[Some(0xEF), Some(0x140)]);
        assert!(!matches(&c, &[0xEF, 0x40]));
    }
}
