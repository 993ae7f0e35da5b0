//! Sparse patch-list codec for the trade-block party region
//!
//! The serial layer cannot carry 0xFE as payload (it is the no-data filler),
//! so after the bulk exchange each side sends a patch list: the 1-based
//! positions inside its 264-byte party-record region that must be restored
//! to 0xFE on the receiving side. One marker byte addresses one position.
//! Because a single byte cannot address all 264 positions, the list is split
//! in two halves by a 0xFF terminator: part-1 markers 0x01-0xFC cover
//! offsets 0-0xFB, part-2 markers cover offset 0xFB + marker. A 0x00 marker
//! is a no-op, and the stream past the second terminator is all 0x00.
//!
//! Building a list walks the whole block, so it is kept off the bit-clocked
//! path: the session flags a rebuild and [`TradeSession::service`] performs
//! it from a non-time-critical task.
//!
//! [`TradeSession::service`]: crate::session::TradeSession::service

use alloc::vec::Vec;

use crate::block::{PATCH_REGION_LEN, TradeBlock};
use crate::protocol::{BLANK, NO_DATA, PATCH_PART_TERMINATOR};

/// Highest offset addressable by a part-1 marker, exclusive
pub const PART_1_LEN: usize = 0xFC;

/// Encoded patch-marker stream for one outgoing trade block
pub struct PatchList {
    markers: Vec<u8>,
}

impl PatchList {
    /// List with no markers, not even terminators
    ///
    /// Placeholder for a torn-down session; never transmitted.
    pub const fn empty() -> Self {
        Self { markers: Vec::new() }
    }

    /// Encode the patch list for `block`'s party region
    pub fn build(block: &TradeBlock) -> Self {
        let region = block.patch_region();
        let mut markers = Vec::new();

        for (offset, &byte) in region[..PART_1_LEN].iter().enumerate() {
            if byte == NO_DATA {
                markers.push((offset + 1) as u8);
            }
        }
        markers.push(PATCH_PART_TERMINATOR);
        for (offset, &byte) in region[PART_1_LEN..].iter().enumerate() {
            if byte == NO_DATA {
                markers.push((offset + 1) as u8);
            }
        }
        markers.push(PATCH_PART_TERMINATOR);

        Self { markers }
    }

    /// Marker stream byte at `index`; 0x00 once the stream is exhausted
    #[inline]
    pub fn get(&self, index: usize) -> u8 {
        self.markers.get(index).copied().unwrap_or(BLANK)
    }

    /// Encoded stream length including both terminators
    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// Apply one received marker to an incoming scratch block.
    ///
    /// `part_two` is the phase-local addressing flag: it flips when the
    /// part terminator arrives and selects the offset base for later
    /// markers. Markers addressing past the party region are ignored; a
    /// conforming peer never sends them.
    pub fn apply_marker(block: &mut TradeBlock, part_two: &mut bool, marker: u8) {
        match marker {
            BLANK => {}
            PATCH_PART_TERMINATOR => *part_two = true,
            _ => {
                let offset = if *part_two {
                    PART_1_LEN - 1 + marker as usize
                } else {
                    marker as usize - 1
                };
                if offset < PATCH_REGION_LEN {
                    block.patch_region_mut()[offset] = NO_DATA;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn block_with_filler_at(offsets: &[usize]) -> TradeBlock {
        let mut block = TradeBlock::zeroed();
        for &offset in offsets {
            block.patch_region_mut()[offset] = NO_DATA;
        }
        block
    }

    #[test]
    fn test_clean_block_is_two_terminators() {
        let plist = PatchList::build(&TradeBlock::zeroed());
        assert_eq!(plist.len(), 2);
        assert_eq!(plist.get(0), 0xFF);
        assert_eq!(plist.get(1), 0xFF);
        // Exhausted stream reads as blank forever.
        assert_eq!(plist.get(2), 0x00);
        assert_eq!(plist.get(500), 0x00);
    }

    #[test]
    fn test_part_one_markers_are_one_based() {
        let plist = PatchList::build(&block_with_filler_at(&[0, 5, 0xFB]));
        assert_eq!(plist.get(0), 0x01);
        assert_eq!(plist.get(1), 0x06);
        assert_eq!(plist.get(2), 0xFC);
        assert_eq!(plist.get(3), 0xFF);
        assert_eq!(plist.get(4), 0xFF);
    }

    #[test]
    fn test_part_two_markers_rebase_past_terminator() {
        // Offsets 0xFC and 263 live in part 2.
        let plist = PatchList::build(&block_with_filler_at(&[0xFC, 263]));
        assert_eq!(plist.get(0), 0xFF);
        assert_eq!(plist.get(1), 0x01);
        assert_eq!(plist.get(2), (263 - 0xFB) as u8);
        assert_eq!(plist.get(3), 0xFF);
    }

    #[test]
    fn test_apply_marker_restores_filler() {
        let mut scratch = TradeBlock::zeroed();
        let mut part_two = false;

        PatchList::apply_marker(&mut scratch, &mut part_two, 0x06);
        assert_eq!(scratch.patch_region()[5], NO_DATA);

        PatchList::apply_marker(&mut scratch, &mut part_two, 0xFF);
        assert!(part_two);
        PatchList::apply_marker(&mut scratch, &mut part_two, 0x01);
        assert_eq!(scratch.patch_region()[0xFC], NO_DATA);

        // Blank markers change nothing.
        PatchList::apply_marker(&mut scratch, &mut part_two, 0x00);
        assert_eq!(scratch.filler_count(), 2);
    }

    proptest! {
        /// Round-trip law: decoding an encoded list onto a clean scratch
        /// block reproduces exactly the filler positions of the source.
        #[test]
        fn prop_encode_decode_round_trip(
            offsets in proptest::collection::btree_set(0usize..PATCH_REGION_LEN, 0..40)
        ) {
            let offsets: Vec<usize> = offsets.into_iter().collect();
            let block = block_with_filler_at(&offsets);
            let plist = PatchList::build(&block);

            let mut scratch = TradeBlock::zeroed();
            let mut part_two = false;
            for i in 0..plist.len() {
                PatchList::apply_marker(&mut scratch, &mut part_two, plist.get(i));
            }

            prop_assert_eq!(scratch.patch_region(), block.patch_region());
        }
    }
}
