//! Key decomposition into fixed-width segments.
//!
//! A 64-bit key is consumed least-significant segment first: segment `i`
//! covers bits `[width * i, width * (i + 1))`.

use crate::error::{IndexError, Result};

/// Number of bits in a key.
pub const KEY_BITS: u32 = u64::BITS;

/// Widths accepted by [`SegmentWidth::new`].
pub const SUPPORTED_WIDTHS: [u32; 5] = [1, 2, 4, 8, 16];

/// Bits consumed per trie level. Always divides 64.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SegmentWidth(u32);

impl SegmentWidth {
    /// 16-way branching, 16 levels.
    pub const NIBBLE: SegmentWidth = SegmentWidth(4);
    /// 256-way branching, 8 levels.
    pub const BYTE: SegmentWidth = SegmentWidth(8);

    pub fn new(bits: u32) -> Result<Self> {
        if SUPPORTED_WIDTHS.contains(&bits) {
            Ok(SegmentWidth(bits))
        } else {
            Err(IndexError::InvalidSegmentWidth(bits))
        }
    }

    #[inline]
    pub fn bits(self) -> u32 {
        self.0
    }

    /// Child slots per node (`2^width`).
    #[inline]
    pub fn fanout(self) -> usize {
        1usize << self.0
    }

    /// Levels from the root to a terminal node.
    #[inline]
    pub fn max_depth(self) -> usize {
        (KEY_BITS / self.0) as usize
    }

    #[inline]
    fn mask(self) -> u64 {
        (1u64 << self.0) - 1
    }

    /// Slot index of `key` at `level`.
    #[inline]
    pub fn segment_of(self, key: u64, level: usize) -> usize {
        debug_assert!(level < self.max_depth());
        ((key >> (self.0 as usize * level)) & self.mask()) as usize
    }

    /// Returns `key` with the segment at `level` replaced by `slot`.
    #[inline]
    pub fn with_segment(self, key: u64, level: usize, slot: usize) -> u64 {
        debug_assert!(slot < self.fanout());
        let shift = self.0 as usize * level;
        (key & !(self.mask() << shift)) | ((slot as u64) << shift)
    }
}

impl Default for SegmentWidth {
    fn default() -> Self {
        SegmentWidth::NIBBLE
    }
}
