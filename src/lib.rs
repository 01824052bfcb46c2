//! # radix-index
//!
//! A point/range index over `u64` keys holding `i8` values, stored as a
//! fixed-depth multiway digit trie.
//!
//! Each key is split into `64 / width` segments of `width` bits, least
//! significant segment first. Every level of the trie consumes one segment, so
//! every key sits exactly `max_depth` levels below the root. Nodes carry their
//! full fan-out (`2^width` slots) and live in a single arena.
//!
//! ## Example
//!
//! ```rust
//! use radix_index::{Index, IndexError};
//!
//! let mut index = Index::new();
//! index.insert(0x11, 1).unwrap();
//! assert_eq!(index.read(0x11), Ok(1));
//!
//! index.update(0x11, 9).unwrap();
//! assert_eq!(index.read(0x11), Ok(9));
//!
//! assert_eq!(index.read(0x12), Err(IndexError::KeyNotFound(0x12)));
//! ```

#![deny(unsafe_op_in_unsafe_fn)]

mod error;
mod node;
pub mod segment;

pub use error::{IndexError, Result};
pub use segment::SegmentWidth;

use node::NodeArena;

/// Configuration for an [`Index`].
#[derive(Debug, Clone)]
pub struct Config {
    /// Bits of the key consumed per trie level. One of 1, 2, 4, 8, 16.
    pub segment_width: u32,
    /// Number of nodes to reserve space for up front.
    pub initial_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            segment_width: 4,
            initial_capacity: 1024,
        }
    }
}

// =============================================================================
// Index
// =============================================================================

/// Fixed-depth digit trie over `u64` keys.
///
/// The root is created once with the index and never replaced. Keys cannot be
/// removed; memory is released only when the index is dropped.
#[derive(Clone)]
pub struct Index {
    nodes: NodeArena,
}

impl Index {
    /// Create an empty index with 4-bit segments (16-way branching).
    pub fn new() -> Self {
        Self {
            nodes: NodeArena::root_only(SegmentWidth::NIBBLE),
        }
    }

    /// Create an empty index branching on `bits`-wide segments.
    pub fn with_segment_width(bits: u32) -> Result<Self> {
        Self::with_config(Config {
            segment_width: bits,
            ..Config::default()
        })
    }

    /// Create an empty index with the given configuration.
    pub fn with_config(config: Config) -> Result<Self> {
        let width = SegmentWidth::new(config.segment_width)?;
        Ok(Self {
            nodes: NodeArena::new(width, config.initial_capacity)?,
        })
    }

    /// Insert `key` with `value`, overwriting any earlier value.
    ///
    /// Returns the previous value if the key already existed. On allocation
    /// failure the key is not inserted; interior nodes created before the
    /// failure stay attached and are reused by later inserts.
    pub fn insert(&mut self, key: u64, value: i8) -> Result<Option<i8>> {
        self.nodes.insert(key, value)
    }

    /// Overwrite the value of an existing key, returning the old value.
    pub fn update(&mut self, key: u64, value: i8) -> Result<i8> {
        self.nodes.update(key, value)
    }

    /// Value stored for `key`, or [`IndexError::KeyNotFound`].
    pub fn read(&self, key: u64) -> Result<i8> {
        self.nodes.read(key)
    }

    /// Value stored for `key`, if any.
    pub fn get(&self, key: u64) -> Option<i8> {
        self.nodes.read(key).ok()
    }

    /// Check if `key` has been inserted.
    pub fn contains_key(&self, key: u64) -> bool {
        self.nodes.find(key).is_some()
    }

    /// Collect up to `count` entries starting from `key`.
    ///
    /// The traversal is structural: at every level it starts at `key`'s
    /// segment for that level and walks sibling slots in increasing slot
    /// order, least-significant segment first. Entries therefore do not come
    /// back in ascending numeric order. A `count` of zero or less returns an
    /// empty result without touching the trie.
    pub fn scan(&self, key: u64, count: i64) -> Vec<(u64, i8)> {
        let mut out = Vec::new();
        self.scan_with(key, count, |k, v| out.push((k, v)));
        out
    }

    /// Like [`scan`](Self::scan), but hands each entry to `visit` instead of
    /// collecting. Returns the number of entries visited.
    pub fn scan_with<F>(&self, key: u64, count: i64, mut visit: F) -> usize
    where
        F: FnMut(u64, i8),
    {
        if count <= 0 {
            return 0;
        }
        let limit = usize::try_from(count).unwrap_or(usize::MAX);
        let mut visited = 0usize;
        self.nodes.scan(key, limit, &mut |k, v| {
            visited += 1;
            visit(k, v);
        });
        visited
    }

    /// Number of distinct keys.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of nodes in the arena, root included.
    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.node_count()
    }

    #[inline]
    pub fn segment_width(&self) -> SegmentWidth {
        self.nodes.width()
    }

    /// Levels between the root and a terminal node.
    #[inline]
    pub fn max_depth(&self) -> usize {
        self.nodes.width().max_depth()
    }

    /// Bytes reserved by the node arena.
    pub fn memory_usage(&self) -> usize {
        self.nodes.memory_usage()
    }

    pub fn shrink_to_fit(&mut self) {
        self.nodes.shrink_to_fit();
    }
}

impl Default for Index {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Index {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Index")
            .field("segment_width", &self.segment_width().bits())
            .field("len", &self.len())
            .field("nodes", &self.node_count())
            .finish()
    }
}


#[cfg(test)]
mod proptests;
