// =============================================================================
// Node Arena
// =============================================================================
//
// Every trie node lives in one arena and is addressed by a 32-bit `NodeId`.
// Node `i` owns the child slots `children[i * fanout..(i + 1) * fanout]`; a
// slot holds `NodeId::NULL` until a key with that prefix is inserted. Every
// node carries the full fan-out, terminal nodes included.
//
// Node 0 is the root. Its value and terminal flag are never used.

use crate::error::{IndexError, Result};
use crate::segment::SegmentWidth;

/// Upper bound on child slots reserved up front from a capacity hint.
const MAX_PRESIZED_SLOTS: usize = 1 << 20;

/// Index of a node in the arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(transparent)]
pub(crate) struct NodeId(u32);

impl NodeId {
    pub(crate) const NULL: NodeId = NodeId(u32::MAX);
    pub(crate) const ROOT: NodeId = NodeId(0);

    #[inline]
    pub(crate) fn is_null(self) -> bool {
        self == Self::NULL
    }

    #[inline]
    fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone)]
pub(crate) struct NodeArena {
    width: SegmentWidth,
    children: Vec<NodeId>,
    values: Vec<i8>,
    terminal: Vec<bool>,
    /// Number of terminal nodes, i.e. distinct keys.
    terminal_count: usize,
}

impl NodeArena {
    /// Arena holding only the root, without a capacity reservation.
    pub(crate) fn root_only(width: SegmentWidth) -> Self {
        Self {
            width,
            children: vec![NodeId::NULL; width.fanout()],
            values: vec![0],
            terminal: vec![false],
            terminal_count: 0,
        }
    }

    /// Create an arena holding only the root node.
    pub(crate) fn new(width: SegmentWidth, capacity: usize) -> Result<Self> {
        let capacity = capacity.max(1);
        let mut arena = Self {
            width,
            children: Vec::new(),
            values: Vec::new(),
            terminal: Vec::new(),
            terminal_count: 0,
        };
        arena.children.try_reserve(
            capacity
                .saturating_mul(width.fanout())
                .min(MAX_PRESIZED_SLOTS.max(width.fanout())),
        )?;
        arena.values.try_reserve(capacity)?;
        arena.terminal.try_reserve(capacity)?;
        arena.alloc_node()?;
        Ok(arena)
    }

    #[inline]
    pub(crate) fn width(&self) -> SegmentWidth {
        self.width
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.terminal_count
    }

    #[inline]
    pub(crate) fn node_count(&self) -> usize {
        self.values.len()
    }

    pub(crate) fn memory_usage(&self) -> usize {
        self.children.capacity() * std::mem::size_of::<NodeId>()
            + self.values.capacity() * std::mem::size_of::<i8>()
            + self.terminal.capacity() * std::mem::size_of::<bool>()
    }

    pub(crate) fn shrink_to_fit(&mut self) {
        self.children.shrink_to_fit();
        self.values.shrink_to_fit();
        self.terminal.shrink_to_fit();
    }

    /// Append a node with every child slot empty.
    ///
    /// All reservations happen before any push, so a failed allocation leaves
    /// the arena as it was.
    fn alloc_node(&mut self) -> Result<NodeId> {
        let id = self.values.len();
        if id >= NodeId::NULL.index() {
            return Err(IndexError::CapacityExceeded);
        }
        let fanout = self.width.fanout();
        self.children.try_reserve(fanout)?;
        self.values.try_reserve(1)?;
        self.terminal.try_reserve(1)?;

        self.children.resize(self.children.len() + fanout, NodeId::NULL);
        self.values.push(0);
        self.terminal.push(false);
        Ok(NodeId(id as u32))
    }

    #[inline]
    pub(crate) fn child(&self, node: NodeId, slot: usize) -> NodeId {
        self.children[node.index() * self.width.fanout() + slot]
    }

    #[inline]
    fn set_child(&mut self, node: NodeId, slot: usize, child: NodeId) {
        let fanout = self.width.fanout();
        self.children[node.index() * fanout + slot] = child;
    }

    #[inline]
    pub(crate) fn is_terminal(&self, node: NodeId) -> bool {
        self.terminal[node.index()]
    }

    #[inline]
    pub(crate) fn value(&self, node: NodeId) -> i8 {
        self.values[node.index()]
    }

    /// Build the path for `key` (one node per missing prefix) and store
    /// `value` in its terminal node. Returns the value it replaced, if any.
    pub(crate) fn insert(&mut self, key: u64, value: i8) -> Result<Option<i8>> {
        let mut node = NodeId::ROOT;
        for level in 0..self.width.max_depth() {
            let slot = self.width.segment_of(key, level);
            let mut child = self.child(node, slot);
            if child.is_null() {
                child = self.alloc_node()?;
                // Attach before descending, otherwise the new branch is lost.
                self.set_child(node, slot, child);
            }
            node = child;
        }

        let i = node.index();
        let old = if self.terminal[i] {
            Some(self.values[i])
        } else {
            self.terminal[i] = true;
            self.terminal_count += 1;
            None
        };
        self.values[i] = value;
        Ok(old)
    }

    /// Terminal node for `key`, if its full path exists.
    pub(crate) fn find(&self, key: u64) -> Option<NodeId> {
        let mut node = NodeId::ROOT;
        for level in 0..self.width.max_depth() {
            node = self.child(node, self.width.segment_of(key, level));
            if node.is_null() {
                return None;
            }
        }
        if self.is_terminal(node) {
            Some(node)
        } else {
            None
        }
    }

    pub(crate) fn read(&self, key: u64) -> Result<i8> {
        self.find(key)
            .map(|node| self.value(node))
            .ok_or(IndexError::KeyNotFound(key))
    }

    pub(crate) fn update(&mut self, key: u64, value: i8) -> Result<i8> {
        let node = self.find(key).ok_or(IndexError::KeyNotFound(key))?;
        Ok(std::mem::replace(&mut self.values[node.index()], value))
    }

    /// Visit up to `limit` terminal entries, starting at `key`'s slot on every
    /// level and walking sibling slots in increasing index order.
    pub(crate) fn scan<F>(&self, key: u64, limit: usize, visit: &mut F)
    where
        F: FnMut(u64, i8),
    {
        if limit == 0 {
            return;
        }
        let mut remaining = limit;
        self.scan_from(NodeId::ROOT, key, 0, 0, &mut remaining, visit);
    }

    fn scan_from<F>(
        &self,
        node: NodeId,
        key: u64,
        level: usize,
        prefix: u64,
        remaining: &mut usize,
        visit: &mut F,
    ) where
        F: FnMut(u64, i8),
    {
        if level == self.width.max_depth() {
            debug_assert!(self.is_terminal(node));
            visit(prefix, self.value(node));
            *remaining -= 1;
            return;
        }

        let start = self.width.segment_of(key, level);
        for slot in start..self.width.fanout() {
            let child = self.child(node, slot);
            if child.is_null() {
                continue;
            }
            let prefix = self.width.with_segment(prefix, level, slot);
            self.scan_from(child, key, level + 1, prefix, remaining, visit);
            if *remaining == 0 {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arena(bits: u32) -> NodeArena {
        NodeArena::new(SegmentWidth::new(bits).unwrap(), 16).unwrap()
    }

    #[test]
    fn test_root_only() {
        let a = arena(4);
        assert_eq!(a.node_count(), 1);
        assert_eq!(a.len(), 0);
        for slot in 0..16 {
            assert!(a.child(NodeId::ROOT, slot).is_null());
        }
    }

    #[test]
    fn test_insert_attaches_branch() {
        let mut a = arena(4);
        a.insert(0x1, 1).unwrap();

        // One node per level below the root.
        assert_eq!(a.node_count(), 1 + 16);
        let first = a.child(NodeId::ROOT, 1);
        assert!(!first.is_null());
        assert!(a.find(0x1).is_some());
    }

    #[test]
    fn test_shared_prefix_allocates_once() {
        let mut a = arena(4);
        a.insert(0x01, 1).unwrap();
        a.insert(0x11, 1).unwrap();
        // Keys share segment 0 only, so the second insert adds 15 nodes.
        assert_eq!(a.node_count(), 1 + 16 + 15);
        assert_eq!(a.len(), 2);
    }

    #[test]
    fn test_partial_path_is_not_a_key() {
        let mut a = arena(8);
        a.insert(0x0102, 5).unwrap();
        assert!(a.find(0x02).is_none());
        assert!(a.find(0x0202).is_none());
        assert_eq!(a.read(0x0302), Err(IndexError::KeyNotFound(0x0302)));
    }

    #[test]
    fn test_scan_reconstructs_keys() {
        let mut a = arena(8);
        a.insert(0x00FF, 1).unwrap();
        a.insert(0x01FF, 2).unwrap();

        let mut seen = Vec::new();
        a.scan(0x00FF, 10, &mut |k, v| seen.push((k, v)));
        assert_eq!(seen, vec![(0x00FF, 1), (0x01FF, 2)]);
    }

    #[test]
    fn test_memory_grows_with_fanout() {
        let mut small = arena(4);
        let mut large = arena(8);
        small.insert(7, 1).unwrap();
        large.insert(7, 1).unwrap();
        small.shrink_to_fit();
        large.shrink_to_fit();
        assert_eq!(small.memory_usage(), 17 * (16 * 4 + 2));
        assert_eq!(large.memory_usage(), 9 * (256 * 4 + 2));
    }
}
