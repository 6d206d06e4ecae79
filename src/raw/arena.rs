use super::handle::Handle;

#[cfg(test)]
const BASELINE: usize = 4;
#[cfg(not(test))]
const BASELINE: usize = 64;

/// Block-based bump allocator for tree nodes.
///
/// Storage is an ordered list of blocks: the first holds `BASELINE` slots and
/// every later block doubles the capacity of the one before it. A block is
/// never resized or moved once created, so a handle stays valid for the life
/// of the arena. There is no per-slot free operation - the tree only grows -
/// and teardown drops every constructed element in allocation order before
/// releasing the blocks themselves.
pub(crate) struct Arena<T> {
    blocks: Vec<Vec<T>>,
    len: usize,
}

impl<T> Arena<T> {
    pub(crate) const fn new() -> Self {
        Self {
            blocks: Vec::new(),
            len: 0,
        }
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        let mut arena = Self::new();
        while arena.capacity() < capacity {
            arena.grow();
        }
        arena
    }

    /// Total slot count across all blocks: `BASELINE * (2^blocks - 1)`.
    pub(crate) fn capacity(&self) -> usize {
        BASELINE * ((1usize << self.blocks.len()) - 1)
    }

    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    pub(crate) const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Maps a dense slot index to its (block, offset) coordinates.
    ///
    /// Block `i` starts at slot `BASELINE * (2^i - 1)` and holds
    /// `BASELINE << i` slots, so the block is recoverable from the index
    /// arithmetically.
    const fn locate(index: usize) -> (usize, usize) {
        let block = (index / BASELINE + 1).ilog2() as usize;
        let offset = index - BASELINE * ((1 << block) - 1);
        (block, offset)
    }

    /// Appends one block, double the capacity of the previous one.
    fn grow(&mut self) {
        self.blocks.push(Vec::with_capacity(BASELINE << self.blocks.len()));
    }

    /// Constructs `element` in the next free slot, opening a new block first
    /// when the current one is full.
    pub(crate) fn alloc(&mut self, element: T) -> Handle {
        // Strict less-than keeps the element count within what Size can cache.
        assert!(self.len < Handle::MAX, "`Arena::alloc()` - arena is at maximum capacity ({})", Handle::MAX);

        let (block, offset) = Self::locate(self.len);
        if block == self.blocks.len() {
            self.grow();
        }
        debug_assert_eq!(self.blocks[block].len(), offset);

        self.blocks[block].push(element);
        self.len += 1;
        Handle::from_index(self.len - 1)
    }

    #[inline]
    pub(crate) fn get(&self, handle: Handle) -> &T {
        let (block, offset) = Self::locate(handle.to_index());
        &self.blocks[block][offset]
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, handle: Handle) -> &mut T {
        let (block, offset) = Self::locate(handle.to_index());
        &mut self.blocks[block][offset]
    }

    /// Drops every constructed element across every block in allocation
    /// order, then releases each block's storage.
    pub(crate) fn clear(&mut self) {
        self.blocks.clear();
        self.len = 0;
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn locate_round_trip() {
        let mut expected = 0;
        for block in 0..6 {
            for offset in 0..(BASELINE << block) {
                assert_eq!(Arena::<u32>::locate(expected), (block, offset));
                expected += 1;
            }
        }
    }

    #[test]
    fn blocks_double() {
        let mut arena: Arena<u32> = Arena::new();
        assert_eq!(arena.capacity(), 0);

        for i in 0..(BASELINE * 7) {
            arena.alloc(u32::try_from(i).unwrap());
        }

        // 3 blocks of BASELINE, 2*BASELINE, and 4*BASELINE slots.
        assert_eq!(arena.capacity(), BASELINE * 7);
        assert_eq!(arena.len(), BASELINE * 7);
    }

    #[test]
    fn with_capacity_rounds_up() {
        let arena: Arena<u32> = Arena::with_capacity(BASELINE + 1);
        assert!(arena.capacity() >= BASELINE + 1);
        assert!(arena.is_empty());
    }

    #[test]
    fn clear_releases_blocks() {
        let mut arena: Arena<u32> = Arena::new();
        for i in 0..100 {
            arena.alloc(i);
        }
        arena.clear();
        assert!(arena.is_empty());
        assert_eq!(arena.capacity(), 0);
    }

    proptest! {
        /// Handles issued before any later allocation keep resolving to the
        /// same element, across block boundaries.
        #[test]
        fn handles_stay_valid(values in prop::collection::vec(any::<u32>(), 1..512)) {
            let mut arena: Arena<u32> = Arena::new();
            let mut issued = Vec::new();

            for &value in &values {
                let handle = arena.alloc(value);
                issued.push((handle, value));

                for &(handle, value) in &issued {
                    prop_assert_eq!(*arena.get(handle), value);
                }
            }

            prop_assert_eq!(arena.len(), values.len());
        }

        /// Mutation through one handle never disturbs other slots.
        #[test]
        fn get_mut_is_isolated(values in prop::collection::vec(any::<u32>(), 2..256), which in any::<prop::sample::Index>()) {
            let mut arena: Arena<u32> = Arena::new();
            let handles: Vec<Handle> = values.iter().map(|&v| arena.alloc(v)).collect();

            let target = which.index(handles.len());
            *arena.get_mut(handles[target]) ^= 0xFFFF_FFFF;

            for (i, (&handle, &value)) in handles.iter().zip(&values).enumerate() {
                let expected = if i == target { value ^ 0xFFFF_FFFF } else { value };
                prop_assert_eq!(*arena.get(handle), expected);
            }
        }
    }
}
