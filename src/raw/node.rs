use super::handle::Handle;
use super::size::Size;

/// One stored key plus the structural metadata of its tree position.
///
/// The child links own their subtrees logically. `parent` is a non-owning
/// back-reference used only by the upward rebalancing walk and by successor
/// computation; it never drives teardown.
pub(crate) struct Node<K> {
    key: K,
    left: Option<Handle>,
    right: Option<Handle>,
    parent: Option<Handle>,
    // 1 + max over children; an absent child counts as 0. A balanced tree
    // bounded by Handle::MAX nodes never exceeds u8 height.
    height: u8,
    // Cached cardinality of the subtree rooted here, itself included.
    size: Size,
}

impl<K> Node<K> {
    /// Creates a detached leaf holding `key`.
    pub(crate) const fn new(key: K) -> Self {
        Self {
            key,
            left: None,
            right: None,
            parent: None,
            height: 1,
            size: Size::ONE,
        }
    }

    #[inline]
    pub(crate) const fn key(&self) -> &K {
        &self.key
    }

    #[inline]
    pub(crate) const fn left(&self) -> Option<Handle> {
        self.left
    }

    pub(crate) fn set_left(&mut self, left: Option<Handle>) {
        self.left = left;
    }

    #[inline]
    pub(crate) const fn right(&self) -> Option<Handle> {
        self.right
    }

    pub(crate) fn set_right(&mut self, right: Option<Handle>) {
        self.right = right;
    }

    #[inline]
    pub(crate) const fn parent(&self) -> Option<Handle> {
        self.parent
    }

    pub(crate) fn set_parent(&mut self, parent: Option<Handle>) {
        self.parent = parent;
    }

    #[inline]
    pub(crate) const fn height(&self) -> u8 {
        self.height
    }

    pub(crate) fn set_height(&mut self, height: u8) {
        self.height = height;
    }

    #[inline]
    pub(crate) const fn size(&self) -> Size {
        self.size
    }

    pub(crate) fn set_size(&mut self, size: Size) {
        self.size = size;
    }
}
