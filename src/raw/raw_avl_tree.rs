use std::borrow::Borrow;
use std::cmp::Ordering;

use smallvec::SmallVec;

use super::arena::Arena;
use super::handle::Handle;
use super::node::Node;
use super::size::Size;

/// Clone work list: source node, destination parent, and whether the copy
/// hangs off the parent's left slot.
type CloneStack = SmallVec<[(Handle, Option<Handle>, bool); 48]>;

/// The height-balanced order-statistic tree backing `RankSet`.
///
/// Nodes live in the arena and refer to each other through handles. The tree
/// owns the root handle and drives every structural algorithm: descent
/// insertion with duplicate suppression, rotation rebalancing, rank
/// arithmetic from cached subtree sizes, and boundary searches.
pub(crate) struct RawAvlTree<K> {
    nodes: Arena<Node<K>>,
    root: Option<Handle>,
}

impl<K> RawAvlTree<K> {
    pub(crate) const fn new() -> Self {
        Self {
            nodes: Arena::new(),
            root: None,
        }
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Arena::with_capacity(capacity),
            root: None,
        }
    }

    /// Number of stored keys. The arena never holds detached nodes, so its
    /// element count is the tree's cardinality.
    pub(crate) const fn len(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) const fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub(crate) fn capacity(&self) -> usize {
        self.nodes.capacity()
    }

    /// Tears down every node and releases the arena's blocks.
    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
    }

    pub(crate) const fn root(&self) -> Option<Handle> {
        self.root
    }

    #[inline]
    pub(crate) fn node(&self, handle: Handle) -> &Node<K> {
        self.nodes.get(handle)
    }

    #[inline]
    fn node_mut(&mut self, handle: Handle) -> &mut Node<K> {
        self.nodes.get_mut(handle)
    }

    #[inline]
    fn height(&self, handle: Option<Handle>) -> u8 {
        handle.map_or(0, |h| self.node(h).height())
    }

    #[inline]
    fn size(&self, handle: Option<Handle>) -> usize {
        handle.map_or(0, |h| self.node(h).size().to_usize())
    }

    /// Recomputes the cached height and size of `handle` from its children.
    fn update_metric(&mut self, handle: Handle) {
        let node = self.node(handle);
        let height = 1 + self.height(node.left()).max(self.height(node.right()));
        let size = Size::from_usize(1 + self.size(node.left()) + self.size(node.right()));

        let node = self.node_mut(handle);
        node.set_height(height);
        node.set_size(size);
    }

    /// Height of the left subtree minus height of the right subtree.
    fn balance_factor(&self, handle: Handle) -> i32 {
        let node = self.node(handle);
        i32::from(self.height(node.left())) - i32::from(self.height(node.right()))
    }

    /// Leftmost descendant of `handle`.
    pub(crate) fn minimum(&self, handle: Handle) -> Handle {
        let mut current = handle;
        while let Some(left) = self.node(current).left() {
            current = left;
        }
        current
    }

    /// Next node in key order: the leftmost node of the right subtree, or
    /// else the first ancestor reached from a left child.
    pub(crate) fn successor(&self, handle: Handle) -> Option<Handle> {
        if let Some(right) = self.node(handle).right() {
            return Some(self.minimum(right));
        }

        let mut current = handle;
        let mut parent = self.node(current).parent();
        while let Some(above) = parent {
            if self.node(above).right() != Some(current) {
                break;
            }
            current = above;
            parent = self.node(current).parent();
        }
        parent
    }
}

impl<K: Ord> RawAvlTree<K> {
    /// Inserts `key`, returning the node holding it and whether the key was
    /// newly added. A duplicate is a no-op that returns the existing node.
    ///
    /// The new node is allocated before any link is written, so an allocation
    /// panic leaves the prior structure sound.
    pub(crate) fn insert(&mut self, key: K) -> (Handle, bool) {
        let Some(root) = self.root else {
            let handle = self.nodes.alloc(Node::new(key));
            self.root = Some(handle);
            return (handle, true);
        };

        let mut parent = root;
        let go_left = loop {
            match key.cmp(self.node(parent).key()) {
                Ordering::Equal => return (parent, false),
                Ordering::Less => match self.node(parent).left() {
                    Some(child) => parent = child,
                    None => break true,
                },
                Ordering::Greater => match self.node(parent).right() {
                    Some(child) => parent = child,
                    None => break false,
                },
            }
        };

        let mut node = Node::new(key);
        node.set_parent(Some(parent));
        let child = self.nodes.alloc(node);

        if go_left {
            self.node_mut(parent).set_left(Some(child));
        } else {
            self.node_mut(parent).set_right(Some(child));
        }

        self.rebalance(child);
        (child, true)
    }

    /// Walks from the new leaf's parent to the root, refreshing cached
    /// metadata and rotating wherever the balance factor leaves `{-1,0,1}`.
    /// A rotation replaces the visited ancestor; the walk resumes from the
    /// replacement's parent.
    fn rebalance(&mut self, leaf: Handle) {
        let mut current = self.node(leaf).parent();
        while let Some(handle) = current {
            self.update_metric(handle);

            let factor = self.balance_factor(handle);
            let handle = if factor.abs() > 1 { self.balance(handle, factor) } else { handle };

            current = self.node(handle).parent();
        }
    }

    /// Four-case AVL rebalancing of one over-weighted node. For the bent
    /// (left-right / right-left) cases the child is straightened first.
    fn balance(&mut self, handle: Handle, factor: i32) -> Handle {
        if factor > 1 {
            if let Some(left) = self.node(handle).left() {
                if self.balance_factor(left) < 0 {
                    self.rotate_left(left);
                }
            }
            self.rotate_right(handle)
        } else {
            if let Some(right) = self.node(handle).right() {
                if self.balance_factor(right) > 0 {
                    self.rotate_right(right);
                }
            }
            self.rotate_left(handle)
        }
    }

    /// Promotes the left child of `handle` into its place, re-pointing the
    /// displaced middle subtree and every affected parent back-reference.
    /// Only the two recomposed nodes get their metadata recomputed.
    fn rotate_right(&mut self, handle: Handle) -> Handle {
        let pivot = self.node(handle).left().expect("`RawAvlTree::rotate_right()` - node has no left child!");
        let parent = self.node(handle).parent();
        let middle = self.node(pivot).right();

        self.node_mut(pivot).set_parent(parent);
        match parent {
            None => self.root = Some(pivot),
            Some(above) => {
                let node = self.node_mut(above);
                if node.left() == Some(handle) {
                    node.set_left(Some(pivot));
                } else {
                    node.set_right(Some(pivot));
                }
            }
        }

        self.node_mut(pivot).set_right(Some(handle));
        self.node_mut(handle).set_parent(Some(pivot));
        self.node_mut(handle).set_left(middle);
        if let Some(displaced) = middle {
            self.node_mut(displaced).set_parent(Some(handle));
        }

        self.update_metric(handle);
        self.update_metric(pivot);
        pivot
    }

    /// Mirror image of [`rotate_right`](Self::rotate_right).
    fn rotate_left(&mut self, handle: Handle) -> Handle {
        let pivot = self.node(handle).right().expect("`RawAvlTree::rotate_left()` - node has no right child!");
        let parent = self.node(handle).parent();
        let middle = self.node(pivot).left();

        self.node_mut(pivot).set_parent(parent);
        match parent {
            None => self.root = Some(pivot),
            Some(above) => {
                let node = self.node_mut(above);
                if node.left() == Some(handle) {
                    node.set_left(Some(pivot));
                } else {
                    node.set_right(Some(pivot));
                }
            }
        }

        self.node_mut(pivot).set_left(Some(handle));
        self.node_mut(handle).set_parent(Some(pivot));
        self.node_mut(handle).set_right(middle);
        if let Some(displaced) = middle {
            self.node_mut(displaced).set_parent(Some(handle));
        }

        self.update_metric(handle);
        self.update_metric(pivot);
        pivot
    }

    /// Handle of the node holding `key`, if present.
    pub(crate) fn search<Q>(&self, key: &Q) -> Option<Handle>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut current = self.root;
        while let Some(handle) = current {
            let node = self.node(handle);
            match key.cmp(node.key().borrow()) {
                Ordering::Less => current = node.left(),
                Ordering::Greater => current = node.right(),
                Ordering::Equal => return Some(handle),
            }
        }
        None
    }

    /// Count of stored keys strictly less than `key`, derived from cached
    /// subtree sizes in one descent.
    pub(crate) fn rank_before<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut count = 0;
        let mut current = self.root;
        while let Some(handle) = current {
            let node = self.node(handle);
            match key.cmp(node.key().borrow()) {
                Ordering::Less => current = node.left(),
                Ordering::Greater => {
                    count += 1 + self.size(node.left());
                    current = node.right();
                }
                Ordering::Equal => {
                    count += self.size(node.left());
                    break;
                }
            }
        }
        count
    }

    /// Leftmost node whose key is not less than `key`.
    pub(crate) fn lower_bound<Q>(&self, key: &Q) -> Option<Handle>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut best = None;
        let mut current = self.root;
        while let Some(handle) = current {
            let node = self.node(handle);
            if node.key().borrow() < key {
                current = node.right();
            } else {
                best = Some(handle);
                current = node.left();
            }
        }
        best
    }

    /// Leftmost node whose key is strictly greater than `key`.
    pub(crate) fn upper_bound<Q>(&self, key: &Q) -> Option<Handle>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut best = None;
        let mut current = self.root;
        while let Some(handle) = current {
            let node = self.node(handle);
            if key < node.key().borrow() {
                best = Some(handle);
                current = node.left();
            } else {
                current = node.right();
            }
        }
        best
    }

    /// Signed rank delta between two nodes: the count of keys not less than
    /// `from`'s key and less than `to`'s, with an absent `to` meaning "to the
    /// end". Negative when `to` precedes `from` in key order; callers that
    /// derive the endpoints from an ordered pair of bounds never observe
    /// that.
    #[allow(clippy::cast_possible_wrap)]
    pub(crate) fn distance(&self, from: Option<Handle>, to: Option<Handle>) -> isize {
        let Some(from) = from else { return 0 };
        if Some(from) == to {
            return 0;
        }

        let rank_from = self.rank_before(self.node(from).key());
        let rank_to = to.map_or(self.len(), |handle| self.rank_before(self.node(handle).key()));

        rank_to as isize - rank_from as isize
    }

    /// Count of keys in the half-open interval `(lower, upper]`: strictly
    /// greater than `lower` and at most `upper`. Returns 0 for a degenerate
    /// or inverted pair.
    pub(crate) fn range_count<Q>(&self, lower: &Q, upper: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        if lower >= upper {
            return 0;
        }

        let first = self.upper_bound(lower);
        let last = self.upper_bound(upper);
        self.distance(first, last).max(0).unsigned_abs()
    }
}

impl<K: Clone> Clone for RawAvlTree<K> {
    /// Deep copy into a fresh arena: one new node per source node, copying
    /// key, height, and size, re-deriving parent links during the descent.
    /// Iterative so depth never rides the call stack; a clone panic unwinds
    /// the partially built arena without touching the source.
    fn clone(&self) -> Self {
        let mut nodes = Arena::with_capacity(self.nodes.len());
        let mut root = None;

        let mut stack = CloneStack::new();
        if let Some(origin) = self.root {
            stack.push((origin, None, false));
        }

        while let Some((origin, parent, is_left)) = stack.pop() {
            let source = self.node(origin);

            let mut node = Node::new(source.key().clone());
            node.set_height(source.height());
            node.set_size(source.size());
            node.set_parent(parent);
            let copy = nodes.alloc(node);

            match parent {
                None => root = Some(copy),
                Some(above) if is_left => nodes.get_mut(above).set_left(Some(copy)),
                Some(above) => nodes.get_mut(above).set_right(Some(copy)),
            }

            if let Some(left) = source.left() {
                stack.push((left, Some(copy), true));
            }
            if let Some(right) = source.right() {
                stack.push((right, Some(copy), false));
            }
        }

        Self { nodes, root }
    }
}

impl<K> Default for RawAvlTree<K> {
    fn default() -> Self {
        Self::new()
    }
}
