use core::borrow::Borrow;
use core::mem;

use smallvec::SmallVec;

use super::handle::Handle;

/// Entries kept inline before a node spills to the heap.
///
/// Sized for a full node of the default degree (`2t - 1 = 3`) plus the spare
/// slot a node briefly needs while it is being redistributed.
pub(crate) const INLINE_KEYS: usize = 4;

pub(crate) type Keys<K> = SmallVec<[K; INLINE_KEYS]>;
pub(crate) type Values = SmallVec<[Handle; INLINE_KEYS]>;
pub(crate) type Children = SmallVec<[Handle; INLINE_KEYS + 1]>;

/// One B-tree node.
///
/// Unlike a B+tree, every node stores entries: `keys[i]` pairs with the value
/// handle `values[i]`. Internal nodes additionally own `keys.len() + 1`
/// children; leaves own none.
#[derive(Clone)]
pub(crate) struct Node<K> {
    // Non-owning link used to find siblings while rebalancing. `None` only
    // for the root.
    parent: Option<Handle>,
    keys: Keys<K>,
    values: Values,
    kind: NodeKind,
}

#[derive(Clone)]
pub(crate) enum NodeKind {
    Leaf,
    Internal(Children),
}

/// Result of searching for a key in a node.
pub(crate) enum SearchResult {
    /// Key was found at the given index.
    Found(usize),
    /// Key was not found; index is where it would be inserted, which is also
    /// the child to descend into.
    NotFound(usize),
}

impl<K> Node<K> {
    /// Creates an empty leaf.
    pub(crate) fn new_leaf(parent: Option<Handle>) -> Self {
        Self {
            parent,
            keys: SmallVec::new(),
            values: SmallVec::new(),
            kind: NodeKind::Leaf,
        }
    }

    /// Creates an internal node with a single entry between two children.
    pub(crate) fn new_root(left: Handle, key: K, value: Handle, right: Handle) -> Self {
        let mut keys = SmallVec::new();
        keys.push(key);
        let mut values = SmallVec::new();
        values.push(value);
        let mut children = SmallVec::new();
        children.push(left);
        children.push(right);
        Self {
            parent: None,
            keys,
            values,
            kind: NodeKind::Internal(children),
        }
    }

    pub(crate) fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf)
    }

    pub(crate) fn parent(&self) -> Option<Handle> {
        self.parent
    }

    pub(crate) fn set_parent(&mut self, parent: Option<Handle>) {
        self.parent = parent;
    }

    /// Number of entries, the node's `size`.
    pub(crate) fn key_count(&self) -> usize {
        self.keys.len()
    }

    #[inline]
    pub(crate) fn key(&self, index: usize) -> &K {
        &self.keys[index]
    }

    pub(crate) fn keys(&self) -> &[K] {
        &self.keys
    }

    #[inline]
    pub(crate) fn value(&self, index: usize) -> Handle {
        self.values[index]
    }

    pub(crate) fn values(&self) -> &[Handle] {
        &self.values
    }

    /// Child handles; empty for a leaf.
    pub(crate) fn children(&self) -> &[Handle] {
        match &self.kind {
            NodeKind::Internal(children) => children,
            NodeKind::Leaf => &[],
        }
    }

    pub(crate) fn child_count(&self) -> usize {
        self.children().len()
    }

    /// Returns the child at `index`, panicking on a leaf.
    #[inline]
    pub(crate) fn child(&self, index: usize) -> Handle {
        match &self.kind {
            NodeKind::Internal(children) => children[index],
            NodeKind::Leaf => panic!("expected internal node"),
        }
    }

    /// Slot of `child` among this node's children.
    pub(crate) fn child_position(&self, child: Handle) -> usize {
        self.children()
            .iter()
            .position(|&c| c == child)
            .unwrap_or_else(|| panic!("{child:?} is not a child of this node"))
    }

    fn children_mut(&mut self) -> &mut Children {
        match &mut self.kind {
            NodeKind::Internal(children) => children,
            NodeKind::Leaf => panic!("expected internal node"),
        }
    }

    /// Searches this node for `key`.
    #[inline]
    pub(crate) fn search<Q>(&self, key: &Q) -> SearchResult
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        match self.keys.binary_search_by(|k| k.borrow().cmp(key)) {
            Ok(idx) => SearchResult::Found(idx),
            Err(idx) => SearchResult::NotFound(idx),
        }
    }

    /// Index of the first key `>= key`.
    #[inline]
    pub(crate) fn find_position<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        match self.search(key) {
            SearchResult::Found(idx) | SearchResult::NotFound(idx) => idx,
        }
    }

    /// Inserts an entry at `index`, shifting later entries right.
    pub(crate) fn insert_entry(&mut self, index: usize, key: K, value: Handle) {
        self.keys.insert(index, key);
        self.values.insert(index, value);
    }

    /// Removes the entry at `index`.
    pub(crate) fn remove_entry(&mut self, index: usize) -> (K, Handle) {
        (self.keys.remove(index), self.values.remove(index))
    }

    /// Overwrites the entry at `index`, returning the previous one.
    pub(crate) fn replace_entry(&mut self, index: usize, key: K, value: Handle) -> (K, Handle) {
        (
            mem::replace(&mut self.keys[index], key),
            mem::replace(&mut self.values[index], value),
        )
    }

    /// Inserts a child handle at `index`.
    pub(crate) fn insert_child(&mut self, index: usize, child: Handle) {
        self.children_mut().insert(index, child);
    }

    /// Removes the child handle at `index`.
    pub(crate) fn remove_child(&mut self, index: usize) -> Handle {
        self.children_mut().remove(index)
    }

    /// Splits a full node around its median entry.
    ///
    /// `self` keeps the lower half; the upper half is returned as a new node
    /// sharing `self`'s parent. The caller must re-parent the new node's
    /// children.
    pub(crate) fn split(&mut self) -> (K, Handle, Node<K>) {
        let mid = self.keys.len() / 2;

        let right_keys: Keys<K> = self.keys.drain(mid + 1..).collect();
        let right_values: Values = self.values.drain(mid + 1..).collect();
        let kind = match &mut self.kind {
            NodeKind::Leaf => NodeKind::Leaf,
            NodeKind::Internal(children) => NodeKind::Internal(children.drain(mid + 1..).collect()),
        };

        let (Some(median_key), Some(median_value)) = (self.keys.pop(), self.values.pop()) else {
            panic!("`Node::split()` - node is empty");
        };

        let right = Node {
            parent: self.parent,
            keys: right_keys,
            values: right_values,
            kind,
        };
        (median_key, median_value, right)
    }

    /// Appends `separator` and every entry and child of `right` to `self`.
    pub(crate) fn absorb(&mut self, separator: (K, Handle), mut right: Node<K>) {
        assert_eq!(self.is_leaf(), right.is_leaf(), "merging nodes of different kinds");
        self.keys.push(separator.0);
        self.values.push(separator.1);
        self.keys.append(&mut right.keys);
        self.values.append(&mut right.values);
        if let (NodeKind::Internal(left), NodeKind::Internal(right)) = (&mut self.kind, &mut right.kind) {
            left.append(right);
        }
    }

    /// Pools `self`, `separator` and `right`, then deals them back so that
    /// `self` keeps `new_left` entries. Returns the new separator.
    ///
    /// Children move with their entries; the caller must re-parent them.
    pub(crate) fn redistribute(&mut self, separator: (K, Handle), right: &mut Node<K>, new_left: usize) -> (K, Handle) {
        assert_eq!(self.is_leaf(), right.is_leaf(), "redistributing nodes of different kinds");

        let mut keys = mem::take(&mut self.keys);
        keys.push(separator.0);
        keys.append(&mut right.keys);
        let mut values = mem::take(&mut self.values);
        values.push(separator.1);
        values.append(&mut right.values);
        assert!(new_left < keys.len(), "`Node::redistribute()` - split point out of range");

        right.keys = keys.drain(new_left + 1..).collect();
        right.values = values.drain(new_left + 1..).collect();
        if let (NodeKind::Internal(left), NodeKind::Internal(right)) = (&mut self.kind, &mut right.kind) {
            left.append(right);
            *right = left.drain(new_left + 1..).collect();
        }

        let (Some(key), Some(value)) = (keys.pop(), values.pop()) else {
            panic!("`Node::redistribute()` - nothing to redistribute");
        };
        self.keys = keys;
        self.values = values;
        (key, value)
    }
}
