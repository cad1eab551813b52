use core::borrow::Borrow;
use core::fmt;
use core::mem;

use tracing::{debug, trace};

use super::arena::Arena;
use super::handle::Handle;
use super::node::{Node, SearchResult};
use crate::config::{Config, MinDegree};
use crate::error::{Result, TreeError};

/// The core B-tree backing `OrderedTree`.
///
/// There is always a root node. An empty tree is a single empty leaf.
#[derive(Clone)]
pub(crate) struct RawOrderedTree<K, V> {
    /// Arena storing all tree nodes.
    pub(super) nodes: Arena<Node<K>>,
    /// Arena storing all values (separate from nodes so entries move by handle).
    pub(super) values: Arena<V>,
    /// Handle to the root node.
    pub(super) root: Handle,
    /// Total number of key-value pairs in the tree.
    pub(super) len: usize,
    pub(super) config: Config,
}

impl<K, V> RawOrderedTree<K, V> {
    /// Creates a new, empty tree.
    pub(crate) fn new(config: Config) -> Self {
        let mut nodes = Arena::new();
        let root = nodes.alloc(Node::new_leaf(None));
        Self {
            nodes,
            values: Arena::new(),
            root,
            len: 0,
            config,
        }
    }

    /// Returns the number of key-value pairs in the tree.
    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the tree contains no elements.
    pub(crate) const fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub(crate) const fn config(&self) -> &Config {
        &self.config
    }

    pub(crate) const fn min_degree(&self) -> MinDegree {
        self.config.min_degree
    }

    /// Number of levels; a lone leaf root is height 1.
    pub(crate) fn height(&self) -> usize {
        let mut height = 1;
        let mut current = self.nodes.get(self.root);
        while !current.is_leaf() {
            current = self.nodes.get(current.child(0));
            height += 1;
        }
        height
    }

    /// Removes every entry, leaving a single empty leaf.
    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.values.clear();
        self.root = self.nodes.alloc(Node::new_leaf(None));
        self.len = 0;
    }

    pub(crate) fn structure(&self) -> Structure<'_, K, V> {
        Structure(self, self.root)
    }

    /// Walks `children[0]` from `handle` down to a leaf.
    pub(super) fn leftmost_leaf(&self, mut handle: Handle) -> Handle {
        loop {
            let node = self.nodes.get(handle);
            if node.is_leaf() {
                return handle;
            }
            handle = node.child(0);
        }
    }

    /// Walks `children[size]` from `handle` down to a leaf.
    pub(super) fn rightmost_leaf(&self, mut handle: Handle) -> Handle {
        loop {
            let node = self.nodes.get(handle);
            if node.is_leaf() {
                return handle;
            }
            handle = node.child(node.key_count());
        }
    }

    /// Leaf holding the smallest entry.
    pub(crate) fn minimum_node(&self) -> Result<Handle> {
        let leaf = self.leftmost_leaf(self.root);
        if self.nodes.get(leaf).key_count() == 0 {
            return Err(TreeError::EmptyCollection);
        }
        Ok(leaf)
    }

    /// Leaf holding the largest entry.
    pub(crate) fn maximum_node(&self) -> Result<Handle> {
        let leaf = self.rightmost_leaf(self.root);
        if self.nodes.get(leaf).key_count() == 0 {
            return Err(TreeError::EmptyCollection);
        }
        Ok(leaf)
    }

    pub(crate) fn first_key_value(&self) -> Option<(&K, &V)> {
        let leaf = self.nodes.get(self.minimum_node().ok()?);
        Some((leaf.key(0), self.values.get(leaf.value(0))))
    }

    pub(crate) fn last_key_value(&self) -> Option<(&K, &V)> {
        let leaf = self.nodes.get(self.maximum_node().ok()?);
        let last = leaf.key_count() - 1;
        Some((leaf.key(last), self.values.get(leaf.value(last))))
    }

    /// Returns true if `ancestor` is `node` or lies on `node`'s parent chain.
    pub(super) fn is_ancestor_or_self(&self, ancestor: Handle, node: Handle) -> bool {
        let mut current = Some(node);
        while let Some(handle) = current {
            if handle == ancestor {
                return true;
            }
            current = self.nodes.get(handle).parent();
        }
        false
    }

    /// Points every child of `handle` back at `handle`.
    pub(super) fn adopt_children(&mut self, handle: Handle) {
        for i in 0..self.nodes.get(handle).child_count() {
            let child = self.nodes.get(handle).child(i);
            self.nodes.get_mut(child).set_parent(Some(handle));
        }
    }

    /// Splits the full node at `handle` and returns the node that received the
    /// median: its parent, or a new root.
    pub(crate) fn split(&mut self, handle: Handle) -> Handle
    where
        K: Ord,
    {
        let max_keys = self.config.min_degree.max_keys();
        let node = self.nodes.get_mut(handle);
        assert_eq!(node.key_count(), max_keys, "`split()` - node is not full");

        let parent = node.parent();
        let (median_key, median_value, right) = node.split();
        let right_handle = self.nodes.alloc(right);
        self.adopt_children(right_handle);

        if let Some(parent) = parent {
            let node = self.nodes.get_mut(parent);
            assert!(node.key_count() < max_keys, "`split()` - parent is full");
            let slot = node.find_position(&median_key);
            debug_assert_eq!(node.child(slot), handle, "`split()` - median does not separate at the child's slot");
            node.insert_entry(slot, median_key, median_value);
            node.insert_child(slot + 1, right_handle);
            trace!(node = ?handle, parent = ?parent, slot, "btree.split");
            return parent;
        }

        let new_root = self.nodes.alloc(Node::new_root(handle, median_key, median_value, right_handle));
        self.nodes.get_mut(handle).set_parent(Some(new_root));
        self.nodes.get_mut(right_handle).set_parent(Some(new_root));
        self.root = new_root;
        debug!(root = ?new_root, height = self.height(), "btree.root.split");
        new_root
    }
}

impl<K: Ord, V> RawOrderedTree<K, V> {
    /// Searches for a key and returns the node handle and index if found.
    pub(crate) fn search<Q>(&self, key: &Q) -> Option<(Handle, usize)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut current = self.root;
        loop {
            let node = self.nodes.get(current);
            match node.search(key) {
                SearchResult::Found(idx) => return Some((current, idx)),
                SearchResult::NotFound(_) if node.is_leaf() => return None,
                SearchResult::NotFound(idx) => current = node.child(idx),
            }
        }
    }

    /// Returns a reference to the value corresponding to the key.
    pub(crate) fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let (handle, idx) = self.search(key)?;
        Some(self.values.get(self.nodes.get(handle).value(idx)))
    }

    /// Returns a mutable reference to the value corresponding to the key.
    pub(crate) fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let (handle, idx) = self.search(key)?;
        let value = self.nodes.get(handle).value(idx);
        Some(self.values.get_mut(value))
    }

    /// Returns the key-value pair corresponding to the key.
    pub(crate) fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let (handle, idx) = self.search(key)?;
        let node = self.nodes.get(handle);
        Some((node.key(idx), self.values.get(node.value(idx))))
    }

    /// Inserts a key-value pair, splitting full nodes on the way down.
    /// Returns the old value if the key was already present.
    pub(crate) fn insert(&mut self, key: K, value: V) -> Option<V> {
        let max_keys = self.config.min_degree.max_keys();
        let mut current = self.root;

        loop {
            let node = self.nodes.get(current);
            let idx = match node.search(&key) {
                SearchResult::Found(idx) => {
                    // Key exists, replace value in-place.
                    let value_handle = node.value(idx);
                    return Some(mem::replace(self.values.get_mut(value_handle), value));
                }
                SearchResult::NotFound(idx) => idx,
            };

            if node.key_count() == max_keys {
                // Preemptive split; resume from the node that took the median.
                current = self.split(current);
                continue;
            }

            if !node.is_leaf() {
                current = node.child(idx);
                continue;
            }

            let value_handle = self.values.alloc(value);
            self.nodes.get_mut(current).insert_entry(idx, key, value_handle);
            self.len += 1;
            return None;
        }
    }

    /// Removes a key from the tree and returns the key-value pair.
    ///
    /// Nodes at minimum occupancy are expanded before an entry leaves them, so
    /// the walk never has to climb back up to repair an underflow. A missing
    /// key is only discovered at a leaf, before anything has been modified.
    pub(crate) fn delete_entry<Q>(&mut self, key: &Q) -> Result<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let min_keys = self.config.min_degree.min_keys();
        let mut current = self.root;

        loop {
            let node = self.nodes.get(current);
            match node.search(key) {
                SearchResult::NotFound(_) if node.is_leaf() => return Err(TreeError::NotFound),
                SearchResult::NotFound(idx) => current = node.child(idx),
                SearchResult::Found(idx) if node.is_leaf() => {
                    if node.key_count() > min_keys || current == self.root {
                        let (key, value) = self.nodes.get_mut(current).remove_entry(idx);
                        return Ok(self.release(key, value));
                    }
                    current = self.expand(current);
                }
                SearchResult::Found(idx) => {
                    // Successor swap: the smallest entry of the right subtree
                    // takes this slot.
                    let successor = self.leftmost_leaf(node.child(idx + 1));
                    if self.nodes.get(successor).key_count() > min_keys {
                        let (next_key, next_value) = self.nodes.get_mut(successor).remove_entry(0);
                        let (key, value) = self.nodes.get_mut(current).replace_entry(idx, next_key, next_value);
                        return Ok(self.release(key, value));
                    }

                    // The key may move while the successor leaf is expanded.
                    // Resume from whichever of the two still covers it.
                    let entry = self.expand(successor);
                    if !self.is_ancestor_or_self(current, entry) {
                        current = entry;
                    }
                }
            }
        }
    }

    /// Removes a key from the tree and returns its value.
    pub(crate) fn delete<Q>(&mut self, key: &Q) -> Result<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.delete_entry(key).map(|(_, value)| value)
    }

    /// Removes and returns the smallest entry.
    pub(crate) fn pop_first(&mut self) -> Option<(K, V)> {
        let leaf = self.minimum_node().ok()?;
        self.delete_extreme(leaf, true)
    }

    /// Removes and returns the largest entry.
    pub(crate) fn pop_last(&mut self) -> Option<(K, V)> {
        let leaf = self.maximum_node().ok()?;
        self.delete_extreme(leaf, false)
    }

    /// Deletes the first or last entry of the tree, expanding the leaf that
    /// holds it first when needed.
    fn delete_extreme(&mut self, mut leaf: Handle, first: bool) -> Option<(K, V)> {
        let min_keys = self.config.min_degree.min_keys();
        loop {
            let node = self.nodes.get(leaf);
            if node.key_count() > min_keys || leaf == self.root {
                let idx = if first { 0 } else { node.key_count() - 1 };
                let (key, value) = self.nodes.get_mut(leaf).remove_entry(idx);
                return Some(self.release(key, value));
            }
            let entry = self.expand(leaf);
            leaf = if first {
                self.leftmost_leaf(entry)
            } else {
                self.rightmost_leaf(entry)
            };
        }
    }

    /// Frees the value slot of a removed entry.
    fn release(&mut self, key: K, value: Handle) -> (K, V) {
        self.len -= 1;
        (key, self.values.take(value))
    }
}

/// Renders the node structure, root first, as nested brackets.
pub(crate) struct Structure<'a, K, V>(pub(crate) &'a RawOrderedTree<K, V>, pub(crate) Handle);

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Structure<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Structure(tree, handle) = *self;
        let node = tree.nodes.get(handle);
        let mut entries = f.debug_map();
        for (key, &value) in node.keys().iter().zip(node.values()) {
            entries.entry(key, tree.values.get(value));
        }
        entries.finish()?;
        if node.is_leaf() {
            return Ok(());
        }
        let mut children = f.debug_list();
        for &child in node.children() {
            children.entry(&Structure(tree, child));
        }
        children.finish()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use alloc::collections::BTreeMap;
    use alloc::format;
    use alloc::string::{String, ToString};
    use alloc::vec;
    use alloc::vec::Vec;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    use crate::config::TieBreak;

    impl<K: Ord + Clone + fmt::Debug, V> RawOrderedTree<K, V> {
        /// Validates all B-tree invariants. Panics with a descriptive message if any are violated.
        pub(crate) fn validate_invariants(&self) {
            let mut errors: Vec<String> = Vec::new();

            if self.nodes.get(self.root).parent().is_some() {
                errors.push("root has a parent".into());
            }

            let mut leaf_depth = None;
            let mut reachable = 0usize;
            let mut keys: Vec<K> = Vec::new();
            self.validate_node(self.root, 0, None, None, &mut leaf_depth, &mut reachable, &mut keys, &mut errors);

            if keys.windows(2).any(|w| w[0] >= w[1]) {
                errors.push(format!("in-order traversal not strictly increasing: {keys:?}"));
            }
            if keys.len() != self.len {
                errors.push(format!("len mismatch: self.len={}, actual count={}", self.len, keys.len()));
            }
            if self.values.len() != self.len {
                errors.push(format!("value arena holds {} values, len={}", self.values.len(), self.len));
            }
            if self.nodes.len() != reachable {
                errors.push(format!("node arena holds {} nodes, {} reachable", self.nodes.len(), reachable));
            }

            assert!(errors.is_empty(), "Tree invariant violations:\n{}", errors.join("\n"));
        }

        #[allow(clippy::too_many_arguments)]
        fn validate_node(
            &self,
            handle: Handle,
            depth: usize,
            lower: Option<&K>,
            upper: Option<&K>,
            leaf_depth: &mut Option<usize>,
            reachable: &mut usize,
            keys: &mut Vec<K>,
            errors: &mut Vec<String>,
        ) {
            let t = self.config.min_degree;
            let node = self.nodes.get(handle);
            *reachable += 1;

            let size = node.key_count();
            if size > t.max_keys() {
                errors.push(format!("node {handle:?} overfull: {size} keys"));
            }
            if handle != self.root && size < t.min_keys() {
                errors.push(format!("node {handle:?} underfull: {size} keys"));
            }
            if node.values().len() != size {
                errors.push(format!("node {handle:?} has {} values for {size} keys", node.values().len()));
            }
            for key in node.keys() {
                if lower.is_some_and(|l| key <= l) || upper.is_some_and(|u| key >= u) {
                    errors.push(format!("node {handle:?} key {key:?} outside ({lower:?}, {upper:?})"));
                }
            }

            if node.is_leaf() {
                match *leaf_depth {
                    None => *leaf_depth = Some(depth),
                    Some(expected) if expected != depth => {
                        errors.push(format!("leaf {handle:?} at depth {depth}, expected {expected}"));
                    }
                    Some(_) => {}
                }
                keys.extend(node.keys().iter().cloned());
                return;
            }

            if node.child_count() != size + 1 {
                errors.push(format!("node {handle:?} has {} children for {size} keys", node.child_count()));
                return;
            }
            for (i, &child) in node.children().iter().enumerate() {
                if self.nodes.get(child).parent() != Some(handle) {
                    errors.push(format!("child {child:?} of {handle:?} points at {:?}", self.nodes.get(child).parent()));
                }
                let lo = if i == 0 { lower } else { Some(node.key(i - 1)) };
                let hi = if i == size { upper } else { Some(node.key(i)) };
                self.validate_node(child, depth + 1, lo, hi, leaf_depth, reachable, keys, errors);
                if i < size {
                    keys.push(node.key(i).clone());
                }
            }
        }

        /// Keys of the root and of each of its children, for shape assertions.
        pub(crate) fn shape(&self) -> (Vec<K>, Vec<Vec<K>>) {
            let root = self.nodes.get(self.root);
            let children = root
                .children()
                .iter()
                .map(|&c| self.nodes.get(c).keys().to_vec())
                .collect();
            (root.keys().to_vec(), children)
        }
    }

    fn tree_with(t: usize, keys: &[i32]) -> RawOrderedTree<i32, String> {
        let config = Config::new().with_min_degree(MinDegree::new(t).unwrap());
        let mut tree = RawOrderedTree::new(config);
        for &k in keys {
            tree.insert(k, k.to_string());
            tree.validate_invariants();
        }
        tree
    }

    fn steps(from: i32, to: i32) -> Vec<i32> {
        (from..=to).step_by(10).collect()
    }

    #[test]
    fn empty_tree_is_a_single_empty_leaf() {
        let tree: RawOrderedTree<i32, i32> = RawOrderedTree::new(Config::new());
        tree.validate_invariants();
        assert_eq!(tree.height(), 1);
        assert_eq!(tree.minimum_node(), Err(TreeError::EmptyCollection));
        assert_eq!(tree.maximum_node(), Err(TreeError::EmptyCollection));
        assert!(tree.first_key_value().is_none());
        assert!(tree.get(&1).is_none());
    }

    #[test]
    fn insert_fills_root_leaf_in_order() {
        let tree = tree_with(2, &[4, 1, 2]);
        assert_eq!(tree.shape(), (vec![1, 2, 4], vec![]));
        let root = tree.nodes.get(tree.root);
        assert_eq!(tree.values.get(root.value(0)), "1");
        assert_eq!(tree.values.get(root.value(2)), "4");
    }

    #[test]
    fn splitting_root_promotes_median() {
        let mut tree = tree_with(2, &[4, 1, 2]);
        let old_root = tree.root;
        let new_root = tree.split(old_root);

        assert_eq!(new_root, tree.root);
        assert_eq!(tree.shape(), (vec![2], vec![vec![1], vec![4]]));
        assert_eq!(tree.nodes.get(old_root).parent(), Some(new_root));
        assert_eq!(tree.height(), 2);
        tree.validate_invariants();
    }

    #[test]
    fn fourth_insert_splits_root_once() {
        let tree = tree_with(2, &[4, 1, 2, 3]);
        assert_eq!(tree.shape(), (vec![2], vec![vec![1], vec![3, 4]]));
    }

    #[test]
    fn split_of_non_root_node_inserts_into_parent() {
        let tree = tree_with(2, &[1, 2, 3, 4, 5, 6]);
        assert_eq!(tree.shape(), (vec![2, 4], vec![vec![1], vec![3], vec![5, 6]]));
    }

    #[test]
    fn full_root_is_split_on_the_way_down() {
        let mut tree = tree_with(2, &steps(10, 80));
        tree.insert(15, "15".into());
        tree.validate_invariants();
        assert_eq!(tree.shape().0, vec![40]);
    }

    #[test]
    #[should_panic(expected = "`split()` - node is not full")]
    fn split_requires_full_node() {
        let mut tree = tree_with(2, &[1, 2]);
        let root = tree.root;
        tree.split(root);
    }

    #[test]
    fn insert_existing_key_replaces_value() {
        let mut tree = tree_with(2, &steps(10, 90));
        let nodes_before = tree.nodes.len();
        assert_eq!(tree.insert(40, "forty".into()), Some("40".into()));
        assert_eq!(tree.get(&40).map(String::as_str), Some("forty"));
        assert_eq!(tree.len(), 9);
        assert_eq!(tree.nodes.len(), nodes_before);
        tree.validate_invariants();
    }

    #[test]
    fn find_hits_internal_and_leaf_entries() {
        let tree = tree_with(2, &[10, 20, 30, 40]);
        assert_eq!(tree.get(&20).map(String::as_str), Some("20"));
        assert_eq!(tree.get(&30).map(String::as_str), Some("30"));
        assert!(tree.get(&25).is_none());
        assert!(tree.get(&50).is_none());
        assert_eq!(tree.get_key_value(&10), Some((&10, &"10".to_string())));
    }

    #[test]
    fn minimum_and_maximum_follow_outer_edges() {
        let tree = tree_with(2, &[20, 40, 30, 10, 50]);
        assert_eq!(tree.first_key_value(), Some((&10, &"10".to_string())));
        assert_eq!(tree.last_key_value(), Some((&50, &"50".to_string())));
    }

    #[test]
    fn delete_from_non_minimal_leaf() {
        let mut tree = tree_with(2, &[10, 20, 30]);
        assert_eq!(tree.delete(&20), Ok("20".into()));
        assert_eq!(tree.shape(), (vec![10, 30], vec![]));
    }

    #[test]
    fn delete_internal_key_swaps_with_successor() {
        let mut tree = tree_with(2, &steps(10, 60));
        assert_eq!(tree.delete(&40), Ok("40".into()));
        tree.validate_invariants();
        assert_eq!(tree.shape(), (vec![20, 50], vec![vec![10], vec![30], vec![60]]));
        let root = tree.nodes.get(tree.root);
        assert_eq!(tree.values.get(root.value(1)), "50");
    }

    #[test]
    fn delete_leftmost_minimal_leaf_borrows_from_right() {
        let mut tree = tree_with(2, &steps(10, 60));
        tree.delete(&40).unwrap();
        tree.delete(&10).unwrap();
        tree.validate_invariants();
        assert_eq!(tree.shape(), (vec![50], vec![vec![20, 30], vec![60]]));
    }

    #[test]
    fn delete_rightmost_minimal_leaf_borrows_from_left() {
        let mut tree = tree_with(2, &steps(10, 60));
        tree.delete(&40).unwrap();
        tree.delete(&60).unwrap();
        tree.validate_invariants();
        assert_eq!(tree.shape(), (vec![20], vec![vec![10], vec![30, 50]]));
    }

    #[test]
    fn delete_interior_minimal_leaf_redistributes() {
        let mut tree = tree_with(2, &steps(10, 60));
        tree.delete(&30).unwrap();
        tree.validate_invariants();
        assert_eq!(tree.shape(), (vec![20, 50], vec![vec![10], vec![40], vec![60]]));
    }

    #[test]
    fn delete_cascades_expand_through_minimal_parent() {
        let mut tree = tree_with(2, &steps(10, 90));
        assert_eq!(
            tree.shape(),
            (vec![40], vec![vec![20], vec![60]]),
            "two-level tree over leaves 10, 30, 50, 70-80-90"
        );

        tree.delete(&50).unwrap();
        tree.validate_invariants();
        assert_eq!(
            tree.shape(),
            (vec![20, 40, 70], vec![vec![10], vec![30], vec![60], vec![80, 90]])
        );
        assert_eq!(tree.height(), 2);
    }

    #[test]
    fn delete_missing_key_leaves_tree_untouched() {
        let mut tree = tree_with(2, &steps(10, 90));
        let before = format!("{:?}", Structure(&tree, tree.root));
        assert_eq!(tree.delete(&55), Err(TreeError::NotFound));
        assert_eq!(format!("{:?}", Structure(&tree, tree.root)), before);
        tree.validate_invariants();

        let mut empty: RawOrderedTree<i32, i32> = RawOrderedTree::new(Config::new());
        assert_eq!(empty.delete(&1), Err(TreeError::NotFound));
    }

    #[test]
    fn delete_everything_in_reverse_leaves_empty_leaf_root() {
        let keys: Vec<i32> = (0..200).collect();
        let mut tree = tree_with(2, &keys);
        for k in keys.iter().rev() {
            assert_eq!(tree.delete(k), Ok(k.to_string()));
            tree.validate_invariants();
        }
        assert!(tree.is_empty());
        let root = tree.nodes.get(tree.root);
        assert!(root.is_leaf());
        assert_eq!(root.key_count(), 0);
        assert_eq!(root.child_count(), 0);
        assert_eq!(tree.nodes.len(), 1);
    }

    #[test]
    fn pop_first_and_last_drain_in_order() {
        let mut tree = tree_with(3, &(0..100).collect::<Vec<_>>());
        for i in 0..50 {
            assert_eq!(tree.pop_first(), Some((i, i.to_string())));
            assert_eq!(tree.pop_last(), Some((99 - i, (99 - i).to_string())));
            tree.validate_invariants();
        }
        assert_eq!(tree.pop_first(), None);
        assert_eq!(tree.pop_last(), None);
    }

    #[test]
    fn tie_break_picks_merge_sibling() {
        // Root {20, 40} over three minimal leaves; deleting the middle leaf's
        // only key forces a merge with one of its neighbours.
        for (tie_break, expected) in [
            (TieBreak::PreferLeft, (vec![40], vec![vec![10, 20], vec![50]])),
            (TieBreak::PreferRight, (vec![20], vec![vec![10], vec![40, 50]])),
        ] {
            let config = Config::new().with_tie_break(tie_break);
            let mut tree = RawOrderedTree::new(config);
            for k in [10, 20, 30, 40, 50, 60] {
                tree.insert(k, k);
            }
            tree.delete(&60).unwrap();
            assert_eq!(tree.shape(), (vec![20, 40], vec![vec![10], vec![30], vec![50]]));

            tree.delete(&30).unwrap();
            tree.validate_invariants();
            assert_eq!(tree.shape(), expected, "{tie_break:?}");
        }
    }

    #[test]
    fn clone_is_independent() {
        let mut tree = tree_with(2, &steps(10, 90));
        let copy = tree.clone();
        tree.delete(&50).unwrap();
        copy.validate_invariants();
        assert_eq!(copy.get(&50).map(String::as_str), Some("50"));
        assert_eq!(copy.len(), 9);
    }

    #[test]
    fn clear_resets_to_single_leaf() {
        let mut tree = tree_with(2, &steps(10, 90));
        tree.clear();
        tree.validate_invariants();
        assert!(tree.is_empty());
        assert_eq!(tree.height(), 1);
        tree.insert(1, "1".into());
        tree.validate_invariants();
    }

    #[derive(Clone, Debug)]
    enum Op {
        Insert(i32),
        Remove(i32),
        PopFirst,
        PopLast,
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            6 => (0i32..1000).prop_map(Op::Insert),
            3 => (0i32..1000).prop_map(Op::Remove),
            1 => Just(Op::PopFirst),
            1 => Just(Op::PopLast),
        ]
    }

    fn tie_break_strategy() -> impl Strategy<Value = TieBreak> {
        prop_oneof![Just(TieBreak::PreferLeft), Just(TieBreak::PreferRight)]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn tree_invariants_maintained_after_operations(
            t in 2usize..6,
            tie_break in tie_break_strategy(),
            ops in prop::collection::vec(op_strategy(), 0..400),
        ) {
            let config = Config::new().with_min_degree(MinDegree::new(t).unwrap()).with_tie_break(tie_break);
            let mut tree: RawOrderedTree<i32, i32> = RawOrderedTree::new(config);
            let mut model: BTreeMap<i32, i32> = BTreeMap::new();

            for op in ops {
                match op {
                    Op::Insert(key) => {
                        prop_assert_eq!(tree.insert(key, key * 2), model.insert(key, key * 2));
                    }
                    Op::Remove(key) => {
                        let expected = model.remove(&key).ok_or(TreeError::NotFound);
                        prop_assert_eq!(tree.delete(&key), expected);
                    }
                    Op::PopFirst => prop_assert_eq!(tree.pop_first(), model.pop_first()),
                    Op::PopLast => prop_assert_eq!(tree.pop_last(), model.pop_last()),
                }
                tree.validate_invariants();
                prop_assert_eq!(tree.first_key_value(), model.first_key_value());
                prop_assert_eq!(tree.last_key_value(), model.last_key_value());
            }

            for (key, value) in &model {
                prop_assert_eq!(tree.get(key), Some(value));
            }
        }

        #[test]
        fn insert_all_delete_all_any_order(
            t in 2usize..8,
            keys in prop::collection::btree_set(any::<i32>(), 1..300),
            order in any::<prop::sample::Index>(),
        ) {
            let keys: Vec<i32> = keys.into_iter().collect();
            let mut tree = tree_with(t, &keys);

            // Rotate the deletion order by a random offset and interleave both ends.
            let offset = order.index(keys.len());
            let mut pending: Vec<i32> = keys[offset..].iter().chain(&keys[..offset]).copied().collect();
            let mut front = true;
            while !pending.is_empty() {
                let k = if front { pending.remove(0) } else { pending.pop().unwrap() };
                front = !front;
                prop_assert_eq!(tree.delete(&k), Ok(k.to_string()));
                tree.validate_invariants();
            }

            prop_assert!(tree.is_empty());
            prop_assert_eq!(tree.nodes.len(), 1);
            prop_assert!(tree.nodes.get(tree.root).is_leaf());
        }
    }
}
