//! Delete-side fixups: making room in a minimum-occupancy node before an
//! entry leaves it.

use core::cmp::Ordering;

use tracing::{debug, trace};

use super::handle::Handle;
use super::raw_ordered_tree::RawOrderedTree;
use crate::config::TieBreak;

impl<K, V> RawOrderedTree<K, V> {
    /// Grows the minimum-occupancy node at `handle` by borrowing from or
    /// merging with a sibling.
    ///
    /// Returns the entry point from which an interrupted delete resumes: the
    /// parent of `handle`, or the new root after a collapse. If the parent is
    /// itself minimal (and not the root) only the parent is expanded; the
    /// resumed delete reaches `handle` again afterwards.
    pub(super) fn expand(&mut self, handle: Handle) -> Handle {
        let min_keys = self.config.min_degree.min_keys();
        let node = self.nodes.get(handle);
        let Some(parent) = node.parent() else {
            panic!("`expand()` - the root has no siblings");
        };
        assert_eq!(node.key_count(), min_keys, "`expand()` - node is not at minimum occupancy");

        let parent_node = self.nodes.get(parent);
        if parent != self.root && parent_node.key_count() == min_keys {
            trace!(node = ?handle, parent = ?parent, "btree.expand.cascade");
            return self.expand(parent);
        }

        let pos = parent_node.child_position(handle);
        let last = parent_node.key_count();
        let left = (pos > 0).then(|| self.nodes.get(parent_node.child(pos - 1)).key_count());
        let right = (pos < last).then(|| self.nodes.get(parent_node.child(pos + 1)).key_count());
        let prefer_left = self.config.tie_break == TieBreak::PreferLeft;
        let surplus = |size: Option<usize>| size.filter(|&size| size > min_keys);

        match (surplus(left), surplus(right)) {
            (Some(l), Some(r)) => {
                let take_left = match l.cmp(&r) {
                    Ordering::Greater => true,
                    Ordering::Less => false,
                    Ordering::Equal => prefer_left,
                };
                if take_left {
                    self.redistribute_children(parent, pos - 1, true)
                } else {
                    self.redistribute_children(parent, pos, false)
                }
            }
            (Some(_), None) => self.redistribute_children(parent, pos - 1, true),
            (None, Some(_)) => self.redistribute_children(parent, pos, false),
            (None, None) => {
                let merge_left = match (left, right) {
                    (Some(_), Some(_)) => prefer_left,
                    (Some(_), None) => true,
                    (None, _) => false,
                };
                if merge_left {
                    self.merge_children(parent, pos - 1)
                } else {
                    self.merge_children(parent, pos)
                }
            }
        }
    }

    /// Merges `children[left_pos]`, the separator at `left_pos` and
    /// `children[left_pos + 1]` into the left child.
    ///
    /// Both children must hold exactly `t - 1` keys. Returns `parent`, or the
    /// merged node if it replaced an emptied root.
    pub(crate) fn merge_children(&mut self, parent: Handle, left_pos: usize) -> Handle {
        let min_keys = self.config.min_degree.min_keys();
        let parent_node = self.nodes.get(parent);
        let left = parent_node.child(left_pos);
        let right = parent_node.child(left_pos + 1);

        assert!(
            parent == self.root || parent_node.key_count() > min_keys,
            "`merge_children()` - parent would underflow"
        );
        assert!(
            self.nodes.get(left).key_count() == min_keys && self.nodes.get(right).key_count() == min_keys,
            "`merge_children()` - both children must hold t - 1 keys"
        );

        let parent_node = self.nodes.get_mut(parent);
        let separator = parent_node.remove_entry(left_pos);
        parent_node.remove_child(left_pos + 1);

        let right_node = self.nodes.take(right);
        self.nodes.get_mut(left).absorb(separator, right_node);
        self.adopt_children(left);
        trace!(parent = ?parent, left = ?left, left_pos, "btree.merge");

        if parent == self.root && self.nodes.get(parent).key_count() == 0 {
            self.nodes.free(parent);
            self.nodes.get_mut(left).set_parent(None);
            self.root = left;
            debug!(root = ?left, height = self.height(), "btree.root.collapse");
            return left;
        }
        parent
    }

    /// Evens out `children[left_pos]` and `children[left_pos + 1]` through the
    /// separator between them.
    ///
    /// The pooled entries are dealt so that the left child keeps
    /// `(l + r) / 2` of them when `more_to_right`, else `(l + r + 1) / 2`.
    /// At least one child must have a key to spare. Returns `parent`.
    pub(crate) fn redistribute_children(&mut self, parent: Handle, left_pos: usize, more_to_right: bool) -> Handle {
        let min_keys = self.config.min_degree.min_keys();
        let parent_node = self.nodes.get(parent);
        let left = parent_node.child(left_pos);
        let right = parent_node.child(left_pos + 1);

        let l = self.nodes.get(left).key_count();
        let r = self.nodes.get(right).key_count();
        assert!(
            l > min_keys || r > min_keys,
            "`redistribute_children()` - neither child has a key to spare"
        );
        let new_left = if more_to_right { (l + r) / 2 } else { (l + r + 1) / 2 };

        let separator = self.nodes.get_mut(parent).remove_entry(left_pos);
        let (left_node, right_node) = self.nodes.get2_mut(left, right);
        let (key, value) = left_node.redistribute(separator, right_node, new_left);
        self.nodes.get_mut(parent).insert_entry(left_pos, key, value);

        self.adopt_children(left);
        self.adopt_children(right);
        trace!(parent = ?parent, left_pos, more_to_right, size = l + r, new_left, "btree.redistribute");
        parent
    }
}
