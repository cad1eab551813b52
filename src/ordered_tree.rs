use core::borrow::Borrow;
use core::fmt;
use core::ops::Index;

use crate::config::{Config, MinDegree};
use crate::error::{Result, TreeError};
use crate::raw::RawOrderedTree;

/// An ordered map based on a classical [B-Tree].
///
/// Every node stores entries, not only the leaves. Each node other than the
/// root holds between `t - 1` and `2t - 1` keys for the tree's
/// [minimum degree](MinDegree) `t`, and all leaves sit at the same depth, so
/// the height stays logarithmic in the number of entries.
///
/// Inserts split full nodes on the way down and deletes grow minimal nodes on
/// the way down, so neither operation ever walks back up the tree.
///
/// It is a logic error for a key to be modified in such a way that the key's
/// ordering relative to any other key, as determined by the [`Ord`] trait,
/// changes while it is in the tree. The behavior resulting from such a logic
/// error is not specified, but will be encapsulated to the `OrderedTree` that
/// observed the logic error and not result in undefined behavior.
///
/// # Examples
///
/// ```
/// use ordtree::{OrderedTree, TreeError};
///
/// let mut stations = OrderedTree::new();
/// stations.insert(42, "Alewife");
/// stations.insert(7, "Kendall");
/// stations.insert(19, "Harvard");
///
/// assert_eq!(stations.find(&19), Some(&"Harvard"));
/// assert_eq!(stations.minimum(), Ok(&"Kendall"));
/// assert_eq!(stations.maximum(), Ok(&"Alewife"));
///
/// assert_eq!(stations.delete(&7), Ok("Kendall"));
/// assert_eq!(stations.delete(&7), Err(TreeError::NotFound));
/// assert_eq!(stations[&42], "Alewife");
/// ```
///
/// An `OrderedTree` with a known list of items can be initialized from an array:
///
/// ```
/// use ordtree::OrderedTree;
///
/// let planets = OrderedTree::from([
///     ("Mercury", 0.4),
///     ("Venus", 0.7),
///     ("Earth", 1.0),
///     ("Mars", 1.5),
/// ]);
/// assert_eq!(planets.len(), 4);
/// ```
///
/// [B-Tree]: https://en.wikipedia.org/wiki/B-tree
pub struct OrderedTree<K, V> {
    raw: RawOrderedTree<K, V>,
}

impl<K, V> OrderedTree<K, V> {
    /// Makes a new, empty `OrderedTree` with minimum degree 2.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordtree::OrderedTree;
    ///
    /// let mut tree = OrderedTree::new();
    ///
    /// // entries can now be inserted into the empty tree
    /// tree.insert(1, "a");
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(Config::new())
    }

    /// Makes a new, empty `OrderedTree` with the given minimum degree.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordtree::{MinDegree, OrderedTree};
    ///
    /// let tree: OrderedTree<u64, ()> = OrderedTree::with_min_degree(MinDegree::new(16)?);
    /// assert_eq!(tree.min_degree().max_keys(), 31);
    /// # Ok::<(), ordtree::TreeError>(())
    /// ```
    #[must_use]
    pub fn with_min_degree(min_degree: MinDegree) -> Self {
        Self::with_config(Config::new().with_min_degree(min_degree))
    }

    /// Makes a new, empty `OrderedTree` from a full [`Config`].
    #[must_use]
    pub fn with_config(config: Config) -> Self {
        Self {
            raw: RawOrderedTree::new(config),
        }
    }

    /// Returns the configuration the tree was built with.
    #[must_use]
    pub const fn config(&self) -> &Config {
        self.raw.config()
    }

    /// Returns the minimum degree `t` of the tree.
    #[must_use]
    pub const fn min_degree(&self) -> MinDegree {
        self.raw.min_degree()
    }

    /// Returns the number of entries in the tree.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordtree::OrderedTree;
    ///
    /// let mut a = OrderedTree::new();
    /// assert_eq!(a.len(), 0);
    /// a.insert(1, "a");
    /// assert_eq!(a.len(), 1);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub const fn len(&self) -> usize {
        self.raw.len()
    }

    /// Returns `true` if the tree contains no entries.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Returns the number of levels in the tree. An empty tree, or one whose
    /// root is a leaf, has height 1.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordtree::OrderedTree;
    ///
    /// let mut tree = OrderedTree::new();
    /// assert_eq!(tree.height(), 1);
    /// tree.extend([(4, ()), (1, ()), (2, ()), (3, ())]);
    /// assert_eq!(tree.height(), 2);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[must_use]
    pub fn height(&self) -> usize {
        self.raw.height()
    }

    /// Clears the tree, removing all entries. The configuration is kept.
    ///
    /// # Complexity
    ///
    /// O(n)
    pub fn clear(&mut self) {
        self.raw.clear();
    }

    /// Returns a reference to the value stored under the smallest key.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::EmptyCollection`] if the tree is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordtree::{OrderedTree, TreeError};
    ///
    /// let mut tree = OrderedTree::new();
    /// assert_eq!(tree.minimum(), Err(TreeError::EmptyCollection));
    /// tree.insert(2, "b");
    /// tree.insert(1, "a");
    /// assert_eq!(tree.minimum(), Ok(&"a"));
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn minimum(&self) -> Result<&V> {
        self.raw
            .first_key_value()
            .map(|(_, value)| value)
            .ok_or(TreeError::EmptyCollection)
    }

    /// Returns a reference to the value stored under the largest key.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::EmptyCollection`] if the tree is empty.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn maximum(&self) -> Result<&V> {
        self.raw
            .last_key_value()
            .map(|(_, value)| value)
            .ok_or(TreeError::EmptyCollection)
    }

    /// Returns the first key-value pair in the tree.
    /// The key in this pair is the minimum key in the tree.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordtree::OrderedTree;
    ///
    /// let mut tree = OrderedTree::new();
    /// assert_eq!(tree.first_key_value(), None);
    /// tree.insert(1, "b");
    /// tree.insert(2, "a");
    /// assert_eq!(tree.first_key_value(), Some((&1, &"b")));
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[must_use]
    pub fn first_key_value(&self) -> Option<(&K, &V)> {
        self.raw.first_key_value()
    }

    /// Returns the last key-value pair in the tree.
    /// The key in this pair is the maximum key in the tree.
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[must_use]
    pub fn last_key_value(&self) -> Option<(&K, &V)> {
        self.raw.last_key_value()
    }
}

impl<K: Ord, V> OrderedTree<K, V> {
    /// Returns a reference to the value corresponding to the key.
    ///
    /// The key may be any borrowed form of the tree's key type, but the
    /// ordering on the borrowed form *must* match the ordering on the key type.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordtree::OrderedTree;
    ///
    /// let mut tree = OrderedTree::new();
    /// tree.insert(1, "a");
    /// assert_eq!(tree.find(&1), Some(&"a"));
    /// assert_eq!(tree.find(&2), None);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(t · log n)
    pub fn find<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.get(key)
    }

    /// Returns a mutable reference to the value corresponding to the key.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordtree::OrderedTree;
    ///
    /// let mut tree = OrderedTree::new();
    /// tree.insert(1, "a");
    /// if let Some(x) = tree.find_mut(&1) {
    ///     *x = "b";
    /// }
    /// assert_eq!(tree[&1], "b");
    /// ```
    ///
    /// # Complexity
    ///
    /// O(t · log n)
    pub fn find_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.get_mut(key)
    }

    /// Returns the key-value pair corresponding to the supplied key.
    ///
    /// # Complexity
    ///
    /// O(t · log n)
    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.get_key_value(key)
    }

    /// Returns `true` if the tree contains a value for the specified key.
    ///
    /// # Complexity
    ///
    /// O(t · log n)
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.search(key).is_some()
    }

    /// Inserts a key-value pair into the tree.
    ///
    /// If the tree did not have this key present, `None` is returned.
    ///
    /// If the tree did have this key present, the value is updated, and the old
    /// value is returned. The key is not updated, though; this matters for
    /// types that can be `==` without being identical.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordtree::OrderedTree;
    ///
    /// let mut tree = OrderedTree::new();
    /// assert_eq!(tree.insert(37, "a"), None);
    /// assert_eq!(tree.is_empty(), false);
    ///
    /// tree.insert(37, "b");
    /// assert_eq!(tree.insert(37, "c"), Some("b"));
    /// assert_eq!(tree[&37], "c");
    /// ```
    ///
    /// # Complexity
    ///
    /// O(t · log n)
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.raw.insert(key, value)
    }

    /// Removes a key from the tree, returning the value that was stored under it.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::NotFound`] if the key is absent. The tree is left
    /// untouched in that case.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordtree::{OrderedTree, TreeError};
    ///
    /// let mut tree = OrderedTree::new();
    /// tree.insert(1, "a");
    /// assert_eq!(tree.delete(&1), Ok("a"));
    /// assert_eq!(tree.delete(&1), Err(TreeError::NotFound));
    /// ```
    ///
    /// # Complexity
    ///
    /// O(t · log n)
    pub fn delete<Q>(&mut self, key: &Q) -> Result<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.delete(key)
    }

    /// Removes a key from the tree, returning the value at the key if the key
    /// was previously in the tree.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordtree::OrderedTree;
    ///
    /// let mut tree = OrderedTree::new();
    /// tree.insert(1, "a");
    /// assert_eq!(tree.remove(&1), Some("a"));
    /// assert_eq!(tree.remove(&1), None);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(t · log n)
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.delete(key).ok()
    }

    /// Removes a key from the tree, returning the stored key and value if the
    /// key was previously in the tree.
    ///
    /// # Complexity
    ///
    /// O(t · log n)
    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.delete_entry(key).ok()
    }

    /// Removes and returns the first entry in the tree.
    /// The key of this entry is the minimum key that was in the tree.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordtree::OrderedTree;
    ///
    /// let mut tree = OrderedTree::from([(2, "b"), (1, "a")]);
    /// assert_eq!(tree.pop_first(), Some((1, "a")));
    /// assert_eq!(tree.pop_first(), Some((2, "b")));
    /// assert_eq!(tree.pop_first(), None);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(t · log n)
    pub fn pop_first(&mut self) -> Option<(K, V)> {
        self.raw.pop_first()
    }

    /// Removes and returns the last entry in the tree.
    /// The key of this entry is the maximum key that was in the tree.
    ///
    /// # Complexity
    ///
    /// O(t · log n)
    pub fn pop_last(&mut self) -> Option<(K, V)> {
        self.raw.pop_last()
    }
}

impl<K: Clone, V: Clone> Clone for OrderedTree<K, V> {
    fn clone(&self) -> Self {
        Self { raw: self.raw.clone() }
    }
}

/// Shows the node layout, root first: each node's entries as a map followed
/// by a list of its children.
impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for OrderedTree<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrderedTree")
            .field("min_degree", &self.min_degree().get())
            .field("len", &self.len())
            .field("root", &self.raw.structure())
            .finish()
    }
}

impl<K, V> Default for OrderedTree<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for OrderedTree<K, V> {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut tree = OrderedTree::new();
        tree.extend(iter);
        tree
    }
}

impl<K: Ord, V> Extend<(K, V)> for OrderedTree<K, V> {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K, Q, V> Index<&Q> for OrderedTree<K, V>
where
    K: Borrow<Q> + Ord,
    Q: ?Sized + Ord,
{
    type Output = V;

    /// Returns a reference to the value corresponding to the supplied key.
    ///
    /// # Panics
    ///
    /// Panics if the key is not present in the tree.
    fn index(&self, key: &Q) -> &V {
        self.find(key).expect("no entry found for key")
    }
}

impl<K: Ord, V, const N: usize> From<[(K, V); N]> for OrderedTree<K, V> {
    fn from(arr: [(K, V); N]) -> Self {
        arr.into_iter().collect()
    }
}
