//! Tree shape configuration.

use core::fmt;
use core::num::NonZero;

use crate::error::{Result, TreeError};

/// The minimum degree `t` of a B-tree.
///
/// Every node other than the root holds between `t - 1` and `2t - 1` keys, and
/// an internal node has one more child than it has keys. `t` is at least 2,
/// which makes the smallest tree a 2-3-4 tree.
///
/// # Examples
///
/// ```
/// use ordtree::MinDegree;
///
/// let t = MinDegree::new(3).unwrap();
/// assert_eq!(t.min_keys(), 2);
/// assert_eq!(t.max_keys(), 5);
///
/// assert!(MinDegree::new(1).is_err());
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct MinDegree(NonZero<usize>);

impl MinDegree {
    /// The degree used by [`OrderedTree::new`](crate::OrderedTree::new).
    pub const DEFAULT: Self = match Self::new(2) {
        Ok(t) => t,
        Err(_) => panic!("default minimum degree is valid"),
    };

    /// Validates `t`.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::InvalidMinDegree`] if `t < 2`.
    pub const fn new(t: usize) -> Result<Self> {
        if t < 2 {
            return Err(TreeError::InvalidMinDegree { degree: t });
        }
        match NonZero::new(t) {
            Some(t) => Ok(Self(t)),
            None => Err(TreeError::InvalidMinDegree { degree: t }),
        }
    }

    /// Returns `t`.
    #[must_use]
    pub const fn get(self) -> usize {
        self.0.get()
    }

    /// Fewest keys a non-root node may hold, `t - 1`.
    #[must_use]
    pub const fn min_keys(self) -> usize {
        self.get() - 1
    }

    /// Most keys any node may hold, `2t - 1`.
    #[must_use]
    pub const fn max_keys(self) -> usize {
        2 * self.get() - 1
    }
}

impl Default for MinDegree {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for MinDegree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.get())
    }
}

impl TryFrom<usize> for MinDegree {
    type Error = TreeError;

    fn try_from(t: usize) -> Result<Self> {
        Self::new(t)
    }
}

/// Which sibling to pick when both neighbours of an underfull node are
/// equally good candidates for a merge or a redistribution.
///
/// The choice never affects correctness, only the exact shape of the tree.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum TieBreak {
    /// Use the left sibling.
    #[default]
    PreferLeft,
    /// Use the right sibling.
    PreferRight,
}

/// Construction options for an [`OrderedTree`](crate::OrderedTree).
///
/// # Examples
///
/// ```
/// use ordtree::{Config, MinDegree, OrderedTree, TieBreak};
///
/// let config = Config::new()
///     .with_min_degree(MinDegree::new(4).unwrap())
///     .with_tie_break(TieBreak::PreferRight);
/// let tree: OrderedTree<u32, &str> = OrderedTree::with_config(config);
/// assert_eq!(tree.min_degree().get(), 4);
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct Config {
    pub(crate) min_degree: MinDegree,
    pub(crate) tie_break: TieBreak,
}

impl Config {
    /// Default configuration: `t = 2`, [`TieBreak::PreferLeft`].
    #[must_use]
    pub const fn new() -> Self {
        Self {
            min_degree: MinDegree::DEFAULT,
            tie_break: TieBreak::PreferLeft,
        }
    }

    /// Sets the minimum degree.
    #[must_use]
    pub const fn with_min_degree(mut self, min_degree: MinDegree) -> Self {
        self.min_degree = min_degree;
        self
    }

    /// Sets the sibling tie-break rule.
    #[must_use]
    pub const fn with_tie_break(mut self, tie_break: TieBreak) -> Self {
        self.tie_break = tie_break;
        self
    }

    /// Returns the configured minimum degree.
    #[must_use]
    pub const fn min_degree(&self) -> MinDegree {
        self.min_degree
    }

    /// Returns the configured tie-break rule.
    #[must_use]
    pub const fn tie_break(&self) -> TieBreak {
        self.tie_break
    }
}
