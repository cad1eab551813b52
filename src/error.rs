use thiserror::Error;

/// Result type returned by fallible [`OrderedTree`](crate::OrderedTree) operations.
pub type Result<T, E = TreeError> = core::result::Result<T, E>;

/// Recoverable failures reported by an [`OrderedTree`](crate::OrderedTree).
///
/// A failed operation leaves the tree exactly as it was. Broken structural
/// invariants are not reported here: they are bugs and panic instead.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
pub enum TreeError {
    /// `delete` was asked to remove a key the tree does not hold.
    #[error("key not found")]
    NotFound,
    /// `minimum` or `maximum` was called on a tree with no entries.
    #[error("tree is empty")]
    EmptyCollection,
    /// A minimum degree below 2 was requested.
    #[error("invalid minimum degree {degree}: must be at least 2")]
    InvalidMinDegree {
        /// The rejected degree.
        degree: usize,
    },
}
