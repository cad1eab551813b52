mod arena;
mod handle;
mod node;
mod raw_ordered_tree;
mod rebalance;

pub(crate) use raw_ordered_tree::RawOrderedTree;
