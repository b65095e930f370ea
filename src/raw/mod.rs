mod arena;
mod handle;
mod inspect;
mod node;
mod raw_bplus_tree;
mod rebalance;
mod split;

pub(crate) use arena::Arena;
pub(crate) use handle::Handle;
pub(crate) use node::Node;
pub(crate) use raw_bplus_tree::RawBPlusTree;
