pub mod btree;
pub mod config;
mod tracing_helpers;

pub use btree::{
    BPlusKey, BPlusNode, BPlusTree, BPlusTreeError, BPlusTreeResult, DEFAULT_ORDER, InternalNode,
    Iter, LeafNode, NodeId, NodeView, Traversal,
};
pub use config::{ConfigError, ConfigResult, IndexConfig};
