use std::collections::VecDeque;
use std::fmt;

use super::{BPlusKey, BPlusNode, BPlusTree, NodeId};

/// One node as seen by a level-order traversal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeView {
    /// Depth below the root (root is level 0)
    pub level: usize,
    pub id: NodeId,
    pub is_leaf: bool,
    pub keys: Vec<BPlusKey>,
}

/// Level-order snapshot of a tree, for diagnostics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Traversal {
    pub nodes: Vec<NodeView>,
}

impl Traversal {
    pub(super) fn new(tree: &BPlusTree) -> Self {
        let mut nodes = Vec::new();
        let mut queue = VecDeque::new();

        if let Some(root_id) = tree.root_node_id() {
            queue.push_back((root_id, 0));
        }

        while let Some((id, level)) = queue.pop_front() {
            let Some(node) = tree.get_node(id) else {
                continue;
            };

            if let BPlusNode::Internal(internal) = node {
                queue.extend(internal.children.iter().map(|&child| (child, level + 1)));
            }

            nodes.push(NodeView {
                level,
                id,
                is_leaf: node.is_leaf(),
                keys: node.keys().to_vec(),
            });
        }

        Self { nodes }
    }

    /// Number of levels (0 for an empty tree)
    pub fn depth(&self) -> usize {
        self.nodes.last().map_or(0, |n| n.level + 1)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes at the given level, left to right
    pub fn level(&self, level: usize) -> impl Iterator<Item = &NodeView> {
        self.nodes.iter().filter(move |n| n.level == level)
    }

    /// Keys of every leaf, left to right
    pub fn leaf_keys(&self) -> Vec<BPlusKey> {
        self.nodes
            .iter()
            .filter(|n| n.is_leaf)
            .flat_map(|n| n.keys.iter().copied())
            .collect()
    }
}

impl fmt::Display for Traversal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for level in 0..self.depth() {
            writeln!(f, "Level: {level}")?;
            for node in self.level(level) {
                let keys: Vec<String> = node.keys.iter().map(ToString::to_string).collect();
                writeln!(f, "  [{}]", keys.join(" "))?;
            }
        }
        Ok(())
    }
}
