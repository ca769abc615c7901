use std::iter::FusedIterator;

use super::{BPlusKey, BPlusNode, BPlusTree, InternalNode, NodeId};

/// In-order iterator over the keys of a B+ tree
///
/// Leaves are not linked to each other, so the iterator keeps the chain of
/// internal nodes above the current leaf together with the next child to visit.
pub struct Iter<'a> {
    tree: &'a BPlusTree,
    /// Internal nodes on the path to the current leaf, with the next child index
    stack: Vec<(&'a InternalNode, usize)>,
    /// Keys of the current leaf not yet yielded
    leaf: &'a [BPlusKey],
    remaining: usize,
}

impl<'a> Iter<'a> {
    pub(super) fn new(tree: &'a BPlusTree) -> Self {
        let mut iter = Self {
            tree,
            stack: Vec::new(),
            leaf: &[],
            remaining: tree.len(),
        };

        if let Some(root_id) = tree.root_node_id() {
            iter.descend(root_id);
        }

        iter
    }

    /// Walk down the leftmost spine of `id`, stopping at its first leaf
    fn descend(&mut self, id: NodeId) {
        let mut current = id;

        loop {
            match self.tree.get_node(current) {
                Some(BPlusNode::Internal(node)) => {
                    self.stack.push((node, 1));
                    current = node.children[0];
                }
                Some(BPlusNode::Leaf(leaf)) => {
                    self.leaf = &leaf.keys;
                    return;
                }
                None => return,
            }
        }
    }
}

impl Iterator for Iter<'_> {
    type Item = BPlusKey;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some((&key, rest)) = self.leaf.split_first() {
                self.leaf = rest;
                self.remaining = self.remaining.saturating_sub(1);
                return Some(key);
            }

            // Current leaf exhausted: move to the next unvisited subtree
            let (node, next_child) = self.stack.last_mut()?;
            if let Some(&child_id) = node.children.get(*next_child) {
                *next_child += 1;
                self.descend(child_id);
            } else {
                self.stack.pop();
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl FusedIterator for Iter<'_> {}
