//! B+ Tree implementation for ordered integer indexing
//!
//! This module provides an in-memory B+ tree of configurable order. It supports:
//! - Unique i64 keys (a key already present is not inserted twice)
//! - Point search and in-order iteration
//! - Borrow/merge rebalancing on delete with root collapse
//!
//! Keys live only in leaves. Internal nodes hold separator copies: every
//! key reachable through `children[i + 1]` is `>= keys[i]`.

mod error;
mod iter;
mod node;
mod traverse;


pub use error::{BPlusTreeError, BPlusTreeResult};
pub use iter::Iter;
pub use node::{BPlusNode, InternalNode, LeafNode, NodeId};
pub use traverse::{NodeView, Traversal};

use std::mem;

use crate::config::IndexConfig;
use crate::tracing_helpers::{debug_log, trace_log, warn_log};

/// Key type for B+ tree
pub type BPlusKey = i64;

/// Default B+ tree order
pub const DEFAULT_ORDER: usize = 5;

/// Smallest order the split and merge arithmetic supports
pub const MIN_ORDER: usize = 3;

/// Result of inserting into a subtree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InsertOutcome {
    /// The key was already present; nothing changed
    Present,
    /// The key was stored without changing the node layout above
    Inserted,
    /// The subtree root split; the caller must link `right` after it
    Split { separator: BPlusKey, right: NodeId },
}

/// B+ Tree data structure
///
/// Order `m` means:
/// - A node splits as soon as it holds `m` keys, so at most `m - 1` keys remain
/// - Internal nodes have at most `m` children
/// - Nodes (except root) hold at least `ceil(m/2) - 1` keys
#[derive(Debug, Clone)]
pub struct BPlusTree {
    /// Root node ID (None if tree is empty)
    root: Option<NodeId>,

    /// Tree order (max children per internal node)
    order: usize,

    /// Node storage
    nodes: Vec<Option<BPlusNode>>,

    /// Free list for recycling deleted nodes
    free_list: Vec<NodeId>,

    /// Total number of keys in the tree
    entry_count: usize,
}

impl BPlusTree {
    /// Create a new empty B+ tree with the given order
    ///
    /// # Arguments
    /// * `order` - The tree order (must be >= 3)
    ///
    /// # Returns
    /// * `Ok(BPlusTree)` - A new empty B+ tree
    /// * `Err(BPlusTreeError)` - If order is invalid
    pub fn new(order: usize) -> BPlusTreeResult<Self> {
        if order < MIN_ORDER {
            return Err(BPlusTreeError::InvalidOrder(order));
        }

        Ok(Self {
            root: None,
            order,
            nodes: Vec::new(),
            free_list: Vec::new(),
            entry_count: 0,
        })
    }

    /// Create a new empty B+ tree from a loaded configuration
    pub fn from_config(config: &IndexConfig) -> BPlusTreeResult<Self> {
        Self::new(config.order)
    }

    /// Get the tree order
    pub fn order(&self) -> usize {
        self.order
    }

    /// Check if tree is empty
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Get number of keys in the tree
    pub fn len(&self) -> usize {
        self.entry_count
    }

    /// Get tree height (1 for single leaf, 2+ for internal nodes)
    pub fn height(&self) -> usize {
        match self.root {
            None => 0,
            Some(root_id) => {
                let mut height = 1;
                let mut current = root_id;

                while let Some(BPlusNode::Internal(node)) = self.get_node(current) {
                    if let Some(&child_id) = node.children.first() {
                        current = child_id;
                        height += 1;
                    } else {
                        break;
                    }
                }

                height
            }
        }
    }

    /// Remove every key, releasing all nodes
    pub fn clear(&mut self) {
        self.root = None;
        self.nodes.clear();
        self.free_list.clear();
        self.entry_count = 0;
    }

    /// Maximum keys a node keeps once an operation completes
    fn max_keys(&self) -> usize {
        self.order - 1
    }

    /// Minimum keys in a node (except root)
    fn min_keys(&self) -> usize {
        self.order.div_ceil(2) - 1 // ceil(m/2) - 1
    }

    // ========== Node Management ==========

    /// Allocate a new node, returning its ID
    fn allocate_node(&mut self, node: BPlusNode) -> NodeId {
        if let Some(id) = self.free_list.pop() {
            self.nodes[id] = Some(node);
            id
        } else {
            let id = self.nodes.len();
            self.nodes.push(Some(node));
            id
        }
    }

    /// Get a reference to a node by ID
    pub fn get_node(&self, id: NodeId) -> Option<&BPlusNode> {
        self.nodes.get(id).and_then(|n| n.as_ref())
    }

    /// Get a mutable reference to a node by ID
    fn get_node_mut(&mut self, id: NodeId) -> Option<&mut BPlusNode> {
        self.nodes.get_mut(id).and_then(|n| n.as_mut())
    }

    /// Get the root node ID
    pub fn root_node_id(&self) -> Option<NodeId> {
        self.root
    }

    /// Get the number of live nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len() - self.free_list.len()
    }

    /// Remove a node from storage, adding its slot to the free list
    fn release_node(&mut self, id: NodeId) -> BPlusNode {
        match self.nodes.get_mut(id).and_then(Option::take) {
            Some(node) => {
                self.free_list.push(id);
                node
            }
            None => dangling(id),
        }
    }

    // Accessors used by the algorithms below. A missing node or a node of the
    // wrong kind means the tree structure is corrupt, which is fatal.

    fn node(&self, id: NodeId) -> &BPlusNode {
        self.get_node(id).unwrap_or_else(|| dangling(id))
    }

    fn node_mut(&mut self, id: NodeId) -> &mut BPlusNode {
        self.get_node_mut(id).unwrap_or_else(|| dangling(id))
    }

    fn internal(&self, id: NodeId) -> &InternalNode {
        self.node(id)
            .as_internal()
            .unwrap_or_else(|| panic!("B+ tree corrupt: node {id} is not internal"))
    }

    fn internal_mut(&mut self, id: NodeId) -> &mut InternalNode {
        self.node_mut(id)
            .as_internal_mut()
            .unwrap_or_else(|| panic!("B+ tree corrupt: node {id} is not internal"))
    }

    fn leaf_mut(&mut self, id: NodeId) -> &mut LeafNode {
        self.node_mut(id)
            .as_leaf_mut()
            .unwrap_or_else(|| panic!("B+ tree corrupt: node {id} is not a leaf"))
    }

    // ========== Search Operations ==========

    /// Search for a key, returning it if present
    pub fn search(&self, key: BPlusKey) -> Option<BPlusKey> {
        let leaf_id = self.find_leaf(key)?;
        let leaf = self.get_node(leaf_id)?.as_leaf()?;
        leaf.contains(key).then_some(key)
    }

    /// Check whether the tree holds `key`
    pub fn contains(&self, key: BPlusKey) -> bool {
        self.search(key).is_some()
    }

    /// Smallest key in the tree
    pub fn first_key(&self) -> Option<BPlusKey> {
        self.first_key_under(self.root?)
    }

    /// Largest key in the tree
    pub fn last_key(&self) -> Option<BPlusKey> {
        let mut current = self.root?;

        loop {
            match self.get_node(current)? {
                BPlusNode::Leaf(leaf) => return leaf.max_key(),
                BPlusNode::Internal(node) => current = *node.children.last()?,
            }
        }
    }

    /// Leftmost key of the subtree rooted at `id` (its in-order minimum)
    fn first_key_under(&self, id: NodeId) -> Option<BPlusKey> {
        let mut current = id;

        loop {
            match self.get_node(current)? {
                BPlusNode::Leaf(leaf) => return leaf.min_key(),
                BPlusNode::Internal(node) => current = *node.children.first()?,
            }
        }
    }

    /// Find the leaf node that should contain the given key
    fn find_leaf(&self, key: BPlusKey) -> Option<NodeId> {
        let mut current = self.root?;

        loop {
            match self.get_node(current)? {
                BPlusNode::Leaf(_) => return Some(current),
                BPlusNode::Internal(node) => {
                    let child_idx = node.find_child_index(key);
                    current = node.children[child_idx];
                }
            }
        }
    }

    // ========== Insert Operations ==========

    /// Insert a key into the tree
    /// Returns false if the key was already present
    pub fn insert(&mut self, key: BPlusKey) -> bool {
        let Some(root_id) = self.root else {
            // Create first leaf as root
            let leaf_id = self.allocate_node(BPlusNode::Leaf(LeafNode::with_keys(vec![key])));
            self.root = Some(leaf_id);
            self.entry_count = 1;
            return true;
        };

        let inserted = match self.insert_into(root_id, key) {
            InsertOutcome::Present => false,
            InsertOutcome::Inserted => true,
            InsertOutcome::Split { separator, right } => {
                // Split the root - create new root
                let new_root = InternalNode::new(vec![separator], vec![root_id, right]);
                let new_root_id = self.allocate_node(BPlusNode::Internal(new_root));
                self.root = Some(new_root_id);
                trace_log!(root = new_root_id, separator, "root split, tree grew");
                true
            }
        };

        if inserted {
            self.entry_count += 1;
        }

        inserted
    }

    /// Insert into the subtree rooted at `node_id`, splitting on the way up
    fn insert_into(&mut self, node_id: NodeId, key: BPlusKey) -> InsertOutcome {
        let order = self.order;

        let (child_idx, child_id) = match self.node_mut(node_id) {
            BPlusNode::Leaf(leaf) => {
                if !leaf.insert(key) {
                    return InsertOutcome::Present;
                }
                if leaf.len() < order {
                    return InsertOutcome::Inserted;
                }

                // Full: the right half's first key is copied up
                let right = leaf.split();
                let separator = right.keys[0];
                let right_id = self.allocate_node(BPlusNode::Leaf(right));
                trace_log!(leaf = node_id, right = right_id, separator, "leaf split");
                return InsertOutcome::Split {
                    separator,
                    right: right_id,
                };
            }
            BPlusNode::Internal(node) => {
                let child_idx = node.find_child_index(key);
                (child_idx, node.children[child_idx])
            }
        };

        let (separator, right) = match self.insert_into(child_id, key) {
            InsertOutcome::Split { separator, right } => (separator, right),
            outcome => return outcome,
        };

        let node = self.internal_mut(node_id);
        node.insert_child(child_idx, separator, right);
        if node.len() < order {
            return InsertOutcome::Inserted;
        }

        // Full: the middle separator moves up
        let (separator, right) = node.split();
        let right_id = self.allocate_node(BPlusNode::Internal(right));
        trace_log!(node = node_id, right = right_id, separator, "internal split");
        InsertOutcome::Split {
            separator,
            right: right_id,
        }
    }

    // ========== Delete Operations ==========

    /// Delete a key from the tree
    /// Returns true if the key was present
    pub fn delete(&mut self, key: BPlusKey) -> bool {
        let Some(root_id) = self.root else {
            warn_log!(key, "delete from an empty tree");
            return false;
        };

        if !self.delete_from(root_id, key) {
            return false;
        }

        self.entry_count -= 1;
        self.collapse_root();

        true
    }

    /// Delete from the subtree rooted at `node_id`, repairing underfull
    /// children on the way up
    fn delete_from(&mut self, node_id: NodeId, key: BPlusKey) -> bool {
        let (child_idx, child_id) = match self.node_mut(node_id) {
            BPlusNode::Leaf(leaf) => return leaf.delete(key),
            BPlusNode::Internal(node) => {
                let child_idx = node.find_child_index(key);
                (child_idx, node.children[child_idx])
            }
        };

        if !self.delete_from(child_id, key) {
            return false;
        }

        // The separator naming the deleted key moves on to its successor
        if child_idx > 0 && self.internal(node_id).keys[child_idx - 1] == key {
            if let Some(successor) = self.first_key_under(child_id) {
                self.internal_mut(node_id).keys[child_idx - 1] = successor;
            }
        }

        if self.node(child_id).len() < self.min_keys() {
            self.fill(node_id, child_idx);
        }

        true
    }

    /// Shrink the tree when the root ran out of keys
    fn collapse_root(&mut self) {
        let Some(root_id) = self.root else {
            return;
        };

        let new_root = match self.node(root_id) {
            BPlusNode::Internal(node) if node.is_empty() => Some(node.children[0]),
            BPlusNode::Leaf(leaf) if leaf.is_empty() => None,
            _ => return,
        };

        self.release_node(root_id);
        self.root = new_root;
        trace_log!(old_root = root_id, new_root = ?new_root, "root collapsed");
    }

    /// Restore the minimum occupancy of `children[child_idx]`
    fn fill(&mut self, parent_id: NodeId, child_idx: usize) {
        let min = self.min_keys();
        let (left_id, right_id) = {
            let parent = self.internal(parent_id);
            let left = child_idx.checked_sub(1).map(|i| parent.children[i]);
            let right = parent.children.get(child_idx + 1).copied();
            (left, right)
        };

        if left_id.is_some_and(|id| self.node(id).len() > min) {
            self.borrow_from_left(parent_id, child_idx);
        } else if right_id.is_some_and(|id| self.node(id).len() > min) {
            self.borrow_from_right(parent_id, child_idx);
        } else if left_id.is_some() {
            self.merge_children(parent_id, child_idx - 1);
        } else {
            self.merge_children(parent_id, child_idx);
        }
    }

    /// Rotate the last entry of the left sibling into `children[child_idx]`
    fn borrow_from_left(&mut self, parent_id: NodeId, child_idx: usize) {
        let (left_id, node_id) = {
            let parent = self.internal(parent_id);
            (parent.children[child_idx - 1], parent.children[child_idx])
        };

        match self.node_mut(left_id) {
            BPlusNode::Leaf(left) => {
                let key = left.keys.pop().expect("left sibling has surplus keys");
                self.leaf_mut(node_id).keys.insert(0, key);
                self.internal_mut(parent_id).keys[child_idx - 1] = key;
            }
            BPlusNode::Internal(left) => {
                let key = left.keys.pop().expect("left sibling has surplus keys");
                let child = left.children.pop().expect("left sibling has surplus children");
                let separator = mem::replace(&mut self.internal_mut(parent_id).keys[child_idx - 1], key);
                let node = self.internal_mut(node_id);
                node.keys.insert(0, separator);
                node.children.insert(0, child);
            }
        }

        trace_log!(node = node_id, from = left_id, "borrowed from left sibling");
    }

    /// Rotate the first entry of the right sibling into `children[child_idx]`
    fn borrow_from_right(&mut self, parent_id: NodeId, child_idx: usize) {
        let (node_id, right_id) = {
            let parent = self.internal(parent_id);
            (parent.children[child_idx], parent.children[child_idx + 1])
        };

        match self.node_mut(right_id) {
            BPlusNode::Leaf(right) => {
                let key = right.keys.remove(0);
                let new_first = right.keys[0];
                self.leaf_mut(node_id).keys.push(key);
                self.internal_mut(parent_id).keys[child_idx] = new_first;
            }
            BPlusNode::Internal(right) => {
                let key = right.keys.remove(0);
                let child = right.children.remove(0);
                let separator = mem::replace(&mut self.internal_mut(parent_id).keys[child_idx], key);
                let node = self.internal_mut(node_id);
                node.keys.push(separator);
                node.children.push(child);
            }
        }

        trace_log!(node = node_id, from = right_id, "borrowed from right sibling");
    }

    /// Merge `children[left_idx + 1]` into `children[left_idx]`
    fn merge_children(&mut self, parent_id: NodeId, left_idx: usize) {
        let (left_id, right_id, separator) = {
            let parent = self.internal_mut(parent_id);
            let separator = parent.keys.remove(left_idx);
            let right_id = parent.children.remove(left_idx + 1);
            (parent.children[left_idx], right_id, separator)
        };

        let right = self.release_node(right_id);

        match (self.node_mut(left_id), right) {
            (BPlusNode::Leaf(left), BPlusNode::Leaf(right)) => {
                // Leaf separators are copies; the key itself stays in the leaf
                left.keys.extend(right.keys);
            }
            (BPlusNode::Internal(left), BPlusNode::Internal(right)) => {
                left.keys.push(separator);
                left.keys.extend(right.keys);
                left.children.extend(right.children);
            }
            _ => panic!("B+ tree corrupt: siblings {left_id} and {right_id} differ in kind"),
        }

        trace_log!(into = left_id, merged = right_id, separator, "merged siblings");
    }

    // ========== Traversal ==========

    /// Iterate over all keys in ascending order
    pub fn iter(&self) -> Iter<'_> {
        Iter::new(self)
    }

    /// Collect all keys in ascending order
    pub fn keys(&self) -> Vec<BPlusKey> {
        self.iter().collect()
    }

    /// Level-order snapshot of every node, parents before children
    pub fn traverse(&self) -> Traversal {
        let traversal = Traversal::new(self);
        debug_log!(levels = traversal.depth(), "tree traversal\n{}", traversal);
        traversal
    }

    // ========== Validation ==========

    /// Audit the whole tree structure
    ///
    /// Checks key ordering, node occupancy, child counts, separator bounds,
    /// uniform leaf depth and the cached key count.
    pub fn check_invariants(&self) -> BPlusTreeResult<()> {
        let mut audit = Audit::default();

        if let Some(root_id) = self.root {
            self.check_node(root_id, None, None, 1, &mut audit)?;
        }

        if audit.entries != self.entry_count {
            return Err(BPlusTreeError::InvalidState(format!(
                "counted {} keys but tree reports {}",
                audit.entries, self.entry_count
            )));
        }

        Ok(())
    }

    fn check_node(
        &self,
        id: NodeId,
        lower: Option<BPlusKey>,
        upper: Option<BPlusKey>,
        depth: usize,
        audit: &mut Audit,
    ) -> BPlusTreeResult<()> {
        let node = self.get_node(id).ok_or(BPlusTreeError::NodeNotFound(id))?;
        let keys = node.keys();
        let is_root = self.root == Some(id);

        if keys.windows(2).any(|w| w[0] >= w[1]) {
            return Err(invalid(id, "keys are not strictly ascending"));
        }
        if keys.len() > self.max_keys() {
            return Err(invalid(id, "node overflows"));
        }
        if !is_root && keys.len() < self.min_keys() {
            return Err(invalid(id, "node underflows"));
        }
        if is_root && keys.is_empty() {
            return Err(invalid(id, "root holds no keys"));
        }
        let in_bounds = |k: &BPlusKey| lower.is_none_or(|lo| *k >= lo) && upper.is_none_or(|hi| *k < hi);
        if !keys.iter().all(in_bounds) {
            return Err(invalid(id, "key outside parent separator bounds"));
        }

        match node {
            BPlusNode::Leaf(leaf) => {
                match audit.leaf_depth {
                    None => audit.leaf_depth = Some(depth),
                    Some(expected) if expected != depth => {
                        return Err(invalid(id, "leaf depth differs from other leaves"));
                    }
                    Some(_) => {}
                }
                audit.entries += leaf.len();
            }
            BPlusNode::Internal(internal) => {
                if internal.children.len() != internal.keys.len() + 1 {
                    return Err(invalid(id, "child count does not match key count"));
                }
                for (i, &child_id) in internal.children.iter().enumerate() {
                    let child_lower = if i == 0 { lower } else { Some(internal.keys[i - 1]) };
                    let child_upper = internal.keys.get(i).copied().or(upper);
                    self.check_node(child_id, child_lower, child_upper, depth + 1, audit)?;
                }
            }
        }

        Ok(())
    }
}

impl Default for BPlusTree {
    fn default() -> Self {
        Self {
            root: None,
            order: DEFAULT_ORDER,
            nodes: Vec::new(),
            free_list: Vec::new(),
            entry_count: 0,
        }
    }
}

impl Extend<BPlusKey> for BPlusTree {
    fn extend<I: IntoIterator<Item = BPlusKey>>(&mut self, iter: I) {
        for key in iter {
            self.insert(key);
        }
    }
}

impl<'a> IntoIterator for &'a BPlusTree {
    type Item = BPlusKey;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Running totals collected by `check_invariants`
#[derive(Debug, Default)]
struct Audit {
    leaf_depth: Option<usize>,
    entries: usize,
}

fn invalid(id: NodeId, what: &str) -> BPlusTreeError {
    BPlusTreeError::InvalidState(format!("node {id}: {what}"))
}

#[cold]
fn dangling(id: NodeId) -> ! {
    panic!("B+ tree corrupt: node {id} is not allocated")
}

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_new_tree() {
        let tree = BPlusTree::new(4).unwrap();
        assert!(tree.is_empty());
        assert_eq!(tree.len(), 0);
        assert_eq!(tree.height(), 0);
        assert_eq!(tree.order(), 4);
        assert!(tree.check_invariants().is_ok());
    }

    #[test]
    fn test_invalid_order() {
        assert_eq!(BPlusTree::new(2).unwrap_err(), BPlusTreeError::InvalidOrder(2));
        assert!(BPlusTree::new(1).is_err());
        assert!(BPlusTree::new(0).is_err());
        assert!(BPlusTree::new(3).is_ok());
    }

    #[test]
    fn test_default_order() {
        let tree = BPlusTree::default();
        assert_eq!(tree.order(), DEFAULT_ORDER);
        assert!(tree.is_empty());
    }

    #[test]
    fn test_single_insert_and_search() {
        let mut tree = BPlusTree::new(4).unwrap();

        assert!(tree.insert(42));

        assert!(!tree.is_empty());
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.height(), 1);
        assert_eq!(tree.search(42), Some(42));
        assert_eq!(tree.search(41), None);
    }

    #[test]
    fn test_search_returns_queried_key() {
        let mut tree = BPlusTree::default();
        tree.extend([1, 2, 3, 4]);

        // Every hit reports the key itself, not some other key of its leaf
        for key in 1..=4 {
            assert_eq!(tree.search(key), Some(key));
        }
    }

    #[test]
    fn test_duplicate_insert_rejected() {
        let mut tree = BPlusTree::new(4).unwrap();

        assert!(tree.insert(10));
        assert!(!tree.insert(10));

        assert_eq!(tree.len(), 1);
        assert_eq!(tree.keys(), vec![10]);
    }

    #[test]
    fn test_zero_and_negative_keys() {
        let mut tree = BPlusTree::new(3).unwrap();

        for key in [-10, 0, 10, -5, 5] {
            tree.insert(key);
        }

        assert_eq!(tree.search(0), Some(0));
        assert_eq!(tree.keys(), vec![-10, -5, 0, 5, 10]);
        assert!(tree.delete(0));
        assert_eq!(tree.search(0), None);
        tree.check_invariants().unwrap();
    }

    #[test]
    fn test_leaf_split() {
        let mut tree = BPlusTree::new(4).unwrap();

        // A leaf splits once it holds 4 keys
        for key in [10, 20, 30] {
            tree.insert(key);
        }
        assert_eq!(tree.height(), 1);

        tree.insert(40);

        assert_eq!(tree.len(), 4);
        assert_eq!(tree.height(), 2);
        let root = tree.get_node(tree.root_node_id().unwrap()).unwrap();
        assert_eq!(root.keys(), &[30]);
        for key in [10, 20, 30, 40] {
            assert_eq!(tree.search(key), Some(key));
        }
        tree.check_invariants().unwrap();
    }

    #[test]
    fn test_multiple_splits() {
        let mut tree = BPlusTree::new(4).unwrap();

        for i in 0..20 {
            tree.insert(i * 10);
        }

        assert_eq!(tree.len(), 20);
        assert!(tree.height() >= 3);
        for i in 0..20 {
            assert_eq!(tree.search(i * 10), Some(i * 10));
        }
        tree.check_invariants().unwrap();
    }

    #[test]
    fn test_delete_single() {
        let mut tree = BPlusTree::new(4).unwrap();

        tree.extend([10, 20, 30]);

        assert!(tree.delete(20));
        assert_eq!(tree.len(), 2);
        assert_eq!(tree.search(20), None);
        assert_eq!(tree.search(10), Some(10));
        assert_eq!(tree.search(30), Some(30));
    }

    #[test]
    fn test_delete_not_found() {
        let mut tree = BPlusTree::new(4).unwrap();

        tree.insert(10);

        assert!(!tree.delete(20));
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_delete_from_empty_tree() {
        let mut tree = BPlusTree::default();

        assert!(!tree.delete(1));
        assert!(tree.is_empty());
    }

    #[test]
    fn test_delete_until_empty() {
        let mut tree = BPlusTree::new(4).unwrap();

        tree.extend([10, 20, 30]);

        tree.delete(10);
        tree.delete(20);
        tree.delete(30);

        assert!(tree.is_empty());
        assert_eq!(tree.len(), 0);
        assert_eq!(tree.height(), 0);
        assert_eq!(tree.node_count(), 0);
    }

    #[test]
    fn test_delete_separator_key_refreshes_parent() {
        let mut tree = BPlusTree::new(5).unwrap();

        // Root [3] over leaves [1, 2] and [3, 4, 5]
        tree.extend(1..=5);
        assert!(tree.delete(3));

        let root = tree.get_node(tree.root_node_id().unwrap()).unwrap();
        assert_eq!(root.keys(), &[4]);
        assert_eq!(tree.keys(), vec![1, 2, 4, 5]);
        tree.check_invariants().unwrap();
    }

    #[test]
    fn test_delete_with_borrow_from_right() {
        let mut tree = BPlusTree::new(5).unwrap();

        // Leaves [1, 2] [3, 4, 5, 6]
        tree.extend(1..=6);
        assert!(tree.delete(1));

        let root = tree.get_node(tree.root_node_id().unwrap()).unwrap();
        assert_eq!(root.keys(), &[4]);
        assert_eq!(tree.height(), 2);
        tree.check_invariants().unwrap();
    }

    #[test]
    fn test_delete_with_borrow_from_left() {
        let mut tree = BPlusTree::new(5).unwrap();

        // Leaves [1, 2] [3, 4, 5]; grow the left leaf then drain the right one
        tree.extend(1..=5);
        tree.insert(0);
        assert!(tree.delete(5));
        assert!(tree.delete(4));

        let root = tree.get_node(tree.root_node_id().unwrap()).unwrap();
        assert_eq!(root.keys(), &[2]);
        assert_eq!(tree.keys(), vec![0, 1, 2, 3]);
        tree.check_invariants().unwrap();
    }

    #[test]
    fn test_delete_with_merge_collapses_root() {
        let mut tree = BPlusTree::new(5).unwrap();

        tree.extend(1..=5);
        assert_eq!(tree.height(), 2);

        assert!(tree.delete(5));
        assert!(tree.delete(4));

        // Leaves [1, 2] and [3] merged, the empty root was dropped
        assert_eq!(tree.height(), 1);
        assert_eq!(tree.keys(), vec![1, 2, 3]);
        assert_eq!(tree.node_count(), 1);
        tree.check_invariants().unwrap();
    }

    #[test]
    fn test_node_slots_are_recycled() {
        let mut tree = BPlusTree::new(3).unwrap();

        tree.extend(0..50);
        let peak = tree.node_count();
        for key in 0..50 {
            tree.delete(key);
        }
        assert_eq!(tree.node_count(), 0);

        tree.extend(0..50);
        assert_eq!(tree.node_count(), peak);
        tree.check_invariants().unwrap();
    }

    #[test]
    fn test_first_and_last_key() {
        let mut tree = BPlusTree::new(3).unwrap();
        assert_eq!(tree.first_key(), None);
        assert_eq!(tree.last_key(), None);

        tree.extend([50, 30, 70, 20, 40, 60, 80, 10]);

        assert_eq!(tree.first_key(), Some(10));
        assert_eq!(tree.last_key(), Some(80));
    }

    #[test]
    fn test_clear() {
        let mut tree = BPlusTree::default();
        tree.extend(0..100);

        tree.clear();

        assert!(tree.is_empty());
        assert_eq!(tree.node_count(), 0);
        assert!(tree.insert(7));
        assert_eq!(tree.keys(), vec![7]);
    }

    #[test]
    fn test_check_invariants_detects_corruption() {
        let mut tree = BPlusTree::new(4).unwrap();
        tree.extend([10, 20, 30, 40]);

        let root_id = tree.root_node_id().unwrap();
        tree.internal_mut(root_id).keys[0] = 5;

        assert!(matches!(
            tree.check_invariants(),
            Err(BPlusTreeError::InvalidState(_))
        ));
    }

    #[test]
    fn test_from_config() {
        let config = IndexConfig { order: 7 };
        assert_eq!(BPlusTree::from_config(&config).unwrap().order(), 7);

        let config = IndexConfig { order: 1 };
        assert_eq!(
            BPlusTree::from_config(&config).unwrap_err(),
            BPlusTreeError::InvalidOrder(1)
        );
    }
}
