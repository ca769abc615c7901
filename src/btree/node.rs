use super::BPlusKey;

/// Node identifier (index into node storage)
pub type NodeId = usize;

/// Internal node: stores separator keys and child pointers
///
/// In this B+ tree variant:
/// - keys[i] is the smallest key reachable through children[i + 1]
/// - children.len() == keys.len() + 1
#[derive(Debug, Clone)]
pub struct InternalNode {
    /// Separator keys (sorted)
    pub keys: Vec<BPlusKey>,
    /// Child node IDs
    pub children: Vec<NodeId>,
}

impl InternalNode {
    /// Create a new internal node with given keys and children
    pub fn new(keys: Vec<BPlusKey>, children: Vec<NodeId>) -> Self {
        debug_assert_eq!(keys.len() + 1, children.len());
        Self { keys, children }
    }

    /// Number of separator keys
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Check if node has no separators left
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Find the child index for a given key
    /// Returns the number of separators <= key, so equal keys route right
    pub fn find_child_index(&self, key: BPlusKey) -> usize {
        self.keys.partition_point(|&k| k <= key)
    }

    /// Insert a separator and the new right child produced by splitting
    /// the child at `index`
    pub fn insert_child(&mut self, index: usize, separator: BPlusKey, right: NodeId) {
        self.keys.insert(index, separator);
        self.children.insert(index + 1, right);
    }

    /// Split this node around its middle separator.
    ///
    /// This node keeps the lower `mid` keys and `mid + 1` children. The key at
    /// `mid` is moved out and returned with the new right sibling.
    pub fn split(&mut self) -> (BPlusKey, InternalNode) {
        let mid = self.keys.len() / 2;

        let mut right_keys = self.keys.split_off(mid);
        let separator = right_keys.remove(0);
        let right_children = self.children.split_off(mid + 1);

        (separator, InternalNode::new(right_keys, right_children))
    }
}

/// Leaf node: stores the indexed keys
#[derive(Debug, Clone, Default)]
pub struct LeafNode {
    /// Keys (strictly ascending)
    pub keys: Vec<BPlusKey>,
}

impl LeafNode {
    /// Create a new empty leaf node
    pub fn new() -> Self {
        Self { keys: Vec::new() }
    }

    /// Create a leaf node with given keys
    pub fn with_keys(keys: Vec<BPlusKey>) -> Self {
        debug_assert!(keys.windows(2).all(|w| w[0] < w[1]));
        Self { keys }
    }

    /// Number of keys
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Check if leaf is empty
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Insert a key in sorted order
    /// Returns false if the key is already present
    pub fn insert(&mut self, key: BPlusKey) -> bool {
        match self.keys.binary_search(&key) {
            Ok(_) => false,
            Err(pos) => {
                self.keys.insert(pos, key);
                true
            }
        }
    }

    /// Check whether the leaf holds `key`
    pub fn contains(&self, key: BPlusKey) -> bool {
        self.keys.binary_search(&key).is_ok()
    }

    /// Delete a key
    /// Returns true if the key was present
    pub fn delete(&mut self, key: BPlusKey) -> bool {
        match self.keys.binary_search(&key) {
            Ok(pos) => {
                self.keys.remove(pos);
                true
            }
            Err(_) => false,
        }
    }

    /// Get the maximum key in this leaf
    pub fn max_key(&self) -> Option<BPlusKey> {
        self.keys.last().copied()
    }

    /// Get the minimum key in this leaf
    pub fn min_key(&self) -> Option<BPlusKey> {
        self.keys.first().copied()
    }

    /// Split this leaf node, returning the new right sibling
    /// This node keeps the first half, new node gets the second half
    pub fn split(&mut self) -> LeafNode {
        let mid = self.keys.len() / 2;
        LeafNode::with_keys(self.keys.split_off(mid))
    }
}

/// B+ tree node (either internal or leaf)
#[derive(Debug, Clone)]
pub enum BPlusNode {
    Internal(InternalNode),
    Leaf(LeafNode),
}

impl BPlusNode {
    /// Check if this is a leaf node
    pub fn is_leaf(&self) -> bool {
        matches!(self, BPlusNode::Leaf(_))
    }

    /// Check if this is an internal node
    pub fn is_internal(&self) -> bool {
        matches!(self, BPlusNode::Internal(_))
    }

    /// Keys stored in this node (separators for internal nodes)
    pub fn keys(&self) -> &[BPlusKey] {
        match self {
            BPlusNode::Internal(node) => &node.keys,
            BPlusNode::Leaf(node) => &node.keys,
        }
    }

    /// Number of keys stored in this node
    pub fn len(&self) -> usize {
        self.keys().len()
    }

    /// Check if the node holds no keys
    pub fn is_empty(&self) -> bool {
        self.keys().is_empty()
    }

    /// Get as internal node reference
    pub fn as_internal(&self) -> Option<&InternalNode> {
        match self {
            BPlusNode::Internal(node) => Some(node),
            BPlusNode::Leaf(_) => None,
        }
    }

    /// Get as internal node mutable reference
    pub fn as_internal_mut(&mut self) -> Option<&mut InternalNode> {
        match self {
            BPlusNode::Internal(node) => Some(node),
            BPlusNode::Leaf(_) => None,
        }
    }

    /// Get as leaf node reference
    pub fn as_leaf(&self) -> Option<&LeafNode> {
        match self {
            BPlusNode::Internal(_) => None,
            BPlusNode::Leaf(node) => Some(node),
        }
    }

    /// Get as leaf node mutable reference
    pub fn as_leaf_mut(&mut self) -> Option<&mut LeafNode> {
        match self {
            BPlusNode::Internal(_) => None,
            BPlusNode::Leaf(node) => Some(node),
        }
    }
}
