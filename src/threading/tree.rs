//! Arena storage for thread forests
//!
//! Nodes live in a single `Vec` and refer to their children by index, so a
//! forest is a plain value: no reference counting, no parent back-pointers.
//! Each node index is attached exactly once, either as a root or as the child
//! of one parent.

use std::fmt;

/// Index of a node inside its [`ThreadForest`].
pub type NodeId = usize;

/// One message in a thread tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadNode {
    /// Sequence number or UID, depending on how the caller issued the command
    pub id: u32,

    /// Child node indices, in thread order
    pub children: Vec<NodeId>,
}

/// An ordered list of thread trees sharing one node arena.
#[derive(Debug, Clone, Default)]
pub struct ThreadForest {
    nodes: Vec<ThreadNode>,
    roots: Vec<NodeId>,
}

impl ThreadForest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new top-level thread containing a single message.
    pub fn add_root(&mut self, id: u32) -> NodeId {
        let node = self.insert(id);
        self.push_root(node);
        node
    }

    /// Append a new message as the last child of `parent`.
    ///
    /// Panics if `parent` does not belong to this forest.
    pub fn add_child(&mut self, parent: NodeId, id: u32) -> NodeId {
        let node = self.insert(id);
        self.push_child(parent, node);
        node
    }

    /// Allocate a detached node. Callers must attach it with `push_root` or
    /// `push_child` exactly once.
    pub(crate) fn insert(&mut self, id: u32) -> NodeId {
        self.nodes.push(ThreadNode {
            id,
            children: Vec::new(),
        });
        self.nodes.len() - 1
    }

    pub(crate) fn push_root(&mut self, node: NodeId) {
        self.roots.push(node);
    }

    pub(crate) fn push_child(&mut self, parent: NodeId, node: NodeId) {
        self.nodes[parent].children.push(node);
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn node(&self, node: NodeId) -> Option<&ThreadNode> {
        self.nodes.get(node)
    }

    pub fn message_id(&self, node: NodeId) -> u32 {
        self.nodes[node].id
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.nodes[node].children
    }

    /// Total number of messages in all threads.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Pre-order traversal of every thread, yielding `(node, depth)` pairs
    /// with roots at depth 0.
    pub fn depth_first(&self) -> Vec<(NodeId, usize)> {
        let mut visited = Vec::with_capacity(self.nodes.len());

        // Reverse pushes keep left-to-right order when popping
        let mut stack: Vec<(NodeId, usize)> = self.roots.iter().rev().map(|&root| (root, 0)).collect();

        while let Some((node, depth)) = stack.pop() {
            visited.push((node, depth));
            for &child in self.nodes[node].children.iter().rev() {
                stack.push((child, depth + 1));
            }
        }

        visited
    }

    /// Message identifiers in pre-order.
    pub fn message_ids(&self) -> Vec<u32> {
        self.depth_first()
            .into_iter()
            .map(|(node, _)| self.nodes[node].id)
            .collect()
    }
}

/// Structural equality: same identifiers in the same shape, regardless of how
/// the nodes happen to be laid out in either arena.
impl PartialEq for ThreadForest {
    fn eq(&self, other: &Self) -> bool {
        if self.roots.len() != other.roots.len() {
            return false;
        }

        let mut pending: Vec<(NodeId, NodeId)> = self
            .roots
            .iter()
            .copied()
            .zip(other.roots.iter().copied())
            .collect();

        while let Some((left, right)) = pending.pop() {
            let (left, right) = (&self.nodes[left], &other.nodes[right]);
            if left.id != right.id || left.children.len() != right.children.len() {
                return false;
            }
            pending.extend(left.children.iter().copied().zip(right.children.iter().copied()));
        }

        true
    }
}

impl Eq for ThreadForest {}

/// Renders the THREAD response payload, e.g. `(3)(4 5 (6) (7 8))`.
impl fmt::Display for ThreadForest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&super::codec::format_threads(self))
    }
}
