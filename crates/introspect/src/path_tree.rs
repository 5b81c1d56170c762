//! Trie of field-path segments.
//!
//! Every decoded leaf is named by a path such as `joints/3/position`. Instead
//! of materialising that string per value, the decoder records a
//! [`LeafHandle`]: the id of the terminal node plus the array indices met on
//! the way down. All elements of one array share a single wildcard child,
//! created only through [`PathTree::insert_wildcard`], so the tree grows with
//! the schema shape and not with the amount of data.
//!
//! Nodes live in an arena owned by the [`PathTree`] and refer to each other by
//! [`NodeId`]; the tree can be cloned freely.

use crate::error::{Error, Result};
use std::collections::BTreeMap;

/// Text of a wildcard node that has no recorded index.
pub const WILDCARD: &str = "#";

/// Maximum number of array indices a [`LeafHandle`] can record.
pub const MAX_ARRAY_DEPTH: usize = 7;

/// Index of a node inside its [`PathTree`].
///
/// Only meaningful for the tree that returned it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(&self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
struct PathNode {
    segment: String,
    parent: Option<NodeId>,
    children: BTreeMap<String, NodeId>,
    wildcard_child: Option<NodeId>,
    is_wildcard: bool,
}

impl PathNode {
    fn new(segment: &str, parent: Option<NodeId>, is_wildcard: bool) -> Self {
        Self {
            segment: segment.to_string(),
            parent,
            children: BTreeMap::new(),
            wildcard_child: None,
            is_wildcard,
        }
    }
}

/// Arena-backed trie of path segments.
#[derive(Debug, Clone)]
pub struct PathTree {
    nodes: Vec<PathNode>,
}

impl Default for PathTree {
    fn default() -> Self {
        Self::new("")
    }
}

impl PathTree {
    /// Tree with a single root node. An empty root segment is left out of
    /// rendered paths.
    pub fn new(root_segment: &str) -> Self {
        Self {
            nodes: vec![PathNode::new(root_segment, None, false)],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Number of nodes, root included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn segment(&self, id: NodeId) -> &str {
        &self.nodes[id.0].segment
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    /// True only for nodes made by [`PathTree::insert_wildcard`].
    pub fn is_wildcard(&self, id: NodeId) -> bool {
        self.nodes[id.0].is_wildcard
    }

    /// Named children of `id` ordered by segment. The wildcard child is not listed.
    pub fn children(&self, id: NodeId) -> impl Iterator<Item = (&str, NodeId)> {
        self.nodes[id.0]
            .children
            .iter()
            .map(|(segment, child)| (segment.as_str(), *child))
    }

    pub fn find_child(&self, parent: NodeId, segment: &str) -> Option<NodeId> {
        self.nodes[parent.0].children.get(segment).copied()
    }

    pub fn find_wildcard(&self, parent: NodeId) -> Option<NodeId> {
        self.nodes[parent.0].wildcard_child
    }

    /// Return the child of `parent` named `segment`, creating it if absent.
    pub fn insert_child(&mut self, parent: NodeId, segment: &str) -> NodeId {
        if let Some(existing) = self.find_child(parent, segment) {
            return existing;
        }
        let id = NodeId(self.nodes.len());
        self.nodes.push(PathNode::new(segment, Some(parent), false));
        self.nodes[parent.0].children.insert(segment.to_string(), id);
        id
    }

    /// Return the array-element child of `parent`, creating it if absent.
    pub fn insert_wildcard(&mut self, parent: NodeId) -> NodeId {
        if let Some(existing) = self.find_wildcard(parent) {
            return existing;
        }
        let id = NodeId(self.nodes.len());
        self.nodes.push(PathNode::new(WILDCARD, Some(parent), true));
        self.nodes[parent.0].wildcard_child = Some(id);
        id
    }

    /// Render the full path of `leaf`.
    pub fn leaf_path(&self, leaf: &LeafHandle) -> String {
        let mut out = String::new();
        self.write_path(leaf, &mut out);
        out
    }

    /// Render the full path of `leaf` into `out`, replacing its contents.
    ///
    /// Wildcard segments are replaced by the recorded indices in root-to-leaf
    /// order. A wildcard with no recorded index is written as-is.
    pub fn write_path(&self, leaf: &LeafHandle, out: &mut String) {
        out.clear();

        let mut branch = Vec::new();
        let mut cursor = Some(leaf.node);
        while let Some(id) = cursor {
            branch.push(id);
            cursor = self.parent(id);
        }

        let mut indices = leaf.indices().iter();
        for id in branch.into_iter().rev() {
            let segment = self.segment(id);
            if id == self.root() && segment.is_empty() {
                continue;
            }
            if !out.is_empty() {
                out.push('/');
            }
            if self.is_wildcard(id) {
                match indices.next() {
                    Some(index) => out.push_str(&index.to_string()),
                    None => out.push_str(WILDCARD),
                }
            } else {
                out.push_str(segment);
            }
        }
    }

    /// Drop every node created after the tree had `len` nodes.
    pub(crate) fn truncate(&mut self, len: usize) {
        let len = len.max(1);
        while self.nodes.len() > len {
            let Some(node) = self.nodes.pop() else {
                break;
            };
            if let Some(parent) = node.parent.and_then(|p| self.nodes.get_mut(p.0)) {
                if node.is_wildcard {
                    parent.wildcard_child = None;
                } else {
                    parent.children.remove(&node.segment);
                }
            }
        }
    }
}

/// Compact name of one decoded leaf: a node id plus the array indices
/// recorded root-to-leaf. Cheap to copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LeafHandle {
    node: NodeId,
    depth: u8,
    indices: [u32; MAX_ARRAY_DEPTH],
}

impl LeafHandle {
    pub fn new(node: NodeId) -> Self {
        Self {
            node,
            depth: 0,
            indices: [0; MAX_ARRAY_DEPTH],
        }
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Recorded array indices, outermost first.
    pub fn indices(&self) -> &[u32] {
        &self.indices[..self.depth as usize]
    }

    /// Same indices, different node.
    pub fn with_node(&self, node: NodeId) -> Self {
        Self { node, ..*self }
    }

    /// Record one more array index.
    pub fn push_index(&mut self, index: u32) -> Result<()> {
        let depth = self.depth as usize;
        if depth >= MAX_ARRAY_DEPTH {
            return Err(Error::PathTooDeep {
                max: MAX_ARRAY_DEPTH,
            });
        }
        self.indices[depth] = index;
        self.depth += 1;
        Ok(())
    }
}
