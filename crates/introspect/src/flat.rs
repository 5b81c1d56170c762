//! Output of one decode pass.

use crate::path_tree::{LeafHandle, PathTree};
use introspect_types::Variant;

/// Flat list of decoded leaves and the path tree that names them.
///
/// Lists keep schema declaration order, with array elements in ascending
/// index order. The same instance can be cleared and reused across decodes
/// of the same schema; the tree is kept so its nodes are not rebuilt.
#[derive(Debug, Clone, Default)]
pub struct FlatMessage {
    pub(crate) tree: PathTree,
    pub(crate) values: Vec<(LeafHandle, Variant)>,
    pub(crate) names: Vec<(LeafHandle, String)>,
    pub(crate) blobs: Vec<(LeafHandle, Vec<u8>)>,
}

/// Lengths of every list at one point in time, used to undo a failed decode.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Checkpoint {
    nodes: usize,
    values: usize,
    names: usize,
    blobs: usize,
}

/// Everything [`FlatMessage::reset`] discards, kept so a failed decode can
/// put it back.
#[derive(Debug)]
pub(crate) struct Snapshot {
    replaced_tree: Option<PathTree>,
    nodes: usize,
    values: Vec<(LeafHandle, Variant)>,
    names: Vec<(LeafHandle, String)>,
    blobs: Vec<(LeafHandle, Vec<u8>)>,
}

impl FlatMessage {
    /// Empty message whose paths start with `prefix`.
    pub fn new(prefix: &str) -> Self {
        Self {
            tree: PathTree::new(prefix),
            ..Self::default()
        }
    }

    pub fn tree(&self) -> &PathTree {
        &self.tree
    }

    /// Root segment every path starts with.
    pub fn prefix(&self) -> &str {
        self.tree.segment(self.tree.root())
    }

    /// Numeric, bool, time and duration leaves.
    pub fn values(&self) -> &[(LeafHandle, Variant)] {
        &self.values
    }

    /// String leaves.
    pub fn names(&self) -> &[(LeafHandle, String)] {
        &self.names
    }

    /// Raw byte-blob leaves. Nothing is stored here yet.
    pub fn blobs(&self) -> &[(LeafHandle, Vec<u8>)] {
        &self.blobs
    }

    /// Total number of leaves across every list.
    pub fn leaf_count(&self) -> usize {
        self.values.len() + self.names.len() + self.blobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leaf_count() == 0
    }

    /// Drop the decoded leaves but keep the tree and list capacity.
    pub fn clear(&mut self) {
        self.values.clear();
        self.names.clear();
        self.blobs.clear();
    }

    /// Clear and, if the prefix differs, start a fresh tree.
    pub fn reset(&mut self, prefix: &str) {
        self.clear();
        if self.prefix() != prefix {
            self.tree = PathTree::new(prefix);
        }
    }

    /// Full path of a leaf.
    pub fn path(&self, leaf: &LeafHandle) -> String {
        self.tree.leaf_path(leaf)
    }

    /// `(path, value)` for every value leaf, in order.
    pub fn value_paths(&self) -> impl Iterator<Item = (String, &Variant)> {
        self.values
            .iter()
            .map(|(leaf, value)| (self.tree.leaf_path(leaf), value))
    }

    /// `(path, string)` for every string leaf, in order.
    pub fn name_paths(&self) -> impl Iterator<Item = (String, &str)> {
        self.names
            .iter()
            .map(|(leaf, name)| (self.tree.leaf_path(leaf), name.as_str()))
    }

    /// First value leaf whose rendered path equals `path`.
    pub fn find_value(&self, path: &str) -> Option<&Variant> {
        let mut buf = String::new();
        self.values.iter().find_map(|(leaf, value)| {
            self.tree.write_path(leaf, &mut buf);
            (buf == path).then_some(value)
        })
    }

    /// First string leaf whose rendered path equals `path`.
    pub fn find_name(&self, path: &str) -> Option<&str> {
        let mut buf = String::new();
        self.names.iter().find_map(|(leaf, name)| {
            self.tree.write_path(leaf, &mut buf);
            (buf == path).then_some(name.as_str())
        })
    }

    pub(crate) fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            nodes: self.tree.node_count(),
            values: self.values.len(),
            names: self.names.len(),
            blobs: self.blobs.len(),
        }
    }

    pub(crate) fn rollback(&mut self, checkpoint: Checkpoint) {
        self.tree.truncate(checkpoint.nodes);
        self.values.truncate(checkpoint.values);
        self.names.truncate(checkpoint.names);
        self.blobs.truncate(checkpoint.blobs);
    }

    /// Same as [`FlatMessage::reset`], returning what was discarded.
    pub(crate) fn reset_with_snapshot(&mut self, prefix: &str) -> Snapshot {
        let replaced_tree = (self.prefix() != prefix)
            .then(|| std::mem::replace(&mut self.tree, PathTree::new(prefix)));
        Snapshot {
            replaced_tree,
            nodes: self.tree.node_count(),
            values: std::mem::take(&mut self.values),
            names: std::mem::take(&mut self.names),
            blobs: std::mem::take(&mut self.blobs),
        }
    }

    /// Undo everything since the matching [`FlatMessage::reset_with_snapshot`].
    pub(crate) fn restore(&mut self, snapshot: Snapshot) {
        match snapshot.replaced_tree {
            Some(tree) => self.tree = tree,
            None => self.tree.truncate(snapshot.nodes),
        }
        self.values = snapshot.values;
        self.names = snapshot.names;
        self.blobs = snapshot.blobs;
    }
}
