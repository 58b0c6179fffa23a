//! FILENAME: core/pivot-grid/src/tree.rs
//! Category trees: the hierarchy behind one axis.
//!
//! Every key segment becomes a node, keys with a common prefix share the
//! nodes of that prefix, and each key ends in a leaf that remembers the
//! key's position in the sorted axis. Each node owns its children.

use serde::{Deserialize, Serialize};

use crate::key::CompositeKey;

/// A node in the axis tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryNode {
    /// The raw key segment this node stands for.
    pub label: String,

    pub children: Vec<CategoryNode>,

    /// Number of leaves below this node; 1 for a leaf.
    pub leaf_count: usize,

    /// Position of the key in the axis, set on leaves only.
    pub leaf_index: Option<usize>,
}

impl CategoryNode {
    fn new(label: String) -> Self {
        CategoryNode {
            label,
            children: Vec::new(),
            leaf_count: 0,
            leaf_index: None,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Axis positions of every leaf below this node, in tree order.
    pub fn leaf_indices(&self) -> Vec<usize> {
        let mut out = Vec::new();
        collect_leaves(self, &mut out);
        out
    }

    fn propagate_leaf_counts(&mut self) -> usize {
        self.leaf_count = if self.children.is_empty() {
            1
        } else {
            self.children
                .iter_mut()
                .map(CategoryNode::propagate_leaf_counts)
                .sum()
        };
        self.leaf_count
    }
}

fn collect_leaves(node: &CategoryNode, out: &mut Vec<usize>) {
    if node.children.is_empty() {
        out.extend(node.leaf_index);
    } else {
        for child in &node.children {
            collect_leaves(child, out);
        }
    }
}

/// The forest built from one axis' keys.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CategoryTree {
    pub roots: Vec<CategoryNode>,

    /// Longest root-to-leaf path, in nodes.
    pub depth: usize,
}

impl CategoryTree {
    /// Builds the tree from sorted, distinct keys. Children keep the order
    /// in which their first key appears.
    pub fn build(keys: &[CompositeKey]) -> Self {
        let mut roots: Vec<CategoryNode> = Vec::new();

        for (index, key) in keys.iter().enumerate() {
            let blank = [String::new()];
            let segments = if key.is_empty() { &blank[..] } else { key.segments() };

            let mut level = &mut roots;
            for (i, segment) in segments.iter().enumerate() {
                // Sorted input keeps siblings contiguous, so the match is
                // almost always the last child.
                let pos = match level.iter().rposition(|n| &n.label == segment) {
                    Some(pos) => pos,
                    None => {
                        level.push(CategoryNode::new(segment.clone()));
                        level.len() - 1
                    }
                };
                let node = &mut level[pos];
                if i == segments.len() - 1 {
                    node.leaf_index = Some(index);
                }
                level = &mut node.children;
            }
        }

        for root in roots.iter_mut() {
            root.propagate_leaf_counts();
        }

        let depth = roots.iter().map(node_depth).max().unwrap_or(0);
        CategoryTree { roots, depth }
    }

    /// Axis positions of every leaf, in tree order.
    pub fn leaf_indices(&self) -> Vec<usize> {
        let mut out = Vec::new();
        for root in &self.roots {
            collect_leaves(root, &mut out);
        }
        out
    }

    pub fn leaf_count(&self) -> usize {
        self.roots.iter().map(|r| r.leaf_count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}

fn node_depth(node: &CategoryNode) -> usize {
    1 + node.children.iter().map(node_depth).max().unwrap_or(0)
}
