//! Parent trails and sibling ordering for themes and collections.
//!
//! Parent links in the store are weak ids: nothing stops a parent from being
//! deleted, from pointing at itself, or from forming a longer cycle. The table
//! here is built from a flat `*_tree` query result and is safe against all
//! three. [`Hierarchy::ancestors`] stops at a missing parent, at the first
//! repeated id, or after [`MAX_DEPTH`] steps.

use crate::model::TreeNode;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

/// Deepest ancestor chain followed.
pub const MAX_DEPTH: usize = 8;

/// Id-indexed tree nodes.
#[derive(Debug, Default)]
pub struct Hierarchy {
    nodes: HashMap<String, TreeNode>,
}

impl Hierarchy {
    pub fn from_nodes(nodes: Vec<TreeNode>) -> Self {
        let nodes = nodes
            .into_iter()
            .filter(|node| !node.id.is_empty())
            .map(|node| (node.id.clone(), node))
            .collect();
        Hierarchy { nodes }
    }

    /// Ancestors of `id`, root first, excluding `id` itself.
    pub fn ancestors(&self, id: &str) -> Vec<&TreeNode> {
        let mut seen = HashSet::from([id]);
        let mut chain = Vec::new();
        let mut current = self.nodes.get(id);

        while let Some(node) = current {
            if chain.len() == MAX_DEPTH {
                break;
            }
            let Some(parent_id) = node.parent_id.as_deref() else {
                break;
            };
            if !seen.insert(parent_id) {
                break;
            }
            let Some(parent) = self.nodes.get(parent_id) else {
                break;
            };
            chain.push(parent);
            current = Some(parent);
        }

        chain.reverse();
        chain
    }
}

/// Ordering for siblings: explicit `sortOrder` ascending, entries without one
/// after all entries with one, then by label.
pub fn display_order(a_order: Option<f64>, a_label: &str, b_order: Option<f64>, b_label: &str) -> Ordering {
    let explicit = match (a_order, b_order) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    explicit.then_with(|| a_label.to_lowercase().cmp(&b_label.to_lowercase()))
}
