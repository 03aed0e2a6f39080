//! Datasets
//!
//! A [`Dataset`] is the unit a dataset source hands to the core: one rooted
//! tree plus its cross-references. It is produced atomically for a keyword
//! and never mutated afterwards.

use std::collections::{HashSet, VecDeque};

use serde::{Deserialize, Serialize};

use super::node::{CrossRef, NodeType, TreeNode};
use crate::error::DatasetError;

/// One tree plus its cross-references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    /// The root of the hierarchy.
    pub tree: TreeNode,

    /// Auxiliary edges between nodes of `tree`.
    #[serde(default)]
    pub cross_refs: Vec<CrossRef>,
}

/// A tree node without its children, annotated with its position in the tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlatNode {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    pub year: Option<i32>,
    pub description: String,
    pub url: String,
    pub branch: String,
    pub depth: usize,
    pub parent_id: Option<String>,
    pub child_count: usize,
}

/// Everything directly connected to one node.
#[derive(Debug, Clone)]
pub struct NodeRelations<'a> {
    /// The node itself.
    pub node: &'a TreeNode,
    /// Its structural parent, `None` for the root.
    pub parent: Option<&'a TreeNode>,
    /// Its children in declared order.
    pub children: Vec<&'a TreeNode>,
    /// Cross-references touching the node, paired with the node at the other end.
    pub cross_refs: Vec<(&'a CrossRef, &'a TreeNode)>,
}

impl Dataset {
    /// Create a dataset without validating it.
    pub fn new(tree: TreeNode, cross_refs: Vec<CrossRef>) -> Self {
        Self { tree, cross_refs }
    }

    /// Parse and validate a dataset from JSON.
    pub fn from_json_str(json: &str) -> Result<Self, DatasetError> {
        let dataset: Dataset = serde_json::from_str(json)?;
        dataset.validate()?;
        Ok(dataset)
    }

    /// Serialize the dataset to pretty JSON.
    pub fn to_json_string(&self) -> Result<String, DatasetError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check the tree invariants: every id is non-empty and appears once.
    ///
    /// Cross-references are not checked; dangling ones are dropped when
    /// resolved.
    pub fn validate(&self) -> Result<(), DatasetError> {
        let mut seen = HashSet::new();
        let mut result = Ok(());
        self.tree.walk(&mut |node, _, _| {
            if result.is_err() {
                return;
            }
            if node.id.is_empty() {
                result = Err(DatasetError::EmptyId {
                    label: node.label.clone(),
                });
            } else if !seen.insert(node.id.as_str()) {
                result = Err(DatasetError::DuplicateId(node.id.clone()));
            }
        });
        result
    }

    /// Total number of nodes in the tree.
    pub fn node_count(&self) -> usize {
        self.tree.count()
    }

    /// Find a node by id.
    pub fn find(&self, id: &str) -> Option<&TreeNode> {
        self.tree.find(id)
    }

    /// Check if a node with this id exists.
    pub fn contains(&self, id: &str) -> bool {
        self.find(id).is_some()
    }

    /// Node ids in breadth-first order: root first, then level by level,
    /// siblings in declared order.
    pub fn breadth_first_ids(&self) -> Vec<String> {
        let mut order = Vec::with_capacity(self.node_count());
        let mut queue = VecDeque::new();
        queue.push_back(&self.tree);

        while let Some(node) = queue.pop_front() {
            order.push(node.id.clone());
            queue.extend(node.children.iter());
        }

        order
    }

    /// All nodes in pre-order, without their children.
    pub fn flatten(&self) -> Vec<FlatNode> {
        let mut flat = Vec::with_capacity(self.node_count());
        self.tree.walk(&mut |node, depth, parent| {
            flat.push(FlatNode {
                id: node.id.clone(),
                label: node.label.clone(),
                node_type: node.node_type,
                year: node.year,
                description: node.description.clone(),
                url: node.url.clone(),
                branch: node.branch.clone(),
                depth,
                parent_id: parent.map(|p| p.id.clone()),
                child_count: node.children.len(),
            });
        });
        flat
    }

    /// Cross-references whose endpoints both exist in the tree.
    pub fn resolved_cross_refs(&self) -> impl Iterator<Item = &CrossRef> {
        self.cross_refs
            .iter()
            .filter(|edge| self.contains(&edge.source) && self.contains(&edge.target))
    }

    /// Distinct non-empty branch tags, in the order they are first seen.
    pub fn branches(&self) -> Vec<&str> {
        let mut branches: Vec<&str> = Vec::new();
        self.tree.walk(&mut |node, _, _| {
            let branch = node.branch.as_str();
            if !branch.is_empty() && !branches.contains(&branch) {
                branches.push(branch);
            }
        });
        branches
    }

    /// The parent, children and cross-referenced neighbours of a node.
    pub fn relations(&self, id: &str) -> Option<NodeRelations<'_>> {
        let mut found = None;
        self.tree.walk(&mut |node, _, parent| {
            if found.is_none() && node.id == id {
                found = Some((node, parent));
            }
        });
        let (node, parent) = found?;

        let cross_refs = self
            .cross_refs
            .iter()
            .filter_map(|edge| {
                let other = edge.other_end(id)?;
                self.find(other).map(|other| (edge, other))
            })
            .collect();

        Some(NodeRelations {
            node,
            parent,
            children: node.children.iter().collect(),
            cross_refs,
        })
    }
}
