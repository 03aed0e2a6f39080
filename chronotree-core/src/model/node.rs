//! Tree Nodes
//!
//! This module defines the node types that make up a knowledge tree:
//! the hierarchical [`TreeNode`], the auxiliary [`CrossRef`] edge, and the
//! closed [`NodeType`] enumeration with its visual style mapping.

use serde::{Deserialize, Serialize};

/// The kind of milestone a node represents.
///
/// Only used for presentation (icon and colour), never for layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    /// A whole field of study. Usually the root.
    Discipline,

    /// A published paper.
    Paper,

    /// A released piece of software or product.
    Software,

    /// A notable event.
    Event,

    /// A turning point that is not tied to a single artifact.
    Milestone,

    /// A sub-field or idea grouping other nodes.
    Concept,
}

/// Icon and colour used to draw a node of a given type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NodeStyle {
    /// Single glyph shown inside the node.
    pub icon: &'static str,
    /// CSS hex colour.
    pub color: &'static str,
}

impl NodeType {
    /// Every node type, in legend order.
    pub const ALL: [NodeType; 6] = [
        NodeType::Discipline,
        NodeType::Concept,
        NodeType::Paper,
        NodeType::Software,
        NodeType::Event,
        NodeType::Milestone,
    ];

    /// The lowercase name used in datasets.
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::Discipline => "discipline",
            NodeType::Paper => "paper",
            NodeType::Software => "software",
            NodeType::Event => "event",
            NodeType::Milestone => "milestone",
            NodeType::Concept => "concept",
        }
    }

    /// The icon and colour for this type.
    pub fn style(&self) -> NodeStyle {
        let (icon, color) = match self {
            NodeType::Discipline => ("◉", "#ffffff"),
            NodeType::Concept => ("◈", "#b8b8ff"),
            NodeType::Paper => ("📄", "#4a9eff"),
            NodeType::Software => ("⚙", "#4aff9e"),
            NodeType::Event => ("⭐", "#ffaa4a"),
            NodeType::Milestone => ("🏁", "#ff4a8a"),
        };
        NodeStyle { icon, color }
    }
}

impl std::fmt::Display for NodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Colour used for unknown branch tags.
pub const DEFAULT_BRANCH_COLOR: &str = "#4a9eff";

/// Map a branch tag to its colour.
pub fn branch_color(branch: &str) -> &'static str {
    match branch {
        "root" => "#ffffff",
        "neural-networks" => "#4a9eff",
        "nlp" => "#4aff9e",
        "computer-vision" => "#ff9e4a",
        "reinforcement-learning" => "#ff4a8a",
        "generative-ai" => "#c84aff",
        "knowledge" => "#ffea4a",
        "robotics" => "#4affea",
        "origins" => "#9e9eff",
        "golden-age" => "#ffcc4a",
        "modern" => "#4affb8",
        _ => DEFAULT_BRANCH_COLOR,
    }
}

/// A node in a knowledge tree.
///
/// The order of `children` is significant: it decides both the vertical
/// order of siblings in the layout and the order in which they are revealed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    /// Unique identifier within one tree.
    pub id: String,

    /// Display name.
    pub label: String,

    /// What kind of milestone this is.
    #[serde(rename = "type")]
    pub node_type: NodeType,

    /// Year the milestone happened. `None` means unknown.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,

    /// Longer description shown in detail views.
    #[serde(default)]
    pub description: String,

    /// Reference link. `"#"` means none.
    #[serde(default)]
    pub url: String,

    /// Tag grouping related nodes for colouring.
    #[serde(default)]
    pub branch: String,

    /// Ordered children. Empty for leaves.
    #[serde(default)]
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    /// Create a leaf node with no year, description or link.
    pub fn new(id: impl Into<String>, label: impl Into<String>, node_type: NodeType) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            node_type,
            year: None,
            description: String::new(),
            url: "#".to_string(),
            branch: String::new(),
            children: Vec::new(),
        }
    }

    /// Set the year.
    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    /// Set the branch tag.
    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = branch.into();
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the reference link.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Append children, keeping their order.
    pub fn with_children(mut self, children: impl IntoIterator<Item = TreeNode>) -> Self {
        self.children.extend(children);
        self
    }

    /// Check if this node has no children.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Whether the node carries a real link rather than the `"#"` placeholder.
    pub fn has_link(&self) -> bool {
        !self.url.is_empty() && self.url != "#"
    }

    /// Visit this node and all descendants in pre-order.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a TreeNode, usize, Option<&'a TreeNode>)) {
        fn go<'a>(
            node: &'a TreeNode,
            depth: usize,
            parent: Option<&'a TreeNode>,
            visit: &mut impl FnMut(&'a TreeNode, usize, Option<&'a TreeNode>),
        ) {
            visit(node, depth, parent);
            for child in &node.children {
                go(child, depth + 1, Some(node), visit);
            }
        }
        go(self, 0, None, visit);
    }

    /// Count this node and all descendants.
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(TreeNode::count).sum::<usize>()
    }

    /// Count the leaves under (and including) this node.
    pub fn leaf_count(&self) -> usize {
        if self.is_leaf() {
            1
        } else {
            self.children.iter().map(TreeNode::leaf_count).sum()
        }
    }

    /// Find a node by id in this subtree.
    pub fn find(&self, id: &str) -> Option<&TreeNode> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(id))
    }

    /// Copy of this node without its subtree.
    pub fn detached(&self) -> TreeNode {
        TreeNode {
            id: self.id.clone(),
            label: self.label.clone(),
            node_type: self.node_type,
            year: self.year,
            description: self.description.clone(),
            url: self.url.clone(),
            branch: self.branch.clone(),
            children: Vec::new(),
        }
    }
}

/// An auxiliary, non-hierarchical edge between two nodes.
///
/// Endpoints are ids. A cross-reference whose endpoints do not exist in the
/// tree is tolerated and simply dropped wherever it is resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossRef {
    /// Id of the node the edge starts at.
    pub source: String,
    /// Id of the node the edge ends at.
    pub target: String,
    /// Short description of the relationship.
    #[serde(default)]
    pub label: String,
}

impl CrossRef {
    /// Create a cross-reference.
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            label: label.into(),
        }
    }

    /// Check if this edge touches the given node.
    pub fn touches(&self, id: &str) -> bool {
        self.source == id || self.target == id
    }

    /// The endpoint opposite to `id`, if the edge touches it.
    pub fn other_end(&self, id: &str) -> Option<&str> {
        if self.source == id {
            Some(&self.target)
        } else if self.target == id {
            Some(&self.source)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TreeNode {
        TreeNode::new("root", "Root", NodeType::Discipline)
            .with_year(1900)
            .with_children([
                TreeNode::new("a", "A", NodeType::Concept)
                    .with_children([TreeNode::new("a1", "A1", NodeType::Paper)]),
                TreeNode::new("b", "B", NodeType::Event),
            ])
    }

    #[test]
    fn every_type_has_a_style() {
        for ty in NodeType::ALL {
            let style = ty.style();
            assert!(!style.icon.is_empty());
            assert!(style.color.starts_with('#'));
        }
        assert_eq!(NodeType::Paper.style().color, "#4a9eff");
    }

    #[test]
    fn unknown_branch_falls_back() {
        assert_eq!(branch_color("nlp"), "#4aff9e");
        assert_eq!(branch_color("no-such-branch"), DEFAULT_BRANCH_COLOR);
        assert_eq!(branch_color("general"), "#4a9eff");
    }

    #[test]
    fn placeholder_url_is_not_a_link() {
        let node = TreeNode::new("a", "A", NodeType::Concept);
        assert!(!node.has_link());
        assert!(!node.clone().with_url("").has_link());
        assert!(node.with_url("https://example.org/a").has_link());
    }

    #[test]
    fn counts_and_lookup() {
        let tree = sample();
        assert_eq!(tree.count(), 4);
        assert_eq!(tree.leaf_count(), 2);
        assert_eq!(tree.find("a1").map(|n| n.label.as_str()), Some("A1"));
        assert!(tree.find("zzz").is_none());
    }

    #[test]
    fn walk_is_pre_order_with_parents() {
        let tree = sample();
        let mut seen = Vec::new();
        tree.walk(&mut |node, depth, parent| {
            seen.push((node.id.clone(), depth, parent.map(|p| p.id.clone())));
        });
        assert_eq!(
            seen,
            vec![
                ("root".to_string(), 0, None),
                ("a".to_string(), 1, Some("root".to_string())),
                ("a1".to_string(), 2, Some("a".to_string())),
                ("b".to_string(), 1, Some("root".to_string())),
            ]
        );
    }

    #[test]
    fn node_type_uses_lowercase_names() {
        let node: TreeNode =
            serde_json::from_str(r#"{"id":"x","label":"X","type":"milestone"}"#).unwrap();
        assert_eq!(node.node_type, NodeType::Milestone);
        assert_eq!(node.year, None);
        assert!(node.children.is_empty());
    }

    #[test]
    fn cross_ref_ends() {
        let edge = CrossRef::new("a", "b", "Led to");
        assert!(edge.touches("a"));
        assert_eq!(edge.other_end("b"), Some("a"));
        assert_eq!(edge.other_end("c"), None);
    }
}
