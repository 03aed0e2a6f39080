//! Layout Engine
//!
//! Turns a tree into canvas coordinates. The horizontal axis is time: a
//! node's x is purely a function of its year. The vertical axis is structure:
//! a node's y comes from the tidy tree layout of the hierarchy, so siblings
//! keep their declared order and branches stay grouped.
//!
//! The engine holds no state. Every call recomputes from scratch, which is
//! cheap at the tens-of-nodes scale this is built for.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::path::{cross_ref_path, link_path, PathGeometry};
use super::scale::{timeline_ticks, TimeScale, TimelineTick, YearExtent, DEFAULT_YEAR_EXTENT};
use super::tidy::TidyTree;
use crate::model::{CrossRef, NodeType, RevealedSet, TreeNode};

/// Space reserved around the drawable area.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Padding {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Default for Padding {
    fn default() -> Self {
        Self {
            top: 100.0,
            right: 150.0,
            bottom: 100.0,
            left: 150.0,
        }
    }
}

/// Geometry knobs for [`compute_layout`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutOptions {
    /// Canvas width. The time axis spans it minus horizontal padding.
    pub width: f64,
    /// Requested canvas height. Grows if the tree needs more rows.
    pub height: f64,
    pub padding: Padding,
    /// Minimum vertical room per leaf.
    pub row_spacing: f64,
    /// Structural distance between adjacent siblings.
    pub sibling_separation: f64,
    /// Structural distance between adjacent nodes with different parents.
    pub cousin_separation: f64,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            width: 3000.0,
            height: 1600.0,
            padding: Padding::default(),
            row_spacing: 55.0,
            sibling_separation: 1.0,
            cousin_separation: 1.4,
        }
    }
}

impl LayoutOptions {
    /// Options for a canvas of the given size, everything else defaulted.
    pub fn with_size(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }
}

/// A positioned node.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutNode {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    pub year: Option<i32>,
    pub description: String,
    pub url: String,
    pub branch: String,
    pub depth: usize,
    /// Time-axis position.
    pub x: f64,
    /// Structural position.
    pub y: f64,
    pub parent_id: Option<String>,
}

impl LayoutNode {
    /// Whether this is the root.
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// A parent → child edge. Endpoints are indices into [`Layout::nodes`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayoutLink {
    /// `"{source}->{target}"`.
    pub id: String,
    pub source: usize,
    pub target: usize,
}

/// A cross-reference whose endpoints both exist in the layout.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrossRefPath {
    pub source: usize,
    pub target: usize,
    pub label: String,
    pub path: PathGeometry,
}

/// Pan and zoom applied to the whole canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ViewTransform {
    pub x: f64,
    pub y: f64,
    pub k: f64,
}

/// Zoom level of the initial overview.
const OVERVIEW_ZOOM: f64 = 0.45;

/// Everything a renderer needs to draw one tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Layout {
    /// Nodes in pre-order.
    pub nodes: Vec<LayoutNode>,
    pub links: Vec<LayoutLink>,
    pub year_extent: YearExtent,
    pub time_scale: TimeScale,
    pub canvas_height: f64,
    #[serde(skip)]
    index: IndexMap<String, usize>,
}

/// Lay out `tree` on a canvas described by `options`.
pub fn compute_layout(tree: &TreeNode, options: &LayoutOptions) -> Layout {
    let padding = options.padding;
    let leaf_count = tree.leaf_count();
    let canvas_height = options
        .height
        .max(leaf_count as f64 * options.row_spacing + padding.top + padding.bottom);

    let structure = TidyTree::new(options.sibling_separation, options.cousin_separation)
        .layout(tree, canvas_height - padding.top - padding.bottom);

    let mut years = Vec::new();
    tree.walk(&mut |node, _, _| years.extend(node.year));
    let year_extent = YearExtent::from_years(years);
    let time_scale = TimeScale::new(year_extent, padding.left, options.width - padding.right);

    let mut nodes = Vec::with_capacity(structure.len());
    let mut index = IndexMap::with_capacity(structure.len());
    tree.walk(&mut |node, depth, parent| {
        let slot = nodes.len();
        index.insert(node.id.clone(), slot);
        nodes.push(LayoutNode {
            id: node.id.clone(),
            label: node.label.clone(),
            node_type: node.node_type,
            year: node.year,
            description: node.description.clone(),
            url: node.url.clone(),
            branch: node.branch.clone(),
            depth,
            x: time_scale.year(node.year.unwrap_or(year_extent.start)),
            y: structure.offsets[slot] + padding.top,
            parent_id: parent.map(|p| p.id.clone()),
        });
    });

    let links = structure
        .parents
        .iter()
        .enumerate()
        .filter_map(|(target, parent)| {
            let source = (*parent)?;
            Some(LayoutLink {
                id: format!("{}->{}", nodes[source].id, nodes[target].id),
                source,
                target,
            })
        })
        .collect::<Vec<_>>();

    debug!(
        nodes = nodes.len(),
        links = links.len(),
        leaves = leaf_count,
        canvas_height,
        year_start = year_extent.start,
        year_end = year_extent.end,
        "computed layout"
    );

    Layout {
        nodes,
        links,
        year_extent,
        time_scale,
        canvas_height,
        index,
    }
}

impl Layout {
    /// A layout with nothing to draw, for when no tree is loaded yet.
    pub fn empty(options: &LayoutOptions) -> Self {
        Self {
            nodes: Vec::new(),
            links: Vec::new(),
            year_extent: DEFAULT_YEAR_EXTENT,
            time_scale: TimeScale::new(
                DEFAULT_YEAR_EXTENT,
                options.padding.left,
                options.width - options.padding.right,
            ),
            canvas_height: options.height,
            index: IndexMap::new(),
        }
    }

    /// Look up a node by id.
    pub fn node(&self, id: &str) -> Option<&LayoutNode> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    /// Source and target of a link.
    pub fn endpoints(&self, link: &LayoutLink) -> (&LayoutNode, &LayoutNode) {
        (&self.nodes[link.source], &self.nodes[link.target])
    }

    /// The curve for a tree edge.
    pub fn link_path(&self, link: &LayoutLink) -> PathGeometry {
        let (source, target) = self.endpoints(link);
        link_path(source, target)
    }

    /// Axis ticks every `step` years, aligned with node positions.
    pub fn timeline_ticks(&self, step: i32) -> Vec<TimelineTick> {
        timeline_ticks(self.year_extent, &self.time_scale, step)
    }

    /// Arcs for every cross-reference whose endpoints are both laid out.
    ///
    /// Cross-references to unknown ids are dropped.
    pub fn cross_ref_paths(&self, cross_refs: &[CrossRef]) -> Vec<CrossRefPath> {
        cross_refs
            .iter()
            .filter_map(|edge| {
                let source = *self.index.get(edge.source.as_str())?;
                let target = *self.index.get(edge.target.as_str())?;
                Some(CrossRefPath {
                    source,
                    target,
                    label: edge.label.clone(),
                    path: cross_ref_path(&self.nodes[source], &self.nodes[target]),
                })
            })
            .collect()
    }

    /// Nodes that have been revealed.
    pub fn visible_nodes<'a>(
        &'a self,
        revealed: &'a RevealedSet,
    ) -> impl Iterator<Item = &'a LayoutNode> + 'a {
        self.nodes.iter().filter(move |n| revealed.contains(&n.id))
    }

    /// Links whose endpoints have both been revealed.
    pub fn visible_links<'a>(
        &'a self,
        revealed: &'a RevealedSet,
    ) -> impl Iterator<Item = &'a LayoutLink> + 'a {
        self.links.iter().filter(move |link| {
            let (source, target) = self.endpoints(link);
            revealed.contains(&source.id) && revealed.contains(&target.id)
        })
    }

    /// Cross-reference arcs whose endpoints have both been revealed.
    pub fn visible_cross_refs(
        &self,
        cross_refs: &[CrossRef],
        revealed: &RevealedSet,
    ) -> Vec<CrossRefPath> {
        self.cross_ref_paths(cross_refs)
            .into_iter()
            .filter(|arc| {
                revealed.contains(&self.nodes[arc.source].id)
                    && revealed.contains(&self.nodes[arc.target].id)
            })
            .collect()
    }

    /// The view that fits the tree's height into a viewport as an overview.
    pub fn overview_transform(&self, viewport_width: f64, viewport_height: f64) -> ViewTransform {
        ViewTransform {
            x: viewport_width * 0.05,
            y: (viewport_height - self.canvas_height * OVERVIEW_ZOOM) / 2.0,
            k: OVERVIEW_ZOOM,
        }
    }

    /// The unzoomed view that centres a node in a viewport.
    pub fn focus_offset(
        &self,
        id: &str,
        viewport_width: f64,
        viewport_height: f64,
    ) -> Option<ViewTransform> {
        let node = self.node(id)?;
        Some(ViewTransform {
            x: viewport_width / 2.0 - node.x,
            y: viewport_height / 2.0 - node.y,
            k: 1.0,
        })
    }
}
