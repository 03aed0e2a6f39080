//! Edge Paths
//!
//! Curves for tree edges and cross-reference arcs, in the form a renderer
//! can draw directly.
//!
//! Tree edges are cubic Béziers whose control points share the horizontal
//! midpoint, so each edge leaves and enters its endpoints horizontally.
//! Cross-reference arcs are quadratic curves bowed a fixed distance off the
//! straight line, so they stay distinguishable from tree edges.

use std::fmt;

use serde::Serialize;

use super::engine::LayoutNode;

/// Vertical distance between a cross-reference arc's control point and the
/// midpoint of its endpoints.
pub const CROSS_REF_BOW: f64 = 60.0;

/// A point in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<&LayoutNode> for Point {
    fn from(node: &LayoutNode) -> Self {
        Self::new(node.x, node.y)
    }
}

/// A drawable curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PathGeometry {
    /// Cubic Bézier.
    Cubic {
        from: Point,
        c1: Point,
        c2: Point,
        to: Point,
    },
    /// Quadratic Bézier.
    Quadratic {
        from: Point,
        control: Point,
        to: Point,
    },
}

impl PathGeometry {
    /// The SVG path data for this curve.
    pub fn to_svg(&self) -> String {
        self.to_string()
    }

    /// Start point.
    pub fn start(&self) -> Point {
        match self {
            PathGeometry::Cubic { from, .. } | PathGeometry::Quadratic { from, .. } => *from,
        }
    }

    /// End point.
    pub fn end(&self) -> Point {
        match self {
            PathGeometry::Cubic { to, .. } | PathGeometry::Quadratic { to, .. } => *to,
        }
    }
}

impl fmt::Display for PathGeometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathGeometry::Cubic { from, c1, c2, to } => write!(
                f,
                "M {},{} C {},{} {},{} {},{}",
                from.x, from.y, c1.x, c1.y, c2.x, c2.y, to.x, to.y
            ),
            PathGeometry::Quadratic { from, control, to } => write!(
                f,
                "M {},{} Q {},{} {},{}",
                from.x, from.y, control.x, control.y, to.x, to.y
            ),
        }
    }
}

/// Curve for a parent → child edge.
pub fn link_path(source: &LayoutNode, target: &LayoutNode) -> PathGeometry {
    let mid_x = (source.x + target.x) / 2.0;
    PathGeometry::Cubic {
        from: source.into(),
        c1: Point::new(mid_x, source.y),
        c2: Point::new(mid_x, target.y),
        to: target.into(),
    }
}

/// Arc for a cross-reference.
///
/// The control point sits [`CROSS_REF_BOW`] above the midpoint when the
/// source is lower on screen than the target, and below it otherwise.
pub fn cross_ref_path(source: &LayoutNode, target: &LayoutNode) -> PathGeometry {
    let mid_x = (source.x + target.x) / 2.0;
    let mid_y = (source.y + target.y) / 2.0;
    let direction = if source.y > target.y { -1.0 } else { 1.0 };
    PathGeometry::Quadratic {
        from: source.into(),
        control: Point::new(mid_x, mid_y + direction * CROSS_REF_BOW),
        to: target.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NodeType;

    fn at(id: &str, x: f64, y: f64) -> LayoutNode {
        LayoutNode {
            id: id.to_string(),
            label: id.to_string(),
            node_type: NodeType::Paper,
            year: None,
            description: String::new(),
            url: String::new(),
            branch: String::new(),
            depth: 1,
            x,
            y,
            parent_id: None,
        }
    }

    #[test]
    fn link_path_uses_horizontal_midpoint() {
        let path = link_path(&at("a", 100.0, 200.0), &at("b", 300.0, 50.0));
        assert_eq!(path.to_svg(), "M 100,200 C 200,200 200,50 300,50");
    }

    #[test]
    fn cross_ref_bows_toward_smaller_y() {
        let low = at("low", 0.0, 300.0);
        let high = at("high", 100.0, 100.0);

        let up = cross_ref_path(&low, &high);
        assert_eq!(up.to_svg(), "M 0,300 Q 50,140 100,100");

        let down = cross_ref_path(&high, &low);
        assert_eq!(down.to_svg(), "M 100,100 Q 50,260 0,300");
    }

    #[test]
    fn level_endpoints_bow_downward() {
        let path = cross_ref_path(&at("a", 0.0, 10.0), &at("b", 20.0, 10.0));
        match path {
            PathGeometry::Quadratic { control, .. } => assert_eq!(control, Point::new(10.0, 70.0)),
            other => panic!("unexpected geometry {other:?}"),
        }
        assert_eq!(path.start(), Point::new(0.0, 10.0));
        assert_eq!(path.end(), Point::new(20.0, 10.0));
    }
}
