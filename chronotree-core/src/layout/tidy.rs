//! Structural Tree Layout
//!
//! Assigns every node a breadth offset such that siblings are evenly spaced
//! and subtrees never overlap, preserving the declared sibling order.
//!
//! # Algorithm
//!
//! Reingold–Tilford tidy tree with the linear-time apportioning of
//! Buchheim, Jünger and Leipert:
//!
//! 1. First walk (post-order): give each node a preliminary position from
//!    its left sibling, centre parents over their children, and push each
//!    subtree right until its left contour clears the right contour of the
//!    forest to its left. Threads link contour nodes across subtrees so each
//!    contour step is O(1).
//! 2. Second walk (pre-order): accumulate modifiers into final positions.
//! 3. Normalise onto `[0, extent]`, leaving half a separation at each edge.
//!
//! Separation between two adjacent nodes is `sibling_separation` when they
//! share a parent and `cousin_separation` otherwise, which keeps branch
//! groups visually apart.
//!
//! Nodes are stored in an arena indexed in pre-order. Slot 0 is a virtual
//! parent of the root, so every real node has a parent slot.

use smallvec::SmallVec;

use crate::model::TreeNode;

/// Sentinel parent of the root.
const VIRTUAL: usize = 0;

#[derive(Debug)]
struct Slot {
    parent: usize,
    children: SmallVec<[usize; 4]>,
    depth: usize,
    /// Index among siblings.
    number: usize,
    prelim: f64,
    modifier: f64,
    change: f64,
    shift: f64,
    thread: Option<usize>,
    ancestor: usize,
    /// Default ancestor used while apportioning this node's children.
    default_ancestor: Option<usize>,
    x: f64,
}

impl Slot {
    fn new(index: usize, parent: usize, depth: usize, number: usize) -> Self {
        Self {
            parent,
            children: SmallVec::new(),
            depth,
            number,
            prelim: 0.0,
            modifier: 0.0,
            change: 0.0,
            shift: 0.0,
            thread: None,
            ancestor: index,
            default_ancestor: None,
            x: 0.0,
        }
    }
}

/// Breadth offsets for every node, in pre-order.
#[derive(Debug, Clone, PartialEq)]
pub struct StructuralLayout {
    /// Offset along the breadth axis, within `[0, extent]`.
    pub offsets: Vec<f64>,
    /// Depth of each node, root = 0.
    pub depths: Vec<usize>,
    /// Pre-order index of each node's parent.
    pub parents: Vec<Option<usize>>,
}

impl StructuralLayout {
    /// Number of nodes laid out.
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    /// Whether no nodes were laid out.
    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }
}

/// The tidy tree layout engine.
#[derive(Debug, Clone, Copy)]
pub struct TidyTree {
    sibling_separation: f64,
    cousin_separation: f64,
}

impl TidyTree {
    /// Create a layout engine with the given separations.
    pub fn new(sibling_separation: f64, cousin_separation: f64) -> Self {
        Self {
            sibling_separation,
            cousin_separation,
        }
    }

    /// Lay out `root`, scaling the result so the breadth spans `extent`.
    pub fn layout(&self, root: &TreeNode, extent: f64) -> StructuralLayout {
        let mut arena = Arena::build(root, *self);
        arena.first_walk(1);
        let root_prelim = arena.slots[1].prelim;
        arena.slots[VIRTUAL].modifier = -root_prelim;
        arena.second_walk();
        arena.normalise(extent);

        let real = &arena.slots[1..];
        StructuralLayout {
            offsets: real.iter().map(|s| s.x).collect(),
            depths: real.iter().map(|s| s.depth).collect(),
            parents: real
                .iter()
                .map(|s| (s.parent != VIRTUAL).then(|| s.parent - 1))
                .collect(),
        }
    }
}

impl Default for TidyTree {
    fn default() -> Self {
        Self::new(1.0, 1.4)
    }
}

struct Arena {
    slots: Vec<Slot>,
    config: TidyTree,
}

impl Arena {
    fn build(root: &TreeNode, config: TidyTree) -> Self {
        let mut slots = vec![Slot::new(VIRTUAL, VIRTUAL, 0, 0)];

        fn push(slots: &mut Vec<Slot>, node: &TreeNode, parent: usize, depth: usize, number: usize) {
            let index = slots.len();
            slots.push(Slot::new(index, parent, depth, number));
            slots[parent].children.push(index);
            for (i, child) in node.children.iter().enumerate() {
                push(slots, child, index, depth + 1, i);
            }
        }
        push(&mut slots, root, VIRTUAL, 0, 0);

        Self { slots, config }
    }

    fn separation(&self, a: usize, b: usize) -> f64 {
        if self.slots[a].parent == self.slots[b].parent {
            self.config.sibling_separation
        } else {
            self.config.cousin_separation
        }
    }

    fn next_left(&self, v: usize) -> Option<usize> {
        let slot = &self.slots[v];
        slot.children.first().copied().or(slot.thread)
    }

    fn next_right(&self, v: usize) -> Option<usize> {
        let slot = &self.slots[v];
        slot.children.last().copied().or(slot.thread)
    }

    fn next_ancestor(&self, vim: usize, v: usize, ancestor: usize) -> usize {
        let candidate = self.slots[vim].ancestor;
        if self.slots[candidate].parent == self.slots[v].parent {
            candidate
        } else {
            ancestor
        }
    }

    fn move_subtree(&mut self, wm: usize, wp: usize, shift: f64) {
        let change = shift / (self.slots[wp].number - self.slots[wm].number) as f64;
        let right = &mut self.slots[wp];
        right.change -= change;
        right.shift += shift;
        right.prelim += shift;
        right.modifier += shift;
        self.slots[wm].change += change;
    }

    fn execute_shifts(&mut self, v: usize) {
        let mut shift = 0.0;
        let mut change = 0.0;
        for i in (0..self.slots[v].children.len()).rev() {
            let w = self.slots[v].children[i];
            let child = &mut self.slots[w];
            child.prelim += shift;
            child.modifier += shift;
            change += child.change;
            shift += child.shift + change;
        }
    }

    fn first_walk(&mut self, v: usize) {
        for i in 0..self.slots[v].children.len() {
            let child = self.slots[v].children[i];
            self.first_walk(child);
        }

        let parent = self.slots[v].parent;
        let number = self.slots[v].number;
        let left_sibling = (number > 0).then(|| self.slots[parent].children[number - 1]);

        let first = self.slots[v].children.first().copied();
        let last = self.slots[v].children.last().copied();
        if let (Some(first), Some(last)) = (first, last) {
            self.execute_shifts(v);
            let midpoint = (self.slots[first].prelim + self.slots[last].prelim) / 2.0;
            match left_sibling {
                Some(w) => {
                    let prelim = self.slots[w].prelim + self.separation(v, w);
                    self.slots[v].prelim = prelim;
                    self.slots[v].modifier = prelim - midpoint;
                }
                None => self.slots[v].prelim = midpoint,
            }
        } else if let Some(w) = left_sibling {
            self.slots[v].prelim = self.slots[w].prelim + self.separation(v, w);
        }

        let default_ancestor = self.slots[parent]
            .default_ancestor
            .unwrap_or(self.slots[parent].children[0]);
        let ancestor = self.apportion(v, left_sibling, default_ancestor);
        self.slots[parent].default_ancestor = Some(ancestor);
    }

    fn apportion(&mut self, v: usize, left_sibling: Option<usize>, mut ancestor: usize) -> usize {
        let Some(w) = left_sibling else {
            return ancestor;
        };

        let parent = self.slots[v].parent;
        let mut vop = v;
        let mut vom = self.slots[parent].children[0];
        let mut sip = self.slots[v].modifier;
        let mut sop = self.slots[v].modifier;
        let mut sim = self.slots[w].modifier;
        let mut som = self.slots[vom].modifier;

        let mut inner_right = Some(w);
        let mut inner_left = Some(v);
        loop {
            inner_right = inner_right.and_then(|n| self.next_right(n));
            inner_left = inner_left.and_then(|n| self.next_left(n));
            let (Some(vim), Some(vip)) = (inner_right, inner_left) else {
                break;
            };
            // Outer contours are at least as deep as the inner ones.
            let (Some(next_vom), Some(next_vop)) = (self.next_left(vom), self.next_right(vop))
            else {
                break;
            };
            vom = next_vom;
            vop = next_vop;
            self.slots[vop].ancestor = v;

            let shift = self.slots[vim].prelim + sim - self.slots[vip].prelim - sip
                + self.separation(vim, vip);
            if shift > 0.0 {
                let target = self.next_ancestor(vim, v, ancestor);
                self.move_subtree(target, v, shift);
                sip += shift;
                sop += shift;
            }
            sim += self.slots[vim].modifier;
            sip += self.slots[vip].modifier;
            som += self.slots[vom].modifier;
            sop += self.slots[vop].modifier;
        }

        if let Some(vim) = inner_right {
            if self.next_right(vop).is_none() {
                self.slots[vop].thread = Some(vim);
                self.slots[vop].modifier += sim - sop;
            }
        }
        if let Some(vip) = inner_left {
            if self.next_left(vom).is_none() {
                self.slots[vom].thread = Some(vip);
                self.slots[vom].modifier += sip - som;
                ancestor = v;
            }
        }
        ancestor
    }

    fn second_walk(&mut self) {
        // Pre-order is index order, so parents are always final first.
        for v in 1..self.slots.len() {
            let parent_modifier = self.slots[self.slots[v].parent].modifier;
            let slot = &mut self.slots[v];
            slot.x = slot.prelim + parent_modifier;
            slot.modifier += parent_modifier;
        }
    }

    fn normalise(&mut self, extent: f64) {
        let mut left = 1;
        let mut right = 1;
        for v in 1..self.slots.len() {
            if self.slots[v].x < self.slots[left].x {
                left = v;
            }
            if self.slots[v].x > self.slots[right].x {
                right = v;
            }
        }

        let margin = if left == right {
            1.0
        } else {
            self.separation(left, right) / 2.0
        };
        let tx = margin - self.slots[left].x;
        let kx = extent / (self.slots[right].x + margin + tx);
        for slot in &mut self.slots[1..] {
            slot.x = (slot.x + tx) * kx;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NodeType;

    fn leaf(id: &str) -> TreeNode {
        TreeNode::new(id, id, NodeType::Paper)
    }

    fn branch(id: &str, children: impl IntoIterator<Item = TreeNode>) -> TreeNode {
        TreeNode::new(id, id, NodeType::Concept).with_children(children)
    }

    #[test]
    fn single_node_sits_in_the_middle() {
        let layout = TidyTree::default().layout(&leaf("only"), 100.0);
        assert_eq!(layout.offsets, vec![50.0]);
        assert_eq!(layout.parents, vec![None]);
    }

    #[test]
    fn siblings_are_evenly_spaced_in_order() {
        let tree = branch("root", [leaf("a"), leaf("b"), leaf("c")]);
        let layout = TidyTree::default().layout(&tree, 300.0);
        // Pre-order: root, a, b, c. Margin of half a unit at each edge.
        assert_eq!(layout.offsets, vec![150.0, 50.0, 150.0, 250.0]);
        assert_eq!(layout.depths, vec![0, 1, 1, 1]);
        assert_eq!(layout.parents, vec![None, Some(0), Some(0), Some(0)]);
    }

    #[test]
    fn cousins_are_spaced_wider_than_siblings() {
        let tree = branch(
            "root",
            [branch("p", [leaf("p1"), leaf("p2")]), branch("q", [leaf("q1"), leaf("q2")])],
        );
        let layout = TidyTree::default().layout(&tree, 1000.0);
        // Pre-order: root, p, p1, p2, q, q1, q2
        let sibling_gap = layout.offsets[3] - layout.offsets[2];
        let cousin_gap = layout.offsets[5] - layout.offsets[3];
        assert!((cousin_gap / sibling_gap - 1.4).abs() < 1e-9);
        // Parents centred over children, root centred over everything.
        assert!((layout.offsets[1] - (layout.offsets[2] + layout.offsets[3]) / 2.0).abs() < 1e-9);
        assert!((layout.offsets[0] - 500.0).abs() < 1e-9);
    }

    #[test]
    fn chain_collapses_to_one_line() {
        let tree = branch("a", [branch("b", [leaf("c")])]);
        let layout = TidyTree::default().layout(&tree, 80.0);
        assert_eq!(layout.offsets, vec![40.0, 40.0, 40.0]);
    }

    #[test]
    fn deep_subtrees_do_not_overlap() {
        let tree = branch(
            "root",
            [
                branch("a", [branch("a1", [leaf("a1x"), leaf("a1y"), leaf("a1z")])]),
                leaf("b"),
                branch("c", [branch("c1", [leaf("c1x"), leaf("c1y")])]),
            ],
        );
        let layout = TidyTree::default().layout(&tree, 500.0);
        let depth_three: Vec<f64> = layout
            .depths
            .iter()
            .zip(&layout.offsets)
            .filter(|(d, _)| **d == 3)
            .map(|(_, x)| *x)
            .collect();
        assert_eq!(depth_three.len(), 5);
        assert!(depth_three.windows(2).all(|w| w[1] > w[0]));
        assert!(layout.offsets.iter().all(|x| (0.0..=500.0).contains(x)));
    }
}
