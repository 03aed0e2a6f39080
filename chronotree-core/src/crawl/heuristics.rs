//! Placement heuristics for nodes discovered outside a curated tree.
//!
//! A live crawler finds milestones one at a time and has to decide where
//! each belongs. These are the simple rules used until something smarter
//! exists.

use crate::model::TreeNode;

/// Branch used when a tree has none yet.
pub const FALLBACK_BRANCH: &str = "general";

/// Pick a branch for a newly discovered node.
///
/// Returns the first existing branch, or [`FALLBACK_BRANCH`] when there
/// are none.
pub fn classify_node_branch<S: AsRef<str>>(existing_branches: &[S]) -> &str {
    existing_branches
        .first()
        .map(AsRef::as_ref)
        .unwrap_or(FALLBACK_BRANCH)
}

/// Pick the node a newly discovered `candidate` should hang under.
///
/// Prefers the latest node (by year) in the candidate's branch that is not
/// later than the candidate. Ties go to the earliest such node in `nodes`.
/// Falls back to the first node, and to `None` only when `nodes` is empty.
/// Nodes without a year never match, nor does anything when the candidate
/// has no year.
pub fn find_parent_node<'a>(candidate: &TreeNode, nodes: &'a [TreeNode]) -> Option<&'a TreeNode> {
    let best = candidate.year.and_then(|year| {
        nodes
            .iter()
            .filter(|n| n.branch == candidate.branch)
            .filter_map(|n| Some((n.year.filter(|y| *y <= year)?, n)))
            .fold(None::<(i32, &TreeNode)>, |best, (y, n)| match best {
                Some((best_year, _)) if best_year >= y => best,
                _ => Some((y, n)),
            })
            .map(|(_, n)| n)
    });
    best.or_else(|| nodes.first())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NodeType;

    fn node(id: &str, branch: &str, year: Option<i32>) -> TreeNode {
        let node = TreeNode::new(id, id, NodeType::Concept).with_branch(branch);
        match year {
            Some(year) => node.with_year(year),
            None => node,
        }
    }

    #[test]
    fn branch_defaults_to_general() {
        let none: [&str; 0] = [];
        assert_eq!(classify_node_branch(&none), "general");
        assert_eq!(classify_node_branch(&["symbolic", "neural"]), "symbolic");
        let owned = vec!["x".to_string()];
        assert_eq!(classify_node_branch(owned.as_slice()), "x");
    }

    #[test]
    fn parent_is_latest_earlier_node_in_branch() {
        let nodes = vec![
            node("a", "neural", Some(1950)),
            node("b", "neural", Some(1980)),
            node("c", "neural", Some(2010)),
            node("d", "symbolic", Some(1990)),
        ];
        let candidate = node("new", "neural", Some(1995));
        assert_eq!(find_parent_node(&candidate, &nodes).map(|n| n.id.as_str()), Some("b"));
    }

    #[test]
    fn same_year_counts_as_earlier() {
        let nodes = vec![node("a", "neural", Some(1950)), node("b", "neural", Some(1995))];
        let candidate = node("new", "neural", Some(1995));
        assert_eq!(find_parent_node(&candidate, &nodes).map(|n| n.id.as_str()), Some("b"));
    }

    #[test]
    fn falls_back_to_first_node() {
        let nodes = vec![node("a", "neural", Some(2000)), node("b", "symbolic", Some(1950))];
        let too_early = node("new", "neural", Some(1900));
        assert_eq!(find_parent_node(&too_early, &nodes).map(|n| n.id.as_str()), Some("a"));

        let undated = node("new", "symbolic", None);
        assert_eq!(find_parent_node(&undated, &nodes).map(|n| n.id.as_str()), Some("a"));

        assert!(find_parent_node(&too_early, &[]).is_none());
    }
}
