//! Templated dataset for arbitrary topics.

use crate::model::{CrossRef, Dataset, NodeType, TreeNode};

/// Build the generic three-era tree for `keyword`.
///
/// Content is templated from the trimmed keyword; the root label is the
/// keyword exactly as given. The cross-references name template ids
/// (`early-2`, `key-innovation`, `commercial`, `digital`), so any change to
/// the template's ids must be mirrored in them.
pub fn generic_dataset(keyword: &str) -> Dataset {
    let kw = keyword.trim();
    let wiki = format!("https://en.wikipedia.org/wiki/{}", urlencoding::encode(kw));

    let leaf = |id: &str, label: &str, node_type: NodeType, year: i32, description: &str, branch: &str| {
        TreeNode::new(id, label, node_type)
            .with_year(year)
            .with_description(description)
            .with_branch(branch)
    };

    let origins = TreeNode::new("origins", format!("Origins of {kw}"), NodeType::Concept)
        .with_year(1910)
        .with_description(format!(
            "The foundational ideas and early developments that led to {kw}."
        ))
        .with_url(format!("{wiki}#History"))
        .with_branch("origins")
        .with_children([
            leaf("early-1", "Early Theories", NodeType::Paper, 1920, "Early theoretical foundations.", "origins"),
            leaf("early-2", "First Experiments", NodeType::Event, 1935, "Pioneering experimental work.", "origins"),
        ]);

    let golden_age = TreeNode::new("golden-age", format!("{kw} Golden Age"), NodeType::Concept)
        .with_year(1950)
        .with_description("The period of rapid advancement and mainstream adoption.")
        .with_branch("golden-age")
        .with_children([
            leaf("key-innovation", "Key Innovation", NodeType::Milestone, 1960, "A breakthrough that changed the field.", "golden-age"),
            leaf("commercial", "Commercialization", NodeType::Software, 1975, "The technology enters the market.", "golden-age"),
        ]);

    let modern = TreeNode::new("modern-era", format!("Modern {kw}"), NodeType::Concept)
        .with_year(2000)
        .with_description("Contemporary developments and the current state of the art.")
        .with_branch("modern")
        .with_children([
            leaf("digital", "Digital Revolution", NodeType::Event, 2005, "Digital transformation of the field.", "modern"),
            leaf("current", "Current State", NodeType::Milestone, 2024, "Where we are today.", "modern"),
        ]);

    let root = TreeNode::new("root", keyword, NodeType::Discipline)
        .with_year(1900)
        .with_description(format!(
            "The origin and development history of {kw}. This tree is auto-generated; \
             connect a real source to populate it with actual data."
        ))
        .with_url(wiki)
        .with_branch("root")
        .with_children([origins, golden_age, modern]);

    Dataset::new(
        root,
        vec![
            CrossRef::new("early-2", "key-innovation", "Led to"),
            CrossRef::new("commercial", "digital", "Enabled by"),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_shape() {
        let dataset = generic_dataset("Underwater Basket Weaving");
        assert_eq!(dataset.tree.id, "root");
        assert_eq!(dataset.tree.label, "Underwater Basket Weaving");
        let eras: Vec<&str> = dataset.tree.children.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(eras, vec!["origins", "golden-age", "modern-era"]);
        assert!(dataset.tree.children.iter().all(|c| c.children.len() == 2));
        assert_eq!(dataset.node_count(), 10);
        assert!(dataset.validate().is_ok());
    }

    #[test]
    fn cross_refs_resolve_against_template() {
        let dataset = generic_dataset("Cheese");
        assert_eq!(dataset.resolved_cross_refs().count(), 2);
    }

    #[test]
    fn keyword_is_trimmed_in_content_and_encoded_in_links() {
        let dataset = generic_dataset("  Jazz Fusion ");
        assert_eq!(dataset.tree.label, "  Jazz Fusion ");
        assert_eq!(dataset.tree.url, "https://en.wikipedia.org/wiki/Jazz%20Fusion");
        assert_eq!(dataset.tree.children[0].label, "Origins of Jazz Fusion");
        assert_eq!(
            dataset.tree.children[0].url,
            "https://en.wikipedia.org/wiki/Jazz%20Fusion#History"
        );
        assert_eq!(dataset.tree.children[1].url, "#");
        assert!(dataset.tree.has_link());
        assert!(!dataset.tree.children[1].has_link());
    }
}
