//! Built-in Datasets
//!
//! Stand-ins for a live content pipeline: one curated history of artificial
//! intelligence and one template that fits any topic.

mod generic;

pub use generic::generic_dataset;

use crate::error::DatasetError;
use crate::model::Dataset;

const AI_HISTORY_JSON: &str = include_str!("ai_history.json");

/// Keywords (compared trimmed and case-insensitively) that select the
/// curated AI history.
pub const AI_KEYWORDS: [&str; 6] = [
    "ai",
    "artificial intelligence",
    "machine learning",
    "deep learning",
    "ml",
    "dl",
];

/// Check if a keyword selects the curated AI history.
pub fn is_ai_keyword(keyword: &str) -> bool {
    let keyword = keyword.trim();
    AI_KEYWORDS.iter().any(|k| k.eq_ignore_ascii_case(keyword))
}

/// The curated history of artificial intelligence, rooted at `ai-root`.
pub fn ai_history() -> Result<Dataset, DatasetError> {
    Dataset::from_json_str(AI_HISTORY_JSON)
}
