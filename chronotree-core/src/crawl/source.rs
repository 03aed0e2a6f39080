//! Where crawl datasets come from.

use crate::datasets::{ai_history, generic_dataset, is_ai_keyword};
use crate::error::DatasetError;
use crate::model::Dataset;

/// Resolves a keyword into the dataset a crawl will reveal.
///
/// Resolution is synchronous and happens before any timer starts, so a
/// failing source makes `start_crawl` fail instead of producing a crawl
/// that never reveals anything.
pub trait DatasetSource: Send + Sync {
    /// Produce the dataset for `keyword`.
    fn resolve(&self, keyword: &str) -> Result<Dataset, DatasetError>;
}

/// The built-in source: curated AI history for AI keywords, the generic
/// template for everything else.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockSource;

impl DatasetSource for MockSource {
    fn resolve(&self, keyword: &str) -> Result<Dataset, DatasetError> {
        if is_ai_keyword(keyword) {
            ai_history()
        } else {
            Ok(generic_dataset(keyword))
        }
    }
}

/// A fixed dataset regardless of keyword.
impl DatasetSource for Dataset {
    fn resolve(&self, _keyword: &str) -> Result<Dataset, DatasetError> {
        Ok(self.clone())
    }
}

impl<F> DatasetSource for F
where
    F: Fn(&str) -> Result<Dataset, DatasetError> + Send + Sync,
{
    fn resolve(&self, keyword: &str) -> Result<Dataset, DatasetError> {
        self(keyword)
    }
}
