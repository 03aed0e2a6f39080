//! Revealed Set
//!
//! The ids discovered so far in one crawl. Grows monotonically; the order of
//! insertion is kept so renderers can stagger entry animations.

use indexmap::IndexSet;
use serde::Serialize;

/// Ids revealed during the current crawl, in reveal order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RevealedSet {
    ids: IndexSet<String>,
}

impl RevealedSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reveal an id. Returns `false` if it was already revealed.
    pub fn insert(&mut self, id: impl Into<String>) -> bool {
        self.ids.insert(id.into())
    }

    /// Check if an id has been revealed.
    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Position of an id in reveal order.
    pub fn reveal_index(&self, id: &str) -> Option<usize> {
        self.ids.get_index_of(id)
    }

    /// Number of revealed ids.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether nothing has been revealed yet.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Iterate ids in reveal order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    /// Forget everything.
    pub fn clear(&mut self) {
        self.ids.clear();
    }
}

impl<S: Into<String>> FromIterator<S> for RevealedSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl<S: Into<String>> Extend<S> for RevealedSet {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        self.ids.extend(iter.into_iter().map(Into::into));
    }
}
