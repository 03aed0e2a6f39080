use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;
use serde::Serialize;
use tracing::{debug, trace};

use crate::crawl::CrawlPhase;
use crate::layout::{compute_layout, Layout, LayoutOptions};
use crate::model::{CrossRef, Dataset, FlatNode, RevealedSet};

/// Identifies one search within a session. Bumped by every `begin` and `reset`.
pub type Epoch = u64;

#[derive(Debug, Default)]
struct SessionState {
    epoch: Epoch,
    keyword: String,
    has_searched: bool,
    is_crawling: bool,
    phase: Option<CrawlPhase>,
    progress: u8,
    dataset: Option<Arc<Dataset>>,
    flat: IndexMap<String, FlatNode>,
    revealed: RevealedSet,
    selected: Option<String>,
    hovered: Option<String>,
}

impl SessionState {
    fn clear(&mut self) {
        let epoch = self.epoch + 1;
        *self = SessionState {
            epoch,
            ..SessionState::default()
        };
    }

    fn set_phase(&mut self, phase: CrawlPhase, progress: u8) {
        self.phase = Some(phase);
        self.progress = self.progress.max(progress.min(100));
    }

    fn set_tree(&mut self, dataset: Arc<Dataset>) {
        self.flat = dataset
            .flatten()
            .into_iter()
            .map(|node| (node.id.clone(), node))
            .collect();
        self.dataset = Some(dataset);
    }

    fn finish(&mut self) {
        self.is_crawling = false;
        self.set_phase(CrawlPhase::Done, 100);
    }
}

/// State of one exploration: the tree being revealed, crawl progress and
/// what the user is pointing at.
///
/// All methods take `&self`; the state sits behind a lock so a session can
/// be shared between a running crawl and its readers.
#[derive(Debug, Default)]
pub struct CrawlSession {
    state: RwLock<SessionState>,
}

impl CrawlSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current epoch.
    pub fn epoch(&self) -> Epoch {
        self.state.read().epoch
    }

    /// Start a new search: everything is cleared and a new epoch begins.
    pub fn begin(&self, keyword: &str) -> Epoch {
        let mut state = self.state.write();
        state.clear();
        state.keyword = keyword.to_string();
        state.has_searched = true;
        state.is_crawling = true;
        state.phase = Some(CrawlPhase::Root);
        debug!(keyword, epoch = state.epoch, "session begin");
        state.epoch
    }

    /// Back to the initial, never-searched state. Also starts a new epoch.
    pub fn reset(&self) {
        let mut state = self.state.write();
        state.clear();
        debug!(epoch = state.epoch, "session reset");
    }

    /// Record phase and progress. Progress never moves backwards.
    pub fn set_phase(&self, phase: CrawlPhase, progress: u8) {
        self.state.write().set_phase(phase, progress);
    }

    /// Install the tree being revealed and index its nodes.
    pub fn set_tree(&self, dataset: Arc<Dataset>) {
        self.state.write().set_tree(dataset);
    }

    /// Mark a node visible. Returns `false` if it already was.
    pub fn reveal(&self, id: &str) -> bool {
        self.state.write().revealed.insert(id)
    }

    pub fn reveal_many<I, S>(&self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.state.write().revealed.extend(ids);
    }

    /// The crawl completed.
    pub fn finish(&self) {
        self.state.write().finish();
    }

    /// The crawl stopped early. Everything revealed so far stays.
    pub fn halt(&self) {
        self.state.write().is_crawling = false;
    }

    /// Select a node by id. Returns `false`, leaving the selection alone, if
    /// no such node is loaded.
    pub fn select(&self, id: &str) -> bool {
        let mut state = self.state.write();
        if !state.flat.contains_key(id) {
            return false;
        }
        state.selected = Some(id.to_string());
        true
    }

    pub fn clear_selection(&self) {
        self.state.write().selected = None;
    }

    /// Set or clear the hovered node.
    pub fn hover(&self, id: Option<&str>) {
        self.state.write().hovered = id.map(str::to_string);
    }

    /// Look up a loaded node.
    pub fn node(&self, id: &str) -> Option<FlatNode> {
        self.state.read().flat.get(id).cloned()
    }

    /// The selected node, if any.
    pub fn selected_node(&self) -> Option<FlatNode> {
        let state = self.state.read();
        state.selected.as_ref().and_then(|id| state.flat.get(id)).cloned()
    }

    pub fn is_revealed(&self, id: &str) -> bool {
        self.state.read().revealed.contains(id)
    }

    /// A consistent copy of the whole state.
    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.state.read();
        SessionSnapshot {
            epoch: state.epoch,
            keyword: state.keyword.clone(),
            has_searched: state.has_searched,
            is_crawling: state.is_crawling,
            phase: state.phase,
            progress: state.progress,
            revealed: state.revealed.clone(),
            selected: state.selected.clone(),
            hovered: state.hovered.clone(),
            revealed_count: state.revealed.len(),
            total_count: state.flat.len(),
            cross_ref_count: state.dataset.as_ref().map_or(0, |d| d.cross_refs.len()),
            dataset: state.dataset.clone(),
        }
    }

    /// Apply `update` only if `epoch` is still current.
    ///
    /// Returns whether the update ran.
    pub(crate) fn update_if_current(
        &self,
        epoch: Epoch,
        update: impl FnOnce(&mut SessionUpdate<'_>),
    ) -> bool {
        let mut state = self.state.write();
        if state.epoch != epoch {
            trace!(stale = epoch, current = state.epoch, "dropping stale crawl event");
            return false;
        }
        update(&mut SessionUpdate { state: &mut *state });
        true
    }
}

/// Write access to a session for one epoch-checked update.
pub(crate) struct SessionUpdate<'a> {
    state: &'a mut SessionState,
}

impl SessionUpdate<'_> {
    pub(crate) fn set_phase(&mut self, phase: CrawlPhase, progress: u8) {
        self.state.set_phase(phase, progress);
    }

    pub(crate) fn set_tree(&mut self, dataset: Arc<Dataset>) {
        self.state.set_tree(dataset);
    }

    pub(crate) fn reveal(&mut self, id: &str) {
        self.state.revealed.insert(id);
    }

    pub(crate) fn finish(&mut self) {
        self.state.finish();
    }
}

/// Read-only copy of a session at one moment.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub epoch: Epoch,
    pub keyword: String,
    pub has_searched: bool,
    pub is_crawling: bool,
    pub phase: Option<CrawlPhase>,
    pub progress: u8,
    pub revealed: RevealedSet,
    pub selected: Option<String>,
    pub hovered: Option<String>,
    pub revealed_count: usize,
    pub total_count: usize,
    pub cross_ref_count: usize,
    #[serde(skip)]
    pub dataset: Option<Arc<Dataset>>,
}

impl SessionSnapshot {
    /// Status line for the current phase.
    pub fn status_label(&self) -> Option<&'static str> {
        self.phase.map(|p| p.status_label())
    }

    /// Cross-references of the loaded tree.
    pub fn cross_refs(&self) -> &[CrossRef] {
        match self.dataset.as_deref() {
            Some(dataset) => &dataset.cross_refs,
            None => &[],
        }
    }

    /// Distinct branches of the loaded tree, for a legend.
    pub fn branches(&self) -> Vec<&str> {
        self.dataset.as_deref().map_or_else(Vec::new, Dataset::branches)
    }

    /// Lay out the loaded tree, or an empty canvas if none is loaded.
    pub fn layout(&self, options: &LayoutOptions) -> Layout {
        match self.dataset.as_deref() {
            Some(dataset) => compute_layout(&dataset.tree, options),
            None => Layout::empty(options),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datasets::generic_dataset;

    fn loaded() -> CrawlSession {
        let session = CrawlSession::new();
        session.begin("Tea");
        session.set_tree(Arc::new(generic_dataset("Tea")));
        session
    }

    #[test]
    fn begin_resets_and_bumps_epoch() {
        let session = loaded();
        session.reveal("root");
        session.select("origins");
        session.set_phase(CrawlPhase::Branches, 40);
        let first = session.epoch();

        let second = session.begin("Coffee");
        assert_eq!(second, first + 1);

        let snap = session.snapshot();
        assert_eq!(snap.keyword, "Coffee");
        assert!(snap.is_crawling && snap.has_searched);
        assert_eq!(snap.phase, Some(CrawlPhase::Root));
        assert_eq!(snap.progress, 0);
        assert_eq!((snap.revealed_count, snap.total_count, snap.cross_ref_count), (0, 0, 0));
        assert!(snap.selected.is_none());
        assert!(snap.dataset.is_none());
    }

    #[test]
    fn progress_never_decreases() {
        let session = loaded();
        session.set_phase(CrawlPhase::Branches, 45);
        session.set_phase(CrawlPhase::Branches, 30);
        let snap = session.snapshot();
        assert_eq!(snap.progress, 45);
        assert_eq!(snap.status_label(), Some("Exploring branches..."));
    }

    #[test]
    fn counts_follow_tree_and_reveals() {
        let session = loaded();
        assert!(session.reveal("root"));
        assert!(!session.reveal("root"));
        session.reveal_many(["origins", "golden-age"]);

        let snap = session.snapshot();
        assert_eq!(snap.revealed_count, 3);
        assert_eq!(snap.total_count, 10);
        assert_eq!(snap.cross_ref_count, 2);
        assert_eq!(snap.revealed.iter().collect::<Vec<_>>(), vec!["root", "origins", "golden-age"]);
    }

    #[test]
    fn selection_requires_known_node() {
        let session = loaded();
        assert!(!session.select("nope"));
        assert!(session.select("digital"));
        assert_eq!(session.selected_node().map(|n| n.depth), Some(2));
        assert_eq!(session.node("digital").and_then(|n| n.parent_id), Some("modern-era".to_string()));

        session.clear_selection();
        assert!(session.selected_node().is_none());

        session.hover(Some("current"));
        assert_eq!(session.snapshot().hovered.as_deref(), Some("current"));
        session.hover(None);
        assert!(session.snapshot().hovered.is_none());
    }

    #[test]
    fn finish_and_reset() {
        let session = loaded();
        session.finish();
        let snap = session.snapshot();
        assert!(!snap.is_crawling);
        assert_eq!((snap.phase, snap.progress), (Some(CrawlPhase::Done), 100));

        session.reset();
        let snap = session.snapshot();
        assert!(!snap.has_searched);
        assert!(snap.keyword.is_empty());
        assert!(snap.phase.is_none());
        assert_eq!(snap.layout(&LayoutOptions::default()).nodes.len(), 0);
    }

    #[test]
    fn stale_updates_are_dropped() {
        let session = CrawlSession::new();
        let old = session.begin("Tea");
        let current = session.begin("Coffee");

        assert!(!session.update_if_current(old, |s| s.reveal("root")));
        assert!(session.update_if_current(current, |s| s.reveal("root")));
        assert_eq!(session.snapshot().revealed_count, 1);
    }

    #[test]
    fn snapshot_lays_out_loaded_tree() {
        let snap = loaded().snapshot();
        let layout = snap.layout(&LayoutOptions::default());
        assert_eq!(layout.nodes.len(), 10);
        assert_eq!(snap.branches(), vec!["root", "origins", "golden-age", "modern"]);
        assert_eq!(snap.cross_refs().len(), 2);
    }
}
