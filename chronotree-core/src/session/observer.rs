use std::sync::Arc;

use super::store::{CrawlSession, Epoch};
use crate::crawl::{CrawlObserver, CrawlPhase};
use crate::model::Dataset;

/// Writes crawl events into a session, for one epoch only.
///
/// Once the session moves on (`begin` or `reset`), every further event from
/// this observer is dropped.
#[derive(Debug, Clone)]
pub struct SessionObserver {
    session: Arc<CrawlSession>,
    epoch: Epoch,
}

impl SessionObserver {
    pub fn new(session: Arc<CrawlSession>, epoch: Epoch) -> Self {
        Self { session, epoch }
    }

    pub fn epoch(&self) -> Epoch {
        self.epoch
    }
}

impl CrawlObserver for SessionObserver {
    fn on_phase(&mut self, phase: CrawlPhase, progress: u8) {
        self.session
            .update_if_current(self.epoch, |s| s.set_phase(phase, progress));
    }

    fn on_tree_ready(&mut self, dataset: Arc<Dataset>) {
        self.session
            .update_if_current(self.epoch, |s| s.set_tree(dataset));
    }

    fn on_node_revealed(&mut self, id: &str) {
        self.session.update_if_current(self.epoch, |s| s.reveal(id));
    }

    fn on_complete(&mut self) {
        self.session.update_if_current(self.epoch, |s| s.finish());
    }
}
