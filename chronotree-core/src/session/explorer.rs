use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use super::observer::SessionObserver;
use super::store::{CrawlSession, Epoch};
use crate::crawl::{start_crawl, CrawlHandle, CrawlOutcome, DatasetSource, MockSource, ScheduleTiming};
use crate::error::CrawlError;

/// One session plus at most one crawl feeding it.
///
/// Starting a search cancels whatever crawl was running, so only the
/// latest search ever writes into the session. Dropping the explorer
/// cancels its crawl.
pub struct Explorer<S: DatasetSource = MockSource> {
    session: Arc<CrawlSession>,
    source: S,
    timing: ScheduleTiming,
    current: Mutex<Option<CrawlHandle>>,
}

impl Explorer<MockSource> {
    /// An explorer backed by the built-in datasets.
    pub fn new(timing: ScheduleTiming) -> Self {
        Self::with_source(MockSource, timing)
    }
}

impl Default for Explorer<MockSource> {
    fn default() -> Self {
        Self::new(ScheduleTiming::default())
    }
}

impl<S: DatasetSource> Explorer<S> {
    pub fn with_source(source: S, timing: ScheduleTiming) -> Self {
        Self {
            session: Arc::new(CrawlSession::new()),
            source,
            timing,
            current: Mutex::new(None),
        }
    }

    /// The session this explorer writes into.
    pub fn session(&self) -> &Arc<CrawlSession> {
        &self.session
    }

    pub fn timing(&self) -> &ScheduleTiming {
        &self.timing
    }

    /// Search for `keyword`: cancel the running crawl, start a new epoch and
    /// crawl into it.
    ///
    /// If the crawl cannot start, the session is left in the new epoch with
    /// crawling stopped.
    pub fn search(&self, keyword: &str) -> Result<Epoch, CrawlError> {
        let mut current = self.current.lock();
        if let Some(previous) = current.take() {
            debug!(previous = previous.keyword(), keyword, "replacing crawl");
            previous.cancel();
        }

        let epoch = self.session.begin(keyword);
        let observer = SessionObserver::new(self.session.clone(), epoch);
        match start_crawl(keyword, &self.source, observer, &self.timing) {
            Ok(handle) => {
                *current = Some(handle);
                Ok(epoch)
            }
            Err(err) => {
                self.session.halt();
                Err(err)
            }
        }
    }

    /// Stop the running crawl, keeping what it revealed.
    pub fn cancel(&self) {
        if let Some(handle) = self.current.lock().take() {
            handle.cancel();
            if !handle.is_complete() {
                self.session.halt();
            }
        }
    }

    /// Whether a crawl is in flight.
    pub fn is_crawling(&self) -> bool {
        self.current
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Wait for the running crawl to end. `None` if there was none.
    ///
    /// The crawl stays attached while waiting, so dropping this future early
    /// leaves it cancellable.
    pub async fn wait(&self) -> Option<CrawlOutcome> {
        let finished = self.current.lock().as_ref()?.finished();
        Some(finished.await)
    }
}

impl<S: DatasetSource> Drop for Explorer<S> {
    fn drop(&mut self) {
        if let Some(handle) = self.current.get_mut().take() {
            handle.cancel();
        }
    }
}

impl<S: DatasetSource> std::fmt::Debug for Explorer<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Explorer")
            .field("session", &self.session)
            .field("timing", &self.timing)
            .field("current", &*self.current.lock())
            .finish()
    }
}
