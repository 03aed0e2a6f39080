//! Crawl Runner
//!
//! Drives a [`build_schedule`] timetable on the tokio runtime and reports
//! each step to an observer.
//!
//! # Cancellation
//!
//! Every crawl owns a dispatch gate: a reentrant lock held while the
//! observer runs, plus a cancelled flag checked under that lock before each
//! action. [`CrawlHandle::cancel`] takes the same lock to set the flag, so
//! once it returns no further callback can start. The timer task is aborted
//! as well, so a cancelled crawl stops consuming timers.
//!
//! The lock is reentrant so an observer may cancel its own crawl from
//! inside a callback.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::ReentrantMutex;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, trace};

use super::observer::{ChannelObserver, CrawlEvent, CrawlObserver};
use super::schedule::{build_schedule, ScheduleAction, ScheduleTiming, ScheduledStep};
use super::source::DatasetSource;
use crate::error::CrawlError;
use crate::model::Dataset;

/// How a crawl ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlOutcome {
    /// Every scheduled event was delivered.
    Completed,
    /// The crawl was cancelled before completing.
    Cancelled,
}

#[derive(Default)]
struct Gate {
    dispatch: ReentrantMutex<()>,
    cancelled: AtomicBool,
    completed: AtomicBool,
}

impl Gate {
    /// Deliver one step. Returns `false` once the crawl has been cancelled.
    fn dispatch<O: CrawlObserver>(
        &self,
        step: &ScheduledStep,
        dataset: &Arc<Dataset>,
        observer: &mut O,
    ) -> bool {
        let _guard = self.dispatch.lock();
        for action in &step.actions {
            if self.cancelled.load(Ordering::Acquire) {
                return false;
            }
            match action {
                ScheduleAction::Phase(phase, progress) => observer.on_phase(*phase, *progress),
                ScheduleAction::RootFound => observer.on_root_found(&dataset.tree),
                ScheduleAction::TreeReady => observer.on_tree_ready(dataset.clone()),
                ScheduleAction::Reveal(id) => observer.on_node_revealed(id),
                ScheduleAction::Complete => {
                    self.completed.store(true, Ordering::Release);
                    observer.on_complete();
                }
            }
        }
        true
    }

    fn outcome(&self) -> CrawlOutcome {
        if self.completed.load(Ordering::Acquire) {
            CrawlOutcome::Completed
        } else {
            CrawlOutcome::Cancelled
        }
    }
}

/// A running crawl.
///
/// Dropping the handle leaves the crawl running; call [`cancel`] to stop it.
///
/// [`cancel`]: CrawlHandle::cancel
pub struct CrawlHandle {
    keyword: String,
    duration: Duration,
    gate: Arc<Gate>,
    task: JoinHandle<()>,
    // Closed when the crawl task is dropped, however it ended.
    ended: watch::Receiver<()>,
}

impl CrawlHandle {
    /// The keyword this crawl was started for.
    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    /// Scheduled time from start to completion.
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Stop the crawl.
    ///
    /// No observer callback starts after this returns. Calling it again, or
    /// after the crawl completed, does nothing.
    pub fn cancel(&self) {
        let _guard = self.gate.dispatch.lock();
        if self.gate.completed.load(Ordering::Acquire) {
            return;
        }
        if self.gate.cancelled.swap(true, Ordering::AcqRel) {
            return;
        }
        self.task.abort();
        debug!(keyword = %self.keyword, "crawl cancelled");
    }

    /// Whether [`cancel`](CrawlHandle::cancel) took effect.
    pub fn is_cancelled(&self) -> bool {
        self.gate.cancelled.load(Ordering::Acquire)
    }

    /// Whether the crawl delivered its completion event.
    pub fn is_complete(&self) -> bool {
        self.gate.completed.load(Ordering::Acquire)
    }

    /// Whether the crawl task has stopped, for any reason.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// A future resolving once the crawl task has stopped.
    ///
    /// Unlike [`wait`](CrawlHandle::wait) this leaves the handle in place, so
    /// the crawl can still be cancelled if the future is dropped early. A
    /// crawl whose observer panicked reports [`CrawlOutcome::Cancelled`].
    pub fn finished(&self) -> impl Future<Output = CrawlOutcome> + Send + 'static {
        let mut ended = self.ended.clone();
        let gate = self.gate.clone();
        async move {
            while ended.changed().await.is_ok() {}
            gate.outcome()
        }
    }

    /// Wait for the crawl to end.
    ///
    /// A panic inside an observer is resumed on the caller.
    pub async fn wait(self) -> CrawlOutcome {
        let result = self.task.await;
        match result {
            Ok(()) => self.gate.outcome(),
            Err(err) if err.is_cancelled() => CrawlOutcome::Cancelled,
            Err(err) => std::panic::resume_unwind(err.into_panic()),
        }
    }
}

impl std::fmt::Debug for CrawlHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrawlHandle")
            .field("keyword", &self.keyword)
            .field("duration", &self.duration)
            .field("cancelled", &self.is_cancelled())
            .field("complete", &self.is_complete())
            .finish()
    }
}

/// Start a simulated crawl for `keyword`.
///
/// The dataset is resolved immediately; events then arrive on `observer`
/// at the offsets given by `timing`, measured from this call. Must be
/// called from within a tokio runtime.
pub fn start_crawl<S, O>(
    keyword: &str,
    source: &S,
    observer: O,
    timing: &ScheduleTiming,
) -> Result<CrawlHandle, CrawlError>
where
    S: DatasetSource + ?Sized,
    O: CrawlObserver,
{
    let runtime = Handle::try_current().map_err(|_| CrawlError::NoRuntime)?;
    let dataset = source
        .resolve(keyword)
        .map_err(|source| CrawlError::Dataset {
            keyword: keyword.to_string(),
            source,
        })?;

    let steps = build_schedule(&dataset, timing);
    let duration = steps.last().map(|s| s.at).unwrap_or_default();
    debug!(
        keyword,
        root = %dataset.tree.id,
        nodes = dataset.node_count(),
        steps = steps.len(),
        duration_ms = duration.as_millis() as u64,
        "starting crawl"
    );

    let gate = Arc::new(Gate::default());
    let (ended_tx, ended) = watch::channel(());
    let started = Instant::now();
    let task = runtime.spawn(run(
        Arc::new(dataset),
        steps,
        observer,
        gate.clone(),
        started,
        ended_tx,
    ));

    Ok(CrawlHandle {
        keyword: keyword.to_string(),
        duration,
        gate,
        task,
        ended,
    })
}

/// Start a crawl whose events are delivered on a channel.
///
/// The receiver yields `None` after the final event, or after cancellation.
pub fn start_crawl_stream<S>(
    keyword: &str,
    source: &S,
    timing: &ScheduleTiming,
) -> Result<(CrawlHandle, mpsc::UnboundedReceiver<CrawlEvent>), CrawlError>
where
    S: DatasetSource + ?Sized,
{
    let (observer, rx) = ChannelObserver::channel();
    let handle = start_crawl(keyword, source, observer, timing)?;
    Ok((handle, rx))
}

async fn run<O: CrawlObserver>(
    dataset: Arc<Dataset>,
    steps: Vec<ScheduledStep>,
    mut observer: O,
    gate: Arc<Gate>,
    started: Instant,
    _ended: watch::Sender<()>,
) {
    for step in &steps {
        sleep_until(started + step.at).await;
        trace!(at_ms = step.at.as_millis() as u64, actions = step.actions.len(), "crawl step");
        if !gate.dispatch(step, &dataset, &mut observer) {
            return;
        }
    }
    debug!(root = %dataset.tree.id, "crawl complete");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawl::{CrawlCallbacks, CrawlPhase, MockSource};
    use crate::error::DatasetError;
    use parking_lot::Mutex;

    #[derive(Debug, Clone, PartialEq)]
    enum Seen {
        Phase(CrawlPhase, u8),
        Root(String),
        Tree(usize),
        Reveal(String),
        Complete,
    }

    /// Observer recording every event with its offset from the crawl start.
    fn recorder() -> (CrawlCallbacks, Arc<Mutex<Vec<(u64, Seen)>>>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let started = Instant::now();
        let at = move || started.elapsed().as_millis() as u64;

        let (l1, l2, l3, l4, l5) = (log.clone(), log.clone(), log.clone(), log.clone(), log.clone());
        let callbacks = CrawlCallbacks::new()
            .with_phase(move |phase, progress| l1.lock().push((at(), Seen::Phase(phase, progress))))
            .with_root_found(move |root| l2.lock().push((at(), Seen::Root(root.id.clone()))))
            .with_tree_ready(move |dataset| l3.lock().push((at(), Seen::Tree(dataset.node_count()))))
            .with_node_revealed(move |id| l4.lock().push((at(), Seen::Reveal(id.to_string()))))
            .with_complete(move || l5.lock().push((at(), Seen::Complete)));
        (callbacks, log)
    }

    fn reveals(log: &[(u64, Seen)]) -> Vec<(u64, String)> {
        log.iter()
            .filter_map(|(t, e)| match e {
                Seen::Reveal(id) => Some((*t, id.clone())),
                _ => None,
            })
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn generic_crawl_runs_to_completion() {
        let (observer, log) = recorder();
        let handle = start_crawl("Tea", &MockSource, observer, &ScheduleTiming::default()).unwrap();
        assert_eq!(handle.duration(), Duration::from_millis(5120));
        assert_eq!(handle.wait().await, CrawlOutcome::Completed);

        let log = log.lock();
        assert_eq!(log[0], (300, Seen::Phase(CrawlPhase::Root, 5)));
        assert_eq!(
            log[1..5].to_vec(),
            vec![
                (800, Seen::Phase(CrawlPhase::Root, 15)),
                (800, Seen::Root("root".to_string())),
                (800, Seen::Tree(10)),
                (800, Seen::Reveal("root".to_string())),
            ]
        );
        assert_eq!(log[5], (1200, Seen::Phase(CrawlPhase::Branches, 20)));

        let revealed = reveals(&log);
        assert_eq!(revealed.len(), 10);
        assert_eq!(revealed[1], (1500, "origins".to_string()));
        assert_eq!(revealed[9], (2940, "current".to_string()));

        let tail: Vec<_> = log.iter().rev().take(4).rev().cloned().collect();
        assert_eq!(
            tail,
            vec![
                (3620, Seen::Phase(CrawlPhase::Crossrefs, 75)),
                (4420, Seen::Phase(CrawlPhase::Crossrefs, 90)),
                (5120, Seen::Phase(CrawlPhase::Done, 100)),
                (5120, Seen::Complete),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_before_first_event_silences_everything() {
        let (observer, log) = recorder();
        let handle = start_crawl("Tea", &MockSource, observer, &ScheduleTiming::default()).unwrap();

        tokio::time::sleep(Duration::from_millis(100)).await;
        handle.cancel();
        assert!(handle.is_cancelled());
        tokio::time::sleep(Duration::from_secs(10)).await;

        assert!(log.lock().is_empty());
        assert_eq!(handle.wait().await, CrawlOutcome::Cancelled);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_mid_reveal_stops_further_reveals() {
        let (observer, log) = recorder();
        let handle = start_crawl("Tea", &MockSource, observer, &ScheduleTiming::default()).unwrap();

        tokio::time::sleep(Duration::from_millis(2000)).await;
        handle.cancel();
        handle.cancel();
        let before = log.lock().len();
        tokio::time::sleep(Duration::from_secs(10)).await;

        let log = log.lock();
        assert_eq!(log.len(), before);
        assert_eq!(reveals(&log).len(), 4);
        assert!(!log.iter().any(|(_, e)| *e == Seen::Complete));
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_after_completion_is_a_no_op() {
        let handle = start_crawl("Tea", &MockSource, (), &ScheduleTiming::default()).unwrap();
        tokio::time::sleep(Duration::from_secs(6)).await;
        assert!(handle.is_complete());

        handle.cancel();
        assert!(!handle.is_cancelled());
        assert_eq!(handle.wait().await, CrawlOutcome::Completed);
    }

    #[tokio::test(start_paused = true)]
    async fn finished_leaves_handle_usable() {
        let handle = start_crawl("Tea", &MockSource, (), &ScheduleTiming::default()).unwrap();

        let early = tokio::time::timeout(Duration::from_millis(1000), handle.finished()).await;
        assert!(early.is_err());
        assert!(!handle.is_finished());

        handle.cancel();
        assert_eq!(handle.finished().await, CrawlOutcome::Cancelled);
        assert_eq!(handle.finished().await, CrawlOutcome::Cancelled);
        assert!(handle.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn finished_reports_completion() {
        let handle = start_crawl("Tea", &MockSource, (), &ScheduleTiming::default()).unwrap();
        assert_eq!(handle.finished().await, CrawlOutcome::Completed);
        assert!(handle.is_complete());
        assert_eq!(handle.wait().await, CrawlOutcome::Completed);
    }

    #[tokio::test(start_paused = true)]
    async fn observer_may_cancel_its_own_crawl() {
        let slot: Arc<Mutex<Option<CrawlHandle>>> = Arc::new(Mutex::new(None));
        let events = Arc::new(Mutex::new(Vec::new()));

        let (cancel_slot, sink) = (slot.clone(), events.clone());
        let observer = CrawlCallbacks::new()
            .with_phase({
                let sink = events.clone();
                move |_, progress| sink.lock().push(format!("phase {progress}"))
            })
            .with_node_revealed(move |id| {
                sink.lock().push(format!("reveal {id}"));
                if let Some(handle) = cancel_slot.lock().as_ref() {
                    handle.cancel();
                }
            });

        let handle = start_crawl("Tea", &MockSource, observer, &ScheduleTiming::default()).unwrap();
        *slot.lock() = Some(handle);
        tokio::time::sleep(Duration::from_secs(10)).await;

        assert_eq!(
            *events.lock(),
            vec!["phase 5".to_string(), "phase 15".to_string(), "reveal root".to_string()]
        );
        let handle = slot.lock().take().unwrap();
        assert_eq!(handle.wait().await, CrawlOutcome::Cancelled);
    }

    #[tokio::test(start_paused = true)]
    async fn stream_ends_after_complete() {
        let (handle, mut rx) =
            start_crawl_stream("AI", &MockSource, &ScheduleTiming::default()).unwrap();

        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        assert!(events.last().is_some_and(CrawlEvent::is_complete));

        let tree_ready = events
            .iter()
            .position(|e| matches!(e, CrawlEvent::TreeReady { node_count: 50, .. }))
            .unwrap();
        let reveal_positions: Vec<usize> = events
            .iter()
            .enumerate()
            .filter(|(_, e)| matches!(e, CrawlEvent::NodeRevealed { .. }))
            .map(|(i, _)| i)
            .collect();
        assert_eq!(reveal_positions.len(), 50);
        assert!(reveal_positions[1..].iter().all(|&i| i > tree_ready));
        assert_eq!(handle.wait().await, CrawlOutcome::Completed);
    }

    #[tokio::test(start_paused = true)]
    async fn failing_source_fails_to_start() {
        let source = |_: &str| -> Result<Dataset, DatasetError> {
            Err(DatasetError::DuplicateId("x".to_string()))
        };
        let err = start_crawl("anything", &source, (), &ScheduleTiming::default()).unwrap_err();
        assert!(matches!(err, CrawlError::Dataset { ref keyword, .. } if keyword == "anything"));
    }

    #[test]
    fn requires_a_runtime() {
        let err = start_crawl("Tea", &MockSource, (), &ScheduleTiming::default()).unwrap_err();
        assert!(matches!(err, CrawlError::NoRuntime));
    }
}
