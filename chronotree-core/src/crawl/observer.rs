//! Crawl event consumers.
//!
//! A crawl reports through a [`CrawlObserver`]. Three flavours ship here:
//! implement the trait directly, wire closures with [`CrawlCallbacks`], or
//! receive [`CrawlEvent`]s on a channel through [`ChannelObserver`].

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::mpsc;

use super::schedule::CrawlPhase;
use crate::model::{Dataset, TreeNode};

/// Receives crawl events in schedule order.
///
/// Methods run on the crawl's task while it holds its dispatch gate, so
/// they should return quickly. Calling [`CrawlHandle::cancel`] from inside
/// a callback is allowed.
///
/// [`CrawlHandle::cancel`]: super::CrawlHandle::cancel
pub trait CrawlObserver: Send + 'static {
    /// Phase or progress changed.
    fn on_phase(&mut self, _phase: CrawlPhase, _progress: u8) {}

    /// The root node was found.
    fn on_root_found(&mut self, _root: &TreeNode) {}

    /// The whole dataset is available. Fires once, before any non-root reveal.
    fn on_tree_ready(&mut self, _dataset: Arc<Dataset>) {}

    /// A node became visible.
    fn on_node_revealed(&mut self, _id: &str) {}

    /// The crawl finished. Always the last event.
    fn on_complete(&mut self) {}
}

/// Discards everything.
impl CrawlObserver for () {}

type PhaseFn = Box<dyn FnMut(CrawlPhase, u8) + Send>;
type RootFn = Box<dyn FnMut(&TreeNode) + Send>;
type TreeFn = Box<dyn FnMut(Arc<Dataset>) + Send>;
type RevealFn = Box<dyn FnMut(&str) + Send>;
type CompleteFn = Box<dyn FnMut() + Send>;

/// Closure-based observer. Unset callbacks are skipped.
///
/// ```
/// use chronotree_core::crawl::CrawlCallbacks;
///
/// let callbacks = CrawlCallbacks::new()
///     .with_phase(|phase, progress| println!("{phase}: {progress}%"))
///     .with_complete(|| println!("done"));
/// # drop(callbacks);
/// ```
#[derive(Default)]
pub struct CrawlCallbacks {
    phase: Option<PhaseFn>,
    root_found: Option<RootFn>,
    tree_ready: Option<TreeFn>,
    node_revealed: Option<RevealFn>,
    complete: Option<CompleteFn>,
}

impl CrawlCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_phase(mut self, f: impl FnMut(CrawlPhase, u8) + Send + 'static) -> Self {
        self.phase = Some(Box::new(f));
        self
    }

    pub fn with_root_found(mut self, f: impl FnMut(&TreeNode) + Send + 'static) -> Self {
        self.root_found = Some(Box::new(f));
        self
    }

    pub fn with_tree_ready(mut self, f: impl FnMut(Arc<Dataset>) + Send + 'static) -> Self {
        self.tree_ready = Some(Box::new(f));
        self
    }

    pub fn with_node_revealed(mut self, f: impl FnMut(&str) + Send + 'static) -> Self {
        self.node_revealed = Some(Box::new(f));
        self
    }

    pub fn with_complete(mut self, f: impl FnMut() + Send + 'static) -> Self {
        self.complete = Some(Box::new(f));
        self
    }
}

impl std::fmt::Debug for CrawlCallbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrawlCallbacks")
            .field("phase", &self.phase.is_some())
            .field("root_found", &self.root_found.is_some())
            .field("tree_ready", &self.tree_ready.is_some())
            .field("node_revealed", &self.node_revealed.is_some())
            .field("complete", &self.complete.is_some())
            .finish()
    }
}

impl CrawlObserver for CrawlCallbacks {
    fn on_phase(&mut self, phase: CrawlPhase, progress: u8) {
        if let Some(f) = self.phase.as_mut() {
            f(phase, progress);
        }
    }

    fn on_root_found(&mut self, root: &TreeNode) {
        if let Some(f) = self.root_found.as_mut() {
            f(root);
        }
    }

    fn on_tree_ready(&mut self, dataset: Arc<Dataset>) {
        if let Some(f) = self.tree_ready.as_mut() {
            f(dataset);
        }
    }

    fn on_node_revealed(&mut self, id: &str) {
        if let Some(f) = self.node_revealed.as_mut() {
            f(id);
        }
    }

    fn on_complete(&mut self) {
        if let Some(f) = self.complete.as_mut() {
            f();
        }
    }
}

/// A crawl event as a value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum CrawlEvent {
    Phase {
        phase: CrawlPhase,
        progress: u8,
    },
    /// The root node, without its subtree.
    RootFound { root: TreeNode },
    TreeReady {
        #[serde(skip)]
        dataset: Arc<Dataset>,
        #[serde(rename = "nodeCount")]
        node_count: usize,
    },
    NodeRevealed { id: String },
    Complete,
}

impl CrawlEvent {
    /// Whether this is the final event of a crawl.
    pub fn is_complete(&self) -> bool {
        matches!(self, CrawlEvent::Complete)
    }
}

/// Forwards events into an unbounded channel.
///
/// The sender is dropped with the crawl task, so the receiving side ends
/// after completion or cancellation. A closed receiver is ignored.
#[derive(Debug, Clone)]
pub struct ChannelObserver {
    tx: mpsc::UnboundedSender<CrawlEvent>,
}

impl ChannelObserver {
    /// Create an observer and the receiver it feeds.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<CrawlEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    fn send(&self, event: CrawlEvent) {
        let _ = self.tx.send(event);
    }
}

impl CrawlObserver for ChannelObserver {
    fn on_phase(&mut self, phase: CrawlPhase, progress: u8) {
        self.send(CrawlEvent::Phase { phase, progress });
    }

    fn on_root_found(&mut self, root: &TreeNode) {
        self.send(CrawlEvent::RootFound {
            root: root.detached(),
        });
    }

    fn on_tree_ready(&mut self, dataset: Arc<Dataset>) {
        let node_count = dataset.node_count();
        self.send(CrawlEvent::TreeReady {
            dataset,
            node_count,
        });
    }

    fn on_node_revealed(&mut self, id: &str) {
        self.send(CrawlEvent::NodeRevealed { id: id.to_string() });
    }

    fn on_complete(&mut self) {
        self.send(CrawlEvent::Complete);
    }
}
