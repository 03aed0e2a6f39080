//! Reveal Scheduler
//!
//! Simulates discovering a knowledge tree: the dataset for a keyword is
//! resolved up front, then its nodes are revealed one by one on a fixed
//! timetable while phase and progress are reported.
//!
//! # Architecture
//!
//! ```text
//! keyword ──► DatasetSource ──► Dataset ──► build_schedule ──► [ScheduledStep]
//!                                                                   │
//!                                   tokio task (sleep_until each) ◄─┘
//!                                                │
//!                                                ▼
//!                                          CrawlObserver
//! ```
//!
//! The schedule is pure data and can be inspected without a runtime. Only
//! [`start_crawl`] touches tokio.

mod heuristics;
mod observer;
mod schedule;
mod scheduler;
mod source;

pub use heuristics::{classify_node_branch, find_parent_node, FALLBACK_BRANCH};
pub use observer::{ChannelObserver, CrawlCallbacks, CrawlEvent, CrawlObserver};
pub use schedule::{
    branch_progress, build_schedule, revealed_at, CrawlPhase, ScheduleAction, ScheduleTiming,
    ScheduledStep,
};
pub use scheduler::{start_crawl, start_crawl_stream, CrawlHandle, CrawlOutcome};
pub use source::{DatasetSource, MockSource};
