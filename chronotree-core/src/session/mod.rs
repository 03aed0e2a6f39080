//! Crawl Sessions
//!
//! A session is the explicit owner of everything one exploration produces:
//! the loaded tree, its flat node index, crawl phase and progress, the
//! revealed set, and the current selection and hover.
//!
//! # Epochs
//!
//! Each `begin` or `reset` starts a new epoch. Crawl events are written
//! through a [`SessionObserver`] bound to the epoch it was created for, so a
//! crawl that is replaced (or merely slow to notice cancellation) can never
//! write into the search that replaced it.
//!
//! [`Explorer`] ties the pieces together: one session, at most one crawl.

mod explorer;
mod observer;
mod store;

pub use explorer::Explorer;
pub use observer::SessionObserver;
pub use store::{CrawlSession, Epoch, SessionSnapshot};
