//! Chronotree Core
//!
//! This crate lays out knowledge trees on a timeline and simulates their
//! discovery. It implements:
//!
//! - The tree data model (nodes, cross-references, datasets)
//! - A timeline layout: tidy tree for y, a linear time scale for x
//! - A cancellable, time-phased reveal scheduler
//! - A session store fed by the scheduler
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - `model`: Tree, node and cross-reference types
//! - `layout`: Structural and temporal layout, edge geometry, view transforms
//! - `datasets`: Built-in datasets (curated AI history, generic template)
//! - `crawl`: Reveal schedule, crawl runner and observers
//! - `session`: Session state, epoch-guarded crawl observer, explorer
//! - `config`: JSON configuration
//!
//! Layout never depends on crawl and crawl never depends on layout; both
//! depend only on `model`.
//!
//! # Example
//!
//! ```rust,no_run
//! use chronotree_core::layout::{compute_layout, LayoutOptions};
//! use chronotree_core::session::Explorer;
//!
//! # async fn demo() -> Result<(), chronotree_core::CrawlError> {
//! let explorer = Explorer::default();
//! explorer.search("Deep Learning")?;
//! explorer.wait().await;
//!
//! let snapshot = explorer.session().snapshot();
//! let layout = snapshot.layout(&LayoutOptions::default());
//! for node in layout.visible_nodes(&snapshot.revealed) {
//!     println!("{} at ({:.0}, {:.0})", node.label, node.x, node.y);
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod crawl;
pub mod datasets;
pub mod error;
pub mod layout;
pub mod model;
pub mod session;

pub use config::ChronotreeConfig;
pub use error::{ConfigError, CrawlError, DatasetError};
