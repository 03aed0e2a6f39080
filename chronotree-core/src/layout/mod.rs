//! Timeline Layout
//!
//! This module turns a knowledge tree into 2D coordinates for rendering.
//!
//! # Overview
//!
//! Layout happens in two independent passes that are combined per node:
//!
//! - A structural pass (tidy tree) decides vertical placement from the
//!   hierarchy alone, keeping declared sibling order.
//! - A temporal pass maps each node's year through a linear [`TimeScale`]
//!   to decide horizontal placement.
//!
//! The time scale is the only source of x. Ticks on the axis use the same
//! scale, so they are always pixel-aligned with the nodes.
//!
//! # Design Decisions
//!
//! 1. Layout is a pure function. There is no incremental update path; any
//!    change to the tree or canvas means a fresh [`compute_layout`] call.
//!
//! 2. Links refer to nodes by index into [`Layout::nodes`] rather than by
//!    owning copies, so a layout is a flat, serialisable value.
//!
//! 3. Cross-references are resolved lazily against a layout. Edges naming
//!    unknown ids are dropped at that point instead of being rejected
//!    up front.

mod engine;
mod path;
mod scale;
mod tidy;

pub use engine::{
    compute_layout, CrossRefPath, Layout, LayoutLink, LayoutNode, LayoutOptions, Padding,
    ViewTransform,
};
pub use path::{cross_ref_path, link_path, PathGeometry, Point, CROSS_REF_BOW};
pub use scale::{
    timeline_ticks, TimeScale, TimelineTick, YearExtent, DEFAULT_TICK_STEP, DEFAULT_YEAR_EXTENT,
};
pub use tidy::{StructuralLayout, TidyTree};
