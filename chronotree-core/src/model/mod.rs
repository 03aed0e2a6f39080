//! Data Model
//!
//! The shapes shared by every other module. Both the layout engine and the
//! reveal scheduler build on this module; it depends only on the error types.
//!
//! - [`TreeNode`]: one milestone plus its ordered children
//! - [`CrossRef`]: an auxiliary edge between two milestones, by id
//! - [`Dataset`]: a tree and its cross-references, as produced for a keyword
//! - [`NodeType`]: closed set of milestone kinds, with a total style mapping
//! - [`RevealedSet`]: ids discovered so far in a crawl

mod dataset;
mod node;
mod revealed;

pub use dataset::{Dataset, FlatNode, NodeRelations};
pub use revealed::RevealedSet;
pub use node::{branch_color, CrossRef, NodeStyle, NodeType, TreeNode, DEFAULT_BRANCH_COLOR};
