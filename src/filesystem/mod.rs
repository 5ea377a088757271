//! In-memory directory tree and the builder that produces it from disk.
//!
//! The builder walks depth-first with an explicit work stack, so tree depth
//! is bounded by the filesystem rather than by the call stack. Listing
//! failures are collected alongside the tree instead of aborting the walk.

mod builder;
mod node;

pub use builder::{ScanFailure, ScanReport, TreeBuilder};
pub use node::{Node, NodeKind};
