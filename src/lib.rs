//! Generates node2vec random walk corpora.  Graphs are turned into alias
//! tables for every vertex and directed edge up front, after which each walk
//! step is a constant time draw.  The resulting walks are meant to be fed to
//! a skip-gram trainer as sentences.

/// Weighted adjacency graph and its builder
pub mod graph;

/// Walker's alias method for constant time sampling
pub mod alias;

/// Precomputes the first step and second order transition tables
pub mod transition;

/// Single biased walks
pub mod walker;

/// Parallel, deterministic walk corpus generation
pub mod rw;

/// Edge list ingestion
pub mod reader;

/// Writes walks out as sentences
pub mod corpus;

pub mod error;

/// Who doesn't like progress bars?
mod pb;

pub use crate::error::N2vErr;
pub use crate::graph::{Graph,GraphBuilder};
pub use crate::transition::{TransitionBuilder,TransitionTables};
pub use crate::rw::RandomWalk;
