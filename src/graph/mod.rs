//! Graph module: the canonical node and edge store.
//!
//! # Module Organization
//!
//! - [`base`]: [`PipelineGraph`], the node map, the edge list and their mutation entry points
//! - [`relations`]: [`Relations`], a read-only petgraph projection for dependency queries
//!
//! ```rust
//! use pipeline_graph::graph::{PipelineGraph, Relations};
//! ```

mod base;
mod relations;


pub use base::PipelineGraph;
pub use relations::Relations;
