#![forbid(unsafe_code)]

//! Headless breadth-first graph layout.
//!
//! `nautilus` is used by `colloquy` to place speaker graphs on concentric rings. Nodes are
//! grouped by their breadth-first distance from a root set and spread evenly around circles
//! whose radius grows with that distance. The output is a pure function of the graph and the
//! options: no randomness, no dependence on hash iteration order.

pub mod algo;
pub mod error;
pub mod graph;

pub use algo::{Algorithm, BoundingBox, BreadthfirstOptions, DepthSort};
pub use error::{Error, Result};
pub use graph::{Edge, Graph, LayoutResult, Node, Point};

/// Headless layout entry point.
pub fn layout(graph: &Graph, algorithm: Algorithm) -> Result<LayoutResult> {
    match algorithm {
        Algorithm::Breadthfirst(opts) => algo::breadthfirst::layout(graph, &opts),
    }
}
