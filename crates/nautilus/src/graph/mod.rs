use crate::error::{Error, Result};
use rustc_hash::FxHashMap;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default)]
pub struct Graph {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl Graph {
    pub fn validate(&self) -> Result<()> {
        let mut seen: FxHashMap<&str, usize> = FxHashMap::default();
        for (idx, n) in self.nodes.iter().enumerate() {
            if seen.insert(n.id.as_str(), idx).is_some() {
                return Err(Error::DuplicateNode {
                    node_id: n.id.clone(),
                });
            }
            let size_ok = |v: f64| v.is_finite() && v >= 0.0;
            if !size_ok(n.width) || !size_ok(n.height) {
                return Err(Error::InvalidNodeSize {
                    node_id: n.id.clone(),
                });
            }
        }
        for e in &self.edges {
            if !seen.contains_key(e.source.as_str()) || !seen.contains_key(e.target.as_str()) {
                return Err(Error::MissingEndpoint {
                    edge_id: e.id.clone(),
                });
            }
        }
        Ok(())
    }

    /// Maps node ids to their position in `nodes`.
    pub fn node_index(&self) -> FxHashMap<&str, usize> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(idx, n)| (n.id.as_str(), idx))
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    pub id: String,
    pub width: f64,
    pub height: f64,
}

impl Node {
    pub fn new(id: impl Into<String>, width: f64, height: f64) -> Self {
        Self {
            id: id.into(),
            width,
            height,
        }
    }

    /// The diameter of the circle that encloses the node's box along its longer side.
    pub fn diameter(&self) -> f64 {
        self.width.max(self.height)
    }
}

#[derive(Debug, Clone)]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
}

impl Edge {
    pub fn new(id: impl Into<String>, source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
        }
    }

    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn distance(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

#[derive(Debug, Clone, Default)]
pub struct LayoutResult {
    pub positions: BTreeMap<String, Point>,
    /// Ring index of every node.
    pub depths: BTreeMap<String, usize>,
    /// Roots actually used, in the order their breadth-first sequences were started.
    pub roots: Vec<String>,
}

impl LayoutResult {
    pub fn position(&self, id: &str) -> Option<Point> {
        self.positions.get(id).copied()
    }

    pub fn depth(&self, id: &str) -> Option<usize> {
        self.depths.get(id).copied()
    }
}
