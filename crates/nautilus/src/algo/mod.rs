pub mod breadthfirst;

use crate::error::{Error, Result};
use crate::graph::Node;
use std::cmp::Ordering;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub enum Algorithm {
    /// Concentric breadth-first rings (Cytoscape `breadthfirst` with `circle: true`).
    Breadthfirst(BreadthfirstOptions),
}

/// Orders nodes that share a ring.
///
/// Without a comparator, a ring keeps the graph's node order.
#[derive(Clone)]
pub struct DepthSort(Arc<dyn Fn(&Node, &Node) -> Ordering + Send + Sync>);

impl DepthSort {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Node, &Node) -> Ordering + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Lexicographic by node id.
    pub fn by_id() -> Self {
        Self::new(|a, b| a.id.cmp(&b.id))
    }

    pub fn compare(&self, a: &Node, b: &Node) -> Ordering {
        (self.0)(a, b)
    }
}

impl std::fmt::Debug for DepthSort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("DepthSort(..)")
    }
}

/// Axis-aligned region the layout is fitted into, anchored at its top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub x1: f64,
    pub y1: f64,
    pub w: f64,
    pub h: f64,
}

impl BoundingBox {
    pub fn new(x1: f64, y1: f64, w: f64, h: f64) -> Self {
        Self { x1, y1, w, h }
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x1 + self.w / 2.0, self.y1 + self.h / 2.0)
    }
}

#[derive(Debug, Clone)]
pub struct BreadthfirstOptions {
    /// Follow edges only from `source` to `target` when computing depths.
    pub directed: bool,
    /// Scale and center the result into `bounding_box` (no-op without one).
    pub fit: bool,
    /// Margin kept free on every side of `bounding_box` when fitting.
    pub padding: f64,
    /// Ring spacing as a multiple of the mean node size.
    pub spacing_factor: f64,
    /// Grow crowded rings until the nodes on them no longer overlap.
    pub avoid_overlap: bool,
    /// Explicit root ids. When `None`, roots are chosen per connected component.
    pub roots: Option<Vec<String>>,
    pub depth_sort: Option<DepthSort>,
    pub bounding_box: Option<BoundingBox>,
}

impl Default for BreadthfirstOptions {
    fn default() -> Self {
        Self {
            directed: false,
            fit: true,
            padding: 30.0,
            spacing_factor: 1.75,
            avoid_overlap: true,
            roots: None,
            depth_sort: None,
            bounding_box: None,
        }
    }
}

impl BreadthfirstOptions {
    pub fn validate(&self) -> Result<()> {
        if !(self.spacing_factor.is_finite() && self.spacing_factor > 0.0) {
            return Err(Error::InvalidOption {
                option: "spacing_factor",
                message: format!("expected a positive number, got {}", self.spacing_factor),
            });
        }
        if !(self.padding.is_finite() && self.padding >= 0.0) {
            return Err(Error::InvalidOption {
                option: "padding",
                message: format!("expected a non-negative number, got {}", self.padding),
            });
        }
        if let Some(bb) = self.bounding_box {
            let coords_ok = bb.x1.is_finite() && bb.y1.is_finite();
            let size_ok = bb.w.is_finite() && bb.w > 0.0 && bb.h.is_finite() && bb.h > 0.0;
            if !coords_ok || !size_ok {
                return Err(Error::InvalidOption {
                    option: "bounding_box",
                    message: format!(
                        "expected finite coordinates and a positive size, got {bb:?}"
                    ),
                });
            }
        }
        Ok(())
    }
}
