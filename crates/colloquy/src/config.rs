use crate::{PipelineError, PipelineResult};
use colloquy_core::FilterSet;
use nautilus::{BoundingBox, BreadthfirstOptions};
use serde::{Deserialize, Serialize};

/// Everything a pipeline run can be configured with. Every field has a default, so an empty
/// config file is valid.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct PipelineConfig {
    /// Conversation (movie) ids to keep.
    pub movies: Vec<String>,
    /// Visual radius attached to every node; also the node size the layout spaces rings by.
    pub node_radius: f64,
    pub layout: LayoutConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            movies: vec!["m13".to_string(), "m12".to_string()],
            node_radius: 0.3,
            layout: LayoutConfig::default(),
        }
    }
}

impl PipelineConfig {
    pub fn from_json_str(text: &str) -> PipelineResult<Self> {
        let config: Self =
            serde_json::from_str(text).map_err(|err| PipelineError::InvalidConfig {
                message: err.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_str(text: &str) -> PipelineResult<Self> {
        let config: Self =
            serde_yaml::from_str(text).map_err(|err| PipelineError::InvalidConfig {
                message: err.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> PipelineResult<()> {
        if !(self.node_radius.is_finite() && self.node_radius >= 0.0) {
            return Err(PipelineError::InvalidConfig {
                message: format!(
                    "nodeRadius must be a non-negative number, got {}",
                    self.node_radius
                ),
            });
        }
        self.layout.to_options().validate()?;
        Ok(())
    }

    pub fn filter_set(&self) -> FilterSet {
        FilterSet::new(self.movies.iter().cloned())
    }
}

/// Serializable mirror of [`nautilus::BreadthfirstOptions`].
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct LayoutConfig {
    pub directed: bool,
    pub fit: bool,
    pub padding: f64,
    pub spacing_factor: f64,
    pub avoid_overlap: bool,
    pub roots: Option<Vec<String>>,
    pub depth_sort: Option<DepthSortKey>,
    pub bounding_box: Option<BoundingBoxConfig>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        let opts = BreadthfirstOptions::default();
        Self {
            directed: opts.directed,
            fit: opts.fit,
            padding: opts.padding,
            spacing_factor: opts.spacing_factor,
            avoid_overlap: opts.avoid_overlap,
            roots: None,
            depth_sort: None,
            bounding_box: None,
        }
    }
}

impl LayoutConfig {
    /// Layout options without a depth comparator; the pipeline attaches one when configured,
    /// since some comparators need the built graph.
    pub fn to_options(&self) -> BreadthfirstOptions {
        BreadthfirstOptions {
            directed: self.directed,
            fit: self.fit,
            padding: self.padding,
            spacing_factor: self.spacing_factor,
            avoid_overlap: self.avoid_overlap,
            roots: self.roots.clone(),
            depth_sort: None,
            bounding_box: self
                .bounding_box
                .map(|bb| BoundingBox::new(bb.x1, bb.y1, bb.w, bb.h)),
        }
    }
}

/// Built-in same-ring orderings available from config files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DepthSortKey {
    /// Order of first appearance in the utterance stream.
    Insertion,
    /// Speaker id, ascending.
    Id,
    /// Most connected speakers first; ties keep insertion order.
    Degree,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BoundingBoxConfig {
    pub x1: f64,
    pub y1: f64,
    pub w: f64,
    pub h: f64,
}
