#![forbid(unsafe_code)]

//! `colloquy` turns a dialogue corpus into a laid-out speaker graph.
//!
//! The pipeline runs once per call: load and filter the utterance stream
//! ([`colloquy_core::CorpusLoader`]), derive the speaker reply graph
//! ([`colloquy_core::GraphBuilder`]), then place every speaker on concentric breadth-first
//! rings ([`nautilus`]). The result is a [`Dataset`] ready for a renderer.

pub use colloquy_core::*;

pub mod config;
pub mod dataset;
pub mod pipeline;

pub use config::{BoundingBoxConfig, DepthSortKey, LayoutConfig, PipelineConfig};
pub use dataset::{Dataset, PositionedSpeaker};
pub use pipeline::Pipeline;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Core(#[from] colloquy_core::Error),
    #[error(transparent)]
    Layout(#[from] nautilus::Error),
    #[error("Invalid config: {message}")]
    InvalidConfig { message: String },
    #[error("Layout produced no position for speaker {node_id}")]
    MissingPosition { node_id: String },
}

pub type PipelineResult<T> = std::result::Result<T, PipelineError>;
