#![forbid(unsafe_code)]

//! Dialogue corpus loader + speaker reply graph (headless).
//!
//! Design goals:
//! - deterministic outputs: node and edge order follow the utterance stream, never hash order
//! - malformed input fails loudly, dangling replies degrade gracefully
//! - runtime-agnostic async APIs (no specific executor required)

pub mod corpus;
pub mod error;
pub mod graph;
pub mod label;

pub use corpus::{
    ConversationIndex, CorpusLoader, FilterSet, SpeakerRecord, SpeakerRegistry, Utterance,
    UtteranceMeta, UtteranceSet, parse_utterance_line, parse_utterance_stream,
};
pub use error::{Error, Result};
pub use graph::{
    DanglingReference, Diagnostic, GraphBuilder, ReplyEdge, SpeakerGraph, SpeakerNode,
};
pub use label::display_label;
