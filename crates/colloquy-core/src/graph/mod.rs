//! Speaker reply graph: one node per speaker, one edge per resolvable reply.

mod diagnostic;

pub use diagnostic::{DanglingReference, Diagnostic};

use crate::corpus::{SpeakerRegistry, UtteranceSet};
use crate::error::{Error, Result};
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value};

/// A speaker node. Serializes as `{ "id": ..., ...meta }`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpeakerNode {
    pub id: String,
    #[serde(flatten)]
    pub meta: Map<String, Value>,
}

impl SpeakerNode {
    /// A registry key named `id` never shadows the speaker id.
    pub fn new(id: impl Into<String>, meta: &Map<String, Value>) -> Self {
        let mut meta = meta.clone();
        meta.remove("id");
        Self {
            id: id.into(),
            meta,
        }
    }
}

/// A reply relationship from the replying speaker to the speaker being replied to.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyEdge {
    /// Id of the replying utterance.
    pub id: String,
    pub text: String,
    pub speaker: String,
    pub reply_to_speaker: String,
    pub reply_to_text: String,
    pub source: String,
    pub target: String,
}

#[derive(Debug, Clone, Default)]
pub struct SpeakerGraph {
    pub nodes: Vec<SpeakerNode>,
    pub edges: Vec<ReplyEdge>,
    pub diagnostics: Vec<Diagnostic>,
}

impl SpeakerGraph {
    pub fn node(&self, id: &str) -> Option<&SpeakerNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Incident edge count per node (self-replies count once), in node order.
    pub fn degrees(&self) -> IndexMap<&str, usize> {
        let mut out: IndexMap<&str, usize> =
            self.nodes.iter().map(|n| (n.id.as_str(), 0)).collect();
        for e in &self.edges {
            if let Some(d) = out.get_mut(e.source.as_str()) {
                *d += 1;
            }
            if e.target != e.source {
                if let Some(d) = out.get_mut(e.target.as_str()) {
                    *d += 1;
                }
            }
        }
        out
    }

    pub fn dangling_references(&self) -> impl Iterator<Item = &DanglingReference> {
        self.diagnostics.iter().filter_map(|d| match d {
            Diagnostic::DanglingReference(r) => Some(r),
            Diagnostic::SpeakerlessTarget { .. } => None,
        })
    }
}

pub struct GraphBuilder<'a> {
    registry: &'a SpeakerRegistry,
}

impl<'a> GraphBuilder<'a> {
    pub fn new(registry: &'a SpeakerRegistry) -> Self {
        Self { registry }
    }

    /// Derives the speaker graph from already filtered utterances.
    ///
    /// Fails on the first speaker that is not in the registry. Replies whose target cannot be
    /// resolved are skipped and reported through [`SpeakerGraph::diagnostics`].
    pub fn build(&self, utterances: &UtteranceSet) -> Result<SpeakerGraph> {
        let mut nodes: IndexMap<&str, SpeakerNode> = IndexMap::new();
        for u in utterances {
            let Some(speaker) = u.speaker.as_deref() else {
                continue;
            };
            if nodes.contains_key(speaker) {
                continue;
            }
            let record = self
                .registry
                .get(speaker)
                .ok_or_else(|| Error::MissingSpeaker {
                    speaker_id: speaker.to_string(),
                })?;
            nodes.insert(speaker, SpeakerNode::new(speaker, &record.meta));
        }

        let mut edges: Vec<ReplyEdge> = Vec::new();
        let mut diagnostics: Vec<Diagnostic> = Vec::new();
        for u in utterances {
            let (Some(speaker), Some(reply_to)) = (u.speaker.as_deref(), u.reply_to.as_deref())
            else {
                continue;
            };

            let Some(target) = utterances.get(reply_to) else {
                let dangling = DanglingReference {
                    utterance_id: u.id.clone(),
                    reply_to: reply_to.to_string(),
                };
                tracing::warn!(
                    utterance = %u.id,
                    reply_to = %reply_to,
                    "skipping reply edge: target utterance is not in the filtered corpus"
                );
                diagnostics.push(dangling.into());
                continue;
            };

            let Some(target_speaker) = target.speaker.as_deref() else {
                tracing::warn!(
                    utterance = %u.id,
                    reply_to = %reply_to,
                    "skipping reply edge: target utterance has no speaker"
                );
                diagnostics.push(Diagnostic::SpeakerlessTarget {
                    utterance_id: u.id.clone(),
                    reply_to: reply_to.to_string(),
                });
                continue;
            };

            edges.push(ReplyEdge {
                id: u.id.clone(),
                text: u.text.clone(),
                speaker: speaker.to_string(),
                reply_to_speaker: target_speaker.to_string(),
                reply_to_text: target.text.clone(),
                source: speaker.to_string(),
                target: target_speaker.to_string(),
            });
        }

        tracing::debug!(
            nodes = nodes.len(),
            edges = edges.len(),
            skipped = diagnostics.len(),
            "built speaker graph"
        );

        Ok(SpeakerGraph {
            nodes: nodes.into_values().collect(),
            edges,
            diagnostics,
        })
    }
}
