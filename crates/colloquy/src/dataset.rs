use colloquy_core::{Diagnostic, ReplyEdge, SpeakerNode};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// Keys written by [`PositionedSpeaker`] itself; speaker metadata under these names is dropped.
const COMPUTED_KEYS: [&str; 7] = ["id", "label", "x", "y", "depth", "point", "radius"];

/// A speaker node with its layout position attached.
///
/// Serializes flat: `{ "id", ...meta, "label", "x", "y", "depth", "point", "radius" }`. The
/// computed fields win over metadata keys of the same name.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionedSpeaker {
    pub speaker: SpeakerNode,
    pub label: String,
    pub x: f64,
    pub y: f64,
    pub depth: usize,
    /// Point key for point-based renderers; always the speaker id.
    pub point: String,
    pub radius: f64,
}

impl Serialize for PositionedSpeaker {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("id", &self.speaker.id)?;
        for (key, value) in &self.speaker.meta {
            if !COMPUTED_KEYS.contains(&key.as_str()) {
                map.serialize_entry(key, value)?;
            }
        }
        map.serialize_entry("label", &self.label)?;
        map.serialize_entry("x", &self.x)?;
        map.serialize_entry("y", &self.y)?;
        map.serialize_entry("depth", &self.depth)?;
        map.serialize_entry("point", &self.point)?;
        map.serialize_entry("radius", &self.radius)?;
        map.end()
    }
}

impl PositionedSpeaker {
    pub fn id(&self) -> &str {
        &self.speaker.id
    }
}

/// Output of one pipeline run, consumed by renderers.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Dataset {
    pub nodes: Vec<PositionedSpeaker>,
    pub edges: Vec<ReplyEdge>,
    #[serde(skip)]
    pub diagnostics: Vec<Diagnostic>,
}

impl Dataset {
    pub fn node(&self, id: &str) -> Option<&PositionedSpeaker> {
        self.nodes.iter().find(|n| n.id() == id)
    }
}
