use crate::corpus::FilterSet;
use crate::error::{Error, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Per-speaker entry of `speakers.json`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct SpeakerRecord {
    #[serde(default)]
    pub meta: Map<String, Value>,
}

/// Speaker id → metadata, in file order.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct SpeakerRegistry {
    speakers: IndexMap<String, SpeakerRecord>,
}

impl SpeakerRegistry {
    pub fn from_json_str(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|err| Error::InvalidRegistry {
            message: err.to_string(),
        })
    }

    pub fn insert(&mut self, id: impl Into<String>, meta: Map<String, Value>) -> &mut Self {
        self.speakers.insert(id.into(), SpeakerRecord { meta });
        self
    }

    pub fn get(&self, id: &str) -> Option<&SpeakerRecord> {
        self.speakers.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.speakers.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.speakers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.speakers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SpeakerRecord)> {
        self.speakers.iter().map(|(id, rec)| (id.as_str(), rec))
    }
}

/// Conversation (movie) id → metadata, in file order.
///
/// The graph pipeline only needs the ids; the metadata is carried for listings.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct ConversationIndex {
    entries: IndexMap<String, Value>,
}

impl ConversationIndex {
    pub fn from_json_str(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|err| Error::InvalidIndex {
            message: err.to_string(),
        })
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(id, meta)| (id.as_str(), meta))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Filter ids the index does not know about, in filter order.
    pub fn unknown_ids<'a>(&self, filter: &'a FilterSet) -> Vec<&'a str> {
        filter.iter().filter(|id| !self.contains(id)).collect()
    }
}
