use crate::error::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize};

/// One line of the newline-delimited utterance stream.
///
/// Only the fields the graph needs are kept; anything else in the record (parses, vectors,
/// timestamps) is ignored.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Utterance {
    pub id: String,
    #[serde(default)]
    pub speaker: Option<String>,
    #[serde(rename = "reply-to", default)]
    pub reply_to: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
    #[serde(default)]
    pub meta: UtteranceMeta,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct UtteranceMeta {
    #[serde(default)]
    pub movie_id: Option<String>,
}

impl Utterance {
    pub fn new(id: impl Into<String>, speaker: Option<&str>, reply_to: Option<&str>) -> Self {
        Self {
            id: id.into(),
            speaker: speaker.map(str::to_string),
            reply_to: reply_to.map(str::to_string),
            text: String::new(),
            conversation_id: None,
            meta: UtteranceMeta::default(),
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_movie(mut self, movie_id: impl Into<String>) -> Self {
        self.meta.movie_id = Some(movie_id.into());
        self
    }

    pub fn movie_id(&self) -> Option<&str> {
        self.meta.movie_id.as_deref()
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Parses one stream line. Blank lines yield `Ok(None)`.
///
/// `line` is the 1-based line number used in the error.
pub fn parse_utterance_line(line: usize, raw: &str) -> Result<Option<Utterance>> {
    if raw.trim().is_empty() {
        return Ok(None);
    }
    serde_json::from_str::<Utterance>(raw)
        .map(Some)
        .map_err(|err| Error::Parse {
            line,
            message: err.to_string(),
        })
}

/// Parses a whole newline-delimited stream without filtering.
///
/// The first malformed line aborts parsing.
pub fn parse_utterance_stream(text: &str) -> Result<Vec<Utterance>> {
    let mut out = Vec::new();
    for (idx, raw) in text.lines().enumerate() {
        if let Some(u) = parse_utterance_line(idx + 1, raw)? {
            out.push(u);
        }
    }
    Ok(out)
}
