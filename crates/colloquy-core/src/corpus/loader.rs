use crate::corpus::{Utterance, parse_utterance_line};
use crate::error::{Error, Result};
use futures::io::{AsyncBufRead, AsyncBufReadExt};
use futures::stream::StreamExt;
use indexmap::IndexSet;
use rustc_hash::FxHashMap;

/// Conversation (movie) ids to keep. Membership checks are O(1).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSet {
    ids: IndexSet<String>,
}

impl FilterSet {
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ids: ids.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Whether `utterance` belongs to a selected conversation.
    pub fn admits(&self, utterance: &Utterance) -> bool {
        utterance.movie_id().is_some_and(|id| self.contains(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Filtered utterances in stream order, indexed by id.
///
/// When an id repeats, lookups resolve to the later record.
#[derive(Debug, Clone, Default)]
pub struct UtteranceSet {
    utterances: Vec<Utterance>,
    by_id: FxHashMap<String, usize>,
}

impl UtteranceSet {
    pub fn push(&mut self, utterance: Utterance) {
        self.by_id
            .insert(utterance.id.clone(), self.utterances.len());
        self.utterances.push(utterance);
    }

    pub fn get(&self, id: &str) -> Option<&Utterance> {
        self.by_id.get(id).map(|&idx| &self.utterances[idx])
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Utterance> {
        self.utterances.iter()
    }

    pub fn as_slice(&self) -> &[Utterance] {
        &self.utterances
    }

    pub fn len(&self) -> usize {
        self.utterances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.utterances.is_empty()
    }
}

impl FromIterator<Utterance> for UtteranceSet {
    fn from_iter<T: IntoIterator<Item = Utterance>>(iter: T) -> Self {
        let mut out = Self::default();
        for u in iter {
            out.push(u);
        }
        out
    }
}

impl<'a> IntoIterator for &'a UtteranceSet {
    type Item = &'a Utterance;
    type IntoIter = std::slice::Iter<'a, Utterance>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[derive(Debug, Clone, Default)]
pub struct CorpusLoader {
    filter: FilterSet,
}

impl CorpusLoader {
    pub fn new(filter: FilterSet) -> Self {
        Self { filter }
    }

    pub fn filter(&self) -> &FilterSet {
        &self.filter
    }

    /// Reads the utterance stream from `reader`, keeping the selected conversations.
    ///
    /// This is the pipeline's only suspension point. Callers that need a deadline wrap the
    /// returned future; nothing downstream starts until the stream is exhausted.
    pub async fn load<R>(&self, reader: R) -> Result<UtteranceSet>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut out = UtteranceSet::default();
        let mut lines = reader.lines();
        let mut line = 0usize;
        let mut seen = 0usize;
        while let Some(raw) = lines.next().await {
            line += 1;
            let raw = raw.map_err(|err| match err.kind() {
                // Bytes that are not UTF-8 make the record malformed, not the reader broken.
                std::io::ErrorKind::InvalidData => Error::Parse {
                    line,
                    message: err.to_string(),
                },
                _ => Error::Io(err),
            })?;
            seen += self.accept(line, &raw, &mut out)? as usize;
        }
        tracing::debug!(
            records = seen,
            kept = out.len(),
            filter = self.filter.len(),
            "loaded utterance stream"
        );
        Ok(out)
    }

    /// Synchronous variant of [`CorpusLoader::load`] for streams already in memory.
    pub fn load_sync(&self, text: &str) -> Result<UtteranceSet> {
        let mut out = UtteranceSet::default();
        let mut seen = 0usize;
        for (idx, raw) in text.lines().enumerate() {
            seen += self.accept(idx + 1, raw, &mut out)? as usize;
        }
        tracing::debug!(
            records = seen,
            kept = out.len(),
            filter = self.filter.len(),
            "loaded utterance stream"
        );
        Ok(out)
    }

    /// Returns whether the line held a record (kept or not).
    fn accept(&self, line: usize, raw: &str, out: &mut UtteranceSet) -> Result<bool> {
        let Some(utterance) = parse_utterance_line(line, raw)? else {
            return Ok(false);
        };
        if self.filter.admits(&utterance) {
            out.push(utterance);
        }
        Ok(true)
    }
}
