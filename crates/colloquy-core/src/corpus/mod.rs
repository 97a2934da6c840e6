//! Corpus inputs: the speaker registry, the conversation index and the utterance stream.

mod loader;
mod registry;
mod utterance;

pub use loader::{CorpusLoader, FilterSet, UtteranceSet};
pub use registry::{ConversationIndex, SpeakerRecord, SpeakerRegistry};
pub use utterance::{Utterance, UtteranceMeta, parse_utterance_line, parse_utterance_stream};
