/// A reply whose target utterance is absent from the filtered corpus, typically because it
/// belongs to an excluded conversation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("utterance {utterance_id} replies to {reply_to}, which is not in the filtered corpus")]
pub struct DanglingReference {
    pub utterance_id: String,
    pub reply_to: String,
}

/// Non-fatal conditions met while building a graph. Each one drops a single edge.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Diagnostic {
    #[error(transparent)]
    DanglingReference(#[from] DanglingReference),

    #[error("utterance {utterance_id} replies to {reply_to}, which has no speaker")]
    SpeakerlessTarget {
        utterance_id: String,
        reply_to: String,
    },
}
