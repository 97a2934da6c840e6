pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Utterance parse error (line {line}): {message}")]
    Parse { line: usize, message: String },

    #[error("Utterance references a speaker missing from the registry: {speaker_id}")]
    MissingSpeaker { speaker_id: String },

    #[error("Invalid speaker registry: {message}")]
    InvalidRegistry { message: String },

    #[error("Invalid conversation index: {message}")]
    InvalidIndex { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
