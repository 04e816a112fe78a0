use thiserror::Error;

pub type AnnotResult<T> = Result<T, AnnotError>;

#[derive(Debug, Error)]
pub enum AnnotError {
    #[error("artifact kind mismatch: expected {expected}, got {actual}")]
    ArtifactKindMismatch {
        expected: &'static str,
        actual: &'static str,
    },

    #[error("unknown artifact: {0}")]
    UnknownArtifact(String),

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}
