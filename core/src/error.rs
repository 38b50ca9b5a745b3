use thiserror::Error;

use crate::ClueId;

/// Data-integrity errors in puzzle input. The puzzle is unusable and must
/// not be partially rendered.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    #[error("Grid shape does not match declared dimensions")]
    ShapeMismatch,
    #[error("Cell label {0:?} is not a clue number")]
    BadLabel(String),
    #[error("Clue {0} anchors more than one cell")]
    DuplicateAnchor(ClueId),
    #[error("Definition list references clue {0}, which has no anchor cell")]
    MissingAnchor(ClueId),
}

/// Contract violations against the persistence layer. Not expected at
/// runtime given correct callers.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Coordinate out of range")]
    InvalidCoords,
    #[error("Clue {0} is outside the puzzle's clue range")]
    InvalidClue(ClueId),
    #[error("Snapshot does not match puzzle geometry")]
    InvalidSnapshot,
    #[error("Could not serialize persisted state: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Failures of the reversible snapshot codec. Callers must treat any of
/// these as "no snapshot available", never as an empty-but-valid snapshot.
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Invalid base64 token: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("Invalid compressed stream: {0}")]
    Inflate(#[from] std::io::Error),
    #[error("Decompressed bytes are not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}
