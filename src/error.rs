// Error types for the decision engine and its protocol layer

use thiserror::Error;

use crate::types::{Move, PlayerId, Position};

/// Contract violations on paths. These indicate a caller bug and abort the turn.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("cannot extend path from {from} with {mv}: {to} is not passable")]
    InvalidExtension { from: Position, mv: Move, to: Position },

    #[error("position index {index} exceeds path length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("{position} does not occur on the path in the requested order")]
    EndpointNotFound { position: Position },
}

/// Problems turning raw field text into a snapshot
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SnapshotError {
    #[error("invalid field dimensions {width}x{height}")]
    InvalidDimensions { width: i32, height: i32 },

    #[error("field has {actual} cells, expected {expected}")]
    FieldSize { expected: usize, actual: usize },

    #[error("player {0} does not appear on the field")]
    MissingPlayer(PlayerId),
}

/// Failures while computing a move
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error(transparent)]
    Path(#[from] PathError),

    #[error("player {0} is not part of the snapshot")]
    UnknownPlayer(PlayerId),
}

/// Failures while reading engine input
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("malformed line: {0}")]
    MalformedLine(String),

    #[error("setting '{0}' has not been received")]
    MissingSetting(&'static str),

    #[error("update '{key}' for '{target}' has not been received")]
    MissingUpdate { target: String, key: String },

    #[error("invalid value '{value}' for '{key}'")]
    InvalidValue { key: String, value: String },

    #[error("cannot derive a player id from name '{0}'")]
    InvalidPlayerName(String),

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
