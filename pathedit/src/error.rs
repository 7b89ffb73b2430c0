use crate::id::{NodeId, PathId};
use thiserror::Error;

/// Why an arc has no usable center parameterization.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum ArcError {
    #[error("arc radius cannot be zero")]
    ZeroRadius,
    #[error("arc start point coincides with its end point")]
    CoincidentEndpoints,
}

/// Malformed SVG path data.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum SvgParseError {
    #[error("invalid command {command:?} at offset {offset}")]
    InvalidCommand { command: char, offset: usize },

    #[error("invalid parameters for command {command:?} at offset {offset}: {reason}")]
    InvalidParameters { command: char, offset: usize, reason: String },

    #[error("path data exceeds {what} limit ({limit})")]
    LimitExceeded { what: &'static str, limit: usize },
}

/// A path event whose preconditions do not hold against the current state.
/// Nothing has been mutated when one of these is returned.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ApplyError {
    #[error("{0} does not exist")]
    MissingPath(PathId),

    #[error("{node} does not exist in {path}")]
    MissingNode { path: PathId, node: NodeId },

    #[error("{0} already exists")]
    DuplicatePath(PathId),

    #[error("{node} already exists in {path}")]
    DuplicateNode { path: PathId, node: NodeId },

    #[error("{0} is not an ending node")]
    NotEndingNode(NodeId),

    #[error("cannot merge {0}: {1}")]
    IllegalMerge(PathId, &'static str),

    #[error("{0} would have fewer than two nodes")]
    Degenerate(PathId),
}

/// Failure loading or validating a persisted document.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("malformed document json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported document version {0}")]
    UnsupportedVersion(u32),

    #[error("document exceeds {what} limit ({limit})")]
    LimitExceeded { what: &'static str, limit: usize },

    #[error("invalid svg: {0}")]
    Svg(#[from] SvgParseError),
}
