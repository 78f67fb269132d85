//! Error kinds raised by contour operations.
//!
//! Every error is recovered at the controller boundary: the operation that
//! produced it leaves the controller state untouched.

use thiserror::Error;

pub type ContourResult<T> = Result<T, ContourError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContourError {
    /// The cutting plane or stroke missed the surface
    #[error("stroke does not cross the surface")]
    NoIntersection,

    /// Resample or plane fit produced an unusable loop
    #[error("degenerate loop: {0}")]
    DegenerateLoop(String),

    #[error("path is locked, cannot adjust segments")]
    PathLocked,

    #[error("paths need at least 3 segments (requested {requested})")]
    TooFewSegments { requested: usize },

    #[error("nothing to commit: no cut paths")]
    EmptyResult,

    #[error("nothing selected")]
    NothingSelected,

    #[error("operation requires {expected} state")]
    InvalidState { expected: &'static str },

    #[error("mesh was already committed")]
    AlreadyCommitted,

    #[error("unknown loop")]
    UnknownLoop,

    #[error("unknown path")]
    UnknownPath,
}

impl ContourError {
    pub(crate) fn degenerate(reason: impl Into<String>) -> Self {
        ContourError::DegenerateLoop(reason.into())
    }
}
