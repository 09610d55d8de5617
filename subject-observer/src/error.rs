use strum::Display;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    Subject,
    Observer,
}

/// Ordinary, recoverable outcomes of a refused attach or detach.
///
/// None of these leave the relationship in a changed state.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkError {
    #[error("Invalid reference: the {0} is unbound or being torn down")]
    InvalidReference(Role),
    #[error("Duplicate attach: the observer is already attached to this subject")]
    DuplicateAttach,
    #[error("Stale detach: the observer is not attached to this subject")]
    StaleDetach,
    #[error("Re-entrant change: the observer is still running its own lifecycle hook")]
    Reentrant,
}

pub type LinkResult = Result<(), LinkError>;
