use thiserror::Error;

/// Errors raised by [`DojoAssistant`](crate::DojoAssistant) operations.
///
/// Every failure is synchronous and all-or-nothing: a failed call leaves the
/// controller exactly as it was. Callers branch on the variant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DojoError {
    /// The operation is not permitted in the current dojo/round state.
    #[error("invalid state: {0}")]
    InvalidState(&'static str),

    /// A participant name was empty or all-whitespace.
    #[error("participant name must not be blank")]
    InvalidArgument,

    /// Starting a round needs at least two participants on the roster.
    #[error("at least 2 participants are required to start a round")]
    InvalidParticipantCount,

    /// The participant name is already on the roster (exact match).
    #[error("participant {0:?} is already on the roster")]
    DuplicateName(String),

    /// The participant to remove is not on the roster.
    #[error("participant {0:?} is not on the roster")]
    NameNotFound(String),
}
