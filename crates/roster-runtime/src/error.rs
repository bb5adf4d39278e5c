use roster_core::{Material, ValidationError};
use roster_econ::EconError;
use thiserror::Error;
use tracing::warn;

/// Reasons an edit is refused. A refused edit changes nothing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TrackerError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Econ(#[from] EconError),
    #[error("character not found: {0}")]
    CharacterNotFound(usize),
    #[error("goal {goal} not found on character {character}")]
    GoalNotFound { character: usize, goal: usize },
    #[error("roster goal not found: {0}")]
    RosterGoalNotFound(usize),
    /// The Total goal is derived from the other goals.
    #[error("the Total goal cannot be edited")]
    TotalNotEditable,
    #[error("character {0} has no goal to remove")]
    NoGoalToRemove(usize),
    #[error("goal limit of {0} reached")]
    GoalLimit(usize),
    #[error("roster limit of {0} characters reached")]
    RosterLimit(usize),
    #[error("roster goal limit of {0} reached")]
    RosterGoalLimit(usize),
    #[error("{0} is the currency and has no market price")]
    CurrencyNotPriced(Material),
}

/// Log a refused edit and hand the error back.
pub(crate) fn rejected(op: &'static str, err: impl Into<TrackerError>) -> TrackerError {
    let err = err.into();
    warn!(op, error = %err, "edit rejected");
    err
}
