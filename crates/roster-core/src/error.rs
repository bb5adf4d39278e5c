use crate::materials::Material;
use thiserror::Error;

/// Validation errors for user input and entity invariants.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Text entered into a quantity field is not a number.
    #[error("not a number: {0:?}")]
    InvalidNumber(String),
    /// Quantities and prices must be non-negative.
    #[error("negative quantity is invalid")]
    NegativeQuantity,
    /// Above the accepted maximum.
    #[error("quantity exceeds the maximum of {0}")]
    QuantityTooLarge(rust_decimal::Decimal),
    /// Only the designated field may hold the "not applicable" sentinel.
    #[error("{0} cannot be marked not applicable")]
    NotApplicableNotAllowed(Material),
    /// Material name outside the fixed schema.
    #[error("unknown material: {0}")]
    UnknownMaterial(String),
    /// Names must contain at least one non-whitespace character.
    #[error("name must not be empty")]
    EmptyName,
    /// Name already used by another entity in the same scope.
    #[error("name already in use: {0}")]
    DuplicateName(String),
    /// A roster goal matrix does not match the roster it indexes into.
    #[error("roster goal {roster_goal:?} does not match the roster shape")]
    ShapeMismatch { roster_goal: String },
}
