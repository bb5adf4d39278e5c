#![deny(warnings)]

//! Core domain models and invariants for the roster goal tracker.
//!
//! This crate defines the fixed-schema materials vector and its algebra, the
//! serializable entities (goals, characters, roster goals) with their
//! factories, and validation helpers guarding naming and input rules.

mod config;
mod entity;
mod error;
mod materials;

pub use config::TrackerConfig;
pub use entity::{
    name_collides, next_free_name, validate_name, Character, Goal, Named, RosterGoal,
    TOTAL_GOAL_ID,
};
pub use error::ValidationError;
pub use materials::{
    check_quantity, parse_quantity, Amount, MarketPrices, Material, MaterialsVector, MAX_QUANTITY,
};
