#![deny(warnings)]

//! Aggregation engine and change propagation for the roster goal tracker.
//!
//! [`Tracker`] owns the entity graph and exposes one entry point per edit.
//! Each edit validates its input first, then updates the entities and the
//! derived views that depend on them.

pub mod aggregate;
mod economy;
mod error;
mod graph;
mod roster;
mod tracker;
pub mod view;

pub use aggregate::{CharacterView, RosterGoalView};
pub use error::TrackerError;
pub use graph::EntityGraph;
pub use tracker::Tracker;
pub use view::{SubscriptionId, ViewEvent, ViewId, ViewStatus};

#[cfg(test)]
mod tests;
