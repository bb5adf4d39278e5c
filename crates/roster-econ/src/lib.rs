#![deny(warnings)]

//! Economic inputs of the tracker: the roster storage pool and market prices.
//!
//! This crate provides:
//! - Storage sources (chests, pouches, selection chests) summed into the pool
//! - Price sources per material reduced to an effective unit price

mod market;
mod source;

pub use market::{MarketData, MarketEntry, PriceSource};
pub use source::{Source, Split, StorageTable, TOTAL_SOURCE_ID};

use roster_core::{Material, ValidationError};
use thiserror::Error;

/// Errors produced by source and price edits.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EconError {
    /// Multipliers must be non-negative and divisors strictly positive.
    #[error("invalid conversion factor")]
    InvalidFactor,
    /// The material is not one of the split source's two materials.
    #[error("{0} is not allocated by this source")]
    NotSplitMaterial(Material),
    /// A split must divide between two different materials.
    #[error("split materials must differ")]
    SplitMaterialsEqual,
    /// A split allocates more than its raw quantity.
    #[error("split allocations exceed the raw quantity")]
    SplitOverAllocated,
    /// The source is a split source; its raw quantity is set through the split.
    #[error("source quantity is allocated through its split")]
    QuantityIsSplit,
    #[error("source not found: {0}")]
    SourceNotFound(usize),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}
