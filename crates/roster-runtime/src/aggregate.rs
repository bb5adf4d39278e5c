//! Pure aggregation over the entity graph.
//!
//! Every function here is a side-effect-free function of its inputs; the
//! tracker decides when to call them.

use roster_core::{Character, Goal, MarketPrices, Material, MaterialsVector, RosterGoal};
use rust_decimal::Decimal;
use serde::Serialize;

/// Sum of a character's real goals.
pub fn character_total(character: &Character) -> MaterialsVector {
    sum_goals(character.real_goals())
}

fn sum_goals(goals: &[Goal]) -> MaterialsVector {
    goals
        .iter()
        .fold(MaterialsVector::zero(), |acc, g| acc.add(&g.mats))
}

/// Bound materials plus the shared pool. The currency stays the bound one.
pub fn owned_total(bound: &MaterialsVector, pool: &MaterialsVector) -> MaterialsVector {
    let mut owned = bound.add(pool);
    owned.set(Material::CURRENCY, bound.get(Material::CURRENCY));
    owned
}

/// `goal - baseline` (floored) for every goal, Total included.
pub fn remaining(goals: &[Goal], baseline: &MaterialsVector) -> Vec<MaterialsVector> {
    goals.iter().map(|g| g.mats.subtract(baseline)).collect()
}

/// Sum of the goals of `character` flagged in `row`.
pub fn included_goals_sum(character: &Character, row: &[bool]) -> MaterialsVector {
    row.iter()
        .zip(character.real_goals())
        .filter(|(included, _)| **included)
        .fold(MaterialsVector::zero(), |acc, (_, g)| acc.add(&g.mats))
}

/// Combined requirement of every included character goal.
pub fn roster_goal_required(roster_goal: &RosterGoal, characters: &[Character]) -> MaterialsVector {
    debug_assert!(roster_goal.matches_shape(characters));
    roster_goal
        .goals
        .iter()
        .zip(characters)
        .fold(MaterialsVector::zero(), |acc, (row, c)| {
            acc.add(&included_goals_sum(c, row))
        })
}

/// What a roster goal still needs.
///
/// Each contributing character's included sum is floored against its own
/// bound materials before summing, so one character's surplus never covers
/// another's deficit. The sum is then floored once against the pool.
pub fn roster_goal_remaining(
    roster_goal: &RosterGoal,
    characters: &[Character],
    pool: &MaterialsVector,
) -> MaterialsVector {
    debug_assert!(roster_goal.matches_shape(characters));
    roster_goal
        .goals
        .iter()
        .zip(characters)
        .filter(|(row, _)| row.iter().any(|&b| b))
        .fold(MaterialsVector::zero(), |acc, (row, c)| {
            acc.add(&included_goals_sum(c, row).subtract(&c.bound_mats))
        })
        .subtract(pool)
}

/// Derived numbers shown for one character.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CharacterView {
    /// Sum of the real goals; mirrors the Total goal.
    pub total: MaterialsVector,
    /// Bound materials plus roster storage.
    pub owned: MaterialsVector,
    /// Per goal (Total last), requirement minus everything owned.
    pub remaining_vs_owned: Vec<MaterialsVector>,
    /// Per goal (Total last), requirement minus bound materials only.
    /// `None` while the character has no real goal.
    pub remaining_vs_bound: Option<Vec<MaterialsVector>>,
    /// Valuation of each `remaining_vs_owned` entry.
    pub remaining_value: Vec<Decimal>,
}

impl CharacterView {
    pub fn compute(character: &Character, pool: &MaterialsVector, prices: &MarketPrices) -> Self {
        let owned = owned_total(&character.bound_mats, pool);
        let remaining_vs_owned = remaining(&character.goals, &owned);
        let remaining_vs_bound = character
            .has_real_goals()
            .then(|| remaining(&character.goals, &character.bound_mats));
        let remaining_value = remaining_vs_owned
            .iter()
            .map(|v| v.valuation(prices))
            .collect();
        Self {
            total: character_total(character),
            owned,
            remaining_vs_owned,
            remaining_vs_bound,
            remaining_value,
        }
    }
}

/// Derived numbers shown for one roster goal.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RosterGoalView {
    pub required: MaterialsVector,
    pub remaining: MaterialsVector,
    pub required_value: Decimal,
    pub remaining_value: Decimal,
}

impl RosterGoalView {
    pub fn compute(
        roster_goal: &RosterGoal,
        characters: &[Character],
        pool: &MaterialsVector,
        prices: &MarketPrices,
    ) -> Self {
        let required = roster_goal_required(roster_goal, characters);
        let remaining = roster_goal_remaining(roster_goal, characters, pool);
        Self {
            required_value: required.valuation(prices),
            remaining_value: remaining.valuation(prices),
            required,
            remaining,
        }
    }
}
