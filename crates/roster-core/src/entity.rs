//! Entities of the roster graph and their construction rules.

use crate::error::ValidationError;
use crate::materials::MaterialsVector;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Id of the per-character running total goal.
pub const TOTAL_GOAL_ID: &str = "Total";

/// A named target quantity of materials.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goal {
    /// Display name, unique within the owning character.
    pub id: String,
    /// Required quantity.
    pub mats: MaterialsVector,
}

impl Goal {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            mats: MaterialsVector::zero(),
        }
    }

    /// Placeholder for the recomputed running total.
    pub fn total() -> Self {
        Self::new(TOTAL_GOAL_ID)
    }
}

/// A roster character with its goals and bound materials.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    /// Unique across the roster.
    pub name: String,
    /// Item level.
    #[serde(default)]
    pub level: Decimal,
    #[serde(default)]
    pub class: String,
    /// Display color, e.g. "#c0ffee".
    #[serde(default)]
    pub color: String,
    /// Real goals followed by the Total goal.
    pub goals: Vec<Goal>,
    /// Materials usable only by this character.
    pub bound_mats: MaterialsVector,
}

impl Character {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            level: Decimal::ZERO,
            class: String::new(),
            color: String::new(),
            goals: vec![Goal::total()],
            bound_mats: MaterialsVector::zero(),
        }
    }

    /// Goals excluding the trailing Total.
    pub fn real_goals(&self) -> &[Goal] {
        &self.goals[..self.real_goal_count()]
    }

    pub fn real_goal_count(&self) -> usize {
        self.goals.len().saturating_sub(1)
    }

    pub fn has_real_goals(&self) -> bool {
        self.real_goal_count() > 0
    }

    /// Index of the Total goal.
    pub fn total_index(&self) -> usize {
        self.real_goal_count()
    }

    pub fn total(&self) -> &Goal {
        &self.goals[self.total_index()]
    }

    /// Restore the trailing Total goal on data that lost it.
    pub fn ensure_total(&mut self) {
        let has_total = self
            .goals
            .last()
            .map(|g| g.id == TOTAL_GOAL_ID)
            .unwrap_or(false);
        if !has_total {
            warn!(character = %self.name, "missing Total goal restored");
            self.goals.push(Goal::total());
        }
    }
}

/// A roster-wide aggregate over a selection of character goals.
///
/// `goals[c][g]` is true when goal `g` (Total excluded) of character `c` is
/// included. Indices refer to the live roster; the matrix holds no goal data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterGoal {
    /// Unique among roster goals.
    pub id: String,
    pub goals: Vec<Vec<bool>>,
}

impl RosterGoal {
    /// Empty selection shaped after the current roster.
    pub fn new(id: impl Into<String>, characters: &[Character]) -> Self {
        Self {
            id: id.into(),
            goals: characters
                .iter()
                .map(|c| vec![false; c.real_goal_count()])
                .collect(),
        }
    }

    pub fn is_included(&self, character: usize, goal: usize) -> bool {
        self.goals
            .get(character)
            .and_then(|row| row.get(goal))
            .copied()
            .unwrap_or(false)
    }

    /// Whether any goal of `character` is included.
    pub fn includes_character(&self, character: usize) -> bool {
        self.goals
            .get(character)
            .map(|row| row.iter().any(|&b| b))
            .unwrap_or(false)
    }

    pub fn is_empty(&self) -> bool {
        self.goals.iter().all(|row| row.iter().all(|&b| !b))
    }

    pub fn matches_shape(&self, characters: &[Character]) -> bool {
        self.goals.len() == characters.len()
            && self
                .goals
                .iter()
                .zip(characters)
                .all(|(row, c)| row.len() == c.real_goal_count())
    }

    pub fn check_shape(&self, characters: &[Character]) -> Result<(), ValidationError> {
        if self.matches_shape(characters) {
            Ok(())
        } else {
            Err(ValidationError::ShapeMismatch {
                roster_goal: self.id.clone(),
            })
        }
    }

    /// Open an unselected slot for a goal inserted at `goal`.
    pub fn insert_goal_slot(&mut self, character: usize, goal: usize) {
        self.goals[character].insert(goal, false);
    }

    /// Drop the slot of a removed goal. Returns whether it was included.
    pub fn remove_goal_slot(&mut self, character: usize, goal: usize) -> bool {
        self.goals[character].remove(goal)
    }

    pub fn move_goal_slot(&mut self, character: usize, from: usize, to: usize) {
        let row = &mut self.goals[character];
        let flag = row.remove(from);
        row.insert(to, flag);
    }

    /// Open a row for a character inserted at `character` owning `goal_count` real goals.
    pub fn insert_character_row(&mut self, character: usize, goal_count: usize) {
        self.goals.insert(character, vec![false; goal_count]);
    }

    /// Drop a removed character's row. Returns whether anything was included.
    pub fn remove_character_row(&mut self, character: usize) -> bool {
        self.goals.remove(character).into_iter().any(|b| b)
    }

    pub fn move_character_row(&mut self, from: usize, to: usize) {
        let row = self.goals.remove(from);
        self.goals.insert(to, row);
    }
}

/// Entities that carry a display name unique within their scope.
pub trait Named {
    fn name(&self) -> &str;
}

impl Named for Goal {
    fn name(&self) -> &str {
        &self.id
    }
}

impl Named for Character {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for RosterGoal {
    fn name(&self) -> &str {
        &self.id
    }
}

/// Whether `candidate` is already used in `scope`, ignoring index `exempt`.
///
/// Exact, case-sensitive comparison.
pub fn name_collides<T: Named>(candidate: &str, scope: &[T], exempt: Option<usize>) -> bool {
    scope
        .iter()
        .enumerate()
        .any(|(i, e)| Some(i) != exempt && e.name() == candidate)
}

/// Reject empty names and names colliding within `scope`.
pub fn validate_name<T: Named>(
    candidate: &str,
    scope: &[T],
    exempt: Option<usize>,
) -> Result<(), ValidationError> {
    if candidate.trim().is_empty() {
        return Err(ValidationError::EmptyName);
    }
    if name_collides(candidate, scope, exempt) {
        return Err(ValidationError::DuplicateName(candidate.to_string()));
    }
    Ok(())
}

/// First `"{prefix} N"` (N >= 1) not used in `scope`.
pub fn next_free_name<T: Named>(prefix: &str, scope: &[T]) -> String {
    (1..)
        .map(|n| format!("{prefix} {n}"))
        .find(|name| !name_collides(name, scope, None))
        .unwrap_or_else(|| prefix.to_string())
}
