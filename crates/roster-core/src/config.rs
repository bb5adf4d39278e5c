use serde::{Deserialize, Serialize};

/// Capacity limits enforced by the tracker's add operations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Maximum number of characters in the roster.
    pub max_characters: usize,
    /// Maximum number of goals per character, not counting the Total goal.
    pub max_goals_per_character: usize,
    /// Maximum number of roster goals.
    pub max_roster_goals: usize,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            max_characters: 24,
            max_goals_per_character: 20,
            max_roster_goals: 20,
        }
    }
}
