use roster_core::{Character, RosterGoal};
use roster_econ::{MarketData, StorageTable};
use serde::{Deserialize, Serialize};

/// Everything the tracker persists. Derived numbers are recomputed on load.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityGraph {
    #[serde(default)]
    pub characters: Vec<Character>,
    #[serde(default)]
    pub roster_goals: Vec<RosterGoal>,
    #[serde(default)]
    pub storage: StorageTable,
    #[serde(default)]
    pub market: MarketData,
}
