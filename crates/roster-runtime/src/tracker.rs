//! The tracker: entity graph, cached derived views, and propagation helpers.
//!
//! Character views, the storage pool and market prices are recomputed inside
//! the edit that invalidates them. Roster goal views fold over the whole
//! roster, so edits only mark them stale; they are recomputed on
//! [`Tracker::refresh_roster_goals`] or when a stale one is read.

use crate::aggregate::{CharacterView, RosterGoalView};
use crate::error::TrackerError;
use crate::graph::EntityGraph;
use crate::view::{Cached, Observers, SubscriptionId, ViewEvent, ViewId, ViewStatus};
use roster_core::{
    validate_name, Character, MarketPrices, MaterialsVector, RosterGoal, TrackerConfig,
    ValidationError,
};
use roster_econ::{MarketData, StorageTable};
use tracing::debug;

/// Owns the roster and keeps every derived view consistent with it.
#[derive(Debug)]
pub struct Tracker {
    pub(crate) config: TrackerConfig,
    pub(crate) characters: Vec<Character>,
    pub(crate) roster_goals: Vec<RosterGoal>,
    pub(crate) storage: StorageTable,
    pub(crate) market: MarketData,
    pub(crate) prices: MarketPrices,
    pub(crate) character_views: Vec<Cached<CharacterView>>,
    pub(crate) roster_views: Vec<Cached<RosterGoalView>>,
    pub(crate) observers: Observers,
}

impl Tracker {
    /// An empty roster.
    pub fn new(config: TrackerConfig) -> Self {
        Self::build(EntityGraph::default(), config)
    }

    /// Adopt a loaded graph after checking limits, names, vectors and matrix shapes.
    pub fn from_graph(mut graph: EntityGraph, config: TrackerConfig) -> Result<Self, TrackerError> {
        for c in &mut graph.characters {
            c.ensure_total();
        }
        if graph.characters.len() > config.max_characters {
            return Err(TrackerError::RosterLimit(config.max_characters));
        }
        if graph
            .characters
            .iter()
            .any(|c| c.real_goal_count() > config.max_goals_per_character)
        {
            return Err(TrackerError::GoalLimit(config.max_goals_per_character));
        }
        if graph.roster_goals.len() > config.max_roster_goals {
            return Err(TrackerError::RosterGoalLimit(config.max_roster_goals));
        }
        for (i, c) in graph.characters.iter().enumerate() {
            validate_name(&c.name, &graph.characters, Some(i))?;
            c.bound_mats.validate()?;
            for (gi, g) in c.goals.iter().enumerate() {
                validate_name(&g.id, &c.goals, Some(gi))?;
                g.mats.validate()?;
            }
        }
        for (i, rg) in graph.roster_goals.iter().enumerate() {
            validate_name(&rg.id, &graph.roster_goals, Some(i))?;
            rg.check_shape(&graph.characters)?;
        }
        graph.storage.validate()?;
        graph.market.validate()?;
        Ok(Self::build(graph, config))
    }

    fn build(graph: EntityGraph, config: TrackerConfig) -> Self {
        let EntityGraph {
            mut characters,
            roster_goals,
            mut storage,
            market,
        } = graph;
        storage.recompute();
        let prices = market.prices();
        let pool = storage.pool();
        for c in &mut characters {
            let total = crate::aggregate::character_total(c);
            let t = c.total_index();
            c.goals[t].mats = total;
        }
        let character_views = characters
            .iter()
            .map(|c| Cached::fresh(CharacterView::compute(c, &pool, &prices)))
            .collect();
        let roster_views = roster_goals
            .iter()
            .map(|rg| Cached::fresh(RosterGoalView::compute(rg, &characters, &pool, &prices)))
            .collect();
        debug!(
            characters = characters.len(),
            roster_goals = roster_goals.len(),
            "tracker built"
        );
        Self {
            config,
            characters,
            roster_goals,
            storage,
            market,
            prices,
            character_views,
            roster_views,
            observers: Observers::default(),
        }
    }

    /// A copy of the entity graph for persistence.
    pub fn graph(&self) -> EntityGraph {
        EntityGraph {
            characters: self.characters.clone(),
            roster_goals: self.roster_goals.clone(),
            storage: self.storage.clone(),
            market: self.market.clone(),
        }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn characters(&self) -> &[Character] {
        &self.characters
    }

    pub fn character(&self, index: usize) -> Result<&Character, TrackerError> {
        self.characters
            .get(index)
            .ok_or(TrackerError::CharacterNotFound(index))
    }

    pub fn roster_goals(&self) -> &[RosterGoal] {
        &self.roster_goals
    }

    pub fn storage(&self) -> &StorageTable {
        &self.storage
    }

    pub fn market(&self) -> &MarketData {
        &self.market
    }

    /// The roster storage pool.
    pub fn roster_storage(&self) -> MaterialsVector {
        self.storage.pool()
    }

    pub fn market_prices(&self) -> &MarketPrices {
        &self.prices
    }

    /// Character views are recomputed inside every edit, so they are always fresh.
    pub fn character_view(&self, index: usize) -> Result<&CharacterView, TrackerError> {
        self.character_views
            .get(index)
            .map(|c| &c.value)
            .ok_or(TrackerError::CharacterNotFound(index))
    }

    /// The roster goal's view, recomputing it first when stale.
    pub fn roster_goal_view(&mut self, index: usize) -> Result<&RosterGoalView, TrackerError> {
        if index >= self.roster_views.len() {
            return Err(TrackerError::RosterGoalNotFound(index));
        }
        if !self.roster_views[index].is_fresh() {
            self.recompute_roster_goal(index);
        }
        Ok(&self.roster_views[index].value)
    }

    /// The roster goal's view if it is fresh; never returns stale numbers.
    pub fn fresh_roster_goal_view(&self, index: usize) -> Option<&RosterGoalView> {
        self.roster_views
            .get(index)
            .filter(|c| c.is_fresh())
            .map(|c| &c.value)
    }

    pub fn view_status(&self, view: ViewId) -> Option<ViewStatus> {
        match view {
            ViewId::Character(i) => self.character_views.get(i).map(|c| c.status),
            ViewId::RosterGoal(i) => self.roster_views.get(i).map(|c| c.status),
            ViewId::RosterStorage | ViewId::MarketPrices => Some(ViewStatus::Fresh),
        }
    }

    /// Roster goals currently waiting for a refresh.
    pub fn stale_roster_goals(&self) -> Vec<usize> {
        self.roster_views
            .iter()
            .enumerate()
            .filter(|(_, c)| !c.is_fresh())
            .map(|(i, _)| i)
            .collect()
    }

    /// Signal that roster-wide inputs settled: recompute every stale roster goal.
    ///
    /// Returns how many views were recomputed.
    pub fn refresh_roster_goals(&mut self) -> usize {
        let stale = self.stale_roster_goals();
        for &i in &stale {
            self.recompute_roster_goal(i);
        }
        if !stale.is_empty() {
            debug!(count = stale.len(), "roster goals refreshed");
        }
        stale.len()
    }

    pub fn on_invalidate(
        &mut self,
        view: ViewId,
        callback: impl FnMut(&ViewEvent) + 'static,
    ) -> SubscriptionId {
        self.observers.on_invalidate(view, callback)
    }

    pub fn on_change(&mut self, callback: impl FnMut(&ViewEvent) + 'static) -> SubscriptionId {
        self.observers.on_change(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    /// Every roster goal matrix matches the roster.
    pub fn check_shape(&self) -> Result<(), ValidationError> {
        self.roster_goals
            .iter()
            .try_for_each(|rg| rg.check_shape(&self.characters))
    }

    pub(crate) fn debug_assert_shape(&self) {
        debug_assert!(
            self.check_shape().is_ok(),
            "roster goal matrix out of sync with roster"
        );
    }

    pub(crate) fn check_character(&self, character: usize) -> Result<(), TrackerError> {
        self.character(character).map(|_| ())
    }

    /// `goal` names a real (non-Total) goal of `character`.
    pub(crate) fn check_real_goal(&self, character: usize, goal: usize) -> Result<(), TrackerError> {
        let c = self.character(character)?;
        if goal == c.total_index() {
            return Err(TrackerError::TotalNotEditable);
        }
        if goal > c.total_index() {
            return Err(TrackerError::GoalNotFound { character, goal });
        }
        Ok(())
    }

    pub(crate) fn check_roster_goal(&self, index: usize) -> Result<(), TrackerError> {
        if index < self.roster_goals.len() {
            Ok(())
        } else {
            Err(TrackerError::RosterGoalNotFound(index))
        }
    }

    fn set_character_status(&mut self, index: usize, status: ViewStatus) {
        self.character_views[index].status = status;
        self.observers.emit(ViewId::Character(index), status);
    }

    /// Recompute the Total goal and the view of one character, synchronously.
    pub(crate) fn refresh_character(&mut self, index: usize) {
        self.set_character_status(index, ViewStatus::Stale);
        self.set_character_status(index, ViewStatus::Recomputing);
        let total = crate::aggregate::character_total(&self.characters[index]);
        let character = &mut self.characters[index];
        let t = character.total_index();
        character.goals[t].mats = total;
        self.character_views[index].value =
            CharacterView::compute(&self.characters[index], &self.storage.pool(), &self.prices);
        self.set_character_status(index, ViewStatus::Fresh);
    }

    pub(crate) fn refresh_characters(&mut self, range: std::ops::Range<usize>) {
        for i in range {
            self.refresh_character(i);
        }
    }

    /// Mark a roster goal stale; already-stale views are not re-announced.
    pub(crate) fn invalidate_roster_goal(&mut self, index: usize) {
        if self.roster_views[index].status == ViewStatus::Stale {
            return;
        }
        self.roster_views[index].status = ViewStatus::Stale;
        self.observers.emit(ViewId::RosterGoal(index), ViewStatus::Stale);
    }

    pub(crate) fn invalidate_roster_goals_where(&mut self, pred: impl Fn(&RosterGoal) -> bool) {
        let hit: Vec<usize> = self
            .roster_goals
            .iter()
            .enumerate()
            .filter(|(_, rg)| pred(rg))
            .map(|(i, _)| i)
            .collect();
        for i in hit {
            self.invalidate_roster_goal(i);
        }
    }

    fn recompute_roster_goal(&mut self, index: usize) {
        self.roster_views[index].status = ViewStatus::Recomputing;
        self.observers
            .emit(ViewId::RosterGoal(index), ViewStatus::Recomputing);
        self.roster_views[index].value = RosterGoalView::compute(
            &self.roster_goals[index],
            &self.characters,
            &self.storage.pool(),
            &self.prices,
        );
        self.roster_views[index].status = ViewStatus::Fresh;
        self.observers.emit(ViewId::RosterGoal(index), ViewStatus::Fresh);
    }
}

impl Default for Tracker {
    fn default() -> Self {
        Self::new(TrackerConfig::default())
    }
}
