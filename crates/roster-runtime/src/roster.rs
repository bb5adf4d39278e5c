//! Edits to characters, their goals, and roster goals.

use crate::aggregate::{CharacterView, RosterGoalView};
use crate::error::{rejected, TrackerError};
use crate::tracker::Tracker;
use crate::view::{Cached, ViewId, ViewStatus};
use roster_core::{
    next_free_name, parse_quantity, validate_name, Amount, Character, Goal, Material,
    MaterialsVector, RosterGoal, ValidationError,
};
use tracing::debug;

impl Tracker {
    /// Set one field of a character's goal from user-entered text.
    pub fn set_goal_field(
        &mut self,
        character: usize,
        goal: usize,
        material: Material,
        value: &str,
    ) -> Result<(), TrackerError> {
        self.check_real_goal(character, goal)?;
        let value = parse_quantity(value).map_err(|e| rejected("set_goal_field", e))?;
        self.characters[character].goals[goal]
            .mats
            .set(material, value);
        self.after_goal_change(character, goal);
        debug!(character, goal, %material, %value, "goal field set");
        Ok(())
    }

    /// Replace a goal's whole requirement, e.g. from a preset.
    pub fn set_goal_mats(
        &mut self,
        character: usize,
        goal: usize,
        mats: MaterialsVector,
    ) -> Result<(), TrackerError> {
        self.check_real_goal(character, goal)?;
        mats.validate().map_err(|e| rejected("set_goal_mats", e))?;
        self.characters[character].goals[goal].mats = mats;
        self.after_goal_change(character, goal);
        debug!(character, goal, "goal replaced");
        Ok(())
    }

    fn after_goal_change(&mut self, character: usize, goal: usize) {
        self.refresh_character(character);
        self.invalidate_roster_goals_where(|rg| rg.is_included(character, goal));
    }

    /// Rename a goal. No derived number depends on names.
    pub fn rename_goal(
        &mut self,
        character: usize,
        goal: usize,
        name: &str,
    ) -> Result<(), TrackerError> {
        self.check_real_goal(character, goal)?;
        validate_name(name, &self.characters[character].goals, Some(goal))
            .map_err(|e| rejected("rename_goal", e))?;
        self.characters[character].goals[goal].id = name.to_string();
        Ok(())
    }

    /// Append a goal with a default name. Returns its index.
    pub fn add_goal(&mut self, character: usize) -> Result<usize, TrackerError> {
        self.check_character(character)?;
        let name = next_free_name("Goal", &self.characters[character].goals);
        self.add_named_goal(character, &name)
    }

    /// Append a goal before the Total. Returns its index.
    pub fn add_named_goal(&mut self, character: usize, name: &str) -> Result<usize, TrackerError> {
        let c = self.character(character)?;
        if c.real_goal_count() >= self.config.max_goals_per_character {
            return Err(rejected(
                "add_goal",
                TrackerError::GoalLimit(self.config.max_goals_per_character),
            ));
        }
        validate_name(name, &c.goals, None).map_err(|e| rejected("add_goal", e))?;

        let pos = c.total_index();
        for rg in &mut self.roster_goals {
            rg.insert_goal_slot(character, pos);
        }
        self.characters[character]
            .goals
            .insert(pos, Goal::new(name));
        self.debug_assert_shape();
        self.refresh_character(character);
        debug!(character, goal = pos, name, "goal added");
        Ok(pos)
    }

    /// Remove the character's last real goal.
    pub fn remove_goal(&mut self, character: usize) -> Result<Goal, TrackerError> {
        let count = self.character(character)?.real_goal_count();
        if count == 0 {
            return Err(TrackerError::NoGoalToRemove(character));
        }
        self.remove_goal_at(character, count - 1)
    }

    pub fn remove_goal_at(&mut self, character: usize, goal: usize) -> Result<Goal, TrackerError> {
        self.check_real_goal(character, goal)?;
        let affected: Vec<usize> = self
            .roster_goals
            .iter_mut()
            .enumerate()
            .filter_map(|(i, rg)| rg.remove_goal_slot(character, goal).then_some(i))
            .collect();
        let removed = self.characters[character].goals.remove(goal);
        self.debug_assert_shape();
        self.refresh_character(character);
        for i in affected {
            self.invalidate_roster_goal(i);
        }
        debug!(character, goal, name = %removed.id, "goal removed");
        Ok(removed)
    }

    /// Reorder a character's goals. Sums are order-independent, so roster
    /// goals only follow the permutation.
    pub fn move_goal(&mut self, character: usize, from: usize, to: usize) -> Result<(), TrackerError> {
        self.check_real_goal(character, from)?;
        self.check_real_goal(character, to)?;
        if from == to {
            return Ok(());
        }
        let goals = &mut self.characters[character].goals;
        let g = goals.remove(from);
        goals.insert(to, g);
        for rg in &mut self.roster_goals {
            rg.move_goal_slot(character, from, to);
        }
        self.debug_assert_shape();
        self.refresh_character(character);
        Ok(())
    }

    /// Add a character with a default name. Returns its index.
    pub fn add_character(&mut self) -> Result<usize, TrackerError> {
        let name = next_free_name("Character", &self.characters);
        self.add_named_character(&name)
    }

    pub fn add_named_character(&mut self, name: &str) -> Result<usize, TrackerError> {
        if self.characters.len() >= self.config.max_characters {
            return Err(rejected(
                "add_character",
                TrackerError::RosterLimit(self.config.max_characters),
            ));
        }
        validate_name(name, &self.characters, None).map_err(|e| rejected("add_character", e))?;

        let index = self.characters.len();
        let character = Character::new(name);
        for rg in &mut self.roster_goals {
            rg.insert_character_row(index, character.real_goal_count());
        }
        let view = CharacterView::compute(&character, &self.storage.pool(), &self.prices);
        self.characters.push(character);
        self.character_views.push(Cached {
            status: ViewStatus::Stale,
            value: view,
        });
        self.debug_assert_shape();
        self.refresh_character(index);
        debug!(character = index, name, "character added");
        Ok(index)
    }

    pub fn remove_character(&mut self, character: usize) -> Result<Character, TrackerError> {
        self.check_character(character)?;
        let affected: Vec<usize> = self
            .roster_goals
            .iter_mut()
            .enumerate()
            .filter_map(|(i, rg)| rg.remove_character_row(character).then_some(i))
            .collect();
        let removed = self.characters.remove(character);
        self.character_views.remove(character);
        self.debug_assert_shape();
        // later characters shifted into new view ids
        self.refresh_characters(character..self.characters.len());
        for i in affected {
            self.invalidate_roster_goal(i);
        }
        debug!(character, name = %removed.name, "character removed");
        Ok(removed)
    }

    /// Reorder the roster. No roster goal changes value.
    pub fn move_character(&mut self, from: usize, to: usize) -> Result<(), TrackerError> {
        self.check_character(from)?;
        self.check_character(to)?;
        if from == to {
            return Ok(());
        }
        let c = self.characters.remove(from);
        self.characters.insert(to, c);
        let v = self.character_views.remove(from);
        self.character_views.insert(to, v);
        for rg in &mut self.roster_goals {
            rg.move_character_row(from, to);
        }
        self.debug_assert_shape();
        self.refresh_characters(from.min(to)..from.max(to) + 1);
        Ok(())
    }

    pub fn rename_character(&mut self, character: usize, name: &str) -> Result<(), TrackerError> {
        self.check_character(character)?;
        validate_name(name, &self.characters, Some(character))
            .map_err(|e| rejected("rename_character", e))?;
        self.characters[character].name = name.to_string();
        Ok(())
    }

    /// Update display info. Nothing derived depends on it.
    pub fn set_character_info(
        &mut self,
        character: usize,
        level: &str,
        class: &str,
        color: &str,
    ) -> Result<(), TrackerError> {
        self.check_character(character)?;
        let level = parse_quantity(level).map_err(|e| rejected("set_character_info", e))?;
        let c = &mut self.characters[character];
        c.level = level;
        c.class = class.to_string();
        c.color = color.to_string();
        Ok(())
    }

    /// Set one bound material from user-entered text.
    pub fn set_bound_material(
        &mut self,
        character: usize,
        material: Material,
        value: &str,
    ) -> Result<(), TrackerError> {
        self.check_character(character)?;
        let value = parse_quantity(value).map_err(|e| rejected("set_bound_material", e))?;
        self.write_bound(character, material, Amount::new(value));
        debug!(character, %material, %value, "bound material set");
        Ok(())
    }

    /// Mark a bound material as not granted to this character yet.
    pub fn set_bound_not_applicable(
        &mut self,
        character: usize,
        material: Material,
    ) -> Result<(), TrackerError> {
        self.check_character(character)?;
        if !material.allows_not_applicable() {
            return Err(rejected(
                "set_bound_not_applicable",
                ValidationError::NotApplicableNotAllowed(material),
            ));
        }
        self.write_bound(character, material, Amount::NOT_APPLICABLE);
        Ok(())
    }

    fn write_bound(&mut self, character: usize, material: Material, amount: Amount) {
        self.characters[character].bound_mats.set(material, amount);
        self.refresh_character(character);
        self.invalidate_roster_goals_where(|rg| rg.includes_character(character));
    }

    /// Create an empty roster goal shaped after the current roster.
    pub fn add_roster_goal(&mut self, name: &str) -> Result<usize, TrackerError> {
        if self.roster_goals.len() >= self.config.max_roster_goals {
            return Err(rejected(
                "add_roster_goal",
                TrackerError::RosterGoalLimit(self.config.max_roster_goals),
            ));
        }
        validate_name(name, &self.roster_goals, None).map_err(|e| rejected("add_roster_goal", e))?;
        let rg = RosterGoal::new(name, &self.characters);
        let index = self.roster_goals.len();
        self.roster_goals.push(rg);
        // nothing selected yet: the view is the zero view
        self.roster_views.push(Cached::fresh(RosterGoalView::default()));
        self.observers.emit(ViewId::RosterGoal(index), ViewStatus::Fresh);
        debug!(roster_goal = index, name, "roster goal added");
        Ok(index)
    }

    pub fn remove_roster_goal(&mut self, index: usize) -> Result<RosterGoal, TrackerError> {
        self.check_roster_goal(index)?;
        let removed = self.roster_goals.remove(index);
        self.roster_views.remove(index);
        for i in index..self.roster_goals.len() {
            self.invalidate_roster_goal(i);
        }
        debug!(roster_goal = index, name = %removed.id, "roster goal removed");
        Ok(removed)
    }

    pub fn rename_roster_goal(&mut self, index: usize, name: &str) -> Result<(), TrackerError> {
        self.check_roster_goal(index)?;
        validate_name(name, &self.roster_goals, Some(index))
            .map_err(|e| rejected("rename_roster_goal", e))?;
        self.roster_goals[index].id = name.to_string();
        Ok(())
    }

    /// Include or exclude one character goal. Re-setting the current value is a no-op.
    pub fn set_roster_goal_inclusion(
        &mut self,
        index: usize,
        character: usize,
        goal: usize,
        included: bool,
    ) -> Result<(), TrackerError> {
        self.check_roster_goal(index)?;
        self.check_real_goal(character, goal)?;
        let cell = &mut self.roster_goals[index].goals[character][goal];
        if *cell == included {
            return Ok(());
        }
        *cell = included;
        self.invalidate_roster_goal(index);
        debug!(roster_goal = index, character, goal, included, "inclusion set");
        Ok(())
    }

    /// Include or exclude every goal of one character.
    pub fn set_roster_goal_row(
        &mut self,
        index: usize,
        character: usize,
        included: bool,
    ) -> Result<(), TrackerError> {
        self.check_roster_goal(index)?;
        self.check_character(character)?;
        let row = &mut self.roster_goals[index].goals[character];
        let changed = row.iter().any(|&b| b != included);
        row.iter_mut().for_each(|b| *b = included);
        if changed {
            self.invalidate_roster_goal(index);
        }
        Ok(())
    }
}
