use super::*;
use roster_core::{Amount, Material, MaterialsVector, TrackerConfig, ValidationError, MAX_QUANTITY};
use roster_econ::{EconError, PriceSource, Source, Split};
use rust_decimal::Decimal;
use std::cell::RefCell;
use std::rc::Rc;

fn d(v: i64) -> Decimal {
    Decimal::new(v, 0)
}

fn record(t: &mut Tracker) -> Rc<RefCell<Vec<ViewEvent>>> {
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = events.clone();
    t.on_change(move |e| sink.borrow_mut().push(*e));
    events
}

/// Two characters with one goal each, both included in roster goal 0.
fn two_character_roster() -> Tracker {
    let mut t = Tracker::default();
    let a = t.add_named_character("Aeris").unwrap();
    let b = t.add_named_character("Brelshaza").unwrap();
    t.add_goal(a).unwrap();
    t.add_goal(b).unwrap();
    t.set_goal_field(a, 0, Material::Shards, "100").unwrap();
    t.set_goal_field(b, 0, Material::Shards, "50").unwrap();
    t.set_bound_material(a, Material::Shards, "40").unwrap();
    t.set_bound_material(b, Material::Shards, "60").unwrap();
    let rg = t.add_roster_goal("Weekly").unwrap();
    t.set_roster_goal_inclusion(rg, a, 0, true).unwrap();
    t.set_roster_goal_inclusion(rg, b, 0, true).unwrap();
    t
}

#[test]
fn total_follows_goal_edits() {
    let mut t = Tracker::default();
    let c = t.add_named_character("Sorc").unwrap();
    let g0 = t.add_goal(c).unwrap();
    let g1 = t.add_goal(c).unwrap();
    t.set_goal_field(c, g0, Material::Leapstones, "30").unwrap();
    t.set_goal_field(c, g1, Material::Leapstones, "12").unwrap();
    let ch = t.character(c).unwrap();
    assert_eq!(ch.total().mats.leapstones, Amount::new(d(42)));
    assert_eq!(t.character_view(c).unwrap().total, ch.total().mats);

    t.remove_goal(c).unwrap();
    assert_eq!(
        t.character(c).unwrap().total().mats.leapstones,
        Amount::new(d(30))
    );
}

#[test]
fn total_goal_cannot_be_edited() {
    let mut t = Tracker::default();
    let c = t.add_named_character("Sorc").unwrap();
    assert_eq!(
        t.set_goal_field(c, 0, Material::Gold, "10"),
        Err(TrackerError::TotalNotEditable)
    );
    assert_eq!(
        t.set_goal_field(c, 3, Material::Gold, "10"),
        Err(TrackerError::GoalNotFound {
            character: c,
            goal: 3
        })
    );
}

#[test]
fn invalid_number_changes_nothing() {
    let mut t = two_character_roster();
    t.refresh_roster_goals();
    let before = t.graph();
    let events = record(&mut t);
    let err = t.set_goal_field(0, 0, Material::Shards, "lots").unwrap_err();
    assert_eq!(
        err,
        TrackerError::Validation(ValidationError::InvalidNumber("lots".into()))
    );
    assert_eq!(t.graph(), before);
    assert!(events.borrow().is_empty());
    assert!(t.stale_roster_goals().is_empty());
}

#[test]
fn roster_goal_remaining_floors_each_character() {
    let mut t = two_character_roster();
    let view = t.roster_goal_view(0).unwrap().clone();
    assert_eq!(view.required.shards, Amount::new(d(150)));
    assert_eq!(view.remaining.shards, Amount::new(d(60)));
}

#[test]
fn roster_goals_are_recomputed_lazily() {
    let mut t = two_character_roster();
    t.refresh_roster_goals();
    assert_eq!(t.view_status(ViewId::RosterGoal(0)), Some(ViewStatus::Fresh));

    t.set_goal_field(0, 0, Material::Shards, "200").unwrap();
    assert_eq!(t.view_status(ViewId::RosterGoal(0)), Some(ViewStatus::Stale));
    assert!(t.fresh_roster_goal_view(0).is_none());
    // character views are already current
    assert_eq!(
        t.character_view(0).unwrap().total.shards,
        Amount::new(d(200))
    );

    assert_eq!(t.refresh_roster_goals(), 1);
    let view = t.fresh_roster_goal_view(0).unwrap();
    assert_eq!(view.required.shards, Amount::new(d(250)));
    assert_eq!(view.remaining.shards, Amount::new(d(160)));
    assert_eq!(t.refresh_roster_goals(), 0);
}

#[test]
fn only_roster_goals_including_the_cell_go_stale() {
    let mut t = two_character_roster();
    let other = t.add_roster_goal("Only B").unwrap();
    t.set_roster_goal_inclusion(other, 1, 0, true).unwrap();
    t.refresh_roster_goals();

    t.set_goal_field(0, 0, Material::Shards, "120").unwrap();
    assert_eq!(t.stale_roster_goals(), vec![0]);
    t.set_bound_material(1, Material::Shards, "10").unwrap();
    assert_eq!(t.stale_roster_goals(), vec![0, other]);
}

#[test]
fn setting_inclusion_to_current_value_invalidates_nothing() {
    let mut t = two_character_roster();
    t.refresh_roster_goals();
    let events = record(&mut t);
    t.set_roster_goal_inclusion(0, 0, 0, true).unwrap();
    assert!(events.borrow().is_empty());
    t.set_roster_goal_inclusion(0, 0, 0, false).unwrap();
    assert_eq!(
        *events.borrow(),
        vec![ViewEvent {
            view: ViewId::RosterGoal(0),
            status: ViewStatus::Stale
        }]
    );
}

#[test]
fn renames_recompute_nothing() {
    let mut t = two_character_roster();
    t.refresh_roster_goals();
    let views: Vec<_> = (0..2).map(|i| t.character_view(i).unwrap().clone()).collect();
    let rg = t.roster_goal_view(0).unwrap().clone();
    let events = record(&mut t);

    t.rename_goal(0, 0, "Hone to 1620").unwrap();
    t.rename_character(1, "Brel").unwrap();
    t.rename_roster_goal(0, "Raid week").unwrap();
    t.set_character_info(0, "1620.5", "Bard", "#ff00aa").unwrap();

    assert!(events.borrow().is_empty());
    assert!(t.stale_roster_goals().is_empty());
    for (i, v) in views.iter().enumerate() {
        assert_eq!(t.character_view(i).unwrap(), v);
    }
    assert_eq!(t.fresh_roster_goal_view(0).unwrap(), &rg);
    assert_eq!(t.characters()[0].goals[0].id, "Hone to 1620");
}

#[test]
fn duplicate_and_empty_names_are_refused() {
    let mut t = two_character_roster();
    assert_eq!(
        t.add_named_character("Aeris"),
        Err(TrackerError::Validation(ValidationError::DuplicateName(
            "Aeris".into()
        )))
    );
    assert!(t.add_named_character("aeris").is_ok());
    assert_eq!(
        t.rename_goal(0, 0, "Total"),
        Err(TrackerError::Validation(ValidationError::DuplicateName(
            "Total".into()
        )))
    );
    assert_eq!(
        t.add_roster_goal(" "),
        Err(TrackerError::Validation(ValidationError::EmptyName))
    );
    // renaming to its own current name is fine
    t.rename_character(0, "Aeris").unwrap();
}

#[test]
fn limits_are_enforced_without_partial_changes() {
    let mut t = Tracker::new(TrackerConfig {
        max_characters: 1,
        max_goals_per_character: 1,
        max_roster_goals: 1,
    });
    let c = t.add_character().unwrap();
    assert_eq!(t.add_character(), Err(TrackerError::RosterLimit(1)));
    t.add_goal(c).unwrap();
    let rg = t.add_roster_goal("R").unwrap();
    assert_eq!(t.add_goal(c), Err(TrackerError::GoalLimit(1)));
    assert_eq!(t.add_roster_goal("S"), Err(TrackerError::RosterGoalLimit(1)));
    assert_eq!(t.roster_goals()[rg].goals, vec![vec![false]]);
    assert_eq!(t.characters().len(), 1);
}

#[test]
fn default_names_are_unique() {
    let mut t = Tracker::default();
    let c = t.add_character().unwrap();
    assert_eq!(t.characters()[c].name, "Character 1");
    t.add_goal(c).unwrap();
    t.add_goal(c).unwrap();
    t.rename_goal(c, 0, "Goal 7").unwrap();
    let g = t.add_goal(c).unwrap();
    assert_eq!(t.characters()[c].goals[g].id, "Goal 1");
}

#[test]
fn adding_a_goal_opens_a_slot_in_every_roster_goal() {
    let mut t = two_character_roster();
    t.add_roster_goal("Second").unwrap();
    t.refresh_roster_goals();
    let g = t.add_goal(0).unwrap();
    for rg in t.roster_goals() {
        assert_eq!(rg.goals[0].len(), 2);
        assert!(!rg.goals[0][g]);
    }
    assert!(t.roster_goals()[0].goals[0][0]);
    // a new unselected goal changes no roster goal value
    assert!(t.stale_roster_goals().is_empty());
    t.check_shape().unwrap();
}

#[test]
fn removing_a_goal_keeps_remaining_selections_aligned() {
    let mut t = Tracker::default();
    let c = t.add_named_character("A").unwrap();
    for v in ["1", "10", "100"] {
        let g = t.add_goal(c).unwrap();
        t.set_goal_field(c, g, Material::Fusion, v).unwrap();
    }
    let rg = t.add_roster_goal("R").unwrap();
    t.set_roster_goal_inclusion(rg, c, 2, true).unwrap();
    assert_eq!(
        t.roster_goal_view(rg).unwrap().required.fusion,
        Amount::new(d(100))
    );

    t.remove_goal_at(c, 0).unwrap();
    assert_eq!(t.roster_goals()[rg].goals[c], vec![false, true]);
    assert_eq!(
        t.roster_goal_view(rg).unwrap().required.fusion,
        Amount::new(d(100))
    );

    t.remove_goal_at(c, 1).unwrap();
    assert_eq!(t.view_status(ViewId::RosterGoal(rg)), Some(ViewStatus::Stale));
    assert_eq!(
        t.roster_goal_view(rg).unwrap().required.fusion,
        Amount::ZERO
    );
}

#[test]
fn remove_goal_without_goals_is_refused() {
    let mut t = Tracker::default();
    let c = t.add_named_character("A").unwrap();
    assert_eq!(t.remove_goal(c), Err(TrackerError::NoGoalToRemove(c)));
}

#[test]
fn moving_goals_and_characters_permutes_selections() {
    let mut t = two_character_roster();
    let g = t.add_goal(0).unwrap();
    t.set_goal_field(0, g, Material::Shards, "7").unwrap();
    t.refresh_roster_goals();
    let before = t.roster_goal_view(0).unwrap().clone();

    t.move_goal(0, 1, 0).unwrap();
    assert_eq!(t.roster_goals()[0].goals[0], vec![false, true]);
    t.move_character(1, 0).unwrap();
    assert_eq!(t.characters()[0].name, "Brelshaza");
    assert_eq!(t.roster_goals()[0].goals, vec![vec![true], vec![false, true]]);
    assert!(t.stale_roster_goals().is_empty());
    assert_eq!(t.roster_goal_view(0).unwrap(), &before);
    assert_eq!(
        t.character_view(1).unwrap().total.shards,
        Amount::new(d(107))
    );
}

#[test]
fn removing_a_character_drops_its_row() {
    let mut t = two_character_roster();
    t.refresh_roster_goals();
    t.remove_character(0).unwrap();
    assert_eq!(t.roster_goals()[0].goals, vec![vec![true]]);
    assert_eq!(t.stale_roster_goals(), vec![0]);
    let view = t.roster_goal_view(0).unwrap();
    assert_eq!(view.required.shards, Amount::new(d(50)));
    assert_eq!(view.remaining.shards, Amount::ZERO);
    assert_eq!(t.character_view(0).unwrap().total.shards, Amount::new(d(50)));
    assert!(t.character_view(1).is_err());
}

#[test]
fn new_characters_get_rows_in_existing_roster_goals() {
    let mut t = two_character_roster();
    let c = t.add_named_character("Cassie").unwrap();
    assert_eq!(t.roster_goals()[0].goals.len(), 3);
    assert!(t.roster_goals()[0].goals[c].is_empty());
    t.add_goal(c).unwrap();
    t.set_roster_goal_row(0, c, true).unwrap();
    assert_eq!(t.roster_goals()[0].goals[c], vec![true]);
    t.check_shape().unwrap();
}

#[test]
fn character_scenario_with_roster_storage() {
    let mut t = Tracker::default();
    let c = t.add_named_character("Gunlancer").unwrap();
    let g = t.add_goal(c).unwrap();
    t.set_goal_field(c, g, Material::Gold, "150").unwrap();
    t.set_goal_field(c, g, Material::Shards, "500").unwrap();
    t.set_bound_material(c, Material::Gold, "100").unwrap();
    let s = t
        .add_source(Source::new("Shard pouches").with_quantity(Material::Shards, d(200)))
        .unwrap();

    let view = t.character_view(c).unwrap();
    let vs_bound = &view.remaining_vs_bound.as_ref().unwrap()[g];
    assert_eq!(vs_bound.gold, Amount::new(d(50)));
    assert_eq!(vs_bound.shards, Amount::new(d(500)));
    assert_eq!(view.remaining_vs_owned[g].gold, Amount::new(d(50)));
    assert_eq!(view.remaining_vs_owned[g].shards, Amount::new(d(300)));

    t.set_source_selected(s, false).unwrap();
    assert_eq!(
        t.character_view(c).unwrap().remaining_vs_owned[g].shards,
        Amount::new(d(500))
    );
    t.set_source_selected(s, true).unwrap();
    assert_eq!(
        t.character_view(c).unwrap().remaining_vs_owned[g].shards,
        Amount::new(d(300))
    );
}

#[test]
fn pool_changes_refresh_characters_and_invalidate_roster_goals() {
    let mut t = two_character_roster();
    t.add_roster_goal("Empty").unwrap();
    t.refresh_roster_goals();
    let s = t.add_source(Source::new("Chest")).unwrap();
    // an empty source moves nothing
    assert!(t.stale_roster_goals().is_empty());

    t.set_source_quantity(s, Material::Shards, "25").unwrap();
    assert_eq!(t.stale_roster_goals(), vec![0]);
    assert_eq!(t.roster_storage().shards, Amount::new(d(25)));
    assert_eq!(
        t.roster_goal_view(0).unwrap().remaining.shards,
        Amount::new(d(35))
    );
    assert_eq!(
        t.character_view(0).unwrap().owned.shards,
        Amount::new(d(65))
    );
}

#[test]
fn selection_sources_split_between_two_materials() {
    let mut t = Tracker::default();
    let split = Split::new(Material::Destruction, Material::Guardian, d(10)).unwrap();
    let s = t
        .add_source(Source::new("Selection chest").with_split(split))
        .unwrap();
    t.set_source_split_use(s, Material::Guardian, "3").unwrap();
    assert_eq!(t.roster_storage().destruction, Amount::new(d(7)));
    assert_eq!(t.roster_storage().guardian, Amount::new(d(3)));
    t.set_source_split_raw(s, "5").unwrap();
    assert_eq!(t.roster_storage().destruction, Amount::new(d(5)));
    assert_eq!(t.roster_storage().guardian, Amount::ZERO);
    assert_eq!(
        t.set_source_split_use(s, Material::Fusion, "1"),
        Err(TrackerError::Econ(EconError::NotSplitMaterial(Material::Fusion)))
    );
}

#[test]
fn market_prices_drive_valuations() {
    let mut t = two_character_roster();
    t.refresh_roster_goals();
    t.set_market_price(Material::Shards, "0.5").unwrap();
    assert_eq!(t.market_prices().get(Material::Shards), Decimal::new(5, 1));
    assert_eq!(t.character_view(0).unwrap().remaining_value[0], d(30));
    assert_eq!(t.stale_roster_goals(), vec![0]);
    let view = t.roster_goal_view(0).unwrap();
    assert_eq!(view.required_value, d(75));
    assert_eq!(view.remaining_value, d(30));

    let cheap = t
        .add_price_source(Material::Shards, PriceSource::new("Bulk", d(40), d(100)))
        .unwrap();
    assert_eq!(t.market_prices().get(Material::Shards), Decimal::new(4, 1));
    t.set_price_source_selected(Material::Shards, cheap, false)
        .unwrap();
    assert_eq!(t.market_prices().get(Material::Shards), Decimal::new(5, 1));
    assert_eq!(
        t.set_market_price(Material::Gold, "1"),
        Err(TrackerError::CurrencyNotPriced(Material::Gold))
    );
}

#[test]
fn unchanged_prices_invalidate_nothing() {
    let mut t = two_character_roster();
    t.refresh_roster_goals();
    t.set_market_price(Material::Fusion, "0").unwrap();
    assert!(t.stale_roster_goals().is_empty());
}

#[test]
fn not_applicable_is_only_for_currency() {
    let mut t = Tracker::default();
    let c = t.add_named_character("Alt").unwrap();
    t.set_bound_not_applicable(c, Material::Gold).unwrap();
    assert!(t.characters()[c].bound_mats.gold.is_not_applicable());
    assert!(t.character_view(c).unwrap().owned.gold.is_not_applicable());
    assert_eq!(
        t.set_bound_not_applicable(c, Material::Shards),
        Err(TrackerError::Validation(
            ValidationError::NotApplicableNotAllowed(Material::Shards)
        ))
    );
}

#[test]
fn observers_see_local_views_cycle_synchronously() {
    let mut t = Tracker::default();
    let c = t.add_named_character("A").unwrap();
    t.add_goal(c).unwrap();
    let invalidated = Rc::new(RefCell::new(0));
    let sink = invalidated.clone();
    t.on_invalidate(ViewId::Character(c), move |_| *sink.borrow_mut() += 1);
    let events = record(&mut t);

    t.set_goal_field(c, 0, Material::Grace, "4").unwrap();
    assert_eq!(*invalidated.borrow(), 1);
    let statuses: Vec<_> = events.borrow().iter().map(|e| e.status).collect();
    assert_eq!(
        statuses,
        vec![ViewStatus::Stale, ViewStatus::Recomputing, ViewStatus::Fresh]
    );
    assert_eq!(t.view_status(ViewId::Character(c)), Some(ViewStatus::Fresh));
}

#[test]
fn reading_a_fresh_view_twice_is_idempotent() {
    let mut t = two_character_roster();
    let first = t.roster_goal_view(0).unwrap().clone();
    let second = t.roster_goal_view(0).unwrap().clone();
    assert_eq!(first, second);
    let c1 = t.character_view(0).unwrap().clone();
    t.refresh_character(0);
    assert_eq!(t.character_view(0).unwrap(), &c1);
}

#[test]
fn from_graph_rejects_misshaped_roster_goals() {
    let mut graph = two_character_roster().graph();
    graph.roster_goals[0].goals[1].push(true);
    assert_eq!(
        Tracker::from_graph(graph, TrackerConfig::default()).unwrap_err(),
        TrackerError::Validation(ValidationError::ShapeMismatch {
            roster_goal: "Weekly".into()
        })
    );
}

#[test]
fn from_graph_recomputes_derived_fields() {
    let mut graph = two_character_roster().graph();
    let t0 = graph.characters[0].total_index();
    graph.characters[0].goals[t0].mats = MaterialsVector::zero().with(Material::Shards, d(1));
    graph.storage.total.amt = MaterialsVector::zero().with(Material::Shards, d(999));
    let mut t = Tracker::from_graph(graph, TrackerConfig::default()).unwrap();
    assert_eq!(
        t.character(0).unwrap().total().mats.shards,
        Amount::new(d(100))
    );
    assert_eq!(t.roster_storage(), MaterialsVector::zero());
    assert_eq!(
        t.roster_goal_view(0).unwrap().remaining.shards,
        Amount::new(d(60))
    );
}

#[test]
fn oversized_goal_input_is_refused_before_any_write() {
    let mut t = Tracker::default();
    let c = t.add_named_character("Sorc").unwrap();
    let g0 = t.add_goal(c).unwrap();
    let g1 = t.add_goal(c).unwrap();
    t.set_goal_field(c, g0, Material::Shards, "1000000000000").unwrap();
    let before = t.graph();
    assert_eq!(
        t.set_goal_field(c, g1, Material::Shards, "79228162514264337593543950335"),
        Err(TrackerError::Validation(ValidationError::QuantityTooLarge(MAX_QUANTITY)))
    );
    assert_eq!(t.graph(), before);
    // the cap itself is accepted and sums stay exact
    t.set_goal_field(c, g1, Material::Shards, "1000000000000").unwrap();
    assert_eq!(
        t.character(c).unwrap().total().mats.shards,
        Amount::new(MAX_QUANTITY * d(2))
    );
}

#[test]
fn valuation_at_the_caps_does_not_overflow() {
    let mut t = Tracker::default();
    let c = t.add_named_character("Sorc").unwrap();
    let g = t.add_goal(c).unwrap();
    t.set_goal_field(c, g, Material::Shards, "1000000000000").unwrap();
    assert!(t.set_market_price(Material::Shards, "100000000000000000000").is_err());
    t.set_market_price(Material::Shards, "1000000000000").unwrap();
    assert_eq!(
        t.character_view(c).unwrap().remaining_value[g],
        MAX_QUANTITY * MAX_QUANTITY
    );
}

#[test]
fn from_graph_rejects_negative_split_allocations() {
    let mut graph = EntityGraph::default();
    graph.storage.sources.push(Source::new("Selection chest").with_split(Split {
        raw: d(10),
        materials: [Material::Destruction, Material::Guardian],
        used: [d(-5), d(15)],
    }));
    assert_eq!(
        Tracker::from_graph(graph, TrackerConfig::default()).unwrap_err(),
        TrackerError::Econ(EconError::Validation(ValidationError::NegativeQuantity))
    );
}

#[test]
fn from_graph_rejects_oversized_loaded_quantities() {
    let mut graph = two_character_roster().graph();
    graph.characters[1].bound_mats.shards = Amount::new(Decimal::MAX);
    assert_eq!(
        Tracker::from_graph(graph, TrackerConfig::default()).unwrap_err(),
        TrackerError::Validation(ValidationError::QuantityTooLarge(MAX_QUANTITY))
    );
}

#[test]
fn from_graph_enforces_configured_limits() {
    let graph = two_character_roster().graph();
    let config = |characters, goals, roster_goals| TrackerConfig {
        max_characters: characters,
        max_goals_per_character: goals,
        max_roster_goals: roster_goals,
    };
    assert_eq!(
        Tracker::from_graph(graph.clone(), config(1, 20, 20)).unwrap_err(),
        TrackerError::RosterLimit(1)
    );
    assert_eq!(
        Tracker::from_graph(graph.clone(), config(24, 0, 20)).unwrap_err(),
        TrackerError::GoalLimit(0)
    );
    assert_eq!(
        Tracker::from_graph(graph.clone(), config(24, 20, 0)).unwrap_err(),
        TrackerError::RosterGoalLimit(0)
    );
    assert!(Tracker::from_graph(graph, config(2, 1, 1)).is_ok());
}
