#![deny(warnings)]

//! Headless front end: load the roster, apply one edit, print the derived
//! views and save.

mod command;
mod report;

use anyhow::{anyhow, Context, Result};
use command::{Args, Command, USAGE};
use roster_core::{Named, TrackerConfig};
use roster_econ::Source;
use roster_runtime::Tracker;
use std::path::Path;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn load_config(path: Option<&Path>) -> Result<TrackerConfig> {
    let Some(path) = path else {
        return Ok(TrackerConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let config: TrackerConfig = serde_yaml::from_str(&text)
        .with_context(|| format!("parsing config {}", path.display()))?;
    info!(?config, "config loaded");
    Ok(config)
}

/// Find an entity by name, falling back to its index.
fn resolve<T: Named>(what: &str, token: &str, scope: &[T]) -> Result<usize> {
    scope
        .iter()
        .position(|e| e.name() == token)
        .or_else(|| token.parse().ok().filter(|i| *i < scope.len()))
        .ok_or_else(|| anyhow!("no {what} named `{token}`"))
}

fn resolve_goal(tracker: &Tracker, character: usize, token: &str) -> Result<usize> {
    resolve("goal", token, tracker.character(character)?.real_goals())
}

fn apply(tracker: &mut Tracker, command: &Command) -> Result<()> {
    match command {
        Command::Help | Command::Report => {}
        Command::AddCharacter { name } => {
            let i = match name {
                Some(n) => tracker.add_named_character(n)?,
                None => tracker.add_character()?,
            };
            println!("added character {}", tracker.characters()[i].name);
        }
        Command::AddGoal { character, name } => {
            let c = resolve("character", character, tracker.characters())?;
            let g = match name {
                Some(n) => tracker.add_named_goal(c, n)?,
                None => tracker.add_goal(c)?,
            };
            println!("added goal {}", tracker.characters()[c].goals[g].id);
        }
        Command::SetGoal {
            character,
            goal,
            material,
            value,
        } => {
            let c = resolve("character", character, tracker.characters())?;
            let g = resolve_goal(tracker, c, goal)?;
            tracker.set_goal_field(c, g, *material, value)?;
        }
        Command::SetBound {
            character,
            material,
            value,
        } => {
            let c = resolve("character", character, tracker.characters())?;
            if value.eq_ignore_ascii_case("na") {
                tracker.set_bound_not_applicable(c, *material)?;
            } else {
                tracker.set_bound_material(c, *material, value)?;
            }
        }
        Command::AddRosterGoal { name } => {
            let name = match name {
                Some(n) => n.clone(),
                None => roster_core::next_free_name("Roster Goal", tracker.roster_goals()),
            };
            tracker.add_roster_goal(&name)?;
            println!("added roster goal {name}");
        }
        Command::Include {
            roster_goal,
            character,
            goal,
            included,
        } => {
            let r = resolve("roster goal", roster_goal, tracker.roster_goals())?;
            let c = resolve("character", character, tracker.characters())?;
            let g = resolve_goal(tracker, c, goal)?;
            tracker.set_roster_goal_inclusion(r, c, g, *included)?;
        }
        Command::AddSource { name } => {
            tracker.add_source(Source::new(name.as_str()))?;
            println!("added source {name}");
        }
        Command::SetSource {
            source,
            material,
            value,
        } => {
            let s = resolve("source", source, &tracker.storage().sources)?;
            tracker.set_source_quantity(s, *material, value)?;
        }
        Command::Price { material, value } => tracker.set_market_price(*material, value)?,
    }
    Ok(())
}

fn run(args: Args) -> Result<()> {
    if args.version {
        println!(
            "roster {} ({} {})",
            env!("CARGO_PKG_VERSION"),
            env!("GIT_SHA"),
            env!("BUILD_DATE")
        );
        return Ok(());
    }
    if args.command == Command::Help {
        println!("{USAGE}");
        return Ok(());
    }

    let config = load_config(args.config.as_deref())?;
    let graph = persistence::load_entity_graph(&args.data)?;
    let mut tracker = Tracker::from_graph(graph, config)?;
    info!(
        characters = tracker.characters().len(),
        roster_goals = tracker.roster_goals().len(),
        "roster ready"
    );

    apply(&mut tracker, &args.command)?;
    tracker.refresh_roster_goals();
    print!("{}", report::render(&mut tracker)?);

    if args.command.mutates() {
        persistence::save_entity_graph(&args.data, &tracker.graph())?;
    }
    Ok(())
}

fn main() -> Result<()> {
    // Logging setup
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = command::parse_args(std::env::args().skip(1))?;
    info!(data = %args.data.display(), "starting roster CLI");
    run(args)
}
