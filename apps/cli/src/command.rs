//! Argument parsing for the headless front end.

use anyhow::{anyhow, bail, Result};
use roster_core::Material;
use std::path::PathBuf;

pub const USAGE: &str = "\
usage: roster [--data <save.json>] [--config <limits.yaml>] [--version] <command>

commands:
  report
  add-character [name]
  add-goal <character> [name]
  set-goal <character> <goal> <material> <value>
  set-bound <character> <material> <value|na>
  add-roster-goal [name]
  include <roster-goal> <character> <goal> [on|off]
  add-source <name>
  set-source <source> <material> <value>
  price <material> <value>

Characters, goals, roster goals and sources are named or given by index.";

#[derive(Debug, PartialEq)]
pub struct Args {
    pub data: PathBuf,
    pub config: Option<PathBuf>,
    pub version: bool,
    pub command: Command,
}

/// One edit (or the read-only report). Entity references stay unresolved
/// until the roster is loaded.
#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Help,
    Report,
    AddCharacter {
        name: Option<String>,
    },
    AddGoal {
        character: String,
        name: Option<String>,
    },
    SetGoal {
        character: String,
        goal: String,
        material: Material,
        value: String,
    },
    SetBound {
        character: String,
        material: Material,
        value: String,
    },
    AddRosterGoal {
        name: Option<String>,
    },
    Include {
        roster_goal: String,
        character: String,
        goal: String,
        included: bool,
    },
    AddSource {
        name: String,
    },
    SetSource {
        source: String,
        material: Material,
        value: String,
    },
    Price {
        material: Material,
        value: String,
    },
}

impl Command {
    /// Whether running the command changes the save file.
    pub fn mutates(&self) -> bool {
        !matches!(self, Command::Help | Command::Report)
    }
}

pub fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Args> {
    let mut data = persistence::default_save_path();
    let mut config = None;
    let mut version = false;
    let mut words = Vec::new();
    let mut it = args.into_iter();
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--data" => data = it.next().ok_or_else(|| anyhow!("--data needs a path"))?.into(),
            "--config" => {
                config = Some(
                    it.next()
                        .ok_or_else(|| anyhow!("--config needs a path"))?
                        .into(),
                )
            }
            "--version" | "-V" => version = true,
            "--help" | "-h" => words = vec!["help".to_string()],
            flag if flag.starts_with("--") => bail!("unknown flag {flag}"),
            _ => words.push(arg),
        }
    }
    let command = parse_command(&words)?;
    Ok(Args {
        data,
        config,
        version,
        command,
    })
}

fn material(word: &str) -> Result<Material> {
    Ok(word.parse::<Material>()?)
}

fn parse_command(words: &[String]) -> Result<Command> {
    let w: Vec<&str> = words.iter().map(String::as_str).collect();
    let command = match w.as_slice() {
        [] | ["report"] => Command::Report,
        ["help"] => Command::Help,
        ["add-character"] => Command::AddCharacter { name: None },
        ["add-character", name] => Command::AddCharacter {
            name: Some(name.to_string()),
        },
        ["add-goal", character] => Command::AddGoal {
            character: character.to_string(),
            name: None,
        },
        ["add-goal", character, name] => Command::AddGoal {
            character: character.to_string(),
            name: Some(name.to_string()),
        },
        ["set-goal", character, goal, m, value] => Command::SetGoal {
            character: character.to_string(),
            goal: goal.to_string(),
            material: material(m)?,
            value: value.to_string(),
        },
        ["set-bound", character, m, value] => Command::SetBound {
            character: character.to_string(),
            material: material(m)?,
            value: value.to_string(),
        },
        ["add-roster-goal"] => Command::AddRosterGoal { name: None },
        ["add-roster-goal", name] => Command::AddRosterGoal {
            name: Some(name.to_string()),
        },
        ["include", rg, character, goal, rest @ ..] if rest.len() <= 1 => Command::Include {
            roster_goal: rg.to_string(),
            character: character.to_string(),
            goal: goal.to_string(),
            included: match rest.first().copied() {
                None | Some("on") => true,
                Some("off") => false,
                Some(other) => bail!("expected on or off, got {other}"),
            },
        },
        ["add-source", name] => Command::AddSource {
            name: name.to_string(),
        },
        ["set-source", source, m, value] => Command::SetSource {
            source: source.to_string(),
            material: material(m)?,
            value: value.to_string(),
        },
        ["price", m, value] => Command::Price {
            material: material(m)?,
            value: value.to_string(),
        },
        _ => bail!("unrecognized command `{}`\n\n{USAGE}", w.join(" ")),
    };
    Ok(command)
}
