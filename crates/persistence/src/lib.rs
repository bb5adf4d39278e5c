#![deny(warnings)]

//! Persistence layer: JSON save files holding the roster entity graph.
//!
//! Derived data in a save file (source amounts, Total goals) is never trusted;
//! [`roster_runtime::Tracker::from_graph`] recomputes it on load.

use anyhow::{bail, Context};
use chrono::{DateTime, Utc};
use roster_runtime::EntityGraph;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// Save format version written by this build.
pub const SAVE_VERSION: u32 = 1;

/// On-disk envelope around the entity graph.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SaveFile {
    pub version: u32,
    pub saved_at: DateTime<Utc>,
    pub graph: EntityGraph,
}

/// Returns the default save path used for local saves.
pub fn default_save_path() -> PathBuf {
    PathBuf::from("./saves/roster.json")
}

/// Load the entity graph from `path`. A missing file is a first run and
/// yields the default graph.
pub fn load_entity_graph(path: &Path) -> anyhow::Result<EntityGraph> {
    if !path.exists() {
        info!(path = %path.display(), "no save file, starting fresh");
        return Ok(EntityGraph::default());
    }
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading save file {}", path.display()))?;
    let save: SaveFile = serde_json::from_str(&text)
        .with_context(|| format!("parsing save file {}", path.display()))?;
    if save.version != SAVE_VERSION {
        bail!(
            "unsupported save version {} in {} (expected {})",
            save.version,
            path.display(),
            SAVE_VERSION
        );
    }
    info!(
        path = %path.display(),
        saved_at = %save.saved_at,
        characters = save.graph.characters.len(),
        "save loaded"
    );
    Ok(save.graph)
}

/// Write the entity graph to `path`, creating parent directories.
pub fn save_entity_graph(path: &Path, graph: &EntityGraph) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    let save = SaveFile {
        version: SAVE_VERSION,
        saved_at: Utc::now(),
        graph: graph.clone(),
    };
    let text = serde_json::to_string_pretty(&save)?;
    std::fs::write(path, text).with_context(|| format!("writing {}", path.display()))?;
    info!(path = %path.display(), "save written");
    Ok(())
}
