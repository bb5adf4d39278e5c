//! Plain-text rendering of the tracker's derived views.

use roster_core::{Material, MaterialsVector};
use roster_runtime::Tracker;
use std::fmt::Write;

/// Non-zero fields in schema order, or `-` for an all-zero vector.
pub fn mats(v: &MaterialsVector) -> String {
    let parts: Vec<String> = v
        .iter()
        .filter(|(_, a)| a.value().map(|d| !d.is_zero()).unwrap_or(true))
        .map(|(m, a)| format!("{m} {a}"))
        .collect();
    if parts.is_empty() {
        "-".to_string()
    } else {
        parts.join(", ")
    }
}

pub fn render(tracker: &mut Tracker) -> anyhow::Result<String> {
    let mut out = String::new();
    write_report(&mut out, tracker)?;
    Ok(out)
}

/// Write the report into any formatter sink; sink errors are propagated.
pub fn write_report(out: &mut impl Write, tracker: &mut Tracker) -> anyhow::Result<()> {
    writeln!(out, "Characters ({})", tracker.characters().len())?;
    for (i, c) in tracker.characters().iter().enumerate() {
        let view = tracker.character_view(i)?;
        write!(out, "  [{i}] {}", c.name)?;
        if !c.class.is_empty() {
            write!(out, " ({} {})", c.class, c.level.normalize())?;
        }
        writeln!(out)?;
        writeln!(out, "      bound: {}", mats(&c.bound_mats))?;
        writeln!(out, "      owned: {}", mats(&view.owned))?;
        for (gi, g) in c.goals.iter().enumerate() {
            writeln!(
                out,
                "      {:<12} need {} | left {} | worth {}",
                g.id,
                mats(&g.mats),
                mats(&view.remaining_vs_owned[gi]),
                view.remaining_value[gi],
            )?;
        }
    }

    writeln!(out, "Roster goals ({})", tracker.roster_goals().len())?;
    for i in 0..tracker.roster_goals().len() {
        let name = tracker.roster_goals()[i].id.clone();
        let view = tracker.roster_goal_view(i)?;
        writeln!(
            out,
            "  [{i}] {name}: required {} (worth {}) | remaining {} (worth {})",
            mats(&view.required),
            view.required_value,
            mats(&view.remaining),
            view.remaining_value,
        )?;
    }

    writeln!(out, "Roster storage: {}", mats(&tracker.roster_storage()))?;
    for (i, s) in tracker.storage().sources.iter().enumerate() {
        let state = if s.is_active() { "" } else { " (off)" };
        writeln!(out, "  [{i}] {}{state}: {}", s.id, mats(&s.amt))?;
    }

    let prices: Vec<String> = tracker
        .market_prices()
        .iter()
        .filter(|(m, p)| *m != Material::CURRENCY && !p.is_zero())
        .map(|(m, p)| format!("{m} {}", p.normalize()))
        .collect();
    writeln!(
        out,
        "Prices: {}",
        if prices.is_empty() { "-".to_string() } else { prices.join(", ") }
    )?;
    Ok(())
}
