//! Distance tables for tuning skill profiles.

use std::fmt::Write as _;
use std::ops::RangeInclusive;

use duel_core::config::{BattleSetup, EngineConfig};
use duel_core::data::SkillCatalog;
use duel_core::engine::TurnEngine;
use duel_core::preview::SkillPreview;
use duel_core::skill::SkillDefinition;

use crate::error::{ToolError, ToolResult};

/// Distances shown when none are requested.
pub const DEFAULT_DISTANCES: RangeInclusive<i32> = 0..=9;

/// Previews of one skill across a distance range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewTable {
    /// Skill id.
    pub skill_id: String,
    /// One preview per distance.
    pub rows: Vec<SkillPreview>,
}

/// Build a table for one skill, taken from a full-strength opening state.
#[must_use]
pub fn skill_table(
    skill: &SkillDefinition,
    config: EngineConfig,
    distances: RangeInclusive<i32>,
) -> PreviewTable {
    let engine = TurnEngine::new(config);
    let rows = distances
        .map(|distance| {
            let state = BattleSetup {
                distance,
                ..BattleSetup::default()
            }
            .build();
            engine.preview(&state, skill)
        })
        .collect();
    PreviewTable {
        skill_id: skill.id.clone(),
        rows,
    }
}

/// Build tables for one skill or for the whole catalog.
///
/// # Errors
///
/// Returns [`ToolError::UnknownSkill`] if `skill_id` is not in the catalog.
pub fn catalog_tables(
    catalog: &SkillCatalog,
    skill_id: Option<&str>,
    config: EngineConfig,
    distances: RangeInclusive<i32>,
) -> ToolResult<Vec<PreviewTable>> {
    match skill_id {
        Some(id) => {
            let skill = catalog
                .get(id)
                .ok_or_else(|| ToolError::UnknownSkill(id.to_string()))?;
            Ok(vec![skill_table(skill, config, distances)])
        }
        None => Ok(catalog
            .iter()
            .map(|skill| skill_table(skill, config, distances.clone()))
            .collect()),
    }
}

/// Render tables as plain text, one tooltip line per distance.
#[must_use]
pub fn render(tables: &[PreviewTable]) -> String {
    let mut out = String::new();
    for table in tables {
        let _ = writeln!(out, "{}", table.skill_id);
        for row in &table.rows {
            let _ = writeln!(out, "  d={:<2}  {}", row.distance, row);
        }
    }
    out
}
