//! Unmigrated view of data files.
//!
//! [`SkillCatalog`](duel_core::data::SkillCatalog) migrates records and
//! [`EngineConfig::load`](duel_core::config::EngineConfig::load) sanitizes
//! values as they load. The tools sometimes need the data exactly as
//! authored.

use std::path::Path;

use duel_core::error::DuelError;
use duel_core::skill::SkillDefinition;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::ToolResult;

#[derive(Deserialize)]
#[serde(rename = "SkillCatalog")]
struct RawCatalog {
    skills: Vec<SkillDefinition>,
}

/// Parse a RON file as-is.
pub fn read_ron<T: DeserializeOwned>(path: &Path) -> ToolResult<T> {
    let contents = std::fs::read_to_string(path).map_err(|e| DuelError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    let value = ron::from_str(&contents).map_err(|e| DuelError::DataParseError {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    Ok(value)
}

/// Read skill records from a catalog file without migrating them.
pub fn read_skills(path: &Path) -> ToolResult<Vec<SkillDefinition>> {
    read_ron::<RawCatalog>(path).map(|raw| raw.skills)
}
