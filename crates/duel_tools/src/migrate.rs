//! Rewrite a skill catalog with its legacy records migrated.
//!
//! Legacy fields are written back untouched next to the migrated profile,
//! and every record gets `migrated: true` so loading the file again is a
//! no-op.

use std::path::{Path, PathBuf};

use duel_core::data::SkillCatalog;
use tracing::info;

use crate::error::ToolResult;
use crate::raw;

/// Result of a migration run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationSummary {
    /// Records in the catalog.
    pub total: usize,
    /// Ids of records that were not yet migrated.
    pub migrated: Vec<String>,
    /// File written, if any.
    pub written: Option<PathBuf>,
}

/// Migrate the catalog at `input`.
///
/// Writes to `output`, or back to `input` when no output is given. With
/// `dry_run` nothing is written.
///
/// # Errors
///
/// Returns an error if the catalog cannot be read, has duplicate ids, or
/// cannot be written.
pub fn migrate_catalog_file(
    input: &Path,
    output: Option<&Path>,
    dry_run: bool,
) -> ToolResult<MigrationSummary> {
    let skills = raw::read_skills(input)?;
    let migrated: Vec<String> = skills
        .iter()
        .filter(|skill| !skill.migrated)
        .map(|skill| skill.id.clone())
        .collect();
    let catalog = SkillCatalog::from_skills(skills)?;

    let written = if dry_run {
        None
    } else {
        let target = output.unwrap_or(input);
        catalog.save(target)?;
        info!(path = %target.display(), migrated = migrated.len(), "Wrote migrated catalog");
        Some(target.to_path_buf())
    };

    Ok(MigrationSummary {
        total: catalog.len(),
        migrated,
        written,
    })
}
