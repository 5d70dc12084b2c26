//! Data validation utilities.

use std::path::Path;

use duel_core::config::EngineConfig;
use duel_core::data::SkillCatalog;
use tracing::{info, warn};

use crate::error::{ToolError, ToolResult};
use crate::raw;

/// Skill catalog file name inside a data directory.
pub const SKILLS_FILE: &str = "skills.ron";
/// Engine tuning file name inside a data directory.
pub const ENGINE_FILE: &str = "engine.ron";

/// What a validation pass found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// Files that were checked.
    pub files_checked: usize,
    /// Skill records still carrying unmigrated legacy data.
    pub legacy_records: Vec<String>,
    /// Hard problems.
    pub problems: Vec<String>,
}

impl ValidationReport {
    /// Whether no problems were found. Legacy records are not problems.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.problems.is_empty()
    }
}

/// Validate all RON data files in a directory.
///
/// # Errors
///
/// Returns an error if a file cannot be read or parsed, or if the directory
/// contains none of the known data files.
pub fn validate_data_directory(path: &Path) -> ToolResult<ValidationReport> {
    let mut report = ValidationReport::default();

    let skills = path.join(SKILLS_FILE);
    if skills.exists() {
        validate_skill_file(&skills, &mut report)?;
    }

    let engine = path.join(ENGINE_FILE);
    if engine.exists() {
        validate_engine_file(&engine, &mut report)?;
    }

    if report.files_checked == 0 {
        return Err(ToolError::NothingToValidate(path.display().to_string()));
    }
    Ok(report)
}

fn validate_skill_file(path: &Path, report: &mut ValidationReport) -> ToolResult<()> {
    report.files_checked += 1;

    for skill in raw::read_skills(path)? {
        if !skill.migrated && skill.has_legacy_data() {
            warn!(skill = %skill.id, "Skill still uses legacy distance data");
            report.legacy_records.push(skill.id);
        }
    }

    match SkillCatalog::load(path) {
        Ok(catalog) => {
            report.problems.extend(catalog.validate());
            info!(path = %path.display(), skills = catalog.len(), "Checked skill catalog");
        }
        Err(e) => report.problems.push(e.to_string()),
    }
    Ok(())
}

fn validate_engine_file(path: &Path, report: &mut ValidationReport) -> ToolResult<()> {
    report.files_checked += 1;

    let authored: EngineConfig = raw::read_ron(path)?;
    if authored != authored.sanitized() {
        report.problems.push(format!(
            "'{}' contains negative values that would be clamped to zero",
            path.display()
        ));
    }
    info!(path = %path.display(), "Checked engine config");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, file: &str, body: &str) {
        std::fs::write(dir.join(file), body).unwrap();
    }

    #[test]
    fn test_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        let err = validate_data_directory(dir.path()).unwrap_err();
        assert!(matches!(err, ToolError::NothingToValidate(_)));
    }

    #[test]
    fn test_legacy_records_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            SKILLS_FILE,
            r#"SkillCatalog(skills: [
                (id: "poke", display_name: "Poke", kind: Attack, legacy_min_distance: 2, legacy_max_distance: 4),
                (id: "guard", display_name: "Guard", kind: Guard, migrated: true),
            ])"#,
        );

        let report = validate_data_directory(dir.path()).unwrap();
        assert!(report.is_ok());
        assert_eq!(report.files_checked, 1);
        assert_eq!(report.legacy_records, vec!["poke".to_string()]);
    }

    #[test]
    fn test_problems_are_collected() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            SKILLS_FILE,
            r#"SkillCatalog(skills: [
                (id: "wild", display_name: "", kind: Attack, falloff_per_step: 1.5, migrated: true),
                (id: "wild", display_name: "Again", kind: Guard, migrated: true),
            ])"#,
        );
        write(dir.path(), ENGINE_FILE, "(base_attack_damage: -2)");

        let report = validate_data_directory(dir.path()).unwrap();
        assert_eq!(report.files_checked, 2);
        // Duplicate ids stop the catalog from loading at all.
        assert_eq!(report.problems.len(), 2);
        assert!(report.problems[0].contains("Duplicate skill id"));
        assert!(report.problems[1].contains("clamped"));
    }

    #[test]
    fn test_parse_errors_propagate() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), ENGINE_FILE, "(base_attack_damage: \"six\")");
        assert!(matches!(
            validate_data_directory(dir.path()),
            Err(ToolError::Data(_))
        ));
    }
}
