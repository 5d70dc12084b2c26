//! Skill catalog: the persisted collection of skill definitions.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{DuelError, Result};
use crate::math::Fixed;
use crate::skill::SkillDefinition;

/// Ordered collection of skills keyed by id.
///
/// Every record is migrated as it is loaded, so skills handed out by the
/// catalog never carry live legacy parameters. Saving writes every field
/// back, legacy fields included.
///
/// # Example RON
///
/// ```ron
/// SkillCatalog(
///     skills: [
///         (id: "slash", display_name: "skill.slash.name", kind: Attack, power: 4),
///         (id: "retreat", display_name: "skill.retreat.name", kind: Mobility, distance_delta: 1),
///     ],
/// )
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSkillCatalog")]
pub struct SkillCatalog {
    skills: Vec<SkillDefinition>,
}

/// Records exactly as authored, before migration and id checks.
#[derive(Deserialize)]
#[serde(rename = "SkillCatalog")]
struct RawSkillCatalog {
    skills: Vec<SkillDefinition>,
}

impl TryFrom<RawSkillCatalog> for SkillCatalog {
    type Error = DuelError;

    fn try_from(raw: RawSkillCatalog) -> Result<Self> {
        Self::from_skills(raw.skills)
    }
}

impl SkillCatalog {
    /// Build a catalog from definitions, migrating each one.
    ///
    /// # Errors
    /// Returns [`DuelError::DuplicateSkillId`] if two records share an id.
    pub fn from_skills(skills: Vec<SkillDefinition>) -> Result<Self> {
        let mut catalog = Self { skills };
        catalog.migrate_all();
        if let Some(id) = catalog.first_duplicate_id() {
            return Err(DuelError::DuplicateSkillId(id.to_string()));
        }
        Ok(catalog)
    }

    /// Parse a catalog from a RON string.
    pub fn from_ron_str(ron: &str) -> Result<Self> {
        Self::parse(ron, "<inline>")
    }

    /// Load a catalog from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| DuelError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let catalog = Self::parse(&contents, &path.display().to_string())?;
        tracing::info!(path = %path.display(), skills = catalog.len(), "Loaded skill catalog");
        Ok(catalog)
    }

    fn parse(ron: &str, origin: &str) -> Result<Self> {
        let raw: RawSkillCatalog = ron::from_str(ron).map_err(|e| DuelError::DataParseError {
            path: origin.to_string(),
            message: e.to_string(),
        })?;
        Self::from_skills(raw.skills)
    }

    /// Serialize the catalog to pretty RON, every field included.
    pub fn to_ron_string(&self) -> Result<String> {
        let config = ron::ser::PrettyConfig::new().struct_names(true);
        ron::ser::to_string_pretty(self, config)
            .map_err(|e| DuelError::SerializeError(e.to_string()))
    }

    /// Write the catalog to a RON file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let contents = self.to_ron_string()?;
        std::fs::write(path, contents).map_err(|e| DuelError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Migrate every record that still needs it. Returns how many changed.
    pub fn migrate_all(&mut self) -> usize {
        self.skills
            .iter_mut()
            .map(SkillDefinition::migrate_in_place)
            .filter(|migrated| *migrated)
            .count()
    }

    /// Find a skill by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&SkillDefinition> {
        self.skills.iter().find(|s| s.id == id)
    }

    /// Whether a skill with this id exists.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// All skills in authored order.
    pub fn iter(&self) -> impl Iterator<Item = &SkillDefinition> {
        self.skills.iter()
    }

    /// All skill ids in authored order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.skills.iter().map(|s| s.id.as_str())
    }

    /// Number of skills.
    #[must_use]
    pub fn len(&self) -> usize {
        self.skills.len()
    }

    /// Whether the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }

    /// Check the catalog for authoring mistakes.
    ///
    /// Checks for:
    /// - Empty or duplicate ids
    /// - Empty display names
    /// - Fractional profile values outside `[0, 1]`
    /// - Records that were never migrated
    ///
    /// Returns a list of validation errors.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        for (index, skill) in self.skills.iter().enumerate() {
            if skill.id.trim().is_empty() {
                errors.push(format!("Skill #{index} has an empty id"));
            }
            if skill.display_name.trim().is_empty() {
                errors.push(format!("Skill '{}' has an empty display name", skill.id));
            }
            if !is_unit(skill.falloff_per_step) {
                errors.push(format!(
                    "Skill '{}' falloff_per_step {} is outside [0, 1]",
                    skill.id, skill.falloff_per_step
                ));
            }
            if !is_unit(skill.min_effect_multiplier) {
                errors.push(format!(
                    "Skill '{}' min_effect_multiplier {} is outside [0, 1]",
                    skill.id, skill.min_effect_multiplier
                ));
            }
            if !skill.migrated {
                errors.push(format!("Skill '{}' has not been migrated", skill.id));
            }
        }

        for (index, skill) in self.skills.iter().enumerate() {
            if self.skills[..index].iter().any(|s| s.id == skill.id) {
                errors.push(format!("Duplicate skill id '{}'", skill.id));
            }
        }

        errors
    }

    fn first_duplicate_id(&self) -> Option<&str> {
        self.skills.iter().enumerate().find_map(|(index, skill)| {
            self.skills[..index]
                .iter()
                .any(|s| s.id == skill.id)
                .then_some(skill.id.as_str())
        })
    }
}

fn is_unit(value: Fixed) -> bool {
    value >= Fixed::ZERO && value <= Fixed::ONE
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::percent;
    use crate::skill::SkillType;

    const CATALOG: &str = r#"
SkillCatalog(
    skills: [
        (id: "slash", display_name: "Slash", kind: Attack, stamina_cost: 2, power: 4, migrated: true),
        (
            id: "old_lunge",
            display_name: "Lunge",
            kind: Attack,
            power: 8,
            legacy_min_distance: 2,
            legacy_max_distance: 4,
            legacy_accuracy_percent: 100,
        ),
        (id: "step_in", display_name: "Step In", kind: Move, distance_delta: -1, consumes_turn: false),
    ],
)
"#;

    #[test]
    fn test_load_migrates_records() {
        let catalog = SkillCatalog::from_ron_str(CATALOG).unwrap();
        assert_eq!(catalog.len(), 3);
        assert!(catalog.iter().all(|s| s.migrated));

        let lunge = catalog.get("old_lunge").unwrap();
        assert_eq!(lunge.ideal_distance, 3);
        assert_eq!(lunge.falloff_per_step, percent(4));
        assert_eq!(lunge.min_effect_multiplier, percent(35));
        // Legacy fields are kept as dead data.
        assert_eq!(lunge.legacy_accuracy_percent, 100);

        let step = catalog.get("step_in").unwrap();
        assert_eq!(step.kind, SkillType::Mobility);
        assert!(!step.consumes_turn);
    }

    #[test]
    fn test_direct_deserialize_migrates() {
        let catalog: SkillCatalog = ron::from_str(CATALOG).unwrap();
        assert!(catalog.iter().all(|s| s.migrated));
        assert_eq!(catalog.get("old_lunge").unwrap().ideal_distance, 3);

        let duplicate = r#"SkillCatalog(skills: [
            (id: "slash", display_name: "Slash", kind: Attack),
            (id: "slash", display_name: "Slash", kind: Attack),
        ])"#;
        let err = ron::from_str::<SkillCatalog>(duplicate).unwrap_err();
        assert!(err.to_string().contains("Duplicate skill id"));
    }

    #[test]
    fn test_saved_catalog_keeps_legacy_fields() {
        let catalog = SkillCatalog::from_ron_str(CATALOG).unwrap();
        let ron = catalog.to_ron_string().unwrap();
        assert!(ron.contains("legacy_min_distance"));
        assert!(ron.contains("legacy_accuracy_percent"));
        assert!(ron.contains("migrated: true"));

        let reloaded = SkillCatalog::from_ron_str(&ron).unwrap();
        let lunge = reloaded.get("old_lunge").unwrap();
        assert_eq!(lunge.ideal_distance, 3);
        assert_eq!(lunge.falloff_per_step, percent(4));
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("skills.ron");
        let catalog = SkillCatalog::from_ron_str(CATALOG).unwrap();
        catalog.save(&path).unwrap();

        let loaded = SkillCatalog::load(&path).unwrap();
        assert_eq!(loaded.ids().collect::<Vec<_>>(), ["slash", "old_lunge", "step_in"]);
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let skills = vec![
            SkillDefinition::new("slash", "Slash", SkillType::Attack),
            SkillDefinition::new("slash", "Slash Again", SkillType::Attack),
        ];
        let err = SkillCatalog::from_skills(skills).unwrap_err();
        assert!(matches!(err, DuelError::DuplicateSkillId(id) if id == "slash"));
    }

    #[test]
    fn test_validate_reports_authoring_mistakes() {
        let mut bad = SkillDefinition::new("", "", SkillType::Guard);
        bad.falloff_per_step = Fixed::from_num(2);
        bad.min_effect_multiplier = Fixed::from_num(-1);
        let catalog = SkillCatalog::from_skills(vec![bad]).unwrap();

        let errors = catalog.validate();
        assert_eq!(errors.len(), 4);
        assert!(errors.iter().any(|e| e.contains("empty id")));
        assert!(errors.iter().any(|e| e.contains("falloff_per_step")));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = SkillCatalog::load("/nonexistent/skills.ron").unwrap_err();
        assert!(matches!(err, DuelError::Io { .. }));
    }

    #[test]
    fn test_malformed_ron_is_parse_error() {
        let err = SkillCatalog::from_ron_str("SkillCatalog(skills: [(id: 3)])").unwrap_err();
        assert!(matches!(err, DuelError::DataParseError { .. }));
    }
}
