//! Scenario loading and configuration.
//!
//! A scenario fixes the opening state, the engine tuning and a scripted
//! sequence of skill ids for the player. Running it is fully deterministic.

use std::path::{Path, PathBuf};

use duel_core::config::{BattleSetup, EngineConfig};
use duel_core::error::DuelError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for scenario operations.
#[derive(Error, Debug)]
pub enum ScenarioError {
    /// File not found.
    #[error("Scenario file not found: {0}")]
    FileNotFound(String),
    /// Failed to read file.
    #[error("Failed to read scenario file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse RON.
    #[error("Failed to parse scenario: {0}")]
    ParseError(#[from] ron::error::SpannedError),
    /// The skill catalog could not be loaded.
    #[error("Failed to load skill catalog: {0}")]
    Catalog(#[from] DuelError),
    /// The script names a skill the catalog does not have.
    #[error("Scenario '{scenario}' references unknown skill '{skill}'")]
    UnknownSkill {
        /// Scenario name.
        scenario: String,
        /// Offending skill id.
        skill: String,
    },
}

fn default_max_actions() -> u32 {
    100
}

/// A complete scenario configuration.
///
/// # Example RON
///
/// ```ron
/// Scenario(
///     name: "Guard and strike",
///     description: "Alternate guard and slash at mid range",
///     setup: (distance: 4),
///     script: ["guard", "slash"],
///     loop_script: true,
///     max_actions: 40,
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario name.
    pub name: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// Opening state.
    #[serde(default)]
    pub setup: BattleSetup,
    /// Engine tuning.
    #[serde(default)]
    pub engine: EngineConfig,
    /// Skill ids the player uses, in order.
    pub script: Vec<String>,
    /// Restart the script when it runs out.
    #[serde(default)]
    pub loop_script: bool,
    /// Upper bound on attempted actions.
    #[serde(default = "default_max_actions")]
    pub max_actions: u32,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            name: "Standard Duel".to_string(),
            description: "Both sides at full strength, mid range".to_string(),
            setup: BattleSetup::default(),
            engine: EngineConfig::default(),
            script: vec!["slash".to_string()],
            loop_script: true,
            max_actions: default_max_actions(),
        }
    }
}

impl Scenario {
    /// Load a scenario from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ScenarioError::FileNotFound(path.display().to_string()));
        }
        let contents = std::fs::read_to_string(path)?;
        let scenario: Scenario = ron::from_str(&contents)?;
        Ok(scenario)
    }

    /// Load from a RON string (useful for embedded scenarios).
    pub fn from_ron_str(ron: &str) -> Result<Self, ScenarioError> {
        let scenario: Scenario = ron::from_str(ron)?;
        Ok(scenario)
    }

    /// Skill id for the `index`-th attempted action, if the script has one.
    #[must_use]
    pub fn skill_at(&self, index: usize) -> Option<&str> {
        if self.script.is_empty() {
            return None;
        }
        let slot = if self.loop_script {
            index % self.script.len()
        } else {
            index
        };
        self.script.get(slot).map(String::as_str)
    }
}

/// Locate the default skill catalog.
///
/// Looks in standard locations:
/// 1. Environment variable `DUEL_SKILL_CATALOG`
/// 2. `./assets/data/skills.ron` (repo root)
/// 3. `../../assets/data/skills.ron` (running from a crate directory)
pub fn default_catalog_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("DUEL_SKILL_CATALOG") {
        let path = PathBuf::from(path);
        if path.exists() {
            return Some(path);
        }
    }

    ["assets/data/skills.ron", "../../assets/data/skills.ron"]
        .iter()
        .map(PathBuf::from)
        .find(|path| path.exists())
}

#[cfg(test)]
mod tests {
    use super::*;
    use duel_core::morale::MoraleLevel;

    #[test]
    fn test_parse_minimal_scenario() {
        let scenario = Scenario::from_ron_str(r#"(name: "Quick", script: ["slash"])"#).unwrap();
        assert_eq!(scenario.name, "Quick");
        assert_eq!(scenario.max_actions, 100);
        assert!(!scenario.loop_script);
        assert_eq!(scenario.setup, BattleSetup::default());
    }

    #[test]
    fn test_parse_full_scenario() {
        let ron = r#"
Scenario(
    name: "Far start",
    description: "Opponent must close in",
    setup: (distance: 9, morale: Focused, enemy: (max_hp: 40, max_stamina: 10)),
    engine: (enemy_fixed_attack_damage: 8),
    script: ["focus", "slash"],
    loop_script: true,
    max_actions: 12,
)
"#;
        let scenario = Scenario::from_ron_str(ron).unwrap();
        assert_eq!(scenario.setup.distance, 9);
        assert_eq!(scenario.setup.morale, MoraleLevel::Focused);
        assert_eq!(scenario.engine.enemy_fixed_attack_damage, 8);
        assert_eq!(scenario.engine.base_attack_damage, 6);
        assert_eq!(scenario.max_actions, 12);

        let state = scenario.setup.build();
        assert_eq!(state.enemy().hp(), 40);
    }

    #[test]
    fn test_script_cycling() {
        let mut scenario = Scenario {
            script: vec!["a".to_string(), "b".to_string()],
            loop_script: false,
            ..Default::default()
        };
        assert_eq!(scenario.skill_at(1), Some("b"));
        assert_eq!(scenario.skill_at(2), None);

        scenario.loop_script = true;
        assert_eq!(scenario.skill_at(2), Some("a"));
    }

    #[test]
    fn test_missing_file() {
        let err = Scenario::load("/nonexistent/duel.ron").unwrap_err();
        assert!(matches!(err, ScenarioError::FileNotFound(_)));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("duel.ron");
        std::fs::write(&path, r#"(name: "File", script: ["guard"])"#).unwrap();
        let scenario = Scenario::load(&path).unwrap();
        assert_eq!(scenario.script, vec!["guard".to_string()]);
    }
}
