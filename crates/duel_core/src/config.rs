//! Engine tuning and battle setup.
//!
//! Both structs are plain data loaded from RON. Every field has a default so
//! a file only needs to name what it overrides. Out-of-range values are
//! corrected rather than rejected.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{DuelError, Result};
use crate::morale::MoraleLevel;
use crate::state::{CombatState, CombatantVitals};

/// Base damage of a basic attack before skill power and buffs.
pub const BASE_ATTACK_DAMAGE: i32 = 6;
/// At or beyond this distance the opponent closes in instead of attacking.
pub const ENEMY_APPROACH_THRESHOLD_DISTANCE: i32 = 6;
/// Raw damage of the opponent's attack.
pub const ENEMY_FIXED_ATTACK_DAMAGE: i32 = 6;
/// Damage reduction banked by a Guard skill.
pub const GUARD_DAMAGE_REDUCTION: i32 = 4;
/// Attack bonus banked by a Focus skill that names no amount.
pub const FOCUS_FALLBACK_BONUS: i32 = 4;
/// Stamina regained after every player action.
pub const STAMINA_REGEN_PER_ACTION: i32 = 1;

/// Tunable constants used by the [`TurnEngine`](crate::engine::TurnEngine).
///
/// # Example RON
///
/// ```ron
/// EngineConfig(
///     base_attack_damage: 6,
///     enemy_approach_threshold: 6,
/// )
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Base damage added to every player attack.
    pub base_attack_damage: i32,
    /// Distance at or beyond which the opponent approaches.
    pub enemy_approach_threshold: i32,
    /// Raw damage of the opponent's attack.
    pub enemy_fixed_attack_damage: i32,
    /// Reduction banked by Guard.
    pub guard_damage_reduction: i32,
    /// Bonus banked by Focus when the skill names none.
    pub focus_fallback_bonus: i32,
    /// Stamina regained per player action.
    pub stamina_regen_per_action: i32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            base_attack_damage: BASE_ATTACK_DAMAGE,
            enemy_approach_threshold: ENEMY_APPROACH_THRESHOLD_DISTANCE,
            enemy_fixed_attack_damage: ENEMY_FIXED_ATTACK_DAMAGE,
            guard_damage_reduction: GUARD_DAMAGE_REDUCTION,
            focus_fallback_bonus: FOCUS_FALLBACK_BONUS,
            stamina_regen_per_action: STAMINA_REGEN_PER_ACTION,
        }
    }
}

impl EngineConfig {
    /// Replace negative values with zero.
    #[must_use]
    pub fn sanitized(self) -> Self {
        Self {
            base_attack_damage: self.base_attack_damage.max(0),
            enemy_approach_threshold: self.enemy_approach_threshold.max(0),
            enemy_fixed_attack_damage: self.enemy_fixed_attack_damage.max(0),
            guard_damage_reduction: self.guard_damage_reduction.max(0),
            focus_fallback_bonus: self.focus_fallback_bonus.max(0),
            stamina_regen_per_action: self.stamina_regen_per_action.max(0),
        }
    }

    /// Parse a config from a RON string.
    pub fn from_ron_str(ron: &str) -> Result<Self> {
        let config: Self = ron::from_str(ron).map_err(|e| DuelError::DataParseError {
            path: "<inline>".to_string(),
            message: e.to_string(),
        })?;
        Ok(config.sanitized())
    }

    /// Load a config from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| DuelError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let config: Self = ron::from_str(&contents).map_err(|e| DuelError::DataParseError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Ok(config.sanitized())
    }
}

/// Starting vitals of one combatant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VitalsSetup {
    /// Starting hp (defaults to `max_hp`).
    #[serde(default)]
    pub hp: Option<i32>,
    /// Maximum hp.
    pub max_hp: i32,
    /// Starting stamina (defaults to `max_stamina`).
    #[serde(default)]
    pub stamina: Option<i32>,
    /// Maximum stamina.
    pub max_stamina: i32,
}

impl VitalsSetup {
    /// Full vitals.
    #[must_use]
    pub const fn full(max_hp: i32, max_stamina: i32) -> Self {
        Self {
            hp: None,
            max_hp,
            stamina: None,
            max_stamina,
        }
    }

    /// Build clamped vitals.
    #[must_use]
    pub fn build(&self) -> CombatantVitals {
        CombatantVitals::new(
            self.hp.unwrap_or(self.max_hp),
            self.max_hp,
            self.stamina.unwrap_or(self.max_stamina),
            self.max_stamina,
        )
    }
}

/// Initial conditions of a battle.
///
/// # Example RON
///
/// ```ron
/// BattleSetup(
///     player: (max_hp: 30, max_stamina: 10),
///     enemy: (max_hp: 30, max_stamina: 10),
///     distance: 5,
///     morale: Calm,
/// )
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleSetup {
    /// Player vitals.
    pub player: VitalsSetup,
    /// Enemy vitals.
    pub enemy: VitalsSetup,
    /// Starting distance.
    pub distance: i32,
    /// Starting morale.
    pub morale: MoraleLevel,
}

impl Default for BattleSetup {
    fn default() -> Self {
        Self {
            player: VitalsSetup::full(30, 10),
            enemy: VitalsSetup::full(30, 10),
            distance: 5,
            morale: MoraleLevel::Calm,
        }
    }
}

impl BattleSetup {
    /// Create the battle state described by this setup.
    #[must_use]
    pub fn build(&self) -> CombatState {
        CombatState::new(
            self.player.build(),
            self.enemy.build(),
            self.distance,
            self.morale,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_constants() {
        let config = EngineConfig::default();
        assert_eq!(config.base_attack_damage, 6);
        assert_eq!(config.enemy_approach_threshold, 6);
        assert_eq!(config.enemy_fixed_attack_damage, 6);
        assert_eq!(config.guard_damage_reduction, 4);
        assert_eq!(config.focus_fallback_bonus, 4);
        assert_eq!(config.stamina_regen_per_action, 1);
    }

    #[test]
    fn test_partial_ron_uses_defaults() {
        let config = EngineConfig::from_ron_str("(base_attack_damage: 9)").unwrap();
        assert_eq!(config.base_attack_damage, 9);
        assert_eq!(config.enemy_fixed_attack_damage, 6);
    }

    #[test]
    fn test_negative_values_are_corrected() {
        let config = EngineConfig::from_ron_str("(stamina_regen_per_action: -3)").unwrap();
        assert_eq!(config.stamina_regen_per_action, 0);
    }

    #[test]
    fn test_bad_ron_is_reported() {
        let err = EngineConfig::from_ron_str("(base_attack_damage: \"six\")").unwrap_err();
        assert!(matches!(err, DuelError::DataParseError { .. }));
    }

    #[test]
    fn test_default_setup_matches_prototype() {
        let state = BattleSetup::default().build();
        assert_eq!(state.player().hp(), 30);
        assert_eq!(state.enemy().hp(), 30);
        assert_eq!(state.player().stamina(), 10);
        assert_eq!(state.distance(), 5);
        assert_eq!(state.morale(), MoraleLevel::Calm);
    }

    #[test]
    fn test_setup_corrects_degenerate_vitals() {
        let setup: BattleSetup = ron::from_str(
            "(player: (hp: Some(50), max_hp: 0, max_stamina: 10), distance: -4, morale: Extreme)",
        )
        .unwrap();
        let state = setup.build();
        assert_eq!(state.player().max_hp(), 1);
        assert_eq!(state.player().hp(), 1);
        assert_eq!(state.distance(), 0);
        assert_eq!(state.enemy().max_hp(), 30);
    }
}
