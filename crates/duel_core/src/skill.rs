//! Skill definitions and their distance-effect profile.
//!
//! A skill's effect is scaled by how far the current distance is from the
//! skill's ideal distance:
//!
//! ```text
//! delta      = |current - ideal|
//! raw        = 1 - delta × falloff_per_step
//! multiplier = clamp(raw, min_effect_multiplier, 1)
//! ```
//!
//! There is no cutoff. However far apart the combatants are, the multiplier
//! never drops below `min_effect_multiplier`.
//!
//! # Legacy data
//!
//! Older catalogs described skills with a distance window and an accuracy
//! percentage. [`SkillDefinition::migrate_in_place`] converts those fields
//! into the current profile exactly once, guarded by the persisted
//! `migrated` flag. The legacy fields stay in the record format afterwards
//! but no longer influence anything.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::math::{clamp_unit, decimal_serde, lerp, percent, Fixed};

/// Falloff assigned to the lowest legacy accuracy.
const LEGACY_FALLOFF_LOW_ACCURACY: i32 = 12;
/// Falloff assigned to the highest legacy accuracy.
const LEGACY_FALLOFF_HIGH_ACCURACY: i32 = 4;
/// Effect floor assigned to the lowest legacy accuracy.
const LEGACY_FLOOR_LOW_ACCURACY: i32 = 20;
/// Effect floor assigned to the highest legacy accuracy.
const LEGACY_FLOOR_HIGH_ACCURACY: i32 = 35;

/// What a skill does when resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SkillType {
    /// Deal damage to the enemy.
    Attack,
    /// Change the distance between combatants.
    #[serde(alias = "Move")]
    Mobility,
    /// Reduce the next incoming hit.
    Guard,
    /// Reserved. Resolves with no effect until the mechanic is designed.
    #[serde(alias = "Special")]
    Control,
    /// Bank a bonus for the next attack.
    #[serde(alias = "Buff")]
    Focus,
}

impl fmt::Display for SkillType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SkillType::Attack => "Attack",
            SkillType::Mobility => "Mobility",
            SkillType::Guard => "Guard",
            SkillType::Control => "Control",
            SkillType::Focus => "Focus",
        };
        f.write_str(name)
    }
}

/// Authored definition of one skill.
///
/// # Example RON
///
/// ```ron
/// SkillDefinition(
///     id: "lunge",
///     display_name: "skill.lunge.name",
///     kind: Attack,
///     stamina_cost: 3,
///     ideal_distance: 3,
///     falloff_per_step: 0.08,
///     min_effect_multiplier: 0.25,
///     power: 10,
///     migrated: true,
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillDefinition {
    /// Unique identifier, the catalog key.
    pub id: String,

    /// Localization key or label shown to the player.
    pub display_name: String,

    /// Free-text authoring note.
    #[serde(default)]
    pub description: String,

    /// Effect category.
    pub kind: SkillType,

    /// Stamina consumed on use. Negative values restore stamina.
    #[serde(default)]
    pub stamina_cost: i32,

    /// Whether using the skill hands the turn to the opponent.
    #[serde(default = "default_consumes_turn")]
    pub consumes_turn: bool,

    /// Distance at which the effect multiplier is 1.
    #[serde(default = "default_ideal_distance")]
    pub ideal_distance: i32,

    /// Multiplier lost per step away from the ideal distance, in `[0, 1]`.
    #[serde(with = "decimal_serde", default = "default_falloff_per_step")]
    pub falloff_per_step: Fixed,

    /// Lowest multiplier the skill can fall to, in `[0, 1]`.
    #[serde(with = "decimal_serde", default = "default_min_effect_multiplier")]
    pub min_effect_multiplier: Fixed,

    /// Added to the base attack damage by Attack skills.
    #[serde(default)]
    pub power: i32,

    /// Distance change applied by Mobility skills.
    #[serde(default)]
    pub distance_delta: i32,

    /// Bonus banked by Focus skills (0 means the engine fallback).
    #[serde(default)]
    pub focus_bonus_amount: i32,

    /// Legacy: lower end of the old distance window.
    #[serde(default)]
    pub legacy_min_distance: i32,

    /// Legacy: upper end of the old distance window.
    #[serde(default)]
    pub legacy_max_distance: i32,

    /// Legacy: hit accuracy, 0 to 100.
    #[serde(default)]
    pub legacy_accuracy_percent: i32,

    /// Whether the legacy fields have been folded into the profile.
    #[serde(default)]
    pub migrated: bool,
}

const fn default_consumes_turn() -> bool {
    true
}

const fn default_ideal_distance() -> i32 {
    5
}

fn default_falloff_per_step() -> Fixed {
    percent(10)
}

fn default_min_effect_multiplier() -> Fixed {
    percent(10)
}

impl SkillDefinition {
    /// Create a skill with default profile values and no legacy data.
    ///
    /// The result is not yet marked migrated.
    #[must_use]
    pub fn new(id: impl Into<String>, display_name: impl Into<String>, kind: SkillType) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            description: String::new(),
            kind,
            stamina_cost: 0,
            consumes_turn: default_consumes_turn(),
            ideal_distance: default_ideal_distance(),
            falloff_per_step: default_falloff_per_step(),
            min_effect_multiplier: default_min_effect_multiplier(),
            power: 0,
            distance_delta: 0,
            focus_bonus_amount: 0,
            legacy_min_distance: 0,
            legacy_max_distance: 0,
            legacy_accuracy_percent: 0,
            migrated: false,
        }
    }

    /// Effect multiplier at `current_distance`.
    ///
    /// Pure: safe to call for tooltips and previews at any time. The result
    /// is always in `[min_effect_multiplier, 1]` and equals 1 at the ideal
    /// distance. Out-of-range fractional fields are treated as clamped to
    /// `[0, 1]`.
    #[must_use]
    pub fn distance_multiplier(&self, current_distance: i32) -> Fixed {
        let delta = current_distance.abs_diff(self.ideal_distance);
        let falloff = clamp_unit(self.falloff_per_step);
        let floor = clamp_unit(self.min_effect_multiplier);

        let penalty = Fixed::saturating_from_num(delta).saturating_mul(falloff);
        let raw = Fixed::ONE.saturating_sub(penalty);
        raw.clamp(floor, Fixed::ONE)
    }

    /// Whether any legacy parameter is populated.
    #[must_use]
    pub fn has_legacy_data(&self) -> bool {
        self.legacy_min_distance > 0
            || self.legacy_max_distance > 0
            || self.legacy_accuracy_percent > 0
    }

    /// Fold legacy parameters into the distance profile, once.
    ///
    /// Returns `true` if this call performed the migration and `false` if
    /// the record was already migrated. Records without legacy data are
    /// marked migrated and keep their authored profile.
    pub fn migrate_in_place(&mut self) -> bool {
        if self.migrated {
            return false;
        }

        if self.legacy_min_distance > 0 || self.legacy_max_distance > 0 {
            let low = self.legacy_min_distance.max(0);
            let high = self.legacy_min_distance.max(self.legacy_max_distance);
            self.ideal_distance = low.saturating_add(high) / 2;
        }

        if self.legacy_accuracy_percent > 0 {
            let t = percent(self.legacy_accuracy_percent.clamp(0, 100));
            self.falloff_per_step = lerp(
                percent(LEGACY_FALLOFF_LOW_ACCURACY),
                percent(LEGACY_FALLOFF_HIGH_ACCURACY),
                t,
            );
            self.min_effect_multiplier = lerp(
                percent(LEGACY_FLOOR_LOW_ACCURACY),
                percent(LEGACY_FLOOR_HIGH_ACCURACY),
                t,
            );
        }

        self.migrated = true;
        tracing::debug!(
            skill = %self.id,
            ideal_distance = self.ideal_distance,
            falloff = %self.falloff_per_step,
            floor = %self.min_effect_multiplier,
            "Migrated skill definition"
        );
        true
    }
}

/// Return `skill` with its legacy parameters migrated.
///
/// Idempotent: an already-migrated record is returned unchanged.
#[must_use]
pub fn migrate(mut skill: SkillDefinition) -> SkillDefinition {
    skill.migrate_in_place();
    skill
}
