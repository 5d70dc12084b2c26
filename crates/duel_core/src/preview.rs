//! Read-only previews for tooltips.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::math::{decimal_serde, scale_rounded, Fixed};

/// What a skill would do if used right now.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillPreview {
    /// Skill id.
    pub skill_id: String,
    /// Distance the preview was taken at.
    pub distance: i32,
    /// Effect multiplier at that distance.
    #[serde(with = "decimal_serde")]
    pub multiplier: Fixed,
    /// Damage an attack would deal (0 for other skills).
    pub damage: i32,
    /// Whether the player can currently pay the stamina cost.
    pub affordable: bool,
}

impl SkillPreview {
    /// Multiplier as a whole percentage, rounded.
    #[must_use]
    pub fn effect_percent(&self) -> i32 {
        scale_rounded(100, self.multiplier)
    }
}

impl fmt::Display for SkillPreview {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EFF {}%   DMG {}", self.effect_percent(), self.damage)
    }
}
