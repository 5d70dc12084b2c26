//! Bounded morale scale.
//!
//! Morale is an ordinal with seven levels. Successful player actions push it
//! up, taking a hit pushes it down, and [`MoraleLevel::adjusted`] is the only
//! place the bound is enforced.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Inclusive ordinal bounds of the morale scale.
pub const MORALE_BOUNDS: (i32, i32) = (0, 6);

/// Player morale during a battle.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub enum MoraleLevel {
    /// Ordinal 0.
    Fear,
    /// Ordinal 1.
    Shaken,
    /// Ordinal 2.
    Distracted,
    /// Ordinal 3, the starting level.
    #[default]
    Calm,
    /// Ordinal 4.
    Focused,
    /// Ordinal 5.
    Immersed,
    /// Ordinal 6.
    Extreme,
}

impl MoraleLevel {
    /// All levels in ordinal order.
    pub const ALL: [MoraleLevel; 7] = [
        MoraleLevel::Fear,
        MoraleLevel::Shaken,
        MoraleLevel::Distracted,
        MoraleLevel::Calm,
        MoraleLevel::Focused,
        MoraleLevel::Immersed,
        MoraleLevel::Extreme,
    ];

    /// Ordinal position on the scale (0 = Fear, 6 = Extreme).
    #[must_use]
    pub const fn ordinal(self) -> i32 {
        match self {
            MoraleLevel::Fear => 0,
            MoraleLevel::Shaken => 1,
            MoraleLevel::Distracted => 2,
            MoraleLevel::Calm => 3,
            MoraleLevel::Focused => 4,
            MoraleLevel::Immersed => 5,
            MoraleLevel::Extreme => 6,
        }
    }

    /// Level for an ordinal, clamped into [`MORALE_BOUNDS`].
    #[must_use]
    pub const fn from_ordinal(ordinal: i32) -> Self {
        let clamped = if ordinal < MORALE_BOUNDS.0 {
            MORALE_BOUNDS.0
        } else if ordinal > MORALE_BOUNDS.1 {
            MORALE_BOUNDS.1
        } else {
            ordinal
        };
        Self::ALL[clamped as usize]
    }

    /// Move `delta` steps along the scale, saturating at either end.
    #[must_use]
    pub const fn adjusted(self, delta: i32) -> Self {
        Self::from_ordinal(self.ordinal().saturating_add(delta))
    }
}

impl fmt::Display for MoraleLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MoraleLevel::Fear => "Fear",
            MoraleLevel::Shaken => "Shaken",
            MoraleLevel::Distracted => "Distracted",
            MoraleLevel::Calm => "Calm",
            MoraleLevel::Focused => "Focused",
            MoraleLevel::Immersed => "Immersed",
            MoraleLevel::Extreme => "Extreme",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordinals_round_trip() {
        for level in MoraleLevel::ALL {
            assert_eq!(MoraleLevel::from_ordinal(level.ordinal()), level);
        }
    }

    #[test]
    fn test_default_is_calm() {
        assert_eq!(MoraleLevel::default(), MoraleLevel::Calm);
        assert_eq!(MoraleLevel::default().ordinal(), 3);
    }

    #[test]
    fn test_adjust_saturates() {
        assert_eq!(MoraleLevel::Extreme.adjusted(1), MoraleLevel::Extreme);
        assert_eq!(MoraleLevel::Fear.adjusted(-1), MoraleLevel::Fear);
        assert_eq!(MoraleLevel::Calm.adjusted(1), MoraleLevel::Focused);
        assert_eq!(MoraleLevel::Calm.adjusted(-2), MoraleLevel::Shaken);
        assert_eq!(MoraleLevel::Shaken.adjusted(i32::MAX), MoraleLevel::Extreme);
        assert_eq!(MoraleLevel::Shaken.adjusted(i32::MIN), MoraleLevel::Fear);
    }

    #[test]
    fn test_from_ordinal_clamps() {
        assert_eq!(MoraleLevel::from_ordinal(-5), MoraleLevel::Fear);
        assert_eq!(MoraleLevel::from_ordinal(99), MoraleLevel::Extreme);
    }
}
