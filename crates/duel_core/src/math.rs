//! Fixed-point math utilities for deterministic resolution.
//!
//! Effect multipliers are fractional, but hardware floats can round
//! differently across CPUs and compilers. All multiplier math therefore
//! runs in fixed point, and only authored data crosses the float boundary
//! (once, at deserialization time).

use fixed::types::I32F32;

/// Fixed-point number type for all multiplier math.
///
/// Uses 32 bits for integer part and 32 bits for fractional part.
/// Range: approximately -2,147,483,648 to 2,147,483,647
/// Precision: approximately 0.00000000023
pub type Fixed = I32F32;

/// Build a fixed-point fraction from a whole percentage (`percent(12)` is 0.12).
#[must_use]
pub fn percent(value: i32) -> Fixed {
    Fixed::from_num(value) / Fixed::from_num(100)
}

/// Clamp a fixed-point value into the unit interval `[0, 1]`.
#[must_use]
pub fn clamp_unit(value: Fixed) -> Fixed {
    value.clamp(Fixed::ZERO, Fixed::ONE)
}

/// Linearly interpolate between `from` and `to` by `t` (expected in `[0, 1]`).
#[must_use]
pub fn lerp(from: Fixed, to: Fixed, t: Fixed) -> Fixed {
    from + (to - from) * t
}

/// Scale an integer amount by a multiplier, rounding half away from zero.
#[must_use]
pub fn scale_rounded(amount: i32, multiplier: Fixed) -> i32 {
    (Fixed::from_num(amount) * multiplier)
        .saturating_round()
        .saturating_to_num::<i32>()
}

/// Serde support for authored fixed-point values written as decimals.
///
/// Designers write `falloff_per_step: 0.08` in RON. The decimal is parsed
/// once and converted to [`Fixed`]; non-finite input becomes zero.
pub mod decimal_serde {
    use super::Fixed;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a fixed-point number as a decimal.
    pub fn serialize<S>(value: &Fixed, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        value.to_num::<f64>().serialize(serializer)
    }

    /// Deserialize a decimal into a fixed-point number.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Fixed, D::Error>
    where
        D: Deserializer<'de>,
    {
        let decimal = f64::deserialize(deserializer)?;
        Ok(Fixed::checked_from_num(decimal).unwrap_or(Fixed::ZERO))
    }
}
