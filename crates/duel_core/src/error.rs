//! Error types for the duel core.

use thiserror::Error;

use crate::state::Terminal;

/// Result type alias using [`DuelError`].
pub type Result<T> = std::result::Result<T, DuelError>;

/// Errors raised while loading or validating authored data.
#[derive(Debug, Error)]
pub enum DuelError {
    /// Data file could not be read or written.
    #[error("I/O error on '{path}': {message}")]
    Io {
        /// Path of the file.
        path: String,
        /// Error message.
        message: String,
    },

    /// Data file parsing error.
    #[error("Failed to parse data file '{path}': {message}")]
    DataParseError {
        /// Path to the file that failed to parse.
        path: String,
        /// Error message.
        message: String,
    },

    /// Data could not be serialized.
    #[error("Failed to serialize data: {0}")]
    SerializeError(String),

    /// Two catalog records share an id.
    #[error("Duplicate skill id: {0}")]
    DuplicateSkillId(String),
}

/// Why a `use_skill` call was rejected.
///
/// A rejected call leaves the [`CombatState`](crate::state::CombatState)
/// untouched and does not consume a turn.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    /// The skill id is not known to the catalog.
    #[error("Invalid skill reference: {0}")]
    InvalidSkillReference(String),

    /// The player cannot pay the skill's stamina cost.
    #[error("Insufficient stamina: need {required}, have {available}")]
    InsufficientStamina {
        /// Stamina cost of the skill.
        required: i32,
        /// Stamina the player has.
        available: i32,
    },

    /// The battle has already ended.
    #[error("Battle already ended: {0}")]
    BattleAlreadyTerminal(Terminal),
}
