//! Error types for the tools.

use duel_core::error::DuelError;
use thiserror::Error;

/// Result type alias using [`ToolError`].
pub type ToolResult<T> = std::result::Result<T, ToolError>;

/// Errors raised by the tools.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Loading or saving data failed.
    #[error(transparent)]
    Data(#[from] DuelError),

    /// The data directory holds nothing to check.
    #[error("No data files found in '{0}'")]
    NothingToValidate(String),

    /// A preview was requested for a skill the catalog lacks.
    #[error("Unknown skill '{0}'")]
    UnknownSkill(String),

    /// Validation found problems.
    #[error("{} problem(s) found", .0.len())]
    Invalid(Vec<String>),
}
