//! # Duel Core
//!
//! Deterministic resolution core for a two-combatant, turn-based duel.
//!
//! This crate contains **only** the battle rules:
//! - No rendering
//! - No stdin/stdout
//! - No randomness
//! - No floating-point math in resolution (uses fixed-point)
//!
//! Presentation layers call [`engine::TurnEngine::use_skill`], read the
//! returned [`outcome::ActionOutcome`], and query previews for tooltips.
//!
//! ## Crate Structure
//!
//! - [`state`] - Combat state and its bounds
//! - [`skill`] - Skill definitions, distance multiplier, legacy migration
//! - [`engine`] - The turn state machine
//! - [`opponent`] - Fixed opponent policy
//! - [`outcome`] - Outcome summary and event contract
//! - [`data`] - Skill catalog loading and saving
//! - [`math`] - Fixed-point math utilities

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod config;
pub mod data;
pub mod engine;
pub mod error;
pub mod math;
pub mod morale;
pub mod opponent;
pub mod outcome;
pub mod preview;
pub mod skill;
pub mod state;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{BattleSetup, EngineConfig, VitalsSetup};
    pub use crate::data::SkillCatalog;
    pub use crate::engine::{BattlePhase, TurnEngine};
    pub use crate::error::{ActionError, DuelError, Result};
    pub use crate::math::Fixed;
    pub use crate::morale::MoraleLevel;
    pub use crate::opponent::OpponentIntent;
    pub use crate::outcome::{
        ActionOutcome, BattleEvent, BuffChanges, OpponentAction, OutcomeSink, SinkError,
    };
    pub use crate::preview::SkillPreview;
    pub use crate::skill::{migrate, SkillDefinition, SkillType};
    pub use crate::state::{CombatState, CombatantVitals, Side, Terminal};
}
