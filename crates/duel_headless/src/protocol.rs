//! JSON protocol for headless duel sessions.
//!
//! The headless runner communicates via JSON lines (one JSON object per line):
//!
//! **Input (stdin):** Commands from the controller
//! **Output (stdout):** Outcomes, previews and state snapshots
//!
//! # Protocol Flow
//!
//! 1. Runner starts, outputs `{"type":"ready","version":"1.0","skills":[...]}`
//! 2. Controller sends commands as JSON lines
//! 3. Runner answers every command with exactly one response
//! 4. `quit` (or end of input) ends the session with `{"type":"bye"}`
//!
//! # Example Session
//!
//! ```text
//! <- {"type":"ready","version":"1.0","skills":["slash","guard"]}
//! -> {"cmd":"preview","skill":"slash"}
//! <- {"type":"preview","preview":{"skill_id":"slash","distance":5,...},"opponent":{"intent":"attack","expected_damage":6}}
//! -> {"cmd":"use_skill","skill":"slash"}
//! <- {"type":"outcome","outcome":{...},"state":{...}}
//! -> {"cmd":"use_skill","skill":"fireball"}
//! <- {"type":"rejected","skill":"fireball","reason":"invalid_skill_reference","message":"..."}
//! -> {"cmd":"quit"}
//! <- {"type":"bye"}
//! ```

use duel_core::engine::{BattlePhase, TurnEngine};
use duel_core::error::ActionError;
use duel_core::morale::MoraleLevel;
use duel_core::opponent::OpponentIntent;
use duel_core::outcome::ActionOutcome;
use duel_core::preview::SkillPreview;
use duel_core::state::{CombatState, CombatantVitals, Terminal};
use serde::{Deserialize, Serialize};

/// Protocol version reported in the ready message.
pub const PROTOCOL_VERSION: &str = "1.0";

// ============================================================================
// Input Commands (Controller -> Runner)
// ============================================================================

/// Commands that can be sent to the headless runner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum Command {
    /// Resolve a skill by catalog id.
    UseSkill { skill: String },

    /// Preview a skill without resolving it.
    Preview { skill: String },

    /// Query the current state.
    Query,

    /// Report the current state hash.
    Hash,

    /// Start a new battle from the configured setup.
    Reset,

    /// End the session.
    Quit,
}

// ============================================================================
// Output Responses (Runner -> Controller)
// ============================================================================

/// Responses sent from the headless runner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    /// Runner is ready to accept commands.
    Ready {
        version: String,
        skills: Vec<String>,
    },

    /// A skill was resolved.
    Outcome {
        outcome: ActionOutcome,
        state: StateSnapshot,
    },

    /// A skill was rejected; nothing changed.
    Rejected {
        skill: String,
        reason: RejectionReason,
        message: String,
    },

    /// Tooltip data for a skill plus the opponent's next move.
    Preview {
        preview: SkillPreview,
        opponent: OpponentIntent,
    },

    /// Current battle state.
    State { state: StateSnapshot },

    /// State hash for determinism verification.
    StateHash { turn: u32, hash: u64 },

    /// Error processing a command.
    Error {
        message: String,
        cmd: Option<String>,
    },

    /// Goodbye message before shutdown.
    Bye,
}

/// Machine-readable rejection code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    InvalidSkillReference,
    InsufficientStamina,
    BattleAlreadyTerminal,
}

impl RejectionReason {
    /// Wire name of the code.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidSkillReference => "invalid_skill_reference",
            Self::InsufficientStamina => "insufficient_stamina",
            Self::BattleAlreadyTerminal => "battle_already_terminal",
        }
    }
}

impl From<&ActionError> for RejectionReason {
    fn from(error: &ActionError) -> Self {
        match error {
            ActionError::InvalidSkillReference(_) => Self::InvalidSkillReference,
            ActionError::InsufficientStamina { .. } => Self::InsufficientStamina,
            ActionError::BattleAlreadyTerminal(_) => Self::BattleAlreadyTerminal,
        }
    }
}

// ============================================================================
// State Types
// ============================================================================

/// Vitals of one combatant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VitalsState {
    pub hp: i32,
    pub max_hp: i32,
    pub stamina: i32,
    pub max_stamina: i32,
}

impl From<&CombatantVitals> for VitalsState {
    fn from(vitals: &CombatantVitals) -> Self {
        Self {
            hp: vitals.hp(),
            max_hp: vitals.max_hp(),
            stamina: vitals.stamina(),
            max_stamina: vitals.max_stamina(),
        }
    }
}

/// Battle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BattleStatus {
    InProgress,
    Victory,
    Defeat,
}

impl From<Option<Terminal>> for BattleStatus {
    fn from(terminal: Option<Terminal>) -> Self {
        match terminal {
            None => Self::InProgress,
            Some(Terminal::EnemyDefeated) => Self::Victory,
            Some(Terminal::PlayerDefeated) => Self::Defeat,
        }
    }
}

/// Serializable view of the battle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub turn: u32,
    pub player: VitalsState,
    pub enemy: VitalsState,
    pub distance: i32,
    pub morale: MoraleLevel,
    pub next_attack_bonus: i32,
    pub next_damage_reduction: i32,
    pub status: BattleStatus,
    pub hash: u64,
}

impl StateSnapshot {
    /// Capture the state and the engine's progress.
    #[must_use]
    pub fn capture(state: &CombatState, engine: &TurnEngine) -> Self {
        let terminal = match engine.phase() {
            BattlePhase::BattleEnded(terminal) => Some(terminal),
            _ => state.terminal(),
        };
        Self {
            turn: engine.turn(),
            player: state.player().into(),
            enemy: state.enemy().into(),
            distance: state.distance(),
            morale: state.morale(),
            next_attack_bonus: state.next_attack_bonus(),
            next_damage_reduction: state.next_damage_reduction(),
            status: terminal.into(),
            hash: state.state_hash(),
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

impl Response {
    /// Create a ready response.
    pub fn ready(skills: Vec<String>) -> Self {
        Self::Ready {
            version: PROTOCOL_VERSION.to_string(),
            skills,
        }
    }

    /// Create a rejection from an engine error.
    pub fn rejected(skill: &str, error: &ActionError) -> Self {
        Self::Rejected {
            skill: skill.to_string(),
            reason: error.into(),
            message: error.to_string(),
        }
    }

    /// Create an error response.
    pub fn error(message: impl Into<String>, cmd: Option<&str>) -> Self {
        Self::Error {
            message: message.into(),
            cmd: cmd.map(String::from),
        }
    }

    /// Serialize to JSON line (with newline).
    pub fn to_json_line(&self) -> String {
        let mut json = serde_json::to_string(self).unwrap_or_else(|e| {
            format!(r#"{{"type":"error","message":"Serialization failed: {e}"}}"#)
        });
        json.push('\n');
        json
    }
}

impl Command {
    /// Parse from a JSON line.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Get command name for error reports.
    pub fn name(&self) -> &'static str {
        match self {
            Self::UseSkill { .. } => "use_skill",
            Self::Preview { .. } => "preview",
            Self::Query => "query",
            Self::Hash => "hash",
            Self::Reset => "reset",
            Self::Quit => "quit",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use duel_core::config::BattleSetup;

    #[test]
    fn test_parse_use_skill_command() {
        let json = r#"{"cmd":"use_skill","skill":"slash"}"#;
        let cmd = Command::from_json(json).unwrap();
        assert_eq!(
            cmd,
            Command::UseSkill {
                skill: "slash".to_string()
            }
        );
        assert_eq!(cmd.name(), "use_skill");
    }

    #[test]
    fn test_parse_unit_commands() {
        assert_eq!(Command::from_json(r#"{"cmd":"query"}"#).unwrap(), Command::Query);
        assert_eq!(Command::from_json(r#"{"cmd":"reset"}"#).unwrap(), Command::Reset);
        assert!(Command::from_json(r#"{"cmd":"tick"}"#).is_err());
    }

    #[test]
    fn test_serialize_state_response() {
        let engine = TurnEngine::default();
        let state = BattleSetup::default().build();
        let resp = Response::State {
            state: StateSnapshot::capture(&state, &engine),
        };
        let json = resp.to_json_line();
        assert!(json.ends_with('\n'));
        assert!(json.contains(r#""type":"state""#));
        assert!(json.contains(r#""distance":5"#));
        assert!(json.contains(r#""status":"in_progress""#));
    }

    #[test]
    fn test_rejection_codes() {
        let resp = Response::rejected(
            "heavy",
            &ActionError::InsufficientStamina {
                required: 5,
                available: 2,
            },
        );
        let json = resp.to_json_line();
        assert!(json.contains(r#""reason":"insufficient_stamina""#));
        assert!(json.contains(r#""skill":"heavy""#));
    }

    #[test]
    fn test_status_from_terminal() {
        assert_eq!(BattleStatus::from(None), BattleStatus::InProgress);
        assert_eq!(
            BattleStatus::from(Some(Terminal::EnemyDefeated)),
            BattleStatus::Victory
        );
    }
}
