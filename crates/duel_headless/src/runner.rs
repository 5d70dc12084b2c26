//! Headless session runner.
//!
//! Drives one battle from JSON-line commands and answers each command with
//! exactly one [`Response`]. See [`crate::protocol`] for the wire format.

use std::io::{self, BufRead, Write};

use duel_core::config::{BattleSetup, EngineConfig};
use duel_core::data::SkillCatalog;
use duel_core::engine::TurnEngine;
use duel_core::opponent;
use duel_core::state::CombatState;
use tracing::{debug, info, warn};

use crate::protocol::{Command, Response, StateSnapshot};

/// Headless runner configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeadlessConfig {
    /// Opening state used on start and on `reset`.
    pub setup: BattleSetup,
    /// Engine tuning.
    pub engine: EngineConfig,
}

/// One battle driven by protocol commands.
pub struct HeadlessSession {
    config: HeadlessConfig,
    catalog: SkillCatalog,
    engine: TurnEngine,
    state: CombatState,
}

impl HeadlessSession {
    /// Create a session with a fresh battle.
    #[must_use]
    pub fn new(catalog: SkillCatalog, config: HeadlessConfig) -> Self {
        Self {
            engine: TurnEngine::new(config.engine),
            state: config.setup.build(),
            catalog,
            config,
        }
    }

    /// Current battle state.
    #[must_use]
    pub fn state(&self) -> &CombatState {
        &self.state
    }

    /// The engine driving the battle.
    #[must_use]
    pub fn engine(&self) -> &TurnEngine {
        &self.engine
    }

    /// Ready message listing the skill ids in catalog order.
    #[must_use]
    pub fn ready(&self) -> Response {
        Response::ready(self.catalog.ids().map(String::from).collect())
    }

    /// Handle a single command.
    pub fn handle(&mut self, command: Command) -> Response {
        debug!(cmd = command.name(), "Handling command");
        match command {
            Command::UseSkill { skill } => {
                match self
                    .engine
                    .use_skill_by_id(&mut self.state, &self.catalog, &skill)
                {
                    Ok(outcome) => Response::Outcome {
                        outcome,
                        state: self.snapshot(),
                    },
                    Err(error) => Response::rejected(&skill, &error),
                }
            }
            Command::Preview { skill } => match self.catalog.get(&skill) {
                Some(definition) => Response::Preview {
                    preview: self.engine.preview(&self.state, definition),
                    opponent: opponent::intent(&self.state, self.engine.config()),
                },
                None => Response::error(format!("Unknown skill '{skill}'"), Some("preview")),
            },
            Command::Query => Response::State {
                state: self.snapshot(),
            },
            Command::Hash => Response::StateHash {
                turn: self.engine.turn(),
                hash: self.state.state_hash(),
            },
            Command::Reset => {
                self.engine.reset();
                self.state = self.config.setup.build();
                info!("Battle reset");
                Response::State {
                    state: self.snapshot(),
                }
            }
            Command::Quit => Response::Bye,
        }
    }

    fn snapshot(&self) -> StateSnapshot {
        StateSnapshot::capture(&self.state, &self.engine)
    }
}

/// Headless runner for controller-driven battles.
pub struct HeadlessRunner {
    session: HeadlessSession,
}

impl HeadlessRunner {
    /// Create a runner around a fresh session.
    #[must_use]
    pub fn new(catalog: SkillCatalog, config: HeadlessConfig) -> Self {
        Self {
            session: HeadlessSession::new(catalog, config),
        }
    }

    /// Run over stdin/stdout until `quit` or end of input.
    pub fn run(self) -> io::Result<()> {
        let stdin = io::stdin();
        let stdout = io::stdout();
        self.run_with(stdin.lock(), stdout.lock())
    }

    /// Run over arbitrary line input and output.
    ///
    /// Blank lines are skipped. Malformed lines get an `error` response and
    /// the session continues. The session always ends with `bye`.
    pub fn run_with<R: BufRead, W: Write>(mut self, input: R, mut output: W) -> io::Result<()> {
        send(&mut output, &self.session.ready())?;

        for line in input.lines() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let command = match Command::from_json(line) {
                Ok(command) => command,
                Err(e) => {
                    warn!(error = %e, "Invalid command");
                    send(&mut output, &Response::error(format!("Invalid command: {e}"), None))?;
                    continue;
                }
            };

            let quit = command == Command::Quit;
            let response = self.session.handle(command);
            send(&mut output, &response)?;
            if quit {
                return Ok(());
            }
        }

        send(&mut output, &Response::Bye)
    }
}

fn send<W: Write>(output: &mut W, response: &Response) -> io::Result<()> {
    output.write_all(response.to_json_line().as_bytes())?;
    output.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{BattleStatus, RejectionReason};
    use duel_test_utils::fixtures;

    fn session() -> HeadlessSession {
        HeadlessSession::new(fixtures::standard_catalog(), HeadlessConfig::default())
    }

    #[test]
    fn test_use_skill_advances_state() {
        let mut session = session();
        let response = session.handle(Command::UseSkill {
            skill: "slash".to_string(),
        });
        match response {
            Response::Outcome { outcome, state } => {
                assert_eq!(outcome.damage_dealt, 10);
                assert_eq!(state.enemy.hp, 20);
                assert_eq!(state.turn, 1);
                assert_eq!(state.status, BattleStatus::InProgress);
            }
            other => panic!("expected outcome, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_skill_is_rejected_without_change() {
        let mut session = session();
        let before = session.state().clone();
        let response = session.handle(Command::UseSkill {
            skill: "fireball".to_string(),
        });
        assert!(matches!(
            response,
            Response::Rejected {
                reason: RejectionReason::InvalidSkillReference,
                ..
            }
        ));
        assert_eq!(session.state(), &before);
    }

    #[test]
    fn test_preview_does_not_mutate() {
        let mut session = session();
        let before = session.state().clone();
        let response = session.handle(Command::Preview {
            skill: "slash".to_string(),
        });
        match response {
            Response::Preview { preview, .. } => {
                assert_eq!(preview.damage, 10);
                assert!(preview.affordable);
            }
            other => panic!("expected preview, got {other:?}"),
        }
        assert_eq!(session.state(), &before);
    }

    #[test]
    fn test_reset_restores_opening() {
        let mut session = session();
        let opening = session.state().state_hash();
        session.handle(Command::UseSkill {
            skill: "slash".to_string(),
        });
        assert_ne!(session.state().state_hash(), opening);

        session.handle(Command::Reset);
        assert_eq!(session.state().state_hash(), opening);
        assert_eq!(session.engine().turn(), 0);
    }

    #[test]
    fn test_run_with_handles_bad_lines_and_eof() {
        let runner = HeadlessRunner::new(fixtures::standard_catalog(), HeadlessConfig::default());
        let input = "\n{\"cmd\":\"query\"}\nnot json\n";
        let mut output = Vec::new();
        runner.run_with(input.as_bytes(), &mut output).unwrap();

        let text = String::from_utf8(output).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].contains(r#""type":"ready""#));
        assert!(lines[1].contains(r#""type":"state""#));
        assert!(lines[2].contains(r#""type":"error""#));
        assert_eq!(lines[3], r#"{"type":"bye"}"#);
    }
}
