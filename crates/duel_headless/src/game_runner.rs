//! Scripted battle runner.
//!
//! Plays a [`Scenario`] against the real turn engine without any
//! controller, collecting [`BattleMetrics`] and optionally streaming events
//! to [`OutcomeSink`]s.

use std::io::Write;

use duel_core::data::SkillCatalog;
use duel_core::engine::TurnEngine;
use duel_core::outcome::{BattleEvent, OutcomeSink, SinkError};
use tracing::{debug, info};

use crate::metrics::BattleMetrics;
use crate::scenario::{Scenario, ScenarioError};

/// Check that every scripted skill exists in the catalog.
pub fn check_script(scenario: &Scenario, catalog: &SkillCatalog) -> Result<(), ScenarioError> {
    match scenario.script.iter().find(|id| !catalog.contains(id)) {
        Some(missing) => Err(ScenarioError::UnknownSkill {
            scenario: scenario.name.clone(),
            skill: missing.clone(),
        }),
        None => Ok(()),
    }
}

/// Play a scenario to a terminal condition, the end of its script, or its
/// action limit.
///
/// Rejected actions (for example insufficient stamina) count toward the
/// action limit and are recorded, but do not stop the run.
pub fn run_scenario(
    scenario: &Scenario,
    catalog: &SkillCatalog,
    sinks: &mut [&mut dyn OutcomeSink],
) -> Result<BattleMetrics, ScenarioError> {
    check_script(scenario, catalog)?;

    let mut engine = TurnEngine::new(scenario.engine);
    let mut state = scenario.setup.build();
    let mut metrics = BattleMetrics::new(scenario.name.clone(), &state);

    for index in 0..scenario.max_actions as usize {
        let Some(skill) = scenario.skill_at(index) else {
            debug!(scenario = %scenario.name, index, "Script exhausted");
            break;
        };

        match engine.use_skill_by_id(&mut state, catalog, skill) {
            Ok(outcome) => {
                metrics.record_outcome(&outcome, &state);
                outcome.dispatch(sinks);
                if outcome.terminal.is_some() {
                    break;
                }
            }
            Err(error) => {
                debug!(scenario = %scenario.name, skill, %error, "Action rejected");
                metrics.record_rejection(&error);
            }
        }
    }

    metrics.capture_final(&state);
    info!(
        scenario = %scenario.name,
        status = ?metrics.status,
        actions = metrics.actions_resolved,
        hash = format!("{:016x}", metrics.final_state_hash),
        "Scenario finished"
    );
    Ok(metrics)
}

/// Writes every event as one JSON line.
pub struct JsonEventWriter<W: Write> {
    writer: W,
}

impl<W: Write> JsonEventWriter<W> {
    /// Wrap a writer.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Unwrap the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> OutcomeSink for JsonEventWriter<W> {
    fn on_event(&mut self, event: &BattleEvent) -> Result<(), SinkError> {
        let json = serde_json::to_string(event).map_err(|e| SinkError(e.to_string()))?;
        writeln!(self.writer, "{json}").map_err(|e| SinkError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::BattleStatus;
    use duel_core::config::VitalsSetup;
    use duel_test_utils::fixtures;

    fn scenario(script: &[&str], loop_script: bool, max_actions: u32) -> Scenario {
        Scenario {
            name: "test".to_string(),
            script: script.iter().map(|s| s.to_string()).collect(),
            loop_script,
            max_actions,
            ..Default::default()
        }
    }

    #[test]
    fn test_guard_slash_wins() {
        let catalog = fixtures::standard_catalog();
        let metrics = run_scenario(
            &scenario(&["guard", "slash"], true, 50),
            &catalog,
            &mut [],
        )
        .unwrap();

        assert_eq!(metrics.status, BattleStatus::Victory);
        assert_eq!(metrics.final_enemy_hp, 0);
        assert_eq!(metrics.final_player_hp, 12);
        assert_eq!(metrics.damage_absorbed, 12);
        assert_eq!(metrics.skills_used.get("slash"), Some(&3));
    }

    #[test]
    fn test_script_exhaustion_stops() {
        let catalog = fixtures::standard_catalog();
        let metrics =
            run_scenario(&scenario(&["guard", "focus"], false, 50), &catalog, &mut []).unwrap();

        assert_eq!(metrics.status, BattleStatus::InProgress);
        assert_eq!(metrics.actions_attempted, 2);
    }

    #[test]
    fn test_rejections_are_counted() {
        let catalog = fixtures::standard_catalog();
        let mut heavy = scenario(&["heavy"], true, 4);
        heavy.setup.enemy = VitalsSetup::full(100, 10);
        // heavy costs 5; 10 -> 6 -> 2, then rejected.
        let metrics = run_scenario(&heavy, &catalog, &mut []).unwrap();

        assert_eq!(metrics.actions_resolved, 2);
        assert_eq!(metrics.rejections.get("insufficient_stamina"), Some(&2));
    }

    #[test]
    fn test_unknown_skill_is_reported() {
        let catalog = fixtures::standard_catalog();
        let err = run_scenario(&scenario(&["fireball"], false, 5), &catalog, &mut []).unwrap_err();
        assert!(matches!(err, ScenarioError::UnknownSkill { skill, .. } if skill == "fireball"));
    }

    #[test]
    fn test_events_stream_as_json_lines() {
        let catalog = fixtures::standard_catalog();
        let mut writer = JsonEventWriter::new(Vec::new());
        run_scenario(&scenario(&["slash"], false, 1), &catalog, &mut [&mut writer]).unwrap();

        let text = String::from_utf8(writer.into_inner()).unwrap();
        let first = text.lines().next().unwrap();
        assert!(first.contains(r#""event":"skill_used""#));
        assert!(text.lines().any(|l| l.contains(r#""event":"player_hit""#)));
    }
}
