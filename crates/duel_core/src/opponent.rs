//! Fixed opponent policy.
//!
//! The opponent never rolls dice. When far away it closes in by one step;
//! otherwise it attacks for a fixed amount, which the player's pending
//! damage reduction absorbs first. Being hit costs the player one morale
//! level.

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::outcome::{BattleEvent, OpponentAction};
use crate::state::{CombatState, Side};

/// What the opponent would do if it acted now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "intent", rename_all = "snake_case")]
pub enum OpponentIntent {
    /// Step one closer.
    Approach,
    /// Attack; `expected_damage` already accounts for the pending reduction.
    Attack {
        /// Damage the player would take.
        expected_damage: i32,
    },
}

/// Predict the opponent's next action without touching the state.
#[must_use]
pub fn intent(state: &CombatState, config: &EngineConfig) -> OpponentIntent {
    if state.distance() >= config.enemy_approach_threshold {
        OpponentIntent::Approach
    } else {
        let raw = config.enemy_fixed_attack_damage;
        let reduced = raw.min(state.next_damage_reduction());
        OpponentIntent::Attack {
            expected_damage: raw - reduced,
        }
    }
}

/// Carry out the opponent's action against `state`.
pub(crate) fn resolve(
    state: &mut CombatState,
    config: &EngineConfig,
    events: &mut Vec<BattleEvent>,
) -> OpponentAction {
    if state.distance() >= config.enemy_approach_threshold {
        let (from, to) = state.shift_distance(-1);
        tracing::debug!(from, to, "Opponent approaches");
        if from != to {
            events.push(BattleEvent::DistanceChanged {
                by: Side::Enemy,
                from,
                to,
            });
        }
        return OpponentAction::Approached { from, to };
    }

    let raw_damage = config.enemy_fixed_attack_damage;
    let pending = state.take_damage_reduction();
    let reduced = raw_damage.min(pending);
    let final_damage = raw_damage - reduced;

    state.vitals_mut(Side::Player).take_damage(final_damage);
    tracing::debug!(raw_damage, reduced, final_damage, "Opponent attacks");

    events.push(BattleEvent::OpponentAttacked {
        raw_damage,
        reduced,
        final_damage,
    });
    if pending > 0 {
        events.push(BattleEvent::DamageReductionChanged {
            from: pending,
            to: 0,
        });
    }

    if final_damage > 0 {
        let (from, to) = state.adjust_morale(-1);
        events.push(BattleEvent::PlayerHit {
            damage: final_damage,
            hp_after: state.player().hp(),
        });
        if from != to {
            events.push(BattleEvent::MoraleChanged { from, to });
        }
    }

    OpponentAction::Attacked {
        raw_damage,
        reduced,
        final_damage,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::morale::MoraleLevel;
    use crate::state::CombatantVitals;

    fn state_at(distance: i32) -> CombatState {
        CombatState::new(
            CombatantVitals::full(30, 10),
            CombatantVitals::full(30, 10),
            distance,
            MoraleLevel::Calm,
        )
    }

    #[test]
    fn test_far_opponent_approaches() {
        let mut state = state_at(7).with_next_damage_reduction(4);
        let mut events = Vec::new();
        let action = resolve(&mut state, &EngineConfig::default(), &mut events);

        assert_eq!(action, OpponentAction::Approached { from: 7, to: 6 });
        assert_eq!(state.distance(), 6);
        assert_eq!(state.player().hp(), 30);
        // Approaching consumes nothing.
        assert_eq!(state.next_damage_reduction(), 4);
        assert_eq!(state.morale(), MoraleLevel::Calm);
    }

    #[test]
    fn test_threshold_distance_still_approaches() {
        let mut state = state_at(6);
        let action = resolve(&mut state, &EngineConfig::default(), &mut Vec::new());
        assert_eq!(action, OpponentAction::Approached { from: 6, to: 5 });
    }

    #[test]
    fn test_blocked_approach_reports_no_move() {
        let config = EngineConfig {
            enemy_approach_threshold: 0,
            ..EngineConfig::default()
        };
        let mut state = state_at(0);
        let mut events = Vec::new();
        let action = resolve(&mut state, &config, &mut events);

        assert_eq!(action, OpponentAction::Approached { from: 0, to: 0 });
        assert!(events.is_empty());
    }

    #[test]
    fn test_close_opponent_attacks() {
        let mut state = state_at(5);
        let mut events = Vec::new();
        let action = resolve(&mut state, &EngineConfig::default(), &mut events);

        assert_eq!(
            action,
            OpponentAction::Attacked {
                raw_damage: 6,
                reduced: 0,
                final_damage: 6
            }
        );
        assert_eq!(state.player().hp(), 24);
        assert_eq!(state.morale(), MoraleLevel::Distracted);
        assert!(events
            .iter()
            .any(|e| matches!(e, BattleEvent::PlayerHit { damage: 6, .. })));
    }

    #[test]
    fn test_reduction_absorbs_and_resets() {
        let mut state = state_at(2).with_next_damage_reduction(4);
        let action = resolve(&mut state, &EngineConfig::default(), &mut Vec::new());

        assert_eq!(
            action,
            OpponentAction::Attacked {
                raw_damage: 6,
                reduced: 4,
                final_damage: 2
            }
        );
        assert_eq!(state.player().hp(), 28);
        assert_eq!(state.next_damage_reduction(), 0);
    }

    #[test]
    fn test_full_block_keeps_morale() {
        let mut state = state_at(0).with_next_damage_reduction(10);
        let mut events = Vec::new();
        let action = resolve(&mut state, &EngineConfig::default(), &mut events);

        assert!(!action.is_hit());
        assert_eq!(state.player().hp(), 30);
        assert_eq!(state.morale(), MoraleLevel::Calm);
        assert!(!events
            .iter()
            .any(|e| matches!(e, BattleEvent::PlayerHit { .. })));
    }

    #[test]
    fn test_intent_matches_resolution() {
        let config = EngineConfig::default();
        assert_eq!(intent(&state_at(8), &config), OpponentIntent::Approach);
        assert_eq!(
            intent(&state_at(3).with_next_damage_reduction(4), &config),
            OpponentIntent::Attack { expected_damage: 2 }
        );
    }
}
