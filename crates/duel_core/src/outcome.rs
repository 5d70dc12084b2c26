//! Outcome reporting and the presentation-facing event contract.
//!
//! Every successful `use_skill` call returns one [`ActionOutcome`]: a summary
//! of what changed plus an ordered list of [`BattleEvent`]s. Presentation
//! layers (bars, hit flashes, camera shake, slash effects) consume those
//! events after the fact through [`OutcomeSink`]. The core never calls into
//! a sink while resolving, and a failing sink cannot reach the
//! [`CombatState`](crate::state::CombatState).

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::math::{decimal_serde, Fixed};
use crate::morale::MoraleLevel;
use crate::skill::SkillType;
use crate::state::{Side, Terminal};

/// What the opponent did in response to a turn-consuming skill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum OpponentAction {
    /// Closed the gap by one step.
    Approached {
        /// Distance before moving.
        from: i32,
        /// Distance after moving.
        to: i32,
    },
    /// Attacked the player.
    Attacked {
        /// Damage before the player's reduction.
        raw_damage: i32,
        /// Damage absorbed by the pending reduction.
        reduced: i32,
        /// Damage applied to the player.
        final_damage: i32,
    },
}

impl OpponentAction {
    /// Whether the player took damage.
    #[must_use]
    pub fn is_hit(&self) -> bool {
        matches!(self, OpponentAction::Attacked { final_damage, .. } if *final_damage > 0)
    }
}

/// One notification for presentation layers, in resolution order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum BattleEvent {
    /// The player used a skill.
    SkillUsed {
        /// Skill id.
        skill_id: String,
        /// Skill category.
        kind: SkillType,
    },
    /// Player stamina changed.
    StaminaChanged {
        /// Stamina before.
        before: i32,
        /// Stamina after.
        after: i32,
    },
    /// A player attack landed on the enemy.
    EnemyDamaged {
        /// Damage applied.
        amount: i32,
        /// Distance multiplier used.
        #[serde(with = "decimal_serde")]
        multiplier: Fixed,
        /// Enemy hp afterwards.
        hp_after: i32,
    },
    /// The distance changed.
    DistanceChanged {
        /// Who moved.
        by: Side,
        /// Distance before.
        from: i32,
        /// Distance after.
        to: i32,
    },
    /// The pending attack bonus changed.
    AttackBonusChanged {
        /// Bonus before.
        from: i32,
        /// Bonus after.
        to: i32,
    },
    /// The pending damage reduction changed.
    DamageReductionChanged {
        /// Reduction before.
        from: i32,
        /// Reduction after.
        to: i32,
    },
    /// Player morale changed level.
    MoraleChanged {
        /// Level before.
        from: MoraleLevel,
        /// Level after.
        to: MoraleLevel,
    },
    /// The opponent attacked, whether or not damage got through.
    OpponentAttacked {
        /// Damage before reduction.
        raw_damage: i32,
        /// Damage absorbed.
        reduced: i32,
        /// Damage applied.
        final_damage: i32,
    },
    /// The player took damage (hit flash / camera shake cue).
    PlayerHit {
        /// Damage applied.
        damage: i32,
        /// Player hp afterwards.
        hp_after: i32,
    },
    /// The battle reached a terminal condition.
    BattleEnded {
        /// How it ended.
        terminal: Terminal,
    },
}

/// Net change of the buff accumulators over one call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BuffChanges {
    /// Change of the pending attack bonus.
    pub attack_bonus: i32,
    /// Change of the pending damage reduction.
    pub damage_reduction: i32,
}

/// Result of one resolved `use_skill` call.
///
/// Transient: the engine does not keep it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionOutcome {
    /// Skill that was used.
    pub skill_id: String,
    /// Skill category.
    pub skill_kind: SkillType,
    /// 1-based index of this player action within the battle.
    pub turn: u32,
    /// Distance multiplier at resolution time.
    #[serde(with = "decimal_serde")]
    pub multiplier: Fixed,
    /// Net stamina change, including regeneration.
    pub stamina_delta: i32,
    /// Damage the player dealt (0 for non-attacks).
    pub damage_dealt: i32,
    /// Distance change caused by the player's own skill.
    pub distance_change: i32,
    /// Net buff accumulator changes, including opponent consumption.
    pub buff_changes: BuffChanges,
    /// Net morale change in ordinal steps.
    pub morale_delta: i32,
    /// Opponent response, if the opponent acted.
    pub opponent: Option<OpponentAction>,
    /// Terminal condition reached by this call.
    pub terminal: Option<Terminal>,
    /// Ordered notifications for presentation layers.
    pub events: Vec<BattleEvent>,
}

impl ActionOutcome {
    /// Whether the opponent acted during this call.
    #[must_use]
    pub const fn opponent_acted(&self) -> bool {
        self.opponent.is_some()
    }

    /// Whether the player was hit during this call.
    #[must_use]
    pub fn player_hit(&self) -> bool {
        self.opponent.as_ref().is_some_and(OpponentAction::is_hit)
    }

    /// Deliver every event to every sink, in order.
    ///
    /// Fire-and-forget: a sink error is logged and delivery continues.
    /// Returns the number of failed deliveries.
    pub fn dispatch(&self, sinks: &mut [&mut dyn OutcomeSink]) -> usize {
        let mut failures = 0;
        for event in &self.events {
            for sink in sinks.iter_mut() {
                if let Err(e) = sink.on_event(event) {
                    failures += 1;
                    tracing::warn!(skill = %self.skill_id, error = %e, "Outcome sink failed");
                }
            }
        }
        failures
    }
}

/// Error reported by an [`OutcomeSink`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Outcome sink error: {0}")]
pub struct SinkError(pub String);

/// Consumer of battle events (UI refresh, hit effects, audio, logging).
pub trait OutcomeSink {
    /// Handle one event.
    ///
    /// # Errors
    /// Implementations may fail; the core logs the failure and moves on.
    fn on_event(&mut self, event: &BattleEvent) -> Result<(), SinkError>;
}

/// Collects events, mostly useful for tests and recorders.
impl OutcomeSink for Vec<BattleEvent> {
    fn on_event(&mut self, event: &BattleEvent) -> Result<(), SinkError> {
        self.push(event.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingSink;

    impl OutcomeSink for FailingSink {
        fn on_event(&mut self, _event: &BattleEvent) -> Result<(), SinkError> {
            Err(SinkError("missing hit effect".to_string()))
        }
    }

    fn outcome_with_events() -> ActionOutcome {
        ActionOutcome {
            skill_id: "slash".to_string(),
            skill_kind: SkillType::Attack,
            turn: 1,
            multiplier: Fixed::ONE,
            stamina_delta: -2,
            damage_dealt: 16,
            distance_change: 0,
            buff_changes: BuffChanges::default(),
            morale_delta: 0,
            opponent: Some(OpponentAction::Attacked {
                raw_damage: 6,
                reduced: 0,
                final_damage: 6,
            }),
            terminal: None,
            events: vec![
                BattleEvent::SkillUsed {
                    skill_id: "slash".to_string(),
                    kind: SkillType::Attack,
                },
                BattleEvent::PlayerHit {
                    damage: 6,
                    hp_after: 24,
                },
            ],
        }
    }

    #[test]
    fn test_dispatch_delivers_in_order() {
        let outcome = outcome_with_events();
        let mut collected: Vec<BattleEvent> = Vec::new();
        let failures = outcome.dispatch(&mut [&mut collected]);
        assert_eq!(failures, 0);
        assert_eq!(collected, outcome.events);
    }

    #[test]
    fn test_dispatch_survives_failing_sink() {
        let outcome = outcome_with_events();
        let mut failing = FailingSink;
        let mut collected: Vec<BattleEvent> = Vec::new();
        let failures = outcome.dispatch(&mut [&mut failing, &mut collected]);
        assert_eq!(failures, 2);
        assert_eq!(collected.len(), 2);
    }

    #[test]
    fn test_hit_detection() {
        let outcome = outcome_with_events();
        assert!(outcome.opponent_acted());
        assert!(outcome.player_hit());

        let blocked = OpponentAction::Attacked {
            raw_damage: 6,
            reduced: 6,
            final_damage: 0,
        };
        assert!(!blocked.is_hit());
        assert!(!OpponentAction::Approached { from: 7, to: 6 }.is_hit());
    }
}
