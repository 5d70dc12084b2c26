//! Turn engine: the state machine that resolves one player action.
//!
//! Each `use_skill` call walks the phases in order:
//!
//! ```text
//! AwaitingPlayerAction -> ResolvingPlayerEffect -> (OpponentResolution)
//!     -> TerminalCheck -> AwaitingPlayerAction | BattleEnded
//! ```
//!
//! A call either resolves completely and returns an [`ActionOutcome`], or is
//! rejected with an [`ActionError`] before anything is mutated. There is no
//! suspension point and no randomness.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::data::SkillCatalog;
use crate::error::ActionError;
use crate::math::{scale_rounded, Fixed};
use crate::opponent;
use crate::outcome::{ActionOutcome, BattleEvent, BuffChanges};
use crate::preview::SkillPreview;
use crate::skill::{migrate, SkillDefinition, SkillType};
use crate::state::{CombatState, Side, Terminal};

/// Where the engine is in its resolution cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BattlePhase {
    /// Waiting for the next `use_skill` call.
    #[default]
    AwaitingPlayerAction,
    /// Applying the player's skill.
    ResolvingPlayerEffect,
    /// The opponent is responding.
    OpponentResolution,
    /// Checking for defeat.
    TerminalCheck,
    /// The battle is over; further actions are rejected.
    BattleEnded(Terminal),
}

/// The record resolution and previews actually use: `skill` itself, or a
/// migrated copy when it still carries legacy data.
fn effective(skill: &SkillDefinition) -> Cow<'_, SkillDefinition> {
    if skill.migrated {
        Cow::Borrowed(skill)
    } else {
        Cow::Owned(migrate(skill.clone()))
    }
}

/// Effect of the player's own skill, before the opponent acts.
struct PlayerEffect {
    damage_dealt: i32,
    distance_change: i32,
    positive: bool,
}

/// Resolves player skills against a [`CombatState`].
///
/// The engine holds only tuning and sequencing data; the battle itself lives
/// in the caller's `CombatState`. One engine drives one battle at a time.
/// Call [`TurnEngine::reset`] before reusing it for a new battle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnEngine {
    config: EngineConfig,
    phase: BattlePhase,
    turn: u32,
}

impl Default for TurnEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl TurnEngine {
    /// Create an engine. Negative tuning values are clamped to zero.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config: config.sanitized(),
            phase: BattlePhase::AwaitingPlayerAction,
            turn: 0,
        }
    }

    /// Engine tuning.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> BattlePhase {
        self.phase
    }

    /// Number of player actions resolved so far.
    #[must_use]
    pub const fn turn(&self) -> u32 {
        self.turn
    }

    /// Whether the battle has ended.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        matches!(self.phase, BattlePhase::BattleEnded(_))
    }

    /// Forget the previous battle.
    pub fn reset(&mut self) {
        self.phase = BattlePhase::AwaitingPlayerAction;
        self.turn = 0;
    }

    /// Resolve a skill by catalog id.
    ///
    /// # Errors
    /// [`ActionError::InvalidSkillReference`] when the id is unknown, plus
    /// everything [`TurnEngine::use_skill`] reports.
    pub fn use_skill_by_id(
        &mut self,
        state: &mut CombatState,
        catalog: &SkillCatalog,
        skill_id: &str,
    ) -> Result<ActionOutcome, ActionError> {
        let Some(skill) = catalog.get(skill_id) else {
            tracing::debug!(skill = skill_id, "Unknown skill id");
            return Err(ActionError::InvalidSkillReference(skill_id.to_string()));
        };
        self.use_skill(state, skill)
    }

    /// Resolve one player action.
    ///
    /// # Errors
    /// - [`ActionError::BattleAlreadyTerminal`] once a defeat has been reported
    ///   or when `state` already holds a defeated combatant.
    /// - [`ActionError::InsufficientStamina`] when the cost exceeds the
    ///   player's stamina.
    ///
    /// A rejected call mutates nothing and does not count as a turn.
    pub fn use_skill(
        &mut self,
        state: &mut CombatState,
        skill: &SkillDefinition,
    ) -> Result<ActionOutcome, ActionError> {
        if let BattlePhase::BattleEnded(terminal) = self.phase {
            return Err(ActionError::BattleAlreadyTerminal(terminal));
        }
        if let Some(terminal) = state.terminal() {
            self.phase = BattlePhase::BattleEnded(terminal);
            return Err(ActionError::BattleAlreadyTerminal(terminal));
        }

        let skill = effective(skill);
        if let Cow::Owned(migrated) = &skill {
            tracing::warn!(skill = %migrated.id, "Skill reached the engine unmigrated; migrating a copy");
        }

        let available = state.player().stamina();
        if skill.stamina_cost > 0 && available < skill.stamina_cost {
            tracing::debug!(
                skill = %skill.id,
                required = skill.stamina_cost,
                available,
                "Rejected: insufficient stamina"
            );
            return Err(ActionError::InsufficientStamina {
                required: skill.stamina_cost,
                available,
            });
        }

        self.phase = BattlePhase::ResolvingPlayerEffect;
        self.turn = self.turn.saturating_add(1);

        let stamina_before = available;
        let bonus_before = state.next_attack_bonus();
        let reduction_before = state.next_damage_reduction();
        let morale_before = state.morale();
        let multiplier = skill.distance_multiplier(state.distance());

        let mut events = vec![BattleEvent::SkillUsed {
            skill_id: skill.id.clone(),
            kind: skill.kind,
        }];

        state
            .vitals_mut(Side::Player)
            .add_stamina(skill.stamina_cost.saturating_neg());

        let effect = self.apply_effect(state, &skill, multiplier, &mut events);

        if effect.positive {
            let (from, to) = state.adjust_morale(1);
            if from != to {
                events.push(BattleEvent::MoraleChanged { from, to });
            }
        }
        state.clamp_all();

        state
            .vitals_mut(Side::Player)
            .add_stamina(self.config.stamina_regen_per_action);
        let stamina_after = state.player().stamina();
        if stamina_after != stamina_before {
            events.push(BattleEvent::StaminaChanged {
                before: stamina_before,
                after: stamina_after,
            });
        }

        self.phase = BattlePhase::TerminalCheck;
        let mut terminal = state.enemy().is_defeated().then_some(Terminal::EnemyDefeated);

        let mut opponent_action = None;
        if terminal.is_none() && skill.consumes_turn {
            self.phase = BattlePhase::OpponentResolution;
            opponent_action = Some(opponent::resolve(state, &self.config, &mut events));
            state.clamp_all();

            self.phase = BattlePhase::TerminalCheck;
            if state.player().is_defeated() {
                terminal = Some(Terminal::PlayerDefeated);
            }
        }

        if let Some(terminal) = terminal {
            self.phase = BattlePhase::BattleEnded(terminal);
            events.push(BattleEvent::BattleEnded { terminal });
            tracing::info!(turn = self.turn, %terminal, "Battle ended");
        } else {
            self.phase = BattlePhase::AwaitingPlayerAction;
        }

        #[cfg(feature = "debug-validation")]
        debug_assert!(
            state.is_within_bounds(),
            "state left its bounds after '{}'",
            skill.id
        );

        tracing::debug!(
            turn = self.turn,
            skill = %skill.id,
            damage = effect.damage_dealt,
            distance = state.distance(),
            morale = %state.morale(),
            "Resolved player action"
        );

        Ok(ActionOutcome {
            skill_id: skill.id.clone(),
            skill_kind: skill.kind,
            turn: self.turn,
            multiplier,
            stamina_delta: state.player().stamina() - stamina_before,
            damage_dealt: effect.damage_dealt,
            distance_change: effect.distance_change,
            buff_changes: BuffChanges {
                attack_bonus: state.next_attack_bonus() - bonus_before,
                damage_reduction: state.next_damage_reduction() - reduction_before,
            },
            morale_delta: state.morale().ordinal() - morale_before.ordinal(),
            opponent: opponent_action,
            terminal,
            events,
        })
    }

    fn apply_effect(
        &self,
        state: &mut CombatState,
        skill: &SkillDefinition,
        multiplier: Fixed,
        events: &mut Vec<BattleEvent>,
    ) -> PlayerEffect {
        let mut effect = PlayerEffect {
            damage_dealt: 0,
            distance_change: 0,
            positive: false,
        };

        match skill.kind {
            SkillType::Attack => {
                let bonus = state.take_attack_bonus();
                let raw = self
                    .config
                    .base_attack_damage
                    .saturating_add(skill.power)
                    .saturating_add(bonus);
                let damage = scale_rounded(raw, multiplier).max(0);
                state.vitals_mut(Side::Enemy).take_damage(damage);

                if bonus > 0 {
                    events.push(BattleEvent::AttackBonusChanged { from: bonus, to: 0 });
                }
                events.push(BattleEvent::EnemyDamaged {
                    amount: damage,
                    multiplier,
                    hp_after: state.enemy().hp(),
                });
                effect.damage_dealt = damage;
                effect.positive = damage > 0;
            }
            SkillType::Mobility => {
                let (from, to) = state.shift_distance(skill.distance_delta);
                if from != to {
                    events.push(BattleEvent::DistanceChanged {
                        by: Side::Player,
                        from,
                        to,
                    });
                }
                effect.distance_change = to - from;
                effect.positive = from != to;
            }
            SkillType::Guard => {
                let from = state.next_damage_reduction();
                state.raise_damage_reduction_to(self.config.guard_damage_reduction);
                let to = state.next_damage_reduction();
                if from != to {
                    events.push(BattleEvent::DamageReductionChanged { from, to });
                }
                effect.positive = true;
            }
            SkillType::Control => {
                // Placeholder type: no effect until its rules are defined.
                tracing::debug!(skill = %skill.id, "Control skill has no effect");
            }
            SkillType::Focus => {
                let amount = if skill.focus_bonus_amount > 0 {
                    skill.focus_bonus_amount
                } else {
                    self.config.focus_fallback_bonus
                };
                let from = state.next_attack_bonus();
                state.add_attack_bonus(amount);
                let to = state.next_attack_bonus();
                if from != to {
                    events.push(BattleEvent::AttackBonusChanged { from, to });
                }
                effect.positive = true;
            }
        }

        effect
    }

    // ------------------------------------------------------------------
    // Read-only previews
    // ------------------------------------------------------------------

    /// Effect multiplier `skill` would have at `distance`.
    #[must_use]
    pub fn preview_multiplier(skill: &SkillDefinition, distance: i32) -> Fixed {
        effective(skill).distance_multiplier(distance)
    }

    /// Damage `skill` would deal right now. Zero for non-attacks.
    #[must_use]
    pub fn preview_damage(&self, state: &CombatState, skill: &SkillDefinition) -> i32 {
        let skill = effective(skill);
        if skill.kind != SkillType::Attack {
            return 0;
        }
        let raw = self
            .config
            .base_attack_damage
            .saturating_add(skill.power)
            .saturating_add(state.next_attack_bonus());
        scale_rounded(raw, skill.distance_multiplier(state.distance())).max(0)
    }

    /// Tooltip data for `skill` in the current state.
    #[must_use]
    pub fn preview(&self, state: &CombatState, skill: &SkillDefinition) -> SkillPreview {
        SkillPreview {
            skill_id: skill.id.clone(),
            distance: state.distance(),
            multiplier: Self::preview_multiplier(skill, state.distance()),
            damage: self.preview_damage(state, skill),
            affordable: skill.stamina_cost <= 0 || state.player().stamina() >= skill.stamina_cost,
        }
    }
}
