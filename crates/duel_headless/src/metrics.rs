//! Battle metrics collection.
//!
//! Per-battle counters gathered from [`ActionOutcome`]s and rejections, plus
//! an aggregate [`BatchSummary`] for batch runs.

use std::collections::BTreeMap;

use duel_core::error::ActionError;
use duel_core::morale::MoraleLevel;
use duel_core::outcome::{ActionOutcome, OpponentAction};
use duel_core::state::CombatState;
use serde::{Deserialize, Serialize};

use crate::protocol::{BattleStatus, RejectionReason};

/// Complete metrics for a single battle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleMetrics {
    /// Scenario name.
    pub scenario: String,
    /// How the battle ended.
    pub status: BattleStatus,
    /// Actions the script attempted.
    pub actions_attempted: u32,
    /// Actions that resolved.
    pub actions_resolved: u32,
    /// Rejections by reason.
    pub rejections: BTreeMap<String, u32>,
    /// Resolved uses per skill id.
    pub skills_used: BTreeMap<String, u32>,
    /// Total damage the player dealt.
    pub damage_dealt: i32,
    /// Total damage the player took.
    pub damage_taken: i32,
    /// Total damage absorbed by guard.
    pub damage_absorbed: i32,
    /// Times the opponent closed in.
    pub opponent_approaches: u32,
    /// Times the opponent attacked.
    pub opponent_attacks: u32,
    /// Lowest morale reached.
    pub lowest_morale: MoraleLevel,
    /// Highest morale reached.
    pub highest_morale: MoraleLevel,
    /// Player hp at the end.
    pub final_player_hp: i32,
    /// Enemy hp at the end.
    pub final_enemy_hp: i32,
    /// Distance at the end.
    pub final_distance: i32,
    /// Final state hash (for determinism validation).
    pub final_state_hash: u64,
}

impl BattleMetrics {
    /// Start collecting for a battle.
    #[must_use]
    pub fn new(scenario: impl Into<String>, opening: &CombatState) -> Self {
        Self {
            scenario: scenario.into(),
            status: BattleStatus::InProgress,
            actions_attempted: 0,
            actions_resolved: 0,
            rejections: BTreeMap::new(),
            skills_used: BTreeMap::new(),
            damage_dealt: 0,
            damage_taken: 0,
            damage_absorbed: 0,
            opponent_approaches: 0,
            opponent_attacks: 0,
            lowest_morale: opening.morale(),
            highest_morale: opening.morale(),
            final_player_hp: opening.player().hp(),
            final_enemy_hp: opening.enemy().hp(),
            final_distance: opening.distance(),
            final_state_hash: opening.state_hash(),
        }
    }

    /// Record a resolved action.
    pub fn record_outcome(&mut self, outcome: &ActionOutcome, state: &CombatState) {
        self.actions_attempted += 1;
        self.actions_resolved += 1;
        *self.skills_used.entry(outcome.skill_id.clone()).or_default() += 1;
        self.damage_dealt += outcome.damage_dealt;

        match outcome.opponent {
            Some(OpponentAction::Approached { .. }) => self.opponent_approaches += 1,
            Some(OpponentAction::Attacked {
                reduced,
                final_damage,
                ..
            }) => {
                self.opponent_attacks += 1;
                self.damage_absorbed += reduced;
                self.damage_taken += final_damage;
            }
            None => {}
        }

        self.lowest_morale = self.lowest_morale.min(state.morale());
        self.highest_morale = self.highest_morale.max(state.morale());
        if outcome.terminal.is_some() {
            self.status = outcome.terminal.into();
        }
        self.capture_final(state);
    }

    /// Record a rejected action.
    pub fn record_rejection(&mut self, error: &ActionError) {
        self.actions_attempted += 1;
        let reason = RejectionReason::from(error).as_str();
        *self.rejections.entry(reason.to_string()).or_default() += 1;
    }

    /// Snapshot the closing values.
    pub fn capture_final(&mut self, state: &CombatState) {
        self.final_player_hp = state.player().hp();
        self.final_enemy_hp = state.enemy().hp();
        self.final_distance = state.distance();
        self.final_state_hash = state.state_hash();
    }
}

/// Aggregate statistics over many battles.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Total battles played.
    pub total_battles: u32,
    /// Battles the player won.
    pub victories: u32,
    /// Battles the player lost.
    pub defeats: u32,
    /// Battles that hit the action limit or ran out of script.
    pub unfinished: u32,
    /// Player win rate.
    pub win_rate: f64,
    /// Average resolved actions per battle.
    pub avg_actions: f64,
    /// Fewest resolved actions.
    pub min_actions: u32,
    /// Most resolved actions.
    pub max_actions: u32,
    /// Average damage dealt per battle.
    pub avg_damage_dealt: f64,
    /// Average damage taken per battle.
    pub avg_damage_taken: f64,
    /// Rejections across all battles by reason.
    pub rejections: BTreeMap<String, u32>,
}

impl BatchSummary {
    /// Calculate summary from a list of battle metrics.
    #[must_use]
    pub fn from_battles(battles: &[BattleMetrics]) -> Self {
        if battles.is_empty() {
            return Self::default();
        }

        let mut summary = Self {
            total_battles: battles.len() as u32,
            min_actions: u32::MAX,
            ..Default::default()
        };

        let mut actions_sum = 0u64;
        let mut dealt_sum = 0i64;
        let mut taken_sum = 0i64;

        for battle in battles {
            match battle.status {
                BattleStatus::Victory => summary.victories += 1,
                BattleStatus::Defeat => summary.defeats += 1,
                BattleStatus::InProgress => summary.unfinished += 1,
            }
            actions_sum += u64::from(battle.actions_resolved);
            summary.min_actions = summary.min_actions.min(battle.actions_resolved);
            summary.max_actions = summary.max_actions.max(battle.actions_resolved);
            dealt_sum += i64::from(battle.damage_dealt);
            taken_sum += i64::from(battle.damage_taken);
            for (reason, count) in &battle.rejections {
                *summary.rejections.entry(reason.clone()).or_default() += count;
            }
        }

        let total = f64::from(summary.total_battles);
        summary.win_rate = f64::from(summary.victories) / total;
        summary.avg_actions = actions_sum as f64 / total;
        summary.avg_damage_dealt = dealt_sum as f64 / total;
        summary.avg_damage_taken = taken_sum as f64 / total;
        summary
    }
}
