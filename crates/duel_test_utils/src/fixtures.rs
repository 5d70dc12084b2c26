//! Test fixtures and helpers.
//!
//! Ready-made skills, catalogs and battle states for consistent testing.
//! Every skill built here is already migrated.

use duel_core::data::SkillCatalog;
use duel_core::morale::MoraleLevel;
use duel_core::skill::{SkillDefinition, SkillType};
use duel_core::state::{CombatState, CombatantVitals};
use fixed::types::I32F32;

/// Create a fixed-point number from a float (for tests only).
///
/// Note: resolution code never uses floats.
/// This is only for convenient test setup.
#[must_use]
pub fn fixed_f(n: f64) -> I32F32 {
    I32F32::from_num(n)
}

fn migrated(id: &str, kind: SkillType) -> SkillDefinition {
    let mut skill = SkillDefinition::new(id, id, kind);
    skill.migrated = true;
    skill
}

/// Attack skill with the given power, ideal at distance 5.
#[must_use]
pub fn attack(id: &str, power: i32) -> SkillDefinition {
    let mut skill = migrated(id, SkillType::Attack);
    skill.power = power;
    skill
}

/// Attack skill with a custom distance profile.
#[must_use]
pub fn attack_with_profile(
    id: &str,
    power: i32,
    ideal_distance: i32,
    falloff: f64,
    floor: f64,
) -> SkillDefinition {
    let mut skill = attack(id, power);
    skill.ideal_distance = ideal_distance;
    skill.falloff_per_step = fixed_f(falloff);
    skill.min_effect_multiplier = fixed_f(floor);
    skill
}

/// Mobility skill moving by `delta`.
#[must_use]
pub fn mobility(id: &str, delta: i32, consumes_turn: bool) -> SkillDefinition {
    let mut skill = migrated(id, SkillType::Mobility);
    skill.distance_delta = delta;
    skill.consumes_turn = consumes_turn;
    skill
}

/// Guard skill.
#[must_use]
pub fn guard(id: &str) -> SkillDefinition {
    migrated(id, SkillType::Guard)
}

/// Focus skill banking `amount` (0 uses the engine fallback).
#[must_use]
pub fn focus(id: &str, amount: i32) -> SkillDefinition {
    let mut skill = migrated(id, SkillType::Focus);
    skill.focus_bonus_amount = amount;
    skill
}

/// Control skill (no effect).
#[must_use]
pub fn control(id: &str) -> SkillDefinition {
    migrated(id, SkillType::Control)
}

/// Set a stamina cost on a skill.
#[must_use]
pub fn with_cost(mut skill: SkillDefinition, cost: i32) -> SkillDefinition {
    skill.stamina_cost = cost;
    skill
}

/// Small catalog covering every skill type.
///
/// Ids: `slash`, `heavy`, `step_in`, `retreat`, `guard`, `focus`, `snare`.
#[must_use]
pub fn standard_catalog() -> SkillCatalog {
    let skills = vec![
        with_cost(attack("slash", 4), 2),
        with_cost(attack("heavy", 10), 5),
        mobility("step_in", -1, false),
        mobility("retreat", 2, true),
        with_cost(guard("guard"), 1),
        focus("focus", 0),
        control("snare"),
    ];
    match SkillCatalog::from_skills(skills) {
        Ok(catalog) => catalog,
        Err(e) => panic!("standard catalog is invalid: {e}"),
    }
}

/// Opening state: both sides 30 hp, 10 stamina, distance 5, Calm.
#[must_use]
pub fn standard_state() -> CombatState {
    state_at(5)
}

/// Opening state at a given distance.
#[must_use]
pub fn state_at(distance: i32) -> CombatState {
    CombatState::new(
        CombatantVitals::full(30, 10),
        CombatantVitals::full(30, 10),
        distance,
        MoraleLevel::Calm,
    )
}

/// State with custom player and enemy hp.
#[must_use]
pub fn state_with_hp(player_hp: i32, enemy_hp: i32, distance: i32) -> CombatState {
    CombatState::new(
        CombatantVitals::new(player_hp, 30, 10, 10),
        CombatantVitals::new(enemy_hp, 30, 10, 10),
        distance,
        MoraleLevel::Calm,
    )
}
