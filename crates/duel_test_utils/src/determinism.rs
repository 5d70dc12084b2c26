//! Determinism testing utilities.
//!
//! Provides a harness for verifying that the turn engine produces identical
//! results given identical inputs.
//!
//! # Testing Strategy
//!
//! Battle resolution must be fully deterministic so that scripted
//! scenarios, previews and recorded outcomes always agree. Sources of
//! non-determinism include:
//!
//! - **Floating-point math**: multipliers use [`duel_core::math::Fixed`].
//! - **Randomness**: the opponent follows a fixed policy; no dice.
//! - **Hidden engine state**: the engine only tracks its phase and turn
//!   counter, both of which are reset between runs.
//!
//! # Test Levels
//!
//! 1. **Unit tests**: individual rules (attack, guard, focus, opponent)
//! 2. **Property tests**: arbitrary skills and sequences stay in bounds
//! 3. **Integration tests**: scripted battles are reproducible
//! 4. **Parallel tests**: N battles on separate threads all match

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::thread;

use duel_core::data::SkillCatalog;
use duel_core::engine::TurnEngine;
use duel_core::state::CombatState;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of steps per run.
    pub steps: u64,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for a deterministic battle).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that the runs were deterministic, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Battle is non-deterministic!\n\
                 Runs: {}\n\
                 Steps: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.steps,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a process multiple times and verify determinism.
///
/// # Arguments
///
/// * `runs` - Number of times to run
/// * `steps` - Number of steps per run
/// * `setup` - Function to create the initial state
/// * `step` - Function to advance the state by one step
/// * `hash` - Function to compute the state hash
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    steps: u64,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();

        for _ in 0..steps {
            step(&mut state);
        }

        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        steps,
    }
}

/// A battle in progress: engine plus state.
#[derive(Debug, Clone)]
pub struct Battle {
    /// Engine driving the battle.
    pub engine: TurnEngine,
    /// Shared state.
    pub state: CombatState,
}

impl Battle {
    /// Start a battle with the default engine.
    #[must_use]
    pub fn new(state: CombatState) -> Self {
        Self {
            engine: TurnEngine::default(),
            state,
        }
    }

    /// Play `script` in order, cycling it, for `actions` calls.
    ///
    /// Rejected calls are counted as steps but change nothing.
    pub fn play(&mut self, catalog: &SkillCatalog, script: &[&str], actions: u64) {
        if script.is_empty() {
            return;
        }
        for index in 0..actions {
            let skill = script[(index % script.len() as u64) as usize];
            let _ = self
                .engine
                .use_skill_by_id(&mut self.state, catalog, skill);
        }
    }

    /// Hash of the state plus the engine's turn counter.
    #[must_use]
    pub fn hash(&self) -> u64 {
        compute_hash(&(self.state.state_hash(), self.engine.turn()))
    }
}

/// Play the same scripted battle twice and compare final hashes.
#[must_use]
pub fn verify_battle_determinism<F>(
    setup_fn: F,
    catalog: &SkillCatalog,
    script: &[&str],
    actions: u64,
) -> bool
where
    F: Fn() -> CombatState,
{
    let result = verify_determinism(
        2,
        1,
        || Battle::new(setup_fn()),
        |battle| battle.play(catalog, script, actions),
        Battle::hash,
    );
    result.is_deterministic
}

/// Play N copies of a scripted battle on scoped threads and collect hashes.
///
/// Catches non-determinism that only shows under thread scheduling.
#[must_use]
pub fn run_parallel_battles<F>(
    setup_fn: F,
    catalog: &SkillCatalog,
    script: &[&str],
    num_battles: usize,
    actions: u64,
) -> DeterminismResult
where
    F: Fn() -> CombatState + Sync,
{
    let hashes: Vec<u64> = thread::scope(|s| {
        let handles: Vec<_> = (0..num_battles)
            .map(|_| {
                s.spawn(|| {
                    let mut battle = Battle::new(setup_fn());
                    battle.play(catalog, script, actions);
                    battle.hash()
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|h| h.join().unwrap_or_default())
            .collect()
    });

    DeterminismResult {
        is_deterministic: hashes.windows(2).all(|w| w[0] == w[1]),
        hashes,
        steps: actions,
    }
}

/// Play two copies action by action and report the first action whose
/// resulting hashes differ. `None` if they never diverge.
#[must_use]
pub fn find_first_divergence<F>(
    setup_fn: F,
    catalog: &SkillCatalog,
    script: &[&str],
    actions: u64,
) -> Option<u64>
where
    F: Fn() -> CombatState,
{
    let mut first = Battle::new(setup_fn());
    let mut second = Battle::new(setup_fn());

    if first.hash() != second.hash() {
        return Some(0);
    }
    if script.is_empty() {
        return None;
    }

    for action in 1..=actions {
        let skill = script[((action - 1) % script.len() as u64) as usize];
        let _ = first
            .engine
            .use_skill_by_id(&mut first.state, catalog, skill);
        let _ = second
            .engine
            .use_skill_by_id(&mut second.state, catalog, skill);

        if first.hash() != second.hash() {
            return Some(action);
        }
    }

    None
}

/// Compute a simple hash for any hashable value.
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Proptest strategies for battle testing.
///
/// These strategies generate random but reproducible skills and states
/// for property-based testing of the resolution rules.
pub mod strategies {
    use duel_core::math::Fixed;
    use duel_core::morale::MoraleLevel;
    use duel_core::skill::{SkillDefinition, SkillType};
    use duel_core::state::{CombatState, CombatantVitals, DISTANCE_BOUNDS};
    use proptest::prelude::*;

    /// Any skill category.
    pub fn arb_skill_type() -> impl Strategy<Value = SkillType> {
        prop_oneof![
            Just(SkillType::Attack),
            Just(SkillType::Mobility),
            Just(SkillType::Guard),
            Just(SkillType::Control),
            Just(SkillType::Focus),
        ]
    }

    /// Any morale level.
    pub fn arb_morale() -> impl Strategy<Value = MoraleLevel> {
        (0i32..=6).prop_map(MoraleLevel::from_ordinal)
    }

    /// A fraction in `[0, 1]` with 1/1000 resolution.
    pub fn arb_unit_fraction() -> impl Strategy<Value = Fixed> {
        (0i32..=1000).prop_map(|n| Fixed::from_num(n) / Fixed::from_num(1000))
    }

    /// Distance, sometimes out of bounds.
    pub fn arb_distance() -> impl Strategy<Value = i32> {
        (DISTANCE_BOUNDS.0 - 3)..=(DISTANCE_BOUNDS.1 + 3)
    }

    /// A migrated skill with arbitrary profile and effect values.
    pub fn arb_skill() -> impl Strategy<Value = SkillDefinition> {
        (
            arb_skill_type(),
            -5i32..12,
            any::<bool>(),
            0i32..=9,
            arb_unit_fraction(),
            arb_unit_fraction(),
            -10i32..20,
            -12i32..12,
            -3i32..10,
        )
            .prop_map(
                |(kind, cost, consumes_turn, ideal, falloff, floor, power, delta, focus)| {
                    let mut skill = SkillDefinition::new("arb", "Arbitrary", kind);
                    skill.stamina_cost = cost;
                    skill.consumes_turn = consumes_turn;
                    skill.ideal_distance = ideal;
                    skill.falloff_per_step = falloff;
                    skill.min_effect_multiplier = floor;
                    skill.power = power;
                    skill.distance_delta = delta;
                    skill.focus_bonus_amount = focus;
                    skill.migrated = true;
                    skill
                },
            )
    }

    /// An unmigrated skill carrying legacy authoring data.
    pub fn arb_legacy_skill() -> impl Strategy<Value = SkillDefinition> {
        (arb_skill(), -2i32..10, -2i32..10, -10i32..120).prop_map(
            |(mut skill, min, max, accuracy)| {
                skill.legacy_min_distance = min;
                skill.legacy_max_distance = max;
                skill.legacy_accuracy_percent = accuracy;
                skill.migrated = false;
                skill
            },
        )
    }

    /// Vitals from possibly out-of-range input.
    pub fn arb_vitals() -> impl Strategy<Value = CombatantVitals> {
        (-5i32..40, -2i32..40, -5i32..15, -2i32..15).prop_map(
            |(hp, max_hp, stamina, max_stamina)| {
                CombatantVitals::new(hp, max_hp, stamina, max_stamina)
            },
        )
    }

    /// A battle state from possibly out-of-range input.
    pub fn arb_state() -> impl Strategy<Value = CombatState> {
        (
            arb_vitals(),
            arb_vitals(),
            arb_distance(),
            arb_morale(),
            -5i32..10,
            -5i32..10,
        )
            .prop_map(|(player, enemy, distance, morale, bonus, reduction)| {
                CombatState::new(player, enemy, distance, morale)
                    .with_next_attack_bonus(bonus)
                    .with_next_damage_reduction(reduction)
            })
    }

    /// A sequence of skills.
    pub fn arb_skill_sequence(max_len: usize) -> impl Strategy<Value = Vec<SkillDefinition>> {
        proptest::collection::vec(arb_skill(), 0..max_len)
    }
}

#[cfg(test)]
mod tests {
    use super::strategies::*;
    use super::*;
    use crate::fixtures;
    use duel_core::engine::TurnEngine;
    use proptest::prelude::*;

    const SCRIPT: &[&str] = &["focus", "slash", "guard", "step_in", "slash", "retreat"];

    #[test]
    fn test_verify_determinism_simple() {
        let result = verify_determinism(3, 100, || 0u64, |n| *n += 1, |n| *n);

        assert!(result.is_deterministic);
        assert_eq!(result.hashes, vec![100, 100, 100]);
    }

    #[test]
    fn test_scripted_battle_is_deterministic() {
        let catalog = fixtures::standard_catalog();
        assert!(verify_battle_determinism(
            fixtures::standard_state,
            &catalog,
            SCRIPT,
            40
        ));
    }

    #[test]
    fn test_parallel_battles_match() {
        let catalog = fixtures::standard_catalog();
        let result = run_parallel_battles(fixtures::standard_state, &catalog, SCRIPT, 8, 30);
        result.assert_deterministic();
        assert_eq!(result.hashes.len(), 8);
    }

    #[test]
    fn test_no_divergence() {
        let catalog = fixtures::standard_catalog();
        let divergence =
            find_first_divergence(fixtures::standard_state, &catalog, SCRIPT, 50);
        assert!(divergence.is_none(), "Expected no divergence");
    }

    #[test]
    fn test_different_scripts_differ() {
        let catalog = fixtures::standard_catalog();
        let mut a = Battle::new(fixtures::standard_state());
        let mut b = Battle::new(fixtures::standard_state());
        a.play(&catalog, &["slash"], 1);
        b.play(&catalog, &["guard"], 1);
        assert_ne!(a.hash(), b.hash());
    }

    proptest! {
        #[test]
        fn prop_same_inputs_same_outcome(
            state in arb_state(),
            skills in arb_skill_sequence(20),
        ) {
            let run = || {
                let mut engine = TurnEngine::default();
                let mut state = state.clone();
                let outcomes: Vec<_> = skills
                    .iter()
                    .map(|skill| engine.use_skill(&mut state, skill))
                    .collect();
                (state.state_hash(), outcomes)
            };
            prop_assert_eq!(run(), run());
        }
    }
}
