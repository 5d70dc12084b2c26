//! Shared battle state.
//!
//! [`CombatState`] is a plain value holding both combatants' vitals, the
//! distance between them, the player's morale and the pending buff
//! accumulators. It has no rules of its own: every mutator clamps its field
//! back into range before returning, so a caller never observes an
//! out-of-range value. Only the [`TurnEngine`](crate::engine::TurnEngine)
//! mutates a state once the battle has started.

use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::morale::MoraleLevel;

/// Inclusive bounds of the distance between combatants.
pub const DISTANCE_BOUNDS: (i32, i32) = (0, 9);

/// Which combatant a value refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    /// The player-controlled combatant.
    Player,
    /// The opposing actor.
    Enemy,
}

/// How a battle ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Terminal {
    /// The player's hp reached zero.
    PlayerDefeated,
    /// The enemy's hp reached zero.
    EnemyDefeated,
}

impl fmt::Display for Terminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Terminal::PlayerDefeated => f.write_str("player defeated"),
            Terminal::EnemyDefeated => f.write_str("enemy defeated"),
        }
    }
}

/// Hit points and stamina of one combatant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct CombatantVitals {
    hp: i32,
    max_hp: i32,
    stamina: i32,
    max_stamina: i32,
}

impl CombatantVitals {
    /// Create vitals, correcting out-of-range input.
    ///
    /// Maximums below 1 become 1; current values are clamped into
    /// `[0, max]`.
    #[must_use]
    pub fn new(hp: i32, max_hp: i32, stamina: i32, max_stamina: i32) -> Self {
        let max_hp = max_hp.max(1);
        let max_stamina = max_stamina.max(1);
        Self {
            hp: hp.clamp(0, max_hp),
            max_hp,
            stamina: stamina.clamp(0, max_stamina),
            max_stamina,
        }
    }

    /// Vitals at full hp and full stamina.
    #[must_use]
    pub fn full(max_hp: i32, max_stamina: i32) -> Self {
        Self::new(max_hp, max_hp, max_stamina, max_stamina)
    }

    /// Current hit points.
    #[must_use]
    pub const fn hp(&self) -> i32 {
        self.hp
    }

    /// Maximum hit points (at least 1).
    #[must_use]
    pub const fn max_hp(&self) -> i32 {
        self.max_hp
    }

    /// Current stamina.
    #[must_use]
    pub const fn stamina(&self) -> i32 {
        self.stamina
    }

    /// Maximum stamina (at least 1).
    #[must_use]
    pub const fn max_stamina(&self) -> i32 {
        self.max_stamina
    }

    /// Whether hp has reached zero.
    #[must_use]
    pub const fn is_defeated(&self) -> bool {
        self.hp <= 0
    }

    /// Subtract damage from hp. Returns the hp actually removed.
    pub(crate) fn take_damage(&mut self, amount: i32) -> i32 {
        let before = self.hp;
        self.hp = self.hp.saturating_sub(amount.max(0)).clamp(0, self.max_hp);
        before - self.hp
    }

    /// Add a signed amount to stamina, clamped to `[0, max]`.
    pub(crate) fn add_stamina(&mut self, delta: i32) {
        self.stamina = self.stamina.saturating_add(delta).clamp(0, self.max_stamina);
    }

    fn clamp(&mut self) {
        *self = Self::new(self.hp, self.max_hp, self.stamina, self.max_stamina);
    }
}

/// Mutable state of one two-combatant battle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CombatState {
    player: CombatantVitals,
    enemy: CombatantVitals,
    distance: i32,
    morale: MoraleLevel,
    next_attack_bonus: i32,
    next_damage_reduction: i32,
}

impl CombatState {
    /// Create the state for a new battle with no pending buffs.
    ///
    /// `distance` is clamped into [`DISTANCE_BOUNDS`].
    #[must_use]
    pub fn new(
        player: CombatantVitals,
        enemy: CombatantVitals,
        distance: i32,
        morale: MoraleLevel,
    ) -> Self {
        let mut state = Self {
            player,
            enemy,
            distance,
            morale,
            next_attack_bonus: 0,
            next_damage_reduction: 0,
        };
        state.clamp_all();
        state
    }

    /// Start with a pending attack bonus (negative values become 0).
    #[must_use]
    pub fn with_next_attack_bonus(mut self, bonus: i32) -> Self {
        self.next_attack_bonus = bonus.max(0);
        self
    }

    /// Start with a pending damage reduction (negative values become 0).
    #[must_use]
    pub fn with_next_damage_reduction(mut self, reduction: i32) -> Self {
        self.next_damage_reduction = reduction.max(0);
        self
    }

    /// Player vitals.
    #[must_use]
    pub const fn player(&self) -> &CombatantVitals {
        &self.player
    }

    /// Enemy vitals.
    #[must_use]
    pub const fn enemy(&self) -> &CombatantVitals {
        &self.enemy
    }

    /// Vitals for either side.
    #[must_use]
    pub const fn vitals(&self, side: Side) -> &CombatantVitals {
        match side {
            Side::Player => &self.player,
            Side::Enemy => &self.enemy,
        }
    }

    /// Current distance between the combatants.
    #[must_use]
    pub const fn distance(&self) -> i32 {
        self.distance
    }

    /// Current player morale.
    #[must_use]
    pub const fn morale(&self) -> MoraleLevel {
        self.morale
    }

    /// Additive damage bonus consumed by the next player attack.
    #[must_use]
    pub const fn next_attack_bonus(&self) -> i32 {
        self.next_attack_bonus
    }

    /// Flat reduction consumed by the next hit the player takes.
    #[must_use]
    pub const fn next_damage_reduction(&self) -> i32 {
        self.next_damage_reduction
    }

    /// Terminal condition implied by the vitals, if any.
    ///
    /// Enemy defeat is checked first, matching the resolution order.
    #[must_use]
    pub const fn terminal(&self) -> Option<Terminal> {
        if self.enemy.is_defeated() {
            Some(Terminal::EnemyDefeated)
        } else if self.player.is_defeated() {
            Some(Terminal::PlayerDefeated)
        } else {
            None
        }
    }

    /// Deterministic hash over every field.
    ///
    /// Two states with identical fields hash identically within one build.
    /// Hashes are not comparable across Rust releases or target platforms.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }

    /// Whether every field lies inside its declared bounds.
    #[must_use]
    pub fn is_within_bounds(&self) -> bool {
        let vitals_ok = |v: &CombatantVitals| {
            v.max_hp >= 1
                && v.max_stamina >= 1
                && (0..=v.max_hp).contains(&v.hp)
                && (0..=v.max_stamina).contains(&v.stamina)
        };
        vitals_ok(&self.player)
            && vitals_ok(&self.enemy)
            && (DISTANCE_BOUNDS.0..=DISTANCE_BOUNDS.1).contains(&self.distance)
            && self.next_attack_bonus >= 0
            && self.next_damage_reduction >= 0
    }

    // ------------------------------------------------------------------
    // Mutators (engine only). Each clamps the field it touches.
    // ------------------------------------------------------------------

    pub(crate) fn vitals_mut(&mut self, side: Side) -> &mut CombatantVitals {
        match side {
            Side::Player => &mut self.player,
            Side::Enemy => &mut self.enemy,
        }
    }

    /// Move the distance by `delta`. Returns `(before, after)`.
    pub(crate) fn shift_distance(&mut self, delta: i32) -> (i32, i32) {
        let before = self.distance;
        self.distance = clamp_distance(self.distance.saturating_add(delta));
        (before, self.distance)
    }

    /// Move morale by `delta` ordinal steps. Returns `(before, after)`.
    pub(crate) fn adjust_morale(&mut self, delta: i32) -> (MoraleLevel, MoraleLevel) {
        let before = self.morale;
        self.morale = self.morale.adjusted(delta);
        (before, self.morale)
    }

    pub(crate) fn add_attack_bonus(&mut self, amount: i32) {
        self.next_attack_bonus = self.next_attack_bonus.saturating_add(amount).max(0);
    }

    pub(crate) fn raise_damage_reduction_to(&mut self, floor: i32) {
        self.next_damage_reduction = self.next_damage_reduction.max(floor).max(0);
    }

    /// Consume the pending attack bonus, leaving zero behind.
    pub(crate) fn take_attack_bonus(&mut self) -> i32 {
        std::mem::take(&mut self.next_attack_bonus)
    }

    /// Consume the pending damage reduction, leaving zero behind.
    pub(crate) fn take_damage_reduction(&mut self) -> i32 {
        std::mem::take(&mut self.next_damage_reduction)
    }

    /// Re-establish every bound.
    pub(crate) fn clamp_all(&mut self) {
        self.player.clamp();
        self.enemy.clamp();
        self.distance = clamp_distance(self.distance);
        self.next_attack_bonus = self.next_attack_bonus.max(0);
        self.next_damage_reduction = self.next_damage_reduction.max(0);
    }
}

fn clamp_distance(distance: i32) -> i32 {
    distance.clamp(DISTANCE_BOUNDS.0, DISTANCE_BOUNDS.1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_state() -> CombatState {
        CombatState::new(
            CombatantVitals::full(30, 10),
            CombatantVitals::full(30, 10),
            5,
            MoraleLevel::Calm,
        )
    }

    #[test]
    fn test_vitals_clamp_on_construction() {
        let vitals = CombatantVitals::new(50, 30, -3, 10);
        assert_eq!(vitals.hp(), 30);
        assert_eq!(vitals.stamina(), 0);

        let degenerate = CombatantVitals::new(5, 0, 5, -2);
        assert_eq!(degenerate.max_hp(), 1);
        assert_eq!(degenerate.max_stamina(), 1);
        assert_eq!(degenerate.hp(), 1);
        assert_eq!(degenerate.stamina(), 1);
    }

    #[test]
    fn test_take_damage_floors_at_zero() {
        let mut vitals = CombatantVitals::full(10, 5);
        assert_eq!(vitals.take_damage(4), 4);
        assert_eq!(vitals.hp(), 6);
        assert_eq!(vitals.take_damage(100), 6);
        assert_eq!(vitals.hp(), 0);
        assert!(vitals.is_defeated());
        assert_eq!(vitals.take_damage(-5), 0);
    }

    #[test]
    fn test_stamina_clamps_both_ways() {
        let mut vitals = CombatantVitals::new(10, 10, 3, 10);
        vitals.add_stamina(-7);
        assert_eq!(vitals.stamina(), 0);
        vitals.add_stamina(25);
        assert_eq!(vitals.stamina(), 10);
    }

    #[test]
    fn test_distance_clamped_on_construction() {
        let state = CombatState::new(
            CombatantVitals::full(30, 10),
            CombatantVitals::full(30, 10),
            42,
            MoraleLevel::Calm,
        );
        assert_eq!(state.distance(), DISTANCE_BOUNDS.1);
    }

    #[test]
    fn test_shift_distance_reports_clamped_values() {
        let mut state = sample_state();
        assert_eq!(state.shift_distance(10), (5, 9));
        assert_eq!(state.shift_distance(-20), (9, 0));
        assert_eq!(state.shift_distance(0), (0, 0));
    }

    #[test]
    fn test_buffs_are_consumed() {
        let mut state = sample_state()
            .with_next_attack_bonus(4)
            .with_next_damage_reduction(-1);
        assert_eq!(state.next_damage_reduction(), 0);
        assert_eq!(state.take_attack_bonus(), 4);
        assert_eq!(state.next_attack_bonus(), 0);

        state.raise_damage_reduction_to(4);
        state.raise_damage_reduction_to(2);
        assert_eq!(state.next_damage_reduction(), 4);
        assert_eq!(state.take_damage_reduction(), 4);
        assert_eq!(state.next_damage_reduction(), 0);
    }

    #[test]
    fn test_terminal_checks_enemy_first() {
        let state = CombatState::new(
            CombatantVitals::new(0, 30, 10, 10),
            CombatantVitals::new(0, 30, 10, 10),
            5,
            MoraleLevel::Calm,
        );
        assert_eq!(state.terminal(), Some(Terminal::EnemyDefeated));
        assert_eq!(sample_state().terminal(), None);
    }

    #[test]
    fn test_state_hash_tracks_fields() {
        let a = sample_state();
        let b = sample_state();
        assert_eq!(a.state_hash(), b.state_hash());

        let mut c = sample_state();
        c.adjust_morale(1);
        assert_ne!(a.state_hash(), c.state_hash());
    }
}
