// ABOUTME: Hit, critical and miss probabilities for a d20 attack roll.
// ABOUTME: Handles advantage, disadvantage, Elven Accuracy and expanded crit ranges.

use serde::{Deserialize, Serialize};

/// Highest single-roll success chance: a natural 1 always misses.
pub const MAX_SUCCESS: f64 = 0.95;

/// Default lowest d20 face that scores a critical hit.
pub const DEFAULT_MIN_CRIT: u32 = 20;

/// How many d20s are rolled for an attack and which one is kept.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RollMode {
    #[default]
    Normal,
    /// Roll two, keep the higher.
    Advantage,
    /// Roll two, keep the lower.
    Disadvantage,
    /// Roll three, keep the highest.
    ElvenAccuracy,
}

impl RollMode {
    /// Collapse the three sheet switches into one mode.
    ///
    /// Advantage and disadvantage cancel. Disadvantage otherwise beats
    /// Elven Accuracy, and Elven Accuracy supersedes plain advantage.
    pub fn from_flags(advantage: bool, disadvantage: bool, elven_accuracy: bool) -> Self {
        match (advantage, disadvantage, elven_accuracy) {
            (true, true, _) => RollMode::Normal,
            (false, true, _) => RollMode::Disadvantage,
            (_, false, true) => RollMode::ElvenAccuracy,
            (true, false, false) => RollMode::Advantage,
            (false, false, false) => RollMode::Normal,
        }
    }

    /// Chance that the kept die succeeds, given one die succeeds with `p`.
    pub fn chance(self, p: f64) -> f64 {
        match self {
            RollMode::Normal => p,
            RollMode::Advantage => 1.0 - (1.0 - p).powi(2),
            RollMode::Disadvantage => p.powi(2),
            RollMode::ElvenAccuracy => 1.0 - (1.0 - p).powi(3),
        }
    }
}

/// Chance that a single d20 lands in the crit range.
pub fn crit_face_chance(min_crit: u32) -> f64 {
    (21.0 - f64::from(min_crit)) / 20.0
}

/// Chance to score a critical hit.
pub fn calculate_crit_chance(mode: RollMode, min_crit: u32) -> f64 {
    mode.chance(crit_face_chance(min_crit))
}

/// Chance to hit without a critical.
///
/// A single roll succeeds with `(21 - ac + to_hit) / 20`, clamped so the crit
/// range always hits and a natural 1 always misses. The crit chance is then
/// taken out, so for a +0 attack against AC 10 this is 0.50 (rolls 10-19).
pub fn calculate_hit_chance(to_hit: f64, expected_ac: f64, mode: RollMode, min_crit: u32) -> f64 {
    let crit_face = crit_face_chance(min_crit);
    let raw = (21.0 - expected_ac + to_hit) / 20.0;
    // f64::max would swallow a NaN armor class.
    let success = if raw.is_nan() {
        raw
    } else {
        raw.max(crit_face).min(MAX_SUCCESS)
    };
    mode.chance(success) - mode.chance(crit_face)
}

/// Hit, crit and miss chances of one attack. They always sum to one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttackOdds {
    pub hit: f64,
    pub crit: f64,
    pub miss: f64,
}

impl AttackOdds {
    pub fn new(to_hit: f64, expected_ac: f64, mode: RollMode, min_crit: u32) -> Self {
        let crit = calculate_crit_chance(mode, min_crit);
        let hit = calculate_hit_chance(to_hit, expected_ac, mode, min_crit);
        Self {
            hit,
            crit,
            miss: 1.0 - hit - crit,
        }
    }

    /// Expected damage given the damage dealt by each outcome.
    pub fn expected_damage(&self, hit: f64, crit: f64, miss: f64) -> f64 {
        self.crit * crit + self.hit * hit + self.miss * miss
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    const MODES: [RollMode; 4] = [
        RollMode::Normal,
        RollMode::Advantage,
        RollMode::Disadvantage,
        RollMode::ElvenAccuracy,
    ];

    #[test]
    fn test_from_flags() {
        assert_eq!(RollMode::from_flags(false, false, false), RollMode::Normal);
        assert_eq!(RollMode::from_flags(true, false, false), RollMode::Advantage);
        assert_eq!(RollMode::from_flags(false, true, false), RollMode::Disadvantage);
        assert_eq!(RollMode::from_flags(false, false, true), RollMode::ElvenAccuracy);
        assert_eq!(RollMode::from_flags(true, false, true), RollMode::ElvenAccuracy);
        assert_eq!(RollMode::from_flags(false, true, true), RollMode::Disadvantage);
        assert_eq!(RollMode::from_flags(true, true, false), RollMode::Normal);
        assert_eq!(RollMode::from_flags(true, true, true), RollMode::Normal);
    }

    #[test]
    fn test_crit_normal() {
        assert_eq!(calculate_crit_chance(RollMode::Normal, 20), 0.05);
        assert_close(calculate_crit_chance(RollMode::Normal, 19), 0.10);
        assert_close(calculate_crit_chance(RollMode::Normal, 18), 0.15);
    }

    #[test]
    fn test_crit_advantage() {
        assert_close(calculate_crit_chance(RollMode::Advantage, 20), 0.0975);
        assert_close(calculate_crit_chance(RollMode::Advantage, 19), 0.19);
        assert_close(calculate_crit_chance(RollMode::Advantage, 18), 0.2775);
    }

    #[test]
    fn test_crit_disadvantage() {
        assert_close(calculate_crit_chance(RollMode::Disadvantage, 20), 0.0025);
        assert_close(calculate_crit_chance(RollMode::Disadvantage, 19), 0.01);
        assert_close(calculate_crit_chance(RollMode::Disadvantage, 18), 0.0225);
    }

    #[test]
    fn test_crit_elven_accuracy() {
        assert_close(calculate_crit_chance(RollMode::ElvenAccuracy, 20), 0.142625);
        assert_close(calculate_crit_chance(RollMode::ElvenAccuracy, 19), 0.271);
        assert_close(calculate_crit_chance(RollMode::ElvenAccuracy, 18), 0.385875);
    }

    #[test]
    fn test_hit_flat_dc10() {
        assert_eq!(calculate_hit_chance(0.0, 10.0, RollMode::Normal, 20), 0.5);
    }

    #[test]
    fn test_hit_modifiers() {
        assert_close(calculate_hit_chance(5.0, 13.0, RollMode::Normal, 20), 0.6);
        assert_close(calculate_hit_chance(2.0, 10.0, RollMode::Normal, 20), 0.6);
    }

    #[test]
    fn test_hit_roll_modes() {
        assert_close(calculate_hit_chance(0.0, 10.0, RollMode::Advantage, 20), 0.7);
        assert_close(calculate_hit_chance(0.0, 10.0, RollMode::Disadvantage, 20), 0.3);
        assert_close(
            calculate_hit_chance(0.0, 10.0, RollMode::ElvenAccuracy, 20),
            1.0 - 0.45f64.powi(3) - (1.0 - 0.95f64.powi(3)),
        );
    }

    #[test]
    fn test_hit_crit_ranges() {
        assert_close(calculate_hit_chance(0.0, 10.0, RollMode::Normal, 19), 0.45);
        assert_close(calculate_hit_chance(0.0, 10.0, RollMode::Normal, 18), 0.4);
        assert_close(calculate_hit_chance(0.0, 10.0, RollMode::Advantage, 19), 0.6075);
        assert_close(calculate_hit_chance(0.0, 10.0, RollMode::Disadvantage, 18), 0.28);
        assert_close(
            calculate_hit_chance(0.0, 10.0, RollMode::ElvenAccuracy, 18),
            1.0 - 0.45f64.powi(3) - (1.0 - 0.85f64.powi(3)),
        );
    }

    #[test]
    fn test_hit_capped_by_natural_one() {
        assert_close(calculate_hit_chance(30.0, 0.0, RollMode::Normal, 20), 0.9);
    }

    #[test]
    fn test_nan_armor_class_propagates() {
        assert!(calculate_hit_chance(0.0, f64::NAN, RollMode::Normal, 20).is_nan());
    }

    #[test]
    fn test_attack_odds() {
        let odds = AttackOdds::new(0.0, 10.0, RollMode::Normal, 20);
        assert_eq!(odds.crit, 0.05);
        assert_eq!(odds.hit, 0.5);
        assert_close(odds.miss, 0.45);
        assert_close(odds.expected_damage(3.5, 7.0, 0.0), 2.1);
    }

    proptest! {
        #[test]
        fn outcomes_partition(to_hit in -10i32..=20, ac in 0i32..=30, min_crit in 2u32..=20, mode in 0usize..4) {
            let odds = AttackOdds::new(f64::from(to_hit), f64::from(ac), MODES[mode], min_crit);
            prop_assert!((odds.hit + odds.crit + odds.miss - 1.0).abs() < 1e-12);
            prop_assert!(odds.hit >= 0.0);
            prop_assert!(odds.miss >= -1e-12);
        }

        #[test]
        fn high_armor_class_never_hits(to_hit in -10i32..=20, min_crit in 2u32..=20, mode in 0usize..4) {
            let hit = calculate_hit_chance(f64::from(to_hit), 1000.0, MODES[mode], min_crit);
            prop_assert_eq!(hit, 0.0);
        }
    }
}
