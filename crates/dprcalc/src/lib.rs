// ABOUTME: Core library for expected-value TTRPG combat math.
// ABOUTME: Evaluates damage formulas and prices attacks and spells as damage per round.

//! # dprcalc
//!
//! Closed-form expected damage for tabletop RPG attacks and spells. No dice
//! are rolled; every figure is an exact expectation.
//!
//! ## Quick Start
//!
//! ```
//! use dprcalc::{calculate_dpr, evaluate_damage_formula, AttackProfile, EvalOptions};
//!
//! // Average of a damage string
//! let avg = evaluate_damage_formula("1d8 + 4", &EvalOptions::new());
//! assert_eq!(avg, 8.5);
//!
//! // A +0 attack doing 1d6 against AC 10
//! let profile = AttackProfile {
//!     damage: "1d6".to_string(),
//!     armor_class: "10".to_string(),
//!     ..AttackProfile::default()
//! };
//! assert!((calculate_dpr(&profile) - 2.1).abs() < 1e-9);
//! ```
//!
//! ## Formula Notation
//!
//! - Dice and flat values: `2d6`, `1d8 + 4`, `1d10 - 1`
//! - Left-to-right arithmetic, no precedence: `1d8 * 2`, `2d4 ^ 2`, `2d10 / 11`
//! - Free text between terms: `1d6 piercing + 1d4 favored foe`
//! - Working notes before `==` are ignored: `sharpshooter +10 == 1d6 + 10`

pub mod ast;
pub mod dpr;
pub mod error;
pub mod evaluator;
pub mod lexer;
pub mod parser;
pub mod probability;
pub mod reroll;
pub mod sheet;
pub mod spell;

pub use ast::{Formula, Op, Operand, Term};
pub use dpr::{calculate_dpr, dpr_breakdown, parse_armor_class, AttackProfile, DprBreakdown};
pub use error::{Error, Result};
pub use evaluator::{EvalOptions, Rounding};
pub use probability::{calculate_crit_chance, calculate_hit_chance, AttackOdds, RollMode};
pub use reroll::{expected_rerolled, RerollSpec};
pub use sheet::{Cell, Sheet};
pub use spell::{calculate_spell_damage, SpellProfile};

/// Scan and evaluate a damage string in one step.
///
/// # Examples
///
/// ```
/// use dprcalc::{evaluate_damage_formula, EvalOptions};
///
/// let crit = EvalOptions::new().critical(true);
/// assert_eq!(evaluate_damage_formula("1d6 + 3", &crit), 10.0);
/// ```
pub fn evaluate_damage_formula(formula: &str, options: &EvalOptions) -> f64 {
    evaluator::evaluate(&parser::parse(formula), options)
}

/// Scan a damage string without evaluating it.
///
/// # Examples
///
/// ```
/// use dprcalc::{Operand, Op};
///
/// let formula = dprcalc::parse("1d8 + 4");
/// assert_eq!(formula.terms[0].operand, Operand::Dice { count: 1, sides: 8 });
/// assert_eq!(formula.terms[1].op, Some(Op::Add));
/// ```
pub fn parse(input: &str) -> Formula {
    parser::parse(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evaluate_damage_formula() {
        assert_eq!(evaluate_damage_formula("1d8 + 4", &EvalOptions::new()), 8.5);
        assert_eq!(evaluate_damage_formula("1d8 * 2", &EvalOptions::new()), 9.0);
    }

    #[test]
    fn test_evaluate_is_repeatable() {
        let options = EvalOptions::new()
            .critical(true)
            .extra_criticals(1)
            .reroll(Some(RerollSpec::new(2)));
        let first = evaluate_damage_formula("2d6 + 1d8 / 3 ^ 2", &options);
        let second = evaluate_damage_formula("2d6 + 1d8 / 3 ^ 2", &options);
        assert_eq!(first.to_bits(), second.to_bits());
    }

    #[test]
    fn test_public_probabilities() {
        assert_eq!(calculate_crit_chance(RollMode::Normal, 20), 0.05);
        assert_eq!(calculate_hit_chance(0.0, 10.0, RollMode::Normal, 20), 0.5);
    }

    #[test]
    fn test_dpr_scenarios() {
        let fist = AttackProfile {
            damage: "1d6".to_string(),
            armor_class: "10".to_string(),
            ..AttackProfile::default()
        };
        assert!((calculate_dpr(&fist) - 2.1).abs() < 1e-9);

        let advantage = AttackProfile {
            roll_mode: RollMode::from_flags(true, false, false),
            ..fist
        };
        assert!((calculate_dpr(&advantage) - 3.1325).abs() < 1e-9);
    }

    #[test]
    fn test_spell_scenario() {
        let fireball = SpellProfile {
            save_dc: 15.0,
            damage: "8d6".to_string(),
            expected_save: 7.0,
            ..SpellProfile::default()
        };
        assert!((calculate_spell_damage(&fireball) - 19.6).abs() < 1e-9);
    }

    #[test]
    fn test_expected_rerolled_export() {
        assert_eq!(expected_rerolled(6, false, 3.0, 1, None), 4.25);
    }
}
