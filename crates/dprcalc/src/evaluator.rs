// ABOUTME: Expected-value evaluation of scanned damage formulas.
// ABOUTME: Folds terms left to right under a rounding policy, crits and rerolls.

use crate::ast::{Formula, Op, Operand, Term};
use crate::reroll::{die_average, expected_rerolled, RerollSpec};
use serde::{Deserialize, Serialize};

/// How a die contributes to the total.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rounding {
    /// Average roll, `(sides + 1) / 2`.
    #[default]
    Expected,
    /// Every die rolls a 1.
    Minimum,
    /// Every die rolls its highest face.
    Maximum,
}

impl Rounding {
    /// Build from the "min damage" / "max damage" switches. Minimum wins when
    /// both are set.
    pub fn from_flags(min_only: bool, max_only: bool) -> Self {
        if min_only {
            Rounding::Minimum
        } else if max_only {
            Rounding::Maximum
        } else {
            Rounding::Expected
        }
    }

    /// Value of a single die under this policy.
    pub fn per_die(self, sides: u64) -> f64 {
        match self {
            Rounding::Expected => die_average(sides),
            Rounding::Minimum => 1.0,
            Rounding::Maximum => sides as f64,
        }
    }
}

/// Settings for one evaluation.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EvalOptions {
    /// Double the dice (critical hit).
    pub critical: bool,
    pub rounding: Rounding,
    /// Extra dice per term on a critical hit, beyond the doubling.
    pub extra_criticals: u64,
    pub reroll: Option<RerollSpec>,
}

impl EvalOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn critical(mut self, critical: bool) -> Self {
        self.critical = critical;
        self
    }

    pub fn rounding(mut self, rounding: Rounding) -> Self {
        self.rounding = rounding;
        self
    }

    pub fn extra_criticals(mut self, extra: u64) -> Self {
        self.extra_criticals = extra;
        self
    }

    pub fn reroll(mut self, reroll: Option<RerollSpec>) -> Self {
        self.reroll = reroll;
        self
    }
}

/// Evaluate a formula to its expected value.
///
/// Terms are folded strictly left to right with no precedence, so
/// `"1d8 + 4 * 2"` is `(4.5 + 4) * 2`. Division by a zero term yields an
/// infinite or NaN total.
pub fn evaluate(formula: &Formula, options: &EvalOptions) -> f64 {
    formula.terms.iter().fold(0.0, |total, term| {
        let value = term_value(term, options);
        let folded = fold(total, term, value);
        tracing::trace!(term = %term, value, total = folded, "folded term");
        folded
    })
}

fn term_value(term: &Term, options: &EvalOptions) -> f64 {
    let (count, sides) = match term.operand {
        Operand::Flat(n) => return n as f64,
        Operand::Dice { count, sides } => (count, sides),
    };

    let dice = if options.critical {
        count
            .saturating_mul(2)
            .saturating_add(options.extra_criticals)
    } else {
        count
    };
    let mut value = dice as f64 * options.rounding.per_die(sides);

    if let Some(reroll) = options.reroll {
        let rerolled = dice.min(reroll.count);
        if rerolled > 0 {
            value += expected_rerolled(
                sides,
                true,
                reroll.find_value.unwrap_or(sides as f64 / 2.0),
                rerolled,
                reroll.replace_value,
            );
        }
    }
    value
}

fn fold(total: f64, term: &Term, value: f64) -> f64 {
    match term.op {
        // Implied addition only applies to dice; a bare number after prose
        // is a label ("level 5"), not damage.
        None | Some(Op::Space) if term.operand.is_dice() => total + value,
        None | Some(Op::Space) => total,
        Some(Op::Add) => total + value,
        Some(Op::Sub) => total - value,
        Some(Op::Mul) => total * value,
        Some(Op::Div) => total / value,
        Some(Op::Pow) => total.powf(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use proptest::prelude::*;

    fn eval(input: &str, options: EvalOptions) -> f64 {
        evaluate(&parse(input), &options)
    }

    fn plain(input: &str) -> f64 {
        eval(input, EvalOptions::new())
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    const DICE: [(&str, f64); 6] = [
        ("1d4", 2.5),
        ("1d6", 3.5),
        ("1d8", 4.5),
        ("1d10", 5.5),
        ("1d12", 6.5),
        ("1d20", 10.5),
    ];

    #[test]
    fn test_basic_dice() {
        for (die, expected) in DICE {
            assert_eq!(plain(die), expected);
        }
    }

    #[test]
    fn test_additive() {
        assert_eq!(plain("1d8 + 4"), 8.5);
        assert_eq!(plain("1d10 - 4"), 1.5);
    }

    #[test]
    fn test_multipliers() {
        assert_eq!(plain("1d8 * 2"), 9.0);
        assert_eq!(plain("2d10 / 11"), 1.0);
        assert_eq!(plain("2d4 ^ 2"), 25.0);
        assert_eq!(plain("1d8 × 2"), 9.0);
        assert_eq!(plain("2d10 ÷ 11"), 1.0);
    }

    #[test]
    fn test_no_precedence() {
        assert_eq!(plain("1d8 + 4 * 2"), 17.0);
        // The leading bare 2 is never added, so the product starts from 0.
        assert_eq!(plain("2 * 1d8"), 0.0);
    }

    #[test]
    fn test_minimum_rolls() {
        let min = EvalOptions::new().rounding(Rounding::Minimum);
        for (die, _) in DICE {
            assert_eq!(eval(die, min), 1.0);
        }
        assert_eq!(eval("1d6 + 4", min), 5.0);
    }

    #[test]
    fn test_maximum_rolls() {
        let max = EvalOptions::new().rounding(Rounding::Maximum);
        for (die, average) in DICE {
            assert_eq!(eval(die, max), 2.0 * average - 1.0);
        }
    }

    #[test]
    fn test_minimum_wins_over_maximum() {
        assert_eq!(Rounding::from_flags(true, true), Rounding::Minimum);
        assert_eq!(Rounding::from_flags(false, true), Rounding::Maximum);
        assert_eq!(Rounding::from_flags(false, false), Rounding::Expected);
    }

    #[test]
    fn test_criticals_double_dice_only() {
        let crit = EvalOptions::new().critical(true);
        for (die, average) in DICE {
            assert_eq!(eval(die, crit), 2.0 * average);
        }
        assert_eq!(eval("1d8 + 4", crit), 13.0);
    }

    #[test]
    fn test_extra_criticals() {
        let brutal = EvalOptions::new().critical(true).extra_criticals(3);
        assert_eq!(eval("1d6", brutal), 5.0 * 3.5);
        // Not a crit: extra dice do nothing.
        assert_eq!(eval("1d6", EvalOptions::new().extra_criticals(3)), 3.5);
    }

    #[test]
    fn test_annotation_separator() {
        let damage = "1d6 + 10 sharpshooter
    + 1d4 favored foe
    ==
    1d6 + 1d4 + 10";
        assert_eq!(plain(damage), 16.0);
        assert_eq!(plain("1d4 ===1d6"), 0.0);
    }

    #[test]
    fn test_dice_and_modifiers_in_any_order() {
        let damage = "1d6 base damage
    + 10 sharpshooter
    + 1d4 favored foe";
        assert_eq!(plain(damage), 16.0);
    }

    #[test]
    fn test_implied_addition_is_dice_only() {
        // Dice after prose are added, bare numbers after prose are not.
        assert_eq!(plain("hex 1d6 sneak attack 2d6"), 10.5);
        assert_eq!(plain("level 69 hex 2d6"), 7.0);
        assert_eq!(plain("5"), 0.0);
        assert_eq!(plain("+5"), 5.0);
        assert_eq!(
            plain("2 eldritch blasts 2d10+6\n extra fake level 69 hex/beam 2d6\n extra sneak attacks 4d6\n"),
            38.0
        );
    }

    #[test]
    fn test_empty_and_prose() {
        assert_eq!(plain(""), 0.0);
        assert_eq!(plain("no dice at all"), 0.0);
    }

    #[test]
    fn test_division_by_zero_propagates() {
        assert_eq!(plain("1d6 / 0"), f64::INFINITY);
        assert!(plain("+0 / 0").is_nan());
    }

    #[test]
    fn test_reroll_one_die() {
        // Piercer: one die, reroll 3 or lower.
        let piercer = EvalOptions::new().reroll(Some(RerollSpec::new(1).find_value(3.0)));
        assert_close(eval("1d6 piercing damage", piercer), 4.25);
        assert_close(eval("2d6", piercer), 4.25 + 3.5);
    }

    #[test]
    fn test_reroll_counts_crit_dice() {
        let reroll = Some(RerollSpec::new(1).find_value(3.0));
        let crit = EvalOptions::new()
            .critical(true)
            .extra_criticals(1)
            .reroll(reroll);
        assert_close(eval("1d6", crit), 4.25 + 3.5 + 3.5);
    }

    #[test]
    fn test_reroll_default_threshold_is_half() {
        let reroll = EvalOptions::new().reroll(Some(RerollSpec::new(4)));
        let per_die = 0.5 * 2.5 + 0.25 * 7.0;
        assert_close(eval("1d4 + 1d4", reroll), 2.0 * per_die);
    }

    #[test]
    fn test_reroll_with_replacement() {
        let reroll = EvalOptions::new().reroll(Some(RerollSpec::new(2).find_value(2.0).replace_value(3.0)));
        assert_close(eval("1d4", reroll), 13.0 / 4.0);
    }

    #[test]
    fn test_zero_reroll_count_is_plain() {
        let reroll = EvalOptions::new().reroll(Some(RerollSpec::new(0).find_value(0.0)));
        assert_eq!(eval("1d4", reroll), 2.5);
    }

    #[test]
    fn test_reroll_on_zero_sided_die_is_nan() {
        let reroll = EvalOptions::new().reroll(Some(RerollSpec::new(1)));
        assert!(eval("1d0", reroll).is_nan());
        assert_eq!(eval("1d0", EvalOptions::new()), 0.5);
    }

    proptest! {
        #[test]
        fn dice_expectation(count in 1u64..=20, sides in 1u64..=100) {
            let input = format!("{count}d{sides}");
            let n = count as f64;
            let s = sides as f64;
            prop_assert!((plain(&input) - n * (s + 1.0) / 2.0).abs() < 1e-9);
            prop_assert!((eval(&input, EvalOptions::new().critical(true)) - n * (s + 1.0)).abs() < 1e-9);
            prop_assert_eq!(eval(&input, EvalOptions::new().rounding(Rounding::Minimum)), n);
            prop_assert_eq!(eval(&input, EvalOptions::new().rounding(Rounding::Maximum)), n * s);
        }

        #[test]
        fn evaluation_is_deterministic(input in "[0-9d+*/^ \\-a-z\n=]{0,40}") {
            let first = plain(&input);
            let second = plain(&input);
            prop_assert_eq!(first.to_bits(), second.to_bits());
        }
    }
}
