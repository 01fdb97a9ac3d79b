// ABOUTME: Python bindings for the dprcalc library using PyO3.
// ABOUTME: Exposes the formula, hit/crit, damage-per-round and spell functions with sheet-style arguments.

use ::dprcalc as core;
use core::{AttackProfile, EvalOptions, RerollSpec, RollMode, Rounding, SpellProfile};
use pyo3::prelude::*;

/// Intermediate figures of a damage-per-round computation.
#[pyclass]
#[derive(Clone)]
pub struct DprBreakdown {
    #[pyo3(get)]
    pub crit_chance: f64,
    #[pyo3(get)]
    pub first_hit_chance: f64,
    #[pyo3(get)]
    pub later_hit_chance: f64,
    #[pyo3(get)]
    pub first_attack: f64,
    #[pyo3(get)]
    pub later_attacks: f64,
    #[pyo3(get)]
    pub total: f64,
}

#[pymethods]
impl DprBreakdown {
    fn __repr__(&self) -> String {
        format!(
            "DprBreakdown(total={:.3}, crit_chance={:.4}, first_hit_chance={:.4}, later_hit_chance={:.4})",
            self.total, self.crit_chance, self.first_hit_chance, self.later_hit_chance
        )
    }
}

impl From<core::DprBreakdown> for DprBreakdown {
    fn from(b: core::DprBreakdown) -> Self {
        Self {
            crit_chance: b.crit_chance,
            first_hit_chance: b.first_hit_chance,
            later_hit_chance: b.later_hit_chance,
            first_attack: b.first_attack,
            later_attacks: b.later_attacks,
            total: b.total,
        }
    }
}

/// Python ints are signed; negative counts mean "none".
fn count(n: i64) -> u64 {
    u64::try_from(n).unwrap_or(0)
}

fn face(n: i64) -> u32 {
    u32::try_from(n.max(0)).unwrap_or(u32::MAX)
}

fn reroll_spec(count: u64, find_value: Option<f64>, replace_value: Option<f64>) -> Option<RerollSpec> {
    (count > 0).then_some(RerollSpec {
        count,
        find_value,
        replace_value,
    })
}

/// Expected value of a damage formula.
///
/// Negative `extra_criticals` or `reroll_count` are treated as 0.
///
/// Example:
///     >>> evaluate_damage_formula("1d8 + 4")
///     8.5
///     >>> evaluate_damage_formula("1d8 + 4", critical=True)
///     13.0
#[pyfunction]
#[pyo3(signature = (
    formula,
    critical=false,
    min_only=false,
    max_only=false,
    extra_criticals=0,
    reroll_count=0,
    reroll_find_value=None,
    reroll_replace_value=None
))]
#[allow(clippy::too_many_arguments)]
fn evaluate_damage_formula(
    formula: &str,
    critical: bool,
    min_only: bool,
    max_only: bool,
    extra_criticals: i64,
    reroll_count: i64,
    reroll_find_value: Option<f64>,
    reroll_replace_value: Option<f64>,
) -> f64 {
    let options = EvalOptions::new()
        .critical(critical)
        .rounding(Rounding::from_flags(min_only, max_only))
        .extra_criticals(count(extra_criticals))
        .reroll(reroll_spec(
            count(reroll_count),
            reroll_find_value,
            reroll_replace_value,
        ));
    core::evaluate_damage_formula(formula, &options)
}

/// Chance to score a critical hit.
#[pyfunction]
#[pyo3(signature = (advantage=false, disadvantage=false, min_crit=20, elven_accuracy=false))]
fn calculate_crit_chance(advantage: bool, disadvantage: bool, min_crit: i64, elven_accuracy: bool) -> f64 {
    core::calculate_crit_chance(
        RollMode::from_flags(advantage, disadvantage, elven_accuracy),
        face(min_crit),
    )
}

/// Chance to hit, not counting critical hits.
///
/// Example:
///     >>> calculate_hit_chance(0, 10)
///     0.5
#[pyfunction]
#[pyo3(signature = (to_hit, expected_ac, advantage=false, disadvantage=false, min_crit=20, elven_accuracy=false))]
fn calculate_hit_chance(
    to_hit: f64,
    expected_ac: f64,
    advantage: bool,
    disadvantage: bool,
    min_crit: i64,
    elven_accuracy: bool,
) -> f64 {
    core::calculate_hit_chance(
        to_hit,
        expected_ac,
        RollMode::from_flags(advantage, disadvantage, elven_accuracy),
        face(min_crit),
    )
}

#[allow(clippy::too_many_arguments)]
fn attack_profile(
    num_attacks: i64,
    to_hit: f64,
    attack_damage: &str,
    extra_attack_damage: &str,
    extra_turn_damage: &str,
    extra_attack_modifier: &str,
    extra_turn_modifier: &str,
    challenge_ac: &str,
    min_dmg: bool,
    max_dmg: bool,
    advantage: bool,
    disadvantage: bool,
    min_crit: i64,
    elven_accuracy: bool,
    extra_criticals: i64,
    rerolled_damage_die_count: i64,
    rerolled_damage_die_find_value: Option<f64>,
    rerolled_damage_die_replace_value: Option<f64>,
    miss_damage: f64,
) -> AttackProfile {
    AttackProfile {
        num_attacks,
        to_hit,
        damage: attack_damage.to_string(),
        per_hit_damage: extra_attack_damage.to_string(),
        per_turn_damage: extra_turn_damage.to_string(),
        per_hit_to_hit: extra_attack_modifier.to_string(),
        per_turn_to_hit: extra_turn_modifier.to_string(),
        armor_class: challenge_ac.to_string(),
        rounding: Rounding::from_flags(min_dmg, max_dmg),
        roll_mode: RollMode::from_flags(advantage, disadvantage, elven_accuracy),
        min_crit: face(min_crit),
        extra_criticals: count(extra_criticals),
        reroll: reroll_spec(
            count(rerolled_damage_die_count),
            rerolled_damage_die_find_value,
            rerolled_damage_die_replace_value,
        ),
        miss_damage,
    }
}

/// Expected damage per round of a turn of weapon attacks.
///
/// Arguments follow the sheet's column order. Negative counts are treated
/// as 0.
///
/// Example:
///     >>> round(calculate_dpr(1, 0, "1d6", challenge_ac="10"), 4)
///     2.1
#[pyfunction]
#[pyo3(signature = (
    num_attacks,
    to_hit,
    attack_damage,
    extra_attack_damage="",
    extra_turn_damage="",
    extra_attack_modifier="",
    extra_turn_modifier="",
    challenge_ac="0",
    min_dmg=false,
    max_dmg=false,
    advantage=false,
    disadvantage=false,
    min_crit=20,
    elven_accuracy=false,
    extra_criticals=0,
    rerolled_damage_die_count=0,
    rerolled_damage_die_find_value=None,
    rerolled_damage_die_replace_value=None,
    miss_damage=0.0
))]
#[allow(clippy::too_many_arguments)]
fn calculate_dpr(
    num_attacks: i64,
    to_hit: f64,
    attack_damage: &str,
    extra_attack_damage: &str,
    extra_turn_damage: &str,
    extra_attack_modifier: &str,
    extra_turn_modifier: &str,
    challenge_ac: &str,
    min_dmg: bool,
    max_dmg: bool,
    advantage: bool,
    disadvantage: bool,
    min_crit: i64,
    elven_accuracy: bool,
    extra_criticals: i64,
    rerolled_damage_die_count: i64,
    rerolled_damage_die_find_value: Option<f64>,
    rerolled_damage_die_replace_value: Option<f64>,
    miss_damage: f64,
) -> f64 {
    core::calculate_dpr(&attack_profile(
        num_attacks,
        to_hit,
        attack_damage,
        extra_attack_damage,
        extra_turn_damage,
        extra_attack_modifier,
        extra_turn_modifier,
        challenge_ac,
        min_dmg,
        max_dmg,
        advantage,
        disadvantage,
        min_crit,
        elven_accuracy,
        extra_criticals,
        rerolled_damage_die_count,
        rerolled_damage_die_find_value,
        rerolled_damage_die_replace_value,
        miss_damage,
    ))
}

/// Like `calculate_dpr`, but returns the intermediate figures too.
#[pyfunction]
#[pyo3(signature = (
    num_attacks,
    to_hit,
    attack_damage,
    extra_attack_damage="",
    extra_turn_damage="",
    extra_attack_modifier="",
    extra_turn_modifier="",
    challenge_ac="0",
    min_dmg=false,
    max_dmg=false,
    advantage=false,
    disadvantage=false,
    min_crit=20,
    elven_accuracy=false,
    extra_criticals=0,
    rerolled_damage_die_count=0,
    rerolled_damage_die_find_value=None,
    rerolled_damage_die_replace_value=None,
    miss_damage=0.0
))]
#[allow(clippy::too_many_arguments)]
fn dpr_breakdown(
    num_attacks: i64,
    to_hit: f64,
    attack_damage: &str,
    extra_attack_damage: &str,
    extra_turn_damage: &str,
    extra_attack_modifier: &str,
    extra_turn_modifier: &str,
    challenge_ac: &str,
    min_dmg: bool,
    max_dmg: bool,
    advantage: bool,
    disadvantage: bool,
    min_crit: i64,
    elven_accuracy: bool,
    extra_criticals: i64,
    rerolled_damage_die_count: i64,
    rerolled_damage_die_find_value: Option<f64>,
    rerolled_damage_die_replace_value: Option<f64>,
    miss_damage: f64,
) -> DprBreakdown {
    core::dpr_breakdown(&attack_profile(
        num_attacks,
        to_hit,
        attack_damage,
        extra_attack_damage,
        extra_turn_damage,
        extra_attack_modifier,
        extra_turn_modifier,
        challenge_ac,
        min_dmg,
        max_dmg,
        advantage,
        disadvantage,
        min_crit,
        elven_accuracy,
        extra_criticals,
        rerolled_damage_die_count,
        rerolled_damage_die_find_value,
        rerolled_damage_die_replace_value,
        miss_damage,
    ))
    .into()
}

/// Expected damage of a saving-throw spell across all targets. A negative
/// target count hits nobody.
///
/// Example:
///     >>> round(calculate_spell_damage(15, "8d6", expected_save=7), 4)
///     19.6
#[pyfunction]
#[pyo3(signature = (
    spell_dc,
    attack_damage,
    extra_attack_damage="",
    extra_turn_damage="",
    no_damage_on_save=false,
    expected_save=0.0,
    number_of_targets=1
))]
fn calculate_spell_damage(
    spell_dc: f64,
    attack_damage: &str,
    extra_attack_damage: &str,
    extra_turn_damage: &str,
    no_damage_on_save: bool,
    expected_save: f64,
    number_of_targets: i64,
) -> f64 {
    core::calculate_spell_damage(&SpellProfile {
        save_dc: spell_dc,
        damage: attack_damage.to_string(),
        per_hit_damage: extra_attack_damage.to_string(),
        per_turn_damage: extra_turn_damage.to_string(),
        no_damage_on_save,
        expected_save,
        targets: face(number_of_targets),
    })
}

/// Expected value of `count` dice whose low rolls are rerolled once.
/// Negative `sides` or `count` are treated as 0.
///
/// Example:
///     >>> expected_rerolled(6)
///     4.25
#[pyfunction]
#[pyo3(signature = (sides, incremental=false, max_reroll=None, count=1, reroll_value=None))]
fn expected_rerolled(
    sides: i64,
    incremental: bool,
    max_reroll: Option<f64>,
    count: i64,
    reroll_value: Option<f64>,
) -> f64 {
    let sides = self::count(sides);
    let max_reroll = max_reroll.unwrap_or(sides as f64 / 2.0);
    core::expected_rerolled(sides, incremental, max_reroll, self::count(count), reroll_value)
}

/// Python module for dprcalc.
#[pymodule]
fn dprcalc(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(evaluate_damage_formula, m)?)?;
    m.add_function(wrap_pyfunction!(calculate_crit_chance, m)?)?;
    m.add_function(wrap_pyfunction!(calculate_hit_chance, m)?)?;
    m.add_function(wrap_pyfunction!(calculate_dpr, m)?)?;
    m.add_function(wrap_pyfunction!(dpr_breakdown, m)?)?;
    m.add_function(wrap_pyfunction!(calculate_spell_damage, m)?)?;
    m.add_function(wrap_pyfunction!(expected_rerolled, m)?)?;
    m.add_class::<DprBreakdown>()?;
    Ok(())
}
