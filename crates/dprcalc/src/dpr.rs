// ABOUTME: Damage-per-round aggregation across a turn of weapon attacks.
// ABOUTME: Combines formula expectations with hit/crit odds; once-per-turn riders land on one attack.

use crate::evaluator::{evaluate, EvalOptions, Rounding};
use crate::parser::parse;
use crate::probability::{AttackOdds, RollMode, DEFAULT_MIN_CRIT};
use crate::reroll::RerollSpec;
use serde::{Deserialize, Serialize};

/// Everything needed to price one creature's attacks for a round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttackProfile {
    /// Attacks made this turn.
    pub num_attacks: i64,
    /// Attack bonus.
    pub to_hit: f64,
    /// Weapon damage, e.g. "1d8 + 4".
    pub damage: String,
    /// Damage added to every attack (e.g. "+10" from Sharpshooter).
    pub per_hit_damage: String,
    /// Damage added once per turn (e.g. Sneak Attack).
    pub per_turn_damage: String,
    /// Attack bonus formula added to every attack (e.g. "1d4" from Bless).
    pub per_hit_to_hit: String,
    /// Attack bonus formula added to the first attack only.
    pub per_turn_to_hit: String,
    /// Target armor class as it appears on the sheet.
    pub armor_class: String,
    pub rounding: Rounding,
    pub roll_mode: RollMode,
    /// Lowest d20 face that crits.
    pub min_crit: u32,
    /// Extra damage dice on a crit (e.g. Brutal Critical).
    pub extra_criticals: u64,
    pub reroll: Option<RerollSpec>,
    /// Damage dealt even on a miss.
    pub miss_damage: f64,
}

impl Default for AttackProfile {
    fn default() -> Self {
        Self {
            num_attacks: 1,
            to_hit: 0.0,
            damage: String::new(),
            per_hit_damage: String::new(),
            per_turn_damage: String::new(),
            per_hit_to_hit: String::new(),
            per_turn_to_hit: String::new(),
            armor_class: "0".to_string(),
            rounding: Rounding::Expected,
            roll_mode: RollMode::Normal,
            min_crit: DEFAULT_MIN_CRIT,
            extra_criticals: 0,
            reroll: None,
            miss_damage: 0.0,
        }
    }
}

/// Intermediate figures of a damage-per-round computation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DprBreakdown {
    pub crit_chance: f64,
    /// Hit chance of the first attack, which carries the per-turn bonus.
    pub first_hit_chance: f64,
    /// Hit chance of every later attack.
    pub later_hit_chance: f64,
    /// Expected damage of the first attack.
    pub first_attack: f64,
    /// Expected damage of all later attacks combined.
    pub later_attacks: f64,
    pub total: f64,
}

/// Read an armor class cell the way a spreadsheet's `parseInt` would: a
/// leading integer with optional sign, ignoring anything after it.
///
/// Blank text is 0. Text with no leading integer is NaN, which then
/// carries through to the final damage figure.
pub fn parse_armor_class(text: &str) -> f64 {
    let text = text.trim_start();
    if text.is_empty() {
        return 0.0;
    }

    let (sign, digits) = match text.as_bytes()[0] {
        b'-' => (-1.0, &text[1..]),
        b'+' => (1.0, &text[1..]),
        _ => (1.0, text),
    };
    let len = digits.bytes().take_while(u8::is_ascii_digit).count();
    if len == 0 {
        return f64::NAN;
    }
    digits[..len]
        .parse::<f64>()
        .map_or(f64::NAN, |value| sign * value)
}

/// Expected damage per round.
pub fn calculate_dpr(profile: &AttackProfile) -> f64 {
    dpr_breakdown(profile).total
}

/// Expected damage per round, with the figures it was built from.
pub fn dpr_breakdown(profile: &AttackProfile) -> DprBreakdown {
    let damage_options = EvalOptions::new()
        .rounding(profile.rounding)
        .reroll(profile.reroll);
    let crit_options = damage_options
        .critical(true)
        .extra_criticals(profile.extra_criticals);
    // To-hit bonuses never double and are never rerolled.
    let to_hit_options = EvalOptions::new().rounding(profile.rounding);

    let damage = Outcome::of(&profile.damage, &damage_options, &crit_options);
    let per_hit = Outcome::of(&profile.per_hit_damage, &damage_options, &crit_options);
    let per_turn = Outcome::of(&profile.per_turn_damage, &damage_options, &crit_options);

    let per_hit_to_hit = evaluate(&parse(&profile.per_hit_to_hit), &to_hit_options);
    let per_turn_to_hit = evaluate(&parse(&profile.per_turn_to_hit), &to_hit_options);
    let armor_class = parse_armor_class(&profile.armor_class);

    let first_odds = AttackOdds::new(
        profile.to_hit + per_hit_to_hit + per_turn_to_hit,
        armor_class,
        profile.roll_mode,
        profile.min_crit,
    );
    let first_attack = first_odds.expected_damage(
        damage.hit + per_hit.hit + per_turn.hit,
        damage.crit + per_hit.crit + per_turn.crit,
        profile.miss_damage,
    );

    let later_odds = AttackOdds::new(
        profile.to_hit + per_hit_to_hit,
        armor_class,
        profile.roll_mode,
        profile.min_crit,
    );
    let later_count = profile.num_attacks.saturating_sub(1).max(0);
    let later_attacks = if later_count > 0 {
        later_count as f64
            * later_odds.expected_damage(
                damage.hit + per_hit.hit,
                damage.crit + per_hit.crit,
                profile.miss_damage,
            )
    } else {
        0.0
    };

    let breakdown = DprBreakdown {
        crit_chance: first_odds.crit,
        first_hit_chance: first_odds.hit,
        later_hit_chance: later_odds.hit,
        first_attack,
        later_attacks,
        total: first_attack + later_attacks,
    };
    tracing::debug!(
        attacks = profile.num_attacks,
        armor_class,
        crit = breakdown.crit_chance,
        first_hit = breakdown.first_hit_chance,
        total = breakdown.total,
        "computed damage per round"
    );
    breakdown
}

/// Normal and critical value of one damage formula.
struct Outcome {
    hit: f64,
    crit: f64,
}

impl Outcome {
    fn of(input: &str, normal: &EvalOptions, critical: &EvalOptions) -> Self {
        let formula = parse(input);
        Self {
            hit: evaluate(&formula, normal),
            crit: evaluate(&formula, critical),
        }
    }
}
