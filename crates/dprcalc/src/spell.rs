// ABOUTME: Expected damage of saving-throw spells.
// ABOUTME: Full damage on a failed save, half (or none) on a success, scaled by target count.

use crate::evaluator::{evaluate, EvalOptions};
use crate::parser::parse;
use serde::{Deserialize, Serialize};

/// A save-for-half (or save-for-none) spell and the targets it hits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpellProfile {
    pub save_dc: f64,
    /// Spell damage, e.g. "8d6".
    pub damage: String,
    pub per_hit_damage: String,
    pub per_turn_damage: String,
    /// Evasion and similar: a successful save takes nothing.
    pub no_damage_on_save: bool,
    /// The targets' saving throw bonus.
    pub expected_save: f64,
    pub targets: u32,
}

impl Default for SpellProfile {
    fn default() -> Self {
        Self {
            save_dc: 0.0,
            damage: String::new(),
            per_hit_damage: String::new(),
            per_turn_damage: String::new(),
            no_damage_on_save: false,
            expected_save: 0.0,
            targets: 1,
        }
    }
}

/// Chance a target fails its save. At least one face, the natural 20,
/// always saves, so this never exceeds 0.95.
pub fn failed_save_chance(save_dc: f64, expected_save: f64) -> f64 {
    let saving_faces = 20.0 - save_dc + expected_save;
    // f64::max would swallow a NaN.
    let saving_faces = if saving_faces.is_nan() {
        saving_faces
    } else {
        saving_faces.max(1.0)
    };
    1.0 - saving_faces / 20.0
}

/// Expected total damage across all targets.
pub fn calculate_spell_damage(spell: &SpellProfile) -> f64 {
    let full_chance = failed_save_chance(spell.save_dc, spell.expected_save);
    let half_chance = if spell.no_damage_on_save {
        0.0
    } else {
        1.0 - full_chance
    };

    let options = EvalOptions::new();
    let full_damage = [&spell.damage, &spell.per_hit_damage, &spell.per_turn_damage]
        .into_iter()
        .map(|input| evaluate(&parse(input), &options))
        .sum::<f64>();

    let total = (full_chance + half_chance * 0.5) * full_damage * f64::from(spell.targets);
    tracing::debug!(
        full_chance,
        full_damage,
        targets = spell.targets,
        total,
        "computed spell damage"
    );
    total
}
