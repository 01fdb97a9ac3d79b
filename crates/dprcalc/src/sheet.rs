// ABOUTME: Header-addressed cell grid for spreadsheet exports.
// ABOUTME: Looks cells up by column name and reads rows into attack and spell profiles.

use crate::dpr::AttackProfile;
use crate::error::{Error, Result};
use crate::evaluator::Rounding;
use crate::probability::RollMode;
use crate::reroll::RerollSpec;
use crate::spell::SpellProfile;
use serde::Deserialize;
use std::fmt;

static EMPTY: Cell = Cell::Empty;

/// Column headers recognised when reading profiles.
pub mod columns {
    pub const ATTACKS: &str = "Attacks";
    pub const TO_HIT: &str = "To Hit";
    pub const DAMAGE: &str = "Damage";
    pub const PER_HIT_DAMAGE: &str = "Per Hit Damage";
    pub const PER_TURN_DAMAGE: &str = "Per Turn Damage";
    pub const PER_HIT_TO_HIT: &str = "Per Hit To Hit";
    pub const PER_TURN_TO_HIT: &str = "Per Turn To Hit";
    pub const ARMOR_CLASS: &str = "AC";
    pub const MIN_DAMAGE: &str = "Min Damage";
    pub const MAX_DAMAGE: &str = "Max Damage";
    pub const ADVANTAGE: &str = "Advantage";
    pub const DISADVANTAGE: &str = "Disadvantage";
    pub const MIN_CRIT: &str = "Min Crit";
    pub const ELVEN_ACCURACY: &str = "Elven Accuracy";
    pub const EXTRA_CRITS: &str = "Extra Crits";
    pub const REROLL_COUNT: &str = "Reroll Count";
    pub const REROLL_FIND: &str = "Reroll Find";
    pub const REROLL_REPLACE: &str = "Reroll Replace";
    pub const MISS_DAMAGE: &str = "Miss Damage";
    pub const SAVE_DC: &str = "Save DC";
    pub const NO_DAMAGE_ON_SAVE: &str = "No Damage On Save";
    pub const EXPECTED_SAVE: &str = "Expected Save";
    pub const TARGETS: &str = "Targets";
}

/// One spreadsheet cell as exported.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    #[default]
    Empty,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(text) => text.trim().is_empty(),
            _ => false,
        }
    }

    /// The cell as formula text. Numbers print the way a sheet shows them.
    pub fn text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Bool(true) => "TRUE".to_string(),
            Cell::Bool(false) => "FALSE".to_string(),
            Cell::Number(n) => n.to_string(),
            Cell::Text(text) => text.clone(),
        }
    }

    fn number(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => Some(*n),
            Cell::Text(text) => text.trim().parse().ok(),
            Cell::Bool(_) | Cell::Empty => None,
        }
    }

    fn flag(&self) -> Option<bool> {
        match self {
            Cell::Bool(b) => Some(*b),
            Cell::Number(n) => Some(*n != 0.0),
            Cell::Text(text) => match text.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "x" => Some(true),
                "false" | "no" | "" => Some(false),
                _ => None,
            },
            Cell::Empty => Some(false),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => write!(f, "an empty cell"),
            Cell::Text(text) => write!(f, "'{}'", text),
            other => write!(f, "{}", other.text()),
        }
    }
}

/// A grid of cells with one header row.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Sheet {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Sheet {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        Self { headers, rows }
    }

    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of the column with this header. Case and surrounding whitespace
    /// are ignored.
    pub fn column(&self, name: &str) -> Result<usize> {
        self.headers
            .iter()
            .position(|header| header.trim().eq_ignore_ascii_case(name.trim()))
            .ok_or_else(|| Error::UnknownColumn(name.to_string()))
    }

    /// The cell at `row` under header `name`. Short rows read as empty.
    pub fn cell(&self, row: usize, name: &str) -> Result<&Cell> {
        let column = self.column(name)?;
        let cells = self.rows.get(row).ok_or(Error::RowOutOfRange {
            row,
            len: self.rows.len(),
        })?;
        Ok(cells.get(column).unwrap_or(&EMPTY))
    }

    /// Read a weapon-attack row. Only the damage column is required.
    pub fn attack_profile(&self, row: usize) -> Result<AttackProfile> {
        use self::columns::*;

        let defaults = AttackProfile::default();
        let reroll_count = self.number_or(row, REROLL_COUNT, 0.0)?;
        let reroll = if reroll_count > 0.0 {
            Some(RerollSpec {
                count: reroll_count as u64,
                find_value: self.optional_number(row, REROLL_FIND)?,
                replace_value: self.optional_number(row, REROLL_REPLACE)?,
            })
        } else {
            None
        };

        Ok(AttackProfile {
            num_attacks: self.number_or(row, ATTACKS, defaults.num_attacks as f64)? as i64,
            to_hit: self.number_or(row, TO_HIT, defaults.to_hit)?,
            damage: self.cell(row, DAMAGE)?.text(),
            per_hit_damage: self.text_or_empty(row, PER_HIT_DAMAGE)?,
            per_turn_damage: self.text_or_empty(row, PER_TURN_DAMAGE)?,
            per_hit_to_hit: self.text_or_empty(row, PER_HIT_TO_HIT)?,
            per_turn_to_hit: self.text_or_empty(row, PER_TURN_TO_HIT)?,
            armor_class: match self.optional(row, ARMOR_CLASS)? {
                Some(cell) => cell.text(),
                None => defaults.armor_class,
            },
            rounding: Rounding::from_flags(
                self.flag(row, MIN_DAMAGE)?,
                self.flag(row, MAX_DAMAGE)?,
            ),
            roll_mode: RollMode::from_flags(
                self.flag(row, ADVANTAGE)?,
                self.flag(row, DISADVANTAGE)?,
                self.flag(row, ELVEN_ACCURACY)?,
            ),
            min_crit: self.number_or(row, MIN_CRIT, f64::from(defaults.min_crit))? as u32,
            extra_criticals: self.number_or(row, EXTRA_CRITS, 0.0)? as u64,
            reroll,
            miss_damage: self.number_or(row, MISS_DAMAGE, defaults.miss_damage)?,
        })
    }

    /// Read a saving-throw spell row. Damage and save DC are required.
    pub fn spell_profile(&self, row: usize) -> Result<SpellProfile> {
        use self::columns::*;

        let save_dc = self.cell(row, SAVE_DC)?;
        let save_dc = save_dc.number().ok_or_else(|| Error::InvalidCell {
            column: SAVE_DC.to_string(),
            expected: "a number",
            found: save_dc.to_string(),
        })?;

        Ok(SpellProfile {
            save_dc,
            damage: self.cell(row, DAMAGE)?.text(),
            per_hit_damage: self.text_or_empty(row, PER_HIT_DAMAGE)?,
            per_turn_damage: self.text_or_empty(row, PER_TURN_DAMAGE)?,
            no_damage_on_save: self.flag(row, NO_DAMAGE_ON_SAVE)?,
            expected_save: self.number_or(row, EXPECTED_SAVE, 0.0)?,
            targets: self.number_or(row, TARGETS, 1.0)? as u32,
        })
    }

    /// The cell, or `None` when the column is absent or the cell is blank.
    fn optional(&self, row: usize, name: &str) -> Result<Option<&Cell>> {
        match self.cell(row, name) {
            Ok(cell) if cell.is_empty() => Ok(None),
            Ok(cell) => Ok(Some(cell)),
            Err(Error::UnknownColumn(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn text_or_empty(&self, row: usize, name: &str) -> Result<String> {
        Ok(self
            .optional(row, name)?
            .map(Cell::text)
            .unwrap_or_default())
    }

    fn optional_number(&self, row: usize, name: &str) -> Result<Option<f64>> {
        let Some(cell) = self.optional(row, name)? else {
            return Ok(None);
        };
        cell.number().map(Some).ok_or_else(|| Error::InvalidCell {
            column: name.to_string(),
            expected: "a number",
            found: cell.to_string(),
        })
    }

    fn number_or(&self, row: usize, name: &str, default: f64) -> Result<f64> {
        Ok(self.optional_number(row, name)?.unwrap_or(default))
    }

    fn flag(&self, row: usize, name: &str) -> Result<bool> {
        let Some(cell) = self.optional(row, name)? else {
            return Ok(false);
        };
        cell.flag().ok_or_else(|| Error::InvalidCell {
            column: name.to_string(),
            expected: "TRUE or FALSE",
            found: cell.to_string(),
        })
    }
}
