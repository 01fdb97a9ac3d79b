// ABOUTME: Closed-form expectation for dice that reroll low results.
// ABOUTME: Covers Great Weapon Fighting, Piercer and similar "reroll 1s and 2s" features.

use serde::{Deserialize, Serialize};

/// Which dice of a term may be rerolled, and how.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RerollSpec {
    /// Number of dice in a term that may be rerolled. Critical dice count.
    pub count: u64,
    /// Highest face that is rerolled. Defaults to half the die.
    pub find_value: Option<f64>,
    /// Fixed value used in place of the reroll. Defaults to the die's average.
    pub replace_value: Option<f64>,
}

impl RerollSpec {
    pub fn new(count: u64) -> Self {
        Self {
            count,
            ..Self::default()
        }
    }

    pub fn find_value(mut self, value: f64) -> Self {
        self.find_value = Some(value);
        self
    }

    pub fn replace_value(mut self, value: f64) -> Self {
        self.replace_value = Some(value);
        self
    }
}

/// Average roll of a single die.
pub fn die_average(sides: u64) -> f64 {
    (sides as f64 + 1.0) / 2.0
}

/// Expected value of `count` dice of `sides` faces where every roll at or
/// below `max_reroll` is rerolled once.
///
/// A `max_reroll` below 1 is a fraction of the die, so `0.5` on a d6 means
/// "reroll 1 to 3". The reroll is worth `reroll_value` when given, otherwise
/// the die's average. With `incremental` the die's plain average is
/// subtracted, giving a correction to add on top of a normal expectation.
pub fn expected_rerolled(
    sides: u64,
    incremental: bool,
    max_reroll: f64,
    count: u64,
    reroll_value: Option<f64>,
) -> f64 {
    let n = sides as f64;
    let average = die_average(sides);
    let threshold = if max_reroll < 1.0 {
        max_reroll * n
    } else {
        max_reroll
    };
    let rerolled_faces = threshold.floor().clamp(0.0, n);

    let reroll_chance = rerolled_faces / n;
    let kept = face_sum(rerolled_faces + 1.0, n);
    let rerolled = reroll_chance * reroll_value.unwrap_or(average) + kept / n;

    let per_die = if incremental {
        rerolled - average
    } else {
        rerolled
    };
    count as f64 * per_die
}

/// Sum of the integers `low..=high`, zero when the range is empty.
fn face_sum(low: f64, high: f64) -> f64 {
    if high < low {
        return 0.0;
    }
    (low + high) * (high - low + 1.0) / 2.0
}
