// ABOUTME: Error types for the dprcalc library.
// ABOUTME: Calculations never fail; these cover reading profiles out of sheet data.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Unknown column '{0}'")]
    UnknownColumn(String),

    #[error("Row {row} is out of range (sheet has {len} rows)")]
    RowOutOfRange { row: usize, len: usize },

    #[error("Expected {expected} in column '{column}', found {found}")]
    InvalidCell {
        column: String,
        expected: &'static str,
        found: String,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
