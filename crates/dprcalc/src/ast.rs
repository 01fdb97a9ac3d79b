// ABOUTME: Term types for damage formulas.
// ABOUTME: Represents scanned formulas like "1d8 + 4" as a flat sequence of terms.

use std::fmt;

/// A scanned damage formula: terms in the order they appear.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Formula {
    pub terms: Vec<Term>,
}

impl Formula {
    /// Returns true if the scan found nothing numeric.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

/// A single operator-prefixed operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Term {
    /// The operator in front of the operand. `None` means the operand sits at
    /// the start of a line with nothing before it.
    pub op: Option<Op>,
    pub operand: Operand,
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.op {
            Some(op) => write!(f, "{} {}", op, self.operand),
            None => write!(f, "{}", self.operand),
        }
    }
}

/// The numeric part of a term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    /// A bare integer (also "3d", where the side count is missing).
    Flat(u64),
    /// `count` dice of `sides` faces.
    Dice { count: u64, sides: u64 },
}

impl Operand {
    /// True for dice terms. Only these take part in implied addition.
    pub fn is_dice(&self) -> bool {
        matches!(self, Operand::Dice { .. })
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Flat(n) => write!(f, "{}", n),
            Operand::Dice { count, sides } => write!(f, "{}d{}", count, sides),
        }
    }
}

/// The operator captured in front of a term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    /// A plain space: implied addition for dice terms.
    Space,
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

impl Op {
    /// Maps an operator character, including the typographic `×` and `÷`.
    pub fn from_char(ch: char) -> Option<Op> {
        match ch {
            ' ' => Some(Op::Space),
            '+' => Some(Op::Add),
            '-' => Some(Op::Sub),
            '*' | '×' => Some(Op::Mul),
            '/' | '÷' => Some(Op::Div),
            '^' => Some(Op::Pow),
            _ => None,
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Op::Space => write!(f, "_"),
            Op::Add => write!(f, "+"),
            Op::Sub => write!(f, "-"),
            Op::Mul => write!(f, "*"),
            Op::Div => write!(f, "/"),
            Op::Pow => write!(f, "^"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_op_from_char() {
        assert_eq!(Op::from_char('+'), Some(Op::Add));
        assert_eq!(Op::from_char('×'), Some(Op::Mul));
        assert_eq!(Op::from_char('÷'), Some(Op::Div));
        assert_eq!(Op::from_char(' '), Some(Op::Space));
        assert_eq!(Op::from_char(','), None);
        assert_eq!(Op::from_char('\n'), None);
    }

    #[test]
    fn test_term_display() {
        let term = Term {
            op: Some(Op::Sub),
            operand: Operand::Dice { count: 2, sides: 6 },
        };
        assert_eq!(term.to_string(), "- 2d6");

        let term = Term {
            op: None,
            operand: Operand::Flat(4),
        };
        assert_eq!(term.to_string(), "4");
    }
}
