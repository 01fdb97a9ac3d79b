// ABOUTME: Formula extraction for damage strings.
// ABOUTME: Drops "==" annotations and collects scanned terms into a Formula.

use crate::ast::Formula;
use crate::lexer::Lexer;

/// Separator between working notes and the formula that counts.
pub const ANNOTATION_SEPARATOR: &str = "==";

/// Returns the part of `input` that is evaluated: everything after the last
/// `==`, or the whole string when there is none.
pub fn formula_body(input: &str) -> &str {
    input.split(ANNOTATION_SEPARATOR).last().unwrap_or(input)
}

/// Scan a damage string into a formula.
///
/// Never fails: text that does not form a term is skipped.
pub fn parse(input: &str) -> Formula {
    Formula {
        terms: Lexer::new(formula_body(input)).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Op, Operand, Term};

    #[test]
    fn test_body_without_separator() {
        assert_eq!(formula_body("1d6 + 4"), "1d6 + 4");
    }

    #[test]
    fn test_body_uses_last_separator() {
        assert_eq!(formula_body("1d6 == 2d6 == 3d6"), " 3d6");
        assert_eq!(formula_body("1d6 =="), "");
    }

    #[test]
    fn test_body_splits_left_to_right() {
        // "===" splits at the first pair, leaving a stray "=".
        assert_eq!(formula_body("1d4 ===1d6"), "=1d6");
        assert!(parse("1d4 ===1d6").is_empty());
        assert_eq!(formula_body("1d4 ====1d6"), "1d6");
    }

    #[test]
    fn test_parse_annotated() {
        let formula = parse("1d6 + 10 sharpshooter\n+ 1d4 favored foe\n==\n1d6 + 1d4 + 10");
        assert_eq!(
            formula.terms,
            vec![
                Term {
                    op: None,
                    operand: Operand::Dice { count: 1, sides: 6 }
                },
                Term {
                    op: Some(Op::Add),
                    operand: Operand::Dice { count: 1, sides: 4 }
                },
                Term {
                    op: Some(Op::Add),
                    operand: Operand::Flat(10)
                },
            ]
        );
    }

    #[test]
    fn test_parse_prose_only() {
        assert!(parse("no damage here").is_empty());
        assert!(parse("").is_empty());
    }
}
