// ABOUTME: Scanner for damage formulas.
// ABOUTME: Pulls operator-prefixed numeric terms out of free text like "1d6 fire + 4".

use crate::ast::{Op, Operand, Term};

/// A left-to-right scanner over a formula.
///
/// Each term is an optional operator (start of line, a space, or one of
/// `+ - * / ^ × ÷`), optional whitespace, an integer, and optionally a `d`
/// followed by a side count. Text that does not form a term is skipped one
/// character at a time, so annotations like "sneak attack 3d6" are tolerated.
pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    /// Create a new scanner for the given input.
    pub fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    /// Get the current byte position in the input.
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Get the next term, or `None` once the input is exhausted.
    pub fn next_term(&mut self) -> Option<Term> {
        while let Some(ch) = self.input[self.pos..].chars().next() {
            let start = self.pos;
            if let Some((term, end)) = self.term_at(start) {
                self.pos = end;
                return Some(term);
            }
            self.pos = start + ch.len_utf8();
        }
        None
    }

    fn term_at(&self, start: usize) -> Option<(Term, usize)> {
        // Start of line wins over an operator at the same spot.
        if self.at_line_start(start) {
            if let Some((operand, len)) = operand(&self.input[start..]) {
                return Some((Term { op: None, operand }, start + len));
            }
        }

        let ch = self.input[start..].chars().next()?;
        let op = Op::from_char(ch)?;
        let after = start + ch.len_utf8();
        let (operand, len) = operand(&self.input[after..])?;
        Some((
            Term {
                op: Some(op),
                operand,
            },
            after + len,
        ))
    }

    fn at_line_start(&self, pos: usize) -> bool {
        pos == 0 || self.input[..pos].ends_with(|c: char| c == '\n' || c == '\r')
    }
}

impl Iterator for Lexer<'_> {
    type Item = Term;

    fn next(&mut self) -> Option<Term> {
        self.next_term()
    }
}

/// Match `\s*(\d+)d?(\d*)` at the start of `s`, returning the operand and the
/// number of bytes consumed.
fn operand(s: &str) -> Option<(Operand, usize)> {
    let trimmed = s.trim_start();
    let mut len = s.len() - trimmed.len();

    let (count, digits) = number(trimmed)?;
    len += digits;

    let rest = &s[len..];
    if !rest.starts_with('d') {
        return Some((Operand::Flat(count), len));
    }
    len += 1;

    match number(&s[len..]) {
        Some((sides, digits)) => Some((Operand::Dice { count, sides }, len + digits)),
        None => Some((Operand::Flat(count), len)),
    }
}

/// Parse a leading run of ASCII digits. Saturates instead of overflowing.
fn number(s: &str) -> Option<(u64, usize)> {
    let digits = s.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let value = s.as_bytes()[..digits].iter().fold(0u64, |acc, b| {
        acc.saturating_mul(10).saturating_add(u64::from(b - b'0'))
    });
    Some((value, digits))
}
