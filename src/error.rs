//! Unified positioned diagnostic for the lex/parse/type/runtime phases.

use crate::token::Position;
use std::error::Error as StdError;
use std::fmt;

/// A single positioned diagnostic. All four error kinds from spec.md §7
/// share one wire format, so they share one type rather than four.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    message: String,
    pos: Position,
}

impl Diagnostic {
    pub fn new(message: impl Into<String>, pos: Position) -> Self {
        Self {
            message: message.into(),
            pos,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn position(&self) -> Position {
        self.pos
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "error: {} at line {} column {}",
            self.message,
            self.pos.line(),
            self.pos.column()
        )
    }
}

impl StdError for Diagnostic {}

pub type Result<T> = std::result::Result<T, Diagnostic>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_exact_wire_format() {
        let d = Diagnostic::new("undefined variable 'y'", Position::new(1, 5));
        assert_eq!(d.to_string(), "error: undefined variable 'y' at line 1 column 5");
    }
}
