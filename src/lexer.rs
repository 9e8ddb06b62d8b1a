//! Pull-based lexer: one operation, "produce the next token".
//!
//! Instead of the original's absolute-seek stream lookahead, characters
//! are buffered once up front and addressed by index — the external
//! contract (line/column tracking, recognition order) is unchanged.

use crate::error::{Diagnostic, Result};
use crate::token::{Position, Token, TokenKind};

/// Longest reserved multi-character form the lexer needs to peek ahead for
/// (`readstr(` / `readint(` / `println(`).
const PEEK_WINDOW: usize = 8;

pub struct Lexer {
    chars: Vec<char>,
    idx: usize,
    line: u32,
    column: u32,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            idx: 0,
            line: 1,
            column: 1,
        }
    }

    fn here(&self) -> Position {
        Position::new(self.line, self.column)
    }

    fn peek_char(&self) -> Option<char> {
        self.chars.get(self.idx).copied()
    }

    fn peek_str(&self, n: usize) -> String {
        self.chars
            .iter()
            .skip(self.idx)
            .take(n)
            .collect()
    }

    /// Consume and return the current character, advancing line/column.
    fn bump(&mut self) -> Option<char> {
        let ch = self.peek_char()?;
        self.idx += 1;
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    fn fixed(&mut self, kind: TokenKind, lexeme: &str, consume: usize) -> Token {
        let pos = self.here();
        for _ in 0..consume {
            self.bump();
        }
        Token::new(kind, lexeme, pos)
    }

    fn skip_to_eol(&mut self) {
        while let Some(ch) = self.peek_char() {
            if ch == '\n' {
                break;
            }
            self.bump();
        }
    }

    fn skip_block_comment(&mut self) -> Result<()> {
        let start = self.here();
        loop {
            if self.peek_str(2) == "*/" {
                self.bump();
                self.bump();
                return Ok(());
            }
            if self.bump().is_none() {
                return Err(Diagnostic::new("unterminated block comment", start));
            }
        }
    }

    fn lex_int(&mut self) -> Token {
        let pos = self.here();
        let mut s = String::new();
        while let Some(ch) = self.peek_char() {
            if !ch.is_ascii_digit() {
                break;
            }
            s.push(ch);
            self.bump();
        }
        Token::new(TokenKind::Int, s, pos)
    }

    fn lex_identifier(&mut self) -> Token {
        let pos = self.here();
        let mut s = String::new();
        while let Some(ch) = self.peek_char() {
            if !(ch.is_alphanumeric() || ch == '_') {
                break;
            }
            s.push(ch);
            self.bump();
        }
        Token::new(TokenKind::Id, s, pos)
    }

    fn lex_string(&mut self, end_char: char) -> Result<Token> {
        let pos = self.here();
        self.bump(); // opening quote
        let mut s = String::new();
        let mut escaped = false;
        loop {
            match self.peek_char() {
                None => return Err(Diagnostic::new("unexpected end of stream", self.here())),
                Some('\n') => {
                    return Err(Diagnostic::new(
                        "encountered new line character in string",
                        self.here(),
                    ))
                }
                Some(ch) => {
                    self.bump();
                    if escaped {
                        s.push(ch);
                        escaped = false;
                    } else if ch == end_char {
                        break;
                    } else if ch == '\\' {
                        escaped = true;
                    } else {
                        s.push(ch);
                    }
                }
            }
        }
        Ok(Token::new(TokenKind::String, s, pos))
    }

    /// Produce the next token, consuming it from the stream.
    pub fn next_token(&mut self) -> Result<Token> {
        loop {
            let window = self.peek_str(PEEK_WINDOW);

            if window.is_empty() {
                return Ok(Token::eos(self.here()));
            }
            if window.starts_with("//") {
                self.skip_to_eol();
                continue;
            }
            if window.starts_with("/*") {
                self.skip_block_comment()?;
                continue;
            }

            if window.starts_with("println(") {
                return Ok(self.fixed(TokenKind::Println, "println", 7));
            }
            if window.starts_with("readstr(") {
                return Ok(self.fixed(TokenKind::Readstr, "readstr", 7));
            }
            if window.starts_with("readint(") {
                return Ok(self.fixed(TokenKind::Readint, "readint", 7));
            }
            if window.starts_with("print(") {
                return Ok(self.fixed(TokenKind::Print, "print", 5));
            }
            if window.starts_with("len(") {
                return Ok(self.fixed(TokenKind::Len, "len", 3));
            }

            if window.starts_with("==") {
                return Ok(self.fixed(TokenKind::Equal, "==", 2));
            }
            if window.starts_with("<=") {
                return Ok(self.fixed(TokenKind::LessThanEqual, "<=", 2));
            }
            if window.starts_with(">=") {
                return Ok(self.fixed(TokenKind::GreaterThanEqual, ">=", 2));
            }
            if window.starts_with("!=") {
                return Ok(self.fixed(TokenKind::NotEqual, "!=", 2));
            }
            if window.starts_with('<') {
                return Ok(self.fixed(TokenKind::LessThan, "<", 1));
            }
            if window.starts_with('>') {
                return Ok(self.fixed(TokenKind::GreaterThan, ">", 1));
            }

            if window.starts_with("else if") {
                return Ok(self.fixed(TokenKind::Elseif, "elseif", 7));
            }
            if window.starts_with("while") {
                return Ok(self.fixed(TokenKind::While, "while", 5));
            }
            if window.starts_with("else") {
                return Ok(self.fixed(TokenKind::Else, "else", 4));
            }
            if window.starts_with("not") {
                return Ok(self.fixed(TokenKind::Not, "not", 3));
            }
            if window.starts_with("and") {
                return Ok(self.fixed(TokenKind::And, "and", 3));
            }
            if window.starts_with("if") {
                return Ok(self.fixed(TokenKind::If, "if", 2));
            }
            if window.starts_with("or") {
                return Ok(self.fixed(TokenKind::Or, "or", 2));
            }

            if window.starts_with('+') {
                return Ok(self.fixed(TokenKind::Plus, "+", 1));
            }
            if window.starts_with('-') {
                return Ok(self.fixed(TokenKind::Minus, "-", 1));
            }
            if window.starts_with('/') {
                return Ok(self.fixed(TokenKind::Divide, "/", 1));
            }
            if window.starts_with('*') {
                return Ok(self.fixed(TokenKind::Multiply, "*", 1));
            }
            if window.starts_with('%') {
                return Ok(self.fixed(TokenKind::Modulus, "%", 1));
            }
            if window.starts_with('=') {
                return Ok(self.fixed(TokenKind::Assign, "=", 1));
            }

            if window.starts_with(',') {
                return Ok(self.fixed(TokenKind::Comma, ",", 1));
            }
            if window.starts_with(';') {
                return Ok(self.fixed(TokenKind::Semicolon, ";", 1));
            }
            if window.starts_with('(') {
                return Ok(self.fixed(TokenKind::Lparen, "(", 1));
            }
            if window.starts_with(')') {
                return Ok(self.fixed(TokenKind::Rparen, ")", 1));
            }
            if window.starts_with('[') {
                return Ok(self.fixed(TokenKind::Lbracket, "[", 1));
            }
            if window.starts_with(']') {
                return Ok(self.fixed(TokenKind::Rbracket, "]", 1));
            }
            if window.starts_with('{') {
                return Ok(self.fixed(TokenKind::Lbrace, "{", 1));
            }
            if window.starts_with('}') {
                return Ok(self.fixed(TokenKind::Rbrace, "}", 1));
            }

            if window.starts_with("true") {
                return Ok(self.fixed(TokenKind::Bool, "true", 4));
            }
            if window.starts_with("false") {
                return Ok(self.fixed(TokenKind::Bool, "false", 5));
            }

            let first = window.chars().next().expect("window is non-empty");

            if first.is_ascii_digit() {
                return Ok(self.lex_int());
            }
            if first == '"' || first == '\'' {
                return self.lex_string(first);
            }
            if first.is_alphabetic() {
                return Ok(self.lex_identifier());
            }
            if first.is_whitespace() {
                self.bump();
                continue;
            }

            let pos = self.here();
            return Err(Diagnostic::new(
                format!("encountered unexpected character: '{first}'"),
                pos,
            ));
        }
    }

    /// A zero-length "does not exist" sentinel at the current position,
    /// used to represent an omitted list index (`a[] = x`).
    pub fn dne_token(&self) -> Token {
        Token::dne(self.here())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        let mut lexer = Lexer::new(src);
        let mut out = Vec::new();
        loop {
            let tok = lexer.next_token().expect("lex ok");
            let done = tok.kind == TokenKind::Eos;
            out.push(tok.kind);
            if done {
                break;
            }
        }
        out
    }

    #[test]
    fn builtins_require_trailing_paren() {
        assert_eq!(
            kinds("println(1);"),
            vec![
                TokenKind::Println,
                TokenKind::Lparen,
                TokenKind::Int,
                TokenKind::Rparen,
                TokenKind::Semicolon,
                TokenKind::Eos,
            ]
        );
    }

    #[test]
    fn else_if_collapses_to_single_token() {
        assert_eq!(
            kinds("else if"),
            vec![TokenKind::Elseif, TokenKind::Eos]
        );
    }

    #[test]
    fn relational_two_char_before_one_char() {
        assert_eq!(
            kinds("<= < >= > == !="),
            vec![
                TokenKind::LessThanEqual,
                TokenKind::LessThan,
                TokenKind::GreaterThanEqual,
                TokenKind::GreaterThan,
                TokenKind::Equal,
                TokenKind::NotEqual,
                TokenKind::Eos,
            ]
        );
    }

    #[test]
    fn line_comment_consumed_to_eol() {
        assert_eq!(kinds("1 // comment\n2"), vec![TokenKind::Int, TokenKind::Int, TokenKind::Eos]);
    }

    #[test]
    fn block_comment_terminator_is_fully_consumed() {
        // A regression for the "closing */ leaks as / *" bug: after the
        // comment there must be nothing but the next real token.
        assert_eq!(kinds("/* x */ 1"), vec![TokenKind::Int, TokenKind::Eos]);
    }

    #[test]
    fn string_with_escape() {
        let mut lexer = Lexer::new(r#""a\"b""#);
        let tok = lexer.next_token().unwrap();
        assert_eq!(tok.kind, TokenKind::String);
        assert_eq!(tok.lexeme.as_str(), "a\"b");
    }

    #[test]
    fn unterminated_string_errors() {
        let mut lexer = Lexer::new("\"abc");
        assert!(lexer.next_token().is_err());
    }

    #[test]
    fn newline_in_string_errors() {
        let mut lexer = Lexer::new("\"abc\ndef\"");
        assert!(lexer.next_token().is_err());
    }

    #[test]
    fn positions_are_one_based_and_track_lines() {
        let mut lexer = Lexer::new("x\ny");
        let first = lexer.next_token().unwrap();
        assert_eq!((first.line(), first.column()), (1, 1));
        let second = lexer.next_token().unwrap();
        assert_eq!((second.line(), second.column()), (2, 1));
    }
}
