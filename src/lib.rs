//! Pika: lexer, parser, type checker, and tree-walking interpreter for
//! a small imperative scripting language.

pub mod ast;
pub mod error;
pub mod interpreter;
pub mod lexer;
pub mod parser;
pub mod scope;
pub mod token;
pub mod typeck;
pub mod value;

use std::io::{BufRead, Write};

pub use ast::Program;
pub use error::{Diagnostic, Result};

use interpreter::Interpreter;
use typeck::TypeChecker;

/// Lex the full source, for tooling (`pika lex`) that just wants the
/// token stream rather than a tree.
pub fn lex(source: &str) -> Result<Vec<token::Token>> {
    let mut lexer = lexer::Lexer::new(source);
    let mut tokens = Vec::new();
    loop {
        let tok = lexer.next_token()?;
        let done = tok.kind == token::TokenKind::Eos;
        tokens.push(tok);
        if done {
            break;
        }
    }
    Ok(tokens)
}

/// Parse source into a `Program`, without type-checking or running it.
pub fn parse(source: &str) -> Result<Program> {
    parser::parse(source)
}

/// Parse and type-check source, without running it.
pub fn typecheck(source: &str) -> Result<Program> {
    let program = parse(source)?;
    TypeChecker::new().check_program(&program)?;
    Ok(program)
}

/// Run the full pipeline (lex -> parse -> type-check -> interpret)
/// against arbitrary I/O ports.
pub fn run_source(source: &str, stdin: &mut dyn BufRead, stdout: &mut dyn Write) -> Result<()> {
    let program = typecheck(source)?;
    Interpreter::new(stdin, stdout).run(&program)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn full_pipeline_runs_a_small_program() {
        let mut stdin = Cursor::new(Vec::new());
        let mut stdout = Vec::new();
        let result = run_source("println(1 + 1);", &mut stdin, &mut stdout);
        assert!(result.is_ok());
        assert_eq!(String::from_utf8(stdout).unwrap(), "2\n");
    }

    #[test]
    fn type_errors_surface_before_interpretation_runs() {
        let mut stdin = Cursor::new(Vec::new());
        let mut stdout = Vec::new();
        let result = run_source(r#"x = "a" - 1;"#, &mut stdin, &mut stdout);
        assert!(result.is_err());
        assert!(stdout.is_empty());
    }
}
