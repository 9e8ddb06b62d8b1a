//! CLI driver: `pika run|lex|parse|ast|typecheck <FILE>`, or a bare
//! `pika <FILE>` as shorthand for `run`.

use std::fs;
use std::io::{self, BufReader, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use log::LevelFilter;

use pika::token::TokenKind;

#[derive(Parser)]
#[command(name = "pika", version, about = "A tiny imperative scripting language")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Script to run; shorthand for `pika run <FILE>`.
    file: Option<PathBuf>,

    /// Trace the pipeline stages on stderr.
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Lex, parse, type-check, and interpret FILE.
    Run { file: PathBuf },
    /// Print every token on its own line.
    Lex { file: PathBuf },
    /// Parse FILE and report success or failure.
    Parse { file: PathBuf },
    /// Parse FILE and pretty-print its AST.
    Ast { file: PathBuf },
    /// Lex, parse, and type-check FILE without running it.
    Typecheck { file: PathBuf },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose { LevelFilter::Debug } else { LevelFilter::Warn };
    let _ = simple_logger::SimpleLogger::new().with_level(level).init();

    let outcome = match cli.command {
        Some(Command::Run { file }) => run_file(&file),
        Some(Command::Lex { file }) => lex_file(&file),
        Some(Command::Parse { file }) => parse_file(&file),
        Some(Command::Ast { file }) => ast_file(&file),
        Some(Command::Typecheck { file }) => typecheck_file(&file),
        None => match cli.file {
            Some(file) => run_file(&file),
            None => {
                eprintln!("usage: pika [run|lex|parse|ast|typecheck] <FILE>");
                return ExitCode::FAILURE;
            }
        },
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            println!("{message}");
            ExitCode::FAILURE
        }
    }
}

fn read_source(path: &PathBuf) -> Result<String, String> {
    fs::read_to_string(path)
        .map_err(|e| format!("error: could not read '{}': {e}", path.display()))
}

fn run_file(path: &PathBuf) -> Result<(), String> {
    let source = read_source(path)?;
    log::debug!("running {}", path.display());
    let stdin = io::stdin();
    let mut reader = BufReader::new(stdin.lock());
    let mut stdout = io::stdout();
    pika::run_source(&source, &mut reader, &mut stdout).map_err(|e| e.to_string())?;
    stdout.flush().ok();
    Ok(())
}

fn lex_file(path: &PathBuf) -> Result<(), String> {
    let source = read_source(path)?;
    log::debug!("lexing {}", path.display());
    let tokens = pika::lex(&source).map_err(|e| e.to_string())?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    for tok in &tokens {
        let _ = writeln!(out, "{tok}");
        if tok.kind == TokenKind::Semicolon {
            let _ = writeln!(out);
        }
    }
    Ok(())
}

fn parse_file(path: &PathBuf) -> Result<(), String> {
    let source = read_source(path)?;
    log::debug!("parsing {}", path.display());
    pika::parse(&source).map_err(|e| e.to_string())?;
    println!("parse: ok");
    Ok(())
}

fn ast_file(path: &PathBuf) -> Result<(), String> {
    let source = read_source(path)?;
    let program = pika::parse(&source).map_err(|e| e.to_string())?;
    println!("{program:#?}");
    Ok(())
}

fn typecheck_file(path: &PathBuf) -> Result<(), String> {
    let source = read_source(path)?;
    log::debug!("type-checking {}", path.display());
    pika::typecheck(&source).map_err(|e| e.to_string())?;
    println!("typecheck: ok");
    Ok(())
}
