//! Koy CLI

use clap::{Parser, Subcommand};
use koy::error::{report_error, CompileError};
use koy::interp::Interpreter;
use std::path::PathBuf;
use std::sync::Once;

#[derive(Parser)]
#[command(name = "koy", version, about = "Koy - a small dynamically typed scripting language")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a Koy program (calls `main`)
    Run {
        /// Source file to run
        file: PathBuf,
    },
    /// Evaluate statements given on the command line
    Eval {
        /// Statements, e.g. "println(1 + 2);"
        source: String,
    },
    /// Parse and dump AST as JSON (debug)
    Parse {
        /// Source file to parse
        file: PathBuf,
    },
    /// Tokenize and dump tokens (debug)
    Tokens {
        /// Source file to tokenize
        file: PathBuf,
    },
    /// Start an interactive session
    Repl,
}

static TRACING_INIT: Once = Once::new();

/// Install a stderr subscriber when RUST_LOG is set
fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(true)
                        .with_level(true),
                )
                .with(filter)
                .init();
        }
    });
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Run { file } => run_file(&file),
        Command::Eval { source } => eval_source(&source),
        Command::Parse { file } => parse_file(&file),
        Command::Tokens { file } => tokenize_file(&file),
        Command::Repl => start_repl(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

/// Render a front-end error against its source and exit
fn fail_compile(filename: &str, source: &str, err: &CompileError) -> ! {
    report_error(filename, source, err);
    std::process::exit(1);
}

fn run_file(path: &PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let source = std::fs::read_to_string(path)?;
    let filename = path.display().to_string();

    let program = koy::lexer::tokenize(&source)
        .and_then(|tokens| koy::parser::parse(&source, tokens))
        .unwrap_or_else(|err| fail_compile(&filename, &source, &err));

    let mut interpreter = Interpreter::new();
    match interpreter.call_main(&program) {
        Ok(value) => {
            if !value.is_nil() {
                println!("{value}");
            }
            Ok(())
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    }
}

fn eval_source(source: &str) -> Result<(), Box<dyn std::error::Error>> {
    let lines = koy::parser::parse_statements(source)
        .unwrap_or_else(|err| fail_compile("<eval>", source, &err));

    let mut interpreter = Interpreter::new();
    match interpreter.interpret_statements(&lines) {
        Ok(value) => {
            if !value.is_nil() {
                println!("{value}");
            }
            Ok(())
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    }
}

fn parse_file(path: &PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let source = std::fs::read_to_string(path)?;

    let tokens = koy::lexer::tokenize(&source)?;
    let ast = koy::parser::parse(&source, tokens)?;

    println!("{}", serde_json::to_string_pretty(&ast)?);
    Ok(())
}

fn tokenize_file(path: &PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let source = std::fs::read_to_string(path)?;

    let tokens = koy::lexer::tokenize(&source)?;
    for (tok, span) in &tokens {
        println!("{:?} @ {}..{}", tok, span.start, span.end);
    }

    Ok(())
}

fn start_repl() -> Result<(), Box<dyn std::error::Error>> {
    let mut repl = koy::repl::Repl::new()?;
    repl.run()?;
    Ok(())
}
