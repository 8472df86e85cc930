//! loxt - REPL and script runner for the Lox interpreter (§6).
//!
//! `loxt` with no arguments starts a REPL (prompt, read a line, run it,
//! repeat until EOF). `loxt <path>` reads and runs a script once. Any
//! other invocation is a usage error.

mod config;
mod error;

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use lox_driver::{Driver, RunOutcome};
use lox_par::print_program;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use config::Config;
use error::Result;

/// A tree-walking Lox interpreter.
#[derive(Parser, Debug)]
#[command(name = "loxt")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "A tree-walking Lox interpreter", long_about = None)]
#[command(override_usage = "loxt [script]")]
struct Cli {
    /// Script to run. Omit to start the REPL.
    script: Option<PathBuf>,

    /// Enable verbose logging.
    #[arg(short, long, global = true, env = "LOXT_VERBOSE")]
    verbose: bool,

    /// Path to a loxt.toml config file (default: ./loxt.toml if present).
    #[arg(long, global = true, env = "LOXT_CONFIG")]
    config: Option<PathBuf>,

    /// Print the parsed AST instead of running the script.
    #[arg(long)]
    print_ast: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("loxt: {err}");
            return ExitCode::FAILURE;
        }
    };

    init_logging(cli.verbose || config.trace);

    let mut driver = Driver::new();
    let outcome = match &cli.script {
        Some(path) if cli.print_ast => print_ast(path),
        Some(path) => run_file(&mut driver, path),
        None => run_repl(&mut driver, &config),
    };

    match outcome {
        Ok(code) => exit_code(code),
        Err(err) => {
            eprintln!("loxt: {err}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose { EnvFilter::new("debug") } else { EnvFilter::new("info") };
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_thread_ids(false).with_thread_names(false))
        .try_init();
}

fn load_config(path: Option<&std::path::Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load_from_path(path),
        None => Config::load(),
    }
}

/// Reads and runs `path` once, rendering diagnostics to stderr and
/// program output to stdout.
fn run_file(driver: &mut Driver, path: &std::path::Path) -> Result<i32> {
    let outcome = driver.run_file(path, |line| println!("{line}"))?;
    report(&outcome);
    Ok(outcome.exit_code())
}

/// Reads `path`, parses it, and prints the AST without resolving or
/// running it (`--print-ast`, a debugging aid supplementing §6).
fn print_ast(path: &std::path::Path) -> Result<i32> {
    let source = std::fs::read_to_string(path)?;
    let driver = Driver::new();
    match driver.parse_only(&source) {
        Ok(program) => {
            println!("{}", print_program(&program));
            Ok(0)
        }
        Err(diagnostics) => {
            for diagnostic in &diagnostics {
                eprintln!("{diagnostic}");
            }
            Ok(65)
        }
    }
}

/// The REPL (§6): prompt, read one line, run it as its own unit, repeat
/// until EOF. A runtime error aborts only that line; the REPL continues.
fn run_repl(driver: &mut Driver, config: &Config) -> Result<i32> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{}", config.prompt);
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        let line = line.trim_end();
        if line.is_empty() {
            continue;
        }

        let (outcome, echoed) = driver.run_line(line, config.echo_expr_results, |out| println!("{out}"));
        report(&outcome);
        if let Some(value) = echoed {
            println!("{value}");
        }
    }

    Ok(0)
}

fn report(outcome: &RunOutcome) {
    match outcome {
        RunOutcome::Success => {}
        RunOutcome::StaticError(diagnostics) => {
            for diagnostic in diagnostics {
                eprintln!("{diagnostic}");
            }
        }
        RunOutcome::RuntimeError(err) => eprintln!("{err}"),
    }
}

fn exit_code(code: i32) -> ExitCode {
    match u8::try_from(code) {
        Ok(code) => ExitCode::from(code),
        Err(_) => ExitCode::FAILURE,
    }
}
