//! lox-driver - pipeline orchestration.
//!
//! ----------------------------------------------------------------------
//! PIPELINE OVERVIEW
//! ----------------------------------------------------------------------
//!
//! A `Driver` runs one "unit" — a whole file, or a single REPL line —
//! through every stage in order, aggregating diagnostics along the way
//! and deciding where the pipeline stops:
//!
//! ```text
//! source text
//!      │
//!      ▼
//! [Lexer]    ──▶ Vec<Token>         (lex errors: reported, lexing continues)
//!      │
//!      ▼
//! [Parser]   ──▶ Program            (parse errors: reported, panic-mode sync)
//!      │
//!      ▼          -- abort here if any lex/parse errors were reported --
//! [Resolver] ──▶ Distances          (static errors: reported, resolving continues)
//!      │
//!      ▼          -- abort here if any static errors were reported --
//! [Evaluator] ──▶ side effects      (runtime error: reported, this unit aborts)
//! ```
//!
//! Only one `Driver` is needed per process: its `Interpreter` carries the
//! global environment forward across calls, so a REPL can feed it one
//! line at a time while later lines still see earlier ones' globals and
//! function/class definitions.

use std::fs;
use std::path::Path;

use lox_lex::Lexer;
use lox_par::{Parser, Program};
use lox_runtime::{Interpreter, RuntimeError};
use lox_sem::{Distances, Resolver};
use lox_util::{Diagnostic, Handler};
use thiserror::Error;

/// Failures that happen outside the language pipeline itself — currently
/// just "the file couldn't be read".
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("couldn't read {path}: {source}")]
    ReadSource { path: String, #[source] source: std::io::Error },
}

/// The result of running one unit through the pipeline (§7).
pub enum RunOutcome {
    /// Every stage completed without reporting an error.
    Success,
    /// The lexer, parser, or resolver reported at least one error; the
    /// unit was never evaluated.
    StaticError(Vec<Diagnostic>),
    /// Evaluation started and then hit a runtime error.
    RuntimeError(RuntimeError),
}

impl RunOutcome {
    /// Process exit code per §6: `0` success, `65` static error, `70`
    /// runtime error.
    pub fn exit_code(&self) -> i32 {
        match self {
            RunOutcome::Success => 0,
            RunOutcome::StaticError(_) => 65,
            RunOutcome::RuntimeError(_) => 70,
        }
    }
}

/// Orchestrates lex → parse → resolve → evaluate for a whole program,
/// holding the one `Interpreter` whose global scope persists across
/// however many units are run through it.
pub struct Driver {
    interpreter: Interpreter,
}

impl Default for Driver {
    fn default() -> Self {
        Self::new()
    }
}

impl Driver {
    pub fn new() -> Self {
        Self { interpreter: Interpreter::new() }
    }

    /// Reads `path` and runs its contents as one unit (§6 "interp <path>").
    pub fn run_file(&mut self, path: &Path, mut on_print: impl FnMut(&str)) -> Result<RunOutcome, DriverError> {
        let source = fs::read_to_string(path)
            .map_err(|source| DriverError::ReadSource { path: path.display().to_string(), source })?;
        Ok(self.run(&source, &mut on_print))
    }

    /// Runs `source` as one unit: a whole file, or a single REPL
    /// submission. `on_print` is called once per `print` statement with
    /// its rendered value; it is the only channel for program output,
    /// kept separate from diagnostics and logging (§2).
    #[tracing::instrument(skip_all)]
    pub fn run(&mut self, source: &str, mut on_print: impl FnMut(&str)) -> RunOutcome {
        let (program, distances) = match self.compile(source) {
            Ok(compiled) => compiled,
            Err(outcome) => return outcome,
        };

        let result = tracing::debug_span!("evaluate")
            .in_scope(|| self.interpreter.interpret(&program, distances, &mut on_print));

        match result {
            Ok(()) => RunOutcome::Success,
            Err(err) => {
                tracing::debug!(%err, "runtime error");
                RunOutcome::RuntimeError(err)
            }
        }
    }

    /// Like [`run`](Self::run), for a single REPL line: when `echo` is
    /// set and the line is a single bare expression statement, its value
    /// is rendered and returned alongside the ordinary outcome (§2
    /// "echo_expr_results").
    pub fn run_line(
        &mut self,
        source: &str,
        echo: bool,
        mut on_print: impl FnMut(&str),
    ) -> (RunOutcome, Option<String>) {
        let (program, distances) = match self.compile(source) {
            Ok(compiled) => compiled,
            Err(outcome) => return (outcome, None),
        };

        match self.interpreter.interpret_echoing_last_expr(&program, distances, echo, &mut on_print) {
            Ok(value) => (RunOutcome::Success, value.map(|v| v.to_string())),
            Err(err) => (RunOutcome::RuntimeError(err), None),
        }
    }

    /// Lexes and parses `source` without resolving or evaluating it,
    /// returning the raw `Program` (SPEC_FULL §3 "`loxt --print-ast`").
    /// Unlike [`run`](Self::run), this never touches the interpreter's
    /// global state.
    pub fn parse_only(&self, source: &str) -> Result<Program, Vec<Diagnostic>> {
        let mut handler = Handler::new();
        let tokens = Lexer::scan_tokens(source, &mut handler);
        let program = Parser::new(tokens, &mut handler).parse();
        if handler.has_errors() {
            Err(handler.take())
        } else {
            Ok(program)
        }
    }

    fn compile(&mut self, source: &str) -> Result<(Program, Distances), RunOutcome> {
        let mut handler = Handler::new();

        let tokens = tracing::debug_span!("lex").in_scope(|| Lexer::scan_tokens(source, &mut handler));

        let program = tracing::debug_span!("parse").in_scope(|| {
            let mut parser = Parser::new(tokens, &mut handler);
            parser.parse()
        });

        if handler.has_errors() {
            tracing::debug!(count = handler.diagnostics().len(), "aborting before resolve");
            return Err(RunOutcome::StaticError(handler.take()));
        }

        let distances =
            tracing::debug_span!("resolve").in_scope(|| Resolver::new(&mut handler).resolve(&program));

        if handler.has_errors() {
            tracing::debug!(count = handler.diagnostics().len(), "aborting before evaluate");
            return Err(RunOutcome::StaticError(handler.take()));
        }

        Ok((program, distances))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_to_string(source: &str) -> (RunOutcome, String) {
        let mut driver = Driver::new();
        let mut output = String::new();
        let outcome = driver.run(source, |line| {
            output.push_str(line);
            output.push('\n');
        });
        (outcome, output)
    }

    #[test]
    fn successful_program_prints_and_exits_zero() {
        let (outcome, output) = run_to_string("print 1 + 2;");
        assert_eq!(outcome.exit_code(), 0);
        assert_eq!(output, "3\n");
    }

    #[test]
    fn parse_error_aborts_before_evaluation_with_exit_65() {
        let (outcome, output) = run_to_string("print 1 +;");
        assert_eq!(outcome.exit_code(), 65);
        assert!(output.is_empty());
        match outcome {
            RunOutcome::StaticError(diags) => assert!(!diags.is_empty()),
            _ => panic!("expected a static error"),
        }
    }

    #[test]
    fn static_error_from_resolver_aborts_with_exit_65() {
        let (outcome, _) = run_to_string("return 1;");
        assert_eq!(outcome.exit_code(), 65);
    }

    #[test]
    fn runtime_error_exits_70_but_keeps_earlier_output() {
        let (outcome, output) = run_to_string("print \"before\"; print 1 + nil;");
        assert_eq!(outcome.exit_code(), 70);
        assert_eq!(output, "before\n");
    }

    #[test]
    fn globals_persist_across_separate_runs_on_the_same_driver() {
        let mut driver = Driver::new();
        driver.run("var greeting = \"hi\";", |_| {});
        let mut output = String::new();
        let outcome = driver.run("print greeting;", |line| output.push_str(line));
        assert_eq!(outcome.exit_code(), 0);
        assert_eq!(output, "hi");
    }

    #[test]
    fn run_file_reports_missing_file() {
        let mut driver = Driver::new();
        let result = driver.run_file(Path::new("/nonexistent/does-not-exist.lox"), |_| {});
        assert!(result.is_err());
    }

    #[test]
    fn run_line_echoes_trailing_bare_expression_when_enabled() {
        let mut driver = Driver::new();
        let (outcome, echoed) = driver.run_line("1 + 2;", true, |_| {});
        assert_eq!(outcome.exit_code(), 0);
        assert_eq!(echoed, Some("3".to_string()));
    }

    #[test]
    fn run_line_does_not_echo_when_disabled() {
        let mut driver = Driver::new();
        let (outcome, echoed) = driver.run_line("1 + 2;", false, |_| {});
        assert_eq!(outcome.exit_code(), 0);
        assert_eq!(echoed, None);
    }

    #[test]
    fn run_line_does_not_echo_non_expression_statements() {
        let mut driver = Driver::new();
        let (outcome, echoed) = driver.run_line("var x = 1;", true, |_| {});
        assert_eq!(outcome.exit_code(), 0);
        assert_eq!(echoed, None);
    }

    #[test]
    fn parse_only_does_not_touch_interpreter_state() {
        let driver = Driver::new();
        let program = driver.parse_only("1 + 2;").unwrap();
        assert_eq!(program.len(), 1);
    }

    #[test]
    fn parse_only_reports_errors_without_a_driver_panic() {
        let driver = Driver::new();
        assert!(driver.parse_only("1 +;").is_err());
    }

    #[test]
    fn run_file_reads_and_runs_a_real_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hello.lox");
        fs::write(&path, "print \"hello\";").unwrap();

        let mut driver = Driver::new();
        let mut output = String::new();
        let outcome = driver.run_file(&path, |line| output.push_str(line)).unwrap();
        assert_eq!(outcome.exit_code(), 0);
        assert_eq!(output, "hello");
    }
}
