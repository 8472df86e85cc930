//! End-to-end CLI tests (§2 "Test tooling": `assert_cmd`/`predicates`/
//! `tempfile`, run against the built binary).

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;

fn loxt() -> Command {
    Command::cargo_bin("loxt").unwrap()
}

#[test]
fn runs_a_script_file_and_exits_zero() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hello.lox");
    fs::write(&path, r#"print "hello";"#).unwrap();

    loxt().arg(&path).assert().success().stdout(predicate::str::contains("hello"));
}

#[test]
fn static_error_exits_65() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.lox");
    fs::write(&path, "fun bad() { var a = a; }").unwrap();

    loxt()
        .arg(&path)
        .assert()
        .code(65)
        .stderr(predicate::str::contains("Can't read local variable in its own initializer"));
}

#[test]
fn runtime_error_exits_70() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.lox");
    fs::write(&path, "print x;").unwrap();

    loxt().arg(&path).assert().code(70).stderr(predicate::str::contains("Undefined variable"));
}

#[test]
fn missing_file_fails_with_nonzero_exit() {
    loxt().arg("/nonexistent/path/does-not-exist.lox").assert().failure();
}

#[test]
fn more_than_one_positional_argument_is_a_usage_error() {
    loxt().arg("a.lox").arg("b.lox").assert().failure();
}

#[test]
fn print_ast_prints_the_parsed_tree_without_running_it() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hello.lox");
    fs::write(&path, r#"print "hello";"#).unwrap();

    loxt()
        .arg("--print-ast")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("print").and(predicate::str::contains("hello")));
}

#[test]
fn repl_runs_piped_lines_and_echoes_expression_results_with_config() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("loxt.toml"), "echo_expr_results = true\n").unwrap();

    loxt()
        .current_dir(&dir)
        .write_stdin("1 + 2;\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("3"));
}
