//! Edge cases from §8's universal invariants and §4 edge-case notes.

use lox_driver::{Driver, RunOutcome};

fn run(source: &str) -> (i32, String) {
    let mut driver = Driver::new();
    let mut output = String::new();
    let outcome = driver.run(source, |line| {
        output.push_str(line);
        output.push('\n');
    });
    (outcome.exit_code(), output)
}

#[test]
fn equality_is_reflexive_and_respects_type() {
    let (code, output) = run(
        r#"
        print nil == nil;
        print nil == 0;
        print 0 == "0";
        print 1 == 1;
        "#,
    );
    assert_eq!(code, 0);
    assert_eq!(output, "true\nfalse\nfalse\ntrue\n");
}

#[test]
fn zero_and_empty_string_are_truthy() {
    let (code, output) = run(
        r#"
        if (0) { print "zero truthy"; }
        if ("") { print "empty truthy"; }
        if (nil) { print "unreachable"; } else { print "nil falsy"; }
        "#,
    );
    assert_eq!(code, 0);
    assert_eq!(output, "zero truthy\nempty truthy\nnil falsy\n");
}

#[test]
fn plus_overload_picks_concat_when_left_is_a_string() {
    let (code, output) = run(r#"print "count: " + 3;"#);
    assert_eq!(code, 0);
    assert_eq!(output, "count: 3\n");
}

#[test]
fn short_circuit_or_skips_right_operand_when_left_is_truthy() {
    let (code, output) = run(
        r#"
        fun sideEffect() { print "evaluated"; return true; }
        if (true or sideEffect()) { print "done"; }
        "#,
    );
    assert_eq!(code, 0);
    assert_eq!(output, "done\n");
}

#[test]
fn short_circuit_and_skips_right_operand_when_left_is_falsy() {
    let (code, output) = run(
        r#"
        fun sideEffect() { print "evaluated"; return true; }
        if (false and sideEffect()) { print "unreachable"; } else { print "done"; }
        "#,
    );
    assert_eq!(code, 0);
    assert_eq!(output, "done\n");
}

#[test]
fn block_shadowing_is_undone_on_block_exit() {
    let (code, output) = run(
        r#"
        var a = "outer";
        {
          var a = "inner";
          print a;
        }
        print a;
        "#,
    );
    assert_eq!(code, 0);
    assert_eq!(output, "inner\nouter\n");
}

#[test]
fn this_outside_a_class_is_a_static_error() {
    let mut driver = Driver::new();
    let outcome = driver.run("print this;", |_| {});
    assert_eq!(outcome.exit_code(), 65);
    assert!(matches!(outcome, RunOutcome::StaticError(_)));
}

#[test]
fn undefined_property_is_a_runtime_error_not_a_panic() {
    let (code, _) = run(
        r#"
        class Empty {}
        print Empty().missing;
        "#,
    );
    assert_eq!(code, 70);
}

#[test]
fn calling_with_wrong_arity_is_a_runtime_error() {
    let (code, _) = run(
        r#"
        fun needsTwo(a, b) { return a + b; }
        needsTwo(1);
        "#,
    );
    assert_eq!(code, 70);
}

#[test]
fn repl_lines_share_state_across_runs() {
    let mut driver = Driver::new();
    driver.run("class Counter { init() { this.n = 0; } bump() { this.n = this.n + 1; return this.n; } }", |_| {});
    driver.run("var c = Counter();", |_| {});
    let mut output = String::new();
    driver.run("print c.bump();", |line| output.push_str(line));
    driver.run("print c.bump();", |line| output.push_str(line));
    assert_eq!(output, "12");
}
