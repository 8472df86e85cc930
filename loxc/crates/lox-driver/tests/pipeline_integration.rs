//! End-to-end scenarios run through the full pipeline (§8 "Scenarios").

use lox_driver::Driver;

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
fn s1_arithmetic_and_precedence() {
    let (code, output) = run("print (1 + 2) * 3 - 4 / 2;");
    assert_eq!(code, 0);
    assert_eq!(output, "7\n");
}

#[test]
fn s2_closures_capture_by_reference() {
    let (code, output) = run(
        r#"
        var x = 1;
        fun f() { print x; }
        x = 2;
        f();
        "#,
    );
    assert_eq!(code, 0);
    assert_eq!(output, "2\n");
}

#[test]
fn s3_closure_counter() {
    let (code, output) = run(
        r#"
        fun makeCounter() {
          var i = 0;
          fun count() { i = i + 1; print i; }
          return count;
        }
        var c = makeCounter();
        c(); c(); c();
        "#,
    );
    assert_eq!(code, 0);
    assert_eq!(output, "1\n2\n3\n");
}

#[test]
fn s4_class_with_initializer_and_method() {
    let (code, output) = run(
        r#"
        class Greeter {
          init(name) { this.name = name; }
          hi() { print "hi " + this.name; }
        }
        Greeter("world").hi();
        "#,
    );
    assert_eq!(code, 0);
    assert_eq!(output, "hi world\n");
}

#[test]
fn s5_inheritance_and_super() {
    let (code, output) = run(
        r#"
        class A { speak() { print "A"; } }
        class B < A { speak() { super.speak(); print "B"; } }
        B().speak();
        "#,
    );
    assert_eq!(code, 0);
    assert_eq!(output, "A\nB\n");
}

#[test]
fn s6_static_error_self_initializer() {
    let mut driver = Driver::new();
    let outcome = driver.run("fun bad() { var a = a; }", |_| {});
    assert_eq!(outcome.exit_code(), 65);
    match outcome {
        lox_driver::RunOutcome::StaticError(diags) => {
            assert_eq!(diags.len(), 1);
            assert_eq!(
                diags[0].to_string(),
                "[line 1] Error Can't read local variable in its own initializer"
            );
        }
        _ => panic!("expected a static error"),
    }
}

#[test]
fn s7_runtime_error_undefined_variable() {
    let (code, output) = run("print x;");
    assert_eq!(code, 70);
    assert!(output.is_empty());
}

#[test]
fn for_loop_desugars_observationally_to_while() {
    let (code, for_output) = run(
        r#"
        for (var i = 0; i < 3; i = i + 1) { print i; }
        "#,
    );
    let (_, while_output) = run(
        r#"
        {
          var i = 0;
          while (i < 3) { print i; i = i + 1; }
        }
        "#,
    );
    assert_eq!(code, 0);
    assert_eq!(for_output, while_output);
}
