//! Smoke test for the file-reading entry point.

use std::fs;

use lox_driver::Driver;

#[test]
fn runs_a_script_file_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("program.lox");
    fs::write(
        &path,
        r#"
        class Greeter {
          init(name) { this.name = name; }
          hi() { print "hi " + this.name; }
        }
        Greeter("file").hi();
        "#,
    )
    .unwrap();

    let mut driver = Driver::new();
    let mut output = String::new();
    let outcome = driver.run_file(&path, |line| output.push_str(line)).unwrap();

    assert_eq!(outcome.exit_code(), 0);
    assert_eq!(output, "hi file");
}
