//! Source -> stdout scenarios, driven through the compiled CLI binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;

fn script(source: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp script");
    write!(file, "{source}").expect("write temp script");
    file
}

fn run_with_stdin(source: &str, stdin: &str) -> assert_cmd::assert::Assert {
    let file = script(source);
    Command::cargo_bin("pika")
        .unwrap()
        .arg(file.path())
        .write_stdin(stdin)
        .assert()
}

fn run(source: &str) -> assert_cmd::assert::Assert {
    run_with_stdin(source, "")
}

#[test]
fn hello_world() {
    run(r#"println("hello");"#)
        .success()
        .stdout("hello\n");
}

#[test]
fn arithmetic_squares() {
    run("x = 3; y = 4; println(x * x + y * y);")
        .success()
        .stdout("25\n");
}

#[test]
fn list_append_and_len() {
    run("a = [1, 2, 3]; a[] = 4; println(len(a));")
        .success()
        .stdout("4\n");
}

#[test]
fn if_else_takes_the_true_branch() {
    run(r#"x = 10; if x > 5 { println("big"); } else { println("small"); }"#)
        .success()
        .stdout("big\n");
}

#[test]
fn while_loop_prints_accumulated_counter() {
    run(r#"i = 0; while i < 3 { print(i); i = i + 1; } println("");"#)
        .success()
        .stdout("012\n");
}

#[test]
fn string_plus_int_concatenates() {
    run(r#"s = "n="; s = s + 42; println(s);"#)
        .success()
        .stdout("n=42\n");
}

#[test]
fn undefined_variable_reports_positioned_diagnostic() {
    run("x = y;")
        .failure()
        .stdout("error: undefined variable 'y' at line 1 column 5\n");
}

#[test]
fn invalid_operator_on_string_is_a_type_error() {
    run(r#"x = "a" - "b";"#)
        .failure()
        .stdout(predicate::str::starts_with("error: "));
}

#[test]
fn operator_precedence_matches_spec_examples() {
    run("println(1 + 2 * 3);").success().stdout("7\n");
    run("println((1 + 2) * 3);").success().stdout("9\n");
    run("println(1 - 2 - 3);").success().stdout("-4\n");
}

#[test]
fn length_builtin_covers_string_array_and_fallback() {
    run(r#"println(len("abc"));"#).success().stdout("3\n");
    run("println(len([]));").success().stdout("0\n");
    run("println(len(42));").success().stdout("-1\n");
}

#[test]
fn scope_does_not_leak_out_of_a_block() {
    run("if true { y = 1; } println(y);")
        .failure()
        .stdout(predicate::str::starts_with("error: undefined variable 'y'"));
}

#[test]
fn non_short_circuit_and_consumes_both_reads() {
    run_with_stdin(
        r#"b = false and (readint("") == 999); println(readint(""));"#,
        "1\n2\n",
    )
    .success()
    .stdout("2\n");
}

#[test]
fn bare_path_invocation_runs_the_script() {
    let file = script(r#"println("bare");"#);
    Command::cargo_bin("pika")
        .unwrap()
        .arg(file.path())
        .assert()
        .success()
        .stdout("bare\n");
}

#[test]
fn lex_subcommand_prints_one_token_per_line() {
    let file = script("x = 1;");
    Command::cargo_bin("pika")
        .unwrap()
        .arg("lex")
        .arg(file.path())
        .assert()
        .success();
}

#[test]
fn typecheck_subcommand_reports_ok_without_running() {
    let file = script(r#"x = 1; println(x);"#);
    Command::cargo_bin("pika")
        .unwrap()
        .arg("typecheck")
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("ok"));
}

#[test]
fn missing_file_argument_exits_nonzero() {
    Command::cargo_bin("pika")
        .unwrap()
        .assert()
        .failure();
}
