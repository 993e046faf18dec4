use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;

fn prog() -> Command {
    Command::cargo_bin("prog").unwrap()
}

#[test]
fn matching_subject_prints_match_and_exits_zero() {
    prog()
        .args(["(a+)(b+)", "aabb"])
        .assert()
        .success()
        .stdout(predicate::str::contains("match(4) (0,2) (2,4)"));
}

#[test]
fn a_non_matching_subject_is_still_a_successful_run() {
    // spec.md §6: exit 0 on success, 1 only on argument/compile error — a subject
    // simply failing to match is a normal result, not a CLI failure.
    prog()
        .args(["abc", "xyz"])
        .assert()
        .success()
        .stdout(predicate::str::contains("no match"));
}

#[test]
fn mixed_matching_and_non_matching_subjects_still_exit_zero() {
    prog()
        .args(["foo|bar", "nope", "bar"])
        .assert()
        .success()
        .stdout(predicate::str::contains("no match"))
        .stdout(predicate::str::contains("match(3)"));
}

#[test]
fn invalid_pattern_exits_with_code_one() {
    prog().args(["(a", "anything"]).assert().code(1);
}

#[test]
fn debug_flag_prints_program_disassembly_before_matches() {
    prog()
        .args(["--debug", "a", "a"])
        .assert()
        .success()
        .stdout(predicate::str::contains("char 'a'"))
        .stdout(predicate::str::contains("match(1)"));
}

#[test]
fn debug_flag_raises_the_log_level_and_traces_lexer_and_vm_activity() {
    // Debug assertions are on in the profile `cargo test` builds this binary with, so
    // `Log::Verbose` actually prints `[lexer]`/`[vm]` trace lines for this run.
    prog()
        .args(["--debug", "a", "a"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[lexer] token"))
        .stdout(predicate::str::contains("[vm] sp="));
}

#[test]
fn a_compiled_program_file_round_trips_through_the_cli() {
    let program = pike_regex::compile(b"a+b").unwrap();
    let text = pike_regex::write_program(&program);

    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(text.as_bytes()).unwrap();
    let path = file.path().to_str().unwrap().to_string();

    prog()
        .args([&path, "aaab"])
        .assert()
        .success()
        .stdout(predicate::str::contains("match(4)"));
}
