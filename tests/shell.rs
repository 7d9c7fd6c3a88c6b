use assert_cmd::Command;
use predicates::prelude::*;

fn cliframe() -> Command {
    let mut cmd = Command::cargo_bin("cliframe").unwrap();
    cmd.env_remove("COMP_LINE").env_remove("COMP_POINT");
    cmd
}

#[test]
fn test_piped_lines_are_dispatched_until_quit() {
    cliframe()
        .write_stdin("ls -l\nquit\nls -a\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("running ls with: long=true all=false"))
        .stdout(predicate::str::contains("all=true").not());
}

#[test]
fn test_unknown_input_is_echoed() {
    cliframe()
        .write_stdin("frobnicate\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("You said: frobnicate"));
}

#[test]
fn test_trailing_arguments_run_once() {
    cliframe()
        .args(["--", "ls", "-a"])
        .write_stdin("ls -l\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("long=false all=true"))
        .stdout(predicate::str::contains("long=true").not());
}

#[test]
fn test_alias_and_commands_listing() {
    cliframe()
        .write_stdin("commands\ndir --sort size\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("dir\nls\nlsof\nsh\n"))
        .stdout(predicate::str::contains("sort=size"));
}

#[test]
fn test_usage_error_keeps_shell_running() {
    cliframe()
        .write_stdin("ls --bogus\nlsof -a\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("running lsof with: and=true"));
}

#[test]
fn test_scripted_completion_through_shell() {
    cliframe()
        .write_stdin("ls --bash-complete ls --a ls\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("--all\n"))
        .stdout(predicate::str::contains("--bash").not());
}

#[test]
fn test_bash_eval_line() {
    cliframe()
        .write_stdin("ls --bash-eval\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("complete -C \"ls --bash-complete\" ls"));
}
