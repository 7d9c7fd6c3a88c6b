use std::env;
use std::io::{self, Write};

use clap::{Arg, ArgAction, ArgMatches, Command};
use clap_complete::{generate, Generator, Shell};

use super::completer::{Complete, CompletionRequest};

pub const BASH_COMPLETE: &str = "bash-complete";
pub const BASH_EVAL: &str = "bash-eval";
pub const COMPLETION_SCRIPT: &str = "completion-script";

/// Arguments contributed by the completion capability.
pub fn args() -> Vec<Arg> {
    vec![
        Arg::new(BASH_COMPLETE)
            .long(BASH_COMPLETE)
            .help("Output command completion for use with bash's complete builtin")
            .action(ArgAction::SetTrue)
            .hide(true),
        Arg::new(BASH_EVAL)
            .long(BASH_EVAL)
            .help("Print a string which can be eval'ed to enable command completion for the current shell")
            .action(ArgAction::SetTrue),
        Arg::new(COMPLETION_SCRIPT)
            .long(COMPLETION_SCRIPT)
            .help("Generate a static completion script for the given shell")
            .value_name("SHELL")
            .value_parser(clap::value_parser!(Shell)),
    ]
}

/// Names of the actions that belong to the completion protocol itself.
pub fn protocol_names() -> [&'static str; 3] {
    [BASH_COMPLETE, BASH_EVAL, COMPLETION_SCRIPT]
}

/// A request coming from bash's `complete -C`.
///
/// Bash runs `<prog> --bash-complete <command> <current> <previous>` with the
/// whole line in `COMP_LINE` and the cursor offset in `COMP_POINT`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptedRequest {
    pub first: String,
    pub current: String,
    pub previous: String,
    pub line: String,
    pub point: usize,
}

impl ScriptedRequest {
    /// Build a request from the positional values following `--bash-complete`.
    /// Missing values are treated as empty and an unparsable point as zero.
    pub fn from_parts(positional: &[String], line: Option<String>, point: Option<String>) -> Self {
        let value = |i: usize| positional.get(i).cloned().unwrap_or_default();
        Self {
            first: value(0),
            current: value(1),
            previous: value(2),
            line: line.unwrap_or_default(),
            point: point.and_then(|p| p.trim().parse().ok()).unwrap_or(0),
        }
    }

    /// Read `COMP_LINE` and `COMP_POINT` from the environment.
    pub fn from_env(positional: &[String]) -> Self {
        Self::from_parts(
            positional,
            env::var("COMP_LINE").ok(),
            env::var("COMP_POINT").ok(),
        )
    }

    pub fn to_request(&self) -> CompletionRequest {
        let words = self.line.split_whitespace().map(str::to_string).collect();
        CompletionRequest::new(
            self.first.clone(),
            self.current.clone(),
            self.previous.clone(),
            words,
            self.point,
        )
    }
}

/// Answer a scripted request: one candidate per line.
pub fn write_candidates<C: Complete>(
    completer: &C,
    request: &ScriptedRequest,
    out: &mut dyn Write,
) -> io::Result<()> {
    for candidate in completer.complete(&request.to_request()) {
        writeln!(out, "{}", candidate)?;
    }
    out.flush()
}

/// The line that registers `program` as its own bash completion provider.
pub fn bash_eval_line(program: &str) -> String {
    format!("complete -C \"{} --{}\" {}", program, BASH_COMPLETE, program)
}

pub fn write_script(shell: Shell, cmd: &mut Command, out: &mut dyn Write) {
    let bin_name = cmd.get_name().to_string();
    print_completions(shell, cmd, bin_name, out);
}

fn print_completions<G: Generator>(gen: G, cmd: &mut Command, bin_name: String, out: &mut dyn Write) {
    generate(gen, cmd, bin_name, out);
}

/// What the completion flags ask for, if anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intercept {
    Complete(Vec<String>),
    Eval,
    Script(Shell),
}

impl Intercept {
    /// Look for the completion flags before regular parsing.
    ///
    /// Bash passes free-form words after `--bash-complete`, which a normal
    /// parse would reject, so the raw argument vector is inspected instead.
    /// Only arguments before a `--` separator count as flags.
    pub fn detect(argv: &[String]) -> Option<Self> {
        let rest = argv.get(1..).unwrap_or(&[]);
        let flags = rest.iter().take_while(|a| *a != "--");
        let complete_flag = format!("--{}", BASH_COMPLETE);
        let eval_flag = format!("--{}", BASH_EVAL);

        if let Some(pos) = flags.clone().position(|a| *a == complete_flag) {
            return Some(Intercept::Complete(rest[pos + 1..].to_vec()));
        }
        if flags.into_iter().any(|a| *a == eval_flag) {
            return Some(Intercept::Eval);
        }
        None
    }

    /// Pick up `--completion-script` once the arguments have been parsed.
    pub fn from_matches(matches: &ArgMatches) -> Option<Self> {
        matches
            .try_get_one::<Shell>(COMPLETION_SCRIPT)
            .ok()
            .flatten()
            .map(|shell| Intercept::Script(*shell))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::completer::CommandCompleter;
    use crate::completion::registry::{Action, Arity, Registry};

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_from_parts_reads_positionals_and_environment() {
        let request = ScriptedRequest::from_parts(
            &strings(&["lsc", "--a", "lsc"]),
            Some("lsc --a".to_string()),
            Some("7".to_string()),
        );
        assert_eq!(request.first, "lsc");
        assert_eq!(request.current, "--a");
        assert_eq!(request.previous, "lsc");
        assert_eq!(request.point, 7);
        assert_eq!(request.to_request().words, strings(&["lsc", "--a"]));
    }

    #[test]
    fn test_from_parts_defaults_missing_values() {
        let request = ScriptedRequest::from_parts(&strings(&["lsc"]), None, Some("x".to_string()));
        assert_eq!(request.current, "");
        assert_eq!(request.previous, "");
        assert_eq!(request.point, 0);
        assert!(request.to_request().words.is_empty());
    }

    #[test]
    fn test_write_candidates_one_per_line() {
        let registry: Registry = [
            Action::new("long", ["--long"], Arity::Flag),
            Action::new("all", ["-a", "--all"], Arity::Flag),
        ]
        .into_iter()
        .collect();
        let completer = CommandCompleter::new(registry);
        let request = ScriptedRequest::from_parts(
            &strings(&["lsc", "--", "lsc"]),
            Some("lsc --".to_string()),
            None,
        );

        let mut out = Vec::new();
        write_candidates(&completer, &request, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "--long\n--all\n");
    }

    #[test]
    fn test_bash_eval_line() {
        assert_eq!(
            bash_eval_line("lsc"),
            "complete -C \"lsc --bash-complete\" lsc"
        );
    }

    #[test]
    fn test_detect_intercepts() {
        assert_eq!(
            Intercept::detect(&strings(&["lsc", "--bash-complete", "lsc", "-", "lsc"])),
            Some(Intercept::Complete(strings(&["lsc", "-", "lsc"])))
        );
        assert_eq!(
            Intercept::detect(&strings(&["lsc", "--bash-eval"])),
            Some(Intercept::Eval)
        );
        assert_eq!(Intercept::detect(&strings(&["lsc", "-a"])), None);
        assert_eq!(
            Intercept::detect(&strings(&["lsc", "--bash-complete", "lsc", "", "--"])),
            Some(Intercept::Complete(strings(&["lsc", "", "--"])))
        );
        assert_eq!(Intercept::detect(&[]), None);
    }

    #[test]
    fn test_detect_ignores_flags_after_separator() {
        assert_eq!(Intercept::detect(&strings(&["ls", "--", "--bash-eval"])), None);
        assert_eq!(
            Intercept::detect(&strings(&["ls", "--", "--bash-complete", "ls"])),
            None
        );
    }

    #[test]
    fn test_write_script_for_bash() {
        let mut cmd = Command::new("lsc").arg(Arg::new("all").long("all").action(ArgAction::SetTrue));
        let mut out = Vec::new();
        write_script(Shell::Bash, &mut cmd, &mut out);
        let script = String::from_utf8(out).unwrap();
        assert!(script.contains("lsc"));
        assert!(script.contains("--all"));
    }
}
