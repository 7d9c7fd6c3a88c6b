use std::env;
use std::io::{self, Write};
use std::process;

use clap::{Arg, ArgMatches, Command};
use tracing::debug;

use crate::app::config::AppConfig;
use crate::app::error::AppError;
use crate::completion::script::{self, Intercept, ScriptedRequest};
use crate::completion::{CommandCompleter, Registry};
use crate::logging::{self, LogSettings};

/// What a main function gets to work with.
pub struct Invocation<'a> {
    pub name: &'a str,
    pub params: &'a ArgMatches,
    pub out: &'a mut dyn Write,
}

pub type MainFn = dyn Fn(&mut Invocation<'_>) -> anyhow::Result<()>;

/// A command-line application: a name, its parameters and a main function.
///
/// ```no_run
/// use std::io::Write;
///
/// use clap::{Arg, ArgAction};
/// use cliframe::Application;
///
/// let ls = Application::new("ls")
///     .param(Arg::new("all").short('a').long("all").action(ArgAction::SetTrue))
///     .main(|app| {
///         writeln!(app.out, "running {}", app.name)?;
///         Ok(())
///     });
/// ls.run_and_exit();
/// ```
pub struct Application {
    config: AppConfig,
    params: Vec<Arg>,
    main: Option<Box<MainFn>>,
}

impl Application {
    pub fn new(name: impl Into<String>) -> Self {
        Self::from_config(AppConfig::new(name))
    }

    pub fn from_config(config: AppConfig) -> Self {
        Self {
            config,
            params: Vec::new(),
            main: None,
        }
    }

    pub fn about(mut self, about: impl Into<String>) -> Self {
        self.config.about = Some(about.into());
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.config.version = Some(version.into());
        self
    }

    pub fn with_logging(mut self) -> Self {
        self.config.capabilities.logging = true;
        self
    }

    pub fn with_completion(mut self) -> Self {
        self.config.capabilities.completion = true;
        self
    }

    pub fn param(mut self, arg: Arg) -> Self {
        self.add_param(arg);
        self
    }

    pub fn add_param(&mut self, arg: Arg) {
        self.params.push(arg);
    }

    pub fn main<F>(mut self, main: F) -> Self
    where
        F: Fn(&mut Invocation<'_>) -> anyhow::Result<()> + 'static,
    {
        self.set_main(main);
        self
    }

    pub fn set_main<F>(&mut self, main: F)
    where
        F: Fn(&mut Invocation<'_>) -> anyhow::Result<()> + 'static,
    {
        self.main = Some(Box::new(main));
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// The clap command: own parameters first, then those of each capability.
    pub fn command(&self) -> Command {
        let mut command = Command::new(self.config.name.clone()).args(self.params.iter().cloned());
        if let Some(about) = &self.config.about {
            command = command.about(about.clone());
        }
        if let Some(version) = &self.config.version {
            command = command.version(version.clone());
        }
        if self.config.capabilities.logging {
            command = command.args(logging::args());
        }
        if self.config.capabilities.completion {
            command = command.args(script::args());
        }
        command
    }

    /// Options a user may complete, without the completion protocol flags.
    pub fn registry(&self) -> Registry {
        Registry::from_command(&self.command()).without(&script::protocol_names())
    }

    fn parse(&self, argv: &[String]) -> Result<ArgMatches, AppError> {
        Ok(self.command().try_get_matches_from(argv)?)
    }

    fn pre_run(&self, matches: &ArgMatches) {
        if self.config.capabilities.logging {
            if let Err(e) = logging::init(&LogSettings::from_matches(matches)) {
                debug!(app = %self.name(), error = %e, "logging already configured");
            }
        }
    }

    /// Answer the completion flags, or parse `argv` and set up the
    /// capabilities. `None` means a completion flag was answered and the
    /// run is over.
    pub(crate) fn prepare(&self, argv: &[String], out: &mut dyn Write) -> Result<Option<ArgMatches>, AppError> {
        if self.config.capabilities.completion {
            if let Some(intercept) = Intercept::detect(argv) {
                self.answer(intercept, argv, out)?;
                return Ok(None);
            }
        }

        let matches = self.parse(argv)?;

        if self.config.capabilities.completion {
            if let Some(intercept) = Intercept::from_matches(&matches) {
                self.answer(intercept, argv, out)?;
                return Ok(None);
            }
        }

        self.pre_run(&matches);
        Ok(Some(matches))
    }

    /// Run against `argv` (program name first) without ever leaving the process.
    pub fn run_with(&self, argv: &[String], out: &mut dyn Write) -> Result<(), AppError> {
        debug!(app = %self.name(), ?argv, "run");

        let Some(matches) = self.prepare(argv, out)? else {
            return Ok(());
        };

        if let Some(main) = &self.main {
            let mut invocation = Invocation {
                name: self.name(),
                params: &matches,
                out: &mut *out,
            };
            main(&mut invocation).map_err(AppError::from_main)?;
        }
        out.flush()?;
        Ok(())
    }

    pub fn run<I, T>(&self, argv: I) -> Result<(), AppError>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let argv: Vec<String> = argv.into_iter().map(Into::into).collect();
        let stdout = io::stdout();
        let mut out = stdout.lock();
        self.run_with(&argv, &mut out)
    }

    /// Run with the process arguments and exit with the resulting status.
    pub fn run_and_exit(&self) -> ! {
        exit(self.name(), self.run(env::args()))
    }

    fn answer(&self, intercept: Intercept, argv: &[String], out: &mut dyn Write) -> Result<(), AppError> {
        match intercept {
            Intercept::Complete(positional) => {
                let request = ScriptedRequest::from_env(&positional);
                let completer = CommandCompleter::new(self.registry());
                script::write_candidates(&completer, &request, out)?;
            }
            Intercept::Eval => {
                let program = argv.first().map(String::as_str).unwrap_or(self.name());
                writeln!(out, "{}", script::bash_eval_line(program))?;
            }
            Intercept::Script(shell) => {
                script::write_script(shell, &mut self.command(), out);
            }
        }
        out.flush()?;
        Ok(())
    }
}

/// Leave the process according to `result`.
pub fn exit(name: &str, result: Result<(), AppError>) -> ! {
    match result {
        Ok(()) => process::exit(0),
        Err(AppError::Usage(err)) => err.exit(),
        Err(err) => {
            let status = err.exit_status();
            if !matches!(err, AppError::Abort(_)) {
                eprintln!("{}: {:#}", name, err);
            }
            debug!(app = %name, status, "exiting");
            process::exit(status)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::error::Abort;
    use clap::ArgAction;

    fn argv(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn ls() -> Application {
        Application::new("ls")
            .param(Arg::new("long").short('l').action(ArgAction::SetTrue))
            .param(Arg::new("all").short('a').long("all").action(ArgAction::SetTrue))
            .main(|app| {
                writeln!(
                    app.out,
                    "running {} long={} all={}",
                    app.name,
                    app.params.get_flag("long"),
                    app.params.get_flag("all")
                )?;
                Ok(())
            })
    }

    #[test]
    fn test_run_with_passes_params_to_main() {
        let mut out = Vec::new();
        ls().run_with(&argv(&["ls", "-l"]), &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "running ls long=true all=false\n");
    }

    #[test]
    fn test_run_with_reports_usage_errors() {
        let mut out = Vec::new();
        let err = ls().run_with(&argv(&["ls", "--bogus"]), &mut out).unwrap_err();
        assert!(matches!(err, AppError::Usage(_)));
        assert!(out.is_empty());
    }

    #[test]
    fn test_run_with_surfaces_abort() {
        let app = Application::new("stop").main(|_| Err(Abort::new(4).into()));
        let err = app.run_with(&argv(&["stop"]), &mut Vec::new()).unwrap_err();
        assert_eq!(err.exit_status(), 4);
    }

    #[test]
    fn test_command_orders_capability_params_after_own() {
        let app = ls().with_logging().with_completion();
        let ids: Vec<String> = app
            .command()
            .get_arguments()
            .map(|a| a.get_id().to_string())
            .collect();
        assert_eq!(
            ids,
            vec![
                "long",
                "all",
                "verbose",
                "quiet",
                "silent",
                "logfile",
                "bash-complete",
                "bash-eval",
                "completion-script"
            ]
        );
    }

    #[test]
    fn test_registry_excludes_completion_protocol() {
        let registry = ls().with_completion().registry();
        assert!(registry.find("--bash-complete").is_none());
        assert!(registry.find("--bash-eval").is_none());
        assert!(registry.find("--completion-script").is_none());
        assert!(registry.find("--all").is_some());
    }

    #[test]
    fn test_bash_eval_prints_registration_line() {
        let mut out = Vec::new();
        ls().with_completion()
            .run_with(&argv(&["lsc", "--bash-eval"]), &mut out)
            .unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "complete -C \"lsc --bash-complete\" lsc\n"
        );
    }

    #[test]
    fn test_bash_complete_skips_main() {
        let mut out = Vec::new();
        ls().with_completion()
            .run_with(&argv(&["ls", "--bash-complete", "ls", "--a", "ls"]), &mut out)
            .unwrap();
        // COMP_LINE is not set here, so nothing counts as already used.
        assert_eq!(String::from_utf8(out).unwrap(), "--all\n");
    }

    #[test]
    fn test_completion_flags_after_separator_are_plain_values() {
        let calls = std::rc::Rc::new(std::cell::Cell::new(0));
        let seen = std::rc::Rc::clone(&calls);
        let app = Application::new("ls")
            .with_completion()
            .param(Arg::new("files").num_args(0..))
            .main(move |_| {
                seen.set(seen.get() + 1);
                Ok(())
            });

        let mut out = Vec::new();
        app.run_with(&argv(&["ls", "--", "--bash-eval"]), &mut out).unwrap();
        assert!(out.is_empty());
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_completion_script_flag() {
        let mut out = Vec::new();
        ls().with_completion()
            .run_with(&argv(&["ls", "--completion-script", "bash"]), &mut out)
            .unwrap();
        assert!(!out.is_empty());
    }

    #[test]
    fn test_run_without_main_is_a_no_op() {
        let app = Application::new("empty");
        assert!(app.run_with(&argv(&["empty"]), &mut Vec::new()).is_ok());
    }
}
