use std::env;
use std::io::{self, IsTerminal, Write};
use std::rc::Rc;

use clap::{Arg, ArgAction};
use tracing::{debug, warn};

use super::commands::{CommandMap, SubCommand};
use super::input::{InputMode, LineReader, Lines, StreamReader};
use super::line_editor::LineEditor;
use crate::app::{self, AppConfig, AppError, Application, ShellConfig};

const INTERACTIVE: &str = "interactive";
const REMAINDER: &str = "remainder";

const QUIT: &str = "quit";
const COMMANDS: &str = "commands";

/// Only lines typed at a terminal are worth an editor. Batch input never
/// prompts.
fn needs_editor(mode: &InputMode, terminal: bool) -> bool {
    terminal && *mode == InputMode::Lines
}

/// A shell that reads lines and dispatches them to registered applications.
pub struct InteractiveShell {
    app: Application,
    shell: ShellConfig,
    commands: CommandMap,
}

impl InteractiveShell {
    /// A shell with the logging capability and default shell settings.
    pub fn new(name: impl Into<String>) -> Self {
        let mut config = AppConfig::new(name);
        config.capabilities.logging = true;
        Self::with_config(config, ShellConfig::default())
    }

    pub fn with_config(config: AppConfig, shell: ShellConfig) -> Self {
        let mut app = Application::from_config(config);
        app.add_param(
            Arg::new(INTERACTIVE)
                .short('i')
                .long(INTERACTIVE)
                .help("Run the application interactively as a shell")
                .action(ArgAction::SetTrue),
        );
        app.add_param(
            Arg::new(REMAINDER)
                .help("The remaining arguments are treated as input to the shell")
                .num_args(0..)
                .trailing_var_arg(true)
                .allow_hyphen_values(true),
        );
        Self {
            app,
            shell,
            commands: CommandMap::new(),
        }
    }

    pub fn prompt(mut self, prompt: impl Into<String>) -> Self {
        self.shell.prompt = Some(prompt.into());
        self
    }

    pub fn history(mut self, enabled: bool) -> Self {
        self.shell.history = enabled;
        self
    }

    pub fn complete_key(mut self, key: Option<String>) -> Self {
        self.shell.complete_key = key;
        self
    }

    pub fn add_command(&mut self, app: Application) -> Rc<SubCommand> {
        self.commands.add(app)
    }

    pub fn add_command_as(&mut self, name: impl Into<String>, app: Application) -> Rc<SubCommand> {
        self.commands.add_as(name, app)
    }

    pub fn alias(&mut self, alias: impl Into<String>, existing: &str) -> Option<Rc<SubCommand>> {
        self.commands.alias(alias, existing)
    }

    pub fn commands(&self) -> &CommandMap {
        &self.commands
    }

    pub fn app(&self) -> &Application {
        &self.app
    }

    pub fn name(&self) -> &str {
        self.app.name()
    }

    /// Run with real stdin. A prompting editor is built only when lines are
    /// read from a terminal; other input is read plainly.
    pub fn run<I, T>(&self, argv: I) -> Result<(), AppError>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let argv: Vec<String> = argv.into_iter().map(Into::into).collect();
        let stdout = io::stdout();
        let mut out = stdout.lock();
        let Some(mode) = self.start(&argv, &mut out)? else {
            return Ok(());
        };

        let stdin = io::stdin();
        let mut reader: Box<dyn LineReader> = match self.editor(&mode, stdin.is_terminal()) {
            Some(editor) => Box::new(editor),
            None => Box::new(StreamReader::new(stdin.lock())),
        };
        let prompt = self.shell.prompt_for(self.name());
        self.interact(Lines::new(mode, &mut reader, prompt), &mut out)
    }

    pub fn run_and_exit(&self) -> ! {
        app::exit(self.name(), self.run(env::args()))
    }

    /// Parse `argv`, pick the input mode and run the dispatch loop.
    pub fn run_with(
        &self,
        argv: &[String],
        reader: &mut dyn LineReader,
        out: &mut dyn Write,
    ) -> Result<(), AppError> {
        let Some(mode) = self.start(argv, out)? else {
            return Ok(());
        };
        let prompt = self.shell.prompt_for(self.name());
        self.interact(Lines::new(mode, reader, prompt), out)
    }

    /// Shell startup up to the choice of input mode. `None` when a completion
    /// flag was answered and nothing is left to run.
    fn start(&self, argv: &[String], out: &mut dyn Write) -> Result<Option<InputMode>, AppError> {
        let Some(matches) = self.app.prepare(argv, out)? else {
            return Ok(None);
        };

        let forced = matches.get_flag(INTERACTIVE);
        let remainder: Vec<String> = matches
            .get_many::<String>(REMAINDER)
            .map(|values| values.cloned().collect())
            .unwrap_or_default();
        let mode = InputMode::select(forced, &remainder);
        debug!(shell = %self.name(), ?mode, "input mode");
        Ok(Some(mode))
    }

    /// The line editor for `mode`, if one is wanted.
    fn editor(&self, mode: &InputMode, terminal: bool) -> Option<LineEditor> {
        if !needs_editor(mode, terminal) {
            return None;
        }
        match LineEditor::new(self.name(), &self.shell, self.commands.clone()) {
            Ok(editor) => Some(editor),
            Err(e) => {
                warn!(error = %e, "line editor unavailable, reading plain lines");
                None
            }
        }
    }

    /// The dispatch loop. Stops at end of input or on `quit`.
    pub fn interact<I>(&self, lines: I, out: &mut dyn Write) -> Result<(), AppError>
    where
        I: IntoIterator<Item = Result<String, AppError>>,
    {
        for line in lines {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            let argv = match shell_words::split(&line) {
                Ok(argv) => argv,
                Err(e) => {
                    warn!(%line, error = %e, "cannot split line");
                    continue;
                }
            };
            debug!(%line, ?argv, "dispatch");

            if line == QUIT {
                break;
            }

            if line == COMMANDS {
                let names: Vec<&str> = self.commands.names().collect();
                write!(out, "{}", names.join("\n"))?;
            } else if let Some(command) = argv.first().and_then(|name| self.commands.get(name)) {
                self.dispatch(command, &argv, out)?;
            } else {
                writeln!(out, "You said: {}", line)?;
            }
            writeln!(out)?;
            out.flush()?;
        }
        Ok(())
    }

    /// Run one command. Its abort and usage errors end this command only.
    fn dispatch(&self, command: &SubCommand, argv: &[String], out: &mut dyn Write) -> Result<(), AppError> {
        match command.run_with(argv, out) {
            Ok(()) => Ok(()),
            Err(AppError::Abort(abort)) => {
                debug!(command = %argv[0], status = abort.status, "command aborted");
                Ok(())
            }
            Err(AppError::Usage(err)) => {
                if err.use_stderr() {
                    eprint!("{}", err.render());
                } else {
                    write!(out, "{}", err.render())?;
                }
                Ok(())
            }
            Err(err) => Err(err),
        }
    }
}
