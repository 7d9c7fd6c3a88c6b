use std::cell::RefCell;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use rustyline::completion::Completer;
use rustyline::config::{CompletionType, Config};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Cmd, Context, Editor, Helper, KeyCode, KeyEvent, Modifiers};
use tracing::{debug, warn};

use super::commands::CommandMap;
use super::completer::InteractiveCompleter;
use super::input::LineReader;
use crate::app::config::{self, ShellConfig};
use crate::completion::cycle::{word_at_end, CandidateCycle};

/// Completion for the shell prompt, driven by the candidate cycle.
pub struct ShellHelper {
    cycle: RefCell<CandidateCycle<InteractiveCompleter>>,
}

impl ShellHelper {
    pub fn new(commands: CommandMap) -> Self {
        Self {
            cycle: RefCell::new(CandidateCycle::new(InteractiveCompleter::new(commands))),
        }
    }
}

impl Completer for ShellHelper {
    type Candidate = String;

    fn complete(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> rustyline::Result<(usize, Vec<String>)> {
        let line = &line[..pos];
        let (begidx, _) = word_at_end(line);
        Ok((begidx, self.cycle.borrow_mut().all(line)))
    }
}

impl Hinter for ShellHelper {
    type Hint = String;
}

impl Highlighter for ShellHelper {}

impl Validator for ShellHelper {}

impl Helper for ShellHelper {}

/// Translate a key name such as `tab`, `C-x` or `M-/` into a key event.
pub fn complete_key_event(key: &str) -> Option<KeyEvent> {
    let key = key.trim().to_ascii_lowercase();
    let single = |s: &str| {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Some(c),
            _ => None,
        }
    };

    match key.as_str() {
        "tab" => Some(KeyEvent(KeyCode::Tab, Modifiers::NONE)),
        "esc" | "escape" => Some(KeyEvent(KeyCode::Esc, Modifiers::NONE)),
        _ => {
            if let Some(rest) = ["c-", "ctrl-", "control-"].iter().find_map(|p| key.strip_prefix(p)) {
                single(rest).map(KeyEvent::ctrl)
            } else if let Some(rest) = ["m-", "meta-", "alt-"].iter().find_map(|p| key.strip_prefix(p)) {
                single(rest).map(KeyEvent::alt)
            } else {
                single(&key).map(|c| KeyEvent::new(c, Modifiers::NONE))
            }
        }
    }
}

/// The prompting line editor of an interactive shell.
///
/// Loads the history file when created and writes it back when dropped.
pub struct LineEditor {
    editor: Editor<ShellHelper, DefaultHistory>,
    history_path: Option<PathBuf>,
}

impl LineEditor {
    /// Editor for application `name`, keeping history under the
    /// configuration directory when the shell asks for it.
    pub fn new(name: &str, shell: &ShellConfig, commands: CommandMap) -> rustyline::Result<Self> {
        let history_path = if shell.history {
            let path = config::history_path(name);
            if path.is_none() {
                warn!("no configuration directory, history disabled");
            }
            path
        } else {
            None
        };
        Self::with_history_path(shell, commands, history_path)
    }

    pub fn with_history_path(
        shell: &ShellConfig,
        commands: CommandMap,
        history_path: Option<PathBuf>,
    ) -> rustyline::Result<Self> {
        let config = Config::builder()
            .completion_type(CompletionType::List)
            .auto_add_history(false)
            .build();
        let mut editor: Editor<ShellHelper, DefaultHistory> = Editor::with_config(config)?;

        if let Some(key) = shell.complete_key.as_deref() {
            match complete_key_event(key) {
                Some(event) => {
                    editor.bind_sequence(event, Cmd::Complete);
                }
                None => warn!(key, "unknown completion key, completing with tab"),
            }
            editor.set_helper(Some(ShellHelper::new(commands)));
        }

        if let Some(path) = &history_path {
            if path.is_file() {
                match editor.load_history(path) {
                    Ok(()) => debug!(path = %path.display(), "loaded history"),
                    Err(e) => warn!(path = %path.display(), error = %e, "failed to read history"),
                }
            }
        }

        Ok(Self {
            editor,
            history_path,
        })
    }

    /// Entries available for recall, oldest first.
    pub fn history(&self) -> &DefaultHistory {
        self.editor.history()
    }

    pub fn history_path(&self) -> Option<&Path> {
        self.history_path.as_deref()
    }

    pub fn completes(&self) -> bool {
        self.editor.helper().is_some()
    }

    pub fn add_history_entry(&mut self, line: &str) {
        if line.trim().is_empty() {
            return;
        }
        if let Err(e) = self.editor.add_history_entry(line) {
            debug!(error = %e, "history entry dropped");
        }
    }

    fn save_history(&mut self) -> rustyline::Result<()> {
        let Some(path) = self.history_path.clone() else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        self.editor.save_history(&path)
    }
}

impl LineReader for LineEditor {
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        match self.editor.readline(prompt) {
            Ok(line) => {
                self.add_history_entry(&line);
                Ok(Some(line))
            }
            // Ctrl-C discards the line, Ctrl-D ends the session.
            Err(ReadlineError::Interrupted) => Ok(Some(String::new())),
            Err(ReadlineError::Eof) => Ok(None),
            Err(ReadlineError::Io(e)) => Err(e),
            Err(e) => Err(io::Error::new(io::ErrorKind::Other, e.to_string())),
        }
    }
}

impl Drop for LineEditor {
    fn drop(&mut self) {
        if let Err(e) = self.save_history() {
            warn!(error = %e, "failed to write history");
        }
    }
}
