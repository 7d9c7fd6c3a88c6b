use std::collections::BTreeMap;
use std::io::Write;
use std::rc::Rc;

use once_cell::unsync::OnceCell;

use crate::app::{AppError, Application};
use crate::completion::CommandCompleter;

/// An application registered with a shell, plus its completer once needed.
pub struct SubCommand {
    app: Application,
    completer: OnceCell<CommandCompleter>,
}

impl SubCommand {
    pub fn new(app: Application) -> Self {
        Self {
            app,
            completer: OnceCell::new(),
        }
    }

    pub fn app(&self) -> &Application {
        &self.app
    }

    /// Created on first use and reused afterwards.
    pub fn completer(&self) -> &CommandCompleter {
        self.completer
            .get_or_init(|| CommandCompleter::new(self.app.registry()))
    }

    pub fn has_completer(&self) -> bool {
        self.completer.get().is_some()
    }

    pub fn run_with(&self, argv: &[String], out: &mut dyn Write) -> Result<(), AppError> {
        self.app.run_with(argv, out)
    }
}

/// Command name to sub-command. Aliases point at the same sub-command.
#[derive(Clone, Default)]
pub struct CommandMap {
    entries: BTreeMap<String, Rc<SubCommand>>,
}

impl CommandMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `app` under its own name.
    pub fn add(&mut self, app: Application) -> Rc<SubCommand> {
        let name = app.name().to_string();
        self.add_as(name, app)
    }

    pub fn add_as(&mut self, name: impl Into<String>, app: Application) -> Rc<SubCommand> {
        let command = Rc::new(SubCommand::new(app));
        self.entries.insert(name.into(), Rc::clone(&command));
        command
    }

    /// Make `alias` run the command registered as `existing`.
    /// Returns `None` when `existing` is unknown.
    pub fn alias(&mut self, alias: impl Into<String>, existing: &str) -> Option<Rc<SubCommand>> {
        let command = self.entries.get(existing).cloned()?;
        self.entries.insert(alias.into(), Rc::clone(&command));
        Some(command)
    }

    pub fn get(&self, name: &str) -> Option<&Rc<SubCommand>> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
