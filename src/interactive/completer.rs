use tracing::debug;

use super::commands::CommandMap;
use crate::completion::{Complete, CompletionRequest};

/// Completes command names, then hands the rest of the line to the
/// completer of the command being typed.
#[derive(Clone)]
pub struct InteractiveCompleter {
    commands: CommandMap,
}

impl InteractiveCompleter {
    pub fn new(commands: CommandMap) -> Self {
        Self { commands }
    }

    pub fn commands(&self) -> &CommandMap {
        &self.commands
    }
}

impl Complete for InteractiveCompleter {
    fn complete(&self, request: &CompletionRequest) -> Vec<String> {
        if request.index == 0 {
            return self
                .commands
                .names()
                .filter(|name| name.starts_with(request.current.as_str()))
                .map(str::to_string)
                .collect();
        }

        match self.commands.get(&request.first) {
            Some(command) => command.completer().complete(request),
            None => {
                debug!(command = %request.first, "no such command");
                vec![]
            }
        }
    }
}
