use std::collections::HashSet;

use tracing::debug;

use super::registry::Registry;

/// One completion attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletionRequest {
    /// First token of the line, the command name.
    pub first: String,
    /// Token under the cursor, possibly empty.
    pub current: String,
    /// Token immediately before `current`.
    pub previous: String,
    /// All tokens of the line.
    pub words: Vec<String>,
    /// Cursor offset; zero means the command name is being completed.
    pub index: usize,
}

impl CompletionRequest {
    pub fn new(
        first: impl Into<String>,
        current: impl Into<String>,
        previous: impl Into<String>,
        words: Vec<String>,
        index: usize,
    ) -> Self {
        Self {
            first: first.into(),
            current: current.into(),
            previous: previous.into(),
            words,
            index,
        }
    }

    /// Tokens already on the line, excluding the one being typed.
    fn existing_options(&self) -> HashSet<&str> {
        let words = if self.current.is_empty() {
            &self.words[..]
        } else {
            self.words.split_last().map(|(_, rest)| rest).unwrap_or(&[])
        };
        words.iter().map(String::as_str).collect()
    }
}

/// Something that proposes candidates for a completion request.
pub trait Complete {
    fn complete(&self, request: &CompletionRequest) -> Vec<String>;
}

impl<C: Complete + ?Sized> Complete for &C {
    fn complete(&self, request: &CompletionRequest) -> Vec<String> {
        (**self).complete(request)
    }
}

/// Completes option names of a single command.
///
/// An option that already appears on the line is never offered again, even
/// when it may legitimately be repeated (`-v -v`). Aliases of the same option
/// are excluded together.
#[derive(Debug, Clone)]
pub struct CommandCompleter {
    registry: Registry,
}

impl CommandCompleter {
    pub fn new(registry: Registry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

impl Complete for CommandCompleter {
    fn complete(&self, request: &CompletionRequest) -> Vec<String> {
        debug!(
            first = %request.first,
            current = %request.current,
            previous = %request.previous,
            words = ?request.words,
            index = request.index,
            "complete"
        );

        let existing = request.existing_options();
        let current = request.current.as_str();

        let possible: Vec<&str> = match self.registry.find(&request.previous) {
            // The previous option still waits for its value; whatever is typed
            // passes through untouched.
            Some(action) if action.arity().takes_value() => {
                if current.is_empty() {
                    vec![]
                } else {
                    vec![current]
                }
            }
            _ => self
                .registry
                .iter()
                .filter(|action| {
                    action
                        .option_strings()
                        .iter()
                        .all(|s| !existing.contains(s.as_str()))
                })
                .flat_map(|action| action.option_strings().iter().map(String::as_str))
                .collect(),
        };

        let candidates: Vec<String> = possible
            .into_iter()
            .filter(|candidate| candidate.starts_with(current))
            .map(str::to_string)
            .collect();

        debug!(?candidates, "candidates");
        candidates
    }
}
