use tracing::debug;

use super::completer::{Complete, CompletionRequest};

/// Characters that end a word for completion purposes.
///
/// This is the usual readline set without `-`, so that option flags are
/// completed as whole tokens.
pub const COMPLETER_DELIMS: &str = " \t\n`~!@#$%^&*()=+[{]}\\|;:'\",<>/?";

/// Split a line at the start of the word under the cursor (the end of the
/// line). Returns the byte offset of that word and the word itself.
pub fn word_at_end(line: &str) -> (usize, &str) {
    let begidx = line
        .char_indices()
        .rev()
        .find(|(_, c)| COMPLETER_DELIMS.contains(*c))
        .map(|(i, c)| i + c.len_utf8())
        .unwrap_or(0);
    (begidx, &line[begidx..])
}

/// Hands out candidates one at a time, the way a line editor asks for them:
/// `state` 0 computes a fresh list, higher states walk through it.
#[derive(Debug, Clone)]
pub struct CandidateCycle<C> {
    completer: C,
    candidates: Vec<String>,
}

impl<C: Complete> CandidateCycle<C> {
    pub fn new(completer: C) -> Self {
        Self {
            completer,
            candidates: Vec::new(),
        }
    }

    pub fn completer(&self) -> &C {
        &self.completer
    }

    /// Candidates computed by the last `state == 0` call.
    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    /// Candidate number `state` for `text`, the word starting at `begidx`
    /// within `line`. A lone candidate gets a trailing space so the editor
    /// moves on to the next word.
    pub fn next(&mut self, line: &str, text: &str, begidx: usize, state: usize) -> Option<String> {
        if state == 0 {
            let words: Vec<String> = line.split_whitespace().map(str::to_string).collect();
            let first = words.first().cloned().unwrap_or_default();
            let previous = if text.is_empty() {
                words.last()
            } else {
                words.len().checked_sub(2).and_then(|i| words.get(i))
            }
            .cloned()
            .unwrap_or_default();

            let request = CompletionRequest::new(first, text, previous, words, begidx);
            self.candidates = self.completer.complete(&request);
        }

        let response = self.candidates.get(state).map(|candidate| {
            if self.candidates.len() == 1 {
                format!("{} ", candidate)
            } else {
                candidate.clone()
            }
        });
        debug!(text, state, ?response, "next candidate");
        response
    }

    /// Every candidate for the word at the end of `line`.
    pub fn all(&mut self, line: &str) -> Vec<String> {
        let (begidx, text) = word_at_end(line);
        (0..)
            .map_while(|state| self.next(line, text, begidx, state))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::completer::CommandCompleter;
    use crate::completion::registry::{Action, Arity, Registry};

    fn cycle() -> CandidateCycle<CommandCompleter> {
        let registry: Registry = [
            Action::new("long", ["--long"], Arity::Flag),
            Action::new("all", ["-a", "--all"], Arity::Flag),
        ]
        .into_iter()
        .collect();
        CandidateCycle::new(CommandCompleter::new(registry))
    }

    #[test]
    fn test_word_at_end_keeps_dashes() {
        assert_eq!(word_at_end("ls --al"), (3, "--al"));
        assert_eq!(word_at_end("ls "), (3, ""));
        assert_eq!(word_at_end("ls"), (0, "ls"));
        assert_eq!(word_at_end(""), (0, ""));
    }

    #[test]
    fn test_next_walks_candidates_until_exhausted() {
        let mut cycle = cycle();
        assert_eq!(cycle.next("ls -", "-", 3, 0), Some("--long".to_string()));
        assert_eq!(cycle.next("ls -", "-", 3, 1), Some("-a".to_string()));
        assert_eq!(cycle.next("ls -", "-", 3, 2), Some("--all".to_string()));
        assert_eq!(cycle.next("ls -", "-", 3, 3), None);
    }

    #[test]
    fn test_next_appends_space_to_single_candidate() {
        let mut cycle = cycle();
        assert_eq!(cycle.next("ls --lo", "--lo", 3, 0), Some("--long ".to_string()));
        assert_eq!(cycle.next("ls --lo", "--lo", 3, 1), None);
    }

    #[test]
    fn test_next_uses_last_word_as_previous_for_empty_text() {
        let mut cycle = cycle();
        assert_eq!(cycle.all("ls --long "), vec!["-a", "--all"]);
        assert_eq!(cycle.candidates(), &["-a".to_string(), "--all".to_string()]);
    }
}
