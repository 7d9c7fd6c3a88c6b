use std::io::{self, BufRead};

use tracing::debug;

use crate::app::AppError;

/// Source of input lines for the shell.
pub trait LineReader {
    /// Next line without its line terminator, or `None` at end of input.
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>>;
}

impl<R: LineReader + ?Sized> LineReader for Box<R> {
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        (**self).read_line(prompt)
    }
}

/// Reads lines from a buffered stream, such as piped stdin. No prompt is shown.
pub struct StreamReader<R> {
    inner: R,
}

impl<R: BufRead> StreamReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }
}

impl<R: BufRead> LineReader for StreamReader<R> {
    fn read_line(&mut self, _prompt: &str) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.inner.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }
        Ok(Some(line))
    }
}

/// Where the shell takes its lines from, decided once before the loop starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputMode {
    /// A single line assembled from trailing command-line arguments.
    Batch(String),
    /// Line after line from the reader.
    Lines,
}

impl InputMode {
    /// Trailing arguments win unless interactive mode was forced.
    pub fn select(forced_interactive: bool, remainder: &[String]) -> Self {
        let remainder = match remainder.split_first() {
            Some((first, rest)) if first == "--" => rest,
            _ => remainder,
        };
        if forced_interactive || remainder.is_empty() {
            InputMode::Lines
        } else {
            InputMode::Batch(remainder.join(" "))
        }
    }
}

/// Lazy sequence of input lines. Not restartable: once it has ended it
/// keeps returning `None`.
pub struct Lines<'a> {
    mode: Option<InputMode>,
    reader: &'a mut dyn LineReader,
    prompt: String,
}

impl<'a> Lines<'a> {
    pub fn new(mode: InputMode, reader: &'a mut dyn LineReader, prompt: impl Into<String>) -> Self {
        Self {
            mode: Some(mode),
            reader,
            prompt: prompt.into(),
        }
    }
}

impl Iterator for Lines<'_> {
    type Item = Result<String, AppError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.mode.take()? {
            InputMode::Batch(line) => Some(Ok(line)),
            InputMode::Lines => match self.reader.read_line(&self.prompt) {
                Ok(Some(line)) => {
                    self.mode = Some(InputMode::Lines);
                    Some(Ok(line))
                }
                Ok(None) => {
                    debug!("end of input");
                    None
                }
                Err(e) => Some(Err(AppError::Input(e))),
            },
        }
    }
}
