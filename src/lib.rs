//! Building blocks for command-line applications: a builder over clap,
//! logging setup, option completion for bash and line editors, and an
//! interactive shell that dispatches lines to registered applications.

pub mod app;
pub mod completion;
pub mod interactive;
pub mod logging;

pub use app::{Abort, AppConfig, AppError, Application, Capabilities, Invocation, ShellConfig};
pub use completion::{CommandCompleter, Complete, CompletionRequest};
pub use interactive::{InteractiveCompleter, InteractiveShell};
