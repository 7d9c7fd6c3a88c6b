pub mod commands;
pub mod completer;
pub mod dispatch;
pub mod input;
pub mod line_editor;

pub use commands::{CommandMap, SubCommand};
pub use completer::InteractiveCompleter;
pub use dispatch::InteractiveShell;
pub use input::{InputMode, LineReader, Lines, StreamReader};
pub use line_editor::LineEditor;
