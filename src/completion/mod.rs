pub mod completer;
pub mod cycle;
pub mod registry;
pub mod script;

pub use completer::{CommandCompleter, Complete, CompletionRequest};
pub use cycle::CandidateCycle;
pub use registry::{Action, Arity, Registry};
