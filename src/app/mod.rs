pub mod application;
pub mod config;
pub mod error;

pub use application::{exit, Application, Invocation, MainFn};
pub use config::{AppConfig, Capabilities, ShellConfig};
pub use error::{Abort, AppError};
