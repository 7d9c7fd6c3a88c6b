use std::io;

use thiserror::Error;

/// Raised by a main function that wants to stop its own run.
///
/// Inside an interactive shell this ends the current command only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("aborted with status {status}")]
pub struct Abort {
    pub status: i32,
}

impl Abort {
    pub fn new(status: i32) -> Self {
        Self { status }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Abort(#[from] Abort),

    #[error(transparent)]
    Usage(#[from] clap::Error),

    #[error("Failed to read from stdin: {0}")]
    Input(#[source] io::Error),

    #[error("Failed to write output: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Main(anyhow::Error),
}

impl AppError {
    /// Turn an error returned by a main function into an `AppError`,
    /// recognising an `Abort` anywhere in it.
    pub fn from_main(err: anyhow::Error) -> Self {
        match err.downcast::<Abort>() {
            Ok(abort) => AppError::Abort(abort),
            Err(err) => AppError::Main(err),
        }
    }

    pub fn exit_status(&self) -> i32 {
        match self {
            AppError::Abort(abort) => abort.status,
            AppError::Usage(err) => err.exit_code(),
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_main_recognises_abort() {
        let err = AppError::from_main(anyhow::Error::new(Abort::new(3)));
        assert!(matches!(err, AppError::Abort(Abort { status: 3 })));
        assert_eq!(err.exit_status(), 3);
    }

    #[test]
    fn test_from_main_keeps_other_errors() {
        let err = AppError::from_main(anyhow::anyhow!("boom"));
        assert!(matches!(err, AppError::Main(_)));
        assert_eq!(err.exit_status(), 1);
        assert_eq!(err.to_string(), "boom");
    }

    #[test]
    fn test_input_error_message() {
        let err = AppError::Input(io::Error::new(io::ErrorKind::Other, "closed"));
        assert_eq!(err.to_string(), "Failed to read from stdin: closed");
    }
}
