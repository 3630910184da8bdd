use thiserror::Error;

/// Errors raised while reading, merging or replaying a change log.
///
/// Every malformed line is an error: silently dropping a line would lose a
/// customization for good.
#[derive(Error, Debug)]
pub enum ChangeLogError {
    #[error("cannot tokenize line {line:?}: {reason}")]
    Tokenize { line: String, reason: String },

    #[error("unknown command: {0}")]
    UnknownCommand(String),

    #[error("command {command} is recorded with {expected} parameters (key plus value), got {got}")]
    KeyArity {
        command: String,
        expected: usize,
        got: usize,
    },

    #[error("command {0} does not modify the filter and cannot be recorded")]
    NotAMutator(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Core(#[from] dlf_core::CoreError),
}

pub type Result<T> = std::result::Result<T, ChangeLogError>;
