use thiserror::Error;

/// Everything that can go wrong while checking a grammar, evaluating argv
/// against it, or dispatching callbacks.
#[derive(Error, Debug)]
pub enum Error {
    /// The command tree itself is malformed.
    #[error("invalid grammar for command '{command}': {reason}")]
    Grammar { command: String, reason: String },

    #[error("unknown flag: {0}")]
    UnknownFlag(String),

    #[error("option {0} requires a value")]
    MissingValue(String),

    #[error("option {0} does not take a value")]
    UnexpectedValue(String),

    #[error("invalid parameter count for '{command}': expected {}, found {found}", expected(.min, .max))]
    InvalidParameterCount {
        command: String,
        min: usize,
        max: usize,
        found: usize,
    },

    #[error("parameter at index {0} not found")]
    ParameterAccess(usize),

    /// Failure returned by a caller-supplied callback, passed through as is.
    #[error(transparent)]
    Callback(#[from] anyhow::Error),
}

impl Error {
    pub(crate) fn grammar(command: &str, reason: impl Into<String>) -> Self {
        Self::Grammar {
            command: command.to_string(),
            reason: reason.into(),
        }
    }

    /// Whether this error was caused by the grammar rather than by the input.
    pub fn is_grammar(&self) -> bool {
        matches!(self, Self::Grammar { .. })
    }
}

fn expected(min: &usize, max: &usize) -> String {
    if min == max {
        min.to_string()
    } else {
        format!("{min}..={max}")
    }
}

pub type Result<T> = std::result::Result<T, Error>;
