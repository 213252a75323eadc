use crate::registry::Arity;
use thiserror::Error;

/// What went wrong while parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntaxErrorKind {
    /// The input was empty or contained only whitespace.
    Empty,
    /// A token appeared where the grammar does not allow it.
    UnexpectedToken,
    /// An opening parenthesis was never closed, or a closing one was never opened.
    UnmatchedParen,
    /// A complete expression was followed by more input.
    TrailingInput,
    /// The expression nests deeper than the parser allows.
    TooDeep,
}

/// A malformed expression. Nothing of it is ever evaluated.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message} at position {position}")]
pub struct SyntaxError {
    pub kind: SyntaxErrorKind,
    /// Byte offset into the input.
    pub position: usize,
    pub message: String,
}

impl SyntaxError {
    pub fn new(kind: SyntaxErrorKind, position: usize, message: impl Into<String>) -> Self {
        Self {
            kind,
            position,
            message: message.into(),
        }
    }
}

/// Failures raised while walking a well-formed tree.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error("unknown name '{0}'")]
    UnknownName(String),

    #[error("unknown function '{0}'")]
    UnknownFunction(String),

    #[error("{name}() takes {expected} argument(s), got {got}")]
    ArityMismatch {
        name: String,
        expected: Arity,
        got: usize,
    },

    /// The function was found and called, but reported an error itself.
    #[error("{name}(): {message}")]
    FunctionFailed { name: String, message: String },

    #[error("expression nesting exceeds the limit of {0}")]
    DepthExceeded(usize),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegistryError {
    #[error("'{0}' is not a valid name")]
    InvalidName(String),

    #[error("constant '{name}' is already defined as {existing}, cannot redefine it as {value}")]
    ConstantConflict {
        name: String,
        existing: f64,
        value: f64,
    },
}

/// Anything `parse` followed by `evaluate` can fail with.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("syntax error: {0}")]
    Syntax(#[from] SyntaxError),

    #[error(transparent)]
    Eval(#[from] EvalError),
}

pub type Result<T> = std::result::Result<T, Error>;
