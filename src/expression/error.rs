//! Error types for expression parsing and evaluation.

use std::fmt;

use thiserror::Error;

use crate::document::DocumentError;
use crate::transform::TransformError;

/// What the parser found where it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Found {
    EndOfInput,
    Char(char),
}

impl fmt::Display for Found {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Found::EndOfInput => f.write_str("end of expression"),
            Found::Char(c) if (*c as u32) <= 0x1f => write!(f, "control char 0x{:x}", *c as u32),
            Found::Char(c) => write!(f, "'{}'", c),
        }
    }
}

/// A syntax error in an expression string.
///
/// `position` is a byte offset into `input`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Parse error, unexpected {found} at {position} (expected {expected}) in expression: {input}")]
pub struct SyntaxError {
    pub position: usize,
    pub found: Found,
    pub expected: &'static str,
    pub input: String,
}

impl SyntaxError {
    pub fn is_unexpected_end(&self) -> bool {
        self.found == Found::EndOfInput
    }
}

/// Failure while evaluating a parsed expression against a document.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("Transform '{0}' is not defined")]
    UnknownTransform(String),

    #[error("Transform '{name}' {source}")]
    Transform {
        name: String,
        #[source]
        source: TransformError,
    },

    #[error(transparent)]
    Query(#[from] DocumentError),
}
