//! Transform registries.
//!
//! A transform is a named function from the current accumulator plus the
//! call's literal arguments to a new accumulator. Names are resolved through a
//! [`TransformLookup`]; [`TransformChain`] probes a caller-supplied registry
//! first and falls back to the built-ins.

pub mod builtins;

use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

use thiserror::Error;

use crate::document::DocumentError;
use crate::expression::{Datum, Literal};

/// Errors raised by a transform implementation.
///
/// The evaluator wraps these with the name of the failing transform.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransformError {
    #[error("expected {} {expected} but got {} {found}", article(.expected), article(.found))]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("rejected argument {index}: {message}")]
    InvalidArgument { index: usize, message: String },

    #[error("failed with error: {0}")]
    Failed(String),

    #[error("failed with error: {0}")]
    Document(#[from] DocumentError),
}

impl TransformError {
    pub fn mismatch(expected: &'static str, input: &Datum<'_>) -> Self {
        TransformError::TypeMismatch {
            expected,
            found: input.kind(),
        }
    }

    pub fn failed(message: impl fmt::Display) -> Self {
        TransformError::Failed(message.to_string())
    }
}

/// Picks "a" or "an" for a kind name.
fn article(word: &str) -> &'static str {
    match word.chars().next() {
        Some(c) if "aeiouyAEIOUY".contains(c) => "an",
        _ => "a",
    }
}

/// Result of a transform invocation.
pub type TransformResult<'d> = Result<Datum<'d>, TransformError>;

/// A named transform implementation.
///
/// Implemented for every `Fn(Datum, &[Literal]) -> TransformResult` closure
/// or function, so plain functions can be registered directly.
pub trait Transform: Send + Sync {
    fn apply<'d>(&self, input: Datum<'d>, args: &[Literal]) -> TransformResult<'d>;
}

impl<F> Transform for F
where
    F: for<'d> Fn(Datum<'d>, &[Literal]) -> TransformResult<'d> + Send + Sync,
{
    fn apply<'d>(&self, input: Datum<'d>, args: &[Literal]) -> TransformResult<'d> {
        self(input, args)
    }
}

/// Resolves transform names to implementations.
pub trait TransformLookup {
    fn lookup(&self, name: &str) -> Option<&dyn Transform>;
}

/// A map of transform names to implementations.
///
/// Names are case-sensitive.
#[derive(Default)]
pub struct TransformRegistry {
    transforms: HashMap<String, Box<dyn Transform>>,
}

impl TransformRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The shared registry of built-in transforms.
    pub fn builtin() -> &'static TransformRegistry {
        static BUILTIN: OnceLock<TransformRegistry> = OnceLock::new();
        BUILTIN.get_or_init(builtins::registry)
    }

    /// Registers `transform` under `name`, replacing any previous entry.
    pub fn register<F>(&mut self, name: impl Into<String>, transform: F)
    where
        F: for<'d> Fn(Datum<'d>, &[Literal]) -> TransformResult<'d> + Send + Sync + 'static,
    {
        self.transforms.insert(name.into(), Box::new(transform));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.transforms.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.transforms.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for TransformRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformRegistry")
            .field("names", &self.names())
            .finish()
    }
}

impl TransformLookup for TransformRegistry {
    fn lookup(&self, name: &str) -> Option<&dyn Transform> {
        self.transforms.get(name).map(|t| t.as_ref())
    }
}

/// Custom transforms first, built-ins second.
#[derive(Debug, Clone, Copy)]
pub struct TransformChain<'r> {
    custom: Option<&'r TransformRegistry>,
    builtin: &'r TransformRegistry,
}

impl<'r> TransformChain<'r> {
    /// A chain that only sees the built-in transforms.
    pub fn builtin() -> TransformChain<'static> {
        TransformChain {
            custom: None,
            builtin: TransformRegistry::builtin(),
        }
    }

    /// A chain that checks `custom` before the built-ins.
    pub fn with_custom(custom: &'r TransformRegistry) -> Self {
        Self {
            custom: Some(custom),
            builtin: TransformRegistry::builtin(),
        }
    }
}

impl Default for TransformChain<'static> {
    fn default() -> Self {
        TransformChain::builtin()
    }
}

impl TransformLookup for TransformChain<'_> {
    fn lookup(&self, name: &str) -> Option<&dyn Transform> {
        self.custom
            .and_then(|custom| custom.lookup(name))
            .or_else(|| self.builtin.lookup(name))
    }
}
