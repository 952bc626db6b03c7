//! Parsed expression types.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::SyntaxError;
use super::parser::Parser;
use super::value::Literal;

/// A parsed field expression.
///
/// Expressions are built once when a schema is loaded and reused for every
/// document. They serialize to and from their source text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Expression {
    /// A constant written as `||value`. Never evaluated against a document.
    Literal(String),
    /// `selector | transform(args) | ...`
    Selector(SelectorExpression),
}

impl Expression {
    /// Parses an expression string. See [`Parser`] for the grammar.
    pub fn parse(text: &str) -> Result<Self, SyntaxError> {
        Parser::parse(text)
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Expression::Literal(_))
    }

    pub fn selector(&self) -> Option<&str> {
        match self {
            Expression::Selector(expr) => Some(&expr.selector),
            Expression::Literal(_) => None,
        }
    }

    /// The transform chain, empty for literals.
    pub fn transforms(&self) -> &[TransformCall] {
        match self {
            Expression::Selector(expr) => &expr.transforms,
            Expression::Literal(_) => &[],
        }
    }
}

/// A CSS selector followed by an ordered transform chain.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectorExpression {
    /// Trimmed selector text, opaque to the parser.
    pub selector: String,
    /// Applied left to right.
    pub transforms: Vec<TransformCall>,
}

impl SelectorExpression {
    pub fn new(selector: impl Into<String>, transforms: Vec<TransformCall>) -> Self {
        Self {
            selector: selector.into(),
            transforms,
        }
    }
}

/// One `name(args...)` stage of a transform chain.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformCall {
    pub name: String,
    pub args: Vec<Literal>,
}

impl TransformCall {
    pub fn new(name: impl Into<String>, args: Vec<Literal>) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }
}

impl fmt::Display for TransformCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if !self.args.is_empty() {
            f.write_str("(")?;
            for (i, arg) in self.args.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{}", arg)?;
            }
            f.write_str(")")?;
        }
        Ok(())
    }
}

impl fmt::Display for SelectorExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.selector)?;
        for call in &self.transforms {
            write!(f, " | {}", call)?;
        }
        Ok(())
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Literal(value) => write!(f, "||{}", value),
            Expression::Selector(expr) => expr.fmt(f),
        }
    }
}

impl TryFrom<String> for Expression {
    type Error = SyntaxError;

    fn try_from(text: String) -> Result<Self, Self::Error> {
        Expression::parse(&text)
    }
}

impl From<Expression> for String {
    fn from(expr: Expression) -> Self {
        expr.to_string()
    }
}
