//! The field expression language.
//!
//! An expression is a CSS selector followed by an optional chain of
//! transforms, or a constant:
//!
//! ```text
//! div.content h1                     text of the matched nodes
//! h1 | toUpperCase                   transformed text
//! a.next | attr(href)                attribute of the first match
//! li | toArray | trim | join(", ")   element-wise, then joined
//! ||Some constant                    the literal string "Some constant"
//! ```
//!
//! # Examples
//!
//! ```
//! use wxport::expression::{evaluate, Datum, Expression, Extraction};
//! use wxport::document::HtmlDocument;
//! use wxport::transform::TransformChain;
//!
//! let doc = HtmlDocument::parse("<h1>Hello</h1>");
//! let expr = Expression::parse("h1 | toUpperCase").unwrap();
//! let out = evaluate(&expr, &doc, &TransformChain::builtin()).unwrap();
//! assert_eq!(out, Extraction::Value(Datum::from("HELLO")));
//! ```

pub mod ast;
pub mod error;
pub mod evaluator;
pub mod parser;
pub mod value;

pub use ast::{Expression, SelectorExpression, TransformCall};
pub use error::{EvalError, Found, SyntaxError};
pub use evaluator::{evaluate, Evaluator, Extraction};
pub use parser::Parser;
pub use value::{format_number, Datum, Literal};
