//! Literal argument values and the runtime accumulator type.
//!
//! `Literal` is what the parser produces for transform arguments. `Datum` is
//! what flows between transform stages at evaluation time: it can hold a node
//! set borrowed from the document, a list, or any literal kind.

use std::fmt;

use crate::document::NodeRef;

/// A literal argument value.
///
/// `Null` and `Undefined` are distinct: `undefined` in an argument list means
/// "absent", which lets a transform fall back to its default.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    String(String),
    Number(f64),
    Boolean(bool),
    Null,
    Undefined,
}

impl Literal {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Literal::String(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric view of the literal, following loose scripting conversions:
    /// booleans are 0/1, null is 0, numeric strings parse, everything else is NaN.
    pub fn to_number(&self) -> f64 {
        match self {
            Literal::Number(n) => *n,
            Literal::Boolean(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            Literal::Null => 0.0,
            Literal::Undefined => f64::NAN,
            Literal::String(s) => {
                let t = s.trim();
                if t.is_empty() {
                    0.0
                } else {
                    t.parse().unwrap_or(f64::NAN)
                }
            }
        }
    }

    /// String view used when a literal is spliced into text (`join`, `padStart`).
    pub fn to_text(&self) -> String {
        match self {
            Literal::String(s) => s.clone(),
            Literal::Number(n) => format_number(*n),
            Literal::Boolean(b) => b.to_string(),
            Literal::Null => "null".to_string(),
            Literal::Undefined => "undefined".to_string(),
        }
    }
}

/// Writes the literal back in expression syntax, so that the output re-parses
/// to an equal value.
impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::String(s) => write_quoted(f, s),
            Literal::Number(n) if n.is_infinite() => {
                f.write_str(if *n > 0.0 { "1e999" } else { "-1e999" })
            }
            Literal::Number(n) => f.write_str(&format_number(*n)),
            Literal::Boolean(b) => write!(f, "{}", b),
            Literal::Null => f.write_str("null"),
            Literal::Undefined => f.write_str("undefined"),
        }
    }
}

fn write_quoted(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    f.write_str("\"")?;
    for ch in s.chars() {
        match ch {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            '\u{08}' => f.write_str("\\b")?,
            '\u{0c}' => f.write_str("\\f")?,
            c if (c as u32) <= 0x1f => write!(f, "\\u{:04x}", c as u32)?,
            c => write!(f, "{}", c)?,
        }
    }
    f.write_str("\"")
}

/// Formats a number the way scripting output does: integral values print
/// without a fractional part.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if n == n.trunc() && n.abs() < 1e21 {
        // -0 prints as 0
        format!("{}", n as i128)
    } else {
        format!("{}", n)
    }
}

/// The value threaded through a transform chain.
#[derive(Debug, Clone)]
pub enum Datum<'d> {
    /// Nodes matched in a document, in document order.
    Nodes(NodeRef<'d>),
    List(Vec<Datum<'d>>),
    String(String),
    Number(f64),
    Boolean(bool),
    Null,
    Undefined,
}

impl<'d> Datum<'d> {
    /// Short kind name used in type mismatch messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Datum::Nodes(_) => "instance of NodeSet",
            Datum::List(_) => "instance of List",
            Datum::String(_) => "string",
            Datum::Number(_) => "number",
            Datum::Boolean(_) => "boolean",
            Datum::Null => "null",
            Datum::Undefined => "undefined",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Datum::String(s) => Some(s),
            _ => None,
        }
    }

    /// Text rendering of any datum. Node sets yield their text content and
    /// lists are comma-joined.
    pub fn to_text(&self) -> String {
        match self {
            Datum::Nodes(nodes) => nodes.text(),
            Datum::List(items) => items
                .iter()
                .map(Datum::to_join_text)
                .collect::<Vec<_>>()
                .join(","),
            Datum::String(s) => s.clone(),
            Datum::Number(n) => format_number(*n),
            Datum::Boolean(b) => b.to_string(),
            Datum::Null => "null".to_string(),
            Datum::Undefined => "undefined".to_string(),
        }
    }

    /// Like `to_text`, except nullish values become empty strings.
    pub(crate) fn to_join_text(&self) -> String {
        match self {
            Datum::Null | Datum::Undefined => String::new(),
            other => other.to_text(),
        }
    }

    /// Converts the datum into JSON for output records.
    ///
    /// Returns `None` for `Undefined`, which means "omit this field".
    pub fn to_json(&self) -> Option<serde_json::Value> {
        use serde_json::Value;

        Some(match self {
            Datum::Nodes(nodes) => Value::String(nodes.text()),
            Datum::List(items) => Value::Array(
                items
                    .iter()
                    .map(|item| item.to_json().unwrap_or(Value::Null))
                    .collect(),
            ),
            Datum::String(s) => Value::String(s.clone()),
            Datum::Number(n) => number_to_json(*n),
            Datum::Boolean(b) => Value::Bool(*b),
            Datum::Null => Value::Null,
            Datum::Undefined => return None,
        })
    }
}

fn number_to_json(n: f64) -> serde_json::Value {
    if n == n.trunc() && n.abs() < 9.007_199_254_740_992e15 {
        serde_json::Value::from(n as i64)
    } else {
        serde_json::Number::from_f64(n)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null)
    }
}

impl From<Literal> for Datum<'_> {
    fn from(literal: Literal) -> Self {
        match literal {
            Literal::String(s) => Datum::String(s),
            Literal::Number(n) => Datum::Number(n),
            Literal::Boolean(b) => Datum::Boolean(b),
            Literal::Null => Datum::Null,
            Literal::Undefined => Datum::Undefined,
        }
    }
}

impl From<String> for Datum<'_> {
    fn from(s: String) -> Self {
        Datum::String(s)
    }
}

impl From<&str> for Datum<'_> {
    fn from(s: &str) -> Self {
        Datum::String(s.to_string())
    }
}

impl PartialEq for Datum<'_> {
    /// Node sets compare by their rendered markup; everything else structurally.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Datum::Nodes(a), Datum::Nodes(b)) => {
                a.len() == b.len() && a.html() == b.html() && a.text() == b.text()
            }
            (Datum::List(a), Datum::List(b)) => a == b,
            (Datum::String(a), Datum::String(b)) => a == b,
            (Datum::Number(a), Datum::Number(b)) => a == b,
            (Datum::Boolean(a), Datum::Boolean(b)) => a == b,
            (Datum::Null, Datum::Null) | (Datum::Undefined, Datum::Undefined) => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number_integral() {
        assert_eq!(format_number(3.0), "3");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(-123.456), "-123.456");
    }

    #[test]
    fn test_literal_display_escapes() {
        let lit = Literal::String("a\"b\\c\nd\u{1}".to_string());
        assert_eq!(lit.to_string(), r#""a\"b\\c\nd\u0001""#);
    }

    #[test]
    fn test_literal_to_number() {
        assert_eq!(Literal::String(" 12 ".to_string()).to_number(), 12.0);
        assert_eq!(Literal::Boolean(true).to_number(), 1.0);
        assert!(Literal::Undefined.to_number().is_nan());
        assert!(Literal::String("abc".to_string()).to_number().is_nan());
    }

    #[test]
    fn test_datum_to_json_omits_undefined() {
        assert_eq!(Datum::Undefined.to_json(), None);
        assert_eq!(Datum::Null.to_json(), Some(serde_json::Value::Null));
        assert_eq!(Datum::Number(4.0).to_json(), Some(serde_json::json!(4)));
        assert_eq!(Datum::Number(0.5).to_json(), Some(serde_json::json!(0.5)));
    }

    #[test]
    fn test_null_and_undefined_are_distinct() {
        assert_ne!(Literal::Null, Literal::Undefined);
        assert_ne!(Datum::Null, Datum::Undefined);
    }
}
