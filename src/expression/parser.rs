//! Expression string parser.
//!
//! A hand-written recursive descent parser over a single forward-moving
//! cursor. The grammar is:
//!
//! ```text
//! expr           := "||" anything | selector transform*
//! selector       := everything up to the first '|', trimmed
//! transform      := '|' sp identifier sp args? sp
//! args           := '(' sp argument (sp ',' sp argument)* sp ')'
//! identifier     := [A-Za-z_$-][A-Za-z0-9_$-]*
//! argument       := number | "..." | '...' | bare-word
//! ```
//!
//! Bare words `true`, `false`, `null` and `undefined` are keywords; any other
//! bare word is kept as a string.

use std::sync::OnceLock;

use regex::Regex;

use super::ast::{Expression, SelectorExpression, TransformCall};
use super::error::{Found, SyntaxError};
use super::value::Literal;

fn number_regex() -> &'static Regex {
    static NUMBER: OnceLock<Regex> = OnceLock::new();
    NUMBER.get_or_init(|| {
        Regex::new(r"^-?[0-9]+(?:\.[0-9]+)?(?:[eE][+-]?[0-9]+)?").expect("valid number regex")
    })
}

/// Parser for expression strings.
pub struct Parser<'a> {
    input: &'a str,
    position: usize,
}

impl<'a> Parser<'a> {
    /// Creates a parser positioned at the start of `input`.
    pub fn new(input: &'a str) -> Self {
        Self { input, position: 0 }
    }

    /// Parses `text` into an [`Expression`].
    pub fn parse(text: &str) -> Result<Expression, SyntaxError> {
        if let Some(literal) = text.strip_prefix("||") {
            return Ok(Expression::Literal(literal.to_string()));
        }

        let mut parser = Parser::new(text);
        parser.parse_selector_expression().map(Expression::Selector)
    }

    fn parse_selector_expression(&mut self) -> Result<SelectorExpression, SyntaxError> {
        let end = self.input.find('|').unwrap_or(self.input.len());
        let selector = self.input[..end].trim().to_string();
        self.position = end;

        let mut transforms = Vec::new();
        while self.peek() == Some('|') {
            self.next();
            transforms.push(self.parse_transform()?);
        }

        if !self.is_eof() {
            return Err(self.error("'|' or end of expression"));
        }

        Ok(SelectorExpression::new(selector, transforms))
    }

    /// Parses one `name(args)` stage, with the leading '|' already consumed.
    fn parse_transform(&mut self) -> Result<TransformCall, SyntaxError> {
        self.skip_spaces();
        let name = self.parse_identifier()?;
        self.skip_spaces();

        let mut args = Vec::new();
        if self.peek() == Some('(') {
            self.next();
            loop {
                self.skip_spaces();
                args.push(self.parse_argument()?);
                self.skip_spaces();

                match self.peek() {
                    Some(')') => {
                        self.next();
                        break;
                    }
                    Some(',') => {
                        self.next();
                    }
                    _ => return Err(self.error("')' or ','")),
                }
            }
            self.skip_spaces();
        }

        Ok(TransformCall::new(name, args))
    }

    /// Returns the current character without advancing.
    fn peek(&self) -> Option<char> {
        self.input[self.position..].chars().next()
    }

    /// Returns the current character and advances past it.
    fn next(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.position += ch.len_utf8();
        Some(ch)
    }

    fn is_eof(&self) -> bool {
        self.position >= self.input.len()
    }

    /// Skips U+0020 only; tabs and newlines are significant.
    fn skip_spaces(&mut self) {
        while self.peek() == Some(' ') {
            self.position += 1;
        }
    }

    fn error(&self, expected: &'static str) -> SyntaxError {
        SyntaxError {
            position: self.position,
            found: self.peek().map_or(Found::EndOfInput, Found::Char),
            expected,
            input: self.input.to_string(),
        }
    }

    fn scan_identifier(&mut self) -> &'a str {
        let start = self.position;
        while let Some(ch) = self.peek() {
            let allowed = if self.position == start {
                is_identifier_start(ch)
            } else {
                is_identifier_start(ch) || ch.is_ascii_digit()
            };
            if !allowed {
                break;
            }
            self.position += 1;
        }
        &self.input[start..self.position]
    }

    fn parse_identifier(&mut self) -> Result<String, SyntaxError> {
        let name = self.scan_identifier();
        if name.is_empty() {
            return Err(self.error("identifier"));
        }
        Ok(name.to_string())
    }

    /// Dispatches on the first character of an argument.
    fn parse_argument(&mut self) -> Result<Literal, SyntaxError> {
        match self.peek() {
            Some(c) if c.is_ascii_digit() || c == '-' => self.parse_number(),
            Some(quote @ ('"' | '\'')) => {
                self.next();
                self.parse_quoted_string(quote).map(Literal::String)
            }
            Some(c) if is_identifier_start(c) => Ok(match self.scan_identifier() {
                "true" => Literal::Boolean(true),
                "false" => Literal::Boolean(false),
                "null" => Literal::Null,
                "undefined" => Literal::Undefined,
                word => Literal::String(word.to_string()),
            }),
            _ => Err(self.error("argument")),
        }
    }

    fn parse_number(&mut self) -> Result<Literal, SyntaxError> {
        let input = self.input;
        let rest = &input[self.position..];
        let Some(found) = number_regex().find(rest) else {
            return Err(self.error("number"));
        };

        let value = found
            .as_str()
            .parse::<f64>()
            .map_err(|_| self.error("number"))?;
        self.position += found.end();
        Ok(Literal::Number(value))
    }

    /// Scans to the matching `quote`, with the opening quote already consumed.
    fn parse_quoted_string(&mut self, quote: char) -> Result<String, SyntaxError> {
        let mut value = String::new();
        loop {
            match self.peek() {
                None => return Err(self.error("closing quote")),
                Some(ch) if ch == quote => {
                    self.next();
                    return Ok(value);
                }
                Some('\\') => {
                    self.next();
                    value.push(self.parse_escape()?);
                }
                Some(ch) if (ch as u32) <= 0x1f => return Err(self.error("closing quote")),
                Some(ch) => {
                    value.push(ch);
                    self.next();
                }
            }
        }
    }

    /// Parses the escape after a backslash.
    fn parse_escape(&mut self) -> Result<char, SyntaxError> {
        let ch = match self.peek() {
            Some('b') => '\u{08}',
            Some('f') => '\u{0c}',
            Some('n') => '\n',
            Some('r') => '\r',
            Some('t') => '\t',
            Some('\\') => '\\',
            Some('/') => '/',
            Some('"') => '"',
            Some('u') => {
                self.next();
                return self.parse_unicode_escape();
            }
            _ => return Err(self.error("escape sequence")),
        };
        self.next();
        Ok(ch)
    }

    /// Parses the four hex digits of a `\u` escape, combining a UTF-16
    /// surrogate pair when a low surrogate escape follows a high one.
    fn parse_unicode_escape(&mut self) -> Result<char, SyntaxError> {
        let high = self.parse_hex4()?;

        if (0xd800..0xdc00).contains(&high) && self.input[self.position..].starts_with("\\u") {
            let saved = self.position;
            self.position += 2;
            let low = self.parse_hex4()?;
            if (0xdc00..0xe000).contains(&low) {
                let code = 0x10000 + ((high - 0xd800) << 10) + (low - 0xdc00);
                return Ok(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER));
            }
            // Not a pair: leave the second escape for the string loop.
            self.position = saved;
        }

        Ok(char::from_u32(high).unwrap_or(char::REPLACEMENT_CHARACTER))
    }

    fn parse_hex4(&mut self) -> Result<u32, SyntaxError> {
        let input = self.input;
        let rest = &input[self.position..];
        if rest.len() < 4 {
            self.position = self.input.len();
            return Err(self.error("4 hex digits"));
        }

        let digits = rest
            .get(..4)
            .filter(|d| d.bytes().all(|b| b.is_ascii_hexdigit()))
            .ok_or_else(|| self.error("4 hex digits"))?;
        let code = u32::from_str_radix(digits, 16).map_err(|_| self.error("4 hex digits"))?;
        self.position += 4;
        Ok(code)
    }
}

fn is_identifier_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || matches!(ch, '_' | '-' | '$')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn calls(text: &str) -> Vec<TransformCall> {
        Parser::parse(text).unwrap().transforms().to_vec()
    }

    fn single_arg(text: &str) -> Literal {
        let mut calls = calls(text);
        assert_eq!(calls.len(), 1);
        let mut args = calls.remove(0).args;
        assert_eq!(args.len(), 1);
        args.remove(0)
    }

    #[test]
    fn test_parse_selector_only() {
        let expr = Parser::parse("   div.content h1   ").unwrap();
        assert_eq!(expr.selector(), Some("div.content h1"));
        assert!(expr.transforms().is_empty());
    }

    #[test]
    fn test_parse_literal_is_verbatim() {
        assert_eq!(
            Parser::parse("||  keep | this  ").unwrap(),
            Expression::Literal("  keep | this  ".to_string())
        );
        assert_eq!(Parser::parse("||").unwrap(), Expression::Literal(String::new()));
    }

    #[test]
    fn test_parse_single_pipe_is_not_literal() {
        let expr = Parser::parse("| trim").unwrap();
        assert_eq!(expr.selector(), Some(""));
        assert_eq!(expr.transforms()[0].name, "trim");
    }

    #[test]
    fn test_parse_transform_without_args() {
        let calls = calls("   h1   |  toLowerCase  ");
        assert_eq!(calls, vec![TransformCall::new("toLowerCase", vec![])]);
    }

    #[test]
    fn test_parse_identifier_charset() {
        let calls = calls("h1 | some-func_name2 | $dollar | to$Array");
        let names: Vec<_> = calls.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["some-func_name2", "$dollar", "to$Array"]);
    }

    #[test]
    fn test_parse_keyword_arguments() {
        assert_eq!(single_arg("h1 | f(true)"), Literal::Boolean(true));
        assert_eq!(single_arg("h1 | f(false)"), Literal::Boolean(false));
        assert_eq!(single_arg("h1 | f(null)"), Literal::Null);
        assert_eq!(single_arg("h1 | f(undefined)"), Literal::Undefined);
        assert_eq!(single_arg("h1 | f(True)"), Literal::String("True".to_string()));
        assert_eq!(single_arg("h1 | f(arg1)"), Literal::String("arg1".to_string()));
    }

    #[test]
    fn test_parse_number_arguments() {
        assert_eq!(single_arg("h1 | f( 123 )"), Literal::Number(123.0));
        assert_eq!(single_arg("h1 | f(-123.456)"), Literal::Number(-123.456));
        assert_eq!(single_arg("h1 | f(0.123)"), Literal::Number(0.123));
        assert_eq!(single_arg("h1 | f(1e3)"), Literal::Number(1000.0));
        assert_eq!(single_arg("h1 | f(2.5E-1)"), Literal::Number(0.25));
    }

    #[test]
    fn test_parse_number_rejects_bare_minus() {
        let err = Parser::parse("h1 | f(-)").unwrap_err();
        assert_eq!(err.position, 7);
        assert_eq!(err.expected, "number");
    }

    #[test]
    fn test_parse_escapes() {
        assert_eq!(
            single_arg(r#"h1 | f("a\tb\n\"c\"\\\/")"#),
            Literal::String("a\tb\n\"c\"\\/".to_string())
        );
        assert_eq!(single_arg(r"h1 | f('\u00e9\u00C9')"), Literal::String("éÉ".to_string()));
    }

    #[test]
    fn test_parse_surrogate_pair_escape() {
        assert_eq!(single_arg(r#"h1 | f("\ud83d\ude00")"#), Literal::String("😀".to_string()));
        assert_eq!(
            single_arg(r#"h1 | f("\ud83dx")"#),
            Literal::String("\u{fffd}x".to_string())
        );
    }

    #[test]
    fn test_parse_unknown_escape_fails() {
        let err = Parser::parse(r#"h1 | f("\q")"#).unwrap_err();
        assert_eq!(err.found, Found::Char('q'));
        assert_eq!(err.expected, "escape sequence");
    }

    #[test]
    fn test_parse_single_quote_escape_fails() {
        assert!(Parser::parse(r"h1 | f('it\'s')").is_err());
    }

    #[test]
    fn test_parse_short_unicode_escape_fails() {
        let err = Parser::parse(r#"h1 | f("\u12"#).unwrap_err();
        assert!(err.is_unexpected_end());

        let err = Parser::parse(r#"h1 | f("\uzzzz")"#).unwrap_err();
        assert_eq!(err.found, Found::Char('z'));
    }

    #[test]
    fn test_parse_unterminated_string_fails() {
        let err = Parser::parse("h1 | f('abc").unwrap_err();
        assert!(err.is_unexpected_end());
        assert_eq!(err.position, 11);
    }

    #[test]
    fn test_parse_control_char_in_string_fails() {
        let err = Parser::parse("h1 | f('a\nb')").unwrap_err();
        assert_eq!(err.position, 9);
        assert_eq!(err.found, Found::Char('\n'));
        assert!(err.to_string().contains("control char 0xa"));
    }

    #[test]
    fn test_parse_trailing_garbage_fails() {
        let err = Parser::parse("h1 | toLowerCase trash").unwrap_err();
        assert_eq!(err.position, 17);
        assert_eq!(err.found, Found::Char('t'));
    }

    #[test]
    fn test_parse_digit_identifier_fails() {
        let err = Parser::parse("h1 | 2bad").unwrap_err();
        assert_eq!(err.position, 5);
        assert_eq!(err.expected, "identifier");
    }

    #[test]
    fn test_parse_missing_identifier_fails() {
        assert!(Parser::parse("h1 |").unwrap_err().is_unexpected_end());
        assert!(Parser::parse("h1 | a ||").is_err());
    }

    #[test]
    fn test_parse_bad_argument_separator_fails() {
        let err = Parser::parse("h1 | f(a b)").unwrap_err();
        assert_eq!(err.found, Found::Char('b'));
        assert_eq!(err.expected, "')' or ','");
    }

    #[test]
    fn test_parse_empty_argument_list_fails() {
        let err = Parser::parse("h1 | f()").unwrap_err();
        assert_eq!(err.found, Found::Char(')'));
        assert_eq!(err.expected, "argument");
    }

    #[test]
    fn test_parse_tab_is_not_a_space() {
        assert!(Parser::parse("h1 | trim\t").is_err());
    }
}
