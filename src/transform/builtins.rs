//! Built-in transforms.
//!
//! Three families, each applied element-wise when handed a list:
//!
//! - node transforms (`text`, `html`, `attr`, `toArray`, `to$Array`, `find`)
//!   need a node set;
//! - string transforms coerce a node set to its text first;
//! - sequence transforms (`join`, `splice`, and `slice` on non-strings) turn a
//!   node set into a list of single-node sets first.
//!
//! String positions count characters, not bytes.

use crate::document::NodeRef;
use crate::expression::{Datum, Literal};

use super::{TransformError, TransformRegistry, TransformResult};

/// Longest string `repeat` and the padding transforms will build, in bytes.
const MAX_STRING_LEN: usize = 1 << 28;

pub(super) fn registry() -> TransformRegistry {
    let mut registry = TransformRegistry::new();

    // Node transforms
    registry.register("text", text);
    registry.register("html", html);
    registry.register("attr", attr);
    registry.register("toArray", to_array);
    registry.register("to$Array", to_array);
    registry.register("find", find);

    // String transforms
    registry.register("toLowerCase", to_lower_case);
    registry.register("toUpperCase", to_upper_case);
    registry.register("toLocaleLowerCase", to_lower_case);
    registry.register("toLocaleUpperCase", to_upper_case);
    registry.register("trim", trim);
    registry.register("trimStart", trim_start);
    registry.register("trimEnd", trim_end);
    registry.register("padStart", pad_start);
    registry.register("padEnd", pad_end);
    registry.register("repeat", repeat);
    registry.register("substring", substring);
    registry.register("split", split);

    // Sequence transforms
    registry.register("join", join);
    registry.register("slice", slice);
    registry.register("splice", splice);

    registry
}

// --- Argument helpers ---

fn arg(args: &[Literal], index: usize) -> &Literal {
    args.get(index).unwrap_or(&Literal::Undefined)
}

/// Integer view of an argument; `undefined` yields `default`, NaN yields 0.
fn integer_arg(args: &[Literal], index: usize, default: f64) -> f64 {
    match arg(args, index) {
        Literal::Undefined => default,
        literal => {
            let n = literal.to_number();
            if n.is_nan() {
                0.0
            } else {
                n.trunc()
            }
        }
    }
}

fn string_arg(args: &[Literal], index: usize, default: &str) -> String {
    match arg(args, index) {
        Literal::Undefined => default.to_string(),
        literal => literal.to_text(),
    }
}

/// Resolves a possibly negative index against `len`, clamped to `0..=len`.
fn relative_index(n: f64, len: usize) -> usize {
    let len_f = len as f64;
    if n < 0.0 {
        (len_f + n).max(0.0) as usize
    } else {
        n.min(len_f) as usize
    }
}

// --- Node transforms ---

fn map_nodes<'d>(
    input: Datum<'d>,
    f: &dyn Fn(&NodeRef<'d>) -> TransformResult<'d>,
) -> TransformResult<'d> {
    match input {
        Datum::List(items) => items
            .into_iter()
            .map(|item| map_nodes(item, f))
            .collect::<Result<Vec<_>, _>>()
            .map(Datum::List),
        Datum::Nodes(nodes) => f(&nodes),
        other => Err(TransformError::mismatch("node set", &other)),
    }
}

fn text<'d>(input: Datum<'d>, _args: &[Literal]) -> TransformResult<'d> {
    map_nodes(input, &|nodes| Ok(Datum::String(nodes.text())))
}

fn html<'d>(input: Datum<'d>, _args: &[Literal]) -> TransformResult<'d> {
    map_nodes(input, &|nodes| {
        Ok(nodes.html().map_or(Datum::Null, Datum::String))
    })
}

fn attr<'d>(input: Datum<'d>, args: &[Literal]) -> TransformResult<'d> {
    let name = arg(args, 0)
        .as_str()
        .ok_or_else(|| TransformError::InvalidArgument {
            index: 0,
            message: format!("attribute name must be a string, not {}", arg(args, 0)),
        })?;
    map_nodes(input, &|nodes| {
        Ok(nodes.attr(name).map_or(Datum::Undefined, Datum::String))
    })
}

fn to_array<'d>(input: Datum<'d>, _args: &[Literal]) -> TransformResult<'d> {
    map_nodes(input, &|nodes| {
        Ok(Datum::List(nodes.split().into_iter().map(Datum::Nodes).collect()))
    })
}

fn find<'d>(input: Datum<'d>, args: &[Literal]) -> TransformResult<'d> {
    let selector = arg(args, 0)
        .as_str()
        .ok_or_else(|| TransformError::InvalidArgument {
            index: 0,
            message: format!("selector must be a string, not {}", arg(args, 0)),
        })?;
    map_nodes(input, &|nodes| Ok(Datum::Nodes(nodes.query(selector)?)))
}

// --- String transforms ---

fn map_strings<'d>(
    input: Datum<'d>,
    f: &dyn Fn(&str) -> TransformResult<'d>,
) -> TransformResult<'d> {
    match input {
        Datum::Nodes(nodes) => f(&nodes.text()),
        Datum::List(items) => items
            .into_iter()
            .map(|item| map_strings(item, f))
            .collect::<Result<Vec<_>, _>>()
            .map(Datum::List),
        Datum::String(s) => f(&s),
        other => Err(TransformError::mismatch("string", &other)),
    }
}

fn to_lower_case<'d>(input: Datum<'d>, _args: &[Literal]) -> TransformResult<'d> {
    map_strings(input, &|s| Ok(Datum::String(s.to_lowercase())))
}

fn to_upper_case<'d>(input: Datum<'d>, _args: &[Literal]) -> TransformResult<'d> {
    map_strings(input, &|s| Ok(Datum::String(s.to_uppercase())))
}

fn trim<'d>(input: Datum<'d>, _args: &[Literal]) -> TransformResult<'d> {
    map_strings(input, &|s| Ok(Datum::from(s.trim())))
}

fn trim_start<'d>(input: Datum<'d>, _args: &[Literal]) -> TransformResult<'d> {
    map_strings(input, &|s| Ok(Datum::from(s.trim_start())))
}

fn trim_end<'d>(input: Datum<'d>, _args: &[Literal]) -> TransformResult<'d> {
    map_strings(input, &|s| Ok(Datum::from(s.trim_end())))
}

/// Builds the fill needed to grow `s` to `target` characters by cycling `pad`.
fn padding(s: &str, args: &[Literal]) -> Result<Option<String>, TransformError> {
    let target = integer_arg(args, 0, 0.0);
    let pad = string_arg(args, 1, " ");
    let len = s.chars().count();

    if target <= len as f64 || pad.is_empty() {
        return Ok(None);
    }
    if target * 4.0 > MAX_STRING_LEN as f64 {
        return Err(TransformError::InvalidArgument {
            index: 0,
            message: "resulting string is too long".to_string(),
        });
    }

    let fill = target as usize - len;
    Ok(Some(pad.chars().cycle().take(fill).collect()))
}

fn pad_start<'d>(input: Datum<'d>, args: &[Literal]) -> TransformResult<'d> {
    map_strings(input, &|s| {
        Ok(Datum::String(match padding(s, args)? {
            Some(fill) => fill + s,
            None => s.to_string(),
        }))
    })
}

fn pad_end<'d>(input: Datum<'d>, args: &[Literal]) -> TransformResult<'d> {
    map_strings(input, &|s| {
        Ok(Datum::String(match padding(s, args)? {
            Some(fill) => format!("{}{}", s, fill),
            None => s.to_string(),
        }))
    })
}

fn repeat<'d>(input: Datum<'d>, args: &[Literal]) -> TransformResult<'d> {
    let count = integer_arg(args, 0, 0.0);
    if count < 0.0 || count.is_infinite() {
        return Err(TransformError::InvalidArgument {
            index: 0,
            message: format!("invalid count value: {}", count),
        });
    }
    map_strings(input, &|s| {
        if (s.len() as f64) * count > MAX_STRING_LEN as f64 {
            return Err(TransformError::InvalidArgument {
                index: 0,
                message: "resulting string is too long".to_string(),
            });
        }
        Ok(Datum::String(s.repeat(count as usize)))
    })
}

fn char_range(s: &str, start: usize, end: usize) -> String {
    s.chars().skip(start).take(end.saturating_sub(start)).collect()
}

fn substring<'d>(input: Datum<'d>, args: &[Literal]) -> TransformResult<'d> {
    map_strings(input, &|s| {
        let len = s.chars().count();
        let clamp = |n: f64| n.max(0.0).min(len as f64) as usize;
        let start = clamp(integer_arg(args, 0, 0.0));
        let end = clamp(integer_arg(args, 1, len as f64));
        let (from, to) = if start > end { (end, start) } else { (start, end) };
        Ok(Datum::String(char_range(s, from, to)))
    })
}

fn split<'d>(input: Datum<'d>, args: &[Literal]) -> TransformResult<'d> {
    let limit = match arg(args, 1) {
        Literal::Undefined => usize::MAX,
        _ => integer_arg(args, 1, 0.0).rem_euclid(4_294_967_296.0) as usize,
    };
    map_strings(input, &|s| {
        let parts: Vec<Datum<'d>> = match arg(args, 0) {
            Literal::Undefined => vec![Datum::from(s)],
            separator => {
                let separator = separator.to_text();
                if separator.is_empty() {
                    s.chars().map(|c| Datum::String(c.to_string())).collect()
                } else {
                    s.split(separator.as_str()).map(Datum::from).collect()
                }
            }
        };
        Ok(Datum::List(parts.into_iter().take(limit).collect()))
    })
}

// --- Sequence transforms ---

fn into_sequence(input: Datum<'_>) -> Result<Vec<Datum<'_>>, TransformError> {
    match input {
        Datum::Nodes(nodes) => Ok(nodes.split().into_iter().map(Datum::Nodes).collect()),
        Datum::List(items) => Ok(items),
        other => Err(TransformError::mismatch("array", &other)),
    }
}

fn join<'d>(input: Datum<'d>, args: &[Literal]) -> TransformResult<'d> {
    let separator = string_arg(args, 0, ",");
    let items = into_sequence(input)?;
    Ok(Datum::String(
        items
            .iter()
            .map(Datum::to_join_text)
            .collect::<Vec<_>>()
            .join(separator.as_str()),
    ))
}

/// Slices a string by characters, or a node set or list by items.
fn slice<'d>(input: Datum<'d>, args: &[Literal]) -> TransformResult<'d> {
    if let Some(s) = input.as_str() {
        let len = s.chars().count();
        let start = relative_index(integer_arg(args, 0, 0.0), len);
        let end = relative_index(integer_arg(args, 1, len as f64), len);
        return Ok(Datum::String(char_range(s, start, end)));
    }

    let items = into_sequence(input)?;
    let len = items.len();
    let start = relative_index(integer_arg(args, 0, 0.0), len);
    let end = relative_index(integer_arg(args, 1, len as f64), len);
    Ok(Datum::List(
        items.into_iter().skip(start).take(end.saturating_sub(start)).collect(),
    ))
}

/// Returns the removed items, like `Array.prototype.splice`.
fn splice<'d>(input: Datum<'d>, args: &[Literal]) -> TransformResult<'d> {
    let items = into_sequence(input)?;
    if args.is_empty() {
        return Ok(Datum::List(Vec::new()));
    }

    let len = items.len();
    let start = relative_index(integer_arg(args, 0, 0.0), len);
    let count = match arg(args, 1) {
        Literal::Undefined if args.len() < 2 => len - start,
        _ => integer_arg(args, 1, 0.0).max(0.0).min((len - start) as f64) as usize,
    };
    Ok(Datum::List(items.into_iter().skip(start).take(count).collect()))
}
