//! Line parsing for the console
//!
//! Everything here is pure string handling with no storage access, so the
//! grammar can be tested on its own:
//!
//! - [`split_command`]: leading command word and the rest of the line
//! - [`parse_param`] / [`coerce_value`]: `key=value` tokens given to `create`
//! - [`DottedCall::parse`]: the `Class.method(args)` alternate syntax

use crate::models::AttrValue;

/// Split a line into its leading command word and the remaining arguments.
///
/// The command word is the run of identifier characters at the start of the
/// trimmed line. For `User.all()` that is `User`, which is not a command and
/// sends the line to the dotted-call handler.
pub fn split_command(line: &str) -> (&str, &str) {
    let line = line.trim();
    let end = line
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(line.len());
    (&line[..end], line[end..].trim())
}

/// Parse one `key=value` token from a `create` command.
///
/// Returns `None` unless the token contains exactly one `=`.
pub fn parse_param(token: &str) -> Option<(&str, AttrValue)> {
    let mut parts = token.split('=');
    let (name, raw) = (parts.next()?, parts.next()?);
    if parts.next().is_some() {
        return None;
    }
    Some((name, coerce_value(raw)))
}

/// Convert a raw `create` value using a fixed precedence:
///
/// 1. wrapped in double quotes: the inner text, as a string
/// 2. contains a `.`: a float if it parses, else the raw text
/// 3. otherwise: an integer if it parses, else the raw text
///
/// The first rule that applies decides the outcome. `"21"` stays a string
/// even though `21` would parse as an integer.
pub fn coerce_value(raw: &str) -> AttrValue {
    if raw.starts_with('"') && raw.ends_with('"') {
        // A lone `"` both starts and ends with a quote; its inside is empty
        let inner = raw.get(1..raw.len() - 1).unwrap_or("");
        return AttrValue::Str(inner.to_string());
    }
    if raw.contains('.') {
        return match raw.parse::<f64>() {
            Ok(x) if x.is_finite() => AttrValue::Float(x),
            _ => AttrValue::Str(raw.to_string()),
        };
    }
    match raw.parse::<i64>() {
        Ok(i) => AttrValue::Int(i),
        Err(_) => AttrValue::Str(raw.to_string()),
    }
}

/// A parsed `Class.method(arg, ...)` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DottedCall<'a> {
    pub class_name: &'a str,
    pub method: &'a str,
    pub args: Vec<&'a str>,
}

impl<'a> DottedCall<'a> {
    /// Parse the dotted form. Returns `None` for anything that is not shaped
    /// like `Name.method(...)` with the closing parenthesis ending the line.
    ///
    /// Arguments are split on commas outside quotes, trimmed, and stripped of
    /// one pair of surrounding quotes (double or single).
    pub fn parse(line: &'a str) -> Option<Self> {
        let line = line.trim();
        let (class_name, call) = line.split_once('.')?;
        let (method, rest) = call.split_once('(')?;
        let inner = rest.strip_suffix(')')?;

        if class_name.is_empty() || method.is_empty() {
            return None;
        }

        let args = if inner.trim().is_empty() {
            Vec::new()
        } else {
            split_args(inner).into_iter().map(|a| unquote(a.trim())).collect()
        };

        Some(Self {
            class_name,
            method,
            args,
        })
    }
}

/// Split on commas that are not inside a quoted section
fn split_args(inner: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut open: Option<char> = None;
    let mut start = 0;
    for (i, c) in inner.char_indices() {
        match (open, c) {
            (None, '"' | '\'') => open = Some(c),
            (Some(q), c) if c == q => open = None,
            (None, ',') => {
                parts.push(&inner[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&inner[start..]);
    parts
}

fn unquote(arg: &str) -> &str {
    for q in ['"', '\''] {
        if arg.len() >= 2 && arg.starts_with(q) && arg.ends_with(q) {
            return &arg[1..arg.len() - 1];
        }
    }
    arg
}
