//! Parameter tokenizer for cookie headers.
//!
//! Splits a header value into `(name, value)` pairs. Separators inside a
//! quoted string never split. Malformed quoting (an unterminated quote)
//! runs to the end of the input instead of failing.

use crate::base::context::reserve;
use crate::base::neterror::NetError;

/// Which character separates parameters, and whether `=` assigns a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Separator {
    /// `a=b; c=d` (cookie headers)
    Semicolon,
    /// `80,8080` (Port attribute lists, `=` is not special)
    CommaNoAssign,
}

impl Separator {
    fn byte(self) -> u8 {
        match self {
            Separator::Semicolon => b';',
            Separator::CommaNoAssign => b',',
        }
    }

    fn assigns(self) -> bool {
        matches!(self, Separator::Semicolon)
    }
}

/// One tokenized parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param<'a> {
    pub name: &'a str,
    /// `None` when the parameter had no `=` at all.
    pub value: Option<&'a str>,
}

impl<'a> Param<'a> {
    /// The value with one pair of surrounding double quotes removed.
    pub fn unquoted_value(&self) -> Option<&'a str> {
        self.value.map(unquote)
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.value.map_or(true, str::is_empty)
    }
}

/// Strip one pair of surrounding double quotes, if present.
pub fn unquote(s: &str) -> &str {
    let s = s.trim();
    if s.len() >= 2 && s.starts_with('"') && s.ends_with('"') {
        &s[1..s.len() - 1]
    } else {
        s
    }
}

/// Tokenize `input` with the given separator policy.
///
/// An input that is empty (or only whitespace) yields an empty list. Empty
/// segments are kept, so `"a=b;"` yields a trailing empty pair.
pub fn tokenize(input: &str, sep: Separator) -> Result<Vec<Param<'_>>, NetError> {
    let mut params = Vec::new();
    if input.trim().is_empty() {
        return Ok(params);
    }

    let bytes = input.as_bytes();
    let sep_byte = sep.byte();
    let mut in_quotes = false;
    let mut start = 0;

    let segments = bytes.iter().filter(|&&b| b == sep_byte).count() + 1;
    reserve(&mut params, segments, "cookie parameters")?;

    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b'"' => in_quotes = !in_quotes,
            _ if b == sep_byte && !in_quotes => {
                params.push(split_param(&input[start..i], sep));
                start = i + 1;
            }
            _ => {}
        }
    }
    params.push(split_param(&input[start..], sep));

    Ok(params)
}

fn split_param(segment: &str, sep: Separator) -> Param<'_> {
    let segment = segment.trim();
    if !sep.assigns() {
        return Param {
            name: segment,
            value: None,
        };
    }

    let mut in_quotes = false;
    for (i, b) in segment.bytes().enumerate() {
        match b {
            b'"' => in_quotes = !in_quotes,
            b'=' if !in_quotes => {
                return Param {
                    name: segment[..i].trim(),
                    value: Some(segment[i + 1..].trim()),
                };
            }
            _ => {}
        }
    }

    Param {
        name: segment,
        value: None,
    }
}
