//! # Primitive Parsers
//!
//! Parsers built directly on the result model. Each consumes at most a
//! literal, a regex match or a single character; the zero-width ones report
//! something about the position instead.

use regex::Regex;
use serde_json::{json, Value};

use crate::environment::Environment;
use crate::error::{GrammarError, GrammarResult};
use crate::parser::{make_parser, Parser, ParserKind};
use crate::result::{failure, success, ParseResult};

/// Rest of the input from `index`, if `index` is a valid position in it.
fn remaining(input: &str, index: usize) -> Option<&str> {
    input.get(index..)
}

/// End-of-input check shared by [`eof`] and direct parser calls.
pub(crate) fn expect_end(input: &str, index: usize) -> ParseResult {
    if index >= input.len() {
        success(index, Value::Null)
    } else {
        failure(index, "EOF")
    }
}

/// Consumes one character and returns it.
pub fn any() -> Parser {
    make_parser(ParserKind::Any, |input, index, _env| {
        match remaining(input, index).and_then(|rest| rest.chars().next()) {
            Some(c) => success(index + c.len_utf8(), json!(c.to_string())),
            None => failure(index, "any character"),
        }
    })
}

/// Consumes the rest of the input and returns it. Never fails.
pub fn all() -> Parser {
    make_parser(ParserKind::All, |input, index, _env| match remaining(input, index) {
        Some(rest) => success(input.len(), json!(rest)),
        None => success(index, json!("")),
    })
}

/// Matches only at the end of the input, returning `null`.
pub fn eof() -> Parser {
    make_parser(ParserKind::Eof, |input, index, _env| expect_end(input, index))
}

/// Consumes nothing and returns `value`.
pub fn succeed(value: impl Into<Value>) -> Parser {
    let value = value.into();
    make_parser(ParserKind::Succeed, move |_input, index, _env| {
        success(index, value.clone())
    })
}

/// Consumes nothing and fails, expecting `description`.
pub fn fail(description: impl Into<String>) -> Parser {
    let description = description.into();
    make_parser(ParserKind::Fail, move |_input, index, _env| {
        failure(index, description.clone())
    })
}

/// Returns the current offset.
pub fn index() -> Parser {
    make_parser(ParserKind::Index, |_input, index, _env| success(index, json!(index)))
}

/// Returns the current position as `{offset, line, column}`.
///
/// Line and column are 1-based and counted over the input before the offset;
/// the column counts characters, not bytes.
pub fn line_column_index() -> Parser {
    make_parser(ParserKind::LineColumnIndex, |input, index, _env| {
        let consumed = input.get(..index).unwrap_or(input);
        let line = consumed.matches('\n').count() + 1;
        let current = consumed.rsplit('\n').next().unwrap_or_default();
        success(
            index,
            json!({
                "offset": index,
                "line": line,
                "column": current.chars().count() + 1,
            }),
        )
    })
}

/// Matches `literal` exactly.
pub fn string(literal: impl Into<String>) -> Parser {
    let literal = literal.into();
    let expected = format!("'{literal}'");
    make_parser(ParserKind::String, move |input, index, _env| {
        match remaining(input, index) {
            Some(rest) if rest.starts_with(literal.as_str()) => {
                success(index + literal.len(), json!(literal))
            }
            _ => failure(index, expected.clone()),
        }
    })
}

/// Matches `pattern` anchored at the current offset and returns the whole
/// match.
pub fn regex(pattern: &str) -> GrammarResult<Parser> {
    regex_group(pattern, 0)
}

/// Matches `pattern` anchored at the current offset and returns capture group
/// `group`, or `null` if that group did not take part in the match.
pub fn regex_group(pattern: &str, group: usize) -> GrammarResult<Parser> {
    let anchored = Regex::new(&format!(r"\A(?:{pattern})")).map_err(|source| {
        GrammarError::InvalidRegex {
            pattern: pattern.to_string(),
            source,
        }
    })?;
    // The non-capturing wrapper keeps group numbering the same as `pattern`'s.
    let groups = anchored.captures_len();
    if group >= groups {
        return Err(GrammarError::NoSuchGroup {
            pattern: pattern.to_string(),
            group,
            groups,
        });
    }
    let expected = format!("/{pattern}/");
    Ok(make_parser(ParserKind::Regex, move |input, index, _env| {
        let captures = remaining(input, index).and_then(|rest| anchored.captures(rest));
        match captures {
            Some(captures) => {
                let end = captures.get(0).map_or(0, |m| m.end());
                let value = captures
                    .get(group)
                    .map_or(Value::Null, |m| json!(m.as_str()));
                success(index + end, value)
            }
            None => failure(index, expected.clone()),
        }
    }))
}

/// Consumes one character `c` and succeeds if `predicate(c, env)` holds.
///
/// `description` names the accepted characters in failure messages.
pub fn test<F>(description: impl Into<String>, predicate: F) -> Parser
where
    F: Fn(char, &Environment) -> bool + 'static,
{
    let expected = format!("a character matching {}", description.into());
    make_parser(ParserKind::Test, move |input, index, env| {
        match remaining(input, index).and_then(|rest| rest.chars().next()) {
            Some(c) if predicate(c, env) => success(index + c.len_utf8(), json!(c.to_string())),
            _ => failure(index, expected.clone()),
        }
    })
}

/// Installs `behavior` as the parser's behavior as is.
pub fn custom<F>(behavior: F) -> Parser
where
    F: Fn(&str, usize, &Environment) -> ParseResult + 'static,
{
    make_parser(ParserKind::Custom, behavior)
}
