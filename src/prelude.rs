//! Builder functions in one import, plus a few helpers derived from the core
//! combinators.

pub use serde_json::Value;

pub use crate::combinators::{
    alternative, chain, describe, except, map, mark, mark_line_column, sequence, times,
    times_exactly,
};
pub use crate::environment::{lookup, sub_environment, Environment};
pub use crate::error::{GrammarError, GrammarResult};
pub use crate::parser::{clone_parser, is_parser, make_parser, replace, Parser, ParserKind};
pub use crate::primitives::{
    all, any, custom, eof, fail, index, line_column_index, regex, regex_group, string, succeed,
    test,
};
pub use crate::result::{failure, merge, success, Failure, ParseResult, Success};

use crate::combinators::repeat;

/// Zero or more `parser`.
pub fn many(parser: Parser) -> Parser {
    repeat(parser, 0, None)
}

/// One or more `parser`.
pub fn many1(parser: Parser) -> Parser {
    repeat(parser, 1, None)
}

/// `parser`'s value, or `null` without consuming anything.
pub fn optional(parser: Parser) -> Parser {
    map(repeat(parser, 0, Some(1)), |value, _env| match value {
        Value::Array(mut values) => values.pop().unwrap_or(Value::Null),
        other => other,
    })
}

/// Items separated by `separator`, values of the separators dropped. Matches
/// an empty list too.
pub fn separated_list(item: Parser, separator: Parser) -> Parser {
    let tail = many(preceded(separator, item.clone()));
    let list = map(sequence(vec![item, tail]), |value, _env| {
        let Value::Array(parts) = value else {
            return value;
        };
        let mut parts = parts.into_iter();
        let mut items = vec![parts.next().unwrap_or_default()];
        if let Some(Value::Array(rest)) = parts.next() {
            items.extend(rest);
        }
        Value::Array(items)
    });
    map(optional(list), |value, _env| match value {
        Value::Null => Value::Array(vec![]),
        list => list,
    })
}

/// Runs `first` then `second`, keeping `second`'s value.
pub fn preceded(first: Parser, second: Parser) -> Parser {
    pick(sequence(vec![first, second]), 1)
}

/// Runs `first` then `second`, keeping `first`'s value.
pub fn terminated(first: Parser, second: Parser) -> Parser {
    pick(sequence(vec![first, second]), 0)
}

/// Runs `left`, `parser` and `right`, keeping `parser`'s value.
pub fn delimited(left: Parser, parser: Parser, right: Parser) -> Parser {
    pick(sequence(vec![left, parser, right]), 1)
}

fn pick(parser: Parser, position: usize) -> Parser {
    map(parser, move |value, _env| match value {
        Value::Array(mut values) if position < values.len() => values.swap_remove(position),
        other => other,
    })
}

/// Builds the parser with `f` each time it runs.
///
/// Handy for recursive rules written as functions, when the recursion does
/// not depend on the environment. See [`lookup`] otherwise.
pub fn lazy<F>(f: F) -> Parser
where
    F: Fn() -> Parser + 'static,
{
    make_parser(ParserKind::Lazy, move |input, index, env| {
        f().attempt(input, index, env)
    })
}
