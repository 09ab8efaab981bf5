//! # Parser Combinators
//!
//! Builders that make new parsers out of existing ones. Every combinator
//! calls its children through [`Parser::attempt`] and folds their results
//! with [`merge`], so the furthest failure seen anywhere on the way is what
//! ends up being reported.
//!
//! * **Sequential**: `sequence`, `chain`
//! * **Alternative**: `alternative`, `except`
//! * **Repetition**: `times`, `times_exactly`
//! * **Transformation**: `map`, `mark`, `mark_line_column`
//! * **Error reporting**: `describe`

use serde_json::{json, Value};

use crate::environment::Environment;
use crate::error::{GrammarError, GrammarResult};
use crate::parser::{make_parser, Parser, ParserKind};
use crate::primitives::{index, line_column_index};
use crate::result::{failure, merge, Failure, Success};

/// Runs `parsers` one after another and returns their values as an array.
///
/// Stops at the first failure, reporting it merged with whatever the earlier
/// children left as context.
pub fn sequence(parsers: Vec<Parser>) -> Parser {
    make_parser(ParserKind::Sequence, move |input, index, env| {
        let mut values = Vec::with_capacity(parsers.len());
        let mut context = None;
        let mut current = index;
        for parser in &parsers {
            let mut step = merge(parser.attempt(input, current, env), context.take())?;
            context = step.take_context();
            current = step.index;
            values.push(step.value);
        }
        Ok(Success::new(current, Value::Array(values)).with_context(context))
    })
}

/// Tries `parsers` in order at the same offset and returns the first success.
///
/// When all of them fail the result is the furthest failure; ties list the
/// later alternatives first.
pub fn alternative(parsers: Vec<Parser>) -> GrammarResult<Parser> {
    let mut parsers = parsers.into_iter();
    let first = parsers.next().ok_or(GrammarError::EmptyAlternative)?;
    let rest: Vec<Parser> = parsers.collect();
    Ok(make_parser(ParserKind::Alternative, move |input, index, env| {
        let mut context = match first.attempt(input, index, env) {
            Ok(success) => return Ok(success),
            Err(failure) => failure,
        };
        for parser in &rest {
            match merge(parser.attempt(input, index, env), Some(context)) {
                Ok(success) => return Ok(success),
                Err(failure) => context = failure,
            }
        }
        Err(context)
    }))
}

/// Matches `parser` greedily between `min` and `max` times (`None` for no
/// upper bound) and returns the values as an array.
///
/// Fewer than `min` matches is a failure. Past `min`, the first mismatch just
/// ends the repetition. An unbounded repetition also ends once `parser`
/// succeeds without consuming anything.
pub fn times(parser: Parser, min: usize, max: Option<usize>) -> GrammarResult<Parser> {
    if let Some(max) = max {
        if min > max {
            return Err(GrammarError::InvalidRepetition { min, max });
        }
    }
    Ok(repeat(parser, min, max))
}

/// Matches `parser` exactly `count` times.
pub fn times_exactly(parser: Parser, count: usize) -> Parser {
    repeat(parser, count, Some(count))
}

pub(crate) fn repeat(parser: Parser, min: usize, max: Option<usize>) -> Parser {
    make_parser(ParserKind::Times, move |input, index, env| {
        let mut values = Vec::new();
        let mut context = None;
        let mut current = index;
        while max.map_or(true, |max| values.len() < max) {
            match merge(parser.attempt(input, current, env), context.take()) {
                Ok(mut step) => {
                    context = step.take_context();
                    let stalled = step.index == current;
                    current = step.index;
                    values.push(step.value);
                    if stalled && max.is_none() && values.len() >= min {
                        break;
                    }
                }
                Err(failure) if values.len() < min => return Err(failure),
                Err(failure) => {
                    context = Some(failure);
                    break;
                }
            }
        }
        Ok(Success::new(current, Value::Array(values)).with_context(context))
    })
}

/// Replaces a success's value with `f(value, env)`. Failures pass through.
pub fn map<F>(parser: Parser, f: F) -> Parser
where
    F: Fn(Value, &Environment) -> Value + 'static,
{
    make_parser(ParserKind::Map, move |input, index, env| {
        let mut parsed = parser.attempt(input, index, env)?;
        parsed.value = f(std::mem::take(&mut parsed.value), env);
        Ok(parsed)
    })
}

/// Matches `allowed` unless `forbidden` matches at the same offset.
///
/// When `forbidden` matches, the failure names the rejected text rather than
/// what would have been accepted.
pub fn except(allowed: Parser, forbidden: Parser) -> Parser {
    make_parser(ParserKind::Except, move |input, index, env| {
        let rejected = match forbidden.attempt(input, index, env) {
            Ok(matched) => {
                return failure(
                    index,
                    format!("something that is not '{}'", value_text(&matched.value)),
                )
            }
            Err(rejected) => rejected,
        };
        allowed.attempt(input, index, env).map_err(|missed| {
            let expected = format!(
                "{} (except {})",
                missed.expected.join(", "),
                rejected.expected.join(", ")
            );
            Failure::new(missed.index, vec![expected])
        })
    })
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Reports failures of `parser` as expecting `description`, at the same
/// offset.
pub fn describe(parser: Parser, description: impl Into<String>) -> Parser {
    let description = description.into();
    make_parser(ParserKind::Describe, move |input, index, env| {
        parser
            .attempt(input, index, env)
            .map_err(|failure| Failure::new(failure.index, vec![description.clone()]))
    })
}

/// Wraps the value as `{start, value, end}` with byte offsets.
pub fn mark(parser: Parser) -> Parser {
    map(sequence(vec![index(), parser, index()]), |value, _env| marked(value))
}

/// Like [`mark`], with `start` and `end` as `{offset, line, column}`.
pub fn mark_line_column(parser: Parser) -> Parser {
    map(
        sequence(vec![line_column_index(), parser, line_column_index()]),
        |value, _env| marked(value),
    )
}

fn marked(value: Value) -> Value {
    let Value::Array(parts) = value else {
        return value;
    };
    let mut parts = parts.into_iter();
    let start = parts.next().unwrap_or_default();
    let value = parts.next().unwrap_or_default();
    let end = parts.next().unwrap_or_default();
    json!({ "start": start, "value": value, "end": end })
}

/// Runs `parser`, then whichever parser `decide` picks from its value,
/// starting where `parser` stopped.
pub fn chain<F>(parser: Parser, decide: F) -> Parser
where
    F: Fn(Value, &Environment) -> Parser + 'static,
{
    make_parser(ParserKind::Chain, move |input, index, env| {
        let mut first = parser.attempt(input, index, env)?;
        let context = first.take_context();
        let next = decide(first.value, env);
        merge(next.attempt(input, first.index, env), context)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::{any, eof, fail, regex, string, succeed};
    use crate::result::success;
    use pretty_assertions::assert_eq;

    fn failed(index: usize, expected: &[&str]) -> Result<Success, Failure> {
        Err(Failure::new(index, expected.iter().map(|s| s.to_string()).collect()))
    }

    #[test]
    fn test_sequence() {
        let parser = sequence(vec![string("a"), string("b"), string("c")]);
        assert_eq!(parser.parse("abc"), success(3, json!(["a", "b", "c"])));
        // 途中で失敗
        assert_eq!(parser.parse("abx"), failed(2, &["'c'"]));
        assert_eq!(sequence(vec![]).parse(""), success(0, json!([])));
    }

    #[test]
    fn test_sequence_reports_discarded_failures() {
        let parser = sequence(vec![times(string("a"), 0, None).unwrap(), string("b")]);
        assert_eq!(parser.parse("aab"), success(3, json!([["a", "a"], "b"])));
        assert_eq!(parser.parse("aax"), failed(2, &["'b'", "'a'"]));
    }

    #[test]
    fn test_alternative() {
        let parser = alternative(vec![string("a"), string("b"), string("c")]).unwrap();
        assert_eq!(parser.parse("b"), success(1, json!("b")));
        assert_eq!(parser.parse("d"), failed(0, &["'c'", "'b'", "'a'"]));
    }

    #[test]
    fn test_alternative_furthest_failure() {
        let parser = alternative(vec![
            sequence(vec![string("a"), string("b"), string("c")]),
            string("x"),
        ])
        .unwrap();
        assert_eq!(parser.parse("abz"), failed(2, &["'c'"]));
    }

    #[test]
    fn test_alternative_needs_parsers() {
        assert!(matches!(alternative(vec![]), Err(GrammarError::EmptyAlternative)));
    }

    #[test]
    fn test_times_bounds() {
        let parser = times(string("a"), 1, Some(3)).unwrap();
        let env = Environment::empty();
        assert_eq!(parser.parse(""), failed(0, &["'a'"]));
        assert_eq!(parser.parse("a"), success(1, json!(["a"])));
        assert_eq!(parser.parse("aa"), success(2, json!(["a", "a"])));
        assert_eq!(parser.parse("aaa"), success(3, json!(["a", "a", "a"])));
        assert_eq!(
            parser.attempt("aaaa", 0, &env),
            success(3, json!(["a", "a", "a"]))
        );
        assert_eq!(parser.parse("aaaa"), failed(3, &["EOF"]));
    }

    #[test]
    fn test_times_zero() {
        let parser = times(string("a"), 0, Some(0)).unwrap();
        assert_eq!(parser.parse(""), success(0, json!([])));
        assert_eq!(
            parser.attempt("aaa", 0, &Environment::empty()),
            success(0, json!([]))
        );
    }

    #[test]
    fn test_times_exactly() {
        let parser = times_exactly(any(), 2);
        assert_eq!(parser.parse("xy"), success(2, json!(["x", "y"])));
        assert_eq!(parser.parse("x"), failed(1, &["any character"]));
    }

    #[test]
    fn test_times_unbounded_stops_on_empty_match() {
        let parser = times(succeed("e"), 0, None).unwrap();
        assert_eq!(parser.parse(""), success(0, json!(["e"])));
        let parser = times(succeed("e"), 3, None).unwrap();
        assert_eq!(parser.parse(""), success(0, json!(["e", "e", "e"])));
    }

    #[test]
    fn test_times_invalid_bounds() {
        assert!(matches!(
            times(any(), 3, Some(1)),
            Err(GrammarError::InvalidRepetition { min: 3, max: 1 })
        ));
    }

    #[test]
    fn test_map() {
        let parser = map(regex("[0-9]+").unwrap(), |value, _env| {
            json!(value.as_str().and_then(|s| s.parse::<i64>().ok()))
        });
        assert_eq!(parser.parse("42"), success(2, json!(42)));
        assert_eq!(parser.parse("x"), failed(0, &["/[0-9]+/"]));
    }

    #[test]
    fn test_map_sees_environment() {
        let parser = map(any(), |value, env| {
            json!(format!("{}{}", value.as_str().unwrap_or(""), env.get::<u8>().copied().unwrap_or(0)))
        });
        assert_eq!(parser.parse_with("a", &Environment::new(7u8)), success(1, json!("a7")));
    }

    #[test]
    fn test_except_messages() {
        let parser = except(any(), regex("[abc]").unwrap());
        assert_eq!(parser.parse("b"), failed(0, &["something that is not 'b'"]));
        assert_eq!(parser.parse(""), failed(0, &["any character (except /[abc]/)"]));
        assert_eq!(parser.parse("x"), success(1, json!("x")));
    }

    #[test]
    fn test_describe() {
        let parser = describe(sequence(vec![string("a"), string("b")]), "ab pair");
        assert_eq!(parser.parse("ab"), success(2, json!(["a", "b"])));
        // 位置は保持する
        assert_eq!(parser.parse("ax"), failed(1, &["ab pair"]));
        assert_eq!(describe(fail("x"), "y").parse(""), failed(0, &["y"]));
    }

    #[test]
    fn test_mark() {
        let parser = mark(string("abc"));
        assert_eq!(
            parser.parse("abc"),
            success(3, json!({"start": 0, "value": "abc", "end": 3}))
        );
        let inner = sequence(vec![string("x"), mark(string("y"))]);
        assert_eq!(
            inner.parse("xy"),
            success(2, json!(["x", {"start": 1, "value": "y", "end": 2}]))
        );
    }

    #[test]
    fn test_mark_line_column() {
        let parser = sequence(vec![string("a\n"), mark_line_column(string("bc"))]);
        assert_eq!(
            parser.parse("a\nbc"),
            success(
                4,
                json!(["a\n", {
                    "start": {"offset": 2, "line": 2, "column": 1},
                    "value": "bc",
                    "end": {"offset": 4, "line": 2, "column": 3},
                }])
            )
        );
    }

    #[test]
    fn test_chain() {
        // 先頭の数字が後続の文字数を決める
        let parser = chain(regex("[0-9]").unwrap(), |value, _env| {
            let count = value.as_str().and_then(|s| s.parse().ok()).unwrap_or(0);
            times_exactly(any(), count)
        });
        assert_eq!(parser.parse("2ab"), success(3, json!(["a", "b"])));
        assert_eq!(parser.parse("3ab"), failed(3, &["any character"]));
        assert_eq!(parser.parse("x"), failed(0, &["/[0-9]/"]));
    }

    #[test]
    fn test_chain_keeps_context() {
        let parser = chain(times(string("a"), 0, None).unwrap(), |_value, _env| eof());
        assert_eq!(parser.parse("aa"), success(2, Value::Null));
        assert_eq!(parser.parse("aab"), failed(2, &["EOF", "'a'"]));
    }
}
