//! # Tracing Parsers
//!
//! [`trace`] wraps a parser so that every parser attempt nested inside it is
//! reported to a [`TraceHandler`]. Handlers only observe; results are passed
//! through untouched.
//!
//! Each hook returns whether the default `tracing` event should still be
//! emitted for that node, so a handler can record quietly or stay out of the
//! way of the log.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::debug;

use crate::environment::Environment;
use crate::parser::{make_parser, Parser, ParserId, ParserKind};
use crate::result::ParseResult;

/// Observer of parser attempts.
#[cfg_attr(test, mockall::automock)]
pub trait TraceHandler {
    /// Called before `parser` runs at `index`. Return `false` to skip the
    /// default event.
    fn enter(&self, parser: &Parser, input: &str, index: usize, env: &Environment) -> bool;

    /// Called after `parser` ran at `index` with `result`.
    fn exit(
        &self,
        parser: &Parser,
        input: &str,
        index: usize,
        env: &Environment,
        result: &ParseResult,
    ) -> bool;
}

/// Handler that leaves everything to the default `tracing` events.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogTracer;

impl TraceHandler for LogTracer {
    fn enter(&self, _parser: &Parser, _input: &str, _index: usize, _env: &Environment) -> bool {
        true
    }

    fn exit(
        &self,
        _parser: &Parser,
        _input: &str,
        _index: usize,
        _env: &Environment,
        _result: &ParseResult,
    ) -> bool {
        true
    }
}

/// One observed step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceEvent {
    Enter {
        parser: ParserId,
        kind: ParserKind,
        index: usize,
    },
    Exit {
        parser: ParserId,
        kind: ParserKind,
        index: usize,
        /// Offset reached: the end of the match, or the failure's index
        reached: usize,
        matched: bool,
    },
}

/// Handler that records every step and suppresses the default events.
#[derive(Debug, Default)]
pub struct CollectingTracer {
    events: RefCell<Vec<TraceEvent>>,
}

impl CollectingTracer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<TraceEvent> {
        self.events.borrow().clone()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}

impl TraceHandler for CollectingTracer {
    fn enter(&self, parser: &Parser, _input: &str, index: usize, _env: &Environment) -> bool {
        self.events.borrow_mut().push(TraceEvent::Enter {
            parser: parser.id(),
            kind: parser.kind(),
            index,
        });
        false
    }

    fn exit(
        &self,
        parser: &Parser,
        _input: &str,
        index: usize,
        _env: &Environment,
        result: &ParseResult,
    ) -> bool {
        let (reached, matched) = match result {
            Ok(success) => (success.index, true),
            Err(failure) => (failure.index, false),
        };
        self.events.borrow_mut().push(TraceEvent::Exit {
            parser: parser.id(),
            kind: parser.kind(),
            index,
            reached,
            matched,
        });
        false
    }
}

thread_local! {
    static ACTIVE_HANDLERS: RefCell<Vec<Rc<dyn TraceHandler>>> = const { RefCell::new(Vec::new()) };
}

/// Innermost handler installed by a running [`trace`] parser.
pub(crate) fn active_handler() -> Option<Rc<dyn TraceHandler>> {
    ACTIVE_HANDLERS.with(|handlers| handlers.borrow().last().cloned())
}

/// Pops the handler again when the traced parser returns or unwinds.
struct ActiveGuard;

impl ActiveGuard {
    fn push(handler: Rc<dyn TraceHandler>) -> Self {
        ACTIVE_HANDLERS.with(|handlers| handlers.borrow_mut().push(handler));
        ActiveGuard
    }
}

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        ACTIVE_HANDLERS.with(|handlers| {
            handlers.borrow_mut().pop();
        });
    }
}

/// Runs `attempt` for `parser` between the handler's hooks.
pub(crate) fn observe<F>(
    handler: &Rc<dyn TraceHandler>,
    parser: &Parser,
    input: &str,
    index: usize,
    env: &Environment,
    attempt: F,
) -> ParseResult
where
    F: FnOnce() -> ParseResult,
{
    if handler.enter(parser, input, index, env) {
        debug!(parser = %parser.id(), kind = %parser.kind(), index, "enter");
    }
    let result = attempt();
    if handler.exit(parser, input, index, env, &result) {
        match &result {
            Ok(success) => {
                debug!(parser = %parser.id(), kind = %parser.kind(), index, end = success.index, "matched")
            }
            Err(failure) => debug!(
                parser = %parser.id(),
                kind = %parser.kind(),
                index,
                furthest = failure.index,
                expected = ?failure.expected,
                "failed"
            ),
        }
    }
    result
}

/// Wraps `parser` so that `handler` observes it and every parser it calls.
///
/// Nested traces use the innermost handler.
pub fn trace(parser: Parser, handler: Rc<dyn TraceHandler>) -> Parser {
    make_parser(ParserKind::Trace, move |input, index, env| {
        let _guard = ActiveGuard::push(Rc::clone(&handler));
        parser.attempt(input, index, env)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combinators::{alternative, sequence};
    use crate::primitives::string;
    use crate::result::{failure, success};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_trace_does_not_alter_results() {
        let grammar = alternative(vec![string("a"), string("b")]).unwrap();
        let traced = trace(grammar.clone(), Rc::new(LogTracer));
        assert_eq!(traced.parse("b"), grammar.parse("b"));
        assert_eq!(traced.parse("c"), grammar.parse("c"));
    }

    #[test]
    fn test_collecting_tracer_sees_nested_attempts() {
        let a = string("a");
        let b = string("b");
        let pair = sequence(vec![a.clone(), b.clone()]);
        let tracer = Rc::new(CollectingTracer::new());
        let traced = trace(pair.clone(), tracer.clone());

        assert_eq!(traced.parse("ab"), success(2, json!(["a", "b"])));
        assert_eq!(
            tracer.events(),
            vec![
                TraceEvent::Enter { parser: pair.id(), kind: ParserKind::Sequence, index: 0 },
                TraceEvent::Enter { parser: a.id(), kind: ParserKind::String, index: 0 },
                TraceEvent::Exit {
                    parser: a.id(),
                    kind: ParserKind::String,
                    index: 0,
                    reached: 1,
                    matched: true,
                },
                TraceEvent::Enter { parser: b.id(), kind: ParserKind::String, index: 1 },
                TraceEvent::Exit {
                    parser: b.id(),
                    kind: ParserKind::String,
                    index: 1,
                    reached: 2,
                    matched: true,
                },
                TraceEvent::Exit {
                    parser: pair.id(),
                    kind: ParserKind::Sequence,
                    index: 0,
                    reached: 2,
                    matched: true,
                },
            ]
        );
    }

    #[test]
    fn test_handler_is_removed_after_parse() {
        let tracer = Rc::new(CollectingTracer::new());
        let a = string("a");
        let traced = trace(a.clone(), tracer.clone());
        let _ = traced.parse("a");
        tracer.clear();

        // トレース外の呼び出しは記録されない
        let _ = a.parse("a");
        assert!(tracer.events().is_empty());
        assert!(active_handler().is_none());
    }

    #[test]
    fn test_mock_handler_hooks() {
        let mut handler = MockTraceHandler::new();
        handler.expect_enter().times(1).returning(|_, _, index, _| index == 0);
        handler
            .expect_exit()
            .times(1)
            .withf(|_, _, _, _, result| result.is_err())
            .returning(|_, _, _, _, _| false);

        let traced = trace(string("a"), Rc::new(handler));
        assert_eq!(traced.parse("z"), failure(0, "'a'"));
    }
}
