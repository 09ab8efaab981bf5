//! # Environment
//!
//! An opaque value threaded through a whole parse next to the input. The core
//! never looks inside it; it is only passed down, or swapped for a derived
//! value by [`sub_environment`]. Grammars use it for context-dependent rules
//! and, through [`lookup`], to resolve recursive references at call time.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use crate::parser::{make_parser, Parser, ParserKind};

/// Context value visible to every parser of a parse.
///
/// Cloning is cheap and shares the underlying value.
#[derive(Clone, Default)]
pub struct Environment {
    value: Option<Rc<dyn Any>>,
}

impl Environment {
    pub fn new<T: Any>(value: T) -> Self {
        Self {
            value: Some(Rc::new(value)),
        }
    }

    /// An environment carrying nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_none()
    }

    /// Typed access to the carried value.
    pub fn get<T: Any>(&self) -> Option<&T> {
        self.value.as_deref().and_then(|value| value.downcast_ref::<T>())
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value {
            Some(_) => f.write_str("Environment(..)"),
            None => f.write_str("Environment(empty)"),
        }
    }
}

/// Runs `parser` with `derive(current)` as its environment.
///
/// The substitution only covers `parser` and what it calls; siblings and
/// parents keep seeing the original environment.
pub fn sub_environment<F>(parser: Parser, derive: F) -> Parser
where
    F: Fn(&Environment) -> Environment + 'static,
{
    make_parser(ParserKind::SubEnvironment, move |input, index, env| {
        let derived = derive(env);
        parser.attempt(input, index, &derived)
    })
}

/// Delegates to whichever parser `resolve` picks from the environment at call
/// time. This is the preferred way to write recursive grammars.
///
/// # Panics
///
/// Panics during parsing if `resolve` returns `None`. That means the grammar
/// and the environment it runs under do not fit together, which no input can
/// fix, so it is not reported as a parse failure.
pub fn lookup<F>(name: impl Into<String>, resolve: F) -> Parser
where
    F: Fn(&Environment) -> Option<Parser> + 'static,
{
    let name = name.into();
    make_parser(ParserKind::Lookup, move |input, index, env| {
        match resolve(env) {
            Some(parser) => parser.attempt(input, index, env),
            None => panic!("lookup `{name}` did not resolve to a parser in {env:?}"),
        }
    })
}
