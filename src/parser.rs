//! # Parser Identity
//!
//! A [`Parser`] is a stable handle around a swappable behavior. Combinators
//! hold handles, never behaviors, so [`replace`] changes what every
//! referencing parser does while the identity stays put. That is what makes
//! forward-declared and cyclic grammars possible.
//!
//! Calling a parser directly through [`Parser::parse`] and friends also
//! requires the input to end where the parser stopped. Combinators call
//! children through [`Parser::attempt`], which only needs to match a prefix.

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, trace};

use crate::environment::Environment;
use crate::primitives::expect_end;
use crate::result::{merge, ParseResult};

/// The attempt function a parser currently delegates to.
pub type Behavior = Rc<dyn Fn(&str, usize, &Environment) -> ParseResult>;

/// What built a parser. Only used for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum ParserKind {
    Any,
    All,
    Eof,
    Succeed,
    Fail,
    Index,
    LineColumnIndex,
    String,
    Regex,
    Test,
    Custom,
    Sequence,
    Alternative,
    Times,
    Map,
    Except,
    Describe,
    Chain,
    SubEnvironment,
    Lookup,
    Lazy,
    Trace,
}

/// Identity of a parser, unique for the lifetime of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParserId(u64);

impl fmt::Display for ParserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

static NEXT_ID: AtomicU64 = AtomicU64::new(0);

struct ParserCell {
    id: ParserId,
    kind: ParserKind,
    behavior: RefCell<Behavior>,
}

/// Handle to a parser.
///
/// `Clone` shares the identity: both handles see every [`replace`]. Use
/// [`clone_parser`] for a fresh identity.
#[derive(Clone)]
pub struct Parser {
    cell: Rc<ParserCell>,
}

impl Parser {
    fn from_behavior(kind: ParserKind, behavior: Behavior) -> Self {
        Self {
            cell: Rc::new(ParserCell {
                id: ParserId(NEXT_ID.fetch_add(1, Ordering::Relaxed)),
                kind,
                behavior: RefCell::new(behavior),
            }),
        }
    }

    pub fn id(&self) -> ParserId {
        self.cell.id
    }

    pub fn kind(&self) -> ParserKind {
        self.cell.kind
    }

    /// Whether both handles point at the same parser, regardless of behavior.
    pub fn same_identity(&self, other: &Parser) -> bool {
        Rc::ptr_eq(&self.cell, &other.cell)
    }

    /// The behavior currently installed.
    pub fn behavior(&self) -> Behavior {
        Rc::clone(&self.cell.behavior.borrow())
    }

    /// Runs the current behavior at `index` without requiring end of input.
    ///
    /// The behavior is taken out of the slot before it runs, so it may
    /// replace its own parser mid-parse.
    pub fn attempt(&self, input: &str, index: usize, env: &Environment) -> ParseResult {
        let behavior = self.behavior();
        match crate::trace::active_handler() {
            Some(handler) => crate::trace::observe(&handler, self, input, index, env, || {
                behavior(input, index, env)
            }),
            None => {
                trace!(parser = %self.id(), kind = %self.kind(), index, "attempt");
                behavior(input, index, env)
            }
        }
    }

    /// Parses the whole of `input` with an empty environment.
    pub fn parse(&self, input: &str) -> ParseResult {
        self.parse_at(input, &Environment::empty(), 0)
    }

    /// Parses the whole of `input` under `env`.
    pub fn parse_with(&self, input: &str, env: &Environment) -> ParseResult {
        self.parse_at(input, env, 0)
    }

    /// Parses from `index` to the end of `input` under `env`.
    pub fn parse_at(&self, input: &str, env: &Environment, index: usize) -> ParseResult {
        let mut parsed = self.attempt(input, index, env)?;
        let context = parsed.take_context();
        let end = merge(expect_end(input, parsed.index), context)?;
        Ok(parsed.with_context(end.furthest))
    }

    /// Installs `source`'s current behavior into this parser. See [`replace`].
    pub fn replace_with(&self, source: &Parser) {
        let behavior = source.behavior();
        debug!(target = %self.id(), source = %source.id(), "replace behavior");
        *self.cell.behavior.borrow_mut() = behavior;
    }
}

impl PartialEq for Parser {
    fn eq(&self, other: &Self) -> bool {
        self.same_identity(other)
    }
}

impl Eq for Parser {}

impl fmt::Debug for Parser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parser")
            .field("id", &self.id())
            .field("kind", &self.kind())
            .finish()
    }
}

/// Wraps an attempt function into a new parser with its own identity.
pub fn make_parser<F>(kind: ParserKind, behavior: F) -> Parser
where
    F: Fn(&str, usize, &Environment) -> ParseResult + 'static,
{
    Parser::from_behavior(kind, Rc::new(behavior))
}

/// Whether `value` is a parser handle.
pub fn is_parser(value: &dyn Any) -> bool {
    value.is::<Parser>()
}

/// Copies `source`'s current behavior into `target`.
///
/// `target` keeps its identity, so everything already referencing it picks up
/// the new behavior. The copy is by value: replacing `source` later leaves
/// `target` alone.
pub fn replace(target: &Parser, source: &Parser) {
    target.replace_with(source);
}

/// A new parser running `parser`'s behavior as it is right now.
///
/// Embedding the clone inside `parser`'s replacement refers to the old
/// behavior instead of recursing into the new one.
pub fn clone_parser(parser: &Parser) -> Parser {
    Parser::from_behavior(parser.kind(), parser.behavior())
}
