//! # recomb: replaceable parser combinators
//!
//! A small runtime for composing parsers out of smaller parsers, where any
//! parser can have its behavior swapped in place while keeping its identity,
//! and where an environment value travels alongside the input through the
//! whole parse.
//!
//! ## Building Blocks
//!
//! * Results ([`result`]): `Success` / `Failure` and the furthest-failure merge
//! * Identity ([`parser`]): `Parser` handles, `replace`, `clone_parser`
//! * Primitives ([`primitives`]): `string`, `regex`, `any`, `eof`, `test`, ...
//! * Combinators ([`combinators`]): `sequence`, `alternative`, `times`, `map`,
//!   `except`, `describe`, `mark`, `chain`
//! * Environment ([`environment`]): `sub_environment`, `lookup`
//!
//! Around them sit error formatting ([`formatter`]), tracing hooks
//! ([`trace`]) and the [`prelude`] with every builder in one import.
//!
//! ## Direct Calls and Composition
//!
//! Calling a parser through [`Parser::parse`] requires it to consume the whole
//! input. Inside combinators parsers only need to match a prefix.
//!
//! ```
//! use recomb::prelude::*;
//! use serde_json::json;
//!
//! let greeting = sequence(vec![string("hello"), regex(r" +").unwrap(), string("world")]);
//! assert_eq!(greeting.parse("hello  world"), success(12, json!(["hello", "  ", "world"])));
//! assert!(greeting.parse("hello  world!").is_err());
//! ```
//!
//! ## Recursive Grammars
//!
//! The preferred way is [`lookup`], which resolves a rule from the environment
//! at call time. [`replace`] and [`clone_parser`] redefine a declared parser in
//! place instead:
//!
//! ```
//! use recomb::prelude::*;
//! use serde_json::json;
//!
//! let a = string("a");
//! replace(&a, &alternative(vec![clone_parser(&a), string("b")]).unwrap());
//! assert_eq!(a.parse("b"), success(1, json!("b")));
//! assert_eq!(a.parse("a"), success(1, json!("a")));
//! ```

pub mod combinators;
pub mod config;
pub mod environment;
pub mod error;
pub mod formatter;
pub mod parser;
pub mod prelude;
pub mod primitives;
pub mod result;
pub mod trace;

// Re-exports
pub use config::FormatConfig;
pub use environment::{lookup, sub_environment, Environment};
pub use error::*;
pub use formatter::{format_error, format_error_with};
pub use parser::{clone_parser, is_parser, make_parser, replace, Parser, ParserId, ParserKind};
pub use result::{failure, merge, success, Failure, ParseResult, Success};
pub use serde_json::Value;
pub use trace::{trace, CollectingTracer, LogTracer, TraceEvent, TraceHandler};
