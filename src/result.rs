//! # Parse Results
//!
//! Success and failure shapes shared by every parser, and the merge rule that
//! keeps the furthest failure when results from several attempts meet.
//!
//! A failure's `index` is the furthest offset reached, not necessarily the
//! offset where the failing parser started. When two failures meet at the
//! same offset their expected sets are concatenated, which is what lets an
//! alternative report "expected one of 'c', 'b', 'a'".

use serde_json::Value;
use thiserror::Error;

/// Result type for a single parser attempt.
pub type ParseResult = Result<Success, Failure>;

/// A successful attempt.
///
/// Besides the offset and value, a success carries the furthest failure seen
/// while producing it. Combinators fold that context into later failures so
/// that a mismatch discarded on the way (for example the attempt that ended a
/// repetition) is still reported if parsing fails further on.
#[derive(Debug, Clone)]
pub struct Success {
    /// Offset immediately after the consumed input
    pub index: usize,
    /// Semantic value
    pub value: Value,
    pub(crate) furthest: Option<Failure>,
}

impl Success {
    pub fn new(index: usize, value: Value) -> Self {
        Self {
            index,
            value,
            furthest: None,
        }
    }

    /// Furthest failure recorded while producing this success, if any.
    pub fn furthest(&self) -> Option<&Failure> {
        self.furthest.as_ref()
    }

    pub(crate) fn with_context(mut self, context: Option<Failure>) -> Self {
        self.furthest = Failure::furthest_of(self.furthest.take(), context);
        self
    }

    /// Takes the carried context out, leaving the success context-free.
    pub(crate) fn take_context(&mut self) -> Option<Failure> {
        self.furthest.take()
    }
}

// The carried context is bookkeeping for error reporting and does not take
// part in equality.
impl PartialEq for Success {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.value == other.value
    }
}

/// A failed attempt: the furthest offset reached and what was expected there.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("expected {} at character {index}", describe_expected(.expected))]
pub struct Failure {
    pub index: usize,
    pub expected: Vec<String>,
}

impl Failure {
    pub fn new(index: usize, expected: Vec<String>) -> Self {
        Self { index, expected }
    }

    /// Keeps whichever failure got further. At equal offsets the expected sets
    /// are joined, `self` first.
    pub fn furthest(self, previous: Failure) -> Failure {
        if self.index > previous.index {
            self
        } else if self.index < previous.index {
            previous
        } else {
            let mut expected = self.expected;
            expected.extend(previous.expected);
            Failure::new(self.index, expected)
        }
    }

    pub(crate) fn furthest_of(candidate: Option<Failure>, previous: Option<Failure>) -> Option<Failure> {
        match (candidate, previous) {
            (Some(candidate), Some(previous)) => Some(candidate.furthest(previous)),
            (candidate, None) => candidate,
            (None, previous) => previous,
        }
    }
}

/// Renders an expected set the way error messages list it.
pub(crate) fn describe_expected(expected: &[String]) -> String {
    match expected {
        [single] => single.clone(),
        many => format!("one of {}", many.join(", ")),
    }
}

/// Builds a successful result.
pub fn success(index: usize, value: Value) -> ParseResult {
    Ok(Success::new(index, value))
}

/// Builds a failed result with a single expected description.
pub fn failure(index: usize, expected: impl Into<String>) -> ParseResult {
    Err(Failure::new(index, vec![expected.into()]))
}

/// Combines a fresh result with the failure context accumulated so far.
///
/// * no previous context: `candidate` as is
/// * candidate failed further on: `candidate`
/// * candidate failed earlier: `previous`
/// * both failed at the same offset: one failure, candidate's expectations first
/// * candidate succeeded: index and value untouched, the context rides along
pub fn merge(candidate: ParseResult, previous: Option<Failure>) -> ParseResult {
    let Some(previous) = previous else {
        return candidate;
    };
    match candidate {
        Ok(success) => Ok(success.with_context(Some(previous))),
        Err(failure) => Err(failure.furthest(previous)),
    }
}
