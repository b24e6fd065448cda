//! The lazy backtracking parse engine.
//!
//! Every grammar node yields an enumerator over the ways it could match a
//! prefix of the remaining tokens. Enumerators follow a pull protocol:
//!
//! - `has_more` - false is authoritative (no candidates left); true only
//!   promises that another attempt is worth making.
//! - `try_next` - `None` means "no candidate produced this call, keep
//!   pulling"; `Some` carries either a match or a failure candidate.
//!
//! Before every candidate attempt after the first, the enumerator rewinds
//! the cursor to the position it recorded at construction, so every
//! alternative starts from the same input position. The cursor is driven
//! through a single `&mut TokenStream`, which makes "one active enumerator
//! chain at a time" a property of the borrow checker rather than of a lock.

mod expect;

#[cfg(test)]
mod expect_tests;

pub(crate) use expect::RuleExpect;

use parlance_core::{ParseValue, TokenStream};

use crate::grammar::Grammar;
use crate::grammar::rule::Rule;

/// One enumeration candidate: a match with its payload, or a recoverable
/// failure with a message.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Matched(ParseValue),
    Failed(String),
}

impl Outcome {
    pub fn is_match(&self) -> bool {
        matches!(self, Outcome::Matched(_))
    }
}

/// The result of a top-level parse attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseOutcome {
    pub valid: bool,
    pub result: Option<ParseValue>,
    pub error: Option<String>,
}

impl ParseOutcome {
    pub(crate) fn not_exhausted() -> ParseOutcome {
        ParseOutcome {
            valid: false,
            result: None,
            error: Some("Tokens not Exhausted".to_string()),
        }
    }

    /// The payload of a valid outcome.
    pub fn into_result(self) -> Option<ParseValue> {
        if self.valid { self.result } else { None }
    }
}

impl From<Outcome> for ParseOutcome {
    fn from(outcome: Outcome) -> ParseOutcome {
        match outcome {
            Outcome::Matched(value) => ParseOutcome {
                valid: true,
                result: Some(value),
                error: None,
            },
            Outcome::Failed(error) => ParseOutcome {
                valid: false,
                result: None,
                error: Some(error),
            },
        }
    }
}

/// Pull candidates from `rule`'s enumerator until one succeeds with the
/// stream fully consumed. An empty stream counts as consumed. When the
/// enumeration dries up, the last candidate is reported if it explains
/// anything (a failure, or a success on an already-consumed stream);
/// otherwise the outcome is the generic "Tokens not Exhausted".
pub(crate) fn drive(grammar: &Grammar, rule: &Rule, tokens: &mut TokenStream) -> ParseOutcome {
    let mut expect = RuleExpect::new(grammar, rule, tokens);
    let mut last: Option<Outcome> = None;

    while expect.has_more() {
        if let Some(outcome) = expect.try_next(tokens) {
            if outcome.is_match() && (tokens.is_empty() || tokens.is_exhausted()) {
                return outcome.into();
            }
            last = Some(outcome);
        }
    }

    match last {
        Some(outcome)
            if !outcome.is_match() || tokens.is_exhausted() || tokens.is_empty() =>
        {
            outcome.into()
        }
        _ => ParseOutcome::not_exhausted(),
    }
}
