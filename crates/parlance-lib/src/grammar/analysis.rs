//! Static language analysis: finiteness and length bounds.

use indexmap::IndexSet;
use parlance_core::{TokenSet, Tokenizer};

use crate::grammar::Grammar;
use crate::grammar::rhs::RhsTree;
use crate::grammar::rule::Rule;
use crate::smallstrings::SmallestStrings;

/// Result of walking a rule: whether its language is infinite and, when it
/// is not, an upper bound on the longest producible string (in tokens).
/// The bound is `-1` for infinite languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalkResult {
    pub is_infinite: bool,
    pub upper_bound: i64,
}

const INFINITE: WalkResult = WalkResult {
    is_infinite: true,
    upper_bound: -1,
};

/// Walk a rule, treating any identifier cycle as an infinite language.
/// That overestimates (a cycle may be unproductive) but is safe for the
/// enumeration bounds this feeds.
pub(crate) fn walk_rule(grammar: &Grammar, rule: &Rule, seen: &mut IndexSet<String>) -> WalkResult {
    if !seen.is_empty() && seen.contains(rule.lhs()) {
        return INFINITE;
    }
    seen.insert(rule.lhs().to_string());
    walk_tree(grammar, rule.rhs(), seen)
}

fn walk_tree(grammar: &Grammar, tree: &RhsTree, seen: &mut IndexSet<String>) -> WalkResult {
    match tree {
        RhsTree::Terminal { .. } => WalkResult {
            is_infinite: false,
            upper_bound: 1,
        },
        // regex languages are assumed infinite
        RhsTree::Regex { .. } => INFINITE,
        RhsTree::Identifier { .. } => {
            let (target_grammar, target_rule) = grammar.resolve_link(tree.link());
            walk_rule(target_grammar, target_rule, seen)
        }
        RhsTree::Group { child } | RhsTree::Optional { child } => walk_tree(grammar, child, seen),
        RhsTree::Repeat { child } => {
            let inner = walk_tree(grammar, child, seen);
            if inner.is_infinite || inner.upper_bound >= 1 {
                INFINITE
            } else {
                WalkResult {
                    is_infinite: false,
                    upper_bound: 0,
                }
            }
        }
        RhsTree::Concatenation { children } => {
            let mut total = 0;
            for child in children {
                let result = walk_tree(grammar, child, seen);
                if result.is_infinite {
                    return INFINITE;
                }
                total += result.upper_bound;
            }
            WalkResult {
                is_infinite: false,
                upper_bound: total,
            }
        }
        RhsTree::Alternation { children } => {
            let mut longest = 0;
            for child in children {
                let result = walk_tree(grammar, child, seen);
                if result.is_infinite {
                    return INFINITE;
                }
                longest = longest.max(result.upper_bound);
            }
            WalkResult {
                is_infinite: false,
                upper_bound: longest,
            }
        }
    }
}

/// Naive enumeration of a grammar's language: walks every string over the
/// grammar's alphabet in smallest-first order and yields the ones the
/// grammar accepts. Inefficient by design; useful for test classification
/// and exploration.
pub struct ValidStrings<'g> {
    grammar: &'g Grammar,
    tokenizer: Tokenizer,
    strings: SmallestStrings,
    remaining: Option<usize>,
    empty_pending: bool,
}

impl<'g> ValidStrings<'g> {
    /// Without an explicit `max_iterations`, finite languages get a crude
    /// bound of `|alphabet| ^ upper_bound + 1` yielded strings so the
    /// iterator terminates; infinite languages iterate forever.
    ///
    /// # Panics
    ///
    /// Panics when the grammar is unlinked.
    pub fn new(
        grammar: &'g Grammar,
        max_iterations: Option<usize>,
        ignore_whitespace: bool,
    ) -> ValidStrings<'g> {
        assert!(grammar.is_linked(), "cannot walk without linking");
        let walk = grammar.walk();
        let alphabet = grammar.alphabet(true);

        let mut with_empty = alphabet.clone();
        with_empty.insert(String::new());
        let tokenizer = Tokenizer::with_whitespace_skipping(
            TokenSet::for_terminals(with_empty),
            ignore_whitespace,
        );
        let mut empty_stream = tokenizer
            .tokenize("")
            .expect("empty input always tokenizes");
        let empty_pending = grammar.matches(&mut empty_stream);

        let remaining = match max_iterations {
            Some(limit) => Some(limit),
            None if !walk.is_infinite => {
                let bound = (alphabet.len() as u64)
                    .checked_pow(walk.upper_bound.max(0) as u32)
                    .and_then(|b| usize::try_from(b).ok())
                    .unwrap_or(usize::MAX - 1);
                Some(bound + 1)
            }
            None => None,
        };

        ValidStrings {
            grammar,
            tokenizer,
            strings: SmallestStrings::new(alphabet),
            remaining,
            empty_pending,
        }
    }

    fn consume_budget(&mut self) {
        if let Some(remaining) = &mut self.remaining {
            *remaining -= 1;
        }
    }
}

impl Iterator for ValidStrings<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if self.remaining == Some(0) {
            return None;
        }
        if self.empty_pending {
            self.empty_pending = false;
            self.consume_budget();
            return Some(String::new());
        }
        loop {
            let candidate = self.strings.next()?;
            if let Ok(mut stream) = self.tokenizer.tokenize(&candidate) {
                if self.grammar.matches(&mut stream) {
                    self.consume_budget();
                    return Some(candidate);
                }
            }
        }
    }
}
