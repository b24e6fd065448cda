//! Grammar-rewriting passes.
//!
//! Each pass analyzes a linked grammar up front, answers affectedness
//! queries, and can materialize a rewritten, re-linked grammar. Passes are
//! pure: the original grammar is never mutated.

pub mod desugar;
pub mod left_recursion;

#[cfg(test)]
mod desugar_tests;
#[cfg(test)]
mod left_recursion_tests;

use crate::grammar::Grammar;
use crate::grammar::rhs::RhsTree;
use crate::grammar::rule::Rule;

/// Affectedness queries shared by the rewriting passes.
pub trait GrammarTransform {
    fn original_grammar(&self) -> &Grammar;

    /// Whether any rule would be rewritten.
    fn is_grammar_affected(&self) -> bool;

    fn is_rule_affected(&self, rule: &Rule) -> bool;

    fn is_rhs_affected(&self, parent: &Rule, tree: &RhsTree) -> bool;
}
