//! Grammar → source-text serialization.
//!
//! The grammar text file is the persisted form: serializing a grammar and
//! re-parsing the output must produce a token-for-token-equivalent grammar
//! (comments excepted, since they never survive lexing).

use std::fmt;

use crate::grammar::Grammar;
use crate::grammar::rhs::{RhsTree, RhsType};
use crate::grammar::rule::Rule;

/// Serialize a whole grammar: start rule first, then the remaining rules
/// in definition order.
pub fn save_grammar(grammar: &Grammar) -> String {
    let mut out = save_rule(grammar.start_rule());
    for rule in grammar.rules() {
        if rule.lhs() != grammar.start_rule_name() {
            out.push('\n');
            out.push_str(&save_rule(rule));
        }
    }
    out
}

/// Serialize one rule, including its external/regex form.
pub fn save_rule(rule: &Rule) -> String {
    let mut out = format!("{} = ", rule.lhs());
    if let Some(dep) = rule.dependency_name() {
        out.push_str(dep);
        out.push_str(" : ");
        out.push_str(rule.rhs().identifier_name());
        out.push_str(" ;\n");
        return out;
    }
    if rule.is_regex_rule() {
        out.push_str("~ ");
    }
    out.push_str(&save_rhs(rule.rhs()));
    out.push_str(" ;\n");
    out
}

/// Serialize a right-hand side with its surface syntax.
pub fn save_rhs(tree: &RhsTree) -> String {
    match tree {
        RhsTree::Identifier { name, .. } => name.clone(),
        RhsTree::Terminal { literal } => quote(literal),
        RhsTree::Regex { token_type } => quote(token_type.expression()),
        RhsTree::Group { child } => format!("({})", save_rhs(child)),
        RhsTree::Optional { child } => format!("[{}]", save_rhs(child)),
        RhsTree::Repeat { child } => format!("{{{}}}", save_rhs(child)),
        RhsTree::Alternation { children } | RhsTree::Concatenation { children } => {
            let separator = if tree.rhs_type() == RhsType::Alternation {
                " | "
            } else {
                " , "
            };
            children
                .iter()
                .map(save_rhs)
                .collect::<Vec<_>>()
                .join(separator)
        }
    }
}

fn quote(text: &str) -> String {
    if text.contains('"') {
        format!("'{text}'")
    } else {
        format!("\"{text}\"")
    }
}

impl fmt::Display for RhsTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", save_rhs(self))
    }
}
