//! EBNF sugar elimination.
//!
//! Rewrites every optional/repeat/group node into a reference to a fresh
//! rule expressed purely with alternation, concatenation, identifiers and
//! terminals:
//!
//! - group: a passthrough rule over the desugared child,
//! - optional: child-or-epsilon alternation,
//! - repeat: the right-recursive zero-or-more encoding.

use indexmap::{IndexMap, IndexSet};

use crate::error::Result;
use crate::grammar::rhs::{RhsKind, RhsTree, RhsType};
use crate::grammar::rule::Rule;
use crate::grammar::{Grammar, next_identifier};
use crate::transform::GrammarTransform;

const GROUP_SUFFIX: &str = "_grp";
const OPTIONAL_SUFFIX: &str = "_opt";
const REPEAT_SUFFIX: &str = "_rep";

pub struct DesugarTransform<'g> {
    grammar: &'g Grammar,
    /// Per rule: whether its body holds sugar, directly or through any
    /// chain of references.
    rule_sugar: IndexMap<String, bool>,
    affected: bool,
}

impl<'g> DesugarTransform<'g> {
    pub fn new(grammar: &'g Grammar) -> DesugarTransform<'g> {
        let mut memo = IndexMap::new();
        let mut affected = false;
        for rule in grammar.rules() {
            affected |= check_rule(grammar, rule.lhs(), &mut memo);
        }
        DesugarTransform {
            grammar,
            rule_sugar: memo,
            affected,
        }
    }

    /// Materialize the desugared grammar and re-link it.
    pub fn transformed_grammar(&self) -> Result<Grammar> {
        let mut taken: IndexSet<String> = self
            .grammar
            .rules()
            .iter()
            .map(|r| r.lhs().to_string())
            .collect();
        let mut new_rules: Vec<Rule> = Vec::new();

        for rule in self.grammar.rules() {
            if self.is_rule_affected(rule) {
                let body = desugar_tree(rule.lhs(), rule.rhs(), &mut taken, &mut new_rules);
                let mut rebuilt = Rule::new(rule.lhs(), body);
                if let Some(transformer) = rule.transformer() {
                    rebuilt.set_transformer(transformer.clone());
                }
                new_rules.push(rebuilt);
            } else {
                new_rules.push(rule.copy());
            }
        }

        let defer = self.grammar.has_dependencies();
        let mut rewritten =
            Grammar::from_rules(new_rules, self.grammar.start_rule_name(), defer)?;
        if defer {
            rewritten.set_external_grammars(self.grammar.external_grammars().clone());
            rewritten.link()?;
        }
        Ok(rewritten)
    }
}

impl GrammarTransform for DesugarTransform<'_> {
    fn original_grammar(&self) -> &Grammar {
        self.grammar
    }

    fn is_grammar_affected(&self) -> bool {
        self.affected
    }

    fn is_rule_affected(&self, rule: &Rule) -> bool {
        self.rule_sugar.get(rule.lhs()).copied().unwrap_or(false)
    }

    fn is_rhs_affected(&self, _parent: &Rule, tree: &RhsTree) -> bool {
        tree_direct_sugar(tree) || self.tree_nested_sugar(tree)
    }
}

impl DesugarTransform<'_> {
    fn tree_nested_sugar(&self, tree: &RhsTree) -> bool {
        match tree {
            RhsTree::Identifier { name, .. } => {
                self.rule_sugar.get(name.as_str()).copied().unwrap_or(false)
            }
            _ => tree
                .children()
                .iter()
                .any(|child| tree_direct_sugar(child) || self.tree_nested_sugar(child)),
        }
    }
}

/// Whether the named rule's body holds sugar anywhere. The memo entry is
/// provisionally false while the rule is being checked, which cuts cyclic
/// reference chains; the final answer overwrites it.
fn check_rule(grammar: &Grammar, name: &str, memo: &mut IndexMap<String, bool>) -> bool {
    if let Some(&known) = memo.get(name) {
        return known;
    }
    memo.insert(name.to_string(), false);
    let has_sugar = match grammar.rule_by_name(name) {
        Some(rule) if rule.is_regex_rule() || rule.is_external() => false,
        Some(rule) => {
            tree_direct_sugar(rule.rhs()) || tree_nested_sugar(grammar, rule.rhs(), memo)
        }
        None => false,
    };
    memo.insert(name.to_string(), has_sugar);
    has_sugar
}

fn tree_direct_sugar(tree: &RhsTree) -> bool {
    tree.kind() == RhsKind::Single
}

fn tree_nested_sugar(grammar: &Grammar, tree: &RhsTree, memo: &mut IndexMap<String, bool>) -> bool {
    match tree {
        RhsTree::Identifier { name, .. } => check_rule(grammar, name, memo),
        _ => {
            let mut nested = false;
            for child in tree.children() {
                nested |= tree_direct_sugar(child);
                nested |= tree_nested_sugar(grammar, child, memo);
            }
            nested
        }
    }
}

/// Copy a tree, replacing each sugar node with a reference to a freshly
/// generated rule (appended to `out` before the rule under rewrite).
fn desugar_tree(
    parent: &str,
    tree: &RhsTree,
    taken: &mut IndexSet<String>,
    out: &mut Vec<Rule>,
) -> RhsTree {
    match tree.kind() {
        RhsKind::Leaf => tree.copy_unlinked(),
        RhsKind::List => {
            let children = tree
                .children()
                .iter()
                .map(|child| desugar_tree(parent, child, taken, out))
                .collect();
            RhsTree::list(tree.rhs_type(), children)
        }
        RhsKind::Single => RhsTree::identifier(generate_rule(parent, tree, taken, out)),
    }
}

fn generate_rule(
    parent: &str,
    tree: &RhsTree,
    taken: &mut IndexSet<String>,
    out: &mut Vec<Rule>,
) -> String {
    let suffix = match tree.rhs_type() {
        RhsType::Group => GROUP_SUFFIX,
        RhsType::Optional => OPTIONAL_SUFFIX,
        _ => REPEAT_SUFFIX,
    };
    let name = next_identifier(&format!("{parent}{suffix}"), taken);
    taken.insert(name.clone());

    let child = desugar_tree(parent, tree.child(), taken, out);
    let body = match tree.rhs_type() {
        RhsType::Group => child,
        RhsType::Optional => {
            RhsTree::list(RhsType::Alternation, vec![child, RhsTree::epsilon()])
        }
        _ => {
            let recur = RhsTree::list(
                RhsType::Concatenation,
                vec![child, RhsTree::identifier(name.clone())],
            );
            RhsTree::list(RhsType::Alternation, vec![recur, RhsTree::epsilon()])
        }
    };
    out.push(Rule::new(name.clone(), body));
    name
}
