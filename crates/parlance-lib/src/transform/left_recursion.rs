//! Left-recursion detection and elimination.
//!
//! Detection computes each rule's direct left corners (symbols derivable
//! at the leftmost position without consuming input) and closes the
//! relation transitively. A rule is directly left-recursive when it is its
//! own direct left corner, indirectly so when it only appears in its own
//! closure.
//!
//! The rewrite keeps a left-recursive rule A when it is the start rule or
//! some other rule references it as a non-leftmost concatenation symbol.
//! The criterion is inherited from the reference algorithm and is known
//! not to cover every pathological indirect case; it handles the direct
//! and proper indirect cases. Non-retained left-recursive rules are
//! dropped along with the recursion.
//!
//! Requires a desugared grammar: optional/repeat/group nodes are rejected.

use indexmap::{IndexMap, IndexSet};

use crate::error::{Result, TransformError};
use crate::grammar::rhs::{RhsKind, RhsTree, RhsType};
use crate::grammar::rule::Rule;
use crate::grammar::{Grammar, next_identifier};
use crate::transform::GrammarTransform;

/// One production of a rule body: its leading symbol and what follows.
type Production = (String, Vec<RhsTree>);

pub struct LeftRecursionTransform<'g> {
    grammar: &'g Grammar,
    direct_lr: IndexSet<String>,
    indirect_lr: IndexSet<String>,
    all_lr: IndexSet<String>,
    direct_corners: IndexMap<String, IndexSet<String>>,
    proper_corners: IndexMap<String, IndexSet<String>>,
    /// Direct left corners of left-recursive rules.
    corners_of_lr: IndexSet<String>,
    retained: IndexSet<String>,
}

impl<'g> LeftRecursionTransform<'g> {
    pub fn new(grammar: &'g Grammar) -> Result<LeftRecursionTransform<'g>> {
        let mut direct_lr = IndexSet::new();
        let mut all_lr = IndexSet::new();
        let mut direct_corners: IndexMap<String, IndexSet<String>> = IndexMap::new();

        for rule in grammar.rules() {
            let name = rule.lhs().to_string();
            let corners = rule_direct_corners(rule);
            if corners.contains(&name) {
                direct_lr.insert(name.clone());
                all_lr.insert(name.clone());
            }
            direct_corners.insert(name, corners);
        }

        let mut indirect_lr = IndexSet::new();
        let mut proper_corners: IndexMap<String, IndexSet<String>> = IndexMap::new();
        for rule in grammar.rules() {
            let name = rule.lhs();
            let closure = transitive_closure(name, &direct_corners);
            if !direct_lr.contains(name) && closure.contains(name) {
                indirect_lr.insert(name.to_string());
                all_lr.insert(name.to_string());
            }
            proper_corners.insert(name.to_string(), closure);
        }

        let mut corners_of_lr = IndexSet::new();
        for name in &all_lr {
            if let Some(corners) = direct_corners.get(name) {
                corners_of_lr.extend(corners.iter().cloned());
            }
        }

        let mut retained = IndexSet::new();
        for name in &all_lr {
            if name == grammar.start_rule_name() {
                retained.insert(name.clone());
                continue;
            }
            for other in grammar.rules() {
                if other.is_external() || other.is_regex_rule() {
                    continue;
                }
                if is_retained_by(name, other.rhs())? {
                    retained.insert(name.clone());
                    break;
                }
            }
        }

        Ok(LeftRecursionTransform {
            grammar,
            direct_lr,
            indirect_lr,
            all_lr,
            direct_corners,
            proper_corners,
            corners_of_lr,
            retained,
        })
    }

    pub fn has_direct_lr(&self, rule: &Rule) -> bool {
        self.direct_lr.contains(rule.lhs())
    }

    pub fn has_indirect_lr(&self, rule: &Rule) -> bool {
        self.indirect_lr.contains(rule.lhs())
    }

    /// Materialize the rewritten grammar and re-link it.
    pub fn transformed_grammar(&self) -> Result<Grammar> {
        let mut state = RewriteState {
            new_rules: Vec::new(),
            fresh_names: IndexMap::new(),
            productions: IndexMap::new(),
            taken: self
                .grammar
                .rules()
                .iter()
                .map(|r| r.lhs().to_string())
                .collect(),
        };

        for rule in self.grammar.rules() {
            if self.is_rule_affected(rule) {
                self.process_lr_rule(rule, &mut state)?;
            } else {
                state.new_rules.push(rule.copy());
            }
        }

        state.materialize_productions();

        let defer = self.grammar.has_dependencies();
        let mut rewritten =
            Grammar::from_rules(state.new_rules, self.grammar.start_rule_name(), defer)?;
        if defer {
            rewritten.set_external_grammars(self.grammar.external_grammars().clone());
            rewritten.link()?;
        }
        Ok(rewritten)
    }

    /// Emit the rewrite of one retained left-recursive rule A:
    ///
    /// 1. a non-LR corner X of some LR rule gets `A ::= X (A\X)`,
    /// 2. an LR corner X contributes, per production `X ::= Y β`,
    ///    `(A\Y) ::= β (A\X)`,
    /// 3. a direct corner X of A contributes, per production of A led by
    ///    X with remainder β, `(A\X) ::= β` (epsilon when β is empty).
    fn process_lr_rule(&self, rule: &Rule, state: &mut RewriteState) -> Result<()> {
        let name = rule.lhs();
        if !self.retained.contains(name) {
            return Ok(());
        }
        let empty = IndexSet::new();
        let corners = self.proper_corners.get(name).unwrap_or(&empty);
        for corner in corners {
            if self.all_lr.contains(corner) {
                let corner_rule = self
                    .grammar
                    .rule_by_name(corner)
                    .expect("left-recursive corner names a rule");
                for (lead, mut beta) in tree_productions(corner_rule.rhs())? {
                    let lhs = state.fresh_name(name, &lead);
                    let continuation = state.fresh_name(name, corner);
                    beta.push(RhsTree::identifier(continuation));
                    state.add_production(lhs, beta);
                }
            } else if self.corners_of_lr.contains(corner) {
                let first = if self.grammar.is_rule_name(corner) {
                    RhsTree::identifier(corner.clone())
                } else {
                    RhsTree::terminal(corner.clone())
                };
                let second = RhsTree::identifier(state.fresh_name(name, corner));
                state.add_production(name.to_string(), vec![first, second]);
            }

            let is_direct_corner = self
                .direct_corners
                .get(name)
                .is_some_and(|dc| dc.contains(corner));
            if is_direct_corner {
                for mut beta in productions_following(rule, corner)? {
                    let lhs = state.fresh_name(name, corner);
                    if beta.is_empty() {
                        beta.push(RhsTree::epsilon());
                    }
                    state.add_production(lhs, beta);
                }
            }
        }
        Ok(())
    }
}

impl GrammarTransform for LeftRecursionTransform<'_> {
    fn original_grammar(&self) -> &Grammar {
        self.grammar
    }

    fn is_grammar_affected(&self) -> bool {
        !self.all_lr.is_empty()
    }

    fn is_rule_affected(&self, rule: &Rule) -> bool {
        self.all_lr.contains(rule.lhs())
    }

    fn is_rhs_affected(&self, parent: &Rule, _tree: &RhsTree) -> bool {
        self.is_rule_affected(parent)
    }
}

struct RewriteState {
    new_rules: Vec<Rule>,
    fresh_names: IndexMap<(String, String), String>,
    /// lhs name → alternative bodies, in emission order.
    productions: IndexMap<String, Vec<Vec<RhsTree>>>,
    taken: IndexSet<String>,
}

impl RewriteState {
    /// The fresh non-terminal standing for "rule minus corner", created on
    /// first use.
    fn fresh_name(&mut self, rule: &str, corner: &str) -> String {
        let key = (rule.to_string(), corner.to_string());
        if let Some(existing) = self.fresh_names.get(&key) {
            return existing.clone();
        }
        let name = next_identifier(&format!("{rule}_minus_{corner}"), &self.taken);
        self.taken.insert(name.clone());
        self.fresh_names.insert(key, name.clone());
        name
    }

    fn add_production(&mut self, lhs: String, terms: Vec<RhsTree>) {
        self.productions.entry(lhs).or_default().push(terms);
    }

    /// Turn the accumulated productions into rules: one concatenation per
    /// alternative, wrapped in an alternation when there are several.
    fn materialize_productions(&mut self) {
        for (lhs, alternatives) in std::mem::take(&mut self.productions) {
            let mut bodies: Vec<RhsTree> = alternatives
                .into_iter()
                .map(|terms| RhsTree::list(RhsType::Concatenation, terms))
                .collect();
            let rhs = if bodies.len() == 1 {
                bodies.remove(0)
            } else {
                RhsTree::list(RhsType::Alternation, bodies)
            };
            self.new_rules.push(Rule::new(lhs, rhs));
        }
    }
}

fn rule_direct_corners(rule: &Rule) -> IndexSet<String> {
    let mut corners = IndexSet::new();
    // external and regex rules cannot participate in left-recursive
    // cycles: cross-module cycles are disallowed and regex bodies derive
    // no identifiers
    if !rule.is_external() && !rule.is_regex_rule() {
        tree_direct_corners(rule.rhs(), &mut corners);
    }
    corners
}

fn tree_direct_corners(tree: &RhsTree, out: &mut IndexSet<String>) {
    if tree.kind() == RhsKind::Single || tree.rhs_type() == RhsType::Concatenation {
        tree_direct_corners(tree.child(), out);
        return;
    }
    match tree {
        RhsTree::Identifier { name, .. } => {
            out.insert(name.clone());
        }
        RhsTree::Terminal { literal } => {
            out.insert(literal.clone());
        }
        RhsTree::Alternation { children } => {
            for child in children {
                tree_direct_corners(child, out);
            }
        }
        _ => {}
    }
}

fn transitive_closure(
    name: &str,
    relation: &IndexMap<String, IndexSet<String>>,
) -> IndexSet<String> {
    let mut related = IndexSet::new();
    let mut stack: Vec<String> = match relation.get(name) {
        Some(direct) => direct.iter().rev().cloned().collect(),
        None => Vec::new(),
    };
    while let Some(symbol) = stack.pop() {
        if related.insert(symbol.clone()) {
            if let Some(next) = relation.get(&symbol) {
                for n in next.iter().rev() {
                    stack.push(n.clone());
                }
            }
        }
    }
    related
}

fn is_retained_by(name: &str, tree: &RhsTree) -> Result<bool> {
    if tree.kind() == RhsKind::Single {
        return Err(TransformError::SugarPresent.into());
    }
    match tree {
        RhsTree::Alternation { children } => {
            for child in children {
                if is_retained_by(name, child)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        RhsTree::Concatenation { children } => {
            if is_retained_by(name, &children[0])? {
                return Ok(true);
            }
            for child in &children[1..] {
                if let RhsTree::Identifier {
                    name: child_name, ..
                } = child
                {
                    if child_name == name {
                        return Ok(true);
                    }
                }
            }
            Ok(false)
        }
        _ => Ok(false),
    }
}

/// Decompose a desugared rule body into productions.
fn tree_productions(tree: &RhsTree) -> Result<Vec<Production>> {
    if tree.kind() == RhsKind::Single {
        return Err(TransformError::SugarPresent.into());
    }
    match tree {
        RhsTree::Identifier { name, .. } => Ok(vec![(name.clone(), Vec::new())]),
        RhsTree::Terminal { literal } => Ok(vec![(literal.clone(), Vec::new())]),
        RhsTree::Alternation { children } => {
            let mut productions = Vec::new();
            for child in children {
                productions.extend(tree_productions(child)?);
            }
            Ok(productions)
        }
        RhsTree::Concatenation { children } => {
            let lead = match &children[0] {
                RhsTree::Identifier { name, .. } => name.clone(),
                RhsTree::Terminal { literal } => literal.clone(),
                _ => return Err(TransformError::MalformedConcatenation.into()),
            };
            let rest = children[1..].iter().map(RhsTree::copy_unlinked).collect();
            Ok(vec![(lead, rest)])
        }
        RhsTree::Regex { .. } => Ok(Vec::new()),
        RhsTree::Group { .. } | RhsTree::Optional { .. } | RhsTree::Repeat { .. } => {
            Err(TransformError::SugarPresent.into())
        }
    }
}

/// The remainders of `rule`'s productions whose leading symbol is
/// `corner`.
fn productions_following(rule: &Rule, corner: &str) -> Result<Vec<Vec<RhsTree>>> {
    Ok(tree_productions(rule.rhs())?
        .into_iter()
        .filter(|(lead, _)| lead == corner)
        .map(|(_, beta)| beta)
        .collect())
}
