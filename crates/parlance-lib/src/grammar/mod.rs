//! Grammars: rule arenas, linking, and the match entry points.
//!
//! Pipeline: lex → rule parsing → linking (identifier resolution, possibly
//! across modules) → optional rewriting passes → matching. A grammar is
//! either unlinked or linked; matching an unlinked grammar is a programming
//! error and panics.

pub mod analysis;
pub(crate) mod parser;
pub mod rhs;
pub mod rule;
pub mod serialize;


use indexmap::{IndexMap, IndexSet};
use parlance_core::{TokenSet, TokenStream, Tokenizer};

use crate::annotations::AnnotationSet;
use crate::engine::{ParseOutcome, drive};
use crate::error::{Error, LinkError, Result};
use crate::grammar::analysis::{ValidStrings, WalkResult, walk_rule};
use crate::grammar::rhs::{DepId, Link, RhsTree, RuleId};
use crate::grammar::rule::{Rule, TransformFn};
use crate::lexer::lex;
use crate::smallstrings::SmallestStrings;
use crate::transform::desugar::DesugarTransform;
use crate::transform::left_recursion::LeftRecursionTransform;

/// An ordered collection of rules with a distinguished start rule.
#[derive(Debug, Clone)]
pub struct Grammar {
    rules: Vec<Rule>,
    index: IndexMap<String, RuleId>,
    start: RuleId,
    dependencies: IndexSet<String>,
    externals: IndexMap<String, Grammar>,
    linked: bool,
    extra_token_types: TokenSet,
}

/// Configures grammar construction from source text.
pub struct GrammarBuilder<'a> {
    source: &'a str,
    start_symbol: Option<String>,
    last_start: bool,
    defer_linkage: bool,
    annotations: Option<&'a AnnotationSet>,
}

impl<'a> GrammarBuilder<'a> {
    /// Use this rule as the start rule instead of the first one.
    pub fn start_symbol(mut self, name: impl Into<String>) -> Self {
        self.start_symbol = Some(name.into());
        self
    }

    /// Default the start rule to the last rule instead of the first.
    pub fn last_start(mut self, last: bool) -> Self {
        self.last_start = last;
        self
    }

    /// Leave identifiers unresolved; required when the grammar declares
    /// external dependencies that must be supplied before linking.
    pub fn defer_linkage(mut self, defer: bool) -> Self {
        self.defer_linkage = defer;
        self
    }

    /// Annotation library used to interpret `@...` chains. Without one,
    /// annotations are ignored.
    pub fn annotations(mut self, set: &'a AnnotationSet) -> Self {
        self.annotations = Some(set);
        self
    }

    pub fn build(self) -> Result<Grammar> {
        let tokens = lex(self.source).map_err(Error::Syntax)?;
        let rules = parser::parse_rules(&tokens, self.annotations)?;
        let mut grammar = Grammar::assemble(rules);
        if !self.defer_linkage {
            grammar.link()?;
        }
        match self.start_symbol {
            Some(name) => grammar.set_start(&name)?,
            None => {
                if self.last_start {
                    grammar.start = RuleId(grammar.rules.len() - 1);
                }
            }
        }
        Ok(grammar)
    }
}

impl Grammar {
    pub fn builder(source: &str) -> GrammarBuilder<'_> {
        GrammarBuilder {
            source,
            start_symbol: None,
            last_start: false,
            defer_linkage: false,
            annotations: None,
        }
    }

    /// Build and link a grammar with default options.
    pub fn parse(source: &str) -> Result<Grammar> {
        Grammar::builder(source).build()
    }

    /// Assemble a grammar from already-built rules. The first rule starts
    /// as the start rule.
    pub fn from_rules(rules: Vec<Rule>, start: &str, defer_linkage: bool) -> Result<Grammar> {
        let mut grammar = Grammar::assemble(rules);
        if !defer_linkage {
            grammar.link()?;
        }
        grammar.set_start(start)?;
        Ok(grammar)
    }

    fn assemble(rules: Vec<Rule>) -> Grammar {
        let mut index = IndexMap::new();
        let mut dependencies = IndexSet::new();
        let mut extra_token_types = TokenSet::new();
        for (i, rule) in rules.iter().enumerate() {
            if let Some(dep) = rule.dependency_name() {
                dependencies.insert(dep.to_string());
            }
            if let Some(tt) = rule.regex_token_type() {
                extra_token_types.add(tt.clone());
            }
            index.insert(rule.lhs().to_string(), RuleId(i));
        }
        Grammar {
            rules,
            index,
            start: RuleId(0),
            dependencies,
            externals: IndexMap::new(),
            linked: false,
            extra_token_types,
        }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn is_rule_name(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn rule_by_name(&self, name: &str) -> Option<&Rule> {
        self.index.get(name).map(|id| &self.rules[id.0])
    }

    pub fn start_rule(&self) -> &Rule {
        &self.rules[self.start.0]
    }

    pub fn start_rule_name(&self) -> &str {
        self.start_rule().lhs()
    }

    pub fn set_start(&mut self, name: &str) -> Result<()> {
        match self.index.get(name) {
            Some(id) => {
                self.start = *id;
                Ok(())
            }
            None => Err(Error::UnknownRule {
                name: name.to_string(),
            }),
        }
    }

    pub fn dependency_names(&self) -> &IndexSet<String> {
        &self.dependencies
    }

    pub fn has_dependencies(&self) -> bool {
        !self.dependencies.is_empty()
    }

    pub fn is_linked(&self) -> bool {
        self.linked
    }

    /// Token types contributed by regex rules; these participate in input
    /// tokenization.
    pub fn regex_token_types(&self) -> &TokenSet {
        &self.extra_token_types
    }

    pub fn has_regex_token_types(&self) -> bool {
        !self.extra_token_types.is_empty()
    }

    pub fn external_grammars(&self) -> &IndexMap<String, Grammar> {
        &self.externals
    }

    /// Supply the (already linked) dependency grammars.
    pub fn set_external_grammars(&mut self, externals: IndexMap<String, Grammar>) {
        self.externals = externals;
    }

    pub fn add_external_grammar(&mut self, name: impl Into<String>, grammar: Grammar) {
        self.externals.insert(name.into(), grammar);
    }

    /// Resolve every identifier leaf to its rule, across modules for
    /// external rules. Idempotent.
    pub fn link(&mut self) -> std::result::Result<(), LinkError> {
        if self.linked {
            return Ok(());
        }
        let Grammar {
            rules,
            index,
            externals,
            ..
        } = self;
        for rule in rules.iter_mut() {
            let dep = rule.dependency_name().map(str::to_string);
            match dep {
                Some(dep) => {
                    let (dep_idx, _, dep_grammar) = externals.get_full(dep.as_str()).ok_or(
                        LinkError::MissingExternalModule { name: dep.clone() },
                    )?;
                    link_tree(
                        rule.rhs_mut(),
                        &LinkScope::External {
                            dep: DepId(dep_idx),
                            index: &dep_grammar.index,
                        },
                    )?;
                }
                None => link_tree(rule.rhs_mut(), &LinkScope::Local(&*index))?,
            }
        }
        self.linked = true;
        Ok(())
    }

    pub(crate) fn rule(&self, id: RuleId) -> &Rule {
        &self.rules[id.0]
    }

    pub(crate) fn external(&self, dep: DepId) -> &Grammar {
        self.externals
            .get_index(dep.0)
            .map(|(_, g)| g)
            .expect("dependency handle out of range")
    }

    /// Follow a link to its rule, switching grammar context for external
    /// links.
    pub(crate) fn resolve_link(&self, link: Link) -> (&Grammar, &Rule) {
        match link {
            Link::Local(id) => (self, self.rule(id)),
            Link::External { dep, rule } => {
                let target = self.external(dep);
                (target, target.rule(rule))
            }
        }
    }

    /// Whether the token stream belongs to this grammar's language.
    pub fn matches(&self, tokens: &mut TokenStream) -> bool {
        self.try_parse(tokens).valid
    }

    /// Enumerate candidate parses of the start rule until one both
    /// succeeds and consumes the whole stream.
    ///
    /// Never panics on malformed input; the outcome carries the last
    /// failure message instead. Worst-case time is exponential in input
    /// length for ambiguous or pathological grammars; that is a property
    /// of the exhaustive backtracking design, not a defect.
    ///
    /// # Panics
    ///
    /// Panics when the grammar is unlinked (a programming error).
    pub fn try_parse(&self, tokens: &mut TokenStream) -> ParseOutcome {
        assert!(self.linked, "cannot try a parse without linking");
        drive(self, self.start_rule(), tokens)
    }

    /// All terminal literals reachable from this grammar's rules, in rule
    /// order; with `include_external`, dependency grammars contribute too.
    ///
    /// # Panics
    ///
    /// Panics when `include_external` is requested on an unlinked grammar.
    pub fn alphabet(&self, include_external: bool) -> IndexSet<String> {
        assert!(
            self.linked || !include_external,
            "cannot collect the external alphabet of an unlinked grammar"
        );
        let mut out = IndexSet::new();
        for rule in &self.rules {
            out.extend(rule.terminals());
        }
        if include_external {
            for external in self.externals.values() {
                out.extend(external.alphabet(true));
            }
        }
        out
    }

    /// Static analysis of the start rule's language: infinite or not, and
    /// an upper bound on the longest producible string when finite.
    ///
    /// # Panics
    ///
    /// Panics when the grammar is unlinked.
    pub fn walk(&self) -> WalkResult {
        assert!(self.linked, "cannot walk without linking");
        let mut seen = IndexSet::new();
        walk_rule(self, self.start_rule(), &mut seen)
    }

    /// Classify the first `n` strings over this grammar's alphabet
    /// (shortest first; the empty string first of all) as in or out of
    /// the language. Only meaningful for grammars without regex rules,
    /// whose alphabet is not the full token universe.
    pub fn classify_first_n_strings(&self, n: usize) -> IndexMap<String, bool> {
        let alphabet = self.alphabet(true);
        self.classify_with_alphabet(n, alphabet)
    }

    /// Like [`classify_first_n_strings`](Self::classify_first_n_strings)
    /// with an explicit alphabet.
    pub fn classify_with_alphabet(
        &self,
        n: usize,
        alphabet: IndexSet<String>,
    ) -> IndexMap<String, bool> {
        assert!(self.linked, "cannot classify without linking");
        let mut with_empty = alphabet.clone();
        with_empty.insert(String::new());
        let tokenizer =
            Tokenizer::with_whitespace_skipping(TokenSet::for_terminals(with_empty), false);

        let mut classification = IndexMap::new();
        let mut empty = tokenizer.tokenize("").expect("empty input always tokenizes");
        classification.insert(String::new(), self.matches(&mut empty));

        let mut remaining = n.saturating_sub(1);
        for text in SmallestStrings::new(alphabet) {
            if remaining == 0 {
                break;
            }
            let accepted = match tokenizer.tokenize(&text) {
                Ok(mut stream) => self.matches(&mut stream),
                Err(_) => false,
            };
            classification.insert(text, accepted);
            remaining -= 1;
        }
        classification
    }

    /// Replace the named rule's result transformer.
    pub fn set_transformer(&mut self, rule_name: &str, f: TransformFn) -> Result<()> {
        match self.index.get(rule_name) {
            Some(id) => {
                self.rules[id.0].set_transformer(f);
                Ok(())
            }
            None => Err(Error::UnknownRule {
                name: rule_name.to_string(),
            }),
        }
    }

    /// Stack `f` on top of the named rule's transformer (`f` runs last).
    pub fn compose_transformer(&mut self, rule_name: &str, f: TransformFn) -> Result<()> {
        match self.index.get(rule_name) {
            Some(id) => {
                self.rules[id.0].compose_transformer(f);
                Ok(())
            }
            None => Err(Error::UnknownRule {
                name: rule_name.to_string(),
            }),
        }
    }

    /// Naive smallest-first enumeration of the language's strings.
    pub fn valid_strings(
        &self,
        max_iterations: Option<usize>,
        ignore_whitespace: bool,
    ) -> ValidStrings<'_> {
        ValidStrings::new(self, max_iterations, ignore_whitespace)
    }

    /// Rewrite left-recursive rules into an equivalent right-recursive
    /// form. Pure: returns a new, re-linked grammar.
    pub fn eliminate_left_recursion(&self) -> Result<Grammar> {
        LeftRecursionTransform::new(self)?.transformed_grammar()
    }

    /// Rewrite optional/repeat/group sugar into fresh rules expressed via
    /// alternation and concatenation only. Pure: returns a new, re-linked
    /// grammar.
    pub fn desugar(&self) -> Result<Grammar> {
        DesugarTransform::new(self).transformed_grammar()
    }
}

enum LinkScope<'x> {
    Local(&'x IndexMap<String, RuleId>),
    External {
        dep: DepId,
        index: &'x IndexMap<String, RuleId>,
    },
}

fn link_tree(tree: &mut RhsTree, scope: &LinkScope<'_>) -> std::result::Result<(), LinkError> {
    match tree {
        RhsTree::Identifier { name, link } => {
            let resolved = match scope {
                LinkScope::Local(index) => index.get(name.as_str()).map(|id| Link::Local(*id)),
                LinkScope::External { dep, index } => index
                    .get(name.as_str())
                    .map(|id| Link::External { dep: *dep, rule: *id }),
            };
            match resolved {
                Some(resolved) => {
                    *link = Some(resolved);
                    Ok(())
                }
                None => Err(LinkError::UnresolvedIdentifier { name: name.clone() }),
            }
        }
        RhsTree::Group { child } | RhsTree::Optional { child } | RhsTree::Repeat { child } => {
            link_tree(child, scope)
        }
        RhsTree::Alternation { children } | RhsTree::Concatenation { children } => {
            for child in children.iter_mut() {
                link_tree(child, scope)?;
            }
            Ok(())
        }
        RhsTree::Terminal { .. } | RhsTree::Regex { .. } => Ok(()),
    }
}

/// A fresh identifier derived from `base`, disambiguated with `_1`, `_2`,
/// … against the taken set. Always suffixed, so generated names are
/// recognizable.
pub(crate) fn next_identifier(base: &str, taken: &IndexSet<String>) -> String {
    let mut suffix = 1usize;
    loop {
        let candidate = format!("{base}_{suffix}");
        if !taken.contains(&candidate) {
            return candidate;
        }
        suffix += 1;
    }
}
