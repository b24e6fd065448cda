//! Per-node-kind enumerator state machines.
//!
//! Each state machine keeps exactly enough to resume where it left off:
//! a child index, an inner enumerator, the accumulated partial result and
//! first-attempt flags. No stack frames persist across `try_next` calls;
//! recursion depth within one call follows the grammar's nesting, with the
//! iterative top-level loop handling arbitrarily long inputs.

use parlance_core::{ParseValue, Position, TokenStream, TokenType};

use crate::engine::Outcome;
use crate::grammar::Grammar;
use crate::grammar::rhs::RhsTree;
use crate::grammar::rule::Rule;

/// Rule-level enumerator: wraps the rule body's enumerator and applies the
/// rule's result transformer to every match. A transformer error becomes a
/// failure candidate so surrounding alternatives can still be tried.
pub(crate) struct RuleExpect<'g> {
    grammar: &'g Grammar,
    rule: &'g Rule,
    inner: Option<Expect<'g>>,
    first: bool,
}

impl<'g> RuleExpect<'g> {
    pub(crate) fn new(grammar: &'g Grammar, rule: &'g Rule, _tokens: &TokenStream) -> Self {
        RuleExpect {
            grammar,
            rule,
            inner: None,
            first: true,
        }
    }

    pub(crate) fn has_more(&self) -> bool {
        match &self.inner {
            None => self.first,
            Some(inner) => inner.has_more(),
        }
    }

    pub(crate) fn try_next(&mut self, tokens: &mut TokenStream) -> Option<Outcome> {
        if self.first {
            self.inner = Some(Expect::new(self.grammar, self.rule.rhs(), tokens));
            self.first = false;
        }
        let inner = self.inner.as_mut().expect("rule body enumerator");
        if !inner.has_more() {
            return None;
        }
        match inner.try_next(tokens)? {
            Outcome::Matched(value) => Some(match self.rule.transform(value) {
                Ok(transformed) => Outcome::Matched(transformed),
                Err(error) => Outcome::Failed(error.to_string()),
            }),
            failed => Some(failed),
        }
    }
}

/// Enumerator over the candidate matches of one grammar node.
pub(crate) struct Expect<'g> {
    origin: Position,
    state: State<'g>,
}

enum State<'g> {
    Terminal(TerminalState<'g>),
    Regex(RegexState<'g>),
    Identifier(IdentifierState<'g>),
    Group(GroupState<'g>),
    Optional(OptionalState<'g>),
    Alternation(AlternationState<'g>),
    Concatenation(SequenceState<'g>),
    Repeat(RepeatState<'g>),
}

struct TerminalState<'g> {
    literal: &'g str,
    fired: bool,
}

struct RegexState<'g> {
    token_type: &'g TokenType,
    /// Smallest token count the next candidate may consume.
    min_width: usize,
    done: bool,
}

struct IdentifierState<'g> {
    grammar: &'g Grammar,
    node: &'g RhsTree,
    inner: Option<Box<RuleExpect<'g>>>,
    first: bool,
    last_error: Option<String>,
}

struct GroupState<'g> {
    grammar: &'g Grammar,
    child: &'g RhsTree,
    inner: Option<Box<Expect<'g>>>,
    first: bool,
    last_error: Option<String>,
}

struct OptionalState<'g> {
    grammar: &'g Grammar,
    child: &'g RhsTree,
    inner: Option<Box<Expect<'g>>>,
    first: bool,
    second: bool,
    last_error: Option<String>,
}

struct AlternationState<'g> {
    grammar: &'g Grammar,
    children: &'g [RhsTree],
    next_child: usize,
    inner: Option<Box<Expect<'g>>>,
    first: bool,
    last_error: Option<String>,
}

/// Shared by concatenation nodes and their continuation enumerators: the
/// outer loop walks this child's candidates, the inner loop exhausts the
/// continuation over the remaining children.
struct SequenceState<'g> {
    grammar: &'g Grammar,
    children: &'g [RhsTree],
    index: usize,
    child: Option<Box<Expect<'g>>>,
    first: bool,
    use_child: bool,
    rest: Option<Box<Expect<'g>>>,
    first_rest: bool,
    partial: Vec<ParseValue>,
    last_error: Option<String>,
}

struct RepeatState<'g> {
    grammar: &'g Grammar,
    node: &'g RhsTree,
    child: Option<Box<Expect<'g>>>,
    first: bool,
    second: bool,
    use_child: bool,
    rest: Option<Box<Expect<'g>>>,
    first_rest: bool,
    partial: Vec<ParseValue>,
    last_error: Option<String>,
}

impl<'g> Expect<'g> {
    pub(crate) fn new(grammar: &'g Grammar, node: &'g RhsTree, tokens: &TokenStream) -> Expect<'g> {
        let origin = tokens.position();
        let state = match node {
            RhsTree::Terminal { literal } => State::Terminal(TerminalState {
                literal,
                fired: false,
            }),
            RhsTree::Regex { token_type } => State::Regex(RegexState {
                token_type,
                min_width: 1,
                done: false,
            }),
            RhsTree::Identifier { .. } => State::Identifier(IdentifierState {
                grammar,
                node,
                inner: None,
                first: true,
                last_error: None,
            }),
            RhsTree::Group { child } => State::Group(GroupState {
                grammar,
                child: child.as_ref(),
                inner: None,
                first: true,
                last_error: None,
            }),
            RhsTree::Optional { child } => State::Optional(OptionalState {
                grammar,
                child: child.as_ref(),
                inner: None,
                first: true,
                second: false,
                last_error: None,
            }),
            RhsTree::Alternation { children } => State::Alternation(AlternationState {
                grammar,
                children,
                next_child: 0,
                inner: None,
                first: true,
                last_error: None,
            }),
            RhsTree::Concatenation { children } => {
                State::Concatenation(SequenceState::new(grammar, children, 0))
            }
            RhsTree::Repeat { .. } => State::Repeat(RepeatState {
                grammar,
                node,
                child: None,
                first: true,
                second: false,
                use_child: false,
                rest: None,
                first_rest: false,
                partial: Vec::new(),
                last_error: None,
            }),
        };
        Expect { origin, state }
    }

    /// Continuation enumerator for the children of a concatenation from
    /// `index` onward.
    fn sequence(
        grammar: &'g Grammar,
        children: &'g [RhsTree],
        index: usize,
        tokens: &TokenStream,
    ) -> Expect<'g> {
        Expect {
            origin: tokens.position(),
            state: State::Concatenation(SequenceState::new(grammar, children, index)),
        }
    }

    /// Rewind the cursor to this enumerator's construction position.
    fn reset(&self, tokens: &mut TokenStream) {
        tokens.restore(self.origin);
    }

    /// True while another candidate might exist; false is authoritative.
    pub(crate) fn has_more(&self) -> bool {
        match &self.state {
            State::Terminal(s) => !s.fired,
            State::Regex(s) => !s.done,
            State::Identifier(s) => s.first || s.inner.as_ref().is_some_and(|i| i.has_more()),
            State::Group(s) => s.first || s.inner.as_ref().is_some_and(|i| i.has_more()),
            State::Optional(s) => {
                s.first || s.second || s.inner.as_ref().is_some_and(|i| i.has_more())
            }
            State::Alternation(s) => {
                s.first
                    || s.next_child < s.children.len()
                    || s.inner.as_ref().is_some_and(|i| i.has_more())
            }
            State::Concatenation(s) => {
                s.first
                    || s.first_rest
                    || !s.use_child
                    || s.child.as_ref().is_some_and(|c| c.has_more())
            }
            State::Repeat(s) => {
                s.first
                    || s.second
                    || s.first_rest
                    || !s.use_child
                    || s.child.as_ref().is_some_and(|c| c.has_more())
            }
        }
    }

    /// Attempt to produce the next candidate. `None` means "nothing this
    /// call"; callers keep pulling while [`has_more`](Self::has_more).
    pub(crate) fn try_next(&mut self, tokens: &mut TokenStream) -> Option<Outcome> {
        let origin = self.origin;
        match &mut self.state {
            State::Terminal(s) => {
                s.fired = true;
                if s.literal.is_empty() {
                    return Some(Outcome::Matched(ParseValue::empty_str()));
                }
                if !tokens.is_exhausted() && tokens.current().value() == s.literal {
                    tokens.advance();
                    return Some(Outcome::Matched(ParseValue::Str(s.literal.to_string())));
                }
                Some(Outcome::Failed(format!(
                    "expected `{}`, got `{}`",
                    s.literal,
                    tokens.current().value()
                )))
            }

            State::Regex(s) => {
                if s.done {
                    return None;
                }
                tokens.restore(origin);
                if tokens.is_empty() || origin.is_exhausted() {
                    s.done = true;
                    return Some(if s.token_type.is_type_of("") {
                        Outcome::Matched(ParseValue::empty_str())
                    } else {
                        Outcome::Failed(format!(
                            "expected a token of type `{}`, got end of input",
                            s.token_type.name()
                        ))
                    });
                }
                let mut merged = String::new();
                let mut width = 0;
                loop {
                    merged.push_str(tokens.current().value());
                    let fresh = tokens.advance();
                    width += 1;
                    if width >= s.min_width && s.token_type.is_type_of(&merged) {
                        s.min_width = width + 1;
                        if !fresh {
                            s.done = true;
                        }
                        return Some(Outcome::Matched(ParseValue::Str(merged)));
                    }
                    if !fresh {
                        s.done = true;
                        return Some(Outcome::Failed(format!(
                            "expected a token of type `{}`, got `{}`",
                            s.token_type.name(),
                            merged
                        )));
                    }
                }
            }

            State::Identifier(s) => {
                if s.first {
                    let (target_grammar, target_rule) = s.grammar.resolve_link(s.node.link());
                    s.inner = Some(Box::new(RuleExpect::new(target_grammar, target_rule, tokens)));
                }
                let inner = s.inner.as_mut().expect("identifier rule enumerator");
                if inner.has_more() {
                    if s.first {
                        s.first = false;
                    } else {
                        tokens.restore(origin);
                    }
                    match inner.try_next(tokens) {
                        Some(Outcome::Matched(value)) => Some(Outcome::Matched(value)),
                        Some(Outcome::Failed(error)) => {
                            s.last_error = Some(error);
                            if inner.has_more() {
                                None
                            } else {
                                // exhausted: surface the recorded failure
                                s.last_error.clone().map(Outcome::Failed)
                            }
                        }
                        None => s.last_error.clone().map(Outcome::Failed),
                    }
                } else {
                    s.first = false;
                    None
                }
            }

            State::Group(s) => {
                if s.first {
                    s.inner = Some(Box::new(Expect::new(s.grammar, s.child, tokens)));
                }
                let inner = s.inner.as_mut().expect("group child enumerator");
                if inner.has_more() {
                    if s.first {
                        s.first = false;
                    } else {
                        tokens.restore(origin);
                    }
                    match inner.try_next(tokens) {
                        Some(Outcome::Matched(value)) => Some(Outcome::Matched(value)),
                        Some(Outcome::Failed(error)) => {
                            s.last_error = Some(error);
                            if inner.has_more() {
                                None
                            } else {
                                s.last_error.clone().map(Outcome::Failed)
                            }
                        }
                        None => s.last_error.clone().map(Outcome::Failed),
                    }
                } else {
                    s.first = false;
                    None
                }
            }

            State::Optional(s) => {
                // the empty match is preferred: it is produced before the
                // child is ever constructed
                if s.first {
                    s.first = false;
                    s.second = true;
                    return Some(Outcome::Matched(ParseValue::empty_str()));
                }
                if s.second {
                    s.inner = Some(Box::new(Expect::new(s.grammar, s.child, tokens)));
                }
                let inner = s.inner.as_mut().expect("optional child enumerator");
                if inner.has_more() {
                    if s.second {
                        s.second = false;
                    } else {
                        tokens.restore(origin);
                    }
                    match inner.try_next(tokens) {
                        Some(Outcome::Matched(value)) => Some(Outcome::Matched(value)),
                        Some(Outcome::Failed(error)) => {
                            s.last_error = Some(error);
                            if inner.has_more() {
                                None
                            } else {
                                s.last_error.clone().map(Outcome::Failed)
                            }
                        }
                        None => s.last_error.clone().map(Outcome::Failed),
                    }
                } else {
                    s.second = false;
                    None
                }
            }

            State::Alternation(s) => loop {
                if s.first {
                    // a previous child's failed attempt may have left the
                    // cursor mid-stream; every child starts from the
                    // alternation's own position
                    tokens.restore(origin);
                    s.inner = Some(Box::new(Expect::new(
                        s.grammar,
                        &s.children[s.next_child],
                        tokens,
                    )));
                    s.next_child += 1;
                }
                let inner = s.inner.as_mut().expect("alternation child enumerator");
                if inner.has_more() {
                    if s.first {
                        s.first = false;
                    } else {
                        tokens.restore(origin);
                    }
                    match inner.try_next(tokens) {
                        Some(Outcome::Matched(value)) => return Some(Outcome::Matched(value)),
                        Some(Outcome::Failed(error)) => {
                            s.last_error = Some(error);
                            if inner.has_more() || s.next_child < s.children.len() {
                                return None;
                            }
                            // every child exhausted: report the last failure
                            return s.last_error.clone().map(Outcome::Failed);
                        }
                        None => continue,
                    }
                } else if s.next_child < s.children.len() {
                    s.first = true;
                } else {
                    return s.last_error.clone().map(Outcome::Failed);
                }
            },

            State::Concatenation(s) => loop {
                if s.first {
                    s.child = Some(Box::new(Expect::new(
                        s.grammar,
                        &s.children[s.index],
                        tokens,
                    )));
                    s.use_child = true;
                }
                if s.use_child {
                    let child = s.child.as_mut().expect("sequence child enumerator");
                    if child.has_more() {
                        if s.first {
                            s.first = false;
                        } else {
                            child.reset(tokens);
                        }
                        if let Some(outcome) = child.try_next(tokens) {
                            match outcome {
                                Outcome::Matched(value) => {
                                    let wrapped = vec![value];
                                    if s.index + 1 == s.children.len() {
                                        return Some(Outcome::Matched(ParseValue::List(wrapped)));
                                    }
                                    s.rest = Some(Box::new(Expect::sequence(
                                        s.grammar,
                                        s.children,
                                        s.index + 1,
                                        tokens,
                                    )));
                                    s.use_child = false;
                                    s.first_rest = true;
                                    s.partial = wrapped;
                                    continue;
                                }
                                Outcome::Failed(error) => s.last_error = Some(error),
                            }
                        }
                    } else {
                        s.first = false;
                    }
                } else {
                    let rest = s.rest.as_mut().expect("sequence continuation enumerator");
                    if rest.has_more() {
                        if s.first_rest {
                            s.first_rest = false;
                        } else {
                            rest.reset(tokens);
                        }
                        if let Some(outcome) = rest.try_next(tokens) {
                            match outcome {
                                Outcome::Matched(value) => {
                                    let mut items = s.partial.clone();
                                    match value {
                                        ParseValue::List(tail) => items.extend(tail),
                                        other => items.push(other),
                                    }
                                    return Some(Outcome::Matched(ParseValue::List(items)));
                                }
                                Outcome::Failed(error) => s.last_error = Some(error),
                            }
                        }
                    } else {
                        s.rest = None;
                        s.use_child = true;
                        s.partial = Vec::new();
                        s.first_rest = false;
                        continue;
                    }
                }
                return s.last_error.clone().map(Outcome::Failed);
            },

            State::Repeat(s) => loop {
                // zero repetitions first, without touching the child
                if s.first {
                    s.first = false;
                    s.second = true;
                    return Some(Outcome::Matched(ParseValue::List(Vec::new())));
                }
                if s.second {
                    s.child = Some(Box::new(Expect::new(s.grammar, s.node.child(), tokens)));
                    s.use_child = true;
                }
                if s.use_child {
                    let child = s.child.as_mut().expect("repeat child enumerator");
                    if child.has_more() {
                        if s.second {
                            s.second = false;
                        } else {
                            child.reset(tokens);
                        }
                        if let Some(outcome) = child.try_next(tokens) {
                            match outcome {
                                Outcome::Matched(value) => {
                                    let wrapped = vec![value];
                                    if !tokens.is_exhausted() {
                                        s.rest =
                                            Some(Box::new(Expect::new(s.grammar, s.node, tokens)));
                                        s.use_child = false;
                                        s.first_rest = true;
                                        s.partial = wrapped;
                                        continue;
                                    }
                                    return Some(Outcome::Matched(ParseValue::List(wrapped)));
                                }
                                Outcome::Failed(error) => s.last_error = Some(error),
                            }
                        }
                    } else {
                        s.second = false;
                    }
                } else {
                    let rest = s.rest.as_mut().expect("repeat continuation enumerator");
                    if rest.has_more() {
                        if s.first_rest {
                            s.first_rest = false;
                        } else {
                            rest.reset(tokens);
                        }
                        if let Some(outcome) = rest.try_next(tokens) {
                            match outcome {
                                Outcome::Matched(value) => {
                                    let mut items = s.partial.clone();
                                    match value {
                                        ParseValue::List(tail) => items.extend(tail),
                                        other => items.push(other),
                                    }
                                    return Some(Outcome::Matched(ParseValue::List(items)));
                                }
                                Outcome::Failed(error) => s.last_error = Some(error),
                            }
                        }
                    } else {
                        s.rest = None;
                        s.use_child = true;
                        s.partial = Vec::new();
                        s.first_rest = false;
                        continue;
                    }
                }
                return s.last_error.clone().map(Outcome::Failed);
            },
        }
    }
}

impl<'g> SequenceState<'g> {
    fn new(grammar: &'g Grammar, children: &'g [RhsTree], index: usize) -> SequenceState<'g> {
        SequenceState {
            grammar,
            children,
            index,
            child: None,
            first: true,
            use_child: false,
            rest: None,
            first_rest: false,
            partial: Vec::new(),
            last_error: None,
        }
    }
}
