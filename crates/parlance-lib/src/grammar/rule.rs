//! Named productions.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexSet;
use parlance_core::{ParseValue, TokenType, ValueError};

use crate::grammar::rhs::RhsTree;

/// A result transformer: applied to a rule's payload after a successful
/// match. Errors are recoverable match failures, not faults.
pub type TransformFn = Arc<dyn Fn(ParseValue) -> Result<ParseValue, ValueError> + Send + Sync>;

/// Compose two transformers: `compose(outer, inner)` feeds the payload
/// through `inner` first.
pub fn compose(outer: TransformFn, inner: TransformFn) -> TransformFn {
    Arc::new(move |value| outer(inner(value)?))
}

/// A named production: lhs name, rhs tree, and optionally an external or
/// regex marker plus a result transformer.
#[derive(Clone)]
pub struct Rule {
    lhs: String,
    rhs: RhsTree,
    /// Dependency module name for external rules; the body is a single
    /// identifier resolved in that module.
    external: Option<String>,
    /// Token type for regex rules; the body is the matching regex leaf.
    regex: Option<TokenType>,
    /// None means identity.
    transformer: Option<TransformFn>,
}

impl Rule {
    pub fn new(lhs: impl Into<String>, rhs: RhsTree) -> Rule {
        Rule {
            lhs: lhs.into(),
            rhs,
            external: None,
            regex: None,
            transformer: None,
        }
    }

    /// A rule delegating to `target` in the dependency module `module`.
    pub fn external(lhs: impl Into<String>, module: impl Into<String>, target: impl Into<String>) -> Rule {
        Rule {
            lhs: lhs.into(),
            rhs: RhsTree::identifier(target),
            external: Some(module.into()),
            regex: None,
            transformer: None,
        }
    }

    /// A rule whose body matches a token-type pattern directly.
    pub fn regex_rule(lhs: impl Into<String>, token_type: TokenType) -> Rule {
        Rule {
            lhs: lhs.into(),
            rhs: RhsTree::regex(token_type.clone()),
            external: None,
            regex: Some(token_type),
            transformer: None,
        }
    }

    pub fn with_transformer(mut self, f: TransformFn) -> Rule {
        self.transformer = Some(f);
        self
    }

    pub fn lhs(&self) -> &str {
        &self.lhs
    }

    pub fn rhs(&self) -> &RhsTree {
        &self.rhs
    }

    pub(crate) fn rhs_mut(&mut self) -> &mut RhsTree {
        &mut self.rhs
    }

    pub fn is_external(&self) -> bool {
        self.external.is_some()
    }

    pub fn dependency_name(&self) -> Option<&str> {
        self.external.as_deref()
    }

    pub fn is_regex_rule(&self) -> bool {
        self.regex.is_some()
    }

    pub fn regex_token_type(&self) -> Option<&TokenType> {
        self.regex.as_ref()
    }

    pub fn set_transformer(&mut self, f: TransformFn) {
        self.transformer = Some(f);
    }

    /// Stack `f` on top of the current transformer (`f` runs last).
    pub fn compose_transformer(&mut self, f: TransformFn) {
        self.transformer = Some(match self.transformer.take() {
            Some(existing) => compose(f, existing),
            None => f,
        });
    }

    /// Apply this rule's transformer (identity when unset).
    pub fn transform(&self, value: ParseValue) -> Result<ParseValue, ValueError> {
        match &self.transformer {
            Some(f) => f(value),
            None => Ok(value),
        }
    }

    pub(crate) fn transformer(&self) -> Option<&TransformFn> {
        self.transformer.as_ref()
    }

    /// Structural copy with links cleared; the transformer is shared.
    pub fn copy(&self) -> Rule {
        Rule {
            lhs: self.lhs.clone(),
            rhs: self.rhs.copy_unlinked(),
            external: self.external.clone(),
            regex: self.regex.clone(),
            transformer: self.transformer.clone(),
        }
    }

    /// Terminal literals of this rule's body, not following links.
    pub fn terminals(&self) -> IndexSet<String> {
        let mut out = IndexSet::new();
        self.rhs.collect_terminals(&mut out);
        out
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("lhs", &self.lhs)
            .field("rhs", &self.rhs)
            .field("external", &self.external)
            .field("regex", &self.regex)
            .field("has_transformer", &self.transformer.is_some())
            .finish()
    }
}
