//! Error taxonomy.
//!
//! Build-time problems (syntax, linking, rewriting) are hard errors carried
//! by [`Error`]. Match-time failures are not errors at all: they drive
//! backtracking and surface as an invalid [`ParseOutcome`]
//! (`crate::engine::ParseOutcome`). True invariant violations (matching an
//! unlinked grammar, arity misuse on the AST) panic.

use thiserror::Error;

/// Grammar-source syntax errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SyntaxError {
    #[error("unrecognized text at `{text}`")]
    UnrecognizedText { text: String },
    #[error("found text after the last rule (missing `;`?)")]
    MissingTerminator,
    #[error("rule has too few tokens")]
    TooFewTokens,
    #[error("expected {expected}, got `{found}`")]
    Expected { expected: String, found: String },
    #[error("trailing tokens after rule `{rule}`")]
    TrailingTokens { rule: String },
    #[error("more than one annotation section in rule `{rule}`")]
    DuplicateAnnotations { rule: String },
    #[error("missing annotation after `.`")]
    DanglingComposition,
    #[error("unknown annotation `{name}`")]
    UnknownAnnotation { name: String },
    #[error("annotation `{name}` takes {expected} argument(s), got {found}")]
    AnnotationArity {
        name: String,
        expected: usize,
        found: usize,
    },
    #[error("bad annotation argument `{argument}` for `{name}`")]
    BadAnnotationArgument { name: String, argument: String },
}

/// Linking failures: fatal at build time, never recoverable.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LinkError {
    #[error("identifier `{name}` does not exist in the rule mapping")]
    UnresolvedIdentifier { name: String },
    #[error("no external module named `{name}` was supplied")]
    MissingExternalModule { name: String },
    #[error("missing dependency `{name}`")]
    MissingDependency { name: String },
    #[error("recursive dependency on `{name}`")]
    RecursiveDependency { name: String },
}

/// Grammar-rewriting failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransformError {
    #[error("left-recursion elimination requires a desugared grammar")]
    SugarPresent,
    #[error("left-recursion elimination expects concatenations led by a leaf symbol")]
    MalformedConcatenation,
}

/// Top-level error for building, linking and rewriting grammars.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    #[error(transparent)]
    Link(#[from] LinkError),
    #[error(transparent)]
    Transform(#[from] TransformError),
    #[error("no rule named `{name}` exists")]
    UnknownRule { name: String },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
