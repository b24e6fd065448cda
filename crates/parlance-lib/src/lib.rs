//! Parlance: a grammar-driven parsing engine.
//!
//! Given an EBNF-style grammar description, Parlance builds an internal
//! grammar representation and decides, for arbitrary token sequences,
//! whether they belong to the described language, producing a structured
//! parse result when they do. Grammars are interpreted directly at parse
//! time by a lazy backtracking engine; no code is generated.
//!
//! # Example
//!
//! ```
//! use parlance_lib::Parser;
//!
//! let parser = Parser::builder("start = 'b' , { 'a' } , 'c' ;")
//!     .build()
//!     .expect("grammar builds");
//!
//! assert!(parser.check_str("baac"));
//! assert!(!parser.check_str("ba"));
//! ```
//!
//! Ambiguity is not resolved: matching returns the first candidate parse
//! that succeeds and consumes all input under the engine's fixed
//! left-to-right, empty-first exploration order. Worst-case matching time
//! is exponential in input length for pathological grammars.

pub mod annotations;
pub mod deps;
pub mod engine;
pub mod error;
pub mod grammar;
pub mod lexer;
pub mod parser;
pub mod smallstrings;
pub mod transform;

pub use annotations::AnnotationSet;
pub use deps::DependencyResolver;
pub use engine::{Outcome, ParseOutcome};
pub use error::{Error, LinkError, Result, SyntaxError, TransformError};
pub use grammar::analysis::{ValidStrings, WalkResult};
pub use grammar::rhs::{RhsKind, RhsTree, RhsType};
pub use grammar::rule::{Rule, TransformFn};
pub use grammar::serialize::{save_grammar, save_rhs, save_rule};
pub use grammar::{Grammar, GrammarBuilder};
pub use parser::Parser;
pub use smallstrings::SmallestStrings;
pub use transform::GrammarTransform;
pub use transform::desugar::DesugarTransform;
pub use transform::left_recursion::LeftRecursionTransform;

#[cfg(test)]
mod annotations_tests;
#[cfg(test)]
mod lexer_tests;
#[cfg(test)]
mod smallstrings_tests;
