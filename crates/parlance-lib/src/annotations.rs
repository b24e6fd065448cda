//! The annotation mini-language: named result transforms attached to rules.
//!
//! A rule may end with `@a.b.c` before its terminating `;`. The chain
//! composes like function composition, so the payload flows through `c`
//! first and `a` last.

use std::sync::Arc;

use indexmap::IndexMap;
use parlance_core::{ParseValue, ValueError};

use crate::error::SyntaxError;
use crate::grammar::rule::{TransformFn, compose};
use crate::lexer::{LexKind, LexToken};

/// Constructor for a unary annotation's transform, given its argument text.
pub type UnaryBuilder = Arc<dyn Fn(&str) -> Result<TransformFn, String> + Send + Sync>;

enum Annotation {
    NoArg(TransformFn),
    Unary(UnaryBuilder),
}

/// A named collection of annotations.
pub struct AnnotationSet {
    entries: IndexMap<String, Annotation>,
}

impl AnnotationSet {
    pub fn new() -> AnnotationSet {
        AnnotationSet {
            entries: IndexMap::new(),
        }
    }

    /// The built-in library: `toInt`, `flatten`, `concat`, `index <n>`.
    pub fn default_set() -> AnnotationSet {
        let mut set = AnnotationSet::new();
        set.add_no_arg("toInt", Arc::new(|value| value.to_int()));
        set.add_no_arg("flatten", Arc::new(|value| Ok(value.flatten())));
        set.add_no_arg(
            "concat",
            Arc::new(|value| {
                let mut text = String::new();
                for item in value.as_list()? {
                    text.push_str(&item.to_string());
                }
                Ok(ParseValue::Str(text))
            }),
        );
        set.add_unary(
            "index",
            Arc::new(|argument| {
                let index: usize = argument
                    .parse()
                    .map_err(|_| format!("`{argument}` is not an index"))?;
                let f: TransformFn = Arc::new(move |value: ParseValue| {
                    let items = value.as_list()?;
                    items
                        .get(index)
                        .cloned()
                        .ok_or(ValueError::IndexOutOfBounds {
                            index,
                            len: items.len(),
                        })
                });
                Ok(f)
            }),
        );
        set
    }

    pub fn add_no_arg(&mut self, name: impl Into<String>, f: TransformFn) {
        self.entries.insert(name.into(), Annotation::NoArg(f));
    }

    pub fn add_unary(&mut self, name: impl Into<String>, builder: UnaryBuilder) {
        self.entries.insert(name.into(), Annotation::Unary(builder));
    }

    /// Parse an annotation chain (the tokens after `@`) into a single
    /// transform. Segments are separated by `.` and composed right to
    /// left.
    pub(crate) fn parse_chain(&self, tokens: &[LexToken]) -> Result<TransformFn, SyntaxError> {
        if tokens.last().is_some_and(|t| t.kind == LexKind::Dot) {
            return Err(SyntaxError::DanglingComposition);
        }

        let mut segments: Vec<&[LexToken]> = Vec::new();
        let mut start = 0;
        for (i, token) in tokens.iter().enumerate() {
            if token.kind == LexKind::Dot {
                if i > start {
                    segments.push(&tokens[start..i]);
                }
                start = i + 1;
            }
        }
        if start < tokens.len() {
            segments.push(&tokens[start..]);
        }
        if segments.is_empty() {
            return Err(SyntaxError::DanglingComposition);
        }

        let mut chain: TransformFn = Arc::new(|value| Ok(value));
        for segment in segments.iter().rev() {
            chain = compose(self.resolve(segment)?, chain);
        }
        Ok(chain)
    }

    fn resolve(&self, segment: &[LexToken]) -> Result<TransformFn, SyntaxError> {
        let name = &segment[0].text;
        let annotation = self
            .entries
            .get(name)
            .ok_or_else(|| SyntaxError::UnknownAnnotation { name: name.clone() })?;
        match annotation {
            Annotation::NoArg(f) => {
                if segment.len() != 1 {
                    return Err(SyntaxError::AnnotationArity {
                        name: name.clone(),
                        expected: 0,
                        found: segment.len() - 1,
                    });
                }
                Ok(f.clone())
            }
            Annotation::Unary(builder) => {
                if segment.len() != 2 {
                    return Err(SyntaxError::AnnotationArity {
                        name: name.clone(),
                        expected: 1,
                        found: segment.len().saturating_sub(1),
                    });
                }
                let argument = &segment[1].text;
                builder(argument).map_err(|_| SyntaxError::BadAnnotationArgument {
                    name: name.clone(),
                    argument: argument.clone(),
                })
            }
        }
    }
}

impl Default for AnnotationSet {
    fn default() -> Self {
        AnnotationSet::default_set()
    }
}
