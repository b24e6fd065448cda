//! High-level facade: a grammar plus the token set to scan its inputs.
//!
//! The input token set is derived from the grammar: one exact type per
//! alphabet terminal, preceded by the token types of any regex rules (so
//! regex-rule matches win during scanning).

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use parlance_core::{TokenSet, Tokenizer};

use crate::annotations::AnnotationSet;
use crate::deps::DependencyResolver;
use crate::engine::ParseOutcome;
use crate::error::Result;
use crate::grammar::Grammar;
use crate::grammar::rule::TransformFn;

pub struct Parser {
    grammar: Grammar,
    token_set: TokenSet,
    ignore_whitespace: bool,
}

pub struct ParserBuilder<'a> {
    source: String,
    module_name: String,
    start_symbol: Option<String>,
    dependency_sources: IndexMap<String, String>,
    dependency_files: Vec<PathBuf>,
    annotations: Option<&'a AnnotationSet>,
    ignore_whitespace: bool,
}

impl<'a> ParserBuilder<'a> {
    pub fn start_symbol(mut self, name: impl Into<String>) -> Self {
        self.start_symbol = Some(name.into());
        self
    }

    /// Name of the main module, used for dependency-cycle detection.
    pub fn module_name(mut self, name: impl Into<String>) -> Self {
        self.module_name = name.into();
        self
    }

    pub fn dependency_source(mut self, name: impl Into<String>, source: impl Into<String>) -> Self {
        self.dependency_sources.insert(name.into(), source.into());
        self
    }

    pub fn dependency_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.dependency_files.push(path.into());
        self
    }

    pub fn annotations(mut self, set: &'a AnnotationSet) -> Self {
        self.annotations = Some(set);
        self
    }

    /// Whether parsed inputs skip whitespace between tokens.
    pub fn ignore_whitespace(mut self, ignore: bool) -> Self {
        self.ignore_whitespace = ignore;
        self
    }

    pub fn build(self) -> Result<Parser> {
        let needs_resolver =
            !self.dependency_sources.is_empty() || !self.dependency_files.is_empty();
        let grammar = if needs_resolver {
            let mut resolver = DependencyResolver::new();
            if let Some(set) = self.annotations {
                resolver = resolver.annotations(set);
            }
            for (name, source) in &self.dependency_sources {
                resolver.add_source(name.clone(), source.clone());
            }
            for file in &self.dependency_files {
                resolver.add_file(file)?;
            }
            resolver.resolve(
                &self.module_name,
                &self.source,
                self.start_symbol.as_deref(),
            )?
        } else {
            let mut builder = Grammar::builder(&self.source);
            if let Some(start) = &self.start_symbol {
                builder = builder.start_symbol(start.clone());
            }
            if let Some(set) = self.annotations {
                builder = builder.annotations(set);
            }
            builder.build()?
        };

        let token_set = derive_token_set(&grammar);
        Ok(Parser {
            grammar,
            token_set,
            ignore_whitespace: self.ignore_whitespace,
        })
    }
}

fn derive_token_set(grammar: &Grammar) -> TokenSet {
    let terminals = TokenSet::for_terminals(grammar.alphabet(true));
    if grammar.has_regex_token_types() {
        let mut set = grammar.regex_token_types().clone();
        set.extend_with(&terminals);
        set
    } else {
        terminals
    }
}

impl Parser {
    pub fn builder<'a>(source: impl Into<String>) -> ParserBuilder<'a> {
        ParserBuilder {
            source: source.into(),
            module_name: "main".to_string(),
            start_symbol: None,
            dependency_sources: IndexMap::new(),
            dependency_files: Vec::new(),
            annotations: None,
            ignore_whitespace: false,
        }
    }

    /// Builder over a grammar file; the module name is derived from the
    /// file name.
    pub fn from_file<'a>(path: &Path) -> Result<ParserBuilder<'a>> {
        let source = std::fs::read_to_string(path)?;
        Ok(Parser::builder(source).module_name(crate::deps::module_name(path)))
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    /// Replace the named rule's result transformer.
    pub fn set_transformer(&mut self, rule_name: &str, f: TransformFn) -> Result<()> {
        self.grammar.set_transformer(rule_name, f)
    }

    /// Stack a transformer on the named rule (it runs last).
    pub fn compose_transformer(&mut self, rule_name: &str, f: TransformFn) -> Result<()> {
        self.grammar.compose_transformer(rule_name, f)
    }

    /// Tokenize and parse an input string. Tokenization failures surface
    /// as an invalid outcome, never a panic.
    pub fn parse_str(&self, input: &str) -> ParseOutcome {
        self.parse_str_with_whitespace(input, self.ignore_whitespace)
    }

    pub fn parse_str_with_whitespace(&self, input: &str, ignore_whitespace: bool) -> ParseOutcome {
        let tokenizer =
            Tokenizer::with_whitespace_skipping(self.token_set.clone(), ignore_whitespace);
        match tokenizer.tokenize(input) {
            Ok(mut stream) => self.grammar.try_parse(&mut stream),
            Err(error) => ParseOutcome {
                valid: false,
                result: None,
                error: Some(error.to_string()),
            },
        }
    }

    pub fn check_str(&self, input: &str) -> bool {
        self.parse_str(input).valid
    }

    pub fn parse_file(&self, path: &Path) -> Result<ParseOutcome> {
        let input = std::fs::read_to_string(path)?;
        Ok(self.parse_str(&input))
    }
}
