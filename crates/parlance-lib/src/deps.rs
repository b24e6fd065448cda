//! Multi-module grammar resolution.
//!
//! A grammar may delegate rules to named dependency modules
//! (`name = Module : target ;`). The resolver maps module names to grammar
//! sources, materializes each declared dependency depth-first (so every
//! dependency is linked before its dependents), and rejects cyclic or
//! missing modules. Cross-module cycles being impossible by construction
//! is what keeps external rules out of left-recursion analysis.

use std::path::Path;

use indexmap::IndexMap;

use crate::annotations::AnnotationSet;
use crate::error::{Error, LinkError, Result};
use crate::grammar::Grammar;

pub struct DependencyResolver<'a> {
    sources: IndexMap<String, String>,
    annotations: Option<&'a AnnotationSet>,
}

impl<'a> DependencyResolver<'a> {
    pub fn new() -> DependencyResolver<'a> {
        DependencyResolver {
            sources: IndexMap::new(),
            annotations: None,
        }
    }

    /// Annotation library handed to every dependency grammar.
    pub fn annotations(mut self, set: &'a AnnotationSet) -> DependencyResolver<'a> {
        self.annotations = Some(set);
        self
    }

    /// Register a dependency module by name.
    pub fn add_source(&mut self, name: impl Into<String>, source: impl Into<String>) {
        self.sources.insert(name.into(), source.into());
    }

    /// Register a dependency module from a file; the module name is the
    /// file stem (up to the first dot).
    pub fn add_file(&mut self, path: &Path) -> Result<()> {
        let name = module_name(path);
        let source = std::fs::read_to_string(path)?;
        self.sources.insert(name, source);
        Ok(())
    }

    /// Build the main grammar, materialize its dependency tree, and link
    /// everything bottom-up.
    pub fn resolve(
        &self,
        main_name: &str,
        main_source: &str,
        start_symbol: Option<&str>,
    ) -> Result<Grammar> {
        let mut grammar = self.build_deferred(main_source, start_symbol)?;
        let mut path = vec![main_name.to_string()];
        self.materialize(&mut grammar, &mut path)?;
        grammar.link()?;
        Ok(grammar)
    }

    fn build_deferred(&self, source: &str, start_symbol: Option<&str>) -> Result<Grammar> {
        let mut builder = Grammar::builder(source).defer_linkage(true);
        if let Some(start) = start_symbol {
            builder = builder.start_symbol(start);
        }
        if let Some(set) = self.annotations {
            builder = builder.annotations(set);
        }
        builder.build()
    }

    fn materialize(&self, grammar: &mut Grammar, path: &mut Vec<String>) -> Result<()> {
        let declared: Vec<String> = grammar.dependency_names().iter().cloned().collect();
        for dep in declared {
            if path.contains(&dep) {
                return Err(LinkError::RecursiveDependency { name: dep }.into());
            }
            let source = self
                .sources
                .get(&dep)
                .ok_or_else(|| Error::from(LinkError::MissingDependency { name: dep.clone() }))?;
            let mut sub = self.build_deferred(source, None)?;
            path.push(dep.clone());
            self.materialize(&mut sub, path)?;
            path.pop();
            sub.link()?;
            grammar.add_external_grammar(dep, sub);
        }
        Ok(())
    }
}

impl Default for DependencyResolver<'_> {
    fn default() -> Self {
        DependencyResolver::new()
    }
}

/// Module name for a grammar file: the file name up to its first dot.
pub fn module_name(path: &Path) -> String {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    match file_name.split_once('.') {
        Some((stem, _)) => stem.to_string(),
        None => file_name,
    }
}
