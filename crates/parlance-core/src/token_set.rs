//! Ordered, name-deduped collections of token types.

use std::sync::Arc;

use indexmap::IndexMap;

use crate::token::TokenType;

/// An insertion-ordered set of token types, indexed by name.
///
/// Order matters: the tokenizer tries types front to back, and the first
/// type whose pattern matches a non-empty prefix wins.
#[derive(Debug, Clone, Default)]
pub struct TokenSet {
    types: IndexMap<String, Arc<TokenType>>,
}

impl TokenSet {
    pub fn new() -> Self {
        TokenSet::default()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Add a type; a type with an already-present name is dropped.
    pub fn add(&mut self, token_type: TokenType) {
        if !self.types.contains_key(token_type.name()) {
            self.types
                .insert(token_type.name().to_string(), Arc::new(token_type));
        }
    }

    pub fn extend_with(&mut self, other: &TokenSet) {
        for tt in other.iter() {
            if !self.types.contains_key(tt.name()) {
                self.types.insert(tt.name().to_string(), Arc::clone(tt));
            }
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Arc<TokenType>> {
        self.types.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<TokenType>> {
        self.types.values()
    }

    /// One exact type per character of `alphabet`, named after the
    /// character itself.
    pub fn for_alphabet(alphabet: &str) -> TokenSet {
        let mut set = TokenSet::new();
        for c in alphabet.chars() {
            let letter = c.to_string();
            set.add(TokenType::literal(letter.clone(), letter));
        }
        set
    }

    /// One exact type per terminal literal, ordered longest first (then
    /// lexicographically) so that longer literals win during scanning.
    pub fn for_terminals<I, S>(terminals: I) -> TokenSet
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut literals: Vec<String> = terminals.into_iter().map(Into::into).collect();
        literals.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        literals.dedup();
        let mut set = TokenSet::new();
        for literal in literals {
            set.add(TokenType::literal(literal.clone(), literal));
        }
        set
    }
}
