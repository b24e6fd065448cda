//! Regex-driven tokenizer over a [`TokenSet`].

use thiserror::Error;

use crate::stream::TokenStream;
use crate::token::Token;
use crate::token_set::TokenSet;

/// Tokenization failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TokenizeError {
    /// No token type matches at the front of the remaining input.
    #[error("input matches no known token type at `{rest}`")]
    NoMatch { rest: String },
}

/// Scans raw text into a [`TokenStream`] by trying each token type in set
/// order against the front of the remaining input.
#[derive(Debug, Clone)]
pub struct Tokenizer {
    types: TokenSet,
    skip_whitespace: bool,
}

impl Tokenizer {
    /// A tokenizer that skips whitespace between tokens.
    pub fn new(types: TokenSet) -> Self {
        Tokenizer {
            types,
            skip_whitespace: true,
        }
    }

    /// Control whether whitespace between tokens is skipped or must be
    /// covered by the token types themselves.
    pub fn with_whitespace_skipping(types: TokenSet, skip_whitespace: bool) -> Self {
        Tokenizer {
            types,
            skip_whitespace,
        }
    }

    pub fn types(&self) -> &TokenSet {
        &self.types
    }

    /// Tokenize `text`. Ignored types consume input without emitting
    /// tokens. The first type (in set order) matching a non-empty prefix
    /// wins at each position.
    pub fn tokenize(&self, text: &str) -> Result<TokenStream, TokenizeError> {
        let mut tokens = Vec::new();
        let mut rest = text;

        while !rest.is_empty() {
            if self.skip_whitespace {
                let trimmed = rest.trim_start();
                if trimmed.len() != rest.len() {
                    rest = trimmed;
                    continue;
                }
            }

            let mut matched = None;
            for tt in self.types.iter() {
                if let Some((len, value, full_text)) = tt.prefix_match(rest) {
                    matched = Some((tt.clone(), len, value, full_text));
                    break;
                }
            }

            match matched {
                Some((tt, len, value, full_text)) => {
                    if !tt.is_ignored() {
                        tokens.push(Token::with_full_text(value, tt, full_text));
                    }
                    rest = &rest[len..];
                }
                None => {
                    return Err(TokenizeError::NoMatch {
                        rest: rest.to_string(),
                    });
                }
            }
        }

        Ok(TokenStream::new(tokens, self.types.clone()))
    }
}
