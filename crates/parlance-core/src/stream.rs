//! The rewindable token cursor driven by the parse engine.

use std::sync::Arc;

use crate::token::{Token, TokenType};
use crate::token_set::TokenSet;

/// A saved cursor position. Restoring one rewinds the stream to exactly
/// the state it had when the snapshot was taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub(crate) index: usize,
    pub(crate) exhausted: bool,
}

impl Position {
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }
}

/// A token sequence plus a cursor over it.
///
/// The cursor distinguishes "at the last token" from "advanced past the
/// last token" (exhausted); `current` keeps returning the last token once
/// exhausted so failure messages can cite it. Exactly one enumerator chain
/// may drive a stream at a time; the engine enforces this by taking
/// `&mut TokenStream`.
#[derive(Debug, Clone)]
pub struct TokenStream {
    tokens: Vec<Token>,
    types: TokenSet,
    index: usize,
    exhausted: bool,
}

impl TokenStream {
    pub fn new(tokens: Vec<Token>, types: TokenSet) -> Self {
        TokenStream {
            tokens,
            types,
            index: 0,
            exhausted: false,
        }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    pub fn types(&self) -> &TokenSet {
        &self.types
    }

    /// The token under the cursor. On an empty stream this synthesizes an
    /// empty token (of the first type matching the empty string, if any).
    pub fn current(&self) -> Token {
        match self.tokens.get(self.index) {
            Some(token) => token.clone(),
            None => self.empty_token(),
        }
    }

    fn empty_token(&self) -> Token {
        let ty = self
            .types
            .iter()
            .find(|tt| tt.is_type_of(""))
            .cloned()
            .unwrap_or_else(|| Arc::new(TokenType::literal("Empty", "")));
        Token::new("", ty)
    }

    /// Advance the cursor. Stepping past the last token marks the stream
    /// exhausted (the index stays on the last token) and returns false.
    pub fn advance(&mut self) -> bool {
        if self.index + 1 >= self.tokens.len() {
            self.exhausted = true;
            false
        } else {
            self.index += 1;
            true
        }
    }

    /// Snapshot the cursor.
    pub fn position(&self) -> Position {
        Position {
            index: self.index,
            exhausted: self.exhausted,
        }
    }

    /// Rewind to a snapshot taken on this stream.
    ///
    /// # Panics
    ///
    /// Panics if the position's index is out of bounds for this stream;
    /// that can only happen when a snapshot from another stream is used,
    /// which is a programming error.
    pub fn restore(&mut self, position: Position) {
        if self.tokens.is_empty() && position.index == 0 {
            self.exhausted = position.exhausted;
            return;
        }
        assert!(
            position.index < self.tokens.len(),
            "cursor position {} out of bounds for stream of {} tokens",
            position.index,
            self.tokens.len(),
        );
        self.index = position.index;
        self.exhausted = position.exhausted;
    }

    pub fn first(&self) -> Option<&Token> {
        self.tokens.first()
    }

    pub fn last(&self) -> Option<&Token> {
        self.tokens.last()
    }

    /// Split into sub-streams on every token structurally equal to
    /// `separator`, dropping empty segments.
    pub fn split_on(&self, separator: &Token) -> Vec<TokenStream> {
        let mut streams = Vec::new();
        let mut segment = Vec::new();
        for token in &self.tokens {
            if token.same_as(separator) {
                if !segment.is_empty() {
                    streams.push(TokenStream::new(
                        std::mem::take(&mut segment),
                        self.types.clone(),
                    ));
                }
            } else {
                segment.push(token.clone());
            }
        }
        if !segment.is_empty() {
            streams.push(TokenStream::new(segment, self.types.clone()));
        }
        streams
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Token-for-token structural equality, ignoring cursor state.
    pub fn has_same_tokens(&self, other: &TokenStream) -> bool {
        self.tokens.len() == other.tokens.len()
            && self
                .tokens
                .iter()
                .zip(other.tokens.iter())
                .all(|(a, b)| a.same_as(b))
    }
}
