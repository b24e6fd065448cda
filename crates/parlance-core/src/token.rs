//! Token types and tokens.
//!
//! A [`TokenType`] is a named recognizer over raw text, backed either by an
//! exact literal or by a regular expression. A [`Token`] is an immutable
//! (value, type) pair produced by the tokenizer; when a type's pattern
//! captures sub-groups (e.g. quoted terminals), the token's value is the
//! captured content and `full_text` keeps the raw matched text.

use std::fmt;
use std::sync::Arc;

use regex::Regex;

/// How a token type recognizes text.
#[derive(Debug, Clone)]
enum Recognizer {
    /// Matches exactly this literal.
    Literal(String),
    /// Matches a regular expression.
    Pattern {
        source: String,
        /// Anchored at the start, used for prefix scanning.
        prefix: Regex,
        /// Anchored at both ends, used for whole-text checks.
        full: Regex,
    },
}

/// A named recognizer over raw text.
///
/// Two types are the same iff their names and pattern texts match. A type
/// may be marked ignored: the tokenizer consumes its matches without
/// emitting tokens (comments, say).
#[derive(Debug, Clone)]
pub struct TokenType {
    name: String,
    recognizer: Recognizer,
    ignored: bool,
}

impl TokenType {
    /// An exact-string recognizer.
    pub fn literal(name: impl Into<String>, text: impl Into<String>) -> Self {
        TokenType {
            name: name.into(),
            recognizer: Recognizer::Literal(text.into()),
            ignored: false,
        }
    }

    /// A regex recognizer. A pattern that fails to compile falls back to
    /// recognizing the pattern text literally.
    pub fn pattern(name: impl Into<String>, pattern: impl Into<String>) -> Self {
        let source = pattern.into();
        let prefix = Regex::new(&format!("^(?:{source})"));
        let full = Regex::new(&format!("^(?:{source})$"));
        let recognizer = match (prefix, full) {
            (Ok(prefix), Ok(full)) => Recognizer::Pattern {
                source,
                prefix,
                full,
            },
            _ => Recognizer::Literal(source),
        };
        TokenType {
            name: name.into(),
            recognizer,
            ignored: false,
        }
    }

    /// Mark this type as ignored during tokenization.
    pub fn ignored(mut self) -> Self {
        self.ignored = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The pattern text (literal text for exact types).
    pub fn expression(&self) -> &str {
        match &self.recognizer {
            Recognizer::Literal(text) => text,
            Recognizer::Pattern { source, .. } => source,
        }
    }

    pub fn is_ignored(&self) -> bool {
        self.ignored
    }

    /// Whole-text membership check.
    pub fn is_type_of(&self, raw: &str) -> bool {
        match &self.recognizer {
            Recognizer::Literal(text) => text == raw,
            Recognizer::Pattern { full, .. } => full.is_match(raw),
        }
    }

    /// Match a prefix of `text`. Returns the matched length, the token
    /// value (captured groups concatenated, if the pattern has any that
    /// participated) and the raw matched text.
    pub(crate) fn prefix_match(&self, text: &str) -> Option<(usize, String, String)> {
        match &self.recognizer {
            Recognizer::Literal(lit) => {
                if !lit.is_empty() && text.starts_with(lit.as_str()) {
                    Some((lit.len(), lit.clone(), lit.clone()))
                } else {
                    None
                }
            }
            Recognizer::Pattern { prefix, .. } => {
                let caps = prefix.captures(text)?;
                let whole = caps.get(0).map(|m| m.as_str().to_string())?;
                if whole.is_empty() {
                    return None;
                }
                let mut value = String::new();
                let mut captured = false;
                for group in caps.iter().skip(1).flatten() {
                    captured = true;
                    value.push_str(group.as_str());
                }
                if !captured {
                    value = whole.clone();
                }
                Some((whole.len(), value, whole))
            }
        }
    }

    /// Name + pattern text equality (a literal and a regex with the same
    /// text are different types).
    pub fn same_as(&self, other: &TokenType) -> bool {
        let kinds_match = matches!(
            (&self.recognizer, &other.recognizer),
            (Recognizer::Literal(_), Recognizer::Literal(_))
                | (Recognizer::Pattern { .. }, Recognizer::Pattern { .. })
        );
        kinds_match && self.name == other.name && self.expression() == other.expression()
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.name, self.expression())
    }
}

/// An immutable (value, type) pair.
#[derive(Debug, Clone)]
pub struct Token {
    value: String,
    token_type: Arc<TokenType>,
    full_text: String,
}

impl Token {
    pub fn new(value: impl Into<String>, token_type: Arc<TokenType>) -> Self {
        let value = value.into();
        let full_text = value.clone();
        Token {
            value,
            token_type,
            full_text,
        }
    }

    /// A token whose raw matched text differs from its value (quoted
    /// terminals keep their quotes here).
    pub fn with_full_text(
        value: impl Into<String>,
        token_type: Arc<TokenType>,
        full_text: impl Into<String>,
    ) -> Self {
        Token {
            value: value.into(),
            token_type,
            full_text: full_text.into(),
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn token_type(&self) -> &TokenType {
        &self.token_type
    }

    pub fn full_text(&self) -> &str {
        &self.full_text
    }

    /// Structural equality: value + type.
    pub fn same_as(&self, other: &Token) -> bool {
        self.value == other.value && self.token_type.same_as(&other.token_type)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, '{}')", self.token_type, self.value)
    }
}
