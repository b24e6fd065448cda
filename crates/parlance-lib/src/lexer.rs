//! Lexer for grammar-source text.
//!
//! Comments (`#` to end of line) and whitespace are skipped as trivia.
//! Quoted terminals are unquoted here: the token's text is the literal
//! content, which is what the rest of the pipeline cares about.

use logos::Logos;

use crate::error::SyntaxError;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip(r"#[^\n]*", allow_greedy = true))]
pub enum LexKind {
    #[token(";")]
    End,
    #[token("=")]
    Define,
    #[token(":")]
    External,
    #[token("~")]
    Tilde,
    #[token("@")]
    At,
    #[token(".")]
    Dot,
    #[regex(r"[()\[\]{}|,]")]
    Control,
    #[regex(r"[a-zA-Z][a-zA-Z0-9_]*")]
    Identifier,
    #[regex(r#"'[^']*'|"[^"]*""#)]
    Terminal,
    #[regex(r"[0-9]+")]
    Integer,
}

impl LexKind {
    /// Human-readable class name for error messages.
    pub fn describe(self) -> &'static str {
        match self {
            LexKind::End => "`;`",
            LexKind::Define => "`=`",
            LexKind::External => "`:`",
            LexKind::Tilde => "`~`",
            LexKind::At => "`@`",
            LexKind::Dot => "`.`",
            LexKind::Control => "a control token",
            LexKind::Identifier => "an identifier",
            LexKind::Terminal => "a terminal",
            LexKind::Integer => "an integer",
        }
    }
}

/// A lexed grammar-source token. For terminals, `text` is the unquoted
/// literal content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexToken {
    pub kind: LexKind,
    pub text: String,
}

impl LexToken {
    pub fn is_control(&self, symbol: &str) -> bool {
        self.kind == LexKind::Control && self.text == symbol
    }
}

/// Tokenize grammar-source text.
pub fn lex(source: &str) -> Result<Vec<LexToken>, SyntaxError> {
    let mut lexer = LexKind::lexer(source);
    let mut tokens = Vec::new();
    while let Some(result) = lexer.next() {
        match result {
            Ok(kind) => {
                let slice = lexer.slice();
                let text = if kind == LexKind::Terminal {
                    slice[1..slice.len() - 1].to_string()
                } else {
                    slice.to_string()
                };
                tokens.push(LexToken { kind, text });
            }
            Err(()) => {
                return Err(SyntaxError::UnrecognizedText {
                    text: lexer.slice().to_string(),
                });
            }
        }
    }
    Ok(tokens)
}
