use crate::token::TokenType;
use crate::token_set::TokenSet;
use crate::tokenizer::{TokenizeError, Tokenizer};

#[test]
fn alphabet_set_contains_each_letter() {
    let set = TokenSet::for_alphabet("abc");
    assert_eq!(set.len(), 3);
    assert!(set.contains("a"));
    assert!(set.contains("b"));
    assert!(set.contains("c"));
}

#[test]
fn alphabet_tokenizing_without_whitespace() {
    let tokenizer = Tokenizer::with_whitespace_skipping(TokenSet::for_alphabet("abc"), false);
    let stream = tokenizer.tokenize("aababcc").unwrap();
    assert_eq!(stream.len(), 7);
}

#[test]
fn whitespace_is_skipped_between_tokens() {
    let tokenizer = Tokenizer::new(TokenSet::for_alphabet("abcd"));
    let stream = tokenizer.tokenize("a ab  a\nb\t \nc c").unwrap();
    assert_eq!(stream.len(), 7);
}

#[test]
fn terminal_sets_prefer_longer_literals() {
    let set = TokenSet::for_terminals(["1", "12", "2"]);
    let tokenizer = Tokenizer::new(set);
    let stream = tokenizer.tokenize("122").unwrap();
    let values: Vec<&str> = stream.tokens().iter().map(|t| t.value()).collect();
    assert_eq!(values, ["12", "2"]);
}

#[test]
fn ignored_types_consume_without_emitting() {
    let mut set = TokenSet::new();
    set.add(TokenType::pattern("comment", "#[^\n]*\n?").ignored());
    set.add(TokenType::pattern("word", "[a-z]+"));
    let tokenizer = Tokenizer::new(set);
    let stream = tokenizer.tokenize("abc # trailing\ndef").unwrap();
    let values: Vec<&str> = stream.tokens().iter().map(|t| t.value()).collect();
    assert_eq!(values, ["abc", "def"]);
}

#[test]
fn capture_groups_strip_quotes() {
    let mut set = TokenSet::new();
    set.add(TokenType::pattern("terminal", r#"'([^']*)'|"([^"]*)""#));
    let tokenizer = Tokenizer::new(set);
    let stream = tokenizer
        .tokenize(r#"'simple' "double quoted with 'single'""#)
        .unwrap();
    assert_eq!(stream.len(), 2);
    assert_eq!(stream.tokens()[0].value(), "simple");
    assert_eq!(stream.tokens()[0].full_text(), "'simple'");
    assert_eq!(stream.tokens()[1].value(), "double quoted with 'single'");
}

#[test]
fn unmatchable_text_is_an_error() {
    let tokenizer = Tokenizer::new(TokenSet::for_alphabet("ab"));
    let err = tokenizer.tokenize("abz").unwrap_err();
    assert_eq!(
        err,
        TokenizeError::NoMatch {
            rest: "z".to_string()
        }
    );
}

#[test]
fn first_matching_type_in_order_wins() {
    let mut set = TokenSet::new();
    set.add(TokenType::pattern("word", "[a-z]+"));
    set.add(TokenType::literal("a", "a"));
    let tokenizer = Tokenizer::new(set);
    let stream = tokenizer.tokenize("ab").unwrap();
    assert_eq!(stream.len(), 1);
    assert_eq!(stream.tokens()[0].token_type().name(), "word");
}

#[test]
fn empty_input_is_an_empty_stream() {
    let tokenizer = Tokenizer::new(TokenSet::for_alphabet("a"));
    let stream = tokenizer.tokenize("").unwrap();
    assert!(stream.is_empty());
    assert!(!stream.is_exhausted());
}
