use std::sync::Arc;

use crate::token::{Token, TokenType};

#[test]
fn literal_type_recognizes_only_its_text() {
    let tt = TokenType::literal("plus", "+");
    assert!(tt.is_type_of("+"));
    assert!(!tt.is_type_of("++"));
    assert!(!tt.is_type_of(""));
}

#[test]
fn pattern_type_is_a_full_match() {
    let tt = TokenType::pattern("ident", "[a-z]+");
    assert!(tt.is_type_of("abc"));
    assert!(!tt.is_type_of("abc1"));
    assert!(!tt.is_type_of(""));
}

#[test]
fn bad_pattern_falls_back_to_literal() {
    let tt = TokenType::pattern("broken", "[unclosed");
    assert!(tt.is_type_of("[unclosed"));
    assert!(!tt.is_type_of("x"));
}

#[test]
fn sameness_requires_name_and_pattern() {
    let a = TokenType::pattern("num", "[0-9]+");
    let b = TokenType::pattern("num", "[0-9]+");
    let c = TokenType::pattern("num", "[0-9]*");
    let d = TokenType::pattern("digits", "[0-9]+");
    assert!(a.same_as(&b));
    assert!(!a.same_as(&c));
    assert!(!a.same_as(&d));
}

#[test]
fn literal_and_pattern_with_same_text_are_different() {
    let exact = TokenType::literal("x", "a");
    let pattern = TokenType::pattern("x", "a");
    assert!(!exact.same_as(&pattern));
}

#[test]
fn token_equality_is_structural() {
    let ty = Arc::new(TokenType::literal("a", "a"));
    let t1 = Token::new("a", Arc::clone(&ty));
    let t2 = Token::new("a", Arc::clone(&ty));
    let t3 = Token::new("b", Arc::new(TokenType::literal("b", "b")));
    assert!(t1.same_as(&t2));
    assert!(!t1.same_as(&t3));
}

#[test]
fn quoted_terminal_keeps_full_text() {
    let ty = Arc::new(TokenType::pattern("terminal", r#"'([^']*)'|"([^"]*)""#));
    let token = Token::with_full_text("simple", Arc::clone(&ty), "'simple'");
    assert_eq!(token.value(), "simple");
    assert_eq!(token.full_text(), "'simple'");
}
