use std::sync::Arc;

use parlance_core::{ParseValue, TokenSet, TokenStream, Tokenizer};

use crate::engine::ParseOutcome;
use crate::grammar::Grammar;

fn stream(alphabet: &str, input: &str) -> TokenStream {
    Tokenizer::new(TokenSet::for_alphabet(alphabet))
        .tokenize(input)
        .unwrap()
}

fn stream_over<const N: usize>(terminals: [&str; N], input: &str) -> TokenStream {
    Tokenizer::new(TokenSet::for_terminals(terminals))
        .tokenize(input)
        .unwrap()
}

fn parse(grammar: &Grammar, tokens: &mut TokenStream) -> ParseOutcome {
    grammar.try_parse(tokens)
}

fn result_text(outcome: &ParseOutcome) -> String {
    outcome.result.as_ref().map(|v| v.to_string()).unwrap_or_default()
}

#[test]
fn terminal_matches_exactly() {
    let grammar = Grammar::parse("start = 'a' ;").unwrap();

    let outcome = parse(&grammar, &mut stream("ab", "a"));
    assert!(outcome.valid);
    assert_eq!(result_text(&outcome), "a");

    let outcome = parse(&grammar, &mut stream("ab", "b"));
    assert!(!outcome.valid);
    assert!(outcome.error.unwrap().contains("expected `a`"));
}

#[test]
fn empty_terminal_matches_without_consuming() {
    let grammar = Grammar::parse("start = '' ;").unwrap();

    let outcome = parse(&grammar, &mut stream("a", ""));
    assert!(outcome.valid);
    assert_eq!(result_text(&outcome), "");

    // matches, but leaves the input unconsumed
    let outcome = parse(&grammar, &mut stream("a", "a"));
    assert!(!outcome.valid);
}

#[test]
fn regex_accepts_a_single_matching_token() {
    let grammar = Grammar::parse("start = ~ 'abc*' ;").unwrap();

    let outcome = parse(&grammar, &mut stream_over(["abcc", "abcd"], "abcc"));
    assert!(outcome.valid);
    assert_eq!(result_text(&outcome), "abcc");

    let outcome = parse(&grammar, &mut stream_over(["abcc", "abcd"], "abcd"));
    assert!(!outcome.valid);
}

#[test]
fn regex_merges_tokens_until_the_pattern_matches() {
    let grammar = Grammar::parse("start = ~ 'a+b' ;").unwrap();

    // tokenized per character, the pattern only matches the merged text
    let outcome = parse(&grammar, &mut stream("ab", "aaab"));
    assert!(outcome.valid);
    assert_eq!(result_text(&outcome), "aaab");

    let outcome = parse(&grammar, &mut stream("ab", "aaa"));
    assert!(!outcome.valid);
}

#[test]
fn regex_growth_backtracks_to_wider_candidates() {
    // "a" matches a+ but leaves input; the engine must grow to "aa"
    let grammar = Grammar::parse("start = ~ 'a+' ;").unwrap();

    let outcome = parse(&grammar, &mut stream("a", "aa"));
    assert!(outcome.valid);
    assert_eq!(result_text(&outcome), "aa");
}

#[test]
fn regex_at_end_of_input_needs_an_empty_match() {
    let nullable = Grammar::parse("start = ~ 'a*' ;").unwrap();
    let outcome = parse(&nullable, &mut stream("a", ""));
    assert!(outcome.valid);
    assert_eq!(result_text(&outcome), "");

    let non_nullable = Grammar::parse("start = ~ 'a+' ;").unwrap();
    let outcome = parse(&non_nullable, &mut stream("a", ""));
    assert!(!outcome.valid);
}

#[test]
fn identifier_delegates_to_its_rule() {
    let grammar = Grammar::parse("first = second ; second = 'third' ;").unwrap();

    let outcome = parse(&grammar, &mut stream_over(["third", "fourth"], "third"));
    assert!(outcome.valid);
    assert_eq!(result_text(&outcome), "third");

    let outcome = parse(&grammar, &mut stream_over(["third", "fourth"], "fourth"));
    assert!(!outcome.valid);
}

#[test]
fn group_is_transparent() {
    let grammar = Grammar::parse("start = ( 'a' ) ;").unwrap();

    let outcome = parse(&grammar, &mut stream("ab", "a"));
    assert!(outcome.valid);
    assert_eq!(result_text(&outcome), "a");

    assert!(!parse(&grammar, &mut stream("ab", "b")).valid);
}

#[test]
fn optional_prefers_the_empty_match() {
    let grammar = Grammar::parse("start = [ 'a' ] ;").unwrap();

    let outcome = parse(&grammar, &mut stream("ab", ""));
    assert!(outcome.valid);
    assert_eq!(outcome.result, Some(ParseValue::empty_str()));

    let outcome = parse(&grammar, &mut stream("ab", "a"));
    assert!(outcome.valid);
    assert_eq!(result_text(&outcome), "a");

    assert!(!parse(&grammar, &mut stream("ab", "b")).valid);
}

#[test]
fn alternation_tries_children_left_to_right() {
    let grammar = Grammar::parse("start = 'a' | 'b' ;").unwrap();

    assert_eq!(result_text(&parse(&grammar, &mut stream("abc", "a"))), "a");
    assert_eq!(result_text(&parse(&grammar, &mut stream("abc", "b"))), "b");
    assert!(!parse(&grammar, &mut stream("abc", "c")).valid);
}

#[test]
fn nested_alternation_with_optional_accepts_everything_it_should() {
    let grammar = Grammar::parse("start = 'a' | ( 'b' | [ 'c' | 'd' ] ) | 'e' ;").unwrap();

    for input in ["", "a", "b", "c", "d", "e"] {
        let outcome = parse(&grammar, &mut stream("abcdef", input));
        assert!(outcome.valid, "rejected `{input}`");
        assert_eq!(result_text(&outcome), input);
    }
    assert!(!parse(&grammar, &mut stream("abcdef", "f")).valid);
}

#[test]
fn repeat_accumulates_matches_into_a_list() {
    let grammar = Grammar::parse("start = { 'a' } ;").unwrap();

    let cases = [
        ("", "[]"),
        ("a", "[a]"),
        ("aa", "[a, a]"),
        ("aaa", "[a, a, a]"),
        ("aaaa", "[a, a, a, a]"),
    ];
    for (input, expected) in cases {
        let outcome = parse(&grammar, &mut stream("ab", input));
        assert!(outcome.valid, "rejected `{input}`");
        assert_eq!(result_text(&outcome), expected);
    }

    for input in ["aaba", "ab", "aab", "b"] {
        assert!(
            !parse(&grammar, &mut stream("ab", input)).valid,
            "accepted `{input}`"
        );
    }
}

#[test]
fn concatenation_yields_an_ordered_list() {
    let grammar = Grammar::parse("start = 'a' , 'b' , 'a' ;").unwrap();

    let outcome = parse(&grammar, &mut stream("abc", "aba"));
    assert!(outcome.valid);
    assert_eq!(result_text(&outcome), "[a, b, a]");

    for input in ["aab", "ab", "ba", "abac"] {
        assert!(
            !parse(&grammar, &mut stream("abc", input)).valid,
            "accepted `{input}`"
        );
    }
}

#[test]
fn concatenation_backtracks_through_ambiguous_prefixes() {
    // the first child can eat any number of a's; only some splits let the
    // rest of the concatenation finish
    let grammar = Grammar::parse("start = { 'a' } , 'a' , 'b' ;").unwrap();

    let outcome = parse(&grammar, &mut stream("ab", "aaab"));
    assert!(outcome.valid);
    assert_eq!(result_text(&outcome), "[[a, a], a, b]");

    assert!(!parse(&grammar, &mut stream("ab", "b")).valid);
}

#[test]
fn transformer_errors_become_match_failures() {
    let mut grammar = Grammar::parse("start = 'a' ;").unwrap();
    grammar
        .set_transformer(
            "start",
            Arc::new(|_| ParseValue::Int(1).div(&ParseValue::Int(0))),
        )
        .unwrap();

    let outcome = grammar.try_parse(&mut stream("a", "a"));
    assert!(!outcome.valid);
    assert_eq!(outcome.error.as_deref(), Some("divide by zero"));
}

#[test]
fn transformer_failure_lets_other_alternatives_win() {
    // the first alternative matches but its rule's transformer fails;
    // backtracking must still find the second alternative
    let source = "start = bad | good ; bad = 'a' ; good = 'a' ;";
    let mut grammar = Grammar::parse(source).unwrap();
    grammar
        .set_transformer("bad", Arc::new(|_| ParseValue::Int(1).div(&ParseValue::Int(0))))
        .unwrap();
    grammar
        .set_transformer("good", Arc::new(|_| Ok(ParseValue::Str("ok".to_string()))))
        .unwrap();

    let outcome = grammar.try_parse(&mut stream("a", "a"));
    assert!(outcome.valid);
    assert_eq!(result_text(&outcome), "ok");
}

#[test]
fn failure_reports_carry_the_last_error() {
    let grammar = Grammar::parse("start = 'a' | 'b' ;").unwrap();
    let outcome = grammar.try_parse(&mut stream("abc", "c"));
    assert!(!outcome.valid);
    let error = outcome.error.unwrap();
    assert!(error.contains("expected `b`"), "got: {error}");
}
