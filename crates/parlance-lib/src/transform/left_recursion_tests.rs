use indexmap::IndexSet;
use parlance_core::{TokenSet, TokenType, Tokenizer};

use crate::error::{Error, TransformError};
use crate::grammar::Grammar;
use crate::grammar::rule::Rule;
use crate::transform::GrammarTransform;
use crate::transform::left_recursion::LeftRecursionTransform;

const TEST_ITERATIONS: usize = 50;

fn accepts(grammar: &Grammar, alphabet: &str, input: &str) -> bool {
    let mut stream = Tokenizer::new(TokenSet::for_alphabet(alphabet))
        .tokenize(input)
        .unwrap();
    grammar.matches(&mut stream)
}

/// Classification parity against an equivalent regex-rule grammar over the
/// rewritten grammar's own alphabet.
fn assert_same_language(grammar: &Grammar, regex: &str, alphabet: IndexSet<String>) {
    let rule = Rule::regex_rule("pattern", TokenType::pattern("pattern", regex));
    let regex_grammar = Grammar::from_rules(vec![rule], "pattern", false).unwrap();

    let expected = regex_grammar.classify_with_alphabet(TEST_ITERATIONS, alphabet.clone());
    let actual = grammar.classify_with_alphabet(TEST_ITERATIONS, alphabet);
    assert_eq!(expected, actual);
}

#[test]
fn non_recursive_grammar_is_unaffected() {
    let grammar = Grammar::parse("start = 'a' , other ; other = 'b' ;").unwrap();
    let transform = LeftRecursionTransform::new(&grammar).unwrap();
    assert!(!transform.is_grammar_affected());
}

#[test]
fn simple_direct_recursion_becomes_a_plus() {
    let grammar = Grammar::parse("start = start , 'a' | 'a' ;").unwrap();
    let transform = LeftRecursionTransform::new(&grammar).unwrap();
    assert!(transform.is_grammar_affected());

    let start = grammar.start_rule();
    assert!(transform.is_rule_affected(start));
    assert!(transform.has_direct_lr(start));
    assert!(!transform.has_indirect_lr(start));

    let rewritten = transform.transformed_grammar().unwrap();
    let check = LeftRecursionTransform::new(&rewritten).unwrap();
    assert!(!check.is_grammar_affected());

    assert!(!accepts(&rewritten, "a", ""));
    assert!(accepts(&rewritten, "a", "a"));
    assert!(accepts(&rewritten, "a", "aa"));
    assert!(accepts(&rewritten, "a", "aaa"));

    assert_same_language(&rewritten, "a+", rewritten.alphabet(true));
}

#[test]
fn complex_direct_recursion_preserves_the_language() {
    let grammar =
        Grammar::parse("start = start , 'c' | '1' , '2' | '3' | 'a' | 'b' ;").unwrap();
    let transform = LeftRecursionTransform::new(&grammar).unwrap();
    assert!(transform.is_grammar_affected());
    assert!(transform.has_direct_lr(grammar.start_rule()));

    let rewritten = transform.transformed_grammar().unwrap();
    assert!(
        !LeftRecursionTransform::new(&rewritten)
            .unwrap()
            .is_grammar_affected()
    );

    assert!(!accepts(&rewritten, "123abc", ""));
    assert!(!accepts(&rewritten, "123abc", "cc"));
    assert!(accepts(&rewritten, "123abc", "ac"));
    assert!(accepts(&rewritten, "123abc", "bc"));
    assert!(accepts(&rewritten, "123abc", "3c"));
    assert!(accepts(&rewritten, "123abc", "12c"));
    assert!(accepts(&rewritten, "123abc", "acc"));
    assert!(accepts(&rewritten, "123abc", "bccc"));

    assert_same_language(&rewritten, "((12)|3|a|b)c*", rewritten.alphabet(true));
}

#[test]
fn simple_indirect_recursion_is_detected_and_eliminated() {
    let grammar = Grammar::parse("start = other , 'a' | 'a' ; other = start , 'a' ;").unwrap();
    let transform = LeftRecursionTransform::new(&grammar).unwrap();
    assert!(transform.is_grammar_affected());

    let start = grammar.start_rule();
    assert!(transform.is_rule_affected(start));
    assert!(!transform.has_direct_lr(start));
    assert!(transform.has_indirect_lr(start));

    let rewritten = transform.transformed_grammar().unwrap();
    assert!(
        !LeftRecursionTransform::new(&rewritten)
            .unwrap()
            .is_grammar_affected()
    );

    assert!(!accepts(&rewritten, "a", ""));
    assert!(accepts(&rewritten, "a", "a"));
    assert!(!accepts(&rewritten, "a", "aa"));
    assert!(accepts(&rewritten, "a", "aaa"));
    assert!(!accepts(&rewritten, "a", "aaaa"));
    assert!(accepts(&rewritten, "a", "aaaaa"));

    assert_same_language(&rewritten, "a(aa)*", rewritten.alphabet(true));
}

#[test]
fn generated_rules_use_minus_names() {
    let grammar = Grammar::parse("start = start , 'a' | 'a' ;").unwrap();
    let rewritten = grammar.eliminate_left_recursion().unwrap();
    let names: Vec<&str> = rewritten.rules().iter().map(|r| r.lhs()).collect();
    assert!(names.contains(&"start"));
    assert!(
        names.iter().any(|n| n.starts_with("start_minus_")),
        "expected generated continuation rules, got {names:?}"
    );
}

#[test]
fn rewriting_a_sugared_grammar_is_rejected() {
    let grammar = Grammar::parse("start = start , 'x' | { 'y' } ;").unwrap();
    let result = grammar.eliminate_left_recursion();
    assert!(matches!(
        result,
        Err(Error::Transform(TransformError::SugarPresent))
    ));
}

#[test]
fn desugar_then_eliminate_composes() {
    let grammar = Grammar::parse("start = start , 'x' | { 'y' } ;").unwrap();
    let rewritten = grammar.desugar().unwrap().eliminate_left_recursion().unwrap();
    assert!(
        !LeftRecursionTransform::new(&rewritten)
            .unwrap()
            .is_grammar_affected()
    );

    // y* x*
    assert!(accepts(&rewritten, "xy", ""));
    assert!(accepts(&rewritten, "xy", "y"));
    assert!(accepts(&rewritten, "xy", "yyx"));
    assert!(accepts(&rewritten, "xy", "x"));
    assert!(accepts(&rewritten, "xy", "yxx"));
    assert!(!accepts(&rewritten, "xy", "xy"));
}
