use parlance_core::{ParseValue, TokenSet, TokenStream, Tokenizer};

use crate::annotations::AnnotationSet;
use crate::error::{Error, SyntaxError};
use crate::grammar::Grammar;

fn stream(alphabet: &str, input: &str) -> TokenStream {
    Tokenizer::new(TokenSet::for_alphabet(alphabet))
        .tokenize(input)
        .unwrap()
}

fn annotated(source: &str) -> crate::error::Result<Grammar> {
    let set = AnnotationSet::default_set();
    Grammar::builder(source).annotations(&set).build()
}

#[test]
fn concat_joins_list_elements() {
    let grammar = annotated("start = 'a' , 'b' @concat ;").unwrap();
    let outcome = grammar.try_parse(&mut stream("ab", "ab"));
    assert!(outcome.valid);
    assert_eq!(outcome.result, Some(ParseValue::Str("ab".to_string())));
}

#[test]
fn chains_compose_right_to_left() {
    // the payload flows through flatten, then concat, then toInt
    let grammar = annotated("start = '1' , { '2' } @toInt.concat.flatten ;").unwrap();
    let outcome = grammar.try_parse(&mut stream("12", "122"));
    assert!(outcome.valid);
    assert_eq!(outcome.result, Some(ParseValue::Int(122)));
}

#[test]
fn index_picks_one_element() {
    let grammar = annotated("start = 'a' , 'b' , 'c' @index 1 ;").unwrap();
    let outcome = grammar.try_parse(&mut stream("abc", "abc"));
    assert!(outcome.valid);
    assert_eq!(outcome.result, Some(ParseValue::Str("b".to_string())));
}

#[test]
fn unknown_annotation_is_a_build_error() {
    let result = annotated("start = 'a' @nonsense ;");
    assert!(matches!(
        result,
        Err(Error::Syntax(SyntaxError::UnknownAnnotation { .. }))
    ));
}

#[test]
fn annotation_arity_is_checked() {
    assert!(matches!(
        annotated("start = 'a' @index ;"),
        Err(Error::Syntax(SyntaxError::AnnotationArity { .. }))
    ));
    assert!(matches!(
        annotated("start = 'a' @toInt 3 ;"),
        Err(Error::Syntax(SyntaxError::AnnotationArity { .. }))
    ));
}

#[test]
fn dangling_composition_is_rejected() {
    assert!(matches!(
        annotated("start = 'a' @toInt. ;"),
        Err(Error::Syntax(SyntaxError::DanglingComposition))
    ));
}

#[test]
fn annotations_without_a_library_are_ignored() {
    // no annotation set supplied: the chain is dropped, the rule still parses
    let grammar = Grammar::parse("start = 'a' , 'b' @concat ;").unwrap();
    let outcome = grammar.try_parse(&mut stream("ab", "ab"));
    assert!(outcome.valid);
    assert_eq!(outcome.result.unwrap().to_string(), "[a, b]");
}

#[test]
fn runtime_annotation_errors_fail_the_match() {
    let grammar = annotated("start = 'a' @toInt ;").unwrap();
    let outcome = grammar.try_parse(&mut stream("a", "a"));
    assert!(!outcome.valid);
    assert!(outcome.error.unwrap().contains("not an integer"));
}

#[test]
fn index_out_of_bounds_fails_the_match() {
    let grammar = annotated("start = 'a' , 'b' @index 5 ;").unwrap();
    let outcome = grammar.try_parse(&mut stream("ab", "ab"));
    assert!(!outcome.valid);
    assert!(outcome.error.unwrap().contains("out of bounds"));
}
