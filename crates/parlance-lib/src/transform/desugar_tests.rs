use indoc::indoc;
use parlance_core::{TokenSet, Tokenizer};

use crate::grammar::Grammar;
use crate::grammar::rhs::RhsKind;
use crate::transform::GrammarTransform;
use crate::transform::desugar::DesugarTransform;

const TEST_ITERATIONS: usize = 200;

fn accepts(grammar: &Grammar, alphabet: &str, input: &str) -> bool {
    let mut stream = Tokenizer::new(TokenSet::for_alphabet(alphabet))
        .tokenize(input)
        .unwrap();
    grammar.matches(&mut stream)
}

fn assert_no_sugar_nodes(grammar: &Grammar) {
    fn check(tree: &crate::grammar::rhs::RhsTree) {
        assert_ne!(tree.kind(), RhsKind::Single, "sugar node survived: {tree}");
        for child in tree.children() {
            check(child);
        }
    }
    for rule in grammar.rules() {
        check(rule.rhs());
    }
}

fn assert_same_classification(before: &Grammar, after: &Grammar) {
    assert_eq!(
        before.classify_first_n_strings(TEST_ITERATIONS),
        after.classify_first_n_strings(TEST_ITERATIONS)
    );
}

#[test]
fn sugar_free_grammar_is_unaffected() {
    let grammar = Grammar::parse("start = 'a' , start | '' ;").unwrap();
    let transform = DesugarTransform::new(&grammar);
    assert!(!transform.is_grammar_affected());
}

#[test]
fn repeat_desugars_to_a_right_recursive_rule() {
    let grammar = Grammar::parse("start = 'b' , { 'a' } , 'c' ;").unwrap();
    let transform = DesugarTransform::new(&grammar);
    assert!(transform.is_grammar_affected());
    assert!(transform.is_rule_affected(grammar.start_rule()));

    let rewritten = transform.transformed_grammar().unwrap();
    assert!(!DesugarTransform::new(&rewritten).is_grammar_affected());
    assert_no_sugar_nodes(&rewritten);

    let names: Vec<&str> = rewritten.rules().iter().map(|r| r.lhs()).collect();
    assert!(names.contains(&"start_rep_1"), "got {names:?}");

    assert!(accepts(&rewritten, "abc", "bc"));
    assert!(accepts(&rewritten, "abc", "baaac"));
    assert!(!accepts(&rewritten, "abc", "ba"));

    assert_same_classification(&grammar, &rewritten);
}

#[test]
fn mixed_sugar_desugars_and_preserves_the_language() {
    let source = indoc! {"
        start = [ 'x' ] , { ( 'y' | 'z' ) } , other ;
        other = ( 'p' , [ 'q' ] ) | 'r' ;
    "};
    let grammar = Grammar::parse(source).unwrap();
    let transform = DesugarTransform::new(&grammar);
    assert!(transform.is_grammar_affected());
    assert!(transform.is_rule_affected(grammar.start_rule()));
    assert!(transform.is_rule_affected(grammar.rule_by_name("other").unwrap()));

    let rewritten = transform.transformed_grammar().unwrap();
    assert!(!DesugarTransform::new(&rewritten).is_grammar_affected());
    assert_no_sugar_nodes(&rewritten);

    for input in ["r", "xr", "yzr", "xyzzyp", "pq", "xpq"] {
        assert!(accepts(&rewritten, "xyzpqr", input), "rejected `{input}`");
    }
    for input in ["", "x", "q", "xq", "rp"] {
        assert!(!accepts(&rewritten, "xyzpqr", input), "accepted `{input}`");
    }

    assert_same_classification(&grammar, &rewritten);
}

#[test]
fn optional_desugars_to_child_or_epsilon() {
    let grammar = Grammar::parse("start = [ 'a' ] ;").unwrap();
    let rewritten = grammar.desugar().unwrap();
    assert_no_sugar_nodes(&rewritten);

    assert!(accepts(&rewritten, "ab", ""));
    assert!(accepts(&rewritten, "ab", "a"));
    assert!(!accepts(&rewritten, "ab", "aa"));
    assert!(!accepts(&rewritten, "ab", "b"));
}

#[test]
fn sugar_through_rule_references_is_found() {
    let grammar = Grammar::parse("a = 'x' , b ; b = [ a ] ;").unwrap();
    let transform = DesugarTransform::new(&grammar);
    // `a` holds no sugar itself but reaches `b`'s optional
    assert!(transform.is_rule_affected(grammar.rule_by_name("a").unwrap()));
    assert!(transform.is_rule_affected(grammar.rule_by_name("b").unwrap()));

    let rewritten = transform.transformed_grammar().unwrap();
    assert_no_sugar_nodes(&rewritten);

    assert!(accepts(&rewritten, "x", "x"));
    assert!(accepts(&rewritten, "x", "xx"));
    assert!(accepts(&rewritten, "x", "xxx"));
    assert!(!accepts(&rewritten, "x", ""));

    // a one-letter alphabet makes long inputs fast to compare
    assert_eq!(
        grammar.classify_first_n_strings(20),
        rewritten.classify_first_n_strings(20)
    );
}

#[test]
fn cyclic_rule_references_terminate() {
    let grammar = Grammar::parse("a = 'x' , b | '' ; b = 'y' , a ;").unwrap();
    let transform = DesugarTransform::new(&grammar);
    assert!(!transform.is_grammar_affected());
}

#[test]
fn generated_names_are_disambiguated_against_existing_rules() {
    let grammar = Grammar::parse("start = { 'a' } ; start_rep_1 = 'b' ;").unwrap();
    let rewritten = grammar.desugar().unwrap();
    let names: Vec<&str> = rewritten.rules().iter().map(|r| r.lhs()).collect();
    assert!(names.contains(&"start_rep_1"));
    assert!(names.contains(&"start_rep_2"), "got {names:?}");
}
