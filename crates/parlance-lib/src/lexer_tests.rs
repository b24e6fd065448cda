use crate::error::SyntaxError;
use crate::lexer::{LexKind, lex};

fn kinds(source: &str) -> Vec<LexKind> {
    lex(source).unwrap().into_iter().map(|t| t.kind).collect()
}

#[test]
fn control_tokens() {
    let tokens = lex("[[(|,}){]").unwrap();
    assert_eq!(tokens.len(), 9);
    assert!(tokens.iter().all(|t| t.kind == LexKind::Control));
}

#[test]
fn identifiers_and_separators() {
    let tokens = lex("identifier,Id_2_special anotherOne").unwrap();
    let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
    assert_eq!(texts, ["identifier", ",", "Id_2_special", "anotherOne"]);
    assert_eq!(
        kinds("identifier,Id_2_special anotherOne"),
        [
            LexKind::Identifier,
            LexKind::Control,
            LexKind::Identifier,
            LexKind::Identifier
        ]
    );
}

#[test]
fn terminals_are_unquoted() {
    let tokens = lex(r#"'simple' 'single "quoted" string' "double with 'single'""#).unwrap();
    assert_eq!(tokens.len(), 3);
    assert!(tokens.iter().all(|t| t.kind == LexKind::Terminal));
    assert_eq!(tokens[0].text, "simple");
    assert_eq!(tokens[1].text, r#"single "quoted" string"#);
    assert_eq!(tokens[2].text, "double with 'single'");
}

#[test]
fn comments_are_skipped() {
    let tokens = lex("stuff = 'a' | { 'b' # comment\n } ;#another comment").unwrap();
    assert_eq!(tokens.len(), 8);
}

#[test]
fn punctuation_kinds() {
    assert_eq!(
        kinds(";=:~@."),
        [
            LexKind::End,
            LexKind::Define,
            LexKind::External,
            LexKind::Tilde,
            LexKind::At,
            LexKind::Dot
        ]
    );
}

#[test]
fn integers_lex_for_annotation_arguments() {
    assert_eq!(
        kinds("x = 'a' @index 1 ;"),
        [
            LexKind::Identifier,
            LexKind::Define,
            LexKind::Terminal,
            LexKind::At,
            LexKind::Identifier,
            LexKind::Integer,
            LexKind::End
        ]
    );
}

#[test]
fn unrecognized_text_is_an_error() {
    assert!(matches!(
        lex("start = $ ;"),
        Err(SyntaxError::UnrecognizedText { .. })
    ));
}
