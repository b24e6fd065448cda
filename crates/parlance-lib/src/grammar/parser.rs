//! Rule-set parsing: lexed grammar source → rules.
//!
//! The RHS parser is a recursive descent with an explicit working tree:
//! leaves and bracketed nodes are parsed first, separators fold what came
//! before into list nodes. Concatenation binds tighter than alternation, so
//! a `,`-run encountered under an alternation pops the alternation's last
//! child into a fresh concatenation.

use crate::annotations::AnnotationSet;
use crate::error::{Error, SyntaxError};
use crate::grammar::rhs::{RhsTree, RhsType};
use crate::grammar::rule::Rule;
use crate::lexer::{LexKind, LexToken};
use parlance_core::TokenType;

const MIN_RULE_TOKENS: usize = 3;

/// Cursor over one rule's tokens. Advancing past the end marks the cursor
/// exhausted and keeps it on the last token, so error messages can cite it.
struct RuleTokens<'a> {
    tokens: &'a [LexToken],
    index: usize,
    exhausted: bool,
}

impl<'a> RuleTokens<'a> {
    fn new(tokens: &'a [LexToken]) -> Self {
        RuleTokens {
            tokens,
            index: 0,
            exhausted: false,
        }
    }

    fn current(&self) -> &'a LexToken {
        &self.tokens[self.index.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> bool {
        if self.index + 1 >= self.tokens.len() {
            self.exhausted = true;
            false
        } else {
            self.index += 1;
            true
        }
    }

    fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    fn remaining(&self) -> &'a [LexToken] {
        &self.tokens[self.index..]
    }
}

/// Parse a full rule set (already lexed, must end with `;`).
pub(crate) fn parse_rules(
    tokens: &[LexToken],
    annotations: Option<&AnnotationSet>,
) -> Result<Vec<Rule>, Error> {
    match tokens.last() {
        None => return Err(SyntaxError::TooFewTokens.into()),
        Some(last) if last.kind != LexKind::End => {
            return Err(SyntaxError::MissingTerminator.into());
        }
        Some(_) => {}
    }

    let mut rules = Vec::new();
    for segment in split_on_kind(tokens, LexKind::End) {
        rules.push(parse_annotated_rule(segment, annotations)?);
    }
    Ok(rules)
}

fn split_on_kind(tokens: &[LexToken], kind: LexKind) -> Vec<&[LexToken]> {
    let mut segments = Vec::new();
    let mut start = 0;
    for (i, token) in tokens.iter().enumerate() {
        if token.kind == kind {
            if i > start {
                segments.push(&tokens[start..i]);
            }
            start = i + 1;
        }
    }
    if start < tokens.len() {
        segments.push(&tokens[start..]);
    }
    segments
}

fn parse_annotated_rule(
    tokens: &[LexToken],
    annotations: Option<&AnnotationSet>,
) -> Result<Rule, Error> {
    let parts = split_on_kind(tokens, LexKind::At);
    if parts.is_empty() {
        return Err(SyntaxError::TooFewTokens.into());
    }
    let mut rule = parse_rule(parts[0])?;
    if parts.len() > 2 {
        return Err(SyntaxError::DuplicateAnnotations {
            rule: rule.lhs().to_string(),
        }
        .into());
    }
    if parts.len() == 2 {
        if let Some(set) = annotations {
            rule.set_transformer(set.parse_chain(parts[1])?);
        }
    }
    Ok(rule)
}

/// Parse one rule (tokens between `;` separators, annotations split off).
pub(crate) fn parse_rule(tokens: &[LexToken]) -> Result<Rule, SyntaxError> {
    if tokens.len() < MIN_RULE_TOKENS {
        return Err(SyntaxError::TooFewTokens);
    }

    let mut toks = RuleTokens::new(tokens);

    let lhs = expect_kind(&toks, LexKind::Identifier, "an identifier on the lhs")?;
    toks.advance();
    expect_kind(&toks, LexKind::Define, "`=` after the rule name")?;
    toks.advance();

    // external rule: Name = Module : Target
    if let [module, colon, target] = toks.remaining() {
        if module.kind == LexKind::Identifier
            && colon.kind == LexKind::External
            && target.kind == LexKind::Identifier
        {
            return Ok(Rule::external(lhs, module.text.clone(), target.text.clone()));
        }
    }

    // regex rule: Name = ~ "pattern"
    if let [tilde, pattern] = toks.remaining() {
        if tilde.kind == LexKind::Tilde && pattern.kind == LexKind::Terminal {
            let token_type = TokenType::pattern(lhs.clone(), pattern.text.clone());
            return Ok(Rule::regex_rule(lhs, token_type));
        }
    }

    let rhs = parse_rhs(&mut toks)?;
    if !toks.is_exhausted() {
        return Err(SyntaxError::TrailingTokens { rule: lhs });
    }
    Ok(Rule::new(lhs, rhs))
}

fn expect_kind(toks: &RuleTokens<'_>, kind: LexKind, expected: &str) -> Result<String, SyntaxError> {
    let current = toks.current();
    if current.kind == kind {
        Ok(current.text.clone())
    } else {
        Err(SyntaxError::Expected {
            expected: expected.to_string(),
            found: current.text.clone(),
        })
    }
}

fn single_type_for(symbol: &str) -> Option<RhsType> {
    match symbol {
        "(" => Some(RhsType::Group),
        "{" => Some(RhsType::Repeat),
        "[" => Some(RhsType::Optional),
        _ => None,
    }
}

fn matching_close(symbol: &str) -> &'static str {
    match symbol {
        "(" => ")",
        "{" => "}",
        "[" => "]",
        _ => unreachable!("not an opening control symbol"),
    }
}

fn list_type_for(symbol: &str) -> Option<RhsType> {
    match symbol {
        "," => Some(RhsType::Concatenation),
        "|" => Some(RhsType::Alternation),
        _ => None,
    }
}

fn is_close(symbol: &str) -> bool {
    matches!(symbol, ")" | "}" | "]")
}

fn parse_rhs(toks: &mut RuleTokens<'_>) -> Result<RhsTree, SyntaxError> {
    let current = toks.current();
    match current.kind {
        LexKind::Identifier => {
            let tree = RhsTree::identifier(current.text.clone());
            if toks.advance() {
                parse_rhs_continue(toks, tree)
            } else {
                Ok(tree)
            }
        }
        LexKind::Terminal => {
            let tree = RhsTree::terminal(current.text.clone());
            if toks.advance() {
                parse_rhs_continue(toks, tree)
            } else {
                Ok(tree)
            }
        }
        LexKind::Control => {
            let open = current.text.clone();
            match single_type_for(&open) {
                Some(single_type) => {
                    if !toks.advance() {
                        return Err(SyntaxError::Expected {
                            expected: format!("a matching `{}`", matching_close(&open)),
                            found: open,
                        });
                    }
                    let inner = parse_rhs(toks)?;
                    expect_close(toks, &open)?;
                    let tree = RhsTree::single(single_type, inner);
                    if toks.advance() {
                        parse_rhs_continue(toks, tree)
                    } else {
                        Ok(tree)
                    }
                }
                None => Err(SyntaxError::Expected {
                    expected: "an identifier, terminal or opening bracket".to_string(),
                    found: open,
                }),
            }
        }
        _ => Err(SyntaxError::Expected {
            expected: "an identifier, terminal or opening bracket".to_string(),
            found: current.text.clone(),
        }),
    }
}

fn expect_close(toks: &RuleTokens<'_>, open: &str) -> Result<(), SyntaxError> {
    let expected = matching_close(open);
    let current = toks.current();
    if current.kind == LexKind::Control && current.text == expected {
        Ok(())
    } else {
        Err(SyntaxError::Expected {
            expected: format!("`{expected}`"),
            found: current.text.clone(),
        })
    }
}

fn parse_rhs_continue(toks: &mut RuleTokens<'_>, working: RhsTree) -> Result<RhsTree, SyntaxError> {
    let current = toks.current();
    if current.kind != LexKind::Control {
        return Err(SyntaxError::Expected {
            expected: "a separator or closing bracket".to_string(),
            found: current.text.clone(),
        });
    }
    let symbol = current.text.clone();

    if working.kind() != crate::grammar::rhs::RhsKind::List {
        if let Some(list_type) = list_type_for(&symbol) {
            let mut tree = RhsTree::list(list_type, vec![working]);
            if !toks.advance() {
                return Err(SyntaxError::Expected {
                    expected: "an rhs after the separator".to_string(),
                    found: symbol,
                });
            }
            tree.push_child(parse_rhs_non_list(toks)?);
            return if toks.is_exhausted() {
                Ok(tree)
            } else {
                parse_rhs_continue(toks, tree)
            };
        }
        if is_close(&symbol) {
            return Ok(working);
        }
        return Err(SyntaxError::Expected {
            expected: "a separator or closing bracket".to_string(),
            found: symbol,
        });
    }

    // working tree is a list node
    if let Some(list_type) = list_type_for(&symbol) {
        let mut working = working;
        if list_type == working.rhs_type() {
            if !toks.advance() {
                return Err(SyntaxError::Expected {
                    expected: "an rhs after the separator".to_string(),
                    found: symbol,
                });
            }
            working.push_child(parse_rhs_non_list(toks)?);
            return if toks.is_exhausted() {
                Ok(working)
            } else {
                parse_rhs_continue(toks, working)
            };
        }
        if list_type == RhsType::Alternation {
            // an alternation folds the whole working concatenation in
            let mut tree = RhsTree::list(RhsType::Alternation, vec![working]);
            if !toks.advance() {
                return Err(SyntaxError::Expected {
                    expected: "an rhs after the separator".to_string(),
                    found: symbol,
                });
            }
            tree.push_child(parse_rhs_non_list(toks)?);
            return if toks.is_exhausted() {
                Ok(tree)
            } else {
                parse_rhs_continue(toks, tree)
            };
        }
        // a concatenation under an alternation binds tighter: it claims
        // only the alternation's rightmost child
        let right = working.pop_child();
        let mut tree = RhsTree::list(RhsType::Concatenation, vec![right]);
        while !toks.is_exhausted() && toks.current().is_control(",") {
            if !toks.advance() {
                return Err(SyntaxError::Expected {
                    expected: "an rhs after the separator".to_string(),
                    found: ",".to_string(),
                });
            }
            tree.push_child(parse_rhs_non_list(toks)?);
        }
        working.push_child(tree);
        return if toks.is_exhausted() {
            Ok(working)
        } else {
            parse_rhs_continue(toks, working)
        };
    }
    if is_close(&symbol) {
        return Ok(working);
    }
    Err(SyntaxError::Expected {
        expected: "a separator or closing bracket".to_string(),
        found: symbol,
    })
}

fn parse_rhs_non_list(toks: &mut RuleTokens<'_>) -> Result<RhsTree, SyntaxError> {
    let current = toks.current();
    match current.kind {
        LexKind::Identifier => {
            let tree = RhsTree::identifier(current.text.clone());
            toks.advance();
            Ok(tree)
        }
        LexKind::Terminal => {
            let tree = RhsTree::terminal(current.text.clone());
            toks.advance();
            Ok(tree)
        }
        LexKind::Control => {
            let open = current.text.clone();
            match single_type_for(&open) {
                Some(single_type) => {
                    if !toks.advance() {
                        return Err(SyntaxError::Expected {
                            expected: format!("a matching `{}`", matching_close(&open)),
                            found: open,
                        });
                    }
                    let inner = parse_rhs(toks)?;
                    expect_close(toks, &open)?;
                    toks.advance();
                    Ok(RhsTree::single(single_type, inner))
                }
                None => Err(SyntaxError::Expected {
                    expected: "an identifier, terminal or opening bracket".to_string(),
                    found: open,
                }),
            }
        }
        _ => Err(SyntaxError::Expected {
            expected: "an identifier, terminal or opening bracket".to_string(),
            found: current.text.clone(),
        }),
    }
}
