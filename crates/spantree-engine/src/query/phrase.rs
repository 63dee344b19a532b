use super::ast::Quantifier;
use super::error::QueryError;
use super::kinds::{Group, tag};
use crate::tree::{Node, Span};

/// Groups a token tree into phrases.
///
/// Each run of `not` tokens, the operand after it and an optional quantifier
/// become one `phrase` node whose children are those tokens. A phrase covers
/// the parentheses around a subquery operand, which the `subquery` token
/// itself excludes. The result has
/// the same span and descriptor as `tokens`, with `phrase` children separated
/// by `and`/`or` tokens. Subquery operands are assembled recursively.
pub fn assemble(tokens: &Node) -> Result<Node, QueryError> {
    let mut out = vec![];
    let mut phrase = PhraseBuilder::default();

    for token in tokens.children() {
        match token.desc() {
            Some(tag::NOT) => {
                if phrase.has_operand {
                    return Err(QueryError::grammar(
                        "expected a combinator before negation",
                        token.span(),
                    ));
                }
                phrase.parts.push(token.clone());
            }
            Some(tag::ENTITY | tag::LITERAL | tag::SUBQUERY) => {
                if phrase.has_operand {
                    return Err(QueryError::grammar(
                        "expected a combinator between operands",
                        token.span(),
                    ));
                }
                let operand = if token.desc() == Some(tag::SUBQUERY) {
                    if token.children().is_empty() {
                        return Err(QueryError::grammar("empty subquery", token.span()));
                    }
                    assemble(token)?
                } else {
                    token.clone()
                };
                phrase.parts.push(operand);
                phrase.has_operand = true;
            }
            Some(tag::QUANTIFIER) => {
                if !phrase.has_operand || phrase.has_quantifier {
                    return Err(QueryError::grammar(
                        "quantifier does not follow an operand",
                        token.span(),
                    ));
                }
                Quantifier::parse(token.text(), token.span())?;
                phrase.parts.push(token.clone());
                phrase.has_quantifier = true;
            }
            Some(tag::AND | tag::OR) => {
                if !phrase.has_operand {
                    let message = if phrase.parts.is_empty() {
                        "combinator has no left-hand phrase"
                    } else {
                        "negation has no operand"
                    };
                    return Err(QueryError::grammar(message, token.span()));
                }
                out.push(phrase.finish(tokens)?);
                out.push(token.clone());
            }
            _ => {
                return Err(QueryError::grammar("unexpected token", token.span()));
            }
        }
    }

    if !phrase.parts.is_empty() {
        if !phrase.has_operand {
            return Err(QueryError::grammar("negation has no operand", tokens.span()));
        }
        out.push(phrase.finish(tokens)?);
    } else if let Some(last) = out.last() {
        return Err(QueryError::grammar(
            "combinator has no right-hand phrase",
            last.span(),
        ));
    } else {
        return Err(QueryError::grammar("empty query", tokens.span()));
    }

    let mut assembled = tokens.shallow();
    assembled.add_children(out)?;
    Ok(assembled)
}

#[derive(Default)]
struct PhraseBuilder {
    parts: Vec<Node>,
    has_operand: bool,
    has_quantifier: bool,
}

impl PhraseBuilder {
    /// Turns the collected tokens into a `phrase` node inside `within`.
    fn finish(&mut self, within: &Node) -> Result<Node, QueryError> {
        let parts = std::mem::take(&mut self.parts);
        self.has_operand = false;
        self.has_quantifier = false;

        let joined = Node::join(parts, Some(tag::PHRASE))?;
        let span = with_group_delimiters(&joined);
        if span == joined.span() {
            return Ok(joined);
        }
        let mut phrase = within.shallow().slice(span, Some(tag::PHRASE))?;
        phrase.add_children(joined.into_children())?;
        Ok(phrase)
    }
}

/// Widens `phrase` over the `(` or `)` of a subquery at either end.
fn with_group_delimiters(phrase: &Node) -> Span {
    let is_group = |n: Option<&Node>| n.is_some_and(|n| n.desc() == Some(tag::SUBQUERY));
    let mut span = phrase.span();
    if is_group(phrase.children().first()) {
        span.start -= Group::OPEN.len_utf8();
    }
    if is_group(phrase.children().last()) {
        span.stop += Group::CLOSE.len_utf8();
    }
    span
}
