use std::sync::OnceLock;

use super::error::QueryError;
use super::kinds::{Group, Literal, TOKEN_PATTERN, tag};
use crate::brackets::BracketScanner;
use crate::rules::{Connector, EngineError, Predicate, Retain, RuleGraph, RuleId};
use crate::tree::{Node, Span};

static SHARED: OnceLock<QueryGrammar> = OnceLock::new();

/// The query language as a rule graph.
///
/// Stages run outermost first: literals are split out, then parenthesised
/// groups (each reparsed by the whole grammar), then the remaining text is
/// tokenized in one pass and untagged residue is dropped.
#[derive(Debug)]
pub struct QueryGrammar {
    graph: RuleGraph,
    root: RuleId,
}

impl QueryGrammar {
    pub fn new() -> Result<Self, QueryError> {
        Self::with_max_depth(RuleGraph::DEFAULT_MAX_DEPTH)
    }

    /// Builds the grammar with a custom recursion limit. Each level of
    /// parenthesis nesting costs three levels of rule traversal.
    pub fn with_max_depth(max_depth: usize) -> Result<Self, QueryError> {
        let mut g = RuleGraph::with_max_depth(max_depth);
        let root = g.reflect(tag::QUERY);
        // Stands in for the whole grammar until every stage exists.
        let grammar = g.reflect("grammar");

        let literal_scanner = BracketScanner::new(Literal::BRACKET).shielded_by(Group::BRACKET);
        let find_literals = g.wrap("find-literals", move |n: &Node| {
            Ok(literal_scanner.find(n, Some(tag::LITERAL))?)
        });
        let literals = g.split("literals", find_literals, Retain::All, None)?;

        let group_scanner = BracketScanner::new(Group::BRACKET).shielded_by(Literal::BRACKET);
        let find_groups = g.wrap("find-groups", move |n: &Node| {
            let base = n.start();
            group_scanner
                .regions(n.text())
                .into_iter()
                .map(|r| {
                    let inner = Group::BRACKET.inner(r);
                    let span = Span {
                        start: base + inner.start,
                        stop: base + inner.stop,
                    };
                    n.slice(span, Some(tag::SUBQUERY)).map_err(EngineError::from)
                })
                .collect()
        });
        let groups = g.split("subqueries", find_groups, Retain::All, None)?;

        let find_tokens = g.extract("find-tokens", TOKEN_PATTERN)?;
        let tokens = g.split("tokens", find_tokens, Retain::All, None)?;
        let residue = g.filter("drop-untagged", Predicate::tagged());

        g.connect(root, Connector::recurse(grammar))?;
        g.connect(grammar, Connector::delegate(literals))?;
        g.connect(literals, Connector::delegate_if(groups, Predicate::untagged()))?;
        g.connect(
            groups,
            Connector::recurse_if(grammar, Predicate::desc(tag::SUBQUERY)),
        )?;
        g.connect(groups, Connector::delegate_if(tokens, Predicate::untagged()))?;
        g.connect(tokens, Connector::delegate_if(residue, Predicate::untagged()))?;

        Ok(Self { graph: g, root })
    }

    /// A process-wide grammar with the default recursion limit.
    pub fn shared() -> Result<&'static Self, QueryError> {
        if let Some(grammar) = SHARED.get() {
            return Ok(grammar);
        }
        let grammar = Self::new()?;
        Ok(SHARED.get_or_init(|| grammar))
    }

    pub fn graph(&self) -> &RuleGraph {
        &self.graph
    }

    /// Parses `source` into a token tree rooted at a `query` node.
    ///
    /// Tokens are the root's children in document order. A `subquery` token
    /// holds the token tree of its parenthesised text.
    pub fn parse(&self, source: &str) -> Result<Node, QueryError> {
        if source.is_empty() {
            return Err(QueryError::Empty);
        }

        let mut input = Node::new(source, Some(tag::QUERY));
        let mut out = self.graph.apply(self.root, &mut input)?;
        log::debug!("parsed {source:?} into {} tree(s)", out.len());

        let count = out.len();
        match out.pop() {
            Some(tree) if count == 1 => Ok(tree),
            _ => Err(QueryError::Parse { count }),
        }
    }
}

/// Parses `source` with the [shared](QueryGrammar::shared) grammar.
pub fn parse(source: &str) -> Result<Node, QueryError> {
    QueryGrammar::shared()?.parse(source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::render_tree;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn tokens(tree: &Node) -> Vec<(&str, &str)> {
        tree.children()
            .iter()
            .map(|c| (c.desc().unwrap_or("_"), c.text()))
            .collect()
    }

    #[test]
    fn conjunction_of_two_entities() {
        let tree = parse("a&b").unwrap();
        assert_eq!(tree.desc(), Some("query"));
        assert_eq!(
            tokens(&tree),
            vec![("entity", "a"), ("and", "&"), ("entity", "b")]
        );
    }

    #[test]
    fn negated_quantified_entity() {
        let tree = parse("!a{2,3}").unwrap();
        assert_eq!(
            tokens(&tree),
            vec![("not", "!"), ("entity", "a"), ("quantifier", "{2,3}")]
        );
    }

    #[test]
    fn quantified_subquery_is_reparsed() {
        let tree = parse("(a|b)+").unwrap();
        assert_eq!(tokens(&tree), vec![("subquery", "a|b"), ("quantifier", "+")]);
        assert_eq!(
            tokens(&tree.children()[0]),
            vec![("entity", "a"), ("or", "|"), ("entity", "b")]
        );
    }

    #[test]
    fn empty_source_is_rejected() {
        assert!(matches!(parse(""), Err(QueryError::Empty)));
    }

    #[test]
    fn leading_combinator_still_tokenizes() {
        // The token stage is permissive; phrase assembly rejects this.
        let tree = parse("&a").unwrap();
        assert_eq!(tokens(&tree), vec![("and", "&"), ("entity", "a")]);
    }

    #[test]
    fn literals_are_opaque() {
        let tree = parse("⟦a (b) & c⟧|d").unwrap();
        assert_eq!(
            tokens(&tree),
            vec![("literal", "⟦a (b) & c⟧"), ("or", "|"), ("entity", "d")]
        );
        assert!(tree.children()[0].children().is_empty());
    }

    #[test]
    fn literals_inside_subqueries() {
        let tree = parse("(⟦)⟧|b)").unwrap();
        assert_eq!(tokens(&tree), vec![("subquery", "⟦)⟧|b")]);
        assert_eq!(
            tokens(&tree.children()[0]),
            vec![("literal", "⟦)⟧"), ("or", "|"), ("entity", "b")]
        );
    }

    #[test]
    fn whitespace_and_stray_delimiters_are_dropped() {
        let tree = parse(" a  &  (b ").unwrap();
        assert_eq!(
            tokens(&tree),
            vec![("entity", "a"), ("and", "&"), ("entity", "b")]
        );
    }

    #[test]
    fn nested_subqueries_render_as_a_tree() {
        let tree = parse("((x))").unwrap();
        assert_eq!(
            render_tree(&tree),
            concat!(
                "query@0..5 \"((x))\"\n",
                "  subquery@1..4 \"(x)\"\n",
                "    subquery@2..3 \"x\"\n",
                "      entity@2..3 \"x\"\n",
            )
        );
    }

    #[rstest]
    #[case("a?", "?")]
    #[case("a*", "*")]
    #[case("a+", "+")]
    #[case("a{3}", "{3}")]
    #[case("a{3,}", "{3,}")]
    #[case("a{,4}", "{,4}")]
    #[case("a{}", "{}")]
    fn quantifier_forms(#[case] source: &str, #[case] quantifier: &str) {
        let tree = parse(source).unwrap();
        assert_eq!(tokens(&tree)[1], ("quantifier", quantifier));
    }

    #[test]
    fn deep_nesting_hits_the_recursion_limit() {
        let grammar = QueryGrammar::with_max_depth(16).unwrap();
        let source = format!("{}x{}", "(".repeat(20), ")".repeat(20));
        assert!(matches!(
            grammar.parse(&source),
            Err(QueryError::Engine(EngineError::RecursionLimit(16)))
        ));
    }

    #[test]
    fn huge_unbalanced_input_is_dropped_as_residue() {
        let tree = parse(&"(".repeat(50_000)).unwrap();
        assert!(tree.children().is_empty());

        let tree = parse(&format!("{}a{}", "(".repeat(50_000), "⟦".repeat(50_000))).unwrap();
        assert_eq!(tokens(&tree), vec![("entity", "a")]);
    }

    #[test]
    fn huge_balanced_nesting_fails_cleanly() {
        let depth = 20_000;
        let source = format!("{}x{}", "(".repeat(depth), ")".repeat(depth));
        assert!(matches!(
            parse(&source),
            Err(QueryError::Engine(EngineError::RecursionLimit(
                RuleGraph::DEFAULT_MAX_DEPTH
            )))
        ));
    }

    #[test]
    fn deeply_nested_literal_is_one_token() {
        let depth = 20_000;
        let source = format!("{}x{}|b", "⟦".repeat(depth), "⟧".repeat(depth));
        let tree = parse(&source).unwrap();
        let descs: Vec<_> = tokens(&tree).into_iter().map(|(d, _)| d).collect();
        assert_eq!(descs, vec!["literal", "or", "entity"]);
        assert_eq!(tree.children()[0].len(), source.len() - 2);
    }

    #[test]
    fn parsing_is_repeatable() {
        let a = parse("!(a|⟦b⟧)*&c").unwrap();
        let b = parse("!(a|⟦b⟧)*&c").unwrap();
        assert_eq!(render_tree(&a), render_tree(&b));
    }
}
