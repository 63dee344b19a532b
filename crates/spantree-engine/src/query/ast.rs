use std::fmt;

use super::error::QueryError;
use super::grammar::QueryGrammar;
use super::kinds::{Literal, Negation, tag};
use super::phrase::assemble;
use crate::tree::{Node, Span};

/// How many times an operand must occur. `max: None` is unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Quantifier {
    pub min: usize,
    pub max: Option<usize>,
}

impl Quantifier {
    /// The implicit quantifier of an operand written without one.
    pub const ONCE: Self = Self {
        min: 1,
        max: Some(1),
    };

    /// Reads a quantifier token: `?`, `*`, `+`, `{n}`, `{n,}`, `{,m}` or `{n,m}`.
    pub fn parse(text: &str, span: Span) -> Result<Self, QueryError> {
        let (min, max) = match text {
            "?" => (0, Some(1)),
            "*" => (0, None),
            "+" => (1, None),
            _ => {
                let body = text
                    .strip_prefix('{')
                    .and_then(|t| t.strip_suffix('}'))
                    .ok_or_else(|| QueryError::grammar(format!("invalid quantifier {text:?}"), span))?;
                match body.split_once(',') {
                    _ if body.is_empty() => {
                        return Err(QueryError::grammar("quantifier has no bounds", span));
                    }
                    None => {
                        let n = bound(body, span)?.unwrap_or(0);
                        (n, Some(n))
                    }
                    Some((min, max)) => (bound(min, span)?.unwrap_or(0), bound(max, span)?),
                }
            }
        };

        if let Some(max) = max
            && max < min
        {
            return Err(QueryError::grammar(
                format!("quantifier minimum {min} exceeds maximum {max}"),
                span,
            ));
        }
        Ok(Self { min, max })
    }

    /// True if `count` occurrences satisfy this quantifier.
    pub fn admits(&self, count: usize) -> bool {
        count >= self.min && self.max.is_none_or(|max| count <= max)
    }
}

fn bound(digits: &str, span: Span) -> Result<Option<usize>, QueryError> {
    if digits.is_empty() {
        return Ok(None);
    }
    digits
        .parse()
        .map(Some)
        .map_err(|_| QueryError::grammar(format!("invalid quantifier bound {digits:?}"), span))
}

impl Default for Quantifier {
    fn default() -> Self {
        Self::ONCE
    }
}

impl fmt::Display for Quantifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.min, self.max) {
            (0, Some(1)) => f.write_str("?"),
            (0, None) => f.write_str("*"),
            (1, None) => f.write_str("+"),
            (n, None) => write!(f, "{{{n},}}"),
            (n, Some(m)) if n == m => write!(f, "{{{n}}}"),
            (n, Some(m)) => write!(f, "{{{n},{m}}}"),
        }
    }
}

/// Joins two phrases. Both bind equally and apply left to right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Combinator {
    And,
    Or,
}

impl Combinator {
    pub fn symbol(self) -> char {
        match self {
            Self::And => '&',
            Self::Or => '|',
        }
    }

    fn from_tag(desc: Option<&str>) -> Option<Self> {
        match desc? {
            tag::AND => Some(Self::And),
            tag::OR => Some(Self::Or),
            _ => None,
        }
    }
}

impl fmt::Display for Combinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    Entity(String),
    /// The text between the literal delimiters, verbatim.
    Literal(String),
    Subquery(Box<Expr>),
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Entity(name) => f.write_str(name),
            Self::Literal(text) => write!(f, "{}{text}{}", Literal::OPEN, Literal::CLOSE),
            Self::Subquery(expr) => write!(f, "({expr})"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Phrase {
    /// Number of `!` marks written before the operand.
    pub negations: usize,
    pub operand: Operand,
    pub quantifier: Quantifier,
    pub span: Span,
}

impl Phrase {
    /// Negations fold by parity: `!!a` means `a`.
    pub fn is_negated(&self) -> bool {
        self.negations % 2 == 1
    }
}

impl fmt::Display for Phrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_negated() {
            write!(f, "{}", Negation::MARK)?;
        }
        write!(f, "{}", self.operand)?;
        if self.quantifier != Quantifier::ONCE {
            write!(f, "{}", self.quantifier)?;
        }
        Ok(())
    }
}

/// A left-flat chain of phrases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expr {
    pub first: Phrase,
    pub rest: Vec<(Combinator, Phrase)>,
}

impl Expr {
    pub fn phrases(&self) -> impl Iterator<Item = &Phrase> {
        std::iter::once(&self.first).chain(self.rest.iter().map(|(_, p)| p))
    }

    /// Lowers an assembled `query` or `subquery` node.
    pub fn from_tree(tree: &Node) -> Result<Self, QueryError> {
        let mut items = tree.children().iter();
        let first = match items.next() {
            Some(node) => lower_phrase(node)?,
            None => return Err(QueryError::grammar("empty query", tree.span())),
        };

        let mut rest = vec![];
        while let Some(token) = items.next() {
            let combinator = Combinator::from_tag(token.desc())
                .ok_or_else(|| QueryError::grammar("expected a combinator", token.span()))?;
            let phrase = items.next().ok_or_else(|| {
                QueryError::grammar("combinator has no right-hand phrase", token.span())
            })?;
            rest.push((combinator, lower_phrase(phrase)?));
        }
        Ok(Self { first, rest })
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.first)?;
        for (combinator, phrase) in &self.rest {
            write!(f, "{combinator}{phrase}")?;
        }
        Ok(())
    }
}

fn lower_phrase(node: &Node) -> Result<Phrase, QueryError> {
    if node.desc() != Some(tag::PHRASE) {
        return Err(QueryError::grammar("expected a phrase", node.span()));
    }

    let mut negations = 0;
    let mut operand = None;
    let mut quantifier = Quantifier::ONCE;
    for part in node.children() {
        match part.desc() {
            Some(tag::NOT) => negations += part.text().chars().count(),
            Some(tag::ENTITY) => operand = Some(Operand::Entity(part.text().to_owned())),
            Some(tag::LITERAL) => {
                let inner = Literal::BRACKET.inner(part.span());
                let text = &part.source()[inner.start..inner.stop];
                operand = Some(Operand::Literal(text.to_owned()));
            }
            Some(tag::SUBQUERY) => operand = Some(Operand::Subquery(Box::new(Expr::from_tree(part)?))),
            Some(tag::QUANTIFIER) => quantifier = Quantifier::parse(part.text(), part.span())?,
            _ => return Err(QueryError::grammar("unexpected token in phrase", part.span())),
        }
    }

    let operand = operand.ok_or_else(|| QueryError::grammar("phrase has no operand", node.span()))?;
    Ok(Phrase {
        negations,
        operand,
        quantifier,
        span: node.span(),
    })
}

/// A compiled query: its assembled phrase tree and the typed expression.
#[derive(Debug, Clone)]
pub struct Query {
    tree: Node,
    expr: Expr,
}

impl Query {
    /// Parses, assembles and lowers `source` with the shared grammar.
    ///
    /// ```
    /// use spantree_engine::query::Query;
    ///
    /// let q = Query::compile("!a{2,3} & (b|c)+").unwrap();
    /// assert_eq!(q.to_string(), "!a{2,3}&(b|c)+");
    /// assert!(q.expr().first.is_negated());
    /// ```
    pub fn compile(source: &str) -> Result<Self, QueryError> {
        Self::compile_with(QueryGrammar::shared()?, source)
    }

    pub fn compile_with(grammar: &QueryGrammar, source: &str) -> Result<Self, QueryError> {
        let tokens = grammar.parse(source)?;
        let tree = assemble(&tokens)?;
        let expr = Expr::from_tree(&tree)?;
        Ok(Self { tree, expr })
    }

    /// The phrase tree: `phrase` nodes separated by `and`/`or` tokens.
    pub fn tree(&self) -> &Node {
        &self.tree
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    pub fn source(&self) -> &str {
        self.tree.source()
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.expr)
    }
}
