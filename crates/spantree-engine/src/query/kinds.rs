//! # Query Kinds
//!
//! Every delimiter and node descriptor of the query language lives here.
//! The grammar and the phrase assembler refer to these constants; neither
//! hardcodes `⟦` or `"subquery"`.

use crate::brackets::Bracket;

/// Opaque text between U+27E6 and U+27E7, never reparsed.
pub struct Literal;

impl Literal {
    pub const OPEN: char = '⟦';
    pub const CLOSE: char = '⟧';
    pub const BRACKET: Bracket = Bracket::opaque(Self::OPEN, Self::CLOSE);
}

/// A parenthesised subquery.
pub struct Group;

impl Group {
    pub const OPEN: char = '(';
    pub const CLOSE: char = ')';
    pub const BRACKET: Bracket = Bracket::new(Self::OPEN, Self::CLOSE);
}

pub struct Negation;

impl Negation {
    pub const MARK: char = '!';
}

/// Node descriptors produced by the grammar.
pub mod tag {
    pub const QUERY: &str = "query";
    pub const PHRASE: &str = "phrase";
    pub const SUBQUERY: &str = "subquery";
    pub const LITERAL: &str = "literal";
    pub const ENTITY: &str = "entity";
    pub const QUANTIFIER: &str = "quantifier";
    pub const NOT: &str = "not";
    pub const AND: &str = "and";
    pub const OR: &str = "or";
}

/// The single-pass token alternation applied to text outside literals and groups.
pub const TOKEN_PATTERN: &str = concat!(
    r"(?P<not>!+)",
    r"|(?P<and>&)",
    r"|(?P<or>\|)",
    r"|(?P<entity>[a-z0-9_]+)",
    r"|(?P<quantifier>\{\d*(?:,\d*)?\}|[?*+])",
);
