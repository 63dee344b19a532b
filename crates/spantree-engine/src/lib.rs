pub mod brackets;
pub mod ontology;
pub mod query;
pub mod rules;
pub mod tree;

// Re-export key types for easier usage
pub use brackets::{Bracket, BracketScanner, find_balanced};
pub use ontology::{Discoveries, Ontology, OntologyError};
pub use query::{Query, QueryError, QueryGrammar};
pub use rules::{
    Connector, EngineError, FnRule, GraphRule, PatternRule, Predicate, Retain, Rule, RuleGraph,
    RuleId,
};
pub use tree::{Basis, Node, NodeError, Span, SpanError, render_tree};
