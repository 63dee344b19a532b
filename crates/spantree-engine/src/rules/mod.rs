//! # Transformation Rules
//!
//! Rules map one node to an ordered sequence of nodes. They are stored in a
//! [`RuleGraph`] arena and composed only through [`Connector`]s, so a graph's
//! shape can be inspected and reused.
//!
//! ## Primitives
//!
//! | Rule | Output |
//! |------|--------|
//! | `reflect` | the input itself; a placeholder for self-reference |
//! | `wrap` | whatever a plain function returns |
//! | `split` | found regions plus the untagged gaps between them |
//! | `extract` | one tagged node per matched named group |
//! | `filter` | the input, if a predicate accepts it |
//!
//! ## Connectors
//!
//! - **Recurse**: reparse each admitted output, attaching results as its children
//! - **Delegate**: replace each admitted output with a target's outputs
//! - **AddChildren**: attach a target's outputs to the rule's *input*
//!
//! ## Recursion
//!
//! A grammar that contains itself (a subquery inside a query) is wired in two
//! steps: create a `reflect` rule, build the rest of the graph pointing at it,
//! then connect the placeholder to the real pipeline.

pub mod bound;
pub mod connector;
pub mod error;
pub mod graph;
pub mod predicate;

pub use bound::{FnRule, GraphRule, PatternRule, Rule};
pub use connector::Connector;
pub use error::EngineError;
pub use graph::{Retain, RuleGraph, RuleId};
pub use predicate::Predicate;
