//! # Query Language
//!
//! A small boolean pattern language over named entities:
//!
//! ```text
//! query      := phrase ( ("&"|"|") phrase )*
//! phrase     := "!"* operand [quantifier]
//! operand    := entity | literal | "(" query ")"
//! entity     := [a-z0-9_]+
//! literal    := "⟦" ... "⟧"
//! quantifier := "{" [min] ["," [max]] "}" | "?" | "*" | "+"
//! ```
//!
//! Compilation has three layers:
//!
//! - **`grammar`**: a [`RuleGraph`](crate::rules::RuleGraph) producing a flat
//!   token tree; each subquery is reparsed by the same graph
//! - **`phrase`**: groups tokens into `phrase` nodes and reports grammar errors
//! - **`ast`**: lowers the phrase tree into a typed [`Expr`]
//!
//! Whitespace and any character the tokenizer does not recognise are dropped
//! silently, so `parse` succeeds on `"&a"`; [`assemble`] is where it fails.

pub mod ast;
pub mod error;
pub mod grammar;
pub mod kinds;
pub mod phrase;

pub use ast::{Combinator, Expr, Operand, Phrase, Quantifier, Query};
pub use error::QueryError;
pub use grammar::{QueryGrammar, parse};
pub use phrase::assemble;
