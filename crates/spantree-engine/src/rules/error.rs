use thiserror::Error;

use super::graph::RuleId;
use crate::tree::{NodeError, Span, SpanError};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Node(#[from] NodeError),
    #[error(transparent)]
    Span(#[from] SpanError),
    #[error("rule {0} does not exist in this graph")]
    UnknownRule(RuleId),
    #[error("parameter '{name}' is invalid: received {received}, expected {expected}")]
    InvalidParameter {
        name: &'static str,
        received: String,
        expected: &'static str,
    },
    #[error("finder produced overlapping regions {first:?} and {second:?}")]
    Overlap { first: Span, second: Span },
    #[error("rule recursion exceeded the limit of {0} levels")]
    RecursionLimit(usize),
    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),
}
