use thiserror::Error;

use crate::rules::EngineError;
use crate::tree::{NodeError, Span};

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("query source is empty")]
    Empty,
    #[error("query reduced to {count} top-level trees, expected exactly one")]
    Parse { count: usize },
    #[error("{message} at {}..{}", .span.start, .span.stop)]
    Grammar { message: String, span: Span },
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Node(#[from] NodeError),
}

impl QueryError {
    pub(crate) fn grammar(message: impl Into<String>, span: Span) -> Self {
        Self::Grammar {
            message: message.into(),
            span,
        }
    }
}
