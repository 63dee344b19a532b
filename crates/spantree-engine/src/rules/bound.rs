use std::fmt;
use std::sync::Arc;

use regex::Regex;

use super::error::EngineError;
use super::graph::{RuleGraph, RuleId};
use crate::tree::{Node, Span};

/// A pure mapping from one node to an ordered sequence of nodes.
///
/// This is what an [`Ontology`](crate::ontology::Ontology) holds. Rules never
/// modify the node they are given.
pub trait Rule: Send + Sync {
    fn apply(&self, node: &Node) -> Result<Vec<Node>, EngineError>;

    /// Short human-readable name, used in debug output.
    fn label(&self) -> &str;
}

impl fmt::Debug for dyn Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// An entry point into a shared [`RuleGraph`].
#[derive(Clone)]
pub struct GraphRule {
    graph: Arc<RuleGraph>,
    entry: RuleId,
}

impl GraphRule {
    pub fn new(graph: Arc<RuleGraph>, entry: RuleId) -> Result<Self, EngineError> {
        if graph.label(entry).is_none() {
            return Err(EngineError::UnknownRule(entry));
        }
        Ok(Self { graph, entry })
    }

    pub fn graph(&self) -> &RuleGraph {
        &self.graph
    }
}

impl Rule for GraphRule {
    fn apply(&self, node: &Node) -> Result<Vec<Node>, EngineError> {
        let mut input = node.clone();
        self.graph.apply(self.entry, &mut input)
    }

    fn label(&self) -> &str {
        self.graph.label(self.entry).unwrap_or_default()
    }
}

/// Emits one node per non-empty match of a regular expression.
#[derive(Debug, Clone)]
pub struct PatternRule {
    pattern: Regex,
    desc: Option<String>,
}

impl PatternRule {
    pub fn new(pattern: &str, desc: Option<&str>) -> Result<Self, EngineError> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
            desc: desc.map(str::to_owned),
        })
    }
}

impl Rule for PatternRule {
    fn apply(&self, node: &Node) -> Result<Vec<Node>, EngineError> {
        let base = node.start();
        self.pattern
            .find_iter(node.text())
            .filter(|m| !m.is_empty())
            .map(|m| {
                let span = Span {
                    start: base + m.start(),
                    stop: base + m.end(),
                };
                node.slice(span, self.desc.as_deref())
                    .map_err(EngineError::from)
            })
            .collect()
    }

    fn label(&self) -> &str {
        self.pattern.as_str()
    }
}

/// A closure with a label.
pub struct FnRule<F> {
    label: String,
    f: F,
}

impl<F> FnRule<F>
where
    F: Fn(&Node) -> Result<Vec<Node>, EngineError> + Send + Sync,
{
    pub fn new(label: &str, f: F) -> Self {
        Self {
            label: label.to_owned(),
            f,
        }
    }
}

impl<F> Rule for FnRule<F>
where
    F: Fn(&Node) -> Result<Vec<Node>, EngineError> + Send + Sync,
{
    fn apply(&self, node: &Node) -> Result<Vec<Node>, EngineError> {
        (self.f)(node)
    }

    fn label(&self) -> &str {
        &self.label
    }
}
