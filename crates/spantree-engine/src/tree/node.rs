use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use super::span::{Span, SpanError};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NodeError {
    #[error(transparent)]
    Span(#[from] SpanError),
    #[error("span {child:?} is not contained in {parent:?}")]
    NotContained { parent: Span, child: Span },
    #[error("span {incoming:?} overlaps existing child {existing:?}")]
    Overlap { existing: Span, incoming: Span },
    #[error("byte offset {0} is not on a char boundary")]
    CharBoundary(usize),
    #[error("cannot join an empty set of nodes")]
    EmptyJoin,
    #[error("cannot join nodes over different source texts")]
    MixedSources,
}

/// An immutable, optionally tagged sub-range of a source text.
///
/// Children lie within the parent's span, never overlap one another and are
/// kept in document order. All spans are absolute byte offsets into the
/// shared source, so a child can be sliced without knowing its parent.
#[derive(Clone, PartialEq, Eq)]
pub struct Node {
    source: Arc<str>,
    span: Span,
    desc: Option<String>,
    children: Vec<Node>,
}

impl Node {
    /// Creates a node covering all of `source`.
    pub fn new(source: impl Into<Arc<str>>, desc: Option<&str>) -> Self {
        let source = source.into();
        let span = Span {
            start: 0,
            stop: source.len(),
        };
        Self {
            source,
            span,
            desc: desc.map(str::to_owned),
            children: vec![],
        }
    }

    /// Creates a childless node over `span` of `source`.
    pub fn from_span(
        source: impl Into<Arc<str>>,
        span: Span,
        desc: Option<&str>,
    ) -> Result<Self, NodeError> {
        let source = source.into();
        let whole = Span {
            start: 0,
            stop: source.len(),
        };
        check_contained(whole, span)?;
        check_boundaries(&source, span)?;
        Ok(Self {
            source,
            span,
            desc: desc.map(str::to_owned),
            children: vec![],
        })
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn start(&self) -> usize {
        self.span.start
    }

    pub fn stop(&self) -> usize {
        self.span.stop
    }

    pub fn len(&self) -> usize {
        self.span.len()
    }

    pub fn is_empty(&self) -> bool {
        self.span.is_empty()
    }

    pub fn desc(&self) -> Option<&str> {
        self.desc.as_deref()
    }

    pub fn source(&self) -> &Arc<str> {
        &self.source
    }

    /// The slice of the source this node covers.
    pub fn text(&self) -> &str {
        &self.source[self.span.start..self.span.stop]
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Consumes the node, returning its children.
    pub fn into_children(self) -> Vec<Node> {
        self.children
    }

    /// Clones the node without its children.
    pub fn shallow(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            span: self.span,
            desc: self.desc.clone(),
            children: vec![],
        }
    }

    /// Returns the same node carrying a different descriptor.
    #[must_use]
    pub fn with_desc(mut self, desc: Option<&str>) -> Self {
        self.desc = desc.map(str::to_owned);
        self
    }

    /// Clones a sub-range given slice-style indices relative to this node.
    ///
    /// Children wholly inside the new range are cloned along with it.
    pub fn clone_range(
        &self,
        start: Option<isize>,
        stop: Option<isize>,
        desc: Option<&str>,
    ) -> Result<Self, NodeError> {
        let span = Span::from_indices(self.len(), start, stop, self.span.start)?;
        self.slice(span, desc)
    }

    /// Clones the absolute sub-span `span`, which must lie within this node.
    pub fn slice(&self, span: Span, desc: Option<&str>) -> Result<Self, NodeError> {
        check_contained(self.span, span)?;
        check_boundaries(&self.source, span)?;
        Ok(Self {
            source: Arc::clone(&self.source),
            span,
            desc: desc.map(str::to_owned),
            children: self
                .children
                .iter()
                .filter(|c| span.contains(c.span))
                .cloned()
                .collect(),
        })
    }

    /// Builds a node spanning `nodes`, which become its children.
    ///
    /// The nodes must share a source and be in document order without overlap.
    pub fn join(nodes: Vec<Node>, desc: Option<&str>) -> Result<Self, NodeError> {
        let (first, last) = match (nodes.first(), nodes.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(NodeError::EmptyJoin),
        };
        if nodes.iter().any(|n| !Arc::ptr_eq(&n.source, &first.source)) {
            return Err(NodeError::MixedSources);
        }
        for pair in nodes.windows(2) {
            if pair[1].span.start < pair[0].span.stop {
                return Err(NodeError::Overlap {
                    existing: pair[0].span,
                    incoming: pair[1].span,
                });
            }
        }

        let span = Span::new(first.span.start, last.span.stop)?;
        let source = Arc::clone(&first.source);
        Ok(Self {
            source,
            span,
            desc: desc.map(str::to_owned),
            children: nodes,
        })
    }

    /// Moves `nodes` into this node's children, preserving document order.
    pub fn add_children(&mut self, nodes: impl IntoIterator<Item = Node>) -> Result<(), NodeError> {
        for node in nodes {
            self.add_child(node)?;
        }
        Ok(())
    }

    fn add_child(&mut self, node: Node) -> Result<(), NodeError> {
        check_contained(self.span, node.span)?;
        let at = self
            .children
            .partition_point(|c| (c.span.start, c.span.stop) <= (node.span.start, node.span.stop));
        // An empty child can land inside a wider sibling, so checking only
        // the neighbours at `at` is not enough.
        if let Some(existing) = self.children.iter().find(|c| c.span.overlaps(node.span)) {
            return Err(NodeError::Overlap {
                existing: existing.span,
                incoming: node.span,
            });
        }
        self.children.insert(at, node);
        Ok(())
    }

    /// Depth-first, pre-order walk over this node and its descendants.
    pub fn walk(&self) -> impl Iterator<Item = &Node> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            stack.extend(node.children.iter().rev());
            Some(node)
        })
    }
}

fn check_contained(parent: Span, child: Span) -> Result<(), NodeError> {
    if parent.contains(child) {
        Ok(())
    } else {
        Err(NodeError::NotContained { parent, child })
    }
}

fn check_boundaries(source: &str, span: Span) -> Result<(), NodeError> {
    for offset in [span.start, span.stop] {
        if !source.is_char_boundary(offset) {
            return Err(NodeError::CharBoundary(offset));
        }
    }
    Ok(())
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Node");
        s.field("span", &(self.span.start..self.span.stop))
            .field("desc", &self.desc)
            .field("text", &self.text());
        if !self.children.is_empty() {
            s.field("children", &self.children);
        }
        s.finish()
    }
}
