use std::fmt;

use regex::Regex;

use super::connector::Connector;
use super::error::EngineError;
use super::predicate::{Predicate, admits};
use crate::tree::{Node, NodeError, Span};

/// Index of a rule inside the [`RuleGraph`] that created it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RuleId(usize);

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Which sub-nodes a [`Split`](RuleGraph::split) keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Retain {
    /// Found regions and the untagged gaps between them.
    #[default]
    All,
    /// Found regions only.
    Matched,
}

type WrapFn = dyn Fn(&Node) -> Result<Vec<Node>, EngineError> + Send + Sync;

enum RuleKind {
    Reflect,
    Wrap(Box<WrapFn>),
    Split {
        finder: RuleId,
        retain: Retain,
        desc: Option<String>,
    },
    Extract {
        pattern: Regex,
        groups: Vec<String>,
    },
    Filter(Predicate),
}

struct Entry {
    label: String,
    kind: RuleKind,
    connectors: Vec<Connector>,
}

/// An arena of transformation rules wired together by [`Connector`]s.
///
/// Rules refer to each other by [`RuleId`], so a rule can point at itself or
/// at a rule created later without any reference cycle. Construction takes
/// `&mut self`; once built, the graph is only ever read and can be shared
/// across threads.
///
/// ```
/// use spantree_engine::{Connector, Node, RuleGraph};
///
/// let mut graph = RuleGraph::new();
/// let words = graph.extract("words", r"(?P<word>[a-z]+)").unwrap();
/// let root = graph.reflect("root");
/// graph.connect(root, Connector::recurse(words)).unwrap();
///
/// let mut input = Node::new("hi there", None);
/// let out = graph.apply(root, &mut input).unwrap();
/// assert_eq!(out[0].children().len(), 2);
/// ```
pub struct RuleGraph {
    entries: Vec<Entry>,
    max_depth: usize,
}

impl RuleGraph {
    pub const DEFAULT_MAX_DEPTH: usize = 256;

    pub fn new() -> Self {
        Self::with_max_depth(Self::DEFAULT_MAX_DEPTH)
    }

    /// Creates a graph whose traversals fail once they nest deeper than `max_depth`.
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            entries: vec![],
            max_depth,
        }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn push(&mut self, label: &str, kind: RuleKind) -> RuleId {
        let id = RuleId(self.entries.len());
        self.entries.push(Entry {
            label: label.to_owned(),
            kind,
            connectors: vec![],
        });
        id
    }

    fn entry(&self, id: RuleId) -> Result<&Entry, EngineError> {
        self.entries.get(id.0).ok_or(EngineError::UnknownRule(id))
    }

    /// An identity rule. It exists so that a rule can be named before its
    /// connectors are wired, which is how a grammar refers to itself.
    pub fn reflect(&mut self, label: &str) -> RuleId {
        self.push(label, RuleKind::Reflect)
    }

    /// Lifts a plain function into the graph.
    pub fn wrap<F>(&mut self, label: &str, f: F) -> RuleId
    where
        F: Fn(&Node) -> Result<Vec<Node>, EngineError> + Send + Sync + 'static,
    {
        self.push(label, RuleKind::Wrap(Box::new(f)))
    }

    /// Partitions a node into the regions `finder` identifies and the gaps
    /// between them. Regions take `desc` when given, else keep their own
    /// descriptor; gaps are untagged.
    pub fn split(
        &mut self,
        label: &str,
        finder: RuleId,
        retain: Retain,
        desc: Option<&str>,
    ) -> Result<RuleId, EngineError> {
        self.entry(finder)?;
        Ok(self.push(
            label,
            RuleKind::Split {
                finder,
                retain,
                desc: desc.map(str::to_owned),
            },
        ))
    }

    /// Single-pass tokenizer emitting one node per matched named group.
    pub fn extract(&mut self, label: &str, pattern: &str) -> Result<RuleId, EngineError> {
        let pattern = Regex::new(pattern)?;
        let groups: Vec<String> = pattern.capture_names().flatten().map(str::to_owned).collect();
        self.extract_groups(label, pattern, &groups)
    }

    /// Like [`extract`](Self::extract), emitting only the listed groups.
    pub fn extract_groups<S: AsRef<str>>(
        &mut self,
        label: &str,
        pattern: Regex,
        groups: &[S],
    ) -> Result<RuleId, EngineError> {
        let names: Vec<&str> = pattern.capture_names().flatten().collect();
        if names.is_empty() {
            return Err(EngineError::InvalidParameter {
                name: "pattern",
                received: pattern.as_str().to_owned(),
                expected: "a pattern with at least one named group",
            });
        }
        let wanted: Vec<&str> = groups.iter().map(|g| g.as_ref()).collect();
        if let Some(missing) = wanted.iter().find(|g| !names.contains(*g)) {
            return Err(EngineError::InvalidParameter {
                name: "groups",
                received: (*missing).to_owned(),
                expected: "names of groups defined in the pattern",
            });
        }

        // Emit in the order groups appear in the pattern.
        let groups = names
            .iter()
            .filter(|n| wanted.contains(*n))
            .map(|n| (*n).to_owned())
            .collect();
        Ok(self.push(label, RuleKind::Extract { pattern, groups }))
    }

    /// Passes through nodes accepted by `predicate` and drops the rest.
    pub fn filter(&mut self, label: &str, predicate: Predicate) -> RuleId {
        self.push(label, RuleKind::Filter(predicate))
    }

    /// Appends a connector to `from`. Connectors can only ever be added.
    pub fn connect(&mut self, from: RuleId, connector: Connector) -> Result<(), EngineError> {
        self.entry(connector.target())?;
        let entry = self
            .entries
            .get_mut(from.0)
            .ok_or(EngineError::UnknownRule(from))?;
        entry.connectors.push(connector);
        Ok(())
    }

    pub fn label(&self, id: RuleId) -> Option<&str> {
        self.entries.get(id.0).map(|e| e.label.as_str())
    }

    pub fn connectors(&self, id: RuleId) -> Option<&[Connector]> {
        self.entries.get(id.0).map(|e| e.connectors.as_slice())
    }

    /// Runs rule `id` on `node`, then its connectors, returning its outputs.
    ///
    /// `node` is only modified by [`Connector::AddChildren`].
    pub fn apply(&self, id: RuleId, node: &mut Node) -> Result<Vec<Node>, EngineError> {
        self.traverse(id, node, 0)
    }

    fn traverse(&self, id: RuleId, node: &mut Node, depth: usize) -> Result<Vec<Node>, EngineError> {
        if depth > self.max_depth {
            return Err(EngineError::RecursionLimit(self.max_depth));
        }
        let entry = self.entry(id)?;
        log::trace!("{} {} on {:?}", id, entry.label, node.span());

        let mut out = self.transform(&entry.kind, node, depth)?;

        for connector in &entry.connectors {
            match connector {
                Connector::Recurse { target, predicate } => {
                    for output in out.iter_mut() {
                        if admits(predicate.as_ref(), output) {
                            let children = self.traverse(*target, output, depth + 1)?;
                            output.add_children(children)?;
                        }
                    }
                }
                Connector::Delegate { target, predicate } => {
                    let mut next = Vec::with_capacity(out.len());
                    for mut output in out {
                        if admits(predicate.as_ref(), &output) {
                            next.extend(self.traverse(*target, &mut output, depth + 1)?);
                        } else {
                            next.push(output);
                        }
                    }
                    out = next;
                }
                Connector::AddChildren { target } => {
                    let children = self.traverse(*target, node, depth + 1)?;
                    node.add_children(children)?;
                }
            }
        }

        Ok(out)
    }

    fn transform(&self, kind: &RuleKind, node: &Node, depth: usize) -> Result<Vec<Node>, EngineError> {
        match kind {
            RuleKind::Reflect => Ok(vec![node.clone()]),
            RuleKind::Wrap(f) => f(node),
            RuleKind::Filter(predicate) => Ok(if predicate.test(node) {
                vec![node.clone()]
            } else {
                vec![]
            }),
            RuleKind::Extract { pattern, groups } => extract(node, pattern, groups),
            RuleKind::Split {
                finder,
                retain,
                desc,
            } => {
                // The finder works on a copy so its connectors cannot touch the input.
                let mut scratch = node.clone();
                let found = self.traverse(*finder, &mut scratch, depth + 1)?;
                split(node, found, *retain, desc.as_deref())
            }
        }
    }
}

impl Default for RuleGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RuleGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().enumerate().map(|(i, e)| {
                let targets: Vec<RuleId> = e.connectors.iter().map(Connector::target).collect();
                (RuleId(i), (e.label.as_str(), targets))
            }))
            .finish()
    }
}

fn extract(node: &Node, pattern: &Regex, groups: &[String]) -> Result<Vec<Node>, EngineError> {
    let base = node.start();
    let mut out = vec![];
    for caps in pattern.captures_iter(node.text()) {
        for name in groups {
            if let Some(m) = caps.name(name)
                && !m.is_empty()
            {
                let span = Span {
                    start: base + m.start(),
                    stop: base + m.end(),
                };
                out.push(node.slice(span, Some(name))?);
            }
        }
    }
    Ok(out)
}

fn split(
    node: &Node,
    mut found: Vec<Node>,
    retain: Retain,
    desc: Option<&str>,
) -> Result<Vec<Node>, EngineError> {
    found.sort_by_key(|n| (n.start(), n.stop()));

    let mut out = Vec::with_capacity(found.len() * 2 + 1);
    let mut cursor = node.start();
    let mut prev: Option<Span> = None;

    for region in found {
        let sp = region.span();
        if !node.span().contains(sp) {
            return Err(NodeError::NotContained {
                parent: node.span(),
                child: sp,
            }
            .into());
        }
        if let Some(first) = prev
            && sp.start < first.stop
        {
            return Err(EngineError::Overlap { first, second: sp });
        }

        if sp.start > cursor && retain == Retain::All {
            out.push(node.slice(Span::new(cursor, sp.start)?, None)?);
        }
        out.push(match desc {
            Some(d) => region.with_desc(Some(d)),
            None => region,
        });
        cursor = sp.stop;
        prev = Some(sp);
    }

    if cursor < node.stop() && retain == Retain::All {
        out.push(node.slice(Span::new(cursor, node.stop())?, None)?);
    }
    Ok(out)
}
