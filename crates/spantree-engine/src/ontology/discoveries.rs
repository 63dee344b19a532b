use std::fmt;

use indexmap::IndexMap;

use crate::tree::Node;

/// Result of running an [`Ontology`](super::Ontology): the nodes its rules
/// produced, plus one nested `Discoveries` per named child ontology.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Discoveries {
    pub(super) matches: Vec<Node>,
    pub(super) children: IndexMap<String, Discoveries>,
}

impl Discoveries {
    pub fn matches(&self) -> &[Node] {
        &self.matches
    }

    pub fn children(&self) -> &IndexMap<String, Discoveries> {
        &self.children
    }

    pub fn get(&self, name: &str) -> Option<&Discoveries> {
        self.children.get(name)
    }

    /// Follows `path` one name at a time. An empty path is `self`.
    pub fn get_path<S: AsRef<str>>(&self, path: &[S]) -> Option<&Discoveries> {
        path.iter().try_fold(self, |d, name| d.get(name.as_ref()))
    }

    /// Maps every path, root first, to the matches found there.
    ///
    /// With `filter_empties`, a path is kept only if its own match list is
    /// non-empty, whatever its descendants hold. Key order is pre-order.
    pub fn flatten(&self, filter_empties: bool) -> IndexMap<Vec<String>, Vec<Node>> {
        let mut out = IndexMap::new();
        self.flatten_into(filter_empties, &mut vec![], &mut out);
        out
    }

    fn flatten_into(
        &self,
        filter_empties: bool,
        path: &mut Vec<String>,
        out: &mut IndexMap<Vec<String>, Vec<Node>>,
    ) {
        if !(filter_empties && self.matches.is_empty()) {
            out.insert(path.clone(), self.matches.clone());
        }
        for (name, child) in &self.children {
            path.push(name.clone());
            child.flatten_into(filter_empties, path, out);
            path.pop();
        }
    }
}

/// `{itos: ['a', 'b'], child: {...}, }`
impl fmt::Display for Discoveries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{itos: [")?;
        for (i, node) in self.matches.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "'{node}'")?;
        }
        f.write_str("], ")?;
        for (i, (name, child)) in self.children.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name}: {child}")?;
        }
        f.write_str("}")
    }
}
