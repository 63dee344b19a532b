//! # Ontologies
//!
//! An [`Ontology`] is a hierarchy of named rule sets. Running it over some
//! nodes with [`Ontology::discover`] yields [`Discoveries`], a tree of the
//! same shape holding what each level's rules found.
//!
//! Every level sees the *original* input nodes, not its parent's matches.
//! Children keep the order they were added in.

pub mod discoveries;
pub mod error;

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

pub use discoveries::Discoveries;
pub use error::OntologyError;

use crate::rules::{EngineError, Rule};
use crate::tree::Node;

#[derive(Debug, Clone, Default)]
pub struct Ontology {
    rules: Vec<Arc<dyn Rule>>,
    children: IndexMap<String, Ontology>,
}

impl Ontology {
    pub fn new(rules: Vec<Arc<dyn Rule>>, children: IndexMap<String, Ontology>) -> Self {
        Self { rules, children }
    }

    #[must_use]
    pub fn with_rule(mut self, rule: impl Rule + 'static) -> Self {
        self.rules.push(Arc::new(rule));
        self
    }

    #[must_use]
    pub fn with_child(mut self, name: &str, child: Ontology) -> Self {
        self.children.insert(name.to_owned(), child);
        self
    }

    pub fn rules(&self) -> &[Arc<dyn Rule>] {
        &self.rules
    }

    pub fn children(&self) -> &IndexMap<String, Ontology> {
        &self.children
    }

    pub fn get(&self, name: &str) -> Option<&Ontology> {
        self.children.get(name)
    }

    /// Follows `path` one name at a time. An empty path is `self`.
    pub fn get_path<S: AsRef<str>>(&self, path: &[S]) -> Option<&Ontology> {
        path.iter().try_fold(self, |o, name| o.get(name.as_ref()))
    }

    /// Like [`get_path`](Self::get_path), but names the first missing step.
    pub fn lookup<S: AsRef<str>>(&self, path: &[S]) -> Result<&Ontology, OntologyError> {
        if path.is_empty() {
            return Err(OntologyError::EmptyPath);
        }
        let mut current = self;
        for (depth, name) in path.iter().enumerate() {
            current = current
                .get(name.as_ref())
                .ok_or_else(|| OntologyError::NotFound {
                    name: name.as_ref().to_owned(),
                    parent: path[..depth].iter().map(|s| s.as_ref().to_owned()).collect(),
                })?;
        }
        Ok(current)
    }

    /// Applies every rule to every node, rules outermost, then recurses into
    /// each child with the same nodes.
    pub fn discover(&self, nodes: &[Node]) -> Result<Discoveries, EngineError> {
        let mut matches = vec![];
        for rule in &self.rules {
            for node in nodes {
                matches.extend(rule.apply(node)?);
            }
        }
        log::debug!(
            "{} rule(s) over {} node(s) found {} match(es)",
            self.rules.len(),
            nodes.len(),
            matches.len()
        );

        let children = self
            .children
            .iter()
            .map(|(name, child)| Ok((name.clone(), child.discover(nodes)?)))
            .collect::<Result<_, EngineError>>()?;

        Ok(Discoveries { matches, children })
    }
}

/// `{rules: [a, b], child: {...}, }`
impl fmt::Display for Ontology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{rules: [")?;
        for (i, rule) in self.rules.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(rule.label())?;
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{FnRule, PatternRule};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn digits() -> PatternRule {
        PatternRule::new(r"\d+", Some("number")).unwrap()
    }

    fn nested() -> Ontology {
        Ontology::default().with_child("x", Ontology::default().with_child("y", Ontology::default()))
    }

    fn path(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn discovers_digit_runs() {
        let ontology = Ontology::default().with_rule(digits());
        let found = ontology.discover(&[Node::new("abc123", None)]).unwrap();

        assert_eq!(found.matches().len(), 1);
        assert_eq!(found.matches()[0].text(), "123");
        assert_eq!(found.to_string(), "{itos: ['123'], }");
    }

    #[test]
    fn discoveries_mirror_the_ontology() {
        let found = nested().discover(&[Node::new("abc", None)]).unwrap();
        let paths: Vec<_> = found.flatten(false).into_keys().collect();
        assert_eq!(paths, vec![path(&[]), path(&["x"]), path(&["x", "y"])]);
    }

    #[test]
    fn children_keep_construction_order() {
        let ontology = Ontology::default()
            .with_child("zeta", Ontology::default().with_child("b", Ontology::default()))
            .with_child("alpha", Ontology::default())
            .with_child("zeta", Ontology::default().with_rule(digits()));
        assert_eq!(
            ontology.to_string(),
            r"{rules: [], zeta: {rules: [\d+], }, alpha: {rules: [], }}"
        );

        let found = ontology.discover(&[Node::new("9", None)]).unwrap();
        let paths: Vec<_> = found.flatten(false).into_keys().collect();
        assert_eq!(paths, vec![path(&[]), path(&["zeta"]), path(&["alpha"])]);
        assert_eq!(found.to_string(), "{itos: [], zeta: {itos: ['9'], }, alpha: {itos: [], }}");
    }

    #[test]
    fn filter_empties_judges_each_path_alone() {
        let ontology = Ontology::default().with_child(
            "x",
            Ontology::default().with_child("y", Ontology::default().with_rule(digits())),
        );
        let found = ontology.discover(&[Node::new("a1", None)]).unwrap();

        let kept: Vec<_> = found.flatten(true).into_keys().collect();
        assert_eq!(kept, vec![path(&["x", "y"])]);
        assert_eq!(found.flatten(false).len(), 3);
    }

    #[test]
    fn children_see_the_original_nodes() {
        let words = PatternRule::new("[a-z]+", Some("word")).unwrap();
        let ontology = Ontology::default()
            .with_rule(digits())
            .with_child("words", Ontology::default().with_rule(words));
        let found = ontology.discover(&[Node::new("ab12cd", None)]).unwrap();

        let texts: Vec<_> = found
            .get("words")
            .unwrap()
            .matches()
            .iter()
            .map(Node::text)
            .collect();
        assert_eq!(texts, vec!["ab", "cd"]);
    }

    #[test]
    fn rules_outer_nodes_inner() {
        let letters = PatternRule::new("[a-z]", None).unwrap();
        let ontology = Ontology::default().with_rule(digits()).with_rule(letters);
        let found = ontology
            .discover(&[Node::new("a1", None), Node::new("2b", None)])
            .unwrap();

        let texts: Vec<_> = found.matches().iter().map(Node::text).collect();
        assert_eq!(texts, vec!["1", "2", "a", "b"]);
    }

    #[test]
    fn discovery_leaves_inputs_untouched() {
        let whole = FnRule::new("whole", |n: &Node| Ok(vec![n.clone()]));
        let ontology = Ontology::default().with_rule(whole);
        let input = Node::new("abc", None);
        ontology.discover(std::slice::from_ref(&input)).unwrap();
        assert!(input.children().is_empty());
    }

    #[test]
    fn discovery_is_repeatable() {
        let ontology = Ontology::default().with_rule(digits()).with_child("x", nested());
        let input = [Node::new("1 22 333", None)];
        assert_eq!(
            ontology.discover(&input).unwrap(),
            ontology.discover(&input).unwrap()
        );
    }

    #[test]
    fn rule_errors_propagate() {
        let failing = FnRule::new("failing", |n: &Node| {
            Ok(vec![n.clone_range(Some(2), Some(1), None)?])
        });
        let ontology = Ontology::default().with_rule(failing);
        assert!(ontology.discover(&[Node::new("abc", None)]).is_err());
    }

    #[rstest]
    #[case(&[], true)]
    #[case(&["x"], true)]
    #[case(&["x", "y"], true)]
    #[case(&["y"], false)]
    #[case(&["x", "z"], false)]
    fn get_path_walks_names(#[case] names: &[&str], #[case] found: bool) {
        assert_eq!(nested().get_path(names).is_some(), found);
    }

    #[test]
    fn lookup_names_the_missing_step() {
        let ontology = nested();
        assert!(ontology.lookup(&["x", "y"]).is_ok());
        assert_eq!(
            ontology.lookup(&["x", "z", "w"]).unwrap_err(),
            OntologyError::NotFound {
                name: "z".into(),
                parent: path(&["x"])
            }
        );
        assert_eq!(
            ontology.lookup::<&str>(&[]).unwrap_err(),
            OntologyError::EmptyPath
        );
        assert_eq!(
            ontology.lookup(&["q"]).unwrap_err().to_string(),
            "no ontology named 'q' under the root"
        );
    }

    #[test]
    fn display_renders_rules_and_children() {
        let ontology = Ontology::default()
            .with_rule(digits())
            .with_child("x", Ontology::default());
        assert_eq!(ontology.to_string(), r"{rules: [\d+], x: {rules: [], }}");

        let found = ontology.discover(&[Node::new("7", None)]).unwrap();
        assert_eq!(found.to_string(), "{itos: ['7'], x: {itos: [], }}");
        assert_eq!(found.get_path(&["x"]).map(|d| d.matches().len()), Some(0));
    }
}
