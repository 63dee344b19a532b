use std::fmt;
use std::sync::Arc;

use crate::tree::Node;

/// A named test over nodes, used to select which outputs a connector follows.
#[derive(Clone)]
pub struct Predicate {
    label: String,
    test: Arc<dyn Fn(&Node) -> bool + Send + Sync>,
}

impl Predicate {
    pub fn new<F>(label: &str, test: F) -> Self
    where
        F: Fn(&Node) -> bool + Send + Sync + 'static,
    {
        Self {
            label: label.to_owned(),
            test: Arc::new(test),
        }
    }

    /// Matches nodes carrying any descriptor.
    pub fn tagged() -> Self {
        Self::new("tagged", |n| n.desc().is_some())
    }

    /// Matches nodes with no descriptor.
    pub fn untagged() -> Self {
        Self::new("untagged", |n| n.desc().is_none())
    }

    /// Matches nodes whose descriptor equals `desc`.
    pub fn desc(desc: &str) -> Self {
        let want = desc.to_owned();
        Self::new(&format!("desc={desc}"), move |n| n.desc() == Some(want.as_str()))
    }

    pub fn test(&self, node: &Node) -> bool {
        (self.test)(node)
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Predicate({})", self.label)
    }
}

/// True when `predicate` is absent or accepts `node`.
pub(crate) fn admits(predicate: Option<&Predicate>, node: &Node) -> bool {
    predicate.is_none_or(|p| p.test(node))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_predicates() {
        let tagged = Node::new("x", Some("entity"));
        let plain = Node::new("x", None);

        assert!(Predicate::tagged().test(&tagged));
        assert!(!Predicate::tagged().test(&plain));
        assert!(Predicate::untagged().test(&plain));
        assert!(Predicate::desc("entity").test(&tagged));
        assert!(!Predicate::desc("literal").test(&tagged));
    }

    #[test]
    fn absent_predicate_admits_everything() {
        let plain = Node::new("x", None);
        assert!(admits(None, &plain));
        assert!(!admits(Some(&Predicate::tagged()), &plain));
    }
}
