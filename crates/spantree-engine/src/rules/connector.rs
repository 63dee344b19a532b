use super::graph::RuleId;
use super::predicate::Predicate;

/// An outgoing edge from a rule, inspected after the rule produced its outputs.
///
/// Connectors run in declaration order. Their side effects (attaching
/// children, replacing outputs) all happen before the owning rule hands its
/// outputs back to the caller.
#[derive(Debug, Clone)]
pub enum Connector {
    /// Run `target` on every admitted output and attach its results as that
    /// output's children.
    Recurse {
        target: RuleId,
        predicate: Option<Predicate>,
    },
    /// Replace every admitted output with whatever `target` produces from it.
    /// Outputs the predicate rejects pass through untouched.
    Delegate {
        target: RuleId,
        predicate: Option<Predicate>,
    },
    /// Run `target` on the rule's *input* and attach its results as the
    /// input's children.
    AddChildren { target: RuleId },
}

impl Connector {
    pub fn recurse(target: RuleId) -> Self {
        Self::Recurse {
            target,
            predicate: None,
        }
    }

    pub fn recurse_if(target: RuleId, predicate: Predicate) -> Self {
        Self::Recurse {
            target,
            predicate: Some(predicate),
        }
    }

    pub fn delegate(target: RuleId) -> Self {
        Self::Delegate {
            target,
            predicate: None,
        }
    }

    pub fn delegate_if(target: RuleId, predicate: Predicate) -> Self {
        Self::Delegate {
            target,
            predicate: Some(predicate),
        }
    }

    pub fn add_children(target: RuleId) -> Self {
        Self::AddChildren { target }
    }

    pub fn target(&self) -> RuleId {
        match self {
            Self::Recurse { target, .. }
            | Self::Delegate { target, .. }
            | Self::AddChildren { target } => *target,
        }
    }
}
