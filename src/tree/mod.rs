//! The semantic tree (spec §3 `ConditionNode`, §4.3 "TreeBuilder").

pub mod builder;

pub use builder::TreeBuilder;

use crate::ast::ConditionNode;
use crate::policy::OsFamily;

/// A fully parsed policy: the checks that produced no diagnostics, plus the
/// OS family the checks were written against (spec §4.3: "a check is
/// dropped from the tree iff at least one diagnostic bears its id").
#[derive(Debug, Clone)]
pub struct SemanticTree {
    pub os_type: OsFamily,
    pub checks: Vec<ConditionNode>,
}

impl SemanticTree {
    pub fn new(os_type: OsFamily, checks: Vec<ConditionNode>) -> Self {
        Self { os_type, checks }
    }

    pub fn check(&self, id: i64) -> Option<&ConditionNode> {
        self.checks.iter().find(|c| c.id == id)
    }
}
