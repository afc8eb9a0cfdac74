//! Builds a [`SemanticTree`] from a [`Policy`], accumulating diagnostics
//! instead of failing fast (spec §4.3 "TreeBuilder", mirroring
//! `SemanticTreeBuilder.build_tree` in the source this module ports).

use crate::ast::{Condition, ConditionNode};
use crate::error::{Diagnostic, ParseErrorCode};
use crate::parser::parse_rule;
use crate::policy::Policy;
use crate::tree::SemanticTree;

/// Accumulates diagnostics across an entire policy and produces the tree of
/// checks that parsed cleanly.
#[derive(Debug, Default)]
pub struct TreeBuilder {
    diagnostics: Vec<Diagnostic>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses every check in `policy`. A check with at least one diagnostic
    /// is dropped from the resulting tree but its diagnostics remain
    /// retrievable via [`TreeBuilder::diagnostics`].
    pub fn build(&mut self, policy: &Policy) -> SemanticTree {
        let mut checks = Vec::with_capacity(policy.checks.len());

        for check in &policy.checks {
            let before = self.diagnostics.len();

            let condition = match Condition::parse(&check.condition) {
                Some(c) => c,
                None => {
                    self.diagnostics.push(Diagnostic::new(
                        ParseErrorCode::InvalidCondition,
                        check.condition.clone(),
                        check.id,
                        0,
                    ));
                    continue;
                }
            };

            let mut rules = Vec::new();
            for (index, raw_rule) in check.rules.iter().enumerate() {
                if let Some(parsed) = parse_rule(raw_rule, check.id, index, &mut self.diagnostics) {
                    rules.extend(parsed);
                }
            }

            if self.diagnostics.len() == before {
                checks.push(ConditionNode {
                    id: check.id,
                    condition,
                    rules,
                });
            }
        }

        SemanticTree::new(policy.os_type, checks)
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::TypedRule;
    use crate::policy::{Check, OsFamily};

    fn policy(checks: Vec<Check>) -> Policy {
        Policy {
            os_type: OsFamily::Linux,
            checks,
        }
    }

    #[test]
    fn clean_check_is_kept() {
        let p = policy(vec![Check {
            id: 1,
            condition: "all".into(),
            rules: vec!["f:/etc/hosts".into()],
        }]);
        let mut builder = TreeBuilder::new();
        let tree = builder.build(&p);
        assert_eq!(tree.checks.len(), 1);
        assert!(builder.diagnostics().is_empty());
    }

    #[test]
    fn invalid_condition_drops_the_check() {
        let p = policy(vec![Check {
            id: 2,
            condition: "maybe".into(),
            rules: vec!["f:/etc/hosts".into()],
        }]);
        let mut builder = TreeBuilder::new();
        let tree = builder.build(&p);
        assert!(tree.checks.is_empty());
        assert_eq!(builder.diagnostics()[0].code, ParseErrorCode::InvalidCondition);
        assert_eq!(builder.diagnostics()[0].check_id, 2);
    }

    #[test]
    fn one_bad_rule_drops_the_whole_check() {
        let p = policy(vec![Check {
            id: 3,
            condition: "all".into(),
            rules: vec!["f:/etc/hosts".into(), "x:nonsense".into()],
        }]);
        let mut builder = TreeBuilder::new();
        let tree = builder.build(&p);
        assert!(tree.checks.is_empty());
        assert_eq!(builder.diagnostics().len(), 1);
    }

    #[test]
    fn later_checks_still_parse_after_an_earlier_failure() {
        let p = policy(vec![
            Check {
                id: 1,
                condition: "maybe".into(),
                rules: vec!["f:/etc/hosts".into()],
            },
            Check {
                id: 2,
                condition: "all".into(),
                rules: vec!["not p:telnetd".into()],
            },
        ]);
        let mut builder = TreeBuilder::new();
        let tree = builder.build(&p);
        assert_eq!(tree.checks.len(), 1);
        assert_eq!(tree.checks[0].id, 2);
        match &tree.checks[0].rules[0] {
            TypedRule::Process(p) => assert!(p.negation),
            _ => panic!("expected process rule"),
        }
    }
}
