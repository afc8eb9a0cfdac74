//! Typed semantic-tree nodes (spec §3 "Data Model").
//!
//! Every rule kind shares an [`ExecutionNode`] envelope describing what to
//! probe; the typed wrapper (`FileRule`, `DirectoryRule`, ...) adds the
//! content predicates and the rule-level negation flag. All nodes are
//! immutable once built — the tree is constructed once by the parser and
//! never mutated during execution (spec §3 "Lifecycle").

use regex::Regex;

/// Which kind of probe an [`ExecutionNode`] represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    File,
    Directory,
    Command,
    Process,
    Registry,
}

/// Common envelope for every typed rule (spec §3).
#[derive(Debug, Clone)]
pub struct ExecutionNode {
    pub kind: NodeKind,
    /// Path / command / process name / registry key.
    pub main_target: Option<String>,
    /// Registry value name, when applicable.
    pub sub_target: Option<String>,
    /// Set only when this node denotes "files matching a pattern under
    /// `main_target`" (directory-expanded file rules, `p:r:<regex>`).
    pub target_pattern: Option<String>,
}

impl ExecutionNode {
    pub fn new(kind: NodeKind, main_target: impl Into<String>) -> Self {
        Self {
            kind,
            main_target: Some(main_target.into()),
            sub_target: None,
            target_pattern: None,
        }
    }

    pub fn with_pattern(kind: NodeKind, target_pattern: impl Into<String>) -> Self {
        Self {
            kind,
            main_target: None,
            sub_target: None,
            target_pattern: Some(target_pattern.into()),
        }
    }
}

/// Operator for a [`ContentRule`] of kind `numeric`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Lt,
    Le,
    Eq,
    Ne,
    Ge,
    Gt,
}

impl CompareOp {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "<" => Some(Self::Lt),
            "<=" => Some(Self::Le),
            "==" => Some(Self::Eq),
            "!=" => Some(Self::Ne),
            ">=" => Some(Self::Ge),
            ">" => Some(Self::Gt),
            _ => None,
        }
    }

    pub fn apply(self, lhs: i64, rhs: i64) -> bool {
        match self {
            Self::Lt => lhs < rhs,
            Self::Le => lhs <= rhs,
            Self::Eq => lhs == rhs,
            Self::Ne => lhs != rhs,
            Self::Ge => lhs >= rhs,
            Self::Gt => lhs > rhs,
        }
    }
}

/// What kind of predicate a [`ContentRule`] evaluates.
#[derive(Debug, Clone)]
pub enum ContentOp {
    /// Substring test: `value ⊂ line`.
    Literal,
    /// `regex.search(value, line)`.
    Regex,
    /// Extract capture group 1 as a decimal integer and compare.
    Numeric { cmp_op: CompareOp, cmp_value: i64 },
}

/// A single content predicate (spec §3 `ContentRule`).
#[derive(Debug, Clone)]
pub struct ContentRule {
    pub op: ContentOp,
    pub value: String,
    /// Per-predicate negation, applied before the line's conjunction
    /// (spec §9 "Rule-level vs. per-predicate negation").
    pub negation: bool,
}

impl ContentRule {
    pub fn literal(value: impl Into<String>, negation: bool) -> Self {
        Self {
            op: ContentOp::Literal,
            value: value.into(),
            negation,
        }
    }

    pub fn regex(value: impl Into<String>, negation: bool) -> Self {
        Self {
            op: ContentOp::Regex,
            value: value.into(),
            negation,
        }
    }

    pub fn numeric(value: impl Into<String>, cmp_op: CompareOp, cmp_value: i64, negation: bool) -> Self {
        Self {
            op: ContentOp::Numeric { cmp_op, cmp_value },
            value: value.into(),
            negation,
        }
    }

    /// Compile the regex payload. Only meaningful for `Regex`/`Numeric`;
    /// the parser already validated compilability before building the node.
    pub fn compiled_regex(&self) -> Result<Regex, regex::Error> {
        Regex::new(&self.value)
    }
}

/// `f:` rule. A `FileRule` always carries exactly one target path — the
/// parser expands `f:a,b,c` into one `FileRule` per path (spec §3 invariant).
#[derive(Debug, Clone)]
pub struct FileRule {
    pub exec: ExecutionNode,
    pub content_rules: Vec<ContentRule>,
    pub negation: bool,
}

/// `d:` rule. Holds at most one inner [`FileRule`] (spec §3 invariant); its
/// `target_pattern` lives on that inner rule's `ExecutionNode`.
#[derive(Debug, Clone)]
pub struct DirectoryRule {
    pub exec: ExecutionNode,
    pub file_rule: Option<FileRule>,
    pub negation: bool,
}

/// `c:` rule.
#[derive(Debug, Clone)]
pub struct CommandRule {
    pub exec: ExecutionNode,
    pub content_rules: Vec<ContentRule>,
    pub negation: bool,
}

/// `p:` rule. Never carries content predicates.
#[derive(Debug, Clone)]
pub struct ProcessRule {
    pub exec: ExecutionNode,
    pub negation: bool,
}

/// `r:` rule.
#[derive(Debug, Clone)]
pub struct RegistryRule {
    pub exec: ExecutionNode,
    pub content_rules: Vec<ContentRule>,
    pub negation: bool,
}

/// One of the five typed rule kinds a DSL string parses into.
#[derive(Debug, Clone)]
pub enum TypedRule {
    File(FileRule),
    Directory(DirectoryRule),
    Command(CommandRule),
    Process(ProcessRule),
    Registry(RegistryRule),
}

/// Logical combinator for a check's rules (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    All,
    Any,
    None,
}

impl Condition {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "all" => Some(Self::All),
            "any" => Some(Self::Any),
            "none" => Some(Self::None),
            _ => None,
        }
    }

    /// Reduce `rule_results` under this condition (spec §4.6 step 6).
    pub fn reduce(self, rule_results: &[bool]) -> bool {
        match self {
            Self::All => rule_results.iter().all(|&r| r),
            Self::Any => rule_results.iter().any(|&r| r),
            Self::None => !rule_results.iter().any(|&r| r),
        }
    }
}

/// Root of a parsed check (spec §3 `ConditionNode`). Emitted only when its
/// parse produced zero diagnostics (spec §3 invariant).
#[derive(Debug, Clone)]
pub struct ConditionNode {
    pub id: i64,
    pub condition: Condition,
    pub rules: Vec<TypedRule>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compare_op_parses_all_operators() {
        assert_eq!(CompareOp::parse("<="), Some(CompareOp::Le));
        assert_eq!(CompareOp::parse("!="), Some(CompareOp::Ne));
        assert_eq!(CompareOp::parse("nope"), None);
    }

    #[test]
    fn condition_reduce_matches_semantics() {
        assert!(Condition::All.reduce(&[true, true]));
        assert!(!Condition::All.reduce(&[true, false]));
        assert!(Condition::Any.reduce(&[false, true]));
        assert!(!Condition::Any.reduce(&[false, false]));
        assert!(Condition::None.reduce(&[false, false]));
        assert!(!Condition::None.reduce(&[false, true]));
    }
}
