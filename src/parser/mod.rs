//! Rule-string parsing (spec §4.3 "TreeBuilder").
//!
//! A rule starts with optional `not ` (rule-level negation), then a
//! one-character kind tag and colon. Parsing never panics or propagates an
//! error to the caller — structural problems become [`Diagnostic`]s
//! accumulated by the caller, mirroring
//! `SemanticTreeBuilder.parse_rule` in the source this module ports.

pub mod content;
pub mod validate;

use crate::ast::{CommandRule, DirectoryRule, ExecutionNode, FileRule, NodeKind, ProcessRule, RegistryRule, TypedRule};
use crate::error::{Diagnostic, ParseErrorCode};
use content::{parse_content_conjunction, ContentCaller};

/// Parses one raw rule string into zero or more typed rules (file/directory
/// rules with comma-separated targets expand to more than one). Returns
/// `None` if the rule is malformed; a diagnostic has already been recorded.
pub fn parse_rule(rule: &str, check_id: i64, index: usize, diags: &mut Vec<Diagnostic>) -> Option<Vec<TypedRule>> {
    let (negation, body) = match rule.strip_prefix("not ") {
        Some(rest) => (true, rest),
        None => (false, rule),
    };

    if let Some(path_spec) = body.strip_prefix("f:") {
        parse_file_rule(path_spec, negation, check_id, index, diags)
    } else if let Some(dir_spec) = body.strip_prefix("d:") {
        parse_directory_rule(dir_spec, negation, check_id, index, diags)
    } else if let Some(cmd_spec) = body.strip_prefix("c:") {
        parse_command_rule(cmd_spec, negation, check_id, index, diags).map(|r| vec![r])
    } else if let Some(proc_spec) = body.strip_prefix("p:") {
        Some(vec![parse_process_rule(proc_spec, negation)])
    } else if let Some(reg_spec) = body.strip_prefix("r:") {
        parse_registry_rule(reg_spec, negation, check_id, index, diags).map(|r| vec![r])
    } else {
        diags.push(Diagnostic::new(
            ParseErrorCode::UnknownRuleType,
            rule.to_string(),
            check_id,
            index,
        ));
        None
    }
}

fn parse_file_rule(
    body: &str,
    negation: bool,
    check_id: i64,
    index: usize,
    diags: &mut Vec<Diagnostic>,
) -> Option<Vec<TypedRule>> {
    let parts: Vec<&str> = body.split(" -> ").collect();
    if parts.is_empty() || parts.len() > 2 || parts[0].trim().is_empty() {
        diags.push(Diagnostic::new(
            ParseErrorCode::InvalidFileRule,
            format!("invalid rule format: {body}"),
            check_id,
            index,
        ));
        return None;
    }

    let content_rules = if parts.len() == 2 {
        parse_content_conjunction(parts[1].trim(), ContentCaller::File, check_id, index, diags)?
    } else {
        Vec::new()
    };

    let mut rules = Vec::new();
    for target in parts[0].split(',') {
        let target = target.trim();
        if target.is_empty() {
            continue;
        }
        rules.push(TypedRule::File(FileRule {
            exec: ExecutionNode::new(NodeKind::File, target),
            content_rules: content_rules.clone(),
            negation,
        }));
    }
    Some(rules)
}

fn parse_directory_rule(
    body: &str,
    negation: bool,
    check_id: i64,
    index: usize,
    diags: &mut Vec<Diagnostic>,
) -> Option<Vec<TypedRule>> {
    let parts: Vec<&str> = body.split(" -> ").collect();
    if parts.is_empty() || parts[0].trim().is_empty() {
        diags.push(Diagnostic::new(
            ParseErrorCode::InvalidDirectoryRule,
            format!("invalid rule format: {body}"),
            check_id,
            index,
        ));
        return None;
    }

    let mut rules = Vec::new();
    for dir in parts[0].split(',') {
        let dir = dir.trim();
        if dir.is_empty() {
            continue;
        }

        let exec_d = ExecutionNode::new(NodeKind::Directory, dir);
        let mut file_rule = None;

        if parts.len() > 1 {
            let mut file_spec = parts[1].trim();
            let negation_f = match file_spec.strip_prefix('!') {
                Some(rest) => {
                    file_spec = rest;
                    true
                }
                None => false,
            };

            let exec_f = match file_spec.strip_prefix("r:") {
                Some(pattern) => ExecutionNode::with_pattern(NodeKind::File, pattern.trim()),
                None => ExecutionNode::new(NodeKind::File, file_spec),
            };

            let content_rules = if parts.len() > 2 {
                let rest = parts[2..].join(" -> ");
                parse_content_conjunction(rest.trim(), ContentCaller::Directory, check_id, index, diags)?
            } else {
                Vec::new()
            };

            file_rule = Some(FileRule {
                exec: exec_f,
                content_rules,
                negation: negation_f,
            });
        }

        rules.push(TypedRule::Directory(DirectoryRule {
            exec: exec_d,
            file_rule,
            negation,
        }));
    }
    Some(rules)
}

fn parse_command_rule(
    body: &str,
    negation: bool,
    check_id: i64,
    index: usize,
    diags: &mut Vec<Diagnostic>,
) -> Option<TypedRule> {
    let normalized = body.replace(" -> -> ", " -> ");
    let parts: Vec<&str> = normalized.split(" -> ").collect();

    if parts.len() < 2 {
        diags.push(Diagnostic::new(
            ParseErrorCode::InvalidCommandRule,
            normalized.clone(),
            check_id,
            index,
        ));
        return None;
    }

    let exec = ExecutionNode::new(NodeKind::Command, parts[0].trim());

    let mut content_rules =
        parse_content_conjunction(parts[1].trim(), ContentCaller::Command, check_id, index, diags)?;

    if parts.len() > 2 {
        let second_level = parts[2..].join(" -> ");
        let more = parse_content_conjunction(second_level.trim(), ContentCaller::Command, check_id, index, diags)?;
        content_rules.extend(more);
    }

    Some(TypedRule::Command(CommandRule {
        exec,
        content_rules,
        negation,
    }))
}

fn parse_process_rule(body: &str, negation: bool) -> TypedRule {
    let exec = match body.strip_prefix("r:") {
        Some(pattern) => ExecutionNode::with_pattern(NodeKind::Process, pattern),
        None => ExecutionNode::new(NodeKind::Process, body),
    };
    TypedRule::Process(ProcessRule { exec, negation })
}

fn parse_registry_rule(
    body: &str,
    negation: bool,
    check_id: i64,
    index: usize,
    diags: &mut Vec<Diagnostic>,
) -> Option<TypedRule> {
    let parts: Vec<&str> = body.split(" -> ").collect();
    if parts.is_empty() || parts[0].trim().is_empty() {
        diags.push(Diagnostic::new(
            ParseErrorCode::InvalidRegistryRule,
            body.to_string(),
            check_id,
            index,
        ));
        return None;
    }

    let main_target = parts[0].trim().to_string();
    let sub_target = parts.get(1).map(|s| s.trim().to_string());

    let content_rules = if parts.len() > 2 {
        let rest = parts[2..].join(" -> ");
        parse_content_conjunction(rest.trim(), ContentCaller::Registry, check_id, index, diags)?
    } else {
        Vec::new()
    };

    let exec = ExecutionNode {
        kind: NodeKind::Registry,
        main_target: Some(main_target),
        sub_target,
        target_pattern: None,
    };

    Some(TypedRule::Registry(RegistryRule {
        exec,
        content_rules,
        negation,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_rule_expands_comma_list() {
        let mut diags = Vec::new();
        let rules = parse_rule("f:/etc/a,/etc/b -> r:x", 1, 1, &mut diags).unwrap();
        assert_eq!(rules.len(), 2);
        for rule in &rules {
            match rule {
                TypedRule::File(f) => assert_eq!(f.content_rules.len(), 1),
                _ => panic!("expected file rule"),
            }
        }
    }

    #[test]
    fn file_rule_without_content_is_existence_check() {
        let mut diags = Vec::new();
        let rules = parse_rule("f:/etc/hosts", 1, 1, &mut diags).unwrap();
        assert_eq!(rules.len(), 1);
        match &rules[0] {
            TypedRule::File(f) => assert!(f.content_rules.is_empty()),
            _ => panic!("expected file rule"),
        }
    }

    #[test]
    fn negated_process_rule() {
        let mut diags = Vec::new();
        let rules = parse_rule("not p:telnetd", 2, 1, &mut diags).unwrap();
        match &rules[0] {
            TypedRule::Process(p) => {
                assert!(p.negation);
                assert_eq!(p.exec.main_target.as_deref(), Some("telnetd"));
            }
            _ => panic!("expected process rule"),
        }
    }

    #[test]
    fn directory_rule_with_pattern_and_inner_negation() {
        let mut diags = Vec::new();
        let rules = parse_rule(
            "d:/etc/ssh -> !r:^sshd_config$ -> r:Protocol && r:2",
            5,
            1,
            &mut diags,
        )
        .unwrap();
        match &rules[0] {
            TypedRule::Directory(d) => {
                assert!(!d.negation);
                let inner = d.file_rule.as_ref().unwrap();
                assert!(inner.negation);
                assert_eq!(inner.exec.target_pattern.as_deref(), Some("^sshd_config$"));
                assert_eq!(inner.content_rules.len(), 2);
            }
            _ => panic!("expected directory rule"),
        }
    }

    #[test]
    fn command_rule_requires_content_layer() {
        let mut diags = Vec::new();
        assert!(parse_rule("c:uname -a", 6, 1, &mut diags).is_none());
        assert_eq!(diags[0].code, ParseErrorCode::InvalidCommandRule);
    }

    #[test]
    fn command_rule_merges_two_content_layers() {
        let mut diags = Vec::new();
        let rules = parse_rule("c:uname -a -> r:Linux -> r:5\\.", 6, 1, &mut diags).unwrap();
        match &rules[0] {
            TypedRule::Command(c) => assert_eq!(c.content_rules.len(), 2),
            _ => panic!("expected command rule"),
        }
    }

    #[test]
    fn stray_double_arrow_is_normalized() {
        let mut diags = Vec::new();
        let rules = parse_rule("c:uname -a -> -> r:Linux", 6, 1, &mut diags).unwrap();
        assert!(diags.is_empty());
        match &rules[0] {
            TypedRule::Command(c) => assert_eq!(c.content_rules.len(), 1),
            _ => panic!("expected command rule"),
        }
    }

    #[test]
    fn registry_rule_with_value_and_literal_content() {
        let mut diags = Vec::new();
        let rules = parse_rule(r"r:HKLM\Software\X -> Enabled -> 1", 7, 1, &mut diags).unwrap();
        match &rules[0] {
            TypedRule::Registry(r) => {
                assert_eq!(r.exec.sub_target.as_deref(), Some("Enabled"));
                assert_eq!(r.content_rules.len(), 1);
            }
            _ => panic!("expected registry rule"),
        }
    }

    #[test]
    fn unknown_rule_type_is_reported() {
        let mut diags = Vec::new();
        assert!(parse_rule("x:nonsense", 1, 1, &mut diags).is_none());
        assert_eq!(diags[0].code, ParseErrorCode::UnknownRuleType);
    }
}
