//! Content-rule conjunction parsing (spec §4.3 "Content-rule conjunction").

use crate::ast::{CompareOp, ContentRule};
use crate::error::{Diagnostic, ParseErrorCode};
use crate::parser::validate::{has_capture_group, is_valid_regex, split_numeric_predicate};

/// Which rule kind is asking for content predicates to be parsed. Only
/// registry content allows a bare literal predicate (spec §4.3 "Registry
/// rule": "Value content expressions not introduced by `r:` or `n:` are
/// treated as literal equality tests").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentCaller {
    File,
    Directory,
    Command,
    Registry,
}

/// Splits `rule` on ` && ` and parses each part into a [`ContentRule`].
/// Returns `None` (after recording a diagnostic) on the first malformed part.
pub fn parse_content_conjunction(
    rule: &str,
    caller: ContentCaller,
    check_id: i64,
    rule_index: usize,
    diags: &mut Vec<Diagnostic>,
) -> Option<Vec<ContentRule>> {
    let mut content_rules = Vec::new();

    for raw_part in rule.split(" && ") {
        let part = raw_part.trim();
        let (negation, part) = strip_negation(part);

        if caller == ContentCaller::Registry && !part.starts_with("r:") && !part.starts_with("n:") {
            content_rules.push(ContentRule::literal(part, negation));
            continue;
        }

        if let Some(pattern) = part.strip_prefix("r:") {
            let pattern = pattern.trim();
            if !is_valid_regex(pattern) {
                diags.push(Diagnostic::new(
                    ParseErrorCode::InvalidContentOperator,
                    format!("invalid regex in rule: {part}"),
                    check_id,
                    rule_index,
                ));
                return None;
            }
            content_rules.push(ContentRule::regex(pattern, negation));
        } else if let Some(numeric_part) = part.strip_prefix("n:") {
            match parse_numeric_predicate(numeric_part.trim(), check_id, rule_index, diags) {
                Some((pattern, cmp_op, cmp_value)) => {
                    content_rules.push(ContentRule::numeric(pattern, cmp_op, cmp_value, negation));
                }
                None => return None,
            }
        } else {
            diags.push(Diagnostic::new(
                ParseErrorCode::InvalidContentOperator,
                format!("rule must start with 'r:' or 'n:': {part}"),
                check_id,
                rule_index,
            ));
            return None;
        }
    }

    Some(content_rules)
}

fn strip_negation(part: &str) -> (bool, &str) {
    match part.strip_prefix('!') {
        Some(rest) => (true, rest),
        None => (false, part),
    }
}

fn parse_numeric_predicate(
    part: &str,
    check_id: i64,
    rule_index: usize,
    diags: &mut Vec<Diagnostic>,
) -> Option<(String, CompareOp, i64)> {
    let Some((pattern, op_str, num)) = split_numeric_predicate(part) else {
        diags.push(Diagnostic::new(
            ParseErrorCode::InvalidCompareExpression,
            format!("numeric rule format error: {part}"),
            check_id,
            rule_index,
        ));
        return None;
    };

    let Some(cmp_op) = CompareOp::parse(&op_str) else {
        diags.push(Diagnostic::new(
            ParseErrorCode::InvalidCompareExpression,
            format!("unknown compare operator: {op_str}"),
            check_id,
            rule_index,
        ));
        return None;
    };

    let compiled = match regex::Regex::new(&pattern) {
        Ok(r) => r,
        Err(_) => {
            diags.push(Diagnostic::new(
                ParseErrorCode::InvalidCompareExpression,
                format!("invalid regex in numeric rule: {pattern}"),
                check_id,
                rule_index,
            ));
            return None;
        }
    };

    if !has_capture_group(&compiled) {
        diags.push(Diagnostic::new(
            ParseErrorCode::InvalidCompareExpression,
            format!("numeric rule regex needs a capture group: {pattern}"),
            check_id,
            rule_index,
        ));
        return None;
    }

    Some((pattern, cmp_op, num))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::ContentOp;

    #[test]
    fn parses_regex_predicate() {
        let mut diags = Vec::new();
        let rules = parse_content_conjunction("r:^foo", ContentCaller::Command, 1, 1, &mut diags).unwrap();
        assert_eq!(rules.len(), 1);
        assert!(matches!(rules[0].op, ContentOp::Regex));
        assert!(diags.is_empty());
    }

    #[test]
    fn parses_negated_and_conjoined_predicates() {
        let mut diags = Vec::new();
        let rules = parse_content_conjunction(
            "!r:^#  && r:Protocol && r:2",
            ContentCaller::File,
            5,
            1,
            &mut diags,
        )
        .unwrap();
        assert_eq!(rules.len(), 3);
        assert!(rules[0].negation);
        assert!(!rules[1].negation);
    }

    #[test]
    fn parses_numeric_predicate_with_capture_group() {
        let mut diags = Vec::new();
        let rules = parse_content_conjunction(
            r"n:^\s*MaxAuthTries\s+(\d+) compare <= 4",
            ContentCaller::File,
            3,
            1,
            &mut diags,
        )
        .unwrap();
        assert_eq!(rules.len(), 1);
        match &rules[0].op {
            ContentOp::Numeric { cmp_op, cmp_value } => {
                assert_eq!(*cmp_op, CompareOp::Le);
                assert_eq!(*cmp_value, 4);
            }
            _ => panic!("expected numeric op"),
        }
    }

    #[test]
    fn numeric_predicate_without_capture_group_is_rejected() {
        let mut diags = Vec::new();
        let result = parse_content_conjunction(
            r"n:\d+ compare <= 4",
            ContentCaller::File,
            3,
            1,
            &mut diags,
        );
        assert!(result.is_none());
        assert_eq!(diags[0].code, ParseErrorCode::InvalidCompareExpression);
    }

    #[test]
    fn literal_predicate_allowed_for_registry_only() {
        let mut diags = Vec::new();
        assert!(parse_content_conjunction("enabled", ContentCaller::Registry, 1, 1, &mut diags).is_some());

        let mut diags = Vec::new();
        assert!(parse_content_conjunction("enabled", ContentCaller::Command, 1, 1, &mut diags).is_none());
        assert_eq!(diags[0].code, ParseErrorCode::InvalidContentOperator);
    }

    #[test]
    fn invalid_regex_is_rejected() {
        let mut diags = Vec::new();
        let result = parse_content_conjunction("r:(((", ContentCaller::Command, 1, 1, &mut diags);
        assert!(result.is_none());
        assert_eq!(diags[0].code, ParseErrorCode::InvalidContentOperator);
    }
}
