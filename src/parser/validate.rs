//! Small validation helpers shared by the rule and content parsers.

use once_cell::sync::Lazy;
use regex::Regex;

/// Whether `pattern` compiles as a regex (spec §4.3 "the regex must compile").
pub fn is_valid_regex(pattern: &str) -> bool {
    Regex::new(pattern).is_ok()
}

static NUMERIC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.*?)\s+compare\s+(<=|>=|==|!=|<|>)\s*(-?\d+)$").unwrap());

/// Parses `<regex> compare <op> <integer>` (spec §4.3 numeric predicate).
/// Returns `(regex, operator, integer)` on success.
pub fn split_numeric_predicate(part: &str) -> Option<(String, String, i64)> {
    let caps = NUMERIC_RE.captures(part.trim())?;
    let regex = caps.get(1)?.as_str().to_string();
    let op = caps.get(2)?.as_str().to_string();
    let num: i64 = caps.get(3)?.as_str().parse().ok()?;
    Some((regex, op, num))
}

/// A regex usable in a numeric predicate must contain at least one capture
/// group (spec §3 "value is a regex with at least one capture group").
pub fn has_capture_group(regex: &Regex) -> bool {
    regex.captures_len() > 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_regex_detection() {
        assert!(is_valid_regex(r"^foo\d+$"));
        assert!(!is_valid_regex(r"^foo(("));
    }

    #[test]
    fn numeric_predicate_splits_cleanly() {
        let (regex, op, num) =
            split_numeric_predicate(r"^\s*MaxAuthTries\s+(\d+) compare <= 4").unwrap();
        assert_eq!(regex, r"^\s*MaxAuthTries\s+(\d+)");
        assert_eq!(op, "<=");
        assert_eq!(num, 4);
    }

    #[test]
    fn numeric_predicate_rejects_malformed() {
        assert!(split_numeric_predicate("no compare keyword here").is_none());
    }

    #[test]
    fn capture_group_required() {
        let with_group = Regex::new(r"(\d+)").unwrap();
        let without_group = Regex::new(r"\d+").unwrap();
        assert!(has_capture_group(&with_group));
        assert!(!has_capture_group(&without_group));
    }
}
