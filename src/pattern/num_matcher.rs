//! Numeric predicate evaluation (spec §4.4 "Numeric predicate").

use crate::ast::CompareOp;
use regex::Regex;

/// Extracts capture group 1 from the first match of `pattern` in `line`,
/// parses it as a decimal integer, and compares it against `cmp_value`.
/// Returns `None` if the pattern doesn't match the line or the captured
/// text isn't a valid integer — callers treat that as "predicate doesn't
/// hold for this line", not an error (spec §4.4: a line the regex doesn't
/// match never satisfies a numeric predicate).
pub fn numeric_compare(regex: &Regex, line: &str, cmp_op: CompareOp, cmp_value: i64) -> Option<bool> {
    let caps = regex.captures(line)?;
    let captured = caps.get(1)?.as_str();
    let value: i64 = captured.trim().parse().ok()?;
    Some(cmp_op.apply(value, cmp_value))
}
