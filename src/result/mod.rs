//! Execution results (spec §6.4 "Output").

use serde::{Deserialize, Serialize};

/// Outcome of a single check's condition reduction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckOutcome {
    Pass,
    Fail,
}

impl CheckOutcome {
    pub fn from_bool(passed: bool) -> Self {
        if passed {
            Self::Pass
        } else {
            Self::Fail
        }
    }
}

/// Result of one check: the reduced outcome plus the per-rule results the
/// condition was reduced over, so a caller can see which rule(s) drove the
/// outcome (spec §6.4).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResult {
    pub check_id: i64,
    pub condition: String,
    pub result: CheckOutcome,
    pub rule_results: Vec<bool>,
}

impl CheckResult {
    pub fn new(check_id: i64, condition: &str, result: bool, rule_results: Vec<bool>) -> Self {
        Self {
            check_id,
            condition: condition.to_string(),
            result: CheckOutcome::from_bool(result),
            rule_results,
        }
    }
}

/// Top-level run outcome (spec §6.4: `{success, results, error}`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    pub success: bool,
    pub results: Vec<CheckResult>,
    pub error: Option<String>,
}

impl RunResult {
    pub fn ok(results: Vec<CheckResult>) -> Self {
        Self {
            success: true,
            results,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            results: Vec::new(),
            error: Some(error.into()),
        }
    }
}
