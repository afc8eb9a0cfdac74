//! Stable error taxonomy shared by the parser and the executor (spec §4.7).
//!
//! Two namespaces: [`ParseErrorCode`] for diagnostics raised while building
//! the semantic tree, [`ExecErrorCode`] for failures raised while running it.
//! Both carry a short machine-readable code (`Exxx`) alongside the
//! human-readable message, following the `(code, message)` pairing of
//! `SemanticTreeError`/`ExecutionError` in the source this crate reimplements.

use thiserror::Error;

/// Parse-time diagnostic codes (spec §4.7, "Parse" namespace).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorCode {
    InvalidId,
    InvalidCondition,
    UnknownRuleType,
    InvalidFileRule,
    InvalidDirectoryRule,
    InvalidCommandRule,
    InvalidProcessRule,
    InvalidRegistryRule,
    InvalidContentOperator,
    InvalidCompareExpression,
    UnknownError,
}

impl ParseErrorCode {
    /// The stable `Exxx` code.
    pub fn code(self) -> &'static str {
        match self {
            Self::InvalidId => "E001",
            Self::InvalidCondition => "E002",
            Self::UnknownRuleType => "E003",
            Self::InvalidFileRule => "E004",
            Self::InvalidDirectoryRule => "E005",
            Self::InvalidCommandRule => "E006",
            Self::InvalidProcessRule => "E007",
            Self::InvalidRegistryRule => "E008",
            Self::InvalidContentOperator => "E009",
            Self::InvalidCompareExpression => "E010",
            Self::UnknownError => "E011",
        }
    }

    /// The fixed human-readable message for this code.
    pub fn message(self) -> &'static str {
        match self {
            Self::InvalidId => "Invalid id",
            Self::InvalidCondition => "Invalid condition",
            Self::UnknownRuleType => "Unknown rule type",
            Self::InvalidFileRule => "Invalid file rule",
            Self::InvalidDirectoryRule => "Invalid directory rule",
            Self::InvalidCommandRule => "Invalid command rule",
            Self::InvalidProcessRule => "Invalid process rule",
            Self::InvalidRegistryRule => "Invalid registry rule",
            Self::InvalidContentOperator => "Invalid content operator",
            Self::InvalidCompareExpression => "Invalid compare expression",
            Self::UnknownError => "Unknown error",
        }
    }
}

/// A single parser diagnostic, keyed by `(check_id, rule_index)` per spec §4.3.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub code: ParseErrorCode,
    pub detail: String,
    pub check_id: i64,
    /// 1-based rule index within the check; 0 for check-level diagnostics
    /// (invalid id / invalid condition).
    pub rule_index: usize,
}

impl Diagnostic {
    pub fn new(code: ParseErrorCode, detail: impl Into<String>, check_id: i64, rule_index: usize) -> Self {
        Self {
            code,
            detail: detail.into(),
            check_id,
            rule_index,
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({}): {} [check {}, rule {}]",
            self.code.code(),
            self.code.message(),
            self.detail,
            self.check_id,
            self.rule_index
        )
    }
}

/// Execution-time failure codes (spec §4.7, "Execute" namespace).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecErrorCode {
    MismatchOsType,
    InvalidNodeType,
    InvalidConfiguration,
    ShellExecFailed,
    OsDetectionFailed,
    CommandFailed,
    FileNotFound,
    DirectoryNotFound,
    ProcessNotFound,
    RegistryKeyNotFound,
    RegistryAccessFailed,
    FileReadFailed,
    InvalidContentOperator,
    NumericCompareFailed,
    PatternMatchFailed,
    InvalidFileList,
    UnknownError,
}

impl ExecErrorCode {
    pub fn code(self) -> &'static str {
        match self {
            Self::MismatchOsType => "E101",
            Self::InvalidNodeType => "E102",
            Self::InvalidConfiguration => "E103",
            Self::ShellExecFailed => "E104",
            Self::OsDetectionFailed => "E105",
            Self::CommandFailed => "E106",
            Self::FileNotFound => "E107",
            Self::DirectoryNotFound => "E108",
            Self::ProcessNotFound => "E109",
            Self::RegistryKeyNotFound => "E110",
            Self::RegistryAccessFailed => "E111",
            Self::FileReadFailed => "E112",
            Self::InvalidContentOperator => "E113",
            Self::NumericCompareFailed => "E114",
            Self::PatternMatchFailed => "E115",
            Self::InvalidFileList => "E116",
            Self::UnknownError => "E117",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Self::MismatchOsType => "Mismatch in OS types",
            Self::InvalidNodeType => "Invalid node type",
            Self::InvalidConfiguration => "Invalid configuration for node type",
            Self::ShellExecFailed => "Shell command execution failed",
            Self::OsDetectionFailed => "Failed to determine the actual OS type",
            Self::CommandFailed => "Command execution failed",
            Self::FileNotFound => "File not found during execution",
            Self::DirectoryNotFound => "Directory not found during execution",
            Self::ProcessNotFound => "Process not found",
            Self::RegistryKeyNotFound => "Registry key not found",
            Self::RegistryAccessFailed => "Failed to access registry key",
            Self::FileReadFailed => "Failed to read file content",
            Self::InvalidContentOperator => "Invalid content operator provided",
            Self::NumericCompareFailed => "Failed to compare numeric values",
            Self::PatternMatchFailed => "Pattern match failed",
            Self::InvalidFileList => "Invalid or empty file list provided",
            Self::UnknownError => "Unknown error occurred during execution",
        }
    }
}

/// Top-level error type for fatal-to-run failures (spec §7): connection/auth
/// failure and OS-detection failure abort the run. Local-to-rule failures
/// never surface as this type — they're folded into a `false` rule result.
#[derive(Error, Debug)]
pub enum ScaError {
    #[error("{code}: {detail}", code = .0.code())]
    Exec(ExecErrorCode, String),

    #[error("ssh connection failed: {0}")]
    Connection(String),

    #[error("authentication failed: {0}")]
    AuthFailed(String),

    #[error("regex error: {0}")]
    Regex(#[from] regex::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ScaError {
    pub fn exec(code: ExecErrorCode, detail: impl Into<String>) -> Self {
        Self::Exec(code, detail.into())
    }
}

/// Result alias for fallible operations in this crate.
pub type Result<T> = std::result::Result<T, ScaError>;
