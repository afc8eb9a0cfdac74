//! Policy input types (spec §3, §6.1, §6.3).
//!
//! These are plain `serde`-derived structs: loading a policy from disk and
//! decoding its encoding is an external collaborator's job (spec §1). A
//! caller is free to deserialize with whatever `serde`-compatible format
//! crate it likes (e.g. `serde_yaml::from_str::<Policy>(text)`); this crate
//! only defines the shape, mirroring the way the teacher's `rule::Rule` type
//! is a pure data shape handed to `tree::Tree::from_rule` without the
//! teacher owning file I/O either.

use serde::{Deserialize, Serialize};

/// Target OS family a policy is declared for (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OsFamily {
    Linux,
    Windows,
}

/// A single check: a logical condition over a set of raw rule strings
/// (spec §3 `Check`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Check {
    pub id: i64,
    pub condition: String,
    pub rules: Vec<String>,
}

/// An ordered sequence of checks plus the OS family tag (spec §3 `Policy`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Policy {
    pub os_type: OsFamily,
    pub checks: Vec<Check>,
}

fn default_port() -> u16 {
    22
}

/// Target-host descriptor (spec §6.3). Authentication is password-based;
/// key-based authentication is a permitted extension (not implemented here).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetHost {
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub user: String,
    pub password: String,
}

/// Per-probe-kind elevation policy (spec §4.1: "the default for probes that
/// need to traverse protected paths ... is *on*").
#[derive(Debug, Clone, Copy)]
pub struct ElevationPolicy {
    pub file_exists: bool,
    pub directory_list: bool,
    pub file_read: bool,
    pub command: bool,
    pub process_check: bool,
    pub registry: bool,
}

impl Default for ElevationPolicy {
    fn default() -> Self {
        Self {
            file_exists: true,
            directory_list: true,
            file_read: true,
            command: true,
            process_check: true,
            registry: false,
        }
    }
}
