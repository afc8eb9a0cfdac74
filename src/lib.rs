//! Rust implementation of a Wazuh-style SCA (Security Configuration
//! Assessment) rule engine: parses a compact rule DSL into a semantic tree,
//! then executes that tree against a remote host over an authenticated
//! shell session.
//!
//! # Example
//!
//! ```no_run
//! use sca_rs::policy::Policy;
//! use sca_rs::shell::SshShell;
//! use sca_rs::tree::TreeBuilder;
//! use sca_rs::exec::TreeExecutor;
//!
//! # async fn example(policy: Policy, shell: SshShell) -> anyhow::Result<()> {
//! let mut builder = TreeBuilder::default();
//! let tree = builder.build(&policy);
//! for diag in builder.diagnostics() {
//!     tracing::warn!(%diag, "rule dropped from tree");
//! }
//!
//! let mut executor = TreeExecutor::new(shell, Default::default());
//! executor.connect().await?;
//! let run = executor.execute(&tree).await;
//! executor.close().await;
//!
//! tracing::info!(success = run.success, "policy run finished");
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::module_inception)]

pub use error::{Result, ScaError};
pub use policy::{Check, ElevationPolicy, OsFamily, Policy, TargetHost};
pub use result::{CheckOutcome, CheckResult, RunResult};
pub use tree::{SemanticTree, TreeBuilder};

/// Typed semantic-tree node definitions.
pub mod ast;

/// Error taxonomy shared by the parser and the executor.
pub mod error;

/// Driving a semantic tree against a live target.
pub mod exec;

/// OS-specific probe command generation.
pub mod os;

/// Rule-string parsing into typed AST nodes.
pub mod parser;

/// Content predicate matching (literal / regex / numeric).
pub mod pattern;

/// Policy input types (`Policy`, `Check`, `TargetHost`, `ElevationPolicy`).
pub mod policy;

/// Check/run result types.
pub mod result;

/// Authenticated remote command session.
pub mod shell;

/// The semantic tree and its builder.
pub mod tree;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the tracing subscriber with default settings.
pub fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().json())
        .init();
}
