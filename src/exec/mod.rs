//! Driving a semantic tree against a live target (spec §4.5 "NodeExecutor",
//! §4.6 "TreeExecutor").

pub mod node;
pub mod tree_executor;

pub use node::{ExecutionOutcome, NodeExecutor};
pub use tree_executor::TreeExecutor;
