//! An in-memory [`RemoteShell`] for tests, so NodeExecutor/TreeExecutor
//! logic can be exercised without a real host (spec §7: "the RemoteShell
//! trait is mocked in-process").

use std::collections::VecDeque;

use async_trait::async_trait;

use super::{ExecOutput, RemoteShell};
use crate::error::ScaError;

/// Replays canned `(stdout, stderr, exit_code)` triples in call order and
/// records every command it was asked to run.
#[derive(Debug, Default)]
pub struct MockShell {
    responses: VecDeque<crate::error::Result<ExecOutput>>,
    pub calls: Vec<(String, bool)>,
    connected: bool,
}

impl MockShell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_ok(&mut self, stdout: impl Into<String>, stderr: impl Into<String>, exit_code: i32) -> &mut Self {
        self.responses.push_back(Ok((stdout.into(), stderr.into(), exit_code)));
        self
    }

    pub fn push_err(&mut self, err: ScaError) -> &mut Self {
        self.responses.push_back(Err(err));
        self
    }
}

#[async_trait]
impl RemoteShell for MockShell {
    async fn connect(&mut self) -> crate::error::Result<()> {
        self.connected = true;
        Ok(())
    }

    async fn exec(&mut self, cmd: &str) -> crate::error::Result<ExecOutput> {
        self.calls.push((cmd.to_string(), false));
        self.responses
            .pop_front()
            .unwrap_or_else(|| Ok((String::new(), String::new(), 0)))
    }

    async fn exec_elevated(&mut self, cmd: &str, elevate: bool) -> crate::error::Result<ExecOutput> {
        self.calls.push((cmd.to_string(), elevate));
        self.responses
            .pop_front()
            .unwrap_or_else(|| Ok((String::new(), String::new(), 0)))
    }

    async fn close(&mut self) {
        self.connected = false;
    }
}
