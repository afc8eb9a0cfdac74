//! An authenticated remote command session (spec §4.2 "RemoteShell", C2).

pub mod mock;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{ExecErrorCode, ScaError};
use crate::policy::{OsFamily, TargetHost};

static SUDO_PROMPT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[sudo\] password for .+?: ?").unwrap());

/// `(stdout, stderr, exit_code)`, both streams already trimmed (spec §4.2).
pub type ExecOutput = (String, String, i32);

/// Contract a [`crate::exec::node::NodeExecutor`] drives. One policy run
/// owns one session bound to one host (spec §4.2: "Each policy run uses
/// one long-lived session").
#[async_trait]
pub trait RemoteShell: Send + Sync {
    async fn connect(&mut self) -> crate::error::Result<()>;

    /// Runs `cmd` to completion; no streaming consumer (spec §4.2).
    async fn exec(&mut self, cmd: &str) -> crate::error::Result<ExecOutput>;

    /// On Linux, when `elevate` is true, prefixes the `sudo -S` wrapper and
    /// strips the prompt line from stderr; otherwise delegates to `exec`.
    async fn exec_elevated(&mut self, cmd: &str, elevate: bool) -> crate::error::Result<ExecOutput>;

    /// Idempotent.
    async fn close(&mut self);
}

fn elevation_wrapper(cmd: &str, password: &str) -> String {
    format!("export LC_ALL=C && echo {password} | sudo -S {cmd}")
}

fn strip_sudo_prompt(stderr: &str) -> String {
    SUDO_PROMPT.replace(stderr, "").trim().to_string()
}

/// Trims trailing whitespace from every line of `output`, then the whole
/// string (spec §4.2: streams are "returned stripped of leading/trailing
/// whitespace"; ported from `whitespace_helper.py`'s per-line trim).
fn normalize_output(output: &str) -> String {
    output
        .lines()
        .map(|line| line.trim_end())
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// `async-ssh2-tokio`-backed [`RemoteShell`].
pub struct SshShell {
    host: TargetHost,
    family: OsFamily,
    client: Option<async_ssh2_tokio::Client>,
}

impl SshShell {
    pub fn new(host: TargetHost, family: OsFamily) -> Self {
        Self {
            host,
            family,
            client: None,
        }
    }
}

#[async_trait]
impl RemoteShell for SshShell {
    async fn connect(&mut self) -> crate::error::Result<()> {
        use async_ssh2_tokio::{AuthMethod, Client, ServerCheckMethod};

        let auth = AuthMethod::with_password(&self.host.password);
        let client = Client::connect(
            (self.host.host.as_str(), self.host.port),
            &self.host.user,
            auth,
            ServerCheckMethod::NoCheck,
        )
        .await
        .map_err(|e| {
            let msg = e.to_string();
            if msg.to_lowercase().contains("auth") {
                ScaError::AuthFailed(msg)
            } else {
                ScaError::Connection(msg)
            }
        })?;

        self.client = Some(client);
        tracing::info!(host = %self.host.host, port = self.host.port, "connected to target");
        Ok(())
    }

    async fn exec(&mut self, cmd: &str) -> crate::error::Result<ExecOutput> {
        let client = self
            .client
            .as_ref()
            .ok_or_else(|| ScaError::Connection("session not established".into()))?;

        tracing::debug!(command = %cmd, "executing command");

        let result = client
            .execute(cmd)
            .await
            .map_err(|e| ScaError::exec(ExecErrorCode::ShellExecFailed, e.to_string()))?;

        Ok((
            normalize_output(&result.stdout),
            normalize_output(&result.stderr),
            result.exit_status as i32,
        ))
    }

    async fn exec_elevated(&mut self, cmd: &str, elevate: bool) -> crate::error::Result<ExecOutput> {
        if !elevate || self.family != OsFamily::Linux {
            return self.exec(cmd).await;
        }

        let wrapped = elevation_wrapper(cmd, &self.host.password);
        let (stdout, stderr, exit_code) = self.exec(&wrapped).await?;
        Ok((stdout, strip_sudo_prompt(&stderr), exit_code))
    }

    async fn close(&mut self) {
        if self.client.take().is_some() {
            tracing::info!(host = %self.host.host, "session closed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elevation_wraps_command_with_locale_and_sudo() {
        let wrapped = elevation_wrapper("cat /etc/shadow", "hunter2");
        assert_eq!(wrapped, "export LC_ALL=C && echo hunter2 | sudo -S cat /etc/shadow");
    }

    #[test]
    fn sudo_prompt_is_stripped_from_stderr() {
        let stderr = "[sudo] password for root: ";
        assert_eq!(strip_sudo_prompt(stderr), "");
        let stderr = "[sudo] password for root: some actual error";
        assert_eq!(strip_sudo_prompt(stderr), "some actual error");
    }

    #[test]
    fn normalize_output_trims_each_line_and_the_whole_string() {
        let raw = "  Protocol 2   \nKeepAlive 2  \n  \n";
        assert_eq!(normalize_output(raw), "Protocol 2\nKeepAlive 2");
    }
}
