//! Executes a single [`ExecutionNode`] against a [`RemoteShell`] (spec
//! §4.5 "NodeExecutor", C5). Never propagates an error to its caller — a
//! probe failure becomes a `false`-ish [`ExecutionOutcome`], mirroring
//! `ExecutionNodeExecutor.execute` in the source this module ports.
//! Connection-level failures are the caller's concern ([`detect_os_family`]
//! is the one fallible operation here, and it is fatal to the run).

use regex::Regex;

use crate::ast::{ExecutionNode, NodeKind};
use crate::error::ExecErrorCode;
use crate::os::OsCommands;
use crate::policy::{ElevationPolicy, OsFamily};
use crate::shell::RemoteShell;

/// Outcome of running one probe. `output` carries the probe's raw result
/// text on success, and (for existence probes) the target name even on
/// failure, matching the source's `ExecutionResult`.
#[derive(Debug, Clone, Default)]
pub struct ExecutionOutcome {
    pub success: bool,
    pub output: Option<String>,
    pub error: Option<String>,
}

impl ExecutionOutcome {
    fn ok(output: impl Into<String>) -> Self {
        Self {
            success: true,
            output: Some(output.into()),
            error: None,
        }
    }

    fn fail(error: impl Into<String>) -> Self {
        Self {
            success: false,
            output: None,
            error: Some(error.into()),
        }
    }

    fn fail_with_output(output: impl Into<String>) -> Self {
        Self {
            success: false,
            output: Some(output.into()),
            error: None,
        }
    }
}

/// Runs `uname` once per policy run and classifies the target (spec §4.5:
/// "verifies the policy's declared OS family matches the target").
pub async fn detect_os_family(shell: &mut dyn RemoteShell) -> crate::error::Result<OsFamily> {
    let (stdout, _, exit_code) = shell
        .exec_elevated("uname", true)
        .await
        .map_err(|e| crate::error::ScaError::exec(ExecErrorCode::OsDetectionFailed, e.to_string()))?;

    if exit_code != 0 {
        return Err(crate::error::ScaError::exec(
            ExecErrorCode::OsDetectionFailed,
            "uname exited non-zero",
        ));
    }

    if stdout.contains("Linux") {
        Ok(OsFamily::Linux)
    } else {
        Ok(OsFamily::Windows)
    }
}

pub struct NodeExecutor {
    declared_family: OsFamily,
    actual_family: OsFamily,
    elevation: ElevationPolicy,
}

impl NodeExecutor {
    pub fn new(declared_family: OsFamily, actual_family: OsFamily, elevation: ElevationPolicy) -> Self {
        Self {
            declared_family,
            actual_family,
            elevation,
        }
    }

    /// Runs one node. `dir_context` supplies the directory to list when
    /// `node` is a file node carrying a `target_pattern` (the directory
    /// rule's own target — the pattern lives on the inner node, the
    /// directory lives on the outer one; see spec §4.6 step 2).
    pub async fn execute(
        &self,
        node: &ExecutionNode,
        dir_context: Option<&str>,
        shell: &mut dyn RemoteShell,
    ) -> ExecutionOutcome {
        if self.declared_family != self.actual_family {
            return ExecutionOutcome::fail(ExecErrorCode::MismatchOsType.message());
        }

        let commands = OsCommands::new(self.declared_family);

        match node.kind {
            NodeKind::Directory => self.check_directory_existence(node, &commands, shell).await,
            NodeKind::File => {
                if node.target_pattern.is_some() {
                    self.list_files_with_pattern(node, dir_context, &commands, shell).await
                } else {
                    self.check_file_existence(node, &commands, shell).await
                }
            }
            NodeKind::Command => self.run_command(node, shell).await,
            NodeKind::Process => self.check_process_existence(node, &commands, shell).await,
            NodeKind::Registry => self.check_registry_key(node, &commands, shell).await,
        }
    }

    async fn check_directory_existence(
        &self,
        node: &ExecutionNode,
        commands: &OsCommands,
        shell: &mut dyn RemoteShell,
    ) -> ExecutionOutcome {
        if node.sub_target.is_some() || node.target_pattern.is_some() {
            return ExecutionOutcome::fail(ExecErrorCode::InvalidConfiguration.message());
        }
        let Some(target) = &node.main_target else {
            return ExecutionOutcome::fail(ExecErrorCode::InvalidConfiguration.message());
        };

        let cmd = commands.directory_exists(target);
        match shell.exec_elevated(&cmd, self.elevation.directory_list).await {
            Ok((stdout, _, _)) => {
                if !stdout.is_empty() {
                    ExecutionOutcome::ok(target.clone())
                } else {
                    ExecutionOutcome::fail_with_output(target.clone())
                }
            }
            Err(e) => ExecutionOutcome::fail(format!("{}: {e}", ExecErrorCode::ShellExecFailed.message())),
        }
    }

    async fn check_file_existence(
        &self,
        node: &ExecutionNode,
        commands: &OsCommands,
        shell: &mut dyn RemoteShell,
    ) -> ExecutionOutcome {
        if node.sub_target.is_some() {
            return ExecutionOutcome::fail(ExecErrorCode::InvalidConfiguration.message());
        }
        let Some(target) = &node.main_target else {
            return ExecutionOutcome::fail(ExecErrorCode::InvalidConfiguration.message());
        };

        let cmd = commands.file_exists(target);
        match shell.exec_elevated(&cmd, self.elevation.file_exists).await {
            Ok((stdout, _, _)) => {
                if stdout.contains("not exists") {
                    ExecutionOutcome::fail_with_output(target.clone())
                } else if stdout.contains("exists") {
                    ExecutionOutcome::ok(target.clone())
                } else {
                    ExecutionOutcome::fail("unexpected output from file existence check")
                }
            }
            Err(e) => ExecutionOutcome::fail(format!("{}: {e}", ExecErrorCode::ShellExecFailed.message())),
        }
    }

    async fn list_files_with_pattern(
        &self,
        node: &ExecutionNode,
        dir_context: Option<&str>,
        commands: &OsCommands,
        shell: &mut dyn RemoteShell,
    ) -> ExecutionOutcome {
        let Some(pattern) = &node.target_pattern else {
            return ExecutionOutcome::fail(ExecErrorCode::InvalidConfiguration.message());
        };
        let Some(dir) = dir_context else {
            return ExecutionOutcome::fail(ExecErrorCode::InvalidConfiguration.message());
        };

        let re = match Regex::new(pattern) {
            Ok(r) => r,
            Err(_) => return ExecutionOutcome::fail(ExecErrorCode::PatternMatchFailed.message()),
        };

        let cmd = commands.directory_listing(dir);
        match shell.exec_elevated(&cmd, self.elevation.directory_list).await {
            Ok((stdout, _, _)) => {
                if stdout.is_empty() {
                    return ExecutionOutcome::fail("no output from command");
                }
                let files: Vec<&str> = stdout
                    .lines()
                    .map(|l| l.trim())
                    .filter(|l| !l.is_empty() && re.is_match(l))
                    .collect();
                if files.is_empty() {
                    return ExecutionOutcome::fail("no files matched the pattern");
                }
                let json = serde_json::to_string(&files).unwrap_or_default();
                ExecutionOutcome::ok(json)
            }
            Err(e) => ExecutionOutcome::fail(format!("{}: {e}", ExecErrorCode::ShellExecFailed.message())),
        }
    }

    async fn run_command(&self, node: &ExecutionNode, shell: &mut dyn RemoteShell) -> ExecutionOutcome {
        if node.sub_target.is_some() || node.target_pattern.is_some() {
            return ExecutionOutcome::fail(ExecErrorCode::InvalidConfiguration.message());
        }
        let Some(cmd_text) = &node.main_target else {
            return ExecutionOutcome::fail(ExecErrorCode::InvalidConfiguration.message());
        };

        match shell.exec_elevated(cmd_text, self.elevation.command).await {
            Ok((stdout, stderr, _)) => match (stdout.is_empty(), stderr.is_empty()) {
                (false, false) => ExecutionOutcome::ok(format!("{stdout}\n{stderr}")),
                (false, true) => ExecutionOutcome::ok(stdout),
                (true, false) => ExecutionOutcome::ok(stderr),
                (true, true) => ExecutionOutcome::fail("command failed with no result"),
            },
            Err(e) => ExecutionOutcome::fail(format!("{}: {e}", ExecErrorCode::ShellExecFailed.message())),
        }
    }

    async fn check_process_existence(
        &self,
        node: &ExecutionNode,
        commands: &OsCommands,
        shell: &mut dyn RemoteShell,
    ) -> ExecutionOutcome {
        if node.sub_target.is_some() {
            return ExecutionOutcome::fail(ExecErrorCode::InvalidConfiguration.message());
        }
        let Some(target) = node.main_target.as_deref().or(node.target_pattern.as_deref()) else {
            return ExecutionOutcome::fail(ExecErrorCode::InvalidConfiguration.message());
        };

        let cmd = commands.process_check(target);
        match shell.exec_elevated(&cmd, self.elevation.process_check).await {
            Ok((stdout, _, _)) => {
                if !stdout.is_empty() {
                    ExecutionOutcome::ok(target)
                } else {
                    ExecutionOutcome::fail_with_output(target)
                }
            }
            Err(e) => ExecutionOutcome::fail(format!("{}: {e}", ExecErrorCode::ShellExecFailed.message())),
        }
    }

    async fn check_registry_key(
        &self,
        node: &ExecutionNode,
        commands: &OsCommands,
        shell: &mut dyn RemoteShell,
    ) -> ExecutionOutcome {
        let Some(key_path) = &node.main_target else {
            return ExecutionOutcome::fail(ExecErrorCode::InvalidConfiguration.message());
        };

        let cmd = match &node.sub_target {
            None => commands.registry_key_exists(key_path),
            Some(value_name) => commands.registry_value(key_path, value_name),
        };
        let cmd = match cmd {
            Ok(c) => c,
            Err(e) => return ExecutionOutcome::fail(e.to_string()),
        };

        match shell.exec_elevated(&cmd, self.elevation.registry).await {
            Ok((stdout, _, _)) => {
                if !stdout.is_empty() {
                    ExecutionOutcome::ok(stdout)
                } else {
                    ExecutionOutcome::fail_with_output(stdout)
                }
            }
            Err(e) => ExecutionOutcome::fail(format!("{}: {e}", ExecErrorCode::ShellExecFailed.message())),
        }
    }
}
