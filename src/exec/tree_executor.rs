//! Top-level driver: walks a [`SemanticTree`] check by check, rule by rule
//! (spec §4.6 "TreeExecutor", C6).

use crate::ast::{CommandRule, ContentRule, DirectoryRule, FileRule, ProcessRule, RegistryRule, TypedRule};
use crate::exec::node::{detect_os_family, NodeExecutor};
use crate::os::OsCommands;
use crate::pattern::body_matches;
use crate::policy::ElevationPolicy;
use crate::result::{CheckResult, RunResult};
use crate::shell::RemoteShell;
use crate::tree::SemanticTree;

/// Drives one [`SemanticTree`] over one [`RemoteShell`] session. Owns the
/// session for the run's lifetime (spec §4.2: "Each policy run uses one
/// long-lived session").
pub struct TreeExecutor<S: RemoteShell> {
    shell: S,
    elevation: ElevationPolicy,
}

impl<S: RemoteShell> TreeExecutor<S> {
    pub fn new(shell: S, elevation: ElevationPolicy) -> Self {
        Self { shell, elevation }
    }

    pub async fn connect(&mut self) -> crate::error::Result<()> {
        self.shell.connect().await
    }

    pub async fn close(&mut self) {
        self.shell.close().await;
    }

    /// Executes every check in `tree` in order. A connect/OS-detection
    /// failure is catastrophic and aborts the run (spec §4.6: "A
    /// catastrophic failure ... aborts the run"); a per-probe failure
    /// yields `false` for that rule and execution continues.
    pub async fn execute(&mut self, tree: &SemanticTree) -> RunResult {
        let actual_family = match detect_os_family(&mut self.shell).await {
            Ok(f) => f,
            Err(e) => return RunResult::failed(e.to_string()),
        };

        let node_executor = NodeExecutor::new(tree.os_type, actual_family, self.elevation);
        let commands = OsCommands::new(tree.os_type);

        let mut results = Vec::with_capacity(tree.checks.len());
        for check in &tree.checks {
            let mut rule_results = Vec::with_capacity(check.rules.len());
            for rule in &check.rules {
                let passed = self.execute_rule(&node_executor, &commands, rule).await;
                rule_results.push(passed);
            }
            let outcome = check.condition.reduce(&rule_results);
            let condition_str = match check.condition {
                crate::ast::Condition::All => "all",
                crate::ast::Condition::Any => "any",
                crate::ast::Condition::None => "none",
            };
            results.push(CheckResult::new(check.id, condition_str, outcome, rule_results));
        }

        RunResult::ok(results)
    }

    async fn execute_rule(&mut self, node_executor: &NodeExecutor, commands: &OsCommands, rule: &TypedRule) -> bool {
        match rule {
            TypedRule::File(f) => self.execute_file_rule(node_executor, commands, f).await,
            TypedRule::Directory(d) => self.execute_directory_rule(node_executor, commands, d).await,
            TypedRule::Command(c) => self.execute_command_rule(node_executor, c).await,
            TypedRule::Process(p) => self.execute_process_rule(node_executor, p).await,
            TypedRule::Registry(r) => self.execute_registry_rule(node_executor, r).await,
        }
    }

    async fn execute_file_rule(&mut self, node_executor: &NodeExecutor, commands: &OsCommands, rule: &FileRule) -> bool {
        let outcome = node_executor.execute(&rule.exec, None, &mut self.shell).await;
        let passed = if !outcome.success {
            false
        } else if rule.content_rules.is_empty() {
            true
        } else {
            self.check_file_content(commands, outcome.output.as_deref().unwrap_or(""), &rule.content_rules)
                .await
        };
        if rule.negation {
            !passed
        } else {
            passed
        }
    }

    async fn execute_directory_rule(
        &mut self,
        node_executor: &NodeExecutor,
        commands: &OsCommands,
        rule: &DirectoryRule,
    ) -> bool {
        let dir_outcome = node_executor.execute(&rule.exec, None, &mut self.shell).await;
        if !dir_outcome.success {
            return if rule.negation { true } else { false };
        }

        let Some(inner) = &rule.file_rule else {
            return if rule.negation {
                !dir_outcome.success
            } else {
                dir_outcome.success
            };
        };

        let dir_path = rule.exec.main_target.as_deref();
        let file_outcome = node_executor.execute(&inner.exec, dir_path, &mut self.shell).await;

        let inner_passed = if !file_outcome.success {
            false
        } else if inner.content_rules.is_empty() {
            true
        } else {
            self.check_file_content(commands, file_outcome.output.as_deref().unwrap_or(""), &inner.content_rules)
                .await
        };

        let inner_passed = if inner.negation { !inner_passed } else { inner_passed };
        if rule.negation {
            !inner_passed
        } else {
            inner_passed
        }
    }

    async fn execute_command_rule(&mut self, node_executor: &NodeExecutor, rule: &CommandRule) -> bool {
        let outcome = node_executor.execute(&rule.exec, None, &mut self.shell).await;
        let passed = if !outcome.success {
            false
        } else if rule.content_rules.is_empty() {
            true
        } else {
            body_matches(outcome.output.as_deref().unwrap_or(""), &rule.content_rules).unwrap_or(false)
        };
        if rule.negation {
            !passed
        } else {
            passed
        }
    }

    async fn execute_process_rule(&mut self, node_executor: &NodeExecutor, rule: &ProcessRule) -> bool {
        let outcome = node_executor.execute(&rule.exec, None, &mut self.shell).await;
        if rule.negation {
            !outcome.success
        } else {
            outcome.success
        }
    }

    async fn execute_registry_rule(&mut self, node_executor: &NodeExecutor, rule: &RegistryRule) -> bool {
        let outcome = node_executor.execute(&rule.exec, None, &mut self.shell).await;
        let passed = if !outcome.success {
            false
        } else if rule.content_rules.is_empty() {
            true
        } else {
            body_matches(outcome.output.as_deref().unwrap_or(""), &rule.content_rules).unwrap_or(false)
        };
        if rule.negation {
            !passed
        } else {
            passed
        }
    }

    /// `output` is either a single path or a JSON array of paths (spec
    /// §4.4 "File-content rule over a file set"); reads each file's
    /// content and matches existentially across the set.
    async fn check_file_content(&mut self, commands: &OsCommands, output: &str, content_rules: &[ContentRule]) -> bool {
        let paths = parse_path_list(output);
        if paths.is_empty() {
            return false;
        }

        for path in paths {
            let cmd = commands.read_file(&path);
            let read = self.shell.exec_elevated(&cmd, self.elevation.file_read).await;
            let Ok((stdout, _, exit_code)) = read else {
                continue;
            };
            if exit_code != 0 {
                continue;
            }
            if body_matches(&stdout, content_rules).unwrap_or(false) {
                return true;
            }
        }
        false
    }
}

fn parse_path_list(output: &str) -> Vec<String> {
    match serde_json::from_str::<Vec<String>>(output) {
        Ok(list) => list,
        Err(_) if output.is_empty() => Vec::new(),
        Err(_) => vec![output.to_string()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{CompareOp, ConditionNode};
    use crate::parser::parse_rule;
    use crate::policy::OsFamily;
    use crate::shell::mock::MockShell;

    fn tree_from_rules(os_type: OsFamily, condition: crate::ast::Condition, rule_strs: &[&str]) -> SemanticTree {
        let mut diags = Vec::new();
        let mut rules = Vec::new();
        for (i, r) in rule_strs.iter().enumerate() {
            if let Some(parsed) = parse_rule(r, 1, i, &mut diags) {
                rules.extend(parsed);
            }
        }
        assert!(diags.is_empty(), "unexpected diagnostics: {diags:?}");
        SemanticTree::new(
            os_type,
            vec![ConditionNode {
                id: 1,
                condition,
                rules,
            }],
        )
    }

    #[tokio::test]
    async fn file_existence_check_end_to_end() {
        let mut shell = MockShell::new();
        shell.push_ok("Linux", "", 0); // uname
        shell.push_ok("exists", "", 0); // test -f

        let tree = tree_from_rules(OsFamily::Linux, crate::ast::Condition::All, &["f:/etc/hosts"]);
        let mut executor = TreeExecutor::new(shell, ElevationPolicy::default());
        let result = executor.execute(&tree).await;

        assert!(result.success);
        assert_eq!(result.results[0].rule_results, vec![true]);
    }

    #[tokio::test]
    async fn negated_process_check_passes_when_absent() {
        let mut shell = MockShell::new();
        shell.push_ok("Linux", "", 0); // uname
        shell.push_ok("", "", 1); // ps aux | grep telnetd -> empty

        let tree = tree_from_rules(OsFamily::Linux, crate::ast::Condition::All, &["not p:telnetd"]);
        let mut executor = TreeExecutor::new(shell, ElevationPolicy::default());
        let result = executor.execute(&tree).await;

        assert!(result.results[0].result == crate::result::CheckOutcome::Pass);
    }

    #[tokio::test]
    async fn numeric_content_predicate_over_command_output() {
        let mut shell = MockShell::new();
        shell.push_ok("Linux", "", 0); // uname
        shell.push_ok("MaxAuthTries 4\n", "", 0); // command output

        let tree = tree_from_rules(
            OsFamily::Linux,
            crate::ast::Condition::All,
            &[r"c:grep MaxAuthTries /etc/ssh/sshd_config -> n:^MaxAuthTries\s+(\d+) compare <= 4"],
        );
        let mut executor = TreeExecutor::new(shell, ElevationPolicy::default());
        let result = executor.execute(&tree).await;

        assert_eq!(result.results[0].rule_results, vec![true]);
    }

    #[tokio::test]
    async fn directory_rule_with_pattern_reads_matching_files() {
        let mut shell = MockShell::new();
        shell.push_ok("Linux", "", 0); // uname
        shell.push_ok("/etc/ssh\n", "", 0); // directory exists
        shell.push_ok("/etc/ssh/sshd_config\n", "", 0); // listing (already filtered by regex)
        shell.push_ok("Protocol 2\n", "", 0); // file read

        let tree = tree_from_rules(
            OsFamily::Linux,
            crate::ast::Condition::All,
            &["d:/etc/ssh -> r:sshd_config -> r:Protocol && r:2"],
        );
        let mut executor = TreeExecutor::new(shell, ElevationPolicy::default());
        let result = executor.execute(&tree).await;

        assert_eq!(result.results[0].rule_results, vec![true]);
    }

    #[tokio::test]
    async fn any_condition_passes_if_one_rule_passes() {
        let mut shell = MockShell::new();
        shell.push_ok("Linux", "", 0); // uname
        shell.push_ok("not exists", "", 0); // f:/etc/missing
        shell.push_ok("", "", 1); // p:sshd -> absent, so negated rule check below instead

        let tree = tree_from_rules(
            OsFamily::Linux,
            crate::ast::Condition::Any,
            &["f:/etc/missing", "not p:telnetd"],
        );
        let mut executor = TreeExecutor::new(shell, ElevationPolicy::default());
        let result = executor.execute(&tree).await;

        assert_eq!(result.results[0].rule_results, vec![false, true]);
        assert_eq!(result.results[0].result, crate::result::CheckOutcome::Pass);
    }

    #[test]
    fn compare_op_roundtrip_used_by_parser() {
        assert_eq!(CompareOp::parse("<=").unwrap().apply(3, 4), true);
    }

    #[test]
    fn parse_path_list_handles_both_shapes() {
        assert_eq!(parse_path_list("/etc/hosts"), vec!["/etc/hosts".to_string()]);
        assert_eq!(
            parse_path_list(r#"["/a","/b"]"#),
            vec!["/a".to_string(), "/b".to_string()]
        );
        assert_eq!(parse_path_list(""), Vec::<String>::new());
    }
}
