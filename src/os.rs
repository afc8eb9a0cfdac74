//! Probe command generation (spec §4.1 "OSCommands", C1).
//!
//! A pure function surface: given an OS family, produce the command string
//! a given probe needs. No I/O happens here — [`crate::shell`] runs what
//! this module builds.

use crate::error::{ExecErrorCode, ScaError};
use crate::policy::OsFamily;

#[derive(Debug, Clone, Copy)]
pub struct OsCommands {
    pub family: OsFamily,
}

impl OsCommands {
    pub fn new(family: OsFamily) -> Self {
        Self { family }
    }

    pub fn file_exists(&self, path: &str) -> String {
        match self.family {
            OsFamily::Linux => format!("test -f {path} && echo 'exists' || echo 'not exists'"),
            OsFamily::Windows => format!("if exist {path} (echo exists) else (echo not exists)"),
        }
    }

    pub fn directory_exists(&self, dir: &str) -> String {
        match self.family {
            OsFamily::Linux => format!("ls {dir}"),
            OsFamily::Windows => format!("dir {dir} /b"),
        }
    }

    pub fn directory_listing(&self, dir: &str) -> String {
        match self.family {
            OsFamily::Linux => format!("find {dir} -maxdepth 3 -type f"),
            OsFamily::Windows => format!("dir {dir} /s /b"),
        }
    }

    pub fn process_check(&self, name: &str) -> String {
        match self.family {
            OsFamily::Linux => format!("ps aux | grep '{name}' | grep -v grep"),
            OsFamily::Windows => format!("tasklist /FI \"IMAGENAME eq {name}\""),
        }
    }

    /// Windows-only; Linux carries no registry probes (spec §4.1 table).
    pub fn registry_key_exists(&self, key_path: &str) -> crate::error::Result<String> {
        match self.family {
            OsFamily::Windows => Ok(format!("reg query \"{key_path}\"")),
            OsFamily::Linux => Err(ScaError::exec(
                ExecErrorCode::InvalidConfiguration,
                "registry probes are Windows-only",
            )),
        }
    }

    pub fn registry_value(&self, key_path: &str, value_name: &str) -> crate::error::Result<String> {
        match self.family {
            OsFamily::Windows => Ok(format!("reg query \"{key_path}\" /v {value_name}")),
            OsFamily::Linux => Err(ScaError::exec(
                ExecErrorCode::InvalidConfiguration,
                "registry probes are Windows-only",
            )),
        }
    }

    pub fn read_file(&self, path: &str) -> String {
        match self.family {
            OsFamily::Linux => format!("cat {path}"),
            OsFamily::Windows => format!("type {path}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linux_file_exists_probe() {
        let cmds = OsCommands::new(OsFamily::Linux);
        assert_eq!(
            cmds.file_exists("/etc/hosts"),
            "test -f /etc/hosts && echo 'exists' || echo 'not exists'"
        );
    }

    #[test]
    fn windows_registry_probes() {
        let cmds = OsCommands::new(OsFamily::Windows);
        assert_eq!(cmds.registry_key_exists("HKLM\\X").unwrap(), "reg query \"HKLM\\X\"");
        assert_eq!(
            cmds.registry_value("HKLM\\X", "Enabled").unwrap(),
            "reg query \"HKLM\\X\" /v Enabled"
        );
    }

    #[test]
    fn registry_probes_rejected_on_linux() {
        let cmds = OsCommands::new(OsFamily::Linux);
        let err = cmds.registry_key_exists("HKLM\\X").unwrap_err();
        match err {
            ScaError::Exec(code, _) => assert_eq!(code, ExecErrorCode::InvalidConfiguration),
            _ => panic!("expected exec error"),
        }
    }

    #[test]
    fn recursive_listing_caps_depth_at_three() {
        let cmds = OsCommands::new(OsFamily::Linux);
        assert_eq!(cmds.directory_listing("/etc/ssh"), "find /etc/ssh -maxdepth 3 -type f");
    }
}
