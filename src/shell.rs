//! Blocking shell execution for descriptor commands

use crate::ast::Command;
use std::io;
use std::path::Path;
use std::process::{self, ExitStatus, Stdio};

/// How descriptor commands are handed to the system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shell {
    program: String,
    args: Vec<String>,
}

/// Result of running a command sequence to completion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub executed: usize,
    pub failed: usize,
}

impl RunSummary {
    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }
}

impl Shell {
    /// Pick the shell and the flag it takes before a command string.
    pub fn new(override_shell: Option<&str>) -> Self {
        if let Some(shell) = override_shell {
            let args = if shell.contains("powershell") || shell.contains("pwsh") {
                vec!["-NoProfile".to_string(), "-Command".to_string()]
            } else if shell.contains("cmd") {
                vec!["/C".to_string()]
            } else {
                vec!["-c".to_string()]
            };
            return Self {
                program: shell.to_string(),
                args,
            };
        }

        #[cfg(windows)]
        {
            Self {
                program: "cmd.exe".to_string(),
                args: vec!["/C".to_string()],
            }
        }

        #[cfg(not(windows))]
        {
            Self {
                program: "/bin/sh".to_string(),
                args: vec!["-c".to_string()],
            }
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Run one command, blocking until it exits. Standard streams are inherited.
    pub fn run(&self, command: &str, cwd: &Path) -> io::Result<ExitStatus> {
        log::debug!("Running `{}` in {}", command, cwd.display());

        process::Command::new(&self.program)
            .args(&self.args)
            .arg(command)
            .current_dir(cwd)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
    }

    /// Run every command in order. A failing command is logged and the
    /// sequence carries on.
    pub fn run_all<'a, I>(&self, commands: I, cwd: &Path) -> RunSummary
    where
        I: IntoIterator<Item = &'a Command>,
    {
        let mut summary = RunSummary::default();

        for command in commands {
            summary.executed += 1;
            match self.run(command.text(), cwd) {
                Ok(status) if status.success() => {}
                Ok(status) => {
                    summary.failed += 1;
                    log::warn!("Command `{}` exited with {}", command.text(), status);
                }
                Err(e) => {
                    summary.failed += 1;
                    log::warn!("Command `{}` could not be started: {}", command.text(), e);
                }
            }
        }

        summary
    }
}

impl Default for Shell {
    fn default() -> Self {
        Self::new(None)
    }
}
