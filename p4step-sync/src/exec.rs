//! Execution boundary: running commands and removing the workspace.
//!
//! The plan driver only talks to [`CommandRunner`] and [`WorkspaceFs`];
//! [`LocalRunner`] is the implementation that runs p4 on this machine.

use std::io::{ErrorKind, Write};
use std::path::Path;
use std::process::{Child, Command, Stdio};

use crate::error::{io_err, SyncError};
use crate::plan::ShellCommand;

/// Exit status and captured output of one command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(stdout: impl Into<String>) -> Self {
        CommandOutput {
            exit_code: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn failure(code: i32, stderr: impl Into<String>) -> Self {
        CommandOutput {
            exit_code: Some(code),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Runs one command to completion.
pub trait CommandRunner {
    fn run(&mut self, cmd: &ShellCommand) -> Result<CommandOutput, SyncError>;
}

/// Workspace directory operations.
pub trait WorkspaceFs {
    /// Remove `path` and everything below it. A missing directory is not an error.
    fn remove_directory(&mut self, path: &Path) -> Result<(), SyncError>;
}

/// Runs commands as local child processes.
///
/// The working directory is created when missing, so a sync after a wipe
/// (or a first run) has somewhere to run.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalRunner;

impl CommandRunner for LocalRunner {
    fn run(&mut self, cmd: &ShellCommand) -> Result<CommandOutput, SyncError> {
        let shown = cmd.display_redacted();
        let Some((program, args)) = cmd.argv.split_first() else {
            return Err(SyncError::Spawn {
                command: shown,
                source: std::io::Error::new(ErrorKind::InvalidInput, "empty argv"),
            });
        };

        std::fs::create_dir_all(&cmd.workdir).map_err(|e| io_err(&cmd.workdir, e))?;

        let stdin = if cmd.stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        };
        let mut child = Command::new(program)
            .args(args)
            .current_dir(&cmd.workdir)
            .stdin(stdin)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| SyncError::Spawn {
                command: shown.clone(),
                source,
            })?;

        if let (Some(payload), Some(mut pipe)) = (cmd.stdin.as_deref(), child.stdin.take()) {
            // A child that exits without reading stdin closes the pipe early;
            // its exit status decides the outcome, not the write.
            if let Err(err) = pipe.write_all(payload.as_bytes()) {
                if err.kind() != ErrorKind::BrokenPipe {
                    abort_child(&mut child);
                    return Err(SyncError::Spawn {
                        command: shown,
                        source: err,
                    });
                }
            }
        }

        let output = child.wait_with_output().map_err(|source| SyncError::Spawn {
            command: shown,
            source,
        })?;

        Ok(CommandOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Kill `child` and reap it. Both steps are best effort: the child may
/// already have exited.
fn abort_child(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

impl WorkspaceFs for LocalRunner {
    fn remove_directory(&mut self, path: &Path) -> Result<(), SyncError> {
        match std::fs::remove_dir_all(path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(io_err(path, err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn remove_directory_removes_tree() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("wkdir");
        fs::create_dir_all(dir.join("src").join("deep")).unwrap();
        fs::write(dir.join("src").join("file.c"), "int main;").unwrap();

        LocalRunner.remove_directory(&dir).expect("remove");
        assert!(!dir.exists());
    }

    #[test]
    fn remove_missing_directory_is_ok() {
        let tmp = TempDir::new().unwrap();
        LocalRunner
            .remove_directory(&tmp.path().join("never-created"))
            .expect("missing dir is fine");
    }

    #[test]
    fn empty_argv_is_a_spawn_error() {
        let tmp = TempDir::new().unwrap();
        let cmd = ShellCommand {
            workdir: tmp.path().to_path_buf(),
            argv: vec![],
            stdin: None,
        };
        assert!(matches!(
            LocalRunner.run(&cmd),
            Err(SyncError::Spawn { .. })
        ));
    }

    #[test]
    fn missing_program_is_a_spawn_error() {
        let tmp = TempDir::new().unwrap();
        let cmd = ShellCommand {
            workdir: tmp.path().join("wkdir"),
            argv: vec!["p4step-definitely-not-installed".to_string()],
            stdin: None,
        };
        assert!(matches!(
            LocalRunner.run(&cmd),
            Err(SyncError::Spawn { .. })
        ));
        assert!(tmp.path().join("wkdir").is_dir(), "workdir is created first");
    }

    #[test]
    #[cfg(unix)]
    fn aborted_child_is_reaped() {
        let mut child = Command::new("sleep").arg("30").spawn().expect("spawn sleep");
        abort_child(&mut child);
        let status = child.try_wait().expect("try_wait");
        assert!(status.is_some(), "child has been waited on");
        assert!(!status.unwrap().success());
    }

    #[test]
    #[cfg(unix)]
    fn captures_stdout_status_and_feeds_stdin() {
        let tmp = TempDir::new().unwrap();
        let cmd = ShellCommand {
            workdir: tmp.path().join("wkdir"),
            argv: vec!["sh".to_string(), "-c".to_string(), "cat; exit 3".to_string()],
            stdin: Some("Client: c\n".to_string()),
        };
        let out = LocalRunner.run(&cmd).expect("run");
        assert_eq!(out.exit_code, Some(3));
        assert_eq!(out.stdout, "Client: c\n");
        assert!(!out.is_success());
    }
}
