//! Sync planning — the ordered commands for one step execution.
//!
//! | Mode          | Steps                                                                  |
//! |---------------|------------------------------------------------------------------------|
//! | `incremental` | `p4 -V`, `client -i`, `sync [pin]`, `changes -m1 #have`                 |
//! | `full`        | `p4 -V`, `client -i`, `sync #none`, remove workdir, `sync [pin]`, `changes -m1 #have` |
//!
//! Every command except the version probe carries the connection flags
//! (`-p`, `-u`, `-P`, `-c`), each only when configured. A pinned sync reads
//! `<base>...@<rev>` when the view has a base path, else
//! `//<client>/...@<rev>`.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use p4step_core::{ResolvedStep, SyncMode};

/// What a plan step is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    /// `p4 -V`; only checks that the tool runs.
    VersionProbe,
    /// `p4 client -i` with the rendered spec on stdin.
    RegisterClient,
    /// `p4 sync #none`; detaches the workspace from all depot files.
    DetachAll,
    /// Remove the workspace directory.
    WipeWorkspace,
    Sync,
    /// `p4 changes -m1 #have`; its output carries the synced revision.
    QueryLastChange,
}

impl StepKind {
    pub fn label(&self) -> &'static str {
        match self {
            StepKind::VersionProbe => "version probe",
            StepKind::RegisterClient => "client registration",
            StepKind::DetachAll => "detach",
            StepKind::WipeWorkspace => "workspace wipe",
            StepKind::Sync => "sync",
            StepKind::QueryLastChange => "last change query",
        }
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// An external command: where to run it, its argv and optional stdin payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShellCommand {
    pub workdir: PathBuf,
    pub argv: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stdin: Option<String>,
}

impl ShellCommand {
    /// The command line with the value after `-P` masked, for logs and output.
    pub fn display_redacted(&self) -> String {
        let mut out = Vec::with_capacity(self.argv.len());
        let mut mask_next = false;
        for arg in &self.argv {
            if mask_next {
                out.push("********");
                mask_next = false;
            } else {
                mask_next = arg == "-P";
                out.push(arg.as_str());
            }
        }
        out.join(" ")
    }
}

/// What a plan step does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    Shell(ShellCommand),
    RemoveDirectory { path: PathBuf },
}

/// One entry of a [`SyncPlan`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandStep {
    pub kind: StepKind,
    pub action: Action,
}

impl CommandStep {
    pub fn shell(&self) -> Option<&ShellCommand> {
        match &self.action {
            Action::Shell(cmd) => Some(cmd),
            Action::RemoveDirectory { .. } => None,
        }
    }

    /// Human-readable description, password masked.
    pub fn describe(&self) -> String {
        match &self.action {
            Action::Shell(cmd) => cmd.display_redacted(),
            Action::RemoveDirectory { path } => format!("rmdir {}", path.display()),
        }
    }
}

/// Ordered commands for one execution. Consumed front to back; the first
/// failure ends the run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SyncPlan {
    pub steps: Vec<CommandStep>,
}

impl SyncPlan {
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn count(&self, kind: StepKind) -> usize {
        self.steps.iter().filter(|s| s.kind == kind).count()
    }

    pub fn kinds(&self) -> Vec<StepKind> {
        self.steps.iter().map(|s| s.kind).collect()
    }
}

/// Build the plan for `step`. `client_spec` is the rendered spec fed to
/// `client -i`; `revision` pins the sync when set.
pub fn build_plan(step: &ResolvedStep, client_spec: &str, revision: Option<&str>) -> SyncPlan {
    let p4 = P4Command::new(step);
    let mut steps = vec![
        CommandStep {
            kind: StepKind::VersionProbe,
            action: Action::Shell(p4.bare(&["-V"])),
        },
        CommandStep {
            kind: StepKind::RegisterClient,
            action: Action::Shell(p4.with_stdin(&["client", "-i"], client_spec)),
        },
    ];

    if step.mode == SyncMode::Full {
        steps.push(CommandStep {
            kind: StepKind::DetachAll,
            action: Action::Shell(p4.command(&["sync", "#none"])),
        });
        steps.push(CommandStep {
            kind: StepKind::WipeWorkspace,
            action: Action::RemoveDirectory {
                path: step.workspace_root.clone(),
            },
        });
    }

    let sync = match revision {
        Some(rev) => p4.command(&["sync", &pinned_path(step, rev)]),
        None => p4.command(&["sync"]),
    };
    steps.push(CommandStep {
        kind: StepKind::Sync,
        action: Action::Shell(sync),
    });
    steps.push(CommandStep {
        kind: StepKind::QueryLastChange,
        action: Action::Shell(p4.command(&["changes", "-m1", "#have"])),
    });

    SyncPlan { steps }
}

/// `<base>...@<rev>`, or `//<client>/...@<rev>` without a base path.
pub fn pinned_path(step: &ResolvedStep, revision: &str) -> String {
    match step.mapping.base() {
        Some(base) => format!("{base}...@{revision}"),
        None => format!("//{}/...@{revision}", step.client),
    }
}

struct P4Command<'a> {
    step: &'a ResolvedStep,
    global: Vec<String>,
}

impl<'a> P4Command<'a> {
    fn new(step: &'a ResolvedStep) -> Self {
        let mut global = Vec::new();
        let flags = [
            ("-p", step.port.as_deref()),
            ("-u", step.user.as_deref()),
            ("-P", step.password.as_deref()),
            ("-c", Some(step.client.as_str())),
        ];
        for (flag, value) in flags {
            if let Some(value) = value {
                global.push(flag.to_string());
                global.push(value.to_string());
            }
        }
        P4Command { step, global }
    }

    fn build(&self, global: bool, args: &[&str], stdin: Option<&str>) -> ShellCommand {
        let mut argv = vec![self.step.p4bin.clone()];
        if global {
            argv.extend(self.global.iter().cloned());
        }
        argv.extend(args.iter().map(|a| (*a).to_string()));
        ShellCommand {
            workdir: self.step.workspace_root.clone(),
            argv,
            stdin: stdin.map(str::to_string),
        }
    }

    /// No connection flags.
    fn bare(&self, args: &[&str]) -> ShellCommand {
        self.build(false, args, None)
    }

    fn command(&self, args: &[&str]) -> ShellCommand {
        self.build(true, args, None)
    }

    fn with_stdin(&self, args: &[&str], stdin: &str) -> ShellCommand {
        self.build(true, args, Some(stdin))
    }
}
