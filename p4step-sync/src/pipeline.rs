//! Step pipeline entrypoint used by the CLI.
//!
//! [`prepare`] has no side effects: it resolves deferred values, builds the
//! view, renders the client spec and plans the commands. [`run_step`] then
//! hands each command to the runner in order, stops at the first failure,
//! extracts the revision from the last command's output and publishes it.

use serde::Serialize;

use p4step_core::{PropertyStore, ResolvedStep, StepConfig, GOT_REVISION_PROPERTY};
use p4step_renderer::ClientSpecRenderer;

use crate::error::SyncError;
use crate::exec::{CommandRunner, WorkspaceFs};
use crate::plan::{build_plan, Action, StepKind, SyncPlan};
use crate::revision::{extract_revision, RevisionInfo};

/// Status text reported for a successful step.
pub const STATUS_UPDATED: &str = "update";

/// Per-execution inputs that are not part of the step configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncRequest {
    /// Revision to pin the sync to; `None` syncs to the latest.
    pub revision: Option<String>,
}

impl SyncRequest {
    pub fn latest() -> Self {
        Self::default()
    }

    pub fn at(revision: impl Into<String>) -> Self {
        SyncRequest {
            revision: Some(revision.into()),
        }
    }
}

/// Everything computed for one execution before any command runs.
#[derive(Debug, Clone, Serialize)]
pub struct PreparedStep {
    #[serde(skip)]
    pub step: ResolvedStep,
    pub client_spec: String,
    pub plan: SyncPlan,
}

/// Outcome of a successful step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepOutcome {
    pub step_name: String,
    pub revision: RevisionInfo,
    pub status_text: Vec<String>,
    pub commands_run: usize,
}

/// Resolve, render and plan without touching the workspace.
pub fn prepare(
    config: &StepConfig,
    props: &dyn PropertyStore,
    request: &SyncRequest,
) -> Result<PreparedStep, SyncError> {
    let step = config.resolve(props)?;
    let client_spec = ClientSpecRenderer::new()?.render_step(&step)?;
    let plan = build_plan(&step, &client_spec, request.revision.as_deref());
    tracing::debug!(
        step = %step.name,
        client = %step.client,
        mode = %step.mode,
        commands = plan.len(),
        "prepared sync plan"
    );
    Ok(PreparedStep {
        step,
        client_spec,
        plan,
    })
}

/// Run `plan` front to back. Returns the stdout of the final
/// [`StepKind::QueryLastChange`] command.
pub fn execute<R>(plan: &SyncPlan, runner: &mut R) -> Result<String, SyncError>
where
    R: CommandRunner + WorkspaceFs,
{
    let mut last_change = None;
    for (index, step) in plan.steps.iter().enumerate() {
        tracing::info!(
            step = %step.kind,
            index = index + 1,
            total = plan.len(),
            command = %step.describe(),
            "running"
        );
        match &step.action {
            Action::RemoveDirectory { path } => runner.remove_directory(path)?,
            Action::Shell(cmd) => {
                let output = runner.run(cmd)?;
                if !output.is_success() {
                    tracing::warn!(
                        step = %step.kind,
                        exit_code = ?output.exit_code,
                        stderr = %output.stderr.trim(),
                        "command failed; aborting plan"
                    );
                    return Err(SyncError::CommandFailed {
                        step: step.kind,
                        command: cmd.display_redacted(),
                        exit_code: output.exit_code,
                    });
                }
                if step.kind == StepKind::QueryLastChange {
                    last_change = Some(output.stdout);
                }
            }
        }
    }
    last_change.ok_or(SyncError::MissingStep(StepKind::QueryLastChange))
}

/// Run one sync step end to end and publish `got_revision` on success.
pub fn run_step<P, R>(
    config: &StepConfig,
    props: &mut P,
    request: &SyncRequest,
    runner: &mut R,
) -> Result<StepOutcome, SyncError>
where
    P: PropertyStore,
    R: CommandRunner + WorkspaceFs,
{
    let prepared = prepare(config, &*props, request)?;
    let stdout = execute(&prepared.plan, runner)?;
    let revision = extract_revision(&stdout)?;

    props.set(
        GOT_REVISION_PROPERTY,
        revision.revision.clone(),
        &prepared.step.name,
    );
    tracing::info!(
        step = %prepared.step.name,
        revision = %revision.revision,
        "workspace synced"
    );

    Ok(StepOutcome {
        step_name: prepared.step.name,
        revision,
        status_text: vec![STATUS_UPDATED.to_string()],
        commands_run: prepared.plan.len(),
    })
}
