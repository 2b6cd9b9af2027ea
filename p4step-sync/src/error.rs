//! Error types for p4step-sync.

use std::path::PathBuf;

use thiserror::Error;

use p4step_core::ResolveError;
use p4step_renderer::RenderError;

use crate::plan::StepKind;

/// All errors that can arise while preparing or running a sync step.
#[derive(Debug, Error)]
pub enum SyncError {
    /// A deferred config value could not be resolved.
    #[error("resolve error: {0}")]
    Resolve(#[from] ResolveError),

    /// An error from the client spec renderer.
    #[error("render error: {0}")]
    Render(#[from] RenderError),

    /// The command could not be started at all.
    #[error("failed to start `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// A command exited non-zero (or was killed). Aborts the remaining plan.
    #[error("{step} failed: `{command}` exited with {}", exit_label(.exit_code))]
    CommandFailed {
        step: StepKind,
        command: String,
        exit_code: Option<i32>,
    },

    /// `p4 changes` output had no recognisable changelist line.
    #[error("could not find a 'Change <rev> on <date> by <user>@<client>' line in: {output:?}")]
    Parse { output: String },

    /// The plan ended without a revision query step.
    #[error("sync plan has no {0} step")]
    MissingStep(StepKind),

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization/deserialization error (property file).
    #[error("property file JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => "no status (terminated by signal)".to_string(),
    }
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}
