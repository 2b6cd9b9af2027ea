//! # p4step-sync
//!
//! Sync planning and execution for one Perforce step.
//!
//! Call [`prepare`] to see what a step would run, or [`run_step`] to run it
//! against a [`CommandRunner`] and publish `got_revision` on success.

pub mod error;
pub mod exec;
pub mod pipeline;
pub mod plan;
pub mod property_file;
pub mod revision;

pub use error::SyncError;
pub use exec::{CommandOutput, CommandRunner, LocalRunner, WorkspaceFs};
pub use pipeline::{
    execute, prepare, run_step, PreparedStep, StepOutcome, SyncRequest, STATUS_UPDATED,
};
pub use plan::{build_plan, pinned_path, Action, CommandStep, ShellCommand, StepKind, SyncPlan};
pub use property_file::PropertyFile;
pub use revision::{extract_revision, RevisionInfo};
