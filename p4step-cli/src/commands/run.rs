//! `p4step run` — sync the workspace and publish `got_revision`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use p4step_sync::{property_file, run_step, LocalRunner, SyncRequest};

use super::{load_step, PropertyArgs};

/// Arguments for `p4step run`.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Step file (YAML).
    pub config: PathBuf,

    /// Revision to pin the sync to.
    #[arg(long)]
    pub revision: Option<String>,

    /// Emit the outcome as JSON.
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub props: PropertyArgs,
}

impl RunArgs {
    pub fn run(self) -> Result<()> {
        let step = load_step(&self.config)?;
        let mut props = self.props.load()?;
        let request = SyncRequest {
            revision: self.revision.clone(),
        };

        let outcome = run_step(&step, &mut props, &request, &mut LocalRunner)
            .with_context(|| format!("step '{}' failed", step.name()))?;

        if let Some(path) = &self.props.properties_file {
            property_file::save_at(path, &props)
                .with_context(|| format!("failed to save properties to {}", path.display()))?;
            tracing::debug!(path = %path.display(), count = props.len(), "saved properties");
        }

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&outcome)
                    .context("failed to serialize outcome JSON")?
            );
            return Ok(());
        }

        println!(
            "{} '{}' synced to revision {} ({}, {} commands)",
            "✓".green(),
            outcome.step_name,
            outcome.revision.revision.bold(),
            outcome.status_text.join(" "),
            outcome.commands_run,
        );
        Ok(())
    }
}
