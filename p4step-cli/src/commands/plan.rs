//! `p4step plan` — show the commands a step would run.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use p4step_sync::{pipeline, PreparedStep, SyncRequest};

use super::{load_step, PropertyArgs};

/// Arguments for `p4step plan`.
#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Step file (YAML).
    pub config: PathBuf,

    /// Revision to pin the sync to.
    #[arg(long)]
    pub revision: Option<String>,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub props: PropertyArgs,
}

#[derive(Serialize)]
struct PlanJson {
    step: String,
    client: String,
    mode: String,
    revision: Option<String>,
    workspace_root: String,
    client_spec: String,
    properties: BTreeMap<String, String>,
    commands: Vec<PlanStepJson>,
}

#[derive(Serialize)]
struct PlanStepJson {
    kind: String,
    command: String,
    stdin: bool,
}

#[derive(Tabled)]
struct PlanTableRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "step")]
    kind: String,
    #[tabled(rename = "command")]
    command: String,
}

impl PlanArgs {
    pub fn run(self) -> Result<()> {
        let step = load_step(&self.config)?;
        let props = self.props.load()?;
        let request = SyncRequest {
            revision: self.revision.clone(),
        };
        let prepared = pipeline::prepare(&step, &props, &request)
            .with_context(|| format!("failed to plan step '{}'", step.name()))?;

        if self.json {
            let properties = props
                .iter()
                .map(|(key, prop)| (key.clone(), prop.value.clone()))
                .collect();
            print_json(&prepared, properties, self.revision)?;
        } else {
            print_table(&prepared, self.revision.as_deref());
        }
        Ok(())
    }
}

fn print_json(
    prepared: &PreparedStep,
    properties: BTreeMap<String, String>,
    revision: Option<String>,
) -> Result<()> {
    let payload = PlanJson {
        step: prepared.step.name.clone(),
        client: prepared.step.client.clone(),
        mode: prepared.step.mode.to_string(),
        revision,
        workspace_root: prepared.step.workspace_root.display().to_string(),
        client_spec: prepared.client_spec.clone(),
        properties,
        commands: prepared
            .plan
            .steps
            .iter()
            .map(|s| PlanStepJson {
                kind: s.kind.label().to_string(),
                command: s.describe(),
                stdin: s.shell().is_some_and(|cmd| cmd.stdin.is_some()),
            })
            .collect(),
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&payload).context("failed to serialize plan JSON")?
    );
    Ok(())
}

fn print_table(prepared: &PreparedStep, revision: Option<&str>) {
    println!(
        "{} | client {} | {} | {}",
        prepared.step.name.bold(),
        prepared.step.client,
        prepared.step.mode,
        revision.map_or_else(|| "latest".to_string(), |rev| format!("@{rev}")),
    );
    println!("root: {}", prepared.step.workspace_root.display());

    let rows: Vec<PlanTableRow> = prepared
        .plan
        .steps
        .iter()
        .enumerate()
        .map(|(i, s)| PlanTableRow {
            index: i + 1,
            kind: s.kind.label().to_string(),
            command: s.describe(),
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
}
