//! `p4step check` — validate a step file.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;

use p4step_core::{config, MappingStrategy, StepConfig};

/// Arguments for `p4step check`.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Step file (YAML).
    pub config: PathBuf,

    /// Rewrite a valid step file in canonical form.
    #[arg(long)]
    pub normalize: bool,
}

impl CheckArgs {
    pub fn run(self) -> Result<()> {
        let raw = config::load_raw_at(&self.config).context("failed to load step file")?;
        let step = match StepConfig::new(raw.clone()) {
            Ok(step) => step,
            Err(errors) => {
                eprintln!(
                    "{} {} has {} problem(s):",
                    "✗".red(),
                    self.config.display(),
                    errors.0.len()
                );
                for err in errors.iter() {
                    eprintln!("  - {err}");
                }
                bail!("invalid step configuration")
            }
        };

        println!("{} {} is valid", "✓".green(), self.config.display());
        print_summary(&step);

        if self.normalize {
            config::save_raw_at(&self.config, &raw)
                .with_context(|| format!("failed to rewrite {}", self.config.display()))?;
            println!("rewrote {}", self.config.display());
        }
        Ok(())
    }
}

fn print_summary(step: &StepConfig) {
    println!("  step:    {}", step.name());
    println!("  client:  {}", step.client());
    println!("  mode:    {}", step.mode());
    println!("  mapping: {}", mapping_label(step.mapping()));
    println!("  workdir: {}", step.workdir());
}

fn mapping_label(mapping: &MappingStrategy) -> String {
    match mapping {
        MappingStrategy::BaseBranch {
            base,
            branch,
            extra_views,
        } => {
            let mut label = format!("base {base}");
            if let Some(branch) = branch {
                label.push_str(&format!(", branch {branch}"));
            }
            if !extra_views.is_empty() {
                label.push_str(&format!(", extra views {}", extra_views.len()));
            }
            label
        }
        MappingStrategy::ViewSpec(pairs) => format!("view spec, {} entries", pairs.len()),
        MappingStrategy::Default => "client namespace".to_string(),
    }
}
