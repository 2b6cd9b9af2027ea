pub mod check;
pub mod client_spec;
pub mod plan;
pub mod run;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use p4step_core::{config, Properties, PropertyStore, StepConfig, BUILDDIR_PROPERTY};
use p4step_sync::property_file;

/// Source recorded for properties given on the command line.
pub const CLI_SOURCE: &str = "cli";

/// Build properties shared by every command that resolves a step.
#[derive(Args, Debug, Default)]
pub struct PropertyArgs {
    /// Directory the step's workdir lives in (sets the `builddir` property).
    #[arg(long)]
    pub builddir: Option<String>,

    /// Set a build property. Repeatable.
    #[arg(long = "property", value_name = "KEY=VALUE", value_parser = parse_key_val)]
    pub property: Vec<(String, String)>,

    /// JSON property file to start from. `run` writes the published
    /// revision back into it.
    #[arg(long = "properties", value_name = "FILE")]
    pub properties_file: Option<PathBuf>,
}

impl PropertyArgs {
    /// File first, then `--property`, then `--builddir`; later sources win.
    pub fn load(&self) -> Result<Properties> {
        let mut props = match &self.properties_file {
            Some(path) => {
                property_file::load_at(path)
                    .with_context(|| format!("failed to load properties from {}", path.display()))?
                    .properties
            }
            None => Properties::new(),
        };
        for (key, value) in &self.property {
            props.set(key, value.clone(), CLI_SOURCE);
        }
        if let Some(dir) = &self.builddir {
            props.set(BUILDDIR_PROPERTY, dir.clone(), CLI_SOURCE);
        }
        Ok(props)
    }
}

pub fn load_step(path: &Path) -> Result<StepConfig> {
    config::load_at(path).with_context(|| format!("failed to load step file {}", path.display()))
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{s}'")),
    }
}
