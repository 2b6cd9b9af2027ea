//! `p4step client-spec` — print the client specification a step registers.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use p4step_renderer::ClientSpecRenderer;

use super::{load_step, PropertyArgs};

/// Arguments for `p4step client-spec`.
#[derive(Args, Debug)]
pub struct ClientSpecArgs {
    /// Step file (YAML).
    pub config: PathBuf,

    #[command(flatten)]
    pub props: PropertyArgs,
}

impl ClientSpecArgs {
    pub fn run(self) -> Result<()> {
        let step = load_step(&self.config)?;
        let props = self.props.load()?;
        let resolved = step
            .resolve(&props)
            .with_context(|| format!("failed to resolve step '{}'", step.name()))?;
        let spec = ClientSpecRenderer::new()
            .and_then(|renderer| renderer.render_step(&resolved))
            .context("failed to render client spec")?;
        print!("{spec}");
        Ok(())
    }
}
