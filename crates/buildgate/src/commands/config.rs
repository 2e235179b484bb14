//! Show the effective configuration

use anyhow::{Context, Result};

use super::Project;

/// Print the merged configuration as TOML.
pub fn run() -> Result<()> {
    let project = Project::load()?;
    let rendered =
        toml::to_string_pretty(&project.config).context("Failed to render configuration")?;
    println!("{rendered}");
    Ok(())
}
