use std::{fs, path::Path};

use anyhow::{Context, Result};
use encounter_director_core::DirectorConfig;

/// Reads and parses a director configuration file.
pub(crate) fn load_config(path: &Path) -> Result<DirectorConfig> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read director config {}", path.display()))?;
    parse_config(&contents).with_context(|| format!("invalid director config {}", path.display()))
}

fn parse_config(contents: &str) -> Result<DirectorConfig> {
    let config: DirectorConfig =
        toml::from_str(contents).context("failed to parse director config toml contents")?;
    config.validate()?;
    Ok(config)
}
