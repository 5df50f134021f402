//! Subcommand implementations.

pub mod batch;
pub mod classify;
pub mod config;
pub mod discover;
pub mod extract;

use std::path::{Path, PathBuf};

use docsift_core::{DocsiftConfig, DocumentPipeline};

/// Load the config from `--config`, the user config file, or defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<DocsiftConfig> {
    if let Some(path) = config_path {
        return Ok(DocsiftConfig::from_file(Path::new(path))?);
    }

    let default_path = config::default_config_path();
    if default_path.exists() {
        Ok(DocsiftConfig::from_file(&default_path)?)
    } else {
        Ok(DocsiftConfig::default())
    }
}

/// Build the extraction pipeline, letting `--rules` override the config.
pub fn build_pipeline(
    config: &DocsiftConfig,
    rules: Option<&PathBuf>,
) -> anyhow::Result<DocumentPipeline> {
    let mut config = config.clone();
    if let Some(rules) = rules {
        config.extraction.rules_path = rules.clone();
    }

    if !config.extraction.rules_path.exists() {
        anyhow::bail!(
            "Rules not found at {}. Pass --rules or set extraction.rules_path.",
            config.extraction.rules_path.display()
        );
    }

    Ok(DocumentPipeline::from_config(&config)?)
}

/// Fail early with a readable message when the input is missing.
pub fn ensure_input(path: &Path) -> anyhow::Result<()> {
    if !path.exists() {
        anyhow::bail!("Input file not found: {}", path.display());
    }
    Ok(())
}
