//! Configuration structures for the extraction pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{DocsiftError, Result};
use crate::pipeline::NoVariantPolicy;

/// Main configuration for the docsift pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocsiftConfig {
    /// PDF processing configuration.
    pub pdf: PdfConfig,

    /// Variant extraction configuration.
    pub extraction: ExtractionConfig,

    /// Hint-based discovery configuration.
    pub discovery: DiscoveryConfig,
}

/// PDF processing configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Minimum non-whitespace text length to treat a document as readable.
    pub min_text_length: usize,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self { min_text_length: 1 }
    }
}

/// What to do when no variant's anchors match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoVariantAction {
    /// Fail the document.
    #[default]
    Reject,
    /// Extract with `fallback_variant` instead.
    Fallback,
}

/// Variant extraction configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Rule file, or directory of per-variant rule files.
    pub rules_path: PathBuf,

    /// Policy when classification finds no variant.
    pub on_no_variant: NoVariantAction,

    /// Variant used when `on_no_variant` is `fallback`.
    pub fallback_variant: Option<String>,

    /// Attach totals validation results to extracted fields.
    pub validate_totals: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            rules_path: PathBuf::from("rules"),
            on_no_variant: NoVariantAction::Reject,
            fallback_variant: None,
            validate_totals: true,
        }
    }
}

/// Hint-based discovery configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Optional hints JSON; built-in hints are used when absent.
    pub hints_path: Option<PathBuf>,
}

impl DocsiftConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Resolve the no-variant policy, checking the fallback is named.
    pub fn no_variant_policy(&self) -> Result<NoVariantPolicy> {
        match (self.extraction.on_no_variant, &self.extraction.fallback_variant) {
            (NoVariantAction::Reject, _) => Ok(NoVariantPolicy::Reject),
            (NoVariantAction::Fallback, Some(id)) => Ok(NoVariantPolicy::Fallback(id.clone())),
            (NoVariantAction::Fallback, None) => Err(DocsiftError::Config(
                "on_no_variant is fallback but fallback_variant is not set".to_string(),
            )),
        }
    }
}
