//! Hint-based schema discovery.
//!
//! Unlike variant extraction, discovery needs no template: it runs a set of
//! regex hints plus a generic `Label: value` line matcher over every page
//! and consolidates whatever it finds into a schema keyed by field name.

mod consolidate;
pub mod hints;

pub use consolidate::{consolidate, ConsolidatedSchema, Provenance, SchemaEntry};
pub use hints::{CompiledHint, Hints};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::extract::strategies::patterns::{normalize_key, split_lines, KEY_VALUE_LINE};

/// Confidence for a value matched by a hint pattern.
pub const HINT_CONFIDENCE: f32 = 0.85;
/// Confidence for a value taken from a generic key-value line.
pub const KV_LINE_CONFIDENCE: f32 = 0.6;
/// Method tag for generic key-value lines.
pub const KV_LINE_METHOD: &str = "kv-line";

/// One raw match; many may share a key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedField {
    pub key: String,
    pub value: String,
    /// Page number (1-indexed).
    pub page: u32,
    /// `regex:<pattern>` or `kv-line`.
    pub method: String,
    pub confidence: f32,
}

/// Everything discovery produced for one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryResult {
    pub text_by_page: Vec<String>,
    pub fields: Vec<ExtractedField>,
    pub schema: ConsolidatedSchema,
}

/// Collect raw matches page by page: hint patterns first, then key-value lines.
pub fn regex_extract<S: AsRef<str>>(pages: &[S], hints: &[CompiledHint]) -> Vec<ExtractedField> {
    let mut fields = Vec::new();

    for (idx, text) in pages.iter().enumerate() {
        let page = idx as u32 + 1;
        let text = text.as_ref();

        for hint in hints {
            for pattern in &hint.patterns {
                for caps in pattern.captures_iter(text) {
                    let value = caps
                        .name("val")
                        .map(|m| m.as_str())
                        .filter(|v| !v.is_empty())
                        .unwrap_or(&caps[0]);

                    fields.push(ExtractedField {
                        key: hint.key.clone(),
                        value: value.trim().to_string(),
                        page,
                        method: format!("regex:{}", pattern.as_str()),
                        confidence: HINT_CONFIDENCE,
                    });
                }
            }
        }

        for line in split_lines(text) {
            if let Some(caps) = KEY_VALUE_LINE.captures(line) {
                fields.push(ExtractedField {
                    key: normalize_key(caps[1].trim()),
                    value: caps[2].trim().to_string(),
                    page,
                    method: KV_LINE_METHOD.to_string(),
                    confidence: KV_LINE_CONFIDENCE,
                });
            }
        }
    }

    debug!("Collected {} raw fields from {} pages", fields.len(), pages.len());
    fields
}

/// Run hints over page texts and consolidate the matches.
pub fn discover(pages: Vec<String>, hints: &Hints) -> DiscoveryResult {
    let compiled = hints.compile();
    let fields = regex_extract(&pages, &compiled);
    let schema = consolidate(&fields);

    info!(
        "Discovered {} keys from {} raw fields",
        schema.len(),
        fields.len()
    );

    DiscoveryResult {
        text_by_page: pages,
        fields,
        schema,
    }
}
