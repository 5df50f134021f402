//! Variant rule sets: anchors for classification and per-field strategies.
//!
//! A rule document is JSON:
//!
//! ```json
//! {
//!   "variants": [
//!     {
//!       "variant_id": "docusign_lease_v1",
//!       "identify": { "anchors_all_of": ["Lease Agreement", "DocuSign Envelope"] },
//!       "extract": {
//!         "fields": {
//!           "lessee": { "strategy": "anchor_window", "anchor": "Lessee", "window_lines_after": 1 },
//!           "monthly_rent": { "strategy": "regex", "patterns": ["Monthly Rent:\\s*\\$?([\\d,]+\\.\\d{2})"] }
//!         }
//!       },
//!       "validate": { "totals": [{ "total": "total_due", "parts": ["monthly_rent", "deposit"] }] }
//!     }
//!   ]
//! }
//! ```
//!
//! Objects are parsed order-preserving, so variants, anchors, fields and
//! patterns keep their declared order.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::{RuleError, StrategyConfigError};
use crate::extract::strategies::FieldStrategyConfig;
use crate::extract::validate::{TotalsRule, ValidationRules};

/// Result key reserved for totals validation output.
pub const VALIDATION_KEY: &str = "_validation";

/// One declared field of a variant.
///
/// A field whose configuration is broken is still kept, carrying the
/// construction error, so extraction can report it instead of dropping it.
#[derive(Debug, Clone)]
pub struct FieldRule {
    pub name: String,
    pub strategy: Result<FieldStrategyConfig, StrategyConfigError>,
}

impl FieldRule {
    pub fn new(name: impl Into<String>, strategy: FieldStrategyConfig) -> Self {
        Self {
            name: name.into(),
            strategy: Ok(strategy),
        }
    }

    pub fn from_value(name: impl Into<String>, value: &Value) -> Self {
        Self {
            name: name.into(),
            strategy: FieldStrategyConfig::from_value(value),
        }
    }
}

/// A template family identified by anchor phrases.
#[derive(Debug, Clone)]
pub struct VariantDefinition {
    pub id: String,
    pub anchors: Vec<String>,
    pub fields: Vec<FieldRule>,
    pub totals: Vec<TotalsRule>,
}

impl VariantDefinition {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            anchors: Vec::new(),
            fields: Vec::new(),
            totals: Vec::new(),
        }
    }

    pub fn with_anchors<I, S>(mut self, anchors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.anchors.extend(anchors.into_iter().map(Into::into));
        self
    }

    pub fn with_field(mut self, name: impl Into<String>, strategy: FieldStrategyConfig) -> Self {
        self.fields.push(FieldRule::new(name, strategy));
        self
    }

    pub fn with_totals(mut self, rule: TotalsRule) -> Self {
        self.totals.push(rule);
        self
    }

    /// Field names in declared order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    fn from_raw(raw: RawVariant) -> Result<Self, RuleError> {
        if raw.variant_id.trim().is_empty() {
            return Err(RuleError::InvalidVariant {
                variant: raw.variant_id,
                reason: "variant_id must not be empty".to_string(),
            });
        }

        let mut fields = Vec::with_capacity(raw.extract.fields.len());
        for (name, value) in &raw.extract.fields {
            if name == VALIDATION_KEY {
                return Err(RuleError::ReservedFieldName {
                    variant: raw.variant_id.clone(),
                    field: name.clone(),
                });
            }

            let rule = FieldRule::from_value(name.as_str(), value);
            if let Err(e) = &rule.strategy {
                warn!("Variant {} field {}: {}", raw.variant_id, name, e);
            }
            fields.push(rule);
        }

        Ok(Self {
            id: raw.variant_id,
            anchors: raw.identify.anchors_all_of,
            fields,
            totals: raw.validate.totals,
        })
    }
}

/// Ordered collection of variants; order decides classification ties.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    variants: Vec<VariantDefinition>,
}

impl RuleSet {
    /// Build a rule set, rejecting duplicate ids and reserved field names.
    pub fn new(variants: Vec<VariantDefinition>) -> Result<Self, RuleError> {
        let mut seen = HashSet::new();
        for variant in &variants {
            if !seen.insert(variant.id.as_str()) {
                return Err(RuleError::DuplicateVariant(variant.id.clone()));
            }
            if variant.fields.iter().any(|f| f.name == VALIDATION_KEY) {
                return Err(RuleError::ReservedFieldName {
                    variant: variant.id.clone(),
                    field: VALIDATION_KEY.to_string(),
                });
            }
        }
        Ok(Self { variants })
    }

    /// Parse a rule document (`{"variants": [...]}`).
    pub fn from_json_str(json: &str) -> Result<Self, RuleError> {
        let raw: RawRuleSet = serde_json::from_str(json)?;
        let variants = raw
            .variants
            .into_iter()
            .map(VariantDefinition::from_raw)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(variants)
    }

    /// Load a rule document from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, RuleError> {
        let content = fs::read_to_string(path)?;
        let rules = Self::from_json_str(&content)?;
        debug!("Loaded {} variants from {}", rules.len(), path.display());
        Ok(rules)
    }

    /// Load one variant per `*.json` file in a directory, ordered by file name.
    pub fn from_dir(dir: &Path) -> Result<Self, RuleError> {
        let mut paths = fs::read_dir(dir)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<Result<Vec<_>, _>>()?;
        paths.retain(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "json"));
        paths.sort();

        let mut variants = Vec::with_capacity(paths.len());
        for path in &paths {
            let content = fs::read_to_string(path)?;
            let raw: RawVariant = serde_json::from_str(&content)?;
            variants.push(VariantDefinition::from_raw(raw)?);
        }

        debug!("Loaded {} variants from {}", variants.len(), dir.display());
        Self::new(variants)
    }

    /// Load from a rule file or a directory of variant files.
    pub fn load(path: &Path) -> Result<Self, RuleError> {
        if path.is_dir() {
            Self::from_dir(path)
        } else {
            Self::from_file(path)
        }
    }

    /// Look up a variant by id.
    pub fn get(&self, id: &str) -> Option<&VariantDefinition> {
        self.variants.iter().find(|v| v.id == id)
    }

    pub fn variants(&self) -> &[VariantDefinition] {
        &self.variants
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }
}

#[derive(Deserialize)]
struct RawRuleSet {
    #[serde(default)]
    variants: Vec<RawVariant>,
}

#[derive(Deserialize)]
struct RawVariant {
    variant_id: String,
    #[serde(default)]
    identify: RawIdentify,
    #[serde(default)]
    extract: RawExtract,
    #[serde(default)]
    validate: ValidationRules,
}

#[derive(Deserialize, Default)]
struct RawIdentify {
    #[serde(default)]
    anchors_all_of: Vec<String>,
}

#[derive(Deserialize, Default)]
struct RawExtract {
    #[serde(default)]
    fields: Map<String, Value>,
}
