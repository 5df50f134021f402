//! Runs every declared field of a variant against a document.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, trace};

use super::strategies::Strategy;
use super::validate::ValidationReport;
use crate::models::field::{Evidence, FieldResult};
use crate::models::rules::FieldRule;

/// Field results keyed by field name, plus the optional totals report.
///
/// Serializes as one flat object; the report sits under the reserved
/// `_validation` key.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FieldResults {
    #[serde(flatten)]
    pub fields: BTreeMap<String, FieldResult>,
    #[serde(rename = "_validation", skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationReport>,
}

impl FieldResults {
    pub fn get(&self, name: &str) -> Option<&FieldResult> {
        self.fields.get(name)
    }

    /// Extracted value of a field, if the field exists and was found.
    pub fn value(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(|r| r.value.as_deref())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Number of fields that produced a value.
    pub fn found_count(&self) -> usize {
        self.fields.values().filter(|r| r.is_found()).count()
    }
}

/// Apply one field rule; a broken rule yields an explanatory miss.
pub fn extract_field(text: &str, rule: &FieldRule) -> FieldResult {
    match &rule.strategy {
        Ok(strategy) => strategy.apply(text),
        Err(e) => FieldResult::missing(Evidence::InvalidConfig {
            error: e.to_string(),
        }),
    }
}

/// Extract every declared field; the result has exactly one entry per field.
pub fn extract_fields(text: &str, rules: &[FieldRule]) -> FieldResults {
    let mut fields = BTreeMap::new();

    for rule in rules {
        let result = extract_field(text, rule);
        trace!(
            "Field {}: value={:?} confidence={:.2} ({})",
            rule.name, result.value, result.confidence, result.evidence
        );
        fields.insert(rule.name.clone(), result);
    }

    let results = FieldResults {
        fields,
        validation: None,
    };
    debug!(
        "Extracted {}/{} fields",
        results.found_count(),
        results.len()
    );
    results
}
