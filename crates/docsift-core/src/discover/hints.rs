//! Regex hints for schema discovery.

use std::fs;
use std::path::Path;

use regex::{Regex, RegexBuilder};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::{DocsiftError, Result};

// Date shapes shared by the effective/maturity hints
const DATE_VALUE: &str =
    r"\d{1,2}[/\-]\d{1,2}[/\-]\d{2,4}|[A-Za-z]{3,9}\s+\d{1,2},\s+\d{4}";

/// Ordered key to pattern-list hints; a pattern's `val` group is the value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hints {
    entries: Vec<(String, Vec<String>)>,
}

impl Hints {
    pub fn new(entries: Vec<(String, Vec<String>)>) -> Self {
        Self { entries }
    }

    /// Parse a JSON object `{"key": ["pattern", ...]}`, keeping key order.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let map: Map<String, Value> = serde_json::from_str(json)?;
        let mut entries = Vec::with_capacity(map.len());

        for (key, patterns) in map {
            let patterns: Vec<String> = serde_json::from_value(patterns).map_err(|e| {
                DocsiftError::Config(format!("hint {}: expected a list of patterns: {}", key, e))
            })?;
            entries.push((key, patterns));
        }

        Ok(Self { entries })
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Hints from `path` when it exists, the built-in loan/lease hints otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) if p.exists() => {
                debug!("Loading hints from {}", p.display());
                Self::from_file(p)
            }
            _ => Ok(Self::default()),
        }
    }

    pub fn entries(&self) -> &[(String, Vec<String>)] {
        &self.entries
    }

    /// Compile every pattern case-insensitively, skipping ones that fail.
    pub fn compile(&self) -> Vec<CompiledHint> {
        self.entries
            .iter()
            .map(|(key, patterns)| CompiledHint {
                key: key.clone(),
                patterns: patterns
                    .iter()
                    .filter_map(|p| {
                        match RegexBuilder::new(p).case_insensitive(true).build() {
                            Ok(re) => Some(re),
                            Err(e) => {
                                warn!("Skipping invalid hint pattern for {}: {}", key, e);
                                None
                            }
                        }
                    })
                    .collect(),
            })
            .collect()
    }
}

impl Default for Hints {
    fn default() -> Self {
        let hint = |key: &str, pattern: String| (key.to_string(), vec![pattern]);

        Self::new(vec![
            hint("borrower_name", r"Borrower\s*Name[:\-]\s*(?P<val>.+)".to_string()),
            hint("lender_name", r"Lender\s*Name[:\-]\s*(?P<val>.+)".to_string()),
            hint(
                "loan_number",
                r"(Loan|Account)\s*(No\.?|Number)[:\-]\s*(?P<val>[A-Z0-9\-]+)".to_string(),
            ),
            hint(
                "loan_amount",
                r"(Loan|Principal)\s*Amount[:\-]\s*\$?(?P<val>[\d,]+(?:\.\d{2})?)".to_string(),
            ),
            hint(
                "interest_rate",
                r"(Interest\s*Rate|APR)[:\-]\s*(?P<val>\d+(?:\.\d+)?\s*%?)".to_string(),
            ),
            hint(
                "effective_date",
                format!(r"(Effective|Start)\s*Date[:\-]\s*(?P<val>{})", DATE_VALUE),
            ),
            hint(
                "maturity_date",
                format!(r"(Maturity|End)\s*Date[:\-]\s*(?P<val>{})", DATE_VALUE),
            ),
            hint(
                "payment_frequency",
                r"Payment\s*Frequency[:\-]\s*(?P<val>(Monthly|Quarterly|Bi-Weekly|Weekly|Annual))"
                    .to_string(),
            ),
            hint(
                "monthly_payment",
                r"(Monthly\s*Payment|EMI)[:\-]\s*\$?(?P<val>[\d,]+(?:\.\d{2})?)".to_string(),
            ),
            hint("guarantor_name", r"(Guarantor|Surety)\s*Name[:\-]\s*(?P<val>.+)".to_string()),
            hint("address", r"(Property|Premises)\s*Address[:\-]\s*(?P<val>.+)".to_string()),
        ])
    }
}

/// A hint key with its usable patterns.
#[derive(Debug, Clone)]
pub struct CompiledHint {
    pub key: String,
    pub patterns: Vec<Regex>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_hints_compile() {
        let hints = Hints::default();
        let compiled = hints.compile();

        assert_eq!(compiled.len(), 11);
        assert!(compiled.iter().all(|h| h.patterns.len() == 1));
        assert_eq!(compiled[0].key, "borrower_name");
    }

    #[test]
    fn test_from_json_keeps_order() {
        let hints = Hints::from_json_str(
            r#"{"zeta": ["Z: (?P<val>\\w+)"], "alpha": ["A: (?P<val>\\w+)", "Alpha: (.+)"]}"#,
        )
        .unwrap();

        let keys: Vec<_> = hints.entries().iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["zeta", "alpha"]);
        assert_eq!(hints.entries()[1].1.len(), 2);
    }

    #[test]
    fn test_invalid_patterns_skipped() {
        let hints = Hints::new(vec![(
            "broken".to_string(),
            vec!["(unclosed".to_string(), "ok: (?P<val>.+)".to_string()],
        )]);
        let compiled = hints.compile();
        assert_eq!(compiled[0].patterns.len(), 1);
    }

    #[test]
    fn test_bad_hint_shape_is_config_error() {
        assert!(matches!(
            Hints::from_json_str(r#"{"key": "not a list"}"#),
            Err(DocsiftError::Config(_))
        ));
    }

    #[test]
    fn test_load_falls_back_to_defaults() {
        let hints = Hints::load(Some(Path::new("/definitely/not/here.json"))).unwrap();
        assert_eq!(hints, Hints::default());
        assert_eq!(Hints::load(None).unwrap(), Hints::default());
    }
}
