//! Document pipeline: classify, pick a variant, extract, validate.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::classify::{classify, ClassificationResult};
use crate::error::{DocsiftError, Result};
use crate::extract::{extract_fields, validate_totals, FieldResults};
use crate::models::config::DocsiftConfig;
use crate::models::rules::{RuleSet, VariantDefinition};

/// What to do when classification finds no variant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum NoVariantPolicy {
    /// Fail with [`DocsiftError::NoVariantMatched`].
    #[default]
    Reject,
    /// Extract with the named variant.
    Fallback(String),
}

/// Extraction output for one document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentExtraction {
    /// Variant whose rules were applied.
    pub variant: String,
    /// Classifier output; its variant id is `None` when a fallback was used.
    pub classification: ClassificationResult,
    pub fields: FieldResults,
    pub processing_time_ms: u64,
}

/// Rule-driven extraction over plain document text.
pub struct DocumentPipeline {
    rules: RuleSet,
    policy: NoVariantPolicy,
    validate_totals: bool,
    min_text_length: usize,
}

impl DocumentPipeline {
    /// Create a pipeline with default settings.
    pub fn new(rules: RuleSet) -> Self {
        Self {
            rules,
            policy: NoVariantPolicy::Reject,
            validate_totals: true,
            min_text_length: 1,
        }
    }

    /// Build a pipeline from configuration, loading its rule set.
    pub fn from_config(config: &DocsiftConfig) -> Result<Self> {
        let rules = RuleSet::load(&config.extraction.rules_path)?;
        let pipeline = Self::new(rules)
            .with_policy(config.no_variant_policy()?)
            .with_totals_validation(config.extraction.validate_totals)
            .with_min_text_length(config.pdf.min_text_length);

        if let NoVariantPolicy::Fallback(id) = &pipeline.policy {
            if pipeline.rules.get(id).is_none() {
                return Err(DocsiftError::UnknownVariant(id.clone()));
            }
        }

        Ok(pipeline)
    }

    /// Set the no-variant policy.
    pub fn with_policy(mut self, policy: NoVariantPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set totals validation.
    pub fn with_totals_validation(mut self, validate: bool) -> Self {
        self.validate_totals = validate;
        self
    }

    /// Set the minimum text length for a readable document.
    pub fn with_min_text_length(mut self, min: usize) -> Self {
        self.min_text_length = min;
        self
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Classify text against the rule set.
    pub fn classify(&self, text: &str) -> Result<ClassificationResult> {
        self.ensure_readable(text)?;
        Ok(classify(text, self.rules.variants()))
    }

    /// Classify, resolve the variant per policy, and extract its fields.
    pub fn extract(&self, text: &str) -> Result<DocumentExtraction> {
        let start = Stopwatch::start();
        let classification = self.classify(text)?;

        let variant = match (&classification.variant_id, &self.policy) {
            (Some(id), _) => self.variant(id)?,
            (None, NoVariantPolicy::Fallback(id)) => {
                warn!("No variant matched, falling back to {}", id);
                self.variant(id)?
            }
            (None, NoVariantPolicy::Reject) => {
                return Err(DocsiftError::NoVariantMatched(classification.evidence));
            }
        };

        Ok(self.run(text, variant, classification, start))
    }

    /// Extract with a named variant, skipping classification.
    pub fn extract_with_variant(&self, text: &str, variant_id: &str) -> Result<DocumentExtraction> {
        let start = Stopwatch::start();
        self.ensure_readable(text)?;
        let variant = self.variant(variant_id)?;

        let classification = ClassificationResult {
            variant_id: Some(variant.id.clone()),
            confidence: 1.0,
            score: 0,
            evidence: "variant selected explicitly".to_string(),
        };

        Ok(self.run(text, variant, classification, start))
    }

    /// Convert a PDF and extract it.
    #[cfg(feature = "native")]
    pub fn process_pdf(&self, path: &std::path::Path) -> Result<DocumentExtraction> {
        let content = crate::pdf::pdf_to_text(path)?;
        self.extract(&content.text)
    }

    fn run(
        &self,
        text: &str,
        variant: &VariantDefinition,
        classification: ClassificationResult,
        start: Stopwatch,
    ) -> DocumentExtraction {
        info!(
            "Extracting {} fields with variant {}",
            variant.fields.len(),
            variant.id
        );

        let mut fields = extract_fields(text, &variant.fields);
        if self.validate_totals && !variant.totals.is_empty() {
            fields.validation = Some(validate_totals(&fields, &variant.totals));
        }

        let processing_time_ms = start.elapsed_ms();
        debug!("Document processed in {}ms", processing_time_ms);

        DocumentExtraction {
            variant: variant.id.clone(),
            classification,
            fields,
            processing_time_ms,
        }
    }

    fn variant(&self, id: &str) -> Result<&VariantDefinition> {
        self.rules
            .get(id)
            .ok_or_else(|| DocsiftError::UnknownVariant(id.to_string()))
    }

    fn ensure_readable(&self, text: &str) -> Result<()> {
        let len = text.chars().filter(|c| !c.is_whitespace()).count();
        if len == 0 || len < self.min_text_length {
            return Err(DocsiftError::UnreadableDocument(format!(
                "{} characters of text (minimum {})",
                len,
                self.min_text_length.max(1)
            )));
        }
        Ok(())
    }
}

/// Wall-clock timer; wasm32 has no clock in std, so it reads zero there.
#[derive(Debug, Clone, Copy)]
struct Stopwatch {
    #[cfg(not(target_arch = "wasm32"))]
    started: std::time::Instant,
}

impl Stopwatch {
    fn start() -> Self {
        Self {
            #[cfg(not(target_arch = "wasm32"))]
            started: std::time::Instant::now(),
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn elapsed_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }

    #[cfg(target_arch = "wasm32")]
    fn elapsed_ms(&self) -> u64 {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::{FieldStrategyConfig, TotalsRule};

    fn rules() -> RuleSet {
        RuleSet::new(vec![
            VariantDefinition::new("lease")
                .with_anchors(["Lease Agreement"])
                .with_field("lessee", FieldStrategyConfig::anchor_window("Lessee", 1))
                .with_field("rent", FieldStrategyConfig::regex([r"Rent:\s*(\S+)"]).unwrap())
                .with_field("fee", FieldStrategyConfig::regex([r"Fee:\s*(\S+)"]).unwrap())
                .with_field("total", FieldStrategyConfig::regex([r"Total:\s*(\S+)"]).unwrap())
                .with_totals(TotalsRule::new("total", ["rent", "fee"])),
            VariantDefinition::new("generic")
                .with_field("kind", FieldStrategyConfig::literal("unknown")),
        ])
        .unwrap()
    }

    const LEASE: &str = "LEASE AGREEMENT\nLessee\nAcme LLC\nRent: $900.00\nFee: $100.00\nTotal: $1,000.00";

    #[test]
    fn test_extract_classified_variant() {
        let extraction = DocumentPipeline::new(rules()).extract(LEASE).unwrap();

        assert_eq!(extraction.variant, "lease");
        assert_eq!(extraction.classification.variant_id.as_deref(), Some("lease"));
        assert_eq!(extraction.fields.value("lessee"), Some("Acme LLC"));
        assert!(extraction.fields.validation.as_ref().unwrap().valid);
    }

    #[test]
    fn test_totals_validation_can_be_disabled() {
        let extraction = DocumentPipeline::new(rules())
            .with_totals_validation(false)
            .extract(LEASE)
            .unwrap();
        assert!(extraction.fields.validation.is_none());
    }

    #[test]
    fn test_reject_when_no_variant() {
        let err = DocumentPipeline::new(rules()).extract("Promissory Note").unwrap_err();
        assert!(matches!(err, DocsiftError::NoVariantMatched(ev) if ev == "no anchors matched"));
    }

    #[test]
    fn test_fallback_when_no_variant() {
        let extraction = DocumentPipeline::new(rules())
            .with_policy(NoVariantPolicy::Fallback("generic".to_string()))
            .extract("Promissory Note")
            .unwrap();

        assert_eq!(extraction.variant, "generic");
        assert_eq!(extraction.classification.variant_id, None);
        assert_eq!(extraction.fields.value("kind"), Some("unknown"));
    }

    #[test]
    fn test_fallback_to_unknown_variant() {
        let err = DocumentPipeline::new(rules())
            .with_policy(NoVariantPolicy::Fallback("missing".to_string()))
            .extract("Promissory Note")
            .unwrap_err();
        assert!(matches!(err, DocsiftError::UnknownVariant(id) if id == "missing"));
    }

    #[test]
    fn test_empty_text_is_unreadable_not_unmatched() {
        let pipeline = DocumentPipeline::new(rules())
            .with_policy(NoVariantPolicy::Fallback("generic".to_string()));

        for text in ["", "   \n\t  "] {
            assert!(matches!(pipeline.classify(text), Err(DocsiftError::UnreadableDocument(_))));
            assert!(matches!(pipeline.extract(text), Err(DocsiftError::UnreadableDocument(_))));
        }
    }

    #[test]
    fn test_min_text_length() {
        let pipeline = DocumentPipeline::new(rules()).with_min_text_length(100);
        assert!(matches!(pipeline.extract(LEASE), Err(DocsiftError::UnreadableDocument(_))));
    }

    #[test]
    fn test_stopwatch_reports_elapsed_millis() {
        let watch = Stopwatch::start();
        std::thread::sleep(std::time::Duration::from_millis(5));
        assert!(watch.elapsed_ms() >= 5);
    }

    #[test]
    fn test_extract_with_explicit_variant() {
        let extraction = DocumentPipeline::new(rules())
            .extract_with_variant(LEASE, "generic")
            .unwrap();
        assert_eq!(extraction.variant, "generic");
        assert_eq!(extraction.fields.names().collect::<Vec<_>>(), vec!["kind"]);
    }
}
