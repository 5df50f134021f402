//! WASM bindings for loan/lease document field extraction.
//!
//! Text comes from the host (pdf.js or similar); rules and hints are JSON
//! strings in the same format the CLI reads from disk.

use serde::Serialize;
use serde_wasm_bindgen::Serializer;
use wasm_bindgen::prelude::*;

use docsift_core::extract::validate::parse_amount as parse_decimal_amount;
use docsift_core::{DocumentPipeline, Hints, NoVariantPolicy, RuleSet};

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Version information.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Classify document text against a JSON rule set.
#[wasm_bindgen]
pub fn classify(text: &str, rules_json: &str) -> Result<JsValue, JsValue> {
    RuleEngine::new(rules_json)?.classify(text)
}

/// Classify document text and extract the matched variant's fields.
#[wasm_bindgen]
pub fn extract(text: &str, rules_json: &str) -> Result<JsValue, JsValue> {
    RuleEngine::new(rules_json)?.extract(text)
}

/// Run schema discovery over an array of page texts.
///
/// `hints_json` maps keys to pattern lists; the built-in hints are used
/// when it is omitted.
#[wasm_bindgen]
pub fn discover(pages: JsValue, hints_json: Option<String>) -> Result<JsValue, JsValue> {
    let pages: Vec<String> = serde_wasm_bindgen::from_value(pages)?;
    let hints = match hints_json {
        Some(json) => Hints::from_json_str(&json).map_err(to_js_error)?,
        None => Hints::default(),
    };

    to_js(&docsift_core::discover(pages, &hints))
}

/// Parse a currency amount such as "$1,234.50" into a plain decimal string.
#[wasm_bindgen]
pub fn parse_amount(amount: &str) -> Option<String> {
    parse_decimal_amount(amount).map(|d| d.to_string())
}

/// A parsed rule set, reused across documents.
#[wasm_bindgen]
pub struct RuleEngine {
    pipeline: DocumentPipeline,
}

#[wasm_bindgen]
impl RuleEngine {
    /// Parse a JSON rule set.
    #[wasm_bindgen(constructor)]
    pub fn new(rules_json: &str) -> Result<RuleEngine, JsValue> {
        let rules = RuleSet::from_json_str(rules_json).map_err(to_js_error)?;
        Ok(Self {
            pipeline: DocumentPipeline::new(rules),
        })
    }

    /// Variant ids in declaration order.
    #[wasm_bindgen(js_name = variantIds)]
    pub fn variant_ids(&self) -> Vec<String> {
        self.pipeline
            .rules()
            .variants()
            .iter()
            .map(|v| v.id.clone())
            .collect()
    }

    /// Extract with this variant when no variant matches; pass nothing to reject instead.
    #[wasm_bindgen(js_name = setFallback)]
    pub fn set_fallback(&mut self, variant_id: Option<String>) -> Result<(), JsValue> {
        let policy = match variant_id {
            Some(id) if self.pipeline.rules().get(&id).is_none() => {
                return Err(JsValue::from_str(&format!("unknown variant: {}", id)));
            }
            Some(id) => NoVariantPolicy::Fallback(id),
            None => NoVariantPolicy::Reject,
        };

        let pipeline = std::mem::replace(
            &mut self.pipeline,
            DocumentPipeline::new(RuleSet::default()),
        );
        self.pipeline = pipeline.with_policy(policy);
        Ok(())
    }

    #[wasm_bindgen]
    pub fn classify(&self, text: &str) -> Result<JsValue, JsValue> {
        let result = self.pipeline.classify(text).map_err(to_js_error)?;
        to_js(&result)
    }

    #[wasm_bindgen]
    pub fn extract(&self, text: &str) -> Result<JsValue, JsValue> {
        let result = self.pipeline.extract(text).map_err(to_js_error)?;
        to_js(&result)
    }

    /// Extract with a named variant, skipping classification.
    #[wasm_bindgen(js_name = extractWithVariant)]
    pub fn extract_with_variant(&self, text: &str, variant_id: &str) -> Result<JsValue, JsValue> {
        let result = self
            .pipeline
            .extract_with_variant(text, variant_id)
            .map_err(to_js_error)?;
        to_js(&result)
    }
}

/// Plain JS objects rather than `Map`s, so flattened field maps read naturally.
fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&Serializer::json_compatible())
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

fn to_js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    const RULES: &str = r#"{
        "variants": [
            {
                "variant_id": "lease",
                "identify": { "anchors_all_of": ["Lease Agreement"] },
                "extract": { "fields": {
                    "rent": { "strategy": "regex", "patterns": ["Rent:\\s*(\\S+)"] },
                    "currency": { "strategy": "literal", "value": "USD" }
                } }
            },
            { "variant_id": "generic", "extract": { "fields": {} } }
        ]
    }"#;

    #[wasm_bindgen_test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("$1,234.50").as_deref(), Some("1234.50"));
        assert_eq!(parse_amount("n/a"), None);
    }

    #[wasm_bindgen_test]
    fn test_engine_variant_ids() {
        let engine = RuleEngine::new(RULES).unwrap();
        assert_eq!(engine.variant_ids(), vec!["lease", "generic"]);
    }

    #[wasm_bindgen_test]
    fn test_bad_rules_rejected() {
        assert!(RuleEngine::new("{").is_err());
    }

    #[wasm_bindgen_test]
    fn test_fallback_requires_known_variant() {
        let mut engine = RuleEngine::new(RULES).unwrap();
        assert!(engine.set_fallback(Some("missing".to_string())).is_err());
        assert!(engine.extract("Purchase Order").is_err());

        engine.set_fallback(Some("generic".to_string())).unwrap();
        assert!(engine.extract("Purchase Order").is_ok());
    }

    #[wasm_bindgen_test]
    fn test_extract_with_variant_runs_without_clock() {
        let engine = RuleEngine::new(RULES).unwrap();
        let value = engine.extract_with_variant("Rent: $900.00", "lease").unwrap();
        assert!(value.is_object());
    }

    #[wasm_bindgen_test]
    fn test_extract_returns_object() {
        let value = extract("LEASE AGREEMENT\nRent: $900.00", RULES).unwrap();
        assert!(value.is_object());
    }
}
