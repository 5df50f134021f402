//! End-to-end extraction over rule documents.

use docsift_core::extract::strategies::Strategy;
use docsift_core::{
    classify, consolidate, extract_fields, DocsiftError, DocumentPipeline, Evidence,
    ExtractedField, FieldStrategyConfig, NoVariantPolicy, RuleSet, VariantDefinition,
};
use pretty_assertions::assert_eq;

const RULES: &str = r#"{
    "variants": [
        {
            "variant_id": "docusign_lease",
            "identify": { "anchors_all_of": ["Lease Agreement"] },
            "extract": {
                "fields": {
                    "lessee": { "strategy": "anchor_window", "anchor": "Lessee", "window_lines_after": 1 },
                    "monthly_rent": { "strategy": "regex", "patterns": ["Monthly Rent:\\s*\\$?([\\d,]+\\.\\d{2})"] },
                    "currency": { "strategy": "literal", "value": "USD" }
                }
            }
        },
        {
            "variant_id": "promissory_loan",
            "identify": { "anchors_all_of": ["Loan Agreement", "Promissory"] },
            "extract": {
                "fields": {
                    "loan_number": { "strategy": "regex", "patterns": ["Loan Number: (?P<val>\\w+)"] },
                    "principal": { "strategy": "regex", "patterns": ["X", "Principal Amount:\\s*(.+)"] },
                    "total_due": { "strategy": "anchor_window", "anchor": "Total Due" },
                    "base": { "strategy": "regex", "patterns": ["Base:\\s*(\\S+)"] },
                    "fees": { "strategy": "regex", "patterns": ["Fees:\\s*(\\S+)"] },
                    "schedule": { "strategy": "table", "columns": 4 }
                }
            },
            "validate": {
                "totals": [{ "total": "total_due", "parts": ["base", "fees"] }]
            }
        }
    ]
}"#;

const LOAN_TEXT: &str = "LOAN AGREEMENT\n\
Promissory Note\n\
Loan Number: AB123\n\
Principal Amount: $1,100.00\n\
Base: 1,100.00\n\
Fees: 100.00\n\
Total Due\n\
- $1,200.00\n\
footer";

fn assert_send_sync<T: Send + Sync>() {}

#[test]
fn classifies_by_anchor_count() {
    let rules = RuleSet::from_json_str(RULES).unwrap();
    let result = classify(LOAN_TEXT, rules.variants());

    assert_eq!(result.variant_id.as_deref(), Some("promissory_loan"));
    assert_eq!(result.score, 2);
    assert!((result.confidence - 0.8).abs() < 1e-6);
}

#[test]
fn end_to_end_loan_extraction() {
    let pipeline = DocumentPipeline::new(RuleSet::from_json_str(RULES).unwrap());
    let extraction = pipeline.extract(LOAN_TEXT).unwrap();

    assert_eq!(extraction.variant, "promissory_loan");
    let fields = &extraction.fields;
    assert_eq!(
        fields.names().collect::<Vec<_>>(),
        vec!["base", "fees", "loan_number", "principal", "schedule", "total_due"]
    );
    assert_eq!(fields.value("loan_number"), Some("AB123"));
    assert_eq!(fields.value("principal"), Some("$1,100.00"));
    assert_eq!(fields.value("total_due"), Some("$1,200.00"));

    let schedule = fields.get("schedule").unwrap();
    assert_eq!(schedule.value, None);
    assert!(schedule.evidence.is_config_error());

    let report = fields.validation.as_ref().unwrap();
    assert!(report.valid);

    let json = serde_json::to_value(&extraction).unwrap();
    assert_eq!(json["fields"]["_validation"]["checks"][0]["status"], "ok");
    assert_eq!(json["fields"]["loan_number"]["evidence"]["reason"], "regex_match");
    assert_eq!(json["fields"]["schedule"]["evidence"]["reason"], "invalid_config");
}

#[test]
fn unmatched_document_is_not_unreadable() {
    let pipeline = DocumentPipeline::new(RuleSet::from_json_str(RULES).unwrap());

    assert!(matches!(
        pipeline.extract("Purchase Order 42"),
        Err(DocsiftError::NoVariantMatched(_))
    ));
    assert!(matches!(
        pipeline.extract(""),
        Err(DocsiftError::UnreadableDocument(_))
    ));

    let fallback = DocumentPipeline::new(RuleSet::from_json_str(RULES).unwrap())
        .with_policy(NoVariantPolicy::Fallback("docusign_lease".to_string()));
    let extraction = fallback.extract("Purchase Order 42").unwrap();
    assert_eq!(extraction.variant, "docusign_lease");
    assert_eq!(extraction.fields.value("currency"), Some("USD"));
    assert_eq!(extraction.fields.value("lessee"), None);
}

#[test]
fn orchestrator_covers_every_declared_field() {
    let rules = RuleSet::from_json_str(RULES).unwrap();
    for variant in rules.variants() {
        for text in ["", LOAN_TEXT, "Lessee\nJane"] {
            let results = extract_fields(text, &variant.fields);
            let mut declared: Vec<_> = variant.field_names().collect();
            declared.sort_unstable();
            assert_eq!(results.names().collect::<Vec<_>>(), declared);
        }
    }
}

#[test]
fn regex_evidence_names_pattern() {
    let config = FieldStrategyConfig::regex([r"Loan Number: (?P<val>\w+)"]).unwrap();
    let result = config.apply("Loan Number: AB123");

    assert_eq!(result.value.as_deref(), Some("AB123"));
    assert_eq!(result.confidence, 0.85);
    match result.evidence {
        Evidence::RegexMatch { pattern } => assert!(pattern.contains("Loan Number")),
        other => panic!("unexpected evidence {:?}", other),
    }
}

#[test]
fn tie_break_is_stable_across_calls() {
    let variants = vec![
        VariantDefinition::new("first").with_anchors(["Agreement", "Lease"]),
        VariantDefinition::new("second").with_anchors(["Lessor", "Lessee"]),
    ];
    let text = "Lease Agreement between Lessor and Lessee";

    for _ in 0..10 {
        assert_eq!(classify(text, &variants).variant_id.as_deref(), Some("first"));
    }
}

#[test]
fn consolidate_page_order() {
    let fields: Vec<ExtractedField> = [("rate", "5%", 1), ("rate", "5.5%", 2), ("term", "36", 2)]
        .into_iter()
        .map(|(key, value, page)| ExtractedField {
            key: key.to_string(),
            value: value.to_string(),
            page,
            method: "kv-line".to_string(),
            confidence: 0.6,
        })
        .collect();

    let schema = consolidate(&fields);
    assert_eq!(schema.get("rate").unwrap().values(), vec!["5%", "5.5%"]);
    assert_eq!(schema.get("term").unwrap().values(), vec!["36"]);
    assert_eq!(consolidate(fields.iter().chain(&fields)), schema);
}

#[test]
fn shared_across_threads() {
    assert_send_sync::<RuleSet>();
    assert_send_sync::<DocumentPipeline>();

    let pipeline = std::sync::Arc::new(DocumentPipeline::new(RuleSet::from_json_str(RULES).unwrap()));
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let pipeline = pipeline.clone();
            std::thread::spawn(move || pipeline.extract(LOAN_TEXT).unwrap().variant)
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), "promissory_loan");
    }
}
