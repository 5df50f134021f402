//! Anchor-based variant classification.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::rules::VariantDefinition;

/// Evidence reported when no variant qualifies.
pub const NO_MATCH_EVIDENCE: &str = "no anchors matched";

/// Outcome of classifying one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// Winning variant, `None` when no variant's anchors all matched.
    pub variant_id: Option<String>,
    /// Confidence score (0.0 - 0.99).
    pub confidence: f32,
    /// Number of anchors the winning variant matched.
    pub score: usize,
    /// Human-readable justification.
    pub evidence: String,
}

impl ClassificationResult {
    fn no_match() -> Self {
        Self {
            variant_id: None,
            confidence: 0.0,
            score: 0,
            evidence: NO_MATCH_EVIDENCE.to_string(),
        }
    }

    pub fn is_match(&self) -> bool {
        self.variant_id.is_some()
    }
}

/// Confidence for a variant that matched `score` anchors.
pub fn anchor_confidence(score: usize) -> f32 {
    (0.6 + 0.1 * score as f64).min(0.99) as f32
}

/// Pick the variant whose anchors all appear in `text`.
///
/// A variant qualifies when every one of its anchors is a case-insensitive
/// substring of the text; variants without anchors never qualify. More
/// anchors means a stronger signal. On equal scores the variant declared
/// first wins.
pub fn classify(text: &str, variants: &[VariantDefinition]) -> ClassificationResult {
    let haystack = text.to_lowercase();
    let mut best: Option<(&VariantDefinition, usize, Vec<String>)> = None;

    for variant in variants {
        if variant.anchors.is_empty() {
            continue;
        }

        let anchors: Vec<String> = variant.anchors.iter().map(|a| a.to_lowercase()).collect();
        if !anchors.iter().all(|a| haystack.contains(a.as_str())) {
            continue;
        }

        let score = anchors.len();
        debug!("Variant {} matched {} anchors", variant.id, score);

        if best.as_ref().is_none_or(|(_, top, _)| score > *top) {
            best = Some((variant, score, anchors));
        }
    }

    match best {
        Some((variant, score, anchors)) => ClassificationResult {
            variant_id: Some(variant.id.clone()),
            confidence: anchor_confidence(score),
            score,
            evidence: anchor_evidence(anchors),
        },
        None => {
            debug!("No variant matched among {} candidates", variants.len());
            ClassificationResult::no_match()
        }
    }
}

/// Renders as `anchors_all_of=['loan agreement', 'promissory']`.
fn anchor_evidence(anchors: Vec<String>) -> String {
    let quoted: Vec<String> = anchors.iter().map(|a| format!("'{}'", a)).collect();
    format!("anchors_all_of=[{}]", quoted.join(", "))
}
