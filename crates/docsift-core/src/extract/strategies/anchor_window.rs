//! Anchor-window strategy: read a value a fixed number of lines below an anchor.

use super::patterns::{split_lines, LABEL_PREFIX};
use super::{Strategy, ANCHOR_WINDOW_CONFIDENCE};
use crate::models::field::{Evidence, FieldResult};

/// Lines to skip past the anchor when the rule does not say.
pub const DEFAULT_LINES_AFTER: usize = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnchorWindowStrategy {
    pub anchor: String,
    pub lines_after: usize,
}

impl AnchorWindowStrategy {
    pub fn new(anchor: impl Into<String>, lines_after: usize) -> Self {
        Self {
            anchor: anchor.into(),
            lines_after,
        }
    }
}

impl Strategy for AnchorWindowStrategy {
    fn apply(&self, text: &str) -> FieldResult {
        let lines = split_lines(text);
        let needle = self.anchor.to_lowercase();

        let Some(line) = lines
            .iter()
            .position(|l| l.to_lowercase().contains(&needle))
        else {
            return FieldResult::missing(Evidence::AnchorNotFound {
                anchor: self.anchor.clone(),
            });
        };

        let picked = line.saturating_add(self.lines_after).min(lines.len() - 1);
        let candidate = LABEL_PREFIX.replace(lines[picked].trim(), "");

        FieldResult::found(
            candidate.trim(),
            ANCHOR_WINDOW_CONFIDENCE,
            Evidence::AnchorWindow {
                anchor: self.anchor.clone(),
                line,
                picked,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_bullet_prefix() {
        let text = "Total Due\n- $1,200.00\nfooter";
        let result = AnchorWindowStrategy::new("Total Due", 1).apply(text);

        assert_eq!(result.value.as_deref(), Some("$1,200.00"));
        assert_eq!(result.confidence, ANCHOR_WINDOW_CONFIDENCE);
        assert_eq!(
            result.evidence,
            Evidence::AnchorWindow {
                anchor: "Total Due".to_string(),
                line: 0,
                picked: 1,
            }
        );
    }

    #[test]
    fn test_anchor_match_is_case_insensitive_substring() {
        let text = "header\nThe TOTAL DUE amount is\n: 99.00";
        let result = AnchorWindowStrategy::new("total due", 1).apply(text);
        assert_eq!(result.value.as_deref(), Some("99.00"));
    }

    #[test]
    fn test_first_anchor_line_wins() {
        let text = "Lessee\nAcme Corp\nLessee\nOther Co";
        let result = AnchorWindowStrategy::new("Lessee", 1).apply(text);
        assert_eq!(result.value.as_deref(), Some("Acme Corp"));
    }

    #[test]
    fn test_offset_clamped_to_last_line() {
        let text = "intro\nMaturity Date\n  • 01/01/2030  ";
        let result = AnchorWindowStrategy::new("Maturity Date", 5).apply(text);

        assert_eq!(result.value.as_deref(), Some("01/01/2030"));
        assert!(matches!(result.evidence, Evidence::AnchorWindow { line: 1, picked: 2, .. }));
    }

    #[test]
    fn test_zero_offset_reads_anchor_line() {
        let result = AnchorWindowStrategy::new("Rate", 0).apply("Rate: 5%");
        assert_eq!(result.value.as_deref(), Some("Rate: 5%"));
    }

    #[test]
    fn test_anchor_missing() {
        let result = AnchorWindowStrategy::new("Security Deposit", 1).apply("Rent\n$900");

        assert_eq!(result.value, None);
        assert_eq!(result.confidence, 0.0);
        assert_eq!(
            result.evidence,
            Evidence::AnchorNotFound {
                anchor: "Security Deposit".to_string()
            }
        );
    }
}
