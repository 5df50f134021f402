//! Regex strategy: ordered pattern list, first match wins.

use regex::{Regex, RegexBuilder};

use super::{Strategy, REGEX_CONFIDENCE};
use crate::error::StrategyConfigError;
use crate::models::field::{Evidence, FieldResult};

/// Tries case-insensitive patterns in declared order.
#[derive(Debug, Clone)]
pub struct RegexStrategy {
    patterns: Vec<Regex>,
}

impl RegexStrategy {
    pub fn new<I, S>(patterns: I) -> Result<Self, StrategyConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|p| {
                let p = p.as_ref();
                RegexBuilder::new(p)
                    .case_insensitive(true)
                    .build()
                    .map_err(|e| StrategyConfigError::InvalidPattern {
                        pattern: p.to_string(),
                        reason: e.to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { patterns })
    }

    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(Regex::as_str)
    }
}

impl Strategy for RegexStrategy {
    fn apply(&self, text: &str) -> FieldResult {
        for pattern in &self.patterns {
            let Some(caps) = pattern.captures(text) else {
                continue;
            };

            // Last participating group, so a label group may precede the value
            let value = caps
                .iter()
                .skip(1)
                .flatten()
                .last()
                .map(|m| m.as_str())
                .unwrap_or(&caps[0]);

            return FieldResult::found(
                value.trim(),
                REGEX_CONFIDENCE,
                Evidence::RegexMatch {
                    pattern: pattern.as_str().to_string(),
                },
            );
        }

        FieldResult::missing(Evidence::NoRegexMatch {
            patterns_tried: self.patterns.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strategy(patterns: &[&str]) -> RegexStrategy {
        RegexStrategy::new(patterns).unwrap()
    }

    #[test]
    fn test_named_group_value() {
        let result = strategy(&[r"Loan Number: (?P<val>\w+)"]).apply("Loan Number: AB123");

        assert_eq!(result.value.as_deref(), Some("AB123"));
        assert_eq!(result.confidence, REGEX_CONFIDENCE);
        assert_eq!(
            result.evidence,
            Evidence::RegexMatch {
                pattern: r"Loan Number: (?P<val>\w+)".to_string()
            }
        );
    }

    #[test]
    fn test_falls_back_to_later_pattern() {
        let result = strategy(&["X", "Loan Number: (.+)"]).apply("Loan Number: 77");
        assert_eq!(result.value.as_deref(), Some("77"));
    }

    #[test]
    fn test_first_pattern_in_list_wins() {
        // Both patterns match; declared order decides, not match position
        let result = strategy(&[r"Rate: (\S+)", r"Amount: (\S+)"])
            .apply("Amount: 5,000.00\nRate: 4.5%");
        assert_eq!(result.value.as_deref(), Some("4.5%"));
    }

    #[test]
    fn test_last_group_wins_over_label_group() {
        let result = strategy(&[r"(Loan|Account)\s*(No\.?|Number):\s*(\w+)"])
            .apply("ACCOUNT NO. : xyz-1");
        assert_eq!(result.value, None);

        let result = strategy(&[r"(Loan|Account)\s*(No\.?|Number)\s*:\s*(\w+)"])
            .apply("ACCOUNT NO. : xyz-1");
        assert_eq!(result.value.as_deref(), Some("xyz"));
    }

    #[test]
    fn test_skips_non_participating_groups() {
        let result = strategy(&[r"Due (?:on (\d+)|in (\w+))"]).apply("Due in March");
        assert_eq!(result.value.as_deref(), Some("March"));

        let result = strategy(&[r"Due (?:in (\w+)|on (\d+))"]).apply("Due in March");
        assert_eq!(result.value.as_deref(), Some("March"));
    }

    #[test]
    fn test_whole_match_trimmed_without_groups() {
        let result = strategy(&[r"\s+lessee\s+"]).apply("the   Lessee  agrees");
        assert_eq!(result.value.as_deref(), Some("Lessee"));
    }

    #[test]
    fn test_case_insensitive() {
        let result = strategy(&[r"interest rate:\s*(\S+)"]).apply("INTEREST RATE: 6.25%");
        assert_eq!(result.value.as_deref(), Some("6.25%"));
    }

    #[test]
    fn test_no_match() {
        let result = strategy(&["alpha", "beta"]).apply("gamma");
        assert_eq!(result.value, None);
        assert_eq!(result.confidence, 0.0);
        assert_eq!(result.evidence, Evidence::NoRegexMatch { patterns_tried: 2 });
        assert!(!result.evidence.is_config_error());
    }
}
