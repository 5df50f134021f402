//! Field extraction strategies.
//!
//! Each field of a variant names one strategy kind plus its parameters.
//! Configuration is turned into a [`FieldStrategyConfig`] once, when the
//! rule set is built; applying it to a document never fails, it only
//! produces a [`FieldResult`] with a value or an explanation.

mod anchor_window;
mod regex_list;
pub mod patterns;

pub use anchor_window::AnchorWindowStrategy;
pub use regex_list::RegexStrategy;

use serde_json::Value;

use crate::error::StrategyConfigError;
use crate::models::field::{Evidence, FieldResult};

/// Confidence reported for a regex match.
pub const REGEX_CONFIDENCE: f32 = 0.85;
/// Confidence reported for a literal value.
pub const LITERAL_CONFIDENCE: f32 = 0.99;
/// Confidence reported for an anchor-window pick.
pub const ANCHOR_WINDOW_CONFIDENCE: f32 = 0.7;

/// Trait for field extraction strategies.
pub trait Strategy {
    /// Run the strategy against document text.
    fn apply(&self, text: &str) -> FieldResult;
}

/// Returns a configured value regardless of the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiteralStrategy {
    pub value: String,
}

impl Strategy for LiteralStrategy {
    fn apply(&self, _text: &str) -> FieldResult {
        FieldResult::found(self.value.clone(), LITERAL_CONFIDENCE, Evidence::Literal)
    }
}

/// A validated strategy configuration, one case per supported kind.
#[derive(Debug, Clone)]
pub enum FieldStrategyConfig {
    Regex(RegexStrategy),
    Literal(LiteralStrategy),
    AnchorWindow(AnchorWindowStrategy),
}

impl FieldStrategyConfig {
    /// Build a regex strategy; patterns are tried in the given order.
    pub fn regex<I, S>(patterns: I) -> Result<Self, StrategyConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        RegexStrategy::new(patterns).map(Self::Regex)
    }

    pub fn literal(value: impl Into<String>) -> Self {
        Self::Literal(LiteralStrategy {
            value: value.into(),
        })
    }

    pub fn anchor_window(anchor: impl Into<String>, lines_after: usize) -> Self {
        Self::AnchorWindow(AnchorWindowStrategy::new(anchor, lines_after))
    }

    /// Parse one entry of a variant's `extract.fields` section.
    ///
    /// The entry is an object whose `strategy` key selects the kind; the
    /// remaining keys are kind-specific parameters.
    pub fn from_value(value: &Value) -> Result<Self, StrategyConfigError> {
        let kind = value
            .get("strategy")
            .and_then(Value::as_str)
            .ok_or(StrategyConfigError::MissingKind)?;

        match kind {
            "regex" => {
                let patterns = value
                    .get("patterns")
                    .and_then(Value::as_array)
                    .ok_or_else(|| invalid("regex", "patterns", "expected a list of strings"))?;
                let patterns = patterns
                    .iter()
                    .map(|p| {
                        p.as_str()
                            .ok_or_else(|| invalid("regex", "patterns", "expected a list of strings"))
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Self::regex(patterns)
            }
            "literal" => match value.get("value") {
                Some(Value::String(s)) => Ok(Self::literal(s.clone())),
                Some(v @ (Value::Number(_) | Value::Bool(_))) => Ok(Self::literal(v.to_string())),
                _ => Err(invalid("literal", "value", "expected a string, number or bool")),
            },
            "anchor_window" => {
                let anchor = value
                    .get("anchor")
                    .and_then(Value::as_str)
                    .filter(|a| !a.is_empty())
                    .ok_or_else(|| invalid("anchor_window", "anchor", "expected a non-empty string"))?;
                let lines_after = match value.get("window_lines_after") {
                    None | Some(Value::Null) => anchor_window::DEFAULT_LINES_AFTER,
                    Some(v) => v
                        .as_u64()
                        .and_then(|n| usize::try_from(n).ok())
                        .ok_or_else(|| {
                            invalid("anchor_window", "window_lines_after", "expected a non-negative integer")
                        })?,
                };
                Ok(Self::anchor_window(anchor, lines_after))
            }
            other => Err(StrategyConfigError::UnknownKind(other.to_string())),
        }
    }

    /// The configuration name of this strategy kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Regex(_) => "regex",
            Self::Literal(_) => "literal",
            Self::AnchorWindow(_) => "anchor_window",
        }
    }
}

impl Strategy for FieldStrategyConfig {
    fn apply(&self, text: &str) -> FieldResult {
        match self {
            Self::Regex(s) => s.apply(text),
            Self::Literal(s) => s.apply(text),
            Self::AnchorWindow(s) => s.apply(text),
        }
    }
}

/// Apply a strategy configuration to document text.
pub fn apply(config: &FieldStrategyConfig, text: &str) -> FieldResult {
    config.apply(text)
}

fn invalid(kind: &'static str, param: &'static str, reason: &str) -> StrategyConfigError {
    StrategyConfigError::InvalidParameter {
        kind,
        param,
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_literal_ignores_text() {
        let config = FieldStrategyConfig::literal("USD");
        for text in ["", "anything at all", "Currency: EUR"] {
            let result = apply(&config, text);
            assert_eq!(result.value.as_deref(), Some("USD"));
            assert_eq!(result.confidence, LITERAL_CONFIDENCE);
            assert_eq!(result.evidence, Evidence::Literal);
        }
    }

    #[test]
    fn test_from_value_kinds() {
        let regex = FieldStrategyConfig::from_value(&json!({
            "strategy": "regex",
            "patterns": ["Loan Number: (\\w+)"]
        }))
        .unwrap();
        assert_eq!(regex.kind(), "regex");

        let literal = FieldStrategyConfig::from_value(&json!({
            "strategy": "literal",
            "value": 12
        }))
        .unwrap();
        assert_eq!(apply(&literal, "").value.as_deref(), Some("12"));

        let window = FieldStrategyConfig::from_value(&json!({
            "strategy": "anchor_window",
            "anchor": "Total Due"
        }))
        .unwrap();
        match window {
            FieldStrategyConfig::AnchorWindow(s) => assert_eq!(s.lines_after, 1),
            other => panic!("unexpected strategy {:?}", other),
        }
    }

    #[test]
    fn test_from_value_unknown_kind() {
        let err = FieldStrategyConfig::from_value(&json!({
            "strategy": "table_cell",
            "column": 3
        }))
        .unwrap_err();
        assert_eq!(err, StrategyConfigError::UnknownKind("table_cell".to_string()));
        assert_eq!(err.to_string(), "unknown strategy table_cell");
    }

    #[test]
    fn test_from_value_malformed() {
        assert_eq!(
            FieldStrategyConfig::from_value(&json!({ "patterns": [] })).unwrap_err(),
            StrategyConfigError::MissingKind
        );
        assert!(matches!(
            FieldStrategyConfig::from_value(&json!({ "strategy": "regex" })),
            Err(StrategyConfigError::InvalidParameter { param: "patterns", .. })
        ));
        assert!(matches!(
            FieldStrategyConfig::from_value(&json!({ "strategy": "regex", "patterns": ["(unclosed"] })),
            Err(StrategyConfigError::InvalidPattern { .. })
        ));
        assert!(matches!(
            FieldStrategyConfig::from_value(&json!({
                "strategy": "anchor_window",
                "anchor": "Total",
                "window_lines_after": -1
            })),
            Err(StrategyConfigError::InvalidParameter { param: "window_lines_after", .. })
        ));
        assert!(matches!(
            FieldStrategyConfig::from_value(&json!({ "strategy": "literal" })),
            Err(StrategyConfigError::InvalidParameter { param: "value", .. })
        ));
    }
}
