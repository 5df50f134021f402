//! Per-field extraction results and their evidence trail.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Trace explaining how a field value was derived, or why it was not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Evidence {
    /// A regex pattern matched; `pattern` is the one that won.
    RegexMatch { pattern: String },
    /// None of the declared patterns matched.
    NoRegexMatch { patterns_tried: usize },
    /// Value came from a literal rule.
    Literal,
    /// Value was read from a line relative to an anchor line.
    AnchorWindow {
        anchor: String,
        line: usize,
        picked: usize,
    },
    /// No line contained the anchor phrase.
    AnchorNotFound { anchor: String },
    /// The field's rule is broken, not the document.
    InvalidConfig { error: String },
}

impl Evidence {
    /// Whether this evidence reports a broken rule rather than a document miss.
    pub fn is_config_error(&self) -> bool {
        matches!(self, Evidence::InvalidConfig { .. })
    }
}

impl fmt::Display for Evidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Evidence::RegexMatch { pattern } => write!(f, "pattern {}", pattern),
            Evidence::NoRegexMatch { patterns_tried } => {
                write!(f, "no regex match ({} patterns tried)", patterns_tried)
            }
            Evidence::Literal => write!(f, "literal"),
            Evidence::AnchorWindow { anchor, line, picked } => {
                write!(f, "anchor {:?} on line {}, picked line {}", anchor, line, picked)
            }
            Evidence::AnchorNotFound { anchor } => write!(f, "anchor not found: {:?}", anchor),
            Evidence::InvalidConfig { error } => write!(f, "invalid rule: {}", error),
        }
    }
}

/// Outcome of running one strategy against one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldResult {
    /// Extracted value, `None` when nothing was found.
    pub value: Option<String>,
    /// Confidence score (0.0 - 1.0).
    pub confidence: f32,
    /// How the value was derived.
    pub evidence: Evidence,
}

impl FieldResult {
    pub fn found(value: impl Into<String>, confidence: f32, evidence: Evidence) -> Self {
        Self {
            value: Some(value.into()),
            confidence,
            evidence,
        }
    }

    pub fn missing(evidence: Evidence) -> Self {
        Self {
            value: None,
            confidence: 0.0,
            evidence,
        }
    }

    pub fn is_found(&self) -> bool {
        self.value.is_some()
    }
}
