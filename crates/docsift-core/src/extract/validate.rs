//! Totals reconciliation over an extracted field map.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::orchestrator::FieldResults;
use super::strategies::patterns::AMOUNT_PATTERN;

/// Per-variant validation rules.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationRules {
    #[serde(default)]
    pub totals: Vec<TotalsRule>,
}

/// The `total` field must equal the sum of the `parts` fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TotalsRule {
    pub total: String,
    pub parts: Vec<String>,
    #[serde(default = "default_tolerance")]
    pub tolerance: Decimal,
}

impl TotalsRule {
    pub fn new<I, S>(total: impl Into<String>, parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            total: total.into(),
            parts: parts.into_iter().map(Into::into).collect(),
            tolerance: default_tolerance(),
        }
    }
}

fn default_tolerance() -> Decimal {
    Decimal::new(1, 2)
}

/// Outcome of checking one totals rule.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TotalsOutcome {
    Ok { total: Decimal, sum: Decimal },
    Mismatch { total: Decimal, sum: Decimal, difference: Decimal },
    /// Some involved fields were missing or not amounts.
    Skipped { unavailable: Vec<String> },
    /// The amounts are too large to add up exactly.
    Overflow,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TotalsCheck {
    pub total: String,
    pub parts: Vec<String>,
    #[serde(flatten)]
    pub outcome: TotalsOutcome,
}

/// All totals checks for one document; `valid` is false on any mismatch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub checks: Vec<TotalsCheck>,
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self {
            valid: true,
            checks: Vec::new(),
        }
    }
}

/// Check each totals rule against the extracted values.
pub fn validate_totals(fields: &FieldResults, rules: &[TotalsRule]) -> ValidationReport {
    let checks: Vec<TotalsCheck> = rules
        .iter()
        .map(|rule| TotalsCheck {
            total: rule.total.clone(),
            parts: rule.parts.clone(),
            outcome: check_rule(fields, rule),
        })
        .collect();

    let valid = !checks
        .iter()
        .any(|c| matches!(c.outcome, TotalsOutcome::Mismatch { .. }));

    debug!("Totals validation: {} checks, valid={}", checks.len(), valid);

    ValidationReport { valid, checks }
}

fn check_rule(fields: &FieldResults, rule: &TotalsRule) -> TotalsOutcome {
    let mut unavailable = Vec::new();
    let mut amount_of = |name: &str| {
        let amount = fields.value(name).and_then(parse_amount);
        if amount.is_none() {
            unavailable.push(name.to_string());
        }
        amount
    };

    let total = amount_of(&rule.total);
    let parts: Vec<Option<Decimal>> = rule.parts.iter().map(|p| amount_of(p)).collect();

    if !unavailable.is_empty() {
        return TotalsOutcome::Skipped { unavailable };
    }

    let total = total.unwrap_or_default();
    let sum = parts
        .into_iter()
        .flatten()
        .try_fold(Decimal::ZERO, |acc, part| acc.checked_add(part));
    let Some((sum, difference)) =
        sum.and_then(|sum| total.checked_sub(sum).map(|diff| (sum, diff.abs())))
    else {
        warn!("Totals check for {} overflowed", rule.total);
        return TotalsOutcome::Overflow;
    };

    if difference > rule.tolerance {
        TotalsOutcome::Mismatch {
            total,
            sum,
            difference,
        }
    } else {
        TotalsOutcome::Ok { total, sum }
    }
}

/// Parse the first US-formatted amount in a value (e.g. "$1,234.56").
pub fn parse_amount(s: &str) -> Option<Decimal> {
    let caps = AMOUNT_PATTERN.captures(s)?;
    let integer_part = caps[1].replace(',', "");
    let amount_str = match caps.get(2) {
        Some(fraction) => format!("{}.{}", integer_part, fraction.as_str()),
        None => integer_part,
    };

    let amount = Decimal::from_str(&amount_str).ok()?;
    if caps[0].starts_with('-') {
        Some(-amount)
    } else {
        Some(amount)
    }
}
