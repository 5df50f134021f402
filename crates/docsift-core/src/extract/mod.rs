//! Strategy-driven field extraction.

mod orchestrator;
pub mod strategies;
pub mod validate;

pub use orchestrator::{extract_field, extract_fields, FieldResults};
pub use strategies::{apply, FieldStrategyConfig, Strategy};
pub use validate::{validate_totals, TotalsRule, ValidationReport};
