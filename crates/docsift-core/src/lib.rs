//! Core library for loan/lease document extraction.
//!
//! This crate provides:
//! - Variant classification by anchor phrases
//! - Strategy-driven field extraction (regex, literal, anchor window)
//! - Totals validation over extracted fields
//! - Hint-based schema discovery with provenance consolidation
//! - PDF-to-text conversion (`native` feature)

pub mod classify;
pub mod discover;
pub mod error;
pub mod extract;
pub mod models;
#[cfg(feature = "native")]
pub mod pdf;
pub mod pipeline;

pub use classify::{classify, ClassificationResult};
pub use discover::{consolidate, discover, ConsolidatedSchema, DiscoveryResult, ExtractedField, Hints};
pub use error::{DocsiftError, Result};
pub use extract::{extract_fields, FieldResults, FieldStrategyConfig};
pub use models::config::DocsiftConfig;
pub use models::field::{Evidence, FieldResult};
pub use models::rules::{FieldRule, RuleSet, VariantDefinition, VALIDATION_KEY};
#[cfg(feature = "native")]
pub use pdf::{pdf_to_text, PdfContent, PdfExtractor, PdfProcessor};
pub use pipeline::{DocumentExtraction, DocumentPipeline, NoVariantPolicy};
