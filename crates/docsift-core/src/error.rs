//! Error types for the docsift-core library.

use thiserror::Error;

/// Main error type for the docsift library.
#[derive(Error, Debug)]
pub enum DocsiftError {
    /// Rule set could not be loaded.
    #[error("rule set error: {0}")]
    Rules(#[from] RuleError),

    /// No usable text could be obtained from the document.
    #[error("unreadable document: {0}")]
    UnreadableDocument(String),

    /// No variant matched and the pipeline is configured to reject.
    #[error("no variant matched; evidence={0}")]
    NoVariantMatched(String),

    /// A variant id was requested that the rule set does not define.
    #[error("unknown variant: {0}")]
    UnknownVariant(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to PDF-to-text conversion.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,
}

/// Errors raised while building a rule set from configuration.
#[derive(Error, Debug)]
pub enum RuleError {
    /// Two variants share an identifier.
    #[error("duplicate variant id: {0}")]
    DuplicateVariant(String),

    /// A variant declares a field under the reserved result key.
    #[error("variant {variant}: field name {field} is reserved")]
    ReservedFieldName { variant: String, field: String },

    /// A variant definition is structurally invalid.
    #[error("variant {variant}: {reason}")]
    InvalidVariant { variant: String, reason: String },

    /// The rule document could not be parsed.
    #[error("failed to parse rules: {0}")]
    Parse(#[from] serde_json::Error),

    /// A rule file could not be read.
    #[error("failed to read rules: {0}")]
    Io(#[from] std::io::Error),
}

/// A field's strategy configuration could not be turned into a strategy.
///
/// These are kept per field rather than failing the whole rule set, so an
/// operator can tell "the rule is broken" apart from "the document lacks
/// this field".
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StrategyConfigError {
    /// The `strategy` key names a kind this engine does not implement.
    #[error("unknown strategy {0}")]
    UnknownKind(String),

    /// The `strategy` key is absent or not a string.
    #[error("missing strategy kind")]
    MissingKind,

    /// A required parameter is absent or has the wrong type.
    #[error("{kind}: invalid parameter {param}: {reason}")]
    InvalidParameter {
        kind: &'static str,
        param: &'static str,
        reason: String,
    },

    /// A regex pattern failed to compile.
    #[error("regex: invalid pattern {pattern}: {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

/// Result type for the docsift library.
pub type Result<T> = std::result::Result<T, DocsiftError>;
