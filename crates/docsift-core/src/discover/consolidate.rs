//! Folding raw matches into one schema entry per key.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::ExtractedField;

/// Where a value was seen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provenance {
    pub value: String,
    pub page: u32,
    pub confidence: f32,
    pub method: String,
}

impl From<&ExtractedField> for Provenance {
    fn from(field: &ExtractedField) -> Self {
        Self {
            value: field.value.clone(),
            page: field.page,
            confidence: field.confidence,
            method: field.method.clone(),
        }
    }
}

/// A single observed value, or every distinct value in first-seen order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SchemaEntry {
    Single(Provenance),
    Multiple(Vec<Provenance>),
}

impl SchemaEntry {
    /// Distinct values in first-seen order.
    pub fn values(&self) -> Vec<&str> {
        match self {
            SchemaEntry::Single(p) => vec![p.value.as_str()],
            SchemaEntry::Multiple(list) => list.iter().map(|p| p.value.as_str()).collect(),
        }
    }

    fn ingest(self, record: Provenance) -> Self {
        match self {
            SchemaEntry::Single(existing) if existing.value == record.value => {
                SchemaEntry::Single(existing)
            }
            SchemaEntry::Single(existing) => SchemaEntry::Multiple(vec![existing, record]),
            SchemaEntry::Multiple(mut list) => {
                if !list.iter().any(|p| p.value == record.value) {
                    list.push(record);
                }
                SchemaEntry::Multiple(list)
            }
        }
    }
}

/// Key to schema entry, built by folding extracted fields in order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConsolidatedSchema {
    entries: BTreeMap<String, SchemaEntry>,
}

impl ConsolidatedSchema {
    /// Return the schema with one more field applied.
    ///
    /// Re-applying a value already recorded for the key is a no-op.
    pub fn ingest(mut self, field: &ExtractedField) -> Self {
        let record = Provenance::from(field);
        let entry = match self.entries.remove(&field.key) {
            Some(existing) => existing.ingest(record),
            None => SchemaEntry::Single(record),
        };
        self.entries.insert(field.key.clone(), entry);
        self
    }

    pub fn get(&self, key: &str) -> Option<&SchemaEntry> {
        self.entries.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SchemaEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Fold fields, in upstream order, into a schema.
pub fn consolidate<'a, I>(fields: I) -> ConsolidatedSchema
where
    I: IntoIterator<Item = &'a ExtractedField>,
{
    fields
        .into_iter()
        .fold(ConsolidatedSchema::default(), ConsolidatedSchema::ingest)
}
