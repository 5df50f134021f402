//! Data models: configuration, rule sets and field results.

pub mod config;
pub mod field;
pub mod rules;
