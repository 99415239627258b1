//! Core normalization logic.
//!
//! This module contains:
//! - Alias: Raw key spellings to categories
//! - Extract: First usable reference string in a value
//! - Merge: The normalizer driving both over many sources
//! - Response: Where a processing response keeps its references

pub mod alias;
pub mod extract;
pub mod merge;
pub mod response;

// Re-export commonly used types
pub use alias::{aliases_of, resolve_category};
pub use extract::{extract_string, Extractor, VALUE_FIELDS};
pub use merge::{normalize, normalize_json, Normalizer, FORMAT_HINT_FIELDS};
pub use response::{collect_sources, normalize_response, response_failure, RESPONSE_SOURCE_PATHS};
