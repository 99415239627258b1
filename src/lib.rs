//! refmap - Normalize processing responses into download references
//!
//! The analysis service that produces association-rule files reports
//! where they live in many different shapes: plain strings, arrays,
//! objects with a `filename`/`url`/`path` field, objects tagged with a
//! `format`, nested under arbitrary wrapper keys. refmap recovers one
//! reference per canonical category (`excel`, `csv`).
//!
//! # Architecture
//!
//! - Sources are loaded into a `SourceGraph` (containers have identity,
//!   so shared and cyclic structures are representable)
//! - The normalizer walks every source once, first match wins
//! - Adapters turn a reference into a fetchable locator and download it
//!
//! # Modules
//!
//! - `adapters`: Locator planning and HTTP transfer
//! - `core`: Normalization logic (aliases, extraction, merge)
//! - `domain`: Data structures (Category, SourceGraph, CanonicalMapping)
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Normalize raw payloads
//! refmap normalize status.json
//!
//! # Show where each file of a response can be fetched
//! refmap resolve response.json
//!
//! # Download the CSV rules table
//! refmap download response.json --category csv
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;

// Re-export main types at crate root for convenience
pub use crate::core::{normalize, normalize_json, normalize_response, resolve_category, Normalizer};
pub use adapters::{HttpTransfer, Locator, Transfer, TransferReport};
pub use domain::{CanonicalMapping, Category, GraphError, Node, NodeId, Scalar, SourceGraph};
