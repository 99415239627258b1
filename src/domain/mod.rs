//! Domain types for refmap.
//!
//! This module contains the core data structures:
//! - Category: The closed set of download categories
//! - SourceGraph: Loosely-structured input values
//! - CanonicalMapping: The normalized output

pub mod category;
pub mod mapping;
pub mod source;

// Re-export commonly used types
pub use category::Category;
pub use mapping::CanonicalMapping;
pub use source::{GraphError, Node, NodeId, Scalar, SourceGraph};
