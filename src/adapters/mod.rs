//! Adapter interfaces for fetching normalized references.
//!
//! The normalizer only produces category → reference strings. Adapters
//! decide where a reference points and move the bytes.

pub mod http;
pub mod locator;

use std::path::{Path, PathBuf};

use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;

// Re-export the common pieces
pub use http::HttpTransfer;
pub use locator::{api_url, Locator};

/// Outcome of a completed transfer
#[derive(Debug, Clone, Serialize)]
pub struct TransferReport {
    /// Where the file was written
    pub path: PathBuf,

    /// Bytes written
    pub bytes: u64,

    /// Hex SHA-256 of the content
    pub sha256: String,
}

/// Trait for download transports
#[async_trait]
pub trait Transfer: Send + Sync {
    /// Human-readable transport name
    fn name(&self) -> &str;

    /// Fetch `locator` into `dest_dir`
    async fn fetch(&self, locator: &Locator, dest_dir: &Path) -> Result<TransferReport>;
}
