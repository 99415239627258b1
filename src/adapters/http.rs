//! HTTP transfer for resolved download locators.

use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use percent_encoding::percent_decode_str;
use regex::Regex;
use reqwest::header::CONTENT_DISPOSITION;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use super::{Locator, Transfer, TransferReport};

static DISPOSITION_EXTENDED: OnceLock<Regex> = OnceLock::new();
static DISPOSITION_PLAIN: OnceLock<Regex> = OnceLock::new();

/// Transfer over plain HTTP(S) GET
pub struct HttpTransfer {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpTransfer {
    /// Create a transfer with a per-request timeout
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            timeout,
        }
    }
}

#[async_trait]
impl Transfer for HttpTransfer {
    fn name(&self) -> &str {
        "http"
    }

    async fn fetch(&self, locator: &Locator, dest_dir: &Path) -> Result<TransferReport> {
        if !locator.is_absolute() {
            anyhow::bail!(
                "Cannot fetch '{}' without an API base (set REFMAP_API_BASE or api_base in config)",
                locator
            );
        }

        debug!(href = %locator, "Requesting download");
        let response = self
            .client
            .get(locator.href())
            .timeout(self.timeout)
            .send()
            .await
            .with_context(|| format!("Failed to request {}", locator))?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("Download failed with status {} for {}", status, locator);
        }

        let served_name = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|value| value.to_str().ok())
            .and_then(filename_from_disposition);

        let body = response
            .bytes()
            .await
            .with_context(|| format!("Failed to read body of {}", locator))?;

        let filename = safe_file_name(served_name.as_deref().unwrap_or(""))
            .unwrap_or_else(|| fallback_filename(locator));

        tokio::fs::create_dir_all(dest_dir)
            .await
            .with_context(|| format!("Failed to create {}", dest_dir.display()))?;

        let path = dest_dir.join(&filename);
        tokio::fs::write(&path, &body)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;

        let sha256 = hex::encode(Sha256::digest(&body));
        info!(path = %path.display(), bytes = body.len(), "Saved download");

        Ok(TransferReport {
            path,
            bytes: body.len() as u64,
            sha256,
        })
    }
}

/// Filename announced by a `Content-Disposition` header.
///
/// The RFC 5987 `filename*=UTF-8''...` form wins wherever it appears;
/// servers put the ASCII-only `filename=` first as a fallback for old
/// clients. Either form is percent-decoded when it decodes to valid UTF-8.
pub fn filename_from_disposition(header: &str) -> Option<String> {
    let extended = DISPOSITION_EXTENDED.get_or_init(|| {
        Regex::new(r"(?i)filename\*=UTF-8''([^;]+)").expect("disposition pattern is valid")
    });
    let plain = DISPOSITION_PLAIN.get_or_init(|| {
        Regex::new(r#"(?i)filename=\s*"?([^";]+)"?"#).expect("disposition pattern is valid")
    });

    let raw = extended
        .captures(header)
        .or_else(|| plain.captures(header))?
        .get(1)?
        .as_str()
        .trim();

    let decoded = percent_decode_str(raw)
        .decode_utf8()
        .map(|name| name.into_owned())
        .unwrap_or_else(|_| raw.to_string());
    Some(decoded)
}

/// Final path component of a name, if it has a usable one
fn safe_file_name(name: &str) -> Option<String> {
    Path::new(name.trim())
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .filter(|n| !n.is_empty())
}

/// Name to save under when the server does not announce one
pub fn fallback_filename(locator: &Locator) -> String {
    let candidate = match locator {
        Locator::Named { filename, .. } => filename.clone(),
        Locator::Remote { href } | Locator::ServerPath { href } => {
            let path = href.split(['?', '#']).next().unwrap_or_default();
            let last = path.rsplit('/').next().unwrap_or_default();
            percent_decode_str(last).decode_utf8_lossy().into_owned()
        }
    };

    safe_file_name(&candidate).unwrap_or_else(|| "download".to_string())
}
