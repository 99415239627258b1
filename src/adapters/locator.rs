//! Turning a canonical reference into something fetchable.
//!
//! References come in three shapes: absolute URLs, server-relative paths
//! and bare filenames. Bare filenames are served by the analysis service
//! under `/api/download/<category>/<filename>`.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Serialize;

use crate::domain::Category;

/// Characters `encodeURIComponent` leaves untouched
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Where a reference points
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Locator {
    /// Absolute http(s) URL, used as-is
    Remote { href: String },

    /// Path on the analysis service
    ServerPath { href: String },

    /// Bare filename routed through the download endpoint
    Named { href: String, filename: String },
}

impl Locator {
    /// Plan how to fetch `reference` for `category`
    pub fn resolve(category: Category, reference: &str, api_base: Option<&str>) -> Self {
        if is_absolute_url(reference) {
            return Locator::Remote {
                href: reference.to_string(),
            };
        }

        if reference.starts_with('/') {
            return Locator::ServerPath {
                href: api_url(api_base, reference),
            };
        }

        let encoded = utf8_percent_encode(reference, COMPONENT).to_string();
        Locator::Named {
            href: api_url(api_base, &format!("/api/download/{}/{}", category, encoded)),
            filename: reference.to_string(),
        }
    }

    pub fn href(&self) -> &str {
        match self {
            Locator::Remote { href } | Locator::ServerPath { href } | Locator::Named { href, .. } => {
                href
            }
        }
    }

    /// Whether the href can be fetched without knowing the service origin
    pub fn is_absolute(&self) -> bool {
        is_absolute_url(self.href())
    }
}

impl std::fmt::Display for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.href())
    }
}

fn is_absolute_url(s: &str) -> bool {
    let lower = s.get(..8).unwrap_or(s).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Join a service path onto the API base.
///
/// Only an http(s) base is used; one trailing slash is dropped from it.
/// Without a usable base the path is returned unchanged.
pub fn api_url(api_base: Option<&str>, path: &str) -> String {
    let base = api_base.map(str::trim).unwrap_or_default();
    if !base.is_empty() && is_absolute_url(base) {
        let base = base.strip_suffix('/').unwrap_or(base);
        format!("{}{}", base, path)
    } else {
        path.to_string()
    }
}
