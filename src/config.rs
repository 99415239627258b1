//! Configuration for refmap.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (REFMAP_API_BASE, REFMAP_DOWNLOAD_DIR)
//! 2. Config file (.refmap/config.yaml)
//! 3. Defaults (no API base, the user's download directory)
//!
//! Config file discovery:
//! - Searches current directory and parents for .refmap/config.yaml
//! - Paths in config file are relative to the config file's project root

use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::domain::Category;

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<Result<ResolvedConfig, String>> = OnceLock::new();

pub const ENV_API_BASE: &str = "REFMAP_API_BASE";
pub const ENV_DOWNLOAD_DIR: &str = "REFMAP_DOWNLOAD_DIR";

const DEFAULT_TIMEOUT_SECONDS: u64 = 60;

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub downloads: DownloadsConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceConfig {
    /// Base URL of the analysis service
    pub api_base: Option<String>,
    /// Per-request timeout for transfers
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DownloadsConfig {
    /// Download directory (relative to the project root)
    pub dir: Option<String>,
    /// Category to fetch when none is named
    pub preferred: Option<String>,
}

/// Resolved configuration with absolute paths
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedConfig {
    /// Base URL joined onto server paths, if any
    pub api_base: Option<String>,
    /// Where downloads are written
    pub download_dir: PathBuf,
    /// Category picked when several are available
    pub preferred: Category,
    /// Transfer timeout in seconds
    pub timeout_seconds: u64,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
}

impl ResolvedConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// Find config file by searching `start` and its parents
fn find_config_file(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();

    loop {
        let config_path = current.join(".refmap").join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Resolve a path that may be relative to the project root
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
            .canonicalize()
            .unwrap_or_else(|_| base.join(path_str))
    }
}

/// Non-blank environment variable
fn env_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Combine a config file (if any) with environment overrides
fn resolve(config_file: Option<PathBuf>, env: impl Fn(&str) -> Option<String>) -> Result<ResolvedConfig> {
    let default_dir = dirs::download_dir().unwrap_or_else(|| PathBuf::from("."));

    let (file_api_base, file_dir, preferred, timeout_seconds) = if let Some(ref config_path) = config_file {
        let config = load_config_file(config_path)?;

        // Base directory is the parent of .refmap/ (i.e., grandparent of config.yaml)
        let base_dir = config_path
            .parent()
            .and_then(|p| p.parent())
            .unwrap_or(Path::new("."));

        let dir = config
            .downloads
            .dir
            .as_deref()
            .map(|d| resolve_path(base_dir, d));

        let preferred = match config.downloads.preferred.as_deref() {
            Some(raw) => raw
                .parse::<Category>()
                .with_context(|| format!("Invalid downloads.preferred in {}", config_path.display()))?,
            None => Category::Excel,
        };

        (
            config.service.api_base,
            dir,
            preferred,
            config
                .service
                .timeout_seconds
                .unwrap_or(DEFAULT_TIMEOUT_SECONDS),
        )
    } else {
        (None, None, Category::Excel, DEFAULT_TIMEOUT_SECONDS)
    };

    let api_base = env(ENV_API_BASE).or(file_api_base);
    let download_dir = env(ENV_DOWNLOAD_DIR)
        .map(PathBuf::from)
        .or(file_dir)
        .unwrap_or(default_dir);

    Ok(ResolvedConfig {
        api_base,
        download_dir,
        preferred,
        timeout_seconds,
        config_file,
    })
}

/// Load configuration from all sources
fn load_config() -> Result<ResolvedConfig> {
    let cwd = std::env::current_dir().context("Failed to determine current directory")?;
    resolve(find_config_file(&cwd), env_var)
}

/// Get the global configuration (loads once, then cached)
pub fn config() -> Result<&'static ResolvedConfig> {
    let result = CONFIG.get_or_init(|| load_config().map_err(|e| e.to_string()));

    match result {
        Ok(config) => Ok(config),
        Err(e) => anyhow::bail!("{}", e),
    }
}

/// Force reload configuration (useful for testing)
pub fn reload_config() -> Result<ResolvedConfig> {
    load_config()
}
