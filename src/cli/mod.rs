//! Command-line interface for refmap.
//!
//! Provides commands for normalizing raw payloads, resolving the download
//! references of a processing response, fetching them, and inspecting the
//! alias table and configuration.

use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::{info, warn};

use crate::adapters::{HttpTransfer, Locator, Transfer};
use crate::config::{config, ResolvedConfig};
use crate::core::{aliases_of, normalize, normalize_response, response_failure};
use crate::domain::{CanonicalMapping, Category, NodeId, SourceGraph};

/// refmap - Normalize processing responses into download references
#[derive(Parser, Debug)]
#[command(name = "refmap")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Normalize raw sources into a canonical download map
    Normalize {
        /// JSON or YAML files, in precedence order ("-" reads stdin)
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Print single-line JSON
        #[arg(long)]
        compact: bool,
    },

    /// Collect the download references of a processing response
    Resolve {
        /// Response document ("-" reads stdin)
        response: PathBuf,

        /// Download map delivered separately from the response
        #[arg(short, long)]
        downloads: Option<PathBuf>,

        /// Override the configured API base
        #[arg(long)]
        api_base: Option<String>,
    },

    /// Download one category from a processing response
    Download {
        /// Response document ("-" reads stdin)
        response: PathBuf,

        /// Category to fetch (configured preference if not specified)
        #[arg(short, long, value_enum)]
        category: Option<CategoryArg>,

        /// Download map delivered separately from the response
        #[arg(short, long)]
        downloads: Option<PathBuf>,

        /// Output directory (configured download directory if not specified)
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Override the configured API base
        #[arg(long)]
        api_base: Option<String>,
    },

    /// List the aliases each category accepts
    Aliases,

    /// Show resolved configuration (debug)
    Config,
}

/// Category for CLI (maps to Category)
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CategoryArg {
    /// Excel workbook
    Excel,

    /// CSV table
    Csv,
}

impl From<CategoryArg> for Category {
    fn from(c: CategoryArg) -> Self {
        match c {
            CategoryArg::Excel => Category::Excel,
            CategoryArg::Csv => Category::Csv,
        }
    }
}

/// One row of `resolve` output
#[derive(Debug, Serialize)]
struct ResolvedReference<'a> {
    category: Category,
    reference: &'a str,
    locator: Locator,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Normalize { inputs, compact } => normalize_inputs(&inputs, compact),
            Commands::Resolve {
                response,
                downloads,
                api_base,
            } => resolve_response(&response, downloads.as_deref(), api_base),
            Commands::Download {
                response,
                category,
                downloads,
                out,
                api_base,
            } => {
                download(&response, category.map(Category::from), downloads.as_deref(), out, api_base)
                    .await
            }
            Commands::Aliases => show_aliases(),
            Commands::Config => show_config(),
        }
    }
}

/// Read a document from a file, or stdin for "-"
fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read stdin")?;
        Ok(buffer)
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read input file: {}", path.display()))
    }
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}

/// Parse a document into the graph.
///
/// `.yaml`/`.yml` files parse as YAML, stdin as JSON with a YAML retry,
/// anything else as JSON.
pub fn load_document(graph: &mut SourceGraph, path: &Path) -> Result<NodeId> {
    let content = read_input(path)?;

    if is_yaml(path) {
        let value: serde_yaml::Value = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse YAML: {}", path.display()))?;
        return Ok(graph.add_yaml(&value));
    }

    match serde_json::from_str::<serde_json::Value>(&content) {
        Ok(value) => Ok(graph.add_json(&value)),
        Err(json_err) if path == Path::new("-") => {
            let value: serde_yaml::Value = serde_yaml::from_str(&content)
                .with_context(|| format!("stdin is neither JSON ({}) nor YAML", json_err))?;
            Ok(graph.add_yaml(&value))
        }
        Err(e) => Err(e).with_context(|| format!("Failed to parse JSON: {}", path.display())),
    }
}

fn print_json<T: Serialize>(value: &T, compact: bool) -> Result<()> {
    let rendered = if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    println!("{}", rendered);
    Ok(())
}

/// Load a response (and optional separate download map) and normalize it
fn load_response(
    response: &Path,
    downloads: Option<&Path>,
) -> Result<CanonicalMapping> {
    let mut graph = SourceGraph::new();
    let root = load_document(&mut graph, response)?;
    let explicit = downloads
        .map(|path| load_document(&mut graph, path))
        .transpose()?;

    if let Some(reason) = response_failure(&graph, root) {
        warn!("Response does not report success: {}", reason);
    }

    let mapping = normalize_response(&graph, Some(root), explicit);
    info!(found = mapping.len(), "Normalized response");
    Ok(mapping)
}

fn effective_api_base(override_base: Option<String>, config: &ResolvedConfig) -> Option<String> {
    override_base.or_else(|| config.api_base.clone())
}

/// Normalize raw documents
fn normalize_inputs(inputs: &[PathBuf], compact: bool) -> Result<()> {
    let mut graph = SourceGraph::new();
    let mut sources = Vec::with_capacity(inputs.len());
    for input in inputs {
        sources.push(Some(load_document(&mut graph, input)?));
    }

    let mapping = normalize(&graph, &sources);
    if mapping.is_empty() {
        warn!("No download references found");
    }
    print_json(&mapping, compact)
}

/// Print each available reference with its locator
fn resolve_response(
    response: &Path,
    downloads: Option<&Path>,
    api_base: Option<String>,
) -> Result<()> {
    let config = config()?;
    let api_base = effective_api_base(api_base, config);
    let mapping = load_response(response, downloads)?;

    let rows: Vec<ResolvedReference<'_>> = mapping
        .iter()
        .map(|(category, reference)| ResolvedReference {
            category,
            reference,
            locator: Locator::resolve(category, reference, api_base.as_deref()),
        })
        .collect();

    print_json(&rows, false)
}

/// Fetch one category
async fn download(
    response: &Path,
    category: Option<Category>,
    downloads: Option<&Path>,
    out: Option<PathBuf>,
    api_base: Option<String>,
) -> Result<()> {
    let config = config()?;
    let api_base = effective_api_base(api_base, config);
    let mapping = load_response(response, downloads)?;

    let (category, reference) = match category {
        Some(category) => {
            let reference = mapping
                .get(category)
                .with_context(|| format!("No {} download is available in this response", category))?;
            (category, reference)
        }
        None => mapping
            .select(config.preferred)
            .context("No downloads are available in this response")?,
    };

    let locator = Locator::resolve(category, reference, api_base.as_deref());
    let out_dir = out.unwrap_or_else(|| config.download_dir.clone());
    let transfer = HttpTransfer::new(config.timeout());

    info!(%category, transport = transfer.name(), href = %locator, "Downloading");
    let report = transfer.fetch(&locator, &out_dir).await?;

    println!("✓ Saved {} ({} bytes)", report.path.display(), report.bytes);
    println!("  sha256: {}", report.sha256);
    Ok(())
}

/// Show the alias table
fn show_aliases() -> Result<()> {
    for category in Category::ALL {
        println!("{}:", category);
        for alias in aliases_of(category) {
            println!("  {}", alias);
        }
    }
    Ok(())
}

/// Show resolved configuration
fn show_config() -> Result<()> {
    let config = config()?;

    println!("refmap configuration");
    println!("====================");
    match &config.config_file {
        Some(path) => println!("Config file:  {}", path.display()),
        None => println!("Config file:  (none, using defaults)"),
    }
    println!(
        "API base:     {}",
        config.api_base.as_deref().unwrap_or("(none, relative hrefs)")
    );
    println!("Download dir: {}", config.download_dir.display());
    println!("Preferred:    {}", config.preferred);
    println!("Timeout:      {}s", config.timeout_seconds);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_cli_parses_download() {
        let cli = Cli::try_parse_from([
            "refmap", "download", "resp.json", "--category", "csv", "--out", "/tmp/x",
        ])
        .unwrap();

        match cli.command {
            Commands::Download { category, out, .. } => {
                assert!(matches!(category, Some(CategoryArg::Csv)));
                assert_eq!(out, Some(PathBuf::from("/tmp/x")));
            }
            other => panic!("Expected download command, got {:?}", other),
        }
    }

    #[test]
    fn test_normalize_requires_input() {
        assert!(Cli::try_parse_from(["refmap", "normalize"]).is_err());
    }

    #[test]
    fn test_load_document_by_extension() {
        let temp = TempDir::new().unwrap();

        let json_path = temp.path().join("resp.json");
        std::fs::write(&json_path, r#"{"downloadUrls": {"excel": "a.xlsx"}}"#).unwrap();

        let yaml_path = temp.path().join("extra.yml");
        let mut file = std::fs::File::create(&yaml_path).unwrap();
        writeln!(file, "outputFiles:\n  - format: csv\n    path: b.csv").unwrap();

        let mapping = load_response(&json_path, Some(yaml_path.as_path())).unwrap();
        assert_eq!(mapping.get(Category::Excel), Some("a.xlsx"));
        assert_eq!(mapping.get(Category::Csv), Some("b.csv"));

        let mut graph = SourceGraph::new();
        let json_root = load_document(&mut graph, &json_path).unwrap();
        let yaml_root = load_document(&mut graph, &yaml_path).unwrap();
        let mapping = normalize(&graph, &[Some(json_root), Some(yaml_root)]);
        // Raw normalization walks the whole response, not just download locations
        assert_eq!(mapping.len(), 2);
    }

    #[test]
    fn test_load_document_reports_bad_json() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("broken.json");
        std::fs::write(&path, "{not json").unwrap();

        let mut graph = SourceGraph::new();
        let err = load_document(&mut graph, &path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse JSON"));
    }
}
