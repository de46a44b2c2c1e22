//! Config file discovery and parsing.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Config file names to search for, in order of preference
const CONFIG_FILES: &[&str] = &[
    ".premonitionrc.yml",
    ".premonitionrc.yaml",
    ".premonitionrc.json",
    ".premonitionrc",
];

/// Run defaults read from a config file. Every key is optional; command-line
/// flags take precedence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FileConfig {
    pub url: Option<String>,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    pub verify_tls: Option<bool>,
    pub bucket_size: Option<usize>,
    pub concurrency: Option<usize>,
    /// Request timeout in seconds
    pub timeout: Option<u64>,
    /// Connection timeout in seconds
    pub connect_timeout: Option<u64>,
    /// Number of retry attempts on failure
    pub retry: Option<u32>,
    pub wordlist: Option<PathBuf>,
    pub document: Option<PathBuf>,
}

/// Find a config file by walking up the directory tree from `start_dir`.
#[tracing::instrument(fields(start = %start_dir.display()))]
pub fn find_config(start_dir: &Path) -> Option<PathBuf> {
    let mut current_dir = start_dir.to_path_buf();
    let mut checked_dirs = 0;

    loop {
        tracing::trace!(dir = %current_dir.display(), "Checking directory for config files");
        for file_name in CONFIG_FILES {
            let config_path = current_dir.join(file_name);
            if config_path.is_file() {
                tracing::info!(path = %config_path.display(), checked_dirs, "Found config file");
                return Some(config_path);
            }
        }

        checked_dirs += 1;
        if !current_dir.pop() {
            tracing::debug!(checked_dirs, "No config file found");
            return None;
        }
    }
}

/// Load a config file, detecting the format from its extension.
#[tracing::instrument(fields(path = %path.display()))]
pub fn load_config(path: &Path) -> Result<FileConfig> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    load_config_from_str(&contents, path)
}

/// Parse config contents. The path is used for format detection and errors.
pub fn load_config_from_str(contents: &str, path: &Path) -> Result<FileConfig> {
    let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("");

    let config = match extension {
        "yml" | "yaml" => parse_yaml(contents, path)?,
        "json" => parse_json(contents, path)?,
        // No extension - try YAML first, then JSON
        "" if file_name == ".premonitionrc" => {
            parse_yaml(contents, path).or_else(|_| parse_json(contents, path))?
        }
        _ => bail!("Unsupported config format: {}", path.display()),
    };

    tracing::debug!(has_url = config.url.is_some(), "Config loaded");
    Ok(config)
}

fn parse_yaml(contents: &str, path: &Path) -> Result<FileConfig> {
    serde_saphyr::from_str(contents)
        .with_context(|| format!("YAML parse error in {}", path.display()))
}

fn parse_json(contents: &str, path: &Path) -> Result<FileConfig> {
    serde_json::from_str(contents)
        .with_context(|| format!("JSON parse error in {}", path.display()))
}
