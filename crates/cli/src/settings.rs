//! Merging command-line flags with config file defaults.

use crate::loader::FileConfig;
use anyhow::{Context, Result};
use premonition::{
    Config, DEFAULT_BUCKET_SIZE, DEFAULT_CONCURRENCY, DEFAULT_CONNECT_TIMEOUT_SECS,
    DEFAULT_TIMEOUT_SECS,
};
use std::path::PathBuf;

/// Flags that can also come from a config file.
#[derive(Debug, Default)]
pub struct Overrides {
    pub url: Option<String>,
    pub headers: Vec<String>,
    pub insecure: bool,
    pub bucket_size: Option<usize>,
    pub concurrency: Option<usize>,
    pub timeout: Option<u64>,
    pub connect_timeout: Option<u64>,
    pub retry: Option<u32>,
    pub wordlist: Option<PathBuf>,
    pub document: Option<PathBuf>,
}

/// Everything a run needs, fully resolved.
#[derive(Debug)]
pub struct RunSettings {
    pub config: Config,
    pub wordlist: PathBuf,
    pub document: PathBuf,
}

/// Parses a header string in "Name: Value" format.
pub fn parse_header(header: &str) -> Result<(String, String)> {
    let Some((name, value)) = header.split_once(':') else {
        anyhow::bail!("Invalid header format: '{header}'. Expected 'Header-Name: Header-Value'");
    };
    let name = name.trim().to_string();
    if name.is_empty() {
        anyhow::bail!("Header name cannot be empty");
    }
    Ok((name, value.trim().to_string()))
}

/// Resolve run settings. Command-line values win over the config file.
pub fn resolve_settings(cli: Overrides, file: FileConfig) -> Result<RunSettings> {
    let url = cli.url.or(file.url).context(
        "No endpoint given. Pass a URL argument or set `url` in the config file.",
    )?;
    let wordlist = cli
        .wordlist
        .or(file.wordlist)
        .context("No wordlist given. Pass --wordlist or set `wordlist` in the config file.")?;
    let document = cli
        .document
        .or(file.document)
        .context("No document template given. Pass --document or set `document` in the config file.")?;

    // Start with headers from config
    let mut headers: Vec<(String, String)> = file.headers.into_iter().collect();

    // Parse and merge CLI headers (CLI takes precedence)
    let cli_parsed = cli
        .headers
        .iter()
        .map(|h| parse_header(h))
        .collect::<Result<Vec<_>>>()
        .context("Failed to parse headers")?;

    for (name, value) in cli_parsed {
        headers.retain(|(n, _)| !n.eq_ignore_ascii_case(&name));
        headers.push((name, value));
    }

    let verify_tls = !cli.insecure && file.verify_tls.unwrap_or(true);

    let config = Config::new(url)
        .with_headers(headers)
        .with_verify_tls(verify_tls)
        .with_bucket_size(
            cli.bucket_size
                .or(file.bucket_size)
                .unwrap_or(DEFAULT_BUCKET_SIZE),
        )
        .with_concurrency(
            cli.concurrency
                .or(file.concurrency)
                .unwrap_or(DEFAULT_CONCURRENCY),
        )
        .with_timeout_secs(
            cli.timeout
                .or(file.timeout)
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
        )
        .with_connect_timeout_secs(
            cli.connect_timeout
                .or(file.connect_timeout)
                .unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS),
        )
        .with_retries(cli.retry.or(file.retry).unwrap_or(0));

    config.validate().context("Invalid run configuration")?;

    Ok(RunSettings {
        config,
        wordlist,
        document,
    })
}
