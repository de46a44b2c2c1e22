//! Loading the wordlist, document template and schema snapshot from disk.

use anyhow::{Context, Result};
use premonition::{DocumentTemplate, Schema, Wordlist};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Read a wordlist file: one candidate per line.
///
/// Lines are trimmed; blank lines and `#` comments are skipped; duplicates
/// are dropped keeping the first occurrence.
pub fn load_wordlist(path: &Path) -> Result<Wordlist> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read wordlist {}", path.display()))?;
    let wordlist = parse_wordlist(&contents);
    tracing::info!(path = %path.display(), words = wordlist.len(), "Loaded wordlist");
    Ok(wordlist)
}

fn parse_wordlist(contents: &str) -> Wordlist {
    let mut seen = HashSet::new();
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter(|word| seen.insert(*word))
        .collect()
}

pub fn load_template(path: &Path) -> Result<DocumentTemplate> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("Failed to read document template {}", path.display()))?;
    DocumentTemplate::new(source.trim())
        .with_context(|| format!("Invalid document template {}", path.display()))
}

/// Read a schema previously written by this tool.
pub fn load_snapshot(path: &Path) -> Result<Schema> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read schema snapshot {}", path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&contents)
        .with_context(|| format!("Schema snapshot {} is not valid JSON", path.display()))?;
    let schema = Schema::from_snapshot(value)
        .with_context(|| format!("Invalid schema snapshot {}", path.display()))?;
    tracing::info!(types = schema.types.len(), "Loaded schema snapshot");
    Ok(schema)
}
