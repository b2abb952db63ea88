//! Argument helpers for the CLI commands

use std::collections::BTreeMap;
use std::path::Path;

/// Parse a `key=value` metadata pair
pub fn parse_metadata_pair(pair: &str) -> anyhow::Result<(String, String)> {
    let (key, value) = pair
        .split_once('=')
        .ok_or_else(|| anyhow::anyhow!("Invalid metadata '{}'. Expected: key=value", pair))?;

    let key = key.trim();
    if key.is_empty() {
        anyhow::bail!("Metadata key cannot be empty: '{}'", pair);
    }

    Ok((key.to_string(), value.to_string()))
}

/// Collect repeated `--meta key=value` flags into a map
pub fn parse_metadata(pairs: &[String]) -> anyhow::Result<BTreeMap<String, String>> {
    pairs.iter().map(|p| parse_metadata_pair(p)).collect()
}

/// Content type from the file extension, `application/octet-stream` when unknown
pub fn guess_content_type(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

/// Format bytes to human-readable format
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KiB", "MiB", "GiB", "TiB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.2} {}", size, UNITS[unit])
    }
}
