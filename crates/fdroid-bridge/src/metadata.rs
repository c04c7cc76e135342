//! Application metadata storage.
//!
//! Metadata records are loosely-typed JSON objects, stored one file per
//! package at `<metadata_dir>/<package_id>.json`. Records are written
//! pretty-printed (2-space indent, non-ASCII preserved) and are always
//! replaced wholesale on save; there is no partial update.

use std::{fs, path::Path};

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{BridgeError, ErrorContext, Result};

/// Fields every metadata record must carry, in reporting order.
pub const REQUIRED_FIELDS: [&str; 5] = [
    "name",
    "summary",
    "description",
    "version_code",
    "version_name",
];

/// Loads application metadata from the metadata directory.
///
/// The decoded object is returned unmodified; no field-level coercion is
/// applied.
///
/// # Errors
///
/// * [`BridgeError::MetadataNotFound`] if no file exists for `package_id`
/// * [`BridgeError::MetadataParse`] if the file is not a valid JSON object
pub fn load_metadata(metadata_dir: &Path, package_id: &str) -> Result<Map<String, Value>> {
    let metadata_path = metadata_dir.join(format!("{package_id}.json"));

    if !metadata_path.exists() {
        return Err(BridgeError::MetadataNotFound {
            package_id: package_id.to_string(),
        });
    }

    let content = fs::read_to_string(&metadata_path)
        .with_context(|| format!("reading metadata file {}", metadata_path.display()))?;

    serde_json::from_str(&content).map_err(|source| {
        BridgeError::MetadataParse {
            package_id: package_id.to_string(),
            source,
        }
    })
}

/// Saves application metadata to the metadata directory.
///
/// Creates the directory (and parents) if needed and overwrites any
/// existing file for the same package id.
///
/// # Errors
///
/// Returns [`BridgeError::IoError`] if the directory cannot be created or
/// the file cannot be written; the underlying I/O error kind is preserved
/// in the source chain.
pub fn save_metadata(
    metadata_dir: &Path,
    package_id: &str,
    metadata: &Map<String, Value>,
) -> Result<()> {
    fs::create_dir_all(metadata_dir)
        .with_context(|| format!("creating metadata directory {}", metadata_dir.display()))?;

    let metadata_path = metadata_dir.join(format!("{package_id}.json"));
    let content = serde_json::to_string_pretty(metadata)?;
    fs::write(&metadata_path, content)
        .with_context(|| format!("writing metadata file {}", metadata_path.display()))?;

    debug!("Saved metadata for {package_id}");
    Ok(())
}

/// Validates a metadata record against the required fields.
///
/// Pure check, no I/O. All findings are collected rather than
/// short-circuited; an empty vector means the record is valid.
///
/// A required field is reported as missing when absent and as empty when
/// present but null, an empty string, or an empty collection. Numbers are
/// never empty, so a `version_code` of `0` is accepted. `version_code`
/// additionally must be an integer and non-negative.
pub fn validate_metadata(metadata: &Map<String, Value>) -> Vec<String> {
    let mut errors = Vec::new();

    for field in REQUIRED_FIELDS {
        match metadata.get(field) {
            None => errors.push(format!("Missing required field: {field}")),
            Some(value) if is_empty_value(value) => {
                errors.push(format!("Empty required field: {field}"));
            }
            Some(_) => {}
        }
    }

    if let Some(value) = metadata.get("version_code") {
        if let Some(code) = value.as_i64() {
            if code < 0 {
                errors.push("version_code must be non-negative".to_string());
            }
        } else if !value.is_u64() {
            errors.push("version_code must be an integer".to_string());
        }
    }

    errors
}

/// Lists the package ids present in the metadata directory, sorted.
///
/// Non-JSON entries are ignored. A missing directory yields an empty
/// list, matching a store that has no records yet.
pub fn list_packages(metadata_dir: &Path) -> Result<Vec<String>> {
    if !metadata_dir.exists() {
        return Ok(Vec::new());
    }

    let entries = fs::read_dir(metadata_dir)
        .with_context(|| format!("reading metadata directory {}", metadata_dir.display()))?;

    let mut packages = Vec::new();
    for entry in entries {
        let path = entry
            .with_context(|| format!("reading metadata directory {}", metadata_dir.display()))?
            .path();
        if path.extension().is_some_and(|ext| ext == "json") {
            if let Some(package_id) = path.file_stem().and_then(|stem| stem.to_str()) {
                packages.push(package_id.to_string());
            }
        }
    }

    packages.sort();
    Ok(packages)
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}
