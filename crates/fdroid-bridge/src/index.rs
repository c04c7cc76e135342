//! Repository index generation.
//!
//! Two independent paths produce an index: [`generate_index`] shells out
//! to fdroidserver and reads back the artifact it writes, while
//! [`create_minimal_index`] assembles the structure directly from
//! in-memory app records, for testing or when fdroidserver is not
//! available. Every invocation produces a fresh index; nothing is
//! mutated in place.

use std::{
    collections::BTreeMap,
    fs,
    path::Path,
    process::Command,
};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{BridgeError, ErrorContext, IndexGenerationError, Result};

/// Index format version emitted by the minimal builder.
///
/// Fixed independently of whatever fdroidserver emits on the
/// [`generate_index`] path; the two paths are not guaranteed to agree.
pub const INDEX_FORMAT_VERSION: u32 = 21;

/// The only locale this layer populates in localized fields.
pub const DEFAULT_LOCALE: &str = "en-US";

/// Localized text keyed by locale tag.
pub type LocalizedText = BTreeMap<String, String>;

/// Repository-level metadata of an index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepoInfo {
    pub name: LocalizedText,
    pub description: LocalizedText,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    pub version: u32,
}

/// One formatted app entry in the index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppEntry {
    pub name: LocalizedText,
    pub summary: LocalizedText,
    pub description: LocalizedText,
    pub license: String,
    pub categories: Vec<String>,
    #[serde(rename = "suggestedVersionCode")]
    pub suggested_version_code: u64,
}

/// A repository index as assembled by [`create_minimal_index`].
///
/// Serializes to the wire shape consumed by repository clients:
/// top-level `repo`, `apps`, and `packages` keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Index {
    pub repo: RepoInfo,
    pub apps: BTreeMap<String, AppEntry>,
    pub packages: BTreeMap<String, Vec<Value>>,
}

/// Generates the repository index by running fdroidserver.
///
/// Invokes `fdroid update --pretty --nosign` with the working directory
/// set to `repo_dir`, blocking until the child exits with stdout and
/// stderr fully captured. On success the artifact at
/// `<repo_dir>/repo/index-v2.json` is parsed and returned unmodified; a
/// pretty copy is written to `output_path` when one is given.
///
/// No timeout is enforced on the child process; a hung tool blocks the
/// call indefinitely.
///
/// # Errors
///
/// Returns [`IndexGenerationError`] (wrapped in [`BridgeError`]) when the
/// repository directory does not exist, the tool cannot be started, the
/// tool exits non-zero, the artifact is missing after a zero exit, or the
/// artifact is not valid JSON.
pub fn generate_index(repo_dir: &Path, output_path: Option<&Path>) -> Result<Value> {
    if !repo_dir.exists() {
        return Err(IndexGenerationError::RepoDirMissing {
            path: repo_dir.to_path_buf(),
        }
        .into());
    }

    debug!("Running fdroid update in {}", repo_dir.display());

    let output = Command::new("fdroid")
        .args(["update", "--pretty", "--nosign"])
        .current_dir(repo_dir)
        .output()
        .map_err(|source| IndexGenerationError::ToolLaunch { source })?;

    if !output.status.success() {
        return Err(IndexGenerationError::ToolFailed {
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
        .into());
    }

    let index_path = repo_dir.join("repo").join("index-v2.json");
    if !index_path.exists() {
        return Err(IndexGenerationError::OutputMissing.into());
    }

    let content = fs::read_to_string(&index_path)
        .with_context(|| format!("reading generated index {}", index_path.display()))?;
    let index: Value = serde_json::from_str(&content)
        .map_err(|source| IndexGenerationError::OutputParse { source })?;

    if let Some(output_path) = output_path {
        debug!("Writing index copy to {}", output_path.display());
        let pretty = serde_json::to_string_pretty(&index)?;
        fs::write(output_path, pretty)
            .with_context(|| format!("writing index copy to {}", output_path.display()))?;
    }

    Ok(index)
}

/// Creates a minimal repository index without running fdroidserver.
///
/// `repo_name` and `repo_description` become single-entry `en-US`
/// localized maps, the timestamp is taken from the current wall clock,
/// and every app record contributes one formatted entry plus an empty
/// release list under `packages`.
///
/// # Errors
///
/// Returns [`BridgeError::MissingPackageId`] when a record carries no
/// string `package_id`; everything else is defaulted, not validated.
pub fn create_minimal_index(
    repo_name: &str,
    repo_description: &str,
    apps: &[Map<String, Value>],
) -> Result<Index> {
    let mut entries = BTreeMap::new();
    let mut packages = BTreeMap::new();

    for (position, app) in apps.iter().enumerate() {
        let package_id = app
            .get("package_id")
            .and_then(Value::as_str)
            .ok_or(BridgeError::MissingPackageId { position })?;
        entries.insert(package_id.to_string(), format_app_entry(app));
        packages.insert(package_id.to_string(), Vec::new());
    }

    Ok(Index {
        repo: RepoInfo {
            name: localized(repo_name),
            description: localized(repo_description),
            timestamp: Utc::now().timestamp_millis(),
            version: INDEX_FORMAT_VERSION,
        },
        apps: entries,
        packages,
    })
}

/// Formats an app record into its index entry. Defaulting only, no
/// validation: absent or mistyped fields fall back to empty text,
/// `"Unknown"` license, no categories, and version code `0`.
fn format_app_entry(app: &Map<String, Value>) -> AppEntry {
    let text = |field: &str| localized(app.get(field).and_then(Value::as_str).unwrap_or_default());

    AppEntry {
        name: text("name"),
        summary: text("summary"),
        description: text("description"),
        license: app
            .get("license")
            .and_then(Value::as_str)
            .unwrap_or("Unknown")
            .to_string(),
        categories: app
            .get("categories")
            .and_then(Value::as_array)
            .map(|categories| {
                categories
                    .iter()
                    .filter_map(Value::as_str)
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default(),
        suggested_version_code: app.get("version_code").and_then(Value::as_u64).unwrap_or(0),
    }
}

fn localized(text: &str) -> LocalizedText {
    BTreeMap::from([(DEFAULT_LOCALE.to_string(), text.to_string())])
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tempfile::tempdir;

    use super::*;

    fn app(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_minimal_index_structure() {
        let apps = vec![app(json!({
            "package_id": "dk.test.app",
            "name": "Test App",
            "summary": "A test",
            "description": "Full description",
            "version_code": 1,
        }))];

        let index = create_minimal_index("Test Repo", "Test repository", &apps).unwrap();

        assert_eq!(index.repo.name[DEFAULT_LOCALE], "Test Repo");
        assert_eq!(index.repo.description[DEFAULT_LOCALE], "Test repository");
        assert_eq!(index.repo.version, INDEX_FORMAT_VERSION);
        assert_eq!(index.apps["dk.test.app"].suggested_version_code, 1);
        assert_eq!(index.packages["dk.test.app"], Vec::<Value>::new());
    }

    #[test]
    fn test_minimal_index_includes_all_apps() {
        let apps = vec![
            app(json!({"package_id": "dk.test.app1", "name": "App One", "version_code": 1})),
            app(json!({"package_id": "dk.test.app2", "name": "App Two", "version_code": 2})),
        ];

        let index = create_minimal_index("Test Repo", "Test", &apps).unwrap();

        assert_eq!(index.apps.len(), 2);
        assert_eq!(index.apps["dk.test.app1"].name[DEFAULT_LOCALE], "App One");
        assert_eq!(index.apps["dk.test.app2"].name[DEFAULT_LOCALE], "App Two");
    }

    #[test]
    fn test_minimal_index_empty() {
        let index = create_minimal_index("Empty Repo", "No apps yet", &[]).unwrap();

        assert!(index.apps.is_empty());
        assert!(index.packages.is_empty());
        assert!(index.repo.timestamp > 0);
    }

    #[test]
    fn test_minimal_index_missing_package_id() {
        let apps = vec![app(json!({"name": "No Id"}))];

        let err = create_minimal_index("Repo", "Desc", &apps).unwrap_err();

        assert!(matches!(err, BridgeError::MissingPackageId { position: 0 }));
    }

    #[test]
    fn test_app_entry_defaults() {
        let entry = format_app_entry(&app(json!({"package_id": "dk.test.app"})));

        assert_eq!(entry.name[DEFAULT_LOCALE], "");
        assert_eq!(entry.license, "Unknown");
        assert!(entry.categories.is_empty());
        assert_eq!(entry.suggested_version_code, 0);
    }

    #[test]
    fn test_app_entry_passes_fields_through() {
        let entry = format_app_entry(&app(json!({
            "name": "MitID",
            "summary": "Digital identity",
            "description": "Login app",
            "license": "GPL-3.0-only",
            "categories": ["Security", "Government"],
            "version_code": 42,
        })));

        assert_eq!(entry.summary[DEFAULT_LOCALE], "Digital identity");
        assert_eq!(entry.license, "GPL-3.0-only");
        assert_eq!(entry.categories, vec!["Security", "Government"]);
        assert_eq!(entry.suggested_version_code, 42);
    }

    #[test]
    fn test_index_wire_shape() {
        let apps = vec![app(json!({
            "package_id": "dk.test.app",
            "name": "Test",
            "version_code": 3,
        }))];

        let index = create_minimal_index("Repo", "Desc", &apps).unwrap();
        let value = serde_json::to_value(&index).unwrap();

        assert_eq!(value["repo"]["name"]["en-US"], "Repo");
        assert_eq!(value["repo"]["version"], 21);
        assert_eq!(value["apps"]["dk.test.app"]["suggestedVersionCode"], 3);
        assert_eq!(value["packages"]["dk.test.app"], json!([]));
    }

    #[test]
    fn test_generate_index_missing_repo_dir() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("missing");

        let err = generate_index(&missing, None).unwrap_err();

        assert!(matches!(
            err,
            BridgeError::IndexGeneration(IndexGenerationError::RepoDirMissing { .. })
        ));
        assert!(err.to_string().contains("missing"));
    }
}
