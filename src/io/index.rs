//! Artifact index: every usable bundle in a directory, keyed by (category, target).
//!
//! Policy:
//! - bundles whose metadata lacks a category or target are skipped silently
//! - bundles that fail to read or parse are skipped with a warning
//! - duplicate keys: the later file (sorted path order) wins
//! - zero usable bundles is a configuration error; nothing can be forecast
//!
//! The index is built once and then only read.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::AppError;
use crate::io::bundle::{Bundle, is_bundle_file_name, read_bundle_file};

/// A file that matched the naming pattern but was not indexed.
#[derive(Debug, Clone)]
pub struct SkippedBundle {
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Debug, Clone)]
pub struct ArtifactIndex {
    source_dir: PathBuf,
    entries: BTreeMap<String, BTreeMap<String, Bundle>>,
    skipped: Vec<SkippedBundle>,
}

impl ArtifactIndex {
    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    /// Categories in ascending order.
    pub fn categories(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    /// Targets available for `category`, ascending. Empty if unknown.
    pub fn targets(&self, category: &str) -> Vec<&str> {
        self.entries
            .get(category)
            .map(|t| t.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    pub fn get(&self, category: &str, target: &str) -> Option<&Bundle> {
        self.entries.get(category)?.get(target)
    }

    /// Look up a bundle, with an error naming what is available.
    pub fn require(&self, category: &str, target: &str) -> Result<&Bundle, AppError> {
        let Some(targets) = self.entries.get(category) else {
            return Err(AppError::input(format!(
                "Unknown category '{category}'. Available: {}",
                self.categories().join(", ")
            )));
        };
        targets.get(target).ok_or_else(|| {
            AppError::input(format!(
                "No '{target}' model for category '{category}'. Available: {}",
                self.targets(category).join(", ")
            ))
        })
    }

    /// Number of indexed (category, target) pairs.
    pub fn len(&self) -> usize {
        self.entries.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn skipped(&self) -> &[SkippedBundle] {
        &self.skipped
    }

    pub fn bundles(&self) -> impl Iterator<Item = &Bundle> {
        self.entries.values().flat_map(BTreeMap::values)
    }
}

/// Scan `dir` and index every usable bundle.
pub fn build_index(dir: &Path) -> Result<ArtifactIndex, AppError> {
    let files = discover_bundle_files(dir)?;
    debug!(dir = %dir.display(), files = files.len(), "scanning bundle directory");

    let mut entries: BTreeMap<String, BTreeMap<String, Bundle>> = BTreeMap::new();
    let mut skipped = Vec::new();

    for path in files {
        let file = match read_bundle_file(&path) {
            Ok(f) => f,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "skipping unreadable bundle");
                skipped.push(SkippedBundle {
                    path,
                    reason: err.message().to_string(),
                });
                continue;
            }
        };

        let meta = match file.meta.validate() {
            Ok(meta) => meta,
            Err(reason) => {
                debug!(path = %path.display(), %reason, "skipping bundle with incomplete metadata");
                skipped.push(SkippedBundle { path, reason });
                continue;
            }
        };

        let targets = entries.entry(meta.category.clone()).or_default();
        if let Some(prev) = targets.get(&meta.target) {
            debug!(
                category = %meta.category,
                target = %meta.target,
                replaced = %prev.path.display(),
                by = %path.display(),
                "duplicate bundle key; later file wins"
            );
        }
        targets.insert(
            meta.target.clone(),
            Bundle {
                path,
                model: file.model,
                meta,
            },
        );
    }

    let index = ArtifactIndex {
        source_dir: dir.to_path_buf(),
        entries,
        skipped,
    };

    if index.is_empty() {
        return Err(AppError::configuration(format!(
            "No usable model bundles found in '{}' (expected files like model__<category>__<target>.json).",
            dir.display()
        )));
    }

    info!(
        bundles = index.len(),
        categories = index.categories().len(),
        skipped = index.skipped.len(),
        "artifact index built"
    );
    Ok(index)
}

/// Bundle files directly inside `dir`, sorted by path.
pub fn discover_bundle_files(dir: &Path) -> Result<Vec<PathBuf>, AppError> {
    let entries = fs::read_dir(dir)
        .map_err(|e| AppError::io(format!("Failed to read model directory '{}': {e}", dir.display())))?;

    let mut out: Vec<PathBuf> = entries
        .flatten()
        .filter(|entry| entry.file_type().map(|ft| ft.is_file()).unwrap_or(false))
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(is_bundle_file_name)
        })
        .collect();
    out.sort();
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    const MODEL: &str = r#"{"history_start": "2024-01-01", "history_end": "2024-12-31", "trend": {"k": 0.0, "m": 1.0}}"#;

    fn write(dir: &Path, name: &str, meta: &str) {
        let body = format!(r#"{{"model": {MODEL}, "meta": {meta}}}"#);
        fs::write(dir.join(name), body).unwrap();
    }

    #[test]
    fn indexes_by_meta_and_sorts_keys() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "model__b__revenue.json", r#"{"category": "Non-Fiction", "target": "revenue"}"#);
        write(tmp.path(), "model__a__quantity.json", r#"{"category": "Fiction", "target": "quantity"}"#);
        write(tmp.path(), "model__a__revenue.json", r#"{"category": "Fiction", "target": "revenue"}"#);
        fs::write(tmp.path().join("notes.json"), "{}").unwrap();

        let index = build_index(tmp.path()).unwrap();
        assert_eq!(index.len(), 3);
        assert_eq!(index.categories(), vec!["Fiction", "Non-Fiction"]);
        assert_eq!(index.targets("Fiction"), vec!["quantity", "revenue"]);
        assert!(index.skipped().is_empty());
    }

    #[test]
    fn bundle_missing_target_is_excluded() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "model__fiction__revenue.json", r#"{"category": "Fiction"}"#);
        write(tmp.path(), "model__poetry__quantity.json", r#"{"category": "Poetry", "target": "quantity"}"#);

        let index = build_index(tmp.path()).unwrap();
        assert_eq!(index.categories(), vec!["Poetry"]);
        assert!(index.get("Fiction", "revenue").is_none());
        assert_eq!(index.skipped().len(), 1);
    }

    #[test]
    fn duplicate_key_last_file_wins() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "model__x1__q.json", r#"{"category": "Fiction", "target": "quantity", "winsor_q": 0.9}"#);
        write(tmp.path(), "model__x2__q.json", r#"{"category": "Fiction", "target": "quantity", "winsor_q": 0.99}"#);

        let index = build_index(tmp.path()).unwrap();
        assert_eq!(index.len(), 1);
        let bundle = index.get("Fiction", "quantity").unwrap();
        assert_eq!(bundle.meta.winsor_q, Some(0.99));
        assert!(bundle.path.ends_with("model__x2__q.json"));
    }

    #[test]
    fn malformed_records_are_skipped_not_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("model__broken__x.json"), "{not json").unwrap();
        write(tmp.path(), "model__odd__x.json", r#"{"category": "Odd", "target": "x", "mystery": 1}"#);
        write(tmp.path(), "model__ok__x.json", r#"{"category": "Ok", "target": "quantity"}"#);

        let index = build_index(tmp.path()).unwrap();
        assert_eq!(index.categories(), vec!["Ok"]);
        assert_eq!(index.skipped().len(), 2);
    }

    #[test]
    fn growth_mismatch_is_skipped_at_load() {
        let tmp = tempfile::tempdir().unwrap();
        let logistic = r#"{"history_start": "2024-01-01", "history_end": "2024-12-31", "growth": "logistic", "trend": {"k": 1.0, "m": 0.5}}"#;
        fs::write(
            tmp.path().join("model__logi__q.json"),
            format!(r#"{{"model": {logistic}, "meta": {{"category": "Textbooks", "target": "quantity"}}}}"#),
        )
        .unwrap();
        write(tmp.path(), "model__ok__q.json", r#"{"category": "Fiction", "target": "quantity"}"#);

        let index = build_index(tmp.path()).unwrap();
        assert_eq!(index.categories(), vec!["Fiction"]);
        assert_eq!(index.skipped().len(), 1);
        assert!(index.skipped()[0].reason.contains("logistic"));
    }

    #[test]
    fn empty_index_is_a_configuration_error() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "model__only__x.json", r#"{"target": "revenue"}"#);

        let err = build_index(tmp.path()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn missing_directory_is_an_io_error() {
        let tmp = tempfile::tempdir().unwrap();
        let err = build_index(&tmp.path().join("nope")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
    }

    #[test]
    fn require_names_available_keys() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "model__a__q.json", r#"{"category": "Fiction", "target": "quantity"}"#);
        let index = build_index(tmp.path()).unwrap();

        let err = index.require("Fiction", "revenue").unwrap_err();
        assert!(err.message().contains("quantity"));
        assert!(index.require("Poetry", "quantity").is_err());
        assert!(index.require("Fiction", "quantity").is_ok());
    }
}
