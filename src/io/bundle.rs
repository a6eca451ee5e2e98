//! Read/write model bundle files.
//!
//! A bundle is the portable unit produced by the training pipeline:
//! - the fitted model (`AdditiveModel`)
//! - its metadata record (`RawBundleMeta`)
//!
//! Files are JSON and named `model__<category>__<target>.json`. The name is only
//! used for discovery; the index key always comes from the metadata.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::{ModelMeta, RawBundleMeta};
use crate::error::AppError;
use crate::models::{AdditiveModel, Growth};
use crate::report::format::slug;

pub const BUNDLE_PREFIX: &str = "model__";
pub const BUNDLE_EXTENSION: &str = "json";

/// On-disk shape of a bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BundleFile {
    pub model: AdditiveModel,
    /// A bundle without metadata parses, but is never indexed.
    #[serde(default)]
    pub meta: RawBundleMeta,
}

/// A loaded, indexable bundle. Immutable once built.
#[derive(Debug, Clone)]
pub struct Bundle {
    pub path: PathBuf,
    pub model: AdditiveModel,
    pub meta: ModelMeta,
}

/// Conventional file name for a (category, target) pair.
pub fn bundle_file_name(category: &str, target: &str) -> String {
    format!("{BUNDLE_PREFIX}{}__{}.{BUNDLE_EXTENSION}", slug(category), slug(target))
}

/// Whether `name` follows the bundle naming pattern.
pub fn is_bundle_file_name(name: &str) -> bool {
    let Some(stem) = name
        .strip_prefix(BUNDLE_PREFIX)
        .and_then(|rest| rest.strip_suffix(&format!(".{BUNDLE_EXTENSION}")))
    else {
        return false;
    };
    !stem.is_empty()
}

/// Read a bundle file. Fails on I/O errors and on any shape mismatch.
pub fn read_bundle_file(path: &Path) -> Result<BundleFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::io(format!("Failed to open bundle '{}': {e}", path.display())))?;
    let bundle: BundleFile = serde_json::from_reader(BufReader::new(file))
        .map_err(|e| AppError::input(format!("Invalid bundle JSON '{}': {e}", path.display())))?;
    bundle
        .model
        .validate()
        .map_err(|e| AppError::input(format!("Invalid model in '{}': {e}", path.display())))?;
    bundle
        .check_growth()
        .map_err(|e| AppError::input(format!("Inconsistent bundle '{}': {e}", path.display())))?;
    Ok(bundle)
}

impl BundleFile {
    /// The model's growth and `meta.use_logistic` must agree, otherwise the
    /// future frame would be built without (or with ignored) floor/cap.
    pub fn check_growth(&self) -> Result<(), String> {
        match (self.model.growth, self.meta.use_logistic) {
            (Growth::Logistic, false) => {
                Err("model uses logistic growth but meta.use_logistic is false".to_string())
            }
            (Growth::Linear, true) => {
                Err("meta.use_logistic is true but the model uses linear growth".to_string())
            }
            _ => Ok(()),
        }
    }
}

/// Write a bundle file (pretty JSON).
pub fn write_bundle_file(path: &Path, bundle: &BundleFile) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::io(format!("Failed to create bundle '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, bundle)
        .map_err(|e| AppError::io(format!("Failed to write bundle JSON: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_names_follow_pattern() {
        assert_eq!(
            bundle_file_name("Children & YA Books", "quantity"),
            "model__children_and_ya_books__quantity.json"
        );
        assert!(is_bundle_file_name("model__fiction__revenue.json"));
        assert!(!is_bundle_file_name("model__.json"));
        assert!(!is_bundle_file_name("fiction__revenue.json"));
        assert!(!is_bundle_file_name("model__fiction__revenue.joblib"));
    }

    #[test]
    fn bundle_without_meta_parses_with_defaults() {
        let json = r#"{
            "model": {
                "history_start": "2024-01-01",
                "history_end": "2024-12-31",
                "trend": {"k": 0.0, "m": 1.0}
            }
        }"#;
        let bundle: BundleFile = serde_json::from_str(json).unwrap();
        assert!(bundle.meta.category.is_none());
        assert!(bundle.meta.needs_expm1);
        assert_eq!(bundle.model.interval_width, 0.8);
    }

    fn write_json(dir: &Path, name: &str, json: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, json).unwrap();
        path
    }

    #[test]
    fn logistic_model_without_logistic_meta_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_json(
            dir.path(),
            "model__fiction__quantity.json",
            r#"{
                "model": {
                    "history_start": "2024-01-01",
                    "history_end": "2024-12-31",
                    "growth": "logistic",
                    "trend": {"k": 1.0, "m": 0.5}
                },
                "meta": {"category": "Fiction", "target": "quantity"}
            }"#,
        );
        let err = read_bundle_file(&path).unwrap_err();
        assert!(err.to_string().contains("use_logistic is false"));
    }

    #[test]
    fn logistic_meta_on_linear_model_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_json(
            dir.path(),
            "model__fiction__quantity.json",
            r#"{
                "model": {
                    "history_start": "2024-01-01",
                    "history_end": "2024-12-31",
                    "trend": {"k": 0.0, "m": 1.0}
                },
                "meta": {
                    "category": "Fiction",
                    "target": "quantity",
                    "use_logistic": true,
                    "floor_log": 0.0,
                    "cap_log": 3.0
                }
            }"#,
        );
        let err = read_bundle_file(&path).unwrap_err();
        assert!(err.to_string().contains("linear growth"));
    }

    #[test]
    fn matching_logistic_bundle_loads() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_json(
            dir.path(),
            "model__textbooks__quantity.json",
            r#"{
                "model": {
                    "history_start": "2024-01-01",
                    "history_end": "2024-12-31",
                    "growth": "logistic",
                    "trend": {"k": 1.0, "m": 0.5}
                },
                "meta": {
                    "category": "Textbooks",
                    "target": "quantity",
                    "use_logistic": true,
                    "floor_log": 0.0,
                    "cap_log": 3.0
                }
            }"#,
        );
        assert!(read_bundle_file(&path).is_ok());
    }
}
