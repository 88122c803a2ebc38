//! Record store loader: folds every `.json` file of a directory into one bundle.

use std::fs;
use std::path::{Path, PathBuf};

use copilot_core::{Bundle, BundleEntry, CopilotError};
use serde_json::Value;
use tracing::{debug, info, warn};

/// A file that was left out of the load, with the reason it was unusable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// Result of loading a record directory.
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub bundle: Bundle,
    pub skipped: Vec<SkippedFile>,
}

/// Load every `.json` file in `dir` into one collection bundle.
///
/// Entry order follows the directory listing, with each file's own entry
/// order preserved. Files that cannot be read or parsed are logged and
/// reported in [`LoadReport::skipped`]; only an unreadable directory fails.
pub fn load_directory(dir: impl AsRef<Path>) -> Result<LoadReport, CopilotError> {
    let dir = dir.as_ref();
    let listing = fs::read_dir(dir).map_err(|source| CopilotError::DataDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut report = LoadReport::default();

    for dir_entry in listing {
        let path = match dir_entry {
            Ok(dir_entry) => dir_entry.path(),
            Err(err) => {
                warn!(dir = %dir.display(), error = %err, "skipping unreadable directory entry");
                report.skipped.push(SkippedFile {
                    path: dir.to_path_buf(),
                    reason: err.to_string(),
                });
                continue;
            }
        };

        if !has_json_name(&path) {
            continue;
        }

        let outcome = read_document(&path).and_then(|document| {
            fold_document(&mut report.bundle, document).map_err(|err| err.to_string())
        });

        match outcome {
            Ok(added) => debug!(path = %path.display(), added, "folded record file"),
            Err(reason) => {
                warn!(path = %path.display(), error = %reason, "skipping record file");
                report.skipped.push(SkippedFile { path, reason });
            }
        }
    }

    info!(
        dir = %dir.display(),
        entries = report.bundle.len(),
        skipped = report.skipped.len(),
        "loaded record store"
    );

    Ok(report)
}

/// Normalize one JSON document (bundle or single resource) into a new bundle.
pub fn load_str(document: &str) -> Result<Bundle, CopilotError> {
    let value: Value =
        serde_json::from_str(document).map_err(|err| CopilotError::Parse(err.to_string()))?;
    load_value(value)
}

/// Same as [`load_str`] for an already parsed document.
pub fn load_value(document: Value) -> Result<Bundle, CopilotError> {
    let mut bundle = Bundle::collection();
    fold_document(&mut bundle, document)?;
    Ok(bundle)
}

fn has_json_name(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.ends_with(".json"))
}

fn read_document(path: &Path) -> Result<Value, String> {
    let text = fs::read_to_string(path).map_err(|err| err.to_string())?;
    serde_json::from_str(&text).map_err(|err| err.to_string())
}

/// Append the entries of `document` to `bundle`, returning how many were added.
fn fold_document(bundle: &mut Bundle, document: Value) -> Result<usize, CopilotError> {
    let Value::Object(mut object) = document else {
        return Err(CopilotError::Parse(
            "top-level JSON value is not an object".to_string(),
        ));
    };

    let is_bundle = object.get("resourceType").and_then(Value::as_str) == Some("Bundle");

    if is_bundle {
        if let Some(entries) = object.remove("entry") {
            return Ok(fold_bundle_entries(bundle, entries));
        }
    }

    bundle.push(BundleEntry::new(Value::Object(object)));
    Ok(1)
}

fn fold_bundle_entries(bundle: &mut Bundle, entries: Value) -> usize {
    let Value::Array(items) = entries else {
        warn!("bundle `entry` is not an array; no entries taken from it");
        return 0;
    };

    let mut added = 0;
    for item in items {
        let Value::Object(mut fields) = item else {
            continue;
        };
        let Some(resource) = fields.remove("resource") else {
            continue;
        };
        bundle.push(BundleEntry {
            resource,
            extra: fields,
        });
        added += 1;
    }
    added
}
