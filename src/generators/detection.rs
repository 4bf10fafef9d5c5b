//! On-disk manifest format detection.
//!
//! Detection is a cheap textual sniff, not a parse: extraction does the real
//! validation later and may still reject a detected manifest.

use crate::model::ManifestInfo;
use std::path::{Path, PathBuf};

/// A manifest found in a manifest directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectedManifest {
    pub manifest_info: ManifestInfo,
    pub path: PathBuf,
}

/// Finds which manifest formats are present in a manifest directory.
pub trait ManifestDetector: Send + Sync {
    fn detect(&self, manifest_dir: &Path) -> Vec<DetectedManifest>;
}

/// Probes `<dir>/<name>_<version>/manifest.<name>.json` for each candidate
/// format and keeps those whose content matches.
#[derive(Debug, Clone)]
pub struct FileSystemDetector {
    candidates: Vec<ManifestInfo>,
}

impl FileSystemDetector {
    #[must_use]
    pub fn new(candidates: Vec<ManifestInfo>) -> Self {
        Self { candidates }
    }
}

impl ManifestDetector for FileSystemDetector {
    fn detect(&self, manifest_dir: &Path) -> Vec<DetectedManifest> {
        self.candidates
            .iter()
            .filter_map(|info| {
                let path = manifest_dir.join(info.folder_name()).join(info.file_name());
                let content = match std::fs::read_to_string(&path) {
                    Ok(content) => content,
                    Err(e) => {
                        tracing::trace!(path = %path.display(), error = %e, "no manifest");
                        return None;
                    }
                };
                match sniff_manifest_info(&content) {
                    Some(found) if &found == info => Some(DetectedManifest {
                        manifest_info: found,
                        path,
                    }),
                    found => {
                        tracing::debug!(
                            path = %path.display(),
                            expected = %info,
                            found = ?found.map(|f| f.to_string()),
                            "manifest content does not match its folder"
                        );
                        None
                    }
                }
            })
            .collect()
    }
}

/// Guess the format of manifest content.
///
/// `"spdxVersion": "SPDX-2.2"` yields `SPDX:2.2`; an `@context` naming
/// `spdx.org/rdf/3.0` yields `SPDX:3.0`.
#[must_use]
pub fn sniff_manifest_info(content: &str) -> Option<ManifestInfo> {
    let trimmed = content.trim_start();
    if !trimmed.starts_with('{') {
        return None;
    }
    if let Some(version) = extract_string_field(content, "spdxVersion") {
        let version = version.strip_prefix("SPDX-").unwrap_or(&version);
        return Some(ManifestInfo::new("SPDX", version));
    }
    let context = extract_string_field(content, "@context")?;
    if context.contains("spdx.org/rdf/3.0") {
        return Some(ManifestInfo::spdx30());
    }
    None
}

/// Value of the first `"field": "value"` pair in JSON text.
fn extract_string_field(content: &str, field: &str) -> Option<String> {
    let key = format!("\"{field}\"");
    let idx = content.find(&key)?;
    let after = &content[idx + key.len()..];
    let value_part = after.trim_start().strip_prefix(':')?.trim_start();
    let value_part = value_part.strip_prefix('"')?;
    let end = value_part.find('"')?;
    Some(value_part[..end].to_string())
}
