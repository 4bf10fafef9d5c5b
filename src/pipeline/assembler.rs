//! Assembly of generated elements into one manifest document, and writing
//! it to the manifest layout.

use crate::error::{ErrorContext, Result, SbomError};
use crate::model::{AlgorithmName, ManifestInfo};
use crate::utils::hash::digest_bytes;
use indexmap::IndexSet;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// Builds a manifest from its header dictionary and generated elements.
///
/// Elements are appended to the array under their header key; an element
/// whose entity id was already pushed under the same key is dropped.
#[derive(Debug, Clone)]
pub struct DocumentAssembler {
    document: Map<String, Value>,
    seen: IndexSet<(String, String)>,
}

impl DocumentAssembler {
    #[must_use]
    pub fn new(header: Map<String, Value>) -> Self {
        Self {
            document: header,
            seen: IndexSet::new(),
        }
    }

    /// Append `element` under `header`. Returns `false` for a duplicate.
    pub fn push(&mut self, header: &str, entity_id: &str, element: Value) -> bool {
        if !self.seen.insert((header.to_string(), entity_id.to_string())) {
            tracing::trace!(header, entity_id, "duplicate element skipped");
            return false;
        }
        let slot = self
            .document
            .entry(header.to_string())
            .or_insert_with(|| Value::Array(Vec::new()));
        match slot {
            Value::Array(items) => items.push(element),
            other => {
                // A scalar header value under the same key becomes the first element.
                let existing = std::mem::take(other);
                *other = Value::Array(vec![existing, element]);
            }
        }
        true
    }

    /// Number of elements pushed so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    #[must_use]
    pub fn finish(self) -> Value {
        Value::Object(self.document)
    }
}

/// Path of the manifest for `info` under `manifest_dir`.
#[must_use]
pub fn manifest_path(manifest_dir: &Path, info: &ManifestInfo) -> PathBuf {
    manifest_dir.join(info.folder_name()).join(info.file_name())
}

/// Write `document` as pretty JSON to the manifest layout, plus a
/// `<file>.sha256` sidecar holding the digest of the written bytes.
pub fn write_manifest(manifest_dir: &Path, info: &ManifestInfo, document: &Value) -> Result<PathBuf> {
    let path = manifest_path(manifest_dir, info);
    let folder = path
        .parent()
        .ok_or_else(|| SbomError::validation(format!("invalid manifest path {}", path.display())))?;
    std::fs::create_dir_all(folder).map_err(|e| SbomError::io(folder, e))?;

    let bytes = serde_json::to_vec_pretty(document)
        .with_context(|| format!("serializing {info} manifest"))?;
    std::fs::write(&path, &bytes).map_err(|e| SbomError::io(&path, e))?;

    let digest = digest_bytes(AlgorithmName::Sha256, &bytes);
    let mut sidecar = path.clone().into_os_string();
    sidecar.push(".sha256");
    let sidecar = PathBuf::from(sidecar);
    std::fs::write(&sidecar, digest).map_err(|e| SbomError::io(&sidecar, e))?;

    tracing::info!(manifest = %info, path = %path.display(), "manifest written");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_push_dedupes_per_header() {
        let mut header = Map::new();
        header.insert("spdxVersion".into(), json!("SPDX-2.2"));
        let mut assembler = DocumentAssembler::new(header);

        assert!(assembler.push("files", "a", json!({"SPDXID": "a"})));
        assert!(!assembler.push("files", "a", json!({"SPDXID": "a"})));
        assert!(assembler.push("packages", "a", json!({"SPDXID": "a"})));
        assert_eq!(assembler.len(), 2);

        let document = assembler.finish();
        assert_eq!(document["files"].as_array().unwrap().len(), 1);
        assert_eq!(document["spdxVersion"], "SPDX-2.2");
    }

    #[test]
    fn test_push_appends_to_existing_header_array() {
        let mut header = Map::new();
        header.insert("@graph".into(), json!([{"type": "SpdxDocument"}]));
        let mut assembler = DocumentAssembler::new(header);
        assembler.push("@graph", "f", json!({"type": "software_File"}));

        let document = assembler.finish();
        assert_eq!(document["@graph"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_write_manifest_layout_and_sidecar() {
        let dir = tempfile::tempdir().unwrap();
        let info = ManifestInfo::spdx22();
        let path = write_manifest(dir.path(), &info, &json!({"a": 1})).unwrap();

        assert_eq!(path, dir.path().join("spdx_2.2").join("manifest.spdx.json"));
        let bytes = std::fs::read(&path).unwrap();
        let sidecar = std::fs::read_to_string(dir.path().join("spdx_2.2/manifest.spdx.json.sha256"))
            .unwrap();
        assert_eq!(sidecar, digest_bytes(AlgorithmName::Sha256, &bytes));
    }
}
