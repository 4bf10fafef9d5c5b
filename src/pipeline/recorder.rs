//! Per-run accumulator of generated ids, checksums and dependency edges.

use crate::model::{Checksum, GenerationData};
use std::sync::Mutex;

/// Thread-safe, append-only record of everything one generation run emitted.
///
/// Recording the same id twice is harmless; the assembled document is
/// de-duplicated by entity id.
#[derive(Debug, Default)]
pub struct Recorder {
    data: Mutex<GenerationData>,
}

impl Recorder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn with<R>(&self, f: impl FnOnce(&mut GenerationData) -> R) -> R {
        let mut data = self.data.lock().expect("recorder lock poisoned");
        f(&mut data)
    }

    /// Record a file by its path in the build drop.
    pub fn record_file_id(&self, path: &str) {
        self.with(|data| {
            data.file_ids.insert(path.to_string());
        });
    }

    /// Record a file by its generated element id.
    pub fn record_spdx_file_id(&self, id: &str) {
        self.with(|data| {
            data.spdx_file_ids.insert(id.to_string());
        });
    }

    /// Record a package and one of its dependencies, or `None` for a package
    /// with no dependencies.
    pub fn record_package_id(&self, id: &str, depends_on: Option<&str>) {
        self.with(|data| {
            data.package_dependencies
                .push((id.to_string(), depends_on.map(str::to_string)));
        });
    }

    pub fn record_external_document_reference(&self, id: &str, root_element: &str) {
        self.with(|data| {
            let entry = (id.to_string(), root_element.to_string());
            if !data.external_document_references.contains(&entry) {
                data.external_document_references.push(entry);
            }
        });
    }

    pub fn record_checksums_for_file(&self, checksums: &[Checksum]) {
        self.with(|data| data.file_checksums.push(checksums.to_vec()));
    }

    pub fn record_root_package_id(&self, id: &str) {
        self.with(|data| data.root_package_id = Some(id.to_string()));
    }

    pub fn record_document_id(&self, id: &str) {
        self.with(|data| data.document_id = Some(id.to_string()));
    }

    /// Snapshot of everything recorded so far.
    #[must_use]
    pub fn generation_data(&self) -> GenerationData {
        self.with(|data| data.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AlgorithmName;
    use std::sync::Arc;

    #[test]
    fn test_records_are_idempotent_for_sets() {
        let recorder = Recorder::new();
        recorder.record_spdx_file_id("SPDXRef-File-A");
        recorder.record_spdx_file_id("SPDXRef-File-A");
        recorder.record_external_document_reference("DocumentRef-x", "SPDXRef-DOCUMENT");
        recorder.record_external_document_reference("DocumentRef-x", "SPDXRef-DOCUMENT");

        let data = recorder.generation_data();
        assert_eq!(data.spdx_file_ids.len(), 1);
        assert_eq!(data.external_document_references.len(), 1);
    }

    #[test]
    fn test_concurrent_recording() {
        let recorder = Arc::new(Recorder::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let recorder = Arc::clone(&recorder);
                std::thread::spawn(move || {
                    for j in 0..100 {
                        recorder.record_package_id(&format!("pkg-{i}-{j}"), None);
                        recorder.record_checksums_for_file(&[Checksum::new(
                            AlgorithmName::Sha1,
                            format!("{i}{j}"),
                        )]);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let data = recorder.generation_data();
        assert_eq!(data.package_dependencies.len(), 800);
        assert_eq!(data.file_checksums.len(), 800);
    }

    #[test]
    fn test_root_and_document_ids() {
        let recorder = Recorder::new();
        recorder.record_root_package_id("SPDXRef-RootPackage");
        recorder.record_document_id("SPDXRef-DOCUMENT");
        let data = recorder.generation_data();
        assert!(data.contains_id("SPDXRef-RootPackage"));
        assert!(data.contains_id("SPDXRef-DOCUMENT"));
    }
}
