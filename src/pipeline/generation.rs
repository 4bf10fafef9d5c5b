//! Concurrent fan-out of input records across active generators.
//!
//! ```text
//! records --> producer (blocking task) --> documents channel --> consumer
//!                                      \-> errors channel    --> consumer
//! ```
//!
//! Both channels are unbounded and owned by the producer task. The senders
//! are dropped whenever the task ends, on exhaustion, early return or panic,
//! so a consumer reading either stream always sees it close.

use super::recorder::Recorder;
use crate::error::SbomError;
use crate::generators::ManifestGenerator;
use crate::model::{
    GenerationResult, ManifestInfo, SbomRecord, Section, DOCUMENT_ID,
};
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

/// One active output format for a run.
#[derive(Clone)]
pub struct SbomConfig {
    pub manifest_info: ManifestInfo,
    pub generator: Arc<dyn ManifestGenerator>,
    pub recorder: Arc<Recorder>,
}

impl SbomConfig {
    #[must_use]
    pub fn new(generator: Arc<dyn ManifestGenerator>) -> Self {
        Self {
            manifest_info: generator.register_manifest(),
            generator,
            recorder: Arc::new(Recorder::new()),
        }
    }
}

impl fmt::Debug for SbomConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SbomConfig")
            .field("manifest_info", &self.manifest_info)
            .finish_non_exhaustive()
    }
}

/// A successfully generated element, tagged with the format that made it.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedDocument {
    pub manifest_info: ManifestInfo,
    pub section: Section,
    pub entity_id: String,
    pub document: Value,
}

/// Classification of a per-item failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorType {
    GenerationFailure,
    MissingHashValue,
    UnsupportedManifest,
    DanglingRelationship,
    Other,
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::GenerationFailure => "generation failure",
            Self::MissingHashValue => "missing hash value",
            Self::UnsupportedManifest => "unsupported manifest",
            Self::DanglingRelationship => "dangling relationship",
            Self::Other => "other",
        };
        f.write_str(name)
    }
}

/// A per-item error reported on the error stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryError {
    pub error_type: ErrorType,
    /// Identifying key of the offending record (path, package, edge)
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manifest_info: Option<ManifestInfo>,
    pub message: String,
}

impl EntryError {
    pub fn new(error_type: ErrorType, key: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error_type,
            key: key.into(),
            manifest_info: None,
            message: message.into(),
        }
    }

    /// Classify a generator failure for `key`.
    #[must_use]
    pub fn from_error(key: &str, manifest_info: &ManifestInfo, error: &SbomError) -> Self {
        let error_type = match error {
            SbomError::MissingHashValue { .. } => ErrorType::MissingHashValue,
            SbomError::UnsupportedManifestInfo(_) | SbomError::NotSupported { .. } => {
                ErrorType::UnsupportedManifest
            }
            SbomError::GenerationFailure { .. } | SbomError::Json { .. } => {
                ErrorType::GenerationFailure
            }
            _ => ErrorType::Other,
        };
        Self {
            error_type,
            key: key.to_string(),
            manifest_info: Some(manifest_info.clone()),
            message: error.to_string(),
        }
    }
}

impl fmt::Display for EntryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} for '{}': {}", self.error_type, self.key, self.message)
    }
}

/// The two output streams of a running pipeline.
#[derive(Debug)]
pub struct PipelineOutput {
    pub documents: UnboundedReceiver<GeneratedDocument>,
    pub errors: UnboundedReceiver<EntryError>,
    pub handle: JoinHandle<()>,
}

impl PipelineOutput {
    /// Drain both streams to completion.
    ///
    /// A producer panic surfaces as one extra [`ErrorType::Other`] entry.
    pub async fn collect(self) -> (Vec<GeneratedDocument>, Vec<EntryError>) {
        let Self {
            mut documents,
            mut errors,
            handle,
        } = self;

        let drain_documents = async {
            let mut out = Vec::new();
            while let Some(document) = documents.recv().await {
                out.push(document);
            }
            out
        };
        let drain_errors = async {
            let mut out = Vec::new();
            while let Some(error) = errors.recv().await {
                out.push(error);
            }
            out
        };
        let (documents, mut errors) = tokio::join!(drain_documents, drain_errors);

        if let Err(e) = handle.await {
            tracing::error!(error = %e, "generation producer task failed");
            errors.push(EntryError::new(ErrorType::Other, "pipeline", e.to_string()));
        }
        (documents, errors)
    }
}

/// Converts a stream of records into documents and per-item errors.
#[derive(Debug, Clone)]
pub struct GenerationPipeline {
    targets: Vec<SbomConfig>,
}

impl GenerationPipeline {
    #[must_use]
    pub fn new(targets: Vec<SbomConfig>) -> Self {
        Self { targets }
    }

    #[must_use]
    pub fn targets(&self) -> &[SbomConfig] {
        &self.targets
    }

    /// Start draining `records` on a blocking task.
    ///
    /// Must be called from within a tokio runtime.
    pub fn run<I>(&self, records: I) -> PipelineOutput
    where
        I: IntoIterator<Item = SbomRecord> + Send + 'static,
        I::IntoIter: Send,
    {
        let (document_tx, documents) = unbounded_channel();
        let (error_tx, errors) = unbounded_channel();
        let producer = Producer {
            targets: self.targets.clone(),
            documents: document_tx,
            errors: error_tx,
        };

        let handle = tokio::task::spawn_blocking(move || {
            let mut processed = 0usize;
            for record in records {
                producer.process(&record);
                processed += 1;
            }
            tracing::debug!(processed, "generation producer finished");
        });

        PipelineOutput {
            documents,
            errors,
            handle,
        }
    }
}

struct Producer {
    targets: Vec<SbomConfig>,
    documents: UnboundedSender<GeneratedDocument>,
    errors: UnboundedSender<EntryError>,
}

impl Producer {
    fn process(&self, record: &SbomRecord) {
        let section = record.section();
        for target in &self.targets {
            if !target.generator.supports(section) {
                tracing::trace!(
                    manifest = %target.manifest_info,
                    %section,
                    "section not supported, skipping"
                );
                continue;
            }

            match target.generator.generate(record) {
                Ok(result) => {
                    record_result(&target.recorder, record, &result);
                    self.emit(GeneratedDocument {
                        manifest_info: target.manifest_info.clone(),
                        section,
                        entity_id: result.metadata.entity_id,
                        document: result.document,
                    });
                }
                Err(e) => {
                    let key = record.key();
                    tracing::warn!(
                        manifest = %target.manifest_info,
                        key = %key,
                        error = %e,
                        "generation failed"
                    );
                    self.report(EntryError::from_error(&key, &target.manifest_info, &e));
                    return;
                }
            }
        }
    }

    fn emit(&self, document: GeneratedDocument) {
        if self.documents.send(document).is_err() {
            tracing::debug!("document consumer dropped");
        }
    }

    fn report(&self, error: EntryError) {
        if self.errors.send(error).is_err() {
            tracing::debug!("error consumer dropped");
        }
    }
}

fn record_result(recorder: &Recorder, record: &SbomRecord, result: &GenerationResult) {
    let id = result.entity_id();
    match record {
        SbomRecord::File(file) => {
            recorder.record_file_id(&file.path);
            recorder.record_spdx_file_id(id);
            recorder.record_checksums_for_file(&file.checksums);
        }
        SbomRecord::Package(_) => {
            if result.metadata.depends_on.is_empty() {
                recorder.record_package_id(id, None);
            }
            for dependency in &result.metadata.depends_on {
                recorder.record_package_id(id, Some(dependency));
            }
        }
        SbomRecord::ExternalDocumentReference(reference) => {
            let root = reference
                .described_element_id
                .as_deref()
                .unwrap_or(DOCUMENT_ID);
            recorder.record_external_document_reference(id, root);
        }
        SbomRecord::Relationship(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generators::{Spdx22Generator, Spdx30Generator};
    use crate::model::{AlgorithmName, Checksum, ExternalDocumentReferenceInfo, FileRecord};

    fn file(path: &str) -> SbomRecord {
        SbomRecord::File(FileRecord::new(
            path,
            vec![Checksum::new(AlgorithmName::Sha1, "abc")],
        ))
    }

    #[tokio::test]
    async fn test_unsupported_section_is_skipped_not_failed() {
        let spdx30 = SbomConfig::new(Arc::new(Spdx30Generator::default()));
        let pipeline = GenerationPipeline::new(vec![spdx30]);
        let reference = SbomRecord::ExternalDocumentReference(ExternalDocumentReferenceInfo {
            external_document_name: "other".into(),
            document_namespace: "https://x".into(),
            checksums: vec![Checksum::new(AlgorithmName::Sha1, "abc")],
            described_element_id: None,
        });

        let (documents, errors) = pipeline.run(vec![reference]).collect().await;
        assert!(documents.is_empty());
        assert!(errors.is_empty());
    }

    #[tokio::test]
    async fn test_fan_out_records_per_target() {
        let spdx22 = SbomConfig::new(Arc::new(Spdx22Generator::new()));
        let spdx30 = SbomConfig::new(Arc::new(Spdx30Generator::default()));
        let recorder22 = Arc::clone(&spdx22.recorder);
        let pipeline = GenerationPipeline::new(vec![spdx22, spdx30]);

        let (documents, errors) = pipeline
            .run(vec![file("./a"), file("./b")])
            .collect()
            .await;
        assert_eq!(documents.len(), 4);
        assert!(errors.is_empty());
        assert_eq!(recorder22.generation_data().spdx_file_ids.len(), 2);
    }

    #[tokio::test]
    async fn test_failure_stops_only_that_record() {
        let spdx22 = SbomConfig::new(Arc::new(Spdx22Generator::new()));
        let spdx30 = SbomConfig::new(Arc::new(Spdx30Generator::default()));
        let pipeline = GenerationPipeline::new(vec![spdx22, spdx30]);
        let bad = SbomRecord::File(FileRecord::new("./bad", vec![]));

        let (documents, errors) = pipeline
            .run(vec![bad, file("./good")])
            .collect()
            .await;
        assert_eq!(documents.len(), 2);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].error_type, ErrorType::MissingHashValue);
        assert_eq!(errors[0].key, "./bad");
    }
}
