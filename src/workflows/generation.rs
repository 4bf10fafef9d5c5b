//! Materializes a manifest on disk for every configured format.

use super::consolidation::MANIFEST_FOLDER;
use super::GenerationWorkflow;
use crate::config::{AppConfig, BehaviorConfig, GenerationConfig};
use crate::error::{Result, SbomError};
use crate::generators::GeneratorRegistry;
use crate::model::{
    AlgorithmName, DocumentMetadata, FileRecord, GenerationData, ManifestInfo, Relationship,
    SbomInput, SbomRecord, Section, DOCUMENT_ID,
};
use crate::pipeline::{
    derive_relationships, validate_relationships, write_manifest, DocumentAssembler, EntryError,
    GeneratedDocument, GenerationPipeline, SbomConfig,
};
use crate::utils::hash::compute_checksums;
use chrono::Utc;
use indexmap::{IndexMap, IndexSet};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use uuid::Uuid;

/// Outcome of one generation run.
#[derive(Debug, Default)]
pub struct GenerationReport {
    /// Written manifest files, one per format
    pub manifests: Vec<PathBuf>,
    /// Per-item errors across every format
    pub errors: Vec<EntryError>,
}

impl GenerationReport {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Runs the generation pipeline over a build's records and writes the
/// resulting manifests.
#[derive(Debug, Clone)]
pub struct SbomGenerationWorkflow {
    registry: Arc<GeneratorRegistry>,
    config: GenerationConfig,
    behavior: BehaviorConfig,
}

impl SbomGenerationWorkflow {
    #[must_use]
    pub fn new(registry: Arc<GeneratorRegistry>, config: &AppConfig) -> Self {
        Self {
            registry,
            config: config.generation.clone(),
            behavior: config.behavior.clone(),
        }
    }

    /// Generation settings for a consolidation run.
    ///
    /// The merged artifacts are the only input, so no build drop is hashed,
    /// and `consolidation.output_dir` takes over the manifest directory.
    #[must_use]
    pub fn for_consolidation(registry: Arc<GeneratorRegistry>, config: &AppConfig) -> Self {
        let mut workflow = Self::new(registry, config);
        workflow.config.build_drop_path = None;
        match &config.consolidation.output_dir {
            Some(dir) => workflow.with_manifest_dir(dir.join(MANIFEST_FOLDER)),
            None => workflow,
        }
    }

    /// Write manifests under `dir` instead of the configured directory.
    #[must_use]
    pub fn with_manifest_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.manifest_dir = Some(dir.into());
        self
    }

    #[must_use]
    pub const fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// Generate and write one manifest per configured format.
    ///
    /// Unknown formats and failures to build the document itself are hard
    /// errors; per-record failures are collected in the report.
    pub async fn generate(&self, mut input: SbomInput) -> Result<GenerationReport> {
        let manifest_dir = self
            .config
            .manifest_dir
            .clone()
            .ok_or_else(|| SbomError::config("generation.manifest_dir is not set"))?;

        let targets: Vec<SbomConfig> = self
            .registry
            .resolve(&self.config.manifest_infos)?
            .into_iter()
            .map(SbomConfig::new)
            .collect();

        if let Some(drop) = &self.config.build_drop_path {
            let algorithms = hashing_algorithms(&self.config.hash_algorithms, &targets);
            let files = hash_directory(drop, &algorithms, Some(&manifest_dir))?;
            tracing::info!(count = files.len(), drop = %drop.display(), "hashed build drop");
            input.files.extend(files);
        }

        let SbomInput {
            files,
            packages,
            relationships,
            external_document_references,
        } = input;
        let records: Vec<SbomRecord> = external_document_references
            .into_iter()
            .map(SbomRecord::ExternalDocumentReference)
            .chain(files.into_iter().map(SbomRecord::File))
            .chain(packages.into_iter().map(SbomRecord::Package))
            .collect();
        tracing::info!(
            records = records.len(),
            formats = targets.len(),
            "starting manifest generation"
        );

        let (documents, mut errors) = GenerationPipeline::new(targets.clone())
            .run(records)
            .collect()
            .await;
        let mut by_format: IndexMap<ManifestInfo, Vec<GeneratedDocument>> = IndexMap::new();
        for document in documents {
            by_format
                .entry(document.manifest_info.clone())
                .or_default()
                .push(document);
        }

        let namespace_uuid = self.config.namespace_uuid.unwrap_or_else(Uuid::new_v4);
        let mut report = GenerationReport::default();
        for target in targets {
            let documents = by_format.shift_remove(&target.manifest_info).unwrap_or_default();
            let (document, target_errors) = self
                .assemble(&target, documents, &relationships, namespace_uuid)
                .await?;
            errors.extend(target_errors);
            report
                .manifests
                .push(write_manifest(&manifest_dir, &target.manifest_info, &document)?);
        }
        report.errors = errors;

        for error in &report.errors {
            tracing::warn!(kind = %error.error_type, key = %error.key, "{}", error.message);
        }
        tracing::info!(
            manifests = report.manifests.len(),
            errors = report.errors.len(),
            "manifest generation finished"
        );
        Ok(report)
    }

    async fn assemble(
        &self,
        target: &SbomConfig,
        documents: Vec<GeneratedDocument>,
        relationships: &[Relationship],
        namespace_uuid: Uuid,
    ) -> Result<(serde_json::Value, Vec<EntryError>)> {
        let generator = &target.generator;
        target.recorder.record_document_id(DOCUMENT_ID);

        let data = target.recorder.generation_data();
        let metadata = self.document_metadata(&target.manifest_info, namespace_uuid, &data);
        let root = generator.generate_root_package(&metadata, &data)?;
        target.recorder.record_root_package_id(root.entity_id());

        let data = target.recorder.generation_data();
        let mut assembler = DocumentAssembler::new(generator.metadata_dictionary(&metadata, &data)?);

        if let Ok(header) = generator.creation_info_header_name() {
            let creation_info = generator.generate_creation_info(&metadata)?;
            let creation_id = creation_info.entity_id().to_string();
            assembler.push(header, &creation_id, creation_info.document);
        }
        let root_id = root.metadata.entity_id.clone();
        assembler.push(generator.header_name(Section::Packages)?, &root_id, root.document);

        for document in documents {
            let header = generator.header_name(document.section)?;
            assembler.push(header, &document.entity_id, document.document);
        }

        let mut candidates = derive_relationships(&data);
        candidates.extend(relationships.iter().cloned());
        let (valid, mut errors) = validate_relationships(candidates, &data);

        let records: Vec<SbomRecord> = valid.into_iter().map(SbomRecord::Relationship).collect();
        let (edges, edge_errors) = GenerationPipeline::new(vec![target.clone()])
            .run(records)
            .collect()
            .await;
        errors.extend(edge_errors);
        if let Ok(header) = generator.header_name(Section::Relationships) {
            for edge in edges {
                assembler.push(header, &edge.entity_id, edge.document);
            }
        }

        tracing::debug!(
            manifest = %target.manifest_info,
            elements = assembler.len(),
            "document assembled"
        );
        Ok((assembler.finish(), errors))
    }

    fn document_metadata(
        &self,
        info: &ManifestInfo,
        namespace_uuid: Uuid,
        data: &GenerationData,
    ) -> DocumentMetadata {
        let namespace = format!(
            "{}/{}/{}/{}",
            self.config.namespace_uri_base.trim_end_matches('/'),
            self.config.package_name,
            self.config.package_version,
            namespace_uuid
        );
        tracing::debug!(manifest = %info, %namespace, "document namespace");
        DocumentMetadata {
            package_name: self.config.package_name.clone(),
            package_version: self.config.package_version.clone(),
            package_supplier: self.config.package_supplier.clone(),
            document_namespace: namespace,
            created: self.config.created.unwrap_or_else(Utc::now),
            tool_name: env!("CARGO_PKG_NAME").to_string(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
            conformance: self.config.conformance,
            package_verification_code: data.package_verification_code(),
        }
    }
}

impl GenerationWorkflow for SbomGenerationWorkflow {
    async fn run(&self, input: SbomInput) -> Result<bool> {
        let report = self.generate(input).await?;
        Ok(report.is_clean() || !self.behavior.fail_on_errors)
    }
}

/// Configured algorithms plus every one a target format requires, in first-seen order.
fn hashing_algorithms(configured: &[AlgorithmName], targets: &[SbomConfig]) -> Vec<AlgorithmName> {
    let mut algorithms: IndexSet<AlgorithmName> = configured.iter().copied().collect();
    for target in targets {
        algorithms.extend(target.generator.required_hash_algorithms().iter().copied());
    }
    algorithms.into_iter().collect()
}

/// Hash every regular file under `root` into a [`FileRecord`] with a
/// `./`-prefixed, `/`-separated relative path, sorted by path.
///
/// Files under `exclude` (typically the manifest output directory) are skipped.
/// Both paths are canonicalized first, so `./out` and `out/_manifest` match.
pub fn hash_directory(
    root: &Path,
    algorithms: &[AlgorithmName],
    exclude: Option<&Path>,
) -> Result<Vec<FileRecord>> {
    let root = root.canonicalize().map_err(|e| SbomError::io(root, e))?;
    // A manifest dir that does not exist yet holds nothing to skip.
    let exclude = exclude.and_then(|dir| dir.canonicalize().ok());

    let mut paths = Vec::new();
    collect_files(&root, exclude.as_deref(), &mut paths)?;
    paths.sort();

    paths
        .par_iter()
        .map(|path| -> Result<FileRecord> {
            let checksums = compute_checksums(path, algorithms)?;
            let relative = path.strip_prefix(&root).unwrap_or(path);
            let components: Vec<String> = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect();
            Ok(FileRecord::new(format!("./{}", components.join("/")), checksums))
        })
        .collect()
}

fn collect_files(dir: &Path, exclude: Option<&Path>, out: &mut Vec<PathBuf>) -> Result<()> {
    let entries = std::fs::read_dir(dir).map_err(|e| SbomError::io(dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| SbomError::io(dir, e))?;
        let path = entry.path();
        if exclude.is_some_and(|excluded| path.starts_with(excluded)) {
            continue;
        }
        let file_type = entry.file_type().map_err(|e| SbomError::io(&path, e))?;
        if file_type.is_dir() {
            collect_files(&path, exclude, out)?;
        } else if file_type.is_file() {
            out.push(path);
        }
    }
    Ok(())
}
