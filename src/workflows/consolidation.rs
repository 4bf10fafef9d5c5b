//! Merging the manifests of independently built artifacts.
//!
//! ```text
//! artifact map --> locate manifest dir --> detect formats --> select + extract
//!                  (per artifact, in parallel)                       |
//!                                                                    v
//!                      generation workflow <-- merge (sequential fold)
//! ```

use super::sign::SignValidator;
use super::GenerationWorkflow;
use crate::config::{AppConfig, ConsolidationConfig};
use crate::error::{Result, SbomError};
use crate::generators::{FileSystemDetector, GeneratorRegistry, ManifestDetector};
use crate::model::{ArtifactInfo, ManifestInfo, MergeableContent, MergedRecords};
use indexmap::IndexMap;
use rayon::prelude::*;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Conventional manifest folder inside an artifact.
pub const MANIFEST_FOLDER: &str = "_manifest";

/// Manifest directory of an artifact: its external manifest directory when
/// set, else `<artifact path or name>/_manifest`.
#[must_use]
pub fn artifact_manifest_dir(name: &str, info: &ArtifactInfo) -> PathBuf {
    if let Some(dir) = &info.external_manifest_dir {
        return dir.clone();
    }
    info.artifact_path
        .clone()
        .unwrap_or_else(|| PathBuf::from(name))
        .join(MANIFEST_FOLDER)
}

/// Consolidates several artifacts' manifests into one.
///
/// Each artifact contributes either all of one manifest's content or
/// nothing. The merged records are handed to the generation workflow,
/// whose result becomes the result of the run.
pub struct SbomConsolidationWorkflow<W, D = FileSystemDetector> {
    registry: Arc<GeneratorRegistry>,
    detector: D,
    generation: W,
    sign_validator: Option<Arc<dyn SignValidator>>,
    config: ConsolidationConfig,
}

impl<W: GenerationWorkflow> SbomConsolidationWorkflow<W, FileSystemDetector> {
    /// Detects every format registered in `registry`.
    pub fn new(registry: Arc<GeneratorRegistry>, generation: W, config: &AppConfig) -> Result<Self> {
        let detector = FileSystemDetector::new(registry.manifest_infos()?);
        Ok(Self {
            registry,
            detector,
            generation,
            sign_validator: None,
            config: config.consolidation.clone(),
        })
    }
}

impl<W: GenerationWorkflow, D: ManifestDetector> SbomConsolidationWorkflow<W, D> {
    /// Replace the format detector.
    pub fn with_detector<D2: ManifestDetector>(self, detector: D2) -> SbomConsolidationWorkflow<W, D2> {
        SbomConsolidationWorkflow {
            registry: self.registry,
            detector,
            generation: self.generation,
            sign_validator: self.sign_validator,
            config: self.config,
        }
    }

    /// Validate each manifest before extraction, unless the artifact opts out.
    #[must_use]
    pub fn with_sign_validator(mut self, validator: Arc<dyn SignValidator>) -> Self {
        self.sign_validator = Some(validator);
        self
    }

    #[must_use]
    pub const fn generation(&self) -> &W {
        &self.generation
    }

    /// Run the consolidation.
    ///
    /// `Ok(false)` when there are no artifacts or none had a usable
    /// manifest; otherwise the generation workflow's result.
    pub async fn run(&self) -> Result<bool> {
        if self.config.artifact_info_map.is_empty() {
            tracing::warn!("no artifacts to consolidate");
            return Ok(false);
        }

        let order = self.candidate_order()?;
        let artifacts: Vec<(&String, &ArtifactInfo)> =
            self.config.artifact_info_map.iter().collect();
        let extracted: Vec<(&String, Option<MergeableContent>)> = artifacts
            .par_iter()
            .map(|(name, info)| (*name, self.extract_artifact(name, info, &order)))
            .collect();

        let mut merged = MergedRecords::new();
        let mut usable = 0usize;
        for (name, content) in extracted {
            let Some(content) = content else {
                continue;
            };
            let source = content.source.clone();
            match merged.absorb(content) {
                Ok(()) => {
                    tracing::info!(artifact = %name, manifest = %source, "artifact merged");
                    usable += 1;
                }
                Err(e) => {
                    tracing::warn!(artifact = %name, manifest = %source, error = %e, "artifact skipped");
                }
            }
        }

        if usable == 0 {
            tracing::warn!(artifacts = artifacts.len(), "{}", SbomError::NoValidManifestFound);
            return Ok(false);
        }

        tracing::info!(
            artifacts = usable,
            files = merged.file_count(),
            packages = merged.package_count(),
            relationships = merged.relationship_count(),
            dropped_relationships = merged.dropped_relationships(),
            "merged artifact manifests"
        );
        self.generation.run(merged.into_input()).await
    }

    /// Formats to try, in order: the configured preference (registered
    /// entries only), then the remaining registered formats in registry order.
    fn candidate_order(&self) -> Result<Vec<ManifestInfo>> {
        let registered = self.registry.manifest_infos()?;
        let mut order: Vec<ManifestInfo> = Vec::with_capacity(registered.len());
        for info in &self.config.version_preference {
            if !registered.contains(info) {
                tracing::warn!(manifest = %info, "preferred format is not registered, ignoring");
            } else if !order.contains(info) {
                order.push(info.clone());
            }
        }
        for info in registered {
            if !order.contains(&info) {
                order.push(info);
            }
        }
        Ok(order)
    }

    fn extract_artifact(
        &self,
        name: &str,
        info: &ArtifactInfo,
        order: &[ManifestInfo],
    ) -> Option<MergeableContent> {
        let manifest_dir = artifact_manifest_dir(name, info);
        let detected = self.detector.detect(&manifest_dir);
        if detected.is_empty() {
            tracing::warn!(
                artifact = name,
                dir = %manifest_dir.display(),
                "no manifest detected, skipping artifact"
            );
            return None;
        }

        for candidate in order {
            let Some(found) = detected.iter().find(|d| &d.manifest_info == candidate) else {
                continue;
            };

            if !info.skip_signing_check {
                if let Some(validator) = &self.sign_validator {
                    let mut telemetry = IndexMap::new();
                    if !validator.validate(&found.path, &mut telemetry) {
                        tracing::warn!(
                            artifact = name,
                            manifest = %candidate,
                            "manifest failed signature validation"
                        );
                        tracing::debug!(artifact = name, ?telemetry, "sign validation telemetry");
                        continue;
                    }
                }
            }

            let generator = match self.registry.get(candidate) {
                Ok(generator) => generator,
                Err(e) => {
                    tracing::warn!(artifact = name, manifest = %candidate, error = %e, "no generator");
                    continue;
                }
            };
            match generator.extract_mergeable_content(&found.path) {
                Ok(content) => {
                    tracing::debug!(
                        artifact = name,
                        manifest = %candidate,
                        files = content.files.len(),
                        packages = content.packages.len(),
                        "extracted mergeable content"
                    );
                    return Some(content);
                }
                Err(e) => {
                    tracing::warn!(
                        artifact = name,
                        manifest = %candidate,
                        path = %found.path.display(),
                        error = %e,
                        "extraction failed"
                    );
                }
            }
        }

        tracing::warn!(artifact = name, "no usable manifest, skipping artifact");
        None
    }
}

impl<W, D> fmt::Debug for SbomConsolidationWorkflow<W, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SbomConsolidationWorkflow")
            .field("registry", &self.registry)
            .field("artifacts", &self.config.artifact_info_map.len())
            .field("sign_validator", &self.sign_validator.is_some())
            .finish_non_exhaustive()
    }
}
