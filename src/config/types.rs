//! Configuration types for generation and consolidation runs.

use crate::model::{AlgorithmName, ArtifactInfo, ComplianceStandard, ManifestInfo};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

// ============================================================================
// Unified Application Configuration
// ============================================================================

/// Unified application configuration that can be loaded from CLI args or config files.
///
/// Built once and passed by value into each workflow constructor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct AppConfig {
    /// Manifest generation settings
    pub generation: GenerationConfig,
    /// Multi-artifact consolidation settings
    pub consolidation: ConsolidationConfig,
    /// Behavior flags
    pub behavior: BehaviorConfig,
}

impl AppConfig {
    /// Create a new `AppConfig` with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an `AppConfig` builder.
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }
}

// ============================================================================
// Builder for AppConfig
// ============================================================================

/// Builder for constructing `AppConfig` with fluent API.
#[derive(Debug, Default)]
#[must_use]
pub struct AppConfigBuilder {
    config: AppConfig,
}

impl AppConfigBuilder {
    /// Set the formats to generate.
    pub fn manifest_infos(mut self, infos: Vec<ManifestInfo>) -> Self {
        self.config.generation.manifest_infos = infos;
        self
    }

    /// Set the name, version and supplier of the root package.
    pub fn package(
        mut self,
        name: impl Into<String>,
        version: impl Into<String>,
        supplier: impl Into<String>,
    ) -> Self {
        self.config.generation.package_name = name.into();
        self.config.generation.package_version = version.into();
        self.config.generation.package_supplier = supplier.into();
        self
    }

    /// Set the directory manifests are written into.
    pub fn manifest_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.generation.manifest_dir = Some(dir.into());
        self
    }

    /// Set the build drop to hash into file records.
    pub fn build_drop_path(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.generation.build_drop_path = Some(dir.into());
        self
    }

    /// Set the algorithms every hashed file gets, on top of those the
    /// configured formats require.
    pub fn hash_algorithms(mut self, algorithms: Vec<AlgorithmName>) -> Self {
        self.config.generation.hash_algorithms = algorithms;
        self
    }

    /// Fix the namespace UUID and creation time, for reproducible output.
    pub const fn reproducible(mut self, uuid: Uuid, created: DateTime<Utc>) -> Self {
        self.config.generation.namespace_uuid = Some(uuid);
        self.config.generation.created = Some(created);
        self
    }

    pub const fn conformance(mut self, conformance: ComplianceStandard) -> Self {
        self.config.generation.conformance = conformance;
        self
    }

    /// Add an artifact to consolidate.
    pub fn artifact(mut self, name: impl Into<String>, info: ArtifactInfo) -> Self {
        self.config
            .consolidation
            .artifact_info_map
            .insert(name.into(), info);
        self
    }

    /// Set the preferred extraction order across detected formats.
    pub fn version_preference(mut self, preference: Vec<ManifestInfo>) -> Self {
        self.config.consolidation.version_preference = preference;
        self
    }

    /// Set the directory the consolidated manifest is written under.
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.consolidation.output_dir = Some(dir.into());
        self
    }

    pub const fn fail_on_errors(mut self, fail: bool) -> Self {
        self.config.behavior.fail_on_errors = fail;
        self
    }

    /// Build the `AppConfig`.
    #[must_use]
    pub fn build(self) -> AppConfig {
        self.config
    }
}

// ============================================================================
// Generation Configuration
// ============================================================================

/// Settings for one manifest generation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct GenerationConfig {
    /// Formats to generate, written as `Name:Version`
    #[schemars(with = "Vec<String>")]
    pub manifest_infos: Vec<ManifestInfo>,
    /// Name of the root package
    pub package_name: String,
    /// Version of the root package
    pub package_version: String,
    /// Supplier organization of the root package
    pub package_supplier: String,
    /// Base URI of the document namespace
    pub namespace_uri_base: String,
    /// Fixed namespace UUID; random per run when absent
    pub namespace_uuid: Option<Uuid>,
    /// Fixed creation time; the current time when absent
    pub created: Option<DateTime<Utc>>,
    /// Extra conformance rules
    #[schemars(with = "String")]
    pub conformance: ComplianceStandard,
    /// Directory the manifest layout is written into
    pub manifest_dir: Option<PathBuf>,
    /// Build drop whose files are hashed into the manifest
    pub build_drop_path: Option<PathBuf>,
    /// Hash algorithms computed for build drop files (SHA1 is always added)
    pub hash_algorithms: Vec<AlgorithmName>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            manifest_infos: vec![ManifestInfo::spdx22()],
            package_name: String::new(),
            package_version: String::new(),
            package_supplier: String::new(),
            namespace_uri_base: DEFAULT_NAMESPACE_URI_BASE.to_string(),
            namespace_uuid: None,
            created: None,
            conformance: ComplianceStandard::None,
            manifest_dir: None,
            build_drop_path: None,
            hash_algorithms: vec![AlgorithmName::Sha1, AlgorithmName::Sha256],
        }
    }
}

/// Namespace base used when none is configured.
pub const DEFAULT_NAMESPACE_URI_BASE: &str = "https://spdx.org/spdxdocs/sbom-manifest";

// ============================================================================
// Consolidation Configuration
// ============================================================================

/// Settings for merging the manifests of several artifacts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ConsolidationConfig {
    /// Artifact name to manifest location
    pub artifact_info_map: IndexMap<String, ArtifactInfo>,
    /// Extraction order across detected formats; registry order when empty
    #[schemars(with = "Vec<String>")]
    pub version_preference: Vec<ManifestInfo>,
    /// Where the consolidated manifest is written; overrides `generation.manifest_dir`
    pub output_dir: Option<PathBuf>,
}

// ============================================================================
// Behavior Configuration
// ============================================================================

/// Behavior flags
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct BehaviorConfig {
    /// Report failure when any per-item error occurred
    pub fail_on_errors: bool,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            fail_on_errors: true,
        }
    }
}
