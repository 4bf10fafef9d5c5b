//! **SPDX manifest generation, tolerant decoding and multi-artifact consolidation.**
//!
//! `sbom-manifest` turns the files, packages and relationships discovered in a
//! build into SPDX manifests, one per requested format version, and merges the
//! manifests of independently built artifacts into a single consolidated one.
//!
//! ## Key Features
//!
//! - **Content-addressable identifiers**: element ids are a pure function of
//!   name and hash, so unchanged content keeps its id across runs and machines
//!   and identical content from different artifacts collapses on merge.
//! - **Concurrent generation**: every record fans out to every active format
//!   generator on a producer task; documents and per-item errors stream back
//!   on two channels that always close.
//! - **Multiple formats**: SPDX 2.2 and SPDX 3.0 (JSON-LD), selected by a
//!   `Name:Version` key through the [`GeneratorRegistry`].
//! - **Tolerant enums**: classification data from external scanners decodes
//!   unknown tokens to a deterministic fallback instead of failing.
//! - **Consolidation**: detects which manifest versions each artifact ships,
//!   extracts the first usable one, and regenerates a merged manifest.
//!
//! ## Core Concepts & Modules
//!
//! - **[`model`]**: records ([`FileRecord`], [`SbomPackage`], [`Relationship`]),
//!   [`ManifestInfo`], checksums and the identifier deriver.
//! - **[`codec`]**: the [`tolerant_enum!`] macro and its serde helpers.
//! - **[`generators`]**: the [`ManifestGenerator`] trait, the SPDX generators
//!   and the registry.
//! - **[`pipeline`]**: the [`GenerationPipeline`], its [`Recorder`] and document
//!   assembly.
//! - **[`workflows`]**: [`SbomGenerationWorkflow`] and [`SbomConsolidationWorkflow`].
//! - **[`adapters`]**: component-detection scan output to packages.
//! - **[`config`]**: the configuration value passed into workflows.
//!
//! ## Getting Started: Generating one element
//!
//! ```
//! use sbom_manifest::{
//!     AlgorithmName, Checksum, FileRecord, GeneratorRegistry, ManifestInfo, ComplianceStandard,
//! };
//!
//! let registry = GeneratorRegistry::standard(ComplianceStandard::None);
//! let spdx22 = registry.get(&ManifestInfo::spdx22())?;
//!
//! let file = FileRecord::new(
//!     "./bin/app",
//!     vec![Checksum::new(AlgorithmName::Sha1, "a94a8fe5ccb19ba61c4c0873d391e987982fbbd3")],
//! );
//! let result = spdx22.generate_file(&file)?;
//! assert!(result.entity_id().starts_with("SPDXRef-File-"));
//! # Ok::<(), sbom_manifest::SbomError>(())
//! ```
//!
//! ## Writing manifests
//!
//! ```no_run
//! use std::sync::Arc;
//! use sbom_manifest::{AppConfig, GeneratorRegistry, SbomGenerationWorkflow, SbomInput};
//! use sbom_manifest::workflows::GenerationWorkflow;
//!
//! # async fn run() -> sbom_manifest::Result<()> {
//! let config = AppConfig::builder()
//!     .package("my-product", "1.0.0", "My Organization")
//!     .manifest_dir("out/_manifest")
//!     .build_drop_path("out")
//!     .build();
//! let registry = Arc::new(GeneratorRegistry::standard(config.generation.conformance));
//! let workflow = SbomGenerationWorkflow::new(registry, &config);
//! let ok = workflow.run(SbomInput::default()).await?;
//! println!("generation {}", if ok { "succeeded" } else { "reported errors" });
//! # Ok(())
//! # }
//! ```

#![warn(clippy::unwrap_used)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

pub mod adapters;
pub mod codec;
pub mod config;
pub mod error;
pub mod generators;
pub mod model;
pub mod pipeline;
pub mod utils;
pub mod workflows;

// Re-export main types for convenience
pub use config::{AppConfig, AppConfigBuilder, BehaviorConfig, ConsolidationConfig, GenerationConfig};
pub use config::{ConfigError, Validatable};
pub use error::{ErrorContext, OptionContext, Result, SbomError};
pub use generators::{GeneratorRegistry, ManifestGenerator, Spdx22Generator, Spdx30Generator};
pub use model::{
    AlgorithmName, ArtifactInfo, Checksum, ComplianceStandard, FileRecord, GenerationResult,
    ManifestInfo, MergeableContent, Relationship, RelationshipType, SbomInput, SbomPackage,
    SbomRecord,
};
pub use pipeline::{EntryError, ErrorType, GenerationPipeline, Recorder, SbomConfig};
pub use workflows::{SbomConsolidationWorkflow, SbomGenerationWorkflow};
