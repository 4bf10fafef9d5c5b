//! The per-format generator contract.

use crate::error::{Result, SbomError};
use crate::model::{
    AlgorithmName, DocumentMetadata, ExternalDocumentReferenceInfo, FileRecord, GenerationData,
    GenerationResult, ManifestInfo, MergeableContent, Relationship, SbomPackage, SbomRecord,
    Section,
};
use serde_json::{Map, Value};
use std::path::Path;

/// Translation from domain records to one manifest format and version.
///
/// Implementations are pure: they hold no per-run state and may be shared
/// across threads. Adding a format means adding an implementation and
/// registering it with the [`GeneratorRegistry`](super::GeneratorRegistry).
pub trait ManifestGenerator: Send + Sync {
    /// The format and version this generator produces.
    fn register_manifest(&self) -> ManifestInfo;

    /// Hash algorithms every file checksum set must contain.
    fn required_hash_algorithms(&self) -> &'static [AlgorithmName];

    fn generate_file(&self, file: &FileRecord) -> Result<GenerationResult>;

    fn generate_package(&self, package: &SbomPackage) -> Result<GenerationResult>;

    fn generate_relationship(&self, relationship: &Relationship) -> Result<GenerationResult>;

    fn generate_external_document_reference(
        &self,
        reference: &ExternalDocumentReferenceInfo,
    ) -> Result<GenerationResult>;

    /// The package describing the build itself.
    fn generate_root_package(
        &self,
        metadata: &DocumentMetadata,
        data: &GenerationData,
    ) -> Result<GenerationResult>;

    /// Stand-alone creation-info element, for formats that have one.
    fn generate_creation_info(&self, _metadata: &DocumentMetadata) -> Result<GenerationResult> {
        Err(SbomError::not_supported(
            &self.register_manifest(),
            "creationInfo",
        ))
    }

    /// Document key holding the given section.
    ///
    /// Returns [`SbomError::NotSupported`] when the format has no such section.
    fn header_name(&self, section: Section) -> Result<&'static str>;

    /// Document key holding the creation-info element.
    fn creation_info_header_name(&self) -> Result<&'static str> {
        Err(SbomError::not_supported(
            &self.register_manifest(),
            "creationInfo",
        ))
    }

    /// Top-level document fields written before any section.
    fn metadata_dictionary(
        &self,
        metadata: &DocumentMetadata,
        data: &GenerationData,
    ) -> Result<Map<String, Value>>;

    /// Read a manifest of this format back into mergeable records.
    ///
    /// Fails when the file does not parse or any file element lacks SHA1.
    fn extract_mergeable_content(&self, manifest_path: &Path) -> Result<MergeableContent>;

    /// Dispatch a record to the matching `generate_*` operation.
    fn generate(&self, record: &SbomRecord) -> Result<GenerationResult> {
        match record {
            SbomRecord::File(file) => self.generate_file(file),
            SbomRecord::Package(package) => self.generate_package(package),
            SbomRecord::Relationship(relationship) => self.generate_relationship(relationship),
            SbomRecord::ExternalDocumentReference(reference) => {
                self.generate_external_document_reference(reference)
            }
        }
    }

    /// True if the format has the given section.
    fn supports(&self, section: Section) -> bool {
        self.header_name(section).is_ok()
    }
}
