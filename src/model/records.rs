//! Domain records fed into generation and produced by extraction.

use super::checksum::Checksum;
use crate::tolerant_enum;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// A file discovered in the build drop.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FileRecord {
    /// Path relative to the build drop, `./`-prefixed by convention
    pub path: String,
    pub checksums: Vec<Checksum>,
    pub license_concluded: Option<String>,
    pub license_info_in_files: Vec<String>,
    pub copyright_text: Option<String>,
}

impl FileRecord {
    pub fn new(path: impl Into<String>, checksums: Vec<Checksum>) -> Self {
        Self {
            path: path.into(),
            checksums,
            ..Self::default()
        }
    }
}

/// A package (dependency or component) discovered for the build.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SbomPackage {
    /// Explicit identifier; derived from content when absent
    pub id: Option<String>,
    pub name: String,
    pub version: Option<String>,
    pub supplier: Option<String>,
    #[serde(alias = "packageUrl")]
    pub purl: Option<String>,
    pub license_concluded: Option<String>,
    pub license_declared: Option<String>,
    pub copyright_text: Option<String>,
    pub checksums: Vec<Checksum>,
    /// Identifiers of the packages this package depends on
    pub depends_on: Vec<String>,
}

impl SbomPackage {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: Some(version.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_supplier(mut self, supplier: impl Into<String>) -> Self {
        self.supplier = Some(supplier.into());
        self
    }

    #[must_use]
    pub fn with_purl(mut self, purl: impl Into<String>) -> Self {
        self.purl = Some(purl.into());
        self
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub fn depending_on(mut self, id: impl Into<String>) -> Self {
        self.depends_on.push(id.into());
        self
    }

    /// Human-readable key used in error entries.
    #[must_use]
    pub fn display_key(&self) -> String {
        match &self.version {
            Some(version) => format!("{}@{}", self.name, version),
            None => self.name.clone(),
        }
    }
}

tolerant_enum! {
    /// Kind of a directed edge between two identified elements.
    pub enum RelationshipType {
        Other = -1 => "OTHER",
        Contains = 0 => "CONTAINS",
        DependsOn = 1 => "DEPENDS_ON",
        Describes = 2 => "DESCRIBES",
        DescribedBy = 3 => "DESCRIBED_BY",
        PrerequisiteFor = 4 => "PREREQUISITE_FOR",
        PatchFor = 5 => "PATCH_FOR",
    }
}

impl RelationshipType {
    /// SPDX 3.0 relationship name and whether the edge direction flips.
    #[must_use]
    pub const fn spdx3(&self) -> (&'static str, bool) {
        match self {
            Self::Contains => ("contains", false),
            Self::DependsOn => ("dependsOn", false),
            Self::Describes => ("describes", false),
            Self::DescribedBy => ("describes", true),
            Self::PrerequisiteFor => ("hasPrerequisite", true),
            Self::PatchFor => ("patchedBy", true),
            Self::Other => ("other", false),
        }
    }

    /// Inverse of [`spdx3`](Self::spdx3).
    #[must_use]
    pub fn from_spdx3(name: &str) -> (Self, bool) {
        match name {
            "contains" => (Self::Contains, false),
            "dependsOn" => (Self::DependsOn, false),
            "describes" => (Self::Describes, false),
            "hasPrerequisite" => (Self::PrerequisiteFor, true),
            "patchedBy" => (Self::PatchFor, true),
            _ => (Self::Other, false),
        }
    }
}

/// A directed edge between two identified elements.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    pub source_element_id: String,
    pub target_element_id: String,
    pub relationship_type: RelationshipType,
    /// Set when the target lives in another document (`DocumentRef-...`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_external_reference_id: Option<String>,
}

impl Relationship {
    pub fn new(
        source: impl Into<String>,
        relationship_type: RelationshipType,
        target: impl Into<String>,
    ) -> Self {
        Self {
            source_element_id: source.into(),
            target_element_id: target.into(),
            relationship_type,
            target_external_reference_id: None,
        }
    }

    /// Edge whose target is an element of an external document.
    pub fn to_external(
        source: impl Into<String>,
        relationship_type: RelationshipType,
        document_ref: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Self {
            target_external_reference_id: Some(document_ref.into()),
            ..Self::new(source, relationship_type, target)
        }
    }

    /// Target as written in a document: `DocumentRef-x:SPDXRef-y` for external targets.
    #[must_use]
    pub fn target_reference(&self) -> String {
        match &self.target_external_reference_id {
            Some(doc) => format!("{doc}:{}", self.target_element_id),
            None => self.target_element_id.clone(),
        }
    }

    /// Stable identity of the edge, used for de-duplication.
    #[must_use]
    pub fn entity_id(&self) -> String {
        format!(
            "{}-{}-{}",
            self.source_element_id,
            self.relationship_type,
            self.target_reference()
        )
    }
}

impl fmt::Display for Relationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.source_element_id,
            self.relationship_type,
            self.target_reference()
        )
    }
}

/// Reference to a separately published SBOM this build consumes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExternalDocumentReferenceInfo {
    pub external_document_name: String,
    pub document_namespace: String,
    pub checksums: Vec<Checksum>,
    /// Root element described by the external document
    pub described_element_id: Option<String>,
}

/// Optional sections of a manifest document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Files,
    Packages,
    Relationships,
    ExternalDocumentReferences,
}

impl Section {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Files => "files",
            Self::Packages => "packages",
            Self::Relationships => "relationships",
            Self::ExternalDocumentReferences => "externalDocumentRefs",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One input item of a generation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SbomRecord {
    File(FileRecord),
    Package(SbomPackage),
    Relationship(Relationship),
    ExternalDocumentReference(ExternalDocumentReferenceInfo),
}

impl SbomRecord {
    /// Document section this record is written into.
    #[must_use]
    pub const fn section(&self) -> Section {
        match self {
            Self::File(_) => Section::Files,
            Self::Package(_) => Section::Packages,
            Self::Relationship(_) => Section::Relationships,
            Self::ExternalDocumentReference(_) => Section::ExternalDocumentReferences,
        }
    }

    /// Identifying key reported with per-item errors.
    #[must_use]
    pub fn key(&self) -> String {
        match self {
            Self::File(file) => file.path.clone(),
            Self::Package(package) => package.display_key(),
            Self::Relationship(relationship) => relationship.to_string(),
            Self::ExternalDocumentReference(reference) => {
                reference.external_document_name.clone()
            }
        }
    }
}

/// The records of one build, as read from an input file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SbomInput {
    pub files: Vec<FileRecord>,
    pub packages: Vec<SbomPackage>,
    pub relationships: Vec<Relationship>,
    pub external_document_references: Vec<ExternalDocumentReferenceInfo>,
}

impl SbomInput {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
            && self.packages.is_empty()
            && self.relationships.is_empty()
            && self.external_document_references.is_empty()
    }
}

/// Where to find the already-produced manifest of one build artifact.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ArtifactInfo {
    /// Artifact root; the artifact map key is used when absent
    pub artifact_path: Option<PathBuf>,
    /// Manifest directory overriding `<artifact_path>/_manifest`
    pub external_manifest_dir: Option<PathBuf>,
    pub skip_signing_check: bool,
}
