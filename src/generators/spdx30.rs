//! SPDX 3.0 JSON-LD generator.
//!
//! Every element lives in the document's `@graph` array, so all section
//! headers resolve to `@graph`. The format has no external document
//! reference section.

use super::license::{copyright_or_noassertion, license_from_document};
use super::traits::ManifestGenerator;
use crate::error::{ErrorContext, Result, SbomError};
use crate::model::{
    file_id, find_checksum, package_id, AlgorithmName, Checksum, ComplianceStandard,
    DocumentMetadata, ExternalDocumentReferenceInfo, Extracted, FileRecord, GenerationData,
    GenerationResult, ManifestInfo, MergeableContent, Relationship, RelationshipType,
    SbomPackage, Section, DOCUMENT_ID, ROOT_PACKAGE_ID,
};
use crate::utils::hash::sha256_upper;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::path::Path;

pub const SPDX3_CONTEXT: &str = "https://spdx.org/rdf/3.0.1/spdx-context.jsonld";
const SPEC_VERSION: &str = "3.0.1";
const CREATION_INFO_ID: &str = "_:creationinfo";
const GRAPH: &str = "@graph";
const REQUIRED_HASHES: &[AlgorithmName] = &[AlgorithmName::Sha1, AlgorithmName::Sha256];

/// Generator for `SPDX:3.0`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Spdx30Generator {
    conformance: ComplianceStandard,
}

impl Spdx30Generator {
    #[must_use]
    pub const fn new(conformance: ComplianceStandard) -> Self {
        Self { conformance }
    }

    #[must_use]
    pub const fn conformance(&self) -> ComplianceStandard {
        self.conformance
    }
}

impl ManifestGenerator for Spdx30Generator {
    fn register_manifest(&self) -> ManifestInfo {
        ManifestInfo::spdx30()
    }

    fn required_hash_algorithms(&self) -> &'static [AlgorithmName] {
        REQUIRED_HASHES
    }

    fn generate_file(&self, file: &FileRecord) -> Result<GenerationResult> {
        let id = file_id(&file.path, &file.checksums)?;
        if self.conformance == ComplianceStandard::Ntia
            && find_checksum(&file.checksums, AlgorithmName::Sha256).is_none()
        {
            return Err(SbomError::generation(
                &file.path,
                "NTIA conformance requires a SHA256 checksum in verifiedUsing",
            ));
        }
        let element = GraphElement::File(FileElement {
            spdx_id: id.clone(),
            creation_info: CREATION_INFO_ID.to_string(),
            name: file.path.clone(),
            verified_using: file
                .checksums
                .iter()
                .filter(|c| REQUIRED_HASHES.contains(&c.algorithm))
                .map(IntegrityMethod::hash)
                .collect(),
            copyright_text: Some(copyright_or_noassertion(file.copyright_text.as_deref())),
        });
        Ok(GenerationResult::new(to_value(&element, &file.path)?, id))
    }

    fn generate_package(&self, package: &SbomPackage) -> Result<GenerationResult> {
        let id = package_id(package);
        let element = GraphElement::Package(PackageElement {
            spdx_id: id.clone(),
            creation_info: CREATION_INFO_ID.to_string(),
            name: package.name.clone(),
            package_version: package.version.clone(),
            package_url: package.purl.clone(),
            supplied_by: package.supplier.as_deref().map(Agent::organization),
            copyright_text: Some(copyright_or_noassertion(package.copyright_text.as_deref())),
            verified_using: package.checksums.iter().map(IntegrityMethod::hash).collect(),
        });
        Ok(GenerationResult::new(to_value(&element, &package.name)?, id)
            .with_dependencies(package.depends_on.clone()))
    }

    fn generate_relationship(&self, relationship: &Relationship) -> Result<GenerationResult> {
        if relationship.target_external_reference_id.is_some() {
            return Err(SbomError::not_supported(
                &self.register_manifest(),
                Section::ExternalDocumentReferences.as_str(),
            ));
        }
        let entity_id = relationship.entity_id();
        let (name, flipped) = relationship.relationship_type.spdx3();
        let (from, to) = if flipped {
            (&relationship.target_element_id, &relationship.source_element_id)
        } else {
            (&relationship.source_element_id, &relationship.target_element_id)
        };
        let element = GraphElement::Relationship(RelationshipElement {
            spdx_id: format!("SPDXRef-Relationship-{}", sha256_upper(&entity_id)),
            creation_info: CREATION_INFO_ID.to_string(),
            from: from.clone(),
            relationship_type: name.to_string(),
            to: vec![to.clone()],
        });
        Ok(GenerationResult::new(
            to_value(&element, &relationship.to_string())?,
            entity_id,
        ))
    }

    fn generate_external_document_reference(
        &self,
        _reference: &ExternalDocumentReferenceInfo,
    ) -> Result<GenerationResult> {
        Err(SbomError::not_supported(
            &self.register_manifest(),
            Section::ExternalDocumentReferences.as_str(),
        ))
    }

    fn generate_root_package(
        &self,
        metadata: &DocumentMetadata,
        _data: &GenerationData,
    ) -> Result<GenerationResult> {
        let verified_using = metadata
            .package_verification_code
            .clone()
            .map(|value| IntegrityMethod {
                kind: "PackageVerificationCode".to_string(),
                algorithm: "sha1".to_string(),
                hash_value: value,
            })
            .into_iter()
            .collect();
        let element = GraphElement::Package(PackageElement {
            spdx_id: ROOT_PACKAGE_ID.to_string(),
            creation_info: CREATION_INFO_ID.to_string(),
            name: metadata.package_name.clone(),
            package_version: Some(metadata.package_version.clone()),
            package_url: None,
            supplied_by: Some(Agent::organization(&metadata.package_supplier)),
            copyright_text: None,
            verified_using,
        });
        Ok(GenerationResult::new(
            to_value(&element, &metadata.package_name)?,
            ROOT_PACKAGE_ID,
        ))
    }

    fn generate_creation_info(&self, metadata: &DocumentMetadata) -> Result<GenerationResult> {
        let document = json!({
            "@id": CREATION_INFO_ID,
            "type": "CreationInfo",
            "specVersion": SPEC_VERSION,
            "created": metadata.created_timestamp(),
            "createdBy": [{"type": "Organization", "name": metadata.package_supplier}],
            "createdUsing": [{
                "type": "Tool",
                "name": format!("{}-{}", metadata.tool_name, metadata.tool_version),
            }],
        });
        Ok(GenerationResult::new(document, CREATION_INFO_ID))
    }

    fn header_name(&self, section: Section) -> Result<&'static str> {
        match section {
            Section::Files | Section::Packages | Section::Relationships => Ok(GRAPH),
            Section::ExternalDocumentReferences => Err(SbomError::not_supported(
                &self.register_manifest(),
                section.as_str(),
            )),
        }
    }

    fn creation_info_header_name(&self) -> Result<&'static str> {
        Ok(GRAPH)
    }

    fn metadata_dictionary(
        &self,
        metadata: &DocumentMetadata,
        _data: &GenerationData,
    ) -> Result<Map<String, Value>> {
        let mut header = Map::new();
        header.insert("@context".into(), json!(SPDX3_CONTEXT));
        header.insert(
            GRAPH.into(),
            json!([{
                "type": "SpdxDocument",
                "spdxId": DOCUMENT_ID,
                "creationInfo": CREATION_INFO_ID,
                "name": metadata.document_name(),
                "dataLicense": "CC0-1.0",
                "namespaceMap": [{
                    "prefix": "doc",
                    "namespace": metadata.document_namespace,
                }],
                "profileConformance": profile_conformance(self.conformance),
                "rootElement": [ROOT_PACKAGE_ID],
            }]),
        );
        Ok(header)
    }

    fn extract_mergeable_content(&self, manifest_path: &Path) -> Result<MergeableContent> {
        let content = std::fs::read_to_string(manifest_path)
            .map_err(|e| SbomError::io(manifest_path, e))?;
        let document: DocumentIn = serde_json::from_str(&content)
            .with_context(|| format!("parsing {}", manifest_path.display()))?;
        if !document.context.mentions("spdx.org/rdf/3.0") {
            return Err(SbomError::validation(format!(
                "{} has no SPDX 3.0 @context",
                manifest_path.display()
            )));
        }

        let mut mergeable = MergeableContent::new(self.register_manifest(), DOCUMENT_ID);
        for element in document.graph {
            match element {
                GraphElement::Document(doc) => mergeable.document_id = doc.spdx_id,
                GraphElement::File(file) => {
                    let record = file.to_record();
                    if find_checksum(&record.checksums, AlgorithmName::Sha1).is_none() {
                        return Err(SbomError::missing_hash("file", record.path));
                    }
                    mergeable.files.push(Extracted::new(file.spdx_id, record));
                }
                GraphElement::Package(package) => {
                    let record = package.to_record();
                    mergeable.packages.push(Extracted::new(package.spdx_id, record));
                }
                GraphElement::Relationship(relationship) => {
                    let (relationship_type, flipped) =
                        RelationshipType::from_spdx3(&relationship.relationship_type);
                    for to in relationship.to {
                        let (source, target) = if flipped {
                            (to, relationship.from.clone())
                        } else {
                            (relationship.from.clone(), to)
                        };
                        mergeable
                            .relationships
                            .push(Relationship::new(source, relationship_type, target));
                    }
                }
                GraphElement::Other => {}
            }
        }
        Ok(mergeable)
    }
}

fn profile_conformance(conformance: ComplianceStandard) -> Vec<&'static str> {
    match conformance {
        ComplianceStandard::None => vec!["core", "software"],
        ComplianceStandard::Ntia => vec!["core", "software", "simpleLicensing"],
    }
}

fn to_value<T: Serialize>(element: &T, key: &str) -> Result<Value> {
    serde_json::to_value(element).map_err(|e| SbomError::json(format!("serializing {key}"), e))
}

fn algorithm_name(algorithm: AlgorithmName) -> &'static str {
    match algorithm {
        AlgorithmName::Sha1 => "sha1",
        AlgorithmName::Sha256 => "sha256",
        AlgorithmName::Sha512 => "sha512",
        AlgorithmName::Md5 => "md5",
    }
}

// SPDX 3.0 JSON-LD structures

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
enum GraphElement {
    #[serde(rename = "SpdxDocument")]
    Document(DocumentElement),
    #[serde(rename = "software_File")]
    File(FileElement),
    #[serde(rename = "software_Package")]
    Package(PackageElement),
    Relationship(RelationshipElement),
    #[serde(other)]
    Other,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DocumentElement {
    spdx_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IntegrityMethod {
    #[serde(rename = "type")]
    kind: String,
    algorithm: String,
    hash_value: String,
}

impl IntegrityMethod {
    fn hash(checksum: &Checksum) -> Self {
        Self {
            kind: "Hash".to_string(),
            algorithm: algorithm_name(checksum.algorithm).to_string(),
            hash_value: checksum.value.clone(),
        }
    }

    fn to_checksum(&self) -> Option<Checksum> {
        if self.kind != "Hash" {
            return None;
        }
        let algorithm = self.algorithm.parse::<AlgorithmName>().ok()?;
        Some(Checksum::new(algorithm, self.hash_value.clone()))
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Agent {
    #[serde(rename = "type")]
    kind: String,
    name: String,
}

impl Agent {
    fn organization(name: &str) -> Self {
        Self {
            kind: "Organization".to_string(),
            name: name.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileElement {
    spdx_id: String,
    #[serde(default)]
    creation_info: String,
    name: String,
    #[serde(default)]
    verified_using: Vec<IntegrityMethod>,
    #[serde(
        rename = "software_copyrightText",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    copyright_text: Option<String>,
}

impl FileElement {
    fn to_record(&self) -> FileRecord {
        FileRecord {
            path: self.name.clone(),
            checksums: self
                .verified_using
                .iter()
                .filter_map(IntegrityMethod::to_checksum)
                .collect(),
            license_concluded: None,
            license_info_in_files: Vec::new(),
            copyright_text: license_from_document(self.copyright_text.as_deref()),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PackageElement {
    spdx_id: String,
    #[serde(default)]
    creation_info: String,
    name: String,
    #[serde(
        rename = "software_packageVersion",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    package_version: Option<String>,
    #[serde(
        rename = "software_packageUrl",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    package_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    supplied_by: Option<Agent>,
    #[serde(
        rename = "software_copyrightText",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    copyright_text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    verified_using: Vec<IntegrityMethod>,
}

impl PackageElement {
    fn to_record(&self) -> SbomPackage {
        SbomPackage {
            id: None,
            name: self.name.clone(),
            version: self.package_version.clone(),
            supplier: self.supplied_by.as_ref().map(|agent| agent.name.clone()),
            purl: self.package_url.clone(),
            license_concluded: None,
            license_declared: None,
            copyright_text: license_from_document(self.copyright_text.as_deref()),
            checksums: self
                .verified_using
                .iter()
                .filter_map(IntegrityMethod::to_checksum)
                .collect(),
            depends_on: Vec::new(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RelationshipElement {
    spdx_id: String,
    #[serde(default)]
    creation_info: String,
    from: String,
    relationship_type: String,
    #[serde(default)]
    to: Vec<String>,
}

/// JSON-LD allows `@context` as a single IRI or a list of them.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum JsonLdContext {
    Single(String),
    Many(Vec<Value>),
}

impl JsonLdContext {
    fn mentions(&self, needle: &str) -> bool {
        match self {
            Self::Single(iri) => iri.contains(needle),
            Self::Many(entries) => entries
                .iter()
                .any(|entry| entry.as_str().is_some_and(|iri| iri.contains(needle))),
        }
    }
}

#[derive(Debug, Deserialize)]
struct DocumentIn {
    #[serde(rename = "@context")]
    context: JsonLdContext,
    #[serde(rename = "@graph", default)]
    graph: Vec<GraphElement>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::io::Write;

    fn metadata() -> DocumentMetadata {
        DocumentMetadata {
            package_name: "app".into(),
            package_version: "1.0".into(),
            package_supplier: "Contoso".into(),
            document_namespace: "https://sbom.example/app/1.0".into(),
            created: Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap(),
            tool_name: "sbom-manifest".into(),
            tool_version: "0.1.0".into(),
            conformance: ComplianceStandard::None,
            package_verification_code: None,
        }
    }

    fn sha1_only(path: &str) -> FileRecord {
        FileRecord::new(path, vec![Checksum::new(AlgorithmName::Sha1, "abc")])
    }

    #[test]
    fn test_headers_are_graph() {
        let generator = Spdx30Generator::default();
        assert_eq!(generator.header_name(Section::Files).unwrap(), "@graph");
        assert_eq!(generator.creation_info_header_name().unwrap(), "@graph");
        assert!(!generator.supports(Section::ExternalDocumentReferences));
    }

    #[test]
    fn test_ntia_requires_sha256() {
        let plain = Spdx30Generator::new(ComplianceStandard::None);
        assert!(plain.generate_file(&sha1_only("./a.dll")).is_ok());

        let ntia = Spdx30Generator::new(ComplianceStandard::Ntia);
        match ntia.generate_file(&sha1_only("./a.dll")) {
            Err(SbomError::GenerationFailure { key, .. }) => assert_eq!(key, "./a.dll"),
            other => panic!("Expected GenerationFailure, got {other:?}"),
        }
    }

    #[test]
    fn test_relationship_uses_camel_case_and_flips() {
        let generator = Spdx30Generator::default();
        let depends = Relationship::new("a", RelationshipType::DependsOn, "b");
        let result = generator.generate_relationship(&depends).unwrap();
        assert_eq!(result.document["type"], "Relationship");
        assert_eq!(result.document["relationshipType"], "dependsOn");
        assert_eq!(result.document["from"], "a");

        let prereq = Relationship::new("a", RelationshipType::PrerequisiteFor, "b");
        let result = generator.generate_relationship(&prereq).unwrap();
        assert_eq!(result.document["from"], "b");
        assert_eq!(result.document["to"][0], "a");
    }

    #[test]
    fn test_creation_info_element() {
        let result = Spdx30Generator::default()
            .generate_creation_info(&metadata())
            .unwrap();
        assert_eq!(result.document["type"], "CreationInfo");
        assert_eq!(result.document["created"], "2024-01-02T03:04:05Z");
    }

    #[test]
    fn test_extract_round_trip() {
        let generator = Spdx30Generator::default();
        let mut graph = generator
            .metadata_dictionary(&metadata(), &GenerationData::default())
            .unwrap()
            .remove("@graph")
            .unwrap()
            .as_array()
            .cloned()
            .unwrap();
        let file = generator.generate_file(&sha1_only("./a.dll")).unwrap();
        let package = generator
            .generate_package(&SbomPackage::new("serde", "1.0").with_supplier("dtolnay"))
            .unwrap();
        let relationship = generator
            .generate_relationship(&Relationship::new(
                ROOT_PACKAGE_ID,
                RelationshipType::Contains,
                file.entity_id(),
            ))
            .unwrap();
        graph.extend([file.document.clone(), package.document, relationship.document]);
        let document = json!({"@context": SPDX3_CONTEXT, "@graph": graph});

        let mut out = tempfile::NamedTempFile::new().unwrap();
        out.write_all(document.to_string().as_bytes()).unwrap();
        let content = generator.extract_mergeable_content(out.path()).unwrap();

        assert_eq!(content.files.len(), 1);
        assert_eq!(content.files[0].original_id, file.entity_id());
        assert_eq!(content.packages[0].record.supplier.as_deref(), Some("dtolnay"));
        assert_eq!(
            content.relationships[0].relationship_type,
            RelationshipType::Contains
        );
    }

    #[test]
    fn test_extract_accepts_context_list() {
        let generator = Spdx30Generator::default();
        let file = generator.generate_file(&sha1_only("./a.dll")).unwrap();
        let document = json!({
            "@context": [SPDX3_CONTEXT, {"ex": "https://example.org/"}],
            "@graph": [file.document],
        });
        let mut out = tempfile::NamedTempFile::new().unwrap();
        out.write_all(document.to_string().as_bytes()).unwrap();
        let content = generator.extract_mergeable_content(out.path()).unwrap();
        assert_eq!(content.files.len(), 1);

        let foreign = json!({"@context": ["https://schema.org/"], "@graph": []});
        let mut out = tempfile::NamedTempFile::new().unwrap();
        out.write_all(foreign.to_string().as_bytes()).unwrap();
        assert!(generator.extract_mergeable_content(out.path()).is_err());
    }

    #[test]
    fn test_root_package_uses_metadata_verification_code() {
        let generator = Spdx30Generator::default();
        let unverified = generator
            .generate_root_package(&metadata(), &GenerationData::default())
            .unwrap();
        assert!(unverified.document.get("verifiedUsing").is_none());

        let verified = DocumentMetadata {
            package_verification_code: Some("0123abcd".into()),
            ..metadata()
        };
        let result = generator
            .generate_root_package(&verified, &GenerationData::default())
            .unwrap();
        assert_eq!(result.document["verifiedUsing"][0]["hashValue"], "0123abcd");
    }
}
