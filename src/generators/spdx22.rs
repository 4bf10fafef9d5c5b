//! SPDX 2.2 JSON generator.

use super::license::{
    copyright_or_noassertion, license_from_document, license_or_noassertion, NOASSERTION,
};
use super::traits::ManifestGenerator;
use crate::error::{ErrorContext, Result, SbomError};
use crate::model::{
    external_document_id, file_id, find_checksum, package_id, AlgorithmName, Checksum,
    DocumentMetadata, ExternalDocumentReferenceInfo, Extracted, FileRecord, GenerationData,
    GenerationResult, ManifestInfo, MergeableContent, Relationship, RelationshipType,
    SbomPackage, Section, DOCUMENT_ID, ROOT_PACKAGE_ID,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::path::Path;

const SPDX_VERSION: &str = "SPDX-2.2";
const DATA_LICENSE: &str = "CC0-1.0";
const REQUIRED_HASHES: &[AlgorithmName] = &[AlgorithmName::Sha1, AlgorithmName::Sha256];

/// Generator for `SPDX:2.2`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Spdx22Generator;

impl Spdx22Generator {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl ManifestGenerator for Spdx22Generator {
    fn register_manifest(&self) -> ManifestInfo {
        ManifestInfo::spdx22()
    }

    fn required_hash_algorithms(&self) -> &'static [AlgorithmName] {
        REQUIRED_HASHES
    }

    fn generate_file(&self, file: &FileRecord) -> Result<GenerationResult> {
        let id = file_id(&file.path, &file.checksums)?;
        let element = SpdxFile {
            file_name: file.path.clone(),
            spdx_id: id.clone(),
            checksums: file
                .checksums
                .iter()
                .filter(|c| REQUIRED_HASHES.contains(&c.algorithm))
                .map(SpdxChecksum::from)
                .collect(),
            license_concluded: Some(license_or_noassertion(file.license_concluded.as_deref())),
            license_info_in_files: if file.license_info_in_files.is_empty() {
                vec![NOASSERTION.to_string()]
            } else {
                file.license_info_in_files
                    .iter()
                    .map(|l| license_or_noassertion(Some(l)))
                    .collect()
            },
            copyright_text: Some(copyright_or_noassertion(file.copyright_text.as_deref())),
        };
        Ok(GenerationResult::new(to_value(&element, &file.path)?, id))
    }

    fn generate_package(&self, package: &SbomPackage) -> Result<GenerationResult> {
        let id = package_id(package);
        let element = SpdxPackage {
            name: package.name.clone(),
            spdx_id: id.clone(),
            version_info: package.version.clone(),
            download_location: NOASSERTION.to_string(),
            files_analyzed: false,
            license_concluded: Some(license_or_noassertion(
                package.license_concluded.as_deref(),
            )),
            license_declared: Some(license_or_noassertion(package.license_declared.as_deref())),
            copyright_text: Some(copyright_or_noassertion(package.copyright_text.as_deref())),
            supplier: Some(supplier_field(package.supplier.as_deref())),
            checksums: package.checksums.iter().map(SpdxChecksum::from).collect(),
            external_refs: package
                .purl
                .iter()
                .map(|purl| SpdxExternalRef {
                    reference_category: "PACKAGE-MANAGER".to_string(),
                    reference_type: "purl".to_string(),
                    reference_locator: purl.clone(),
                })
                .collect(),
            package_verification_code: None,
        };
        Ok(GenerationResult::new(to_value(&element, &package.name)?, id)
            .with_dependencies(package.depends_on.clone()))
    }

    fn generate_relationship(&self, relationship: &Relationship) -> Result<GenerationResult> {
        let element = SpdxRelationship {
            spdx_element_id: relationship.source_element_id.clone(),
            relationship_type: relationship.relationship_type,
            related_spdx_element: relationship.target_reference(),
        };
        Ok(GenerationResult::new(
            to_value(&element, &relationship.to_string())?,
            relationship.entity_id(),
        ))
    }

    fn generate_external_document_reference(
        &self,
        reference: &ExternalDocumentReferenceInfo,
    ) -> Result<GenerationResult> {
        let id = external_document_id(&reference.external_document_name, &reference.checksums)?;
        let sha1 = find_checksum(&reference.checksums, AlgorithmName::Sha1)
            .map(|value| SpdxChecksum::from(&Checksum::new(AlgorithmName::Sha1, value)))
            .ok_or_else(|| {
                SbomError::missing_hash("external reference", &reference.external_document_name)
            })?;
        let element = SpdxExternalDocumentRef {
            external_document_id: id.clone(),
            spdx_document: reference.document_namespace.clone(),
            checksum: sha1,
        };
        Ok(GenerationResult::new(
            to_value(&element, &reference.external_document_name)?,
            id,
        ))
    }

    fn generate_root_package(
        &self,
        metadata: &DocumentMetadata,
        _data: &GenerationData,
    ) -> Result<GenerationResult> {
        let verification_code = metadata.package_verification_code.clone();
        let element = SpdxPackage {
            name: metadata.package_name.clone(),
            spdx_id: ROOT_PACKAGE_ID.to_string(),
            version_info: Some(metadata.package_version.clone()),
            download_location: NOASSERTION.to_string(),
            files_analyzed: verification_code.is_some(),
            license_concluded: Some(NOASSERTION.to_string()),
            license_declared: Some(NOASSERTION.to_string()),
            copyright_text: Some(NOASSERTION.to_string()),
            supplier: Some(supplier_field(Some(&metadata.package_supplier))),
            checksums: Vec::new(),
            external_refs: Vec::new(),
            package_verification_code: verification_code.map(|value| SpdxVerificationCode {
                package_verification_code_value: value,
            }),
        };
        Ok(GenerationResult::new(
            to_value(&element, &metadata.package_name)?,
            ROOT_PACKAGE_ID,
        ))
    }

    fn header_name(&self, section: Section) -> Result<&'static str> {
        Ok(match section {
            Section::Files => "files",
            Section::Packages => "packages",
            Section::Relationships => "relationships",
            Section::ExternalDocumentReferences => "externalDocumentRefs",
        })
    }

    fn metadata_dictionary(
        &self,
        metadata: &DocumentMetadata,
        _data: &GenerationData,
    ) -> Result<Map<String, Value>> {
        let mut header = Map::new();
        header.insert("spdxVersion".into(), json!(SPDX_VERSION));
        header.insert("dataLicense".into(), json!(DATA_LICENSE));
        header.insert("SPDXID".into(), json!(DOCUMENT_ID));
        header.insert("name".into(), json!(metadata.document_name()));
        header.insert(
            "documentNamespace".into(),
            json!(metadata.document_namespace),
        );
        header.insert(
            "creationInfo".into(),
            json!({
                "created": metadata.created_timestamp(),
                "creators": [metadata.creator_organization(), metadata.creator_tool()],
            }),
        );
        header.insert("documentDescribes".into(), json!([ROOT_PACKAGE_ID]));
        Ok(header)
    }

    fn extract_mergeable_content(&self, manifest_path: &Path) -> Result<MergeableContent> {
        let content = std::fs::read_to_string(manifest_path)
            .map_err(|e| SbomError::io(manifest_path, e))?;
        let document: SpdxDocumentIn = serde_json::from_str(&content)
            .with_context(|| format!("parsing {}", manifest_path.display()))?;
        if !document.spdx_version.starts_with("SPDX-2.") {
            return Err(SbomError::validation(format!(
                "{} declares {}, expected SPDX 2.x",
                manifest_path.display(),
                document.spdx_version
            )));
        }

        let mut mergeable = MergeableContent::new(self.register_manifest(), document.spdx_id);
        for file in document.files {
            let original_id = file.spdx_id.clone();
            let record = file.into_record();
            if find_checksum(&record.checksums, AlgorithmName::Sha1).is_none() {
                return Err(SbomError::missing_hash("file", record.path));
            }
            mergeable.files.push(Extracted::new(original_id, record));
        }
        for package in document.packages {
            let original_id = package.spdx_id.clone();
            mergeable
                .packages
                .push(Extracted::new(original_id, package.into_record()));
        }
        mergeable.relationships = document
            .relationships
            .into_iter()
            .map(SpdxRelationship::into_record)
            .collect();
        Ok(mergeable)
    }
}

fn to_value<T: Serialize>(element: &T, key: &str) -> Result<Value> {
    serde_json::to_value(element).map_err(|e| SbomError::json(format!("serializing {key}"), e))
}

fn supplier_field(supplier: Option<&str>) -> String {
    match supplier.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) if s.starts_with("Organization:") || s.starts_with("Person:") => s.to_string(),
        Some(s) => format!("Organization: {s}"),
        None => NOASSERTION.to_string(),
    }
}

fn supplier_from_field(field: Option<&str>) -> Option<String> {
    let field = field?.trim();
    if field.is_empty() || field == NOASSERTION {
        return None;
    }
    let name = field
        .strip_prefix("Organization:")
        .or_else(|| field.strip_prefix("Person:"))
        .unwrap_or(field);
    Some(name.trim().to_string())
}

// SPDX 2.2 JSON structures

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SpdxChecksum {
    algorithm: String,
    checksum_value: String,
}

impl From<&Checksum> for SpdxChecksum {
    fn from(checksum: &Checksum) -> Self {
        Self {
            algorithm: checksum.algorithm.to_string(),
            checksum_value: checksum.value.clone(),
        }
    }
}

impl SpdxChecksum {
    fn to_checksum(&self) -> Option<Checksum> {
        let algorithm = self.algorithm.parse::<AlgorithmName>().ok()?;
        Some(Checksum::new(algorithm, self.checksum_value.clone()))
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SpdxFile {
    file_name: String,
    #[serde(rename = "SPDXID")]
    spdx_id: String,
    #[serde(default)]
    checksums: Vec<SpdxChecksum>,
    #[serde(default)]
    license_concluded: Option<String>,
    #[serde(default)]
    license_info_in_files: Vec<String>,
    #[serde(default)]
    copyright_text: Option<String>,
}

impl SpdxFile {
    fn into_record(self) -> FileRecord {
        FileRecord {
            path: self.file_name,
            checksums: self
                .checksums
                .iter()
                .filter_map(SpdxChecksum::to_checksum)
                .collect(),
            license_concluded: license_from_document(self.license_concluded.as_deref()),
            license_info_in_files: self
                .license_info_in_files
                .iter()
                .filter_map(|l| license_from_document(Some(l)))
                .collect(),
            copyright_text: license_from_document(self.copyright_text.as_deref()),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SpdxPackage {
    name: String,
    #[serde(rename = "SPDXID")]
    spdx_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    version_info: Option<String>,
    #[serde(default)]
    download_location: String,
    #[serde(default)]
    files_analyzed: bool,
    #[serde(default)]
    license_concluded: Option<String>,
    #[serde(default)]
    license_declared: Option<String>,
    #[serde(default)]
    copyright_text: Option<String>,
    #[serde(default)]
    supplier: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    checksums: Vec<SpdxChecksum>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    external_refs: Vec<SpdxExternalRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    package_verification_code: Option<SpdxVerificationCode>,
}

impl SpdxPackage {
    fn into_record(self) -> SbomPackage {
        let purl = self
            .external_refs
            .iter()
            .find(|r| r.reference_type == "purl")
            .map(|r| r.reference_locator.clone());
        SbomPackage {
            id: None,
            name: self.name,
            version: self.version_info,
            supplier: supplier_from_field(self.supplier.as_deref()),
            purl,
            license_concluded: license_from_document(self.license_concluded.as_deref()),
            license_declared: license_from_document(self.license_declared.as_deref()),
            copyright_text: license_from_document(self.copyright_text.as_deref()),
            checksums: self
                .checksums
                .iter()
                .filter_map(SpdxChecksum::to_checksum)
                .collect(),
            depends_on: Vec::new(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SpdxVerificationCode {
    package_verification_code_value: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SpdxExternalRef {
    reference_category: String,
    reference_type: String,
    reference_locator: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SpdxRelationship {
    spdx_element_id: String,
    relationship_type: RelationshipType,
    related_spdx_element: String,
}

impl SpdxRelationship {
    fn into_record(self) -> Relationship {
        match self.related_spdx_element.split_once(':') {
            Some((document, element)) if document.starts_with("DocumentRef-") => {
                Relationship::to_external(
                    self.spdx_element_id,
                    self.relationship_type,
                    document,
                    element,
                )
            }
            _ => Relationship::new(
                self.spdx_element_id,
                self.relationship_type,
                self.related_spdx_element,
            ),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SpdxExternalDocumentRef {
    external_document_id: String,
    spdx_document: String,
    checksum: SpdxChecksum,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SpdxDocumentIn {
    spdx_version: String,
    #[serde(rename = "SPDXID")]
    spdx_id: String,
    #[serde(default)]
    files: Vec<SpdxFile>,
    #[serde(default)]
    packages: Vec<SpdxPackage>,
    #[serde(default)]
    relationships: Vec<SpdxRelationship>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn file_record(path: &str) -> FileRecord {
        FileRecord::new(
            path,
            vec![
                Checksum::new(AlgorithmName::Sha1, "da39a3ee5e6b4b0d3255bfef95601890afd80709"),
                Checksum::new(AlgorithmName::Sha256, "e3b0c44298fc1c149afbf4c8996fb924"),
                Checksum::new(AlgorithmName::Md5, "d41d8cd98f00b204e9800998ecf8427e"),
            ],
        )
    }

    #[test]
    fn test_generate_file_keeps_required_hashes_only() {
        let result = Spdx22Generator.generate_file(&file_record("./a.dll")).unwrap();
        assert!(result.entity_id().starts_with("SPDXRef-File-"));
        assert_eq!(result.document["fileName"], "./a.dll");
        assert_eq!(result.document["checksums"].as_array().unwrap().len(), 2);
        assert_eq!(result.document["licenseConcluded"], NOASSERTION);
    }

    #[test]
    fn test_generate_file_without_sha1_fails() {
        let file = FileRecord::new("./a.dll", vec![Checksum::new(AlgorithmName::Sha256, "ff")]);
        assert!(matches!(
            Spdx22Generator.generate_file(&file),
            Err(SbomError::MissingHashValue { .. })
        ));
    }

    #[test]
    fn test_generate_package_with_purl_and_dependencies() {
        let package = SbomPackage::new("serde", "1.0.200")
            .with_supplier("dtolnay")
            .with_purl("pkg:cargo/serde@1.0.200")
            .depending_on("SPDXRef-Package-dep");
        let result = Spdx22Generator.generate_package(&package).unwrap();

        assert_eq!(result.metadata.depends_on, vec!["SPDXRef-Package-dep"]);
        assert_eq!(result.document["supplier"], "Organization: dtolnay");
        let external = &result.document["externalRefs"][0];
        assert_eq!(external["referenceCategory"], "PACKAGE-MANAGER");
        assert_eq!(external["referenceType"], "purl");
    }

    #[test]
    fn test_relationship_to_external_document() {
        let relationship = Relationship::to_external(
            ROOT_PACKAGE_ID,
            RelationshipType::DependsOn,
            "DocumentRef-x",
            "SPDXRef-RootPackage",
        );
        let result = Spdx22Generator.generate_relationship(&relationship).unwrap();
        assert_eq!(result.document["relationshipType"], "DEPENDS_ON");
        assert_eq!(
            result.document["relatedSpdxElement"],
            "DocumentRef-x:SPDXRef-RootPackage"
        );
    }

    #[test]
    fn test_every_section_supported_but_creation_info() {
        for section in [
            Section::Files,
            Section::Packages,
            Section::Relationships,
            Section::ExternalDocumentReferences,
        ] {
            assert!(Spdx22Generator.supports(section));
        }
        assert!(matches!(
            Spdx22Generator.creation_info_header_name(),
            Err(SbomError::NotSupported { .. })
        ));
    }

    #[test]
    fn test_extract_mergeable_content() {
        let document = json!({
            "spdxVersion": "SPDX-2.2",
            "SPDXID": "SPDXRef-DOCUMENT",
            "files": [{
                "fileName": "./a.dll",
                "SPDXID": "SPDXRef-File-1",
                "checksums": [{"algorithm": "SHA1", "checksumValue": "abc"}],
                "licenseConcluded": "NOASSERTION"
            }],
            "packages": [{
                "name": "serde",
                "SPDXID": "SPDXRef-Package-1",
                "versionInfo": "1.0",
                "supplier": "Organization: dtolnay",
                "externalRefs": [{
                    "referenceCategory": "PACKAGE-MANAGER",
                    "referenceType": "purl",
                    "referenceLocator": "pkg:cargo/serde@1.0"
                }]
            }],
            "relationships": [{
                "spdxElementId": "SPDXRef-DOCUMENT",
                "relationshipType": "DESCRIBES",
                "relatedSpdxElement": "SPDXRef-RootPackage"
            }]
        });
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(document.to_string().as_bytes()).unwrap();

        let content = Spdx22Generator.extract_mergeable_content(file.path()).unwrap();
        assert_eq!(content.document_id, DOCUMENT_ID);
        assert_eq!(content.files[0].original_id, "SPDXRef-File-1");
        assert_eq!(content.files[0].record.license_concluded, None);
        let package = &content.packages[0].record;
        assert_eq!(package.supplier.as_deref(), Some("dtolnay"));
        assert_eq!(package.purl.as_deref(), Some("pkg:cargo/serde@1.0"));
        assert_eq!(content.relationships.len(), 1);
    }

    #[test]
    fn test_extract_rejects_file_without_sha1() {
        let document = json!({
            "spdxVersion": "SPDX-2.2",
            "SPDXID": "SPDXRef-DOCUMENT",
            "files": [{"fileName": "./a.dll", "SPDXID": "SPDXRef-File-1", "checksums": []}]
        });
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(document.to_string().as_bytes()).unwrap();

        assert!(Spdx22Generator.extract_mergeable_content(file.path()).is_err());
    }
}
