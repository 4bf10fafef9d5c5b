//! Generation outputs and per-run accumulated state.

use super::checksum::{find_checksum, AlgorithmName, Checksum};
use crate::tolerant_enum;
use crate::utils::hash::digest_bytes;
use chrono::{DateTime, Utc};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

/// Identifier assigned to a generated element, plus its declared dependencies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultMetadata {
    pub entity_id: String,
    pub depends_on: Vec<String>,
}

/// One generator call's output.
///
/// The document is owned; handing it to the writer moves it, so it is
/// serialized at most once and dropped otherwise.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationResult {
    pub document: Value,
    pub metadata: ResultMetadata,
}

impl GenerationResult {
    pub fn new(document: Value, entity_id: impl Into<String>) -> Self {
        Self {
            document,
            metadata: ResultMetadata {
                entity_id: entity_id.into(),
                depends_on: Vec::new(),
            },
        }
    }

    #[must_use]
    pub fn with_dependencies(mut self, depends_on: Vec<String>) -> Self {
        self.metadata.depends_on = depends_on;
        self
    }

    #[must_use]
    pub fn entity_id(&self) -> &str {
        &self.metadata.entity_id
    }
}

tolerant_enum! {
    /// Extra conformance rules applied on top of the base format.
    pub enum ComplianceStandard {
        None = 0 => "None",
        Ntia = 1 => "NTIA",
    }
}

/// Document-level values handed to the root-package and creation-info
/// generators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentMetadata {
    pub package_name: String,
    pub package_version: String,
    pub package_supplier: String,
    pub document_namespace: String,
    pub created: DateTime<Utc>,
    pub tool_name: String,
    pub tool_version: String,
    pub conformance: ComplianceStandard,
    /// SPDX package verification code over every recorded file
    pub package_verification_code: Option<String>,
}

impl DocumentMetadata {
    #[must_use]
    pub fn document_name(&self) -> String {
        format!("{} {}", self.package_name, self.package_version)
    }

    #[must_use]
    pub fn creator_tool(&self) -> String {
        format!("Tool: {}-{}", self.tool_name, self.tool_version)
    }

    #[must_use]
    pub fn creator_organization(&self) -> String {
        format!("Organization: {}", self.package_supplier)
    }

    #[must_use]
    pub fn created_timestamp(&self) -> String {
        self.created.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }
}

/// Everything a run recorded, read once at assembly time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationData {
    pub file_ids: IndexSet<String>,
    pub spdx_file_ids: IndexSet<String>,
    /// `(package, dependency)`; `None` marks a package with no dependencies
    pub package_dependencies: Vec<(String, Option<String>)>,
    /// `(document reference id, described root element)`
    pub external_document_references: Vec<(String, String)>,
    pub file_checksums: Vec<Vec<Checksum>>,
    pub root_package_id: Option<String>,
    pub document_id: Option<String>,
}

impl GenerationData {
    /// Distinct recorded package ids, in first-seen order.
    #[must_use]
    pub fn package_ids(&self) -> IndexSet<&str> {
        self.package_dependencies
            .iter()
            .map(|(id, _)| id.as_str())
            .collect()
    }

    /// Distinct `(package, dependency)` edges.
    #[must_use]
    pub fn dependency_edges(&self) -> IndexSet<(&str, &str)> {
        self.package_dependencies
            .iter()
            .filter_map(|(id, dep)| dep.as_deref().map(|dep| (id.as_str(), dep)))
            .collect()
    }

    /// True if `id` names any recorded element.
    #[must_use]
    pub fn contains_id(&self, id: &str) -> bool {
        self.file_ids.contains(id)
            || self.spdx_file_ids.contains(id)
            || self.package_dependencies.iter().any(|(pkg, _)| pkg == id)
            || self.external_document_references.iter().any(|(r, _)| r == id)
            || self.root_package_id.as_deref() == Some(id)
            || self.document_id.as_deref() == Some(id)
    }

    /// Every recorded element id, for repeated membership checks.
    #[must_use]
    pub fn element_ids(&self) -> HashSet<&str> {
        let mut ids: HashSet<&str> = HashSet::with_capacity(
            self.file_ids.len() + self.spdx_file_ids.len() + self.package_dependencies.len() + 2,
        );
        ids.extend(self.file_ids.iter().map(String::as_str));
        ids.extend(self.spdx_file_ids.iter().map(String::as_str));
        ids.extend(self.package_dependencies.iter().map(|(pkg, _)| pkg.as_str()));
        ids.extend(self.external_document_references.iter().map(|(r, _)| r.as_str()));
        ids.extend(self.root_package_id.as_deref());
        ids.extend(self.document_id.as_deref());
        ids
    }

    /// SPDX package verification code: SHA1 over the sorted, concatenated
    /// SHA1 values of every recorded file.
    #[must_use]
    pub fn package_verification_code(&self) -> Option<String> {
        let mut sha1s: Vec<String> = self
            .file_checksums
            .iter()
            .filter_map(|checksums| find_checksum(checksums, AlgorithmName::Sha1))
            .map(str::to_lowercase)
            .collect();
        if sha1s.is_empty() {
            return None;
        }
        sha1s.sort();
        Some(digest_bytes(AlgorithmName::Sha1, sha1s.concat().as_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compliance_standard_tolerant() {
        let parsed: ComplianceStandard = serde_json::from_str("\"ntia\"").unwrap();
        assert_eq!(parsed, ComplianceStandard::Ntia);
        let fallback: ComplianceStandard = serde_json::from_str("\"FedRAMP\"").unwrap();
        assert_eq!(fallback, ComplianceStandard::None);
    }

    #[test]
    fn test_dependency_views() {
        let data = GenerationData {
            package_dependencies: vec![
                ("a".into(), Some("b".into())),
                ("a".into(), Some("b".into())),
                ("b".into(), None),
            ],
            ..GenerationData::default()
        };
        assert_eq!(data.package_ids().len(), 2);
        assert_eq!(data.dependency_edges().len(), 1);
        assert!(data.contains_id("b"));
        assert!(!data.contains_id("c"));
    }

    #[test]
    fn test_element_ids_match_contains_id() {
        let data = GenerationData {
            spdx_file_ids: IndexSet::from(["SPDXRef-File-1".to_string()]),
            package_dependencies: vec![("pkg".into(), Some("dep".into()))],
            external_document_references: vec![("DocumentRef-x".into(), "SPDXRef-Root".into())],
            root_package_id: Some("SPDXRef-RootPackage".into()),
            ..GenerationData::default()
        };
        let ids = data.element_ids();
        assert_eq!(ids.len(), 4);
        for id in ["SPDXRef-File-1", "pkg", "DocumentRef-x", "SPDXRef-RootPackage", "dep"] {
            assert_eq!(ids.contains(id), data.contains_id(id), "{id}");
        }
    }

    #[test]
    fn test_verification_code_is_order_independent() {
        let a = vec![Checksum::new(AlgorithmName::Sha1, "aa")];
        let b = vec![Checksum::new(AlgorithmName::Sha1, "bb")];
        let first = GenerationData {
            file_checksums: vec![a.clone(), b.clone()],
            ..GenerationData::default()
        };
        let second = GenerationData {
            file_checksums: vec![b, a],
            ..GenerationData::default()
        };
        assert_eq!(
            first.package_verification_code(),
            second.package_verification_code()
        );
        assert_eq!(GenerationData::default().package_verification_code(), None);
    }
}
