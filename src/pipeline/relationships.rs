//! Structural relationships derived from what a run recorded.

use super::generation::{EntryError, ErrorType};
use crate::model::{GenerationData, Relationship, RelationshipType, DOCUMENT_ID, ROOT_PACKAGE_ID};
use indexmap::{IndexMap, IndexSet};

/// Edges implied by the recorded elements.
///
/// * the document `DESCRIBES` the root package
/// * the root package `CONTAINS` every file
/// * every recorded package `DEPENDS_ON` its recorded dependencies
/// * the root package `DEPENDS_ON` every package no other package depends on
/// * the root package `DEPENDS_ON` the root element of each external document
#[must_use]
pub fn derive_relationships(data: &GenerationData) -> Vec<Relationship> {
    let document = data.document_id.as_deref().unwrap_or(DOCUMENT_ID);
    let root = data.root_package_id.as_deref().unwrap_or(ROOT_PACKAGE_ID);

    let mut relationships = vec![Relationship::new(
        document,
        RelationshipType::Describes,
        root,
    )];

    relationships.extend(
        data.spdx_file_ids
            .iter()
            .map(|file| Relationship::new(root, RelationshipType::Contains, file.as_str())),
    );

    let edges = data.dependency_edges();
    relationships.extend(
        edges
            .iter()
            .map(|(package, dependency)| {
                Relationship::new(*package, RelationshipType::DependsOn, *dependency)
            }),
    );

    let depended_on: IndexSet<&str> = edges.iter().map(|(_, dependency)| *dependency).collect();
    relationships.extend(
        data.package_ids()
            .into_iter()
            .filter(|package| !depended_on.contains(package))
            .map(|package| Relationship::new(root, RelationshipType::DependsOn, package)),
    );

    relationships.extend(data.external_document_references.iter().map(
        |(document_ref, root_element)| {
            Relationship::to_external(
                root,
                RelationshipType::DependsOn,
                document_ref.as_str(),
                root_element.as_str(),
            )
        },
    ));

    relationships
}

/// Split relationships into those whose endpoints were recorded and one
/// [`ErrorType::DanglingRelationship`] entry per rejected edge.
///
/// External targets are checked by their document reference only; the
/// element inside the other document is not known here.
#[must_use]
pub fn validate_relationships(
    relationships: Vec<Relationship>,
    data: &GenerationData,
) -> (Vec<Relationship>, Vec<EntryError>) {
    let mut valid: IndexMap<String, Relationship> = IndexMap::with_capacity(relationships.len());
    let mut errors = Vec::new();
    let known = data.element_ids();

    for relationship in relationships {
        let target_known = match &relationship.target_external_reference_id {
            Some(document_ref) => known.contains(document_ref.as_str()),
            None => known.contains(relationship.target_element_id.as_str()),
        };
        let missing = if !known.contains(relationship.source_element_id.as_str()) {
            Some(relationship.source_element_id.clone())
        } else if !target_known {
            Some(relationship.target_reference())
        } else {
            None
        };

        match missing {
            Some(id) => {
                tracing::warn!(relationship = %relationship, missing = %id, "dangling relationship");
                errors.push(EntryError::new(
                    ErrorType::DanglingRelationship,
                    relationship.to_string(),
                    format!("endpoint '{id}' was not generated in this run"),
                ));
            }
            None => {
                valid.entry(relationship.entity_id()).or_insert(relationship);
            }
        }
    }

    (valid.into_values().collect(), errors)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorded() -> GenerationData {
        GenerationData {
            spdx_file_ids: ["SPDXRef-File-A".to_string()].into_iter().collect(),
            package_dependencies: vec![
                ("pkg-a".into(), Some("pkg-b".into())),
                ("pkg-b".into(), None),
                ("pkg-c".into(), None),
            ],
            external_document_references: vec![("DocumentRef-x".into(), "SPDXRef-Root".into())],
            root_package_id: Some(ROOT_PACKAGE_ID.into()),
            document_id: Some(DOCUMENT_ID.into()),
            ..GenerationData::default()
        }
    }

    #[test]
    fn test_derived_edges() {
        let derived: Vec<String> = derive_relationships(&recorded())
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(
            derived,
            vec![
                "SPDXRef-DOCUMENT DESCRIBES SPDXRef-RootPackage",
                "SPDXRef-RootPackage CONTAINS SPDXRef-File-A",
                "pkg-a DEPENDS_ON pkg-b",
                "SPDXRef-RootPackage DEPENDS_ON pkg-a",
                "SPDXRef-RootPackage DEPENDS_ON pkg-c",
                "SPDXRef-RootPackage DEPENDS_ON DocumentRef-x:SPDXRef-Root",
            ]
        );
    }

    #[test]
    fn test_derived_edges_all_validate() {
        let data = recorded();
        let (valid, errors) = validate_relationships(derive_relationships(&data), &data);
        assert_eq!(valid.len(), 6);
        assert!(errors.is_empty());
    }

    #[test]
    fn test_dangling_endpoint_rejected() {
        let data = recorded();
        let (valid, errors) = validate_relationships(
            vec![
                Relationship::new("pkg-a", RelationshipType::DependsOn, "pkg-z"),
                Relationship::new("pkg-a", RelationshipType::DependsOn, "pkg-c"),
                Relationship::new("pkg-a", RelationshipType::DependsOn, "pkg-c"),
            ],
            &data,
        );
        assert_eq!(valid.len(), 1);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].error_type, ErrorType::DanglingRelationship);
        assert!(errors[0].message.contains("pkg-z"));
    }
}
