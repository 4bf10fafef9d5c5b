//! Format-independent manifest content used by consolidation.

use super::identifiers::{file_id, package_id};
use super::manifest_info::ManifestInfo;
use super::records::{FileRecord, Relationship, RelationshipType, SbomInput, SbomPackage};
use crate::error::Result;
use indexmap::{IndexMap, IndexSet};
use std::collections::HashMap;

/// A record as found in a manifest, with the id it carried there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extracted<T> {
    pub original_id: String,
    pub record: T,
}

impl<T> Extracted<T> {
    pub fn new(original_id: impl Into<String>, record: T) -> Self {
        Self {
            original_id: original_id.into(),
            record,
        }
    }
}

/// Everything consolidation needs from one manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeableContent {
    pub source: ManifestInfo,
    pub document_id: String,
    pub files: Vec<Extracted<FileRecord>>,
    pub packages: Vec<Extracted<SbomPackage>>,
    pub relationships: Vec<Relationship>,
}

impl MergeableContent {
    pub fn new(source: ManifestInfo, document_id: impl Into<String>) -> Self {
        Self {
            source,
            document_id: document_id.into(),
            files: Vec::new(),
            packages: Vec::new(),
            relationships: Vec::new(),
        }
    }
}

/// The union of several manifests' content, keyed by re-derived id.
#[derive(Debug, Clone, Default)]
pub struct MergedRecords {
    files: IndexMap<String, FileRecord>,
    packages: IndexMap<String, SbomPackage>,
    relationships: IndexMap<String, Relationship>,
    dropped_relationships: usize,
}

struct Staged {
    files: Vec<(String, FileRecord)>,
    packages: Vec<(String, SbomPackage)>,
    id_map: HashMap<String, String>,
}

impl MergedRecords {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one manifest's content.
    ///
    /// Ids are re-derived from content so the same file or package coming
    /// from several artifacts collapses to one element. Relationships are
    /// remapped through the old-to-new id map; document `DESCRIBES` edges,
    /// edges into external documents and edges with an unknown endpoint are
    /// dropped. Either all of `content` is merged or, on error, none of it.
    pub fn absorb(&mut self, content: MergeableContent) -> Result<()> {
        let staged = Self::stage(&content)?;
        let Staged {
            files,
            packages,
            id_map,
        } = staged;

        for (id, file) in files {
            self.files.entry(id).or_insert(file);
        }
        let mut local_packages = IndexSet::new();
        for (id, package) in packages {
            local_packages.insert(id.clone());
            self.packages.entry(id).or_insert(package);
        }

        for relationship in content.relationships {
            if relationship.relationship_type == RelationshipType::Describes
                && relationship.source_element_id == content.document_id
            {
                continue;
            }
            if relationship.target_external_reference_id.is_some() {
                self.dropped_relationships += 1;
                continue;
            }
            let (Some(source), Some(target)) = (
                id_map.get(&relationship.source_element_id),
                id_map.get(&relationship.target_element_id),
            ) else {
                self.dropped_relationships += 1;
                continue;
            };

            if relationship.relationship_type == RelationshipType::DependsOn
                && local_packages.contains(source)
                && local_packages.contains(target)
            {
                if let Some(package) = self.packages.get_mut(source) {
                    if !package.depends_on.contains(target) {
                        package.depends_on.push(target.clone());
                    }
                }
                continue;
            }

            let remapped = Relationship::new(
                source.clone(),
                relationship.relationship_type,
                target.clone(),
            );
            self.relationships
                .entry(remapped.entity_id())
                .or_insert(remapped);
        }
        Ok(())
    }

    fn stage(content: &MergeableContent) -> Result<Staged> {
        let mut id_map = HashMap::new();
        let mut files = Vec::with_capacity(content.files.len());
        for extracted in &content.files {
            let id = file_id(&extracted.record.path, &extracted.record.checksums)?;
            id_map.insert(extracted.original_id.clone(), id.clone());
            files.push((id, extracted.record.clone()));
        }

        let mut packages = Vec::with_capacity(content.packages.len());
        for extracted in &content.packages {
            let mut package = extracted.record.clone();
            package.id = None;
            package.depends_on.clear();
            let id = package_id(&package);
            package.id = Some(id.clone());
            id_map.insert(extracted.original_id.clone(), id.clone());
            packages.push((id, package));
        }

        Ok(Staged {
            files,
            packages,
            id_map,
        })
    }

    #[must_use]
    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    #[must_use]
    pub fn package_count(&self) -> usize {
        self.packages.len()
    }

    #[must_use]
    pub fn relationship_count(&self) -> usize {
        self.relationships.len()
    }

    /// Relationships discarded because an endpoint could not be mapped.
    #[must_use]
    pub const fn dropped_relationships(&self) -> usize {
        self.dropped_relationships
    }

    /// Records ready to feed a generation run.
    #[must_use]
    pub fn into_input(self) -> SbomInput {
        SbomInput {
            files: self.files.into_values().collect(),
            packages: self.packages.into_values().collect(),
            relationships: self.relationships.into_values().collect(),
            external_document_references: Vec::new(),
        }
    }
}
