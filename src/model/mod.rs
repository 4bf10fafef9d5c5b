//! Domain model shared by generation and consolidation.
//!
//! Records ([`FileRecord`], [`SbomPackage`], [`Relationship`],
//! [`ExternalDocumentReferenceInfo`]) are immutable inputs to a generation
//! run. [`GenerationResult`] and [`GenerationData`] live for one run only.
//! [`MergeableContent`] is built fresh per consolidation run from manifests
//! on disk.

mod checksum;
mod generation;
mod identifiers;
mod manifest_info;
mod mergeable;
mod records;

pub use checksum::*;
pub use generation::*;
pub use identifiers::*;
pub use manifest_info::*;
pub use mergeable::*;
pub use records::*;
