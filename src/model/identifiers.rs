//! Content-addressed identifiers for manifest elements.
//!
//! Every identifier is a pure function of the element's content, so repeated
//! runs over unchanged inputs produce byte-identical ids on any machine, and
//! identical content from different artifacts collapses to the same id during
//! consolidation:
//!
//! | Element | Identifier |
//! |---|---|
//! | File | `SPDXRef-File-` + SHA-256(`{path}-{sha1}`) |
//! | External document | `DocumentRef-` + SHA-256(`{name}-{sha1}`) |
//! | Package | explicit id, else `SPDXRef-Package-` + SHA-256(`{name}-{version}-{supplier}-{purl}`) |
//!
//! SHA1 is the identity hash for files and external documents regardless of
//! which algorithms are configured for integrity.

use super::checksum::{find_checksum, AlgorithmName, Checksum};
use super::records::SbomPackage;
use crate::error::{Result, SbomError};
use crate::utils::hash::sha256_upper;
use std::fmt;

/// Fixed id of the document element.
pub const DOCUMENT_ID: &str = "SPDXRef-DOCUMENT";

/// Fixed id of the package describing the build itself.
pub const ROOT_PACKAGE_ID: &str = "SPDXRef-RootPackage";

/// Element kinds whose identifiers are derived from a SHA1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    File,
    ExternalDocumentReference,
}

impl EntityKind {
    #[must_use]
    pub const fn prefix(&self) -> &'static str {
        match self {
            Self::File => "SPDXRef-File-",
            Self::ExternalDocumentReference => "DocumentRef-",
        }
    }

    const fn label(&self) -> &'static str {
        match self {
            Self::File => "file",
            Self::ExternalDocumentReference => "external reference",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Derive the identifier of a SHA1-identified element.
///
/// Fails with [`SbomError::MissingHashValue`] when `checksums` has no
/// non-empty SHA1, whatever else it contains.
pub fn derive_id(kind: EntityKind, name: &str, checksums: &[Checksum]) -> Result<String> {
    let sha1 = find_checksum(checksums, AlgorithmName::Sha1)
        .ok_or_else(|| SbomError::missing_hash(kind.label(), name))?;
    Ok(format!("{}{}", kind.prefix(), sha256_upper(&format!("{name}-{sha1}"))))
}

/// Identifier of a file element.
pub fn file_id(path: &str, checksums: &[Checksum]) -> Result<String> {
    derive_id(EntityKind::File, path, checksums)
}

/// Identifier of an external document reference.
pub fn external_document_id(name: &str, checksums: &[Checksum]) -> Result<String> {
    derive_id(EntityKind::ExternalDocumentReference, name, checksums)
}

/// Identifier of a package element.
#[must_use]
pub fn package_id(package: &SbomPackage) -> String {
    if let Some(id) = package.id.as_deref().filter(|id| !id.trim().is_empty()) {
        return id.to_string();
    }
    let content = format!(
        "{}-{}-{}-{}",
        package.name,
        package.version.as_deref().unwrap_or_default(),
        package.supplier.as_deref().unwrap_or_default(),
        package.purl.as_deref().unwrap_or_default(),
    );
    format!("SPDXRef-Package-{}", sha256_upper(&content))
}
