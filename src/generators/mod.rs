//! Manifest format generators.
//!
//! One [`ManifestGenerator`] per supported format and version, looked up
//! through the [`GeneratorRegistry`] by [`ManifestInfo`](crate::model::ManifestInfo).
//!
//! | Format | Generator | Sections |
//! |---|---|---|
//! | `SPDX:2.2` | [`Spdx22Generator`] | files, packages, relationships, externalDocumentRefs |
//! | `SPDX:3.0` | [`Spdx30Generator`] | `@graph` (no external document references) |

mod detection;
pub mod license;
mod registry;
mod spdx22;
mod spdx30;
mod traits;

pub use detection::{sniff_manifest_info, DetectedManifest, FileSystemDetector, ManifestDetector};
pub use registry::GeneratorRegistry;
pub use spdx22::Spdx22Generator;
pub use spdx30::{Spdx30Generator, SPDX3_CONTEXT};
pub use traits::ManifestGenerator;
