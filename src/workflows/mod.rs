//! End-to-end workflows.
//!
//! - [`SbomGenerationWorkflow`]: records in, manifests on disk.
//! - [`SbomConsolidationWorkflow`]: several artifacts' manifests in, one
//!   merged manifest out, delegating the writing to a [`GenerationWorkflow`].

mod consolidation;
mod generation;
mod sign;

pub use consolidation::{artifact_manifest_dir, SbomConsolidationWorkflow, MANIFEST_FOLDER};
pub use generation::{hash_directory, GenerationReport, SbomGenerationWorkflow};
pub use sign::{ChecksumSidecarValidator, SignValidator};

use crate::error::Result;
use crate::model::SbomInput;
use std::future::Future;

/// Turns a set of records into materialized manifests.
///
/// Returns `Ok(false)` when the run completed but should be reported as
/// failed, e.g. because per-item errors occurred.
pub trait GenerationWorkflow: Send + Sync {
    fn run(&self, input: SbomInput) -> impl Future<Output = Result<bool>> + Send;
}
