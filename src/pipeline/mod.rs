//! Generation pipeline: records in, manifest elements and per-item errors out.
//!
//! The [`GenerationPipeline`] fans each record out to every active
//! generator on a blocking producer task. Each target's [`Recorder`] collects
//! what was generated so that [`derive_relationships`] and the
//! [`DocumentAssembler`] can complete the document afterwards.

mod assembler;
mod generation;
mod recorder;
mod relationships;

pub use assembler::{manifest_path, write_manifest, DocumentAssembler};
pub use generation::{
    EntryError, ErrorType, GeneratedDocument, GenerationPipeline, PipelineOutput, SbomConfig,
};
pub use recorder::Recorder;
pub use relationships::{derive_relationships, validate_relationships};

/// Exit codes for CI/CD integration
pub mod exit_codes {
    /// The workflow ran and reported success
    pub const SUCCESS: i32 = 0;
    /// The workflow ran and reported failure (per-item errors, nothing to consolidate)
    pub const WORKFLOW_FAILED: i32 = 1;
    /// An error occurred
    pub const ERROR: i32 = 2;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_values() {
        assert_eq!(exit_codes::SUCCESS, 0);
        assert_eq!(exit_codes::WORKFLOW_FAILED, 1);
        assert_eq!(exit_codes::ERROR, 2);
    }
}
