//! Manifest signature validation seam.

use crate::model::AlgorithmName;
use indexmap::IndexMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Checks a completed manifest before it is trusted for consolidation.
///
/// Platform-specific verifiers live outside this crate; they report
/// pass/fail and may add diagnostic properties to `telemetry`.
pub trait SignValidator: Send + Sync {
    fn validate(&self, manifest_path: &Path, telemetry: &mut IndexMap<String, String>) -> bool;
}

/// Verifies the `<manifest>.sha256` sidecar written next to every manifest.
///
/// A missing sidecar or a digest mismatch fails validation.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChecksumSidecarValidator;

impl SignValidator for ChecksumSidecarValidator {
    fn validate(&self, manifest_path: &Path, telemetry: &mut IndexMap<String, String>) -> bool {
        let mut sidecar = manifest_path.as_os_str().to_owned();
        sidecar.push(".sha256");
        let sidecar = PathBuf::from(sidecar);

        let expected = match std::fs::read_to_string(&sidecar) {
            Ok(expected) => expected.trim().to_lowercase(),
            Err(e) => {
                telemetry.insert("sidecar".into(), format!("unreadable: {e}"));
                return false;
            }
        };
        let actual = match File::open(manifest_path)
            .map_err(crate::error::SbomError::from)
            .and_then(|file| AlgorithmName::Sha256.compute(BufReader::new(file)))
        {
            Ok(actual) => actual,
            Err(e) => {
                telemetry.insert("manifest".into(), format!("unreadable: {e}"));
                return false;
            }
        };

        telemetry.insert("algorithm".into(), AlgorithmName::Sha256.to_string());
        let valid = expected == actual;
        if !valid {
            telemetry.insert("expected".into(), expected);
            telemetry.insert("actual".into(), actual);
        }
        valid
    }
}
