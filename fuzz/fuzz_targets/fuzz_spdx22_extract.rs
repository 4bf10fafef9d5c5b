#![no_main]
use libfuzzer_sys::fuzz_target;
use sbom_manifest::{ManifestGenerator, Spdx22Generator};
use std::io::Write;

/// Fuzz SPDX 2.2 manifest extraction from disk.
///
/// Input is also wrapped in a document envelope as the `files` array so the
/// per-file checks are reached rather than failing at the top level.
fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };
    let mut candidates = vec![s.to_string()];
    if s.len() < 10_000 {
        candidates.push(format!(
            r#"{{"spdxVersion":"SPDX-2.2","SPDXID":"SPDXRef-DOCUMENT","files":[{s}]}}"#
        ));
    }

    for content in candidates {
        let Ok(mut file) = tempfile::NamedTempFile::new() else {
            return;
        };
        if file.write_all(content.as_bytes()).is_err() {
            return;
        }
        let _ = Spdx22Generator.extract_mergeable_content(file.path());
    }
});
