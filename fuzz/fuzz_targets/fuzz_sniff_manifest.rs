#![no_main]
use libfuzzer_sys::fuzz_target;
use sbom_manifest::generators::sniff_manifest_info;

/// Fuzz manifest format detection on arbitrary text.
fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let _ = sniff_manifest_info(s);
    }
});
