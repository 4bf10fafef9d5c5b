#![no_main]
use libfuzzer_sys::fuzz_target;
use sbom_manifest::adapters::{ConversionOptions, ScanResult};

/// Fuzz scan result decoding and package conversion.
fuzz_target!(|data: &[u8]| {
    if let Ok(scan) = serde_json::from_slice::<ScanResult>(data) {
        let _ = scan.to_packages(ConversionOptions::default());
        let _ = scan.to_packages(ConversionOptions {
            include_development_dependencies: true,
        });
    }
});
