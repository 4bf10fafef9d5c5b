#![no_main]
use libfuzzer_sys::fuzz_target;
use sbom_manifest::adapters::component_detection::{ComponentType, ProcessingResultCode};
use sbom_manifest::codec::{decode_str, TolerantEnum};

/// Tolerant decoding must accept any token and always yield a declared member.
fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let member: ComponentType = decode_str(s);
        assert!(ComponentType::MEMBERS.contains(&member));

        // Any well-formed JSON value decodes; only malformed JSON may fail.
        if serde_json::from_str::<serde_json::Value>(s).is_ok() {
            assert!(serde_json::from_str::<ProcessingResultCode>(s).is_ok());
        }
    }
});
