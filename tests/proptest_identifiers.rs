//! Property-based tests for identifier derivation and tolerant decoding.
//!
//! Identifiers must be pure functions of their content; tolerant decoding must
//! accept any JSON scalar without failing.

use proptest::prelude::*;
use sbom_manifest::adapters::component_detection::{ComponentType, DependencyScope};
use sbom_manifest::codec::{decode_int, decode_str, TolerantEnum};
use sbom_manifest::model::{external_document_id, file_id, package_id};
use sbom_manifest::{AlgorithmName, Checksum, SbomError, SbomPackage};

fn sha1_strategy() -> impl Strategy<Value = String> {
    "[0-9a-f]{40}"
}

fn path_strategy() -> impl Strategy<Value = String> {
    "\\./[a-zA-Z0-9_/\\.-]{1,60}"
}

fn hex_suffix(id: &str, prefix: &str) -> bool {
    id.strip_prefix(prefix).is_some_and(|rest| {
        rest.len() == 64 && rest.chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase())
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn file_id_is_deterministic(path in path_strategy(), sha1 in sha1_strategy()) {
        let checksums = vec![Checksum::new(AlgorithmName::Sha1, sha1.clone())];
        let first = file_id(&path, &checksums).unwrap();
        let again = file_id(&path, &[
            Checksum::new(AlgorithmName::Sha256, "ignored"),
            Checksum::new(AlgorithmName::Sha1, sha1),
        ]).unwrap();
        prop_assert_eq!(&first, &again);
        prop_assert!(hex_suffix(&first, "SPDXRef-File-"));
    }

    #[test]
    fn external_document_id_is_deterministic(name in "[a-zA-Z0-9 _-]{1,40}", sha1 in sha1_strategy()) {
        let checksums = vec![Checksum::new(AlgorithmName::Sha1, sha1)];
        let first = external_document_id(&name, &checksums).unwrap();
        prop_assert_eq!(&first, &external_document_id(&name, &checksums).unwrap());
        prop_assert!(hex_suffix(&first, "DocumentRef-"));
    }

    #[test]
    fn different_paths_give_different_ids(
        a in path_strategy(),
        b in path_strategy(),
        sha1 in sha1_strategy(),
    ) {
        prop_assume!(a != b);
        let checksums = vec![Checksum::new(AlgorithmName::Sha1, sha1)];
        prop_assert_ne!(file_id(&a, &checksums).unwrap(), file_id(&b, &checksums).unwrap());
    }

    #[test]
    fn missing_sha1_always_fails(path in path_strategy(), sha256 in "[0-9a-f]{64}") {
        let checksums = vec![
            Checksum::new(AlgorithmName::Sha256, sha256),
            Checksum::new(AlgorithmName::Sha1, ""),
        ];
        let is_missing_hash = matches!(
            file_id(&path, &checksums),
            Err(SbomError::MissingHashValue { .. })
        );
        prop_assert!(is_missing_hash);
    }

    #[test]
    fn package_id_is_deterministic(
        name in "[a-z][a-z0-9-]{0,20}",
        version in "[0-9]{1,3}\\.[0-9]{1,3}",
        supplier in "[A-Za-z ]{0,20}",
    ) {
        let package = SbomPackage::new(name, version).with_supplier(supplier);
        let first = package_id(&package);
        prop_assert_eq!(&first, &package_id(&package.clone()));
        prop_assert!(hex_suffix(&first, "SPDXRef-Package-"));
        prop_assert_eq!(package_id(&package.with_id("SPDXRef-Explicit")), "SPDXRef-Explicit");
    }

    #[test]
    fn decode_str_never_panics_and_is_stable(token in "\\PC{0,24}") {
        let first: ComponentType = decode_str(&token);
        let second: ComponentType = decode_str(&token);
        prop_assert_eq!(first, second);
        prop_assert!(ComponentType::MEMBERS.contains(&first));
    }

    #[test]
    fn decode_int_maps_unknown_values_to_fallback(value in any::<i64>()) {
        let scope: DependencyScope = decode_int(value);
        match DependencyScope::from_value(value) {
            Some(member) => prop_assert_eq!(scope, member),
            None => prop_assert_eq!(scope, DependencyScope::fallback()),
        }
    }

    #[test]
    fn any_json_scalar_decodes(value in prop_oneof![
        any::<i64>().prop_map(|v| serde_json::json!(v)),
        any::<bool>().prop_map(|v| serde_json::json!(v)),
        any::<f64>().prop_filter("finite", |v| v.is_finite()).prop_map(|v| serde_json::json!(v)),
        "\\PC{0,16}".prop_map(|v| serde_json::json!(v)),
        Just(serde_json::Value::Null),
    ]) {
        let decoded = serde_json::from_value::<ComponentType>(value);
        prop_assert!(decoded.is_ok());
    }
}
