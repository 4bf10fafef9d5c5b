//! Checksum engine.

use crate::error::{ErrorContext, Result};
use crate::model::{AlgorithmName, Checksum};
use md5::Md5;
use sha1::Sha1;
use sha2::{Digest, Sha256, Sha512};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

const BUFFER_SIZE: usize = 64 * 1024;

fn digest_with<D: Digest, R: Read>(mut reader: R) -> Result<String> {
    let mut hasher = D::new();
    let mut buffer = vec![0u8; BUFFER_SIZE];
    loop {
        let read = reader.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Hash everything `reader` yields with `algorithm`, lowercase hex.
pub fn digest_reader<R: Read>(algorithm: AlgorithmName, reader: R) -> Result<String> {
    match algorithm {
        AlgorithmName::Sha1 => digest_with::<Sha1, _>(reader),
        AlgorithmName::Sha256 => digest_with::<Sha256, _>(reader),
        AlgorithmName::Sha512 => digest_with::<Sha512, _>(reader),
        AlgorithmName::Md5 => digest_with::<Md5, _>(reader),
    }
}

/// Hash a byte slice with `algorithm`, lowercase hex.
#[must_use]
pub fn digest_bytes(algorithm: AlgorithmName, data: &[u8]) -> String {
    match algorithm {
        AlgorithmName::Sha1 => hex::encode(Sha1::digest(data)),
        AlgorithmName::Sha256 => hex::encode(Sha256::digest(data)),
        AlgorithmName::Sha512 => hex::encode(Sha512::digest(data)),
        AlgorithmName::Md5 => hex::encode(Md5::digest(data)),
    }
}

/// Upper-case hex SHA-256 of a string, used for content-addressed ids.
#[must_use]
pub fn sha256_upper(content: &str) -> String {
    hex::encode_upper(Sha256::digest(content.as_bytes()))
}

/// Compute one checksum per algorithm for the file at `path`.
///
/// SHA1 is always included because identifiers are derived from it.
pub fn compute_checksums(path: &Path, algorithms: &[AlgorithmName]) -> Result<Vec<Checksum>> {
    let mut wanted: Vec<AlgorithmName> = vec![AlgorithmName::Sha1];
    for algorithm in algorithms {
        if !wanted.contains(algorithm) {
            wanted.push(*algorithm);
        }
    }

    wanted
        .into_iter()
        .map(|algorithm| {
            let file = File::open(path)
                .with_context(|| format!("opening {} for hashing", path.display()))?;
            let value = digest_reader(algorithm, BufReader::new(file))
                .with_context(|| format!("hashing {}", path.display()))?;
            Ok(Checksum::new(algorithm, value))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_known_digests() {
        let data = b"hello world";
        assert_eq!(
            digest_bytes(AlgorithmName::Sha1, data),
            "2aae6c35c94fcfb415dbe95f408b9ce91ee846ed"
        );
        assert_eq!(
            digest_bytes(AlgorithmName::Sha256, data),
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
        assert_eq!(
            digest_bytes(AlgorithmName::Md5, data),
            "5eb63bbbe01eeed093cb22bb8f5acdc3"
        );
    }

    #[test]
    fn test_reader_matches_bytes() {
        let data = vec![7u8; BUFFER_SIZE * 2 + 13];
        for algorithm in AlgorithmName::ALL {
            assert_eq!(
                digest_reader(algorithm, data.as_slice()).unwrap(),
                digest_bytes(algorithm, &data)
            );
        }
    }

    #[test]
    fn test_compute_checksums_always_has_sha1() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"hello world").unwrap();

        let checksums = compute_checksums(file.path(), &[AlgorithmName::Sha256]).unwrap();
        assert_eq!(checksums.len(), 2);
        assert_eq!(checksums[0].algorithm, AlgorithmName::Sha1);
        assert_eq!(checksums[1].algorithm, AlgorithmName::Sha256);
    }

    #[test]
    fn test_compute_checksums_missing_file() {
        let err = compute_checksums(Path::new("/definitely/not/here"), &[]).unwrap_err();
        assert!(err.to_string().contains("opening"), "{err}");
    }

    #[test]
    fn test_sha256_upper() {
        let id = sha256_upper("a.txt-abc");
        assert_eq!(id.len(), 64);
        assert!(id.chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
    }
}
