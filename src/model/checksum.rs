//! Hash algorithm names and checksum values.

use crate::error::{Result, SbomError};
use crate::utils::hash;
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::io::Read;
use std::str::FromStr;

/// A supported hash algorithm.
///
/// Names compare case-insensitively when parsed (`sha256` and `SHA256` are
/// the same algorithm) and always serialize upper-case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, JsonSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum AlgorithmName {
    Sha1,
    Sha256,
    Sha512,
    Md5,
}

impl AlgorithmName {
    pub const ALL: [Self; 4] = [Self::Sha1, Self::Sha256, Self::Sha512, Self::Md5];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Sha1 => "SHA1",
            Self::Sha256 => "SHA256",
            Self::Sha512 => "SHA512",
            Self::Md5 => "MD5",
        }
    }

    /// Stream `reader` through this algorithm and return the lowercase hex digest.
    pub fn compute<R: Read>(&self, reader: R) -> Result<String> {
        hash::digest_reader(*self, reader)
    }
}

impl fmt::Display for AlgorithmName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlgorithmName {
    type Err = SbomError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|a| a.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| SbomError::validation(format!("unknown hash algorithm '{s}'")))
    }
}

impl<'de> Deserialize<'de> for AlgorithmName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// A computed digest.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Checksum {
    pub algorithm: AlgorithmName,
    #[serde(rename = "checksumValue", alias = "value")]
    pub value: String,
}

impl Checksum {
    pub fn new(algorithm: AlgorithmName, value: impl Into<String>) -> Self {
        Self {
            algorithm,
            value: value.into(),
        }
    }
}

/// First non-empty value for `algorithm` in `checksums`.
pub fn find_checksum(checksums: &[Checksum], algorithm: AlgorithmName) -> Option<&str> {
    checksums
        .iter()
        .find(|c| c.algorithm == algorithm && !c.value.trim().is_empty())
        .map(|c| c.value.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("sha256".parse::<AlgorithmName>().unwrap(), AlgorithmName::Sha256);
        assert_eq!("Md5".parse::<AlgorithmName>().unwrap(), AlgorithmName::Md5);
        assert!("crc32".parse::<AlgorithmName>().is_err());
    }

    #[test]
    fn test_checksum_serde() {
        let checksum = Checksum::new(AlgorithmName::Sha1, "abc");
        let json = serde_json::to_value(&checksum).unwrap();
        assert_eq!(json["algorithm"], "SHA1");
        assert_eq!(json["checksumValue"], "abc");

        let back: Checksum =
            serde_json::from_str(r#"{"algorithm":"sha1","value":"abc"}"#).unwrap();
        assert_eq!(back, checksum);
    }

    #[test]
    fn test_find_checksum_skips_empty() {
        let checksums = vec![
            Checksum::new(AlgorithmName::Sha1, ""),
            Checksum::new(AlgorithmName::Sha1, "123"),
        ];
        assert_eq!(find_checksum(&checksums, AlgorithmName::Sha1), Some("123"));
        assert_eq!(find_checksum(&checksums, AlgorithmName::Sha256), None);
    }
}
