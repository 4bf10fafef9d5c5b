//! Manifest format identity.

use crate::error::{Result, SbomError};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Name and version of a manifest format, e.g. `SPDX:2.2`.
///
/// Equality is exact and case-sensitive on both parts. The value is immutable
/// once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ManifestInfo {
    name: String,
    version: String,
}

impl ManifestInfo {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }

    /// SPDX 2.2 JSON.
    #[must_use]
    pub fn spdx22() -> Self {
        Self::new("SPDX", "2.2")
    }

    /// SPDX 3.0 JSON-LD.
    #[must_use]
    pub fn spdx30() -> Self {
        Self::new("SPDX", "3.0")
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Parse a `Name:Version` string.
    ///
    /// Exactly one colon is accepted and neither side may be blank.
    pub fn parse(value: &str) -> Result<Self> {
        let mut parts = value.trim().split(':');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(name), Some(version), None)
                if !name.trim().is_empty() && !version.trim().is_empty() =>
            {
                Ok(Self::new(name.trim(), version.trim()))
            }
            _ => Err(SbomError::validation(format!(
                "manifest info '{value}' must have the form Name:Version"
            ))),
        }
    }

    /// Parse a comma-separated list such as `SPDX:2.2,SPDX:3.0`.
    pub fn parse_list(value: &str) -> Result<Vec<Self>> {
        value
            .split(',')
            .filter(|part| !part.trim().is_empty())
            .map(Self::parse)
            .collect()
    }

    /// Per-format folder under the manifest directory, e.g. `spdx_2.2`.
    #[must_use]
    pub fn folder_name(&self) -> String {
        format!("{}_{}", self.name.to_lowercase(), self.version)
    }

    /// Manifest file name inside [`folder_name`](Self::folder_name).
    #[must_use]
    pub fn file_name(&self) -> String {
        format!("manifest.{}.json", self.name.to_lowercase())
    }
}

impl fmt::Display for ManifestInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.version)
    }
}

impl FromStr for ManifestInfo {
    type Err = SbomError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for ManifestInfo {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ManifestInfo {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
