//! Configuration validation.

use super::types::{AppConfig, BehaviorConfig, ConsolidationConfig, GenerationConfig};
use crate::model::AlgorithmName;

// ============================================================================
// Configuration Error
// ============================================================================

/// Error type for configuration validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    /// The field that failed validation
    pub field: String,
    /// Description of the validation error
    pub message: String,
}

impl ConfigError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Validation Trait
// ============================================================================

/// Trait for validatable configuration types.
pub trait Validatable {
    /// Validate the configuration, returning any errors found.
    fn validate(&self) -> Vec<ConfigError>;

    /// Check if the configuration is valid.
    fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}

// ============================================================================
// Validation Implementations
// ============================================================================

impl Validatable for AppConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        errors.extend(self.generation.validate());
        errors.extend(self.consolidation.validate());
        errors.extend(self.behavior.validate());
        errors
    }
}

impl Validatable for GenerationConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if self.manifest_infos.is_empty() {
            errors.push(ConfigError::new(
                "generation.manifest_infos",
                "At least one manifest format is required",
            ));
        }
        for (i, info) in self.manifest_infos.iter().enumerate() {
            if self.manifest_infos[..i].contains(info) {
                errors.push(ConfigError::new(
                    "generation.manifest_infos",
                    format!("Duplicate manifest format '{info}'"),
                ));
            }
        }

        if self.namespace_uri_base.trim().is_empty() {
            errors.push(ConfigError::new(
                "generation.namespace_uri_base",
                "Namespace base URI must not be empty",
            ));
        } else if !self.namespace_uri_base.contains("://") {
            errors.push(ConfigError::new(
                "generation.namespace_uri_base",
                format!(
                    "Namespace base must be an absolute URI, got '{}'",
                    self.namespace_uri_base
                ),
            ));
        }

        if self.hash_algorithms.is_empty() {
            errors.push(ConfigError::new(
                "generation.hash_algorithms",
                "At least one hash algorithm is required",
            ));
        } else if !self.hash_algorithms.contains(&AlgorithmName::Sha256) {
            errors.push(ConfigError::new(
                "generation.hash_algorithms",
                "SHA256 is required by every supported format",
            ));
        }

        if let Some(dir) = &self.build_drop_path {
            if !dir.is_dir() {
                errors.push(ConfigError::new(
                    "generation.build_drop_path",
                    format!("Build drop '{}' is not a directory", dir.display()),
                ));
            }
        }

        errors
    }
}

impl Validatable for ConsolidationConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        for (name, info) in &self.artifact_info_map {
            if name.trim().is_empty() && info.artifact_path.is_none() {
                errors.push(ConfigError::new(
                    "consolidation.artifact_info_map",
                    "Artifact with an empty name needs an explicit artifactPath",
                ));
            }
        }
        errors
    }
}

impl Validatable for BehaviorConfig {
    fn validate(&self) -> Vec<ConfigError> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ArtifactInfo, ManifestInfo};

    #[test]
    fn test_default_config_is_valid() {
        assert!(AppConfig::default().is_valid());
    }

    #[test]
    fn test_empty_and_duplicate_formats() {
        let mut config = GenerationConfig {
            manifest_infos: vec![],
            ..GenerationConfig::default()
        };
        assert_eq!(config.validate().len(), 1);

        config.manifest_infos = vec![ManifestInfo::spdx22(), ManifestInfo::spdx22()];
        let errors = config.validate();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("Duplicate"));
    }

    #[test]
    fn test_namespace_must_be_uri() {
        let config = GenerationConfig {
            namespace_uri_base: "not a uri".into(),
            ..GenerationConfig::default()
        };
        let errors = config.validate();
        assert_eq!(errors[0].field, "generation.namespace_uri_base");
    }

    #[test]
    fn test_hash_algorithms_need_sha256() {
        let config = GenerationConfig {
            hash_algorithms: vec![AlgorithmName::Md5],
            ..GenerationConfig::default()
        };
        assert!(!config.is_valid());
    }

    #[test]
    fn test_empty_hash_algorithms_rejected() {
        let config = GenerationConfig {
            hash_algorithms: vec![],
            ..GenerationConfig::default()
        };
        let errors = config.validate();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "generation.hash_algorithms");
    }

    #[test]
    fn test_unnamed_artifact_needs_path() {
        let mut config = ConsolidationConfig::default();
        config
            .artifact_info_map
            .insert(String::new(), ArtifactInfo::default());
        assert_eq!(config.validate().len(), 1);
    }
}
