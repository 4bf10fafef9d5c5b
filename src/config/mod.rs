//! Configuration for generation and consolidation runs.
//!
//! The configuration is a plain value: load it (or build it), validate it,
//! and pass it into each workflow constructor. Nothing here is global.
//!
//! # Quick Start
//!
//! ```rust
//! use sbom_manifest::config::{AppConfig, Validatable};
//! use sbom_manifest::model::ManifestInfo;
//!
//! let config = AppConfig::builder()
//!     .manifest_infos(vec![ManifestInfo::spdx22(), ManifestInfo::spdx30()])
//!     .package("my-product", "1.0.0", "My Organization")
//!     .build();
//! assert!(config.is_valid());
//! ```
//!
//! # Configuration File
//!
//! Place a `.sbom-manifest.yaml` file in your project root or `~/.config/sbom-manifest/`:
//!
//! ```yaml
//! generation:
//!   manifest_infos: ['SPDX:2.2', 'SPDX:3.0']
//!   conformance: NTIA
//! behavior:
//!   fail_on_errors: true
//! ```

pub mod file;
mod types;
mod validation;

pub use types::{
    AppConfig, AppConfigBuilder, BehaviorConfig, ConsolidationConfig, GenerationConfig,
    DEFAULT_NAMESPACE_URI_BASE,
};
pub use validation::{ConfigError, Validatable};

pub use file::{
    discover_config_file, generate_example_config, load_config_file, load_or_default,
    ConfigFileError,
};

/// Generate a JSON Schema for the `AppConfig` configuration format.
///
/// The schema documents every option of a config file and can be used by
/// editors for validation and autocompletion.
pub fn generate_json_schema() -> crate::error::Result<String> {
    let schema = schemars::schema_for!(AppConfig);
    serde_json::to_string_pretty(&schema)
        .map_err(|e| crate::error::SbomError::json("serializing config schema", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_names_sections() {
        let schema = generate_json_schema().unwrap();
        assert!(schema.contains("\"generation\""));
        assert!(schema.contains("\"consolidation\""));
        assert!(schema.contains("fail_on_errors"));
    }
}
