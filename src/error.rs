//! Unified error types for sbom-manifest.
//!
//! Structural misconfigurations (missing identity hash, unregistered format,
//! unsupported section) are hard errors of the enclosing operation. Per-item
//! generation failures travel on the pipeline's error stream as values and
//! are only converted into [`SbomError::GenerationFailure`] at the edges.

use crate::model::ManifestInfo;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for sbom-manifest operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum SbomError {
    /// Identifier derivation found no SHA1 checksum among the inputs.
    #[error("The {entity} {name} is missing the SHA1 hash value")]
    MissingHashValue { entity: String, name: String },

    /// No generator is registered for this exact name and version.
    #[error("Unsupported manifest info: {0}")]
    UnsupportedManifestInfo(ManifestInfo),

    /// The format has no such optional document section.
    #[error("{manifest} does not support the {section} section")]
    NotSupported {
        manifest: ManifestInfo,
        section: String,
    },

    /// A generator invocation failed for a specific record.
    #[error("Generation failed for '{key}': {reason}")]
    GenerationFailure { key: String, reason: String },

    /// Consolidation found no artifact with a usable manifest.
    #[error("No valid manifest found in any of the provided artifacts")]
    NoValidManifestFound,

    /// The generator registry was used before `init()`.
    #[error("Generator registry used before init()")]
    RegistryNotInitialized,

    /// IO errors with context
    #[error("IO error at {path:?}: {message}")]
    Io {
        path: Option<PathBuf>,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// JSON (de)serialization errors with context
    #[error("JSON error: {context}")]
    Json {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// Configuration errors
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Validation errors
    #[error("Validation failed: {0}")]
    Validation(String),
}

// ============================================================================
// Result type alias
// ============================================================================

/// Convenient Result type for sbom-manifest operations
pub type Result<T> = std::result::Result<T, SbomError>;

// ============================================================================
// Error construction helpers
// ============================================================================

impl SbomError {
    /// Create a missing-hash error for an entity kind and name
    pub fn missing_hash(entity: impl Into<String>, name: impl Into<String>) -> Self {
        Self::MissingHashValue {
            entity: entity.into(),
            name: name.into(),
        }
    }

    /// Create a not-supported error for a format section
    pub fn not_supported(manifest: &ManifestInfo, section: impl Into<String>) -> Self {
        Self::NotSupported {
            manifest: manifest.clone(),
            section: section.into(),
        }
    }

    /// Create a per-record generation failure
    pub fn generation(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::GenerationFailure {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Create an IO error with path context
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        let message = format!("{source}");
        Self::Io {
            path: Some(path),
            message,
            source,
        }
    }

    /// Create a JSON error with context
    pub fn json(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Json {
            context: context.into(),
            source,
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// True for errors that indicate a misconfigured run rather than bad input.
    #[must_use]
    pub const fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedManifestInfo(_) | Self::RegistryNotInitialized | Self::Config(_)
        )
    }
}

// ============================================================================
// Conversions from existing error types
// ============================================================================

impl From<std::io::Error> for SbomError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            path: None,
            message: format!("{err}"),
            source: err,
        }
    }
}

impl From<serde_json::Error> for SbomError {
    fn from(err: serde_json::Error) -> Self {
        Self::json("JSON deserialization", err)
    }
}

// ============================================================================
// Error context extension trait
// ============================================================================

/// Extension trait for adding context to errors.
///
/// The context string is prepended to the error's existing context, so a
/// chain of calls reads outermost first:
///
/// ```ignore
/// use sbom_manifest::error::ErrorContext;
///
/// let content = std::fs::read_to_string(path)
///     .with_context(|| format!("reading manifest {}", path.display()))?;
/// ```
pub trait ErrorContext<T> {
    /// Add context to an error.
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context from a closure, evaluated only on the error path.
    fn with_context<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>;
}

impl<T, E: Into<SbomError>> ErrorContext<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        let ctx: String = context.into();
        self.map_err(|e| add_context_to_error(e.into(), &ctx))
    }

    fn with_context<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>,
    {
        self.map_err(|e| {
            let ctx: String = f().into();
            add_context_to_error(e.into(), &ctx)
        })
    }
}

/// Add context to an error, chaining with any existing context.
fn add_context_to_error(err: SbomError, new_ctx: &str) -> SbomError {
    match err {
        SbomError::Io {
            path,
            message,
            source,
        } => SbomError::Io {
            path,
            message: chain_context(new_ctx, &message),
            source,
        },
        SbomError::Json {
            context: existing,
            source,
        } => SbomError::Json {
            context: chain_context(new_ctx, &existing),
            source,
        },
        SbomError::GenerationFailure { key, reason } => SbomError::GenerationFailure {
            key,
            reason: chain_context(new_ctx, &reason),
        },
        SbomError::Config(msg) => SbomError::Config(chain_context(new_ctx, &msg)),
        SbomError::Validation(msg) => SbomError::Validation(chain_context(new_ctx, &msg)),
        // Kinds that callers match on keep their exact shape.
        other => other,
    }
}

/// Chain two context strings together.
///
/// If the existing context is empty, returns just the new context.
/// Otherwise, returns "`new_context`: `existing_context`".
fn chain_context(new: &str, existing: &str) -> String {
    if existing.is_empty() {
        new.to_string()
    } else {
        format!("{new}: {existing}")
    }
}

/// Extension trait for Option types to convert to errors with context.
pub trait OptionContext<T> {
    /// Convert None to an error with the given context.
    fn context_none(self, context: impl Into<String>) -> Result<T>;

    /// Convert None to an error with context from a closure.
    fn with_context_none<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>;
}

impl<T> OptionContext<T> for Option<T> {
    fn context_none(self, context: impl Into<String>) -> Result<T> {
        self.ok_or_else(|| SbomError::Validation(context.into()))
    }

    fn with_context_none<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>,
    {
        self.ok_or_else(|| SbomError::Validation(f().into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_hash_display() {
        let err = SbomError::missing_hash("file", "/bin/app.dll");
        let display = err.to_string();
        assert!(display.contains("/bin/app.dll"), "{display}");
        assert!(display.contains("SHA1"), "{display}");
    }

    #[test]
    fn test_unsupported_manifest_display() {
        let err = SbomError::UnsupportedManifestInfo(ManifestInfo::new("SPDX", "9.9"));
        assert!(err.to_string().contains("SPDX:9.9"));
        assert!(err.is_structural());
    }

    #[test]
    fn test_io_error_keeps_path() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = SbomError::io("/path/to/manifest.spdx.json", io_err);

        assert!(err.to_string().contains("/path/to/manifest.spdx.json"));
    }

    #[test]
    fn test_context_chaining_multiple_levels() {
        fn inner() -> Result<()> {
            Err(SbomError::validation("base"))
        }

        fn middle() -> Result<()> {
            inner().context("middle layer")
        }

        fn outer() -> Result<()> {
            middle().context("outer layer")
        }

        match outer() {
            Err(SbomError::Validation(msg)) => {
                assert_eq!(msg, "outer layer: middle layer: base");
            }
            other => panic!("Expected Validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_context_leaves_matchable_kinds_untouched() {
        let err: Result<()> = Err(SbomError::missing_hash("file", "a.txt"));
        match err.context("deriving id") {
            Err(SbomError::MissingHashValue { name, .. }) => assert_eq!(name, "a.txt"),
            other => panic!("Expected MissingHashValue, got {other:?}"),
        }
    }

    #[test]
    fn test_with_context_lazy_evaluation() {
        let mut called = false;

        let ok_result: Result<i32> = Ok(42);
        let _ = ok_result.with_context(|| {
            called = true;
            "should not be called"
        });
        assert!(!called, "Closure should not be called for Ok result");

        let err_result: Result<i32> = Err(SbomError::validation("error"));
        let _ = err_result.with_context(|| {
            called = true;
            "should be called"
        });
        assert!(called, "Closure should be called for Err result");
    }

    #[test]
    fn test_option_context() {
        let none_value: Option<i32> = None;
        match none_value.context_none("missing value") {
            Err(SbomError::Validation(msg)) => assert_eq!(msg, "missing value"),
            other => panic!("Expected Validation error, got {other:?}"),
        }
        assert_eq!(Some(7).context_none("unused").ok(), Some(7));
    }

    #[test]
    fn test_chain_context_helper() {
        assert_eq!(chain_context("new", ""), "new");
        assert_eq!(chain_context("new", "existing"), "new: existing");
    }
}
