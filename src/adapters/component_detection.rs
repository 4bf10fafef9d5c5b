//! Component-detection scan output to SBOM packages.
//!
//! The scan format is owned by an external scanner that adds component
//! types, scopes and result codes on its own release schedule. Every
//! enumeration here is a [`tolerant_enum!`](crate::tolerant_enum), so a
//! newer scanner never breaks decoding of an older build's input.

use crate::codec::{collection, nullable};
use crate::error::{ErrorContext, Result, SbomError};
use crate::model::{package_id, SbomPackage};
use crate::tolerant_enum;
use indexmap::{IndexMap, IndexSet};
use packageurl::PackageUrl;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::path::Path;

tolerant_enum! {
    /// Ecosystem of a detected component.
    pub enum ComponentType {
        Other = 0 => "Other",
        NuGet = 1 => "NuGet",
        Npm = 2 => "Npm",
        Maven = 3 => "Maven",
        Git = 4 => "Git",
        RubyGems = 6 => "RubyGems",
        Cargo = 7 => "Cargo",
        Pip = 8 => "Pip",
        Go = 9 => "Go",
        DockerImage = 10 => "DockerImage",
        Pod = 11 => "Pod",
        Linux = 12 => "Linux",
        Conda = 13 => "Conda",
        Spdx = 14 => "Spdx",
        Vcpkg = 15 => "Vcpkg",
        DockerReference = 16 => "DockerReference",
        DotNet = 17 => "DotNet",
        Swift = 18 => "Swift",
    }
}

impl ComponentType {
    /// Package URL type, for ecosystems that have one.
    #[must_use]
    pub const fn purl_type(&self) -> Option<&'static str> {
        match self {
            Self::NuGet => Some("nuget"),
            Self::Npm => Some("npm"),
            Self::Maven => Some("maven"),
            Self::RubyGems => Some("gem"),
            Self::Cargo => Some("cargo"),
            Self::Pip => Some("pypi"),
            Self::Go => Some("golang"),
            Self::DockerImage => Some("docker"),
            Self::Pod => Some("cocoapods"),
            Self::Conda => Some("conda"),
            Self::Vcpkg => Some("vcpkg"),
            Self::Swift => Some("swift"),
            Self::Other
            | Self::Git
            | Self::Linux
            | Self::Spdx
            | Self::DockerReference
            | Self::DotNet => None,
        }
    }
}

tolerant_enum! {
    /// Maven-style dependency scope.
    pub enum DependencyScope {
        MavenCompile = 0 => "MavenCompile",
        MavenRuntime = 1 => "MavenRuntime",
        MavenProvided = 2 => "MavenProvided",
        MavenSystem = 3 => "MavenSystem",
        MavenTest = 4 => "MavenTest",
    }
}

tolerant_enum! {
    /// Overall outcome of a scan.
    pub enum ProcessingResultCode {
        Unknown = -1 => "Unknown",
        Success = 0 => "Success",
        PartialSuccess = 1 => "PartialSuccess",
        TimeoutError = 2 => "TimeoutError",
        InputError = 3 => "InputError",
    }
}

/// A scanner's JSON report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScanResult {
    pub components_found: Vec<ScannedComponent>,
    pub detectors_in_run: Vec<Detector>,
    /// Location to graph; each graph maps a component id to its children
    pub dependency_graphs: IndexMap<String, DependencyGraph>,
    pub result_code: ProcessingResultCode,
    pub source_directory: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Detector {
    pub detector_id: String,
    pub version: i64,
    #[serde(deserialize_with = "component_types")]
    pub supported_component_types: IndexSet<ComponentType>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DependencyGraph {
    pub graph: IndexMap<String, Option<Vec<String>>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScannedComponent {
    pub component: TypedComponent,
    pub detector_id: Option<String>,
    pub is_development_dependency: Option<bool>,
    #[serde(with = "nullable", skip_serializing_if = "Option::is_none")]
    pub dependency_scope: Option<DependencyScope>,
    pub top_level_referrers: Vec<Value>,
    pub locations_found_at: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TypedComponent {
    pub id: String,
    #[serde(rename = "type")]
    pub component_type: ComponentType,
    pub name: Option<String>,
    pub version: Option<String>,
    /// Maven group id, Go module path prefix, and similar
    #[serde(alias = "groupId")]
    pub namespace: Option<String>,
    #[serde(alias = "artifactId")]
    pub artifact_id: Option<String>,
    pub author: Option<String>,
    /// Either a purl string or the scanner's structured form
    pub package_url: Option<Value>,
}

fn component_types<'de, D>(deserializer: D) -> std::result::Result<IndexSet<ComponentType>, D::Error>
where
    D: Deserializer<'de>,
{
    collection::deserialize::<D, ComponentType, _>(deserializer)
}

/// Conversion switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConversionOptions {
    /// Keep components flagged as development dependencies
    pub include_development_dependencies: bool,
}

impl ScanResult {
    /// Read a scan report from disk.
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| SbomError::io(path, e))?;
        serde_json::from_str(&content)
            .with_context(|| format!("parsing scan result {}", path.display()))
    }

    /// Convert detected components to packages.
    ///
    /// Components sharing an id are merged; dependency graph edges become
    /// `depends_on` entries between converted packages.
    #[must_use]
    pub fn to_packages(&self, options: ConversionOptions) -> Vec<SbomPackage> {
        if self.result_code != ProcessingResultCode::Success {
            tracing::warn!(result = %self.result_code, "scan did not complete successfully");
        }

        let mut packages: IndexMap<String, SbomPackage> = IndexMap::new();
        for scanned in &self.components_found {
            if scanned.is_development_dependency == Some(true)
                && !options.include_development_dependencies
            {
                tracing::debug!(component = %scanned.component.id, "development dependency skipped");
                continue;
            }
            let Some(package) = scanned.component.to_package() else {
                tracing::debug!(component = %scanned.component.id, "component without a name skipped");
                continue;
            };
            packages.entry(scanned.component.id.clone()).or_insert(package);
        }

        let ids: IndexMap<String, String> = packages
            .iter()
            .map(|(component, package)| (component.clone(), package_id(package)))
            .collect();
        for graph in self.dependency_graphs.values() {
            for (component, children) in &graph.graph {
                let Some(package) = packages.get_mut(component) else {
                    continue;
                };
                for child in children.iter().flatten() {
                    if let Some(child_id) = ids.get(child) {
                        if !package.depends_on.contains(child_id) {
                            package.depends_on.push(child_id.clone());
                        }
                    }
                }
            }
        }

        tracing::info!(
            found = self.components_found.len(),
            converted = packages.len(),
            "converted scanned components"
        );
        packages
            .into_iter()
            .map(|(component, mut package)| {
                package.id = ids.get(&component).cloned();
                package
            })
            .collect()
    }
}

impl TypedComponent {
    fn display_name(&self) -> Option<String> {
        match (&self.name, &self.artifact_id) {
            (Some(name), _) if !name.is_empty() => Some(name.clone()),
            (_, Some(artifact)) if !artifact.is_empty() => Some(artifact.clone()),
            _ => None,
        }
    }

    /// Package record for this component; `None` without a usable name.
    #[must_use]
    pub fn to_package(&self) -> Option<SbomPackage> {
        let name = self.display_name()?;
        let mut package = SbomPackage {
            name,
            version: self.version.clone().filter(|v| !v.is_empty()),
            supplier: self.author.clone().filter(|a| !a.is_empty()),
            ..SbomPackage::default()
        };
        package.purl = self
            .package_url
            .as_ref()
            .and_then(Value::as_str)
            .map(str::to_string)
            .or_else(|| self.build_purl(&package.name));
        Some(package)
    }

    fn build_purl(&self, name: &str) -> Option<String> {
        let purl_type = self.component_type.purl_type()?;
        let mut purl = match PackageUrl::new(purl_type, name) {
            Ok(purl) => purl,
            Err(e) => {
                tracing::debug!(component = %self.id, error = %e, "package url not built");
                return None;
            }
        };
        if let Some(namespace) = self.namespace.as_deref().filter(|n| !n.is_empty()) {
            purl.with_namespace(namespace);
        }
        if let Some(version) = self.version.as_deref().filter(|v| !v.is_empty()) {
            purl.with_version(version);
        }
        Some(purl.to_string())
    }
}
