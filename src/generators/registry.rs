//! Format key to generator lookup.

use super::spdx22::Spdx22Generator;
use super::spdx30::Spdx30Generator;
use super::traits::ManifestGenerator;
use crate::error::{Result, SbomError};
use crate::model::{ComplianceStandard, ManifestInfo};
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;

/// The set of generators available to a run.
///
/// Build it, call [`init`](Self::init) once, then share it read-only. Lookups
/// before `init` fail with [`SbomError::RegistryNotInitialized`].
pub struct GeneratorRegistry {
    generators: Vec<Arc<dyn ManifestGenerator>>,
    index: Option<IndexMap<ManifestInfo, Arc<dyn ManifestGenerator>>>,
}

impl GeneratorRegistry {
    #[must_use]
    pub fn new(generators: Vec<Arc<dyn ManifestGenerator>>) -> Self {
        Self {
            generators,
            index: None,
        }
    }

    /// SPDX 2.2 and 3.0, initialized.
    #[must_use]
    pub fn standard(conformance: ComplianceStandard) -> Self {
        let mut registry = Self::new(vec![
            Arc::new(Spdx22Generator::new()),
            Arc::new(Spdx30Generator::new(conformance)),
        ]);
        registry.init();
        registry
    }

    /// Build the lookup index. Registration order is kept; for duplicate
    /// keys the first registration wins.
    pub fn init(&mut self) {
        let mut index = IndexMap::with_capacity(self.generators.len());
        for generator in &self.generators {
            let info = generator.register_manifest();
            if index.contains_key(&info) {
                tracing::warn!(manifest = %info, "duplicate generator registration ignored");
                continue;
            }
            index.insert(info, Arc::clone(generator));
        }
        tracing::debug!(count = index.len(), "generator registry initialized");
        self.index = Some(index);
    }

    #[must_use]
    pub const fn is_initialized(&self) -> bool {
        self.index.is_some()
    }

    fn index(&self) -> Result<&IndexMap<ManifestInfo, Arc<dyn ManifestGenerator>>> {
        self.index.as_ref().ok_or(SbomError::RegistryNotInitialized)
    }

    /// Generator for exactly this name and version.
    pub fn get(&self, info: &ManifestInfo) -> Result<Arc<dyn ManifestGenerator>> {
        self.index()?
            .get(info)
            .cloned()
            .ok_or_else(|| SbomError::UnsupportedManifestInfo(info.clone()))
    }

    /// Registered formats in registration order.
    pub fn manifest_infos(&self) -> Result<Vec<ManifestInfo>> {
        Ok(self.index()?.keys().cloned().collect())
    }

    /// Resolve every requested format, failing on the first unknown one.
    pub fn resolve(&self, requested: &[ManifestInfo]) -> Result<Vec<Arc<dyn ManifestGenerator>>> {
        requested.iter().map(|info| self.get(info)).collect()
    }
}

impl fmt::Debug for GeneratorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let infos: Vec<String> = self
            .generators
            .iter()
            .map(|g| g.register_manifest().to_string())
            .collect();
        f.debug_struct("GeneratorRegistry")
            .field("generators", &infos)
            .field("initialized", &self.is_initialized())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_use_before_init_fails_fast() {
        let registry = GeneratorRegistry::new(vec![Arc::new(Spdx22Generator::new())]);
        assert!(matches!(
            registry.get(&ManifestInfo::spdx22()),
            Err(SbomError::RegistryNotInitialized)
        ));
    }

    #[test]
    fn test_get_exact_match_only() {
        let registry = GeneratorRegistry::standard(ComplianceStandard::None);
        assert!(registry.get(&ManifestInfo::spdx22()).is_ok());
        assert!(registry.get(&ManifestInfo::spdx30()).is_ok());
        match registry.get(&ManifestInfo::new("spdx", "2.2")) {
            Err(SbomError::UnsupportedManifestInfo(info)) => assert_eq!(info.name(), "spdx"),
            other => panic!("Expected UnsupportedManifestInfo, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_registration_order_and_duplicates() {
        let mut registry = GeneratorRegistry::new(vec![
            Arc::new(Spdx30Generator::default()),
            Arc::new(Spdx22Generator::new()),
            Arc::new(Spdx22Generator::new()),
        ]);
        registry.init();
        assert_eq!(
            registry.manifest_infos().unwrap(),
            vec![ManifestInfo::spdx30(), ManifestInfo::spdx22()]
        );
    }
}
