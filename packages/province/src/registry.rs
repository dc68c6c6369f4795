//! Compile-time registry of province alias tables.
//!
//! Each entry is a `(name, toml_content)` pair embedded via `include_str!`.
//! The registry is the lookup table a clicked boundary feature must resolve
//! against before the selection can move to the province level.

use cowork_map_province_models::{
    ProvinceCollection, ProvinceDefinition, ProvinceFeature, ProvinceRegistryFile,
};

use crate::ProvinceError;

/// Number of provinces in the default registry. Enforced by a test.
#[cfg(test)]
const EXPECTED_PROVINCE_COUNT: usize = 28;

/// Embedded TOML registry definitions.
const REGISTRY_TOMLS: &[(&str, &str)] = &[("bulgaria", include_str!("../provinces/bulgaria.toml"))];

/// Province alias lookup table.
#[derive(Debug, Clone)]
pub struct ProvinceRegistry {
    country: String,
    definitions: Vec<ProvinceDefinition>,
}

impl ProvinceRegistry {
    /// Parses a registry from TOML.
    ///
    /// # Errors
    ///
    /// Returns [`ProvinceError::Registry`] if the document is not a valid
    /// registry file.
    pub fn from_toml_str(toml_str: &str) -> Result<Self, ProvinceError> {
        let file: ProvinceRegistryFile = toml::de::from_str(toml_str)?;
        Ok(Self::new(file.country, file.provinces))
    }

    /// Builds a registry from already-parsed definitions.
    #[must_use]
    pub const fn new(country: String, definitions: Vec<ProvinceDefinition>) -> Self {
        Self {
            country,
            definitions,
        }
    }

    /// Returns the embedded registry named `name` (e.g., `"bulgaria"`).
    ///
    /// # Panics
    ///
    /// Panics if the embedded TOML fails to parse. Since these are
    /// compile-time constants, parse failures indicate a development error
    /// and are caught by the registry tests.
    #[must_use]
    pub fn embedded(name: &str) -> Option<Self> {
        REGISTRY_TOMLS
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(key, toml_str)| {
                Self::from_toml_str(toml_str)
                    .unwrap_or_else(|e| panic!("Failed to parse province registry '{key}': {e}"))
            })
    }

    /// Returns the default (Bulgarian) registry.
    ///
    /// # Panics
    ///
    /// Panics if the embedded default registry is missing or malformed.
    #[must_use]
    pub fn bulgaria() -> Self {
        Self::embedded("bulgaria").unwrap_or_else(|| panic!("Default province registry missing"))
    }

    /// Country the registry describes.
    #[must_use]
    pub fn country(&self) -> &str {
        &self.country
    }

    /// All province definitions, in registry order.
    #[must_use]
    pub fn definitions(&self) -> &[ProvinceDefinition] {
        &self.definitions
    }

    /// Looks up a province by its English or native name.
    #[must_use]
    pub fn resolve(&self, raw: &str) -> Option<&ProvinceDefinition> {
        self.definitions.iter().find(|d| d.is_named(raw))
    }

    /// Resolves a boundary feature, trying its match name before its
    /// display name. Returns `None` for features the lookup table does not
    /// know, which makes clicks on them no-ops.
    #[must_use]
    pub fn resolve_feature(&self, feature: &ProvinceFeature) -> Option<&ProvinceDefinition> {
        self.resolve(&feature.match_name)
            .or_else(|| self.resolve(&feature.display_name))
    }

    /// The name under which `province` appears in a boundary dataset.
    ///
    /// Datasets do not always carry the registry's English name, so the
    /// first feature resolving to `province` supplies the raw name used for
    /// mask and centroid lookups.
    #[must_use]
    pub fn raw_name_in<'a>(
        &self,
        province: &ProvinceDefinition,
        collection: &'a ProvinceCollection,
    ) -> Option<&'a str> {
        collection
            .features
            .iter()
            .find(|f| self.resolve_feature(f).is_some_and(|d| d.name == province.name))
            .map(|f| {
                if f.match_name.is_empty() {
                    f.display_name.as_str()
                } else {
                    f.match_name.as_str()
                }
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::MultiPolygon;
    use std::collections::BTreeSet;

    #[test]
    fn loads_default_registry() {
        let registry = ProvinceRegistry::bulgaria();
        assert_eq!(registry.country(), "Bulgaria");
        assert_eq!(
            registry.definitions().len(),
            EXPECTED_PROVINCE_COUNT,
            "Expected {EXPECTED_PROVINCE_COUNT} provinces, found {}. \
             Update EXPECTED_PROVINCE_COUNT after adding/removing provinces.",
            registry.definitions().len()
        );
    }

    #[test]
    fn province_names_are_unique() {
        let registry = ProvinceRegistry::bulgaria();
        let mut seen = BTreeSet::new();
        for def in registry.definitions() {
            assert!(
                seen.insert(def.name.to_lowercase()),
                "Duplicate province name: {}",
                def.name
            );
        }
    }

    #[test]
    fn aliases_are_lower_case_and_non_empty() {
        for def in ProvinceRegistry::bulgaria().definitions() {
            assert!(!def.aliases.is_empty(), "Province {} has no aliases", def.name);
            for alias in &def.aliases {
                assert!(!alias.trim().is_empty(), "Province {} has empty alias", def.name);
                assert_eq!(
                    alias,
                    &alias.to_lowercase(),
                    "Alias {alias} of {} is not lower-case",
                    def.name
                );
            }
        }
    }

    #[test]
    fn unknown_registry_is_none() {
        assert!(ProvinceRegistry::embedded("atlantis").is_none());
    }

    #[test]
    fn resolves_by_either_name() {
        let registry = ProvinceRegistry::bulgaria();
        assert_eq!(registry.resolve("varna").unwrap().name, "Varna");
        assert_eq!(registry.resolve("Варна").unwrap().name, "Varna");
        assert!(registry.resolve("Atlantis").is_none());
    }

    #[test]
    fn resolves_feature_by_display_name_when_match_name_unknown() {
        let registry = ProvinceRegistry::bulgaria();
        let feature = ProvinceFeature {
            display_name: "Бургас".to_string(),
            match_name: "Burgas Oblast".to_string(),
            boundary: MultiPolygon(vec![]),
            centroid_hint: None,
        };
        assert_eq!(registry.resolve_feature(&feature).unwrap().name, "Burgas");
    }

    #[test]
    fn unnamed_feature_does_not_resolve() {
        let registry = ProvinceRegistry::bulgaria();
        let feature = ProvinceFeature {
            display_name: String::new(),
            match_name: String::new(),
            boundary: MultiPolygon(vec![]),
            centroid_hint: None,
        };
        assert!(registry.resolve_feature(&feature).is_none());
    }

    #[test]
    fn finds_raw_name_of_province_in_dataset() {
        let registry = ProvinceRegistry::bulgaria();
        let collection = ProvinceCollection {
            features: vec![ProvinceFeature {
                display_name: "Варна".to_string(),
                match_name: "Варна".to_string(),
                boundary: MultiPolygon(vec![]),
                centroid_hint: None,
            }],
        };
        let varna = registry.resolve("Varna").unwrap();
        let burgas = registry.resolve("Burgas").unwrap();

        assert_eq!(registry.raw_name_in(varna, &collection), Some("Варна"));
        assert!(registry.raw_name_in(burgas, &collection).is_none());
    }

    #[test]
    fn rejects_malformed_toml() {
        assert!(matches!(
            ProvinceRegistry::from_toml_str("country = "),
            Err(ProvinceError::Registry(_))
        ));
    }
}
