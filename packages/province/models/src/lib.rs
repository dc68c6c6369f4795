#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Province boundary and province registry types.
//!
//! Defines the TOML schema for the province alias registry and the
//! cleaned boundary feature produced by the geometry normalizer.

use geo::MultiPolygon;
use serde::{Deserialize, Serialize};

/// A province entry in the alias registry, deserialized from TOML.
///
/// The registry is the lookup table that ties a boundary feature to the
/// free-text city strings that locations use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvinceDefinition {
    /// English province name (e.g., `"Varna"`). Primary match key.
    pub name: String,
    /// Province name in the local script (e.g., `"Варна"`).
    pub native_name: String,
    /// Lower-case city strings that belong to this province.
    #[serde(default)]
    pub aliases: Vec<String>,
}

impl ProvinceDefinition {
    /// Returns `true` if `raw` names this province, either by its English
    /// or native name. Comparison ignores case and surrounding whitespace.
    #[must_use]
    pub fn is_named(&self, raw: &str) -> bool {
        let raw = raw.trim();
        if raw.is_empty() {
            return false;
        }
        self.name.eq_ignore_ascii_case(raw)
            || self.native_name.to_lowercase() == raw.to_lowercase()
    }
}

/// Top-level layout of an embedded registry TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvinceRegistryFile {
    /// Country the provinces belong to.
    pub country: String,
    /// One entry per province.
    #[serde(rename = "province")]
    pub provinces: Vec<ProvinceDefinition>,
}

/// A cleaned province boundary.
///
/// Produced by the normalizer: rings are closed, free of consecutive
/// duplicate points, and wound with exteriors counter-clockwise and holes
/// clockwise. Never mutated after load.
#[derive(Debug, Clone, PartialEq)]
pub struct ProvinceFeature {
    /// Name for display, taken from the dataset's primary name property.
    pub display_name: String,
    /// Name used for registry lookups (English name when the dataset has
    /// one, otherwise the display name). Empty when the dataset carries no
    /// name at all; such features still take part in the land dissolve.
    pub match_name: String,
    /// Boundary geometry. Polygons are promoted to a single-member
    /// multi-polygon.
    pub boundary: MultiPolygon<f64>,
    /// Precomputed `[lng, lat]` centroid carried by the dataset, if any.
    pub centroid_hint: Option<[f64; 2]>,
}

impl ProvinceFeature {
    /// Returns `true` if `raw` equals either of this feature's names,
    /// ignoring case. Unnamed features never match.
    #[must_use]
    pub fn is_named(&self, raw: &str) -> bool {
        let raw = raw.trim().to_lowercase();
        if raw.is_empty() {
            return false;
        }
        self.display_name.to_lowercase() == raw || self.match_name.to_lowercase() == raw
    }
}

/// The clean feature collection owned by the map for its whole lifetime.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProvinceCollection {
    /// Retained features in dataset order.
    pub features: Vec<ProvinceFeature>,
}

impl ProvinceCollection {
    /// Number of retained features.
    #[must_use]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Returns `true` if no feature survived normalization.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Iterates over the features named `raw` (a province may be split
    /// across several features).
    pub fn named<'a>(&'a self, raw: &'a str) -> impl Iterator<Item = &'a ProvinceFeature> + 'a {
        self.features.iter().filter(move |f| f.is_named(raw))
    }
}
